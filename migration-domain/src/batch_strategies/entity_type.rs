use std::collections::HashMap;

use super::BatchStrategy;

/// Groups entities by a type key, then splits each group into batches of at
/// most `max_batch_size`. Cross-batch order follows first-occurrence of
/// each type key.
pub struct EntityTypeBatchStrategy<T> {
    max_batch_size: usize,
    type_of: Box<dyn FnMut(&T) -> String + Send>,
}

impl<T> EntityTypeBatchStrategy<T> {
    pub fn new(max_batch_size: usize, type_of: impl FnMut(&T) -> String + Send + 'static) -> Self {
        Self {
            max_batch_size: max_batch_size.max(1),
            type_of: Box::new(type_of),
        }
    }
}

impl<T> BatchStrategy<T> for EntityTypeBatchStrategy<T> {
    fn batch(&mut self, items: Vec<T>) -> Vec<Vec<T>> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<T>> = HashMap::new();

        for item in items {
            let key = (self.type_of)(&item);
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(item);
        }

        let mut batches = Vec::new();
        for key in order {
            let group = groups.remove(&key).unwrap_or_default();
            for chunk in group.into_iter().fold(Vec::<Vec<T>>::new(), |mut acc, item| {
                match acc.last_mut() {
                    Some(last) if last.len() < self.max_batch_size => last.push(item),
                    _ => acc.push(vec![item]),
                }
                acc
            }) {
                batches.push(chunk);
            }
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_type_then_splits() {
        let mut strategy = EntityTypeBatchStrategy::new(2, |s: &&str| s.chars().next().unwrap().to_string());
        let batches = strategy.batch(vec!["a1", "b1", "a2", "a3", "b2"]);
        assert_eq!(batches, vec![vec!["a1", "a2"], vec!["a3"], vec!["b1", "b2"]]);
    }
}
