use super::BatchStrategy;

/// Produces fixed-size batches at a current size that self-tunes from
/// observed processing times via `adapt`.
pub struct AdaptiveBatchStrategy<T> {
    current_batch_size: usize,
    min: usize,
    max: usize,
    target_processing_time: f64,
    adaptation_rate: f64,
    history: Vec<(usize, f64)>,
    _marker: std::marker::PhantomData<T>,
}

impl<T> AdaptiveBatchStrategy<T> {
    pub fn new(initial_batch_size: usize, min: usize, max: usize, target_processing_time: f64, adaptation_rate: f64) -> Self {
        Self {
            current_batch_size: initial_batch_size.clamp(min, max),
            min,
            max,
            target_processing_time,
            adaptation_rate,
            history: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn current_batch_size(&self) -> usize {
        self.current_batch_size
    }

    pub fn history(&self) -> &[(usize, f64)] {
        &self.history
    }

    /// §4.1: after a batch of the current size took `time` seconds, update
    /// `current_batch_size` and clamp to `[min, max]`.
    pub fn adapt(&mut self, time: f64) {
        self.history.push((self.current_batch_size, time));

        let factor = if time > self.target_processing_time {
            (self.target_processing_time / time).clamp(0.5, 0.9)
        } else if time < 0.8 * self.target_processing_time {
            ((self.target_processing_time / time) * self.adaptation_rate + 1.0).clamp(1.1, 1.5)
        } else {
            1.0
        };

        let new_size = (self.current_batch_size as f64 * factor).round() as i64;
        self.current_batch_size = new_size.clamp(self.min as i64, self.max as i64) as usize;
    }
}

impl<T> BatchStrategy<T> for AdaptiveBatchStrategy<T> {
    fn batch(&mut self, items: Vec<T>) -> Vec<Vec<T>> {
        items
            .into_iter()
            .fold(Vec::<Vec<T>>::new(), |mut batches, item| {
                match batches.last_mut() {
                    Some(last) if last.len() < self.current_batch_size => last.push(item),
                    _ => batches.push(vec![item]),
                }
                batches
            })
    }
}
