use super::BatchStrategy;

/// Greedy similarity clustering: pop the head as a seed, pull in any
/// remaining entity whose feature vector is within `similarity_threshold` of
/// the seed (up to `max_batch_size`), repeat on what's left.
pub struct SimilarityBatchStrategy<T> {
    similarity_threshold: f64,
    max_batch_size: Option<usize>,
    features: Box<dyn FnMut(&T) -> Vec<f64> + Send>,
}

impl<T> SimilarityBatchStrategy<T> {
    pub fn new(
        similarity_threshold: f64,
        max_batch_size: Option<usize>,
        features: impl FnMut(&T) -> Vec<f64> + Send + 'static,
    ) -> Self {
        Self {
            similarity_threshold,
            max_batch_size,
            features: Box::new(features),
        }
    }

    fn similarity(a: &[f64], b: &[f64]) -> f64 {
        let dim = a.len().max(b.len()).max(1) as f64;
        let dist_sq: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum();
        1.0 - dist_sq.sqrt() / dim.sqrt()
    }
}

impl<T> BatchStrategy<T> for SimilarityBatchStrategy<T> {
    fn batch(&mut self, items: Vec<T>) -> Vec<Vec<T>> {
        let mut pool: Vec<(Vec<f64>, T)> = items
            .into_iter()
            .map(|item| {
                let features = (self.features)(&item);
                (features, item)
            })
            .collect();

        let mut batches = Vec::new();
        while !pool.is_empty() {
            let (seed_features, seed_item) = pool.remove(0);
            let mut batch = vec![seed_item];
            let limit = self.max_batch_size.unwrap_or(usize::MAX);

            let mut remaining = Vec::new();
            for (features, item) in pool {
                let fits_similarity = Self::similarity(&seed_features, &features) >= self.similarity_threshold;
                if fits_similarity && batch.len() < limit {
                    batch.push(item);
                } else {
                    remaining.push((features, item));
                }
            }
            pool = remaining;
            batches.push(batch);
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clusters_close_points_together() {
        let mut strategy = SimilarityBatchStrategy::new(0.9, None, |v: &Vec<f64>| v.clone());
        let batches = strategy.batch(vec![vec![0.0, 0.0], vec![0.01, 0.0], vec![10.0, 10.0]]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn respects_max_batch_size() {
        let mut strategy = SimilarityBatchStrategy::new(0.0, Some(2), |v: &Vec<f64>| v.clone());
        let batches = strategy.batch(vec![vec![0.0], vec![0.0], vec![0.0], vec![0.0]]);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() <= 2));
    }
}
