use super::BatchStrategy;

/// Packs entities by an estimated processing time per entity; a single
/// entity exceeding `max_batch_time` becomes its own batch.
pub struct TimeBatchStrategy<T> {
    max_batch_time: f64,
    time_of: Box<dyn FnMut(&T) -> f64 + Send>,
    warnings: Vec<String>,
}

impl<T> TimeBatchStrategy<T> {
    pub fn new(max_batch_time: f64, time_of: impl FnMut(&T) -> f64 + Send + 'static) -> Self {
        Self {
            max_batch_time,
            time_of: Box::new(time_of),
            warnings: Vec::new(),
        }
    }

    /// Warnings raised for entities whose estimated processing time exceeded
    /// `max_batch_time` and were isolated into their own singleton batch
    /// (§4.1); see `SizeBatchStrategy::warnings` for why these are collected
    /// rather than logged directly.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

impl<T> BatchStrategy<T> for TimeBatchStrategy<T> {
    fn batch(&mut self, items: Vec<T>) -> Vec<Vec<T>> {
        let mut batches = Vec::new();
        let mut current: Vec<T> = Vec::new();
        let mut current_total = 0.0;

        for item in items {
            let time = (self.time_of)(&item);
            if time > self.max_batch_time {
                if !current.is_empty() {
                    batches.push(std::mem::take(&mut current));
                    current_total = 0.0;
                }
                self.warnings.push(format!(
                    "entity with estimated time {time} exceeds max_batch_time {}; isolating into its own batch",
                    self.max_batch_time
                ));
                batches.push(vec![item]);
                continue;
            }
            if current_total + time > self.max_batch_time && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_total = 0.0;
            }
            current_total += time;
            current.push(item);
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}
