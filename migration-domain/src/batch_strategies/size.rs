use super::BatchStrategy;

/// Packs entities by a size function until adding the next would exceed
/// `max_batch_size`; a single oversized entity becomes its own batch.
pub struct SizeBatchStrategy<T> {
    max_batch_size: f64,
    size_of: Box<dyn FnMut(&T) -> f64 + Send>,
    warnings: Vec<String>,
}

impl<T> SizeBatchStrategy<T> {
    pub fn new(max_batch_size: f64, size_of: impl FnMut(&T) -> f64 + Send + 'static) -> Self {
        Self {
            max_batch_size,
            size_of: Box::new(size_of),
            warnings: Vec::new(),
        }
    }

    /// Warnings raised for entities that exceeded `max_batch_size` and were
    /// isolated into their own singleton batch (§4.1). The domain crate has
    /// no logging dependency (see this crate's `Cargo.toml`), so these are
    /// collected here for the infrastructure layer to emit through
    /// `tracing` at the call site.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

impl<T: crate::entities::HasSize> SizeBatchStrategy<T> {
    /// `size_of` defaults to the entity's declared `HasSize::size()`.
    pub fn with_default_size(max_batch_size: f64) -> Self {
        Self::new(max_batch_size, |item: &T| item.size())
    }
}

impl<T> BatchStrategy<T> for SizeBatchStrategy<T> {
    fn batch(&mut self, items: Vec<T>) -> Vec<Vec<T>> {
        let mut batches = Vec::new();
        let mut current: Vec<T> = Vec::new();
        let mut current_total = 0.0;

        for item in items {
            let size = (self.size_of)(&item);
            if size > self.max_batch_size {
                if !current.is_empty() {
                    batches.push(std::mem::take(&mut current));
                    current_total = 0.0;
                }
                self.warnings.push(format!(
                    "entity of size {size} exceeds max_batch_size {}; isolating into its own batch",
                    self.max_batch_size
                ));
                batches.push(vec![item]);
                continue;
            }
            if current_total + size > self.max_batch_size && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_total = 0.0;
            }
            current_total += size;
            current.push(item);
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}
