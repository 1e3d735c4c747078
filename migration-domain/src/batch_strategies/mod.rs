//! Batch Strategies (C1, §4.1): partition entity lists into batches under
//! size/time/type/similarity/adaptive policies.

mod adaptive;
mod entity_type;
mod similarity;
mod size;
mod time;

pub use adaptive::AdaptiveBatchStrategy;
pub use entity_type::EntityTypeBatchStrategy;
pub use similarity::SimilarityBatchStrategy;
pub use size::SizeBatchStrategy;
pub use time::TimeBatchStrategy;

/// Common contract for every batch strategy: a finite ordered sequence of
/// entities in, a finite ordered list of non-empty batches out, whose
/// concatenation is a permutation of the input.
pub trait BatchStrategy<T> {
    fn batch(&mut self, items: Vec<T>) -> Vec<Vec<T>>;
}

/// §4.1 optimal-size helper. `available_memory_mb` absent means "query the
/// system for 80% of available" - callers in this crate pass it explicitly
/// since the domain does not have platform access; the infrastructure/CLI
/// layer is responsible for querying and supplying it.
#[allow(clippy::too_many_arguments)]
pub fn configure_optimal_batch_size(
    entity_count: u64,
    available_memory_mb: f64,
    entity_size_mb: f64,
    parallelism: u64,
    api_rate_limit_rpm: Option<f64>,
    min: u64,
    max: u64,
) -> u64 {
    let parallelism = parallelism.max(1);
    let entity_size_mb = if entity_size_mb <= 0.0 { 1.0 } else { entity_size_mb };

    let mem_constraint = available_memory_mb / entity_size_mb / parallelism as f64;
    let rate_constraint = api_rate_limit_rpm
        .map(|rpm| rpm / parallelism as f64 * 0.9)
        .unwrap_or(f64::INFINITY);

    let bound = mem_constraint.min(rate_constraint).min(entity_count as f64);
    let bound = bound.floor().max(0.0) as u64;
    bound.clamp(min, max)
}

/// §4.1 processing-time estimator: linear interpolation between bracketing
/// `(size, time)` history points, linear extrapolation beyond the ends, and
/// `default_per_item * size` with no history at all.
pub fn estimate_processing_time(history: &[(u64, f64)], size: u64, default_per_item: f64) -> f64 {
    if history.is_empty() {
        return default_per_item * size as f64;
    }
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|(s, _)| *s);

    if sorted.len() == 1 {
        let (s0, t0) = sorted[0];
        if s0 == 0 {
            return t0;
        }
        return t0 / s0 as f64 * size as f64;
    }

    let size_f = size as f64;
    if size_f <= sorted[0].0 as f64 {
        let (s0, t0) = sorted[0];
        let (s1, t1) = sorted[1];
        return lerp(s0 as f64, t0, s1 as f64, t1, size_f);
    }
    if size_f >= sorted[sorted.len() - 1].0 as f64 {
        let (s0, t0) = sorted[sorted.len() - 2];
        let (s1, t1) = sorted[sorted.len() - 1];
        return lerp(s0 as f64, t0, s1 as f64, t1, size_f);
    }
    for window in sorted.windows(2) {
        let (s0, t0) = window[0];
        let (s1, t1) = window[1];
        if size_f >= s0 as f64 && size_f <= s1 as f64 {
            return lerp(s0 as f64, t0, s1 as f64, t1, size_f);
        }
    }
    unreachable!("size falls within sorted history bounds")
}

fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimal_size_clamps_to_bounds() {
        let size = configure_optimal_batch_size(10_000, 1024.0, 1.0, 4, Some(6000.0), 1, 1000);
        assert!(size <= 1000);
        assert!(size >= 1);
    }

    #[test]
    fn optimal_size_respects_entity_count_floor() {
        let size = configure_optimal_batch_size(5, 1_000_000.0, 0.001, 1, None, 1, 1000);
        assert_eq!(size, 5);
    }

    #[test]
    fn estimate_with_empty_history_uses_default() {
        assert_eq!(estimate_processing_time(&[], 10, 0.5), 5.0);
    }

    #[test]
    fn estimate_interpolates_between_points() {
        let history = vec![(10, 1.0), (20, 3.0)];
        let estimate = estimate_processing_time(&history, 15, 1.0);
        assert!((estimate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn estimate_extrapolates_beyond_bounds() {
        let history = vec![(10, 1.0), (20, 3.0)];
        let estimate = estimate_processing_time(&history, 30, 1.0);
        assert!((estimate - 5.0).abs() < 1e-9);
    }
}
