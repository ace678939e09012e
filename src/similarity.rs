use crate::error::{Result, SearchError};
use crate::histogram::Histogram;

/// Histogram intersection: the sum of per-bin minimums.
///
/// For two normalized histograms the result lies in `[0, 1]`; it is 1.0 for
/// identical histograms and 0.0 when their supports are disjoint.
pub fn similarity(a: &Histogram, b: &Histogram) -> Result<f64> {
    if a.len() != b.len() {
        return Err(SearchError::ShapeMismatch { expected: a.len(), actual: b.len() });
    }
    Ok(a.bins().iter().zip(b.bins()).map(|(x, y)| x.min(*y)).sum())
}
