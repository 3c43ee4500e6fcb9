use std::fmt::Debug;

/// A pretrained regression model, consumed as a black box.
///
/// Implementations must be pure: the same input always yields the same
/// output and calls share no mutable state, so records can be scored in
/// parallel.
pub trait Regressor: Debug + Send + Sync {
    /// Number of inputs expected by [`Regressor::predict`]
    fn num_features(&self) -> usize;

    /// Canonical input names in order, when the artifact records them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Score one input vector of exactly `num_features()` finite values
    fn predict(&self, features: &[f64]) -> f64;
}
