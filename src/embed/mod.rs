//! embedders and the tools they share

/// graph operators and distances
pub mod tools;

/// Binarized attributed network embedding
pub mod bane;
