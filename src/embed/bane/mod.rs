//! This module gathers the embedding based on the paper:
//! *Binarized Attributed Network Embedding ICDM 2018*.
//!    H. Yang, S. Pan, P. Zhang, L. Chen, D. Lian and C. Zhang.
//!
//! It embeds nodes of an undirected graph with attributes attached to nodes in the hypercube {-1,+1}^d.
//! The embedding is compared with the hamming distance.

/// Defines Bane parameters.
pub mod params;

/// Construction of the continuous target : propagation of attributes and truncated svd.
pub mod projector;

/// Binary matrix fitting
pub mod optimizer;

pub mod embedder;

pub use params::*;
pub use embedder::Bane;
