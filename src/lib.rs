//! lib target
//!
//! Binarized attributed network embedding (Bane).
//!
//! - *Binarized Attributed Network Embedding. ICDM 2018*
//!   H. Yang, S. Pan, P. Zhang, L. Chen, D. Lian and C. Zhang.
//!
//! Nodes of an undirected graph carrying attribute vectors are embedded in {-1,+1}^d.
//! Attributes are smoothed along the graph by a degree normalized propagation operator, reduced by a truncated svd,
//! then a sign matrix is fitted to the result by cyclic coordinate descent.

pub mod io;

pub mod embed;

pub mod embedding;

pub mod prelude;
