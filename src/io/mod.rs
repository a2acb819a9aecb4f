//! io : reading of edge lists and node attributes, dump and reload of embeddings.

pub mod csv;

pub mod features;

pub mod embeddedbson;

/// describes output format and file
pub mod output;
