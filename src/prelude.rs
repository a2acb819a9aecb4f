//! To ease access to most frequently items
//!


pub use crate::io::{csv::*, features::*, embeddedbson::*, output::*};

pub use crate::embedding::*;
pub use crate::embed::bane::*;
pub use crate::embed::bane::projector::{RandomizedSvd, TruncatedProjection};
pub use crate::embed::tools::hamming::hamming_distance;

pub use annembed::tools::svdapprox::MatRepr;
