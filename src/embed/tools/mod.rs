//! tools : propagation operator on the graph, distance between binary vectors

pub mod propagator;

pub mod hamming;
