//! The Bane embedder : chains the construction of the continuous target and the binary optimization.
//!
//! 1. The propagator is raised to the power *order* and applied to the feature matrix, the product is reduced
//!    to *dimension* columns by a truncated svd. This gives the target P.
//! 2. A random sign matrix is refined by *binarization_rounds* rounds of kernel estimation, target rescaling and
//!    coordinate descent.
//!
//! The result is an [Embedded<i8>] with entries in {-1, +1}, compared with the hamming distance.

use cpu_time::ProcessTime;
use std::time::SystemTime;

use ndarray::Array2;
use sprs::CsMat;

use annembed::tools::svdapprox::MatRepr;

use super::optimizer::BinaryOptimizer;
use super::params::BaneParams;
use super::projector::{project, RandomizedSvd, TruncatedProjection};

use crate::embed::tools::hamming::hamming_distance;
use crate::embed::tools::propagator;
use crate::embedding::{Embedded, EmbedderT};

/// Binarized attributed network embedding.
pub struct Bane<T: TruncatedProjection = RandomizedSvd> {
    /// parameters
    params: BaneParams,
    /// degree normalized propagation operator (not powered).
    propagator: CsMat<f64>,
    /// node attributes, one row by node
    features: MatRepr<f64>,
    /// rank reduction used to build the target
    reducer: T,
} // end of struct Bane

impl Bane<RandomizedSvd> {
    /// propagator must be the normalized propagation operator of the graph, see [propagator::normalize].
    pub fn new(params: BaneParams, propagator: CsMat<f64>, features: MatRepr<f64>) -> Self {
        Bane {
            params,
            propagator,
            features,
            reducer: RandomizedSvd::default(),
        }
    }

    /// builds the propagator from an undirected edge list. The number of nodes is the maximum of the number of rows of features
    /// and of max node id in edges + 1.
    pub fn from_edges(
        params: BaneParams,
        edges: &[(usize, usize)],
        features: MatRepr<f64>,
    ) -> Result<Self, anyhow::Error> {
        let nb_nodes = propagator::get_nb_nodes_from_edges(edges).max(features.shape()[0]);
        let p0 = propagator::normalize(edges, nb_nodes, params.get_gamma())?;
        Ok(Bane::new(params, p0, features))
    }
} // end of impl Bane<RandomizedSvd>

impl<T: TruncatedProjection> Bane<T> {
    /// to use another rank reduction than the default randomized svd
    pub fn with_reducer(
        params: BaneParams,
        propagator: CsMat<f64>,
        features: MatRepr<f64>,
        reducer: T,
    ) -> Self {
        Bane {
            params,
            propagator,
            features,
            reducer,
        }
    }

    pub fn get_params(&self) -> &BaneParams {
        &self.params
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.propagator.rows()
    }

    /// computes the continuous target matrix (nb_nodes, dimension)
    pub fn fit_target(&self) -> Result<Array2<f64>, anyhow::Error> {
        let powered = propagator::power(&self.propagator, self.params.get_order())?;
        project(
            &powered,
            &self.features,
            self.params.get_dimension(),
            &self.reducer,
        )
    } // end of fit_target

    /// runs the binary optimization phase on a target. Returns a matrix with entries -1. or 1.
    pub fn fit_binary(&self, target: &Array2<f64>) -> Result<Array2<f64>, anyhow::Error> {
        let optimizer = BinaryOptimizer::new(target, self.params.get_alpha(), self.params.get_seed());
        optimizer.optimize(
            self.params.get_binarization_rounds(),
            self.params.get_approximation_rounds(),
        )
    } // end of fit_binary

    /// the whole fit. returns a (nb_nodes, dimension) matrix with entries in {-1, 1}
    pub fn fit(&self) -> Result<Array2<i8>, anyhow::Error> {
        log::info!("fitting Bane model, nb nodes : {}", self.get_nb_nodes());
        self.params.log();
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        let target = self.fit_target()?;
        log::info!("target construction done, fitting binary model");
        let binary = self.fit_binary(&target)?;
        log::info!(
            "Bane fit done, sys time(ms) {:?}, cpu time(ms) {:?}",
            sys_start.elapsed().map(|d| d.as_millis()).unwrap_or(0),
            cpu_start.elapsed().as_millis()
        );
        Ok(binary.mapv(|x| if x < 0. { -1i8 } else { 1i8 }))
    } // end of fit
} // end of impl Bane

impl<T: TruncatedProjection> EmbedderT<i8> for Bane<T> {
    type Output = Embedded<i8>;
    //
    fn embed(&mut self) -> Result<Embedded<i8>, anyhow::Error> {
        let binary = self.fit()?;
        Ok(Embedded::new(binary, hamming_distance::<i8>))
    }
} // end of impl EmbedderT<i8> for Bane

//===============================================================

// end of mod tests
