//! Construction of the continuous target matrix.
//!
//! The node attributes are first propagated along the graph by the (powered) propagation operator,
//! then the dimension of the propagated attributes is reduced by a truncated svd.
//! The reduction is delegated to the randomized svd of the crate annembed.

use anyhow::anyhow;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use ndarray::{s, Array2};
use sprs::CsMat;

use annembed::tools::svdapprox::{MatMode, MatRepr, RangeApproxMode, RangeRank, SvdApprox};

/// number of subspace iterations of the randomized svd
pub const SVD_NB_ITER: usize = 70;

/// A rank reduction primitive.
/// Given a (n, f) matrix it must return a (n, dim) dense matrix, the projection of rows of the matrix
/// on the first dim right singular vectors, i.e $U_{dim} \cdot \Sigma_{dim}$.
/// The reduction must be deterministic given its input.
pub trait TruncatedProjection {
    fn reduce(&self, mat: &MatRepr<f64>, dim: usize) -> Result<Array2<f64>, anyhow::Error>;
} // end of trait TruncatedProjection

/// Randomized svd à la Halko-Tropp, as implemented in annembed, run with a fixed number of subspace iterations.
/// annembed seeds its random generator with a fixed seed so the reduction is reproducible.
#[derive(Copy, Clone, Debug)]
pub struct RandomizedSvd {
    nb_iter: usize,
}

impl RandomizedSvd {
    pub fn new(nb_iter: usize) -> Self {
        RandomizedSvd { nb_iter }
    }

    pub fn get_nb_iter(&self) -> usize {
        self.nb_iter
    }
} // end of impl RandomizedSvd

impl Default for RandomizedSvd {
    fn default() -> Self {
        RandomizedSvd {
            nb_iter: SVD_NB_ITER,
        }
    }
}

impl TruncatedProjection for RandomizedSvd {
    fn reduce(&self, mat: &MatRepr<f64>, dim: usize) -> Result<Array2<f64>, anyhow::Error> {
        //
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        let mut svdapprox = SvdApprox::new(mat);
        let svd_mode = RangeApproxMode::RANK(RangeRank::new(dim, self.nb_iter));
        let svd_res = match svdapprox.direct_svd(svd_mode) {
            Ok(res) => res,
            Err(msg) => {
                log::error!("RandomizedSvd::reduce : direct_svd failed : {}", msg);
                return Err(anyhow!("truncated svd failed : {}", msg));
            }
        };
        let (u, sigma) = match (svd_res.get_u(), svd_res.get_sigma()) {
            (Some(u), Some(sigma)) => (u, sigma),
            _ => {
                return Err(anyhow!("truncated svd did not return left singular vectors and values"));
            }
        };
        log::debug!("RandomizedSvd::reduce got u : {:?}, sigma : {:?}", u.dim(), sigma.len());
        if u.ncols() < dim || sigma.len() < dim {
            log::error!(
                "RandomizedSvd::reduce asked for rank {} , got only {}",
                dim,
                u.ncols().min(sigma.len())
            );
            return Err(anyhow!(
                "truncated svd returned rank {} , less than dimension {}",
                u.ncols().min(sigma.len()),
                dim
            ));
        }
        let mut reduced = u.slice(s![.., 0..dim]).to_owned();
        for (j, mut column) in reduced.columns_mut().into_iter().enumerate() {
            let sigma_j = sigma[j];
            column.mapv_inplace(|x| x * sigma_j);
        }
        log::info!(
            "truncated svd (rank {}, nb iter {}) sys time(ms) {:?}, cpu time(ms) {:?}",
            dim,
            self.nb_iter,
            sys_start.elapsed().map(|d| d.as_millis()).unwrap_or(0),
            cpu_start.elapsed().as_millis()
        );
        Ok(reduced)
    } // end of reduce
} // end of impl TruncatedProjection for RandomizedSvd

/// computes the product of the propagation operator with the feature matrix.
/// The result is csr if features are csr, dense otherwise.
pub fn propagate(
    propagator: &CsMat<f64>,
    features: &MatRepr<f64>,
) -> Result<MatRepr<f64>, anyhow::Error> {
    let nb_rows = features.shape()[0];
    if propagator.cols() != nb_rows {
        log::error!(
            "propagate : propagator has {} columns, features have {} rows",
            propagator.cols(),
            nb_rows
        );
        return Err(anyhow!(
            "shape mismatch : propagator ({}, {}) features ({}, {})",
            propagator.rows(),
            propagator.cols(),
            nb_rows,
            features.shape()[1]
        ));
    }
    let propagated = match features.get_data() {
        MatMode::FULL(dense) => {
            let product: Array2<f64> = propagator * dense;
            MatRepr::from_array2(product)
        }
        MatMode::CSR(csr) => {
            let product: CsMat<f64> = sprs::smmp::mul_csr_csr(propagator.view(), csr.view());
            MatRepr::from_csrmat(product)
        }
    };
    Ok(propagated)
} // end of propagate

/// computes the target matrix : propagate features with the (already powered) propagator, then
/// reduce to dim columns with the truncated projection.
/// dim must not exceed the minimum of the number of nodes and the number of features, it is left to the
/// projection to fail if it does.
pub fn project<T: TruncatedProjection>(
    propagator: &CsMat<f64>,
    features: &MatRepr<f64>,
    dim: usize,
    reducer: &T,
) -> Result<Array2<f64>, anyhow::Error> {
    log::info!("target matrix construction, dimension : {}", dim);
    let propagated = propagate(propagator, features)?;
    let reduced = reducer.reduce(&propagated, dim)?;
    log::info!("target matrix shape : {:?}", reduced.dim());
    Ok(reduced)
} // end of project

//===============================================================

// end of mod tests
