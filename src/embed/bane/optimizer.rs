//! Binary optimization phase of Bane.
//!
//! Starting from a random sign matrix B, each round:
//! - estimates the kernel G, the ridge regression map from B to the target P,
//! - rescales the target to Q = P.G^t,
//! - runs cyclic coordinate descent sweeps on the columns of B, each column being replaced by the sign of its residual.
//!
//! The number of rounds is the only stopping criterion.
//!
//! See *Binarized Attributed Network Embedding*. Yang, Pan, Tsang, Zhang, ICDM 2018.

use anyhow::anyhow;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_linalg::Inverse;

use rand::Rng;
use rand_distr::StandardNormal;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The sign used in binarization. 0 (and NaN) are sent to +1 so every entry of B stays in {-1, +1}.
#[inline]
pub fn binary_sign(x: f64) -> f64 {
    if x < 0. {
        -1.
    } else {
        1.
    }
} // end of binary_sign

/// returns true if all entries of mat are -1 or +1
pub fn is_binary(mat: &ArrayView2<f64>) -> bool {
    mat.iter().all(|x| *x == 1. || *x == -1.)
}

/// sample a (nb_rows, dim) matrix of signs of independent N(0,1) variables
pub fn random_binary_init(nb_rows: usize, dim: usize, seed: u64) -> Array2<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let normal = StandardNormal {};
    Array2::<f64>::from_shape_fn((nb_rows, dim), |_| {
        let xsi: f64 = rng.sample(normal);
        binary_sign(xsi)
    })
} // end of random_binary_init

#[cfg_attr(doc, katexit::katexit)]
/// computes the kernel $$ G = (B^{t}B + \alpha I)^{-1} B^{t} P $$
/// i.e the minimizer of $\| BG - P \|^{2} + \alpha \| G \|^{2}$. G is a (d,d) matrix.
pub fn estimate_kernel(
    binary: &Array2<f64>,
    target: &Array2<f64>,
    alpha: f64,
) -> Result<Array2<f64>, anyhow::Error> {
    let dim = binary.ncols();
    let mut gram = binary.t().dot(binary);
    for k in 0..dim {
        gram[[k, k]] += alpha;
    }
    let inverse = match gram.inv() {
        Ok(inverse) => inverse,
        Err(e) => {
            log::error!("estimate_kernel : inversion of regularized gram matrix failed, alpha : {}", alpha);
            return Err(anyhow!("kernel estimation, inversion failed : {}", e));
        }
    };
    Ok(inverse.dot(&binary.t()).dot(target))
} // end of estimate_kernel

/// computes the rescaled target Q = (G.P^t)^t = P.G^t , a (n,d) matrix.
pub fn rescale_target(kernel: &Array2<f64>, target: &Array2<f64>) -> Array2<f64> {
    target.dot(&kernel.t())
} // end of rescale_target

/// runs nb_sweeps sweeps of cyclic coordinate descent on binary, in place.
/// In a sweep dimensions are visited in increasing order and column dim is replaced by
/// sign(Q\[:,dim\] - B\[:,sel\].G\[sel,:\].G\[:,dim\]) where sel are all dimensions but dim.
/// A column update sees the columns already updated in the same sweep.
pub fn coordinate_descent(
    binary: &mut Array2<f64>,
    kernel: &Array2<f64>,
    rescaled: &Array2<f64>,
    nb_sweeps: usize,
) {
    let dim = binary.ncols();
    assert_eq!(kernel.dim(), (dim, dim));
    assert_eq!(rescaled.dim(), binary.dim());
    //
    for sweep in 0..nb_sweeps {
        let mut nb_flips = 0usize;
        for d in 0..dim {
            let sel: Vec<usize> = (0..dim).filter(|k| *k != d).collect();
            // G[sel,:] . G[:,d]
            let weights: Array1<f64> = kernel.select(Axis(0), &sel).dot(&kernel.column(d));
            let mut resid = rescaled.column(d).to_owned();
            for (k, w) in sel.iter().zip(weights.iter()) {
                resid.scaled_add(-*w, &binary.column(*k));
            }
            let mut column = binary.column_mut(d);
            for (b, r) in column.iter_mut().zip(resid.iter()) {
                let new_b = binary_sign(*r);
                if new_b != *b {
                    nb_flips += 1;
                }
                *b = new_b;
            }
        }
        log::trace!("coordinate descent sweep {}, nb flips : {}", sweep, nb_flips);
    }
} // end of coordinate_descent

/// The binary optimizer owns the binary matrix during the rounds. The target is borrowed and never modified.
pub struct BinaryOptimizer<'a> {
    /// continuous target (n,d)
    target: &'a Array2<f64>,
    /// binary matrix (n,d) with entries in {-1, +1}
    binary: Array2<f64>,
    /// ridge regularization
    alpha: f64,
} // end of BinaryOptimizer

impl<'a> BinaryOptimizer<'a> {
    /// initialize the binary matrix from the sign of gaussian samples.
    pub fn new(target: &'a Array2<f64>, alpha: f64, seed: u64) -> Self {
        let (nb_rows, dim) = target.dim();
        let binary = random_binary_init(nb_rows, dim, seed);
        BinaryOptimizer::check_alpha(alpha);
        BinaryOptimizer {
            target,
            binary,
            alpha,
        }
    } // end of new

    /// start from a given binary matrix, for example one returned by a previous run.
    pub fn from_initial(
        target: &'a Array2<f64>,
        binary: Array2<f64>,
        alpha: f64,
    ) -> Result<Self, anyhow::Error> {
        if binary.dim() != target.dim() {
            return Err(anyhow!(
                "initial binary matrix shape {:?} differs from target shape {:?}",
                binary.dim(),
                target.dim()
            ));
        }
        if !is_binary(&binary.view()) {
            return Err(anyhow!("initial matrix has entries not in {{-1, 1}}"));
        }
        BinaryOptimizer::check_alpha(alpha);
        Ok(BinaryOptimizer {
            target,
            binary,
            alpha,
        })
    } // end of from_initial

    fn check_alpha(alpha: f64) {
        if !(alpha > 0.) {
            log::warn!(
                "BinaryOptimizer alpha = {} , kernel estimation may hit a singular gram matrix",
                alpha
            );
        }
    }

    /// current binary matrix
    pub fn get_binary(&self) -> &Array2<f64> {
        &self.binary
    }

    /// one round : kernel estimation, target rescaling and nb_sweeps sweeps of coordinate descent.
    pub fn round(&mut self, nb_sweeps: usize) -> Result<(), anyhow::Error> {
        let kernel = estimate_kernel(&self.binary, self.target, self.alpha)?;
        let rescaled = rescale_target(&kernel, self.target);
        coordinate_descent(&mut self.binary, &kernel, &rescaled, nb_sweeps);
        Ok(())
    } // end of round

    /// runs binarization_rounds rounds and returns the binary matrix.
    pub fn optimize(
        mut self,
        binarization_rounds: usize,
        approximation_rounds: usize,
    ) -> Result<Array2<f64>, anyhow::Error> {
        log::info!(
            "binary optimization, shape : {:?}, binarization rounds : {}, approximation rounds : {}",
            self.binary.dim(),
            binarization_rounds,
            approximation_rounds
        );
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        for r in 0..binarization_rounds {
            self.round(approximation_rounds)?;
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "round {} , reconstruction error : {:.5e}",
                    r,
                    self.reconstruction_error()?
                );
            }
        }
        log::info!(
            "binary optimization done, sys time(ms) {:?}, cpu time(ms) {:?}",
            sys_start.elapsed().map(|d| d.as_millis()).unwrap_or(0),
            cpu_start.elapsed().as_millis()
        );
        Ok(self.binary)
    } // end of optimize

    /// squared frobenius norm of B.G - P with G estimated from current B
    pub fn reconstruction_error(&self) -> Result<f64, anyhow::Error> {
        let kernel = estimate_kernel(&self.binary, self.target, self.alpha)?;
        let delta = self.binary.dot(&kernel) - self.target;
        Ok(delta.iter().map(|x| x * x).sum::<f64>())
    } // end of reconstruction_error
} // end of impl BinaryOptimizer

//===============================================================

// end of mod tests
