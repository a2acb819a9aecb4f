//! The module defines parameters for the Bane binary embedding.
//!
//! The propagation parameters (order, gamma) drive the construction of the target matrix,
//! alpha, binarization_rounds and approximation_rounds drive the binary optimization.

/// default embedding dimension
pub const DEFAULT_DIMENSION: usize = 48;
/// default number of outer rounds (kernel, rescaling, coordinate descent)
pub const DEFAULT_BINARIZATION_ROUNDS: usize = 10;
/// default number of coordinate descent sweeps in a round
pub const DEFAULT_APPROXIMATION_ROUNDS: usize = 5;
/// default power of the propagation operator
pub const DEFAULT_ORDER: usize = 1;
/// default propagation trade-off
pub const DEFAULT_GAMMA: f64 = 0.7;
/// default ridge regularization
pub const DEFAULT_ALPHA: f64 = 0.01;
/// default seed of the gaussian sampling initializing the binary matrix
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Copy, Clone)]
pub struct BaneParams {
    /// dimension of the embedding, i.e number of components kept in the truncated svd
    pub dimension: usize,
    /// number of rounds (kernel estimation, target rescaling, coordinate descent).
    pub binarization_rounds: usize,
    /// number of coordinate descent sweeps on all dimensions in each round
    pub approximation_rounds: usize,
    /// power of the propagation operator used to build the target. Must be >= 1
    pub order: usize,
    /// trade-off between a node and its neighbourhood in the propagation operator
    pub gamma: f64,
    /// ridge regularization of the kernel estimation. Must be > 0.
    pub alpha: f64,
    /// seed for the random initialization of the binary matrix
    pub seed: u64,
} // end of BaneParams

impl BaneParams {
    #[cfg_attr(doc, katexit::katexit)]
    ///
    /// The kernel at each round is estimated by  $$ G = (B^{t}B + \alpha I)^{-1} B^{t} P $$
    /// so alpha must be strictly positive to keep $B^{t}B + \alpha I$ inversible whatever the rank of B.
    ///
    pub fn new(
        dimension: usize,
        binarization_rounds: usize,
        approximation_rounds: usize,
        order: usize,
        gamma: f64,
        alpha: f64,
        seed: u64,
    ) -> Self {
        BaneParams {
            dimension,
            binarization_rounds,
            approximation_rounds,
            order,
            gamma,
            alpha,
            seed,
        }
    }

    //
    pub fn get_dimension(&self) -> usize {
        self.dimension
    }

    //
    pub fn get_binarization_rounds(&self) -> usize {
        self.binarization_rounds
    }

    //
    pub fn get_approximation_rounds(&self) -> usize {
        self.approximation_rounds
    }

    //
    pub fn get_order(&self) -> usize {
        self.order
    }

    //
    pub fn get_gamma(&self) -> f64 {
        self.gamma
    }

    //
    pub fn get_alpha(&self) -> f64 {
        self.alpha
    }

    //
    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    /// dumps parameters, one line each, at info level.
    pub fn log(&self) {
        log::info!("{:<24} {}", "Parameter", "Value");
        log::info!("{:<24} {}", "Alpha", self.alpha);
        log::info!("{:<24} {}", "Approximation rounds", self.approximation_rounds);
        log::info!("{:<24} {}", "Binarization rounds", self.binarization_rounds);
        log::info!("{:<24} {}", "Dimensions", self.dimension);
        log::info!("{:<24} {}", "Gamma", self.gamma);
        log::info!("{:<24} {}", "Order", self.order);
        log::info!("{:<24} {}", "Seed", self.seed);
    } // end of log
} // end of impl BaneParams

impl Default for BaneParams {
    fn default() -> Self {
        BaneParams {
            dimension: DEFAULT_DIMENSION,
            binarization_rounds: DEFAULT_BINARIZATION_ROUNDS,
            approximation_rounds: DEFAULT_APPROXIMATION_ROUNDS,
            order: DEFAULT_ORDER,
            gamma: DEFAULT_GAMMA,
            alpha: DEFAULT_ALPHA,
            seed: DEFAULT_SEED,
        }
    }
} // end of impl Default for BaneParams

//=====================================================================

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_default_params() {
        let params = BaneParams::default();
        assert_eq!(params.get_dimension(), 48);
        assert_eq!(params.get_binarization_rounds(), 10);
        assert_eq!(params.get_approximation_rounds(), 5);
        assert_eq!(params.get_order(), 1);
        assert!((params.get_gamma() - 0.7).abs() < 1.0E-12);
        assert!((params.get_alpha() - 0.01).abs() < 1.0E-12);
        assert_eq!(params.get_seed(), 42);
    } // end of test_default_params
} // end of mod tests
