//! # Portfolio
//!
//! $$
//! \mathbf{w}^\* = \operatorname{Allocate}(\mu, \Sigma; \text{mode})
//! $$
//!
//! Return estimation, heuristic allocation and portfolio evaluation.

pub mod allocator;
pub mod engine;
pub mod estimator;
pub mod evaluator;
pub mod returns;
pub mod types;

pub use allocator::allocate_efficient;
pub use allocator::allocate_max_return;
pub use allocator::allocate_min_variance;
pub use allocator::allocate_with_mode;
pub use allocator::normalize_weights;
pub use engine::OptimizationRequest;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use estimator::AssetStatistics;
pub use estimator::covariance_matrix;
pub use estimator::estimate_statistics;
pub use estimator::mean_return;
pub use evaluator::PortfolioMetrics;
pub use evaluator::evaluate_portfolio;
pub use returns::simple_returns;
pub use types::OptimizationMode;
pub use types::OptimizationResult;
