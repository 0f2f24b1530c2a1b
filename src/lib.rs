//! # mpt-lite
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Heuristic long-only portfolio allocation from historical price tables.
//!
//! The pipeline is strictly forward: prices → simple returns → annualized
//! mean vector and covariance matrix → weights → portfolio metrics. Every
//! numeric stage is a pure function of its inputs.

pub mod data;
pub mod error;
pub mod portfolio;

pub use data::PriceTable;
pub use error::PortfolioError;
pub use portfolio::OptimizationMode;
pub use portfolio::OptimizationRequest;
pub use portfolio::OptimizationResult;
pub use portfolio::PortfolioEngine;
pub use portfolio::PortfolioEngineConfig;
