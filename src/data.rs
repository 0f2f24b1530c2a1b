//! # Data
//!
//! $$
//! \{(t, p_{1,t}, \dots, p_{n,t})\}_{t} \mapsto \{p_{i,\cdot}\}_{i=1}^n
//! $$
//!
//! Ingestion of historical price tables.

pub mod price_table;

pub use price_table::MIN_VALID_POINTS;
pub use price_table::PriceTable;
