//! Drug-safety surveillance aggregation library
//!
//! This library loads a pre-aggregated adverse-event summary table and derives
//! per-drug report totals, top-signal rankings, and yearly trend series for a
//! surveillance dashboard.

pub mod errors;
pub mod example_data;
pub mod export;
pub mod models;
pub mod parser;
pub mod pipeline;

pub use errors::*;
pub use models::*;
pub use pipeline::*;

/// Re-export commonly used types
pub type Result<T> = std::result::Result<T, SurveillanceError>;
