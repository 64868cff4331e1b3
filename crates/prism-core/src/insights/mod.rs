//! Insight Statistics Engine
//!
//! Recomputes the statistic behind a catalogued insight over the records of
//! its subspace and narrates it as one deterministic sentence.
//!
//! ## Supported kinds
//!
//! - **top1** - largest group totals
//! - **trend** - least-squares slope of totals over an ordered breakdown
//! - **correlation** - Pearson r between a subspace and its counterpart
//! - **change point** / **outlier** - the total at one breakdown value
//! - **attribution** - each group's share of the total
//! - **cross measure correlation** - regression of one measure on another
//! - **clustering** - DBSCAN over standardized measure pairs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prism_core::insights::{InsightContext, InsightEngine};
//!
//! let engine = InsightEngine::new(config.engine.clone());
//! let outcome = engine.compute(&ctx)?;
//! ```

mod aggregate;
mod cluster;
pub mod describe;
pub mod engine;
mod trend;
pub mod types;

pub use describe::{coerce_breakdown_value, describe_correlated, describe_subspace};
pub use engine::{InsightContext, InsightEngine};
pub use trend::{date_ordinal, series_x};
pub use types::{InsightDetail, InsightKind, InsightOutcome, InsightResult, NoRenderReason};
