//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_service, JSON output)
//! - `data` - Dataset listing, bundles, subsets and profiles
//! - `insight` - Recompute and narrate one insight
//! - `rank` - Insight-density rankings

pub mod core;
pub mod data;
pub mod insight;
pub mod rank;

// Re-export command functions for main.rs
pub use self::core::*;
pub use data::*;
pub use insight::*;
pub use rank::*;
