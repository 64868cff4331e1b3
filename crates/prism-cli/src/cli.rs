//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Prism - Explain and rank subspace insights
#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Recompute, narrate, and rank insights over subspace datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (holds edge/, insight/, record/, sid_cid/, subspace/)
    ///
    /// Overrides the config file and PRISM_DATA_DIR.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/prism/config/prism.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print single-line JSON instead of pretty JSON
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available datasets
    Datasets,

    /// Dump a dataset's records, insights, edges and subspaces
    Bundle {
        /// Dataset name
        name: String,
    },

    /// Recompute one insight and narrate it
    Insight {
        /// Dataset name
        name: String,

        /// Insight id
        iid: i64,
    },

    /// Records of one subspace
    Subset {
        /// Dataset name
        name: String,

        /// Subspace id
        sid: i64,
    },

    /// Insight-density rankings
    Rank {
        #[command(subcommand)]
        action: RankAction,
    },

    /// Per-column profile of a dataset
    Info {
        /// Dataset name
        name: String,
    },

    /// Attribute value index per feature
    Attributes {
        /// Dataset name
        name: String,
    },

    /// Value shares per feature as pie-slice angles
    Slices {
        /// Dataset name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum RankAction {
    /// Records by number of insights covering them
    Records {
        /// Dataset name
        name: String,
    },

    /// Subspaces by number of catalogued insights
    Subspaces {
        /// Dataset name
        name: String,
    },

    /// Records by number of subspaces containing them
    Memberships {
        /// Dataset name
        name: String,
    },
}
