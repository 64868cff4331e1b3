//! Prism CLI - Subspace insight statistics
//!
//! Usage:
//!   prism datasets                     List datasets
//!   prism insight carSales1 12         Recompute and narrate insight 12
//!   prism rank subspaces carSales1     Rank subspaces by insight count
//!   prism info carSales1               Profile dataset columns

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::Output;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(io::stderr))
        .init();

    let service = commands::open_service(cli.data_dir.as_deref(), cli.config.as_deref())?;
    let output = Output::new(cli.compact);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Datasets => commands::cmd_datasets(&service, &output, &mut out),
        Commands::Bundle { name } => commands::cmd_bundle(&service, &name, &output, &mut out),
        Commands::Insight { name, iid } => {
            commands::cmd_insight(&service, &name, iid, &output, &mut out)
        }
        Commands::Subset { name, sid } => {
            commands::cmd_subset(&service, &name, sid, &output, &mut out)
        }
        Commands::Rank { action } => match action {
            RankAction::Records { name } => {
                commands::cmd_rank_records(&service, &name, &output, &mut out)
            }
            RankAction::Subspaces { name } => {
                commands::cmd_rank_subspaces(&service, &name, &output, &mut out)
            }
            RankAction::Memberships { name } => {
                commands::cmd_rank_memberships(&service, &name, &output, &mut out)
            }
        },
        Commands::Info { name } => commands::cmd_info(&service, &name, &output, &mut out),
        Commands::Attributes { name } => {
            commands::cmd_attributes(&service, &name, &output, &mut out)
        }
        Commands::Slices { name } => commands::cmd_slices(&service, &name, &output, &mut out),
    }
}
