// Travioli
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Travioli CLI Tool
//!
//! Main entry point for the traversal analysis command-line interface.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use travioli_tools::cli::analyze::{AnalyzeArgs, run_analysis};

#[derive(Parser)]
#[command(name = "travioli")]
#[command(about = "Travioli - Data Structure Traversal Analysis")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a recorded memory trace
    Analyze(AnalyzeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            let level = if args.verbose { Level::DEBUG } else { Level::INFO };
            tracing_subscriber::fmt().with_max_level(level).init();

            let summary = run_analysis(&args)?;
            println!(
                "Analyzed {} activations of {} functions",
                summary.stats.activations_analyzed,
                summary.stats.functions_analyzed.len()
            );
            println!("Report written to {}", summary.report_path.display());
        }
    }

    Ok(())
}
