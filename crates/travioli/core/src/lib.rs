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

//! Travioli Core
//!
//! Detects data-structure traversals in a memory read/write trace.
//!
//! The analysis runs in two passes over the trace. The first pass records,
//! for every memory slot, the last line that reads it ([`liveness`]). The
//! second pass replays the events on a simulated call stack ([`simulator`]);
//! each returning frame is classified by the [`traversal`] detector, using
//! acyclic execution contexts ([`aec`]) to identify read sites, and merged into
//! the [`access_graph`] of its function. The [`report`] module renders the
//! results.
//!
//! ```no_run
//! use travioli_core::{AnalysisConfig, Sources, analyze_trace, report::Report};
//! use travioli_common::TraceEvent;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = Sources::from_json("[]", "{}")?;
//! let events: Vec<TraceEvent> = "C,1,2,1,5,900,7\nE,1,9,0,U".lines().map(str::parse).collect::<Result<_, _>>()?;
//! let output = analyze_trace(&events, &sources, AnalysisConfig::default())?;
//! print!("{}", Report::new(&output, &sources).render()?);
//! # Ok(())
//! # }
//! ```

pub mod access_graph;
pub mod aec;
pub mod analyzer;
pub mod config;
pub mod errors;
pub mod liveness;
pub mod report;
pub mod simulator;
pub mod sources;
pub mod traversal;

pub use access_graph::{AccessGraph, AccessGraphs, DataStructureTraversalInfo, TraversalInfos};
pub use aec::{AecEngine, AecId, AecTable};
pub use analyzer::{AnalysisOutput, AnalysisStats, TraceAnalyzer, analyze_trace};
pub use config::AnalysisConfig;
pub use errors::{AnalysisError, AnalysisResult};
pub use liveness::Liveness;
pub use simulator::CallStackSimulator;
pub use sources::{SourceMap, Sources, StringPool};
pub use traversal::{TraversalDetector, TraversalOutcome};
