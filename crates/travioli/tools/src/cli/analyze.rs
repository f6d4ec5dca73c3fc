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

//! Analyze command: replay a trace directory and write the results

use crate::io::{TraceReader, load_sources, write_file};
use crate::sampling::sample_annotations;
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use travioli_core::report::{Report, dot_file_name, write_access_graph};
use travioli_core::{AnalysisConfig, AnalysisStats, Liveness, TraceAnalyzer};

/// Arguments for the analyze command
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory holding the trace files; outputs are written here too
    #[arg(long, default_value = ".travioli")]
    pub dir: PathBuf,

    /// Trace file name
    #[arg(long, default_value = "trace.csv")]
    pub trace_csv: PathBuf,

    /// String pool file name
    #[arg(long, default_value = "strings.json")]
    pub strings_json: PathBuf,

    /// Source map file name
    #[arg(long, default_value = "smap.json")]
    pub smap_json: PathBuf,

    /// AEC table output file name
    #[arg(long, default_value = "aec.json")]
    pub aec_json: PathBuf,

    /// Report output file name
    #[arg(long, default_value = "traversals.out")]
    pub out: PathBuf,

    /// Number of data structures to annotate for manual review
    #[arg(long, default_value = "10")]
    pub samples: usize,

    /// Additional path markers whose functions are not analyzed
    #[arg(long = "exclude", value_name = "MARKER")]
    pub exclude: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".travioli"),
            trace_csv: PathBuf::from("trace.csv"),
            strings_json: PathBuf::from("strings.json"),
            smap_json: PathBuf::from("smap.json"),
            aec_json: PathBuf::from("aec.json"),
            out: PathBuf::from("traversals.out"),
            samples: 10,
            exclude: Vec::new(),
            verbose: false,
        }
    }
}

impl AnalyzeArgs {
    fn config(&self) -> AnalysisConfig {
        let config = AnalysisConfig::new();
        if self.exclude.is_empty() {
            return config;
        }
        let markers: Vec<String> = config.excluded_path_markers.iter().cloned().chain(self.exclude.iter().cloned()).collect();
        config.with_excluded_path_markers(markers)
    }
}

/// What a finished analysis wrote
#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    pub stats: AnalysisStats,
    pub report_path: PathBuf,
    pub aec_path: PathBuf,
    pub dot_paths: Vec<PathBuf>,
}

/// Execute the analyze command
pub fn run_analysis(args: &AnalyzeArgs) -> Result<AnalysisSummary> {
    check_dir(args)?;
    let started = Instant::now();
    let trace_path = args.dir.join(&args.trace_csv);
    let sources = load_sources(&args.dir.join(&args.strings_json), &args.dir.join(&args.smap_json))?;
    info!("Loaded {} strings from {}", sources.strings.len(), args.dir.display());

    let mut liveness = Liveness::new();
    for row in TraceReader::open(&trace_path)? {
        let (line, event) = row?;
        liveness.observe(line, &event);
    }
    info!("Liveness computed for {} memory slots in {:?}", liveness.len(), started.elapsed());

    let mut analyzer = TraceAnalyzer::new(args.config(), &sources, liveness);
    for row in TraceReader::open(&trace_path)? {
        let (line, event) = row?;
        analyzer.process(line, &event).with_context(|| format!("analysis failed at {}:{}", trace_path.display(), line))?;
    }
    let output = analyzer.finish();
    info!("Replayed {} trace lines in {:?}", output.stats.lines_replayed, started.elapsed());

    let aec_path = args.dir.join(&args.aec_json);
    write_file(&aec_path, |out| serde_json::to_writer(&mut *out, output.aecs.table()).map_err(std::io::Error::from))?;
    debug!("Wrote {} AECs to {}", output.aecs.table().len(), aec_path.display());

    let mut dot_paths = Vec::with_capacity(output.graphs.len());
    for graph in output.graphs.iter() {
        let path = args.dir.join(dot_file_name(graph.function()));
        write_file(&path, |out| write_access_graph(out, graph, &sources))?;
        dot_paths.push(path);
    }
    debug!("Wrote {} access graphs", dot_paths.len());

    let report = Report::new(&output, &sources);
    let annotations = sample_annotations(&report.summary, args.samples);
    let report = report.with_annotations(annotations);
    let report_path = args.dir.join(&args.out);
    write_file(&report_path, |out| report.write_to(out))?;
    info!(
        "Traversed {} data structures, {} redundantly; report written to {}",
        report.summary.traversed_structures.len(),
        report.summary.redundant_structures.len(),
        report_path.display()
    );

    Ok(AnalysisSummary {
        stats: output.stats.clone(),
        report_path,
        aec_path,
        dot_paths,
    })
}

/// Make sure the trace directory exists before anything is read from it.
pub fn check_dir(args: &AnalyzeArgs) -> Result<()> {
    let meta = fs::metadata(&args.dir).with_context(|| format!("trace directory {} not found", args.dir.display()))?;
    anyhow::ensure!(meta.is_dir(), "{} is not a directory", args.dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_exclusions_extend_defaults() {
        let args = AnalyzeArgs {
            exclude: vec!["vendor/".to_string()],
            ..Default::default()
        };
        let config = args.config();
        assert!(config.is_excluded_path("a/node_modules/b.js"));
        assert!(config.is_excluded_path("vendor/x.js"));
        assert!(!config.is_excluded_path("src/x.js"));
    }

    #[test]
    fn test_missing_dir() {
        let args = AnalyzeArgs {
            dir: PathBuf::from("/nonexistent/travioli"),
            ..Default::default()
        };
        assert!(check_dir(&args).is_err());
    }
}
