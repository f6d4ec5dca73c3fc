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

//! Trace replay driver

use crate::access_graph::{AccessGraphs, ActivationInput, TraversalInfos, collect_traversed_data_structures};
use crate::aec::AecEngine;
use crate::config::AnalysisConfig;
use crate::errors::AnalysisResult;
use crate::liveness::Liveness;
use crate::simulator::{Activation, CallStackSimulator};
use crate::sources::Sources;
use crate::traversal::{Provenance, TraversalDetector};
use indexmap::IndexSet;
use tracing::{debug, info, trace};
use travioli_common::{Loc, TraceEvent};

/// Progress is logged every this many trace lines
const PROGRESS_INTERVAL: usize = 100_000;

#[derive(Debug, Clone, Default)]
pub struct AnalysisStats {
    pub lines_replayed: usize,
    pub activations_analyzed: usize,
    pub activations_excluded: usize,
    pub functions_analyzed: IndexSet<Loc>,
}

/// Result of replaying a whole trace
#[derive(Debug)]
pub struct AnalysisOutput {
    pub aecs: AecEngine,
    pub graphs: AccessGraphs,
    pub provenance: Provenance,
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// Walk every access graph and group traversal points by data structure.
    pub fn traversal_infos(&self, sources: &Sources) -> TraversalInfos {
        let mut infos = TraversalInfos::new();
        for graph in self.graphs.iter() {
            collect_traversed_data_structures(graph, sources, &mut infos);
        }
        infos
    }
}

/// Second pass of the analysis: replays events and analyzes every returning frame
pub struct TraceAnalyzer<'a> {
    config: AnalysisConfig,
    sources: &'a Sources,
    simulator: CallStackSimulator,
    aecs: AecEngine,
    detector: TraversalDetector,
    graphs: AccessGraphs,
    stats: AnalysisStats,
}

impl<'a> TraceAnalyzer<'a> {
    pub fn new(config: AnalysisConfig, sources: &'a Sources, liveness: Liveness) -> Self {
        let detector = TraversalDetector::new(config.connectivity_scan_limit);
        Self {
            config,
            sources,
            simulator: CallStackSimulator::new(liveness),
            aecs: AecEngine::new(),
            detector,
            graphs: AccessGraphs::new(),
            stats: AnalysisStats::default(),
        }
    }

    /// Replay the event found at 1-based trace `line`.
    pub fn process(&mut self, line: usize, event: &TraceEvent) -> AnalysisResult<()> {
        self.stats.lines_replayed += 1;
        if line % PROGRESS_INTERVAL == 0 {
            debug!("Replayed {} trace lines, stack depth {}", line, self.simulator.depth());
        }
        match self.simulator.step(line, event)? {
            Some(activation) => self.analyze(activation),
            None => Ok(()),
        }
    }

    fn analyze(&mut self, activation: Activation) -> AnalysisResult<()> {
        if self.is_excluded(activation.function) {
            trace!("Skipping activation of excluded function {}", activation.function);
            self.stats.activations_excluded += 1;
            return Ok(());
        }

        let frames = self.simulator.frames();
        let roots = self.simulator.roots();
        let outcome = self.detector.detect(&mut self.aecs, frames, roots, activation.frame, &activation.reads)?;
        let input = ActivationInput {
            frames,
            roots,
            base: activation.frame,
            reads: &activation.reads,
            outcome: &outcome,
        };
        self.graphs.graph_mut(activation.function).record_activation(&mut self.aecs, input)?;

        self.stats.activations_analyzed += 1;
        self.stats.functions_analyzed.insert(activation.function);
        Ok(())
    }

    /// Whether a function is declared in an excluded file
    pub fn is_excluded(&self, function: Loc) -> bool {
        self.sources.source_map.file_name(function.sid()).is_some_and(|path| self.config.is_excluded_path(path))
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    pub fn finish(self) -> AnalysisOutput {
        info!(
            "Analyzed {} activations of {} functions ({} excluded), {} AECs interned",
            self.stats.activations_analyzed,
            self.stats.functions_analyzed.len(),
            self.stats.activations_excluded,
            self.aecs.table().len()
        );
        AnalysisOutput {
            aecs: self.aecs,
            graphs: self.graphs,
            provenance: self.detector.into_provenance(),
            stats: self.stats,
        }
    }
}

/// Run both passes over an in-memory trace whose events sit on lines 1, 2, ...
pub fn analyze_trace(events: &[TraceEvent], sources: &Sources, config: AnalysisConfig) -> AnalysisResult<AnalysisOutput> {
    let liveness = Liveness::from_events(events.iter().enumerate().map(|(i, event)| (i + 1, event)));
    info!("Liveness computed for {} memory slots", liveness.len());

    let mut analyzer = TraceAnalyzer::new(config, sources, liveness);
    for (i, event) in events.iter().enumerate() {
        analyzer.process(i + 1, event)?;
    }
    Ok(analyzer.finish())
}
