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

//! Traversal report and access graph rendering
//!
//! The report lists every data structure found traversed, keyed by its
//! access path, followed by each traversal point with its expanded context,
//! the function it was analyzed in and where the values it read came from.
//! A three line summary closes the report.

pub mod dot;
pub mod formatter;

pub use dot::{dot_file_name, write_access_graph};
pub use formatter::{truncate_list, write_report};

use crate::aec::{AecEngine, AecId};
use crate::analyzer::AnalysisOutput;
use crate::access_graph::TraversalInfos;
use crate::sources::Sources;
use indexmap::IndexSet;
use std::collections::HashSet;
use travioli_common::Loc;

/// Totals over all traversal infos
#[derive(Debug, Clone, Default)]
pub struct TraversalSummary {
    pub traversed_structures: IndexSet<String>,
    pub traversed_functions: IndexSet<Loc>,
    pub traversed_raecs: IndexSet<AecId>,
    pub redundant_structures: IndexSet<String>,
    pub redundant_functions: IndexSet<Loc>,
    pub redundant_raecs: IndexSet<AecId>,
}

impl TraversalSummary {
    pub fn collect(infos: &TraversalInfos, aecs: &AecEngine) -> Self {
        let mut summary = Self::default();
        for (path, info) in infos {
            for (&raec, traversal) in &info.traversals {
                let function = aecs.function_of(raec);
                summary.traversed_structures.insert(path.clone());
                summary.traversed_raecs.insert(raec);
                summary.traversed_functions.extend(function);
                if traversal.redundant {
                    summary.redundant_structures.insert(path.clone());
                    summary.redundant_raecs.insert(raec);
                    summary.redundant_functions.extend(function);
                }
            }
        }
        summary
    }
}

/// Data structures picked for manual review
#[derive(Debug, Clone, Default)]
pub struct ReportAnnotations {
    pub sampled_traversals: HashSet<String>,
    pub sampled_redundancies: HashSet<String>,
}

/// Everything rendered into the traversal report
pub struct Report<'a> {
    pub output: &'a AnalysisOutput,
    pub sources: &'a Sources,
    pub infos: TraversalInfos,
    pub summary: TraversalSummary,
    pub annotations: ReportAnnotations,
}

impl<'a> Report<'a> {
    pub fn new(output: &'a AnalysisOutput, sources: &'a Sources) -> Self {
        let infos = output.traversal_infos(sources);
        let summary = TraversalSummary::collect(&infos, &output.aecs);
        Self {
            output,
            sources,
            infos,
            summary,
            annotations: ReportAnnotations::default(),
        }
    }

    pub fn with_annotations(mut self, annotations: ReportAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        write_report(out, self)
    }

    /// The rendered report as a string
    pub fn render(&self) -> std::io::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
