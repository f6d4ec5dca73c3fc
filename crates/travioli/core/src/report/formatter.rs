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

//! Text rendering of the traversal report

use super::Report;
use std::fmt::Display;
use std::io::{self, Write};
use travioli_common::Loc;

/// Number of provenance AECs listed per traversal point
const PROVENANCE_LIMIT: usize = 5;

/// Join items with `, `, keeping at most `limit` of them followed by `...`.
pub fn truncate_list<T: Display>(items: impl IntoIterator<Item = T>, limit: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i == limit {
            parts.push("...".to_string());
            break;
        }
        parts.push(item.to_string());
    }
    parts.join(", ")
}

pub fn write_report<W: Write>(out: &mut W, report: &Report<'_>) -> io::Result<()> {
    let aecs = &report.output.aecs;
    let provenance = &report.output.provenance;
    let sources = report.sources;

    for (path, info) in &report.infos {
        write!(out, "+ Data structure: {}", path)?;
        if report.annotations.sampled_traversals.contains(path) {
            write!(out, " {{sampled traversal}}")?;
        }
        if report.annotations.sampled_redundancies.contains(path) {
            write!(out, " {{sampled redundancy}}")?;
        }
        writeln!(out)?;

        for (k, (&raec, traversal)) in info.traversals.iter().enumerate() {
            write!(out, "({}) ", k + 1)?;
            if traversal.redundant {
                write!(out, "Redundant ")?;
            }
            writeln!(out, "Traversal point [{}] upto {} times", raec, traversal.max_count)?;
            for loc in aecs.table().expand(raec) {
                writeln!(out, "    - {}", sources.render(loc))?;
            }
            let function = aecs.function_of(raec).unwrap_or(Loc::ROOT);
            writeln!(out, "    # Analyzed Function: {}", sources.render(function))?;
            writeln!(out, "    # Access Graph: ag_{}", function)?;
            writeln!(out, "    # Reached from the following AECs: {}", truncate_list(provenance.reached_from(raec), PROVENANCE_LIMIT))?;
            writeln!(out, "    # Last written at the following AECs: {}", truncate_list(provenance.written_at(raec), PROVENANCE_LIMIT))?;
        }
    }

    let stats = &report.output.stats;
    let summary = &report.summary;
    writeln!(out)?;
    writeln!(
        out,
        "Done! Analyzed {} activations of {} functions.",
        stats.activations_analyzed,
        stats.functions_analyzed.len()
    )?;
    writeln!(
        out,
        "Traversed {} data structures in {} functions, across {} RAECs.",
        summary.traversed_structures.len(),
        summary.traversed_functions.len(),
        summary.traversed_raecs.len()
    )?;
    writeln!(
        out,
        "Redundantly traversed {} data structures in {} functions, across {} RAECs.",
        summary.redundant_structures.len(),
        summary.redundant_functions.len(),
        summary.redundant_raecs.len()
    )?;
    Ok(())
}
