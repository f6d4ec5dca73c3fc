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

//! GraphViz dumps of access graphs

use crate::access_graph::AccessGraph;
use crate::sources::Sources;
use std::io::{self, Write};
use travioli_common::Loc;

/// File name of the DOT dump for `function`
pub fn dot_file_name(function: Loc) -> String {
    format!("ag_{}.dot", function)
}

/// Write `graph` in DOT format. Redundant contexts are drawn black,
/// traversed contexts grey.
pub fn write_access_graph<W: Write>(out: &mut W, graph: &AccessGraph, sources: &Sources) -> io::Result<()> {
    writeln!(out, "digraph access_graph {{")?;
    writeln!(out, "rankdir=\"LR\"")?;
    writeln!(out, "node [style=\"filled\"]")?;

    for (idx, node) in graph.nodes() {
        let (fill, font) = if node.redundant {
            ("black", "white")
        } else if node.traversed {
            ("grey", "black")
        } else {
            ("white", "black")
        };
        let name = node.kind.dot_name(sources);
        writeln!(out, "{} [fillcolor=\"{}\", fontcolor=\"{}\", label = \"{}\"]", name, fill, font, node.kind.label(sources))?;

        for (dst, label) in graph.successors(idx) {
            let Some(dst) = graph.node_weight(dst) else {
                continue;
            };
            writeln!(out, "{} -> {} [label = \"{}\"]", name, dst.kind.dot_name(sources), label.render(sources))?;
        }
    }

    writeln!(out, "}}")
}
