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

//! Root-to-traversal path collection

use super::{AccessGraph, NodeKind};
use crate::aec::AecId;
use crate::sources::Sources;
use indexmap::{IndexMap, IndexSet};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use travioli_common::Loc;

/// Aggregated view of one traversal point of a data structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextTraversalInfo {
    pub redundant: bool,
    pub max_count: usize,
}

impl Default for ContextTraversalInfo {
    fn default() -> Self {
        Self {
            redundant: false,
            max_count: 1,
        }
    }
}

/// Functions traversing a data structure and the points where they do so
#[derive(Debug, Clone, Default)]
pub struct DataStructureTraversalInfo {
    pub functions: IndexSet<Loc>,
    pub traversals: IndexMap<AecId, ContextTraversalInfo>,
}

impl DataStructureTraversalInfo {
    fn add_context(&mut self, aec: AecId, redundant: bool, max_count: usize) {
        let info = self.traversals.entry(aec).or_default();
        info.redundant |= redundant;
        info.max_count = info.max_count.max(max_count);
    }
}

/// Traversal infos keyed by access path, in discovery order
pub type TraversalInfos = IndexMap<String, DataStructureTraversalInfo>;

/// Depth-first walker that never revisits a node already on the current path
struct PathWalker<'g> {
    graph: &'g AccessGraph,
    marked: HashSet<NodeIndex>,
}

impl<'g> PathWalker<'g> {
    fn new(graph: &'g AccessGraph) -> Self {
        Self {
            graph,
            marked: HashSet::new(),
        }
    }

    /// Run `f` with `node` marked, or do nothing if it is already marked.
    fn with_marked<R>(&mut self, node: NodeIndex, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if !self.marked.insert(node) {
            return None;
        }
        let result = f(self);
        self.marked.remove(&node);
        Some(result)
    }

    fn walk_paths(&mut self, node: NodeIndex, path: &mut Vec<String>, sources: &Sources, infos: &mut TraversalInfos) {
        self.with_marked(node, |walker| {
            for (dst, label) in walker.graph.successors(node) {
                let traversed = walker.graph.node_weight(dst).is_some_and(|n| n.is_traversed_context());
                if traversed {
                    let info = infos.entry(path.join(".")).or_default();
                    info.functions.insert(walker.graph.function());
                    walker.collect_contexts(dst, info);
                } else {
                    path.push(label.render(sources));
                    walker.walk_paths(dst, path, sources, infos);
                    path.pop();
                }
            }
        });
    }

    fn collect_contexts(&mut self, node: NodeIndex, info: &mut DataStructureTraversalInfo) {
        self.with_marked(node, |walker| {
            if let Some(weight) = walker.graph.node_weight(node) {
                if let NodeKind::Context(aec) = weight.kind {
                    if weight.traversed {
                        info.add_context(aec, weight.redundant, weight.max_count);
                    }
                }
            }
            for (dst, _) in walker.graph.successors(node) {
                walker.collect_contexts(dst, info);
            }
        });
    }
}

/// Add the data structures traversed in `graph` to `infos`.
pub fn collect_traversed_data_structures(graph: &AccessGraph, sources: &Sources, infos: &mut TraversalInfos) {
    let mut walker = PathWalker::new(graph);
    for &root in graph.roots() {
        let Some(prefix) = graph.node_weight(root).and_then(|n| n.kind.path_prefix(sources)) else {
            continue;
        };
        let mut path = vec![prefix];
        walker.walk_paths(root, &mut path, sources, infos);
    }
}
