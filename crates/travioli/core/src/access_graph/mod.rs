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

//! Per-function access graphs
//!
//! An access graph summarizes how a function reaches the objects it reads.
//! Roots are the function's own frame and the global scope; variable slots
//! hang off the roots, and every further dereference is a context node keyed
//! by the RAEC of the read. A root-to-context path therefore names the data
//! structure a traversal walks, e.g. `(lists.js[1:1-9:2]).head`.
//!
//! Graphs persist across activations: nodes are created lazily and merged,
//! and context nodes remember the largest number of times they were reached
//! in one activation.

pub mod node;
pub mod paths;

pub use node::{AccessGraphNode, EdgeLabel, NodeKind, RootOwner};
pub use paths::{ContextTraversalInfo, DataStructureTraversalInfo, TraversalInfos, collect_traversed_data_structures};

use crate::aec::{AecEngine, AecId};
use crate::errors::AnalysisResult;
use crate::simulator::{FrameTable, ReadRecord};
use crate::traversal::TraversalOutcome;
use indexmap::IndexMap;
use petgraph::Directed;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use tracing::trace;
use travioli_common::{FrameId, Loc, ObjectId};

pub type AccessGraphStorage = Graph<AccessGraphNode, EdgeLabel, Directed>;

/// Everything the builder needs to replay one activation's reads
pub struct ActivationInput<'a> {
    pub frames: &'a FrameTable,
    pub roots: &'a HashSet<ObjectId>,
    pub base: FrameId,
    pub reads: &'a [ReadRecord],
    pub outcome: &'a TraversalOutcome,
}

#[derive(Debug, Clone)]
pub struct AccessGraph {
    function: Loc,
    graph: AccessGraphStorage,
    index: HashMap<NodeKind, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl AccessGraph {
    pub fn new(function: Loc) -> Self {
        Self {
            function,
            graph: AccessGraphStorage::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Merge one activation of the function into the graph.
    pub fn record_activation(&mut self, aecs: &mut AecEngine, input: ActivationInput<'_>) -> AnalysisResult<()> {
        let mut last_seen: HashMap<ObjectId, NodeIndex> = HashMap::new();
        let mut occurrences: IndexMap<NodeIndex, usize> = IndexMap::new();

        for read in input.reads {
            let object = read.mem.owner;
            let field = read.mem.offset;
            let raec = aecs.raec(input.frames, input.base, read.top, read.loc)?;

            let (src, dst) = if let Some(&src) = last_seen.get(&object) {
                let dst = self.context_node(raec, input.outcome);
                *occurrences.entry(dst).or_default() += 1;
                (src, dst)
            } else if input.roots.contains(&object) {
                let owner = match input.frames.function_of(object) {
                    Some(func) => RootOwner::Function(func),
                    None => RootOwner::Global,
                };
                let src = match owner {
                    RootOwner::Function(func) => self.node(NodeKind::FunctionRoot(func)),
                    RootOwner::Global => self.node(NodeKind::GlobalRoot),
                };
                (src, self.node(NodeKind::VarSlot { owner, field }))
            } else {
                trace!("Dropping read of {} at {}: source object not reached from a root", read.mem, read.loc);
                continue;
            };

            if let Some(value) = read.value.object_id() {
                last_seen.insert(value, dst);
            }
            self.add_edge(src, dst, EdgeLabel::Field(field));
        }

        for (node, count) in occurrences {
            let weight = &mut self.graph[node];
            weight.max_count = weight.max_count.max(count);
        }
        Ok(())
    }

    fn node(&mut self, kind: NodeKind) -> NodeIndex {
        if let Some(&idx) = self.index.get(&kind) {
            return idx;
        }
        let idx = self.graph.add_node(AccessGraphNode::new(kind));
        self.index.insert(kind, idx);
        if kind.is_root() {
            self.roots.push(idx);
        }
        idx
    }

    fn context_node(&mut self, raec: AecId, outcome: &TraversalOutcome) -> NodeIndex {
        let idx = self.node(NodeKind::Context(raec));
        let weight = &mut self.graph[idx];
        weight.traversed |= outcome.is_traversed(raec);
        weight.redundant |= outcome.is_redundant(raec);
        idx
    }

    fn add_edge(&mut self, src: NodeIndex, dst: NodeIndex, label: EdgeLabel) {
        match self.graph.find_edge(src, dst) {
            Some(edge) => self.graph[edge] = self.graph[edge].merge(label),
            None => {
                self.graph.add_edge(src, dst, label);
            }
        }
    }

    /// Outgoing edges of a node in the order they were first added
    pub fn successors(&self, node: NodeIndex) -> Vec<(NodeIndex, EdgeLabel)> {
        let mut edges: Vec<(NodeIndex, EdgeLabel)> = self.graph.edges(node).map(|edge| (edge.target(), *edge.weight())).collect();
        edges.reverse();
        edges
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &AccessGraphNode)> + '_ {
        self.graph.node_indices().map(move |idx| (idx, &self.graph[idx]))
    }

    pub fn node_weight(&self, idx: NodeIndex) -> Option<&AccessGraphNode> {
        self.graph.node_weight(idx)
    }

    pub fn find(&self, kind: NodeKind) -> Option<NodeIndex> {
        self.index.get(&kind).copied()
    }

    /// Root nodes in creation order
    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    pub fn function(&self) -> Loc {
        self.function
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Access graphs of every analyzed function, in analysis order
#[derive(Debug, Clone, Default)]
pub struct AccessGraphs {
    graphs: IndexMap<Loc, AccessGraph>,
}

impl AccessGraphs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of `function`, created empty on first use
    pub fn graph_mut(&mut self, function: Loc) -> &mut AccessGraph {
        self.graphs.entry(function).or_insert_with(|| AccessGraph::new(function))
    }

    pub fn get(&self, function: Loc) -> Option<&AccessGraph> {
        self.graphs.get(&function)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessGraph> + '_ {
        self.graphs.values()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
