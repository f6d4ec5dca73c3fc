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

//! Access graph nodes and edge labels

use crate::aec::AecId;
use crate::sources::Sources;
use std::fmt;
use travioli_common::{Loc, Offset};

/// Owner of a variable slot: a function's frame or the global scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootOwner {
    Function(Loc),
    Global,
}

impl fmt::Display for RootOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootOwner::Function(func) => write!(f, "{}", func),
            RootOwner::Global => write!(f, "{}", Loc::ROOT),
        }
    }
}

/// Identity of a node, stable across all activations of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    FunctionRoot(Loc),
    GlobalRoot,
    VarSlot { owner: RootOwner, field: Offset },
    Context(AecId),
}

impl NodeKind {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeKind::FunctionRoot(_) | NodeKind::GlobalRoot)
    }

    /// Text shown inside the node
    pub fn label(&self, sources: &Sources) -> String {
        match self {
            NodeKind::FunctionRoot(func) => func.to_string(),
            NodeKind::GlobalRoot => "global".to_string(),
            NodeKind::VarSlot { owner, field } => format!("{}@{}", sources.strings.resolve(*field), owner),
            NodeKind::Context(aec) => aec.to_string(),
        }
    }

    /// GraphViz node identifier
    pub fn dot_name(&self, sources: &Sources) -> String {
        match self {
            NodeKind::FunctionRoot(_) | NodeKind::VarSlot { .. } => format!("\"{}\"", self.label(sources)),
            NodeKind::GlobalRoot | NodeKind::Context(_) => self.label(sources),
        }
    }

    /// First element of access paths starting at this root
    pub fn path_prefix(&self, sources: &Sources) -> Option<String> {
        match self {
            NodeKind::FunctionRoot(func) => Some(format!("({})", sources.render(*func))),
            NodeKind::GlobalRoot => Some("<global>".to_string()),
            _ => None,
        }
    }
}

/// Field dereferenced along an edge; conflicting fields merge to a wildcard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLabel {
    Field(Offset),
    Wildcard,
}

impl EdgeLabel {
    pub fn merge(self, other: EdgeLabel) -> EdgeLabel {
        if self == other { self } else { EdgeLabel::Wildcard }
    }

    pub fn render(&self, sources: &Sources) -> String {
        match self {
            EdgeLabel::Field(field) => sources.strings.resolve(*field).into_owned(),
            EdgeLabel::Wildcard => "(*)".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessGraphNode {
    pub kind: NodeKind,
    /// Most occurrences of this context within a single activation
    pub max_count: usize,
    pub traversed: bool,
    pub redundant: bool,
}

impl AccessGraphNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            max_count: 0,
            traversed: false,
            redundant: false,
        }
    }

    pub fn is_traversed_context(&self) -> bool {
        matches!(self.kind, NodeKind::Context(_)) && self.traversed
    }
}
