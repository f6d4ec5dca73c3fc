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

//! Acyclic execution contexts
//!
//! A call stack is reduced to the shortest chain of call sites that reaches
//! the same sequence of distinct functions: once a function has been entered,
//! later recursive re-entries are folded back onto its first occurrence. The
//! resulting chain, terminated by the location of a read, is an AEC.
//!
//! A relative AEC (RAEC) is computed over the part of the stack at and above
//! some base frame, so that the same traversal inside one function gets the
//! same id no matter where that function was called from.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::simulator::{FrameTable, ROOT_FRAME, StackEntry};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::trace;
use travioli_common::{FrameId, Loc};

/// Index into the [`AecTable`]
pub type AecId = usize;

/// Append-only table of interned AEC sequences
#[derive(Debug, Clone, Default)]
pub struct AecTable {
    sequences: Vec<Vec<Loc>>,
    ids: HashMap<Vec<Loc>, AecId>,
}

impl AecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `sequence`, allocating the next id the first time it is seen.
    pub fn intern(&mut self, sequence: Vec<Loc>) -> AecId {
        if let Some(&id) = self.ids.get(&sequence) {
            return id;
        }
        let id = self.sequences.len();
        self.sequences.push(sequence.clone());
        self.ids.insert(sequence, id);
        id
    }

    pub fn sequence(&self, id: AecId) -> Option<&[Loc]> {
        self.sequences.get(id).map(Vec::as_slice)
    }

    /// Locations of an AEC, innermost first
    pub fn expand(&self, id: AecId) -> impl Iterator<Item = Loc> + '_ {
        self.sequence(id).unwrap_or_default().iter().rev().copied()
    }

    /// The traversal point: the location that terminates the AEC
    pub fn top(&self, id: AecId) -> Option<Loc> {
        self.sequence(id).and_then(|seq| seq.last().copied())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Serializes as the list of sequences; the index of each entry is its id.
impl Serialize for AecTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sequences.serialize(serializer)
    }
}

/// Node of the function graph walked by [`compute_aec_seq`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ContextNode {
    Function(Loc),
    Terminal,
}

/// Reduce a stack slice (bottom first) to an acyclic chain of call sites
/// ending at `terminal`.
///
/// Each distinct function is linked to the function it was first called from;
/// the chain is read back from the terminal to the bottom function.
pub fn compute_aec_seq(stack: &[StackEntry], terminal: Loc) -> Vec<Loc> {
    let Some(first) = stack.first() else {
        return vec![terminal];
    };
    let start = ContextNode::Function(first.function);

    let mut predecessors: HashMap<ContextNode, (ContextNode, Loc)> = HashMap::new();
    let mut seen = HashSet::from([start]);
    let mut last = start;
    for entry in &stack[1..] {
        let node = ContextNode::Function(entry.function);
        if seen.insert(node) {
            predecessors.insert(node, (last, entry.call_site));
        }
        last = node;
    }
    predecessors.insert(ContextNode::Terminal, (last, terminal));

    let mut sequence = Vec::new();
    let mut cursor = ContextNode::Terminal;
    while cursor != start {
        match predecessors.get(&cursor) {
            Some(&(prev, call_site)) => {
                sequence.push(call_site);
                cursor = prev;
            }
            None => break,
        }
    }
    sequence.reverse();
    sequence
}

/// Interned AECs plus the RAEC cache and the function each RAEC belongs to
#[derive(Debug, Default)]
pub struct AecEngine {
    table: AecTable,
    raec_cache: HashMap<(FrameId, FrameId, Loc), AecId>,
    raec_functions: HashMap<AecId, Loc>,
}

impl AecEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// RAEC of a read at `loc` in frame `top`, relative to frame `base`.
    ///
    /// `base` must be on the stack `top` was called from. The first analyzed
    /// function to produce an id becomes its owner; RAECs relative to the
    /// root frame do not claim ownership.
    pub fn raec(&mut self, frames: &FrameTable, base: FrameId, top: FrameId, loc: Loc) -> AnalysisResult<AecId> {
        if let Some(&id) = self.raec_cache.get(&(base, top, loc)) {
            return Ok(id);
        }

        let stack = frames.ancestor_stack(top)?;
        let start = stack.iter().position(|entry| entry.frame == base).ok_or(AnalysisError::BaseFrameNotOnStack { base, top })?;
        let function = stack[start].function;
        let id = self.table.intern(compute_aec_seq(&stack[start..], loc));
        trace!("RAEC({}, {}, {}) = {}", base, top, loc, id);

        self.raec_cache.insert((base, top, loc), id);
        if base != ROOT_FRAME {
            self.raec_functions.entry(id).or_insert(function);
        }
        Ok(id)
    }

    /// Analyzed function a RAEC was computed for
    pub fn function_of(&self, raec: AecId) -> Option<Loc> {
        self.raec_functions.get(&raec).copied()
    }

    pub fn table(&self) -> &AecTable {
        &self.table
    }
}
