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

//! Traversal and redundancy detection over one activation's reads
//!
//! Every read becomes an edge `src --field--> dst` labeled with its RAEC
//! relative to the analyzed frame. Edges out of root objects (frames and
//! globals) are variable reads and are never traversals. The remaining heap
//! edges are grouped by RAEC: a group is a traversal when it dereferences two
//! different slots of objects that are reachable from one another, and a
//! redundant traversal when the walk starts over from the same slot and
//! replays a prefix of its longest run.

use crate::aec::{AecEngine, AecId};
use crate::errors::AnalysisResult;
use crate::simulator::{FrameTable, ROOT_FRAME, ReadRecord};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;
use travioli_common::{FrameId, ObjectId, Offset, Val};

/// A read viewed as an edge of the heap graph
#[derive(Debug, Clone, Copy)]
pub struct ReadEdge<'a> {
    pub src: ObjectId,
    pub field: Offset,
    pub raec: AecId,
    pub value: &'a Val,
    /// Object read, or 0 for non-object values
    pub dst: ObjectId,
}

impl<'a> ReadEdge<'a> {
    pub fn new(src: ObjectId, field: Offset, raec: AecId, value: &'a Val) -> Self {
        let dst = match value {
            Val::Object(id) => *id,
            _ => 0,
        };
        Self { src, field, raec, value, dst }
    }

    fn slot(&self) -> (ObjectId, Offset) {
        (self.src, self.field)
    }
}

/// Approximate reachability between objects seen in one activation.
///
/// Only sound for acyclic object graphs.
#[derive(Debug, Default)]
pub struct Ancestry {
    ancestors: HashMap<ObjectId, HashSet<ObjectId>>,
}

impl Ancestry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for an edge `src -> dst`.
    pub fn record(&mut self, src: ObjectId, dst: ObjectId) {
        if dst <= 0 {
            return;
        }
        let inherited = self.ancestors.get(&src).cloned().unwrap_or_else(|| HashSet::from([src]));
        let entry = self.ancestors.entry(dst).or_default();
        entry.extend(inherited);
        entry.insert(dst);
    }

    /// Whether either object is an ancestor of the other
    pub fn related(&self, a: ObjectId, b: ObjectId) -> bool {
        self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    fn is_ancestor(&self, ancestor: ObjectId, of: ObjectId) -> bool {
        self.ancestors.get(&of).is_some_and(|set| set.contains(&ancestor))
    }
}

/// Whether a RAEC group dereferences related but distinct slots.
///
/// Only edges up to index `scan_limit` are inspected.
pub fn is_connected(edges: &[ReadEdge<'_>], ancestry: &Ancestry, scan_limit: usize) -> bool {
    for (i, e1) in edges.iter().enumerate() {
        if i > scan_limit {
            return false;
        }
        for e2 in &edges[..i] {
            if e1.slot() != e2.slot() && ancestry.related(e1.src, e2.src) {
                return true;
            }
        }
    }
    false
}

/// Whether a traversed group walks the same chain repeatedly.
pub fn is_redundant(edges: &[ReadEdge<'_>]) -> bool {
    let Some(first) = edges.first() else {
        return false;
    };
    let first_slot = first.slot();

    let mut runs: Vec<Vec<(ObjectId, Offset)>> = Vec::new();
    let mut fields_differ = false;
    for edge in edges {
        fields_differ |= edge.field != first.field;
        if edge.slot() == first_slot {
            runs.push(Vec::new());
        }
        if let Some(run) = runs.last_mut() {
            run.push(edge.slot());
        }
    }
    runs.sort_by(|a, b| b.len().cmp(&a.len()));

    let (min_runs, min_long_runs) = if fields_differ { (2, 1) } else { (3, 2) };
    if runs.len() < min_runs || runs[..min_long_runs].iter().any(|run| run.len() < 2) {
        return false;
    }
    let longest = &runs[0];
    runs[1..].iter().all(|run| longest.starts_with(run))
}

/// Where traversed values were read from and written at, as root-relative AECs
#[derive(Debug, Default)]
pub struct Provenance {
    reads: HashMap<AecId, BTreeSet<AecId>>,
    writes: HashMap<AecId, BTreeSet<AecId>>,
}

impl Provenance {
    /// AECs of the reads that produced a RAEC, ascending
    pub fn reached_from(&self, raec: AecId) -> impl Iterator<Item = AecId> + '_ {
        self.reads.get(&raec).into_iter().flatten().copied()
    }

    /// AECs of the writes whose values a RAEC read, ascending
    pub fn written_at(&self, raec: AecId) -> impl Iterator<Item = AecId> + '_ {
        self.writes.get(&raec).into_iter().flatten().copied()
    }
}

/// RAECs of one activation classified as traversals
#[derive(Debug, Default, Clone)]
pub struct TraversalOutcome {
    pub traversed: IndexSet<AecId>,
    pub redundant: IndexSet<AecId>,
}

impl TraversalOutcome {
    pub fn is_traversed(&self, raec: AecId) -> bool {
        self.traversed.contains(&raec)
    }

    pub fn is_redundant(&self, raec: AecId) -> bool {
        self.redundant.contains(&raec)
    }
}

#[derive(Debug)]
pub struct TraversalDetector {
    scan_limit: usize,
    provenance: Provenance,
}

impl TraversalDetector {
    pub fn new(scan_limit: usize) -> Self {
        Self {
            scan_limit,
            provenance: Provenance::default(),
        }
    }

    /// Classify the RAECs of the reads aggregated by frame `base`.
    pub fn detect(&mut self, aecs: &mut AecEngine, frames: &FrameTable, roots: &HashSet<ObjectId>, base: FrameId, reads: &[ReadRecord]) -> AnalysisResult<TraversalOutcome> {
        let mut ancestry = Ancestry::new();
        let mut groups: IndexMap<AecId, Vec<ReadEdge<'_>>> = IndexMap::new();

        for read in reads {
            let raec = aecs.raec(frames, base, read.top, read.loc)?;
            let edge = ReadEdge::new(read.mem.owner, read.mem.offset, raec, &read.value);
            ancestry.record(edge.src, edge.dst);
            if !roots.contains(&edge.src) {
                groups.entry(raec).or_default().push(edge);
            }

            let read_aec = aecs.raec(frames, ROOT_FRAME, read.top, read.loc)?;
            let write_aec = aecs.raec(frames, ROOT_FRAME, read.writer.frame, read.writer.loc)?;
            self.provenance.reads.entry(raec).or_default().insert(read_aec);
            self.provenance.writes.entry(raec).or_default().insert(write_aec);
        }

        let mut outcome = TraversalOutcome::default();
        for (raec, edges) in &groups {
            if edges.len() < 2 || !is_connected(edges, &ancestry, self.scan_limit) {
                continue;
            }
            outcome.traversed.insert(*raec);
            if is_redundant(edges) {
                outcome.redundant.insert(*raec);
            }
        }

        debug!(
            "Frame {}: {} reads, {} heap groups, {} traversed, {} redundant",
            base,
            reads.len(),
            groups.len(),
            outcome.traversed.len(),
            outcome.redundant.len()
        );
        Ok(outcome)
    }

    pub fn into_provenance(self) -> Provenance {
        self.provenance
    }
}
