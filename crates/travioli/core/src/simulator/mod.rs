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

//! Call-stack simulation with per-frame read and write sets
//!
//! Every Call pushes an activation record and every Return pops one. A frame
//! collects the reads of memory it has not written itself; when it returns,
//! its reads flow into the caller (unless the caller already overwrote the
//! slot) and its live writes become the caller's writes. The popped frame is
//! handed back to the caller of [`CallStackSimulator::step`] for analysis.
//!
//! Slots that will never be read again are dropped from every write set as
//! soon as the look-ahead liveness says so, which keeps the sets small.

pub mod frame;

pub use frame::{FrameTable, ROOT_FRAME, StackEntry};

use crate::errors::{AnalysisError, AnalysisResult};
use crate::liveness::Liveness;
use std::collections::{HashMap, HashSet};
use tracing::trace;
use travioli_common::{FrameId, Loc, Mem, ObjectId, TraceEvent, Val};

/// Frame and location of the most recent write of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastWrite {
    pub frame: FrameId,
    pub loc: Loc,
}

/// A read of a slot that the reading frame had not written
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord {
    /// Frame that performed the read
    pub top: FrameId,
    pub loc: Loc,
    pub mem: Mem,
    pub value: Val,
    /// Global last writer at the time of the read
    pub writer: LastWrite,
}

#[derive(Debug)]
struct ActivationRecord {
    frame: FrameId,
    slot: usize,
    function: Loc,
    reads: Vec<ReadRecord>,
    writes: HashSet<Mem>,
}

impl ActivationRecord {
    fn new(frame: FrameId, slot: usize, function: Loc) -> Self {
        Self {
            frame,
            slot,
            function,
            reads: Vec::new(),
            writes: HashSet::new(),
        }
    }
}

/// A frame that just returned, with the reads of its whole dynamic extent
#[derive(Debug, Clone)]
pub struct Activation {
    pub frame: FrameId,
    pub function: Loc,
    pub reads: Vec<ReadRecord>,
}

pub struct CallStackSimulator {
    liveness: Liveness,
    frames: FrameTable,
    stack: Vec<ActivationRecord>,
    last_writes: HashMap<Mem, LastWrite>,
    roots: HashSet<ObjectId>,
}

impl CallStackSimulator {
    pub fn new(liveness: Liveness) -> Self {
        let frames = FrameTable::new();
        let root = ActivationRecord::new(ROOT_FRAME, frames.root(), Loc::ROOT);
        Self {
            liveness,
            frames,
            stack: vec![root],
            last_writes: HashMap::new(),
            roots: HashSet::from([ROOT_FRAME]),
        }
    }

    /// Replay one event at trace `line`. Returns the popped frame on Return.
    pub fn step(&mut self, line: usize, event: &TraceEvent) -> AnalysisResult<Option<Activation>> {
        match event {
            TraceEvent::Read { loc, owner, offset, value } => {
                self.read(line, Mem::new(*owner, *offset), *loc, value);
                self.roots.insert(*owner);
            }
            TraceEvent::GetField { loc, receiver, owner, offset, value } => {
                self.read(line, Mem::new(*owner, *offset), *loc, value);
                if receiver != owner {
                    self.read(line, Mem::new(*receiver, *offset), *loc, value);
                }
            }
            TraceEvent::Write { loc, owner, offset, .. } => {
                let mem = Mem::new(*owner, *offset).ok_or(AnalysisError::WriteToUndefined { line })?;
                self.write(line, mem, *loc, 0);
                self.roots.insert(*owner);
            }
            TraceEvent::PutField { loc, receiver, owner, offset, .. } => {
                let mem = Mem::new(*owner, *offset).ok_or(AnalysisError::WriteToUndefined { line })?;
                self.write(line, mem, *loc, 0);
                if receiver != owner {
                    match Mem::new(*receiver, *offset) {
                        Some(proxy) => self.write(line, proxy, *loc, 0),
                        None => trace!("Line {}: no receiver slot for write-through", line),
                    }
                }
            }
            TraceEvent::Declare { loc, owner, offset, .. } => {
                let mem = Mem::new(*owner, *offset).ok_or(AnalysisError::WriteToUndefined { line })?;
                if self.stack.len() < 2 {
                    return Err(AnalysisError::MissingParentFrame { line });
                }
                self.write(line, mem, *loc, 1);
            }
            TraceEvent::Call { call_site, callee, frame, .. } => self.call(*frame, *call_site, *callee),
            TraceEvent::Return { .. } => return self.ret(line).map(Some),
        }
        Ok(None)
    }

    fn read(&mut self, line: usize, mem: Option<Mem>, loc: Loc, value: &Val) {
        let Some(mem) = mem else {
            return;
        };
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if !top.writes.contains(&mem) {
            if let Some(&writer) = self.last_writes.get(&mem) {
                top.reads.push(ReadRecord {
                    top: top.frame,
                    loc,
                    mem,
                    value: value.clone(),
                    writer,
                });
            }
        }
        self.collect_if_dead(line, mem);
    }

    /// Write `mem` on behalf of the frame `depth` levels below the top.
    fn write(&mut self, line: usize, mem: Mem, loc: Loc, depth: usize) {
        let Some(idx) = self.stack.len().checked_sub(depth + 1) else {
            return;
        };
        let record = &mut self.stack[idx];
        record.writes.insert(mem);
        self.last_writes.insert(mem, LastWrite { frame: record.frame, loc });
        self.collect_if_dead(line, mem);
    }

    fn collect_if_dead(&mut self, line: usize, mem: Mem) {
        if self.liveness.is_live(mem, line) {
            return;
        }
        for record in &mut self.stack {
            record.writes.remove(&mem);
        }
        self.last_writes.remove(&mem);
    }

    fn call(&mut self, frame: FrameId, call_site: Loc, function: Loc) {
        let parent = self.stack.last().map(|record| record.slot);
        let slot = self.frames.push(frame, call_site, function, parent);
        self.stack.push(ActivationRecord::new(frame, slot, function));
        self.roots.insert(frame);
    }

    fn ret(&mut self, line: usize) -> AnalysisResult<Activation> {
        if self.stack.len() < 2 {
            return Err(AnalysisError::UnbalancedReturn { line });
        }
        let callee = self.stack.pop().ok_or(AnalysisError::UnbalancedReturn { line })?;
        let liveness = &self.liveness;
        let caller = self.stack.last_mut().ok_or(AnalysisError::UnbalancedReturn { line })?;

        caller.reads.extend(callee.reads.iter().filter(|read| !caller.writes.contains(&read.mem)).cloned());
        caller.writes.extend(callee.writes.iter().copied().filter(|&mem| liveness.is_live(mem, line)));
        caller.writes.retain(|&mem| liveness.is_live(mem, line));

        Ok(Activation {
            frame: callee.frame,
            function: callee.function,
            reads: callee.reads,
        })
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn roots(&self) -> &HashSet<ObjectId> {
        &self.roots
    }

    pub fn is_root(&self, object: ObjectId) -> bool {
        self.roots.contains(&object)
    }

    /// Number of frames on the stack, including the root frame
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Reads currently held by the frame on top of the stack
    pub fn pending_reads(&self) -> &[ReadRecord] {
        self.stack.last().map_or(&[], |record| record.reads.as_slice())
    }

    pub fn last_writer(&self, mem: Mem) -> Option<LastWrite> {
        self.last_writes.get(&mem).copied()
    }

    /// Whether the frame on top of the stack has `mem` in its write set
    pub fn has_written(&self, mem: Mem) -> bool {
        self.stack.last().is_some_and(|record| record.writes.contains(&mem))
    }
}
