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

//! Arena of every frame pushed during replay

use crate::errors::{AnalysisError, AnalysisResult};
use std::collections::HashMap;
use travioli_common::{FrameId, Loc};

/// Frame id of the synthetic root frame pushed before replay starts
pub const ROOT_FRAME: FrameId = 0;

/// One level of a reconstructed call stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEntry {
    pub frame: FrameId,
    pub call_site: Loc,
    pub function: Loc,
}

#[derive(Debug, Clone)]
struct FrameRecord {
    entry: StackEntry,
    parent: Option<usize>,
}

/// Frames are never removed: a frame's ancestor stack stays reconstructible
/// after it returns, which RAEC computation of earlier writes relies on.
#[derive(Debug, Clone)]
pub struct FrameTable {
    records: Vec<FrameRecord>,
    by_id: HashMap<FrameId, usize>,
}

impl FrameTable {
    /// Create a table holding only the root frame.
    pub fn new() -> Self {
        let mut table = Self {
            records: Vec::new(),
            by_id: HashMap::new(),
        };
        table.push(ROOT_FRAME, Loc::ROOT, Loc::ROOT, None);
        table
    }

    /// Arena slot of the root frame
    pub fn root(&self) -> usize {
        0
    }

    /// Add a frame called from the frame at arena slot `parent`.
    pub fn push(&mut self, frame: FrameId, call_site: Loc, function: Loc, parent: Option<usize>) -> usize {
        let idx = self.records.len();
        self.records.push(FrameRecord {
            entry: StackEntry { frame, call_site, function },
            parent,
        });
        self.by_id.insert(frame, idx);
        idx
    }

    /// Declared function of a frame
    pub fn function_of(&self, frame: FrameId) -> Option<Loc> {
        self.by_id.get(&frame).map(|&idx| self.records[idx].entry.function)
    }

    /// The call stack as it was when `frame` was pushed, bottom first.
    pub fn ancestor_stack(&self, frame: FrameId) -> AnalysisResult<Vec<StackEntry>> {
        let mut cursor = self.by_id.get(&frame).copied().ok_or(AnalysisError::UnknownFrame(frame))?;
        let mut stack = Vec::new();
        loop {
            let record = &self.records[cursor];
            stack.push(record.entry);
            match record.parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        stack.reverse();
        Ok(stack)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for FrameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestor_stack() {
        let mut table = FrameTable::new();
        let f = table.push(7, Loc::new(1, 10), Loc::new(1, 2), Some(table.root()));
        table.push(8, Loc::new(1, 20), Loc::new(1, 3), Some(f));
        table.push(9, Loc::new(1, 21), Loc::new(1, 4), Some(f));

        let frames: Vec<FrameId> = table.ancestor_stack(9).unwrap().iter().map(|e| e.frame).collect();
        assert_eq!(frames, vec![ROOT_FRAME, 7, 9]);
        assert_eq!(table.function_of(8), Some(Loc::new(1, 3)));
        assert_eq!(table.function_of(ROOT_FRAME), Some(Loc::ROOT));
        assert!(matches!(table.ancestor_stack(42), Err(AnalysisError::UnknownFrame(42))));
    }
}
