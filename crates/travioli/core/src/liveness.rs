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

//! Look-ahead liveness of memory slots

use std::collections::HashMap;
use travioli_common::{Mem, TraceEvent};

/// For every memory slot, the last trace line that reads it.
///
/// Built by a first pass over the whole trace. A slot is live at line `n`
/// if it is read again after `n`.
#[derive(Debug, Clone, Default)]
pub struct Liveness {
    last_reads: HashMap<Mem, usize>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reads of one event at 1-based trace `line`.
    pub fn observe(&mut self, line: usize, event: &TraceEvent) {
        for mem in event.read_slots() {
            self.last_reads.insert(mem, line);
        }
    }

    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a TraceEvent)>,
    {
        let mut liveness = Self::new();
        for (line, event) in events {
            liveness.observe(line, event);
        }
        liveness
    }

    pub fn is_live(&self, mem: Mem, line: usize) -> bool {
        self.last_reads.get(&mem).is_some_and(|&last| last > line)
    }

    pub fn last_read(&self, mem: Mem) -> Option<usize> {
        self.last_reads.get(&mem).copied()
    }

    pub fn len(&self) -> usize {
        self.last_reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_reads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(row: &str) -> TraceEvent {
        TraceEvent::parse_row(row).unwrap()
    }

    #[test]
    fn test_last_read_wins() {
        let trace = [event("W,1,1,5,-1,3,P"), event("R,1,2,5,-1,3,P"), event("R,1,3,5,-1,3,P"), event("W,1,4,5,-1,4,P")];
        let liveness = Liveness::from_events(trace.iter().enumerate().map(|(i, e)| (i + 1, e)));
        let mem = Mem { owner: 5, offset: -1 };

        assert_eq!(liveness.last_read(mem), Some(3));
        assert!(liveness.is_live(mem, 1));
        assert!(liveness.is_live(mem, 2));
        assert!(!liveness.is_live(mem, 3));
        assert!(!liveness.is_live(mem, 4));
    }

    #[test]
    fn test_proxy_read_of_receiver() {
        let trace = [event("G,1,2,8,9,-2,1,P")];
        let liveness = Liveness::from_events(trace.iter().enumerate().map(|(i, e)| (i + 1, e)));
        assert_eq!(liveness.last_read(Mem { owner: 9, offset: -2 }), Some(1));
        assert_eq!(liveness.last_read(Mem { owner: 8, offset: -2 }), Some(1));
    }

    #[test]
    fn test_never_read_is_dead() {
        let liveness = Liveness::new();
        assert!(!liveness.is_live(Mem { owner: 1, offset: 1 }, 0));
        assert!(liveness.is_empty());
    }
}
