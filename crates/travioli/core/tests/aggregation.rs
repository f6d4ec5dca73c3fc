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

//! Read-set aggregation across nested returns

mod common;

use common::*;
use travioli_common::Mem;
use travioli_core::simulator::Activation;
use travioli_core::{CallStackSimulator, Liveness};

fn replay(trace: &TraceBuilder) -> Vec<Activation> {
    let events = trace.events();
    let liveness = Liveness::from_events(events.iter().enumerate().map(|(i, e)| (i + 1, e)));
    let mut simulator = CallStackSimulator::new(liveness);
    let mut activations = Vec::new();
    for (i, event) in events.iter().enumerate() {
        if let Some(activation) = simulator.step(i + 1, event).unwrap() {
            activations.push(activation);
        }
    }
    activations
}

fn mems(activation: &Activation) -> Vec<Mem> {
    activation.reads.iter().map(|r| r.mem).collect()
}

const A: Mem = Mem { owner: 101, offset: VAL };
const B: Mem = Mem { owner: 102, offset: VAL };

#[test]
fn test_reads_bubble_up_to_every_ancestor() {
    let mut trace = TraceBuilder::new();
    trace.put_field(loc(1), 101, VAL, obj(5)).put_field(loc(1), 102, VAL, obj(6));
    trace.call(loc(10), loc(30), 7);
    trace.call(loc(11), loc(40), 8);
    trace.get_field(loc(41), 102, VAL, obj(6));
    trace.call(loc(12), loc(50), 9);
    trace.get_field(loc(51), 101, VAL, obj(5));
    trace.ret(loc(59)).ret(loc(49)).ret(loc(39));
    trace.get_field(loc(60), 101, VAL, obj(5)).get_field(loc(60), 102, VAL, obj(6));

    let activations = replay(&trace);
    let frames: Vec<_> = activations.iter().map(|a| a.frame).collect();
    assert_eq!(frames, vec![9, 8, 7]);
    assert_eq!(mems(&activations[0]), vec![A]);
    assert_eq!(mems(&activations[1]), vec![B, A]);
    assert_eq!(mems(&activations[2]), vec![B, A]);

    // reads keep the frame that performed them
    let tops: Vec<_> = activations[2].reads.iter().map(|r| r.top).collect();
    assert_eq!(tops, vec![8, 9]);
}

#[test]
fn test_caller_writes_mask_callee_reads() {
    let mut trace = TraceBuilder::new();
    trace.put_field(loc(1), 101, VAL, obj(5)).put_field(loc(1), 102, VAL, obj(6));
    trace.call(loc(10), loc(30), 7);
    trace.put_field(loc(31), 101, VAL, obj(7));
    trace.call(loc(11), loc(40), 8);
    trace.get_field(loc(41), 101, VAL, obj(7)).get_field(loc(41), 102, VAL, obj(6));
    trace.ret(loc(49)).ret(loc(39));
    trace.get_field(loc(60), 101, VAL, obj(7)).get_field(loc(60), 102, VAL, obj(6));

    let activations = replay(&trace);
    assert_eq!(mems(&activations[0]), vec![A, B]);
    assert_eq!(mems(&activations[1]), vec![B]);
    assert_eq!(activations[0].reads[0].writer.frame, 7);
}

#[test]
fn test_callee_writes_mask_later_caller_reads() {
    let mut trace = TraceBuilder::new();
    trace.put_field(loc(1), 101, VAL, obj(5));
    trace.call(loc(10), loc(30), 7);
    trace.call(loc(11), loc(40), 8);
    trace.put_field(loc(41), 101, VAL, obj(9));
    trace.ret(loc(49));
    trace.get_field(loc(31), 101, VAL, obj(9));
    trace.ret(loc(39));
    trace.get_field(loc(60), 101, VAL, obj(9));

    let activations = replay(&trace);
    assert!(activations[0].reads.is_empty());
    // frame 7 inherited frame 8's live write, so its own read is not recorded
    assert!(activations[1].reads.is_empty());
}

#[test]
fn test_write_through_receiver_is_seen_by_callee() {
    const PROTO: Mem = Mem { owner: 200, offset: VAL };
    let mut trace = TraceBuilder::new();
    trace.put_field_through(loc(1), 101, 200, VAL, obj(5));
    trace.call(loc(10), loc(30), 7);
    trace.get_field(loc(31), 101, VAL, obj(5));
    trace.read(loc(32), 200, VAL, obj(5));
    trace.ret(loc(39));

    let activations = replay(&trace);
    assert_eq!(mems(&activations[0]), vec![A, PROTO]);
    for read in &activations[0].reads {
        assert_eq!(read.writer.frame, 0);
        assert_eq!(read.writer.loc, loc(1));
    }
}
