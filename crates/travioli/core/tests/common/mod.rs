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

//! Trace builder shared by the integration tests
#![allow(dead_code)]

use travioli_common::{FrameId, Loc, ObjectId, Offset, TraceEvent, Val};
use travioli_core::Sources;

pub const NEXT: Offset = -1;
pub const VAL: Offset = -2;
pub const HEAD: Offset = -3;
pub const N: Offset = -4;
pub const LIST: Offset = -5;
pub const X: Offset = -6;

/// Object id of the global scope
pub const GLOBAL: ObjectId = 1;

const STRINGS: &str = r#"["next", "val", "head", "n", "list", "x"]"#;

const SOURCE_MAP: &str = r#"{
    "1": {
        "originalCodeFileName": "lists.js",
        "30": [1, 1, 9, 2],
        "34": [4, 12, 4, 18],
        "50": [11, 1, 19, 2],
        "52": [14, 12, 14, 18]
    },
    "2": {
        "originalCodeFileName": "node_modules/lib/list.js",
        "10": [1, 1, 5, 2]
    }
}"#;

pub fn sources() -> Sources {
    Sources::from_json(STRINGS, SOURCE_MAP).expect("test sources")
}

/// Location in `lists.js`
pub fn loc(iid: i64) -> Loc {
    Loc::new(1, iid)
}

pub fn obj(id: ObjectId) -> Val {
    Val::Object(id)
}

pub fn null() -> Val {
    Val::Primitive("null".to_string())
}

#[derive(Debug, Default)]
pub struct TraceBuilder {
    events: Vec<TraceEvent>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, at: Loc, owner: ObjectId, offset: Offset, value: Val) -> &mut Self {
        self.push(TraceEvent::Read { loc: at, owner, offset, value })
    }

    pub fn write(&mut self, at: Loc, owner: ObjectId, offset: Offset, value: Val) -> &mut Self {
        self.push(TraceEvent::Write { loc: at, owner, offset, value })
    }

    pub fn declare(&mut self, at: Loc, owner: ObjectId, offset: Offset, value: Val) -> &mut Self {
        self.push(TraceEvent::Declare { loc: at, owner, offset, value })
    }

    pub fn get_field(&mut self, at: Loc, object: ObjectId, offset: Offset, value: Val) -> &mut Self {
        self.push(TraceEvent::GetField {
            loc: at,
            receiver: object,
            owner: object,
            offset,
            value,
        })
    }

    pub fn put_field(&mut self, at: Loc, object: ObjectId, offset: Offset, value: Val) -> &mut Self {
        self.put_field_through(at, object, object, offset, value)
    }

    /// Field write on `receiver` that lands on `owner`, e.g. a prototype.
    pub fn put_field_through(&mut self, at: Loc, receiver: ObjectId, owner: ObjectId, offset: Offset, value: Val) -> &mut Self {
        self.push(TraceEvent::PutField {
            loc: at,
            receiver,
            owner,
            offset,
            value,
        })
    }

    pub fn call(&mut self, site: Loc, function: Loc, frame: FrameId) -> &mut Self {
        self.push(TraceEvent::Call {
            call_site: site,
            callee: function,
            callee_object: 900 + frame,
            frame,
        })
    }

    pub fn ret(&mut self, at: Loc) -> &mut Self {
        self.push(TraceEvent::Return { loc: at, value: Val::Undefined })
    }

    /// Link `nodes` through `field`, the last one pointing at null.
    pub fn link(&mut self, at: Loc, nodes: &[ObjectId], field: Offset) -> &mut Self {
        for (i, &node) in nodes.iter().enumerate() {
            let value = nodes.get(i + 1).map_or_else(null, |&next| obj(next));
            self.put_field(at, node, field, value);
        }
        self
    }

    /// Follow `field` from every node in `nodes`.
    pub fn walk(&mut self, at: Loc, nodes: &[ObjectId], field: Offset) -> &mut Self {
        for (i, &node) in nodes.iter().enumerate() {
            let value = nodes.get(i + 1).map_or_else(null, |&next| obj(next));
            self.get_field(at, node, field, value);
        }
        self
    }

    fn push(&mut self, event: TraceEvent) -> &mut Self {
        self.events.push(event);
        self
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// The trace as it would be written to disk
    pub fn to_csv(&self) -> String {
        self.events.iter().map(|e| format!("{}\n", e)).collect()
    }
}
