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

//! Memory slots and traced values

use crate::error::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Object identifier. Stack frames share this id space.
pub type ObjectId = i64;
pub type FrameId = ObjectId;
/// Field or slot offset, usually a string pool reference
pub type Offset = i64;

/// A memory slot identified by the object (or frame) that owns it and an offset.
///
/// The undefined location is not representable; constructors return `None` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mem {
    pub owner: ObjectId,
    pub offset: Offset,
}

impl Mem {
    /// Build a slot, or `None` when `owner` is 0 (undefined).
    pub fn new(owner: ObjectId, offset: Offset) -> Option<Self> {
        if owner == 0 { None } else { Some(Self { owner, offset }) }
    }
}

impl fmt::Display for Mem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.offset)
    }
}

/// A value observed in the trace, keyed by its type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Val {
    /// `O`: reference to an object
    Object(ObjectId),
    /// `S`: string pool reference
    Str(Offset),
    /// `U`
    Undefined,
    /// `P` and any other tag: the raw text as logged
    Primitive(String),
}

impl Val {
    /// Decode a `(value, type)` pair of trace fields.
    pub fn parse(raw: &str, tag: &str) -> TraceResult<Self> {
        match tag {
            "O" => parse_int("value", raw).map(Val::Object),
            "S" => parse_int("value", raw).map(Val::Str),
            "U" => Ok(Val::Undefined),
            _ => Ok(Val::Primitive(raw.to_string())),
        }
    }

    /// The referenced object, if this is a (non-null) object reference.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Val::Object(id) if *id > 0 => Some(*id),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Val::Object(_) => "O",
            Val::Str(_) => "S",
            Val::Undefined => "U",
            Val::Primitive(_) => "P",
        }
    }

    /// The value field as it appears in a trace row.
    pub fn raw(&self) -> String {
        match self {
            Val::Object(id) => id.to_string(),
            Val::Str(idx) => idx.to_string(),
            Val::Undefined => "0".to_string(),
            Val::Primitive(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag(), self.raw())
    }
}

pub(crate) fn parse_int(field: &'static str, raw: &str) -> TraceResult<i64> {
    raw.trim().parse().map_err(|_| TraceError::InvalidInteger { field, value: raw.to_string() })
}
