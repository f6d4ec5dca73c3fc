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

//! Trace events and their row encoding
//!
//! Each row of a trace is a comma separated record whose first field is the
//! event tag:
//!
//! | Tag | Fields |
//! |-----|--------|
//! | `R` | sid, iid, frameOrOwnerId, offset, value, type |
//! | `W` | sid, iid, frameOrOwnerId, offset, value, type |
//! | `G` | sid, iid, receiverId, ownerId, offset, value, type |
//! | `P` | sid, iid, receiverId, ownerId, offset, value, type |
//! | `C` | sid, iid, calleeFuncSid, calleeFuncIid, calleeObjId, newFrameId |
//! | `E` | sid, iid, value, type |
//! | `D` | sid, iid, frameOrOwnerId, offset, value, type |
//!
//! Values never contain commas: strings are logged as string pool references.

use crate::error::{TraceError, TraceResult};
use crate::loc::Loc;
use crate::value::{FrameId, Mem, ObjectId, Offset, Val, parse_int};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Read { loc: Loc, owner: ObjectId, offset: Offset, value: Val },
    Write { loc: Loc, owner: ObjectId, offset: Offset, value: Val },
    GetField { loc: Loc, receiver: ObjectId, owner: ObjectId, offset: Offset, value: Val },
    PutField { loc: Loc, receiver: ObjectId, owner: ObjectId, offset: Offset, value: Val },
    Call { call_site: Loc, callee: Loc, callee_object: ObjectId, frame: FrameId },
    Return { loc: Loc, value: Val },
    Declare { loc: Loc, owner: ObjectId, offset: Offset, value: Val },
}

impl TraceEvent {
    pub fn tag(&self) -> char {
        match self {
            TraceEvent::Read { .. } => 'R',
            TraceEvent::Write { .. } => 'W',
            TraceEvent::GetField { .. } => 'G',
            TraceEvent::PutField { .. } => 'P',
            TraceEvent::Call { .. } => 'C',
            TraceEvent::Return { .. } => 'E',
            TraceEvent::Declare { .. } => 'D',
        }
    }

    /// Decode one trace row. Fields beyond the expected ones are ignored.
    pub fn parse_row(row: &str) -> TraceResult<Self> {
        let fields: Vec<&str> = row.trim_end_matches(['\r', '\n']).split(',').collect();
        let tag = fields.first().map(|t| t.trim()).unwrap_or_default();
        if tag.is_empty() {
            return Err(TraceError::EmptyRow);
        }

        let expected = match tag {
            "R" | "W" | "D" | "C" => 7,
            "G" | "P" => 8,
            "E" => 5,
            other => return Err(TraceError::UnknownTag(other.to_string())),
        };
        if fields.len() < expected {
            return Err(TraceError::MissingFields {
                tag: tag.chars().next().unwrap_or('?'),
                expected,
                found: fields.len(),
            });
        }

        let loc = Loc::new(parse_int("sourceId", fields[1])?, parse_int("instrId", fields[2])?);
        let event = match tag {
            "R" | "W" | "D" => {
                let owner = parse_int("frameOrOwnerId", fields[3])?;
                let offset = parse_int("offset", fields[4])?;
                let value = Val::parse(fields[5], fields[6])?;
                match tag {
                    "R" => TraceEvent::Read { loc, owner, offset, value },
                    "W" => TraceEvent::Write { loc, owner, offset, value },
                    _ => TraceEvent::Declare { loc, owner, offset, value },
                }
            }
            "G" | "P" => {
                let receiver = parse_int("receiverId", fields[3])?;
                let owner = parse_int("ownerId", fields[4])?;
                let offset = parse_int("offset", fields[5])?;
                let value = Val::parse(fields[6], fields[7])?;
                if tag == "G" {
                    TraceEvent::GetField { loc, receiver, owner, offset, value }
                } else {
                    TraceEvent::PutField { loc, receiver, owner, offset, value }
                }
            }
            "C" => TraceEvent::Call {
                call_site: loc,
                callee: Loc::new(parse_int("calleeFuncSourceId", fields[3])?, parse_int("calleeFuncInstrId", fields[4])?),
                callee_object: parse_int("calleeObjId", fields[5])?,
                frame: parse_int("newFrameId", fields[6])?,
            },
            _ => TraceEvent::Return { loc, value: Val::parse(fields[3], fields[4])? },
        };
        Ok(event)
    }

    /// Memory slots this event reads, as seen by the liveness pre-pass.
    ///
    /// A field read through a receiver other than the owning object also
    /// reads the receiver's slot of the same name.
    pub fn read_slots(&self) -> impl Iterator<Item = Mem> {
        let (first, second) = match *self {
            TraceEvent::Read { owner, offset, .. } => (Mem::new(owner, offset), None),
            TraceEvent::GetField { receiver, owner, offset, .. } => {
                let proxy = if receiver != owner { Mem::new(receiver, offset) } else { None };
                (Mem::new(owner, offset), proxy)
            }
            _ => (None, None),
        };
        first.into_iter().chain(second)
    }
}

impl FromStr for TraceEvent {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_row(s)
    }
}

/// Encodes the event back into its row form.
impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Read { loc, owner, offset, value } | TraceEvent::Write { loc, owner, offset, value } | TraceEvent::Declare { loc, owner, offset, value } => {
                write!(f, "{},{},{},{},{},{},{}", self.tag(), loc.sid(), loc.iid(), owner, offset, value.raw(), value.tag())
            }
            TraceEvent::GetField { loc, receiver, owner, offset, value } | TraceEvent::PutField { loc, receiver, owner, offset, value } => {
                write!(f, "{},{},{},{},{},{},{},{}", self.tag(), loc.sid(), loc.iid(), receiver, owner, offset, value.raw(), value.tag())
            }
            TraceEvent::Call { call_site, callee, callee_object, frame } => {
                write!(f, "C,{},{},{},{},{},{}", call_site.sid(), call_site.iid(), callee.sid(), callee.iid(), callee_object, frame)
            }
            TraceEvent::Return { loc, value } => write!(f, "E,{},{},{},{}", loc.sid(), loc.iid(), value.raw(), value.tag()),
        }
    }
}
