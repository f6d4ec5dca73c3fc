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

//! Travioli Common
//!
//! Data model shared by the trace analyzer crates: source locations, memory
//! slots, traced values and the row codec of the read/write trace.

pub mod error;
pub mod event;
pub mod loc;
pub mod value;

pub use error::{TraceError, TraceResult};
pub use event::TraceEvent;
pub use loc::{InstrId, Loc, SourceId};
pub use value::{FrameId, Mem, ObjectId, Offset, Val};
