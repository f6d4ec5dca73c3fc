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

//! Errors raised while decoding trace rows

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Empty trace row")]
    EmptyRow,
    #[error("Unknown event tag: {0}")]
    UnknownTag(String),
    #[error("Event '{tag}' expects at least {expected} fields, found {found}")]
    MissingFields { tag: char, expected: usize, found: usize },
    #[error("Invalid integer in field '{field}': {value}")]
    InvalidInteger { field: &'static str, value: String },
}

pub type TraceResult<T> = Result<T, TraceError>;
