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

//! Structural errors raised while replaying a trace

use travioli_common::FrameId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Base frame {base} is not on the call stack of frame {top}")]
    BaseFrameNotOnStack { base: FrameId, top: FrameId },
    #[error("Unknown frame id: {0}")]
    UnknownFrame(FrameId),
    #[error("Write to undefined memory at trace line {line}")]
    WriteToUndefined { line: usize },
    #[error("Declaration without a parent frame at trace line {line}")]
    MissingParentFrame { line: usize },
    #[error("Return from the root frame at trace line {line}")]
    UnbalancedReturn { line: usize },
    #[error("Invalid string pool: {0}")]
    InvalidStringPool(#[source] serde_json::Error),
    #[error("Invalid source map: {0}")]
    InvalidSourceMap(#[source] serde_json::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
