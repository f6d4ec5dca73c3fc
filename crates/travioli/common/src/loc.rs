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

//! Source locations

use serde::{Deserialize, Serialize};
use std::fmt;

pub type SourceId = i64;
pub type InstrId = i64;

/// An interned source location: (source-file id, instruction id).
///
/// Serializes as a two element array so that AEC table dumps read as
/// `[[sid, iid], ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Loc(pub SourceId, pub InstrId);

impl Loc {
    /// Declared-function location of the synthetic root frame
    pub const ROOT: Loc = Loc(0, 0);

    pub fn new(sid: SourceId, iid: InstrId) -> Self {
        Self(sid, iid)
    }

    pub fn sid(&self) -> SourceId {
        self.0
    }

    pub fn iid(&self) -> InstrId {
        self.1
    }
}

/// Short form `sid:iid`, used for graph names and file names.
impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        assert_eq!(Loc::new(3, 17).to_string(), "3:17");
        assert_eq!(Loc::ROOT.to_string(), "0:0");
    }

    #[test]
    fn test_serializes_as_pair() {
        let json = serde_json::to_string(&vec![Loc::new(1, 2), Loc::new(3, 4)]).unwrap();
        assert_eq!(json, "[[1,2],[3,4]]");
    }
}
