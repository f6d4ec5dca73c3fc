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

//! String pool and source map lookups used when rendering results

use crate::errors::{AnalysisError, AnalysisResult};
use serde::Deserialize;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use travioli_common::{InstrId, Loc, Offset, SourceId};

/// Interned strings referenced by negative offsets in the trace
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    pub fn new(strings: Vec<String>) -> Self {
        Self { strings }
    }

    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        serde_json::from_str(json).map(Self::new).map_err(AnalysisError::InvalidStringPool)
    }

    /// Resolve an offset: `-v-1` indexes the pool, non-negative values are literal.
    pub fn resolve(&self, value: Offset) -> Cow<'_, str> {
        if value >= 0 {
            return Cow::Owned(value.to_string());
        }
        let idx = (-(value + 1)) as usize;
        match self.strings.get(idx) {
            Some(s) => Cow::Borrowed(s.as_str()),
            None => Cow::Owned(value.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Source map entry for one instrumented file, as logged
#[derive(Debug, Deserialize)]
struct RawSourceFile {
    #[serde(rename = "originalCodeFileName")]
    original_code_file_name: String,
    #[serde(flatten)]
    entries: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
struct SourceFile {
    display_name: String,
    spans: HashMap<InstrId, [i64; 4]>,
}

/// Maps source ids to file names and instruction ids to line/column spans
#[derive(Debug, Default)]
pub struct SourceMap {
    files: HashMap<SourceId, SourceFile>,
    rendered: RefCell<HashMap<Loc, String>>,
}

impl SourceMap {
    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        let raw: HashMap<String, RawSourceFile> = serde_json::from_str(json).map_err(AnalysisError::InvalidSourceMap)?;
        let base = std::env::current_dir().ok();

        let mut files = HashMap::with_capacity(raw.len());
        for (sid, file) in raw {
            let Ok(sid) = sid.parse::<SourceId>() else {
                debug!("Skipping source map entry with non-numeric id {}", sid);
                continue;
            };
            let spans = file
                .entries
                .iter()
                .filter_map(|(iid, span)| Some((iid.parse::<InstrId>().ok()?, parse_span(span)?)))
                .collect();
            let display_name = relative_to(&file.original_code_file_name, base.as_deref());
            files.insert(sid, SourceFile { display_name, spans });
        }

        Ok(Self { files, rendered: RefCell::default() })
    }

    /// Register a file directly, without relativizing its name.
    pub fn insert_file(&mut self, sid: SourceId, name: impl Into<String>, spans: impl IntoIterator<Item = (InstrId, [i64; 4])>) {
        self.files.insert(
            sid,
            SourceFile {
                display_name: name.into(),
                spans: spans.into_iter().collect(),
            },
        );
        self.rendered.borrow_mut().clear();
    }

    /// Display name of a source file
    pub fn file_name(&self, sid: SourceId) -> Option<&str> {
        self.files.get(&sid).map(|f| f.display_name.as_str())
    }

    /// Human-readable `file[l1:c1-l2:c2]` form of a location, or `sid:iid`
    /// when the map does not know it.
    pub fn render(&self, loc: Loc) -> String {
        if let Some(cached) = self.rendered.borrow().get(&loc) {
            return cached.clone();
        }

        let rendered = match self.files.get(&loc.sid()).and_then(|f| f.spans.get(&loc.iid()).map(|span| (f, span))) {
            Some((file, [l1, c1, l2, c2])) => format!("{}[{}:{}-{}:{}]", file.display_name, l1, c1, l2, c2),
            None => {
                debug!("Location {} is not in the source map", loc);
                loc.to_string()
            }
        };
        self.rendered.borrow_mut().insert(loc, rendered.clone());
        rendered
    }
}

fn parse_span(value: &serde_json::Value) -> Option<[i64; 4]> {
    let items = value.as_array()?;
    if items.len() < 4 {
        return None;
    }
    Some([items[0].as_i64()?, items[1].as_i64()?, items[2].as_i64()?, items[3].as_i64()?])
}

/// Path of absolute `name` as seen from `base`, climbing with `..` when it
/// lies outside.
fn relative_to(name: &str, base: Option<&Path>) -> String {
    let path = Path::new(name);
    let Some(base) = base.filter(|_| path.is_absolute()) else {
        return name.to_string();
    };

    let mut path_parts = path.components().peekable();
    let mut base_parts = base.components().peekable();
    while let (Some(a), Some(b)) = (path_parts.peek(), base_parts.peek()) {
        if a != b {
            break;
        }
        path_parts.next();
        base_parts.next();
    }

    let mut relative: PathBuf = base_parts.map(|_| Component::ParentDir).collect();
    relative.extend(path_parts);
    relative.display().to_string()
}

/// Everything needed to turn ids back into names
#[derive(Debug, Default)]
pub struct Sources {
    pub strings: StringPool,
    pub source_map: SourceMap,
}

impl Sources {
    pub fn new(strings: StringPool, source_map: SourceMap) -> Self {
        Self { strings, source_map }
    }

    pub fn from_json(strings_json: &str, source_map_json: &str) -> AnalysisResult<Self> {
        Ok(Self::new(StringPool::from_json(strings_json)?, SourceMap::from_json(source_map_json)?))
    }

    pub fn render(&self, loc: Loc) -> String {
        self.source_map.render(loc)
    }
}
