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

//! Trace directory input and output

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use travioli_common::TraceEvent;
use travioli_core::{SourceMap, Sources, StringPool};

/// Streams trace events with their 1-based line numbers. Blank lines are
/// skipped but still counted.
pub struct TraceReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line: 0 }
    }
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open trace {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<(usize, TraceEvent)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = self.lines.next()?;
            self.line += 1;
            let line = self.line;
            let text = match text {
                Ok(text) => text,
                Err(e) => return Some(Err(anyhow::Error::new(e).context(format!("failed to read trace line {}", line)))),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(text.parse::<TraceEvent>().map(|event| (line, event)).with_context(|| format!("malformed trace row at line {}: {}", line, text)));
        }
    }
}

/// Load the string pool and source map.
pub fn load_sources(strings_path: &Path, smap_path: &Path) -> Result<Sources> {
    let strings = fs::read_to_string(strings_path).with_context(|| format!("failed to read string pool {}", strings_path.display()))?;
    let smap = fs::read_to_string(smap_path).with_context(|| format!("failed to read source map {}", smap_path.display()))?;
    let strings = StringPool::from_json(&strings).with_context(|| format!("invalid string pool {}", strings_path.display()))?;
    let source_map = SourceMap::from_json(&smap).with_context(|| format!("invalid source map {}", smap_path.display()))?;
    Ok(Sources::new(strings, source_map))
}

/// Create `path` and hand a buffered writer to `write`.
pub fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(&mut out).and_then(|_| out.flush()).with_context(|| format!("failed to write {}", path.display()))
}
