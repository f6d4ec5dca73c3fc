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

//! Analysis configuration

/// Default path fragments whose functions are never analyzed
pub const DEFAULT_EXCLUDED_PATH_MARKERS: [&str; 3] = ["node_modules/", "test/", "perf/"];

/// Number of edges scanned by the connectivity test before giving up on a group
pub const DEFAULT_CONNECTIVITY_SCAN_LIMIT: usize = 100;

/// Configuration for a trace analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Activations of functions declared in files whose path contains one of
    /// these fragments are replayed but not analyzed
    pub excluded_path_markers: Vec<String>,
    /// Highest edge index the connectivity test inspects
    pub connectivity_scan_limit: usize,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded_path_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_path_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_connectivity_scan_limit(mut self, limit: usize) -> Self {
        self.connectivity_scan_limit = limit;
        self
    }

    /// Whether a source file path falls under one of the excluded markers
    pub fn is_excluded_path(&self, path: &str) -> bool {
        self.excluded_path_markers.iter().any(|marker| path.contains(marker.as_str()))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excluded_path_markers: DEFAULT_EXCLUDED_PATH_MARKERS.iter().map(|m| m.to_string()).collect(),
            connectivity_scan_limit: DEFAULT_CONNECTIVITY_SCAN_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let config = AnalysisConfig::default();
        assert!(config.is_excluded_path("node_modules/lodash/index.js"));
        assert!(config.is_excluded_path("lib/test/list.js"));
        assert!(config.is_excluded_path("bench/perf/run.js"));
        assert!(!config.is_excluded_path("lib/list.js"));
        assert_eq!(config.connectivity_scan_limit, 100);
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::new().with_excluded_path_markers(["vendor/"]).with_connectivity_scan_limit(8);
        assert!(config.is_excluded_path("vendor/a.js"));
        assert!(!config.is_excluded_path("node_modules/a.js"));
        assert_eq!(config.connectivity_scan_limit, 8);
    }
}
