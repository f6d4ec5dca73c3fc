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

//! End-to-end runs of the analyze command over a temporary trace directory

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use test_case::test_case;
use travioli_tools::{AnalyzeArgs, run_analysis};

const STRINGS: &str = r#"["next", "val", "head", "n", "list", "x"]"#;

const SOURCE_MAP: &str = r#"{
    "1": {
        "originalCodeFileName": "lists.js",
        "30": [1, 1, 9, 2],
        "50": [11, 1, 19, 2],
        "52": [14, 12, 14, 18]
    }
}"#;

/// `sumAll()` calling `length()` once per frame, each call walking a three node list
fn repeated_walks_csv(frames: &[i64]) -> String {
    let nodes = [101, 102, 103];
    let link = |i: usize| nodes.get(i + 1).map_or("null,P".to_string(), |n| format!("{},O", n));
    let mut csv = String::new();
    for (i, node) in nodes.iter().enumerate() {
        writeln!(csv, "P,1,2,{},{},-1,{}", node, node, link(i)).unwrap();
    }
    csv.push_str("W,1,5,1,-5,101,O\n");
    csv.push_str("C,1,20,1,30,907,7\n");
    for frame in frames {
        writeln!(csv, "C,1,40,1,50,{},{}", 900 + frame, frame).unwrap();
        csv.push_str("R,1,51,1,-5,101,O\n");
        for (i, node) in nodes.iter().enumerate() {
            writeln!(csv, "G,1,52,{},{},-1,{}", node, node, link(i)).unwrap();
        }
        csv.push_str("E,1,59,0,U\n");
    }
    csv.push_str("E,1,39,0,U\n");
    csv
}

fn trace_dir(trace: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("trace.csv"), trace).unwrap();
    fs::write(dir.path().join("strings.json"), STRINGS).unwrap();
    fs::write(dir.path().join("smap.json"), SOURCE_MAP).unwrap();
    dir
}

fn args(dir: &Path) -> AnalyzeArgs {
    AnalyzeArgs {
        dir: dir.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_analyze_writes_all_outputs() {
    let dir = trace_dir(&repeated_walks_csv(&[8, 9, 10]));
    let summary = run_analysis(&args(dir.path())).unwrap();

    assert_eq!(summary.stats.activations_analyzed, 4);
    assert_eq!(summary.report_path, dir.path().join("traversals.out"));
    assert_eq!(summary.dot_paths, vec![dir.path().join("ag_1:50.dot"), dir.path().join("ag_1:30.dot")]);

    let report = fs::read_to_string(&summary.report_path).unwrap();
    assert!(report.starts_with("+ Data structure: <global>.list {sampled traversal} {sampled redundancy}\n"));
    assert!(report.contains("Redundant Traversal point ["));
    assert!(report.contains("    - lists.js[14:12-14:18]\n"));
    assert!(report.ends_with("Redundantly traversed 1 data structures in 1 functions, across 1 RAECs.\n"));

    let dot = fs::read_to_string(dir.path().join("ag_1:30.dot")).unwrap();
    assert!(dot.starts_with("digraph access_graph {\n"));
    assert!(dot.contains("[fillcolor=\"black\", fontcolor=\"white\""));

    let aecs: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary.aec_path).unwrap()).unwrap();
    let aecs = aecs.as_array().unwrap();
    assert!(aecs.contains(&serde_json::json!([[1, 52]])));
    assert!(aecs.contains(&serde_json::json!([[1, 40], [1, 52]])));
}

#[test_case(0, "+ Data structure: <global>.list\n" ; "no samples")]
#[test_case(1, "+ Data structure: <global>.list {sampled traversal} {sampled redundancy}\n" ; "one sample")]
fn test_sample_annotations(samples: usize, header: &str) {
    let dir = trace_dir(&repeated_walks_csv(&[8, 9, 10]));
    let summary = run_analysis(&AnalyzeArgs { samples, ..args(dir.path()) }).unwrap();
    let report = fs::read_to_string(summary.report_path).unwrap();
    assert!(report.starts_with(header));
}

#[test_case(&[8, 9], 0 ; "two walks")]
#[test_case(&[8, 9, 10], 1 ; "three walks")]
fn test_redundancy_threshold(frames: &[i64], redundant: usize) {
    let dir = trace_dir(&repeated_walks_csv(frames));
    let summary = run_analysis(&args(dir.path())).unwrap();
    let report = fs::read_to_string(summary.report_path).unwrap();
    assert!(report.ends_with(&format!("Redundantly traversed {} data structures in {} functions, across {} RAECs.\n", redundant, redundant, redundant)));
}

#[test]
fn test_blank_lines_keep_line_numbers() {
    let dir = trace_dir("C,1,20,1,30,907,7\n\nE,1,39,0,U\nE,1,39,0,U\n");
    let err = run_analysis(&args(dir.path())).unwrap_err();
    assert!(err.to_string().ends_with("trace.csv:4"), "{}", err);
}

#[test]
fn test_malformed_row_reports_line() {
    let dir = trace_dir("C,1,20,1,30,907,7\nQ,1,2,3\n");
    let err = run_analysis(&args(dir.path())).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{}", err);
}

#[test]
fn test_missing_source_map() {
    let dir = trace_dir("C,1,20,1,30,907,7\nE,1,39,0,U\n");
    fs::remove_file(dir.path().join("smap.json")).unwrap();
    let err = run_analysis(&args(dir.path())).unwrap_err();
    assert!(err.to_string().contains("smap.json"), "{}", err);
}

#[test]
fn test_empty_trace() {
    let dir = trace_dir("");
    let summary = run_analysis(&args(dir.path())).unwrap();
    assert_eq!(summary.stats.activations_analyzed, 0);
    assert!(summary.dot_paths.is_empty());
    let report = fs::read_to_string(summary.report_path).unwrap();
    assert!(report.starts_with("\nDone! Analyzed 0 activations of 0 functions.\n"));
    assert_eq!(fs::read_to_string(summary.aec_path).unwrap(), "[]");
}
