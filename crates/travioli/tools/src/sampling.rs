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

//! Fixed-seed selection of data structures for manual review

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use travioli_core::report::{ReportAnnotations, TraversalSummary};

/// Seed shared by every run so annotations are reproducible
pub const SAMPLING_SEED: u64 = u64::from_le_bytes(*b"icse2017");

/// Pick up to `samples` traversed and up to `samples` redundantly traversed
/// data structures.
pub fn sample_annotations(summary: &TraversalSummary, samples: usize) -> ReportAnnotations {
    let mut rng = StdRng::seed_from_u64(SAMPLING_SEED);
    let traversed: Vec<&String> = summary.traversed_structures.iter().collect();
    let redundant: Vec<&String> = summary.redundant_structures.iter().collect();

    let pick = |candidates: &[&String], rng: &mut StdRng| -> HashSet<String> { candidates.choose_multiple(rng, samples).map(|s| (*s).clone()).collect() };
    let sampled_traversals = pick(&traversed[..], &mut rng);
    let sampled_redundancies = pick(&redundant[..], &mut rng);
    ReportAnnotations {
        sampled_traversals,
        sampled_redundancies,
    }
}
