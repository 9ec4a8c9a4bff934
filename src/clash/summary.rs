// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

use super::record::ClashRecord;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run-level statistics shown as the status message of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub clash_count: usize,
    /// Reference plus candidate elements compared
    pub object_count: usize,
    pub reference_count: usize,
    pub candidate_count: usize,
    /// Share of reference elements in at least one clash, in percent
    pub reference_clashing_pct: f64,
    /// Share of candidate elements in at least one clash, in percent
    pub candidate_clashing_pct: f64,
}

impl RunSummary {
    pub fn new(records: &[ClashRecord], reference_count: usize, candidate_count: usize) -> Self {
        let clashing_references: AHashSet<&str> = records.iter().map(|r| r.reference_id.as_str()).collect();
        let clashing_candidates: AHashSet<&str> = records.iter().map(|r| r.candidate_id.as_str()).collect();

        Self {
            clash_count: records.len(),
            object_count: reference_count + candidate_count,
            reference_count,
            candidate_count,
            reference_clashing_pct: percentage(clashing_references.len(), reference_count),
            candidate_clashing_pct: percentage(clashing_candidates.len(), candidate_count),
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clash detection report: {} clashes found between {} objects. \
             Percentage of reference objects clashing: {}%. \
             Percentage of latest objects clashing: {}%.",
            self.clash_count, self.object_count, self.reference_clashing_pct, self.candidate_clashing_pct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_distinct_elements() {
        let records = vec![
            ClashRecord::scored("R1", "C1", 0.9),
            ClashRecord::scored("R1", "C2", 0.3),
            ClashRecord::scored("R2", "C2", 0.1),
        ];
        let summary = RunSummary::new(&records, 4, 5);
        assert_eq!(summary.clash_count, 3);
        assert_eq!(summary.object_count, 9);
        assert_eq!(summary.reference_clashing_pct, 50.0);
        assert_eq!(summary.candidate_clashing_pct, 40.0);
        assert_eq!(
            summary.to_string(),
            "Clash detection report: 3 clashes found between 9 objects. \
             Percentage of reference objects clashing: 50%. \
             Percentage of latest objects clashing: 40%."
        );
    }

    #[test]
    fn test_summary_of_empty_run() {
        let summary = RunSummary::new(&[], 0, 0);
        assert_eq!(summary.reference_clashing_pct, 0.0);
        assert_eq!(summary.candidate_clashing_pct, 0.0);
    }
}
