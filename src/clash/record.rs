// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Clash records, severity classes and grouping by reference element

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One detected overlap between a reference and a candidate element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashRecord {
    pub reference_id: String,
    pub candidate_id: String,
    /// Overlap volume over the smaller mesh volume, in [0, 1]. `None` when
    /// the smaller mesh encloses no measurable volume.
    pub severity: Option<f64>,
}

impl ClashRecord {
    pub fn new(reference_id: impl Into<String>, candidate_id: impl Into<String>, severity: Option<f64>) -> Self {
        Self {
            reference_id: reference_id.into(),
            candidate_id: candidate_id.into(),
            severity: severity.map(|s| s.clamp(0.0, 1.0)),
        }
    }

    pub fn scored(reference_id: impl Into<String>, candidate_id: impl Into<String>, severity: f64) -> Self {
        Self::new(reference_id, candidate_id, Some(severity))
    }

    pub fn level(&self) -> SeverityLevel {
        SeverityLevel::classify(self.severity)
    }
}

/// Severity of an overlap given both mesh volumes.
///
/// The ratio is clamped because boolean backends round; `None` when the
/// smaller volume is not positive.
pub fn severity(intersection_volume: f64, reference_volume: f64, candidate_volume: f64) -> Option<f64> {
    let smaller = reference_volume.min(candidate_volume);
    if !(smaller > 0.0) || !intersection_volume.is_finite() {
        return None;
    }
    Some((intersection_volume / smaller).clamp(0.0, 1.0))
}

/// Report category derived from severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLevel {
    High,
    Medium,
    Low,
    Unscored,
}

impl SeverityLevel {
    pub fn classify(severity: Option<f64>) -> Self {
        match severity {
            Some(s) if s > 0.75 => Self::High,
            Some(s) if s > 0.25 => Self::Medium,
            Some(_) => Self::Low,
            None => Self::Unscored,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unscored => "Unscored",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidates that clashed with one reference element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashGroup {
    /// 1-based, in order of first appearance
    pub number: usize,
    pub reference_id: String,
    pub candidate_ids: Vec<String>,
}

impl ClashGroup {
    /// Reference id followed by every candidate id
    pub fn object_ids(&self) -> Vec<String> {
        std::iter::once(self.reference_id.clone())
            .chain(self.candidate_ids.iter().cloned())
            .collect()
    }
}

/// Group records by reference id, numbering groups as they are first seen
pub fn group_by_reference(records: &[ClashRecord]) -> Vec<ClashGroup> {
    let mut groups: Vec<ClashGroup> = Vec::new();
    let mut index: AHashMap<&str, usize> = AHashMap::new();

    for record in records {
        let slot = *index.entry(record.reference_id.as_str()).or_insert_with(|| {
            groups.push(ClashGroup {
                number: groups.len() + 1,
                reference_id: record.reference_id.clone(),
                candidate_ids: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].candidate_ids.push(record.candidate_id.clone());
    }

    groups
}
