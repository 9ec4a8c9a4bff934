// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Clashframe
//!
//! Parallel clash detection between two sets of building-model elements.
//! Display meshes are triangulated, placed in world space and intersected
//! pairwise through a pluggable mesh boolean; overlaps are scored by their
//! shared volume and reported grouped or one by one.

pub mod boolean;
pub mod clash;
pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod io;
pub mod utils;

pub use boolean::{BackendKind, ClipBoolean, Intersection, MeshBoolean, NullBoolean, ParryBoolean};
pub use clash::{ClashDetector, ClashRecord, DetectOptions, ReportFormat, RunSummary};
pub use config::ClashConfig;
pub use element::Element;
pub use error::{BooleanError, ClashError, ConversionError, MeshError, TriangulationError};
pub use geometry::{triangulate, Mesh, Primitive, Transform};

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Outcome of a run over two model files
#[derive(Debug, Clone)]
pub struct ClashRun {
    pub records: Vec<ClashRecord>,
    pub summary: RunSummary,
}

impl ClashRun {
    /// Both collections held at least one element
    pub fn has_objects(&self) -> bool {
        self.summary.reference_count > 0 && self.summary.candidate_count > 0
    }
}

/// Load both models, select elements with the configured rules and detect
/// clashes with the configured backend.
pub fn run_files(
    reference: impl AsRef<Path>,
    candidate: impl AsRef<Path>,
    config: &ClashConfig,
    show_progress: bool,
) -> Result<ClashRun> {
    let reference_model = io::load_model(reference)?;
    let candidate_model = io::load_model(candidate)?;

    let references = io::load_elements(&reference_model, &config.reference_rule())
        .context("Failed to load reference elements")?;
    let candidates = io::load_elements(&candidate_model, &config.candidate_rule())
        .context("Failed to load candidate elements")?;
    info!(
        references = references.len(),
        candidates = candidates.len(),
        backend = %config.backend,
        "elements loaded"
    );

    let detector = ClashDetector::new(config.backend.create());
    let records = detector.detect(&references, &candidates, &config.detect_options(show_progress))?;
    let summary = RunSummary::new(&records, references.len(), candidates.len());
    Ok(ClashRun { records, summary })
}
