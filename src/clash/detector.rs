// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! All-pairs clash scan between a reference and a candidate collection

use super::record::{severity, ClashRecord};
use crate::boolean::MeshBoolean;
use crate::element::Element;
use crate::error::ClashError;
use crate::geometry::{analytics, BoundingBox, Mesh};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Per-run detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Clearance tolerance. Accepted and logged, but not yet applied to the
    /// intersection test.
    pub tolerance: f64,
    pub tolerance_unit: String,
    /// Worker threads; `None` uses every available core
    pub parallelism: Option<usize>,
    /// Skip mesh pairs whose bounding boxes are apart
    pub broad_phase: bool,
    pub show_progress: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            tolerance: 25.0,
            tolerance_unit: "mm".to_string(),
            parallelism: None,
            broad_phase: true,
            show_progress: false,
        }
    }
}

/// Mesh with the measurements every pair check needs
struct PreparedMesh<'a> {
    mesh: &'a Mesh,
    volume: f64,
    bbox: BoundingBox,
}

struct PreparedElement<'a> {
    id: &'a str,
    meshes: Vec<PreparedMesh<'a>>,
}

impl<'a> PreparedElement<'a> {
    fn new(element: &'a Element) -> Self {
        let meshes = element
            .meshes()
            .iter()
            .filter(|mesh| !mesh.is_empty())
            .map(|mesh| PreparedMesh {
                mesh,
                volume: analytics::mesh_volume(mesh),
                bbox: mesh.bounding_box(),
            })
            .collect();
        Self {
            id: element.id(),
            meshes,
        }
    }
}

/// Clash detector over an injected boolean backend
pub struct ClashDetector<B: MeshBoolean> {
    backend: B,
}

impl<B: MeshBoolean> ClashDetector<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check every (reference, candidate) pair and return one record per
    /// clashing pair.
    ///
    /// Records come back in completion order. The first backend error aborts
    /// the scan and is returned; no partial results are kept.
    pub fn detect(
        &self,
        reference: &[Element],
        candidates: &[Element],
        options: &DetectOptions,
    ) -> Result<Vec<ClashRecord>, ClashError> {
        info!(
            reference = reference.len(),
            candidates = candidates.len(),
            backend = self.backend.name(),
            tolerance = options.tolerance,
            unit = %options.tolerance_unit,
            "starting clash detection"
        );

        if reference.is_empty() || candidates.is_empty() {
            debug!("one of the collections is empty, nothing to compare");
            return Ok(Vec::new());
        }

        let pool = build_pool(options.parallelism)?;
        let started = Instant::now();
        let records = pool.install(|| self.scan(reference, candidates, options))?;

        info!(
            clashes = records.len(),
            pairs = reference.len() * candidates.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "clash detection finished"
        );
        Ok(records)
    }

    fn scan(
        &self,
        reference: &[Element],
        candidates: &[Element],
        options: &DetectOptions,
    ) -> Result<Vec<ClashRecord>, ClashError> {
        let prepare_started = Instant::now();
        let reference: Vec<PreparedElement<'_>> = reference.par_iter().map(PreparedElement::new).collect();
        let candidates: Vec<PreparedElement<'_>> = candidates.par_iter().map(PreparedElement::new).collect();
        debug!(
            elapsed_ms = prepare_started.elapsed().as_millis() as u64,
            "prepared element volumes and bounds"
        );

        let pairs: Vec<(usize, usize)> = (0..reference.len())
            .flat_map(|r| (0..candidates.len()).map(move |c| (r, c)))
            .collect();
        let progress = options.show_progress.then(|| progress_bar(pairs.len()));

        let (sender, receiver) = mpsc::channel();
        let outcome = pairs.par_iter().try_for_each_with(sender, |sender, &(r, c)| -> Result<(), ClashError> {
            let record = self.check_pair(&reference[r], &candidates[c], options.broad_phase)?;
            if let Some(progress) = &progress {
                progress.inc(1);
            }
            if let Some(record) = record {
                // The receiver outlives the scan
                let _ = sender.send(record);
            }
            Ok(())
        });

        if let Some(progress) = progress {
            progress.finish_and_clear();
        }
        outcome?;

        Ok(receiver.try_iter().collect())
    }

    /// First mesh pair with a positive overlap wins
    fn check_pair(
        &self,
        reference: &PreparedElement<'_>,
        candidate: &PreparedElement<'_>,
        broad_phase: bool,
    ) -> Result<Option<ClashRecord>, ClashError> {
        for reference_mesh in &reference.meshes {
            for candidate_mesh in &candidate.meshes {
                if broad_phase && !reference_mesh.bbox.broad_phase_overlap(&candidate_mesh.bbox) {
                    continue;
                }

                let intersection = self
                    .backend
                    .intersect(candidate_mesh.mesh, reference_mesh.mesh)
                    .map_err(|source| ClashError::Task {
                        reference_id: reference.id.to_string(),
                        candidate_id: candidate.id.to_string(),
                        source,
                    })?;

                if let Some(intersection) = intersection.filter(|i| !i.is_empty()) {
                    let severity = severity(intersection.volume, reference_mesh.volume, candidate_mesh.volume);
                    trace!(
                        reference = reference.id,
                        candidate = candidate.id,
                        volume = intersection.volume,
                        ?severity,
                        "clash"
                    );
                    return Ok(Some(ClashRecord::new(reference.id, candidate.id, severity)));
                }
            }
        }
        Ok(None)
    }
}

fn build_pool(parallelism: Option<usize>) -> Result<ThreadPool, ClashError> {
    let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("clash-worker-{i}"));
    if let Some(threads) = parallelism.filter(|&n| n > 0) {
        builder = builder.num_threads(threads);
    }
    builder.build().map_err(|err| ClashError::ThreadPool(err.to_string()))
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
