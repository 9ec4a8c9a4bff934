// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! End-to-end clash scenarios over primitive solids

use approx::assert_relative_eq;
use clashframe::clash::{ClashDetector, DetectOptions};
use clashframe::geometry::{Mesh, Primitive};
use clashframe::{ClashRecord, ClipBoolean, Element, NullBoolean, ParryBoolean};
use nalgebra::{Matrix4, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cube(size: f64, x: f64, y: f64, z: f64) -> Mesh {
    let mut mesh = Primitive::cube(Vector3::new(size, size, size), false).to_mesh();
    mesh.transform(&Matrix4::new_translation(&Vector3::new(x, y, z)));
    mesh
}

fn options(broad_phase: bool) -> DetectOptions {
    DetectOptions {
        parallelism: Some(4),
        broad_phase,
        ..DetectOptions::default()
    }
}

fn sorted_pairs(records: &[ClashRecord]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = records
        .iter()
        .map(|r| (r.reference_id.clone(), r.candidate_id.clone()))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn test_translated_unit_cubes() {
    let detector = ClashDetector::new(ClipBoolean::default());
    let reference = vec![Element::new("R", vec![cube(1.0, 0.0, 0.0, 0.0)])];

    let overlapping = vec![Element::new("C", vec![cube(1.0, 0.5, 0.0, 0.0)])];
    let records = detector.detect(&reference, &overlapping, &options(true)).unwrap();
    assert_eq!(records.len(), 1);
    assert_relative_eq!(records[0].severity.unwrap(), 0.5, epsilon = 1e-9);

    let apart = vec![Element::new("C", vec![cube(1.0, 2.0, 0.0, 0.0)])];
    assert!(detector.detect(&reference, &apart, &options(true)).unwrap().is_empty());
}

#[test]
fn test_severity_uses_smaller_solid() {
    // a 1×1×1 duct entirely inside a 4×4×4 beam
    let reference = vec![Element::new("beam", vec![cube(4.0, 0.0, 0.0, 0.0)])];
    let candidates = vec![Element::new("duct", vec![cube(1.0, 1.0, 1.0, 1.0)])];
    let records = ClashDetector::new(ClipBoolean::default())
        .detect(&reference, &candidates, &options(true))
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_relative_eq!(records[0].severity.unwrap(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_cylinder_duct_through_beam() {
    let mut duct = Primitive::cylinder(10.0, 0.5, 48).to_mesh();
    duct.transform(&Matrix4::new_translation(&Vector3::new(2.0, 0.5, -5.0)));
    let reference = vec![Element::new("beam", vec![cube(4.0, 0.0, -2.0, -0.5)])];
    let candidates = vec![Element::new("duct", vec![duct])];

    let records = ClashDetector::new(ClipBoolean::default())
        .detect(&reference, &candidates, &options(true))
        .unwrap();
    assert_eq!(records.len(), 1);
    // 4 of the duct's 10 units of length pass through the beam
    assert_relative_eq!(records[0].severity.unwrap(), 0.4, epsilon = 1e-9);
}

#[test]
fn test_every_pair_is_checked() {
    let reference = vec![
        Element::new("R1", vec![cube(1.0, 0.0, 0.0, 0.0)]),
        Element::new("R2", vec![cube(1.0, 10.0, 0.0, 0.0)]),
    ];
    let candidates = vec![
        Element::new("C1", vec![cube(1.0, 0.5, 0.0, 0.0)]),
        Element::new("C2", vec![cube(1.0, 10.5, 0.5, 0.0)]),
        Element::new("C3", vec![cube(1.0, 0.25, 0.25, 0.25)]),
        Element::new("C4", Vec::new()),
    ];
    let records = ClashDetector::new(ClipBoolean::default())
        .detect(&reference, &candidates, &options(true))
        .unwrap();
    assert_eq!(
        sorted_pairs(&records),
        vec![
            ("R1".to_string(), "C1".to_string()),
            ("R1".to_string(), "C3".to_string()),
            ("R2".to_string(), "C2".to_string()),
        ]
    );
}

fn scatter(rng: &mut StdRng, prefix: &str, count: usize) -> Vec<Element> {
    (0..count)
        .map(|i| {
            let size = rng.gen_range(0.5..2.0);
            let mesh = cube(
                size,
                rng.gen_range(0.0..8.0),
                rng.gen_range(0.0..8.0),
                rng.gen_range(0.0..8.0),
            );
            Element::new(format!("{prefix}{i}"), vec![mesh])
        })
        .collect()
}

#[test]
fn test_broad_phase_does_not_change_results() {
    let mut rng = StdRng::seed_from_u64(7);
    let reference = scatter(&mut rng, "R", 24);
    let candidates = scatter(&mut rng, "C", 24);

    let detector = ClashDetector::new(ClipBoolean::default());
    let with = detector.detect(&reference, &candidates, &options(true)).unwrap();
    let without = detector.detect(&reference, &candidates, &options(false)).unwrap();

    assert!(!with.is_empty());
    assert_eq!(sorted_pairs(&with), sorted_pairs(&without));
}

#[test]
fn test_swapping_models_keeps_the_pair_set() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = scatter(&mut rng, "A", 16);
    let b = scatter(&mut rng, "B", 16);

    let detector = ClashDetector::new(ClipBoolean::default());
    let forward = detector.detect(&a, &b, &options(true)).unwrap();
    let backward: Vec<ClashRecord> = detector
        .detect(&b, &a, &options(true))
        .unwrap()
        .into_iter()
        .map(|r| ClashRecord::new(r.candidate_id, r.reference_id, r.severity))
        .collect();

    assert!(!forward.is_empty());
    assert_eq!(sorted_pairs(&forward), sorted_pairs(&backward));
}

#[test]
fn test_parry_backend_scores_overlapping_cubes() {
    let detector = ClashDetector::new(ParryBoolean);
    let reference = vec![Element::new("R", vec![cube(1.0, 0.0, 0.0, 0.0)])];

    let overlapping = vec![Element::new("C", vec![cube(1.0, 0.5, 0.0, 0.0)])];
    let records = detector.detect(&reference, &overlapping, &options(true)).unwrap();
    assert_eq!(records.len(), 1);
    assert_relative_eq!(records[0].severity.unwrap(), 0.5, epsilon = 1e-3);

    let apart = vec![Element::new("C", vec![cube(1.0, 2.0, 0.0, 0.0)])];
    assert!(detector.detect(&reference, &apart, &options(false)).unwrap().is_empty());
}

#[test]
fn test_results_do_not_depend_on_thread_count() {
    let reference: Vec<Element> = (0..6)
        .map(|i| Element::new(format!("R{i}"), vec![cube(1.0, i as f64 * 1.5, 0.0, 0.0)]))
        .collect();
    let candidates: Vec<Element> = (0..6)
        .map(|i| Element::new(format!("C{i}"), vec![cube(1.0, i as f64 * 1.5 + 0.5, 0.0, 0.0)]))
        .collect();

    let detector = ClashDetector::new(ClipBoolean::default());
    let single = detector
        .detect(
            &reference,
            &candidates,
            &DetectOptions {
                parallelism: Some(1),
                ..DetectOptions::default()
            },
        )
        .unwrap();
    let many = detector.detect(&reference, &candidates, &options(true)).unwrap();
    assert_eq!(single.len(), 6);
    assert_eq!(sorted_pairs(&single), sorted_pairs(&many));
}

#[test]
fn test_null_backend_reports_nothing() {
    let reference = vec![Element::new("R", vec![cube(1.0, 0.0, 0.0, 0.0)])];
    let candidates = vec![Element::new("C", vec![cube(1.0, 0.0, 0.0, 0.0)])];
    let records = ClashDetector::new(NullBoolean)
        .detect(&reference, &candidates, &options(true))
        .unwrap();
    assert!(records.is_empty());
}
