// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Geometry analytics verification tests

use anyhow::Result;
use clashframe::geometry::{analyze, GeometryStats, Primitive, Transform};
use clashframe::Element;
use nalgebra::{Matrix4, Rotation3, Vector3};
use std::f64::consts::PI;

#[test]
fn test_cube_volume_and_surface_area() -> Result<()> {
    let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
    let stats = analyze(&mesh);

    assert!((stats.volume() - 1000.0).abs() < 1e-9, "Volume {} not 1000", stats.volume());
    assert!((stats.surface_area - 600.0).abs() < 1e-9);
    assert_eq!(stats.vertex_count, 8);
    assert_eq!(stats.triangle_count, 12);
    assert!(stats.is_watertight());

    Ok(())
}

#[test]
fn test_cylinder_volume_and_surface_area() -> Result<()> {
    let (height, radius, segments) = (20.0, 5.0, 32u32);
    let mesh = Primitive::cylinder(height, radius, segments).to_mesh();
    let stats = analyze(&mesh);

    // Inscribed polygon prism
    let n = segments as f64;
    let base = 0.5 * n * radius * radius * (2.0 * PI / n).sin();
    let side = n * 2.0 * radius * (PI / n).sin() * height;

    assert!((stats.volume() - base * height).abs() < 1e-9);
    assert!((stats.surface_area - (2.0 * base + side)).abs() < 1e-9);
    assert!(stats.signed_volume > 0.0, "cylinder should be wound outward");

    Ok(())
}

#[test]
fn test_bounding_box_accuracy() -> Result<()> {
    let size = Vector3::new(10.0, 20.0, 30.0);
    let stats = analyze(&Primitive::cube(size, true).to_mesh());

    assert_eq!(stats.bbox.min.coords, Vector3::new(-5.0, -10.0, -15.0));
    assert_eq!(stats.bbox.max.coords, Vector3::new(5.0, 10.0, 15.0));

    Ok(())
}

#[test]
fn test_centroid_calculation() -> Result<()> {
    let stats = analyze(&Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh());

    for i in 0..3 {
        assert!(stats.centroid[i].abs() < 1e-12, "Centroid[{}] = {}", i, stats.centroid[i]);
    }

    Ok(())
}

#[test]
fn test_rigid_placement_keeps_measurements() -> Result<()> {
    let mesh = Primitive::cylinder(3.0, 0.4, 24).to_mesh();
    let before = analyze(&mesh);

    let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), PI / 2.0).to_homogeneous();
    let placement = Matrix4::new_translation(&Vector3::new(1200.0, -40.0, 7.5)) * rotation;
    let element = Element::with_transform("duct", vec![mesh], &Transform::from_matrix(placement));
    let after = analyze(&element.meshes()[0]);

    assert!((after.volume() - before.volume()).abs() < 1e-9);
    assert!((after.surface_area - before.surface_area).abs() < 1e-9);
    assert!(after.is_watertight());

    Ok(())
}

#[test]
fn test_stats_json_serialization() -> Result<()> {
    let stats = analyze(&Primitive::cylinder(10.0, 2.0, 16).to_mesh());

    let json = serde_json::to_string_pretty(&stats)?;
    let deserialized: GeometryStats = serde_json::from_str(&json)?;

    assert_eq!(deserialized.vertex_count, stats.vertex_count);
    assert_eq!(deserialized.triangle_count, stats.triangle_count);
    assert!((deserialized.volume() - stats.volume()).abs() < 1e-9);

    Ok(())
}
