// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Bounding box utilities

use super::Vertex;
use crate::utils::approx_eq;
use nalgebra::{Point3, Vector3};
use parry3d::bounding_volume::{Aabb, BoundingVolume};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut bbox = Self::empty();
        for vertex in vertices {
            bbox.expand_to_include(&vertex.position);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = *self;
        if !other.is_empty() {
            merged.expand_to_include(&other.min);
            merged.expand_to_include(&other.max);
        }
        merged
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Largest edge length, used as the length scale for tolerances
    pub fn extent(&self) -> f64 {
        self.size().max()
    }

    /// Closed-interval overlap test (touching boxes intersect)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Single-precision parry AABB, relative to `origin`, padded by `margin`.
    ///
    /// The f32 conversion rounds, so the margin must cover the rounding error
    /// for the box to stay conservative.
    pub fn to_aabb(&self, origin: &Point3<f64>, margin: f64) -> Aabb {
        let min = (self.min - origin).cast::<f32>();
        let max = (self.max - origin).cast::<f32>();
        Aabb::new(Point3::from(min), Point3::from(max)).loosened(margin as f32)
    }

    /// Conservative broad-phase test through parry's AABB.
    ///
    /// Boxes are recentred on their common centre before the f32 conversion so
    /// large world coordinates keep their precision.
    pub fn broad_phase_overlap(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let joint = self.union(other);
        let origin = joint.center();
        let margin = (joint.extent() * 1e-6).max(1e-9);
        self.to_aabb(&origin, margin)
            .intersects(&other.to_aabb(&origin, margin))
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (0..3).all(|i| {
            approx_eq(self.min[i], other.min[i], tolerance) && approx_eq(self.max[i], other.max[i], tolerance)
        })
    }
}
