// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Native intersection backend.
//!
//! A convex solid is the intersection of the half-spaces behind its faces, so
//! intersecting any closed surface with it reduces to clipping that surface by
//! each face plane in turn. Every cut opens the surface along the plane; the
//! opening is capped with a fan so the surface stays closed and the enclosed
//! volume can be taken by the divergence theorem at the end.
//!
//! Building elements are mostly boxes, extrusions and tessellated round
//! segments, so one of the two operands is nearly always convex. When neither
//! is, the backend reports [`BooleanError::NonConvex`] and a general backend
//! has to be used instead.

use super::{Intersection, MeshBoolean};
use crate::error::BooleanError;
use crate::geometry::analytics::{open_edge_count, position_key, signed_volume_about, PositionKey};
use crate::geometry::{Mesh, Triangle, Vertex};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use tracing::trace;

/// Default on-plane tolerance, as a fraction of the scene's largest extent
const DISTANCE_EPS: f64 = 1e-9;

/// Convexity is judged with a looser tolerance than clipping so tessellated
/// round shapes still qualify.
const CONVEXITY_FACTOR: f64 = 100.0;

/// Unit normals closer than this are the same direction
const NORMAL_EPS: f64 = 1e-9;

/// Results smaller than this fraction of the smaller operand are empty
const VOLUME_EPS: f64 = 1e-9;

type Polygon = Vec<Point3<f64>>;

/// Half-space clipping backend; exact when one operand is convex.
#[derive(Debug, Clone, Copy)]
pub struct ClipBoolean {
    /// On-plane tolerance as a fraction of the scene's largest extent
    pub relative_epsilon: f64,
}

impl Default for ClipBoolean {
    fn default() -> Self {
        Self {
            relative_epsilon: DISTANCE_EPS,
        }
    }
}

impl ClipBoolean {
    pub fn new(relative_epsilon: f64) -> Self {
        Self { relative_epsilon }
    }

    /// Pick the convex operand and return the other one with its planes
    fn choose_clipper<'a>(
        &self,
        subject: &'a Solid,
        tool: &'a Solid,
        eps: f64,
    ) -> Result<(&'a Solid, Vec<Plane>), BooleanError> {
        let convex_tolerance = eps * CONVEXITY_FACTOR;

        let tool_planes = tool.planes(eps)?;
        if tool.is_convex(&tool_planes, convex_tolerance) {
            return Ok((subject, tool_planes));
        }

        let subject_planes = subject.planes(eps)?;
        if subject.is_convex(&subject_planes, convex_tolerance) {
            trace!("tool is not convex, clipping it by the subject instead");
            return Ok((tool, subject_planes));
        }

        Err(BooleanError::NonConvex)
    }
}

impl MeshBoolean for ClipBoolean {
    fn name(&self) -> &'static str {
        "clip"
    }

    fn intersect(&self, subject: &Mesh, tool: &Mesh) -> Result<Option<Intersection>, BooleanError> {
        if subject.is_empty() || tool.is_empty() {
            return Ok(None);
        }

        let subject_box = subject.bounding_box();
        let tool_box = tool.bounding_box();
        if !subject_box.intersects(&tool_box) {
            return Ok(None);
        }

        // Work around the scene centre so large world coordinates keep precision
        let scene = subject_box.union(&tool_box);
        let origin = scene.center();
        let eps = self.relative_epsilon * scene.extent().max(f64::MIN_POSITIVE);

        let subject = Solid::prepare(subject, &origin, "subject")?;
        let tool = Solid::prepare(tool, &origin, "tool")?;
        let smaller = subject.volume.min(tool.volume);
        if smaller <= 0.0 {
            return Ok(None);
        }

        let (clipped, planes) = self.choose_clipper(&subject, &tool, eps)?;

        let mut polygons: Vec<Polygon> = clipped.triangles.iter().map(|t| t.to_vec()).collect();
        for plane in &planes {
            polygons = clip_by_plane(polygons, plane, eps);
            if polygons.is_empty() {
                return Ok(None);
            }
        }

        let volume = signed_volume_about(fan(&polygons), &Point3::origin());
        if volume <= VOLUME_EPS * smaller {
            return Ok(None);
        }

        Ok(Some(Intersection::new(to_mesh(&polygons, &origin), volume)))
    }
}

/// Oriented plane; the kept side is `normal · x <= offset`
#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane {
    fn from_triangle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let length = normal.norm();
        if !(length > f64::EPSILON * ab.norm() * ac.norm()) {
            return None;
        }
        let normal = normal / length;
        Some(Self {
            normal,
            offset: normal.dot(&a.coords),
        })
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn coincides(&self, other: &Plane, eps: f64) -> bool {
        (self.normal - other.normal).norm() <= NORMAL_EPS && (self.offset - other.offset).abs() <= eps
    }
}

/// Closed operand in the local frame, wound outward
struct Solid {
    operand: &'static str,
    triangles: Vec<[Point3<f64>; 3]>,
    volume: f64,
}

impl Solid {
    fn prepare(mesh: &Mesh, origin: &Point3<f64>, operand: &'static str) -> Result<Self, BooleanError> {
        let open_edges = open_edge_count(mesh);
        if open_edges > 0 {
            return Err(BooleanError::OpenMesh { operand, open_edges });
        }

        let mut triangles: Vec<[Point3<f64>; 3]> = mesh
            .triangle_iter()
            .map(|corners| corners.map(|p| p - origin.coords))
            .collect();

        let mut volume = signed_volume_about(triangles.iter().copied(), &Point3::origin());
        if volume < 0.0 {
            for triangle in &mut triangles {
                triangle.swap(1, 2);
            }
            volume = -volume;
        }

        Ok(Self {
            operand,
            triangles,
            volume,
        })
    }

    /// Distinct outward face planes
    fn planes(&self, eps: f64) -> Result<Vec<Plane>, BooleanError> {
        let mut planes: Vec<Plane> = Vec::new();
        for [a, b, c] in &self.triangles {
            let Some(plane) = Plane::from_triangle(a, b, c) else {
                continue;
            };
            if !planes.iter().any(|p| p.coincides(&plane, eps)) {
                planes.push(plane);
            }
        }

        if planes.is_empty() {
            return Err(BooleanError::DegenerateOperand {
                operand: self.operand,
            });
        }
        Ok(planes)
    }

    /// Every vertex lies behind every face plane
    fn is_convex(&self, planes: &[Plane], tolerance: f64) -> bool {
        planes.iter().all(|plane| {
            self.triangles
                .iter()
                .flatten()
                .all(|p| plane.distance(p) <= tolerance)
        })
    }
}

fn snap(distance: f64, eps: f64) -> f64 {
    if distance.abs() <= eps {
        0.0
    } else {
        distance
    }
}

/// Point where the edge crosses the plane.
///
/// Interpolation always runs from the inside endpoint, so the two faces that
/// share an edge produce bit-identical points.
fn crossing(p: &Point3<f64>, dp: f64, q: &Point3<f64>, dq: f64) -> Point3<f64> {
    let (inside, d_in, outside, d_out) = if dp < 0.0 { (p, dp, q, dq) } else { (q, dq, p, dp) };
    let t = d_in / (d_in - d_out);
    inside + (outside - inside) * t
}

/// Clip a closed polygon soup to the kept side of `plane` and cap the cut
fn clip_by_plane(polygons: Vec<Polygon>, plane: &Plane, eps: f64) -> Vec<Polygon> {
    let mut kept: Vec<Polygon> = Vec::with_capacity(polygons.len());
    let mut outline: Vec<(Point3<f64>, Point3<f64>)> = Vec::new();

    for polygon in polygons {
        let distances: Vec<f64> = polygon.iter().map(|p| snap(plane.distance(p), eps)).collect();
        if distances.iter().all(|&d| d <= 0.0) {
            collect_on_plane_edges(&polygon, &distances, &mut outline);
            kept.push(polygon);
            continue;
        }
        if distances.iter().all(|&d| d >= 0.0) {
            // Outside, at most touching the plane
            continue;
        }

        // Sutherland-Hodgman step; the flag marks points on the plane
        let count = polygon.len();
        let mut clipped: Vec<(Point3<f64>, f64)> = Vec::with_capacity(count + 2);
        for i in 0..count {
            let j = (i + 1) % count;
            let (p, dp) = (&polygon[i], distances[i]);
            let (q, dq) = (&polygon[j], distances[j]);
            if dp <= 0.0 {
                clipped.push((*p, dp));
            }
            if (dp < 0.0 && dq > 0.0) || (dp > 0.0 && dq < 0.0) {
                clipped.push((crossing(p, dp, q, dq), 0.0));
            }
        }

        clipped.dedup_by(|a, b| a.0 == b.0);
        while clipped.len() > 1 && clipped.first().map(|f| f.0) == clipped.last().map(|l| l.0) {
            clipped.pop();
        }
        if clipped.len() < 3 {
            continue;
        }

        let (points, distances): (Polygon, Vec<f64>) = clipped.into_iter().unzip();
        collect_on_plane_edges(&points, &distances, &mut outline);
        kept.push(points);
    }

    kept.extend(cap(outline));
    kept
}

fn collect_on_plane_edges(polygon: &[Point3<f64>], distances: &[f64], outline: &mut Vec<(Point3<f64>, Point3<f64>)>) {
    let count = polygon.len();
    for i in 0..count {
        let j = (i + 1) % count;
        if distances[i] == 0.0 && distances[j] == 0.0 {
            outline.push((polygon[i], polygon[j]));
        }
    }
}

/// Close the cut left by one plane.
///
/// On-plane edges shared by two kept faces cancel; what remains is the cut
/// outline, which is fanned from one of its points. The fan is reversed
/// against the outline so the cap closes the surface. Edges that fail to
/// cancel contribute a pair of opposite triangles and no volume.
fn cap(edges: Vec<(Point3<f64>, Point3<f64>)>) -> Vec<Polygon> {
    let mut alive = vec![true; edges.len()];
    let mut pending: AHashMap<(PositionKey, PositionKey), Vec<usize>> = AHashMap::new();

    for (i, (p, q)) in edges.iter().enumerate() {
        let from = position_key(p);
        let to = position_key(q);
        if from == to {
            alive[i] = false;
            continue;
        }
        match pending.get_mut(&(to, from)).and_then(Vec::pop) {
            Some(j) => {
                alive[i] = false;
                alive[j] = false;
            }
            None => pending.entry((from, to)).or_default().push(i),
        }
    }

    let mut remaining = edges
        .iter()
        .zip(alive)
        .filter_map(|(edge, alive)| alive.then_some(*edge))
        .peekable();
    let Some(&(center, _)) = remaining.peek() else {
        return Vec::new();
    };

    remaining
        .filter(|(p, q)| *p != center && *q != center)
        .map(|(p, q)| vec![center, q, p])
        .collect()
}

/// Fan triangles of a convex polygon soup
fn fan(polygons: &[Polygon]) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
    polygons.iter().flat_map(|polygon| {
        (1..polygon.len().saturating_sub(1)).map(move |k| [polygon[0], polygon[k], polygon[k + 1]])
    })
}

/// Weld the polygon soup back into an indexed mesh in world coordinates
fn to_mesh(polygons: &[Polygon], origin: &Point3<f64>) -> Mesh {
    let mut mesh = Mesh::new();
    let mut index: AHashMap<PositionKey, usize> = AHashMap::new();

    for [a, b, c] in fan(polygons) {
        let indices = [a, b, c].map(|p| {
            *index
                .entry(position_key(&p))
                .or_insert_with(|| mesh.add_vertex(Vertex::at(p + origin.coords)))
        });
        if indices[0] != indices[1] && indices[1] != indices[2] && indices[0] != indices[2] {
            mesh.add_triangle(Triangle::new(indices));
        }
    }

    mesh.recompute_normals();
    mesh
}
