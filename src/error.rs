// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Error types for the geometry, conversion, boolean and detection layers.

use thiserror::Error;

/// Errors raised by the polygon triangulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriangulationError {
    /// A polygon needs at least three vertices.
    #[error("polygon has {count} vertices, at least 3 are required")]
    TooFewVertices { count: usize },

    /// The Newell normal vanished (collinear or coincident vertices).
    #[error("polygon normal is degenerate (collinear or coincident vertices)")]
    DegenerateNormal,

    /// A full ring scan found no convex vertex.
    #[error("no convex ear found with {remaining} vertices left (non-planar or self-intersecting polygon)")]
    NoEarFound { remaining: usize },
}

/// Errors raised while building a [`crate::geometry::Mesh`] from raw buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// Errors raised when source display geometry cannot become a triangular mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Flat coordinate buffer is not a multiple of three.
    #[error("vertex buffer has {len} values, expected a multiple of 3")]
    VertexBuffer { len: usize },

    /// A face announces more indices than remain in the buffer.
    #[error("face at offset {offset} announces {size} indices but only {available} remain")]
    TruncatedFace {
        offset: usize,
        size: usize,
        available: usize,
    },

    /// A face marker or index is negative or otherwise unusable.
    #[error("invalid face data at offset {offset}: {value}")]
    InvalidFaceValue { offset: usize, value: i64 },

    /// A transform does not hold 16 numbers.
    #[error("transform must contain 16 values, got {len}")]
    InvalidTransform { len: usize },

    /// The display value is not shaped like a mesh.
    #[error("malformed display mesh: {0}")]
    Malformed(String),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("polygon face could not be triangulated: {0}")]
    Triangulation(#[from] TriangulationError),
}

/// Errors raised by a mesh boolean backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BooleanError {
    /// An operand is not a closed surface.
    #[error("{operand} mesh is not closed ({open_edges} boundary edges)")]
    OpenMesh {
        operand: &'static str,
        open_edges: usize,
    },

    /// The clipping backend needs at least one convex operand.
    #[error("neither operand is convex; use a general boolean backend")]
    NonConvex,

    /// An operand has no usable face plane (empty or flat).
    #[error("{operand} mesh has no non-degenerate faces")]
    DegenerateOperand { operand: &'static str },

    /// Failure reported by an external geometry library.
    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

/// Errors raised by the clash detector.
#[derive(Debug, Error)]
pub enum ClashError {
    /// A pair check failed; the batch was aborted.
    #[error("clash check between '{reference_id}' and '{candidate_id}' failed: {source}")]
    Task {
        reference_id: String,
        candidate_id: String,
        #[source]
        source: BooleanError,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
