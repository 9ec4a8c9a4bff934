// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

use super::{Intersection, MeshBoolean};
use crate::error::BooleanError;
use crate::geometry::Mesh;

/// Backend that never finds an intersection.
///
/// Deterministic stand-in for tests and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBoolean;

impl MeshBoolean for NullBoolean {
    fn name(&self) -> &'static str {
        "null"
    }

    fn intersect(&self, _subject: &Mesh, _tool: &Mesh) -> Result<Option<Intersection>, BooleanError> {
        Ok(None)
    }
}
