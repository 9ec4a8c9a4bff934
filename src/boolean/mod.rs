// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Mesh boolean backends.
//!
//! Clash detection only needs the intersection of two closed meshes and the
//! volume it encloses. Backends implement [`MeshBoolean`] and are injected
//! into the detector, so tests can run with [`NullBoolean`] and production
//! runs can pick the native clipper or parry.

mod clip;
mod null;
mod parry;

pub use clip::ClipBoolean;
pub use null::NullBoolean;
pub use parry::ParryBoolean;

use crate::error::BooleanError;
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Solid shared by two meshes
#[derive(Debug, Clone)]
pub struct Intersection {
    pub mesh: Mesh,
    /// Enclosed volume, never negative
    pub volume: f64,
}

impl Intersection {
    pub fn new(mesh: Mesh, volume: f64) -> Self {
        Self {
            mesh,
            volume: volume.max(0.0),
        }
    }

    /// Zero-volume results count as "no intersection"
    pub fn is_empty(&self) -> bool {
        self.volume <= 0.0
    }
}

/// Intersection capability used by the clash detector.
///
/// Implementations must be pure: the detector calls them concurrently from
/// many worker threads. The reported volume must not depend on which operand
/// is the subject and which is the tool; only the orientation of the returned
/// solid may.
pub trait MeshBoolean: Send + Sync {
    fn name(&self) -> &'static str;

    /// Intersect `subject` with `tool`. `Ok(None)` means the solids do not
    /// overlap.
    fn intersect(&self, subject: &Mesh, tool: &Mesh) -> Result<Option<Intersection>, BooleanError>;
}

impl<T: MeshBoolean + ?Sized> MeshBoolean for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn intersect(&self, subject: &Mesh, tool: &Mesh) -> Result<Option<Intersection>, BooleanError> {
        (**self).intersect(subject, tool)
    }
}

impl<T: MeshBoolean + ?Sized> MeshBoolean for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn intersect(&self, subject: &Mesh, tool: &Mesh) -> Result<Option<Intersection>, BooleanError> {
        (**self).intersect(subject, tool)
    }
}

/// Backend selector used by configuration and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Null,
    #[default]
    Clip,
    Parry,
}

impl BackendKind {
    pub fn create(self) -> Box<dyn MeshBoolean> {
        match self {
            Self::Null => Box::new(NullBoolean),
            Self::Clip => Box::new(ClipBoolean::default()),
            Self::Parry => Box::new(ParryBoolean),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Clip => "clip",
            Self::Parry => "parry",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null" | "none" => Ok(Self::Null),
            "clip" | "native" => Ok(Self::Clip),
            "parry" => Ok(Self::Parry),
            other => Err(format!("unknown boolean backend '{other}' (expected clip, parry or null)")),
        }
    }
}
