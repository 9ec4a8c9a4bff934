// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! 4×4 transforms and transform-chain composition

use crate::error::ConversionError;
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

/// Homogeneous 4×4 transform applied to column vectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from 16 values in row-major order, the layout used by model
    /// exchange formats.
    pub fn from_row_major(values: &[f64]) -> Result<Self, ConversionError> {
        if values.len() != 16 {
            return Err(ConversionError::InvalidTransform { len: values.len() });
        }
        Ok(Self {
            matrix: Matrix4::from_row_slice(values),
        })
    }

    /// Compose a parent-to-child chain into one matrix.
    ///
    /// `chain[0]` is the outermost (parent) transform; a point is first mapped
    /// by the last entry and finally by the first.
    pub fn compose<'a, I>(chain: I) -> Self
    where
        I: IntoIterator<Item = &'a Transform>,
    {
        let matrix = chain
            .into_iter()
            .fold(Matrix4::identity(), |combined, t| combined * t.matrix);
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
