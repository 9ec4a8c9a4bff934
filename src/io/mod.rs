// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! I/O module - model loading, flattening, filtering and mesh conversion

mod display_mesh;
mod flatten;
mod importer;
pub mod rules;

pub use display_mesh::{element_from_object, mesh_from_value, DisplayMesh};
pub use flatten::{flatten, FlatObject};
pub use importer::{load_elements, load_model};
pub use rules::{all_of, is_displayable_rule, speckle_type_rule, ElementRule};
