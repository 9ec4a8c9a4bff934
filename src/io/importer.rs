// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Model file importer

use super::display_mesh::element_from_object;
use super::flatten::flatten;
use super::rules::ElementRule;
use crate::element::Element;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read a JSON model file
pub fn load_model(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;

    serde_json::from_str(&source).with_context(|| format!("Failed to parse model file: {}", path.display()))
}

/// Flatten `model`, keep the objects accepted by `rule` and convert them.
///
/// Objects without an id cannot be reported and are skipped.
pub fn load_elements(model: &Value, rule: &ElementRule) -> Result<Vec<Element>> {
    let objects = flatten(model).context("Failed to flatten model")?;
    let total = objects.len();

    let mut elements = Vec::new();
    for object in objects.iter().filter(|o| rule(o.value)) {
        let Some(id) = object.id.as_deref() else {
            warn!(speckle_type = object.speckle_type(), "skipping object without id");
            continue;
        };
        elements.push(element_from_object(object, id));
    }

    debug!(objects = total, selected = elements.len(), "loaded elements");
    Ok(elements)
}
