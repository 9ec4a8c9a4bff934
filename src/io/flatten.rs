// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Depth-first flattening of a model object graph.
//!
//! Containers nest objects under `elements` (or `@elements` in older
//! exports) and under `@`-prefixed properties that hold an `elements` list.
//! Instances place a shared `definition` with a `transform`; flattening
//! accumulates those transforms parent first.

use crate::error::ConversionError;
use crate::geometry::Transform;
use serde_json::{Map, Value};
use tracing::trace;

/// A model object reached by the traversal
#[derive(Debug, Clone)]
pub struct FlatObject<'a> {
    pub value: &'a Value,
    /// Own `id`, or the id inherited from the enclosing object
    pub id: Option<String>,
    /// Instance transforms from the root down, parent first
    pub transforms: Vec<Transform>,
}

impl<'a> FlatObject<'a> {
    pub fn speckle_type(&self) -> Option<&'a str> {
        self.value.get("speckle_type").and_then(Value::as_str)
    }
}

/// Flatten `root` into every object that is not itself an instance.
///
/// A definition reached through an instance keeps its own id and takes the
/// instance's id only when it has none.
pub fn flatten(root: &Value) -> Result<Vec<FlatObject<'_>>, ConversionError> {
    let mut out = Vec::new();
    visit(root, None, Vec::new(), &mut out)?;
    trace!(objects = out.len(), "flattened model");
    Ok(out)
}

fn visit<'a>(
    value: &'a Value,
    inherited_id: Option<&str>,
    mut transforms: Vec<Transform>,
    out: &mut Vec<FlatObject<'a>>,
) -> Result<(), ConversionError> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };
    let own_id = object.get("id").and_then(Value::as_str);
    let id = own_id.or(inherited_id);

    if is_instance(object) {
        if let Some(transform) = instance_transform(object)? {
            transforms.push(transform);
        }
        if let Some(definition) = object.get("definition").filter(|d| d.is_object()) {
            visit(definition, id, transforms, out)?;
        }
        return Ok(());
    }

    out.push(FlatObject {
        value,
        id: id.map(str::to_string),
        transforms: transforms.clone(),
    });

    for child in child_elements(object) {
        visit(child, id, transforms.clone(), out)?;
    }

    for (key, property) in object {
        if !key.starts_with('@') || key == "@elements" {
            continue;
        }
        if property.as_object().is_some_and(|p| p.contains_key("elements")) {
            visit(property, id, transforms.clone(), out)?;
        }
    }
    Ok(())
}

/// `elements`, falling back to `@elements` when the former is absent or empty
fn child_elements(object: &Map<String, Value>) -> &[Value] {
    let non_empty = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_array)
            .filter(|items| !items.is_empty())
            .map(Vec::as_slice)
    };
    non_empty("elements").or_else(|| non_empty("@elements")).unwrap_or(&[])
}

/// Instance types are `Objects.Other.Instance` and its subtypes such as
/// `Objects.Other.Revit.RevitInstance`, possibly inside a `:`-joined chain.
fn is_instance(object: &Map<String, Value>) -> bool {
    object
        .get("speckle_type")
        .and_then(Value::as_str)
        .is_some_and(|ty| {
            ty.split(':')
                .any(|segment| segment.starts_with("Objects.Other.") && segment.ends_with("Instance"))
        })
}

/// Read an instance transform: a bare 16-value array, or an object holding
/// it under `matrix` (current exports) or `value` (older exports).
fn instance_transform(object: &Map<String, Value>) -> Result<Option<Transform>, ConversionError> {
    let raw = match object.get("transform") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(t)) => match t.get("matrix").or_else(|| t.get("value")) {
            Some(values) => values,
            None => return Err(ConversionError::Malformed("instance transform has no matrix".into())),
        },
        Some(values) => values,
    };

    let values = raw
        .as_array()
        .ok_or_else(|| ConversionError::Malformed("instance transform is not an array".into()))?;
    let numbers = values
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| ConversionError::Malformed("instance transform holds non-numeric values".into()))?;
    Transform::from_row_major(&numbers).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use serde_json::json;

    fn translation(x: f64, y: f64, z: f64) -> Value {
        json!([1.0, 0.0, 0.0, x, 0.0, 1.0, 0.0, y, 0.0, 0.0, 1.0, z, 0.0, 0.0, 0.0, 1.0])
    }

    fn ids<'a>(flat: &'a [FlatObject<'_>]) -> Vec<Option<&'a str>> {
        flat.iter().map(|f| f.id.as_deref()).collect()
    }

    #[test]
    fn test_collection_is_walked_depth_first() {
        let model = json!({
            "id": "root",
            "speckle_type": "Speckle.Core.Models.Collection",
            "elements": [
                { "id": "a", "elements": [ { "id": "a1" } ] },
                { "id": "b" }
            ]
        });
        let flat = flatten(&model).unwrap();
        assert_eq!(ids(&flat), vec![Some("root"), Some("a"), Some("a1"), Some("b")]);
        assert!(flat.iter().all(|f| f.transforms.is_empty()));
    }

    #[test]
    fn test_legacy_containers() {
        let model = json!({
            "id": "commit",
            "elements": [],
            "@elements": [ { "id": "e1" } ],
            "@Structural Framing": { "id": "cat", "elements": [ { "id": "beam" } ] },
            "@Not a container": { "id": "ignored" }
        });
        let flat = flatten(&model).unwrap();
        assert_eq!(
            ids(&flat),
            vec![Some("commit"), Some("e1"), Some("cat"), Some("beam")]
        );
    }

    #[test]
    fn test_children_inherit_missing_id() {
        let model = json!({ "id": "parent", "elements": [ { "speckle_type": "Objects.Geometry.Mesh" } ] });
        let flat = flatten(&model).unwrap();
        assert_eq!(flat[1].id.as_deref(), Some("parent"));
    }

    #[test]
    fn test_instance_accumulates_transforms() {
        let model = json!({
            "id": "root",
            "elements": [{
                "id": "outer",
                "speckle_type": "Objects.Other.Instance:Objects.Other.BlockInstance",
                "transform": { "matrix": translation(10.0, 0.0, 0.0) },
                "definition": {
                    "id": "block",
                    "elements": [{
                        "id": "inner",
                        "speckle_type": "Objects.Other.Revit.RevitInstance",
                        "transform": translation(0.0, 5.0, 0.0),
                        "definition": { "id": "symbol", "speckle_type": "Objects.BuiltElements.Revit.RevitElementType" }
                    }]
                }
            }]
        });
        let flat = flatten(&model).unwrap();
        assert_eq!(ids(&flat), vec![Some("root"), Some("block"), Some("symbol")]);

        let symbol = &flat[2];
        assert_eq!(symbol.transforms.len(), 2);
        let combined = Transform::compose(&symbol.transforms);
        assert_eq!(
            combined.transform_point(&Point3::origin()),
            Point3::new(10.0, 5.0, 0.0)
        );
        // the sibling chain is not polluted by the nested instance
        assert_eq!(flat[1].transforms.len(), 1);
    }

    #[test]
    fn test_legacy_transform_value_key() {
        let model = json!({
            "id": "i",
            "speckle_type": "Objects.Other.Instance",
            "transform": { "value": translation(1.0, 2.0, 3.0) },
            "definition": { "id": "d" }
        });
        let flat = flatten(&model).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].id.as_deref(), Some("d"));
        assert_eq!(flat[0].transforms.len(), 1);
    }

    #[test]
    fn test_anonymous_definition_takes_instance_id() {
        let model = json!({
            "id": "fan-1",
            "speckle_type": "Objects.Other.Instance",
            "transform": translation(3.0, 0.0, 0.0),
            "definition": { "speckle_type": "Objects.Other.BlockDefinition", "elements": [ {} ] }
        });
        let flat = flatten(&model).unwrap();
        assert_eq!(ids(&flat), vec![Some("fan-1"), Some("fan-1")]);
    }

    #[test]
    fn test_definition_children_keep_their_ids() {
        let model = json!({
            "id": "placement",
            "speckle_type": "Objects.Other.Instance",
            "definition": {
                "id": "assembly",
                "elements": [ { "id": "bracket" }, { "id": "rod" }, {} ]
            }
        });
        let flat = flatten(&model).unwrap();
        assert_eq!(
            ids(&flat),
            vec![Some("assembly"), Some("bracket"), Some("rod"), Some("assembly")]
        );
    }

    #[test]
    fn test_instance_without_transform_or_definition() {
        let model = json!({ "id": "i", "speckle_type": "Objects.Other.Instance" });
        assert!(flatten(&model).unwrap().is_empty());

        let model = json!({ "id": "i", "speckle_type": "Objects.Other.Instance", "definition": { "id": "d" } });
        let flat = flatten(&model).unwrap();
        assert_eq!(flat[0].id.as_deref(), Some("d"));
        assert!(flat[0].transforms.is_empty());
    }

    #[test]
    fn test_invalid_transform_is_an_error() {
        let model = json!({
            "id": "i",
            "speckle_type": "Objects.Other.Instance",
            "transform": [1.0, 0.0, 0.0],
            "definition": { "id": "d" }
        });
        assert_eq!(
            flatten(&model).unwrap_err(),
            ConversionError::InvalidTransform { len: 3 }
        );
    }

    #[test]
    fn test_non_object_root() {
        assert!(flatten(&json!([1, 2, 3])).unwrap().is_empty());
    }
}
