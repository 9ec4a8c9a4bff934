// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Attribute predicates that select the elements taking part in a run

use serde_json::Value;

/// Predicate over a raw model object
pub type ElementRule = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Accept objects whose `speckle_type` is exactly one of `types`
pub fn speckle_type_rule<I, S>(types: I) -> ElementRule
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = types.into_iter().map(Into::into).collect();
    Box::new(move |object| {
        object
            .get("speckle_type")
            .and_then(Value::as_str)
            .is_some_and(|ty| allowed.iter().any(|a| a == ty))
    })
}

/// Accept objects with a non-empty `displayValue`
pub fn is_displayable_rule() -> ElementRule {
    Box::new(|object| match object.get("displayValue") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    })
}

/// Accept objects that satisfy every rule; an empty set accepts everything
pub fn all_of(rules: Vec<ElementRule>) -> ElementRule {
    Box::new(move |object| rules.iter().all(|rule| rule(object)))
}
