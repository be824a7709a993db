//! Active-incident filter.
//!
//! Derives the "active incidents" collection from the full upstream document.
//! Malformed input never fails the filter: a document that is not a
//! FeatureCollection yields an empty collection, and a feature whose shape
//! cannot be evaluated is dropped on its own.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::geojson::FeatureCollection;

/// Property holding the active flag on each incident.
pub const IS_ACTIVE_PROPERTY: &str = "IsActive";

/// Reason a single feature was excluded without being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureSkip {
    #[error("feature is not a JSON object (found {0})")]
    NotAnObject(&'static str),

    #[error("feature properties are not a JSON object (found {0})")]
    PropertiesNotAnObject(&'static str),
}

/// Build the active subset of `doc`.
///
/// Features keep their relative order and are copied verbatim. Only the
/// `type` and `features` members appear in the output.
pub fn filter_active(doc: &Value) -> FeatureCollection {
    if !FeatureCollection::is_feature_collection(doc) {
        warn!(
            found = json_kind(doc),
            "Input GeoJSON is not a FeatureCollection; returning empty"
        );
        return FeatureCollection::empty();
    }

    let features = match doc.get("features") {
        None => return FeatureCollection::empty(),
        Some(Value::Array(features)) => features,
        Some(other) => {
            warn!(
                found = json_kind(other),
                "FeatureCollection has no features array; returning empty"
            );
            return FeatureCollection::empty();
        }
    };

    let active: Vec<Value> = features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| match evaluate_feature(feature) {
            Ok(true) => Some(feature.clone()),
            Ok(false) => None,
            Err(skip) => {
                debug!(index, reason = %skip, "Skipping feature while checking IsActive");
                None
            }
        })
        .collect();

    info!(
        active = active.len(),
        total = features.len(),
        "Subset active incidents"
    );

    FeatureCollection::new(active)
}

/// Decide whether one feature is active.
///
/// `properties` defaults to an empty mapping when missing or null and
/// `IsActive` defaults to false.
pub fn evaluate_feature(feature: &Value) -> Result<bool, FeatureSkip> {
    let feature = feature
        .as_object()
        .ok_or_else(|| FeatureSkip::NotAnObject(json_kind(feature)))?;

    let empty = Map::new();
    let properties = match feature.get("properties") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(properties)) => properties,
        Some(other) => return Err(FeatureSkip::PropertiesNotAnObject(json_kind(other))),
    };

    Ok(properties.get(IS_ACTIVE_PROPERTY).is_some_and(is_active_value))
}

/// Coerce an `IsActive` value.
///
/// Strings are active only when they equal `"true"` ignoring case. Every
/// other value follows JSON truthiness: non-zero numbers and non-empty
/// arrays or objects count as active.
pub fn is_active_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => text.to_lowercase() == "true",
        // Out of f64 range means non-zero.
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(members) => !members.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
