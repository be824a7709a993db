//! Minimal GeoJSON model.
//!
//! Features are kept as raw [`serde_json::Value`]s so geometry, ids and any
//! unknown members pass through untouched.

use serde::Serialize;
use serde_json::Value;

/// Literal value of the `type` member on a feature collection.
pub const FEATURE_COLLECTION_TYPE: &str = "FeatureCollection";

/// A GeoJSON FeatureCollection with opaque features.
///
/// Serializes as `{"type": "FeatureCollection", "features": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Value>) -> Self {
        Self { features }
    }

    /// An empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns true if `doc` is a mapping whose `type` is exactly `"FeatureCollection"`.
    pub fn is_feature_collection(doc: &Value) -> bool {
        doc.as_object()
            .and_then(|obj| obj.get("type"))
            .and_then(Value::as_str)
            == Some(FEATURE_COLLECTION_TYPE)
    }
}

/// Number of entries in a document's `features` array, if it has one.
pub fn feature_count(doc: &Value) -> Option<usize> {
    doc.get("features").and_then(Value::as_array).map(Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_type_tag() {
        let fc = FeatureCollection::new(vec![json!({"properties": {"Name": "Park Fire"}})]);
        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [{"properties": {"Name": "Park Fire"}}]
            })
        );
    }

    #[test]
    fn test_empty_collection() {
        let value = serde_json::to_value(FeatureCollection::empty()).unwrap();
        assert_eq!(value, json!({"type": "FeatureCollection", "features": []}));
    }

    #[test]
    fn test_is_feature_collection() {
        assert!(FeatureCollection::is_feature_collection(
            &json!({"type": "FeatureCollection", "features": []})
        ));
        assert!(!FeatureCollection::is_feature_collection(&json!({})));
        assert!(!FeatureCollection::is_feature_collection(&json!({"type": "Foo"})));
        assert!(!FeatureCollection::is_feature_collection(
            &json!({"type": "featurecollection"})
        ));
        assert!(!FeatureCollection::is_feature_collection(&json!([1, 2])));
        assert!(!FeatureCollection::is_feature_collection(&json!("FeatureCollection")));
    }

    #[test]
    fn test_feature_count() {
        assert_eq!(feature_count(&json!({"features": [{}, {}]})), Some(2));
        assert_eq!(feature_count(&json!({"features": null})), None);
        assert_eq!(feature_count(&json!(42)), None);
    }
}
