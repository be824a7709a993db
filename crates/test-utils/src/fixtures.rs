//! Common test fixtures for incident cacher tests.
//!
//! These are small FeatureCollections shaped like the CalFire incident feed.

/// Sample incident documents.
pub mod incidents {
    use serde_json::{json, Value};

    /// Three features: active (bool), inactive (string "false"), and no flag.
    pub fn mixed_activity_collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {"properties": {"IsActive": true}},
                {"properties": {"IsActive": "false"}},
                {"properties": {}}
            ]
        })
    }

    /// A realistic slice of the CalFire feed with geometry and mixed flag types.
    ///
    /// "Park Fire" and "Line Fire" are active.
    pub fn calfire_sample() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-121.8, 39.9]},
                    "properties": {
                        "Name": "Park Fire",
                        "County": "Butte",
                        "AcresBurned": 429603,
                        "PercentContained": 100,
                        "IsActive": true,
                        "UniqueId": "1f3a6f0e-4e44-4c1b-9c35-2f2d2f3e2a11"
                    }
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-117.1, 34.2]},
                    "properties": {
                        "Name": "Bridge Fire",
                        "County": "Los Angeles",
                        "AcresBurned": 56030,
                        "PercentContained": 100,
                        "IsActive": false,
                        "UniqueId": "7b9e8c34-22a1-4b0e-8d0f-1c6b5e2f9a02"
                    }
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-117.2, 34.1]},
                    "properties": {
                        "Name": "Line Fire",
                        "County": "San Bernardino",
                        "AcresBurned": 43978,
                        "PercentContained": 95,
                        "IsActive": "True",
                        "UniqueId": "c0d2a6e1-9f5b-4d7a-a3e8-6b1f4c2d8e33"
                    }
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": {
                        "Name": "Airport Fire",
                        "County": "Orange",
                        "AcresBurned": 23526,
                        "PercentContained": 100,
                        "UniqueId": "5e4d3c2b-1a09-4f8e-b7d6-c5b4a3928170"
                    }
                }
            ]
        })
    }

    /// Raw feed text with numbers that only survive exact parsing: 17-digit
    /// coordinates, an integer beyond `u64` and a subnormal-edge double.
    pub const PRECISE_COLLECTION_TEXT: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": {
        "type": "Point",
        "coordinates": [-121.00002654435761, 39.762233460171434]
      },
      "properties": {
        "Name": "Park Fire",
        "AcresBurned": 12345678901234567890123,
        "X": 2.2250738585072011e-308,
        "IsActive": true
      }
    }
  ]
}"#;

    /// Number literals in [`PRECISE_COLLECTION_TEXT`] that must come out unchanged.
    pub const PRECISE_NUMBER_LITERALS: [&str; 4] = [
        "-121.00002654435761",
        "39.762233460171434",
        "12345678901234567890123",
        "2.2250738585072011e-308",
    ];

    /// A document that is valid JSON but not a FeatureCollection.
    pub fn not_a_collection() -> Value {
        json!({"type": "Foo", "message": "service unavailable"})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        let mixed = incidents::mixed_activity_collection();
        assert_eq!(mixed["features"].as_array().unwrap().len(), 3);

        let sample = incidents::calfire_sample();
        assert_eq!(sample["type"], "FeatureCollection");
        assert_eq!(sample["features"].as_array().unwrap().len(), 4);

        assert_ne!(incidents::not_a_collection()["type"], "FeatureCollection");

        for literal in incidents::PRECISE_NUMBER_LITERALS {
            assert!(incidents::PRECISE_COLLECTION_TEXT.contains(literal));
        }
    }
}
