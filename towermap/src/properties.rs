//! Typed property bags of map features.
//!
//! GeoJSON allows arbitrary JSON in feature properties. The map only understands strings, numbers
//! and the bounding box written by [`FeatureCollection::annotate_bounding_boxes`], so everything
//! else is rejected when the file is loaded.
//!
//! [`FeatureCollection::annotate_bounding_boxes`]: crate::FeatureCollection::annotate_bounding_boxes

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, TowerMapError};
use crate::geo_box::GeoBox;

/// Key of the bounding box property.
pub const BBOX_KEY: &str = "bbox";
/// Key of the property used as the display name of a feature.
pub const NAME_KEY: &str = "name";

/// Value of a feature property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// `[west, south, east, north]`.
    BBox([f64; 4]),
}

impl PropertyValue {
    fn from_json(key: &str, value: Value) -> Result<Option<Self>> {
        let invalid = |reason: &str| TowerMapError::InvalidProperty {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        match value {
            Value::Null => Ok(None),
            Value::Array(items) if key == BBOX_KEY => {
                let numbers = items
                    .iter()
                    .map(Value::as_f64)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("bounding box must contain only numbers"))?;
                let bbox: [f64; 4] = numbers
                    .try_into()
                    .map_err(|_| invalid("bounding box must have 4 values"))?;
                Ok(Some(Self::BBox(bbox)))
            }
            _ if key == BBOX_KEY => Err(invalid("bounding box must be an array of 4 numbers")),
            Value::String(s) => Ok(Some(Self::String(s))),
            Value::Number(n) => n
                .as_f64()
                .map(|v| Some(Self::Number(v)))
                .ok_or_else(|| invalid("number is out of range")),
            Value::Bool(_) => Err(invalid("boolean values are not supported")),
            Value::Array(_) => Err(invalid("arrays are only allowed for 'bbox'")),
            Value::Object(_) => Err(invalid("nested objects are not supported")),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            PropertyValue::String(s) => Value::String(s.clone()),
            PropertyValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropertyValue::BBox(bbox) => Value::Array(
                bbox.iter()
                    .map(|v| {
                        serde_json::Number::from_f64(*v)
                            .map(Value::Number)
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
            ),
        }
    }

    /// Text representation used for labels.
    pub fn to_label(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            PropertyValue::Number(n) => n.to_string(),
            PropertyValue::BBox(b) => format!("[{}, {}, {}, {}]", b[0], b[1], b[2], b[3]),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Property bag of a feature.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureProperties {
    values: BTreeMap<String, PropertyValue>,
}

impl FeatureProperties {
    /// Validates a GeoJSON properties object. `null` values are dropped.
    pub fn from_json(object: Map<String, Value>) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (key, value) in object {
            if let Some(value) = PropertyValue::from_json(&key, value)? {
                values.insert(key, value);
            }
        }

        Ok(Self { values })
    }

    /// Converts the bag back to a GeoJSON properties object.
    pub fn to_json(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }

    /// Value of the property.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    /// Value of the property if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Value of the property if it is a number.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display name of the feature.
    pub fn name(&self) -> Option<&str> {
        self.get_str(NAME_KEY)
    }

    /// Bounding box written by the collection annotation, or present in the source file.
    pub fn bbox(&self) -> Option<GeoBox> {
        match self.values.get(BBOX_KEY)? {
            PropertyValue::BBox(b) => Some(GeoBox::from_array(*b)),
            _ => None,
        }
    }

    /// Stores the bounding box, replacing the previous one.
    pub fn set_bbox(&mut self, geo_box: GeoBox) {
        self.values
            .insert(BBOX_KEY.to_string(), PropertyValue::BBox(geo_box.to_array()));
    }

    /// Sets the property, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn permitted_values() {
        let props = FeatureProperties::from_json(object(json!({
            "name": "Tower 12",
            "id": 12,
            "range_km": 2.5,
            "bbox": [1, 2, 3, 4],
            "comment": null,
        })))
        .expect("valid properties");

        assert_eq!(props.len(), 4);
        assert_eq!(props.name(), Some("Tower 12"));
        assert_eq!(props.get_number("range_km"), Some(2.5));
        assert_eq!(props.bbox(), Some(GeoBox::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(props.get("comment"), None);
        assert_eq!(props.get("id").map(PropertyValue::to_label), Some("12".into()));
    }

    #[test]
    fn rejected_values() {
        assert_matches!(
            FeatureProperties::from_json(object(json!({"active": true}))),
            Err(TowerMapError::InvalidProperty { key, .. }) if key == "active"
        );
        assert_matches!(
            FeatureProperties::from_json(object(json!({"bbox": [1, 2, 3]}))),
            Err(TowerMapError::InvalidProperty { key, .. }) if key == "bbox"
        );
        assert_matches!(
            FeatureProperties::from_json(object(json!({"bbox": [1, 2, "3", 4]}))),
            Err(TowerMapError::InvalidProperty { .. })
        );
        assert_matches!(
            FeatureProperties::from_json(object(json!({"bbox": "west-south-east-north"}))),
            Err(TowerMapError::InvalidProperty { key, .. }) if key == "bbox"
        );
        assert_matches!(
            FeatureProperties::from_json(object(json!({"bbox": 5}))),
            Err(TowerMapError::InvalidProperty { key, .. }) if key == "bbox"
        );
        assert_matches!(
            FeatureProperties::from_json(object(json!({"bands": [800, 1800]}))),
            Err(TowerMapError::InvalidProperty { key, .. }) if key == "bands"
        );
        assert_matches!(
            FeatureProperties::from_json(object(json!({"owner": {"name": "x"}}))),
            Err(TowerMapError::InvalidProperty { .. })
        );
    }

    #[test]
    fn bbox_is_replaced() {
        let mut props = FeatureProperties::default();
        props.insert("name", "A");
        props.set_bbox(GeoBox::new(0.0, 0.0, 1.0, 1.0));
        props.set_bbox(GeoBox::new(2.0, 2.0, 3.0, 3.0));

        assert_eq!(props.bbox(), Some(GeoBox::new(2.0, 2.0, 3.0, 3.0)));
        assert_eq!(
            Value::Object(props.to_json()),
            json!({"name": "A", "bbox": [2.0, 2.0, 3.0, 3.0]})
        );
    }
}
