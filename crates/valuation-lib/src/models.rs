//! Core data models for property valuation

use crate::error::{InputRangeError, PredictionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names of a property record, as the model was trained on them
pub mod fields {
    pub const AREA: &str = "area";
    pub const BEDROOM_NUM: &str = "bedroom_num";
    pub const BATHROOM_NUM: &str = "bathroom_num";
    pub const BALCONY_NUM: &str = "balcony_num";
    pub const AGE: &str = "age";
    pub const TOTAL_FLOORS: &str = "total_floors";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const CITY: &str = "city";
    pub const LOCALITY: &str = "locality";
    pub const PROPERTY_TYPE: &str = "property_type";
    pub const FURNISHED: &str = "furnished";

    pub const ALL: [&str; 12] = [
        AREA,
        BEDROOM_NUM,
        BATHROOM_NUM,
        BALCONY_NUM,
        AGE,
        TOTAL_FLOORS,
        LATITUDE,
        LONGITUDE,
        CITY,
        LOCALITY,
        PROPERTY_TYPE,
        FURNISHED,
    ];
}

/// Inclusive bounds of the numeric fields that the form clamps
pub const NUMERIC_BOUNDS: [(&str, f64, f64); 6] = [
    (fields::AREA, 200.0, 10_000.0),
    (fields::BEDROOM_NUM, 1.0, 10.0),
    (fields::BATHROOM_NUM, 1.0, 10.0),
    (fields::BALCONY_NUM, 0.0, 5.0),
    (fields::AGE, 0.0, 100.0),
    (fields::TOTAL_FLOORS, 1.0, 100.0),
];

/// A single value in a property record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One row of model input: named property attributes
///
/// Records are transient. The form builds one per prediction request and it
/// is dropped once the valuation has been produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyRecord {
    values: BTreeMap<String, FieldValue>,
}

impl PropertyRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return a copy of this record with `field` set to `value`
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Return a copy of this record without `field`
    pub fn without(mut self, field: &str) -> Self {
        self.values.remove(field);
        self
    }

    /// Numeric value of a field, failing if it is absent or not a number
    pub fn number(&self, field: &str) -> Result<f64, PredictionError> {
        match self.values.get(field) {
            Some(FieldValue::Number(n)) => Ok(*n),
            Some(FieldValue::Text(_)) => Err(PredictionError::WrongType {
                field: field.to_string(),
                expected: "a number",
            }),
            None => Err(PredictionError::MissingField(field.to_string())),
        }
    }

    /// Text value of a field, failing if it is absent or not text
    pub fn text(&self, field: &str) -> Result<&str, PredictionError> {
        match self.values.get(field) {
            Some(FieldValue::Text(s)) => Ok(s),
            Some(FieldValue::Number(_)) => Err(PredictionError::WrongType {
                field: field.to_string(),
                expected: "text",
            }),
            None => Err(PredictionError::MissingField(field.to_string())),
        }
    }

    /// Area of the property in square feet, if present
    pub fn area(&self) -> Option<f64> {
        self.values.get(fields::AREA).and_then(FieldValue::as_number)
    }

    /// Check the numeric fields against the bounds the form enforces
    ///
    /// Fields that are absent or not numeric are left for the predictor to
    /// reject.
    pub fn check_bounds(&self) -> Result<(), InputRangeError> {
        for (field, min, max) in NUMERIC_BOUNDS {
            if let Some(value) = self.values.get(field).and_then(FieldValue::as_number) {
                if !(min..=max).contains(&value) {
                    return Err(InputRangeError {
                        field: field.to_string(),
                        value,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyRecord
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Price estimate for one property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub price_per_sqft: f64,
    pub estimated_value: f64,
    pub area: f64,
}

impl Valuation {
    /// Derive the total value from the model's price per square foot
    pub fn from_prediction(price_per_sqft: f64, area: f64) -> Self {
        Self {
            price_per_sqft,
            estimated_value: price_per_sqft * area,
            area,
        }
    }
}

/// Description of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub estimator: String,
    pub target: String,
    pub features: Vec<String>,
}
