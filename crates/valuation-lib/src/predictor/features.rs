//! Feature encoding for ML inference
//!
//! Turns a [`PropertyRecord`] into the dense feature vector the estimator
//! was fitted on: numeric columns are standardized, categorical columns are
//! one-hot encoded over the vocabulary seen during training.

use crate::error::{LoadError, PredictionError};
use crate::models::PropertyRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do with a categorical value that was not seen during training
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Reject the record
    #[default]
    Error,
    /// Encode the value as all zeros
    Ignore,
}

/// One input column of the fitted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSpec {
    Numeric {
        name: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_scale")]
        scale: f64,
        /// Counts and ages: values with a fractional part are rejected
        #[serde(default)]
        integer: bool,
    },
    Categorical {
        name: String,
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

fn default_scale() -> f64 {
    1.0
}

impl ColumnSpec {
    pub fn name(&self) -> &str {
        match self {
            ColumnSpec::Numeric { name, .. } | ColumnSpec::Categorical { name, .. } => name,
        }
    }

    /// Number of encoded features this column produces
    pub fn width(&self) -> usize {
        match self {
            ColumnSpec::Numeric { .. } => 1,
            ColumnSpec::Categorical { categories, .. } => categories.len(),
        }
    }
}

/// Column transformer fitted alongside the estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    columns: Vec<ColumnSpec>,
}

impl Preprocessor {
    /// Build a preprocessor, checking the column definitions are usable
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, LoadError> {
        let preprocessor = Self { columns };
        preprocessor.validate()?;
        Ok(preprocessor)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.columns.is_empty() {
            return Err(LoadError::Incompatible("preprocessor has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name()) {
                return Err(LoadError::Incompatible(format!(
                    "column '{}' is defined twice",
                    column.name()
                )));
            }
            match column {
                ColumnSpec::Numeric {
                    name, mean, scale, ..
                } => {
                    if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                        return Err(LoadError::Incompatible(format!(
                            "column '{}' has an invalid scaler (mean {}, scale {})",
                            name, mean, scale
                        )));
                    }
                }
                ColumnSpec::Categorical { name, categories, .. } => {
                    if categories.is_empty() {
                        return Err(LoadError::Incompatible(format!(
                            "column '{}' has an empty vocabulary",
                            name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Total width of the encoded feature vector
    pub fn output_width(&self) -> usize {
        self.columns.iter().map(ColumnSpec::width).sum()
    }

    /// Encode a record into the estimator's feature vector
    ///
    /// The record must carry exactly the columns the pipeline was fitted on.
    pub fn transform(&self, record: &PropertyRecord) -> Result<Vec<f64>, PredictionError> {
        if let Some(extra) = record
            .field_names()
            .find(|field| !self.columns.iter().any(|c| c.name() == *field))
        {
            return Err(PredictionError::UnexpectedField(extra.to_string()));
        }

        let mut features = Vec::with_capacity(self.output_width());
        for column in &self.columns {
            match column {
                ColumnSpec::Numeric {
                    name,
                    mean,
                    scale,
                    integer,
                } => {
                    let value = record.number(name)?;
                    if !value.is_finite() {
                        return Err(PredictionError::WrongType {
                            field: name.clone(),
                            expected: "a finite number",
                        });
                    }
                    if *integer && value.fract() != 0.0 {
                        return Err(PredictionError::WrongType {
                            field: name.clone(),
                            expected: "an integer",
                        });
                    }
                    features.push((value - mean) / scale);
                }
                ColumnSpec::Categorical {
                    name,
                    categories,
                    handle_unknown,
                } => {
                    let value = record.text(name)?;
                    let position = categories.iter().position(|c| c == value);
                    if position.is_none() && *handle_unknown == HandleUnknown::Error {
                        return Err(PredictionError::UnknownCategory {
                            field: name.clone(),
                            value: value.to_string(),
                        });
                    }
                    features.extend((0..categories.len()).map(|i| {
                        if Some(i) == position {
                            1.0
                        } else {
                            0.0
                        }
                    }));
                }
            }
        }

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(vec![
            ColumnSpec::Numeric {
                name: "area".to_string(),
                mean: 1000.0,
                scale: 500.0,
                integer: false,
            },
            ColumnSpec::Numeric {
                name: "bedroom_num".to_string(),
                mean: 0.0,
                scale: 1.0,
                integer: true,
            },
            ColumnSpec::Categorical {
                name: "furnished".to_string(),
                categories: vec![
                    "Furnished".to_string(),
                    "Semi-Furnished".to_string(),
                    "Unfurnished".to_string(),
                ],
                handle_unknown: HandleUnknown::Error,
            },
            ColumnSpec::Categorical {
                name: "locality".to_string(),
                categories: vec!["Andheri West".to_string(), "Bandra West".to_string()],
                handle_unknown: HandleUnknown::Ignore,
            },
        ])
        .unwrap()
    }

    fn record(area: f64, furnished: &str, locality: &str) -> PropertyRecord {
        PropertyRecord::from_iter([
            ("area", FieldValue::from(area)),
            ("bedroom_num", FieldValue::from(2u32)),
            ("furnished", FieldValue::from(furnished)),
            ("locality", FieldValue::from(locality)),
        ])
    }

    #[test]
    fn test_transform_scales_and_one_hot_encodes() {
        let p = preprocessor();
        assert_eq!(p.output_width(), 7);

        let features = p
            .transform(&record(1500.0, "Unfurnished", "Bandra West"))
            .unwrap();
        assert_eq!(features, vec![1.0, 2.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_category_rejected_when_strict() {
        let err = preprocessor()
            .transform(&record(900.0, "Luxury", "Andheri West"))
            .unwrap_err();
        assert_eq!(
            err,
            PredictionError::UnknownCategory {
                field: "furnished".to_string(),
                value: "Luxury".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_category_ignored_when_lenient() {
        let features = preprocessor()
            .transform(&record(1000.0, "Furnished", "Powai"))
            .unwrap();
        assert_eq!(features, vec![0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_and_extra_fields_rejected() {
        let p = preprocessor();

        let missing = record(900.0, "Furnished", "Powai").without("area");
        assert_eq!(
            p.transform(&missing),
            Err(PredictionError::MissingField("area".to_string()))
        );

        let extra = record(900.0, "Furnished", "Powai").with("parking", 2u32);
        assert_eq!(
            p.transform(&extra),
            Err(PredictionError::UnexpectedField("parking".to_string()))
        );
    }

    #[test]
    fn test_wrong_type_rejected() {
        let bad = record(900.0, "Furnished", "Powai").with("area", "nine hundred");
        assert!(matches!(
            preprocessor().transform(&bad),
            Err(PredictionError::WrongType { .. })
        ));
    }

    #[test]
    fn test_fractional_count_rejected() {
        let p = preprocessor();

        let half_bedroom = record(900.0, "Furnished", "Powai").with("bedroom_num", 2.5);
        assert_eq!(
            p.transform(&half_bedroom),
            Err(PredictionError::WrongType {
                field: "bedroom_num".to_string(),
                expected: "an integer"
            })
        );

        // Non-integer columns keep their fractional part
        let odd_area = record(1234.5, "Furnished", "Powai");
        assert!(p.transform(&odd_area).is_ok());
    }

    #[test]
    fn test_invalid_columns_fail_to_load() {
        let zero_scale = Preprocessor::new(vec![ColumnSpec::Numeric {
            name: "area".to_string(),
            mean: 0.0,
            scale: 0.0,
            integer: false,
        }]);
        assert!(matches!(zero_scale, Err(LoadError::Incompatible(_))));

        let duplicate = Preprocessor::new(vec![
            ColumnSpec::Numeric {
                name: "age".to_string(),
                mean: 0.0,
                scale: 1.0,
                integer: true,
            },
            ColumnSpec::Numeric {
                name: "age".to_string(),
                mean: 0.0,
                scale: 1.0,
                integer: true,
            },
        ]);
        assert!(matches!(duplicate, Err(LoadError::Incompatible(_))));

        assert!(Preprocessor::new(vec![]).is_err());
    }

    #[test]
    fn test_column_spec_json() {
        let spec: ColumnSpec = serde_json::from_str(
            r#"{"name": "city", "kind": "categorical", "categories": ["Mumbai"]}"#,
        )
        .unwrap();
        assert_eq!(spec.width(), 1);
        assert!(matches!(
            spec,
            ColumnSpec::Categorical {
                handle_unknown: HandleUnknown::Error,
                ..
            }
        ));

        let spec: ColumnSpec =
            serde_json::from_str(r#"{"name": "age", "kind": "numeric"}"#).unwrap();
        assert_eq!(
            spec,
            ColumnSpec::Numeric {
                name: "age".to_string(),
                mean: 0.0,
                scale: 1.0,
                integer: false
            }
        );
    }
}
