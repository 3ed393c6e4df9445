//! Predict command: fill the form and value the property

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;
use valuation_lib::{valuate, FormInput, PropertyForm};

use super::Backend;
use crate::output::{format_inr, print_json, print_success, print_table, print_warning, OutputFormat, DISCLAIMER};

/// Row for the valuation results table
#[derive(Tabled, Serialize)]
struct ResultRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Valuation as printed in JSON mode
#[derive(Debug, Serialize)]
pub struct PredictionOutput {
    pub price_per_sqft: f64,
    pub estimated_value: f64,
    pub area: f64,
    pub model_version: String,
}

/// Value one property from the given form input
pub async fn predict(backend: &Backend, input: FormInput, format: OutputFormat) -> Result<()> {
    let output = match backend {
        Backend::Local(predictor) => {
            let form = PropertyForm::from_input(&input)?;
            let record = form.submit();
            debug!(?record, "Submitting property record");

            let valuation = valuate(predictor, &record)
                .with_context(|| format!("Prediction failed (model: {})", predictor.source()))?;
            let model_version = predictor.model_info()?.version;

            PredictionOutput {
                price_per_sqft: valuation.price_per_sqft,
                estimated_value: valuation.estimated_value,
                area: valuation.area,
                model_version,
            }
        }
        Backend::Remote(client) => {
            let response = client.predict(&input).await?;
            PredictionOutput {
                price_per_sqft: response.price_per_sqft,
                estimated_value: response.estimated_value,
                area: response.area,
                model_version: response.model_version,
            }
        }
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            println!("Valuation Results");
            let rows = [
                ResultRow {
                    metric: "Predicted Price per Sqft",
                    value: format_inr(output.price_per_sqft),
                },
                ResultRow {
                    metric: "Estimated Property Value",
                    value: format_inr(output.estimated_value),
                },
            ];
            print_table(&rows, format);
            print_success("Prediction generated successfully");
            print_warning(DISCLAIMER);
        }
    }

    Ok(())
}
