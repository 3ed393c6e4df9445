//! Model command: describe the valuation model in use

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;

use super::Backend;
use crate::output::{print_info, print_json, print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct ModelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Estimator")]
    estimator: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Features")]
    features: usize,
}

/// Show the loaded model's description
pub async fn show_model(backend: &Backend, format: OutputFormat) -> Result<()> {
    let info = match backend {
        Backend::Local(predictor) => predictor
            .model_info()
            .with_context(|| format!("Failed to load model artifact {}", predictor.source()))?,
        Backend::Remote(client) => client.model().await?,
    };

    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table => {
            let row = ModelRow {
                name: info.name.clone(),
                version: info.version.clone(),
                estimator: info.estimator.clone(),
                target: info.target.clone(),
                features: info.features.len(),
            };
            print_table(&[row], format);
            print_info(&format!("Inputs: {}", info.features.join(", ")));
        }
    }
    Ok(())
}
