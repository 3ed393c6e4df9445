//! Form command: list the property details the model takes

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use valuation_lib::form::Control;
use valuation_lib::{form_schema, FormSchema};

use super::Backend;
use crate::output::{print_json, print_table, OutputFormat};

/// Row for the form fields table
#[derive(Tabled, Serialize)]
struct FieldRow {
    #[tabled(rename = "Flag")]
    flag: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Range / Choices")]
    range: String,
    #[tabled(rename = "Default")]
    default: String,
}

fn bound(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "any".to_string())
}

fn to_rows(schema: &FormSchema) -> Vec<FieldRow> {
    schema
        .fields
        .iter()
        .map(|field| {
            let (range, default) = match &field.control {
                Control::Number {
                    min,
                    max,
                    default,
                    decimals,
                    ..
                } => (
                    format!("{} .. {}", bound(*min), bound(*max)),
                    format!("{:.*}", *decimals as usize, default),
                ),
                Control::Select {
                    choices, default, ..
                } => (choices.join(" | "), default.clone()),
                Control::Text { default } => ("free text".to_string(), default.clone()),
            };
            FieldRow {
                flag: format!("--{}", field.name.replace('_', "-")),
                label: field.label.clone(),
                range,
                default,
            }
        })
        .collect()
}

/// Show the form's fields with their bounds and defaults
pub async fn show_form(backend: &Backend, format: OutputFormat) -> Result<()> {
    let schema = match backend {
        Backend::Local(_) => form_schema(),
        Backend::Remote(client) => client.form().await?,
    };

    match format {
        OutputFormat::Json => print_json(&schema),
        OutputFormat::Table => {
            println!("{}", schema.title);
            print_table(&to_rows(&schema), format);
        }
    }
    Ok(())
}
