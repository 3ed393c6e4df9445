//! Mumbai property valuation CLI
//!
//! Fills in the property details form from command-line flags and prints
//! the predicted price per square foot and total property value.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{form, model, predict, Backend};
use tracing_subscriber::EnvFilter;
use valuation_lib::predictor::DEFAULT_ARTIFACT_PATH;
use valuation_lib::{FormInput, ValuationPredictor};

/// Mumbai Real Estate Investment Intelligence System
#[derive(Parser)]
#[command(name = "valuate")]
#[command(author, version, about = "Mumbai property valuation from a pre-trained model", long_about = None)]
pub struct Cli {
    /// Valuation server URL; predictions run locally when not set
    #[arg(long, env = "VALUATION_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Model artifact for local predictions
    #[arg(long, env = "VALUATION_ARTIFACT_PATH", global = true)]
    pub artifact: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict price per sqft and total value for a property
    Predict(PropertyArgs),

    /// Show the form fields with their bounds and defaults
    Form,

    /// Show the valuation model in use
    Model,
}

/// Property details; values outside a field's range are clamped
#[derive(Args, Debug, Default)]
pub struct PropertyArgs {
    /// Area in sqft (200-10000) [default: 900]
    #[arg(long)]
    pub area: Option<f64>,

    /// Bedrooms (1-10) [default: 2]
    #[arg(long, allow_negative_numbers = true)]
    pub bedrooms: Option<i64>,

    /// Bathrooms (1-10) [default: 2]
    #[arg(long, allow_negative_numbers = true)]
    pub bathrooms: Option<i64>,

    /// Balconies (0-5) [default: 1]
    #[arg(long, allow_negative_numbers = true)]
    pub balconies: Option<i64>,

    /// Property age in years (0-100) [default: 5]
    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    /// Total floors in the building (1-100) [default: 15]
    #[arg(long, allow_negative_numbers = true)]
    pub total_floors: Option<i64>,

    /// Latitude [default: 19.0760]
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude [default: 72.8777]
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// City (Mumbai) [default: Mumbai]
    #[arg(long)]
    pub city: Option<String>,

    /// Locality [default: Andheri West]
    #[arg(long)]
    pub locality: Option<String>,

    /// Property type (Apartment, Villa, Independent House) [default: Apartment]
    #[arg(long)]
    pub property_type: Option<String>,

    /// Furnishing (Unfurnished, Semi-Furnished, Furnished) [default: Unfurnished]
    #[arg(long)]
    pub furnished: Option<String>,
}

impl From<PropertyArgs> for FormInput {
    fn from(args: PropertyArgs) -> Self {
        FormInput {
            area: args.area,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            balconies: args.balconies,
            age: args.age,
            total_floors: args.total_floors,
            latitude: args.latitude,
            longitude: args.longitude,
            city: args.city,
            locality: args.locality,
            property_type: args.property_type,
            furnished: args.furnished,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Pick the backend: flags and environment first, then the config file
fn backend(cli: &Cli) -> Result<Backend> {
    let file = config::Config::load()?;

    if let Some(url) = cli.api_url.clone().or(file.api_url) {
        return Ok(Backend::Remote(client::ApiClient::new(&url)?));
    }

    let artifact = cli
        .artifact
        .clone()
        .or(file.artifact_path)
        .unwrap_or_else(|| DEFAULT_ARTIFACT_PATH.to_string());
    Ok(Backend::Local(ValuationPredictor::from_path(artifact)))
}

async fn run(cli: Cli) -> Result<()> {
    let backend = backend(&cli)?;

    match cli.command {
        Commands::Predict(args) => {
            predict::predict(&backend, args.into(), cli.format).await?;
        }
        Commands::Form => {
            form::show_form(&backend, cli.format).await?;
        }
        Commands::Model => {
            model::show_model(&backend, cli.format).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
