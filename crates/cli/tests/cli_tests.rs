//! CLI integration tests

use std::path::PathBuf;
use std::process::{Command, Output};

fn artifact_path() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../models/mumbai_real_estate_investment_model.json")
        .display()
        .to_string()
}

fn valuate(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_valuate"))
        .args(args)
        .env_remove("VALUATION_API_URL")
        .env_remove("VALUATION_ARTIFACT_PATH")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute valuate")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = valuate(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("form"), "Should show form command");
    assert!(stdout.contains("model"), "Should show model command");
}

/// Test that the predict help lists every form field
#[test]
fn test_predict_help_lists_fields() {
    let output = valuate(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for flag in [
        "--area",
        "--bedrooms",
        "--bathrooms",
        "--balconies",
        "--age",
        "--total-floors",
        "--latitude",
        "--longitude",
        "--city",
        "--locality",
        "--property-type",
        "--furnished",
    ] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

/// Reference scenario against the shipped artifact
#[test]
fn test_predict_reference_scenario_json() {
    let artifact = artifact_path();
    let output = valuate(&[
        "--artifact",
        &artifact,
        "--format",
        "json",
        "predict",
        "--area",
        "900",
        "--locality",
        "Andheri West",
        "--property-type",
        "Apartment",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let price = value["price_per_sqft"].as_f64().unwrap();
    assert_eq!(price, 19_500.0);
    assert_eq!(value["estimated_value"].as_f64().unwrap(), price * 900.0);
}

/// Table output shows rupee amounts and the confirmation
#[test]
fn test_predict_table_output() {
    let artifact = artifact_path();
    let output = valuate(&["predict", "--artifact", &artifact]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("₹ 19,500"), "{}", stdout);
    assert!(stdout.contains("₹ 17,550,000"), "{}", stdout);
    assert!(stdout.contains("Prediction generated successfully"));
}

/// Out-of-range flags are clamped rather than rejected
#[test]
fn test_predict_clamps_flags() {
    let artifact = artifact_path();
    let output = valuate(&[
        "predict",
        "--artifact",
        &artifact,
        "--format",
        "json",
        "--area",
        "99999",
        "--bedrooms",
        "-4",
    ]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["area"].as_f64().unwrap(), 10_000.0);
}

/// Unknown choices fail without printing a valuation
#[test]
fn test_predict_rejects_unknown_property_type() {
    let artifact = artifact_path();
    let output = valuate(&["predict", "--artifact", &artifact, "--property-type", "Penthouse"]);

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("₹"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Penthouse"));
}

/// A missing artifact is reported as a load failure
#[test]
fn test_missing_artifact_fails() {
    let output = valuate(&["predict", "--artifact", "/nonexistent/model.json"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

/// Form listing works without a model
#[test]
fn test_form_json() {
    let output = valuate(&["form", "--format", "json", "--artifact", "/nonexistent/model.json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["fields"].as_array().unwrap().len(), 12);
}

/// Model command describes the shipped artifact
#[test]
fn test_model_command() {
    let artifact = artifact_path();
    let output = valuate(&["model", "--artifact", &artifact, "--format", "json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["estimator"], "tree_ensemble");
}
