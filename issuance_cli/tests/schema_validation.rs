use issuance_lib::aggregate::Dimension;
use issuance_lib::{load_from_files, DateRange, ReportData};
use serde_json::Value;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("CLI crate should be inside workspace")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    workspace_root().join("issuance_api/tests/fixtures").join(name)
}

fn load_schema(name: &str) -> Value {
    let path = workspace_root().join("schema").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read schema {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("schema is valid JSON")
}

fn load_data() -> ReportData {
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );
    load_from_files(
        range,
        &fixture("payments.json"),
        &fixture("vehicles_syrian.json"),
        &fixture("vehicles_foreign.json"),
    )
    .expect("fixtures load")
}

fn summary_json(data: &ReportData, dimension: Dimension) -> Value {
    let report = data.run(dimension.report_id());
    serde_json::to_value(report.rows()).expect("rows serialize")
}

// ---------------------------------------------------------------------------
// Positive validation: every report conforms to the summary schema
// ---------------------------------------------------------------------------

#[test]
fn test_every_report_conforms_to_schema() {
    let data = load_data();
    let schema = load_schema("report_summary.schema.json");
    let validator = jsonschema::draft202012::new(&schema).expect("summary schema compiles");

    for dimension in Dimension::ALL {
        let rows = summary_json(&data, dimension);
        assert!(!rows.as_array().unwrap().is_empty(), "{dimension} produced no rows");
        if let Err(e) = validator.validate(&rows) {
            panic!("{dimension} rows failed validation: {e}");
        }
    }
}

#[test]
fn test_empty_array_conforms_to_schema() {
    let schema = load_schema("report_summary.schema.json");
    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(validator.validate(&serde_json::json!([])).is_ok());
}

// ---------------------------------------------------------------------------
// Negative validation: schema rejects malformed rows
// ---------------------------------------------------------------------------

#[test]
fn test_schema_rejects_missing_count() {
    let data = load_data();
    let schema = load_schema("report_summary.schema.json");
    let mut rows = summary_json(&data, Dimension::Category);

    rows[0].as_object_mut().expect("row is an object").remove("count");

    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(
        validator.validate(&rows).is_err(),
        "schema should reject a row missing count"
    );
}

#[test]
fn test_schema_rejects_additional_properties() {
    let data = load_data();
    let schema = load_schema("report_summary.schema.json");
    let mut rows = summary_json(&data, Dimension::Month);

    rows[0]
        .as_object_mut()
        .expect("row is an object")
        .insert("records".to_string(), Value::Array(Vec::new()));

    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(
        validator.validate(&rows).is_err(),
        "schema should reject additional properties"
    );
}

#[test]
fn test_schema_rejects_fractional_count() {
    let schema = load_schema("report_summary.schema.json");
    let rows = serde_json::json!([
        { "key": "01", "label": "Category 01", "count": 1.5, "total": 10.0 }
    ]);
    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(validator.validate(&rows).is_err());
}
