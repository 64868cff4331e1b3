//! CLI command tests
//!
//! Commands write JSON into a buffer; tests parse it back.

use prism_core::test_utils::{FixtureDir, FIXTURE_DATASET};
use prism_core::{CsvTableLoader, InsightService};
use serde_json::Value as Json;

use crate::commands::{self, Output};

fn setup() -> (FixtureDir, InsightService<CsvTableLoader>) {
    let fixture = FixtureDir::new();
    let service = fixture.service();
    (fixture, service)
}

/// Run a command against a fresh buffer and parse its output
fn run(
    command: impl FnOnce(&Output, &mut Vec<u8>) -> anyhow::Result<()>,
) -> anyhow::Result<Json> {
    let mut buf = Vec::new();
    command(&Output::new(true), &mut buf)?;
    Ok(serde_json::from_slice(&buf)?)
}

// ========== Output Tests ==========

#[test]
fn test_output_compact_is_single_line() {
    let mut buf = Vec::new();
    Output::new(true).emit(&mut buf, &vec!["a", "b"]).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "[\"a\",\"b\"]\n");
}

#[test]
fn test_output_pretty_is_indented() {
    let mut buf = Vec::new();
    Output::new(false).emit(&mut buf, &vec!["a"]).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("\n  \"a\""));
    assert!(text.ends_with("]\n"));
}

// ========== Service Setup Tests ==========

#[test]
fn test_open_service_with_data_dir() {
    let fixture = FixtureDir::new();
    let service = commands::open_service(Some(fixture.path()), None).unwrap();
    assert_eq!(service.config().data_dir, fixture.path());
    assert_eq!(service.read_dataset_names().unwrap(), vec![FIXTURE_DATASET]);
}

#[test]
fn test_open_service_missing_config_file() {
    let fixture = FixtureDir::new();
    let missing = fixture.path().join("nope.toml");
    let result = commands::open_service(Some(fixture.path()), Some(missing.as_path()));
    assert!(result.is_err());
}

#[test]
fn test_open_service_config_file() {
    let fixture = FixtureDir::new();
    let path = fixture.path().join("prism.toml");
    std::fs::write(&path, "[engine]\ntop_n = 1\n").unwrap();

    let service = commands::open_service(Some(fixture.path()), Some(path.as_path())).unwrap();
    assert_eq!(service.config().engine.top_n, 1);
}

// ========== Data Command Tests ==========

#[test]
fn test_cmd_datasets() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_datasets(&service, o, w)).unwrap();
    assert_eq!(json, serde_json::json!(["cars"]));
}

#[test]
fn test_cmd_bundle() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_bundle(&service, FIXTURE_DATASET, o, w)).unwrap();
    assert_eq!(json["feature"], serde_json::json!(["Year", "Brand"]));
    assert_eq!(json["record"].as_array().unwrap().len(), 8);
    assert_eq!(json["edge"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cmd_bundle_unknown_dataset() {
    let (_fixture, service) = setup();
    let err = run(|o, w| commands::cmd_bundle(&service, "boats", o, w)).unwrap_err();
    assert!(err.to_string().contains("boats"));
}

#[test]
fn test_cmd_subset() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_subset(&service, FIXTURE_DATASET, 4, o, w)).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Brand"], "BMW");
    assert_eq!(rows[0]["Sales"], 300);
    assert!(rows[0].get("cid").is_none());
}

#[test]
fn test_cmd_subset_unknown_sid_is_empty() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_subset(&service, FIXTURE_DATASET, 99, o, w)).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

#[test]
fn test_cmd_info() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_info(&service, FIXTURE_DATASET, o, w)).unwrap();
    assert!(json.is_object());
    assert!(json.to_string().contains("Sales"));
}

#[test]
fn test_cmd_attributes() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_attributes(&service, FIXTURE_DATASET, o, w)).unwrap();
    assert!(json["Brand"].is_object());
    assert!(json["Year"].is_object());
}

#[test]
fn test_cmd_slices() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_slices(&service, FIXTURE_DATASET, o, w)).unwrap();
    assert!(!json.as_array().unwrap().is_empty());
}

// ========== Insight Command Tests ==========

#[test]
fn test_cmd_insight_rendered() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_insight(&service, FIXTURE_DATASET, 0, o, w)).unwrap();
    assert_eq!(json["status"], "rendered");
    assert_eq!(json["insight_name"], "change point");
    assert_eq!(
        json["sentence"],
        "Among Years in all data, change occurs in 2012 and its total Sales is 450."
    );
}

#[test]
fn test_cmd_insight_unsupported_kind() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_insight(&service, FIXTURE_DATASET, 8, o, w)).unwrap();
    assert_eq!(json["status"], "nothing_to_render");
    assert_eq!(json["reason"], "unsupported_kind");
    assert_eq!(json["iid"], 8);
}

#[test]
fn test_cmd_insight_empty_subset() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_insight(&service, FIXTURE_DATASET, 9, o, w)).unwrap();
    assert_eq!(json["status"], "nothing_to_render");
    assert_eq!(json["reason"], "empty_subset");
    assert_eq!(json["sid"], 5);
}

#[test]
fn test_cmd_insight_unknown_iid() {
    let (_fixture, service) = setup();
    let err = run(|o, w| commands::cmd_insight(&service, FIXTURE_DATASET, 404, o, w)).unwrap_err();
    assert!(err.to_string().contains("404"));
}

// ========== Rank Command Tests ==========

#[test]
fn test_cmd_rank_records() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_rank_records(&service, FIXTURE_DATASET, o, w)).unwrap();
    let cids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["cid"].as_i64().unwrap())
        .collect();
    assert_eq!(cids, vec![5, 1, 3, 6, 7, 2, 4, 8]);
}

#[test]
fn test_cmd_rank_subspaces() {
    let (_fixture, service) = setup();
    let json = run(|o, w| commands::cmd_rank_subspaces(&service, FIXTURE_DATASET, o, w)).unwrap();
    let first = &json.as_array().unwrap()[0];
    assert_eq!(first["sid"], 0);
    assert_eq!(first["wildcard_count"], 2);
    assert_eq!(first["Brand"], "*");
}

#[test]
fn test_cmd_rank_memberships() {
    let (_fixture, service) = setup();
    let json =
        run(|o, w| commands::cmd_rank_memberships(&service, FIXTURE_DATASET, o, w)).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["cid"], 5);
}
