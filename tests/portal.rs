use std::fs;

use assert_matches::assert_matches;
use serde_json::json;

use water_data_filter::domain::Portal;
use water_data_filter::error::FilterError;
use water_data_filter::config::{CriteriaWeights, ScoringSettings};
use water_data_filter::portal::extract_records;
use water_data_filter::scoring::Scorer;

fn phoenix() -> Portal {
    Portal::new("phoenix".parse().unwrap(), "https://data.phoenix.gov").unwrap()
}

#[test]
fn extract_catalog_records() {
    let raw = fs::read_to_string("tests/fixtures/catalog_phoenix.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = extract_records(&phoenix(), &value).unwrap();

    assert_eq!(records.len(), 3);

    let first = &records[0];
    assert_eq!(first.source_id.as_str(), "phoenix");
    assert_eq!(first.title, "Residential Water Consumption by Zip Code");
    assert_eq!(first.url, "https://data.phoenix.gov/d/abcd-1234");
    assert_eq!(first.row_count, 48213);
    assert_eq!(first.updated_at.as_deref(), Some("2026-08-30T17:04:11.000Z"));
    assert!(first.api_endpoint.as_deref().unwrap().contains("socrata"));
    assert_eq!(first.tags, vec!["water", "residential", "utilities"]);

    let second = &records[1];
    assert_eq!(second.title, "Water Main Breaks");
    assert_eq!(second.description, "");
    assert_eq!(second.row_count, 0);
    assert_eq!(second.api_endpoint, None);
    assert_eq!(second.updated_at.as_deref(), Some("not a date"));
    assert_eq!(
        second.url,
        "https://data.phoenix.gov/Utilities/Water-Main-Breaks/wxyz-9876"
    );

    let third = &records[2];
    assert_eq!(third.title, "No title");
    assert!(third.tags.is_empty());
    assert_eq!(third.updated_at, None);
}

#[test]
fn description_is_truncated() {
    let long = "x".repeat(1000);
    let value = json!({"results": [{"resource": {"name": "Long", "description": long}}]});
    let records = extract_records(&phoenix(), &value).unwrap();
    assert_eq!(records[0].description.len(), 300);
}

#[test]
fn numeric_updated_at_is_kept_as_text() {
    let value = json!({"results": [{"resource": {"updatedAt": 1767225600}}]});
    let records = extract_records(&phoenix(), &value).unwrap();
    assert_eq!(records[0].updated_at.as_deref(), Some("1767225600"));
}

#[test]
fn empty_results_yield_no_records() {
    let records = extract_records(&phoenix(), &json!({"results": []})).unwrap();
    assert!(records.is_empty());
}

#[test]
fn malformed_body_is_rejected() {
    let err = extract_records(&phoenix(), &json!({"error": "rate limited"})).unwrap_err();
    assert_matches!(err, FilterError::CatalogShape(_));
    let err = extract_records(&phoenix(), &json!(["results"])).unwrap_err();
    assert_matches!(err, FilterError::CatalogShape(_));
}

#[test]
fn tags_come_from_resource_only() {
    let value = json!({"results": [{
        "resource": {"name": "Water Use", "tags": []},
        "classification": {"domain_tags": ["residential"], "tags": ["household"]}
    }]});
    let records = extract_records(&phoenix(), &value).unwrap();
    assert!(records[0].tags.is_empty());

    let scorer = Scorer::new(CriteriaWeights::default(), &ScoringSettings::default());
    let scored = scorer.score(&records[0], chrono::Utc::now());
    assert_eq!(scored.score, 0);
    assert_eq!(scored.feedback[1], "❌ No residential tag");
}

#[test]
fn name_passes_through_unchanged() {
    let value = json!({"results": [
        {"resource": {"name": "  Water Use  "}},
        {"resource": {"name": "   "}},
        {"resource": {"name": 42}}
    ]});
    let records = extract_records(&phoenix(), &value).unwrap();
    assert_eq!(records[0].title, "  Water Use  ");
    assert_eq!(records[1].title, "   ");
    assert_eq!(records[2].title, "No title");
}
