use chrono::{DateTime, Duration, TimeZone, Utc};

use water_data_filter::config::{CriteriaWeights, ScoringSettings};
use water_data_filter::domain::DatasetRecord;
use water_data_filter::scoring::Scorer;

fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

fn scorer() -> Scorer {
    Scorer::new(CriteriaWeights::default(), &ScoringSettings::default())
}

fn record(title: &str) -> DatasetRecord {
    DatasetRecord::new("phoenix".parse().unwrap(), title)
}

#[test]
fn perfect_record_scores_twelve() {
    let now = frozen_now();
    let mut rec = record("Residential Water Use by Zip Code 2023");
    rec.tags = vec!["residential".to_string()];
    rec.updated_at = Some((now - Duration::days(60)).to_rfc3339());
    rec.api_endpoint = Some("https://data.phoenix.gov/api/views/socrata-abcd".to_string());

    let scored = scorer().score(&rec, now);
    assert_eq!(scored.score, 12);
    assert_eq!(
        scored.feedback,
        vec![
            "✅ Zip code data",
            "✅ Residential focus",
            "✅ Recently updated",
            "✅ Recent years",
            "✅ API available",
        ]
    );
}

#[test]
fn bare_record_scores_zero() {
    let scored = scorer().score(&record("Water Infrastructure Report"), frozen_now());
    assert_eq!(scored.score, 0);
    assert_eq!(
        scored.feedback,
        vec![
            "❌ No zip code mention",
            "❌ No residential tag",
            "❌ Unknown update date",
            "❌ No recent years mentioned",
            "❌ No direct API",
        ]
    );
}

#[test]
fn stale_update_reports_age() {
    let now = frozen_now();
    let mut rec = record("Water Quality");
    rec.updated_at = Some((now - Duration::days(300)).to_rfc3339());
    let scored = scorer().score(&rec, now);
    assert_eq!(scored.score, 0);
    assert_eq!(scored.feedback[2], "❌ Last updated 10.0mo ago");
}

#[test]
fn unparsable_update_is_unknown() {
    let mut rec = record("Water Quality");
    rec.updated_at = Some("sometime last spring".to_string());
    let scored = scorer().score(&rec, frozen_now());
    assert_eq!(scored.feedback[2], "❌ Unknown update date");
}

#[test]
fn household_tag_counts_as_residential() {
    let mut rec = record("Water Accounts");
    rec.tags = vec!["household".to_string()];
    let scored = scorer().score(&rec, frozen_now());
    assert_eq!(scored.score, 3);
    assert_eq!(scored.feedback[1], "✅ Residential focus");
}

#[test]
fn neighborhood_in_description_counts_as_zip() {
    let mut rec = record("Water Use");
    rec.description = "Totals per Neighborhood association".to_string();
    let scored = scorer().score(&rec, frozen_now());
    assert_eq!(scored.score, 3);
}

#[test]
fn old_years_do_not_count_as_recent() {
    let mut rec = record("Water Use 2015-2019");
    rec.api_endpoint = Some("https://example.org/api".to_string());
    let scored = scorer().score(&rec, frozen_now());
    assert_eq!(scored.score, 0);
}

#[test]
fn api_marker_is_required() {
    let mut rec = record("Water Use");
    rec.api_endpoint = Some("https://data.phoenix.gov/resource/SOCRATA.json".to_string());
    assert_eq!(scorer().score(&rec, frozen_now()).score, 2);
    rec.api_endpoint = Some(String::new());
    assert_eq!(scorer().score(&rec, frozen_now()).score, 0);
}

#[test]
fn custom_weights_are_applied() {
    let weights = CriteriaWeights {
        has_zip_code: 10,
        ..CriteriaWeights::default()
    };
    let scorer = Scorer::new(weights, &ScoringSettings::default());
    let scored = scorer.score(&record("Postal water billing"), frozen_now());
    assert_eq!(scored.score, 10);
}

#[test]
fn score_stays_in_range_and_is_deterministic() {
    let now = frozen_now();
    let scorer = scorer();
    let max = CriteriaWeights::default().max_score();
    let titles = [
        "",
        "Zip",
        "Residential 2024",
        "Household water by postal code 2022",
        "Neighborhood residential zipcode 2026",
    ];
    for (idx, title) in titles.iter().enumerate() {
        let mut rec = record(title);
        if idx % 2 == 0 {
            rec.updated_at = Some((now - Duration::days(idx as i64 * 45)).to_rfc3339());
            rec.api_endpoint = Some("socrata".to_string());
        }
        let first = scorer.score(&rec, now);
        let second = scorer.score(&rec, now);
        assert!(first.score <= max);
        assert_eq!(first.feedback.len(), 5);
        assert_eq!(first, second);
    }
}
