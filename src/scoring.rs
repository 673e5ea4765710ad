use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::config::{CriteriaWeights, MAX_RECENT_YEAR_WINDOW, ScoringSettings};
use crate::domain::{Criterion, DatasetRecord, ScoredRecord};

const ZIP_KEYWORDS: [&str; 4] = ["zip", "zipcode", "postal", "neighborhood"];
const RESIDENTIAL_TAGS: [&str; 2] = ["residential", "household"];
const RECENT_UPDATE_MONTHS: f64 = 6.0;

/// Outcome of a single criterion: whether it passed and what to tell the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    pub criterion: Criterion,
    pub passed: bool,
    pub feedback: String,
}

impl Judgment {
    fn pass(criterion: Criterion, feedback: impl Into<String>) -> Self {
        Self {
            criterion,
            passed: true,
            feedback: feedback.into(),
        }
    }

    fn fail(criterion: Criterion, feedback: impl Into<String>) -> Self {
        Self {
            criterion,
            passed: false,
            feedback: feedback.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scorer {
    weights: CriteriaWeights,
    api_markers: Vec<String>,
    recent_year_window: u32,
}

impl Scorer {
    pub fn new(weights: CriteriaWeights, settings: &ScoringSettings) -> Self {
        Self {
            weights,
            api_markers: settings
                .api_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            recent_year_window: settings.recent_year_window.clamp(1, MAX_RECENT_YEAR_WINDOW),
        }
    }

    /// Scores `record` as of `now`. Same inputs always give the same result.
    pub fn score(&self, record: &DatasetRecord, now: DateTime<Utc>) -> ScoredRecord {
        let judgments = self.judge(record, now);
        let score = judgments
            .iter()
            .filter(|j| j.passed)
            .map(|j| self.weights.weight(j.criterion))
            .sum();
        ScoredRecord {
            record: record.clone(),
            score,
            feedback: judgments.into_iter().map(|j| j.feedback).collect(),
        }
    }

    pub fn judge(&self, record: &DatasetRecord, now: DateTime<Utc>) -> Vec<Judgment> {
        Criterion::ALL
            .iter()
            .map(|criterion| match criterion {
                Criterion::ZipCode => judge_zip_code(record),
                Criterion::Residential => judge_residential(record),
                Criterion::RecentUpdate => judge_recent_update(record, now),
                Criterion::RecentData => self.judge_recent_data(record, now),
                Criterion::DirectApi => self.judge_direct_api(record),
            })
            .collect()
    }

    /// Calendar years, newest first, that count as "recent" relative to `now`.
    pub fn recent_years(&self, now: DateTime<Utc>) -> Vec<String> {
        let current = now.year();
        let window = i32::try_from(self.recent_year_window).unwrap_or(1);
        (0..window)
            .map(|offset| (current - offset).to_string())
            .collect()
    }

    fn judge_recent_data(&self, record: &DatasetRecord, now: DateTime<Utc>) -> Judgment {
        let text = format!("{}{}", record.description, record.title).to_lowercase();
        if self.recent_years(now).iter().any(|year| text.contains(year)) {
            Judgment::pass(Criterion::RecentData, "✅ Recent years")
        } else {
            Judgment::fail(Criterion::RecentData, "❌ No recent years mentioned")
        }
    }

    fn judge_direct_api(&self, record: &DatasetRecord) -> Judgment {
        let has_api = record
            .api_endpoint
            .as_deref()
            .map(|endpoint| endpoint.to_lowercase())
            .is_some_and(|endpoint| {
                !endpoint.is_empty() && self.api_markers.iter().any(|m| endpoint.contains(m))
            });
        if has_api {
            Judgment::pass(Criterion::DirectApi, "✅ API available")
        } else {
            Judgment::fail(Criterion::DirectApi, "❌ No direct API")
        }
    }
}

fn judge_zip_code(record: &DatasetRecord) -> Judgment {
    let text = format!("{} {}", record.title, record.description).to_lowercase();
    if ZIP_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        Judgment::pass(Criterion::ZipCode, "✅ Zip code data")
    } else {
        Judgment::fail(Criterion::ZipCode, "❌ No zip code mention")
    }
}

fn judge_residential(record: &DatasetRecord) -> Judgment {
    let tagged = RESIDENTIAL_TAGS.iter().any(|tag| record.has_tag(tag));
    let text = format!("{}{}", record.title, record.description).to_lowercase();
    if tagged || text.contains("residential") {
        Judgment::pass(Criterion::Residential, "✅ Residential focus")
    } else {
        Judgment::fail(Criterion::Residential, "❌ No residential tag")
    }
}

fn judge_recent_update(record: &DatasetRecord, now: DateTime<Utc>) -> Judgment {
    let Some(updated) = record.updated_at.as_deref().and_then(parse_timestamp) else {
        return Judgment::fail(Criterion::RecentUpdate, "❌ Unknown update date");
    };
    let months_old = (now - updated).num_days() as f64 / 30.0;
    if months_old < RECENT_UPDATE_MONTHS {
        Judgment::pass(Criterion::RecentUpdate, "✅ Recently updated")
    } else {
        Judgment::fail(
            Criterion::RecentUpdate,
            format!("❌ Last updated {months_old:.1}mo ago"),
        )
    }
}

/// Parses the timestamp shapes open-data catalogs emit. Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ts| ts.and_utc());
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
