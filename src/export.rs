use std::io::{self, Write};

use camino::Utf8Path;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CriteriaWeights;
use crate::domain::ScoredRecord;
use crate::error::FilterError;
use crate::fs_util::write_atomic;
use crate::ranking::EvaluationRun;

pub const CSV_HEADERS: [&str; 10] = [
    "source_id",
    "title",
    "description",
    "url",
    "api_endpoint",
    "updated_at",
    "row_count",
    "tags",
    "score",
    "feedback",
];

const CSV_SEP: char = ',';
const TAG_SEP: &str = ";";

/* ---------------- Evaluation table ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{sep}")?;
        } else {
            first = false;
        }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

fn record_row(scored: &ScoredRecord) -> Vec<String> {
    let record = &scored.record;
    vec![
        record.source_id.to_string(),
        record.title.clone(),
        record.description.clone(),
        record.url.clone(),
        record.api_endpoint.clone().unwrap_or_default(),
        record.updated_at.clone().unwrap_or_default(),
        record.row_count.to_string(),
        record.tags.join(TAG_SEP),
        scored.score.to_string(),
        scored.feedback_line(),
    ]
}

/// Renders the whole run as CSV, header first. An empty run yields the header only.
pub fn evaluation_csv(run: &EvaluationRun) -> Result<Vec<u8>, FilterError> {
    let mut buf: Vec<u8> = Vec::new();
    let headers: Vec<String> = CSV_HEADERS.iter().map(|h| h.to_string()).collect();
    write_row(&mut buf, &headers, CSV_SEP)
        .map_err(|err| FilterError::Serialization(err.to_string()))?;
    for scored in &run.records {
        write_row(&mut buf, &record_row(scored), CSV_SEP)
            .map_err(|err| FilterError::Serialization(err.to_string()))?;
    }
    Ok(buf)
}

pub fn write_evaluation_csv(run: &EvaluationRun, path: &Utf8Path) -> Result<(), FilterError> {
    let content = evaluation_csv(run)?;
    write_atomic(path, &content)?;
    tracing::info!(%path, rows = run.len(), "wrote evaluation table");
    Ok(())
}

/* ---------------- Top-pick document ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPickConfig {
    pub primary_dataset: PrimaryDataset,
    pub criteria_weights: CriteriaWeights,
    pub evaluation_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryDataset {
    pub source: String,
    pub url: String,
    pub api_endpoint: String,
    pub selection_reason: String,
    pub confidence_score: u32,
    pub selected_at: String,
}

impl TopPickConfig {
    /// Describes the best record of `run`; `None` when the run is empty.
    pub fn from_run(
        run: &EvaluationRun,
        weights: &CriteriaWeights,
        selected_at: DateTime<Utc>,
    ) -> Option<Self> {
        let best = run.top_pick()?;
        Some(Self {
            primary_dataset: PrimaryDataset {
                source: format!("{}: {}", best.record.source_id, best.record.title),
                url: best.record.url.clone(),
                api_endpoint: best.record.api_endpoint.clone().unwrap_or_default(),
                selection_reason: best.feedback_line(),
                confidence_score: best.score,
                selected_at: selected_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            criteria_weights: *weights,
            evaluation_timestamp: run
                .evaluated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    pub fn to_yaml(&self) -> Result<String, FilterError> {
        serde_yaml::to_string(self).map_err(|err| FilterError::Serialization(err.to_string()))
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), FilterError> {
        let content = self.to_yaml()?;
        write_atomic(path, content.as_bytes())?;
        tracing::info!(%path, source = %self.primary_dataset.source, "wrote top-pick config");
        Ok(())
    }
}
