use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::{DatasetRecord, Portal, PortalId};
use crate::error::FilterError;
use crate::export::{TopPickConfig, write_evaluation_csv};
use crate::portal::{PortalClient, extract_records};
use crate::ranking::{EvaluationRun, rank};
use crate::scoring::Scorer;

#[derive(Debug, Clone, Serialize)]
pub struct PortalFailure {
    pub source_id: PortalId,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub records: Vec<DatasetRecord>,
    pub failures: Vec<PortalFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub datasets_found: usize,
    pub failures: Vec<PortalFailure>,
    pub evaluation_csv: String,
    pub top_pick: Option<TopPickSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPickSummary {
    pub source_id: String,
    pub title: String,
    pub score: u32,
    pub max_score: u32,
    pub feedback: String,
    pub config_path: String,
}

#[derive(Debug, Clone)]
pub struct PersistResult {
    pub evaluation_csv: String,
    pub top_pick: Option<TopPickConfig>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<P: PortalClient> {
    config: ResolvedConfig,
    client: P,
    scorer: Scorer,
}

impl<P: PortalClient> App<P> {
    pub fn new(config: ResolvedConfig, client: P) -> Self {
        let scorer = Scorer::new(config.weights, &config.scoring);
        Self {
            config,
            client,
            scorer,
        }
    }

    /// Fetch, score, rank and persist, once.
    pub fn run(
        &self,
        now: DateTime<Utc>,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, FilterError> {
        sink.event(ProgressEvent {
            message: format!(
                "Searching {} portal(s) for \"{}\" datasets...",
                self.config.portals.len(),
                self.config.search.query
            ),
            elapsed: None,
        });
        let report = self.fetch(sink);

        sink.event(ProgressEvent {
            message: format!("Found {} datasets. Evaluating...", report.records.len()),
            elapsed: None,
        });
        let datasets_found = report.records.len();
        let run = self.evaluate(&report.records, now);
        let persisted = self.persist(&run, now, sink)?;

        let max_score = self.config.weights.max_score();
        let top_pick = run.top_pick().map(|best| TopPickSummary {
            source_id: best.record.source_id.to_string(),
            title: best.record.title.clone(),
            score: best.score,
            max_score,
            feedback: best.feedback_line(),
            config_path: self.config.output.top_pick_config.to_string(),
        });

        Ok(RunSummary {
            datasets_found,
            failures: report.failures,
            evaluation_csv: persisted.evaluation_csv,
            top_pick,
        })
    }

    /// Queries every registered portal in order. A failing portal contributes
    /// no records and is listed in the report instead.
    pub fn fetch(&self, sink: &dyn ProgressSink) -> FetchReport {
        let mut report = FetchReport::default();
        for portal in &self.config.portals {
            let started = Instant::now();
            match self.fetch_portal(portal) {
                Ok(records) => {
                    tracing::debug!(portal = %portal.id, count = records.len(), "portal fetched");
                    sink.event(ProgressEvent {
                        message: format!("{}: {} dataset(s)", portal.id, records.len()),
                        elapsed: Some(started.elapsed()),
                    });
                    report.records.extend(records);
                }
                Err(err) => {
                    tracing::warn!(portal = %portal.id, error = %err, "portal fetch failed");
                    sink.event(ProgressEvent {
                        message: format!("Error fetching {}: {err}", portal.id),
                        elapsed: Some(started.elapsed()),
                    });
                    report.failures.push(PortalFailure {
                        source_id: portal.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }

    fn fetch_portal(&self, portal: &Portal) -> Result<Vec<DatasetRecord>, FilterError> {
        let search = &self.config.search;
        let raw = self.client.search(portal, &search.query, search.limit)?;
        extract_records(portal, &raw)
    }

    pub fn evaluate(&self, records: &[DatasetRecord], now: DateTime<Utc>) -> EvaluationRun {
        let scored = records
            .iter()
            .map(|record| self.scorer.score(record, now))
            .collect();
        rank(scored, now)
    }

    /// Writes the evaluation table and, when the run is non-empty, the top-pick config.
    pub fn persist(
        &self,
        run: &EvaluationRun,
        selected_at: DateTime<Utc>,
        sink: &dyn ProgressSink,
    ) -> Result<PersistResult, FilterError> {
        let output = &self.config.output;
        write_evaluation_csv(run, &output.evaluation_csv)?;
        sink.event(ProgressEvent {
            message: format!("Saved full evaluation to {}", output.evaluation_csv),
            elapsed: None,
        });

        let top_pick = TopPickConfig::from_run(run, &self.config.weights, selected_at);
        match (&top_pick, run.top_pick()) {
            (Some(config), Some(best)) => {
                config.write(&output.top_pick_config)?;
                sink.event(ProgressEvent {
                    message: format!(
                        "Top dataset: {} ({})\nScore: {}/{}\nFeedback: {}\nConfig saved to {}",
                        best.record.title,
                        best.record.source_id,
                        best.score,
                        self.config.weights.max_score(),
                        best.feedback_line(),
                        output.top_pick_config
                    ),
                    elapsed: None,
                });
            }
            _ => {
                sink.event(ProgressEvent {
                    message: "No suitable dataset found; config not written".to_string(),
                    elapsed: None,
                });
            }
        }

        Ok(PersistResult {
            evaluation_csv: output.evaluation_csv.to_string(),
            top_pick,
        })
    }
}
