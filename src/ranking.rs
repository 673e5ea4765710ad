use chrono::{DateTime, Utc};

use crate::domain::ScoredRecord;

/// All scored records of one invocation, best first.
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    pub evaluated_at: DateTime<Utc>,
    pub records: Vec<ScoredRecord>,
}

impl EvaluationRun {
    pub fn top_pick(&self) -> Option<&ScoredRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sorts descending by score. Equal scores keep their fetch order.
pub fn rank(mut records: Vec<ScoredRecord>, evaluated_at: DateTime<Utc>) -> EvaluationRun {
    records.sort_by(|a, b| b.score.cmp(&a.score));
    EvaluationRun {
        evaluated_at,
        records,
    }
}
