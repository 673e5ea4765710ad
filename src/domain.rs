use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalId(String);

impl PortalId {
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PortalId {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !is_valid {
            return Err(FilterError::InvalidPortalId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// One open-data portal exposing a catalog search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    pub id: PortalId,
    pub base_url: String,
}

impl Portal {
    pub fn new(id: PortalId, base_url: &str) -> Result<Self, FilterError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let has_scheme = trimmed.starts_with("https://") || trimmed.starts_with("http://");
        let has_host = trimmed
            .split_once("://")
            .map(|(_, host)| !host.is_empty())
            .unwrap_or(false);
        if !has_scheme || !has_host {
            return Err(FilterError::InvalidPortalUrl(base_url.to_string()));
        }
        Ok(Self {
            id,
            base_url: trimmed.to_string(),
        })
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/api/catalog/v1", self.base_url)
    }
}

/// A dataset discovered on a portal, flattened from the catalog response.
///
/// Every field except `source_id` may be empty when the portal omits it; missing
/// values only lower the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetRecord {
    pub source_id: PortalId,
    pub title: String,
    pub description: String,
    pub url: String,
    pub api_endpoint: Option<String>,
    pub updated_at: Option<String>,
    pub row_count: u64,
    pub tags: Vec<String>,
}

impl DatasetRecord {
    pub fn new(source_id: PortalId, title: impl Into<String>) -> Self {
        Self {
            source_id,
            title: title.into(),
            description: String::new(),
            url: String::new(),
            api_endpoint: None,
            updated_at: None,
            row_count: 0,
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecord {
    pub record: DatasetRecord,
    pub score: u32,
    pub feedback: Vec<String>,
}

impl ScoredRecord {
    pub fn feedback_line(&self) -> String {
        self.feedback.join(" | ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    ZipCode,
    Residential,
    RecentUpdate,
    RecentData,
    DirectApi,
}

impl Criterion {
    /// Evaluation order; feedback entries follow it.
    pub const ALL: [Criterion; 5] = [
        Criterion::ZipCode,
        Criterion::Residential,
        Criterion::RecentUpdate,
        Criterion::RecentData,
        Criterion::DirectApi,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Criterion::ZipCode => "has_zip_code",
            Criterion::Residential => "residential_only",
            Criterion::RecentUpdate => "monthly_updates",
            Criterion::RecentData => "recent_data",
            Criterion::DirectApi => "direct_api",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_portal_id_normalizes_case() {
        let id: PortalId = " Phoenix ".parse().unwrap();
        assert_eq!(id.as_str(), "phoenix");
    }

    #[test]
    fn parse_portal_id_invalid() {
        let err = "data portal".parse::<PortalId>().unwrap_err();
        assert_matches!(err, FilterError::InvalidPortalId(_));
        let err = "".parse::<PortalId>().unwrap_err();
        assert_matches!(err, FilterError::InvalidPortalId(_));
    }

    #[test]
    fn portal_url_strips_trailing_slash() {
        let portal = Portal::new("tucson".parse().unwrap(), "https://data.tucsonaz.gov/").unwrap();
        assert_eq!(
            portal.catalog_url(),
            "https://data.tucsonaz.gov/api/catalog/v1"
        );
    }

    #[test]
    fn portal_url_requires_scheme() {
        let err = Portal::new("tucson".parse().unwrap(), "data.tucsonaz.gov").unwrap_err();
        assert_matches!(err, FilterError::InvalidPortalUrl(_));
        let err = Portal::new("tucson".parse().unwrap(), "https://").unwrap_err();
        assert_matches!(err, FilterError::InvalidPortalUrl(_));
    }

    #[test]
    fn criterion_keys_follow_weight_names() {
        let keys: Vec<_> = Criterion::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(
            keys,
            vec![
                "has_zip_code",
                "residential_only",
                "monthly_updates",
                "recent_data",
                "direct_api"
            ]
        );
    }
}
