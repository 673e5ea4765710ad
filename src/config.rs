use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{Criterion, Portal, PortalId};
use crate::error::FilterError;

pub const DEFAULT_CONFIG_FILE: &str = "water-filter.json";

pub const MAX_RECENT_YEAR_WINDOW: u32 = 100;

/// Built-in portal registry, in fetch order.
pub const BUILTIN_PORTALS: [(&str, &str); 3] = [
    ("phoenix", "https://data.phoenix.gov"),
    ("tucson", "https://data.tucsonaz.gov"),
    ("maricopa", "https://data.maricopa.gov"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaWeights {
    pub has_zip_code: u32,
    pub residential_only: u32,
    pub monthly_updates: u32,
    pub recent_data: u32,
    pub direct_api: u32,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            has_zip_code: 3,
            residential_only: 3,
            monthly_updates: 2,
            recent_data: 2,
            direct_api: 2,
        }
    }
}

impl CriteriaWeights {
    pub fn weight(&self, criterion: Criterion) -> u32 {
        match criterion {
            Criterion::ZipCode => self.has_zip_code,
            Criterion::Residential => self.residential_only,
            Criterion::RecentUpdate => self.monthly_updates,
            Criterion::RecentData => self.recent_data,
            Criterion::DirectApi => self.direct_api,
        }
    }

    pub fn max_score(&self) -> u32 {
        Criterion::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    fn validate(&self) -> Result<(), FilterError> {
        for criterion in Criterion::ALL {
            if self.weight(criterion) == 0 {
                return Err(FilterError::InvalidConfig(format!(
                    "weight for {criterion} must be positive"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub portals: Option<Vec<PortalEntry>>,
    #[serde(default)]
    pub weights: Option<CriteriaWeights>,
    #[serde(default)]
    pub search: Option<SearchEntry>,
    #[serde(default)]
    pub scoring: Option<ScoringEntry>,
    #[serde(default)]
    pub output: Option<OutputEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortalEntry {
    Shorthand(String),
    Detailed(PortalEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PortalEntryObject {
    pub id: String,
    pub base_url: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SearchEntry {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScoringEntry {
    #[serde(default)]
    pub api_markers: Option<Vec<String>>,
    #[serde(default)]
    pub recent_year_window: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputEntry {
    #[serde(default)]
    pub evaluation_csv: Option<String>,
    #[serde(default)]
    pub top_pick_config: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub query: String,
    pub limit: u32,
    pub timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            query: "water".to_string(),
            limit: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringSettings {
    pub api_markers: Vec<String>,
    pub recent_year_window: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            api_markers: vec!["socrata".to_string()],
            recent_year_window: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub evaluation_csv: Utf8PathBuf,
    pub top_pick_config: Utf8PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            evaluation_csv: Utf8PathBuf::from("results_water_evaluation.csv"),
            top_pick_config: Utf8PathBuf::from("config").join("data_config.yaml"),
        }
    }
}

/// Run configuration, resolved once at start-up and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub portals: Vec<Portal>,
    pub weights: CriteriaWeights,
    pub search: SearchSettings,
    pub scoring: ScoringSettings,
    pub output: OutputPaths,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            portals: builtin_portals(),
            weights: CriteriaWeights::default(),
            search: SearchSettings::default(),
            scoring: ScoringSettings::default(),
            output: OutputPaths::default(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `water-filter.json` when present, else the built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, FilterError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| FilterError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| FilterError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, FilterError> {
        let defaults = ResolvedConfig::default();

        let portals = match config.portals {
            Some(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    PortalEntry::Shorthand(value) => builtin_portal(&value),
                    PortalEntry::Detailed(obj) => Portal::new(obj.id.parse()?, &obj.base_url),
                })
                .collect::<Result<Vec<_>, FilterError>>()?,
            None => defaults.portals,
        };
        for (idx, portal) in portals.iter().enumerate() {
            if portals[..idx].iter().any(|p| p.id == portal.id) {
                return Err(FilterError::InvalidConfig(format!(
                    "duplicate portal id: {}",
                    portal.id
                )));
            }
        }

        let weights = config.weights.unwrap_or(defaults.weights);
        weights.validate()?;

        let search_entry = config.search.unwrap_or_default();
        let search = SearchSettings {
            query: search_entry
                .query
                .map(|q| q.trim().to_string())
                .unwrap_or(defaults.search.query),
            limit: search_entry.limit.unwrap_or(defaults.search.limit),
            timeout: search_entry
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.search.timeout),
        };
        if search.query.is_empty() {
            return Err(FilterError::InvalidConfig(
                "search query must not be empty".to_string(),
            ));
        }
        if search.limit == 0 {
            return Err(FilterError::InvalidConfig(
                "search limit must be at least 1".to_string(),
            ));
        }
        if search.timeout.is_zero() {
            return Err(FilterError::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        let scoring_entry = config.scoring.unwrap_or_default();
        let scoring = ScoringSettings {
            api_markers: scoring_entry
                .api_markers
                .map(|markers| {
                    markers
                        .into_iter()
                        .map(|m| m.trim().to_lowercase())
                        .filter(|m| !m.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.scoring.api_markers),
            recent_year_window: scoring_entry
                .recent_year_window
                .unwrap_or(defaults.scoring.recent_year_window),
        };
        if scoring.recent_year_window == 0 {
            return Err(FilterError::InvalidConfig(
                "recent_year_window must be at least 1".to_string(),
            ));
        }
        if scoring.recent_year_window > MAX_RECENT_YEAR_WINDOW {
            return Err(FilterError::InvalidConfig(format!(
                "recent_year_window must be at most {MAX_RECENT_YEAR_WINDOW}"
            )));
        }

        let output_entry = config.output.unwrap_or_default();
        let output = OutputPaths {
            evaluation_csv: output_entry
                .evaluation_csv
                .map(Utf8PathBuf::from)
                .unwrap_or(defaults.output.evaluation_csv),
            top_pick_config: output_entry
                .top_pick_config
                .map(Utf8PathBuf::from)
                .unwrap_or(defaults.output.top_pick_config),
        };

        Ok(ResolvedConfig {
            portals,
            weights,
            search,
            scoring,
            output,
        })
    }
}

pub fn builtin_portals() -> Vec<Portal> {
    BUILTIN_PORTALS
        .into_iter()
        .map(|(id, url)| Portal {
            id: PortalId::from_static(id),
            base_url: url.to_string(),
        })
        .collect()
}

fn builtin_portal(value: &str) -> Result<Portal, FilterError> {
    let id: PortalId = value.parse()?;
    builtin_portals()
        .into_iter()
        .find(|portal| portal.id == id)
        .ok_or_else(|| FilterError::UnknownPortal(value.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_match_registry() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        let ids: Vec<_> = resolved.portals.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["phoenix", "tucson", "maricopa"]);
        assert_eq!(resolved.weights.max_score(), 12);
        assert_eq!(resolved.search.query, "water");
        assert_eq!(resolved.search.limit, 10);
        assert_eq!(
            resolved.output.top_pick_config,
            Utf8PathBuf::from("config/data_config.yaml")
        );
    }

    #[test]
    fn zero_weight_rejected() {
        let config = Config {
            weights: Some(CriteriaWeights {
                direct_api: 0,
                ..CriteriaWeights::default()
            }),
            ..Config::default()
        };
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, FilterError::InvalidConfig(_));
    }
}
