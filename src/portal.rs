use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::domain::{DatasetRecord, Portal};
use crate::error::FilterError;

pub const DESCRIPTION_LIMIT: usize = 300;

const STATUS_MESSAGE_LIMIT: usize = 200;

const NO_TITLE: &str = "No title";

pub trait PortalClient {
    /// Runs one catalog search against `portal` and returns the raw response body.
    fn search(&self, portal: &Portal, query: &str, limit: u32) -> Result<Value, FilterError>;
}

#[derive(Clone)]
pub struct PortalHttpClient {
    client: Client,
}

impl PortalHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FilterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("water-data-filter/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| FilterError::PortalHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| FilterError::PortalHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, FilterError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .map(|text| status_message(&text))
            .unwrap_or_else(|_| "catalog request failed".to_string());
        Err(FilterError::PortalStatus { status, message })
    }
}

impl PortalClient for PortalHttpClient {
    fn search(&self, portal: &Portal, query: &str, limit: u32) -> Result<Value, FilterError> {
        let url = portal.catalog_url();
        tracing::debug!(portal = %portal.id, %url, query, limit, "catalog search");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.to_string()), ("limit", limit.to_string())])
            .send()
            .map_err(|err| FilterError::PortalHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .json()
            .map_err(|err| FilterError::PortalHttp(err.to_string()))
    }
}

/// Flattens a catalog search response into dataset records.
///
/// The body must be an object holding a `results` array; anything else is
/// reported as [`FilterError::CatalogShape`]. Individual items never fail:
/// missing fields fall back to empty values.
pub fn extract_records(portal: &Portal, raw: &Value) -> Result<Vec<DatasetRecord>, FilterError> {
    let results = raw
        .as_object()
        .ok_or_else(|| FilterError::CatalogShape("response is not a JSON object".to_string()))?
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FilterError::CatalogShape("missing `results` array".to_string()))?;

    Ok(results
        .iter()
        .map(|item| extract_record(portal, item))
        .collect())
}

fn extract_record(portal: &Portal, item: &Value) -> DatasetRecord {
    let resource = item.get("resource").filter(|v| v.is_object());
    let field = |name: &str| resource.and_then(|r| r.get(name));

    let title = field("name")
        .and_then(|v| v.as_str())
        .unwrap_or(NO_TITLE)
        .to_string();
    let description = field("description")
        .and_then(|v| v.as_str())
        .map(|v| truncate_chars(v, DESCRIPTION_LIMIT))
        .unwrap_or_default();
    let url = item
        .get("permalink")
        .and_then(|v| v.as_str())
        .or_else(|| item.get("link").and_then(|v| v.as_str()))
        .unwrap_or("")
        .to_string();
    let api_endpoint = field("apiEndpoint")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string());
    let updated_at = field("updatedAt").and_then(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let row_count = field("rowCount").and_then(|v| v.as_u64()).unwrap_or(0);

    let mut tags = Vec::new();
    if let Some(values) = field("tags").and_then(|v| v.as_array()) {
        for value in values {
            if let Some(tag) = value.as_str() {
                push_tag(&mut tags, tag);
            }
        }
    }

    DatasetRecord {
        source_id: portal.id.clone(),
        title,
        description,
        url,
        api_endpoint,
        updated_at,
        row_count,
        tags,
    }
}

fn push_tag(tags: &mut Vec<String>, raw: &str) {
    let tag = raw.trim().to_lowercase();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Error bodies can be whole HTML pages; keep only the start.
fn status_message(body: &str) -> String {
    truncate_chars(body.trim(), STATUS_MESSAGE_LIMIT)
}

pub fn truncate_chars(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}
