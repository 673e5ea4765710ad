use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FilterError {
    #[error("invalid portal id: {0}")]
    InvalidPortalId(String),

    #[error("invalid portal base url: {0}")]
    InvalidPortalUrl(String),

    #[error("unknown portal (not in the built-in registry): {0}")]
    #[diagnostic(help("use phoenix, tucson or maricopa, or give an object with id and base_url"))]
    UnknownPortal(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("portal request failed: {0}")]
    PortalHttp(String),

    #[error("portal returned status {status}: {message}")]
    PortalStatus { status: u16, message: String },

    #[error("unexpected catalog response: {0}")]
    CatalogShape(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to serialize output: {0}")]
    Serialization(String),
}

impl FilterError {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            FilterError::InvalidPortalId(_)
                | FilterError::InvalidPortalUrl(_)
                | FilterError::UnknownPortal(_)
                | FilterError::ConfigRead(_)
                | FilterError::ConfigParse(_)
                | FilterError::InvalidConfig(_)
        )
    }
}
