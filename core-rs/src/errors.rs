//! Error types for the CRM importer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Config file not found: {0}")]
    ConfigMissing(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RDF parse error: {0}")]
    RdfParse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote call to {url} failed with status {status}: {body}")]
    RemoteStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),

    #[error("Resource class lookup failed: {0}")]
    ClassLookup(String),

    #[error("No resource class for {subject} (type {term})")]
    UnresolvedClass { subject: String, term: String },

    #[error("{operation} failed for {subject}: {reason}")]
    RemoteCall {
        operation: &'static str,
        subject: String,
        reason: String,
    },
}

impl ImportError {
    /// Configuration problems terminate the CLI with status 1 before any
    /// network traffic.
    pub fn is_config_error(&self) -> bool {
        matches!(self, ImportError::ConfigMissing(_) | ImportError::ConfigInvalid(_))
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
