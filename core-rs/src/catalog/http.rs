//! HttpCatalog: Omeka S REST client
//!
//! Provides the importer's catalog operations over HTTP:
//! - `GET  {base}/resource_classes?per_page=N` (total in `omeka-s-total-results`)
//! - `POST {base}/items`
//! - `PATCH {base}/items/{id}`
//!
//! The API key pair travels as query parameters on every request.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tracing::debug;

use super::{CatalogApi, ClassAssignment, CreatedItem, PropertyBag, ResourceClass, ResourceClassPage};
use crate::config::{ApiSettings, Authentication};
use crate::errors::{ImportError, Result};

/// Response header carrying the unpaginated result count
pub const TOTAL_RESULTS_HEADER: &str = "omeka-s-total-results";

/// HTTP client for one catalog instance
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    auth: Authentication,
    http: reqwest::Client,
}

impl HttpCatalog {
    /// Create a client for `base_url` with default transport settings
    ///
    /// # Example
    ///
    /// ```
    /// use crm_import::catalog::HttpCatalog;
    ///
    /// let catalog = HttpCatalog::new("http://localhost:8080/api/");
    /// assert_eq!(catalog.build_url("items"), "http://localhost:8080/api/items");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client that sends requests through `http`
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth: Authentication::default(),
            http,
        }
    }

    /// Build a client from the settings file, with the configured request timeout
    pub fn from_settings(settings: &ApiSettings, auth: Authentication) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_client(settings.base_url.clone(), http).with_auth(auth))
    }

    /// Add the API key pair
    pub fn with_auth(mut self, auth: Authentication) -> Self {
        self.auth = auth;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an API path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.query(&self.auth.as_query())
    }

    /// Map a non-2xx response to `RemoteStatus`, keeping the body for the report
    async fn check_status(url: &str, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(ImportError::RemoteStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body: body.trim().to_string(),
        })
    }
}

impl CatalogApi for HttpCatalog {
    async fn list_resource_classes(&self, per_page: u32) -> Result<ResourceClassPage> {
        let url = self.build_url("resource_classes");
        debug!(url = %url, per_page, "listing resource classes");

        let resp = self
            .authorized(self.http.get(&url))
            .query(&[("per_page", per_page)])
            .send()
            .await?;
        let resp = Self::check_status(&url, resp).await?;

        let total = match resp.headers().get(TOTAL_RESULTS_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .ok()
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .ok_or_else(|| {
                        ImportError::InvalidResponse(format!(
                            "{} header is not a number: {:?}",
                            TOTAL_RESULTS_HEADER, value
                        ))
                    })?,
            ),
            None => None,
        };

        let classes: Vec<ResourceClass> = resp.json().await?;
        let total = total.unwrap_or(classes.len() as u64);

        Ok(ResourceClassPage { total, classes })
    }

    async fn create_item(&self, assignment: &ClassAssignment) -> Result<u64> {
        let url = self.build_url("items");

        let resp = self
            .authorized(self.http.post(&url))
            .json(assignment)
            .send()
            .await?;
        let resp = Self::check_status(&url, resp).await?;

        let created: CreatedItem = resp.json().await?;
        debug!(remote_id = created.id, class_id = ?assignment.class_id, "item created");
        Ok(created.id)
    }

    async fn patch_item(&self, id: u64, properties: &PropertyBag) -> Result<()> {
        let url = self.build_url(&format!("items/{}", id));

        let resp = self
            .authorized(self.http.patch(&url))
            .json(properties)
            .send()
            .await?;
        Self::check_status(&url, resp).await?;

        debug!(remote_id = id, properties = properties.len(), "item patched");
        Ok(())
    }
}
