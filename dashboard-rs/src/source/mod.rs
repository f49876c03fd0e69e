//! Remote instance source: the CEDAR-style metadata repository API.
//!
//! The repository exposes a folder-listing endpoint (instance identifiers)
//! and a per-instance fetch endpoint (structured documents). Both calls are
//! blocking and strictly sequential; there is no retry or backoff. The
//! [`InstanceSource`] trait is the seam the importer is written against, so
//! tests can feed fixture documents without a network.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::debug;

use crate::document::StructuredDocument;
use crate::errors::{DashboardError, Result};

/// Where template instances come from.
pub trait InstanceSource {
    /// List the instance identifiers in the configured source folder.
    fn list_instances(&self) -> Result<Vec<String>>;

    /// Fetch one structured document by identifier. Used for both metric
    /// instances and patient records.
    fn fetch_instance(&self, instance_id: &str) -> Result<StructuredDocument>;
}

/// HTTP client for the CEDAR resource API.
///
/// The credential is an opaque bearer value sent verbatim in the
/// `authorization` header. It is never logged.
pub struct CedarClient {
    http: Client,
    base_url: String,
    folder_id: String,
    credential: String,
}

impl CedarClient {
    pub fn new(
        base_url: impl Into<String>,
        folder_id: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            folder_id: folder_id.into(),
            credential: credential.into(),
        }
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, &self.credential)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json()
            .map_err(|e| DashboardError::Decode(format!("unparsable body from {url}: {e}")))
    }

    fn instance_url(&self, instance_id: &str) -> String {
        format!(
            "{}/template-instances/{}",
            self.base_url,
            urlencoding::encode(instance_id)
        )
    }
}

impl InstanceSource for CedarClient {
    fn list_instances(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/folders/{}/contents",
            self.base_url,
            urlencoding::encode(&self.folder_id)
        );
        let body = self.get_json(&url)?;

        let resources = body
            .get("resources")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                DashboardError::Decode(format!("listing from {url} has no resources array"))
            })?;

        // Listing order is preserved as returned; entries without an @id are
        // malformed and fail the whole listing.
        resources
            .iter()
            .map(|resource| {
                resource
                    .get("@id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        DashboardError::Decode("listing entry has no @id".to_string())
                    })
            })
            .collect()
    }

    fn fetch_instance(&self, instance_id: &str) -> Result<StructuredDocument> {
        let body = self.get_json(&self.instance_url(instance_id))?;
        StructuredDocument::from_value(body)
    }
}
