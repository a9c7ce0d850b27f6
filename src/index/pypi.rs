use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use super::{IndexLookup, PackageIndex, ProjectData};
use crate::http::{HttpClient, NonRetryableError};

/// Client for the PyPI JSON API (or any index serving the same documents).
pub struct PyPiIndex {
    http: HttpClient,
    base_url: String,
}

impl PyPiIndex {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn project_url(&self, name: &str) -> String {
        format!("{}/{}/json", self.base_url, name)
    }
}

#[async_trait]
impl PackageIndex for PyPiIndex {
    #[tracing::instrument(skip(self))]
    async fn fetch_project(&self, name: &str) -> Result<IndexLookup> {
        let url = self.project_url(name);
        match self.http.get_json::<ProjectData>(&url).await {
            Ok(data) => Ok(IndexLookup::Found(data)),
            Err(e) => {
                let not_found = matches!(
                    e.downcast_ref::<NonRetryableError>(),
                    Some(NonRetryableError::NotFound(_))
                );
                if not_found {
                    debug!("{} is not on the index", name);
                    return Ok(IndexLookup::NotFound);
                }
                Err(e.context(format!("Failed to fetch {}", url)))
            }
        }
    }
}
