//! Public URLs for objects in the storage bucket.

use url::Url;

use crate::config::BackendConfig;
use crate::{DriveError, Result};

/// Builds view/download URLs for stored objects.
#[derive(Debug, Clone)]
pub struct FileUrls {
    endpoint: Url,
    bucket_id: String,
    project_id: String,
}

impl FileUrls {
    /// Create a URL builder; fails if the endpoint cannot carry path segments.
    pub fn new(endpoint: &str, bucket_id: &str, project_id: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| DriveError::Config(format!("invalid backend endpoint: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(DriveError::Config(format!(
                "backend endpoint cannot be a base URL: {endpoint}"
            )));
        }

        Ok(Self {
            endpoint,
            bucket_id: bucket_id.to_string(),
            project_id: project_id.to_string(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(&config.endpoint, &config.bucket_id, &config.project_id)
    }

    /// `{endpoint}/storage/buckets/{bucket}/files/{id}/view?project={project}`
    pub fn view_url(&self, bucket_file_id: &str) -> String {
        self.object_url(bucket_file_id, "view")
    }

    /// `{endpoint}/storage/buckets/{bucket}/files/{id}/download?project={project}`
    pub fn download_url(&self, bucket_file_id: &str) -> String {
        self.object_url(bucket_file_id, "download")
    }

    fn object_url(&self, bucket_file_id: &str, action: &str) -> String {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "buckets", self.bucket_id.as_str(), "files"])
                .push(bucket_file_id)
                .push(action);
        }
        url.query_pairs_mut().append_pair("project", &self.project_id);
        url.to_string()
    }
}
