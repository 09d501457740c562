//! Real HTTP implementation of the [`CanvasApi`] contract against a Canvas
//! by Instructure server. Transmits JSON over authenticated HTTPS with a
//! bearer token on every call.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::contract::{
    ApiError, AssignmentInfo, CanvasApi, CourseInfo, FileInfo, FolderInfo, ModuleInfo, ModuleItem,
    PageInfo,
};

/// Connection settings for the Canvas REST API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server domain, e.g. "https://canvas.university.edu".
    pub domain: String,
    /// Bearer token generated on the user's profile page.
    pub token: String,
}

pub struct InstructureClient {
    http: Client,
    domain: String,
    token: String,
}

impl InstructureClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            domain: config.domain.trim_end_matches('/').to_string(),
            token: config.token,
        }
    }

    /// Record URLs embedded in server payloads carry the full domain; strip
    /// it so every request is rebuilt from the configured domain.
    fn relative(&self, url: &str) -> String {
        match url.rsplit_once(self.domain.as_str()) {
            Some((_, rest)) => rest.to_string(),
            None => url.to_string(),
        }
    }

    async fn get(&self, api_call: &str) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.domain, api_call);
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Canvas API returned error");
            return Err(format!("Canvas API error: {status} for {url}").into());
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, api_call: &str) -> Result<T, ApiError> {
        Ok(self.get(api_call).await?.json::<T>().await?)
    }

    /// Listings that fail server-side come back as an error object instead
    /// of an array (an empty sub-header is one such case); treat those as an
    /// empty listing.
    async fn get_json_list<T: DeserializeOwned>(&self, api_call: &str) -> Result<Vec<T>, ApiError> {
        let value: serde_json::Value = self.get(api_call).await?.json().await?;
        if !value.is_array() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl CanvasApi for InstructureClient {
    async fn get_courses(&self) -> Result<Vec<CourseInfo>, ApiError> {
        self.get_json_list("/api/v1/courses?per_page=100").await
    }

    async fn get_modules_in_course(&self, course_id: i64) -> Result<Vec<ModuleInfo>, ApiError> {
        self.get_json_list(&format!("/api/v1/courses/{course_id}/modules?per_page=100"))
            .await
    }

    async fn get_items_in_module(
        &self,
        course_id: i64,
        module_id: i64,
    ) -> Result<Vec<ModuleItem>, ApiError> {
        self.get_json_list(&format!(
            "/api/v1/courses/{course_id}/modules/{module_id}/items?per_page=100"
        ))
        .await
    }

    async fn get_assignments_in_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<AssignmentInfo>, ApiError> {
        self.get_json_list(&format!(
            "/api/v1/courses/{course_id}/assignments?per_page=100"
        ))
        .await
    }

    async fn get_folders_in_course(&self, course_id: i64) -> Result<Vec<FolderInfo>, ApiError> {
        self.get_json_list(&format!("/api/v1/courses/{course_id}/folders?per_page=100"))
            .await
    }

    async fn get_files_in_folder(&self, folder_id: i64) -> Result<Vec<FileInfo>, ApiError> {
        self.get_json_list(&format!("/api/v1/folders/{folder_id}/files?per_page=100"))
            .await
    }

    async fn get_folders_in_folder(&self, folder_id: i64) -> Result<Vec<FolderInfo>, ApiError> {
        self.get_json_list(&format!("/api/v1/folders/{folder_id}/folders?per_page=100"))
            .await
    }

    async fn get_file_by_url(&self, url: &str) -> Result<FileInfo, ApiError> {
        self.get_json(&self.relative(url)).await
    }

    async fn get_page_by_url(&self, url: &str) -> Result<PageInfo, ApiError> {
        self.get_json(&self.relative(url)).await
    }

    async fn download_file_payload(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.get(&self.relative(url)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn download_external_payload(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        // No bearer token here: the target is not the Canvas server.
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("download failed: {status} for {url}").into());
        }
        Ok(response.bytes().await?.to_vec())
    }
}
