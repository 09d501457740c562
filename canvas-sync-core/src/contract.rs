//! # contract: interface to the remote Canvas server
//!
//! This module defines a single trait ([`CanvasApi`]) and the wire records
//! the synchronization pipeline consumes. The trait is the seam between the
//! traversal and the network: production code talks to the real
//! [`crate::api::InstructureClient`], tests talk to the generated mock.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests (`MockCanvasApi` is
//!   exported whenever the `test-export-mocks` feature is active).
//!
//! ## Error Handling
//! - All methods return boxed error trait objects ([`ApiError`]); callers
//!   decide per call site whether a failure is fatal or skippable.

use async_trait::async_trait;
use serde::Deserialize;

/// Error type for the API boundary (simple boxed error).
pub type ApiError = Box<dyn std::error::Error + Send + Sync>;

fn sentinel_id() -> i64 {
    -1
}

/// A course as listed for the authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseInfo {
    pub id: i64,
    /// Display name; absent on access-restricted courses.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

/// A module listed under a course.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleInfo {
    pub id: i64,
    pub name: String,
}

/// Item type tag carried by every module item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ModuleItemType {
    File,
    Page,
    ExternalUrl,
    SubHeader,
    #[serde(other)]
    Other,
}

/// One entry of a module's flat item listing. The server returns these as a
/// flat list; nesting is expressed only through the `indent` hint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleItem {
    #[serde(default = "sentinel_id")]
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: ModuleItemType,
    #[serde(default)]
    pub indent: i64,
    /// API-local record URL for File and Page items.
    #[serde(default)]
    pub url: Option<String>,
    /// Target of an ExternalUrl item.
    #[serde(default)]
    pub external_url: Option<String>,
}

/// An assignment listed under a course.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A folder of the course's Files section.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderInfo {
    pub id: i64,
    pub name: String,
    /// Full remote path, e.g. "course files/slides".
    pub full_name: String,
}

/// A file record. Module items only reference these; the record itself
/// carries the download URL and the lock state.
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub id: i64,
    pub display_name: String,
    pub url: String,
    #[serde(default)]
    pub locked_for_user: bool,
}

/// The full record behind an HTML page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(default = "sentinel_id")]
    pub page_id: i64,
    #[serde(default)]
    pub body: Option<String>,
    /// Link to the live page on the server.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Capabilities the synchronization core needs from the Canvas server.
///
/// Every listing returns records in the server's ordering, which the
/// traversal preserves. Implementors attach the bearer token; the trait is
/// agnostic of authentication and transport details.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait CanvasApi: Send + Sync {
    /// List the courses the authenticated user can access.
    async fn get_courses(&self) -> Result<Vec<CourseInfo>, ApiError>;

    /// List the modules of a course.
    async fn get_modules_in_course(&self, course_id: i64) -> Result<Vec<ModuleInfo>, ApiError>;

    /// List the flat item sequence of a module.
    async fn get_items_in_module(
        &self,
        course_id: i64,
        module_id: i64,
    ) -> Result<Vec<ModuleItem>, ApiError>;

    /// List the assignments of a course.
    async fn get_assignments_in_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<AssignmentInfo>, ApiError>;

    /// List every folder of a course's Files section.
    async fn get_folders_in_course(&self, course_id: i64) -> Result<Vec<FolderInfo>, ApiError>;

    /// List the files directly under a folder.
    async fn get_files_in_folder(&self, folder_id: i64) -> Result<Vec<FileInfo>, ApiError>;

    /// List the sub-folders directly under a folder.
    async fn get_folders_in_folder(&self, folder_id: i64) -> Result<Vec<FolderInfo>, ApiError>;

    /// Resolve a file record behind an API-local URL, as embedded in module
    /// items and page/assignment bodies.
    async fn get_file_by_url(&self, url: &str) -> Result<FileInfo, ApiError>;

    /// Resolve the full page record behind an API-local URL.
    async fn get_page_by_url(&self, url: &str) -> Result<PageInfo, ApiError>;

    /// Fetch the raw byte payload behind a file download URL.
    async fn download_file_payload(&self, url: &str) -> Result<Vec<u8>, ApiError>;

    /// Fetch a payload from a host outside the Canvas server (linked files).
    /// A non-success response is an error.
    async fn download_external_payload(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}
