use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

fn default_true() -> bool {
    true
}

/// Per-item-type switches for module content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Download files referenced by module items.
    #[serde(default = "default_true")]
    pub files: bool,
    /// Store HTML pages referenced by module items.
    #[serde(default = "default_true")]
    pub html_pages: bool,
    /// Create URL shortcuts for external links in modules.
    #[serde(default = "default_true")]
    pub external_urls: bool,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            files: true,
            html_pages: true,
            external_urls: true,
        }
    }
}

/// User-facing settings for one synchronization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Local folder the hierarchy is mirrored into.
    pub sync_path: PathBuf,
    /// Courses selected for synchronization, matched by corrected course
    /// code or display name. An empty list selects every course.
    #[serde(default)]
    pub courses_to_sync: Vec<String>,
    /// Name courses by their display name instead of the course code.
    #[serde(default)]
    pub use_nicknames: bool,
    #[serde(default)]
    pub modules: ModuleSettings,
    #[serde(default = "default_true")]
    pub sync_assignments: bool,
    /// Also download files hosted outside the Canvas server that pages and
    /// assignment descriptions link to.
    #[serde(default)]
    pub download_linked: bool,
    /// Skip files in the generic Files section that a module or assignment
    /// already claimed.
    #[serde(default = "default_true")]
    pub avoid_duplicates: bool,
}

impl SyncSettings {
    /// Module discovery runs only if at least one item type is enabled.
    pub fn module_sync_enabled(&self) -> bool {
        self.modules.files || self.modules.html_pages || self.modules.external_urls
    }

    pub fn trace_loaded(&self) {
        info!(
            sync_path = %self.sync_path.display(),
            courses = self.courses_to_sync.len(),
            sync_assignments = self.sync_assignments,
            download_linked = self.download_linked,
            avoid_duplicates = self.avoid_duplicates,
            "Loaded sync settings"
        );
        debug!(?self, "Sync settings (full debug)");
    }
}
