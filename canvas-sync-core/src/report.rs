use std::fmt;
use std::path::PathBuf;

/// Terminal status of one materialized artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Fetched from the server during this run.
    Downloaded,
    /// Present on disk before this run; nothing was fetched.
    AlreadySynced,
    /// Deliberately not materialized.
    Skipped,
    /// Access restricted on the server; never attempted.
    Locked,
    /// Attempted and failed; the run continued.
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Downloaded => "downloaded",
            SyncStatus::AlreadySynced => "synced",
            SyncStatus::Skipped => "skipped",
            SyncStatus::Locked => "locked",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status line for one leaf artifact.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub name: String,
    pub path: PathBuf,
    pub kind: &'static str,
    pub status: SyncStatus,
}

/// Everything that happened under one course.
#[derive(Debug)]
pub struct CourseReport {
    pub course_id: i64,
    pub course_name: String,
    /// The course existed remotely but was not selected for sync.
    pub skipped: bool,
    pub items: Vec<ItemReport>,
}

/// Output report of one full synchronization run, for downstream audit and
/// for tests.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub courses: Vec<CourseReport>,
}

impl SyncReport {
    pub fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.courses.iter().flat_map(|c| c.items.iter())
    }

    pub fn count(&self, status: SyncStatus) -> usize {
        self.items().filter(|i| i.status == status).count()
    }
}
