//! The recursive discover/materialize traversal over the course hierarchy.
//!
//! Every entity kind follows the same two-phase protocol: discover remote
//! children through the API collaborator, attach them as typed nodes, then
//! materialize its own artifact or recurse. The traversal is depth first and
//! strictly sequential; suspension happens only at I/O boundaries, so the
//! ledger's append-then-read pattern needs no locking.
//!
//! Per-kind logic lives in the submodules as free functions over the arena,
//! dispatched on the node kind tag; this module holds the shared context and
//! the root driver.

mod assignment;
mod course;
mod external;
mod file;
mod folder;
mod module;
mod page;

use tracing::info;

use crate::config::SyncSettings;
use crate::contract::CanvasApi;
use crate::error::SyncError;
use crate::ledger::CourseLedger;
use crate::report::{ItemReport, SyncReport, SyncStatus};
use crate::tree::{NodeId, Tree};

/// State threaded through one traversal: the API collaborator, user
/// settings, the per-course dedup ledger and the accumulating run report.
pub(crate) struct SyncContext<'a> {
    pub api: &'a dyn CanvasApi,
    pub settings: &'a SyncSettings,
    pub ledger: CourseLedger,
    pub report: SyncReport,
}

impl SyncContext<'_> {
    /// Register a node in the ledger under its owning course.
    fn register(&mut self, tree: &Tree, id: NodeId) -> Result<(), SyncError> {
        let course = tree.owning_course(id)?;
        let course_id = tree.node(course).id;
        let node = tree.node(id);
        self.ledger.register(course_id, node.id, node.kind.label());
        Ok(())
    }

    /// Record a per-item status line under the course currently in flight.
    fn record(&mut self, tree: &Tree, id: NodeId, status: SyncStatus) {
        let node = tree.node(id);
        if let Some(course) = self.report.courses.last_mut() {
            course.items.push(ItemReport {
                name: node.name.clone(),
                path: node.sync_path.clone(),
                kind: node.kind.label(),
                status,
            });
        }
    }
}

/// Root of the hierarchy; owns one run of the recursive synchronization.
///
/// A second `sync` call in the same process rebuilds the tree and the ledger
/// from scratch, and existing artifacts are skipped, so repeated runs are
/// safe.
pub struct Synchronizer {
    settings: SyncSettings,
}

impl Synchronizer {
    pub fn new(settings: SyncSettings) -> Self {
        Self { settings }
    }

    /// Discover all courses and walk the full hierarchy once, depth first,
    /// left to right in remote listing order.
    pub async fn sync(&self, api: &dyn CanvasApi) -> Result<SyncReport, SyncError> {
        info!(path = %self.settings.sync_path.display(), "Synchronizing to folder");
        let mut tree = Tree::new(&self.settings.sync_path)?;
        let root = tree.root();

        let mut ctx = SyncContext {
            api,
            settings: &self.settings,
            ledger: CourseLedger::new(),
            report: SyncReport::default(),
        };

        // Nothing at all can happen without the course listing; this is the
        // one remote call whose failure aborts the run.
        let courses = ctx.api.get_courses().await.map_err(SyncError::api)?;
        info!(count = courses.len(), "Discovered courses");

        for info in courses {
            if let Some(course_node) = course::add_course(&mut ctx, &mut tree, root, info)? {
                course::sync_course(&mut ctx, &mut tree, course_node).await?;
            }
        }

        Ok(ctx.report)
    }
}
