//! Assignments: a synthetic container per course, one directory per
//! assignment holding its description artifact and any referenced files.

use tracing::{debug, info, warn};

use super::{external, file, page, SyncContext};
use crate::error::SyncError;
use crate::naming::corrected_name;
use crate::report::SyncStatus;
use crate::tree::{KindTag, NodeId, NodeKind, Tree};

/// Fixed display name of the container; it has no remote identity.
const ASSIGNMENTS_FOLDER_NAME: &str = "Assignments";

/// Attach the assignments container and one child per remote assignment.
/// The container is only materialized when the course has at least one
/// assignment.
pub(super) async fn add_assignments_folder(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    course: NodeId,
    course_id: i64,
) -> Result<(), SyncError> {
    let assignments = match ctx.api.get_assignments_in_course(course_id).await {
        Ok(assignments) => assignments,
        Err(e) => {
            warn!(course_id, error = %e, "Failed to list assignments, skipping assignment sync");
            return Ok(());
        }
    };
    if assignments.is_empty() {
        return Ok(());
    }

    let folder = tree.add_child(
        course,
        -1,
        ASSIGNMENTS_FOLDER_NAME.to_string(),
        NodeKind::AssignmentsFolder,
        true,
    )?;
    ctx.register(tree, folder)?;

    for info in assignments {
        let name = corrected_name(&info.name);
        let id = info.id;
        let node = tree.add_child(folder, id, name, NodeKind::Assignment { info }, true)?;
        ctx.register(tree, node)?;
    }
    Ok(())
}

pub(super) async fn sync_assignments_folder(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    info!(count = tree.node(id).children.len(), "Synchronizing assignments");
    let children = tree.node(id).children.clone();
    for child in children {
        sync_assignment(ctx, tree, child).await?;
    }
    Ok(())
}

/// Materialize one assignment: discover files referenced by the description
/// with the same matchers pages use, write the description artifact, then
/// materialize the referenced files alongside it.
async fn sync_assignment(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    let info = match &tree.node(id).kind {
        NodeKind::Assignment { info } => info.clone(),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_assignment invoked on a {} node",
                other.label()
            )))
        }
    };
    let name = tree.node(id).name.clone();
    let description = info.description.clone().unwrap_or_default();

    if !tree.node(id).discovered {
        tree.node_mut(id).discovered = true;

        for url in page::canvas_file_urls(&description) {
            match ctx.api.get_file_by_url(&url).await {
                Ok(file_info) => {
                    file::add_file(ctx, tree, id, file_info, true)?;
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "Ignoring unreadable file reference in description");
                }
            }
        }
        if ctx.settings.download_linked {
            for url in page::external_file_urls(&description) {
                external::add_linked_file(ctx, tree, id, &url)?;
            }
        }
    }

    let artifact = tree.node(id).sync_path.join(format!("{name}.html"));
    if artifact.exists() {
        info!(assignment = %name, status = "synced", "Assignment already synced");
        ctx.record(tree, id, SyncStatus::AlreadySynced);
    } else {
        info!(assignment = %name, path = %artifact.display(), status = "downloading", "Writing assignment description");
        page::write_html_wrapper(
            &artifact,
            &name,
            info.html_url.as_deref().unwrap_or(""),
            &description,
        )?;
        ctx.record(tree, id, SyncStatus::Downloaded);
    }

    let children = tree.node(id).children.clone();
    for child in children {
        match tree.node(child).kind.tag() {
            KindTag::File => file::sync_file(ctx, tree, child).await?,
            KindTag::LinkedFile => external::sync_linked_file(ctx, tree, child).await?,
            _ => {}
        }
    }
    Ok(())
}
