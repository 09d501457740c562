//! The generic Files section: folders of files, recursed with the
//! course-wide exclusion set threaded through.

use std::collections::HashSet;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use super::{file, SyncContext};
use crate::error::SyncError;
use crate::naming::corrected_name;
use crate::tree::{KindTag, NodeId, NodeKind, Tree};

/// Folder name the server uses for the course banner image; never synced.
const COURSE_IMAGE_FOLDER: &str = "course_image";

/// Two-phase sync of one Files-section folder. The exclusion set was
/// computed once at the top of the Files section, after module and
/// assignment discovery completed, and is shared by the whole sub-folder
/// recursion.
pub(super) fn sync_folder<'a, 'b>(
    ctx: &'a mut SyncContext<'b>,
    tree: &'a mut Tree,
    id: NodeId,
    exclusions: &'a HashSet<i64>,
) -> BoxFuture<'a, Result<(), SyncError>> {
    Box::pin(async move {
        info!(folder = %tree.node(id).name, "Synchronizing folder");
        discover(ctx, tree, id, exclusions).await?;

        let children = tree.node(id).children.clone();
        for child in children {
            match tree.node(child).kind.tag() {
                KindTag::Folder => sync_folder(ctx, tree, child, exclusions).await?,
                KindTag::File => file::sync_file(ctx, tree, child).await?,
                _ => {}
            }
        }
        Ok(())
    })
}

async fn discover(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
    exclusions: &HashSet<i64>,
) -> Result<(), SyncError> {
    if tree.node(id).discovered {
        return Ok(());
    }
    tree.node_mut(id).discovered = true;
    let folder_id = tree.node(id).id;

    let files = match ctx.api.get_files_in_folder(folder_id).await {
        Ok(files) => files,
        Err(e) => {
            warn!(folder = %tree.node(id).name, error = %e, "Failed to list files in folder");
            Vec::new()
        }
    };
    for info in files {
        // Files a module or assignment already claimed stay out of the
        // Files section entirely; no child node is created for them.
        if exclusions.contains(&info.id) {
            debug!(file = %info.display_name, "Already represented elsewhere, skipping");
            continue;
        }
        // Files discovered here are terminal for deduplication purposes
        // and are not registered in the ledger.
        file::add_file(ctx, tree, id, info, false)?;
    }

    let folders = match ctx.api.get_folders_in_folder(folder_id).await {
        Ok(folders) => folders,
        Err(e) => {
            warn!(folder = %tree.node(id).name, error = %e, "Failed to list sub-folders");
            Vec::new()
        }
    };
    for info in folders {
        if info.name == COURSE_IMAGE_FOLDER {
            continue;
        }
        let name = corrected_name(&info.name);
        let node = tree.add_child(id, info.id, name, NodeKind::Folder, true)?;
        ctx.register(tree, node)?;
    }
    Ok(())
}
