//! External URL shortcuts and files hosted outside the Canvas server.

use tracing::{debug, info, warn};

use super::{file, SyncContext};
use crate::error::SyncError;
use crate::report::SyncStatus;
use crate::shortcut::make_url_shortcut;
use crate::tree::{NodeId, NodeKind, Tree};

/// Materialize an external link as a platform-native URL shortcut. There is
/// nothing to download, so the item is synced the moment the shortcut is in
/// place.
pub(super) fn sync_external_url(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    let url = match &tree.node(id).kind {
        NodeKind::ExternalUrl { url } => url.clone(),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_external_url invoked on a {} node",
                other.label()
            )))
        }
    };
    let name = tree.node(id).name.clone();
    let path = tree.node(id).sync_path.clone();

    match make_url_shortcut(&url, &path) {
        Ok((target, written)) => {
            info!(link = %name, path = %target.display(), status = "synced", "External URL shortcut in place");
            let status = if written {
                SyncStatus::Downloaded
            } else {
                SyncStatus::AlreadySynced
            };
            ctx.record(tree, id, status);
            Ok(())
        }
        Err(e) => {
            warn!(link = %name, error = %e, status = "failed", "Failed to write URL shortcut");
            ctx.record(tree, id, SyncStatus::Failed);
            Ok(())
        }
    }
}

/// File name candidate derived from a linked URL, if the link looks like a
/// real file: non-empty extension and a name of at most 60 characters. The
/// raw tail is deliberately not corrected, since its raw length decides
/// validity.
pub(super) fn linked_file_name(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next().unwrap_or(url);
    if !has_extension(name) || name.chars().count() > 60 {
        return None;
    }
    Some(name)
}

fn has_extension(name: &str) -> bool {
    match name.rfind('.') {
        Some(idx) => idx > 0 && idx + 1 < name.len(),
        None => false,
    }
}

/// Attach a linked-file node under `parent` if the URL passes the validity
/// rule; invalid candidates are discarded without creating a node.
pub(super) fn add_linked_file(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    parent: NodeId,
    url: &str,
) -> Result<Option<NodeId>, SyncError> {
    let Some(name) = linked_file_name(url) else {
        debug!(url = %url, "Link target does not look like a file, ignoring");
        return Ok(None);
    };
    let node = tree.add_child(
        parent,
        -1,
        name.to_string(),
        NodeKind::LinkedFile {
            url: url.to_string(),
        },
        false,
    )?;
    ctx.register(tree, node)?;
    Ok(Some(node))
}

/// Download a linked file. The host is outside our control, so any failure
/// here is reported for this one item and the traversal moves on.
pub(super) async fn sync_linked_file(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    let url = match &tree.node(id).kind {
        NodeKind::LinkedFile { url } => url.clone(),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_linked_file invoked on a {} node",
                other.label()
            )))
        }
    };
    let name = tree.node(id).name.clone();
    let path = tree.node(id).sync_path.clone();

    if path.exists() {
        info!(file = %name, status = "synced", "Linked file already synced");
        ctx.record(tree, id, SyncStatus::AlreadySynced);
        return Ok(());
    }

    info!(file = %name, url = %url, status = "downloading", "Downloading linked file");
    let payload = match ctx.api.download_external_payload(&url).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(file = %name, error = %e, status = "failed", "Linked file download failed");
            ctx.record(tree, id, SyncStatus::Failed);
            return Ok(());
        }
    };

    match file::write_payload(&path, payload.as_slice()) {
        Ok(()) => {
            info!(file = %name, status = "synced", "Linked file downloaded");
            ctx.record(tree, id, SyncStatus::Downloaded);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Err(SyncError::Interrupted),
        Err(e) => {
            warn!(file = %name, error = %e, status = "failed", "Failed to write linked file");
            ctx.record(tree, id, SyncStatus::Failed);
            Ok(())
        }
    }
}
