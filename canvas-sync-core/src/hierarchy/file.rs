//! File leaves: download, skip or report, with partial-write cleanup.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tracing::{info, warn};

use super::SyncContext;
use crate::contract::FileInfo;
use crate::error::SyncError;
use crate::naming::corrected_name;
use crate::report::SyncStatus;
use crate::tree::{NodeId, NodeKind, Tree};

/// Attach a file node under `parent`. Files found in the generic Files
/// section pass `register = false`; everything else registers in the ledger
/// so the Files section can exclude it later.
pub(super) fn add_file(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    parent: NodeId,
    info: FileInfo,
    register: bool,
) -> Result<NodeId, SyncError> {
    let name = corrected_name(&info.display_name);
    let id = info.id;
    let node = tree.add_child(parent, id, name, NodeKind::File { info }, false)?;
    if register {
        ctx.register(tree, node)?;
    }
    Ok(node)
}

/// Materialize one file: locked files are reported and never attempted, an
/// existing artifact short-circuits, anything else downloads the payload.
pub(super) async fn sync_file(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    let info = match &tree.node(id).kind {
        NodeKind::File { info } => info.clone(),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_file invoked on a {} node",
                other.label()
            )))
        }
    };
    let name = tree.node(id).name.clone();
    let path = tree.node(id).sync_path.clone();

    if info.locked_for_user {
        info!(file = %name, status = "locked", "File is access restricted on the server");
        ctx.record(tree, id, SyncStatus::Locked);
        return Ok(());
    }
    if path.exists() {
        info!(file = %name, status = "synced", "File already synced");
        ctx.record(tree, id, SyncStatus::AlreadySynced);
        return Ok(());
    }

    info!(file = %name, path = %path.display(), status = "downloading", "Downloading file");
    let payload = match ctx.api.download_file_payload(&info.url).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(file = %name, error = %e, status = "failed", "File download failed");
            ctx.record(tree, id, SyncStatus::Failed);
            return Ok(());
        }
    };

    match write_payload(&path, payload.as_slice()) {
        Ok(()) => {
            info!(file = %name, status = "synced", "File downloaded");
            ctx.record(tree, id, SyncStatus::Downloaded);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(SyncError::Interrupted),
        Err(e) => {
            warn!(file = %name, error = %e, status = "failed", "Failed to write file");
            ctx.record(tree, id, SyncStatus::Failed);
            Ok(())
        }
    }
}

/// Stream `reader` into a file at `path`. If the copy fails or is
/// interrupted, the partial artifact is removed before the error
/// propagates, so no corrupted file is left behind.
pub(super) fn write_payload<R: Read>(path: &Path, mut reader: R) -> io::Result<()> {
    let result: io::Result<()> = (|| {
        let mut out_file = fs::File::create(path)?;
        io::copy(&mut reader, &mut out_file)?;
        Ok(())
    })();

    if result.is_err() && path.exists() {
        let _ = fs::remove_file(path);
    }
    result
}
