//! Course discovery: modules, the assignments container and the root of the
//! generic Files section.

use std::collections::HashSet;

use tracing::{info, warn};

use super::{assignment, folder, module, SyncContext};
use crate::contract::CourseInfo;
use crate::error::SyncError;
use crate::naming::corrected_name;
use crate::report::CourseReport;
use crate::tree::{KindTag, NodeId, NodeKind, Tree};

/// Local display name of the Files section root.
const FILES_SECTION_NAME: &str = "Other Files";

/// Full remote path that marks the conventional root files folder.
const ROOT_FOLDER_SENTINEL: &str = "course files";

/// Attach a course node under the root. Courses that are not selected still
/// get a node (for identity and reporting) but no directory. Records
/// without a course code cannot be named and are skipped.
pub(super) fn add_course(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    root: NodeId,
    info: CourseInfo,
) -> Result<Option<NodeId>, SyncError> {
    let Some(code) = info.course_code.clone() else {
        warn!(course_id = info.id, "Course record lacks a course code, skipping");
        return Ok(None);
    };

    // The course code field sometimes concatenates several identifiers
    // separated by semicolons; the last one is the human-readable code.
    let mut name = corrected_name(code.split(';').next_back().unwrap_or(&code));
    if ctx.settings.use_nicknames {
        if let Some(display) = info.name.as_deref() {
            name = corrected_name(display);
        }
    }

    let to_be_synced = ctx.settings.courses_to_sync.is_empty()
        || ctx
            .settings
            .courses_to_sync
            .iter()
            .any(|selected| selected == &name || Some(selected.as_str()) == info.name.as_deref());

    let course_id = info.id;
    let node = tree.add_child(
        root,
        course_id,
        name.clone(),
        NodeKind::Course { info, to_be_synced },
        to_be_synced,
    )?;
    ctx.register(tree, node)?;
    ctx.report.courses.push(CourseReport {
        course_id,
        course_name: name,
        skipped: !to_be_synced,
        items: Vec::new(),
    });
    Ok(Some(node))
}

/// Synchronize one course in two stages. Modules and assignments run first
/// and populate the ledger; the Files section runs strictly afterwards, so
/// the exclusion set computed between the stages is complete. The ordering
/// is structural here, not a call-order convention.
pub(super) async fn sync_course(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    let (course_id, to_be_synced) = match &tree.node(id).kind {
        NodeKind::Course { info, to_be_synced } => (info.id, *to_be_synced),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_course invoked on a {} node",
                other.label()
            )))
        }
    };
    let name = tree.node(id).name.clone();

    if !to_be_synced {
        info!(course = %name, status = "skipped", "Course not selected for synchronization");
        return Ok(());
    }
    info!(course = %name, "Synchronizing course");

    // Stage 1: modules and assignments.
    if ctx.settings.module_sync_enabled() {
        discover_modules(ctx, tree, id, course_id).await?;
    }
    if ctx.settings.sync_assignments {
        assignment::add_assignments_folder(ctx, tree, id, course_id).await?;
    }
    let children = tree.node(id).children.clone();
    for child in children {
        match tree.node(child).kind.tag() {
            KindTag::Module | KindTag::SubHeader => module::sync_module(ctx, tree, child).await?,
            KindTag::AssignmentsFolder => {
                assignment::sync_assignments_folder(ctx, tree, child).await?
            }
            _ => {}
        }
    }

    // Stage 2: the generic Files section, against the now-complete ledger.
    let exclusions = if ctx.settings.avoid_duplicates {
        ctx.ledger.file_exclusions(course_id)
    } else {
        HashSet::new()
    };
    add_files_folder(ctx, tree, id, course_id, &exclusions).await
}

async fn discover_modules(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    course: NodeId,
    course_id: i64,
) -> Result<(), SyncError> {
    let modules = match ctx.api.get_modules_in_course(course_id).await {
        Ok(modules) => modules,
        Err(e) => {
            warn!(course_id, error = %e, "Failed to list modules, skipping module sync");
            return Ok(());
        }
    };
    for (position, info) in modules.into_iter().enumerate() {
        let name = format!("{} - {}", position + 1, corrected_name(&info.name));
        let node = tree.add_child(course, info.id, name, NodeKind::Module, true)?;
        ctx.register(tree, node)?;
    }
    Ok(())
}

/// Locate the root files folder by its conventional full path, rename it to
/// the fixed local display name and synchronize it. A course without the
/// sentinel folder gets a warning, not an aborted run.
async fn add_files_folder(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    course: NodeId,
    course_id: i64,
    exclusions: &HashSet<i64>,
) -> Result<(), SyncError> {
    let folders = match ctx.api.get_folders_in_course(course_id).await {
        Ok(folders) => folders,
        Err(e) => {
            warn!(course_id, error = %e, "Failed to list course folders, skipping the Files section");
            return Ok(());
        }
    };
    let Some(root_folder) = folders.into_iter().find(|f| f.full_name == ROOT_FOLDER_SENTINEL)
    else {
        warn!(course_id, "No root files folder on the server, skipping the Files section");
        return Ok(());
    };

    let node = tree.add_child(
        course,
        root_folder.id,
        FILES_SECTION_NAME.to_string(),
        NodeKind::Folder,
        true,
    )?;
    ctx.register(tree, node)?;
    folder::sync_folder(ctx, tree, node, exclusions).await
}
