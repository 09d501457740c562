//! Modules and sub-headers: the flat item listing, its indentation-based
//! regrouping and the per-type dispatch into typed child nodes.

use futures::future::BoxFuture;
use tracing::{info, warn};

use super::{external, file, page, SyncContext};
use crate::contract::{ModuleItem, ModuleItemType};
use crate::error::SyncError;
use crate::naming::corrected_name;
use crate::tree::{KindTag, NodeId, NodeKind, PageSource, Tree};

/// Split a module's flat item list into the items of the outer scope and
/// the sub-header groups.
///
/// The server returns module items as a flat list where nesting exists only
/// as an indent hint. A SubHeader item opens a new group that collects every
/// following item until the next SubHeader; items at the outermost indent
/// level, or seen before the first SubHeader, stay in the outer scope. Each
/// returned group starts with its SubHeader item.
pub(crate) fn reorganize(items: &[ModuleItem]) -> (Vec<ModuleItem>, Vec<Vec<ModuleItem>>) {
    if items.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let outer_indent = items.iter().map(|item| item.indent).min().unwrap_or(0);
    let mut outer_scope = Vec::new();
    let mut sub_groups: Vec<Vec<ModuleItem>> = Vec::new();

    for item in items {
        if item.item_type == ModuleItemType::SubHeader {
            sub_groups.push(vec![item.clone()]);
        } else if item.indent == outer_indent || sub_groups.is_empty() {
            outer_scope.push(item.clone());
        } else if let Some(group) = sub_groups.last_mut() {
            group.push(item.clone());
        }
    }

    (outer_scope, sub_groups)
}

/// Two-phase sync of a module or sub-header: discover children from the
/// item listing, then recurse into each in listing order. Boxed because
/// sub-headers nest arbitrarily deep.
pub(super) fn sync_module<'a, 'b>(
    ctx: &'a mut SyncContext<'b>,
    tree: &'a mut Tree,
    id: NodeId,
) -> BoxFuture<'a, Result<(), SyncError>> {
    Box::pin(async move {
        info!(
            name = %tree.node(id).name,
            kind = tree.node(id).kind.label(),
            "Synchronizing module"
        );
        discover_items(ctx, tree, id).await?;

        let children = tree.node(id).children.clone();
        for child in children {
            match tree.node(child).kind.tag() {
                KindTag::SubHeader => sync_module(ctx, tree, child).await?,
                KindTag::File => file::sync_file(ctx, tree, child).await?,
                KindTag::Page => page::sync_page(ctx, tree, child).await?,
                KindTag::ExternalUrl => external::sync_external_url(ctx, tree, child)?,
                _ => {}
            }
        }
        Ok(())
    })
}

async fn discover_items(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    if tree.node(id).discovered {
        return Ok(());
    }
    tree.node_mut(id).discovered = true;

    let items: Vec<ModuleItem> = match &tree.node(id).kind {
        NodeKind::Module => {
            let course_id = tree.course_id_of(id)?;
            let module_id = tree.node(id).id;
            match ctx.api.get_items_in_module(course_id, module_id).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(module = %tree.node(id).name, error = %e, "Failed to list module items");
                    return Ok(());
                }
            }
        }
        // Sub-headers were seeded with their item slice at discovery time.
        NodeKind::SubHeader { items } => items.clone(),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_module invoked on a {} node",
                other.label()
            )))
        }
    };

    let (outer_scope, sub_groups) = reorganize(&items);

    for item in outer_scope {
        match item.item_type {
            ModuleItemType::File if ctx.settings.modules.files => {
                add_file_item(ctx, tree, id, &item).await?
            }
            ModuleItemType::Page if ctx.settings.modules.html_pages => {
                add_page_item(ctx, tree, id, &item)?
            }
            ModuleItemType::ExternalUrl if ctx.settings.modules.external_urls => {
                add_url_item(ctx, tree, id, &item)?
            }
            _ => {}
        }
    }

    for (position, mut group) in sub_groups.into_iter().enumerate() {
        let header = group.remove(0);
        let name = format!("{} - {}", position + 1, corrected_name(&header.title));
        let node = tree.add_child(id, header.id, name, NodeKind::SubHeader { items: group }, true)?;
        ctx.register(tree, node)?;
    }
    Ok(())
}

/// A File item only references the file record; fetch the record for the
/// download URL and lock state. An unreadable record skips the item.
async fn add_file_item(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    module: NodeId,
    item: &ModuleItem,
) -> Result<(), SyncError> {
    let Some(url) = item.url.as_deref() else {
        warn!(item = %item.title, "File item carries no record URL, skipping");
        return Ok(());
    };
    let info = match ctx.api.get_file_by_url(url).await {
        Ok(info) => info,
        Err(e) => {
            warn!(item = %item.title, error = %e, "Failed to fetch file record, skipping");
            return Ok(());
        }
    };
    file::add_file(ctx, tree, module, info, true)?;
    Ok(())
}

/// Pages are created from the lightweight item reference; the body is
/// fetched lazily at materialization time.
fn add_page_item(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    module: NodeId,
    item: &ModuleItem,
) -> Result<(), SyncError> {
    let Some(url) = item.url.as_deref() else {
        warn!(item = %item.title, "Page item carries no record URL, skipping");
        return Ok(());
    };
    let name = corrected_name(&item.title);
    let node = tree.add_child(
        module,
        item.id,
        name,
        NodeKind::Page {
            source: PageSource::Unresolved {
                api_url: url.to_string(),
            },
        },
        false,
    )?;
    ctx.register(tree, node)?;
    Ok(())
}

fn add_url_item(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    module: NodeId,
    item: &ModuleItem,
) -> Result<(), SyncError> {
    let Some(url) = item.external_url.clone() else {
        warn!(item = %item.title, "External URL item carries no target, skipping");
        return Ok(());
    };
    let name = corrected_name(&item.title);
    let node = tree.add_child(module, item.id, name, NodeKind::ExternalUrl { url }, false)?;
    ctx.register(tree, node)?;
    Ok(())
}
