//! HTML pages, their linked-file discovery and the push-down transform.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::{external, file, SyncContext};
use crate::error::SyncError;
use crate::naming::append_extension;
use crate::report::SyncStatus;
use crate::tree::{KindTag, NodeId, NodeKind, PageSource, Tree};

static CANVAS_FILE_RE: OnceLock<Regex> = OnceLock::new();
static EXTERNAL_FILE_RE: OnceLock<Regex> = OnceLock::new();

/// URLs of file records hosted on the Canvas server itself, recognisable by
/// the API endpoint marker the server embeds in anchor attributes.
pub(super) fn canvas_file_urls(body: &str) -> Vec<String> {
    let re = CANVAS_FILE_RE
        .get_or_init(|| Regex::new(r#"data-api-endpoint="(.*?)""#).expect("hard-coded pattern"));
    re.captures_iter(body).map(|c| c[1].to_string()).collect()
}

/// Links whose target ends in a short file extension, 1 to 10 characters
/// after a final period. Plain web-page links do not match, and neither do
/// Canvas file records, which the endpoint marker above already covers.
pub(super) fn external_file_urls(body: &str) -> Vec<String> {
    let re = EXTERNAL_FILE_RE
        .get_or_init(|| Regex::new(r#"href="([^ ]*[.].{1,10})""#).expect("hard-coded pattern"));
    re.captures_iter(body).map(|c| c[1].to_string()).collect()
}

/// Shared wrapper for page and assignment artifacts: title heading, link to
/// the live version on the server, a rule, then the raw body.
pub(super) fn write_html_wrapper(
    path: &Path,
    title: &str,
    live_url: &str,
    body: &str,
) -> io::Result<()> {
    let mut content = String::new();
    content.push_str(&format!("<h1><strong>{title}</strong></h1>"));
    content.push_str(&format!(
        "<big><a href=\"{live_url}\">Click here to open the live page in Canvas</a></big>"
    ));
    content.push_str("<hr>");
    content.push_str(body);
    fs::write(path, content)
}

/// Materialize one page.
///
/// Order matters here: the full record is resolved first, linked files are
/// discovered from the body next, and only then is the HTML artifact
/// written. When linked files exist the page is pushed down into a
/// directory of its own name before the write, so the artifact and its
/// files end up side by side.
pub(super) async fn sync_page(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
) -> Result<(), SyncError> {
    let name = tree.node(id).name.clone();

    let source = match &tree.node(id).kind {
        NodeKind::Page { source } => source.clone(),
        other => {
            return Err(SyncError::Structure(format!(
                "sync_page invoked on a {} node",
                other.label()
            )))
        }
    };
    let page_info = match source {
        PageSource::Resolved(info) => info,
        PageSource::Unresolved { api_url } => match ctx.api.get_page_by_url(&api_url).await {
            Ok(info) => {
                if let NodeKind::Page { source } = &mut tree.node_mut(id).kind {
                    *source = PageSource::Resolved(info.clone());
                }
                info
            }
            Err(e) => {
                warn!(page = %name, error = %e, status = "failed", "Failed to resolve page record");
                ctx.record(tree, id, SyncStatus::Failed);
                return Ok(());
            }
        },
    };

    let body = page_info.body.clone().unwrap_or_default();
    let html_url = page_info.html_url.clone().unwrap_or_default();

    if discover_linked_files(ctx, tree, id, &body).await? {
        tree.push_down(id)?;
    }

    let artifact = append_extension(&tree.node(id).sync_path, ".html");
    if artifact.exists() {
        info!(page = %name, status = "synced", "Page already synced");
        ctx.record(tree, id, SyncStatus::AlreadySynced);
    } else {
        info!(page = %name, path = %artifact.display(), status = "downloading", "Writing page");
        write_html_wrapper(&artifact, &name, &html_url, &body)?;
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

/// Scan the body for file references and attach them as children. Returns
/// whether anything was found, which decides the push-down.
async fn discover_linked_files(
    ctx: &mut SyncContext<'_>,
    tree: &mut Tree,
    id: NodeId,
    body: &str,
) -> Result<bool, SyncError> {
    if tree.node(id).discovered {
        return Ok(!tree.node(id).children.is_empty());
    }
    tree.node_mut(id).discovered = true;

    let mut sub_files = false;

    for url in canvas_file_urls(body) {
        let info = match ctx.api.get_file_by_url(&url).await {
            Ok(info) => info,
            Err(e) => {
                debug!(url = %url, error = %e, "Ignoring unreadable linked file record");
                continue;
            }
        };
        file::add_file(ctx, tree, id, info, true)?;
        sub_files = true;
    }

    if ctx.settings.download_linked {
        for url in external_file_urls(body) {
            if external::add_linked_file(ctx, tree, id, &url)?.is_some() {
                sub_files = true;
            }
        }
    }

    Ok(sub_files)
}
