//! The synchronized hierarchy as an arena-backed tree.
//!
//! Ownership flows root to leaf: nodes are owned by the arena, children are
//! index lists and parent links are plain back-indices, so there is no
//! reference cycle to manage. One tree lives exactly as long as one
//! synchronization run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::contract::{AssignmentInfo, CourseInfo, FileInfo, ModuleItem, PageInfo};
use crate::error::SyncError;

/// Index of a node in the arena. Stable for the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// A page is constructed either from a lightweight module item reference or
/// from the full record; resolution fetches the record exactly once.
#[derive(Debug, Clone)]
pub enum PageSource {
    Unresolved { api_url: String },
    Resolved(PageInfo),
}

/// Closed set of entity kinds, with the per-kind payload attached.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Course { info: CourseInfo, to_be_synced: bool },
    Module,
    /// A sub-header inside a module, seeded with its already-fetched items
    /// so discovery never goes back to the server.
    SubHeader { items: Vec<ModuleItem> },
    /// A folder of the generic Files section.
    Folder,
    File { info: FileInfo },
    Page { source: PageSource },
    ExternalUrl { url: String },
    /// A file hosted outside the Canvas server, referenced by direct URL.
    LinkedFile { url: String },
    AssignmentsFolder,
    Assignment { info: AssignmentInfo },
}

/// Copyable discriminant of [`NodeKind`], used to dispatch the traversal
/// without borrowing the node's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Root,
    Course,
    Module,
    SubHeader,
    Folder,
    File,
    Page,
    ExternalUrl,
    LinkedFile,
    AssignmentsFolder,
    Assignment,
}

impl KindTag {
    /// Stable identifier string, used by the ledger and the run report.
    pub fn label(self) -> &'static str {
        match self {
            KindTag::Root => "synchronizer",
            KindTag::Course => "course",
            KindTag::Module => "module",
            KindTag::SubHeader => "sub_header",
            KindTag::Folder => "folder",
            KindTag::File => "file",
            KindTag::Page => "page",
            KindTag::ExternalUrl => "external_url",
            KindTag::LinkedFile => "linked_file",
            KindTag::AssignmentsFolder => "assignments_folder",
            KindTag::Assignment => "assignment",
        }
    }
}

impl NodeKind {
    pub fn tag(&self) -> KindTag {
        match self {
            NodeKind::Root => KindTag::Root,
            NodeKind::Course { .. } => KindTag::Course,
            NodeKind::Module => KindTag::Module,
            NodeKind::SubHeader { .. } => KindTag::SubHeader,
            NodeKind::Folder => KindTag::Folder,
            NodeKind::File { .. } => KindTag::File,
            NodeKind::Page { .. } => KindTag::Page,
            NodeKind::ExternalUrl { .. } => KindTag::ExternalUrl,
            NodeKind::LinkedFile { .. } => KindTag::LinkedFile,
            NodeKind::AssignmentsFolder => KindTag::AssignmentsFolder,
            NodeKind::Assignment { .. } => KindTag::Assignment,
        }
    }

    pub fn label(&self) -> &'static str {
        self.tag().label()
    }
}

/// One element of the hierarchy.
#[derive(Debug)]
pub struct Node {
    /// Remote identifier, or -1 for synthetic nodes (root, assignments
    /// folder, linked files).
    pub id: i64,
    /// Corrected display name.
    pub name: String,
    /// Absolute local path this node materializes at.
    pub sync_path: PathBuf,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    /// Whether this node corresponds to a directory.
    pub container: bool,
    /// Set once discovery ran, so re-entering a node cannot duplicate
    /// children.
    pub discovered: bool,
}

pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only the synchronizer root. The root directory
    /// is created if absent.
    pub fn new(sync_root: &Path) -> Result<Self, SyncError> {
        fs::create_dir_all(sync_root)?;
        let root = Node {
            id: -1,
            name: String::new(),
            sync_path: sync_root.to_path_buf(),
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root,
            container: true,
            discovered: false,
        };
        Ok(Tree { nodes: vec![root] })
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Path a child named `name` occupies under `parent`.
    pub fn child_path(&self, parent: NodeId, name: &str) -> PathBuf {
        self.node(parent).sync_path.join(name)
    }

    /// Attach a new child under `parent`. Container nodes get their backing
    /// directory created immediately, before any child discovery; creating
    /// over an existing directory is not an error.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        id: i64,
        name: String,
        kind: NodeKind,
        container: bool,
    ) -> Result<NodeId, SyncError> {
        let sync_path = self.child_path(parent, &name);
        if container {
            fs::create_dir_all(&sync_path)?;
        }
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name,
            sync_path,
            parent: Some(parent),
            children: Vec::new(),
            kind,
            container,
            discovered: false,
        });
        self.nodes[parent.0].children.push(node_id);
        Ok(node_id)
    }

    /// Walk ancestors until the owning course. Every node below a course
    /// must reach one; failing to is a construction-order bug.
    pub fn owning_course(&self, id: NodeId) -> Result<NodeId, SyncError> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if matches!(node.kind, NodeKind::Course { .. }) {
                return Ok(node_id);
            }
            current = node.parent;
        }
        Err(SyncError::Structure(format!(
            "no course ancestor above node '{}'",
            self.node(id).name
        )))
    }

    /// Remote id of the course that owns `id`.
    pub fn course_id_of(&self, id: NodeId) -> Result<i64, SyncError> {
        self.owning_course(id).map(|course| self.node(course).id)
    }

    /// Demote a leaf into a directory of its own name: the page push-down.
    ///
    /// This is the single legal mutation of an existing node's `sync_path`.
    /// The old path becomes a directory, the node's artifact moves inside
    /// it, and existing children are re-anchored in the new directory.
    pub fn push_down(&mut self, id: NodeId) -> Result<(), SyncError> {
        let old_path = self.node(id).sync_path.clone();
        let tail = old_path
            .file_name()
            .map(|t| t.to_os_string())
            .ok_or_else(|| {
                SyncError::Structure(format!(
                    "cannot push down node '{}' with an empty path tail",
                    self.node(id).name
                ))
            })?;
        fs::create_dir_all(&old_path)?;
        self.node_mut(id).sync_path = old_path.join(tail);

        let children = self.node(id).children.clone();
        for child in children {
            let name = self.node(child).name.clone();
            self.node_mut(child).sync_path = old_path.join(name);
        }
        Ok(())
    }
}
