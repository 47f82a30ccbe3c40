//! Node types for the drive arena.
//!
//! The tree is an arena: [`Drive`](crate::drive::Drive) owns every node,
//! and both the parent link and the child lists are [`NodeId`] handles.
//! Handles carry a generation so that a slot reused after a wholesale
//! child rebuild is detected instead of silently aliased.

use serde_json::Value;

use crate::api::AttributeMap;

/// Handle to a node in a [`Drive`](crate::drive::Drive) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Discriminator for the two remote object variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
}

impl ItemKind {
    /// The wire spelling of the discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "file",
            ItemKind::Folder => "folder",
        }
    }
}

/// A folder's child categories, used to invalidate one cached list at a
/// time after a mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildCategory {
    Folders,
    Files,
}

/// One remote object: a file or a folder.
///
/// `attributes` is always a wholesale snapshot; `cached_info` says whether
/// that snapshot reflects a completed fetch (or was explicitly marked
/// trusted). Folder nodes additionally track their child lists and whether
/// the whole subtree below them is known current (`cached_tree`).
#[derive(Debug)]
pub struct Node {
    pub(crate) remote_id: String,
    pub(crate) kind: ItemKind,
    pub(crate) attributes: AttributeMap,
    pub(crate) cached_info: bool,
    pub(crate) parent: Option<NodeId>,
    // Folder-only state; stays empty/false on file nodes.
    pub(crate) subfolders: Vec<NodeId>,
    pub(crate) subfiles: Vec<NodeId>,
    pub(crate) cached_tree: bool,
    /// Whether this folder's own child lists come from its own fetch.
    /// A child materialized from its parent's listing has a trusted
    /// attribute snapshot but unknown children.
    pub(crate) children_loaded: bool,
}

impl Node {
    pub(crate) fn placeholder(remote_id: String, kind: ItemKind, parent: Option<NodeId>) -> Self {
        Node {
            remote_id,
            kind,
            attributes: AttributeMap::new(),
            cached_info: false,
            parent,
            subfolders: Vec::new(),
            subfiles: Vec::new(),
            cached_tree: false,
            children_loaded: false,
        }
    }

    pub(crate) fn from_snapshot(
        remote_id: String,
        kind: ItemKind,
        attributes: AttributeMap,
        parent: Option<NodeId>,
    ) -> Self {
        Node {
            remote_id,
            kind,
            attributes,
            cached_info: true,
            parent,
            subfolders: Vec::new(),
            subfiles: Vec::new(),
            cached_tree: false,
            children_loaded: false,
        }
    }

    /// Stable remote identifier.
    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    /// File or folder.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// The enclosing folder, absent for a root node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The cached attribute snapshot.
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// One attribute by name, if present in the snapshot.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The `"name"` attribute as a string, if present.
    pub fn name(&self) -> Option<&str> {
        self.attr("name").and_then(Value::as_str)
    }

    /// Whether the attribute snapshot is current without a further fetch.
    pub fn cached_info(&self) -> bool {
        self.cached_info
    }

    /// Whether the whole subtree rooted here is known current.
    pub fn cached_tree(&self) -> bool {
        self.cached_tree
    }

    /// Ordered subfolder handles (server response order).
    pub fn subfolders(&self) -> &[NodeId] {
        &self.subfolders
    }

    /// Ordered file handles (server response order).
    pub fn subfiles(&self) -> &[NodeId] {
        &self.subfiles
    }
}
