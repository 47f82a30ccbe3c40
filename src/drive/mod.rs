//! The drive object model: an arena of file/folder nodes over a remote
//! storage service, with lazy fetching and explicit cache invalidation.
//!
//! A [`Drive`] owns every node; callers hold [`NodeId`] handles and drive
//! all operations through the `Drive` itself. Operations are synchronous
//! and block until the remote call (or cache hit) completes; concurrency
//! across one `Drive` is ruled out by `&mut self`, and disjoint `Drive`
//! instances are independent.

pub mod node;
pub mod path;
pub mod search;

use std::collections::HashSet;
use std::path::Path;

use crate::api::{AttributeMap, FolderListing, RemoteApi, TreeEntry};
use crate::error::{DriveError, Result};

pub use node::{ChildCategory, ItemKind, Node, NodeId};

/// Extract the mandatory `"id"` attribute from a response snapshot.
///
/// The service addresses items by string or integer ids; both are carried
/// as strings in the model.
fn require_id(attributes: &AttributeMap) -> Result<String> {
    match attributes.get("id") {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(DriveError::MalformedTree("entry missing id".into())),
    }
}

/// Check a whole tree response before installing any of it.
///
/// `seen` collects every remote id in the response; a repeat means the
/// response is cyclic or duplicated, which is fatal rather than an
/// unbounded recursion. Recursion depth is bounded by the response itself
/// once duplicates are ruled out.
fn validate_tree(entry: &TreeEntry, seen: &mut HashSet<String>) -> Result<()> {
    let remote_id = require_id(&entry.attributes)?;
    if !seen.insert(remote_id.clone()) {
        return Err(DriveError::MalformedTree(format!(
            "duplicate node id {remote_id}"
        )));
    }
    for attributes in &entry.files {
        let file_id = require_id(attributes)?;
        if !seen.insert(file_id.clone()) {
            return Err(DriveError::MalformedTree(format!(
                "duplicate node id {file_id}"
            )));
        }
    }
    for sub in &entry.folders {
        validate_tree(sub, seen)?;
    }
    Ok(())
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Client-side model of one remote folder tree.
///
/// Created with a root folder id; everything else is materialized lazily
/// from fetches. The root starts as a bare placeholder (`cached_info`
/// false) because only its id is known.
pub struct Drive<A: RemoteApi> {
    api: A,
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl<A: RemoteApi> Drive<A> {
    /// Build a drive rooted at the given remote folder id.
    pub fn new(api: A, root_id: impl Into<String>) -> Self {
        let mut drive = Drive {
            api,
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        let root = drive.alloc(Node::placeholder(root_id.into(), ItemKind::Folder, None));
        drive.root = root;
        drive
    }

    /// The root folder handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The underlying remote API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    // ── Arena management ─────────────────────────────────────────────────

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Release a node and its whole subtree; the slots go back on the free
    /// list with a bumped generation, so surviving handles turn stale.
    fn release(&mut self, id: NodeId) {
        let children: Vec<NodeId> = match self.node_ref(id) {
            Some(node) => node
                .subfolders
                .iter()
                .chain(node.subfiles.iter())
                .copied()
                .collect(),
            None => return,
        };
        for child in children {
            self.release(child);
        }
        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    fn node_ref(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Resolve a handle, failing with `StaleHandle` if its slot was
    /// released by a child-list rebuild.
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.node_ref(id).ok_or(DriveError::StaleHandle)
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(DriveError::StaleHandle)
    }

    fn expect_folder(&self, id: NodeId) -> Result<&Node> {
        let node = self.get(id)?;
        if node.kind != ItemKind::Folder {
            return Err(DriveError::NotAFolder(node.remote_id.clone()));
        }
        Ok(node)
    }

    // ── Item lifecycle ───────────────────────────────────────────────────

    /// Ensure the node's attribute snapshot (and, for folders, its one-level
    /// child lists) is current.
    ///
    /// A cache hit returns without any network call. `refresh` forces the
    /// fetch. Folder fetches rebuild `subfolders`/`subfiles` wholesale;
    /// every materialized child starts `cached_info` true (the listing
    /// delivered its full attributes) but with unknown children of its own.
    pub fn info(&mut self, id: NodeId, refresh: bool) -> Result<()> {
        let node = self.get(id)?;
        let fresh = node.cached_info
            && (node.kind == ItemKind::File || node.children_loaded);
        if fresh && !refresh {
            return Ok(());
        }
        let remote_id = node.remote_id.clone();
        match node.kind {
            ItemKind::File => {
                let snapshot = self.api.fetch_info(&remote_id)?;
                let node = self.get_mut(id)?;
                node.attributes = snapshot;
                node.cached_info = true;
            }
            ItemKind::Folder => {
                let listing = self.api.fetch_one_level(&remote_id)?;
                self.rebuild_children(id, listing)?;
                let node = self.get_mut(id)?;
                node.cached_info = true;
                node.cached_tree = false;
                node.children_loaded = true;
            }
        }
        Ok(())
    }

    /// Drop the cached snapshot; the next `info` will refetch. Folders also
    /// lose `cached_tree`, and so does every ancestor (a stale descendant
    /// means the ancestor subtrees are no longer fully known).
    pub fn clear_info(&mut self, id: NodeId) -> Result<()> {
        let node = self.get_mut(id)?;
        node.cached_info = false;
        node.cached_tree = false;
        node.children_loaded = false;
        self.invalidate_ancestor_trees(id);
        Ok(())
    }

    /// Mark the snapshot trusted without a network call. Used when another
    /// fetch path (a parent's tree fetch, say) already delivered this
    /// node's attributes.
    pub fn force_mark_cached(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.cached_info = true;
        Ok(())
    }

    /// Overwrite the attribute snapshot wholesale from a freshly received
    /// response and mark it cached. Child lists are untouched; a caller
    /// holding a one-level listing installs it via [`Drive::update_children`],
    /// and plain `info` rebuilds them from a fetch.
    pub fn update_info(&mut self, id: NodeId, snapshot: AttributeMap) -> Result<()> {
        let node = self.get_mut(id)?;
        node.attributes = snapshot;
        node.cached_info = true;
        Ok(())
    }

    /// Rebuild a folder's child lists wholesale from an already-held
    /// listing, without a network call. The folder ends up exactly as a
    /// fetched `info` would leave it: snapshot trusted, children
    /// materialized, subtree guarantee dropped.
    pub fn update_children(&mut self, id: NodeId, listing: FolderListing) -> Result<()> {
        self.expect_folder(id)?;
        self.rebuild_children(id, listing)?;
        let node = self.get_mut(id)?;
        node.cached_info = true;
        node.cached_tree = false;
        node.children_loaded = true;
        Ok(())
    }

    /// Invalidate one cached child category after a mutating call, without
    /// touching the other category's nodes. The folder drops back to
    /// uncached so the next `info` refetches.
    pub fn delete_info(&mut self, id: NodeId, category: ChildCategory) -> Result<()> {
        let node = self.get(id)?;
        if node.kind == ItemKind::File {
            self.get_mut(id)?.cached_info = false;
            return Ok(());
        }
        let dropped = match category {
            ChildCategory::Folders => std::mem::take(&mut self.get_mut(id)?.subfolders),
            ChildCategory::Files => std::mem::take(&mut self.get_mut(id)?.subfiles),
        };
        for child in dropped {
            self.release(child);
        }
        let node = self.get_mut(id)?;
        node.cached_info = false;
        node.cached_tree = false;
        node.children_loaded = false;
        self.invalidate_ancestor_trees(id);
        Ok(())
    }

    /// Walk the parent chain clearing `cached_tree`: a subtree containing
    /// an invalidated node is no longer fully known.
    fn invalidate_ancestor_trees(&mut self, id: NodeId) {
        let mut current = self.node_ref(id).and_then(|n| n.parent);
        while let Some(pid) = current {
            match self.node_mut(pid) {
                Some(parent) => {
                    parent.cached_tree = false;
                    current = parent.parent;
                }
                None => break,
            }
        }
    }

    /// Replace both child lists from a one-level listing.
    fn rebuild_children(&mut self, id: NodeId, listing: FolderListing) -> Result<()> {
        let old: Vec<NodeId> = {
            let node = self.get_mut(id)?;
            node.subfolders
                .drain(..)
                .chain(node.subfiles.drain(..))
                .collect()
        };
        for child in old {
            self.release(child);
        }
        let mut subfolders = Vec::with_capacity(listing.folders.len());
        for attributes in listing.folders {
            let remote_id = require_id(&attributes)?;
            subfolders.push(self.alloc(Node::from_snapshot(
                remote_id,
                ItemKind::Folder,
                attributes,
                Some(id),
            )));
        }
        let mut subfiles = Vec::with_capacity(listing.files.len());
        for attributes in listing.files {
            let remote_id = require_id(&attributes)?;
            subfiles.push(self.alloc(Node::from_snapshot(
                remote_id,
                ItemKind::File,
                attributes,
                Some(id),
            )));
        }
        let node = self.get_mut(id)?;
        node.subfolders = subfolders;
        node.subfiles = subfiles;
        Ok(())
    }

    // ── Folder operations ────────────────────────────────────────────────

    /// Ensure the entire subtree rooted here is current.
    ///
    /// A `cached_tree` hit returns immediately; otherwise one whole-subtree
    /// fetch replaces every descendant, marking `cached_info` and
    /// `cached_tree` on this folder and unconditionally on each descendant
    /// folder. One expensive call instead of N one-level calls; the caller
    /// picks the trade-off per use case.
    pub fn tree(&mut self, id: NodeId, refresh: bool) -> Result<()> {
        let node = self.expect_folder(id)?;
        if node.cached_tree && !refresh {
            return Ok(());
        }
        let remote_id = node.remote_id.clone();
        let entry = self.api.fetch_tree(&remote_id)?;
        // A malformed response must not leave half-built state behind:
        // reject it before the arena is touched, so a failed sync keeps
        // the folder uncached and the next `tree(false)` refetches.
        let mut seen = HashSet::new();
        validate_tree(&entry, &mut seen)?;
        self.apply_tree(id, entry)
    }

    /// Install a pre-validated tree response at `id`, recursing into
    /// subfolder entries.
    fn apply_tree(&mut self, id: NodeId, entry: TreeEntry) -> Result<()> {
        let remote_id = require_id(&entry.attributes)?;
        let old: Vec<NodeId> = {
            let node = self.get_mut(id)?;
            node.remote_id = remote_id;
            node.attributes = entry.attributes;
            node.cached_info = true;
            node.cached_tree = true;
            node.children_loaded = true;
            node.subfolders
                .drain(..)
                .chain(node.subfiles.drain(..))
                .collect()
        };
        for child in old {
            self.release(child);
        }
        let mut subfiles = Vec::with_capacity(entry.files.len());
        for attributes in entry.files {
            let file_id = require_id(&attributes)?;
            subfiles.push(self.alloc(Node::from_snapshot(
                file_id,
                ItemKind::File,
                attributes,
                Some(id),
            )));
        }
        self.get_mut(id)?.subfiles = subfiles;
        for sub in entry.folders {
            let sub_id = require_id(&sub.attributes)?;
            let child = self.alloc(Node::placeholder(sub_id, ItemKind::Folder, Some(id)));
            self.get_mut(id)?.subfolders.push(child);
            self.apply_tree(child, sub)?;
        }
        Ok(())
    }

    /// Create a child folder on the service.
    ///
    /// The parent's cached folder list is invalidated, and the returned
    /// handle is a detached node: it is deliberately not inserted into the
    /// parent's child list, so the parent's next `info` refetches instead
    /// of trusting a locally assembled ordering.
    pub fn create(&mut self, id: NodeId, name: &str, shared: bool) -> Result<NodeId> {
        let parent_remote = self.expect_folder(id)?.remote_id.clone();
        let attributes = self.api.create_folder(&parent_remote, name, shared)?;
        let remote_id = require_id(&attributes)?;
        self.delete_info(id, ChildCategory::Folders)?;
        Ok(self.alloc(Node::from_snapshot(
            remote_id,
            ItemKind::Folder,
            attributes,
            Some(id),
        )))
    }

    /// Upload a local file into this folder. Invalidates the cached file
    /// list; the returned handle is detached, as with `create`.
    pub fn upload(&mut self, id: NodeId, local_path: &Path) -> Result<NodeId> {
        let parent_remote = self.expect_folder(id)?.remote_id.clone();
        let attributes = self.api.upload_file(local_path, &parent_remote)?;
        let remote_id = require_id(&attributes)?;
        self.delete_info(id, ChildCategory::Files)?;
        Ok(self.alloc(Node::from_snapshot(
            remote_id,
            ItemKind::File,
            attributes,
            Some(id),
        )))
    }

    // ── Collaboration pass-throughs ──────────────────────────────────────

    /// List collaborations on a folder. Uncached pass-through.
    pub fn collaborations(&mut self, id: NodeId) -> Result<Vec<AttributeMap>> {
        let remote_id = self.expect_folder(id)?.remote_id.clone();
        self.api.collaborations(&remote_id)
    }

    /// Invite a collaborator to a folder. Uncached pass-through.
    pub fn invite_collaborator(
        &mut self,
        id: NodeId,
        email: &str,
        role: &str,
    ) -> Result<AttributeMap> {
        let remote_id = self.expect_folder(id)?.remote_id.clone();
        self.api.invite_collaborator(&remote_id, email, role)
    }
}
