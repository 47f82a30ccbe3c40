//! Unix-style path resolution over the drive tree.
//!
//! `at` resolves a slash-separated path relative to a node (or from the
//! tree root for absolute paths) and yields an optional handle — nothing
//! matched is `Ok(None)`, not an error. `traverse` walks folder-name
//! segments, optionally creating what is missing.

use super::node::{ItemKind, NodeId};
use super::search::Criteria;
use super::Drive;
use crate::api::RemoteApi;
use crate::error::{DriveError, Result};

impl<A: RemoteApi> Drive<A> {
    /// Walk parent links up to the node with no parent.
    fn root_of(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        while let Some(parent) = self.get(current)?.parent() {
            current = parent;
        }
        Ok(current)
    }

    /// Resolve a path relative to `id`.
    ///
    /// A leading `/` starts from the tree root. `""` and `"."` segments
    /// are no-ops; `".."` moves to the direct parent (absent at the
    /// root). Any other segment is looked up by a non-recursive name
    /// search on the current folder, taking the first match; resolving a
    /// segment against a non-folder yields `Ok(None)` before any lookup.
    ///
    /// A trailing `/` forces a folder result: if the resolved item is a
    /// file, a same-named sibling folder is the fallback.
    pub fn at(&mut self, id: NodeId, path: &str) -> Result<Option<NodeId>> {
        let mut current = if path.starts_with('/') {
            self.root_of(id)?
        } else {
            id
        };
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => match self.get(current)?.parent() {
                    Some(parent) => current = parent,
                    None => return Ok(None),
                },
                name => {
                    if self.get(current)?.kind() != ItemKind::Folder {
                        return Ok(None);
                    }
                    let matches =
                        self.find(current, &Criteria::new().eq("name", name), false)?;
                    match matches.first() {
                        Some(&found) => current = found,
                        None => return Ok(None),
                    }
                }
            }
        }
        if path.ends_with('/') && self.get(current)?.kind() != ItemKind::Folder {
            return self.sibling_folder(current);
        }
        Ok(Some(current))
    }

    /// A folder among the parent's subfolders carrying the same name.
    fn sibling_folder(&self, id: NodeId) -> Result<Option<NodeId>> {
        let node = self.get(id)?;
        let (name, parent) = match (node.name(), node.parent()) {
            (Some(name), Some(parent)) => (name.to_string(), parent),
            _ => return Ok(None),
        };
        for candidate in self.get(parent)?.subfolders().to_vec() {
            if self.get(candidate)?.name() == Some(name.as_str()) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Walk `segments` as folder names below `id`.
    ///
    /// A missing segment is created when `create` is set; otherwise the
    /// walk fails with `FolderNotFound`. Created folders are empty, so
    /// deeper missing segments keep being created on the way down.
    pub fn traverse(&mut self, id: NodeId, segments: &[&str], create: bool) -> Result<NodeId> {
        let mut current = id;
        for segment in segments {
            self.info(current, false)?;
            let mut next = None;
            for candidate in self.get(current)?.subfolders().to_vec() {
                if self.get(candidate)?.name() == Some(*segment) {
                    next = Some(candidate);
                    break;
                }
            }
            current = match next {
                Some(found) => found,
                None if create => self.create(current, segment, false)?,
                None => return Err(DriveError::FolderNotFound(segment.to_string())),
            };
        }
        Ok(current)
    }
}
