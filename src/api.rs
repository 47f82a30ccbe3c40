//! Remote API contract: the narrow interface the object model consumes.
//!
//! The transport (HTTP, request signing, ticket exchange) lives behind
//! [`RemoteApi`]. Implementations turn raw service status strings into
//! [`DriveError::Remote`](crate::error::DriveError) via
//! [`classify`](crate::error::classify); the core never sees transport
//! errors directly.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// One item's attribute snapshot as delivered by the service.
///
/// Attributes are populated wholesale from a response, never merged
/// field-by-field. Every snapshot must carry an `"id"` entry.
pub type AttributeMap = serde_json::Map<String, Value>;

/// One level of a folder's children: files and folders immediately under it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderListing {
    #[serde(default)]
    pub folders: Vec<AttributeMap>,
    #[serde(default)]
    pub files: Vec<AttributeMap>,
}

/// A whole-subtree response: the folder's own attributes plus nested
/// entries for every descendant, delivered in one round trip.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    /// The folder's own attribute snapshot.
    #[serde(flatten)]
    pub attributes: AttributeMap,
    #[serde(default)]
    pub folders: Vec<TreeEntry>,
    #[serde(default)]
    pub files: Vec<AttributeMap>,
}

/// The remote file-storage service, as seen by the object model.
///
/// Any call may fail with a typed remote error; the core propagates those
/// unmodified. No caching happens at this layer.
pub trait RemoteApi {
    /// Fetch one item's attribute snapshot by id.
    fn fetch_info(&self, id: &str) -> Result<AttributeMap>;

    /// Fetch the files and folders immediately under a folder.
    fn fetch_one_level(&self, folder_id: &str) -> Result<FolderListing>;

    /// Fetch the entire subtree rooted at a folder in one call.
    fn fetch_tree(&self, folder_id: &str) -> Result<TreeEntry>;

    /// Create a child folder; returns the new folder's attributes.
    fn create_folder(&self, parent_id: &str, name: &str, shared: bool) -> Result<AttributeMap>;

    /// Upload a local file into a folder; returns the new file's attributes.
    fn upload_file(&self, local_path: &Path, parent_id: &str) -> Result<AttributeMap>;

    /// List collaborations on a folder.
    fn collaborations(&self, folder_id: &str) -> Result<Vec<AttributeMap>>;

    /// Invite a collaborator to a folder.
    fn invite_collaborator(&self, folder_id: &str, email: &str, role: &str)
        -> Result<AttributeMap>;
}
