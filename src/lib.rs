//! Client-side object model for a remote hierarchical file-storage
//! service.
//!
//! The transport is an external collaborator behind the [`RemoteApi`]
//! trait; this crate owns everything layered on top of it: item caching
//! and lazy loading, explicit invalidation, whole-subtree synchronization,
//! Unix-style path resolution, criteria search, and the mapping from raw
//! service status strings to a typed error taxonomy.
//!
//! A [`Drive`] owns the node arena for one remote tree; callers hold
//! [`NodeId`] handles and drive every operation through it:
//!
//! ```no_run
//! use remote_drive::{Criteria, Drive, RemoteApi};
//!
//! fn list_readmes<A: RemoteApi>(mut drive: Drive<A>) -> remote_drive::Result<()> {
//!     let root = drive.root();
//!     for id in drive.find(root, &Criteria::new().eq("name", "README"), true)? {
//!         println!("{}", drive.get(id)?.remote_id());
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod config;
mod drive;
mod error;

pub use api::{AttributeMap, FolderListing, RemoteApi, TreeEntry};
pub use config::{CacheConfig, ClientConfig, ConnectionConfig, DEFAULT_TIMEOUT_SECS};
pub use drive::node::{ChildCategory, ItemKind, Node, NodeId};
pub use drive::search::{Criteria, Criterion};
pub use drive::Drive;
pub use error::{classify, DriveError, ErrorKind, Result};
