//! Error model: the crate-wide error type and the remote status taxonomy.
//!
//! The remote service reports failures as opaque status strings. `classify`
//! maps each status to exactly one [`ErrorKind`] through a single immutable
//! lookup table; anything the table doesn't know is [`ErrorKind::Unknown`].
//! The table is a compatibility contract with the service and is matched
//! case-sensitively, with no normalization.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, DriveError>;

/// Category of a remote service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Restricted,
    InvalidInput,
    NotAuthorized,
    NoAccess,
    EmailInvalid,
    EmailTaken,
    Generic,
    InvalidItem,
    InvalidFolder,
    NoParent,
    InvalidName,
    NameTaken,
    UploadFailed,
    AccountExceeded,
    SizeExceeded,
    NotShared,
    UserNotFound,
    Unknown,
}

/// Status-string → kind table. Exact strings, including the spacing and
/// casing variants the service actually emits.
const STATUS_TABLE: &[(&str, ErrorKind)] = &[
    ("application_restricted", ErrorKind::Restricted),
    ("wrong_input", ErrorKind::InvalidInput),
    ("Wrong input params", ErrorKind::InvalidInput),
    ("wrong input params", ErrorKind::InvalidInput),
    ("e_input_params", ErrorKind::InvalidInput),
    ("not_logged_in", ErrorKind::NotAuthorized),
    ("wrong auth token", ErrorKind::NotAuthorized),
    ("e_no_access", ErrorKind::NoAccess),
    ("e_access_denied", ErrorKind::NoAccess),
    ("access_denied", ErrorKind::NoAccess),
    ("email_invalid", ErrorKind::EmailInvalid),
    ("email_already_registered", ErrorKind::EmailTaken),
    ("get_auth_token_error", ErrorKind::Generic),
    ("e_register", ErrorKind::Generic),
    ("e_move_node", ErrorKind::Generic),
    ("e_copy_node", ErrorKind::Generic),
    ("e_rename_node", ErrorKind::Generic),
    ("e_set_description", ErrorKind::Generic),
    ("get_comments_error", ErrorKind::Generic),
    ("add_comment_error", ErrorKind::Generic),
    ("delete_comment_error", ErrorKind::Generic),
    ("share_error", ErrorKind::Generic),
    ("unshare_error", ErrorKind::Generic),
    ("private_share_error", ErrorKind::Generic),
    ("wrong_node", ErrorKind::InvalidItem),
    ("e_folder_id", ErrorKind::InvalidFolder),
    ("no_parent", ErrorKind::NoParent),
    ("invalid_folder_name", ErrorKind::InvalidName),
    ("e_no_folder_name", ErrorKind::InvalidName),
    ("folder_name_too_big", ErrorKind::InvalidName),
    ("upload_invalid_file_name", ErrorKind::InvalidName),
    ("e_filename_in_use", ErrorKind::NameTaken),
    ("s_folder_exists", ErrorKind::NameTaken),
    ("upload_some_files_failed", ErrorKind::UploadFailed),
    ("not_enough_free_space", ErrorKind::AccountExceeded),
    ("filesize_limit_exceeded", ErrorKind::SizeExceeded),
    ("file_not_shared", ErrorKind::NotShared),
    ("e_get_user_id", ErrorKind::UserNotFound),
];

static STATUS_KINDS: Lazy<HashMap<&'static str, ErrorKind>> =
    Lazy::new(|| STATUS_TABLE.iter().copied().collect());

/// Map a raw status string from the remote service to its error kind.
///
/// Total function: any string outside the table yields `ErrorKind::Unknown`.
pub fn classify(status: &str) -> ErrorKind {
    STATUS_KINDS
        .get(status)
        .copied()
        .unwrap_or(ErrorKind::Unknown)
}

/// Errors surfaced by the object model.
#[derive(Debug, Error)]
pub enum DriveError {
    /// A failure reported by the remote service, classified by status string.
    #[error("remote service error ({kind:?}): {status}")]
    Remote { kind: ErrorKind, status: String },

    /// A traverse segment named a folder that does not exist.
    #[error("folder not found: {0}")]
    FolderNotFound(String),

    /// A child-bearing operation was invoked on a file node.
    #[error("not a folder: {0}")]
    NotAFolder(String),

    /// The node handle refers to a slot released by a child-list rebuild.
    #[error("stale node handle")]
    StaleHandle,

    /// A tree response contained a cycle, a duplicate node, or an entry
    /// without an id.
    #[error("malformed tree response: {0}")]
    MalformedTree(String),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// I/O errors from local-file handling (config, upload sources).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriveError {
    /// Build a `Remote` error from a raw status string, classifying it.
    pub fn remote(status: impl Into<String>) -> Self {
        let status = status.into();
        let kind = classify(&status);
        DriveError::Remote { kind, status }
    }

    /// The remote error kind, if this is a remote service error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DriveError::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
