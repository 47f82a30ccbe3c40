//! Client configuration: TOML file loading and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. `$REMOTE_DRIVE_CONFIG` environment variable (path to config file)
//! 2. Project-local `.remote-drive.toml` in the current working directory
//! 3. Global `~/.config/remote-drive/config.toml`
//! 4. Built-in defaults
//!
//! The object model core never reads configuration itself; transport
//! implementations of [`RemoteApi`](crate::api::RemoteApi) consume it when
//! they are constructed.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DriveError, Result};

/// Connection settings for a transport implementation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Base URL of the service API.
    pub endpoint: Option<String>,
    /// Pre-issued access token; absent means the transport performs its
    /// own ticket exchange.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Cache behavior knobs.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Prefer whole-subtree fetches when a caller asks for recursive
    /// operations.
    pub prefetch_trees: Option<bool>,
}

/// Top-level client configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (higher-priority source wins per field).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub cache: CacheConfig,
}

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("REMOTE_DRIVE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".remote-drive.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("remote-drive").join("config.toml"));
    }

    paths
}

impl ClientConfig {
    /// Read and parse one TOML config file.
    pub fn load_from(path: &Path) -> Result<ClientConfig> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DriveError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the final merged configuration from the candidate locations.
    ///
    /// Unreadable or unparsable candidates are skipped; built-in defaults
    /// back everything.
    pub fn load() -> ClientConfig {
        let mut config = ClientConfig::default();
        // Walk in reverse so the highest-priority source overrides.
        for path in candidate_paths().iter().rev() {
            if let Ok(file_cfg) = ClientConfig::load_from(path) {
                config = config.merge(&file_cfg);
            }
        }
        config
    }

    /// Merge `other` on top of `self` — `other`'s `Some` values win.
    pub fn merge(self, other: &ClientConfig) -> ClientConfig {
        ClientConfig {
            connection: ConnectionConfig {
                endpoint: other
                    .connection
                    .endpoint
                    .clone()
                    .or(self.connection.endpoint),
                access_token: other
                    .connection
                    .access_token
                    .clone()
                    .or(self.connection.access_token),
                timeout_secs: other.connection.timeout_secs.or(self.connection.timeout_secs),
            },
            cache: CacheConfig {
                prefetch_trees: other.cache.prefetch_trees.or(self.cache.prefetch_trees),
            },
        }
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Per-request timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.connection.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Whether recursive operations should prefer whole-subtree fetches.
    pub fn prefetch_trees(&self) -> bool {
        self.cache.prefetch_trees.unwrap_or(true)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.connection.endpoint, None);
        assert_eq!(cfg.connection.access_token, None);
        assert_eq!(cfg.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert!(cfg.prefetch_trees());
    }

    #[test]
    fn toml_parsing_full() {
        let toml = r#"
[connection]
endpoint = "https://api.example.com/v2"
access_token = "tok-123"
timeout_secs = 5

[cache]
prefetch_trees = false
"#;
        let cfg: ClientConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(
            cfg.connection.endpoint.as_deref(),
            Some("https://api.example.com/v2")
        );
        assert_eq!(cfg.connection.access_token.as_deref(), Some("tok-123"));
        assert_eq!(cfg.timeout_secs(), 5);
        assert!(!cfg.prefetch_trees());
    }

    #[test]
    fn toml_parsing_partial_keeps_defaults() {
        let cfg: ClientConfig =
            toml::from_str("[connection]\nendpoint = \"https://x\"\n").unwrap();
        assert_eq!(cfg.connection.endpoint.as_deref(), Some("https://x"));
        assert_eq!(cfg.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn merge_prefers_override() {
        let base: ClientConfig =
            toml::from_str("[connection]\nendpoint = \"https://a\"\ntimeout_secs = 9\n").unwrap();
        let over: ClientConfig =
            toml::from_str("[connection]\nendpoint = \"https://b\"\n").unwrap();
        let merged = base.merge(&over);
        assert_eq!(merged.connection.endpoint.as_deref(), Some("https://b"));
        assert_eq!(merged.timeout_secs(), 9);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[connection]\naccess_token = \"abc\"").unwrap();
        let cfg = ClientConfig::load_from(&path).unwrap();
        assert_eq!(cfg.connection.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn env_var_heads_the_candidate_chain() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("from-env.toml");
        std::fs::write(&path, "[connection]\nendpoint = \"https://from-env\"\n").unwrap();
        std::env::set_var("REMOTE_DRIVE_CONFIG", &path);

        let candidates = candidate_paths();
        let cfg = ClientConfig::load();
        std::env::remove_var("REMOTE_DRIVE_CONFIG");

        assert_eq!(candidates[0], path);
        assert_eq!(cfg.connection.endpoint.as_deref(), Some("https://from-env"));
    }

    #[test]
    fn local_candidate_precedes_global() {
        let candidates = candidate_paths();
        let local = std::env::current_dir().unwrap().join(".remote-drive.toml");
        let local_pos = candidates.iter().position(|p| *p == local);
        let global_pos = candidates
            .iter()
            .position(|p| p.ends_with("remote-drive/config.toml"));
        match (local_pos, global_pos) {
            (Some(l), Some(g)) => assert!(l < g),
            // Headless environments may lack a config dir; the local
            // candidate must still be present.
            (Some(_), None) => {}
            _ => panic!("project-local candidate missing"),
        }
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let err = ClientConfig::load_from(Path::new("/nonexistent/cfg.toml")).unwrap_err();
        assert!(matches!(err, DriveError::Io(_)));
    }

    #[test]
    fn load_from_bad_toml_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, DriveError::Config(_)));
    }
}
