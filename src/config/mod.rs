use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Node used when neither the CLI nor the config file names one
pub const DEFAULT_RPC: &str = "http://127.0.0.1:8545";

/// Account whose balance is reported by default
pub const DEFAULT_ACCOUNT: &str = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";

/// Bored Ape Yacht Club transaction inspected by default
pub const DEFAULT_TX: &str = "0x3e4acda755e036f62c8893ea15d7c587a272252944b0433db4ea5464f235f379";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// HTTP JSON-RPC endpoint
    pub rpc: Option<String>,

    /// WebSocket endpoint
    pub ws: Option<String>,

    /// IPC socket path
    pub ipc: Option<String>,

    /// Path to the JSON ABI used for decoding, the bundled ABI when unset
    pub abi: Option<String>,

    /// Account to query the balance of
    pub account: Option<String>,

    /// Transaction hash to inspect
    pub tx: Option<String>,
}

impl Config {
    /// Configured ABI file, `None` selects the bundled ABI
    pub fn abi_path(&self) -> Option<PathBuf> {
        self.abi.as_deref().and_then(expand_path)
    }

    /// Configured IPC socket path
    pub fn ipc_path(&self) -> Option<PathBuf> {
        self.ipc.as_deref().and_then(expand_path)
    }

    pub fn account(&self) -> &str {
        self.account.as_deref().unwrap_or(DEFAULT_ACCOUNT)
    }

    pub fn tx(&self) -> &str {
        self.tx.as_deref().unwrap_or(DEFAULT_TX)
    }
}

/// Load the config file, falling back to defaults when none exists
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TXLENS_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("txlens").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("txlens").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "txlens", "txlens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Expand a leading `~/` to the home directory; blank input yields `None`
pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    Some(PathBuf::from(trimmed))
}
