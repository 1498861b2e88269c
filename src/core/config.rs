//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatter/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The channel catalog lives here too: `[[channels]]` entries are the real
//! channels in display order; the unscoped "all" channel is implicit at
//! position 0 and never configured.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::core::channel::{Channel, ChannelCatalog};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Sign in as this user automatically at startup.
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelEntry {
    pub name: String,
    pub color: String,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8090";

/// Catalog used when no `[[channels]]` entries are configured.
fn default_channels() -> Vec<ChannelEntry> {
    [
        ("general", "cyan"),
        ("bugs", "red"),
        ("ideas", "yellow"),
        ("random", "magenta"),
    ]
    .into_iter()
    .map(|(name, color)| ChannelEntry {
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_base_url: String,
    pub username: Option<String>,
    pub catalog: ChannelCatalog,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// Catalog entries that break an invariant (reserved name, duplicate).
    Catalog(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Catalog(msg) => write!(f, "channel catalog error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.chatter/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatter").join("config.toml"))
}

/// Load config from `~/.chatter/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatterConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChatterConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ChatterConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ChatterConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: ChatterConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r##"# Chatter Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# username = "alice"                 # Sign in automatically at startup

# [backend]
# base_url = "http://localhost:8090" # Or set CHATTER_BACKEND_URL env var

# Real channels, in display order. "all" is always available and needs no
# entry. Colors: named ratatui colors ("cyan", "red", ...) or "#rrggbb".
#
# [[channels]]
# name = "general"
# color = "cyan"
#
# [[channels]]
# name = "bugs"
# color = "red"
"##;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_backend_url` and `cli_username` come from CLI flags (None = not specified).
pub fn resolve(
    config: &ChatterConfig,
    cli_backend_url: Option<&str>,
    cli_username: Option<&str>,
) -> Result<ResolvedConfig, ConfigError> {
    // Backend URL: CLI → env → config → default
    let backend_base_url = cli_backend_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CHATTER_BACKEND_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_BASE_URL.to_string());

    // Username: CLI → env → config (no default — anonymous until login)
    let username = cli_username
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CHATTER_USERNAME").ok())
        .or_else(|| config.general.username.clone());

    let entries = if config.channels.is_empty() {
        default_channels()
    } else {
        config.channels.clone()
    };
    let catalog = build_catalog(&entries)?;

    Ok(ResolvedConfig {
        backend_base_url,
        username,
        catalog,
    })
}

/// Validate channel entries and build the catalog.
/// "all" is reserved, and duplicate names would make tag colors ambiguous.
fn build_catalog(entries: &[ChannelEntry]) -> Result<ChannelCatalog, ConfigError> {
    let mut seen = std::collections::HashSet::new();
    let mut channels = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.name == crate::core::channel::ALL_CHANNEL {
            return Err(ConfigError::Catalog(
                "\"all\" is reserved and cannot be configured as a channel".to_string(),
            ));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::Catalog(format!(
                "duplicate channel name \"{}\"",
                entry.name
            )));
        }
        channels.push(Channel {
            name: entry.name.clone(),
            color: entry.color.clone(),
        });
    }
    Ok(ChannelCatalog::new(channels))
}
