use std::{
    collections::BTreeSet,
    fs,
    io::ErrorKind,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::Duration,
};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::TopListError;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_POOL_SIZE: usize = 4;

/// How the leaderboard is shown to whoever asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DisplayMode {
    /// One chat line per entry
    #[default]
    ChatTranscript,
    /// A scrollable menu of entries
    InteractiveList,
}

impl TryFrom<u8> for DisplayMode {
    type Error = TopListError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DisplayMode::ChatTranscript),
            1 => Ok(DisplayMode::InteractiveList),
            other => Err(TopListError::InvalidConfig(format!(
                "unknown display mode {other}, expected 0 (chat) or 1 (menu)"
            ))),
        }
    }
}

impl From<DisplayMode> for u8 {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::ChatTranscript => 0,
            DisplayMode::InteractiveList => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(alias = "top_players_limit")]
    pub limit: NonZeroUsize,
    #[serde(alias = "TopMenuType")]
    pub mode: DisplayMode,
    #[serde(rename = "commands")]
    pub trigger_names: BTreeSet<String>,
    /// Whether the menu widget may show its own branding
    #[serde(rename = "menu_attribution", alias = "KitsuneMenuDeveloperDisplay")]
    pub menu_attribution: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            limit: NonZeroUsize::new(DEFAULT_LIMIT).unwrap_or(NonZeroUsize::MIN),
            mode: DisplayMode::default(),
            trigger_names: BTreeSet::new(),
            menu_attribution: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the SQLite database holding player scores
    pub database: Option<String>,
    pub query_timeout_ms: u64,
    pub pool_size: usize,
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: None,
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub display: DisplayConfig,
    /// Translations overriding the built-in strings
    pub language_file: Option<PathBuf>,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, TopListError> {
        serde_json::from_str(json).map_err(|e| TopListError::InvalidConfig(e.to_string()))
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match Self::read(path) {
            Err(e) if is_not_found(&e) => {
                info!("No config at {}, using defaults", path.display());
                Ok(Config::default())
            }
            other => other,
        }
    }

    /// Reads the config file, a missing file is an error.
    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let config = Config::from_json(&json)
            .with_context(|| format!("Could not parse {}", path.display()))?;
        Ok(config)
    }

    /// Sections of `newer` that differ from `self` and only apply after a restart.
    pub fn restart_required(&self, newer: &Config) -> Vec<&'static str> {
        let mut sections = vec![];
        if self.language_file != newer.language_file {
            sections.push("language_file");
        }
        if self.store != newer.store {
            sections.push("store");
        }
        sections
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .map(|e| e.kind() == ErrorKind::NotFound)
            .unwrap_or(false)
    })
}

/// Display settings shared between the dispatcher and reloads.
///
/// Readers get an immutable snapshot, a reload swaps the whole snapshot at once.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<DisplayConfig>>>,
}

impl SharedConfig {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    pub fn snapshot(&self) -> Arc<DisplayConfig> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    pub fn replace(&self, config: DisplayConfig) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(config);
    }
}
