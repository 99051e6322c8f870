use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Progress surface settings (optional `[progress]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Maximum redraws per second.
    pub refresh_hz: u8,
    /// Width of each bar in terminal cells.
    pub bar_width: u16,
    /// Draw nothing (CI logs, redirected stderr).
    pub hidden: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 10,
            bar_width: 40,
            hidden: false,
        }
    }
}

/// Global configuration loaded from the per-user `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostinstallConfig {
    /// Where downloaded installers are stored (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Connect timeout for HTTP requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Transfers slower than this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds are aborted.
    pub low_speed_time_secs: u64,
    /// User-Agent header (None = `postinstall/<version>`).
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl Default for PostinstallConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            user_agent: None,
            progress: ProgressConfig::default(),
        }
    }
}

impl PostinstallConfig {
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("postinstall/{}", env!("CARGO_PKG_VERSION")))
    }
}

pub fn config_path() -> Result<PathBuf> {
    paths::config_file()
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PostinstallConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<PostinstallConfig> {
    if !path.exists() {
        let default_cfg = PostinstallConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PostinstallConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
