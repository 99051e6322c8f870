//! Per-user config and state locations.
//!
//! Unix uses XDG base directories via the `xdg` crate. Elsewhere the `dirs`
//! crate supplies the roaming config dir and the local data dir (logs), each
//! with a `postinstall` subdirectory.

use anyhow::Result;
use std::path::PathBuf;

const APP_NAME: &str = "postinstall";

/// Path of `config.toml`. Parent directories are created.
#[cfg(unix)]
pub fn config_file() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Path of the log file. Parent directories are created.
#[cfg(unix)]
pub fn log_file() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME)?;
    Ok(xdg_dirs.place_state_file(format!("{APP_NAME}.log"))?)
}

#[cfg(not(unix))]
pub fn config_file() -> Result<PathBuf> {
    app_file(dirs::config_dir(), "config.toml")
}

#[cfg(not(unix))]
pub fn log_file() -> Result<PathBuf> {
    app_file(dirs::data_local_dir(), &format!("{APP_NAME}.log"))
}

/// `<base>/postinstall/<name>`, creating the directory.
#[cfg_attr(unix, allow(dead_code))]
fn app_file(base: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    use anyhow::Context;

    let dir = base
        .context("no per-user directory for this platform")?
        .join(APP_NAME);
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.join(name))
}
