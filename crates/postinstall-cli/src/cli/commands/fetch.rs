//! `postinstall fetch <url>...` – download installers with live progress rows.

use anyhow::{Context, Result};
use postinstall_core::config::PostinstallConfig;
use postinstall_core::download::{self, DownloadOptions, DownloadRequest};
use postinstall_core::progress::{format_bytes, ProgressSurface};
use postinstall_core::url_model;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub urls: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub sha256: Option<String>,
}

pub async fn run_fetch(cfg: &PostinstallConfig, settings: FetchSettings) -> Result<()> {
    if settings.sha256.is_some() && settings.urls.len() != 1 {
        anyhow::bail!("--sha256 can only be used with a single URL");
    }

    let dir = match settings.output_dir.clone().or_else(|| cfg.download_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let opts = DownloadOptions::from_config(cfg);
    let progress = cfg.progress.clone();
    let fetched = tokio::task::spawn_blocking(move || {
        let surface = ProgressSurface::open(&progress);
        let result = fetch_all(&surface, &opts, &dir, &settings);
        surface.close();
        result
    })
    .await
    .context("download task join")??;

    for (path, bytes) in fetched {
        println!("{:>10}  {}", format_bytes(bytes as f64), path.display());
    }
    Ok(())
}

/// Downloads each URL in order on one surface. Stops at the first failure.
fn fetch_all(
    surface: &ProgressSurface,
    opts: &DownloadOptions,
    dir: &std::path::Path,
    settings: &FetchSettings,
) -> Result<Vec<(PathBuf, u64)>> {
    let mut fetched = Vec::with_capacity(settings.urls.len());
    for url in &settings.urls {
        let name = url_model::derive_filename(url);
        let dest = dir.join(&name);
        let req = DownloadRequest {
            url,
            dest: &dest,
            label: &name,
            expected_sha256: settings.sha256.as_deref(),
        };
        let bytes = download::download_to_path(&req, opts, surface)
            .with_context(|| format!("download {}", url))?;
        fetched.push((dest, bytes));
    }
    Ok(fetched)
}
