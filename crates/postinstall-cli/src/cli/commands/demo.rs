//! `postinstall demo` – simulated operations on one progress surface.
//!
//! Every row advances at its own speed; rows are updated one after another
//! from a single loop, the way sequential download steps drive them.

use anyhow::Result;
use postinstall_core::config::ProgressConfig;
use postinstall_core::progress::{ProgressSurface, Tracker};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct DemoSettings {
    pub rows: usize,
    pub total: u64,
    pub step_ms: u64,
}

/// Units row `index` advances per round: row 0 is fastest.
fn step_for_row(index: usize, total: u64) -> f64 {
    let base = (total as f64 / 40.0).max(1.0);
    base / (index as f64 + 1.0)
}

pub async fn run_demo(progress: &ProgressConfig, settings: DemoSettings) -> Result<()> {
    if settings.rows == 0 || settings.total == 0 {
        anyhow::bail!("--rows and --total must be positive");
    }

    let surface = ProgressSurface::open(progress);
    let total = settings.total as f64;
    let mut rows: Vec<(Tracker, f64)> = (0..settings.rows)
        .map(|i| (surface.create(&format!("operation {}", i + 1), total), 0.0))
        .collect();

    let delay = Duration::from_millis(settings.step_ms);
    while rows.iter().any(|(t, _)| !t.is_completed()) {
        for (index, (tracker, value)) in rows.iter_mut().enumerate() {
            if tracker.is_completed() {
                continue;
            }
            *value += step_for_row(index, settings.total);
            if *value >= total {
                tracker.complete();
            } else {
                tracker.update(*value);
            }
        }
        tokio::time::sleep(delay).await;
    }

    surface.close();
    tracing::info!(rows = settings.rows, "demo finished");
    Ok(())
}
