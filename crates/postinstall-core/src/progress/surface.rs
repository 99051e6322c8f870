//! Shared multi-row display surface and the per-operation tracker handle.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::format::{self, Unit};
use super::model::{ProgressModel, ProgressSnapshot};
use crate::config::ProgressConfig;

/// Bar positions per row; the model's fraction is mapped onto this range.
const BAR_RESOLUTION: u64 = 1000;

/// Terminal surface holding every progress row of the process.
///
/// Open it once, pass it by reference to whatever drives downloads or
/// installs, and [`close`](Self::close) it when all operations are done.
/// Closing consumes the surface, so no tracker can be created afterwards.
pub struct ProgressSurface {
    multi: MultiProgress,
    bar_style: ProgressStyle,
    label_style: ProgressStyle,
    rows: Mutex<Vec<Row>>,
}

/// What the surface remembers about each registered row.
struct Row {
    label: String,
    total: f64,
    bar: ProgressBar,
}

impl ProgressSurface {
    /// Open a surface drawing to stderr, or a hidden one if `settings.hidden`.
    pub fn open(settings: &ProgressConfig) -> Self {
        let target = if settings.hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr_with_hz(settings.refresh_hz.max(1))
        };
        tracing::debug!(
            hidden = settings.hidden,
            refresh_hz = settings.refresh_hz,
            "progress surface opened"
        );
        Self::with_target(target, settings.bar_width)
    }

    /// Surface that renders nothing (tests, redirected output).
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden(), ProgressConfig::default().bar_width)
    }

    fn with_target(target: ProgressDrawTarget, bar_width: u16) -> Self {
        let template = format!("{{bar:{}.cyan/blue}} {{percent:>3}}% {{msg}}", bar_width.max(1));
        let bar_style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let label_style =
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_bar());
        Self {
            multi: MultiProgress::with_draw_target(target),
            bar_style,
            label_style,
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Register a new row counting plain units.
    pub fn create(&self, label: &str, total: f64) -> Tracker {
        self.create_at(label, total, Unit::Count, Instant::now())
    }

    /// Register a new row with an explicit display unit.
    pub fn create_with_unit(&self, label: &str, total: f64, unit: Unit) -> Tracker {
        self.create_at(label, total, unit, Instant::now())
    }

    /// Register a new row whose clock starts at `now`.
    pub fn create_at(&self, label: &str, total: f64, unit: Unit, now: Instant) -> Tracker {
        let heading = self
            .multi
            .add(ProgressBar::new(0).with_style(self.label_style.clone()));
        heading.finish_with_message(label.to_string());

        let bar = self.multi.add(
            ProgressBar::new(BAR_RESOLUTION).with_style(self.bar_style.clone()),
        );
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Row {
                label: label.to_string(),
                total,
                bar: bar.clone(),
            });

        let tracker = Tracker {
            label: label.to_string(),
            unit,
            model: ProgressModel::new(total, now),
            bar,
        };
        tracker.render();
        tracing::debug!(label, total, "progress row created");
        tracker
    }

    /// Number of rows registered so far.
    pub fn rows(&self) -> usize {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `(label, total)` of every row, in creation order.
    pub fn row_totals(&self) -> Vec<(String, f64)> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|row| (row.label.clone(), row.total))
            .collect()
    }

    /// Tear down the surface. Rows that never completed are left drawn as-is.
    pub fn close(self) {
        let rows = self.rows.into_inner().unwrap_or_else(PoisonError::into_inner);
        let mut abandoned = 0usize;
        for row in &rows {
            if !row.bar.is_finished() {
                row.bar.abandon();
                abandoned += 1;
            }
        }
        tracing::debug!(rows = rows.len(), abandoned, "progress surface closed");
    }
}

/// Handle for one row. Owned by the producer driving the operation.
pub struct Tracker {
    label: String,
    unit: Unit,
    model: ProgressModel,
    bar: ProgressBar,
}

impl Tracker {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn total(&self) -> f64 {
        self.model.total()
    }

    pub fn current(&self) -> f64 {
        self.model.current()
    }

    pub fn is_completed(&self) -> bool {
        self.model.is_completed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.model.snapshot()
    }

    /// Push a new absolute progress value.
    pub fn update(&mut self, value: f64) {
        self.update_at(value, Instant::now());
    }

    /// Push a new absolute progress value observed at `now`.
    pub fn update_at(&mut self, value: f64, now: Instant) {
        if self.model.is_completed() {
            return;
        }
        self.model.update_at(value, now);
        self.render();
    }

    /// Mark the operation finished: full bar, rate "done", ETA zero.
    pub fn complete(&mut self) {
        if self.model.is_completed() {
            return;
        }
        self.model.complete();
        let snapshot = self.model.snapshot();
        self.bar.set_position(BAR_RESOLUTION);
        self.bar
            .finish_with_message(format::row_message(&snapshot, self.unit));
        tracing::debug!(label = %self.label, "progress row completed");
    }

    /// Current text to the right of the bar.
    pub fn message(&self) -> String {
        format::row_message(&self.model.snapshot(), self.unit)
    }

    fn render(&self) {
        let snapshot = self.model.snapshot();
        let position = (snapshot.fraction * BAR_RESOLUTION as f64).round() as u64;
        self.bar.set_position(position.min(BAR_RESOLUTION));
        self.bar.set_message(format::row_message(&snapshot, self.unit));
    }
}
