//! Text shown next to each bar: magnitudes, rate, ETA.

use super::model::{Eta, ProgressSnapshot, Rate};

/// Unit of a tracker's magnitudes. Only affects display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// Plain numbers (items, megabytes already scaled by the caller, ...).
    #[default]
    Count,
    /// Bytes, shown with binary prefixes.
    Bytes,
}

const UNKNOWN: &str = "unknown";
const DONE: &str = "done";

pub fn format_magnitude(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Count => format_count(value),
        Unit::Bytes => format_bytes(value),
    }
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Human-readable size using binary units (B, KiB, MiB, GiB, TiB).
pub fn format_bytes(value: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if !value.is_finite() {
        return UNKNOWN.to_string();
    }
    let mut scaled = value;
    let mut idx = 0;
    while scaled.abs() >= 1024.0 && idx < UNITS.len() - 1 {
        scaled /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{:.0} {}", scaled, UNITS[0])
    } else {
        format!("{:.1} {}", scaled, UNITS[idx])
    }
}

pub fn format_rate(rate: Rate, unit: Unit) -> String {
    match rate {
        Rate::Unknown => UNKNOWN.to_string(),
        Rate::Done => DONE.to_string(),
        Rate::PerSec(r) => format!("{}/s", format_magnitude(r, unit)),
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_eta(eta: Eta) -> String {
    let secs = match eta {
        Eta::Unknown => return UNKNOWN.to_string(),
        Eta::Secs(s) if !s.is_finite() || s < 0.0 => return UNKNOWN.to_string(),
        Eta::Secs(s) => s.round() as u64,
    };
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Message rendered to the right of the bar.
pub fn row_message(snapshot: &ProgressSnapshot, unit: Unit) -> String {
    format!(
        "{}  ETA {}  {}/{}",
        format_rate(snapshot.rate, unit),
        format_eta(snapshot.eta),
        format_magnitude(snapshot.current, unit),
        format_magnitude(snapshot.total, unit),
    )
}
