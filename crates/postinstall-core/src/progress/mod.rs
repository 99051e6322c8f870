//! Progress reporting for long-running operations (downloads, installers).
//!
//! Producers push absolute progress values into a [`Tracker`]; the tracker
//! derives a throttled instantaneous rate and an ETA from the all-time
//! average rate, and redraws its row on the shared [`ProgressSurface`].

mod format;
mod model;
mod surface;

pub use format::{format_bytes, format_eta, format_magnitude, format_rate, row_message, Unit};
pub use model::{Eta, ProgressModel, ProgressSnapshot, Rate, SAMPLE_INTERVAL};
pub use surface::{ProgressSurface, Tracker};
