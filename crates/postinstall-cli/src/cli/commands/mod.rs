//! CLI command handlers, one per file.

mod checksum;
mod demo;
mod fetch;

pub use checksum::run_checksum;
pub use demo::{run_demo, DemoSettings};
pub use fetch::{run_fetch, FetchSettings};
