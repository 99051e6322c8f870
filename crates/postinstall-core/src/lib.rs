pub mod config;
pub mod logging;
pub mod paths;

pub mod checksum;
pub mod download;
pub mod fetch_head;
pub mod progress;
pub mod url_model;
