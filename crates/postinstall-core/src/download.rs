//! Installer download driver.
//!
//! Streams one HTTP GET into `<dest>.part`, feeding cumulative byte counts to
//! a progress row, then verifies the optional checksum and renames the temp
//! file into place. Runs on the current thread; call from `spawn_blocking`
//! when used from async code.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

use thiserror::Error;

use crate::checksum;
use crate::config::PostinstallConfig;
use crate::fetch_head;
use crate::progress::{ProgressSurface, Tracker, Unit};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("transfer failed: {0}")]
    Transport(#[from] curl::Error),
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    #[error("short transfer: expected {expected} bytes, received {received}")]
    ShortTransfer { expected: u64, received: u64 },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("checksum: {0:#}")]
    Checksum(anyhow::Error),
}

impl DownloadError {
    fn io(path: &Path, source: io::Error) -> Self {
        DownloadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Transport settings shared by the HEAD request and the GET.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub connect_timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub user_agent: String,
}

impl DownloadOptions {
    pub fn from_config(cfg: &PostinstallConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            user_agent: cfg.user_agent(),
        }
    }
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self::from_config(&PostinstallConfig::default())
    }
}

/// One installer to fetch.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub dest: &'a Path,
    /// Heading printed above the progress row.
    pub label: &'a str,
    /// Lowercase or uppercase hex SHA-256 the file must match.
    pub expected_sha256: Option<&'a str>,
}

/// `setup.exe` → `setup.exe.part`
pub fn temp_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Downloads `req.url` to `req.dest`, drawing a row on `surface`.
/// Returns the number of bytes written.
///
/// The row is created up front when a HEAD request reports the size, otherwise
/// from the Content-Length of the final (post-redirect) 2xx response. With no
/// length at all there is no row. The row is only completed on success.
pub fn download_to_path(
    req: &DownloadRequest<'_>,
    opts: &DownloadOptions,
    surface: &ProgressSurface,
) -> Result<u64, DownloadError> {
    let expected_sha256 = req
        .expected_sha256
        .map(checksum::normalize_sha256)
        .transpose()
        .map_err(DownloadError::Checksum)?;

    let known_len = match fetch_head::head(req.url, opts) {
        Ok(head) => {
            tracing::debug!(
                url = req.url,
                content_length = ?head.content_length,
                content_type = ?head.content_type,
                "HEAD response"
            );
            head.content_length
        }
        Err(e) => {
            tracing::warn!(url = req.url, "HEAD request failed, size unknown: {:#}", e);
            None
        }
    };

    let temp_path = temp_path_for(req.dest);
    let mut file = File::create(&temp_path).map_err(|e| DownloadError::io(&temp_path, e))?;

    let mut tracker: Option<Tracker> = known_len
        .filter(|&n| n > 0)
        .map(|n| surface.create_with_unit(req.label, n as f64, Unit::Bytes));

    let result = transfer(req, opts, surface, &mut file, &mut tracker);
    drop(file);

    let written = match result.and_then(|written| {
        finish(req, &temp_path, written, expected_sha256.as_deref())
    }) {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            tracing::warn!(url = req.url, "download failed: {}", e);
            return Err(e);
        }
    };

    if let Some(t) = tracker.as_mut() {
        t.complete();
    }
    tracing::info!(
        url = req.url,
        dest = %req.dest.display(),
        bytes = written,
        "download complete"
    );
    Ok(written)
}

/// Runs the GET, writing the body to `file`. Returns bytes written.
fn transfer(
    req: &DownloadRequest<'_>,
    opts: &DownloadOptions,
    surface: &ProgressSurface,
    file: &mut File,
    tracker: &mut Option<Tracker>,
) -> Result<u64, DownloadError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(req.url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.progress(true)?;

    let mut written: u64 = 0;
    let mut write_error: Option<io::Error> = None;
    // Header lines of the response currently being received; a status line
    // starts a new one (redirect hop).
    let mut response_headers: Vec<String> = Vec::new();
    // Content-Length of the final 2xx response, once its headers are complete.
    let final_length: Cell<Option<u64>> = Cell::new(None);

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            let Ok(line) = str::from_utf8(data) else {
                return true;
            };
            let line = line.trim_end();
            if line.starts_with("HTTP/") {
                response_headers.clear();
                final_length.set(None);
            } else if line.is_empty() {
                if status_is_success(response_headers.first().map(String::as_str)) {
                    final_length.set(fetch_head::parse_headers(&response_headers).content_length);
                }
                return true;
            }
            response_headers.push(line.to_string());
            true
        })?;
        transfer.write_function(|data| {
            if let Err(e) = file.write_all(data) {
                write_error = Some(e);
                return Ok(0); // abort transfer
            }
            written += data.len() as u64;
            Ok(data.len())
        })?;
        transfer.progress_function(|_, dlnow, _, _| {
            if tracker.is_none() {
                if let Some(total) = final_length.get().filter(|&n| n > 0) {
                    *tracker = Some(surface.create_with_unit(req.label, total as f64, Unit::Bytes));
                }
            }
            if let Some(t) = tracker.as_mut() {
                t.update(dlnow);
            }
            true
        })?;
        transfer.perform()
    };

    if let Some(e) = write_error {
        return Err(DownloadError::io(&temp_path_for(req.dest), e));
    }
    performed?;

    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        return Err(DownloadError::Http {
            url: req.url.to_string(),
            status,
        });
    }

    let advertised = easy.content_length_download()?;
    if advertised >= 0.0 && written != advertised as u64 {
        return Err(DownloadError::ShortTransfer {
            expected: advertised as u64,
            received: written,
        });
    }

    file.flush()
        .and_then(|_| file.sync_all())
        .map_err(|e| DownloadError::io(&temp_path_for(req.dest), e))?;

    // Body finished before a progress callback saw the final headers.
    if tracker.is_none() {
        if let Some(total) = final_length.get().filter(|&n| n > 0) {
            *tracker = Some(surface.create_with_unit(req.label, total as f64, Unit::Bytes));
        }
    }
    if let Some(t) = tracker.as_mut() {
        t.update(written as f64);
    }
    Ok(written)
}

/// True if `status_line` is an `HTTP/x 2xx ...` line.
fn status_is_success(status_line: Option<&str>) -> bool {
    status_line
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u32>().ok())
        .is_some_and(|code| (200..300).contains(&code))
}

/// Checksum and rename into place.
fn finish(
    req: &DownloadRequest<'_>,
    temp_path: &Path,
    written: u64,
    expected_sha256: Option<&str>,
) -> Result<u64, DownloadError> {
    if let Some(expected) = expected_sha256 {
        let mismatch =
            checksum::verify_sha256(temp_path, expected).map_err(DownloadError::Checksum)?;
        if let Some(actual) = mismatch {
            return Err(DownloadError::ChecksumMismatch {
                path: req.dest.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
        tracing::debug!(dest = %req.dest.display(), "sha256 verified");
    }
    fs::rename(temp_path, req.dest).map_err(|e| DownloadError::io(req.dest, e))?;
    Ok(written)
}
