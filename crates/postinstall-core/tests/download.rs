//! Integration tests: download driver against a local HTTP server.

mod common;

use postinstall_core::checksum;
use postinstall_core::download::{
    download_to_path, temp_path_for, DownloadError, DownloadOptions, DownloadRequest,
};
use postinstall_core::progress::ProgressSurface;
use std::time::Duration;
use tempfile::tempdir;

use common::http_server::{self, ServerOptions};

fn body() -> Vec<u8> {
    (0u8..251).cycle().take(256 * 1024).collect()
}

fn options() -> DownloadOptions {
    DownloadOptions {
        connect_timeout: Duration::from_secs(5),
        ..DownloadOptions::default()
    }
}

#[test]
fn download_writes_file_and_completes_row() {
    let body = body();
    let url = format!("{}SetupTool.exe", http_server::start(body.clone()));
    let dir = tempdir().unwrap();
    let dest = dir.path().join("SetupTool.exe");
    let surface = ProgressSurface::hidden();

    let req = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "SetupTool.exe",
        expected_sha256: None,
    };
    let written = download_to_path(&req, &options(), &surface).expect("download");

    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert!(!temp_path_for(&dest).exists(), "temp file must be renamed away");
    assert_eq!(
        surface.row_totals(),
        vec![("SetupTool.exe".to_string(), body.len() as f64)]
    );
    surface.close();
}

#[test]
fn download_without_head_support_still_succeeds() {
    let body = body();
    let base = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            head_allowed: false,
            ..ServerOptions::default()
        },
    );
    let url = format!("{}driver.msi", base);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("driver.msi");
    let surface = ProgressSurface::hidden();

    let req = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "driver.msi",
        expected_sha256: None,
    };
    let written = download_to_path(&req, &options(), &surface).expect("download");
    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    // Row comes from the GET's Content-Length instead.
    assert_eq!(
        surface.row_totals(),
        vec![("driver.msi".to_string(), body.len() as f64)]
    );
    surface.close();
}

#[test]
fn redirect_row_uses_final_response_length() {
    let body: Vec<u8> = (0u8..=255).cycle().take(200_000).collect();
    let base = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            head_allowed: false,
            redirect_to: Some("/b"),
            ..ServerOptions::default()
        },
    );
    let url = format!("{}a", base);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("b.exe");
    let surface = ProgressSurface::hidden();

    let req = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "b.exe",
        expected_sha256: None,
    };
    let written = download_to_path(&req, &options(), &surface).expect("download");
    assert_eq!(written, 200_000);
    assert_eq!(std::fs::read(&dest).unwrap(), body);

    let rows = surface.row_totals();
    assert_eq!(rows.len(), 1, "{rows:?}");
    assert_eq!(rows[0].1, 200_000.0);
    assert_ne!(rows[0].1, http_server::REDIRECT_BODY.len() as f64);
    surface.close();
}

#[test]
fn chunked_body_without_length_downloads_without_row() {
    let body = body();
    let base = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            head_allowed: false,
            chunked: true,
            ..ServerOptions::default()
        },
    );
    let url = format!("{}stream.bin", base);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("stream.bin");
    let surface = ProgressSurface::hidden();

    let req = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "stream.bin",
        expected_sha256: None,
    };
    let written = download_to_path(&req, &options(), &surface).expect("download");
    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert_eq!(surface.rows(), 0);
    surface.close();
}

#[test]
fn checksum_match_and_mismatch() {
    let body = body();
    let url = format!("{}tool.zip", http_server::start(body.clone()));
    let dir = tempdir().unwrap();

    let reference = dir.path().join("reference.bin");
    std::fs::write(&reference, &body).unwrap();
    let good = checksum::sha256_path(&reference).unwrap();

    let dest = dir.path().join("tool.zip");
    let surface = ProgressSurface::hidden();
    let ok = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "tool.zip",
        expected_sha256: Some(&good),
    };
    download_to_path(&ok, &options(), &surface).expect("matching checksum");
    assert!(dest.exists());

    let bad_dest = dir.path().join("tool-bad.zip");
    let wrong = "0".repeat(64);
    let bad = DownloadRequest {
        url: &url,
        dest: &bad_dest,
        label: "tool.zip",
        expected_sha256: Some(&wrong),
    };
    let err = download_to_path(&bad, &options(), &surface).unwrap_err();
    match err {
        DownloadError::ChecksumMismatch { actual, .. } => assert_eq!(actual, good),
        other => panic!("expected ChecksumMismatch, got {other}"),
    }
    assert!(!bad_dest.exists());
    assert!(!temp_path_for(&bad_dest).exists());
    surface.close();
}

#[test]
fn http_error_status_is_reported() {
    let base = http_server::start_with_options(
        b"not here".to_vec(),
        ServerOptions {
            get_status: "404 Not Found",
            ..ServerOptions::default()
        },
    );
    let url = format!("{}missing.exe", base);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("missing.exe");
    let surface = ProgressSurface::hidden();

    let req = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "missing.exe",
        expected_sha256: None,
    };
    let err = download_to_path(&req, &options(), &surface).unwrap_err();
    assert!(matches!(err, DownloadError::Http { status: 404, .. }), "{err}");
    assert!(!dest.exists());
    assert!(!temp_path_for(&dest).exists());
}

#[test]
fn truncated_body_is_an_error() {
    let body = body();
    let base = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            claimed_length: Some(body.len() + 1000),
            ..ServerOptions::default()
        },
    );
    let url = format!("{}partial.iso", base);
    let dir = tempdir().unwrap();
    let dest = dir.path().join("partial.iso");
    let surface = ProgressSurface::hidden();

    let req = DownloadRequest {
        url: &url,
        dest: &dest,
        label: "partial.iso",
        expected_sha256: None,
    };
    assert!(download_to_path(&req, &options(), &surface).is_err());
    assert!(!dest.exists());
}
