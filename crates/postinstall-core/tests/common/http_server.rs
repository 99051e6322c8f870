//! Minimal HTTP/1.1 server for download tests.
//!
//! Serves a single static body. HEAD can be disabled to simulate servers
//! that reject it, the GET status can be overridden, GETs can be redirected
//! to one canonical path, and the body can be sent chunked (no length).

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, HEAD returns 405.
    pub head_allowed: bool,
    /// Status line for GET responses.
    pub get_status: &'static str,
    /// If set, advertise this Content-Length on GET instead of the real one
    /// and close the connection after sending the body.
    pub claimed_length: Option<usize>,
    /// If set, GETs for any other path get a 302 to this path, with a short
    /// body and its own Content-Length.
    pub redirect_to: Option<&'static str>,
    /// Send the GET body with `Transfer-Encoding: chunked` and no length.
    pub chunked: bool,
}

/// Body of the redirect response; its length must never become a row total.
pub const REDIRECT_BODY: &[u8] = b"moved, see Location.";

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            get_status: "200 OK",
            claimed_length: None,
            redirect_to: None,
            chunked: false,
        }
    }
}

/// Starts a server in a background thread serving `body` at any path.
/// Returns the base URL (e.g. "http://127.0.0.1:12345/").
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, ServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: ServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut request_line = request.split_whitespace();
    let method = request_line.next().unwrap_or("");
    let path = request_line.next().unwrap_or("/");

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        if let Some(target) = opts.redirect_to.filter(|&target| target != path) {
            let response = format!(
                "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                target,
                REDIRECT_BODY.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.write_all(REDIRECT_BODY);
            return;
        }
        if opts.chunked {
            let head = format!(
                "HTTP/1.1 {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                opts.get_status
            );
            let _ = stream.write_all(head.as_bytes());
            for chunk in body.chunks(16 * 1024) {
                let _ = stream.write_all(format!("{:x}\r\n", chunk.len()).as_bytes());
                let _ = stream.write_all(chunk);
                let _ = stream.write_all(b"\r\n");
            }
            let _ = stream.write_all(b"0\r\n\r\n");
            return;
        }
        let length = opts.claimed_length.unwrap_or(body.len());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            opts.get_status, length
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(body);
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
}
