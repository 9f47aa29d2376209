#![allow(dead_code)]

use std::time::Duration;

use eyespot::{Frame, Solution};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A solution whose `P0` field at frame `i` equals `i` everywhere.
pub fn ramp_solution(grid_size: usize, frames: usize) -> Solution {
    let cells = grid_size * grid_size;
    Solution {
        grid_size,
        t: (0..frames).map(|i| i as f64 * 0.5).collect(),
        frames: (0..frames)
            .map(|i| Frame {
                m1: vec![0.0; cells],
                m2: vec![0.0; cells],
                p0: vec![i as f64; cells],
                p1: vec![0.0; cells],
                p2: vec![0.0; cells],
            })
            .collect(),
    }
}

/// Serves exactly one HTTP request with a canned response.
///
/// Returns the base URL and a handle resolving to the captured request.
pub async fn serve_once(
    status: u16,
    body: String,
    delay: Duration,
) -> (String, JoinHandle<CapturedRequest>) {
    serve_raw(status, body.len(), body, delay).await
}

/// Like [`serve_once`], but announces `content_length` bytes and hangs up
/// after sending only `body`.
pub async fn serve_truncated(
    status: u16,
    content_length: usize,
    body: String,
) -> (String, JoinHandle<CapturedRequest>) {
    serve_raw(status, content_length, body, Duration::ZERO).await
}

async fn serve_raw(
    status: u16,
    content_length: usize,
    body: String,
    delay: Duration,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        tokio::time::sleep(delay).await;

        let reason = match status {
            200 => "OK",
            400 => "Bad Request",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {content_length}\r\n\
             Connection: close\r\n\r\n{body}"
        );
        // The client may have given up already.
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;

        request
    });

    (url, handle)
}

/// Lowercased request line and headers, plus the raw body.
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|value| value.trim().parse::<usize>().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    CapturedRequest {
        head: headers,
        body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
