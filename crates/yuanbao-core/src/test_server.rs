//! Minimal HTTP/1.1 server for exercising the client against canned replies.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct Reply {
    status: u16,
    content_type: &'static str,
    chunks: Vec<String>,
    gap: Duration,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            chunks: vec![body.to_string()],
            gap: Duration::ZERO,
        }
    }

    pub fn event_stream(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream",
            chunks: vec![body],
            gap: Duration::ZERO,
        }
    }

    /// Event stream written one chunk at a time, pausing `gap` between chunks.
    pub fn slow_stream(chunks: Vec<String>, gap: Duration) -> Self {
        Self {
            status: 200,
            content_type: "text/event-stream",
            chunks,
            gap,
        }
    }
}

/// Serve each reply to one connection, in order. The handle yields the raw
/// requests received.
pub async fn serve(replies: Vec<Reply>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for reply in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let body_len: usize = reply.chunks.iter().map(String::len).sum();
            let head = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.status, reply.content_type, body_len
            );
            // The client may hang up early (timeouts); write errors are expected then
            if socket.write_all(head.as_bytes()).await.is_err() {
                continue;
            }
            for (i, chunk) in reply.chunks.iter().enumerate() {
                if i > 0 && !reply.gap.is_zero() {
                    tokio::time::sleep(reply.gap).await;
                }
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    break;
                }
                let _ = socket.flush().await;
            }
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
