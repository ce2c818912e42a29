//! Minimal HTTP/1.1 server that records what the executor put on the wire.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

pub const DEFAULT_REPLY: &str = "HTTP/1.1 201 Created\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
X-Dup: first\r\n\
X-Dup: second\r\n\
Content-Length: 5\r\n\
Connection: close\r\n\
\r\n\
hello";

/// Headers promise more bytes than are sent before the connection closes.
pub const TRUNCATED_REPLY: &str = "HTTP/1.1 200 OK\r\n\
Content-Length: 100\r\n\
Connection: close\r\n\
\r\n\
short";

/// Same headers as [`TRUNCATED_REPLY`]; served with [`Reply::Stall`] the rest
/// of the body never arrives.
pub const PARTIAL_BODY_REPLY: &str = TRUNCATED_REPLY;

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    /// Lower-cased names, in arrival order, duplicates kept.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let url = reqwest::Url::parse(&format!("http://capture{}", self.target)).unwrap();
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Canned(&'static str),
    /// Read the request and never answer.
    Silent,
    /// Write the reply, then hold the connection open without closing it.
    Stall(&'static str),
}

pub struct TestServer {
    pub addr: SocketAddr,
    captured: mpsc::UnboundedReceiver<CapturedRequest>,
}

impl TestServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, captured) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let Ok(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let _ = tx.send(request);
                    match reply {
                        Reply::Canned(raw) => {
                            let _ = stream.write_all(raw.as_bytes()).await;
                            let _ = stream.shutdown().await;
                        }
                        Reply::Silent => tokio::time::sleep(Duration::from_secs(60)).await,
                        Reply::Stall(raw) => {
                            let _ = stream.write_all(raw.as_bytes()).await;
                            let _ = stream.flush().await;
                            tokio::time::sleep(Duration::from_secs(60)).await;
                        }
                    }
                });
            }
        });

        Self { addr, captured }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub async fn next_request(&mut self) -> CapturedRequest {
        tokio::time::timeout(Duration::from_secs(5), self.captured.recv())
            .await
            .expect("no request captured")
            .expect("server stopped")
    }
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}
