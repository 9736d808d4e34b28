//! Mock subject proxy binary for integration testing
//!
//! Implements just enough of an absolute-URI HTTP proxy to stand in for a
//! student submission: accept a connection, parse `GET http://host:port/path`,
//! forward a plain GET to the origin, and stream the response back.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // The port is always the last argument; grading argv templates may put
    // assignment-specific flags in front of it.
    let port = std::env::args().last().expect("port argument");
    let port: u16 = port.parse().expect("numeric port");

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("bind proxy port");

    loop {
        let Ok((stream, _)) = listener.accept().await else {
            continue;
        };
        tokio::spawn(async move {
            let _ = handle(stream).await;
        });
    }
}

async fn handle(mut client: TcpStream) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = client.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
        if head.len() > 64 * 1024 {
            return Ok(());
        }
    }

    let head_text = String::from_utf8_lossy(&head);
    let request_line = head_text.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(());
    };

    if method != "GET" {
        client
            .write_all(b"HTTP/1.1 501 Not Implemented\r\nContent-Length: 0\r\n\r\n")
            .await?;
        return Ok(());
    }

    // Absolute-URI target: http://host[:port]/path (scheme case-insensitive)
    let rest = target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("HTTP://"))
        .unwrap_or(target);
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let host = authority.split(':').next().unwrap_or(authority);
    let addr = if authority.contains(':') {
        authority.to_string()
    } else {
        format!("{authority}:80")
    };

    let mut origin = TcpStream::connect(&addr).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n");
    origin.write_all(request.as_bytes()).await?;

    tokio::io::copy(&mut origin, &mut client).await?;
    client.shutdown().await?;
    Ok(())
}
