//! Inbound trigger endpoint
//!
//! A single-purpose HTTP listener: `GET /` asks the supervisor to start
//! the poll loop and is acknowledged immediately, independent of the
//! background loop's health. Repeated triggers are safe; the supervisor
//! guard ensures only the first one starts anything.

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use crate::scheduler::Supervisor;

/// Bind the trigger endpoint and serve it forever
pub fn serve(port: u16, supervisor: Arc<Supervisor>) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("Failed to bind trigger endpoint on port {}", port))?;
    info!("Trigger endpoint listening on port {}", port);
    serve_on(listener, supervisor)
}

/// Serve trigger requests on an already-bound listener
pub fn serve_on(listener: TcpListener, supervisor: Arc<Supervisor>) -> Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = handle_connection(stream, &supervisor) {
                    warn!("Trigger connection error: {:#}", e);
                }
            }
            Err(e) => warn!("Failed to accept trigger connection: {}", e),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, supervisor: &Arc<Supervisor>) -> Result<()> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .context("Failed to read request")?;

    // Drain the request headers before responding
    let mut line = String::new();
    while reader.read_line(&mut line).is_ok() && line.trim() != "" {
        line.clear();
    }

    let response = match request_target(&request_line) {
        Some(target) if target == "/" || target.starts_with("/?") => {
            let started = supervisor.start();
            http_response(
                "200 OK",
                &format!("{{\"ok\":true,\"started\":{}}}", started),
            )
        }
        _ => http_response("404 Not Found", "{\"ok\":false}"),
    };

    stream
        .write_all(response.as_bytes())
        .context("Failed to write response")?;
    Ok(())
}

/// Extract the request target of a GET request line; None for anything else
fn request_target(request_line: &str) -> Option<&str> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    parts.next()
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_target_get() {
        assert_eq!(request_target("GET / HTTP/1.1\r\n"), Some("/"));
        assert_eq!(request_target("GET /other HTTP/1.1\r\n"), Some("/other"));
    }

    #[test]
    fn test_request_target_rejects_other_methods() {
        assert_eq!(request_target("POST / HTTP/1.1\r\n"), None);
        assert_eq!(request_target(""), None);
    }

    #[test]
    fn test_http_response_shape() {
        let response = http_response("200 OK", "{\"ok\":true}");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Length: 11\r\n"));
        assert!(response.ends_with("\r\n\r\n{\"ok\":true}"));
    }
}
