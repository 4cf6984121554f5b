use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{AppError, AppResult, HttpError};

/// Upper bound on the request head; bodies are never read.
const MAX_REQUEST_BYTES: usize = 64 * 1024;
const READ_CHUNK_BYTES: usize = 1024;

#[derive(Debug)]
pub(super) struct HttpRequest {
    pub(super) method: String,
    pub(super) target: String,
}

/// A request rejected before routing, answered with `{ "error": message }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestError {
    pub(super) status: u16,
    pub(super) message: String,
}

impl RequestError {
    pub(super) fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub(super) async fn read_http_request(socket: &mut TcpStream) -> Result<HttpRequest, RequestError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK_BYTES);
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    let header_end = loop {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::new(400, format!("Failed to read request: {}", err)))?;
        if bytes == 0 {
            return Err(RequestError::new(400, "Empty request"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::new(400, "Invalid read length"))?;
        buffer.extend_from_slice(read_slice);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::new(413, "Request too large"));
        }
    };

    let header_bytes = buffer
        .get(..header_end)
        .ok_or_else(|| RequestError::new(400, "Malformed request headers"))?;
    parse_request_head(header_bytes)
}

pub(super) fn parse_request_head(head: &[u8]) -> Result<HttpRequest, RequestError> {
    let text = std::str::from_utf8(head)
        .map_err(|err| RequestError::new(400, format!("Invalid request encoding: {}", err)))?;
    let mut lines = text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing HTTP method"))?;
    let target = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing request path"))?;
    let version = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing HTTP version"))?;
    if !version.starts_with("HTTP/1.") {
        return Err(RequestError::new(
            400,
            format!("Unsupported protocol version '{}'", version),
        ));
    }
    for line in lines {
        if !line.is_empty() && !line.contains(':') {
            return Err(RequestError::new(400, "Malformed header"));
        }
    }

    Ok(HttpRequest {
        method: method.to_owned(),
        target: target.to_owned(),
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

pub(super) const fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

pub(super) async fn write_json_response<T>(
    socket: &mut TcpStream,
    status: u16,
    payload: &T,
) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(payload).map_err(|err| {
        AppError::http(HttpError::Serialize {
            context: "response body",
            source: err,
        })
    })?;
    write_response(socket, status, &body).await
}

async fn write_response(socket: &mut TcpStream, status: u16, body: &[u8]) -> AppResult<()> {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
        status,
        status_text(status),
        body.len()
    );
    if status == 405 {
        head.push_str("Allow: GET\r\n");
    }
    head.push_str("Connection: close\r\n\r\n");
    socket.write_all(head.as_bytes()).await.map_err(|err| {
        AppError::http(HttpError::Io {
            context: "write response head",
            source: err,
        })
    })?;
    socket.write_all(body).await.map_err(|err| {
        AppError::http(HttpError::Io {
            context: "write response body",
            source: err,
        })
    })?;
    socket.shutdown().await.map_err(|err| {
        AppError::http(HttpError::Io {
            context: "close response stream",
            source: err,
        })
    })?;
    Ok(())
}
