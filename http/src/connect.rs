use std::{net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadHalf, WriteHalf, split},
    time::{Duration, timeout},
};
use tracing::{debug, info};

use crate::{
    error::ServerError, method::HttpMethod, request::HttpRequest, response::HttpResponse,
    service::HttpService, utils::find_headers_end, version::HttpVersion,
};

/// Largest request head accepted before answering 431
const MAX_HEAD_SIZE: usize = 8192;

enum Head {
    /// Request line and headers, blank line included
    Complete(Vec<u8>),
    /// Peer closed or went idle between requests
    Closed,
    TooLarge,
}

pub struct HttpConnection<S> {
    /// Reader half of the stream
    reader: ReadHalf<S>,
    /// Writer half of the stream
    writer: WriteHalf<S>,
    /// Handler and response layers
    service: Arc<HttpService>,
    /// Remote address, for logging
    peer: SocketAddr,
    /// Idle timeout for each read
    timeout: Duration,
    /// Buffer size for reading
    buffer_size: usize,
    /// Whether to keep the connection alive
    keep_alive: bool,
    /// Bytes received past the previous request
    pending: Vec<u8>,
}

impl<S> HttpConnection<S>
where
    S: AsyncRead + AsyncWrite,
{
    pub fn new(stream: S, peer: SocketAddr, service: Arc<HttpService>, timeout_secs: u64) -> Self {
        // split the stream into reader and writer
        let (reader, writer) = split(stream);

        HttpConnection {
            reader,
            writer,
            service,
            peer,
            timeout: Duration::from_secs(timeout_secs),
            buffer_size: 4096,
            keep_alive: true,
            pending: Vec::new(),
        }
    }

    pub fn keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    /// Process the connection
    pub async fn process(&mut self) -> Result<(), ServerError> {
        // keep-alive loop, process multiple requests
        loop {
            let head = match self.read_head().await? {
                Head::Complete(head) => head,
                Head::Closed => return Ok(()),
                Head::TooLarge => {
                    return self
                        .reject(431, "Request header was too big", "<oversized request>")
                        .await;
                }
            };

            let request = match HttpRequest::parse(&head) {
                Ok(request) => request,
                Err(e) => {
                    let first_line = head.split(|b| *b == b'\n').next().unwrap_or_default();
                    let line = String::from_utf8_lossy(first_line).trim_end().to_string();
                    return self.reject(400, &e.to_string(), &line).await;
                }
            };

            if request.version == HttpVersion::NoSupport {
                return self
                    .reject(505, "Invalid HTTP version", &request.request_line)
                    .await;
            }

            let body_length = match request.content_length() {
                Ok(length) => length,
                Err(e) => {
                    return self
                        .reject(400, &e.to_string(), &request.request_line)
                        .await;
                }
            };
            // request bodies are never used; drain them so the next request lines up
            if !self.discard_body(body_length).await? {
                return Ok(());
            }

            let keep_alive = self.keep_alive && request.wants_keep_alive();
            let head_only = request.method == HttpMethod::Head;
            let version = request.version;
            let request_line = request.request_line.clone();

            let mut response = self.service.handle(request).await;
            response.set_version(version);
            response.set_head_only(head_only);
            response
                .headers_mut()
                .insert("Connection", if keep_alive { "keep-alive" } else { "close" });
            self.service.finish(&mut response);

            info!(peer = %self.peer, "\"{}\" {}", request_line, response.status_code());

            response.send(&mut self.writer).await?;

            if !keep_alive {
                break;
            }
        }

        Ok(())
    }

    /// Answer with an error page and close
    async fn reject(
        &mut self,
        status_code: u16,
        message: &str,
        request_line: &str,
    ) -> Result<(), ServerError> {
        let mut response = HttpResponse::error(status_code, Some(message));
        response.headers_mut().insert("Connection", "close");
        self.service.finish(&mut response);

        info!(peer = %self.peer, "\"{}\" {} ({})", request_line, status_code, message);

        response.send(&mut self.writer).await?;
        Ok(())
    }

    async fn read_head(&mut self) -> Result<Head, ServerError> {
        let mut buffer = vec![0; self.buffer_size];

        loop {
            // stray line breaks between requests are allowed
            let leading = self
                .pending
                .iter()
                .take_while(|b| **b == b'\r' || **b == b'\n')
                .count();
            self.pending.drain(..leading);

            // if find the headers it is complete
            if let Some(end) = find_headers_end(&self.pending) {
                let rest = self.pending.split_off(end);
                let head = std::mem::replace(&mut self.pending, rest);
                return Ok(Head::Complete(head));
            }

            if self.pending.len() >= MAX_HEAD_SIZE {
                return Ok(Head::TooLarge);
            }

            match timeout(self.timeout, self.reader.read(&mut buffer)).await {
                // connect closed by peer
                Ok(Ok(0)) => {
                    if !self.pending.is_empty() {
                        debug!(peer = %self.peer, "connection closed mid-request");
                    }
                    return Ok(Head::Closed);
                }
                Ok(Ok(n)) => self.pending.extend_from_slice(&buffer[..n]),
                Ok(Err(e)) => return Err(ServerError::IOError(e)),
                Err(_) if self.pending.is_empty() => {
                    debug!(peer = %self.peer, "idle connection timed out");
                    return Ok(Head::Closed);
                }
                Err(_) => return Err(ServerError::TimeoutError("request timeout".to_string())),
            }
        }
    }

    /// Skip `length` body bytes. Returns false if the peer hung up first.
    async fn discard_body(&mut self, length: u64) -> Result<bool, ServerError> {
        let buffered = (self.pending.len() as u64).min(length) as usize;
        self.pending.drain(..buffered);

        let mut remaining = length - buffered as u64;
        let mut buffer = vec![0; self.buffer_size];
        while remaining > 0 {
            let want = (buffer.len() as u64).min(remaining) as usize;
            match timeout(self.timeout, self.reader.read(&mut buffer[..want])).await {
                Ok(Ok(0)) => return Ok(false),
                Ok(Ok(n)) => remaining -= n as u64,
                Ok(Err(e)) => return Err(ServerError::IOError(e)),
                Err(_) => {
                    return Err(ServerError::TimeoutError(
                        "request body timeout".to_string(),
                    ));
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body::HttpBody, handler::handler_fn};
    use tokio::{
        io::{AsyncWriteExt, duplex},
        test,
    };

    fn echo_service() -> Arc<HttpService> {
        Arc::new(
            HttpService::new(handler_fn(|req: HttpRequest| async move {
                HttpResponse::with_status(200).with_body(HttpBody::from(req.uri.path))
            }))
            .layer(|res| res.headers_mut().insert("X-Last", "yes")),
        )
    }

    async fn exchange(input: &[u8]) -> String {
        let (client, server) = duplex(64 * 1024);
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        let mut connection = HttpConnection::new(server, peer, echo_service(), 5);

        let (mut client_read, mut client_write) = split(client);
        client_write.write_all(input).await.unwrap();
        client_write.shutdown().await.unwrap();

        connection.process().await.unwrap();
        drop(connection);

        let mut output = Vec::new();
        client_read.read_to_end(&mut output).await.unwrap();
        String::from_utf8_lossy(&output).to_string()
    }

    #[test]
    async fn test_single_request_close() {
        let output = exchange(b"GET /one HTTP/1.1\r\nConnection: close\r\n\r\n").await;

        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("Connection: close\r\nX-Last: yes\r\n\r\n"));
        assert!(output.ends_with("/one"));
    }

    #[test]
    async fn test_pipelined_requests_keep_alive() {
        let output = exchange(
            b"GET /first HTTP/1.1\r\n\r\nPOST /second HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloGET /third HTTP/1.1\r\n\r\n",
        )
        .await;

        assert_eq!(output.matches("HTTP/1.1 200 OK").count(), 3);
        assert!(output.contains("Connection: keep-alive"));
        let first = output.find("/first").unwrap();
        let second = output.find("/second").unwrap();
        let third = output.find("/third").unwrap();
        assert!(first < second && second < third);
        assert!(!output.contains("hello"));
    }

    #[test]
    async fn test_http10_closes() {
        let output = exchange(b"GET /a HTTP/1.0\r\n\r\nGET /b HTTP/1.0\r\n\r\n").await;

        assert!(output.starts_with("HTTP/1.0 200 OK\r\n"));
        assert_eq!(output.matches("200 OK").count(), 1);
        assert!(output.contains("Connection: close"));
    }

    #[test]
    async fn test_malformed_request_gets_layers() {
        let output = exchange(b"NONSENSE\r\n\r\n").await;

        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.contains("Connection: close\r\nX-Last: yes\r\n\r\n"));
    }

    #[test]
    async fn test_unsupported_version() {
        let output = exchange(b"GET / HTTP/3.0\r\n\r\n").await;
        assert!(output.starts_with("HTTP/1.1 505 HTTP Version Not Supported\r\n"));
    }

    #[test]
    async fn test_oversized_head() {
        let mut input = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
        input.extend(std::iter::repeat_n(b'a', MAX_HEAD_SIZE + 10));
        input.extend_from_slice(b"\r\n\r\n");

        let output = exchange(&input).await;
        assert!(output.starts_with("HTTP/1.1 431 Request Header Fields Too Large\r\n"));
    }

    #[test]
    async fn test_head_request_has_no_body() {
        let output = exchange(b"HEAD /path HTTP/1.1\r\nConnection: close\r\n\r\n").await;

        assert!(output.contains("Content-Length: 5\r\n"));
        assert!(output.ends_with("\r\n\r\n"));
    }

    #[test]
    async fn test_silent_close() {
        assert_eq!(exchange(b"").await, "");
    }
}
