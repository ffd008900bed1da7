use crate::{
    error::ServerError, headers::HttpHeaders, method::HttpMethod, uri::HttpUri,
    version::HttpVersion,
};

#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// HTTP headers
    pub headers: HttpHeaders,
    /// HTTP URI
    pub uri: HttpUri,
    /// HTTP version
    pub version: HttpVersion,
    /// First line of the request, for logging
    pub request_line: String,
}

/// Parse the head of an HTTP request (request line and headers)
impl TryFrom<&str> for HttpRequest {
    type Error = ServerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut lines = value.lines();

        // request line
        let request_line = lines
            .next()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| ServerError::ProtocolError("Empty request line".into()))?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ServerError::ProtocolError(format!(
                "Invalid request line format: {request_line:?}"
            )));
        }
        if !parts[2].starts_with("HTTP/") {
            return Err(ServerError::ProtocolError(format!(
                "Bad request version: {:?}",
                parts[2]
            )));
        }

        let method = HttpMethod::from(parts[0]);
        let uri = HttpUri::from(parts[1]);
        let version = HttpVersion::from(parts[2]);

        // headers
        let mut headers = HttpHeaders::new();
        for line in lines {
            // end of head
            if line.is_empty() {
                break;
            }

            // Split the line into key and value
            let (key, value) = line.split_once(':').ok_or_else(|| {
                ServerError::ProtocolError(format!("Malformed header line: {line:?}"))
            })?;
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(ServerError::ProtocolError(format!(
                    "Malformed header name: {key:?}"
                )));
            }
            headers.append(key, value.trim());
        }

        Ok(HttpRequest {
            method,
            headers,
            uri,
            version,
            request_line: request_line.to_string(),
        })
    }
}

impl HttpRequest {
    /// Parse the raw bytes up to and including the blank line
    pub fn parse(head: &[u8]) -> Result<Self, ServerError> {
        let head = std::str::from_utf8(head).map_err(|e| {
            ServerError::ProtocolError(format!("Decode headers to UTF-8 error: {e}"))
        })?;
        HttpRequest::try_from(head)
    }

    /// Length of the body that follows the head
    pub fn content_length(&self) -> Result<u64, ServerError> {
        match self.headers.get("Content-Length") {
            Some(value) => value.parse::<u64>().map_err(|_| {
                ServerError::ProtocolError(format!("Invalid Content-Length: {value:?}"))
            }),
            None => Ok(0),
        }
    }

    /// Whether the client wants the connection kept open
    pub fn wants_keep_alive(&self) -> bool {
        match self.headers.get("Connection") {
            Some(value) if value.eq_ignore_ascii_case("close") => false,
            Some(value) if value.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version.keeps_alive_by_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::test;

    #[test]
    async fn test_request_parse_from_string() {
        let request_string = "GET /index.html HTTP/1.1\r\n\
                             Host: example.com\r\n\
                             User-Agent: Mozilla/5.0 Firefox/114\r\n\
                             Accept: text/html\r\n\
                             \r\n";

        let request = HttpRequest::try_from(request_string).unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.uri.path, "/index.html");
        assert_eq!(request.version, HttpVersion::V1_1);
        assert_eq!(request.headers.get("Host").unwrap(), "example.com");
        assert_eq!(
            request.headers.get("User-Agent").unwrap(),
            "Mozilla/5.0 Firefox/114"
        );
        assert_eq!(request.headers.get("accept").unwrap(), "text/html");
        assert_eq!(request.request_line, "GET /index.html HTTP/1.1");
        assert_eq!(request.content_length().unwrap(), 0);
        assert!(request.wants_keep_alive());
    }

    #[test]
    async fn test_header_value_with_colon() {
        let request = HttpRequest::parse(b"GET / HTTP/1.1\r\nHost: localhost:8000\r\n\r\n").unwrap();
        assert_eq!(request.headers.get("Host").unwrap(), "localhost:8000");
    }

    #[test]
    async fn test_empty_request() {
        assert!(HttpRequest::try_from("").is_err());
        assert!(HttpRequest::try_from("\r\n\r\n").is_err());
    }

    #[test]
    async fn test_bad_request_line() {
        assert!(HttpRequest::try_from("GET /\r\n\r\n").is_err());
        assert!(HttpRequest::try_from("GET / FTP/1.0\r\n\r\n").is_err());
        assert!(HttpRequest::try_from("GET / HTTP/1.1\r\nno colon here\r\n\r\n").is_err());
        assert!(HttpRequest::parse(b"GET /\xff HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    async fn test_unsupported_version_still_parses() {
        let request = HttpRequest::try_from("GET / HTTP/2.0\r\n\r\n").unwrap();
        assert_eq!(request.version, HttpVersion::NoSupport);
    }

    #[test]
    async fn test_keep_alive_rules() {
        let close = HttpRequest::try_from("GET / HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
        assert!(!close.wants_keep_alive());

        let old = HttpRequest::try_from("GET / HTTP/1.0\r\n\r\n").unwrap();
        assert!(!old.wants_keep_alive());

        let old_keep =
            HttpRequest::try_from("GET / HTTP/1.0\r\nConnection: Keep-Alive\r\n\r\n").unwrap();
        assert!(old_keep.wants_keep_alive());
    }

    #[test]
    async fn test_content_length() {
        let request =
            HttpRequest::try_from("POST /x HTTP/1.1\r\nContent-Length: 13\r\n\r\n").unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.content_length().unwrap(), 13);

        let bad = HttpRequest::try_from("POST /x HTTP/1.1\r\nContent-Length: ten\r\n\r\n").unwrap();
        assert!(bad.content_length().is_err());
    }
}
