use tokio::io::{self, AsyncWrite, AsyncWriteExt};

use crate::{body::HttpBody, headers::HttpHeaders, utils::html_escape, version::HttpVersion};

pub const SERVER_NAME: &str = concat!("devserver/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    status_code: u16,
    /// HTTP status text
    status_text: String,
    /// HTTP headers
    headers: HttpHeaders,
    /// HTTP body
    body: HttpBody,
    /// HTTP version
    version: HttpVersion,
    /// Send the headers only (HEAD requests)
    head_only: bool,
}

impl HttpResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        let mut headers = HttpHeaders::new();
        headers.insert("Server", SERVER_NAME);
        headers.insert("Date", &http_date());

        HttpResponse {
            status_code,
            status_text: status_text.to_string(),
            headers,
            body: HttpBody::new(),
            version: HttpVersion::V1_1,
            head_only: false,
        }
    }

    /// Response with the standard reason phrase for `status_code`
    pub fn with_status(status_code: u16) -> Self {
        HttpResponse::new(status_code, status_text(status_code))
    }

    /// HTML error page; `message` defaults to the reason phrase
    pub fn error(status_code: u16, message: Option<&str>) -> Self {
        let reason = status_text(status_code);
        let message = html_escape(message.unwrap_or(reason));
        let page = format!(
            "<!DOCTYPE HTML>\n\
             <html lang=\"en\">\n    \
                 <head>\n        \
                     <meta charset=\"utf-8\">\n        \
                     <title>Error response</title>\n    \
                 </head>\n    \
                 <body>\n        \
                     <h1>Error response</h1>\n        \
                     <p>Error code: {status_code}</p>\n        \
                     <p>Message: {message}.</p>\n    \
                 </body>\n\
             </html>\n"
        );

        HttpResponse::with_status(status_code)
            .insert_header("Content-Type", "text/html;charset=utf-8")
            .with_body(HttpBody::from(page))
    }

    /// Set the body and its `Content-Length`
    pub fn with_body(mut self, body: HttpBody) -> Self {
        self.add_body(body);
        self
    }

    pub fn add_body(&mut self, body: HttpBody) -> &mut Self {
        self.headers
            .insert("Content-Length", &body.content_length().to_string());
        self.body = body;
        self
    }

    pub fn insert_header(mut self, k: &str, v: &str) -> Self {
        self.headers.insert(k, v);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut HttpBody {
        &mut self.body
    }

    pub fn set_version(&mut self, version: HttpVersion) -> &mut Self {
        if version.is_supported() {
            self.version = version;
        }
        self
    }

    /// Drop the body on the wire but keep its headers
    pub fn set_head_only(&mut self, head_only: bool) -> &mut Self {
        self.head_only = head_only;
        self
    }

    fn head_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "{} {} {}\r\n",
            self.version.as_str(),
            self.status_code,
            self.status_text
        );

        for (key, value) in self.headers.iter() {
            head.push_str(&format!("{key}: {value}\r\n"));
        }

        // end of headers
        head.push_str("\r\n");

        head.into_bytes()
    }

    /// send response
    pub async fn send<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.head_bytes()).await?;

        if !self.head_only {
            while let Some(chunk) = self.body.read_next().await? {
                writer.write_all(&chunk).await?;
            }
        }
        writer.flush().await?;

        Ok(())
    }
}

/// Reason phrase for the status codes this server produces
pub fn status_text(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK",
        301 => "Moved Permanently",
        400 => "Bad Request",
        404 => "Not Found",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}

/// Current time as an IMF-fixdate
pub fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
