use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::fs::{self, File};
use tracing::{debug, warn};

use crate::{
    body::HttpBody,
    error::ServerError,
    feature::{listing::render_listing, mime::content_type_for},
    handler::{HandlerFn, handler_fn},
    method::HttpMethod,
    request::HttpRequest,
    response::HttpResponse,
};

/// Chunk size when streaming a file to the socket
const STREAM_BUFFER_SIZE: usize = 8192;

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Serves the files below one root directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Fails unless `root` exists and is a directory
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ServerError> {
        let root = root.into();
        let canonical = root.canonicalize().map_err(|e| ServerError::RootError {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        if !canonical.is_dir() {
            return Err(ServerError::RootError {
                path: root,
                reason: "not a directory".to_string(),
            });
        }

        Ok(StaticFiles { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a decoded URL path to a filesystem path below the root.
    ///
    /// `.` segments are dropped and `..` removes the previous segment, but
    /// never climbs above the root.
    pub fn translate_path(&self, url_path: &str) -> PathBuf {
        let mut segments: Vec<&str> = Vec::new();
        for segment in url_path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                // drive prefixes and backslash separators would escape the root
                segment if cfg!(windows) && segment.contains(['\\', ':']) => {}
                segment => segments.push(segment),
            }
        }

        let mut path = self.root.clone();
        path.extend(segments);
        path
    }

    pub async fn respond(&self, request: &HttpRequest) -> HttpResponse {
        if !matches!(request.method, HttpMethod::Get | HttpMethod::Head) {
            let method = request
                .request_line
                .split_whitespace()
                .next()
                .unwrap_or_default();
            let message = format!("Unsupported method ({method:?})");
            return HttpResponse::error(501, Some(&message));
        }

        let path = self.translate_path(&request.uri.decoded_path());
        debug!("File server request for: {}", path.display());

        let metadata = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(_) => return HttpResponse::error(404, Some("File not found")),
        };

        if !metadata.is_dir() {
            // a trailing slash names a directory, never a file
            if request.uri.path.ends_with('/') {
                return HttpResponse::error(404, Some("File not found"));
            }
            return self.serve_file(&path).await;
        }

        // relative links in a listing or index only work below a trailing slash
        if !request.uri.path.ends_with('/') {
            let mut location = format!("{}/", request.uri.path);
            if let Some(query) = &request.uri.query {
                location.push('?');
                location.push_str(query);
            }
            return HttpResponse::with_status(301)
                .insert_header("Location", &location)
                .with_body(HttpBody::Empty);
        }

        for index in INDEX_FILES {
            let candidate = path.join(index);
            if fs::metadata(&candidate)
                .await
                .is_ok_and(|meta| meta.is_file())
            {
                return self.serve_file(&candidate).await;
            }
        }

        self.serve_listing(&path, &request.uri.decoded_path()).await
    }

    async fn serve_file(&self, path: &Path) -> HttpResponse {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                debug!("Failed to open {}: {e}", path.display());
                return HttpResponse::error(404, Some("File not found"));
            }
        };

        let metadata = match file.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Failed to get metadata of {}: {e}", path.display());
                return HttpResponse::error(500, Some("Error reading file metadata"));
            }
        };

        HttpResponse::with_status(200)
            .insert_header("Content-Type", &content_type_for(path))
            .with_body(HttpBody::from_reader(
                file,
                metadata.len(),
                STREAM_BUFFER_SIZE,
            ))
    }

    async fn serve_listing(&self, dir: &Path, display_path: &str) -> HttpResponse {
        match render_listing(dir, display_path).await {
            Ok(page) => HttpResponse::with_status(200)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .with_body(HttpBody::from(page)),
            Err(e) => {
                debug!("Failed to list {}: {e}", dir.display());
                HttpResponse::error(404, Some("No permission to list directory"))
            }
        }
    }

    /// Wrap into a handler for [`HttpService`](crate::service::HttpService)
    pub fn into_handler(self) -> HandlerFn {
        let files = Arc::new(self);
        handler_fn(move |req: HttpRequest| {
            let files = Arc::clone(&files);
            async move { files.respond(&req).await }
        })
    }
}
