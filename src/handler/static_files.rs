//! Static file serving module
//!
//! Maps request paths onto the configured root directory and serves the
//! file bytes unchanged. Nothing is cached; every request reads the disk.

use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs;

const INDEX_FILE: &str = "index.html";

/// Find the filesystem entry for a request path under `root`
///
/// Returns `None` when nothing exists there. Paths that climb out of the
/// root with `..` never resolve.
pub async fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut file_path = root.to_path_buf();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
                return None;
            }
            s => file_path.push(s),
        }
    }

    match fs::try_exists(&file_path).await {
        Ok(true) => Some(file_path),
        Ok(false) => None,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to check '{}': {e}",
                file_path.display()
            ));
            None
        }
    }
}

/// Serve a path previously returned by [`resolve`]
///
/// Directories serve their `index.html`. A read failure (the entry vanished
/// or the directory has no index) becomes a 500 with a JSON error body.
pub async fn serve(file_path: PathBuf) -> Response<Full<Bytes>> {
    let mut file_path = file_path;
    if fs::metadata(&file_path).await.is_ok_and(|m| m.is_dir()) {
        file_path.push(INDEX_FILE);
    }

    match fs::read(&file_path).await {
        Ok(content) => http::build_file_response(content, content_type(&file_path)),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Stylesheets are labelled; everything else goes out without a content type
fn content_type(file_path: &Path) -> Option<&'static str> {
    file_path
        .to_string_lossy()
        .ends_with(".css")
        .then_some("text/css")
}
