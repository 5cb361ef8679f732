//! GUI file serving, confined to one directory.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ApiError;

/// Served for `/`.
pub const DEFAULT_DOCUMENT: &str = "/index.html";

/// Only these extensions are served; anything else is not found.
const CONTENT_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".js", "application/javascript"),
    (".css", "text/css"),
    (".png", "image/png"),
];

pub struct StaticFile {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub fn content_type_for(path: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix))
        .map(|&(_, content_type)| content_type)
}

/// Resolve a request path to a file inside `root`, following `..` and
/// symlinks. Returns `None` when the file is missing or lands outside `root`.
pub async fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let root = tokio::fs::canonicalize(root).await.ok()?;
    let candidate = root.join(request_path.trim_start_matches('/'));
    let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;
    if resolved.starts_with(&root) {
        Some(resolved)
    } else {
        debug!(path = %request_path, "Rejected path outside serving root");
        None
    }
}

pub async fn load(root: &Path, request_path: &str) -> Result<StaticFile, ApiError> {
    let path = if request_path == "/" {
        DEFAULT_DOCUMENT
    } else {
        request_path
    };
    let not_found = || ApiError::NotFound(request_path.to_string());

    let content_type = content_type_for(path).ok_or_else(not_found)?;
    let file = resolve(root, path).await.ok_or_else(not_found)?;
    let body = tokio::fs::read(&file).await.map_err(|e| {
        debug!(path = %file.display(), "Failed to read file: {}", e);
        not_found()
    })?;

    Ok(StaticFile { content_type, body })
}
