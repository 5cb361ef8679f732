//! Static GUI files.

use axum::{
    extract::State,
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::static_files;
use crate::AppState;

/// Serve a GUI file for GET; every other unrouted request is not found.
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    if method != Method::GET {
        return Err(ApiError::NotFound(uri.path().to_string()));
    }

    let file = static_files::load(&state.static_root, uri.path()).await?;
    Ok(([(header::CONTENT_TYPE, file.content_type)], file.body).into_response())
}
