//! Response types for the web API.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Content type the GUI expects on move replies.
pub const MOVE_CONTENT_TYPE: &str = "text/json";

/// Body of a successful move request: `{"move":"<token>"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub best_move: String,
}

impl IntoResponse for MoveResponse {
    fn into_response(self) -> Response {
        match serde_json::to_string(&self) {
            Ok(body) => ([(header::CONTENT_TYPE, MOVE_CONTENT_TYPE)], body).into_response(),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
}
