//! Engine move requests.

use axum::extract::State;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::ApiError;
use crate::types::{FormFields, MoveResponse};
use crate::AppState;

/// Ask the engine for its move in the submitted position.
///
/// Requests queue on the engine worker, so a slow engine delays every move
/// request behind the one in flight. File requests are unaffected.
pub async fn play_move(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<MoveResponse, ApiError> {
    let started = Instant::now();
    let request = fields.to_move_request()?;

    let result = state.bridge.play(request).await?;

    info!(
        best_move = %result.best_move,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Engine move"
    );
    Ok(MoveResponse {
        best_move: result.best_move,
    })
}
