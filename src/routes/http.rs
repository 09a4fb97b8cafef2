//! HTTP endpoint handlers. These are thin wrappers that forward to core
//! logic and serialize the outcome; rejected lookups come back as a JSON
//! error body with a 400 status.

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

fn json_or_error<T: Serialize>(res: Result<T, String>) -> Response {
  match res {
    Ok(v) => Json(v).into_response(),
    Err(message) => (StatusCode::BAD_REQUEST, Json(ErrorOut { message })).into_response(),
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<AppState>) -> impl IntoResponse {
  let session_id = start_session(&state).await;
  info!(target: "game", session = %session_id, "HTTP session created");
  Json(SessionOut { session_id })
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_level(
  State(state): State<AppState>,
  Query(q): Query<SessionQuery>,
) -> impl IntoResponse {
  json_or_error(fetch_level(&state, &q.session_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.option))]
pub async fn http_post_choice(
  State(state): State<AppState>,
  Json(body): Json<ChoiceIn>,
) -> impl IntoResponse {
  json_or_error(apply_choice(&state, &body.session_id, &body.option).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.slot_id, %body.piece_id))]
pub async fn http_post_place(
  State(state): State<AppState>,
  Json(body): Json<PlaceIn>,
) -> impl IntoResponse {
  json_or_error(apply_place(&state, &body.session_id, &body.slot_id, &body.piece_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.piece_id))]
pub async fn http_post_quick_place(
  State(state): State<AppState>,
  Json(body): Json<PieceIn>,
) -> impl IntoResponse {
  json_or_error(apply_quick_place(&state, &body.session_id, &body.piece_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.slot_id))]
pub async fn http_post_remove(
  State(state): State<AppState>,
  Json(body): Json<SlotIn>,
) -> impl IntoResponse {
  json_or_error(apply_remove(&state, &body.session_id, &body.slot_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.piece_id))]
pub async fn http_post_pick(
  State(state): State<AppState>,
  Json(body): Json<PieceIn>,
) -> impl IntoResponse {
  json_or_error(apply_pick(&state, &body.session_id, &body.piece_id).await)
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_hint(
  State(state): State<AppState>,
  Query(q): Query<SessionQuery>,
) -> impl IntoResponse {
  json_or_error(request_hint(&state, &q.session_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_submit(
  State(state): State<AppState>,
  Json(body): Json<SessionIn>,
) -> impl IntoResponse {
  json_or_error(submit_level(&state, &body.session_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_next(
  State(state): State<AppState>,
  Json(body): Json<SessionIn>,
) -> impl IntoResponse {
  json_or_error(advance_level(&state, &body.session_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_reset(
  State(state): State<AppState>,
  Json(body): Json<SessionIn>,
) -> impl IntoResponse {
  json_or_error(reset_level(&state, &body.session_id).await)
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_restart(
  State(state): State<AppState>,
  Json(body): Json<SessionIn>,
) -> impl IntoResponse {
  json_or_error(restart_session(&state, &body.session_id).await)
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_summary(
  State(state): State<AppState>,
  Query(q): Query<SessionQuery>,
) -> impl IntoResponse {
  json_or_error(fetch_summary(&state, &q.session_id).await)
}
