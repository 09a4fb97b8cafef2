//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to core logic. We reply with a single JSON message per
//! request.

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, LevelFetch, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
  info!(target: "skillforge_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: AppState) {
  info!(target: "skillforge_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "skillforge_backend", payload = %trunc_for_log(&txt, 512), "WS received");
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
            .to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "skillforge_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "skillforge_backend", "WebSocket disconnected");
}

fn level_fetch_msg(fetch: LevelFetch) -> ServerWsMessage {
  match fetch {
    LevelFetch::Level { level } => ServerWsMessage::Level { level },
    LevelFetch::Finished { summary } => ServerWsMessage::Summary { summary },
  }
}

fn or_error<T>(res: Result<T, String>, f: impl FnOnce(T) -> ServerWsMessage) -> ServerWsMessage {
  match res {
    Ok(v) => f(v),
    Err(message) => ServerWsMessage::Error { message },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession => {
      let session_id = start_session(state).await;
      tracing::info!(target: "game", session = %session_id, "WS session created");
      ServerWsMessage::Session { session_id }
    }

    ClientWsMessage::GetLevel { session_id } => {
      or_error(fetch_level(state, &session_id).await, level_fetch_msg)
    }

    ClientWsMessage::SelectChoice { session_id, option } => {
      or_error(apply_choice(state, &session_id, &option).await, |c| ServerWsMessage::Choice {
        option: c.option,
        accepted: c.accepted,
      })
    }

    ClientWsMessage::Place { session_id, slot_id, piece_id } => or_error(
      apply_place(state, &session_id, &slot_id, &piece_id).await,
      |placement| ServerWsMessage::Placement { placement },
    ),

    ClientWsMessage::QuickPlace { session_id, piece_id } => or_error(
      apply_quick_place(state, &session_id, &piece_id).await,
      |placement| ServerWsMessage::Placement { placement },
    ),

    ClientWsMessage::Remove { session_id, slot_id } => or_error(
      apply_remove(state, &session_id, &slot_id).await,
      |placement| ServerWsMessage::Placement { placement },
    ),

    ClientWsMessage::TogglePick { session_id, piece_id } => or_error(
      apply_pick(state, &session_id, &piece_id).await,
      |placement| ServerWsMessage::Placement { placement },
    ),

    ClientWsMessage::Hint { session_id } => {
      or_error(request_hint(state, &session_id).await, |h| ServerWsMessage::Hint {
        hint: h.hint,
        remaining: h.remaining,
      })
    }

    ClientWsMessage::Submit { session_id } => {
      let reply = or_error(submit_level(state, &session_id).await, |result| {
        ServerWsMessage::Result { result }
      });
      tracing::info!(target: "game", session = %session_id, "WS submission handled");
      reply
    }

    ClientWsMessage::Next { session_id } => {
      or_error(advance_level(state, &session_id).await, level_fetch_msg)
    }

    ClientWsMessage::ResetLevel { session_id } => or_error(
      reset_level(state, &session_id).await,
      |placement| ServerWsMessage::Placement { placement },
    ),

    ClientWsMessage::Restart { session_id } => {
      or_error(restart_session(state, &session_id).await, level_fetch_msg)
    }

    ClientWsMessage::Summary { session_id } => {
      or_error(fetch_summary(state, &session_id).await, |summary| ServerWsMessage::Summary {
        summary,
      })
    }
  }
}
