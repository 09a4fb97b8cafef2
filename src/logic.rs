//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Handlers stay thin: every game action funnels through here, gets logged,
//! and comes back as a protocol DTO ready for serialization. Unknown
//! session ids surface as `Err(message)`, never as panics or dropped
//! connections.

use tracing::{info, instrument};

use crate::protocol::{
  to_level_out, to_placement_out, to_score_out, ChoiceOut, HintOut, LevelFetch, PlacementOut,
  ScoreOut,
};
use crate::session::Summary;
use crate::state::AppState;

fn unknown_session(id: &str) -> String {
  format!("Unknown sessionId: {id}")
}

#[instrument(level = "info", skip(state))]
pub async fn start_session(state: &AppState) -> String {
  state.create_session().await
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn fetch_level(state: &AppState, session_id: &str) -> Result<LevelFetch, String> {
  state
    .with_session(session_id, |s| match to_level_out(s) {
      Some(level) => LevelFetch::Level { level },
      None => LevelFetch::Finished { summary: s.summary() },
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id, %option))]
pub async fn apply_choice(
  state: &AppState,
  session_id: &str,
  option: &str,
) -> Result<ChoiceOut, String> {
  state
    .with_session(session_id, |s| ChoiceOut {
      option: option.to_string(),
      accepted: s.select_choice(option),
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id, %slot_id, %piece_id))]
pub async fn apply_place(
  state: &AppState,
  session_id: &str,
  slot_id: &str,
  piece_id: &str,
) -> Result<PlacementOut, String> {
  state
    .with_session(session_id, |s| {
      let outcome = s.place(slot_id, piece_id);
      to_placement_out(s, outcome)
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id, %piece_id))]
pub async fn apply_quick_place(
  state: &AppState,
  session_id: &str,
  piece_id: &str,
) -> Result<PlacementOut, String> {
  state
    .with_session(session_id, |s| {
      let outcome = s.place_first_fit(piece_id);
      to_placement_out(s, outcome)
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id, %slot_id))]
pub async fn apply_remove(
  state: &AppState,
  session_id: &str,
  slot_id: &str,
) -> Result<PlacementOut, String> {
  state
    .with_session(session_id, |s| {
      let outcome = s.remove(slot_id);
      to_placement_out(s, outcome)
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id, %piece_id))]
pub async fn apply_pick(
  state: &AppState,
  session_id: &str,
  piece_id: &str,
) -> Result<PlacementOut, String> {
  state
    .with_session(session_id, |s| {
      let outcome = s.toggle_pick(piece_id);
      to_placement_out(s, outcome)
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn request_hint(state: &AppState, session_id: &str) -> Result<HintOut, String> {
  state
    .with_session(session_id, |s| HintOut { hint: s.use_hint(), remaining: s.hints_remaining() })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn submit_level(state: &AppState, session_id: &str) -> Result<ScoreOut, String> {
  state
    .with_session(session_id, |s| match s.submit().cloned() {
      Some(result) => {
        info!(target: "game", %session_id, total = result.total, stars = result.stars, "Submission scored");
        Ok(to_score_out(s, &result))
      }
      None => Err("Level is not ready to score: fill every slot (and make the choice) first.".to_string()),
    })
    .await
    .unwrap_or_else(|| Err(unknown_session(session_id)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn advance_level(state: &AppState, session_id: &str) -> Result<LevelFetch, String> {
  state
    .with_session(session_id, |s| {
      if !s.next_level() && !s.is_finished() {
        return Err("Submit the current level before moving on.".to_string());
      }
      Ok(match to_level_out(s) {
        Some(level) => LevelFetch::Level { level },
        None => LevelFetch::Finished { summary: s.summary() },
      })
    })
    .await
    .unwrap_or_else(|| Err(unknown_session(session_id)))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn reset_level(state: &AppState, session_id: &str) -> Result<PlacementOut, String> {
  state
    .with_session(session_id, |s| {
      let outcome = s.reset_level();
      to_placement_out(s, outcome)
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn restart_session(state: &AppState, session_id: &str) -> Result<LevelFetch, String> {
  state
    .with_session(session_id, |s| {
      s.restart();
      match to_level_out(s) {
        Some(level) => LevelFetch::Level { level },
        None => LevelFetch::Finished { summary: s.summary() },
      }
    })
    .await
    .ok_or_else(|| unknown_session(session_id))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn fetch_summary(state: &AppState, session_id: &str) -> Result<Summary, String> {
  state
    .with_session(session_id, |s| s.summary())
    .await
    .ok_or_else(|| unknown_session(session_id))
}
