//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Outbound level data never carries solutions, trap flags, trap reasons, or
//! the correct choice; the client learns those only from post-submit results.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::domain::{Category, LevelMode};
use crate::hints::Hint;
use crate::placement::PlaceOutcome;
use crate::scoring::{ScoreResult, TrapHit, Verdict};
use crate::session::{Session, Summary};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession,
    GetLevel {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SelectChoice {
        #[serde(rename = "sessionId")]
        session_id: String,
        option: String,
    },
    Place {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "slotId")]
        slot_id: String,
        #[serde(rename = "pieceId")]
        piece_id: String,
    },
    /// Click-to-place: first empty compatible slot wins.
    QuickPlace {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "pieceId")]
        piece_id: String,
    },
    Remove {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "slotId")]
        slot_id: String,
    },
    TogglePick {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "pieceId")]
        piece_id: String,
    },
    Hint {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Submit {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Next {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    ResetLevel {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Restart {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Summary {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Level {
        level: LevelOut,
    },
    Placement {
        placement: PlacementOut,
    },
    Choice {
        option: String,
        accepted: bool,
    },
    Hint {
        hint: Option<Hint>,
        remaining: u32,
    },
    Result {
        result: ScoreOut,
    },
    Summary {
        summary: Summary,
    },
    Error {
        message: String,
    },
}

/// What a level fetch yields: the level in progress, or the summary once
/// the catalog is exhausted.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LevelFetch {
    Level { level: LevelOut },
    Finished { summary: Summary },
}

/// Level DTO as the client sees it: bank order shuffled, answers stripped.
#[derive(Debug, Serialize)]
pub struct LevelOut {
    pub index: usize,
    pub total: usize,
    pub id: String,
    pub mode: LevelMode,
    pub tag: String,
    pub title: String,
    pub scenario: String,
    pub context: String,
    pub template: String,
    #[serde(rename = "choiceOptions")]
    pub choice_options: Vec<String>,
    /// The player's current choice-step selection, if any.
    pub choice: Option<String>,
    pub slots: Vec<SlotOut>,
    pub pieces: Vec<PieceOut>,
    #[serde(rename = "hintsRemaining")]
    pub hints_remaining: u32,
    pub submitted: bool,
}

#[derive(Debug, Serialize)]
pub struct SlotOut {
    pub id: String,
    pub label: String,
    pub accepts: Option<Category>,
    pub hint: String,
    pub prefilled: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PieceOut {
    pub id: String,
    pub category: Category,
    pub text: String,
}

/// Placement state snapshot sent after every mutation.
#[derive(Debug, Serialize)]
pub struct PlacementOut {
    pub outcome: PlaceOutcome,
    pub placements: Vec<PlacedOut>,
    pub picks: Vec<String>,
    pub complete: bool,
    #[serde(rename = "canSubmit")]
    pub can_submit: bool,
}

#[derive(Debug, Serialize)]
pub struct PlacedOut {
    #[serde(rename = "slotId")]
    pub slot_id: String,
    #[serde(rename = "pieceId")]
    pub piece_id: String,
}

/// Score breakdown plus session running totals for the feedback panel.
#[derive(Debug, Serialize)]
pub struct ScoreOut {
    #[serde(rename = "choicePoints")]
    pub choice_points: i64,
    #[serde(rename = "slotPoints")]
    pub slot_points: i64,
    #[serde(rename = "bonusPoints")]
    pub bonus_points: i64,
    #[serde(rename = "trapPenalty")]
    pub trap_penalty: i64,
    #[serde(rename = "hintPenalty")]
    pub hint_penalty: i64,
    pub total: u64,
    #[serde(rename = "maxPossible")]
    pub max_possible: u64,
    pub stars: u8,
    pub perfect: bool,
    pub verdicts: Vec<Verdict>,
    pub traps: Vec<TrapHit>,
    pub explanation: String,
    #[serde(rename = "sessionScore")]
    pub session_score: u64,
    #[serde(rename = "sessionStars")]
    pub session_stars: u32,
}

/// Convert the session's current level to the public DTO. `None` once the
/// catalog is exhausted.
pub fn to_level_out(session: &Session) -> Option<LevelOut> {
    let level = session.level()?;
    let mut pieces: Vec<PieceOut> = level
        .pieces
        .iter()
        .map(|p| PieceOut { id: p.id.clone(), category: p.category, text: p.text.clone() })
        .collect();
    // Presentation order only; the engine never depends on it.
    pieces.shuffle(&mut rand::thread_rng());

    Some(LevelOut {
        index: session.level_index(),
        total: session.level_count(),
        id: level.id.clone(),
        mode: level.mode,
        tag: level.tag.clone(),
        title: level.title.clone(),
        scenario: level.scenario.clone(),
        context: level.context.clone(),
        template: level.template.clone(),
        choice_options: level.choice.as_ref().map(|c| c.options.clone()).unwrap_or_default(),
        choice: session.choice().map(str::to_string),
        slots: level
            .slots
            .iter()
            .map(|s| SlotOut {
                id: s.id.clone(),
                label: s.label.clone(),
                accepts: s.accepts,
                hint: s.hint.clone(),
                prefilled: s.prefilled.clone(),
            })
            .collect(),
        pieces,
        hints_remaining: session.hints_remaining(),
        submitted: session.is_submitted(),
    })
}

/// Snapshot the placement store after a mutation.
pub fn to_placement_out(session: &Session, outcome: PlaceOutcome) -> PlacementOut {
    let placements = session
        .level()
        .map(|level| {
            level
                .slots
                .iter()
                .filter_map(|s| {
                    session
                        .store()
                        .piece_in(&s.id)
                        .map(|p| PlacedOut { slot_id: s.id.clone(), piece_id: p.to_string() })
                })
                .collect()
        })
        .unwrap_or_default();
    let mut picks: Vec<String> = session.store().picks().iter().cloned().collect();
    picks.sort();
    PlacementOut {
        outcome,
        placements,
        picks,
        complete: session.level().map(|l| session.store().is_complete(l)).unwrap_or(false),
        can_submit: session.can_submit(),
    }
}

/// Pair a score result with the level explanation and session totals.
pub fn to_score_out(session: &Session, result: &ScoreResult) -> ScoreOut {
    ScoreOut {
        choice_points: result.choice_points,
        slot_points: result.slot_points,
        bonus_points: result.bonus_points,
        trap_penalty: result.trap_penalty,
        hint_penalty: result.hint_penalty,
        total: result.total,
        max_possible: result.max_possible,
        stars: result.stars,
        perfect: result.perfect,
        verdicts: result.verdicts.clone(),
        traps: result.traps.clone(),
        explanation: session.level().map(|l| l.explanation.clone()).unwrap_or_default(),
        session_score: session.total_score(),
        session_stars: session.total_stars(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct SessionIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct ChoiceIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub option: String,
}

#[derive(Deserialize)]
pub struct PlaceIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "slotId")]
    pub slot_id: String,
    #[serde(rename = "pieceId")]
    pub piece_id: String,
}

#[derive(Deserialize)]
pub struct PieceIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "pieceId")]
    pub piece_id: String,
}

#[derive(Deserialize)]
pub struct SlotIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "slotId")]
    pub slot_id: String,
}

#[derive(Serialize)]
pub struct ChoiceOut {
    pub option: String,
    pub accepted: bool,
}

#[derive(Serialize)]
pub struct HintOut {
    pub hint: Option<Hint>,
    pub remaining: u32,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
