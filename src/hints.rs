//! Hint subsystem: per-level budget and the progressive reveal ladder.
//!
//! Consuming a hint never charges points immediately; the cost lands at
//! scoring time via the hint count. Budgets reset on every level load.

use serde::Serialize;

use crate::domain::{Level, LevelMode};
use crate::placement::PlacementStore;

/// What a consumed hint reveals, progressively more specific.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Hint {
  /// Generic tag-level guidance.
  Tip { text: String },
  /// The correct choice-step option.
  RevealChoice { option: String },
  /// One correct slot/piece pairing that is not yet correctly placed.
  RevealPlacement {
    #[serde(rename = "slotId")]
    slot_id: String,
    #[serde(rename = "pieceId")]
    piece_id: String,
  },
  /// The first unfixed issue and why it is broken.
  RevealIssue {
    #[serde(rename = "slotId")]
    slot_id: String,
    reason: String,
  },
  /// One correct piece for select levels.
  RevealPick {
    #[serde(rename = "pieceId")]
    piece_id: String,
  },
}

/// Per-level hint budget. Monotonically non-increasing within a level.
#[derive(Clone, Copy, Debug)]
pub struct HintState {
  remaining: u32,
  used: u32,
}

impl HintState {
  pub fn new(budget: u32) -> Self {
    Self { remaining: budget, used: 0 }
  }

  pub fn remaining(&self) -> u32 {
    self.remaining
  }

  pub fn used(&self) -> u32 {
    self.used
  }

  /// Consume one hint; false when the budget is spent (no penalty charged).
  pub fn consume(&mut self) -> bool {
    if self.remaining == 0 {
      return false;
    }
    self.remaining -= 1;
    self.used += 1;
    true
  }
}

/// Pick the reveal for the `ordinal`-th consumed hint (1-based).
pub fn next_hint(level: &Level, store: &PlacementStore, choice: Option<&str>, ordinal: u32) -> Hint {
  match level.mode {
    LevelMode::Select => reveal_pick(level, store),
    LevelMode::Inspect => reveal_issue(level, store),
    LevelMode::Build => match ordinal {
      1 => Hint::Tip { text: tip_text(level) },
      2 if level.has_choice() && choice.is_none() => reveal_choice(level),
      _ => reveal_placement(level, store),
    },
  }
}

fn tip_text(level: &Level) -> String {
  if !level.tip.is_empty() {
    return level.tip.clone();
  }
  format!(
    "Think about what makes this a {} scenario before placing anything.",
    level.tag
  )
}

fn reveal_choice(level: &Level) -> Hint {
  match &level.choice {
    Some(step) => Hint::RevealChoice { option: step.correct.clone() },
    None => Hint::Tip { text: tip_text(level) },
  }
}

fn reveal_placement(level: &Level, store: &PlacementStore) -> Hint {
  for slot in level.fillable_slots() {
    if let Some(piece_id) = level.solution.get(&slot.id) {
      if store.piece_in(&slot.id) != Some(piece_id.as_str()) {
        return Hint::RevealPlacement { slot_id: slot.id.clone(), piece_id: piece_id.clone() };
      }
    }
  }
  Hint::Tip { text: "Everything placed so far is already correct.".into() }
}

fn reveal_issue(level: &Level, store: &PlacementStore) -> Hint {
  for issue in level.fillable_slots() {
    if store.piece_in(&issue.id).is_none() {
      return Hint::RevealIssue { slot_id: issue.id.clone(), reason: issue.hint.clone() };
    }
  }
  Hint::Tip { text: "Every issue already has a replacement; review your choices.".into() }
}

fn reveal_pick(level: &Level, store: &PlacementStore) -> Hint {
  let missing = level.picks.iter().find(|id| !store.picks().contains(*id));
  match missing.or_else(|| level.picks.first()) {
    Some(piece_id) => Hint::RevealPick { piece_id: piece_id.clone() },
    None => Hint::Tip { text: tip_text(level) },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{sample_build_level, ChoiceStep};

  #[test]
  fn budget_is_monotone_and_bottoms_out() {
    let mut h = HintState::new(3);
    assert!(h.consume());
    assert!(h.consume());
    assert!(h.consume());
    assert!(!h.consume());
    assert_eq!(h.remaining(), 0);
    assert_eq!(h.used(), 3);
  }

  #[test]
  fn ladder_goes_tip_then_choice_then_placement() {
    let mut level = sample_build_level();
    level.choice = Some(ChoiceStep {
      options: vec!["ubiquitous".into(), "event-driven".into()],
      correct: "event-driven".into(),
    });
    let store = PlacementStore::new();

    assert!(matches!(next_hint(&level, &store, None, 1), Hint::Tip { .. }));
    match next_hint(&level, &store, None, 2) {
      Hint::RevealChoice { option } => assert_eq!(option, "event-driven"),
      other => panic!("expected choice reveal, got {other:?}"),
    }
    // Once the choice is resolved, the second hint reveals a pairing.
    match next_hint(&level, &store, Some("event-driven"), 2) {
      Hint::RevealPlacement { slot_id, piece_id } => {
        assert_eq!(slot_id, "s1");
        assert_eq!(piece_id, "p1");
      }
      other => panic!("expected placement reveal, got {other:?}"),
    }
  }

  #[test]
  fn placement_reveal_skips_slots_already_correct() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    store.place(&level, "s1", "p1");
    match next_hint(&level, &store, None, 3) {
      Hint::RevealPlacement { slot_id, piece_id } => {
        assert_eq!(slot_id, "s2");
        assert_eq!(piece_id, "p2");
      }
      other => panic!("expected placement reveal, got {other:?}"),
    }
  }

  #[test]
  fn select_hint_points_at_a_missing_pick() {
    let mut level = sample_build_level();
    level.mode = crate::domain::LevelMode::Select;
    level.slots.clear();
    level.solution.clear();
    level.picks = vec!["p1".into(), "p2".into()];
    let mut store = PlacementStore::new();
    store.toggle_pick(&level, "p1");
    match next_hint(&level, &store, None, 1) {
      Hint::RevealPick { piece_id } => assert_eq!(piece_id, "p2"),
      other => panic!("expected pick reveal, got {other:?}"),
    }
  }
}
