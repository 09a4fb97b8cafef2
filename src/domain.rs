//! Domain models shared by the engine: categories, slots, pieces, levels,
//! and the placement compatibility rule.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Closed set of piece/slot categories used across the games.
/// An unknown category string in catalog data fails deserialization at load
/// time instead of surfacing as a runtime mismatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Keyword,
  Trigger,
  Condition,
  System,
  Action,
  Widget,
  Technique,
  Tool,
}

/// How a level is played and scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMode {
  /// Fill every slot from the piece bank, optionally after a choice step.
  Build,
  /// Replace every flagged issue in a broken artifact with a sound piece.
  Inspect,
  /// Pick the exact set of correct pieces; no slots.
  Select,
}

/// A named location in a level template that accepts one compatible piece.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slot {
  pub id: String,
  /// `None` accepts any category (identification-style levels).
  #[serde(default)]
  pub accepts: Option<Category>,
  #[serde(default)]
  pub label: String,
  /// Guidance text; doubles as the issue description on inspect levels.
  #[serde(default)]
  pub hint: String,
  /// Fixed display value. A prefilled slot is never fillable by the user.
  #[serde(default)]
  pub prefilled: Option<String>,
}

impl Slot {
  pub fn is_fillable(&self) -> bool {
    self.prefilled.is_none()
  }
}

/// A candidate item with a category tag, display text, and optional trap flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Piece {
  pub id: String,
  pub category: Category,
  pub text: String,
  #[serde(default)]
  pub is_trap: bool,
  /// Why the trap is wrong; revealed after the trap is triggered.
  #[serde(default)]
  pub reason: String,
}

/// Optional single-choice step (e.g. picking the overarching pattern),
/// scored independently of slot filling. A level without one behaves as a
/// pre-selected, guaranteed-correct step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChoiceStep {
  pub options: Vec<String>,
  pub correct: String,
}

/// One playable level. Mode-specific fields default to empty, so catalog
/// data only spells out the parts a given mode needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Level {
  pub id: String,
  pub mode: LevelMode,
  /// Mastery tag (pattern/technique) this level teaches.
  pub tag: String,

  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub scenario: String,
  #[serde(default)]
  pub context: String,
  /// Display-only template text carried verbatim to the client.
  #[serde(default)]
  pub template: String,
  /// First-hint guidance; a canned line is derived from `tag` if empty.
  #[serde(default)]
  pub tip: String,

  #[serde(default)]
  pub choice: Option<ChoiceStep>,
  #[serde(default)]
  pub slots: Vec<Slot>,
  #[serde(default)]
  pub pieces: Vec<Piece>,
  /// Slot id -> correct piece id. Required for build levels; on inspect
  /// levels it only drives hint reveals.
  #[serde(default)]
  pub solution: std::collections::HashMap<String, String>,
  /// Correct piece-id set for select levels.
  #[serde(default)]
  pub picks: Vec<String>,

  #[serde(default)]
  pub explanation: String,
}

/// Compatibility rule for placements. Mostly identity, with one documented
/// exception: triggers and conditions are mutually interchangeable, because
/// event triggers and state conditions are genuinely ambiguous in the
/// requirement grammar the games teach. Prefilled slots are rejected
/// upstream in the placement store regardless of category.
pub fn can_place(piece: Category, accepts: Option<Category>) -> bool {
  match accepts {
    None => true,
    Some(slot) => {
      piece == slot
        || matches!(
          (piece, slot),
          (Category::Trigger, Category::Condition) | (Category::Condition, Category::Trigger)
        )
    }
  }
}

impl Level {
  pub fn slot(&self, id: &str) -> Option<&Slot> {
    self.slots.iter().find(|s| s.id == id)
  }

  pub fn piece(&self, id: &str) -> Option<&Piece> {
    self.pieces.iter().find(|p| p.id == id)
  }

  pub fn fillable_slots(&self) -> impl Iterator<Item = &Slot> {
    self.slots.iter().filter(|s| s.is_fillable())
  }

  pub fn has_choice(&self) -> bool {
    self.choice.is_some()
  }

  /// Structural validation, run once at catalog load. Any violation is a
  /// load-time error; the engine assumes a validated level afterwards.
  pub fn validate(&self) -> Result<(), String> {
    let mut slot_ids = HashSet::new();
    for s in &self.slots {
      if !slot_ids.insert(s.id.as_str()) {
        return Err(format!("level '{}': duplicate slot id '{}'", self.id, s.id));
      }
    }
    let mut piece_ids = HashSet::new();
    for p in &self.pieces {
      if !piece_ids.insert(p.id.as_str()) {
        return Err(format!("level '{}': duplicate piece id '{}'", self.id, p.id));
      }
    }

    for (slot_id, piece_id) in &self.solution {
      let slot = self
        .slot(slot_id)
        .ok_or_else(|| format!("level '{}': solution names unknown slot '{}'", self.id, slot_id))?;
      if !slot.is_fillable() {
        return Err(format!("level '{}': solution targets prefilled slot '{}'", self.id, slot_id));
      }
      let piece = self.piece(piece_id).ok_or_else(|| {
        format!("level '{}': solution names unknown piece '{}'", self.id, piece_id)
      })?;
      if piece.is_trap {
        return Err(format!("level '{}': solution piece '{}' is a trap", self.id, piece_id));
      }
      if !can_place(piece.category, slot.accepts) {
        return Err(format!(
          "level '{}': solution piece '{}' does not fit slot '{}'",
          self.id, piece_id, slot_id
        ));
      }
    }

    if let Some(step) = &self.choice {
      if !step.options.iter().any(|o| o == &step.correct) {
        return Err(format!(
          "level '{}': choice answer '{}' is not among the options",
          self.id, step.correct
        ));
      }
    }

    match self.mode {
      LevelMode::Build => {
        for slot in self.fillable_slots() {
          if !self.solution.contains_key(&slot.id) {
            return Err(format!("level '{}': slot '{}' has no solution entry", self.id, slot.id));
          }
        }
        if self.fillable_slots().count() == 0 {
          return Err(format!("level '{}': build level has no fillable slots", self.id));
        }
      }
      LevelMode::Inspect => {
        if self.fillable_slots().count() == 0 {
          return Err(format!("level '{}': inspect level has no issues to fix", self.id));
        }
        if self.has_choice() {
          return Err(format!("level '{}': inspect levels have no choice step", self.id));
        }
      }
      LevelMode::Select => {
        if self.picks.is_empty() {
          return Err(format!("level '{}': select level has an empty solution set", self.id));
        }
        for pick in &self.picks {
          if self.piece(pick).is_none() {
            return Err(format!("level '{}': pick '{}' is not a known piece", self.id, pick));
          }
        }
        if !self.slots.is_empty() {
          return Err(format!("level '{}': select levels carry no slots", self.id));
        }
      }
    }
    Ok(())
  }
}

/// Shared fixture for engine tests: a two-slot event-driven build level
/// with one trap in the bank.
#[cfg(test)]
pub(crate) fn sample_build_level() -> Level {
  Level {
    id: "test-1".into(),
    mode: LevelMode::Build,
    tag: "event-driven".into(),
    title: String::new(),
    scenario: String::new(),
    context: String::new(),
    template: String::new(),
    tip: String::new(),
    choice: None,
    slots: vec![
      Slot {
        id: "s1".into(),
        accepts: Some(Category::Trigger),
        label: "Trigger".into(),
        hint: String::new(),
        prefilled: None,
      },
      Slot {
        id: "s2".into(),
        accepts: Some(Category::Action),
        label: "Action".into(),
        hint: String::new(),
        prefilled: None,
      },
    ],
    pieces: vec![
      Piece {
        id: "p1".into(),
        category: Category::Trigger,
        text: "WHEN the door opens".into(),
        is_trap: false,
        reason: String::new(),
      },
      Piece {
        id: "p2".into(),
        category: Category::Action,
        text: "sound the chime".into(),
        is_trap: false,
        reason: String::new(),
      },
      Piece {
        id: "p3".into(),
        category: Category::Action,
        text: "do something nice".into(),
        is_trap: true,
        reason: "Not verifiable.".into(),
      },
    ],
    solution: [("s1".to_string(), "p1".to_string()), ("s2".to_string(), "p2".to_string())]
      .into_iter()
      .collect(),
    picks: vec![],
    explanation: String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trigger_and_condition_are_interchangeable_both_ways() {
    assert!(can_place(Category::Trigger, Some(Category::Condition)));
    assert!(can_place(Category::Condition, Some(Category::Trigger)));
    assert!(can_place(Category::Trigger, Some(Category::Trigger)));
    assert!(can_place(Category::Condition, Some(Category::Condition)));
  }

  #[test]
  fn all_other_categories_require_exact_match() {
    assert!(can_place(Category::Keyword, Some(Category::Keyword)));
    assert!(!can_place(Category::Keyword, Some(Category::Action)));
    assert!(!can_place(Category::System, Some(Category::Action)));
    assert!(!can_place(Category::Action, Some(Category::System)));
    assert!(!can_place(Category::Widget, Some(Category::Tool)));
  }

  #[test]
  fn open_slots_accept_any_category() {
    assert!(can_place(Category::Widget, None));
    assert!(can_place(Category::Trigger, None));
  }

  #[test]
  fn validate_rejects_dangling_solution_entries() {
    let mut level = sample_build_level();
    level.solution.insert("nope".into(), "p1".into());
    let err = level.validate().unwrap_err();
    assert!(err.contains("unknown slot"));
  }

  #[test]
  fn validate_rejects_incompatible_solution() {
    let mut level = sample_build_level();
    level.solution.insert("s1".into(), "p2".into());
    let err = level.validate().unwrap_err();
    assert!(err.contains("does not fit"));
  }

  #[test]
  fn validate_requires_full_build_solution() {
    let mut level = sample_build_level();
    level.solution.remove("s2");
    let err = level.validate().unwrap_err();
    assert!(err.contains("no solution entry"));
  }

  #[test]
  fn validate_accepts_sample_level() {
    sample_build_level().validate().expect("valid level");
  }
}
