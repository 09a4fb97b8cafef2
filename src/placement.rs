//! Placement Store: the mutable slot -> piece mapping for the level in
//! progress, plus the pick set used by select levels.
//!
//! Every mutation is a silent no-op when it cannot apply (locked level,
//! prefilled slot, unknown ids); the outcome enum tells the rendering layer
//! what happened without ever failing the session.

use std::collections::{HashMap, HashSet};

use crate::domain::{can_place, Level};

/// Whether a placement request was applied or ignored, and why.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceOutcome {
  Placed,
  Removed,
  /// Level already submitted, or the slot is prefilled/fixed.
  Locked,
  /// Unknown slot/piece, incompatible category, or nothing to do.
  Rejected,
}

#[derive(Clone, Debug, Default)]
pub struct PlacementStore {
  by_slot: HashMap<String, String>,
  picks: HashSet<String>,
  locked: bool,
}

impl PlacementStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Assign `piece_id` to `slot_id`. Last write wins on the slot; a piece
  /// occupies at most one slot, so placing it again moves it and vacates
  /// its previous slot.
  pub fn place(&mut self, level: &Level, slot_id: &str, piece_id: &str) -> PlaceOutcome {
    if self.locked {
      return PlaceOutcome::Locked;
    }
    let Some(slot) = level.slot(slot_id) else {
      return PlaceOutcome::Rejected;
    };
    if !slot.is_fillable() {
      return PlaceOutcome::Locked;
    }
    let Some(piece) = level.piece(piece_id) else {
      return PlaceOutcome::Rejected;
    };
    if !can_place(piece.category, slot.accepts) {
      return PlaceOutcome::Rejected;
    }

    // The piece moves, it does not duplicate: drop any slot it already holds.
    self.by_slot.retain(|s, p| s == slot_id || p != piece_id);
    self.by_slot.insert(slot_id.to_string(), piece_id.to_string());
    PlaceOutcome::Placed
  }

  /// Click-to-place: iterate slots in catalog-declared order and fill the
  /// first empty compatible one. The order is a documented tie-break; do
  /// not reorder.
  pub fn place_first_fit(&mut self, level: &Level, piece_id: &str) -> PlaceOutcome {
    if self.locked {
      return PlaceOutcome::Locked;
    }
    let Some(piece) = level.piece(piece_id) else {
      return PlaceOutcome::Rejected;
    };
    for slot in level.fillable_slots() {
      if !self.by_slot.contains_key(&slot.id) && can_place(piece.category, slot.accepts) {
        return self.place(level, &slot.id, piece_id);
      }
    }
    PlaceOutcome::Rejected
  }

  /// Empty a slot and free its piece. Silent no-op on a locked level or an
  /// already-empty slot.
  pub fn remove(&mut self, slot_id: &str) -> PlaceOutcome {
    if self.locked {
      return PlaceOutcome::Locked;
    }
    match self.by_slot.remove(slot_id) {
      Some(_) => PlaceOutcome::Removed,
      None => PlaceOutcome::Rejected,
    }
  }

  /// Toggle a piece in the select-mode pick set.
  pub fn toggle_pick(&mut self, level: &Level, piece_id: &str) -> PlaceOutcome {
    if self.locked {
      return PlaceOutcome::Locked;
    }
    if level.piece(piece_id).is_none() {
      return PlaceOutcome::Rejected;
    }
    if !self.picks.remove(piece_id) {
      self.picks.insert(piece_id.to_string());
      return PlaceOutcome::Placed;
    }
    PlaceOutcome::Removed
  }

  /// True once every fillable slot is mapped (or, for select levels, at
  /// least one piece is picked). This is the signal that enables submit.
  pub fn is_complete(&self, level: &Level) -> bool {
    match level.mode {
      crate::domain::LevelMode::Select => !self.picks.is_empty(),
      _ => level.fillable_slots().all(|s| self.by_slot.contains_key(&s.id)),
    }
  }

  /// Clear all mappings and picks. Used by the reset-level action; a new
  /// level load builds a fresh store instead.
  pub fn reset(&mut self) {
    self.by_slot.clear();
    self.picks.clear();
  }

  /// Freeze the store after submission; all further mutations are no-ops.
  pub fn lock(&mut self) {
    self.locked = true;
  }

  pub fn piece_in(&self, slot_id: &str) -> Option<&str> {
    self.by_slot.get(slot_id).map(String::as_str)
  }

  /// Which slot, if any, a piece currently occupies.
  #[allow(dead_code)]
  pub fn slot_of(&self, piece_id: &str) -> Option<&str> {
    self
      .by_slot
      .iter()
      .find(|(_, p)| p.as_str() == piece_id)
      .map(|(s, _)| s.as_str())
  }

  pub fn placements(&self) -> &HashMap<String, String> {
    &self.by_slot
  }

  pub fn picks(&self) -> &HashSet<String> {
    &self.picks
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::sample_build_level;

  #[test]
  fn place_then_move_vacates_the_old_slot() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    // p3 is an action trap; it fits either action slot by category, so use
    // a level with two action slots to observe the move.
    let mut level2 = level.clone();
    level2.slots[0].accepts = Some(crate::domain::Category::Action);
    assert_eq!(store.place(&level2, "s1", "p2"), PlaceOutcome::Placed);
    assert_eq!(store.place(&level2, "s2", "p2"), PlaceOutcome::Placed);
    assert_eq!(store.piece_in("s1"), None);
    assert_eq!(store.piece_in("s2"), Some("p2"));
    assert_eq!(store.slot_of("p2"), Some("s2"));
  }

  #[test]
  fn last_write_wins_on_a_slot() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    assert_eq!(store.place(&level, "s2", "p2"), PlaceOutcome::Placed);
    assert_eq!(store.place(&level, "s2", "p3"), PlaceOutcome::Placed);
    assert_eq!(store.piece_in("s2"), Some("p3"));
    assert_eq!(store.slot_of("p2"), None);
  }

  #[test]
  fn incompatible_and_unknown_requests_are_rejected() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    assert_eq!(store.place(&level, "s1", "p2"), PlaceOutcome::Rejected);
    assert_eq!(store.place(&level, "s1", "ghost"), PlaceOutcome::Rejected);
    assert_eq!(store.place(&level, "ghost", "p1"), PlaceOutcome::Rejected);
    assert!(store.placements().is_empty());
  }

  #[test]
  fn prefilled_slots_never_accept_placement() {
    let mut level = sample_build_level();
    level.slots[0].prefilled = Some("WHEN the door opens".into());
    level.solution.remove("s1");
    let mut store = PlacementStore::new();
    assert_eq!(store.place(&level, "s1", "p1"), PlaceOutcome::Locked);
    // Completeness only counts the remaining fillable slot.
    assert_eq!(store.place(&level, "s2", "p2"), PlaceOutcome::Placed);
    assert!(store.is_complete(&level));
  }

  #[test]
  fn locked_store_ignores_everything() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    store.place(&level, "s1", "p1");
    store.lock();
    assert_eq!(store.place(&level, "s2", "p2"), PlaceOutcome::Locked);
    assert_eq!(store.remove("s1"), PlaceOutcome::Locked);
    assert_eq!(store.toggle_pick(&level, "p1"), PlaceOutcome::Locked);
    assert_eq!(store.piece_in("s1"), Some("p1"));
  }

  #[test]
  fn first_fit_follows_declared_slot_order() {
    let mut level = sample_build_level();
    // Two action slots; the first empty one must win.
    level.slots[0].accepts = Some(crate::domain::Category::Action);
    let mut store = PlacementStore::new();
    assert_eq!(store.place_first_fit(&level, "p2"), PlaceOutcome::Placed);
    assert_eq!(store.piece_in("s1"), Some("p2"));
    assert_eq!(store.place_first_fit(&level, "p3"), PlaceOutcome::Placed);
    assert_eq!(store.piece_in("s2"), Some("p3"));
    // Every compatible slot is taken: nothing left to fill.
    assert_eq!(store.place_first_fit(&level, "p2"), PlaceOutcome::Rejected);
  }

  #[test]
  fn completeness_tracks_fillable_slots_only() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    assert!(!store.is_complete(&level));
    store.place(&level, "s1", "p1");
    store.place(&level, "s2", "p2");
    assert!(store.is_complete(&level));
    store.remove("s2");
    assert!(!store.is_complete(&level));
  }

  #[test]
  fn reset_clears_mappings_and_picks() {
    let level = sample_build_level();
    let mut store = PlacementStore::new();
    store.place(&level, "s1", "p1");
    store.toggle_pick(&level, "p2");
    store.reset();
    assert!(store.placements().is_empty());
    assert!(store.picks().is_empty());
  }
}
