//! Session: one player's run through the catalog.
//!
//! The session owns the mutable game state the browser games used to keep
//! in free-standing globals: level cursor, placement store, choice, hint
//! budget, level timer, and the running aggregate behind the end-of-session
//! summary. Every handler receives it by reference; nothing is captured
//! from an enclosing scope.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::ScoreWeights;
use crate::domain::{Level, LevelMode};
use crate::hints::{next_hint, Hint, HintState};
use crate::placement::{PlaceOutcome, PlacementStore};
use crate::scoring::{score, ScoreResult};
use crate::util::percentage;

/// Per-tag mastery accumulator: earned vs. possible points.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Mastery {
  pub earned: u64,
  pub possible: u64,
}

/// One row of the summary's mastery breakdown.
#[derive(Clone, Debug, Serialize)]
pub struct MasteryRow {
  pub tag: String,
  pub earned: u64,
  pub possible: u64,
  pub pct: u32,
}

/// End-of-session summary for the completion screen.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
  pub score: u64,
  pub stars: u8,
  #[serde(rename = "maxPossible")]
  pub max_possible: u64,
  pub mastery: Vec<MasteryRow>,
}

pub struct Session {
  pub id: String,
  catalog: Arc<Catalog>,
  weights: ScoreWeights,
  level_index: usize,
  store: PlacementStore,
  choice: Option<String>,
  hints: HintState,
  started: Instant,
  submitted: Option<ScoreResult>,
  total_score: u64,
  total_stars: u32,
  mastery: HashMap<String, Mastery>,
}

impl Session {
  pub fn new(id: String, catalog: Arc<Catalog>, weights: ScoreWeights) -> Self {
    let mut session = Self {
      id,
      catalog,
      weights,
      level_index: 0,
      store: PlacementStore::new(),
      choice: None,
      hints: HintState::new(0),
      started: Instant::now(),
      submitted: None,
      total_score: 0,
      total_stars: 0,
      mastery: HashMap::new(),
    };
    session.enter_level();
    session
  }

  /// Fresh per-level state: empty store, no choice, full hint budget, timer
  /// restarted. Called on session start, next-level, and restart.
  fn enter_level(&mut self) {
    self.store = PlacementStore::new();
    self.choice = None;
    self.submitted = None;
    self.started = Instant::now();
    let budget = match self.level().map(|l| l.mode) {
      Some(LevelMode::Select) => self.weights.select_hint_budget,
      Some(_) => self.weights.hint_budget,
      None => 0,
    };
    self.hints = HintState::new(budget);
  }

  pub fn level(&self) -> Option<&Level> {
    self.catalog.level(self.level_index)
  }

  pub fn level_index(&self) -> usize {
    self.level_index
  }

  pub fn level_count(&self) -> usize {
    self.catalog.len()
  }

  /// The cursor has walked past the last level; only the summary remains.
  pub fn is_finished(&self) -> bool {
    self.level_index >= self.catalog.len()
  }

  pub fn is_submitted(&self) -> bool {
    self.submitted.is_some()
  }

  pub fn hints_remaining(&self) -> u32 {
    self.hints.remaining()
  }

  pub fn choice(&self) -> Option<&str> {
    self.choice.as_deref()
  }

  pub fn store(&self) -> &PlacementStore {
    &self.store
  }

  pub fn total_score(&self) -> u64 {
    self.total_score
  }

  pub fn total_stars(&self) -> u32 {
    self.total_stars
  }

  /// Record the choice-step selection. No-op once submitted, when the level
  /// has no choice step, or for an option the level does not offer.
  pub fn select_choice(&mut self, option: &str) -> bool {
    if self.submitted.is_some() {
      return false;
    }
    let Some(step) = self.level().and_then(|l| l.choice.as_ref()) else {
      return false;
    };
    if !step.options.iter().any(|o| o == option) {
      debug!(target: "game", session = %self.id, option, "Ignoring unknown choice option");
      return false;
    }
    self.choice = Some(option.to_string());
    true
  }

  pub fn place(&mut self, slot_id: &str, piece_id: &str) -> PlaceOutcome {
    match self.catalog.level(self.level_index) {
      Some(level) => self.store.place(level, slot_id, piece_id),
      None => PlaceOutcome::Rejected,
    }
  }

  pub fn place_first_fit(&mut self, piece_id: &str) -> PlaceOutcome {
    match self.catalog.level(self.level_index) {
      Some(level) => self.store.place_first_fit(level, piece_id),
      None => PlaceOutcome::Rejected,
    }
  }

  pub fn remove(&mut self, slot_id: &str) -> PlaceOutcome {
    if self.level().is_none() {
      return PlaceOutcome::Rejected;
    }
    self.store.remove(slot_id)
  }

  pub fn toggle_pick(&mut self, piece_id: &str) -> PlaceOutcome {
    match self.catalog.level(self.level_index) {
      Some(level) => self.store.toggle_pick(level, piece_id),
      None => PlaceOutcome::Rejected,
    }
  }

  /// Submit is enabled once every fillable slot is mapped and, where the
  /// level asks for one, a choice has been made.
  pub fn can_submit(&self) -> bool {
    let Some(level) = self.level() else {
      return false;
    };
    if self.submitted.is_some() {
      return false;
    }
    self.store.is_complete(level) && (!level.has_choice() || self.choice.is_some())
  }

  /// Consume one hint and return its reveal. `None` when the budget is
  /// spent or the level is already submitted; no penalty is charged then.
  pub fn use_hint(&mut self) -> Option<Hint> {
    if self.submitted.is_some() || self.is_finished() {
      return None;
    }
    if !self.hints.consume() {
      debug!(target: "game", session = %self.id, "Hint requested with empty budget");
      return None;
    }
    let level = self.level()?;
    let hint = next_hint(level, &self.store, self.choice.as_deref(), self.hints.used());
    info!(target: "game", session = %self.id, level = %level.id, remaining = self.hints.remaining(), "Hint consumed");
    Some(hint)
  }

  /// Score the current level once. Repeat calls return the cached result
  /// without a second scoring pass or a second accrual; an incomplete
  /// level returns `None`.
  pub fn submit(&mut self) -> Option<&ScoreResult> {
    if self.submitted.is_some() {
      debug!(target: "game", session = %self.id, "Duplicate submit ignored");
      return self.submitted.as_ref();
    }
    if !self.can_submit() {
      warn!(target: "game", session = %self.id, "Submit rejected: level incomplete");
      return None;
    }
    let elapsed = self.started.elapsed().as_secs();
    let level = self.level()?;
    let tag = level.tag.clone();
    let level_id = level.id.clone();
    let result = score(
      level,
      &self.store,
      self.choice.as_deref(),
      self.hints.used(),
      elapsed,
      &self.weights,
    );

    self.total_score += result.total;
    self.total_stars += u32::from(result.stars);
    let entry = self.mastery.entry(tag).or_default();
    entry.possible += result.max_possible;
    entry.earned += result.total;

    info!(
      target: "game",
      session = %self.id,
      level = %level_id,
      total = result.total,
      stars = result.stars,
      elapsed,
      "Level scored"
    );
    self.store.lock();
    self.submitted = Some(result);
    self.submitted.as_ref()
  }

  /// Advance past a scored level. Refused until the level was submitted.
  pub fn next_level(&mut self) -> bool {
    if self.is_finished() || self.submitted.is_none() {
      return false;
    }
    self.level_index += 1;
    self.enter_level();
    true
  }

  /// Clear placements and picks, keeping the choice, hints, and timer.
  /// No-op once the level is submitted.
  pub fn reset_level(&mut self) -> PlaceOutcome {
    if self.submitted.is_some() {
      return PlaceOutcome::Locked;
    }
    self.store.reset();
    PlaceOutcome::Removed
  }

  /// Back to level zero with empty aggregates; the catalog is untouched.
  pub fn restart(&mut self) {
    self.level_index = 0;
    self.total_score = 0;
    self.total_stars = 0;
    self.mastery.clear();
    self.enter_level();
    info!(target: "game", session = %self.id, "Session restarted");
  }

  pub fn summary(&self) -> Summary {
    let max_possible = self.catalog.max_obtainable(&self.weights);
    let stars = self
      .weights
      .session_stars
      .stars_for(percentage(self.total_score, max_possible));
    let mut mastery: Vec<MasteryRow> = self
      .mastery
      .iter()
      .map(|(tag, m)| MasteryRow {
        tag: tag.clone(),
        earned: m.earned,
        possible: m.possible,
        pct: percentage(m.earned, m.possible),
      })
      .collect();
    mastery.sort_by(|a, b| a.tag.cmp(&b.tag));
    Summary { score: self.total_score, stars, max_possible, mastery }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::sample_build_level;
  use crate::seeds::seed_levels;

  fn session_over(levels: Vec<Level>) -> Session {
    let catalog = Arc::new(Catalog::from_levels(levels).expect("catalog"));
    Session::new("t".into(), catalog, ScoreWeights::default())
  }

  fn solve_current(session: &mut Session) {
    let level = session.level().expect("level").clone();
    if let Some(step) = &level.choice {
      assert!(session.select_choice(&step.correct));
    }
    match level.mode {
      LevelMode::Select => {
        for pick in &level.picks {
          session.toggle_pick(pick);
        }
      }
      _ => {
        for (slot, piece) in &level.solution {
          assert_eq!(session.place(slot, piece), PlaceOutcome::Placed);
        }
      }
    }
  }

  #[test]
  fn double_submit_accrues_once() {
    let mut session = session_over(vec![sample_build_level()]);
    solve_current(&mut session);
    let total = session.submit().expect("scored").total;
    assert_eq!(session.total_score(), total);
    let again = session.submit().expect("cached").total;
    assert_eq!(again, total);
    assert_eq!(session.total_score(), total);
  }

  #[test]
  fn submit_requires_completeness_and_choice() {
    let mut level = sample_build_level();
    level.choice = Some(crate::domain::ChoiceStep {
      options: vec!["ubiquitous".into(), "event-driven".into()],
      correct: "event-driven".into(),
    });
    let mut session = session_over(vec![level]);
    assert!(!session.can_submit());
    assert!(session.submit().is_none());
    session.place("s1", "p1");
    session.place("s2", "p2");
    assert!(!session.can_submit()); // choice still missing
    assert!(session.select_choice("event-driven"));
    assert!(session.can_submit());
    assert!(session.submit().is_some());
  }

  #[test]
  fn hint_budget_resets_on_next_level_load() {
    let mut session = session_over(vec![sample_build_level(), sample_build_level2()]);
    assert_eq!(session.hints_remaining(), 3);
    assert!(session.use_hint().is_some());
    assert!(session.use_hint().is_some());
    assert_eq!(session.hints_remaining(), 1);
    solve_current(&mut session);
    session.submit().expect("scored");
    assert!(session.use_hint().is_none()); // locked after submit
    assert!(session.next_level());
    assert_eq!(session.hints_remaining(), 3);
  }

  #[test]
  fn next_level_is_refused_before_submission() {
    let mut session = session_over(vec![sample_build_level(), sample_build_level2()]);
    assert!(!session.next_level());
    solve_current(&mut session);
    session.submit().expect("scored");
    assert!(session.next_level());
    assert_eq!(session.level_index(), 1);
  }

  #[test]
  fn restart_resets_aggregates_but_not_the_catalog() {
    let mut session = session_over(seed_levels());
    solve_current(&mut session);
    session.submit().expect("scored");
    assert!(session.total_score() > 0);
    session.restart();
    assert_eq!(session.total_score(), 0);
    assert_eq!(session.total_stars(), 0);
    assert_eq!(session.level_index(), 0);
    assert!(session.summary().mastery.is_empty());
    assert_eq!(session.level_count(), 4);
  }

  #[test]
  fn mastery_accumulates_per_tag() {
    let mut session = session_over(vec![sample_build_level(), sample_build_level2()]);
    solve_current(&mut session);
    session.submit().expect("scored");
    session.next_level();
    solve_current(&mut session);
    session.submit().expect("scored");
    let summary = session.summary();
    assert_eq!(summary.mastery.len(), 2);
    let row = summary.mastery.iter().find(|r| r.tag == "event-driven").expect("tag row");
    assert_eq!(row.possible, 80); // choice 30 + 2 slots 20 + no-trap 20 + speed 10
    assert_eq!(row.pct, 100);
  }

  #[test]
  fn perfect_run_earns_three_session_stars() {
    let mut session = session_over(seed_levels());
    while !session.is_finished() {
      solve_current(&mut session);
      assert!(session.submit().expect("scored").perfect);
      session.next_level();
    }
    let summary = session.summary();
    assert_eq!(summary.score, summary.max_possible);
    assert_eq!(summary.stars, 3);
  }

  #[test]
  fn reset_level_clears_placements_until_submitted() {
    let mut session = session_over(vec![sample_build_level()]);
    session.place("s1", "p1");
    session.reset_level();
    assert!(session.store().placements().is_empty());
    solve_current(&mut session);
    session.submit().expect("scored");
    session.reset_level();
    assert!(!session.store().placements().is_empty()); // no-op after submit
  }

  fn sample_build_level2() -> Level {
    let mut level = sample_build_level();
    level.id = "test-2".into();
    level.tag = "state-driven".into();
    level
  }
}
