//! Scoring Engine: pure functions from (level, placements, choice, hints,
//! elapsed time) to an immutable score breakdown.
//!
//! The engine has no hidden state and never enforces single submission;
//! "at most one scored submission per level" is the session's invariant.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::ScoreWeights;
use crate::domain::{Level, LevelMode};
use crate::placement::PlacementStore;
use crate::util::percentage;

/// Per-slot (or per-issue / per-pick) correctness flag for highlighting.
#[derive(Clone, Debug, Serialize)]
pub struct Verdict {
  pub id: String,
  pub correct: bool,
}

/// A trap the player actually used, with the reason shown post-submit.
#[derive(Clone, Debug, Serialize)]
pub struct TrapHit {
  #[serde(rename = "pieceId")]
  pub piece_id: String,
  pub text: String,
  pub reason: String,
}

/// Immutable result of scoring one level submission.
#[derive(Clone, Debug, Serialize)]
pub struct ScoreResult {
  /// Choice-step points; negative when the wrong-choice penalty applies.
  pub choice_points: i64,
  /// Per-slot correctness points (fix rewards on inspect levels, the
  /// full-credit amount on select levels).
  pub slot_points: i64,
  /// No-trap + speed bonuses (completion bonus on inspect levels).
  pub bonus_points: i64,
  pub trap_penalty: i64,
  pub hint_penalty: i64,
  /// Grand total, floored at zero.
  pub total: u64,
  /// Maximum obtainable for this level under the same weights.
  pub max_possible: u64,
  pub stars: u8,
  /// Every scored unit was correct.
  pub perfect: bool,
  pub verdicts: Vec<Verdict>,
  pub traps: Vec<TrapHit>,
}

/// Maximum obtainable for a level under `weights`, hints aside. Star
/// percentages and mastery possible-totals both derive from this.
pub fn max_obtainable(level: &Level, weights: &ScoreWeights) -> u64 {
  let raw = match level.mode {
    LevelMode::Build => {
      let slots = level.fillable_slots().count() as i64;
      weights.choice_bonus
        + slots * weights.slot_reward
        + weights.no_trap_bonus
        + weights.speed_bonus
    }
    LevelMode::Inspect => {
      let issues = level.fillable_slots().count() as i64;
      issues * weights.fix_reward + weights.fix_complete_bonus
    }
    LevelMode::Select => weights.select_full_credit,
  };
  raw.max(0) as u64
}

/// Score one submission. Deterministic and pure: identical inputs yield an
/// identical result.
pub fn score(
  level: &Level,
  store: &PlacementStore,
  choice: Option<&str>,
  hints_used: u32,
  elapsed_secs: u64,
  weights: &ScoreWeights,
) -> ScoreResult {
  match level.mode {
    LevelMode::Build => score_build(level, store, choice, hints_used, elapsed_secs, weights),
    LevelMode::Inspect => score_inspect(level, store, hints_used, weights),
    LevelMode::Select => score_select(level, store, hints_used, weights),
  }
}

fn score_build(
  level: &Level,
  store: &PlacementStore,
  choice: Option<&str>,
  hints_used: u32,
  elapsed_secs: u64,
  weights: &ScoreWeights,
) -> ScoreResult {
  // A missing choice step counts as a guaranteed-correct, pre-selected one.
  let choice_points = match &level.choice {
    None => weights.choice_bonus,
    Some(step) if choice == Some(step.correct.as_str()) => weights.choice_bonus,
    Some(_) => -weights.wrong_choice_penalty,
  };

  let mut verdicts = Vec::new();
  let mut traps = Vec::new();
  let mut correct = 0usize;
  let fillable: Vec<_> = level.fillable_slots().collect();
  for slot in &fillable {
    let placed = store.piece_in(&slot.id);
    let ok = placed.is_some() && placed == level.solution.get(&slot.id).map(String::as_str);
    if ok {
      correct += 1;
    } else if let Some(piece) = placed.and_then(|id| level.piece(id)) {
      if piece.is_trap {
        traps.push(TrapHit {
          piece_id: piece.id.clone(),
          text: piece.text.clone(),
          reason: piece.reason.clone(),
        });
      }
    }
    verdicts.push(Verdict { id: slot.id.clone(), correct: ok });
  }

  let slot_points = correct as i64 * weights.slot_reward;
  let trap_penalty = traps.len() as i64 * weights.trap_penalty;
  let all_correct = correct == fillable.len();

  // "No traps used" is judged on final placements only: a trap placed and
  // later moved away does not forfeit the bonus.
  let mut bonus_points = 0;
  if all_correct && traps.is_empty() {
    bonus_points += weights.no_trap_bonus;
  }
  if all_correct && elapsed_secs < weights.speed_threshold_secs {
    bonus_points += weights.speed_bonus;
  }

  let hint_penalty = hints_used as i64 * weights.hint_cost;
  let total =
    (choice_points + slot_points + bonus_points - trap_penalty - hint_penalty).max(0) as u64;
  let max_possible = max_obtainable(level, weights);
  let perfect = all_correct && choice_points == weights.choice_bonus;

  ScoreResult {
    choice_points,
    slot_points,
    bonus_points,
    trap_penalty,
    hint_penalty,
    total,
    max_possible,
    stars: weights.level_stars.stars_for(percentage(total, max_possible)),
    perfect,
    verdicts,
    traps,
  }
}

fn score_inspect(
  level: &Level,
  store: &PlacementStore,
  hints_used: u32,
  weights: &ScoreWeights,
) -> ScoreResult {
  let mut verdicts = Vec::new();
  let mut traps = Vec::new();
  let mut fixed = 0usize;
  let issues: Vec<_> = level.fillable_slots().collect();
  for issue in &issues {
    let placed = store.piece_in(&issue.id).and_then(|id| level.piece(id));
    // A fix counts when the issue received any non-trap replacement.
    let ok = matches!(placed, Some(p) if !p.is_trap);
    if ok {
      fixed += 1;
    } else if let Some(piece) = placed {
      traps.push(TrapHit {
        piece_id: piece.id.clone(),
        text: piece.text.clone(),
        reason: piece.reason.clone(),
      });
    }
    verdicts.push(Verdict { id: issue.id.clone(), correct: ok });
  }

  let slot_points = fixed as i64 * weights.fix_reward;
  let all_fixed = fixed == issues.len();
  let bonus_points = if all_fixed { weights.fix_complete_bonus } else { 0 };
  let hint_penalty = hints_used as i64 * weights.hint_cost;
  let total = (slot_points + bonus_points - hint_penalty).max(0) as u64;
  let max_possible = max_obtainable(level, weights);

  ScoreResult {
    choice_points: 0,
    slot_points,
    bonus_points,
    trap_penalty: 0,
    hint_penalty,
    total,
    max_possible,
    stars: weights.level_stars.stars_for(percentage(total, max_possible)),
    perfect: all_fixed,
    verdicts,
    traps,
  }
}

fn score_select(
  level: &Level,
  store: &PlacementStore,
  hints_used: u32,
  weights: &ScoreWeights,
) -> ScoreResult {
  let want: HashSet<&str> = level.picks.iter().map(String::as_str).collect();
  let got: HashSet<&str> = store.picks().iter().map(String::as_str).collect();
  // Exact set equality, order irrelevant; no partial credit for subsets or
  // supersets.
  let exact = want == got;

  let mut verdicts: Vec<Verdict> = store
    .picks()
    .iter()
    .map(|id| Verdict { id: id.clone(), correct: want.contains(id.as_str()) })
    .collect();
  verdicts.sort_by(|a, b| a.id.cmp(&b.id));

  let traps = store
    .picks()
    .iter()
    .filter_map(|id| level.piece(id))
    .filter(|p| p.is_trap && !want.contains(p.id.as_str()))
    .map(|p| TrapHit { piece_id: p.id.clone(), text: p.text.clone(), reason: p.reason.clone() })
    .collect();

  let full = weights.select_full_credit;
  let earned = if !exact {
    0
  } else if hints_used > 0 {
    full / 2
  } else {
    full
  };
  let hint_penalty = if exact && hints_used > 0 { full - full / 2 } else { 0 };
  let total = earned.max(0) as u64;
  let max_possible = max_obtainable(level, weights);

  ScoreResult {
    choice_points: 0,
    slot_points: if exact { full } else { 0 },
    bonus_points: 0,
    trap_penalty: 0,
    hint_penalty,
    total,
    max_possible,
    stars: weights.level_stars.stars_for(percentage(total, max_possible)),
    perfect: exact,
    verdicts,
    traps,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{sample_build_level, Category, ChoiceStep, Level, LevelMode, Piece, Slot};

  fn four_slot_level() -> Level {
    // Choice step + 4 slots: max is 30 + 40 + 20 + 10 = 100.
    let mut level = sample_build_level();
    level.choice = Some(ChoiceStep {
      options: vec!["ubiquitous".into(), "event-driven".into(), "state-driven".into()],
      correct: "event-driven".into(),
    });
    level.slots.push(Slot {
      id: "s3".into(),
      accepts: Some(Category::System),
      label: "System".into(),
      hint: String::new(),
      prefilled: None,
    });
    level.slots.push(Slot {
      id: "s4".into(),
      accepts: Some(Category::Keyword),
      label: "Keyword".into(),
      hint: String::new(),
      prefilled: None,
    });
    level.pieces.push(Piece {
      id: "p4".into(),
      category: Category::System,
      text: "the door controller".into(),
      is_trap: false,
      reason: String::new(),
    });
    level.pieces.push(Piece {
      id: "p5".into(),
      category: Category::Keyword,
      text: "shall".into(),
      is_trap: false,
      reason: String::new(),
    });
    level.solution.insert("s3".into(), "p4".into());
    level.solution.insert("s4".into(), "p5".into());
    level
  }

  fn solve(level: &Level) -> PlacementStore {
    let mut store = PlacementStore::new();
    for (slot, piece) in &level.solution {
      assert_eq!(
        store.place(level, slot, piece),
        crate::placement::PlaceOutcome::Placed,
        "solution placement {slot} <- {piece}"
      );
    }
    store
  }

  #[test]
  fn perfect_play_yields_the_level_maximum() {
    let level = four_slot_level();
    let store = solve(&level);
    let w = ScoreWeights::default();
    let r = score(&level, &store, Some("event-driven"), 0, 10, &w);
    assert_eq!(r.total, 100);
    assert_eq!(r.max_possible, 100);
    assert_eq!(r.stars, 3);
    assert!(r.perfect);
    assert!(r.traps.is_empty());
  }

  #[test]
  fn star_rating_flips_at_the_91_percent_boundary() {
    // Hints bring a perfect 100-point run to 95 and 90, bracketing the
    // 91% three-star cutoff.
    let level = four_slot_level();
    let store = solve(&level);
    let w = ScoreWeights::default();
    let r = score(&level, &store, Some("event-driven"), 2, 10, &w);
    assert_eq!(r.total, 90);
    assert_eq!(r.stars, 2);
    let r = score(&level, &store, Some("event-driven"), 1, 10, &w);
    assert_eq!(r.total, 95);
    assert_eq!(r.stars, 3);
  }

  #[test]
  fn trap_forfeits_slot_points_bonus_and_charges_penalty() {
    // Three-slot scenario from the reference behavior: choice 30 + two
    // correct slots 20 + no bonuses - trap 10 = 40.
    let mut level = four_slot_level();
    level.slots.retain(|s| s.id != "s4");
    level.solution.remove("s4");
    let mut store = PlacementStore::new();
    store.place(&level, "s1", "p1");
    store.place(&level, "s3", "p4");
    store.place(&level, "s2", "p3"); // the trap, in place of p2
    let w = ScoreWeights::default();
    let r = score(&level, &store, Some("event-driven"), 0, 10, &w);
    assert_eq!(r.choice_points, 30);
    assert_eq!(r.slot_points, 20);
    assert_eq!(r.bonus_points, 0);
    assert_eq!(r.trap_penalty, 10);
    assert_eq!(r.total, 40);
    assert_eq!(r.traps.len(), 1);
    assert_eq!(r.traps[0].piece_id, "p3");
    assert!(!r.traps[0].reason.is_empty());
  }

  #[test]
  fn totals_never_go_negative() {
    let level = four_slot_level();
    let store = PlacementStore::new(); // nothing placed
    let mut w = ScoreWeights::default();
    w.wrong_choice_penalty = 20;
    let r = score(&level, &store, Some("ubiquitous"), 3, 120, &w);
    assert_eq!(r.total, 0);
    assert_eq!(r.choice_points, -20);
    assert_eq!(r.hint_penalty, 15);
  }

  #[test]
  fn speed_bonus_requires_all_slots_correct_and_time_under_threshold() {
    let level = four_slot_level();
    let store = solve(&level);
    let w = ScoreWeights::default();
    let slow = score(&level, &store, Some("event-driven"), 0, 60, &w);
    assert_eq!(slow.bonus_points, 20); // no-trap only; 60s is not < 60s
    assert_eq!(slow.total, 90);
    let mut partial = PlacementStore::new();
    partial.place(&level, "s1", "p1");
    let r = score(&level, &partial, Some("event-driven"), 0, 10, &w);
    assert_eq!(r.bonus_points, 0);
  }

  #[test]
  fn missing_choice_step_awards_the_bonus_automatically() {
    let mut level = four_slot_level();
    level.choice = None;
    let store = solve(&level);
    let w = ScoreWeights::default();
    let r = score(&level, &store, None, 0, 10, &w);
    assert_eq!(r.choice_points, 30);
    assert_eq!(r.total, 100);
  }

  #[test]
  fn inspect_mode_rewards_non_trap_fixes() {
    let mut level = sample_build_level();
    level.mode = LevelMode::Inspect;
    level.solution.clear();
    let w = ScoreWeights::default();

    let mut store = PlacementStore::new();
    store.place(&level, "s1", "p1");
    store.place(&level, "s2", "p3"); // trap fix
    let r = score(&level, &store, None, 0, 10, &w);
    assert_eq!(r.slot_points, 20);
    assert_eq!(r.bonus_points, 0);
    assert_eq!(r.trap_penalty, 0);
    assert_eq!(r.total, 20);
    assert!(!r.perfect);
    assert_eq!(r.traps.len(), 1);

    let mut store = PlacementStore::new();
    store.place(&level, "s1", "p1");
    store.place(&level, "s2", "p2");
    let r = score(&level, &store, None, 1, 10, &w);
    // 2 fixes * 20 + completion 20 - one hint 5.
    assert_eq!(r.total, 55);
    assert!(r.perfect);
    assert_eq!(r.max_possible, 60);
  }

  fn select_level() -> Level {
    Level {
      id: "sel-1".into(),
      mode: LevelMode::Select,
      tag: "constraint".into(),
      title: String::new(),
      scenario: String::new(),
      context: String::new(),
      template: String::new(),
      tip: String::new(),
      choice: None,
      slots: vec![],
      pieces: ["2", "5", "7", "9"]
        .iter()
        .map(|id| Piece {
          id: (*id).into(),
          category: Category::Technique,
          text: format!("card {id}"),
          is_trap: *id == "9",
          reason: if *id == "9" { "Sounds helpful, does nothing.".into() } else { String::new() },
        })
        .collect(),
      solution: Default::default(),
      picks: vec!["2".into(), "5".into(), "7".into()],
      explanation: String::new(),
    }
  }

  #[test]
  fn select_mode_is_exact_set_equality_with_no_partial_credit() {
    let level = select_level();
    let w = ScoreWeights::default();

    let mut store = PlacementStore::new();
    for id in ["2", "5", "7"] {
      store.toggle_pick(&level, id);
    }
    let r = score(&level, &store, None, 0, 10, &w);
    assert_eq!(r.total, 100);
    assert_eq!(r.stars, 3);
    assert!(r.perfect);

    let mut subset = PlacementStore::new();
    subset.toggle_pick(&level, "2");
    subset.toggle_pick(&level, "5");
    assert_eq!(score(&level, &subset, None, 0, 10, &w).total, 0);

    let mut superset = store.clone();
    superset.toggle_pick(&level, "9");
    let r = score(&level, &superset, None, 0, 10, &w);
    assert_eq!(r.total, 0);
    assert_eq!(r.traps.len(), 1);
  }

  #[test]
  fn select_mode_halves_full_credit_after_a_hint() {
    let level = select_level();
    let w = ScoreWeights::default();
    let mut store = PlacementStore::new();
    for id in ["2", "5", "7"] {
      store.toggle_pick(&level, id);
    }
    let r = score(&level, &store, None, 1, 10, &w);
    assert_eq!(r.total, 50);
    assert_eq!(r.hint_penalty, 50);
  }

  #[test]
  fn max_obtainable_tracks_mode_and_weights() {
    let w = ScoreWeights::default();
    assert_eq!(max_obtainable(&four_slot_level(), &w), 100);
    assert_eq!(max_obtainable(&select_level(), &w), 100);
    let mut inspect = sample_build_level();
    inspect.mode = LevelMode::Inspect;
    assert_eq!(max_obtainable(&inspect, &w), 60);
  }
}
