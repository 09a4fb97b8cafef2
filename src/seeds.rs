//! Seed data: a small built-in catalog so the service is playable without
//! any external level file. One level per mode, content distilled from the
//! requirement-writing curriculum the games teach.

use crate::domain::{Category, ChoiceStep, Level, LevelMode, Piece, Slot};

fn piece(id: &str, category: Category, text: &str) -> Piece {
  Piece { id: id.into(), category, text: text.into(), is_trap: false, reason: String::new() }
}

fn trap(id: &str, category: Category, text: &str, reason: &str) -> Piece {
  Piece { id: id.into(), category, text: text.into(), is_trap: true, reason: reason.into() }
}

fn slot(id: &str, accepts: Category, label: &str) -> Slot {
  Slot { id: id.into(), accepts: Some(accepts), label: label.into(), hint: String::new(), prefilled: None }
}

/// Built-in levels, in play order.
pub fn seed_levels() -> Vec<Level> {
  vec![guided_door_lock(), detective_battery(), inspector_vague_req(), select_prompt_cards()]
}

/// Guided build: the pattern is pre-selected, every slot labelled.
fn guided_door_lock() -> Level {
  Level {
    id: "seed-build-1".into(),
    mode: LevelMode::Build,
    tag: "event-driven".into(),
    title: "Smart Door Lock".into(),
    scenario: "The lock must react the moment a valid keycard is presented.".into(),
    context: "An office door controller with badge readers on both sides.".into(),
    template: "WHEN {s1}, the {s2} shall {s3}".into(),
    tip: "A single moment in time sets this behavior off.".into(),
    choice: None,
    slots: vec![
      slot("s1", Category::Trigger, "Trigger"),
      slot("s2", Category::System, "System"),
      slot("s3", Category::Action, "Action"),
    ],
    pieces: vec![
      piece("p1", Category::Trigger, "a valid keycard is presented"),
      piece("p2", Category::System, "door lock controller"),
      piece("p3", Category::Action, "release the latch within 500 ms"),
      trap(
        "p4",
        Category::Action,
        "open quickly",
        "\"Quickly\" is not measurable; a requirement needs a concrete bound.",
      ),
      trap(
        "p5",
        Category::Trigger,
        "someone wants to come in",
        "Intent is not observable; the trigger must be a detectable event.",
      ),
    ],
    solution: [
      ("s1".to_string(), "p1".to_string()),
      ("s2".to_string(), "p2".to_string()),
      ("s3".to_string(), "p3".to_string()),
    ]
    .into_iter()
    .collect(),
    picks: vec![],
    explanation: "An event-driven requirement names one detectable trigger, the responding \
                  system, and a bounded action."
      .into(),
  }
}

/// Detective build: pick the pattern first, then fill four slots.
fn detective_battery() -> Level {
  Level {
    id: "seed-build-2".into(),
    mode: LevelMode::Build,
    tag: "state-driven".into(),
    title: "Low Battery Mode".into(),
    scenario: "Behavior that continues for as long as the battery stays low.".into(),
    context: "A handheld scanner that dims its display to save power.".into(),
    template: "{s1} {s2}, the {s3} shall {s4}".into(),
    tip: "Ask whether the behavior persists while something remains true.".into(),
    choice: Some(ChoiceStep {
      options: vec![
        "ubiquitous".into(),
        "event-driven".into(),
        "state-driven".into(),
        "unwanted-behavior".into(),
      ],
      correct: "state-driven".into(),
    }),
    slots: vec![
      slot("s1", Category::Keyword, "Keyword"),
      slot("s2", Category::Condition, "State"),
      slot("s3", Category::System, "System"),
      slot("s4", Category::Action, "Action"),
    ],
    pieces: vec![
      piece("p1", Category::Keyword, "WHILE"),
      piece("p2", Category::Condition, "the battery level is below 15%"),
      piece("p3", Category::System, "scanner"),
      piece("p4", Category::Action, "dim the display to 40% brightness"),
      trap(
        "p5",
        Category::Keyword,
        "IF",
        "IF introduces unwanted-behavior handling, not an ongoing state.",
      ),
      trap(
        "p6",
        Category::Condition,
        "the user feels the battery is low",
        "Feelings are not a system state; use a measurable threshold.",
      ),
    ],
    solution: [
      ("s1".to_string(), "p1".to_string()),
      ("s2".to_string(), "p2".to_string()),
      ("s3".to_string(), "p3".to_string()),
      ("s4".to_string(), "p4".to_string()),
    ]
    .into_iter()
    .collect(),
    picks: vec![],
    explanation: "WHILE marks a state-driven requirement: the dimming holds exactly as long as \
                  the low-battery state does."
      .into(),
  }
}

/// Inspector: two flawed fragments of a written requirement need sound
/// replacements; the rest of the sentence is fixed.
fn inspector_vague_req() -> Level {
  Level {
    id: "seed-inspect-1".into(),
    mode: LevelMode::Inspect,
    tag: "unwanted-behavior".into(),
    title: "Overheating Pump".into(),
    scenario: "Repair a requirement that hides its fault condition behind vague wording.".into(),
    context: "IF the coolant pump overheats, THEN the controller shall react somehow.".into(),
    template: "IF {s1}, THEN the {s2} shall {s3}".into(),
    tip: String::new(),
    choice: None,
    slots: vec![
      Slot {
        id: "s1".into(),
        accepts: Some(Category::Condition),
        label: "Fault condition".into(),
        hint: "\"Overheats\" has no threshold a test could check.".into(),
        prefilled: None,
      },
      Slot {
        id: "s2".into(),
        accepts: Some(Category::System),
        label: "System".into(),
        hint: String::new(),
        prefilled: Some("pump controller".into()),
      },
      Slot {
        id: "s3".into(),
        accepts: Some(Category::Action),
        label: "Response".into(),
        hint: "\"React somehow\" names no verifiable response.".into(),
        prefilled: None,
      },
    ],
    pieces: vec![
      piece("p1", Category::Condition, "the coolant temperature exceeds 90 °C"),
      piece("p2", Category::Action, "shut the pump down and raise the overheat alarm"),
      trap(
        "p3",
        Category::Condition,
        "the pump seems too hot",
        "\"Seems\" is an opinion; a fault condition needs a sensor threshold.",
      ),
      trap(
        "p4",
        Category::Action,
        "handle the situation appropriately",
        "Still names no observable response; nothing to verify.",
      ),
    ],
    solution: [("s1".to_string(), "p1".to_string()), ("s3".to_string(), "p2".to_string())]
      .into_iter()
      .collect(),
    picks: vec![],
    explanation: "Unwanted-behavior requirements pair a measurable fault condition with a \
                  response a test can observe."
      .into(),
  }
}

/// Select: pick exactly the prompt-improvement cards that serve the brief.
fn select_prompt_cards() -> Level {
  Level {
    id: "seed-select-1".into(),
    mode: LevelMode::Select,
    tag: "constraint".into(),
    title: "Tighten the Prompt".into(),
    scenario: "Turn \"write about our product\" into a prompt that yields a usable launch blurb."
      .into(),
    context: String::new(),
    template: String::new(),
    tip: "Keep only the cards that narrow the output.".into(),
    choice: None,
    slots: vec![],
    pieces: vec![
      piece("c1", Category::Technique, "You are a product marketer for developer tools."),
      piece("c2", Category::Technique, "Keep it under 80 words."),
      piece("c3", Category::Technique, "Address engineering team leads."),
      trap(
        "c4",
        Category::Technique,
        "Make it really good and creative.",
        "Adds no constraint the model can act on.",
      ),
      trap(
        "c5",
        Category::Technique,
        "Use plenty of exclamation marks!",
        "A style demand that fights the audience, not a useful constraint.",
      ),
    ],
    solution: Default::default(),
    picks: vec!["c1".into(), "c2".into(), "c3".into()],
    explanation: "Role, length bound, and audience each narrow the space of outputs; the other \
                  cards only sound helpful."
      .into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;

  #[test]
  fn seed_levels_pass_catalog_validation() {
    let catalog = Catalog::from_levels(seed_levels()).expect("seed levels valid");
    assert_eq!(catalog.len(), 4);
  }

  #[test]
  fn seed_catalog_covers_every_mode() {
    let levels = seed_levels();
    assert!(levels.iter().any(|l| l.mode == LevelMode::Build && l.choice.is_some()));
    assert!(levels.iter().any(|l| l.mode == LevelMode::Build && l.choice.is_none()));
    assert!(levels.iter().any(|l| l.mode == LevelMode::Inspect));
    assert!(levels.iter().any(|l| l.mode == LevelMode::Select));
  }
}
