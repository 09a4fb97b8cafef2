//! Level Catalog: the ordered level list loaded once per process.
//!
//! Loading is fail-fast: a missing file, broken JSON, or any invariant
//! violation aborts startup with a single reported error. There is no
//! partial or degraded catalog.

use std::collections::HashSet;

use tracing::info;

use crate::config::ScoreWeights;
use crate::domain::Level;
use crate::scoring::max_obtainable;

#[derive(Clone, Debug)]
pub struct Catalog {
  pub levels: Vec<Level>,
}

impl Catalog {
  /// Validate and wrap an ordered level list.
  pub fn from_levels(levels: Vec<Level>) -> Result<Self, String> {
    if levels.is_empty() {
      return Err("catalog is empty".into());
    }
    let mut ids = HashSet::new();
    for level in &levels {
      if !ids.insert(level.id.as_str()) {
        return Err(format!("duplicate level id '{}'", level.id));
      }
      level.validate()?;
    }
    Ok(Self { levels })
  }

  pub fn len(&self) -> usize {
    self.levels.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.levels.is_empty()
  }

  pub fn level(&self, index: usize) -> Option<&Level> {
    self.levels.get(index)
  }

  /// Catalog-wide maximum under `weights`; the session-end star rating is a
  /// percentage of this.
  pub fn max_obtainable(&self, weights: &ScoreWeights) -> u64 {
    self.levels.iter().map(|l| max_obtainable(l, weights)).sum()
  }
}

/// Load a catalog from a JSON file (an array of levels, the same shape the
/// browser games fetch). Errors are fatal to startup by design.
pub fn load_catalog_from_path(path: &str) -> Result<Catalog, String> {
  let raw = std::fs::read_to_string(path)
    .map_err(|e| format!("failed to read catalog file '{path}': {e}"))?;
  let levels: Vec<Level> = serde_json::from_str(&raw)
    .map_err(|e| format!("failed to parse catalog file '{path}': {e}"))?;
  let catalog = Catalog::from_levels(levels)?;
  info!(target: "game", %path, levels = catalog.len(), "Loaded level catalog");
  Ok(catalog)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::sample_build_level;

  #[test]
  fn rejects_duplicate_level_ids() {
    let a = sample_build_level();
    let b = sample_build_level();
    let err = Catalog::from_levels(vec![a, b]).unwrap_err();
    assert!(err.contains("duplicate level id"));
  }

  #[test]
  fn rejects_an_empty_catalog() {
    assert!(Catalog::from_levels(vec![]).is_err());
  }

  #[test]
  fn propagates_level_validation_errors() {
    let mut bad = sample_build_level();
    bad.solution.insert("ghost".into(), "p1".into());
    let err = Catalog::from_levels(vec![bad]).unwrap_err();
    assert!(err.contains("unknown slot"));
  }

  #[test]
  fn parses_a_json_level_array() {
    let json = r#"[{
      "id": "lv-1",
      "mode": "build",
      "tag": "event-driven",
      "slots": [{ "id": "s1", "accepts": "trigger", "label": "Trigger" }],
      "pieces": [{ "id": "p1", "category": "trigger", "text": "WHEN armed" }],
      "solution": { "s1": "p1" }
    }]"#;
    let levels: Vec<crate::domain::Level> = serde_json::from_str(json).expect("parse");
    let catalog = Catalog::from_levels(levels).expect("valid");
    assert_eq!(catalog.len(), 1);
  }

  #[test]
  fn unknown_categories_fail_at_parse_time() {
    let json = r#"[{
      "id": "lv-1",
      "mode": "build",
      "tag": "event-driven",
      "pieces": [{ "id": "p1", "category": "gizmo", "text": "?" }]
    }]"#;
    assert!(serde_json::from_str::<Vec<crate::domain::Level>>(json).is_err());
  }
}
