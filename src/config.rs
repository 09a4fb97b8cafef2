//! Loading game configuration (scoring weights + catalog location) from TOML.
//!
//! See `GameConfig` and `ScoreWeights` for the expected schema. Every weight
//! has a default matching the reference games, so an empty or absent config
//! file yields a fully playable service.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub weights: ScoreWeights,
  /// Optional path to a JSON level catalog; CATALOG_PATH overrides it.
  #[serde(default)]
  pub catalog_path: Option<String>,
}

/// Scoring weights shared by every level. Override any subset in TOML; the
/// rest keep their defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
  /// Awarded for a correct (or pre-selected) choice step.
  pub choice_bonus: i64,
  /// Charged for an explicit wrong choice. The reference games disagree on
  /// this one; 0 keeps the lenient behavior, set 20 for the strict variant.
  pub wrong_choice_penalty: i64,
  pub slot_reward: i64,
  pub trap_penalty: i64,
  /// Requires every slot correct and no trap among the final placements.
  pub no_trap_bonus: i64,
  pub speed_bonus: i64,
  pub speed_threshold_secs: u64,
  /// Per consumed hint, deducted at scoring time.
  pub hint_cost: i64,
  /// Inspect mode: per correctly-fixed issue.
  pub fix_reward: i64,
  /// Inspect mode: when every issue is fixed correctly.
  pub fix_complete_bonus: i64,
  /// Select mode: exact set match; halved when a hint was used.
  pub select_full_credit: i64,
  pub hint_budget: u32,
  pub select_hint_budget: u32,
  pub level_stars: StarThresholds,
  pub session_stars: StarThresholds,
}

/// Percentage cutoffs for 3/2/1 stars. The per-level and session-end tables
/// are distinct on purpose; the games never agreed on a single one.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StarThresholds {
  pub three: u32,
  pub two: u32,
  pub one: u32,
}

impl StarThresholds {
  pub fn stars_for(&self, pct: u32) -> u8 {
    if pct >= self.three {
      3
    } else if pct >= self.two {
      2
    } else if pct >= self.one {
      1
    } else {
      0
    }
  }
}

impl Default for ScoreWeights {
  fn default() -> Self {
    Self {
      choice_bonus: 30,
      wrong_choice_penalty: 0,
      slot_reward: 10,
      trap_penalty: 10,
      no_trap_bonus: 20,
      speed_bonus: 10,
      speed_threshold_secs: 60,
      hint_cost: 5,
      fix_reward: 20,
      fix_complete_bonus: 20,
      select_full_credit: 100,
      hint_budget: 3,
      select_hint_budget: 1,
      level_stars: StarThresholds { three: 91, two: 76, one: 60 },
      session_stars: StarThresholds { three: 90, two: 75, one: 50 },
    }
  }
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO
/// error, returns None and the defaults apply.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "skillforge_backend", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "skillforge_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "skillforge_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
