//! Application state: the validated level catalog, scoring weights, and the
//! live session store.
//!
//! The catalog is loaded exactly once at startup. A set-but-broken
//! CATALOG_PATH aborts the process: a session over a partial catalog is
//! worse than no service at all.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::{load_catalog_from_path, Catalog};
use crate::config::{load_game_config_from_env, ScoreWeights};
use crate::domain::LevelMode;
use crate::seeds::seed_levels;
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub weights: ScoreWeights,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl AppState {
    /// Build state from env: load config, load or seed the catalog, start
    /// with an empty session store.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self, String> {
        let cfg = load_game_config_from_env().unwrap_or_default();
        let weights = cfg.weights.clone();

        let catalog_path = std::env::var("CATALOG_PATH").ok().or(cfg.catalog_path);
        let catalog = match catalog_path {
            Some(path) => load_catalog_from_path(&path)?,
            None => {
                info!(target: "game", "CATALOG_PATH not set; using built-in seed levels");
                Catalog::from_levels(seed_levels())?
            }
        };

        // Inventory summary by mode.
        let (mut build, mut inspect, mut select) = (0usize, 0usize, 0usize);
        for level in &catalog.levels {
            match level.mode {
                LevelMode::Build => build += 1,
                LevelMode::Inspect => inspect += 1,
                LevelMode::Select => select += 1,
            }
        }
        info!(
            target: "game",
            levels = catalog.len(),
            build,
            inspect,
            select,
            max_score = catalog.max_obtainable(&weights),
            "Startup level inventory"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            weights,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// State over an explicit catalog; used by tests and embedding callers.
    #[allow(dead_code)]
    pub fn with_catalog(catalog: Catalog, weights: ScoreWeights) -> Self {
        Self {
            catalog: Arc::new(catalog),
            weights,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a session and return its id.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), self.catalog.clone(), self.weights.clone());
        self.sessions.write().await.insert(id.clone(), session);
        info!(target: "game", session = %id, "Session created");
        id
    }

    /// Run `f` against a session under the write lock. `None` for unknown
    /// ids; the caller turns that into a protocol error.
    pub async fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::seed_levels;

    #[tokio::test]
    async fn sessions_are_isolated_by_id() {
        let state = AppState::with_catalog(
            Catalog::from_levels(seed_levels()).expect("catalog"),
            ScoreWeights::default(),
        );
        let a = state.create_session().await;
        let b = state.create_session().await;
        assert_ne!(a, b);

        state.with_session(&a, |s| s.place("s1", "p1")).await.expect("known session");
        let a_placed = state
            .with_session(&a, |s| s.store().placements().len())
            .await
            .expect("known session");
        let b_placed = state
            .with_session(&b, |s| s.store().placements().len())
            .await
            .expect("known session");
        assert_eq!(a_placed, 1);
        assert_eq!(b_placed, 0);
        assert!(state.with_session("ghost", |_| ()).await.is_none());
    }
}
