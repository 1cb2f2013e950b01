// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    config::{Config, SessionBackend},
    services::{ResultService, TestSessionService},
    store::{
        MemorySessionStore, QuestionStore, ResultStore, SessionStore, SqlQuestionStore,
        SqlResultStore, SqlSessionStore,
    },
    utils::{
        clock::SystemClock,
        shuffle::{SeededShuffler, Shuffler, ThreadRngShuffler},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub tests: Arc<TestSessionService>,
    pub results: Arc<ResultService>,
}

impl AppState {
    /// Wires the stores and services selected by `config` on top of `pool`.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let ttl = config
            .session_ttl_secs
            .map(|secs| chrono::Duration::seconds(secs as i64));

        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Memory => Arc::new(MemorySessionStore::new(ttl)),
            SessionBackend::Database => Arc::new(SqlSessionStore::new(pool.clone(), ttl)),
        };

        let shuffler: Arc<dyn Shuffler> = match config.shuffle_seed {
            Some(seed) => {
                tracing::warn!("Question order is seeded ({}); tests are reproducible", seed);
                Arc::new(SeededShuffler::new(seed))
            }
            None => Arc::new(ThreadRngShuffler),
        };

        let questions: Arc<dyn QuestionStore> = Arc::new(SqlQuestionStore::new(pool.clone()));
        let results: Arc<dyn ResultStore> = Arc::new(SqlResultStore::new(pool.clone()));

        let tests = TestSessionService::new(
            questions.clone(),
            results.clone(),
            sessions,
            shuffler,
            Arc::new(SystemClock),
        );

        Self {
            pool,
            config,
            tests: Arc::new(tests),
            results: Arc::new(ResultService::new(results, questions)),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<TestSessionService> {
    fn from_ref(state: &AppState) -> Self {
        state.tests.clone()
    }
}

impl FromRef<AppState> for Arc<ResultService> {
    fn from_ref(state: &AppState) -> Self {
        state.results.clone()
    }
}
