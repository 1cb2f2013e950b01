// src/store/mod.rs

//! Persistence seams used by the test services.
//!
//! Each store is a trait so services can be driven by the SQLite
//! implementations in production and by in-memory doubles in tests.

pub mod question_store;
pub mod result_store;
pub mod seed;
pub mod session_store;

pub use question_store::{QuestionStore, SqlQuestionStore};
pub use result_store::{ResultStore, SqlResultStore};
pub use session_store::{MemorySessionStore, SessionStore, SqlSessionStore};
