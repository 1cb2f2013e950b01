// src/services/mod.rs

pub mod results;
pub mod scoring;
pub mod test_session;

pub use results::ResultService;
pub use test_session::TestSessionService;
