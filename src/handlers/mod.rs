// src/handlers/mod.rs

pub mod auth;
pub mod results;
pub mod test_session;
