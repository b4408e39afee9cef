//! Ball-by-ball cricket scoring.
//!
//! The scoring core ([`engine::reduce`] over [`models::Match`]) is pure and
//! synchronous. Persistence, configuration and the autosave worker sit around it.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod scorecard;
pub mod script;
pub mod validation;
pub mod workers;
