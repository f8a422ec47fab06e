//! Skill matching and ranking engine.
//!
//! Scores how well a candidate's evidenced skills cover a job's required
//! skills (exact and embedding-based matches), ranks candidates for a job or
//! jobs for a candidate, and aligns free-text skills onto a canonical
//! vocabulary. Everything under [`matching`] and [`alignment`] is callable
//! in-process; [`routes`] exposes the same operations over HTTP.

pub mod alignment;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod errors;
pub mod matching;
pub mod models;
pub mod routes;
pub mod skills;
pub mod state;
