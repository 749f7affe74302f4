//! Personal productivity dashboard API.
//!
//! Five collections (tasks, ideas, drafts, notes, learnings) are each stored
//! as one JSON document in a data directory and served over a small REST API.
//! A polling client keeps a local snapshot of a collection fresh.

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod service;
pub mod store;
