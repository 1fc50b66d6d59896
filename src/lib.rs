//! BACBO — Bac Bo round simulator, trend signal and auto-bet engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod strategy;
pub mod vision;
pub mod storage;
pub mod dashboard;
