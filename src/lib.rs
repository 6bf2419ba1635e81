//! SIGNALCAST — scheduled trading-signal and sentiment digests
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod auth;
pub mod config;
pub mod engine;
pub mod providers;
pub mod publish;
pub mod types;
