//! ralph - autonomous iterative-development loop driver for AI assistant CLIs.
//!
//! This crate is the thin, swappable adapter layer (CLI parsing, config
//! discovery) around the core crates under `crates/`: `ralph-engine` owns
//! the loop, `ralph-state` the durable model, `ralph-scheduler` and
//! `ralph-counter` the ordering and verification rules.

pub mod cli;
pub mod config;
