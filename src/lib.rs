//! Triagectl — governance cockpit library.
//!
//! This library exposes the triage core (queue manager, deferred-commit
//! engine, session stats, offline-safe outbox) for integration testing and
//! programmatic use. The binary entrypoint is in `main.rs`.

// Many items are pub for use by integration tests, which are separate
// compilation units — suppress false dead_code warnings.
#![allow(dead_code)]

pub mod approval;
pub mod cli;
pub mod config;
pub mod notify;
pub mod outbox;
pub mod triage;
