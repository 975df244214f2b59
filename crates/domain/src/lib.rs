//! # lampctl-domain
//!
//! Pure domain model for the lampctl light command system.
//!
//! ## Responsibilities
//! - Foundational types: device identifiers, error conventions, timestamps
//! - Compile free-form **commands** (`much darker kitchen`, `save entrance to evening`)
//!   into typed [`Command`](command::Command) values
//! - Resolve **colors** (CSS names, RGB triples) into 16-bit HSV
//! - Model **target sets** and their canonical persistence keys
//! - Model **bulb state** and the per-verb **plans** that turn a current state
//!   into light commands
//! - Model persisted **snapshots** of bulb states
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod color;
pub mod command;
pub mod light;
pub mod plan;
pub mod snapshot;
pub mod target;
pub mod tuning;
