//! # lampctl-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LightTransport`: discovery, control and state reports for lights
//!   - `SnapshotStore`: load & save persisted bulb-state snapshots
//! - Define **driving/inbound ports** as use-case structs:
//!   - `CommandService`: compile a command line and run it, one run at a time
//!   - `SnapshotService`: read-modify-write access to named snapshots
//! - Run the **state query protocol** (bounded retries over an async channel)
//! - **Orchestrate** one command across an open-ended set of discovered devices
//!   (`Orchestrator`) with per-verb **effects**
//!
//! ## Dependency rule
//! Depends on `lampctl-domain` only (plus `tokio` for tasks, channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod effects;
pub mod orchestrator;
pub mod ports;
pub mod query;
pub mod report;
pub mod services;
