//! # ChatCal Bot
//!
//! Host process for the triage engine.
//!
//! This crate contains:
//! - Application context (dependency wiring and shutdown)
//! - The stdin ingest loop standing in for the chat transport
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Composes the ports with their infra implementations

pub mod context;
pub mod ingest;

pub use context::AppContext;
pub use ingest::{parse_line, run_ingest, IngestStats, InboundLine};
