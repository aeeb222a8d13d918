//! # hem_core - Frame-Driven Match Statistics Engine
//!
//! Consumes a live stream of framed event records describing a two-competitor
//! platform-fighter match and derives per-competitor statistics as the match
//! is played.
//!
//! ## Features
//! - Fixed-size records and bounded logs, no allocation per frame
//! - Recovery, punish and combo string detection with tunable windows
//! - Per-stock summaries finalized at stock loss or match end
//! - Serializable match report for downstream tooling
//!
//! ## Usage
//! ```rust
//! use hem_core::{EngineConfig, MatchReport, StatsEngine};
//! use hem_core::decoder::{MatchResult, MatchSetup};
//!
//! let mut engine = StatsEngine::new(EngineConfig::default());
//! engine.process(&MatchSetup { stage_id: 31, ..Default::default() }.to_record());
//! engine.process(&MatchResult { win_condition: 1 }.to_record());
//!
//! if let Some(state) = engine.finished_match() {
//!     let report = MatchReport::from_state(state);
//!     assert_eq!(report.win_condition, Some(1));
//! }
//! ```

// Struct initialization pattern used intentionally in tests
#![cfg_attr(test, allow(clippy::field_reassign_with_default))]
// Fixed-size records are large by nature
#![allow(clippy::large_enum_variant)]

pub mod analysis;
pub mod bounded_log;
pub mod capture;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod ids;
pub mod input;
pub mod report;
pub mod snapshot;
pub mod stage;
pub mod stats;
pub mod tracker;
pub mod transport;

pub use bounded_log::BoundedLog;
pub use config::{EngineConfig, ThresholdsConfig};
pub use decoder::{decode, DecodedRecord, EventCode, EventRecord};
pub use engine::{DropReason, EngineDiagnostics, MatchPhase, MatchState, RecordOutcome, StatsEngine};
pub use error::{CaptureError, ConfigError, DecodeError};
pub use report::MatchReport;
pub use stage::{check_off_stage, Stage};
pub use stats::{
    ComboStringRecord, Competitor, CompetitorFlags, CompetitorStatistics, PunishRecord, RecoveryRecord,
    StockRecord,
};
pub use transport::{record_queue, RecordReceiver, RecordSender};
