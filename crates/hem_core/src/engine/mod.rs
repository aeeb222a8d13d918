//! # Statistics Engine
//!
//! Consumes event records one at a time and keeps the derived statistics of
//! the current match up to date.
//!
//! ## Record handling
//! - match-start: reset all state in place and install the initial snapshot
//! - frame-update: advance the tracker, then run every detector; a frame
//!   whose counter did not advance is counted and skipped
//! - match-end: flush open windows, finalize live stocks, freeze the state
//!
//! Records that fail to decode, or that arrive outside a match, are dropped
//! with a diagnostic and leave the state untouched.
//!
//! ## Usage
//! ```rust
//! use hem_core::config::EngineConfig;
//! use hem_core::decoder::{FrameUpdate, MatchResult, MatchSetup};
//! use hem_core::engine::{RecordOutcome, StatsEngine};
//!
//! let mut engine = StatsEngine::new(EngineConfig::default());
//! let mut setup = MatchSetup { stage_id: 32, ..Default::default() };
//! setup.competitors[0].starting_stocks = 4;
//! setup.competitors[1].starting_stocks = 4;
//!
//! assert_eq!(engine.process(&setup.to_record()), RecordOutcome::MatchStarted);
//! let frame = FrameUpdate { frame_counter: 1, ..Default::default() };
//! engine.process(&frame.to_record());
//! engine.process(&MatchResult { win_condition: 2 }.to_record());
//!
//! assert!(engine.finished_match().is_some());
//! ```


use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{self, FrameContext};
use crate::config::{EngineConfig, COMPETITOR_COUNT};
use crate::decoder::{decode, DecodedRecord, EventRecord, FrameUpdate, MatchResult, MatchSetup};
use crate::error::DecodeError;
use crate::snapshot::{opponent_of, CompetitorInfo, MatchSnapshot};
use crate::stats::{pair_mut, Competitor};
use crate::tracker::{FrameStep, MatchStateTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchPhase {
    /// No match-start seen yet
    Idle,
    InProgress,
    /// Match-end seen; frames are rejected until the next match-start
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    TransportFailure,
    Malformed(DecodeError),
    NoActiveMatch,
    MatchAlreadyEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    MatchStarted,
    FrameApplied(FrameStep),
    MatchEnded,
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EngineDiagnostics {
    pub records_processed: u64,
    pub transport_failures: u64,
    pub malformed_records: u64,
    pub out_of_order_frames: u64,
    /// Frames or match-ends outside an active match
    pub rejected_records: u64,
    /// Log writes lost to a full bounded log in the current match
    pub saturated_writes: u32,
}

/// Everything derived for one match.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    tracker: MatchStateTracker,
    competitors: [Competitor; COMPETITOR_COUNT],
}

impl MatchState {
    fn reset(&mut self, setup: &MatchSetup) {
        self.tracker.start(setup);
        for competitor in self.competitors.iter_mut() {
            competitor.reset();
        }
    }

    pub fn snapshot(&self) -> &MatchSnapshot {
        self.tracker.snapshot()
    }

    pub fn tracker(&self) -> &MatchStateTracker {
        &self.tracker
    }

    pub fn info(&self, index: usize) -> &CompetitorInfo {
        self.tracker.info(index)
    }

    pub fn competitor(&self, index: usize) -> &Competitor {
        &self.competitors[index]
    }

    pub fn competitors(&self) -> &[Competitor; COMPETITOR_COUNT] {
        &self.competitors
    }
}

pub struct StatsEngine {
    config: EngineConfig,
    phase: MatchPhase,
    state: Box<MatchState>,
    diagnostics: EngineDiagnostics,
}

impl StatsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            phase: MatchPhase::Idle,
            state: Box::default(),
            diagnostics: EngineDiagnostics::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// State of the current (or last) match, whatever its phase.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Finalized state, available between a match-end and the next
    /// match-start.
    pub fn finished_match(&self) -> Option<&MatchState> {
        (self.phase == MatchPhase::Finished).then_some(&*self.state)
    }

    pub fn diagnostics(&self) -> EngineDiagnostics {
        let saturated = self.state.competitors.iter().map(|c| c.stats.saturated_writes()).sum();
        EngineDiagnostics { saturated_writes: saturated, ..self.diagnostics }
    }

    /// Handle one record. Never fails: anything unusable is dropped.
    pub fn process(&mut self, record: &EventRecord) -> RecordOutcome {
        self.diagnostics.records_processed += 1;

        let decoded = match decode(record) {
            Ok(decoded) => decoded,
            Err(err) if err.is_malformed() => {
                self.diagnostics.malformed_records += 1;
                warn!(error = %err, "dropping malformed record");
                return RecordOutcome::Dropped(DropReason::Malformed(err));
            }
            Err(_) => {
                self.diagnostics.transport_failures += 1;
                warn!("dropping record: transport failure");
                return RecordOutcome::Dropped(DropReason::TransportFailure);
            }
        };

        match decoded {
            DecodedRecord::MatchStart(setup) => {
                self.start_match(&setup);
                RecordOutcome::MatchStarted
            }
            DecodedRecord::FrameUpdate(update) => match self.phase {
                MatchPhase::InProgress => RecordOutcome::FrameApplied(self.apply_frame(&update)),
                phase => self.reject(phase, "frame update"),
            },
            DecodedRecord::MatchEnd(result) => match self.phase {
                MatchPhase::InProgress => {
                    self.end_match(&result);
                    RecordOutcome::MatchEnded
                }
                phase => self.reject(phase, "match end"),
            },
        }
    }

    fn reject(&mut self, phase: MatchPhase, kind: &'static str) -> RecordOutcome {
        self.diagnostics.rejected_records += 1;
        let reason = match phase {
            MatchPhase::Finished => DropReason::MatchAlreadyEnded,
            _ => DropReason::NoActiveMatch,
        };
        warn!(kind, ?reason, "dropping record outside an active match");
        RecordOutcome::Dropped(reason)
    }

    fn start_match(&mut self, setup: &MatchSetup) {
        if self.phase == MatchPhase::InProgress {
            warn!(frame = self.state.tracker.frame(), "match start interrupts a match in progress");
        }
        self.state.reset(setup);
        self.phase = MatchPhase::InProgress;
        info!(
            stage = setup.stage_id,
            characters = ?[setup.competitors[0].character_id, setup.competitors[1].character_id],
            "match started"
        );
    }

    fn apply_frame(&mut self, update: &FrameUpdate) -> FrameStep {
        let MatchState { tracker, competitors } = &mut *self.state;
        let step = tracker.advance(update);
        if !step.in_order {
            self.diagnostics.out_of_order_frames += 1;
            return step;
        }

        let tracker = &*tracker;
        let contexts: [FrameContext<'_>; COMPETITOR_COUNT] = [0, 1].map(|index| {
            let opponent = opponent_of(index);
            FrameContext {
                step,
                stage_id: tracker.stage_id(),
                thresholds: &self.config.thresholds,
                index,
                me_prev: tracker.previous(index),
                me_cur: tracker.current(index),
                opp_prev: tracker.previous(opponent),
                opp_cur: tracker.current(opponent),
            }
        });

        for ctx in &contexts {
            analysis::counters::update(ctx, &mut competitors[ctx.index]);
        }
        for ctx in &contexts {
            let (me, opp) = pair_mut(competitors, ctx.index);
            analysis::recovery::update(ctx, me, opp);
        }
        for ctx in &contexts {
            analysis::punish::update(ctx, &mut competitors[ctx.index]);
        }
        for ctx in &contexts {
            let (me, opp) = pair_mut(competitors, ctx.index);
            analysis::combo::update(ctx, me, opp);
        }
        for ctx in &contexts {
            analysis::stock::update(ctx, tracker.info(ctx.index), &mut competitors[ctx.index]);
        }

        step
    }

    fn end_match(&mut self, result: &MatchResult) {
        let MatchState { tracker, competitors } = &mut *self.state;
        let frame = tracker.frame();

        if tracker.is_primed() {
            for index in 0..COMPETITOR_COUNT {
                let opp_percent = tracker.current(opponent_of(index)).percent;
                let (me, opp) = pair_mut(competitors, index);
                analysis::recovery::flush(index, me, opp);
                analysis::punish::flush(index, frame, opp_percent, me);
                analysis::combo::flush(index, frame, opp_percent, me, opp);
            }
            for (index, competitor) in competitors.iter_mut().enumerate() {
                analysis::stock::finalize_live_stock(index, frame, tracker.info(index), tracker.current(index), competitor);
            }
        } else {
            debug!("match ended before any frame update");
        }

        tracker.finish(result.win_condition);
        self.phase = MatchPhase::Finished;
        info!(
            frame,
            win_condition = result.win_condition,
            frames_missed = tracker.snapshot().frames_missed,
            "match ended"
        );
    }
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
