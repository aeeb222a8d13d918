//! Match State Tracker
//!
//! Holds the current and previous snapshot of each competitor (a sliding
//! window of depth two) and the match's frame bookkeeping. Advances once per
//! accepted frame update.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::COMPETITOR_COUNT;
use crate::decoder::{FrameUpdate, MatchSetup};
use crate::snapshot::{CompetitorInfo, CompetitorSnapshot, MatchSnapshot};

/// Timing of one accepted frame update relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameStep {
    /// Frame counter carried by the update
    pub frame: u32,
    /// Frames elapsed since the last accepted update; zero for duplicates
    /// and regressions
    pub elapsed: u32,
    /// Frames skipped between the two updates
    pub gap: u32,
    /// False when the counter did not advance
    pub in_order: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MatchStateTracker {
    snapshot: MatchSnapshot,
    previous: [CompetitorSnapshot; COMPETITOR_COUNT],
    info: [CompetitorInfo; COMPETITOR_COUNT],
    primed: bool,
}

impl MatchStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new match.
    pub fn start(&mut self, setup: &MatchSetup) {
        self.snapshot = setup.initial_snapshot();
        self.previous = self.snapshot.competitors;
        self.info = setup.competitors;
        self.primed = false;
    }

    /// Install a new frame: current moves to previous, the update becomes
    /// current. The first update after `start` fills both generations so no
    /// detector sees a transition out of default values. An update whose
    /// counter does not advance leaves both generations as they are.
    pub fn advance(&mut self, update: &FrameUpdate) -> FrameStep {
        let last = self.snapshot.frame_counter;
        let frame = update.frame_counter;

        let step = if !self.primed {
            self.primed = true;
            self.previous = update.competitors;
            for (info, competitor) in self.info.iter_mut().zip(update.competitors.iter()) {
                if info.starting_stocks == 0 {
                    info.starting_stocks = competitor.stocks;
                }
            }
            let gap = frame.saturating_sub(last.saturating_add(1));
            FrameStep { frame, elapsed: 1, gap, in_order: true }
        } else if frame > last {
            self.previous = self.snapshot.competitors;
            FrameStep { frame, elapsed: frame - last, gap: frame - last - 1, in_order: true }
        } else {
            warn!(frame, last, "frame counter did not advance");
            return FrameStep { frame, elapsed: 0, gap: 0, in_order: false };
        };

        if step.gap > 0 {
            debug!(frame, gap = step.gap, "frames missed");
        }

        self.snapshot.competitors = update.competitors;
        self.snapshot.random_seed = update.random_seed;
        self.snapshot.frames_missed = self.snapshot.frames_missed.saturating_add(step.gap);
        self.snapshot.frame_counter = frame;
        step
    }

    pub fn finish(&mut self, win_condition: u8) {
        self.snapshot.win_condition = Some(win_condition);
    }

    pub fn snapshot(&self) -> &MatchSnapshot {
        &self.snapshot
    }

    pub fn current(&self, index: usize) -> &CompetitorSnapshot {
        &self.snapshot.competitors[index]
    }

    pub fn previous(&self, index: usize) -> &CompetitorSnapshot {
        &self.previous[index]
    }

    pub fn info(&self, index: usize) -> &CompetitorInfo {
        &self.info[index]
    }

    pub fn stage_id(&self) -> u16 {
        self.snapshot.stage_id
    }

    pub fn frame(&self) -> u32 {
        self.snapshot.frame_counter
    }

    /// True once at least one frame update has been installed.
    pub fn is_primed(&self) -> bool {
        self.primed
    }
}
