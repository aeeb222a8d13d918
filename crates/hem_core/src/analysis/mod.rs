//! # Per-frame detectors
//!
//! Every accepted frame update runs, for each competitor in turn:
//!
//! 1. `counters` - duration and edge-triggered counters
//! 2. `recovery` - off-stage excursions
//! 3. `punish` - confirmed-hit windows
//! 4. `combo` - damage strings
//! 5. `stock` - stock finalization
//!
//! A stock loss forces recovery, punish and combo windows to resolve before
//! the stock record is written, so the records of the dying stock are
//! complete when it is finalized.

pub mod combo;
pub mod counters;
pub mod punish;
pub mod recovery;
pub mod stock;

use crate::config::ThresholdsConfig;
use crate::snapshot::CompetitorSnapshot;
use crate::tracker::FrameStep;

/// Everything a detector may read for one competitor on one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub step: FrameStep,
    pub stage_id: u16,
    pub thresholds: &'a ThresholdsConfig,
    /// Index of the competitor being analysed
    pub index: usize,
    pub me_prev: &'a CompetitorSnapshot,
    pub me_cur: &'a CompetitorSnapshot,
    pub opp_prev: &'a CompetitorSnapshot,
    pub opp_cur: &'a CompetitorSnapshot,
}

impl FrameContext<'_> {
    pub fn frame(&self) -> u32 {
        self.step.frame
    }

    pub fn elapsed(&self) -> u32 {
        self.step.elapsed
    }

    pub fn lost_stock(&self) -> bool {
        self.me_cur.stocks < self.me_prev.stocks
    }

    pub fn opponent_lost_stock(&self) -> bool {
        self.opp_cur.stocks < self.opp_prev.stocks
    }

    /// Opponent took damage this frame.
    pub fn opponent_damaged(&self) -> bool {
        self.opp_cur.percent > self.opp_prev.percent
    }
}
