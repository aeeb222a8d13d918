//! Per-competitor statistics and detector state.
//!
//! [`CompetitorStatistics`] is what the report exporter receives at match
//! end. [`CompetitorFlags`] is transient derivation state and never leaves
//! the engine.

use serde::{Serialize, Serializer};

use crate::bounded_log::BoundedLog;
use crate::config::{COMBO_STRING_CAPACITY, PUNISH_CAPACITY, RECOVERY_CAPACITY, STOCK_COUNT};
use crate::ids::INTERNAL_CHARACTER_COUNT;

// ============================================================================
// Exported records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RecoveryRecord {
    pub frame_start: u32,
    pub frame_end: u32,
    pub percent_start: f32,
    pub percent_end: f32,
    pub is_successful: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PunishRecord {
    pub frame_start: u32,
    pub frame_end: u32,
    pub percent_start: f32,
    pub percent_end: f32,
    pub hit_count: u16,
    pub is_kill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ComboStringRecord {
    pub frame_start: u32,
    pub frame_end: u32,
    pub percent_start: f32,
    pub percent_end: f32,
    pub hit_count: u16,
}

impl ComboStringRecord {
    pub fn damage(&self) -> f32 {
        self.percent_end - self.percent_start
    }

    pub fn frames(&self) -> u32 {
        self.frame_end.saturating_sub(self.frame_start)
    }
}

/// Summary of one stock. Slot `i` describes the `i`-th stock played.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StockRecord {
    pub frame_start: u32,
    pub frame_end: u32,
    /// Damage carried when the stock ended
    pub percent: f32,
    pub last_hit_by: u8,
    pub last_animation: u16,
    /// Combo strings the opponent needed to take this stock
    pub killed_in_openings: u16,
    pub is_stock_used: bool,
    pub is_stock_lost: bool,
}

pub type RecoveryLog = BoundedLog<RecoveryRecord, RECOVERY_CAPACITY>;
pub type PunishLog = BoundedLog<PunishRecord, PUNISH_CAPACITY>;
pub type ComboStringLog = BoundedLog<ComboStringRecord, COMBO_STRING_CAPACITY>;

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorStatistics {
    /// Frames spent as each internal character (Sheik/Zelda transforms)
    #[serde(serialize_with = "serialize_slice")]
    pub internal_character_frames: [u32; INTERNAL_CHARACTER_COUNT],

    // Positional
    pub frames_above_opponent: u32,
    pub frames_closest_center: u32,
    pub average_distance_from_center: f32,
    /// Frames folded into the running mean
    pub distance_samples: u32,

    // Defensive
    pub frames_in_shield: u32,
    pub most_frames_without_damage: u32,
    pub roll_count: u32,
    pub spot_dodge_count: u32,
    pub air_dodge_count: u32,
    pub tech_miss_count: u32,
    pub tech_in_place_count: u32,
    pub tech_forward_count: u32,
    pub tech_backward_count: u32,
    pub tech_surface_count: u32,

    // Activity
    /// Animation changes
    pub action_count: u32,
    /// Button presses, stick region changes and trigger presses
    pub input_count: u32,

    // Recovery / edgeguarding
    pub recovery_attempts: u32,
    pub successful_recoveries: u32,
    pub edgeguard_chances: u32,
    pub edgeguard_conversions: u32,

    // Combo strings
    pub number_of_openings: u32,
    pub total_string_damage: f32,
    pub total_string_frames: u64,
    pub total_string_hits: u32,
    pub most_damage_string: f32,
    pub most_frames_string: u32,
    pub most_hits_string: u16,

    pub stocks: [StockRecord; STOCK_COUNT],
    pub combo_strings: ComboStringLog,
    pub recoveries: RecoveryLog,
    pub punishes: PunishLog,
}

impl Default for CompetitorStatistics {
    fn default() -> Self {
        Self {
            internal_character_frames: [0; INTERNAL_CHARACTER_COUNT],
            frames_above_opponent: 0,
            frames_closest_center: 0,
            average_distance_from_center: 0.0,
            distance_samples: 0,
            frames_in_shield: 0,
            most_frames_without_damage: 0,
            roll_count: 0,
            spot_dodge_count: 0,
            air_dodge_count: 0,
            tech_miss_count: 0,
            tech_in_place_count: 0,
            tech_forward_count: 0,
            tech_backward_count: 0,
            tech_surface_count: 0,
            action_count: 0,
            input_count: 0,
            recovery_attempts: 0,
            successful_recoveries: 0,
            edgeguard_chances: 0,
            edgeguard_conversions: 0,
            number_of_openings: 0,
            total_string_damage: 0.0,
            total_string_frames: 0,
            total_string_hits: 0,
            most_damage_string: 0.0,
            most_frames_string: 0,
            most_hits_string: 0,
            stocks: [StockRecord::default(); STOCK_COUNT],
            combo_strings: ComboStringLog::new(),
            recoveries: RecoveryLog::new(),
            punishes: PunishLog::new(),
        }
    }
}

impl CompetitorStatistics {
    /// Zero everything, logs included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold a finished string into the running aggregates.
    pub fn record_string(&mut self, string: &ComboStringRecord) {
        let damage = string.damage();
        let frames = string.frames();
        self.number_of_openings += 1;
        self.total_string_damage += damage;
        self.total_string_frames += u64::from(frames);
        self.total_string_hits += u32::from(string.hit_count);
        self.most_damage_string = self.most_damage_string.max(damage);
        self.most_frames_string = self.most_frames_string.max(frames);
        self.most_hits_string = self.most_hits_string.max(string.hit_count);
    }

    pub fn average_damage_per_string(&self) -> f32 {
        if self.number_of_openings == 0 {
            return 0.0;
        }
        self.total_string_damage / self.number_of_openings as f32
    }

    pub fn average_frames_per_string(&self) -> f32 {
        if self.number_of_openings == 0 {
            return 0.0;
        }
        self.total_string_frames as f32 / self.number_of_openings as f32
    }

    pub fn average_hits_per_string(&self) -> f32 {
        if self.number_of_openings == 0 {
            return 0.0;
        }
        self.total_string_hits as f32 / self.number_of_openings as f32
    }

    /// Stocks whose slot records a loss.
    pub fn stocks_lost(&self) -> usize {
        self.stocks.iter().filter(|s| s.is_stock_lost).count()
    }

    /// Log writes dropped because a bounded log was full.
    pub fn saturated_writes(&self) -> u32 {
        self.combo_strings.dropped() + self.recoveries.dropped() + self.punishes.dropped()
    }
}

fn serialize_slice<S: Serializer>(values: &[u32; INTERNAL_CHARACTER_COUNT], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter())
}

// ============================================================================
// Transient detector state
// ============================================================================

/// Where the competitor is in an off-stage excursion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RecoveryState {
    #[default]
    Neutral,
    Recovering {
        start_frame: u32,
        start_percent: f32,
        /// Took a hit while off stage
        hit_off_stage: bool,
        landing: Option<Landing>,
    },
}

/// Back inside the stage boundary, waiting for confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub frame: u32,
    pub percent: f32,
    pub frames_since_landing: u32,
}

/// An open punish or combo string window against the opponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    pub start_frame: u32,
    /// Opponent damage before the first hit
    pub start_percent: f32,
    pub hit_count: u16,
    /// Frames since the last counted hit
    pub frames_since_hit: u32,
}

impl HitWindow {
    pub fn open(start_frame: u32, start_percent: f32) -> Self {
        Self { start_frame, start_percent, hit_count: 1, frames_since_hit: 0 }
    }

    pub fn hit(&mut self) {
        self.hit_count = self.hit_count.saturating_add(1);
        self.frames_since_hit = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompetitorFlags {
    pub recovery: RecoveryState,
    pub punish: Option<HitWindow>,
    pub combo: Option<HitWindow>,
    pub frames_without_damage: u32,
    /// Frame at which the current stock began
    pub stock_start_frame: u32,
    /// Strings the opponent has completed against the current stock
    pub openings_this_stock: u16,
}

impl CompetitorFlags {
    pub fn is_recovering(&self) -> bool {
        matches!(self.recovery, RecoveryState::Recovering { .. })
    }

    pub fn is_hit_off_stage(&self) -> bool {
        matches!(self.recovery, RecoveryState::Recovering { hit_off_stage: true, .. })
    }

    pub fn is_landed_on_stage(&self) -> bool {
        matches!(self.recovery, RecoveryState::Recovering { landing: Some(_), .. })
    }

    pub fn is_punishing(&self) -> bool {
        self.punish.is_some()
    }

    pub fn string_count(&self) -> u16 {
        self.combo.map_or(0, |w| w.hit_count)
    }
}

/// Everything the engine tracks for one competitor.
#[derive(Debug, Clone, Default)]
pub struct Competitor {
    pub flags: CompetitorFlags,
    pub stats: CompetitorStatistics,
}

impl Competitor {
    pub fn reset(&mut self) {
        self.flags = CompetitorFlags::default();
        self.stats.reset();
    }
}

/// Mutable access to a competitor and its opponent at the same time.
pub fn pair_mut(competitors: &mut [Competitor], index: usize) -> (&mut Competitor, &mut Competitor) {
    let (left, right) = competitors.split_at_mut(1);
    if index == 0 {
        (&mut left[0], &mut right[0])
    } else {
        (&mut right[0], &mut left[0])
    }
}
