//! Match report export.
//!
//! Turns the finalized state of a match into a serializable summary:
//! per-competitor rates and counts, one entry per stock played, and the raw
//! bounded record logs.

use serde::Serialize;

use crate::config::{COMPETITOR_COUNT, FRAMES_PER_SECOND};
use crate::engine::MatchState;
use crate::ids::{EXTERNAL_SHEIK, EXTERNAL_ZELDA, INTERNAL_SHEIK, INTERNAL_ZELDA};
use crate::stage::Stage;
use crate::stats::{
    ComboStringRecord, Competitor, CompetitorStatistics, PunishRecord, RecoveryRecord, StockRecord,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub time_seconds: f32,
    pub percent: f32,
    pub move_last_hit_by: u8,
    pub last_animation: u16,
    pub openings_allowed: u16,
    pub is_stock_lost: bool,
}

impl From<&StockRecord> for StockSummary {
    fn from(stock: &StockRecord) -> Self {
        Self {
            time_seconds: frames_to_seconds(stock.frame_end.saturating_sub(stock.frame_start)),
            percent: stock.percent,
            move_last_hit_by: stock.last_hit_by,
            last_animation: stock.last_animation,
            openings_allowed: stock.killed_in_openings,
            is_stock_lost: stock.is_stock_lost,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorReport {
    pub port: u8,
    pub character: u8,
    pub color: u8,
    #[serde(rename = "type")]
    pub player_type: u8,

    pub stocks_remaining: u8,
    pub apm: f32,
    pub average_distance_from_center: f32,
    pub percent_time_closest_center: f32,
    pub percent_time_above_others: f32,
    pub percent_time_in_shield: f32,
    pub seconds_without_damage: f32,
    pub roll_count: u32,
    pub spot_dodge_count: u32,
    pub air_dodge_count: u32,
    pub tech_count: u32,
    pub missed_tech_count: u32,
    pub action_count: u32,
    pub recovery_attempts: u32,
    pub successful_recoveries: u32,
    pub edgeguard_chances: u32,
    pub edgeguard_conversions: u32,
    pub number_of_openings: u32,
    pub average_damage_per_string: f32,
    pub average_time_per_string: f32,
    pub average_hits_per_string: f32,
    pub most_damage_string: f32,
    pub most_time_string: u32,
    pub most_hits_string: u16,
    pub stocks: Vec<StockSummary>,

    pub recoveries: Vec<RecoveryRecord>,
    pub punishes: Vec<PunishRecord>,
    pub combo_strings: Vec<ComboStringRecord>,
    /// Records lost to full logs
    pub dropped_records: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub stage: u16,
    pub stage_name: Option<&'static str>,
    pub frames: u32,
    pub frames_missed: u32,
    pub win_condition: Option<u8>,
    pub players: Vec<CompetitorReport>,
}

impl MatchReport {
    pub fn from_state(state: &MatchState) -> Self {
        let snapshot = state.snapshot();
        let frames = snapshot.frame_counter;
        let players = (0..COMPETITOR_COUNT)
            .map(|index| competitor_report(state, index, frames))
            .collect();

        Self {
            stage: snapshot.stage_id,
            stage_name: Stage::from_id(snapshot.stage_id).map(Stage::name),
            frames,
            frames_missed: snapshot.frames_missed,
            win_condition: snapshot.win_condition,
            players,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        frames_to_seconds(self.frames)
    }
}

fn competitor_report(state: &MatchState, index: usize, frames: u32) -> CompetitorReport {
    let info = state.info(index);
    let Competitor { stats, .. } = state.competitor(index);
    let minutes = frames_to_seconds(frames) / 60.0;

    CompetitorReport {
        port: info.port,
        character: played_character(info.character_id, stats),
        color: info.color,
        player_type: info.player_type,

        stocks_remaining: state.snapshot().competitor(index).stocks,
        apm: if minutes > 0.0 { stats.input_count as f32 / minutes } else { 0.0 },
        average_distance_from_center: stats.average_distance_from_center,
        percent_time_closest_center: percent_of(stats.frames_closest_center, frames),
        percent_time_above_others: percent_of(stats.frames_above_opponent, frames),
        percent_time_in_shield: percent_of(stats.frames_in_shield, frames),
        seconds_without_damage: frames_to_seconds(stats.most_frames_without_damage),
        roll_count: stats.roll_count,
        spot_dodge_count: stats.spot_dodge_count,
        air_dodge_count: stats.air_dodge_count,
        tech_count: stats.tech_in_place_count
            + stats.tech_forward_count
            + stats.tech_backward_count
            + stats.tech_surface_count,
        missed_tech_count: stats.tech_miss_count,
        action_count: stats.action_count,
        recovery_attempts: stats.recovery_attempts,
        successful_recoveries: stats.successful_recoveries,
        edgeguard_chances: stats.edgeguard_chances,
        edgeguard_conversions: stats.edgeguard_conversions,
        number_of_openings: stats.number_of_openings,
        average_damage_per_string: stats.average_damage_per_string(),
        average_time_per_string: stats.average_frames_per_string() / FRAMES_PER_SECOND,
        average_hits_per_string: stats.average_hits_per_string(),
        most_damage_string: stats.most_damage_string,
        most_time_string: stats.most_frames_string,
        most_hits_string: stats.most_hits_string,
        stocks: stats.stocks.iter().filter(|s| s.is_stock_used).map(StockSummary::from).collect(),

        recoveries: stats.recoveries.as_slice().to_vec(),
        punishes: stats.punishes.as_slice().to_vec(),
        combo_strings: stats.combo_strings.as_slice().to_vec(),
        dropped_records: stats.saturated_writes(),
    }
}

/// Zelda and Sheik can transform mid-match; report whichever form was
/// played longer.
fn played_character(character_id: u8, stats: &CompetitorStatistics) -> u8 {
    if character_id != EXTERNAL_ZELDA && character_id != EXTERNAL_SHEIK {
        return character_id;
    }
    let frames = |internal: u8| stats.internal_character_frames[usize::from(internal)];
    if frames(INTERNAL_SHEIK) > frames(INTERNAL_ZELDA) {
        EXTERNAL_SHEIK
    } else if frames(INTERNAL_ZELDA) > frames(INTERNAL_SHEIK) {
        EXTERNAL_ZELDA
    } else {
        character_id
    }
}

fn frames_to_seconds(frames: u32) -> f32 {
    frames as f32 / FRAMES_PER_SECOND
}

fn percent_of(part: u32, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    part as f32 / total as f32 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{FrameUpdate, MatchResult, MatchSetup};
    use crate::engine::StatsEngine;

    fn finished_engine() -> StatsEngine {
        let mut engine = StatsEngine::default();
        let mut setup = MatchSetup { stage_id: 31, ..Default::default() };
        setup.competitors[0].port = 1;
        setup.competitors[1].port = 2;
        setup.competitors[0].starting_stocks = 4;
        setup.competitors[1].starting_stocks = 4;
        engine.process(&setup.to_record());

        for frame in 1..=3600 {
            let mut update = FrameUpdate { frame_counter: frame, ..Default::default() };
            update.competitors[0].stocks = 4;
            update.competitors[1].stocks = 4;
            update.competitors[0].y = 10.0;
            // press A every other second
            if (frame / 60) % 2 == 1 {
                update.competitors[0].controller.physical_buttons = 0x0100;
            }
            engine.process(&update.to_record());
        }
        engine.process(&MatchResult { win_condition: 1 }.to_record());
        engine
    }

    #[test]
    fn test_rates_over_one_minute() {
        let engine = finished_engine();
        let report = MatchReport::from_state(engine.finished_match().expect("finished"));

        assert_eq!(report.frames, 3600);
        assert_eq!(report.stage_name, Some("Battlefield"));
        assert!((report.duration_seconds() - 60.0).abs() < 1e-3);

        let p0 = &report.players[0];
        assert_eq!(p0.port, 1);
        assert_eq!(p0.stocks_remaining, 4);
        assert!((p0.percent_time_above_others - 100.0).abs() < 1e-3);
        // 30 presses in one minute
        assert!((p0.apm - 30.0).abs() < 1e-3);
        assert_eq!(p0.stocks.len(), 1);
        assert!(!p0.stocks[0].is_stock_lost);
        assert!((p0.seconds_without_damage - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_report_json_shape() {
        let engine = finished_engine();
        let report = MatchReport::from_state(engine.finished_match().expect("finished"));
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["winCondition"], 1);
        assert_eq!(value["players"].as_array().unwrap().len(), 2);
        assert_eq!(value["players"][1]["type"], 0);
        assert!(value["players"][0]["stocks"][0]["timeSeconds"].is_number());
        assert!(value["players"][0]["punishes"].as_array().unwrap().is_empty());
    }

    fn transform_match(character_id: u8, sheik_frames: u32) -> MatchReport {
        let mut engine = StatsEngine::default();
        let mut setup = MatchSetup { stage_id: 32, ..Default::default() };
        setup.competitors[0].character_id = character_id;
        setup.competitors[0].starting_stocks = 4;
        setup.competitors[1].starting_stocks = 4;
        engine.process(&setup.to_record());

        for frame in 1..=200 {
            let mut update = FrameUpdate { frame_counter: frame, ..Default::default() };
            update.competitors[0].stocks = 4;
            update.competitors[1].stocks = 4;
            update.competitors[0].internal_character_id =
                if frame <= sheik_frames { INTERNAL_SHEIK } else { INTERNAL_ZELDA };
            engine.process(&update.to_record());
        }
        engine.process(&MatchResult { win_condition: 1 }.to_record());
        MatchReport::from_state(engine.finished_match().expect("finished"))
    }

    #[test]
    fn test_zelda_reported_as_sheik_when_transformed_longer() {
        assert_eq!(transform_match(EXTERNAL_ZELDA, 150).players[0].character, EXTERNAL_SHEIK);
        assert_eq!(transform_match(EXTERNAL_SHEIK, 20).players[0].character, EXTERNAL_ZELDA);
        assert_eq!(transform_match(EXTERNAL_ZELDA, 100).players[0].character, EXTERNAL_ZELDA);
    }

    #[test]
    fn test_other_characters_keep_setup_id() {
        // internal frames never override a character that cannot transform
        assert_eq!(transform_match(0x02, 200).players[0].character, 0x02);
    }

    #[test]
    fn test_percent_of_zero_total() {
        assert_eq!(percent_of(10, 0), 0.0);
        assert_eq!(percent_of(15, 60), 25.0);
    }
}
