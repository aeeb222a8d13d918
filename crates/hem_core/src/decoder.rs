//! Frame Decoder
//!
//! Validates record envelopes and turns their payloads into typed values.
//! All multi-byte fields are little-endian. The event code travels in the
//! envelope, not in the payload.
//!
//! ## Payload layouts
//! - match start (16 bytes): stage `u16`, seed `u32`, then per competitor
//!   port, character, player type, color, starting stocks (`u8` each)
//! - frame update (122 bytes): frame `u32`, seed `u32`, then per competitor
//!   a 57-byte block (see [`COMPETITOR_FRAME_SIZE`])
//! - match end (1 byte): win condition

use serde::Serialize;

use crate::config::COMPETITOR_COUNT;
use crate::error::DecodeError;
use crate::snapshot::{CompetitorInfo, CompetitorSnapshot, ControllerState, MatchSnapshot};

/// Largest payload a record can carry.
pub const MSG_BUFFER_SIZE: usize = 1024;

pub const MATCH_START_SIZE: usize = 2 + 4 + COMPETITOR_COUNT * 5;
pub const COMPETITOR_FRAME_SIZE: usize = 57;
pub const FRAME_UPDATE_SIZE: usize = 4 + 4 + COMPETITOR_COUNT * COMPETITOR_FRAME_SIZE;
pub const MATCH_END_SIZE: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum EventCode {
    MatchStart = 0,
    FrameUpdate = 1,
    MatchEnd = 2,
}

impl EventCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(EventCode::MatchStart),
            1 => Some(EventCode::FrameUpdate),
            2 => Some(EventCode::MatchEnd),
            _ => None,
        }
    }

    pub fn expected_size(self) -> usize {
        match self {
            EventCode::MatchStart => MATCH_START_SIZE,
            EventCode::FrameUpdate => FRAME_UPDATE_SIZE,
            EventCode::MatchEnd => MATCH_END_SIZE,
        }
    }
}

/// A framed record as handed over by the transport.
///
/// The payload is copied in on construction, so a record never borrows
/// transport-owned memory.
#[derive(Clone)]
pub struct EventRecord {
    success: bool,
    event_code: u8,
    message_size: usize,
    payload: [u8; MSG_BUFFER_SIZE],
}

impl EventRecord {
    /// Copy `payload` into a new successfully received record.
    pub fn new(event_code: u8, payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() > MSG_BUFFER_SIZE {
            return Err(DecodeError::PayloadTooLarge {
                size: payload.len(),
                capacity: MSG_BUFFER_SIZE,
            });
        }
        let mut buf = [0u8; MSG_BUFFER_SIZE];
        buf[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            success: true,
            event_code,
            message_size: payload.len(),
            payload: buf,
        })
    }

    /// Build a record from a filled receive buffer and its declared size.
    pub fn from_parts(
        success: bool,
        event_code: u8,
        message_size: usize,
        payload: [u8; MSG_BUFFER_SIZE],
    ) -> Self {
        Self { success, event_code, message_size, payload }
    }

    /// A record whose receipt failed at the transport level.
    pub fn failed() -> Self {
        Self {
            success: false,
            event_code: 0,
            message_size: 0,
            payload: [0u8; MSG_BUFFER_SIZE],
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn event_code(&self) -> u8 {
        self.event_code
    }

    pub fn message_size(&self) -> usize {
        self.message_size
    }

    /// Declared payload bytes, clamped to the buffer capacity.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.message_size.min(MSG_BUFFER_SIZE)]
    }
}

impl std::fmt::Debug for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecord")
            .field("success", &self.success)
            .field("event_code", &self.event_code)
            .field("message_size", &self.message_size)
            .finish()
    }
}

/// Match-start payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MatchSetup {
    pub stage_id: u16,
    pub random_seed: u32,
    pub competitors: [CompetitorInfo; COMPETITOR_COUNT],
}

impl MatchSetup {
    /// Snapshot at frame zero: every competitor holds its starting stocks.
    pub fn initial_snapshot(&self) -> MatchSnapshot {
        let mut snapshot = MatchSnapshot {
            stage_id: self.stage_id,
            random_seed: self.random_seed,
            ..MatchSnapshot::default()
        };
        for (snap, info) in snapshot.competitors.iter_mut().zip(self.competitors.iter()) {
            snap.stocks = info.starting_stocks;
        }
        snapshot
    }

    pub fn to_record(&self) -> EventRecord {
        let mut buf = [0u8; MATCH_START_SIZE];
        let mut offset = 0;
        write_u16_le(&mut buf, &mut offset, self.stage_id);
        write_u32_le(&mut buf, &mut offset, self.random_seed);
        for info in &self.competitors {
            write_u8(&mut buf, &mut offset, info.port);
            write_u8(&mut buf, &mut offset, info.character_id);
            write_u8(&mut buf, &mut offset, info.player_type);
            write_u8(&mut buf, &mut offset, info.color);
            write_u8(&mut buf, &mut offset, info.starting_stocks);
        }
        fixed_record(EventCode::MatchStart, &buf)
    }
}

/// Frame-update payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameUpdate {
    pub frame_counter: u32,
    pub random_seed: u32,
    pub competitors: [CompetitorSnapshot; COMPETITOR_COUNT],
}

impl FrameUpdate {
    pub fn to_record(&self) -> EventRecord {
        let mut buf = [0u8; FRAME_UPDATE_SIZE];
        let mut offset = 0;
        write_u32_le(&mut buf, &mut offset, self.frame_counter);
        write_u32_le(&mut buf, &mut offset, self.random_seed);
        for c in &self.competitors {
            write_u8(&mut buf, &mut offset, c.internal_character_id);
            write_u16_le(&mut buf, &mut offset, c.animation);
            write_f32_le(&mut buf, &mut offset, c.x);
            write_f32_le(&mut buf, &mut offset, c.y);
            write_f32_le(&mut buf, &mut offset, c.controller.joystick_x);
            write_f32_le(&mut buf, &mut offset, c.controller.joystick_y);
            write_f32_le(&mut buf, &mut offset, c.controller.cstick_x);
            write_f32_le(&mut buf, &mut offset, c.controller.cstick_y);
            write_f32_le(&mut buf, &mut offset, c.controller.trigger);
            write_u32_le(&mut buf, &mut offset, c.controller.buttons);
            write_f32_le(&mut buf, &mut offset, c.percent);
            write_f32_le(&mut buf, &mut offset, c.shield_size);
            write_u8(&mut buf, &mut offset, c.last_move_hit_id);
            write_u8(&mut buf, &mut offset, c.combo_count);
            write_u8(&mut buf, &mut offset, c.last_hit_by);
            write_u8(&mut buf, &mut offset, c.stocks);
            write_u16_le(&mut buf, &mut offset, c.controller.physical_buttons);
            write_f32_le(&mut buf, &mut offset, c.controller.l_trigger);
            write_f32_le(&mut buf, &mut offset, c.controller.r_trigger);
        }
        fixed_record(EventCode::FrameUpdate, &buf)
    }
}

/// Match-end payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MatchResult {
    pub win_condition: u8,
}

impl MatchResult {
    pub fn to_record(&self) -> EventRecord {
        fixed_record(EventCode::MatchEnd, &[self.win_condition])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedRecord {
    MatchStart(MatchSetup),
    FrameUpdate(FrameUpdate),
    MatchEnd(MatchResult),
}

/// Validate a record's envelope and decode its payload.
///
/// The record is only read; a failed decode leaves no trace.
pub fn decode(record: &EventRecord) -> Result<DecodedRecord, DecodeError> {
    if !record.success() {
        return Err(DecodeError::TransportFailure);
    }

    let code = EventCode::from_u8(record.event_code())
        .ok_or(DecodeError::UnknownEventCode(record.event_code()))?;

    let expected = code.expected_size();
    if record.message_size() != expected {
        return Err(DecodeError::MalformedRecord {
            code: record.event_code(),
            expected,
            found: record.message_size(),
        });
    }

    let data = record.payload();
    let malformed = || DecodeError::MalformedRecord {
        code: record.event_code(),
        expected,
        found: data.len(),
    };

    let decoded = match code {
        EventCode::MatchStart => DecodedRecord::MatchStart(decode_setup(data).ok_or_else(malformed)?),
        EventCode::FrameUpdate => {
            DecodedRecord::FrameUpdate(decode_frame(data).ok_or_else(malformed)?)
        }
        EventCode::MatchEnd => {
            let mut offset = 0;
            let win_condition = read_u8(data, &mut offset).ok_or_else(malformed)?;
            DecodedRecord::MatchEnd(MatchResult { win_condition })
        }
    };
    Ok(decoded)
}

fn decode_setup(data: &[u8]) -> Option<MatchSetup> {
    let mut offset = 0;
    let stage_id = read_u16_le(data, &mut offset)?;
    let random_seed = read_u32_le(data, &mut offset)?;
    let mut competitors = [CompetitorInfo::default(); COMPETITOR_COUNT];
    for info in competitors.iter_mut() {
        info.port = read_u8(data, &mut offset)?;
        info.character_id = read_u8(data, &mut offset)?;
        info.player_type = read_u8(data, &mut offset)?;
        info.color = read_u8(data, &mut offset)?;
        info.starting_stocks = read_u8(data, &mut offset)?;
    }
    Some(MatchSetup { stage_id, random_seed, competitors })
}

fn decode_frame(data: &[u8]) -> Option<FrameUpdate> {
    let mut offset = 0;
    let frame_counter = read_u32_le(data, &mut offset)?;
    let random_seed = read_u32_le(data, &mut offset)?;
    let mut competitors = [CompetitorSnapshot::default(); COMPETITOR_COUNT];
    for c in competitors.iter_mut() {
        c.internal_character_id = read_u8(data, &mut offset)?;
        c.animation = read_u16_le(data, &mut offset)?;
        c.x = read_f32_le(data, &mut offset)?;
        c.y = read_f32_le(data, &mut offset)?;
        let joystick_x = read_f32_le(data, &mut offset)?;
        let joystick_y = read_f32_le(data, &mut offset)?;
        let cstick_x = read_f32_le(data, &mut offset)?;
        let cstick_y = read_f32_le(data, &mut offset)?;
        let trigger = read_f32_le(data, &mut offset)?;
        let buttons = read_u32_le(data, &mut offset)?;
        c.percent = read_f32_le(data, &mut offset)?;
        c.shield_size = read_f32_le(data, &mut offset)?;
        c.last_move_hit_id = read_u8(data, &mut offset)?;
        c.combo_count = read_u8(data, &mut offset)?;
        c.last_hit_by = read_u8(data, &mut offset)?;
        c.stocks = read_u8(data, &mut offset)?;
        let physical_buttons = read_u16_le(data, &mut offset)?;
        let l_trigger = read_f32_le(data, &mut offset)?;
        let r_trigger = read_f32_le(data, &mut offset)?;
        c.controller = ControllerState {
            joystick_x,
            joystick_y,
            cstick_x,
            cstick_y,
            trigger,
            buttons,
            physical_buttons,
            l_trigger,
            r_trigger,
        };
    }
    Some(FrameUpdate { frame_counter, random_seed, competitors })
}

fn fixed_record(code: EventCode, bytes: &[u8]) -> EventRecord {
    let mut payload = [0u8; MSG_BUFFER_SIZE];
    let len = bytes.len().min(MSG_BUFFER_SIZE);
    payload[..len].copy_from_slice(&bytes[..len]);
    EventRecord::from_parts(true, code as u8, len, payload)
}

// ============================================================================
// Byte helpers
// ============================================================================

fn read_u8(data: &[u8], offset: &mut usize) -> Option<u8> {
    let v = *data.get(*offset)?;
    *offset += 1;
    Some(v)
}

fn read_array<const L: usize>(data: &[u8], offset: &mut usize) -> Option<[u8; L]> {
    let end = offset.checked_add(L)?;
    let mut buf = [0u8; L];
    buf.copy_from_slice(data.get(*offset..end)?);
    *offset = end;
    Some(buf)
}

fn read_u16_le(data: &[u8], offset: &mut usize) -> Option<u16> {
    read_array::<2>(data, offset).map(u16::from_le_bytes)
}

fn read_u32_le(data: &[u8], offset: &mut usize) -> Option<u32> {
    read_array::<4>(data, offset).map(u32::from_le_bytes)
}

fn read_f32_le(data: &[u8], offset: &mut usize) -> Option<f32> {
    read_array::<4>(data, offset).map(f32::from_le_bytes)
}

fn write_bytes(buf: &mut [u8], offset: &mut usize, bytes: &[u8]) {
    let end = *offset + bytes.len();
    buf[*offset..end].copy_from_slice(bytes);
    *offset = end;
}

fn write_u8(buf: &mut [u8], offset: &mut usize, v: u8) {
    write_bytes(buf, offset, &[v]);
}

fn write_u16_le(buf: &mut [u8], offset: &mut usize, v: u16) {
    write_bytes(buf, offset, &v.to_le_bytes());
}

fn write_u32_le(buf: &mut [u8], offset: &mut usize, v: u32) {
    write_bytes(buf, offset, &v.to_le_bytes());
}

fn write_f32_le(buf: &mut [u8], offset: &mut usize, v: f32) {
    write_bytes(buf, offset, &v.to_le_bytes());
}
