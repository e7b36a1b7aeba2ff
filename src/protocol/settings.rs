//! SETTINGS payload codec.
//!
//! A non-ACK SETTINGS payload is a sequence of 6-byte records:
//! ```text
//! ┌───────────┬───────────┐
//! │ Identifier│ Value     │
//! │ uint16 BE │ uint32 BE │
//! └───────────┴───────────┘
//! ```

use std::collections::BTreeMap;

use bytes::{BufMut, BytesMut};

use super::wire_format::{flags, frame_type};
use super::Frame;
use crate::error::{H2Error, Result};

/// Size of one encoded setting record.
pub const SETTING_SIZE: usize = 6;

/// Well-known setting identifiers.
pub mod setting_id {
    pub const HEADER_TABLE_SIZE: u16 = 0x1;
    pub const ENABLE_PUSH: u16 = 0x2;
    pub const MAX_CONCURRENT_STREAMS: u16 = 0x3;
    pub const INITIAL_WINDOW_SIZE: u16 = 0x4;
    pub const MAX_FRAME_SIZE: u16 = 0x5;
    pub const MAX_HEADER_LIST_SIZE: u16 = 0x6;
}

/// A single (identifier, value) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Setting {
    pub id: u16,
    pub value: u32,
}

impl Setting {
    pub fn new(id: u16, value: u32) -> Self {
        Self { id, value }
    }
}

/// Settings keyed by identifier. Later updates to an id replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsTable {
    values: BTreeMap<u16, u32>,
}

impl SettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a setting, replacing any previous value for its id.
    pub fn apply(&mut self, setting: Setting) {
        self.values.insert(setting.id, setting.value);
    }

    /// Store every setting in order.
    pub fn apply_all<'a>(&mut self, settings: impl IntoIterator<Item = &'a Setting>) {
        for setting in settings {
            self.apply(*setting);
        }
    }

    pub fn get(&self, id: u16) -> Option<u32> {
        self.values.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate settings in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = Setting> + '_ {
        self.values.iter().map(|(&id, &value)| Setting { id, value })
    }
}

/// Encode settings into a payload.
pub fn encode_settings(settings: &[Setting]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(settings.len() * SETTING_SIZE);
    for setting in settings {
        buf.put_u16(setting.id);
        buf.put_u32(setting.value);
    }
    buf
}

/// Decode a SETTINGS payload into its records, in wire order.
///
/// Fails if the payload is not a whole number of records.
pub fn decode_settings(payload: &[u8]) -> Result<Vec<Setting>> {
    if payload.len() % SETTING_SIZE != 0 {
        return Err(H2Error::FrameSize(format!(
            "SETTINGS payload of {} bytes is not a multiple of {}",
            payload.len(),
            SETTING_SIZE
        )));
    }
    Ok(payload
        .chunks_exact(SETTING_SIZE)
        .map(|record| Setting {
            id: u16::from_be_bytes([record[0], record[1]]),
            value: u32::from_be_bytes([record[2], record[3], record[4], record[5]]),
        })
        .collect())
}

impl Frame {
    /// Build a non-ACK SETTINGS frame carrying `settings`.
    pub fn settings(settings: &[Setting]) -> Result<Self> {
        Frame::with_payload(frame_type::SETTINGS, 0, 0, encode_settings(settings))
    }

    /// Build the zero-length SETTINGS acknowledgment.
    pub fn settings_ack() -> Self {
        Frame::empty(frame_type::SETTINGS, flags::ACK)
    }
}
