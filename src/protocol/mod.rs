//! Protocol module - wire format, frames and SETTINGS payloads.
//!
//! This module implements the binary framing layer:
//! - 9-byte header encoding/decoding
//! - Frame struct owning its payload and transfer progress
//! - SETTINGS record codec and settings tables

mod frame;
mod settings;
mod wire_format;

pub use frame::Frame;
pub use settings::{
    decode_settings, encode_settings, setting_id, Setting, SettingsTable, SETTING_SIZE,
};
pub use wire_format::{
    decode_header, encode_header, flags, frame_type, Header, HEADER_SIZE, MAX_FRAME_LENGTH,
    MAX_STREAM_ID,
};
