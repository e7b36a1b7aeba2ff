//! SETTINGS handshake.
//!
//! Each side announces its settings with a non-ACK SETTINGS frame and the
//! peer answers with a zero-length ACK:
//!
//! ```text
//! local                                remote
//!   │ ── SETTINGS [(id, value)…] ──────► │   local: Idle → AwaitingAck
//!   │ ◄───────────── SETTINGS ACK ────── │   local: AwaitingAck → Idle
//!   │ ◄───────── SETTINGS [(id, value)…] │   stored in the remote table
//!   │ ── SETTINGS ACK ─────────────────► │
//! ```
//!
//! Settings are stored, not applied: nothing in this crate changes
//! behavior based on a setting value.

use std::collections::VecDeque;

use super::registry::{FrameContext, FrameHandler, HandlerResult};
use crate::error::H2Error;
use crate::protocol::{decode_settings, Frame, Setting, SettingsTable, SETTING_SIZE};

/// Local side of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Every SETTINGS we sent has been acknowledged.
    Idle,
    /// At least one SETTINGS we sent is waiting for its ACK.
    AwaitingAck,
}

/// Settings tables of one connection.
#[derive(Debug, Default)]
pub struct SettingsState {
    remote: SettingsTable,
    local: SettingsTable,
    pending: VecDeque<Vec<Setting>>,
}

impl SettingsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings advertised by the peer.
    pub fn remote(&self) -> &SettingsTable {
        &self.remote
    }

    /// Local settings the peer has acknowledged.
    pub fn local(&self) -> &SettingsTable {
        &self.local
    }

    /// Local settings lists sent but not yet acknowledged, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &[Setting]> {
        self.pending.iter().map(Vec::as_slice)
    }

    pub fn state(&self) -> HandshakeState {
        if self.pending.is_empty() {
            HandshakeState::Idle
        } else {
            HandshakeState::AwaitingAck
        }
    }

    /// Record a settings list we just queued for the peer.
    pub(crate) fn record_sent(&mut self, settings: &[Setting]) {
        self.pending.push_back(settings.to_vec());
        tracing::debug!(
            "Local SETTINGS sent ({} entries), {} awaiting ACK",
            settings.len(),
            self.pending.len()
        );
    }

    /// Commit the oldest unacknowledged settings list.
    ///
    /// Returns `false` if nothing was pending.
    pub fn acknowledge(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(settings) => {
                self.local.apply_all(&settings);
                if self.pending.is_empty() {
                    tracing::info!("SETTINGS handshake complete");
                }
                true
            }
            None => false,
        }
    }

    /// Store settings received from the peer, in wire order.
    pub fn apply_remote(&mut self, settings: &[Setting]) {
        self.remote.apply_all(settings);
    }
}

/// Built-in handler for SETTINGS frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsHandler;

impl FrameHandler for SettingsHandler {
    fn handle(&self, ctx: &mut FrameContext<'_>, frame: Frame) -> HandlerResult {
        if frame.is_ack() {
            if frame.length() != 0 {
                return Err(H2Error::FrameSize(format!(
                    "SETTINGS ACK with {}-byte payload",
                    frame.length()
                )));
            }
        } else if frame.length() % SETTING_SIZE != 0 {
            return Err(H2Error::FrameSize(format!(
                "SETTINGS length {} is not a multiple of {}",
                frame.length(),
                SETTING_SIZE
            )));
        }

        if frame.stream_id() != 0 {
            return Err(H2Error::Protocol(format!(
                "SETTINGS on stream {}",
                frame.stream_id()
            )));
        }

        if frame.is_ack() {
            if !ctx.settings().acknowledge() {
                tracing::warn!("SETTINGS ACK received with no SETTINGS pending");
            }
            return Ok(());
        }

        let settings = decode_settings(frame.payload())?;
        for setting in &settings {
            tracing::debug!("Remote setting {:#06x} = {}", setting.id, setting.value);
        }
        ctx.settings().apply_remote(&settings);
        ctx.send(Frame::settings_ack());
        Ok(())
    }
}
