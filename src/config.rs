//! Connection configuration.
//!
//! Defaults match the protocol limits; a config can also be loaded from a
//! JSON file:
//!
//! ```json
//! {
//!   "max_frame_size": 16384,
//!   "strict_header_io": false,
//!   "initial_settings": [{ "id": 4, "value": 65535 }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{H2Error, Result};
use crate::protocol::{Setting, MAX_FRAME_LENGTH};

/// Tunables for a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Largest inbound payload accepted.
    pub max_frame_size: u32,
    /// Treat a header that does not cross the socket in a single
    /// notification as fatal instead of resuming it later.
    pub strict_header_io: bool,
    /// Settings announced by the client when it connects.
    pub initial_settings: Vec<Setting>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_frame_size: MAX_FRAME_LENGTH,
            strict_header_io: false,
            initial_settings: Vec::new(),
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest inbound payload accepted.
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Enable or disable strict (single-notification) header I/O.
    pub fn strict_header_io(mut self, strict: bool) -> Self {
        self.strict_header_io = strict;
        self
    }

    /// Set the settings the client announces.
    pub fn initial_settings(mut self, settings: Vec<Setting>) -> Self {
        self.initial_settings = settings;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are within protocol limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 || self.max_frame_size > MAX_FRAME_LENGTH {
            return Err(H2Error::Config(format!(
                "max_frame_size must be between 1 and {}, got {}",
                MAX_FRAME_LENGTH, self.max_frame_size
            )));
        }
        Ok(())
    }
}
