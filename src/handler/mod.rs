//! Handler module - frame dispatch and the SETTINGS handshake.
//!
//! Provides:
//! - [`HandlerRegistry`] - maps frame types to handlers
//! - [`FrameContext`] - lets handlers read/update settings and reply
//! - [`SettingsHandler`] - built-in SETTINGS handler
//!
//! # Example
//!
//! ```
//! use h2wire::handler::{FrameContext, HandlerRegistry, HandlerResult};
//! use h2wire::protocol::Frame;
//!
//! fn log_data(_ctx: &mut FrameContext<'_>, frame: Frame) -> HandlerResult {
//!     println!("stream {}: {} bytes", frame.stream_id(), frame.length());
//!     Ok(())
//! }
//!
//! let mut registry = HandlerRegistry::standard();
//! registry.register(0x00, log_data);
//! ```

mod registry;
mod settings;

pub use registry::{Dispatch, FrameContext, FrameHandler, HandlerRegistry, HandlerResult};
pub use settings::{HandshakeState, SettingsHandler, SettingsState};
