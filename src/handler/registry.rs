//! Handler registry for dispatching completed frames by type.
//!
//! The registry maps frame type codes to handlers. It is built once per
//! process (or per test) and shared by every connection. Frames whose type
//! has no handler are discarded; that is never an error.
//!
//! # Example
//!
//! ```
//! use h2wire::handler::{FrameContext, HandlerRegistry, HandlerResult};
//! use h2wire::protocol::Frame;
//!
//! // Echo PING-like frames (type 0x06) back to the peer.
//! fn pong(ctx: &mut FrameContext<'_>, frame: Frame) -> HandlerResult {
//!     let reply = Frame::new(0x06, 0x01, 0, frame.payload())?;
//!     ctx.send(reply);
//!     Ok(())
//! }
//!
//! let mut registry = HandlerRegistry::standard();
//! registry.register(0x06, pong);
//!
//! assert!(registry.contains(0x06));
//! ```

use super::settings::{SettingsHandler, SettingsState};
use crate::error::Result;
use crate::protocol::{frame_type, Frame};

/// Result type for handler functions.
pub type HandlerResult = Result<()>;

/// State a handler may touch while processing one frame.
pub struct FrameContext<'a> {
    settings: &'a mut SettingsState,
    outbound: &'a mut Vec<Frame>,
}

impl<'a> FrameContext<'a> {
    /// Create a context over a connection's settings and an outbound list.
    pub fn new(settings: &'a mut SettingsState, outbound: &'a mut Vec<Frame>) -> Self {
        Self { settings, outbound }
    }

    /// Settings tables and handshake state of the connection.
    pub fn settings(&mut self) -> &mut SettingsState {
        &mut *self.settings
    }

    /// Queue a frame for transmission.
    ///
    /// Frames are handed to the connection's transmit queue, in order, once
    /// the handler returns successfully.
    pub fn send(&mut self, frame: Frame) {
        self.outbound.push(frame);
    }
}

/// Trait for frame handlers.
///
/// The handler takes ownership of the completed frame. Returning an error
/// tears the connection down.
pub trait FrameHandler {
    fn handle(&self, ctx: &mut FrameContext<'_>, frame: Frame) -> HandlerResult;
}

impl<F> FrameHandler for F
where
    F: Fn(&mut FrameContext<'_>, Frame) -> HandlerResult,
{
    fn handle(&self, ctx: &mut FrameContext<'_>, frame: Frame) -> HandlerResult {
        self(ctx, frame)
    }
}

/// What happened to a dispatched frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler consumed the frame.
    Handled,
    /// No handler for this type; the frame was dropped.
    Discarded,
}

/// Registry mapping frame types to handlers.
pub struct HandlerRegistry {
    handlers: Vec<(u8, Box<dyn FrameHandler>)>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a registry with the built-in control frame handlers.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(frame_type::SETTINGS, SettingsHandler);
        registry
    }

    /// Register a handler, replacing any previous one for `frame_type`.
    pub fn register<H>(&mut self, frame_type: u8, handler: H)
    where
        H: FrameHandler + 'static,
    {
        let handler: Box<dyn FrameHandler> = Box::new(handler);
        match self.handlers.iter_mut().find(|(t, _)| *t == frame_type) {
            Some(entry) => entry.1 = handler,
            None => self.handlers.push((frame_type, handler)),
        }
    }

    /// Get the handler for a frame type.
    pub fn get(&self, frame_type: u8) -> Option<&dyn FrameHandler> {
        self.handlers
            .iter()
            .find(|(t, _)| *t == frame_type)
            .map(|(_, h)| h.as_ref())
    }

    /// Check if a frame type has a handler.
    pub fn contains(&self, frame_type: u8) -> bool {
        self.get(frame_type).is_some()
    }

    /// Number of registered frame types.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a completed frame to the handler for its type.
    pub fn dispatch(&self, ctx: &mut FrameContext<'_>, frame: Frame) -> Result<Dispatch> {
        match self.get(frame.frame_type()) {
            Some(handler) => {
                handler.handle(ctx, frame)?;
                Ok(Dispatch::Handled)
            }
            None => {
                tracing::debug!(
                    "Discarding frame of unknown type {:#04x} on stream {}",
                    frame.frame_type(),
                    frame.stream_id()
                );
                Ok(Dispatch::Discarded)
            }
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
