//! Connection - one socket's worth of framing state.
//!
//! A connection owns its socket, a read and a write registration on the
//! reactor, the frame being received and the queue of frames to send.
//! It never blocks: the reactor calls [`Connection::on_readable`] and
//! [`Connection::on_writable`], each of which performs one non-blocking
//! step and re-arms what it needs next.
//!
//! Read interest stays armed for as long as the connection is open. Write
//! interest is armed only while frames are queued.
//!
//! Any error inside a readiness callback is logged and tears the connection
//! down: the socket is dropped, both registrations are released, and queued
//! frames are discarded unsent.
//!
//! # Example
//!
//! ```ignore
//! use h2wire::reactor::{drive, EventLoop};
//! use h2wire::Connection;
//!
//! let events = EventLoop::new();
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:8080").await?;
//! let mut conn = Connection::new(stream, events)?;
//! conn.settings_send(&[])?;
//! drive(&mut conn).await;
//! ```

mod recv;
mod transmit;

use std::rc::Rc;

use crate::config::ConnectionConfig;
use crate::error::{H2Error, Result};
use crate::handler::{FrameContext, HandlerRegistry, SettingsState};
use crate::protocol::{Frame, Setting};
use crate::reactor::{Interest, Reactor, Registration, Socket};

use recv::Receiver;
use transmit::{TxQueue, WriteOutcome};

/// A framed connection over a non-blocking socket.
pub struct Connection<S: Socket, R: Reactor> {
    socket: Option<S>,
    reactor: R,
    read: Option<Registration>,
    write: Option<Registration>,
    config: ConnectionConfig,
    registry: Rc<HandlerRegistry>,
    receiver: Receiver,
    tx: TxQueue,
    settings: SettingsState,
}

impl<S: Socket, R: Reactor> Connection<S, R> {
    /// Create a connection with the default config and the standard
    /// handlers.
    pub fn new(socket: S, reactor: R) -> Result<Self> {
        Self::with_config(
            socket,
            reactor,
            ConnectionConfig::default(),
            Rc::new(HandlerRegistry::standard()),
        )
    }

    /// Create a connection with a custom config and handler registry.
    ///
    /// Registers read and write interest and arms read. On failure no
    /// registration is left behind.
    pub fn with_config(
        socket: S,
        reactor: R,
        config: ConnectionConfig,
        registry: Rc<HandlerRegistry>,
    ) -> Result<Self> {
        config.validate()?;

        let read = reactor.register(Interest::Read)?;
        let write = match reactor.register(Interest::Write) {
            Ok(write) => write,
            Err(e) => {
                reactor.unregister(read);
                return Err(e.into());
            }
        };
        if let Err(e) = reactor.rearm(&read) {
            reactor.unregister(read);
            reactor.unregister(write);
            return Err(e.into());
        }

        tracing::info!("Connection open");

        Ok(Self {
            socket: Some(socket),
            reactor,
            read: Some(read),
            write: Some(write),
            receiver: Receiver::new(config.max_frame_size, config.strict_header_io),
            config,
            registry,
            tx: TxQueue::new(),
            settings: SettingsState::new(),
        })
    }

    /// Handle read readiness.
    pub fn on_readable(&mut self) {
        if !self.is_open() {
            return;
        }
        if let Err(e) = self.read_step() {
            self.fail(e);
        }
    }

    /// Handle write readiness.
    pub fn on_writable(&mut self) {
        if !self.is_open() {
            return;
        }
        if let Err(e) = self.write_step() {
            self.fail(e);
        }
    }

    /// Queue a frame for transmission.
    ///
    /// Arms write readiness if the queue was empty; otherwise the frame
    /// waits behind the ones already queued.
    pub fn frame_send(&mut self, frame: Frame) -> Result<()> {
        if !self.is_open() {
            return Err(H2Error::ConnectionClosed);
        }

        tracing::trace!(
            "Queue frame: len={} type={:#04x} stream={}",
            frame.length(),
            frame.frame_type(),
            frame.stream_id()
        );

        if self.tx.push(frame) {
            if let Err(e) = self.rearm(Interest::Write) {
                self.teardown();
                return Err(e);
            }
        }
        Ok(())
    }

    /// Send a SETTINGS frame announcing `settings` and wait for its ACK.
    pub fn settings_send(&mut self, settings: &[Setting]) -> Result<()> {
        let frame = Frame::settings(settings)?;
        self.frame_send(frame)?;
        self.settings.record_sent(settings);
        Ok(())
    }

    /// Tear the connection down. Queued frames are discarded.
    pub fn close(&mut self) {
        self.teardown();
    }

    /// Check if the connection has not been torn down.
    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Number of frames waiting to be written, including a partly written
    /// head frame.
    pub fn queued_frames(&self) -> usize {
        self.tx.len()
    }

    /// Check if a frame's payload is partly received.
    pub fn is_receiving(&self) -> bool {
        self.receiver.in_progress().is_some()
    }

    /// Settings tables and handshake state.
    pub fn settings(&self) -> &SettingsState {
        &self.settings
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Read and write registrations, while open.
    pub fn registrations(&self) -> Option<(&Registration, &Registration)> {
        self.read.as_ref().zip(self.write.as_ref())
    }

    /// Underlying socket, while open.
    pub fn socket(&self) -> Option<&S> {
        self.socket.as_ref()
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    fn read_step(&mut self) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(H2Error::ConnectionClosed)?;
        if let Some(frame) = self.receiver.read_from(socket)? {
            self.deliver(frame)?;
        }
        self.rearm(Interest::Read)
    }

    fn write_step(&mut self) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(H2Error::ConnectionClosed)?;
        match self.tx.write_to(socket, self.config.strict_header_io)? {
            WriteOutcome::Idle | WriteOutcome::Sent { remaining: 0 } => {
                self.disarm(Interest::Write);
                Ok(())
            }
            WriteOutcome::Pending | WriteOutcome::Sent { .. } => self.rearm(Interest::Write),
        }
    }

    /// Hand a completed frame to its handler and queue any replies.
    fn deliver(&mut self, frame: Frame) -> Result<()> {
        tracing::debug!(
            "RX frame: len={} type={:#04x} flags={:#04x} stream={}",
            frame.length(),
            frame.frame_type(),
            frame.flags(),
            frame.stream_id()
        );

        let mut replies = Vec::new();
        let mut ctx = FrameContext::new(&mut self.settings, &mut replies);
        self.registry.dispatch(&mut ctx, frame)?;

        for reply in replies {
            self.frame_send(reply)?;
        }
        Ok(())
    }

    fn registration(&self, interest: Interest) -> Option<&Registration> {
        match interest {
            Interest::Read => self.read.as_ref(),
            Interest::Write => self.write.as_ref(),
        }
    }

    fn rearm(&self, interest: Interest) -> Result<()> {
        let registration = self
            .registration(interest)
            .ok_or(H2Error::ConnectionClosed)?;
        self.reactor.rearm(registration)?;
        Ok(())
    }

    fn disarm(&self, interest: Interest) {
        if let Some(registration) = self.registration(interest) {
            self.reactor.disarm(registration);
        }
    }

    /// Log a fatal error and tear down.
    pub(crate) fn fail(&mut self, err: H2Error) {
        if !self.is_open() {
            return;
        }
        match (&err, err.code()) {
            (H2Error::ConnectionClosed, _) => tracing::info!("Peer closed connection"),
            (_, Some(code)) => {
                tracing::error!("Connection error ({:?} {:#x}): {}", code, code as u32, err)
            }
            (_, None) => tracing::error!("Connection error: {}", err),
        }
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(read) = self.read.take() {
            self.reactor.unregister(read);
        }
        if let Some(write) = self.write.take() {
            self.reactor.unregister(write);
        }
        self.receiver.reset();
        let dropped = self.tx.clear();

        if self.socket.take().is_some() {
            if dropped > 0 {
                tracing::info!("Connection closed, {} queued frames dropped", dropped);
            } else {
                tracing::info!("Connection closed");
            }
        }
    }
}

impl<S: Socket, R: Reactor> Drop for Connection<S, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}
