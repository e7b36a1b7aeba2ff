//! # h2wire
//!
//! HTTP/2-style binary framing over non-blocking sockets.
//!
//! This crate implements the frame layer of an HTTP/2 endpoint: the 9-byte
//! frame header, resumable frame reception, a FIFO transmit queue with
//! partial writes, dispatch of completed frames by type, and the SETTINGS
//! handshake. Streams, HPACK and flow control are out of scope.
//!
//! ## Architecture
//!
//! - **Protocol** (`protocol`): header codec, frames, SETTINGS records
//! - **Connection** (`connection`): receive state machine and transmit queue
//! - **Handlers** (`handler`): per-type frame handlers, SETTINGS handshake
//! - **Reactor** (`reactor`): one-shot readiness registrations, tokio event loop
//!
//! ## Example
//!
//! ```ignore
//! use h2wire::reactor::{drive, EventLoop};
//! use h2wire::Connection;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> h2wire::Result<()> {
//!     let local = tokio::task::LocalSet::new();
//!     local
//!         .run_until(async {
//!             let stream = tokio::net::TcpStream::connect("127.0.0.1:8080").await?;
//!             let mut conn = Connection::new(stream, EventLoop::new())?;
//!             conn.settings_send(&[])?;
//!             drive(&mut conn).await;
//!             Ok(())
//!         })
//!         .await
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod reactor;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{ErrorCode, H2Error, Result};
pub use protocol::{Frame, Header, Setting};
