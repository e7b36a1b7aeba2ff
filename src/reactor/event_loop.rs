//! Single-threaded event loop on top of tokio readiness.
//!
//! [`EventLoop`] is the registration bookkeeping: a cheaply cloneable handle
//! shared by every connection on one thread. [`drive`] is the dispatch loop
//! for one connection: it waits for the readiness its armed registrations
//! ask for and delivers the notifications.
//!
//! # Example
//!
//! ```ignore
//! use h2wire::reactor::{drive, EventLoop};
//! use h2wire::Connection;
//!
//! let events = EventLoop::new();
//! let local = tokio::task::LocalSet::new();
//! local.run_until(async move {
//!     let stream = tokio::net::TcpStream::connect("127.0.0.1:8080").await?;
//!     let mut conn = Connection::new(stream, events.clone())?;
//!     conn.settings_send(&[])?;
//!     drive(&mut conn).await;
//!     Ok::<_, h2wire::H2Error>(())
//! }).await?;
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use tokio::io::{Interest as TokioInterest, Ready};

use super::{Interest, Reactor, Registration, Socket};
use crate::connection::Connection;
use crate::error::H2Error;

#[derive(Debug, Default)]
struct Registrations {
    next_id: u64,
    armed: HashMap<u64, bool>,
}

/// Reactor handle for connections running on the current thread.
#[derive(Debug, Clone, Default)]
pub struct EventLoop {
    inner: Rc<RefCell<Registrations>>,
}

impl EventLoop {
    /// Create an empty event loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a registration is armed.
    pub fn is_armed(&self, registration: &Registration) -> bool {
        self.inner
            .borrow()
            .armed
            .get(&registration.id())
            .copied()
            .unwrap_or(false)
    }

    /// Check if a registration is still held.
    pub fn is_registered(&self, registration: &Registration) -> bool {
        self.inner.borrow().armed.contains_key(&registration.id())
    }

    /// Number of live registrations across all connections.
    pub fn registered_count(&self) -> usize {
        self.inner.borrow().armed.len()
    }

    /// Consume the armed state of a registration before delivering its
    /// notification. Returns `false` if it was not armed.
    pub fn fire(&self, registration: &Registration) -> bool {
        self.take(registration.id())
    }

    fn take(&self, id: u64) -> bool {
        match self.inner.borrow_mut().armed.get_mut(&id) {
            Some(armed) => std::mem::replace(armed, false),
            None => false,
        }
    }

    fn armed_by_id(&self, id: u64) -> bool {
        self.inner.borrow().armed.get(&id).copied().unwrap_or(false)
    }
}

impl Reactor for EventLoop {
    fn register(&self, interest: Interest) -> io::Result<Registration> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.armed.insert(id, false);
        Ok(Registration::new(id, interest))
    }

    fn rearm(&self, registration: &Registration) -> io::Result<()> {
        match self.inner.borrow_mut().armed.get_mut(&registration.id()) {
            Some(armed) => {
                *armed = true;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("registration {} was released", registration.id()),
            )),
        }
    }

    fn disarm(&self, registration: &Registration) {
        if let Some(armed) = self.inner.borrow_mut().armed.get_mut(&registration.id()) {
            *armed = false;
        }
    }

    fn unregister(&self, registration: Registration) {
        self.inner.borrow_mut().armed.remove(&registration.id());
    }
}

/// Socket whose readiness can be awaited.
#[allow(async_fn_in_trait)]
pub trait Readiness: Socket {
    async fn ready(&self, interest: TokioInterest) -> io::Result<Ready>;
}

impl Readiness for tokio::net::TcpStream {
    async fn ready(&self, interest: TokioInterest) -> io::Result<Ready> {
        tokio::net::TcpStream::ready(self, interest).await
    }
}

#[cfg(unix)]
impl Readiness for tokio::net::UnixStream {
    async fn ready(&self, interest: TokioInterest) -> io::Result<Ready> {
        tokio::net::UnixStream::ready(self, interest).await
    }
}

/// Deliver readiness notifications to `conn` until it is torn down.
///
/// Must run on a `LocalSet` (the event loop handle is not `Send`). The
/// future holds no state of its own between notifications, so it may be
/// dropped and called again later, e.g. under a timeout.
pub async fn drive<S: Readiness>(conn: &mut Connection<S, EventLoop>) {
    let events = conn.reactor().clone();

    while conn.is_open() {
        let Some((read_id, write_id)) = conn.registrations().map(|(r, w)| (r.id(), w.id()))
        else {
            break;
        };

        let interest = match (events.armed_by_id(read_id), events.armed_by_id(write_id)) {
            (true, true) => TokioInterest::READABLE | TokioInterest::WRITABLE,
            (true, false) => TokioInterest::READABLE,
            (false, true) => TokioInterest::WRITABLE,
            (false, false) => {
                tracing::debug!("No registration armed, leaving connection");
                break;
            }
        };

        let ready = match conn.socket() {
            Some(socket) => socket.ready(interest).await,
            None => break,
        };

        let ready = match ready {
            Ok(ready) => ready,
            Err(e) => {
                conn.fail(H2Error::Io(e));
                break;
            }
        };

        if ready.is_readable() && events.take(read_id) {
            conn.on_readable();
        }
        if ready.is_writable() && conn.is_open() && events.take(write_id) {
            conn.on_writable();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_starts_disarmed() {
        let events = EventLoop::new();
        let reg = events.register(Interest::Read).unwrap();

        assert!(events.is_registered(&reg));
        assert!(!events.is_armed(&reg));
        assert_eq!(reg.interest(), Interest::Read);
    }

    #[test]
    fn test_fire_is_one_shot() {
        let events = EventLoop::new();
        let reg = events.register(Interest::Write).unwrap();

        events.rearm(&reg).unwrap();
        assert!(events.fire(&reg));
        assert!(!events.fire(&reg));
        assert!(!events.is_armed(&reg));
    }

    #[test]
    fn test_disarm_and_unregister() {
        let events = EventLoop::new();
        let read = events.register(Interest::Read).unwrap();
        let write = events.register(Interest::Write).unwrap();
        assert_ne!(read.id(), write.id());
        assert_eq!(events.registered_count(), 2);

        events.rearm(&write).unwrap();
        events.disarm(&write);
        assert!(!events.is_armed(&write));

        let stale = Registration::new(read.id(), Interest::Read);
        events.unregister(read);
        assert_eq!(events.registered_count(), 1);
        assert!(events.rearm(&stale).is_err());
    }

    #[test]
    fn test_handles_share_state() {
        let events = EventLoop::new();
        let other = events.clone();
        let reg = events.register(Interest::Read).unwrap();
        other.rearm(&reg).unwrap();
        assert!(events.is_armed(&reg));
    }
}
