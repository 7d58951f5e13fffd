//! Serial port collaborator interface (§6).
//!
//! The actual serial-port driver — device discovery, baud/parity/flow
//! control configuration, open/close lifecycle — lives outside this
//! crate, owned by the facade. The engine only needs the narrow
//! byte-pipe contract captured by [`SerialPort`]: non-blocking writes
//! and non-blocking reads of whatever bytes are currently available.
//! The facade is responsible for noticing "readable" and driving the
//! engine's `on_readable`; this trait itself carries no callback
//! registration.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{Error, Result};

/// A full-duplex, non-blocking byte pipe.
pub trait SerialPort {
    /// Writes `bytes`, completing the whole write or failing.
    ///
    /// §2 notes frames are small enough (≤31 bytes) that an
    /// implementation may treat a frame-sized write as atomic at this
    /// layer; this trait reflects that by not returning a partial
    /// byte count.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Drains and returns whatever bytes are currently available to
    /// read, without blocking. Returns an empty vector if none.
    fn read_available(&mut self) -> Vec<u8>;
}

/// An in-memory loopback serial port for tests.
///
/// Two instances can be connected back to back with [`LoopbackSerial::pair`]
/// so that writes on one side become readable on the other, modelling
/// two engines talking over a shared link.
#[derive(Debug, Clone)]
pub struct LoopbackSerial {
    outbox: Rc<RefCell<VecDeque<u8>>>,
    inbox: Rc<RefCell<VecDeque<u8>>>,
    fail_writes: bool,
}

impl LoopbackSerial {
    /// Creates a connected pair: bytes written to `a` are read from `b`
    /// and vice versa.
    pub fn pair() -> (Self, Self) {
        let a_to_b = Rc::new(RefCell::new(VecDeque::new()));
        let b_to_a = Rc::new(RefCell::new(VecDeque::new()));

        let a = Self {
            outbox: a_to_b.clone(),
            inbox: b_to_a.clone(),
            fail_writes: false,
        };
        let b = Self {
            outbox: b_to_a,
            inbox: a_to_b,
            fail_writes: false,
        };
        (a, b)
    }

    /// Creates a disconnected port: writes go nowhere, reads always empty.
    pub fn detached() -> Self {
        Self {
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            fail_writes: false,
        }
    }

    /// Makes every subsequent `write` fail, for testing `WriteFailed`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Returns the raw bytes the peer has written but this side has
    /// not yet read, without consuming them.
    pub fn peek_inbox(&self) -> Vec<u8> {
        self.inbox.borrow().iter().copied().collect()
    }

    /// Drops a single byte from the front of what's waiting to be
    /// read, simulating corruption/loss on the link.
    pub fn corrupt_next_inbox_byte(&mut self, new_value: u8) {
        if let Some(byte) = self.inbox.borrow_mut().front_mut() {
            *byte = new_value;
        }
    }

    /// Injects `bytes` ahead of whatever the peer has already written
    /// but this side hasn't read yet, for tests simulating noise
    /// arriving on the link ahead of a real frame.
    pub fn feed_junk(&mut self, bytes: &[u8]) {
        let mut inbox = self.inbox.borrow_mut();
        for &byte in bytes.iter().rev() {
            inbox.push_front(byte);
        }
    }
}

impl SerialPort for LoopbackSerial {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::WriteFailed);
        }
        self.outbox.borrow_mut().extend(bytes.iter().copied());
        Ok(())
    }

    fn read_available(&mut self) -> Vec<u8> {
        self.inbox.borrow_mut().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paired_ports_see_each_others_writes() {
        let (mut a, mut b) = LoopbackSerial::pair();
        a.write(b"Hi").unwrap();
        assert_eq!(b.read_available(), b"Hi");
        assert!(b.read_available().is_empty());
    }

    #[test]
    fn detached_port_never_delivers() {
        let mut port = LoopbackSerial::detached();
        port.write(b"hello").unwrap();
        assert!(port.read_available().is_empty());
    }

    #[test]
    fn failing_writes_return_error() {
        let (mut a, _b) = LoopbackSerial::pair();
        a.set_fail_writes(true);
        assert_eq!(a.write(b"x"), Err(Error::WriteFailed));
    }
}
