//! Error types for the E22 transport engine.

use core::fmt;

/// Result type alias for transport operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error conditions the engine can surface.
///
/// Internal-only conditions (a rejected candidate frame, an abandoned
/// partial reassembly) are handled inline and never reach this type;
/// see the crate-level docs for the full classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `send_packet` was called while a send was already in flight.
    Busy,

    /// The serial port returned an error while writing a frame.
    WriteFailed,

    /// A chunk exhausted `max_retries` retransmissions without an ACK.
    SendTimeout,

    /// A packet exceeds what the wire format can express (more than
    /// 255 chunks, i.e. larger than `255 * max_chunk_payload` bytes).
    PacketTooLarge,
}

impl Error {
    /// Human-readable description, used both for `Display` and for the
    /// `error` event's message field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::Busy => "transport busy: a send is already in flight",
            Error::WriteFailed => "serial write failed",
            Error::SendTimeout => "send timed out after exhausting retries",
            Error::PacketTooLarge => "packet too large to fragment",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Error {}
