//! Events the engine reports back to its driver (§6).
//!
//! The engine has no knowledge of how its driver wants to surface
//! these to an application — channel, GUI signal, log line — so it
//! just calls a caller-supplied `FnMut(TransportEvent)` sink
//! synchronously, from within whichever engine method produced the
//! event. Sinks must not call back into the engine.

use crate::error::Error;

/// Something the engine wants its driver to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A `send_packet` call has finished, successfully or not.
    PacketSent { ok: bool },

    /// A full packet was reassembled from incoming chunks.
    PacketReceived { bytes: Vec<u8> },

    /// A chunk was confirmed sent (ACK received for it).
    SendProgress { sent_bytes: usize, total_bytes: usize },

    /// Receive-side reassembly made progress.
    ReceiveProgress { received_bytes: usize, estimated_total_bytes: usize },

    /// A surfaced error condition (§7: `Busy`, `WriteFailed`, `SendTimeout`).
    Error(Error),
}
