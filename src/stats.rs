//! Running counters exposed for observability (§10 of the ambient stack).

/// Cumulative counters tracked by a transport engine over its lifetime.
///
/// Not reset between packets; a caller wanting per-packet numbers
/// should snapshot before and after.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Packets successfully sent end to end.
    pub packets_sent: u64,

    /// Packets successfully received end to end.
    pub packets_received: u64,

    /// Frames written to the serial port (DATA, ACK, PACKET_ACK).
    pub frames_sent: u64,

    /// Frames successfully decoded from the serial port.
    pub frames_received: u64,

    /// Payload bytes sent (confirmed by ACK, per §4.4 progress semantics).
    pub bytes_sent: u64,

    /// Payload bytes received and reassembled.
    pub bytes_received: u64,

    /// Per-chunk retransmissions triggered by timeout.
    pub retransmissions: u64,

    /// Candidate frames rejected by CRC, length, or unknown type.
    pub checksum_failures: u64,

    /// Duplicate DATA chunks re-acknowledged without being re-stored.
    pub duplicate_frames: u64,
}
