//! Frame definition and wire (de)serialization.
//!
//! # Frame format
//!
//! ```text
//! 0       1       2       3       4 .. 4+Len-1   4+Len
//! +-------+-------+-------+-------+---------//---+-------+
//! | Type  |  Seq  | Total |  Len  |    Payload    |  CRC8 |
//! +-------+-------+-------+-------+---------//---+-------+
//! ```
//!
//! `Len` is 0..=26. Frame size is always `HEADER_SIZE + Len`, so the
//! wire size ranges from 5 to 31 bytes.

use crate::crc::Crc8;

/// Header size in bytes: type, seq, total, len.
pub const HEADER_SIZE: usize = 4;

/// One trailing CRC-8 byte.
pub const CRC_SIZE: usize = 1;

/// Maximum payload bytes a frame can carry.
pub const MAX_PAYLOAD: usize = crate::config::MAX_CHUNK_PAYLOAD;

/// Smallest possible frame (empty payload).
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// Largest possible frame (full payload).
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD + CRC_SIZE;

/// Frame type tag, occupying the first wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    /// Carries one chunk of packet payload.
    Data = 0x10,

    /// Acknowledges a single chunk by sequence number.
    Ack = 0x20,

    /// Reserved: requests retransmission of a sequence number.
    /// Never emitted by this implementation; see crate docs.
    Nack = 0x30,

    /// Acknowledges that the whole packet has been reassembled.
    PacketAck = 0x50,
}

impl FrameType {
    /// Maps a wire byte to a known frame type, if any.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(Self::Data),
            0x20 => Some(Self::Ack),
            0x30 => Some(Self::Nack),
            0x50 => Some(Self::PacketAck),
            _ => None,
        }
    }
}

/// A decoded frame, borrowing its payload from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub frame_type: FrameType,
    pub seq: u8,
    pub total: u8,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Returns the serialized size of this frame.
    pub const fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CRC_SIZE
    }
}

/// Encodes a frame into `buf`, returning the number of bytes written.
///
/// `payload` is clamped to its first [`MAX_PAYLOAD`] bytes, per §4.2.
/// `buf` must have room for at least `HEADER_SIZE + min(payload.len(),
/// MAX_PAYLOAD) + CRC_SIZE` bytes.
pub fn encode(frame_type: FrameType, seq: u8, total: u8, payload: &[u8], buf: &mut [u8]) -> usize {
    let payload = &payload[..payload.len().min(MAX_PAYLOAD)];
    let size = HEADER_SIZE + payload.len() + CRC_SIZE;
    assert!(buf.len() >= size, "encode buffer too small");

    buf[0] = frame_type as u8;
    buf[1] = seq;
    buf[2] = total;
    buf[3] = payload.len() as u8;
    buf[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);

    let crc = Crc8::compute(&buf[..HEADER_SIZE + payload.len()]);
    buf[HEADER_SIZE + payload.len()] = crc;

    size
}

/// Encodes a frame into a freshly allocated `Vec<u8>`.
pub fn encode_vec(frame_type: FrameType, seq: u8, total: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let n = encode(frame_type, seq, total, payload, &mut buf);
    buf[..n].to_vec()
}

/// Decodes a single frame from the front of `raw`.
///
/// Returns the parsed frame and the number of bytes it consumed. Per
/// §4.2, any structural problem (too short, bad length, bad CRC,
/// unknown type) is a [`None`] rather than an error: callers are
/// expected to treat rejection as a resynchronisation signal, not a
/// propagated failure (see [`crate::accumulator`]).
pub fn decode(raw: &[u8]) -> Option<(Frame<'_>, usize)> {
    if raw.len() < HEADER_SIZE + CRC_SIZE {
        return None;
    }

    let len = raw[3] as usize;
    if len > MAX_PAYLOAD {
        return None;
    }

    let total_size = HEADER_SIZE + len + CRC_SIZE;
    if raw.len() < total_size {
        return None;
    }

    let expected_crc = Crc8::compute(&raw[..HEADER_SIZE + len]);
    let stored_crc = raw[HEADER_SIZE + len];
    if expected_crc != stored_crc {
        return None;
    }

    let frame_type = FrameType::from_u8(raw[0])?;

    let frame = Frame {
        frame_type,
        seq: raw[1],
        total: raw[2],
        payload: &raw[HEADER_SIZE..HEADER_SIZE + len],
    };

    Some((frame, total_size))
}

/// Returns whether a decoded DATA frame's fragmentation fields are
/// internally consistent (`total >= 1`, `seq < total`), per §3.
///
/// A frame failing this check is well-formed on the wire (CRC
/// verified) but semantically malformed; callers ignore it and keep
/// scanning, the same as a CRC or length rejection (§4.5, §4.6).
pub const fn data_frame_is_well_formed(frame: &Frame<'_>) -> bool {
    frame.total != 0 && frame.seq < frame.total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_data_frame() {
        let payload = b"Hi";
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let n = encode(FrameType::Data, 0, 1, payload, &mut buf);

        let (frame, consumed) = decode(&buf[..n]).expect("decode");
        assert_eq!(consumed, n);
        assert_eq!(frame.frame_type, FrameType::Data);
        assert_eq!(frame.seq, 0);
        assert_eq!(frame.total, 1);
        assert_eq!(frame.payload, payload);
    }

    #[test]
    fn s1_wire_bytes_match_spec() {
        // §8 S1: DATA frame for "Hi".
        let bytes = encode_vec(FrameType::Data, 0, 1, b"Hi");
        assert_eq!(bytes, vec![0x10, 0x00, 0x01, 0x02, b'H', b'i', 0x1f]);

        let ack = encode_vec(FrameType::Ack, 0, 1, &[]);
        assert_eq!(ack, vec![0x20, 0x00, 0x01, 0x00, 0x84]);

        let packet_ack = encode_vec(FrameType::PacketAck, 0, 0, &[]);
        assert_eq!(packet_ack, vec![0x50, 0x00, 0x00, 0x00, 0xd8]);
    }

    #[test]
    fn payload_is_clamped_to_max() {
        let oversized = [7u8; 40];
        let bytes = encode_vec(FrameType::Data, 0, 2, &oversized);
        assert_eq!(bytes.len(), HEADER_SIZE + MAX_PAYLOAD + CRC_SIZE);
        assert_eq!(bytes[3] as usize, MAX_PAYLOAD);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        assert!(decode(&[0x10, 0x00, 0x01]).is_none());
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        // Len says 10 bytes follow but only 2 are present.
        assert!(decode(&[0x10, 0x00, 0x01, 10, b'H', b'i']).is_none());
    }

    #[test]
    fn decode_rejects_bad_crc() {
        let mut bytes = encode_vec(FrameType::Data, 0, 1, b"Hi");
        *bytes.last_mut().unwrap() ^= 0xFF;
        assert!(decode(&bytes).is_none());
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        buf[0] = 0x99;
        buf[1] = 0;
        buf[2] = 1;
        buf[3] = 0;
        let crc = Crc8::compute(&buf[..HEADER_SIZE]);
        buf[HEADER_SIZE] = crc;
        assert!(decode(&buf[..HEADER_SIZE + CRC_SIZE]).is_none());
    }

    #[test]
    fn every_valid_frame_size_roundtrips() {
        for len in 0..=MAX_PAYLOAD {
            let payload = vec![0xAB; len];
            let bytes = encode_vec(FrameType::Data, 3, 9, &payload);
            assert_eq!(bytes.len(), HEADER_SIZE + len + CRC_SIZE);

            let (frame, consumed) = decode(&bytes).expect("decode");
            assert_eq!(consumed, bytes.len());
            assert_eq!(frame.payload, payload.as_slice());
        }
    }

    #[test]
    fn data_frame_well_formed_check() {
        let good = Frame {
            frame_type: FrameType::Data,
            seq: 2,
            total: 3,
            payload: &[],
        };
        assert!(data_frame_is_well_formed(&good));

        let seq_past_total = Frame {
            frame_type: FrameType::Data,
            seq: 3,
            total: 3,
            payload: &[],
        };
        assert!(!data_frame_is_well_formed(&seq_past_total));

        let zero_total = Frame {
            frame_type: FrameType::Data,
            seq: 0,
            total: 0,
            payload: &[],
        };
        assert!(!data_frame_is_well_formed(&zero_total));
    }
}
