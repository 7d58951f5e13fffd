//! Splits an outbound packet into wire-sized chunks (§4.3).

use crate::config::MAX_CHUNK_PAYLOAD;

/// One fragment of an outbound packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub seq: u8,
    pub total: u8,
    pub payload: Vec<u8>,
}

/// Fragments `packet` into chunks of at most [`MAX_CHUNK_PAYLOAD`] bytes.
///
/// An empty packet still produces exactly one chunk (`total = 1`,
/// empty payload), per §3/§4.3: the wire format always needs at least
/// one DATA frame to carry a "packet", even a zero-length one.
///
/// # Panics
///
/// Panics if `packet` would require more than 255 chunks (the `total`
/// field is a single byte). Callers that accept arbitrary-sized input
/// from a caller rather than a fixed test packet should check this
/// with [`chunk_count`] first and surface [`crate::Error::PacketTooLarge`].
pub fn fragment(packet: &[u8]) -> Vec<Chunk> {
    let total = chunk_count(packet.len());
    assert!(total <= 255, "packet requires more than 255 chunks");
    let total = total as u8;

    if packet.is_empty() {
        return vec![Chunk {
            seq: 0,
            total: 1,
            payload: Vec::new(),
        }];
    }

    packet
        .chunks(MAX_CHUNK_PAYLOAD)
        .enumerate()
        .map(|(i, slice)| Chunk {
            seq: i as u8,
            total,
            payload: slice.to_vec(),
        })
        .collect()
}

/// Returns the number of chunks `fragment` would produce for a packet
/// of length `len`, without allocating.
pub const fn chunk_count(len: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(MAX_CHUNK_PAYLOAD)
    }
}
