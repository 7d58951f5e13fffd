//! Byte-stream resynchronizing frame scanner (§4.6).
//!
//! The engine only ever receives raw bytes, not frames. [`Accumulator`]
//! buffers those bytes and greedily extracts complete, valid frames
//! from the front, dropping one byte and rescanning whenever the
//! leading bytes cannot start a valid frame. This keeps a single
//! corrupted or resynchronised byte from wedging the link: the scanner
//! always makes forward progress.

use std::collections::VecDeque;

use crate::frame::{Frame, MAX_PAYLOAD};
use crate::stats::EngineStats;

/// A growable buffer of bytes not yet consumed as a complete frame.
///
/// At rest it holds at most one partial frame's prefix.
#[derive(Debug, Default)]
pub struct Accumulator {
    buf: VecDeque<u8>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            buf: VecDeque::new(),
        }
    }

    /// Appends newly read bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().copied());
    }

    /// Extracts and returns the next complete frame, if one is
    /// available, dropping any leading bytes that cannot be part of a
    /// valid frame along the way. Returns `None` once the remaining
    /// bytes are insufficient to decide (§4.6 steps 1 and 3).
    ///
    /// Call this in a loop until it returns `None` to drain every
    /// frame currently decodable from the buffer. Every byte dropped
    /// while resynchronising counts as a checksum/framing failure in
    /// `stats`.
    pub fn next_frame(&mut self, stats: &mut EngineStats) -> Option<DecodedFrame> {
        loop {
            if self.buf.len() < crate::frame::MIN_FRAME_SIZE {
                return None;
            }

            let len = self.buf[3] as usize;
            if len > MAX_PAYLOAD {
                self.buf.pop_front();
                stats.checksum_failures += 1;
                continue;
            }

            let frame_size = crate::frame::HEADER_SIZE + len + crate::frame::CRC_SIZE;
            if self.buf.len() < frame_size {
                return None;
            }

            let candidate: Vec<u8> = self.buf.iter().take(frame_size).copied().collect();
            match crate::frame::decode(&candidate) {
                Some((frame, consumed)) => {
                    debug_assert_eq!(consumed, frame_size);
                    let owned = DecodedFrame {
                        frame_type: frame.frame_type,
                        seq: frame.seq,
                        total: frame.total,
                        payload: frame.payload.to_vec(),
                    };
                    self.buf.drain(..frame_size);
                    return Some(owned);
                }
                None => {
                    self.buf.pop_front();
                    stats.checksum_failures += 1;
                    continue;
                }
            }
        }
    }

    /// Number of bytes currently buffered.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the accumulator is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// An owned copy of a [`Frame`], decoupled from the accumulator's
/// internal buffer lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub frame_type: crate::frame::FrameType,
    pub seq: u8,
    pub total: u8,
    pub payload: Vec<u8>,
}

impl DecodedFrame {
    /// Borrows this owned frame as a [`Frame`], e.g. to reuse
    /// `frame`-module helpers that take a borrowed frame.
    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            frame_type: self.frame_type,
            seq: self.seq,
            total: self.total,
            payload: &self.payload,
        }
    }
}
