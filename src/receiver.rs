//! Receiver state machine (§4.5).

use std::collections::BTreeMap;

use crate::config::MAX_CHUNK_PAYLOAD;
use crate::event::TransportEvent;
use crate::frame::{self, FrameType};
use crate::serial::SerialPort;
use crate::stats::EngineStats;

#[derive(Debug)]
enum State {
    Idle,
    Assembling(Reassembly),
}

#[derive(Debug)]
struct Reassembly {
    total: u8,
    chunks: BTreeMap<u8, Vec<u8>>,
}

impl Reassembly {
    fn new(total: u8) -> Self {
        Self {
            total,
            chunks: BTreeMap::new(),
        }
    }

    fn bytes_so_far(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    fn is_complete(&self) -> bool {
        self.chunks.len() == self.total as usize
    }

    fn reassemble(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes_so_far());
        for seq in 0..self.total {
            if let Some(payload) = self.chunks.get(&seq) {
                out.extend_from_slice(payload);
            }
        }
        out
    }
}

/// Reassembles incoming DATA chunks into whole packets, ACKing each
/// chunk and the completed packet as it goes.
#[derive(Debug, Default)]
pub struct Receiver {
    state: State,
}

impl Default for State {
    fn default() -> Self {
        State::Idle
    }
}

impl Receiver {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Handles one decoded DATA frame.
    ///
    /// Returns `true` if this frame produced a completed, reassembled
    /// packet (already delivered via `emit`), purely so callers that
    /// want to know without matching on events can check quickly.
    pub fn on_data_frame(
        &mut self,
        seq: u8,
        total: u8,
        payload: &[u8],
        serial: &mut impl SerialPort,
        stats: &mut EngineStats,
        emit: &mut impl FnMut(TransportEvent),
    ) -> bool {
        let candidate = crate::frame::Frame {
            frame_type: FrameType::Data,
            seq,
            total,
            payload,
        };
        if !frame::data_frame_is_well_formed(&candidate) {
            log::debug!("dropping malformed DATA frame seq={seq} total={total}");
            return false;
        }

        if !matches!(&self.state, State::Assembling(r) if r.total == total) {
            if matches!(self.state, State::Assembling(_)) {
                log::debug!("total mismatch mid-reassembly, abandoning partial packet");
            }
            self.state = State::Assembling(Reassembly::new(total));
        }

        let State::Assembling(reassembly) = &mut self.state else {
            unreachable!("just set to Assembling above");
        };

        let is_duplicate = reassembly.chunks.contains_key(&seq);
        if is_duplicate {
            stats.duplicate_frames += 1;
            log::trace!("duplicate DATA seq={seq}, re-acking without double count");
        } else {
            reassembly.chunks.insert(seq, payload.to_vec());
            stats.bytes_received += payload.len() as u64;
        }

        let ack = frame::encode_vec(FrameType::Ack, seq, total, &[]);
        let _ = serial.write(&ack);
        stats.frames_sent += 1;

        let bytes_so_far = reassembly.bytes_so_far();
        let estimate = if reassembly.is_complete() {
            bytes_so_far
        } else {
            total as usize * MAX_CHUNK_PAYLOAD
        };
        emit(TransportEvent::ReceiveProgress {
            received_bytes: bytes_so_far,
            estimated_total_bytes: estimate,
        });

        if reassembly.is_complete() {
            let complete = std::mem::replace(&mut self.state, State::Idle);
            let State::Assembling(reassembly) = complete else {
                unreachable!()
            };

            let packet = reassembly.reassemble();
            stats.packets_received += 1;
            emit(TransportEvent::PacketReceived { bytes: packet });

            let packet_ack = frame::encode_vec(FrameType::PacketAck, 0, 0, &[]);
            let _ = serial.write(&packet_ack);
            stats.frames_sent += 1;

            return true;
        }

        false
    }
}
