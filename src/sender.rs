//! Sender state machine (§4.4).

use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::event::TransportEvent;
use crate::fragment::{self, Chunk};
use crate::frame::{self, FrameType};
use crate::serial::SerialPort;
use crate::stats::EngineStats;
use crate::timer::Timer;

/// Sender state.
#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    AwaitingChunkAck { cursor: usize, retries: u8 },
    AwaitingPacketAck,
}

/// Drives an outbound packet through fragmentation, per-chunk ACK and
/// retransmission, and (per the chosen interpretation of §4.4) a
/// final whole-packet ACK wait.
#[derive(Debug)]
pub struct Sender {
    state: State,
    chunks: Vec<Chunk>,
    total_bytes: usize,
    sent_bytes: usize,
}

impl Sender {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            chunks: Vec::new(),
            total_bytes: 0,
            sent_bytes: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Begins sending `packet`. Rejects with `Error::Busy` unless idle
    /// (§4.4 concurrency decision: reject, do not queue), and with
    /// `Error::PacketTooLarge` if it would need more than 255 chunks.
    pub fn send_packet(
        &mut self,
        packet: &[u8],
        config: &EngineConfig,
        serial: &mut impl SerialPort,
        timer: &mut impl Timer,
        stats: &mut EngineStats,
        emit: &mut impl FnMut(TransportEvent),
    ) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::Busy);
        }
        if fragment::chunk_count(packet.len()) > 255 {
            return Err(Error::PacketTooLarge);
        }

        self.chunks = fragment::fragment(packet);
        self.total_bytes = packet.len();
        self.sent_bytes = 0;

        match self.transmit_chunk(0, config, serial, timer, stats) {
            Ok(()) => {
                self.state = State::AwaitingChunkAck {
                    cursor: 0,
                    retries: 0,
                };
                Ok(())
            }
            Err(err) => {
                self.abort(err, emit);
                Err(err)
            }
        }
    }

    /// Handles an ACK or PACKET_ACK frame forwarded by the receiver.
    pub fn on_ack(
        &mut self,
        frame_type: FrameType,
        seq: u8,
        config: &EngineConfig,
        serial: &mut impl SerialPort,
        timer: &mut impl Timer,
        stats: &mut EngineStats,
        emit: &mut impl FnMut(TransportEvent),
    ) {
        match (&self.state, frame_type) {
            (State::AwaitingChunkAck { cursor, .. }, FrameType::Ack) if seq as usize == *cursor => {
                let cursor = *cursor;
                timer.stop();
                let chunk_len = self.chunks[cursor].payload.len();
                self.sent_bytes += chunk_len;
                stats.bytes_sent += chunk_len as u64;
                emit(TransportEvent::SendProgress {
                    sent_bytes: self.sent_bytes,
                    total_bytes: self.total_bytes,
                });

                let next = cursor + 1;
                if next < self.chunks.len() {
                    match self.transmit_chunk(next, config, serial, timer, stats) {
                        Ok(()) => {
                            self.state = State::AwaitingChunkAck {
                                cursor: next,
                                retries: 0,
                            };
                        }
                        Err(err) => self.abort(err, emit),
                    }
                } else if config.wait_for_packet_ack {
                    self.state = State::AwaitingPacketAck;
                } else {
                    self.complete_ok(stats, emit);
                }
            }
            (State::AwaitingPacketAck, FrameType::PacketAck) => {
                self.complete_ok(stats, emit);
            }
            // Stale/duplicate/premature ACKs are ignored.
            _ => {}
        }
    }

    /// Handles the per-chunk retransmission timer firing.
    pub fn on_timeout(
        &mut self,
        config: &EngineConfig,
        serial: &mut impl SerialPort,
        timer: &mut impl Timer,
        stats: &mut EngineStats,
        emit: &mut impl FnMut(TransportEvent),
    ) {
        let State::AwaitingChunkAck { cursor, retries } = self.state else {
            return;
        };

        if retries + 1 > config.max_retries {
            log::warn!(
                "chunk {cursor} exhausted {} retries, aborting send",
                config.max_retries
            );
            emit(TransportEvent::Error(Error::SendTimeout));
            self.reset();
            emit(TransportEvent::PacketSent { ok: false });
            return;
        }

        stats.retransmissions += 1;
        match self.transmit_chunk(cursor, config, serial, timer, stats) {
            Ok(()) => {
                self.state = State::AwaitingChunkAck {
                    cursor,
                    retries: retries + 1,
                };
            }
            Err(err) => self.abort(err, emit),
        }
    }

    fn transmit_chunk(
        &self,
        index: usize,
        config: &EngineConfig,
        serial: &mut impl SerialPort,
        timer: &mut impl Timer,
        stats: &mut EngineStats,
    ) -> Result<()> {
        let chunk = &self.chunks[index];
        let bytes = frame::encode_vec(FrameType::Data, chunk.seq, chunk.total, &chunk.payload);
        log::trace!(
            "tx DATA seq={} total={} len={}",
            chunk.seq,
            chunk.total,
            chunk.payload.len()
        );
        serial.write(&bytes).map_err(|_| Error::WriteFailed)?;
        stats.frames_sent += 1;
        timer.start(Duration::from_millis(config.timeout_ms));
        Ok(())
    }

    fn complete_ok(&mut self, stats: &mut EngineStats, emit: &mut impl FnMut(TransportEvent)) {
        self.reset();
        stats.packets_sent += 1;
        emit(TransportEvent::PacketSent { ok: true });
    }

    fn abort(&mut self, err: Error, emit: &mut impl FnMut(TransportEvent)) {
        log::error!("send aborted: {err}");
        self.reset();
        emit(TransportEvent::Error(err));
        emit(TransportEvent::PacketSent { ok: false });
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.chunks.clear();
        self.total_bytes = 0;
        self.sent_bytes = 0;
    }
}

impl Default for Sender {
    fn default() -> Self {
        Self::new()
    }
}
