//! Reliable-delivery transport between a host application and an
//! Ebyte E22-400T22U LoRa radio on a serial link.
//!
//! This crate implements the framing and reliable-delivery core only:
//! fragmentation, CRC-8 integrity, a sender state machine with timed
//! retransmission, and a receiver state machine with reassembly and
//! acknowledgement. It does not open serial ports, configure baud
//! rates, or provide an application-facing facade — [`serial::SerialPort`]
//! and [`timer::Timer`] are the two collaborator interfaces a caller
//! wires up around the engine.
//!
//! # Example
//!
//! ```
//! use e22_transport::{Engine, EngineConfig, LoopbackSerial, ManualTimer, TransportEvent};
//!
//! let (a, b) = LoopbackSerial::pair();
//! let mut sender = Engine::new(a, ManualTimer::new(), EngineConfig::default());
//! let mut receiver = Engine::new(b, ManualTimer::new(), EngineConfig::default());
//!
//! let mut events = Vec::new();
//! sender.send_packet(b"Hi", &mut |e| events.push(e)).unwrap();
//! receiver.on_readable(&mut |e| events.push(e));
//! sender.on_readable(&mut |e| events.push(e));
//!
//! assert!(events.contains(&TransportEvent::PacketSent { ok: true }));
//! ```

pub mod accumulator;
pub mod config;
pub mod crc;
pub mod engine;
pub mod error;
pub mod event;
pub mod fragment;
pub mod frame;
pub mod receiver;
pub mod sender;
pub mod serial;
pub mod stats;
pub mod timer;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use crc::Crc8;
pub use engine::Engine;
pub use error::{Error, Result};
pub use event::TransportEvent;
pub use frame::{Frame, FrameType};
pub use serial::{LoopbackSerial, SerialPort};
pub use stats::EngineStats;
pub use timer::{ManualTimer, SystemTimer, Timer};
