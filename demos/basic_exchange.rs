//! Drives two engines over an in-memory loopback link to show the
//! full send/receive event sequence for a small packet.
//!
//! A real facade would replace `LoopbackSerial`/`ManualTimer` with a
//! serial-port driver and a wall-clock timer, and call `on_readable`
//! from its own event loop instead of in a straight-line script.

use e22_transport::{Engine, EngineConfig, LoopbackSerial, ManualTimer, TransportEvent};

fn main() {
    env_logger::init();

    let (a, b) = LoopbackSerial::pair();
    let mut sender = Engine::new(a, ManualTimer::new(), EngineConfig::default());
    let mut receiver = Engine::new(b, ManualTimer::new(), EngineConfig::default());

    let payload = b"Hello from the E22 transport engine!";
    println!("sending {} bytes", payload.len());

    let mut sink = |event: TransportEvent| println!("event: {event:?}");
    sender.send_packet(payload, &mut sink).unwrap();

    // Shuttle frames back and forth until both sides settle.
    for _ in 0..4 {
        receiver.on_readable(&mut sink);
        sender.on_readable(&mut sink);
    }

    println!("sender stats: {:?}", sender.stats());
    println!("receiver stats: {:?}", receiver.stats());
}
