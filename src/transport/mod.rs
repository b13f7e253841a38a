// MIT License - Copyright (c) 2026 Peter Wright
// Inbound TCP transport

pub mod connection;
pub mod framing;

/// Receives each datagram cut from a panel connection.
///
/// Called inline on the connection task, before the ACK is written, so
/// implementations must not block: decode, decide, hand off, return.
pub trait DatagramHandler: Send + Sync {
    fn handle(&self, raw: &[u8]);
}
