// MIT License - Copyright (c) 2026 Peter Wright
// Stream -> datagram splitting

use crate::constants::{FRAME_CLOSE, FRAME_OPEN};

/// Cuts a panel byte stream into datagrams.
///
/// A datagram normally runs from `[` to `]`. Reads can split or merge
/// datagrams, so partial input is kept until the next read. Input that can
/// never become a valid datagram is still emitted once, so the caller can
/// log it and ACK it:
/// - a `[` while a datagram is open closes the open one as-is,
/// - bytes outside any bracket run until a line end or the next bracket,
/// - a datagram reaching `max_len` is cut, and the rest of it is discarded
///   up to its `]`, the next `[` or a line end.
///
/// Whitespace between datagrams is discarded.
#[derive(Debug)]
pub struct DatagramSplitter {
    leftover: Vec<u8>,
    max_len: usize,
    discarding: bool,
}

impl DatagramSplitter {
    pub fn new(max_len: usize) -> Self {
        Self {
            leftover: Vec::new(),
            max_len: max_len.max(1),
            discarding: false,
        }
    }

    /// Feed one read's worth of bytes, returning every datagram it completes.
    pub fn push(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut datagrams = Vec::new();

        for &byte in data {
            if self.discarding {
                match byte {
                    FRAME_OPEN => self.discarding = false,
                    FRAME_CLOSE | b'\r' | b'\n' => {
                        self.discarding = false;
                        continue;
                    }
                    _ => continue,
                }
            }
            if self.leftover.is_empty() && byte.is_ascii_whitespace() {
                continue;
            }

            if byte == FRAME_OPEN && !self.leftover.is_empty() {
                datagrams.push(std::mem::take(&mut self.leftover));
            } else if self.in_junk() && is_line_end(byte) {
                datagrams.push(std::mem::take(&mut self.leftover));
                continue;
            }

            self.leftover.push(byte);
            if byte == FRAME_CLOSE {
                datagrams.push(std::mem::take(&mut self.leftover));
            } else if self.leftover.len() >= self.max_len {
                datagrams.push(std::mem::take(&mut self.leftover));
                self.discarding = true;
            }
        }

        datagrams
    }

    /// Bytes of an unfinished datagram, or junk still waiting for its line end.
    pub fn pending(&self) -> &[u8] {
        &self.leftover
    }

    /// Take whatever is left when the stream ends.
    pub fn finish(self) -> Option<Vec<u8>> {
        if self.leftover.is_empty() {
            None
        } else {
            Some(self.leftover)
        }
    }

    fn in_junk(&self) -> bool {
        self.leftover.first().is_some_and(|&b| b != FRAME_OPEN)
    }
}

fn is_line_end(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}
