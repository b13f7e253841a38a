// MIT License - Copyright (c) 2026 Peter Wright
// Fletcher checksum used by the panel

/// Bytes per accumulation block.
const BLOCK_LEN: usize = 256;

/// Compute the panel's 16-bit Fletcher checksum over raw bytes.
///
/// Two accumulators, both modulo 256, walked in 256-byte blocks. The
/// accumulators carry over between blocks; only the block counter restarts.
/// Result is `(sum2 << 8) | sum1`.
///
/// Works on bytes rather than characters so it matches the panel regardless
/// of how the text is encoded above the socket.
pub fn fletcher16(data: &[u8]) -> u16 {
    let mut sum1: u8 = 0;
    let mut sum2: u8 = 0;

    for block in data.chunks(BLOCK_LEN) {
        for &byte in block {
            sum1 = sum1.wrapping_add(byte);
            sum2 = sum2.wrapping_add(sum1);
        }
    }

    (u16::from(sum2) << 8) | u16::from(sum1)
}

/// Format a checksum the way it appears on the wire: 4 uppercase hex digits.
pub fn to_wire(checksum: u16) -> String {
    format!("{:04X}", checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Straight modular reference, no blocking.
    fn reference(data: &[u8]) -> u16 {
        let (mut s1, mut s2) = (0u32, 0u32);
        for &b in data {
            s1 = (s1 + b as u32) % 256;
            s2 = (s2 + s1) % 256;
        }
        ((s2 << 8) | s1) as u16
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fletcher16(&[]), 0);
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(fletcher16(&[0x41]), 0x4141);
    }

    #[test]
    fn test_known_panel_message() {
        // Body of "[test 18313100003D504]"
        assert_eq!(fletcher16(b"test 18313100003"), 0xD504);
        assert_eq!(fletcher16(b"test 18313100003"), 54532);
    }

    #[test]
    fn test_accumulators_wrap() {
        assert_eq!(fletcher16(&[0xFF, 0x01]), reference(&[0xFF, 0x01]));
        assert_eq!(fletcher16(&[0xFF; 3]), 0xFAFD);
    }

    #[test]
    fn test_block_boundaries_do_not_reset_sums() {
        for len in [255usize, 256, 257, 511, 512, 513, 1000] {
            let data: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
            assert_eq!(fletcher16(&data), reference(&data), "len {}", len);
        }
    }

    #[test]
    fn test_deterministic() {
        let data = b"1234 18140101001";
        assert_eq!(fletcher16(data), fletcher16(data));
    }

    #[test]
    fn test_non_ascii_bytes() {
        let data = "Kü 18".as_bytes();
        assert_eq!(fletcher16(data), reference(data));
    }

    #[test]
    fn test_to_wire() {
        assert_eq!(to_wire(0xD504), "D504");
        assert_eq!(to_wire(0x00AB), "00AB");
    }
}
