//! Packet checksums.

/// CRC-16-CCITT (polynomial 0x1021, initial value 0xFFFF, no reflection).
///
/// Used by MISB ST 1108 and later local sets. The checksum covers the packet
/// from the first key byte through the checksum's own tag and length bytes.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    crc16_ccitt_update(0xFFFF, data)
}

/// Continue a CRC-16-CCITT computation over more bytes.
pub fn crc16_ccitt_update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
