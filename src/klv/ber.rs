//! BER length and BER-OID tag encoding (SMPTE ST 336).

use bytes::{Buf, BufMut};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Encoded BER length: one prefix byte plus up to eight length bytes.
pub type BerBytes = SmallVec<[u8; 10]>;

/// Encode a length using BER (Basic Encoding Rules).
///
/// - 0-127: Single byte
/// - 128+: `0x80 | n` followed by `n` big-endian bytes, `n` minimal
pub fn encode_ber_length(length: usize) -> BerBytes {
    let mut out = BerBytes::new();
    if length < 128 {
        out.push(length as u8);
        return out;
    }

    let length = length as u64;
    let num_bytes = (64 - length.leading_zeros()).div_ceil(8) as usize;
    out.push(0x80 | num_bytes as u8);
    out.extend_from_slice(&length.to_be_bytes()[8 - num_bytes..]);
    out
}

/// Number of bytes [`encode_ber_length`] produces for `length`.
pub fn ber_length_size(length: usize) -> usize {
    if length < 128 {
        1
    } else {
        1 + (64 - (length as u64).leading_zeros()).div_ceil(8) as usize
    }
}

/// Read a BER length from a cursor.
pub fn read_ber_length<B: Buf>(buf: &mut B) -> Result<usize> {
    read_ber_length_bytes(buf).map(|(length, _)| length)
}

/// Read a BER length, also returning the bytes it was encoded with.
///
/// Checksums cover the length field as it appeared on the wire, which may
/// use a longer form than [`encode_ber_length`] would produce.
pub fn read_ber_length_bytes<B: Buf>(buf: &mut B) -> Result<(usize, BerBytes)> {
    if !buf.has_remaining() {
        return Err(Error::underrun(1, 0));
    }

    let first = buf.get_u8();
    let mut raw = BerBytes::new();
    raw.push(first);
    if first < 128 {
        return Ok((first as usize, raw));
    }

    let num_bytes = (first & 0x7F) as usize;
    if num_bytes == 0 || num_bytes > 8 {
        return Err(Error::malformed(format!(
            "BER length with {num_bytes} length bytes"
        )));
    }
    if buf.remaining() < num_bytes {
        return Err(Error::underrun(num_bytes, buf.remaining()));
    }

    let mut length = 0u64;
    for _ in 0..num_bytes {
        let byte = buf.get_u8();
        raw.push(byte);
        length = (length << 8) | u64::from(byte);
    }
    let length = usize::try_from(length)
        .map_err(|_| Error::malformed(format!("BER length {length} does not fit in memory")))?;
    Ok((length, raw))
}

/// Write a BER length, failing if more than `max_length` bytes are needed.
pub fn write_ber_length<B: BufMut>(length: usize, buf: &mut B, max_length: usize) -> Result<()> {
    let encoded = encode_ber_length(length);
    let available = max_length.min(buf.remaining_mut());
    if encoded.len() > available {
        return Err(Error::overflow(encoded.len(), available));
    }
    buf.put_slice(&encoded);
    Ok(())
}

/// Encode a tag as BER-OID: 7-bit groups, high bit set on all but the last.
pub fn encode_ber_oid(value: u64) -> BerBytes {
    let mut out = BerBytes::new();
    let groups = ber_oid_size(value);
    for i in (0..groups).rev() {
        let group = ((value >> (7 * i)) & 0x7F) as u8;
        out.push(if i == 0 { group } else { group | 0x80 });
    }
    out
}

/// Number of bytes [`encode_ber_oid`] produces for `value`.
pub fn ber_oid_size(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Read a BER-OID encoded integer.
pub fn read_ber_oid<B: Buf>(buf: &mut B) -> Result<u64> {
    let mut value = 0u64;
    for count in 1..=10 {
        if !buf.has_remaining() {
            return Err(Error::underrun(1, 0));
        }
        let byte = buf.get_u8();
        if value.leading_zeros() < 7 {
            break;
        }
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        if count == 10 {
            break;
        }
    }
    Err(Error::malformed("BER-OID value overflows 64 bits"))
}

/// Write a BER-OID encoded integer, failing if more than `max_length` bytes
/// are needed.
pub fn write_ber_oid<B: BufMut>(value: u64, buf: &mut B, max_length: usize) -> Result<()> {
    let encoded = encode_ber_oid(value);
    let available = max_length.min(buf.remaining_mut());
    if encoded.len() > available {
        return Err(Error::overflow(encoded.len(), available));
    }
    buf.put_slice(&encoded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_length_encoding() {
        assert_eq!(encode_ber_length(0).as_slice(), &[0x00]);
        assert_eq!(encode_ber_length(127).as_slice(), &[0x7F]);
        assert_eq!(encode_ber_length(128).as_slice(), &[0x81, 0x80]);
        assert_eq!(encode_ber_length(255).as_slice(), &[0x81, 0xFF]);
        assert_eq!(encode_ber_length(256).as_slice(), &[0x82, 0x01, 0x00]);
        assert_eq!(encode_ber_length(65535).as_slice(), &[0x82, 0xFF, 0xFF]);
        assert_eq!(
            encode_ber_length(65536).as_slice(),
            &[0x83, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn test_ber_length_size_matches_encoding() {
        for length in [0, 1, 127, 128, 255, 256, 65535, 65536, 1 << 24, usize::MAX] {
            assert_eq!(ber_length_size(length), encode_ber_length(length).len());
        }
    }

    #[test]
    fn test_ber_length_decoding() {
        fn decode(data: &[u8]) -> Option<(usize, usize)> {
            let mut cursor = data;
            let length = read_ber_length(&mut cursor).ok()?;
            Some((length, data.len() - cursor.len()))
        }

        assert_eq!(decode(&[0x00]), Some((0, 1)));
        assert_eq!(decode(&[0x7F]), Some((127, 1)));
        assert_eq!(decode(&[0x81, 0x80]), Some((128, 2)));
        assert_eq!(decode(&[0x82, 0x01, 0x00]), Some((256, 3)));
        assert_eq!(decode(&[0x82, 0x01]), None);
        assert_eq!(decode(&[]), None);
    }

    #[test]
    fn test_ber_length_too_wide() {
        let mut data: &[u8] = &[0x89, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        assert!(matches!(
            read_ber_length(&mut data),
            Err(Error::MalformedValue(_))
        ));
    }

    #[test]
    fn test_ber_length_keeps_raw_bytes() {
        // Non-minimal long form for a short length.
        let mut data: &[u8] = &[0x82, 0x00, 0x05, 0xAA];
        let (length, raw) = read_ber_length_bytes(&mut data).unwrap();
        assert_eq!(length, 5);
        assert_eq!(raw.as_slice(), &[0x82, 0x00, 0x05]);
        assert_eq!(data, &[0xAA]);
    }

    #[test]
    fn test_ber_length_write_overflow() {
        let mut dest = [0u8; 1];
        let mut cursor = &mut dest[..];
        let result = write_ber_length(300, &mut cursor, 1);
        assert!(matches!(
            result,
            Err(Error::BufferOverflow { needed: 3, available: 1 })
        ));
        assert_eq!(cursor.len(), 1);
    }

    #[test]
    fn test_ber_oid() {
        assert_eq!(encode_ber_oid(0).as_slice(), &[0x00]);
        assert_eq!(encode_ber_oid(127).as_slice(), &[0x7F]);
        assert_eq!(encode_ber_oid(128).as_slice(), &[0x81, 0x00]);
        assert_eq!(encode_ber_oid(16383).as_slice(), &[0xFF, 0x7F]);

        let mut data: &[u8] = &[0x81, 0x00, 0x05];
        assert_eq!(read_ber_oid(&mut data).unwrap(), 128);
        assert_eq!(read_ber_oid(&mut data).unwrap(), 5);
        assert!(matches!(
            read_ber_oid(&mut data),
            Err(Error::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_ber_oid_truncated() {
        let mut data: &[u8] = &[0x81];
        assert!(matches!(
            read_ber_oid(&mut data),
            Err(Error::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_ber_oid_max() {
        let encoded = encode_ber_oid(u64::MAX);
        assert_eq!(encoded.len(), 10);
        let mut data = encoded.as_slice();
        assert_eq!(read_ber_oid(&mut data).unwrap(), u64::MAX);
    }
}
