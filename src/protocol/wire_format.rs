//! Wire format encoding and decoding.
//!
//! Implements the 9-byte frame header:
//! ```text
//! ┌──────────┬───────┬───────┬───┬───────────┐
//! │ Length   │ Type  │ Flags │ R │ Stream ID │
//! │ 24 bits  │ 8 bits│ 8 bits│ 1 │ 31 bits   │
//! └──────────┴───────┴───────┴───┴───────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. The reserved bit `R` is always
//! written as 0 and ignored on read.

/// Header size in bytes (fixed, exactly 9).
pub const HEADER_SIZE: usize = 9;

/// Largest payload length the 24-bit length field can carry.
pub const MAX_FRAME_LENGTH: u32 = (1 << 24) - 1;

/// Largest stream identifier (31 bits).
pub const MAX_STREAM_ID: u32 = (1 << 31) - 1;

/// Mask clearing the reserved bit of the stream identifier.
const STREAM_ID_MASK: u32 = 0x7FFF_FFFF;

/// Frame type codes.
pub mod frame_type {
    /// SETTINGS frame.
    pub const SETTINGS: u8 = 0x04;
}

/// Flag constants, interpreted per frame type.
pub mod flags {
    /// SETTINGS: acknowledgment of the peer's SETTINGS.
    pub const ACK: u8 = 0x01;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Payload length in bytes (24 bits).
    pub length: u32,
    /// Frame type code.
    pub frame_type: u8,
    /// Type-dependent flags.
    pub flags: u8,
    /// Stream identifier (31 bits, 0 = connection).
    pub stream_id: u32,
}

impl Header {
    /// Create a new header.
    pub fn new(length: u32, frame_type: u8, flags: u8, stream_id: u32) -> Self {
        Self {
            length,
            frame_type,
            flags,
            stream_id,
        }
    }

    /// Encode header to bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use h2wire::protocol::{frame_type, Header};
    ///
    /// let bytes = Header::new(6, frame_type::SETTINGS, 0, 0).encode();
    /// assert_eq!(bytes, [0, 0, 6, 4, 0, 0, 0, 0, 0]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (9 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        let length = self.length.to_be_bytes();
        buf[0..3].copy_from_slice(&length[1..4]);
        buf[3] = self.frame_type;
        buf[4] = self.flags;
        buf[5..9].copy_from_slice(&(self.stream_id & STREAM_ID_MASK).to_be_bytes());
    }

    /// Decode header from bytes.
    ///
    /// Returns `None` if buffer is too short. The reserved bit is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use h2wire::protocol::Header;
    ///
    /// let header = Header::decode(&[0, 0, 0, 4, 1, 0x80, 0, 0, 3]).unwrap();
    /// assert_eq!(header.length, 0);
    /// assert_eq!(header.stream_id, 3);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            length: u32::from_be_bytes([0, buf[0], buf[1], buf[2]]),
            frame_type: buf[3],
            flags: buf[4],
            stream_id: u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]) & STREAM_ID_MASK,
        })
    }

    /// Check if a flag is set.
    #[inline]
    pub fn has_flag(&self, flag: u8) -> bool {
        flags::has_flag(self.flags, flag)
    }

    /// Check if this is a SETTINGS frame.
    #[inline]
    pub fn is_settings(&self) -> bool {
        self.frame_type == frame_type::SETTINGS
    }
}

/// Encode a header to bytes (standalone function).
#[inline]
pub fn encode_header(header: &Header) -> [u8; HEADER_SIZE] {
    header.encode()
}

/// Decode a header from bytes (standalone function).
#[inline]
pub fn decode_header(buf: &[u8]) -> Option<Header> {
    Header::decode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_decode_roundtrip() {
        let samples = [
            Header::new(0, 0, 0, 0),
            Header::new(MAX_FRAME_LENGTH, 0xFF, 0xFF, MAX_STREAM_ID),
            Header::new(0x00_1234, frame_type::SETTINGS, flags::ACK, 0x0102_0304),
            Header::new(16_384, 0x00, 0x01, 1),
        ];
        for original in samples {
            let decoded = Header::decode(&original.encode()).unwrap();
            assert_eq!(original, decoded);
        }
    }

    #[test]
    fn test_header_big_endian_byte_order() {
        let header = Header::new(0x010203, 0x04, 0x05, 0x06070809);
        let bytes = header.encode();
        assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }

    #[test]
    fn test_decode_ignores_reserved_bit() {
        let clear = [0, 0, 1, 0, 0, 0x00, 0, 0, 7];
        let set = [0, 0, 1, 0, 0, 0x80, 0, 0, 7];
        let a = Header::decode(&clear).unwrap();
        let b = Header::decode(&set).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.stream_id, 7);

        let all = [0xFF; HEADER_SIZE];
        assert_eq!(Header::decode(&all).unwrap().stream_id, MAX_STREAM_ID);
    }

    #[test]
    fn test_encode_clears_reserved_bit() {
        let header = Header::new(0, 0, 0, 0xFFFF_FFFF);
        let bytes = header.encode();
        assert_eq!(bytes[5], 0x7F);
        assert_eq!(&bytes[6..], &[0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_too_short_buffer() {
        let buf = [0u8; 8];
        assert!(Header::decode(&buf).is_none());
    }

    #[test]
    fn test_header_size_is_exactly_9() {
        assert_eq!(HEADER_SIZE, 9);
        assert_eq!(Header::new(1, 0, 0, 0).encode().len(), 9);
    }

    #[test]
    fn test_standalone_functions() {
        let header = Header::new(12, frame_type::SETTINGS, 0, 0);
        let decoded = decode_header(&encode_header(&header)).unwrap();
        assert_eq!(header, decoded);
        assert!(decoded.is_settings());
        assert!(!decoded.has_flag(flags::ACK));
    }
}
