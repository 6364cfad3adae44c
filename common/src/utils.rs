//! Byte-Level Sample Conversion
//!
//! Interleaved Q.15 I/Q samples travel as little-endian `i16` pairs
//! `[re0, im0, re1, im1, ...]`. These helpers convert between that wire
//! format and `(re, im)` pairs for file/stream I/O in the `cli` crate;
//! they carry no convolution, decimation or derotation semantics.

use bytes::{BufMut, Bytes, BytesMut};

/// Convert a byte slice to a hex string for debugging raw sample dumps.
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a little-endian interleaved `i16` byte slice into `(re, im)`
/// pairs. Returns `None` if `bytes.len()` is not a multiple of 4 (two
/// `i16`s per sample).
pub fn samples_from_le_bytes(bytes: &[u8]) -> Option<Vec<(i16, i16)>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| {
                let re = i16::from_le_bytes([c[0], c[1]]);
                let im = i16::from_le_bytes([c[2], c[3]]);
                (re, im)
            })
            .collect(),
    )
}

/// Encode `(re, im)` pairs into little-endian interleaved `i16` bytes.
pub fn samples_to_le_bytes(samples: &[(i16, i16)]) -> Bytes {
    let mut out = BytesMut::with_capacity(samples.len() * 4);
    for &(re, im) in samples {
        out.put_i16_le(re);
        out.put_i16_le(im);
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_hex_formats_lowercase_pairs() {
        let data = vec![0x12, 0x34, 0xAB, 0xCD];
        assert_eq!(bytes_to_hex(&data), "12 34 ab cd");
    }

    #[test]
    fn rejects_odd_length() {
        assert_eq!(samples_from_le_bytes(&[0u8; 3]), None);
    }

    #[test]
    fn round_trips_interleaved_samples() {
        let samples = vec![(1000i16, -2000i16), (3000, 4000), (-32768, 32767)];
        let bytes = samples_to_le_bytes(&samples);
        let back = samples_from_le_bytes(&bytes).unwrap();
        assert_eq!(back, samples);
    }
}
