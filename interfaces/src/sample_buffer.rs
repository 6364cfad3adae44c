//! Sample Buffer Contract
//!
//! An externally owned block of interleaved complex Q.15 samples
//! (`[re0, im0, re1, im1, ...]`). The engine requires, for any buffer it
//! holds: `data()` is readable for `2*len()` `i16` elements in interleaved
//! order, `len() > 0`, and the buffer is never mutated by the engine.
//!
//! Reference counting is `Arc` cloning, not a separate `incref`/`decref`
//! pair: the engine's held `Arc<dyn SampleBuffer>` clone *is* its
//! reference, and dropping that clone when a buffer is fully consumed *is*
//! the decref. The engine never constructs a fresh `Arc` from scratch for
//! a buffer someone else owns — it only ever clones the one handed to it
//! by `push`.

use crate::InterfaceError;

/// Contract for a block of interleaved Q.15 I/Q samples.
pub trait SampleBuffer: Send + Sync {
    /// Interleaved `[re0, im0, re1, im1, ...]`, length `2 * len()`.
    fn data(&self) -> &[i16];

    /// Number of complex samples (`data().len() / 2`).
    fn len(&self) -> usize {
        self.data().len() / 2
    }

    /// Fetch the `i`th complex sample.
    #[inline]
    fn sample(&self, i: usize) -> (i16, i16) {
        let d = self.data();
        (d[2 * i], d[2 * i + 1])
    }
}

/// A plain heap-allocated sample buffer, for feeding the engine from a
/// file, a test fixture, or any other producer that doesn't need its own
/// `SampleBuffer` impl.
#[derive(Debug, Clone)]
pub struct ArcSampleBuffer {
    data: Box<[i16]>,
}

impl ArcSampleBuffer {
    /// Build from `(re, im)` pairs.
    pub fn from_samples(samples: &[(i16, i16)]) -> Result<Self, InterfaceError> {
        if samples.is_empty() {
            return Err(InterfaceError::EmptyBuffer);
        }
        let mut data = Vec::with_capacity(samples.len() * 2);
        for &(re, im) in samples {
            data.push(re);
            data.push(im);
        }
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Build from a little-endian interleaved `i16` byte slice.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, InterfaceError> {
        let samples =
            common::samples_from_le_bytes(bytes).ok_or(InterfaceError::MalformedByteLength)?;
        Self::from_samples(&samples)
    }
}

impl SampleBuffer for ArcSampleBuffer {
    fn data(&self) -> &[i16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_sample_list() {
        assert!(matches!(
            ArcSampleBuffer::from_samples(&[]),
            Err(InterfaceError::EmptyBuffer)
        ));
    }

    #[test]
    fn exposes_interleaved_data_and_len() {
        let buf = ArcSampleBuffer::from_samples(&[(1, -2), (3, 4)]).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.data(), &[1, -2, 3, 4]);
        assert_eq!(buf.sample(1), (3, 4));
    }

    #[test]
    fn from_le_bytes_rejects_malformed_length() {
        assert!(matches!(
            ArcSampleBuffer::from_le_bytes(&[0u8; 3]),
            Err(InterfaceError::MalformedByteLength)
        ));
    }
}
