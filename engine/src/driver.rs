//! Driver / Public API
//!
//! `FirFilter` enforces the two-buffer admission policy, drives the
//! convolution engine to fill a caller-supplied output block, and
//! retires consumed buffers. `Drop` plays the role of the reference
//! `cleanup`: releasing any buffer `Arc`s still held when the filter goes
//! out of scope.

use std::sync::Arc;

use interfaces::SampleBuffer;
use tracing::{debug, trace};

use crate::derotator::Derotator;
use crate::FilterError;

/// Per-output-sample derotation configuration.
#[derive(Debug, Clone, Copy)]
pub struct DerotateConfig {
    /// Input sample rate, Hz. Must be greater than zero.
    pub sample_rate_hz: u32,
    /// Baseband frequency offset to shift to DC, Hz. May be negative.
    pub freq_shift_hz: i32,
}

impl DerotateConfig {
    /// Per-output-sample Q.15 rotation increment, `exp(-j * omega *
    /// decimation)` where `omega = 2*pi*freq_shift/sample_rate`.
    fn increment_q15(&self, decimation: u32) -> (i16, i16) {
        let omega = 2.0 * std::f64::consts::PI * self.freq_shift_hz as f64
            / self.sample_rate_hz as f64;
        let theta = -omega * decimation as f64;
        let re = (theta.cos() * crate::derotator::Q15_UNITY as f64).round();
        let im = (theta.sin() * crate::derotator::Q15_UNITY as f64).round();
        (
            re.clamp(i16::MIN as f64, i16::MAX as f64) as i16,
            im.clamp(i16::MIN as f64, i16::MAX as f64) as i16,
        )
    }
}

/// The decimating complex FIR filter core.
pub struct FirFilter {
    pub(crate) coeffs_re: Box<[i16]>,
    pub(crate) coeffs_im: Box<[i16]>,
    pub(crate) decimation: u32,
    pub(crate) sb_active: Option<Arc<dyn SampleBuffer>>,
    pub(crate) sb_next: Option<Arc<dyn SampleBuffer>>,
    pub(crate) sample_offset: usize,
    pub(crate) nr_samples: usize,
    pub(crate) derotator: Option<Derotator>,
}

impl FirFilter {
    /// Build a filter from Q.15 taps and a decimation factor, optionally
    /// enabling derotation.
    ///
    /// Fails on empty or mismatched tap arrays, or a zero decimation
    /// factor; no state is constructed on failure.
    pub fn new(
        coeffs_re: &[i16],
        coeffs_im: &[i16],
        decimation: u32,
        derotate: Option<DerotateConfig>,
    ) -> Result<Self, FilterError> {
        if coeffs_re.is_empty() || coeffs_im.is_empty() {
            return Err(FilterError::EmptyTaps);
        }
        if coeffs_re.len() != coeffs_im.len() {
            return Err(FilterError::TapLengthMismatch {
                re_len: coeffs_re.len(),
                im_len: coeffs_im.len(),
            });
        }
        if decimation == 0 {
            return Err(FilterError::InvalidDecimation);
        }

        let derotator = derotate.map(|cfg| {
            let (incr_re, incr_im) = cfg.increment_q15(decimation);
            Derotator::new(incr_re, incr_im)
        });

        debug!(
            n = coeffs_re.len(),
            decimation,
            derotate = derotator.is_some(),
            "initialized FIR filter"
        );

        Ok(Self {
            coeffs_re: coeffs_re.into(),
            coeffs_im: coeffs_im.into(),
            decimation,
            sb_active: None,
            sb_next: None,
            sample_offset: 0,
            nr_samples: 0,
            derotator,
        })
    }

    /// Admit one buffer, transferring one logical reference into the
    /// filter (an `Arc` clone).
    ///
    /// Installs as `sb_active` if empty, else as `sb_next` if that's
    /// empty, else rejects with [`FilterError::Busy`] without touching
    /// the buffer. Pushing a buffer instance the filter already holds
    /// (by pointer identity) is rejected with
    /// [`FilterError::AlreadyHeld`] rather than trusted as a caller
    /// invariant, since `Arc` pointer comparison makes that check free.
    pub fn push(&mut self, buf: Arc<dyn SampleBuffer>) -> Result<(), FilterError> {
        if self.already_held(&buf) {
            return Err(FilterError::AlreadyHeld);
        }

        if self.sb_active.is_none() {
            debug_assert!(self.sb_next.is_none());
            self.nr_samples += buf.len();
            self.sb_active = Some(buf);
        } else if self.sb_next.is_none() {
            self.nr_samples += buf.len();
            self.sb_next = Some(buf);
        } else {
            return Err(FilterError::Busy);
        }

        trace!(nr_samples = self.nr_samples, "buffer admitted");
        Ok(())
    }

    fn already_held(&self, buf: &Arc<dyn SampleBuffer>) -> bool {
        let same = |held: &Option<Arc<dyn SampleBuffer>>| {
            held.as_ref()
                .is_some_and(|h| Arc::ptr_eq(h, buf))
        };
        same(&self.sb_active) || same(&self.sb_next)
    }

    /// Repeatedly convolve, writing interleaved `[re, im, re, im, ...]`
    /// into `out`, until `out` is full or input is exhausted.
    ///
    /// Returns the number of complex samples generated (`<= out.len() /
    /// 2`); fewer than requested means the engine drained and the
    /// caller must push more before calling again. Rejects an `out` that
    /// is empty or holds a partial sample (odd length) with
    /// [`FilterError::InvalidOutputLength`] before touching any state.
    pub fn process(&mut self, out: &mut [i16]) -> Result<usize, FilterError> {
        if out.is_empty() || out.len() % 2 != 0 {
            return Err(FilterError::InvalidOutputLength);
        }

        let max_out = out.len() / 2;
        let mut generated = 0;

        while generated < max_out {
            if self.sb_active.is_none() {
                break;
            }
            match self.process_sample() {
                Some((re, im)) => {
                    out[2 * generated] = re;
                    out[2 * generated + 1] = im;
                    generated += 1;
                }
                None => break,
            }
        }

        trace!(generated, "process() returning");
        Ok(generated)
    }

    /// Whether at least one full tap's worth of input is available, and
    /// a lower-bound estimate of how many outputs that represents.
    pub fn can_process(&self) -> (bool, usize) {
        let n = self.n();
        (self.nr_samples >= n, self.nr_samples / n)
    }

    /// True iff `sb_next` is occupied, i.e. another `push` would be
    /// rejected with [`FilterError::Busy`].
    pub fn full(&self) -> bool {
        self.sb_next.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::ArcSampleBuffer;

    fn buf(samples: &[(i16, i16)]) -> Arc<dyn SampleBuffer> {
        Arc::new(ArcSampleBuffer::from_samples(samples).unwrap())
    }

    #[test]
    fn rejects_empty_taps() {
        assert!(matches!(
            FirFilter::new(&[], &[], 1, None),
            Err(FilterError::EmptyTaps)
        ));
    }

    #[test]
    fn rejects_mismatched_tap_lengths() {
        assert!(matches!(
            FirFilter::new(&[1, 2], &[1], 1, None),
            Err(FilterError::TapLengthMismatch { re_len: 2, im_len: 1 })
        ));
    }

    #[test]
    fn rejects_zero_decimation() {
        assert!(matches!(
            FirFilter::new(&[1], &[0], 0, None),
            Err(FilterError::InvalidDecimation)
        ));
    }

    #[test]
    fn busy_rejects_third_buffer_until_drained() {
        let mut f = FirFilter::new(&[i16::MAX], &[0], 1, None).unwrap();
        f.push(buf(&[(1, 0), (2, 0)])).unwrap();
        f.push(buf(&[(3, 0), (4, 0)])).unwrap();
        assert!(f.full());
        assert_eq!(
            f.push(buf(&[(5, 0), (6, 0)])),
            Err(FilterError::Busy)
        );

        let mut out = [0i16; 4];
        let n = f.process(&mut out).unwrap();
        assert_eq!(n, 2);
        assert!(!f.full());
        f.push(buf(&[(5, 0), (6, 0)])).unwrap();
    }

    #[test]
    fn rejects_the_same_buffer_instance_twice() {
        let mut f = FirFilter::new(&[i16::MAX], &[0], 1, None).unwrap();
        let b = buf(&[(1, 0)]);
        f.push(b.clone()).unwrap();
        assert_eq!(f.push(b), Err(FilterError::AlreadyHeld));
    }

    #[test]
    fn can_process_reports_lower_bound_estimate() {
        let mut f = FirFilter::new(&[1, 2, 3], &[0, 0, 0], 1, None).unwrap();
        assert_eq!(f.can_process(), (false, 0));
        f.push(buf(&[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0)]))
            .unwrap();
        let (ready, est) = f.can_process();
        assert!(ready);
        assert_eq!(est, 2); // floor(7 / 3)
    }

    #[test]
    fn process_returns_zero_with_no_buffers_pushed() {
        let mut f = FirFilter::new(&[i16::MAX], &[0], 1, None).unwrap();
        let mut out = [0i16; 4];
        assert_eq!(f.process(&mut out).unwrap(), 0);
    }

    #[test]
    fn rejects_odd_length_output_buffer() {
        let mut f = FirFilter::new(&[i16::MAX], &[0], 1, None).unwrap();
        let mut out = [0i16; 3];
        assert!(matches!(
            f.process(&mut out),
            Err(FilterError::InvalidOutputLength)
        ));
    }

    #[test]
    fn rejects_empty_output_buffer() {
        let mut f = FirFilter::new(&[i16::MAX], &[0], 1, None).unwrap();
        let mut out: [i16; 0] = [];
        assert!(matches!(
            f.process(&mut out),
            Err(FilterError::InvalidOutputLength)
        ));
    }
}
