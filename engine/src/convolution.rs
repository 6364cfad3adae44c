//! Decimating Convolution Inner Loop
//!
//! `process_sample` produces one complex Q.15 output sample per call,
//! splicing the tap window across the active buffer and, if the window
//! or the decimation stride runs past its end, the look-ahead buffer —
//! without copying either buffer's contents.

use common::{cmul_q15_q30, round_q30_q15};

use crate::driver::FirFilter;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod simd;

impl FirFilter {
    /// Number of taps.
    #[inline]
    pub(crate) fn n(&self) -> usize {
        self.coeffs_re.len()
    }

    /// Whether the buffers currently held contain enough input to safely
    /// produce one more output sample and land the read cursor somewhere
    /// valid afterwards.
    ///
    /// `N` samples must be available for the tap window itself, and the
    /// cursor must be able to advance by `decimation` without running off
    /// the end of both held buffers at once — a stride that would skip
    /// past both buffers is treated as drained rather than attempted.
    pub(crate) fn can_produce_one(&self) -> bool {
        self.nr_samples >= self.n().max(self.decimation as usize)
    }

    /// Convolve the next `N` samples against the taps, decimate the
    /// cursor, and derotate if configured. Returns `None` (*drained*)
    /// when insufficient input remains — the caller must push more.
    pub(crate) fn process_sample(&mut self) -> Option<(i16, i16)> {
        debug_assert!(
            self.sb_active.is_some(),
            "process_sample called with no active buffer"
        );

        if !self.can_produce_one() {
            return None;
        }

        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        let (acc_re, acc_im) = {
            if is_x86_feature_detected!("sse2") {
                unsafe { self.accumulate_simd() }
            } else {
                self.accumulate_scalar()
            }
        };
        #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
        let (acc_re, acc_im) = self.accumulate_scalar();

        self.advance_stride();

        let acc_re16 = round_q30_q15(acc_re);
        let acc_im16 = round_q30_q15(acc_im);

        let out = match &mut self.derotator {
            Some(d) if !d.is_disabled() => d.step(acc_re16, acc_im16),
            _ => (acc_re16, acc_im16),
        };
        Some(out)
    }

    /// Scalar multiply-accumulate over the tap window, splicing across
    /// `sb_active` and `sb_next` as needed.
    fn accumulate_scalar(&self) -> (i32, i32) {
        let n = self.n();
        let mut acc_re: i32 = 0;
        let mut acc_im: i32 = 0;
        let mut remaining = n;
        let mut cur = self.sb_active.clone();
        let mut off = self.sample_offset;

        while remaining > 0 {
            let buf = cur
                .as_ref()
                .expect("ran out of buffers mid-convolution despite availability check");
            let take = (buf.len() - off).min(remaining);
            let start_coeff = n - remaining;

            for i in 0..take {
                let (s_re, s_im) = buf.sample(off + i);
                let (c_re, c_im) = (
                    self.coeffs_re[start_coeff + i],
                    self.coeffs_im[start_coeff + i],
                );
                let (f_re, f_im) = cmul_q15_q30(c_re, c_im, s_re, s_im);
                acc_re += f_re;
                acc_im += f_im;
            }

            remaining -= take;
            off = 0;
            cur = if remaining > 0 {
                self.sb_next.clone()
            } else {
                None
            };
        }

        (acc_re, acc_im)
    }

    /// Advance the read cursor by `decimation`, retiring `sb_active` and
    /// promoting `sb_next` when the cursor runs off the end of the
    /// active buffer. Retirement test uses `>=`: once the new offset
    /// reaches `active_len` the buffer has no samples left to offer and
    /// must be retired before the next call, scalar and SIMD alike.
    fn advance_stride(&mut self) {
        let decimation = self.decimation as usize;
        let active_len = self
            .sb_active
            .as_ref()
            .expect("advance_stride called with no active buffer")
            .len();
        let new_offset = self.sample_offset + decimation;

        if new_offset >= active_len {
            let overflow = new_offset - active_len;
            self.sb_active = self.sb_next.take();
            self.sample_offset = overflow;

            match &self.sb_active {
                Some(buf) => debug_assert!(
                    self.sample_offset <= buf.len(),
                    "stride skipped past both held buffers"
                ),
                None => debug_assert_eq!(
                    overflow, 0,
                    "stride skipped past both held buffers"
                ),
            }
        } else {
            self.sample_offset = new_offset;
        }

        self.nr_samples = self.nr_samples.saturating_sub(decimation);
    }
}
