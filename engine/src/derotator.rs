//! Phase Derotator
//!
//! Rotates each produced output sample by a Q.15 phasor that advances by
//! a fixed per-output-sample increment, narrowing the passband around a
//! programmable baseband frequency offset. Disabled iff both increment
//! components are zero, in which case the caller should skip straight to
//! the rounded Q.15 accumulator instead of calling [`Derotator::step`].

use common::{cmul_q15_q15, cmul_q15_q30, round_q30_q15};

/// `Q15_ONE` (`2^15`) does not fit in a signed 16-bit word; the nearest
/// representable unit magnitude is `i16::MAX` (`32767`), one LSB short of
/// exactly `1.0`. Every fixed-point identity coefficient and initial
/// phasor in this codebase uses this value, matching the `(32767, 0)`
/// approximation the filter core's own test scenarios document.
pub const Q15_UNITY: i16 = i16::MAX;

/// Per-output-sample phase rotation state.
#[derive(Debug, Clone, Copy)]
pub struct Derotator {
    rot_re: i16,
    rot_im: i16,
    incr_re: i16,
    incr_im: i16,
    rot_counter: u64,
}

impl Derotator {
    /// A derotator with the given per-step increment, phasor initialized
    /// to unity. Passing `(0, 0)` yields a disabled derotator.
    pub fn new(incr_re: i16, incr_im: i16) -> Self {
        Self {
            rot_re: Q15_UNITY,
            rot_im: 0,
            incr_re,
            incr_im,
            rot_counter: 0,
        }
    }

    /// True iff the increment is the identity rotation, i.e. derotation
    /// is disabled and callers should bypass [`Self::step`] entirely.
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.incr_re == 0 && self.incr_im == 0
    }

    /// Count of derotations applied so far (monotonic).
    #[inline]
    pub fn rot_counter(&self) -> u64 {
        self.rot_counter
    }

    /// Rotate one Q.15 accumulated output sample by the current phasor,
    /// then advance the phasor by the configured increment.
    ///
    /// Must not be called when [`Self::is_disabled`] — the disabled case
    /// has no rotation to apply and no phasor advance to perform.
    pub fn step(&mut self, acc_re: i16, acc_im: i16) -> (i16, i16) {
        debug_assert!(!self.is_disabled(), "step() called on a disabled derotator");

        let (r_re, r_im) = cmul_q15_q30(acc_re, acc_im, self.rot_re, self.rot_im);
        let out = (round_q30_q15(r_re), round_q30_q15(r_im));

        let (next_re, next_im) =
            cmul_q15_q15(self.rot_re, self.rot_im, self.incr_re, self.incr_im);
        self.rot_re = next_re;
        self.rot_im = next_im;
        self.rot_counter += 1;

        out
    }
}
