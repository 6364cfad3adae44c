//! Fixed-Point Complex Arithmetic Kernel
//!
//! Scalar primitives for complex multiply-accumulate in the Q.15 and Q.30
//! domains, plus the saturating/rounding narrowing conversion that brings a
//! Q.30 accumulator back down to a Q.15 output sample. These are leaf
//! operations: no sample-buffer, decimation or derotation state lives here.

/// `2^15`, the Q.15 unit value (representing `1.0`).
pub const Q15_ONE: i32 = 1 << 15;

/// One Q.15 complex value: `re / Q15_ONE` and `im / Q15_ONE` in `[-1, 1)`.
pub type Q15 = (i16, i16);

/// One Q.30 complex accumulator value.
pub type Q30 = (i32, i32);

/// `r = a * conj(b)`, both operands in Q.15, result in Q.30 (no shift).
///
/// `r_re = a_re*b_re - a_im*b_im`, `r_im = a_im*b_re + a_re*b_im`. Used for
/// the sample-times-coefficient product inside the convolution inner loop.
#[inline]
pub fn cmul_q15_q30(a_re: i16, a_im: i16, b_re: i16, b_im: i16) -> Q30 {
    let (a_re, a_im, b_re, b_im) = (a_re as i32, a_im as i32, b_re as i32, b_im as i32);
    let r_re = a_re * b_re - a_im * b_im;
    let r_im = a_im * b_re + a_re * b_im;
    (r_re, r_im)
}

/// Same algebra as [`cmul_q15_q30`] but the Q.30 intermediate is rounded
/// and shifted right by 15 to yield a Q.15 result. Used for advancing the
/// derotation phasor by its per-step increment.
#[inline]
pub fn cmul_q15_q15(a_re: i16, a_im: i16, b_re: i16, b_im: i16) -> Q15 {
    let (r_re, r_im) = cmul_q15_q30(a_re, a_im, b_re, b_im);
    (round_q30_q15(r_re), round_q30_q15(r_im))
}

/// Round-to-nearest, shift right by 15, saturate to `i16` range.
///
/// Adds `2^14` (half an LSB at the Q.15 output scale) before the
/// arithmetic shift so ties round away from zero on the positive side,
/// matching the rounding convention of the reference fixed-point path.
#[inline]
pub fn round_q30_q15(x: i32) -> i16 {
    let rounded = x.saturating_add(1 << 14) >> 15;
    rounded.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
