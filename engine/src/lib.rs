//! Decimating Complex FIR Filter Engine
//!
//! A sample-buffer-chained, fixed-point complex-convolution engine with
//! integrated decimation and phase derotation: taps may straddle the
//! boundary between two producer-supplied buffers, all arithmetic is
//! Q.15/Q.30 fixed point, and an optional per-output phase derotation
//! narrows the passband around a baseband frequency offset.

pub mod convolution;
pub mod derotator;
pub mod driver;


pub use derotator::Derotator;
pub use driver::{DerotateConfig, FirFilter};

use thiserror::Error;

/// Closed error taxonomy for the driver API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("tap arrays must be non-empty")]
    EmptyTaps,

    #[error("tap array length mismatch: re={re_len} im={im_len}")]
    TapLengthMismatch { re_len: usize, im_len: usize },

    #[error("decimation factor must be at least 1")]
    InvalidDecimation,

    #[error("output buffer must be non-empty with an even length (interleaved re/im pairs)")]
    InvalidOutputLength,

    #[error("both buffer slots are already occupied")]
    Busy,

    #[error("this buffer instance is already held by the filter")]
    AlreadyHeld,
}
