//! Sample Buffer Interfaces Library
//!
//! Defines the contract for an externally owned, reference-counted block
//! of interleaved complex Q.15 samples that the filter engine reads from
//! but never allocates, plus a concrete implementation so the workspace
//! is self-contained and testable without a real capture source.

pub mod sample_buffer;

pub use sample_buffer::{ArcSampleBuffer, SampleBuffer};

use thiserror::Error;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("raw sample bytes must be a multiple of 4 (two i16 per sample)")]
    MalformedByteLength,

    #[error("sample buffer must hold at least one sample")]
    EmptyBuffer,
}