//! TOML Configuration Structures for the `dcfir` driver
//!
//! A single `#[derive(Deserialize, Serialize)]` tree loaded wholesale from
//! one file, with `serde(default)` filling in anything the caller chooses
//! to omit.

use serde::{Deserialize, Serialize};

/// Top-level configuration for one filter run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DcfirConfig {
    /// Filter taps, given as inline coefficient arrays.
    pub taps: TapsConfig,
    /// Decimation factor (must be >= 1).
    pub decimation: u32,
    /// Optional phase derotation.
    #[serde(default)]
    pub derotate: Option<DerotateConfig>,
    /// Input/output file configuration.
    pub io: IoConfig,
}

/// Complex Q.15 tap coefficients, given as parallel real/imaginary arrays.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TapsConfig {
    /// Real part of each tap.
    pub re: Vec<i16>,
    /// Imaginary part of each tap.
    pub im: Vec<i16>,
}

/// Phase derotation configuration, passed through to
/// `engine::DerotateConfig` unchanged.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DerotateConfig {
    /// Input sample rate, Hz.
    pub sample_rate_hz: u32,
    /// Baseband frequency offset to shift to DC, Hz. May be negative.
    pub freq_shift_hz: i32,
}

impl From<DerotateConfig> for engine::DerotateConfig {
    fn from(cfg: DerotateConfig) -> Self {
        engine::DerotateConfig {
            sample_rate_hz: cfg.sample_rate_hz,
            freq_shift_hz: cfg.freq_shift_hz,
        }
    }
}

/// Input/output file paths and the per-`process` output chunk size.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IoConfig {
    /// Path to a raw little-endian interleaved `i16` I/Q input file.
    pub input_path: String,
    /// Path the filtered output is written to, same raw format.
    pub output_path: String,
    /// Complex samples requested per `process` call.
    #[serde(default = "default_chunk_samples")]
    pub chunk_samples: usize,
}

fn default_chunk_samples() -> usize {
    4096
}

impl DcfirConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DcfirConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let toml_src = r#"
            decimation = 4

            [taps]
            re = [1, 2, 3]
            im = [0, 0, 0]

            [io]
            input_path = "in.raw"
            output_path = "out.raw"
        "#;
        let cfg: DcfirConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.decimation, 4);
        assert_eq!(cfg.taps.re, vec![1, 2, 3]);
        assert!(cfg.derotate.is_none());
        assert_eq!(cfg.io.chunk_samples, default_chunk_samples());
    }

    #[test]
    fn parses_an_optional_derotate_table() {
        let toml_src = r#"
            decimation = 1

            [taps]
            re = [32767]
            im = [0]

            [derotate]
            sample_rate_hz = 1000000
            freq_shift_hz = -250000

            [io]
            input_path = "in.raw"
            output_path = "out.raw"
            chunk_samples = 1024
        "#;
        let cfg: DcfirConfig = toml::from_str(toml_src).unwrap();
        let derotate = cfg.derotate.unwrap();
        assert_eq!(derotate.sample_rate_hz, 1_000_000);
        assert_eq!(derotate.freq_shift_hz, -250_000);
        assert_eq!(cfg.io.chunk_samples, 1024);
    }
}
