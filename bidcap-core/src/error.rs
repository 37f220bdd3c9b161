//! Core error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.
//!
//! Only invalid configuration raises: it is a programmer error and fails
//! fast at call time. Insufficient data and numerically degenerate inputs
//! are never errors — they degrade to documented fallbacks surfaced via
//! explicit flags on the result records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bin width must be positive, got {0}")]
    NonPositiveBinWidth(f64),

    #[error("ratio range is empty: min {min} >= max {max}")]
    EmptyRatioRange { min: f64, max: f64 },

    #[error("min ratio must be non-negative, got {0}")]
    NegativeMinRatio(f64),

    #[error("margin potential must be in (0, 1], got {0}")]
    InvalidMarginPotential(f64),

    #[error("min days per bin must be at least 1")]
    ZeroMinDaysPerBin,

    #[error("fallback ratio {value} lies outside the ratio range [{min}, {max}]")]
    FallbackOutsideRange { value: f64, min: f64, max: f64 },

    #[error("{name} must be non-negative, got {value}")]
    NegativeParameter { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },

    #[error("soft factor must be in [0, 1], got {0}")]
    InvalidSoftFactor(f64),

    #[error("state thresholds must satisfy 0 < safe < watch <= 1, got safe {safe_below} / watch {watch_below}")]
    InvalidStateThresholds { safe_below: f64, watch_below: f64 },

    #[error("rollup thresholds must satisfy 0 < warning < critical, got warning {warning_at} / critical {critical_at}")]
    InvalidRollupThresholds { warning_at: f64, critical_at: f64 },

    #[error("sale multiplier must be at least 1, got {0}")]
    InvalidSaleMultiplier(f64),

    #[error("ad share bounds must satisfy 0 < min <= default <= 1, got min {min} / default {default}")]
    InvalidAdShareBounds { min: f64, default: f64 },

    #[error("global clip bounds must satisfy 0 <= min < max, got [{min}, {max}]")]
    InvalidGlobalBounds { min: f64, max: f64 },

    #[error("uplift cap must be at least 1, got {0}")]
    InvalidUpliftCap(f64),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, ConfigError>;
