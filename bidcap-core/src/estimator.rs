//! Optimal advertising-cost ratio estimation.
//!
//! Estimates, from daily revenue/spend history, the spend-to-revenue
//! ratio at which the product historically made the most profit.
//!
//! # Algorithm
//!
//! 1. Keep days with positive revenue, non-negative spend, and a
//!    spend/revenue ratio inside `[min_ratio, max_ratio]`.
//! 2. Score each kept day with `profit = revenue × (margin_potential −
//!    ratio)` — the gross profit the day produced after ad cost.
//! 3. Partition `[min_ratio, max_ratio)` into fixed-width bins and
//!    accumulate each day into its ratio bin.
//! 4. Among bins holding at least `min_days_per_bin` days, the bin with
//!    the greatest total profit wins; its average ratio is the estimate.
//!
//! Ties are broken toward the lower ratio: the scan runs in ascending
//! ratio order and only a strictly greater total displaces the leader.
//!
//! # Degradation
//!
//! Too little history is not an error. With no valid days, or no bin
//! meeting the day minimum, the estimate is `fallback_ratio` with
//! `used_fallback = true` and LOW confidence, so callers and operators
//! can always see that the fallback path was taken.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreResult};
use crate::metrics::DailyMetric;
use crate::thresholds::{
    DEFAULT_BIN_WIDTH, DEFAULT_FALLBACK_RATIO, DEFAULT_MAX_RATIO, DEFAULT_MIN_DAYS_PER_BIN,
    DEFAULT_MIN_RATIO, HIGH_CONFIDENCE_MIN_BINS, HIGH_CONFIDENCE_MIN_DAYS,
    MEDIUM_CONFIDENCE_MIN_BINS, MEDIUM_CONFIDENCE_MIN_DAYS,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the binned profit search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Gross margin fraction before ad cost is deducted.
    pub margin_potential: f64,
    /// Width of one ratio bin.
    pub bin_width: f64,
    /// Lowest spend/revenue ratio considered plausible (inclusive).
    pub min_ratio: f64,
    /// Highest spend/revenue ratio considered plausible (inclusive).
    pub max_ratio: f64,
    /// Days a bin must hold before it may win the search.
    pub min_days_per_bin: usize,
    /// Ratio returned when the history cannot support an estimate.
    pub fallback_ratio: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            margin_potential: 0.55,
            bin_width: DEFAULT_BIN_WIDTH,
            min_ratio: DEFAULT_MIN_RATIO,
            max_ratio: DEFAULT_MAX_RATIO,
            min_days_per_bin: DEFAULT_MIN_DAYS_PER_BIN,
            fallback_ratio: DEFAULT_FALLBACK_RATIO,
        }
    }
}

impl EstimatorConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.bin_width <= 0.0 {
            return Err(ConfigError::NonPositiveBinWidth(self.bin_width));
        }
        if self.min_ratio < 0.0 {
            return Err(ConfigError::NegativeMinRatio(self.min_ratio));
        }
        if self.min_ratio >= self.max_ratio {
            return Err(ConfigError::EmptyRatioRange {
                min: self.min_ratio,
                max: self.max_ratio,
            });
        }
        if self.margin_potential <= 0.0 || self.margin_potential > 1.0 {
            return Err(ConfigError::InvalidMarginPotential(self.margin_potential));
        }
        if self.min_days_per_bin == 0 {
            return Err(ConfigError::ZeroMinDaysPerBin);
        }
        if self.fallback_ratio < self.min_ratio || self.fallback_ratio > self.max_ratio {
            return Err(ConfigError::FallbackOutsideRange {
                value: self.fallback_ratio,
                min: self.min_ratio,
                max: self.max_ratio,
            });
        }
        Ok(())
    }

    /// Number of bins in the `[min_ratio, max_ratio)` grid.
    ///
    /// The small epsilon keeps exact divisions exact under floating-point
    /// (0.60 / 0.03 must give 20 bins, not 21).
    fn grid_bins(&self) -> usize {
        let raw = (self.max_ratio - self.min_ratio) / self.bin_width;
        ((raw - 1e-9).ceil().max(1.0)) as usize
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// How much evidence backs the estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "HIGH"),
            Confidence::Medium => write!(f, "MEDIUM"),
            Confidence::Low => write!(f, "LOW"),
        }
    }
}

/// The profit-maximizing ratio estimate for one product.
///
/// Created fresh on every evaluation and never mutated.
#[derive(Clone, Debug, Serialize)]
pub struct OptimalRatioEstimate {
    /// Average spend/revenue ratio of the winning bin, or the fallback.
    pub ratio: f64,
    pub confidence: Confidence,
    /// True when the history could not support an estimate and
    /// `fallback_ratio` was substituted.
    pub used_fallback: bool,
    /// Days that survived the validity filter.
    pub valid_days_used: usize,
    /// Bins that met `min_days_per_bin` and so entered the search.
    pub valid_bin_count: usize,
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Default)]
struct RatioBin {
    days: usize,
    total_profit: f64,
    ratio_sum: f64,
}

/// Estimate the profit-maximizing advertising-cost ratio from history.
///
/// Pure and deterministic: identical inputs produce bit-identical
/// estimates. Fails only on invalid configuration.
pub fn estimate_optimal_ratio(
    history: &[DailyMetric],
    config: &EstimatorConfig,
) -> CoreResult<OptimalRatioEstimate> {
    config.validate()?;

    let grid = config.grid_bins();
    let mut bins = vec![RatioBin::default(); grid];
    let mut valid_days = 0usize;

    for day in history {
        if day.revenue <= 0.0 || day.ad_spend < 0.0 {
            continue;
        }
        let ratio = day.ad_spend / day.revenue;
        if ratio < config.min_ratio || ratio > config.max_ratio {
            continue;
        }
        valid_days += 1;

        let profit = day.revenue * (config.margin_potential - ratio);
        // A day at exactly max_ratio belongs to the last bin of the
        // half-open grid.
        let idx = (((ratio - config.min_ratio) / config.bin_width) as usize).min(grid - 1);
        bins[idx].days += 1;
        bins[idx].total_profit += profit;
        bins[idx].ratio_sum += ratio;
    }

    let qualifying = bins
        .iter()
        .filter(|b| b.days >= config.min_days_per_bin)
        .count();

    // Ascending scan; strictly-greater keeps the first bin on ties.
    let mut best: Option<&RatioBin> = None;
    for bin in &bins {
        if bin.days < config.min_days_per_bin {
            continue;
        }
        match best {
            Some(leader) if bin.total_profit <= leader.total_profit => {}
            _ => best = Some(bin),
        }
    }

    match best {
        Some(bin) => Ok(OptimalRatioEstimate {
            ratio: bin.ratio_sum / bin.days as f64,
            confidence: grade_confidence(valid_days, grid),
            used_fallback: false,
            valid_days_used: valid_days,
            valid_bin_count: qualifying,
        }),
        None => {
            log::debug!(
                "ratio estimate fell back to {} ({} valid days, no qualifying bin)",
                config.fallback_ratio,
                valid_days
            );
            Ok(OptimalRatioEstimate {
                ratio: config.fallback_ratio,
                confidence: Confidence::Low,
                used_fallback: true,
                valid_days_used: valid_days,
                valid_bin_count: qualifying,
            })
        }
    }
}

/// Grade confidence from the valid-day sample count and the resolution of
/// the search grid.
fn grade_confidence(valid_days: usize, grid_bins: usize) -> Confidence {
    if valid_days >= HIGH_CONFIDENCE_MIN_DAYS && grid_bins >= HIGH_CONFIDENCE_MIN_BINS {
        Confidence::High
    } else if valid_days >= MEDIUM_CONFIDENCE_MIN_DAYS && grid_bins >= MEDIUM_CONFIDENCE_MIN_BINS {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(offset: u64, revenue: f64, ad_spend: f64) -> DailyMetric {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(offset);
        DailyMetric::new(date, revenue, ad_spend)
    }

    /// N days all at the same spend/revenue ratio.
    fn uniform_history(days: u64, revenue: f64, ratio: f64) -> Vec<DailyMetric> {
        (0..days).map(|i| day(i, revenue, revenue * ratio)).collect()
    }

    #[test]
    fn empty_history_returns_fallback() {
        let config = EstimatorConfig::default();
        let estimate = estimate_optimal_ratio(&[], &config).unwrap();
        assert!(estimate.used_fallback);
        assert_eq!(estimate.confidence, Confidence::Low);
        assert!((estimate.ratio - config.fallback_ratio).abs() < 1e-12);
        assert_eq!(estimate.valid_days_used, 0);
        assert_eq!(estimate.valid_bin_count, 0);
    }

    #[test]
    fn hundred_uniform_days_estimate_their_ratio_with_high_confidence() {
        // 100 days at ratio 0.10 and revenue 10,000: a single populated
        // bin whose average ratio is exactly 0.10.
        let history = uniform_history(100, 10_000.0, 0.10);
        let estimate = estimate_optimal_ratio(&history, &EstimatorConfig::default()).unwrap();
        assert!(!estimate.used_fallback);
        assert!((estimate.ratio - 0.10).abs() < 1e-9);
        assert_eq!(estimate.confidence, Confidence::High);
        assert_eq!(estimate.valid_days_used, 100);
        assert_eq!(estimate.valid_bin_count, 1);
    }

    #[test]
    fn most_profitable_bin_wins() {
        // 10 days at ratio 0.10 on small revenue, 10 days at ratio 0.20
        // on much larger revenue. Profit per 0.20-day: 50,000 × 0.35 =
        // 17,500 vs 1,000 × 0.45 = 450, so the 0.20 bin must win.
        let mut history = uniform_history(10, 1_000.0, 0.10);
        history.extend((10..20).map(|i| day(i, 50_000.0, 10_000.0)));
        let estimate = estimate_optimal_ratio(&history, &EstimatorConfig::default()).unwrap();
        assert!((estimate.ratio - 0.20).abs() < 1e-9);
        assert_eq!(estimate.valid_bin_count, 2);
    }

    #[test]
    fn ties_break_toward_the_lower_ratio_bin() {
        let config = EstimatorConfig {
            min_days_per_bin: 1,
            ..EstimatorConfig::default()
        };
        // Bin [0.09, 0.12): profit 10,000 × (0.55 − 0.10) = 4,500.
        // Bin [0.12, 0.15): profit 11,250 × (0.55 − 0.15) = 4,500.
        let history = vec![day(0, 10_000.0, 1_000.0), day(1, 11_250.0, 1_687.5)];
        let estimate = estimate_optimal_ratio(&history, &config).unwrap();
        assert!((estimate.ratio - 0.10).abs() < 1e-9, "got {}", estimate.ratio);
    }

    #[test]
    fn days_outside_the_ratio_range_are_dropped() {
        let config = EstimatorConfig::default();
        let mut history = uniform_history(40, 10_000.0, 0.10);
        // Ratio 0.90 is far above max_ratio and must not count.
        history.push(day(40, 1_000.0, 900.0));
        // Zero-revenue days must not count either.
        history.push(day(41, 0.0, 500.0));
        let estimate = estimate_optimal_ratio(&history, &config).unwrap();
        assert_eq!(estimate.valid_days_used, 40);
        assert!((estimate.ratio - 0.10).abs() < 1e-9);
    }

    #[test]
    fn day_at_exactly_max_ratio_lands_in_the_last_bin() {
        let config = EstimatorConfig {
            min_days_per_bin: 1,
            ..EstimatorConfig::default()
        };
        let history = uniform_history(5, 10_000.0, config.max_ratio);
        let estimate = estimate_optimal_ratio(&history, &config).unwrap();
        assert!(!estimate.used_fallback);
        assert!((estimate.ratio - config.max_ratio).abs() < 1e-9);
    }

    #[test]
    fn thin_bins_fall_back() {
        // Two days in one bin with min_days_per_bin = 3: no qualifying
        // bin, so the fallback is substituted and flagged.
        let history = uniform_history(2, 10_000.0, 0.10);
        let config = EstimatorConfig::default();
        let estimate = estimate_optimal_ratio(&history, &config).unwrap();
        assert!(estimate.used_fallback);
        assert_eq!(estimate.confidence, Confidence::Low);
        assert_eq!(estimate.valid_days_used, 2);
        assert_eq!(estimate.valid_bin_count, 0);
    }

    #[test]
    fn medium_confidence_between_thirty_and_ninety_days() {
        let history = uniform_history(45, 10_000.0, 0.12);
        let estimate = estimate_optimal_ratio(&history, &EstimatorConfig::default()).unwrap();
        assert_eq!(estimate.confidence, Confidence::Medium);
    }

    #[test]
    fn estimation_is_deterministic() {
        let history = uniform_history(60, 8_000.0, 0.18);
        let config = EstimatorConfig::default();
        let a = estimate_optimal_ratio(&history, &config).unwrap();
        let b = estimate_optimal_ratio(&history, &config).unwrap();
        assert_eq!(a.ratio.to_bits(), b.ratio.to_bits());
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.valid_days_used, b.valid_days_used);
    }

    #[test]
    fn estimate_stays_inside_the_configured_range() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let config = EstimatorConfig::default();
        for _ in 0..20 {
            let history: Vec<DailyMetric> = (0..120)
                .map(|i| {
                    let revenue = rng.gen_range(100.0..50_000.0);
                    let ratio = rng.gen_range(0.0..0.8);
                    day(i, revenue, revenue * ratio)
                })
                .collect();
            let estimate = estimate_optimal_ratio(&history, &config).unwrap();
            assert!(estimate.ratio >= config.min_ratio - 1e-9);
            assert!(estimate.ratio <= config.max_ratio + 1e-9);
        }
    }

    #[test]
    fn invalid_configs_fail_fast() {
        let history = uniform_history(10, 10_000.0, 0.10);

        let bad_width = EstimatorConfig {
            bin_width: 0.0,
            ..EstimatorConfig::default()
        };
        assert!(matches!(
            estimate_optimal_ratio(&history, &bad_width),
            Err(ConfigError::NonPositiveBinWidth(_))
        ));

        let bad_range = EstimatorConfig {
            min_ratio: 0.5,
            max_ratio: 0.5,
            ..EstimatorConfig::default()
        };
        assert!(matches!(
            estimate_optimal_ratio(&history, &bad_range),
            Err(ConfigError::EmptyRatioRange { .. })
        ));

        let bad_fallback = EstimatorConfig {
            fallback_ratio: 0.9,
            ..EstimatorConfig::default()
        };
        assert!(matches!(
            estimate_optimal_ratio(&history, &bad_fallback),
            Err(ConfigError::FallbackOutsideRange { .. })
        ));
    }
}
