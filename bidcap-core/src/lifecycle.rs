//! Lifecycle stages and per-stage ratio targets.
//!
//! Turns the estimated steady-state ratio into three stage targets:
//! an aggressive launch target above the estimate, the estimate itself
//! for growth, and a conservative harvest target below it. The launch
//! target is clamped so a campaign can never be asked to spend past the
//! product's gross margin.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreResult};
use crate::metrics::{DailyMetric, WindowTotals};
use crate::thresholds::{DEFAULT_ALPHA_HARVEST, DEFAULT_ALPHA_LAUNCH, DEFAULT_SOFT_FACTOR};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// A product's commercial phase. Owned by the orchestrating caller and
/// read-only here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleStage {
    LaunchHard,
    LaunchSoft,
    Grow,
    Harvest,
}

impl LifecycleStage {
    /// All stage variants for iteration.
    pub const ALL: [LifecycleStage; 4] = [
        LifecycleStage::LaunchHard,
        LifecycleStage::LaunchSoft,
        LifecycleStage::Grow,
        LifecycleStage::Harvest,
    ];

    /// Both launch variants share policy overrides (see `constraints`).
    pub fn is_launch(&self) -> bool {
        matches!(self, LifecycleStage::LaunchHard | LifecycleStage::LaunchSoft)
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            LifecycleStage::LaunchHard => "launch-hard",
            LifecycleStage::LaunchSoft => "launch-soft",
            LifecycleStage::Grow => "grow",
            LifecycleStage::Harvest => "harvest",
        }
    }
}

impl std::fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Offsets that spread the single ratio estimate into stage targets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Fractional offset above the estimate for hard launches.
    pub alpha_launch: f64,
    /// Fractional offset below the estimate for harvest.
    pub alpha_harvest: f64,
    /// Scale on the launch offset for soft launches, in [0, 1].
    pub soft_factor: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            alpha_launch: DEFAULT_ALPHA_LAUNCH,
            alpha_harvest: DEFAULT_ALPHA_HARVEST,
            soft_factor: DEFAULT_SOFT_FACTOR,
        }
    }
}

impl LifecycleConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.alpha_launch < 0.0 {
            return Err(ConfigError::NegativeParameter {
                name: "alpha_launch",
                value: self.alpha_launch,
            });
        }
        if self.alpha_harvest < 0.0 {
            return Err(ConfigError::NegativeParameter {
                name: "alpha_harvest",
                value: self.alpha_harvest,
            });
        }
        if !(0.0..=1.0).contains(&self.soft_factor) {
            return Err(ConfigError::InvalidSoftFactor(self.soft_factor));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// The three stage targets plus the one selected for the current stage.
///
/// Invariants: `grow_target == source_ratio`, `launch_target <=
/// margin_potential`, `harvest_target >= 0`.
#[derive(Clone, Debug, Serialize)]
pub struct LifecycleTargets {
    pub launch_target: f64,
    pub grow_target: f64,
    pub harvest_target: f64,
    /// The target for `current_stage`. For a soft launch this is the
    /// launch formula with its offset scaled by `soft_factor`, which is
    /// between `grow_target` and `launch_target`.
    pub current_target: f64,
    pub current_stage: LifecycleStage,
    pub source_ratio: f64,
    pub margin_potential: f64,
}

/// Spread a ratio estimate into per-stage targets and select the one for
/// the caller's stage.
pub fn resolve_lifecycle_targets(
    ratio: f64,
    margin_potential: f64,
    stage: LifecycleStage,
    config: &LifecycleConfig,
) -> CoreResult<LifecycleTargets> {
    config.validate()?;
    if margin_potential <= 0.0 || margin_potential > 1.0 {
        return Err(ConfigError::InvalidMarginPotential(margin_potential));
    }

    let launch_target = margin_potential.min(ratio * (1.0 + config.alpha_launch));
    let soft_launch_target =
        margin_potential.min(ratio * (1.0 + config.alpha_launch * config.soft_factor));
    let grow_target = ratio;
    let harvest_target = (ratio * (1.0 - config.alpha_harvest)).max(0.0);

    let current_target = match stage {
        LifecycleStage::LaunchHard => launch_target,
        LifecycleStage::LaunchSoft => soft_launch_target,
        LifecycleStage::Grow => grow_target,
        LifecycleStage::Harvest => harvest_target,
    };

    Ok(LifecycleTargets {
        launch_target,
        grow_target,
        harvest_target,
        current_target,
        current_stage: stage,
        source_ratio: ratio,
        margin_potential,
    })
}

// ---------------------------------------------------------------------------
// Launch investment
// ---------------------------------------------------------------------------

/// Cumulative ad spend above the steady-state ratio during the launch
/// period, with an estimate of the sales volume needed to earn it back.
#[derive(Clone, Debug, Serialize)]
pub struct LaunchInvestment {
    /// `max(0, total_revenue × (average_ratio − estimate_ratio))`.
    pub investment: f64,
    /// Aggregate spend/revenue ratio of the window (0 with no revenue).
    pub average_ratio: f64,
    pub total_revenue: f64,
    /// Sales volume that recoups the investment at steady-state margin,
    /// `investment / (margin_potential − estimate_ratio)`. `None` when
    /// that net margin is non-positive or nothing was invested.
    pub recoup_sales_estimate: Option<f64>,
}

/// Measure the launch investment over a window of launch-period metrics.
///
/// An empty or zero-revenue window is a zero investment, not an error.
pub fn launch_investment(
    window: &[DailyMetric],
    estimate_ratio: f64,
    margin_potential: f64,
) -> LaunchInvestment {
    let totals = WindowTotals::from_metrics(window);
    let average_ratio = totals.spend_ratio().unwrap_or(0.0);
    let investment = (totals.revenue * (average_ratio - estimate_ratio)).max(0.0);

    let net_margin = margin_potential - estimate_ratio;
    let recoup_sales_estimate = if investment > 0.0 && net_margin > 0.0 {
        Some(investment / net_margin)
    } else {
        None
    };

    LaunchInvestment {
        investment,
        average_ratio,
        total_revenue: totals.revenue,
        recoup_sales_estimate,
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
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap() + chrono::Days::new(offset);
        DailyMetric::new(date, revenue, ad_spend)
    }

    #[test]
    fn worked_example_targets() {
        // ratio 0.15, margin 0.55, alpha_launch 0.30, alpha_harvest 0.25:
        // launch = min(0.55, 0.195) = 0.195, grow = 0.15, harvest = 0.1125.
        let config = LifecycleConfig::default();
        let targets =
            resolve_lifecycle_targets(0.15, 0.55, LifecycleStage::Grow, &config).unwrap();
        assert!((targets.launch_target - 0.195).abs() < 1e-12);
        assert!((targets.grow_target - 0.15).abs() < 1e-12);
        assert!((targets.harvest_target - 0.1125).abs() < 1e-12);
        assert!((targets.current_target - 0.15).abs() < 1e-12);
    }

    #[test]
    fn launch_target_is_clamped_to_margin_potential() {
        // 0.50 × 1.30 = 0.65 would exceed the 0.55 margin.
        let targets = resolve_lifecycle_targets(
            0.50,
            0.55,
            LifecycleStage::LaunchHard,
            &LifecycleConfig::default(),
        )
        .unwrap();
        assert!((targets.launch_target - 0.55).abs() < 1e-12);
        assert!((targets.current_target - 0.55).abs() < 1e-12);
    }

    #[test]
    fn soft_launch_sits_between_grow_and_hard_launch() {
        let targets = resolve_lifecycle_targets(
            0.20,
            0.55,
            LifecycleStage::LaunchSoft,
            &LifecycleConfig::default(),
        )
        .unwrap();
        // 0.20 × (1 + 0.30 × 0.5) = 0.23.
        assert!((targets.current_target - 0.23).abs() < 1e-12);
        assert!(targets.current_target > targets.grow_target);
        assert!(targets.current_target < targets.launch_target);
    }

    #[test]
    fn harvest_target_never_goes_negative() {
        let config = LifecycleConfig {
            alpha_harvest: 1.5,
            ..LifecycleConfig::default()
        };
        let targets =
            resolve_lifecycle_targets(0.10, 0.55, LifecycleStage::Harvest, &config).unwrap();
        assert_eq!(targets.harvest_target, 0.0);
        assert_eq!(targets.current_target, 0.0);
    }

    #[test]
    fn grow_target_always_equals_source_ratio() {
        for stage in LifecycleStage::ALL {
            let targets =
                resolve_lifecycle_targets(0.18, 0.55, stage, &LifecycleConfig::default()).unwrap();
            assert_eq!(targets.grow_target, targets.source_ratio);
        }
    }

    #[test]
    fn invalid_margin_fails_fast() {
        assert!(matches!(
            resolve_lifecycle_targets(0.15, 0.0, LifecycleStage::Grow, &LifecycleConfig::default()),
            Err(ConfigError::InvalidMarginPotential(_))
        ));
    }

    #[test]
    fn launch_investment_measures_spend_above_steady_state() {
        // 10 days, revenue 10,000/day, spend at ratio 0.25 while the
        // estimate is 0.15: investment = 100,000 × 0.10 = 10,000.
        let window: Vec<DailyMetric> = (0..10).map(|i| day(i, 10_000.0, 2_500.0)).collect();
        let inv = launch_investment(&window, 0.15, 0.55);
        assert!((inv.investment - 10_000.0).abs() < 1e-6);
        // Recoup at net margin 0.40: 10,000 / 0.40 = 25,000 of sales.
        assert!((inv.recoup_sales_estimate.unwrap() - 25_000.0).abs() < 1e-6);
    }

    #[test]
    fn spending_below_the_estimate_is_no_investment() {
        let window: Vec<DailyMetric> = (0..10).map(|i| day(i, 10_000.0, 1_000.0)).collect();
        let inv = launch_investment(&window, 0.15, 0.55);
        assert_eq!(inv.investment, 0.0);
        assert_eq!(inv.recoup_sales_estimate, None);
    }

    #[test]
    fn empty_launch_window_is_zero_investment() {
        let inv = launch_investment(&[], 0.15, 0.55);
        assert_eq!(inv.investment, 0.0);
        assert_eq!(inv.total_revenue, 0.0);
        assert_eq!(inv.recoup_sales_estimate, None);
    }

    #[test]
    fn recoup_is_none_when_net_margin_is_not_positive() {
        // Estimate ratio equals the margin: there is no net margin left
        // to earn the investment back.
        let window: Vec<DailyMetric> = (0..5).map(|i| day(i, 10_000.0, 6_000.0)).collect();
        let inv = launch_investment(&window, 0.55, 0.55);
        assert!(inv.investment > 0.0);
        assert_eq!(inv.recoup_sales_estimate, None);
    }
}
