//! Loss-budget evaluation and investment health states.
//!
//! A product in any stage is granted a per-stage "loss budget": a
//! multiple of its target profit it is permitted to fall short by while
//! the stage strategy plays out. This module measures how much of that
//! budget a window of actuals has consumed and classifies the product
//! into one of four ordered health states.
//!
//! # Algorithm
//!
//! Over a window with revenue `S` and ad spend `A`, margin potential `g`
//! and ratio estimate `r`:
//!
//! ```text
//! target_profit = S × (g − r)
//! actual_profit = S × g − A
//! profit_gap    = target_profit − actual_profit   (positive = behind target)
//! budget        = max(target_profit × stage_multiple, S × 0.01, 1)
//! ratio         = profit_gap <= 0 ? 0 : profit_gap / budget
//! ```
//!
//! The revenue and absolute floors on the budget keep the consumption
//! ratio finite when the target profit is near zero or negative.
//!
//! A separate three-state rollup combines the rolling-window ratio with
//! the launch-period and launch-investment ratios; it is the simplified
//! interface downstream collaborators consume.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreResult};
use crate::lifecycle::LifecycleStage;
use crate::thresholds::{
    BUDGET_ABSOLUTE_FLOOR, BUDGET_MULTIPLE_GROW, BUDGET_MULTIPLE_HARVEST,
    BUDGET_MULTIPLE_LAUNCH_HARD, BUDGET_MULTIPLE_LAUNCH_SOFT, BUDGET_REVENUE_FLOOR,
    DEFAULT_SAFE_BELOW, DEFAULT_WATCH_BELOW, ROLLUP_CRITICAL_AT, ROLLUP_WARNING_AT,
};

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Investment health, ordered by severity.
///
/// The ordering is load-bearing: classification is monotonic in the
/// consumption ratio, so `Safe < Watch < Limit < Breach` always.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum InvestmentState {
    Safe,
    Watch,
    Limit,
    Breach,
}

impl InvestmentState {
    /// All states in severity order.
    pub const ALL: [InvestmentState; 4] = [
        InvestmentState::Safe,
        InvestmentState::Watch,
        InvestmentState::Limit,
        InvestmentState::Breach,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            InvestmentState::Safe => "safe",
            InvestmentState::Watch => "watch",
            InvestmentState::Limit => "limit",
            InvestmentState::Breach => "breach",
        }
    }
}

impl std::fmt::Display for InvestmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-stage budget multiples and the state boundaries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub multiple_launch_hard: f64,
    pub multiple_launch_soft: f64,
    pub multiple_grow: f64,
    pub multiple_harvest: f64,
    /// Consumption strictly below this is `Safe`.
    pub safe_below: f64,
    /// Consumption strictly below this (and at or above `safe_below`) is
    /// `Watch`; up to 1.0 is `Limit`, beyond is `Breach`.
    pub watch_below: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            multiple_launch_hard: BUDGET_MULTIPLE_LAUNCH_HARD,
            multiple_launch_soft: BUDGET_MULTIPLE_LAUNCH_SOFT,
            multiple_grow: BUDGET_MULTIPLE_GROW,
            multiple_harvest: BUDGET_MULTIPLE_HARVEST,
            safe_below: DEFAULT_SAFE_BELOW,
            watch_below: DEFAULT_WATCH_BELOW,
        }
    }
}

impl BudgetConfig {
    fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("multiple_launch_hard", self.multiple_launch_hard),
            ("multiple_launch_soft", self.multiple_launch_soft),
            ("multiple_grow", self.multiple_grow),
            ("multiple_harvest", self.multiple_harvest),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeParameter { name, value });
            }
        }
        if !(self.safe_below > 0.0 && self.safe_below < self.watch_below && self.watch_below <= 1.0)
        {
            return Err(ConfigError::InvalidStateThresholds {
                safe_below: self.safe_below,
                watch_below: self.watch_below,
            });
        }
        Ok(())
    }

    /// The loss-budget multiple granted to a stage.
    pub fn stage_multiple(&self, stage: LifecycleStage) -> f64 {
        match stage {
            LifecycleStage::LaunchHard => self.multiple_launch_hard,
            LifecycleStage::LaunchSoft => self.multiple_launch_soft,
            LifecycleStage::Grow => self.multiple_grow,
            LifecycleStage::Harvest => self.multiple_harvest,
        }
    }
}

// ---------------------------------------------------------------------------
// Loss-budget evaluation
// ---------------------------------------------------------------------------

/// One window's loss-budget arithmetic, recomputed on every evaluation.
#[derive(Clone, Debug, Serialize)]
pub struct LossBudgetMetrics {
    pub target_profit: f64,
    pub actual_profit: f64,
    /// `target_profit − actual_profit`; positive means behind target.
    pub profit_gap: f64,
    pub budget_multiple: f64,
    /// Floored at `max(revenue × 1%, 1)`.
    pub budget: f64,
    /// Budget consumption in `[0, ∞)`; 0 whenever the window beat its
    /// target.
    pub ratio: f64,
    pub state: InvestmentState,
}

/// Evaluate one window of actuals against the stage's loss budget.
pub fn evaluate_loss_budget(
    revenue: f64,
    ad_spend: f64,
    stage: LifecycleStage,
    margin_potential: f64,
    ratio_estimate: f64,
    config: &BudgetConfig,
) -> CoreResult<LossBudgetMetrics> {
    config.validate()?;
    if margin_potential <= 0.0 || margin_potential > 1.0 {
        return Err(ConfigError::InvalidMarginPotential(margin_potential));
    }

    let target_profit = revenue * (margin_potential - ratio_estimate);
    let actual_profit = revenue * margin_potential - ad_spend;
    let profit_gap = target_profit - actual_profit;

    let budget_multiple = config.stage_multiple(stage);
    let budget = (target_profit * budget_multiple)
        .max(revenue * BUDGET_REVENUE_FLOOR)
        .max(BUDGET_ABSOLUTE_FLOOR);

    let ratio = if profit_gap <= 0.0 {
        0.0
    } else {
        profit_gap / budget
    };
    let state = classify_consumption(ratio, config.safe_below, config.watch_below);
    if state == InvestmentState::Breach {
        log::warn!(
            "loss budget breached: gap {:.2} against budget {:.2} ({} stage)",
            profit_gap,
            budget,
            stage
        );
    }

    Ok(LossBudgetMetrics {
        target_profit,
        actual_profit,
        profit_gap,
        budget_multiple,
        budget,
        ratio,
        state,
    })
}

/// Map a consumption ratio onto the four ordered states.
fn classify_consumption(ratio: f64, safe_below: f64, watch_below: f64) -> InvestmentState {
    if ratio < safe_below {
        InvestmentState::Safe
    } else if ratio < watch_below {
        InvestmentState::Watch
    } else if ratio <= 1.0 {
        InvestmentState::Limit
    } else {
        InvestmentState::Breach
    }
}

// ---------------------------------------------------------------------------
// Three-state rollup
// ---------------------------------------------------------------------------

/// Simplified alert level consumed by downstream collaborators
/// (negative-keyword suggestion and the like) instead of the four-state
/// form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BudgetAlertLevel {
    Safe,
    Warning,
    Critical,
}

impl BudgetAlertLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            BudgetAlertLevel::Safe => "safe",
            BudgetAlertLevel::Warning => "warning",
            BudgetAlertLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for BudgetAlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which consumption window produced the rollup maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetWindow {
    Rolling,
    LaunchPeriod,
    LaunchInvestment,
}

/// Thresholds for the three-state rollup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Maximum consumption at or above this is `Warning`.
    pub warning_at: f64,
    /// Maximum consumption at or above this is `Critical`.
    pub critical_at: f64,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            warning_at: ROLLUP_WARNING_AT,
            critical_at: ROLLUP_CRITICAL_AT,
        }
    }
}

impl RollupConfig {
    fn validate(&self) -> CoreResult<()> {
        if !(self.warning_at > 0.0 && self.warning_at < self.critical_at) {
            return Err(ConfigError::InvalidRollupThresholds {
                warning_at: self.warning_at,
                critical_at: self.critical_at,
            });
        }
        Ok(())
    }
}

/// The combined view over the three budget windows.
#[derive(Clone, Debug, Serialize)]
pub struct BudgetRollup {
    pub rolling_ratio: f64,
    pub launch_period_ratio: f64,
    pub launch_investment_ratio: f64,
    pub max_ratio: f64,
    /// The window that drove `max_ratio` (rolling wins ties).
    pub driver: BudgetWindow,
    pub level: BudgetAlertLevel,
}

/// Combine three independently measured consumption ratios into the
/// simplified alert level. The worst window wins.
pub fn rollup_budget_state(
    rolling_ratio: f64,
    launch_period_ratio: f64,
    launch_investment_ratio: f64,
    config: &RollupConfig,
) -> CoreResult<BudgetRollup> {
    config.validate()?;

    let mut max_ratio = rolling_ratio;
    let mut driver = BudgetWindow::Rolling;
    if launch_period_ratio > max_ratio {
        max_ratio = launch_period_ratio;
        driver = BudgetWindow::LaunchPeriod;
    }
    if launch_investment_ratio > max_ratio {
        max_ratio = launch_investment_ratio;
        driver = BudgetWindow::LaunchInvestment;
    }

    let level = if max_ratio >= config.critical_at {
        BudgetAlertLevel::Critical
    } else if max_ratio >= config.warning_at {
        BudgetAlertLevel::Warning
    } else {
        BudgetAlertLevel::Safe
    };

    Ok(BudgetRollup {
        rolling_ratio,
        launch_period_ratio,
        launch_investment_ratio,
        max_ratio,
        driver,
        level,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
