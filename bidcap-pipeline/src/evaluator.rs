//! Per-product bid target evaluation.
//!
//! Runs the six core components in their fixed dependency order:
//! estimator → lifecycle resolver → { loss budget, launch investment } →
//! rollup → constraint resolver, integrator → guard. One call, one
//! complete [`BidTargetEvaluation`]; nothing is cached between calls.

use chrono::Days;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bidcap_core::{
    estimate_optimal_ratio, evaluate_loss_budget, integrate_target_ratio, launch_investment,
    max_bid_ceiling, resolve_action_constraints, resolve_lifecycle_targets, rollup_budget_state,
    BudgetConfig, ConfigError, DailyMetric, EstimatorConfig, GuardConfig, IntegratorConfig,
    LifecycleConfig, PromoPhase, PromoVariant, RollupConfig, WindowTotals,
};

use crate::types::{BidTargetEvaluation, ProductSnapshot};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The fully-defaulted configuration for one evaluation run: every core
/// component's config plus the window lengths the evaluator slices with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub estimator: EstimatorConfig,
    pub lifecycle: LifecycleConfig,
    pub budget: BudgetConfig,
    pub rollup: RollupConfig,
    pub integrator: IntegratorConfig,
    pub guard: GuardConfig,
    /// Rolling loss-budget window length, in days.
    pub rolling_window_days: u64,
    /// Launch-period window length, in days.
    pub launch_window_days: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            lifecycle: LifecycleConfig::default(),
            budget: BudgetConfig::default(),
            rollup: RollupConfig::default(),
            integrator: IntegratorConfig::default(),
            guard: GuardConfig::default(),
            rolling_window_days: 14,
            launch_window_days: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid snapshot for {product_id}: {reason}")]
    InvalidSnapshot { product_id: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn validate_snapshot(snapshot: &ProductSnapshot) -> Result<(), EvalError> {
    let fail = |reason: String| EvalError::InvalidSnapshot {
        product_id: snapshot.product_id.clone(),
        reason,
    };

    if snapshot.price <= 0.0 {
        return Err(fail(format!("price must be positive, got {}", snapshot.price)));
    }
    if !(snapshot.expected_cvr > 0.0 && snapshot.expected_cvr <= 1.0) {
        return Err(fail(format!(
            "expected_cvr must be in (0, 1], got {}",
            snapshot.expected_cvr
        )));
    }
    if let Some(cvr) = snapshot.promo_cvr {
        if !(cvr > 0.0 && cvr <= 1.0) {
            return Err(fail(format!("promo_cvr must be in (0, 1], got {}", cvr)));
        }
    }
    if snapshot.margin_potential <= 0.0 || snapshot.margin_potential > 1.0 {
        return Err(fail(format!(
            "margin_potential must be in (0, 1], got {}",
            snapshot.margin_potential
        )));
    }
    if snapshot.total_sales_30d < 0.0 || snapshot.ad_sales_30d < 0.0 {
        return Err(fail("trailing sales must be non-negative".into()));
    }
    if snapshot.value_ceiling < 0.0 {
        return Err(fail(format!(
            "value_ceiling must be non-negative, got {}",
            snapshot.value_ceiling
        )));
    }
    if let Some(factor) = snapshot.seo_factor {
        if factor <= 0.0 {
            return Err(fail(format!("seo_factor must be positive, got {}", factor)));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate one product snapshot into its bounded bid target.
pub fn evaluate_product(
    snapshot: &ProductSnapshot,
    config: &EvaluationConfig,
) -> Result<BidTargetEvaluation, EvalError> {
    validate_snapshot(snapshot)?;

    // The snapshot's margin overrides the config default: margin is a
    // per-product fact, not a tuning knob.
    let estimator_config = EstimatorConfig {
        margin_potential: snapshot.margin_potential,
        ..config.estimator.clone()
    };
    let estimate = estimate_optimal_ratio(&snapshot.history, &estimator_config)?;

    let targets = resolve_lifecycle_targets(
        estimate.ratio,
        snapshot.margin_potential,
        snapshot.stage,
        &config.lifecycle,
    )?;

    // Rolling window: the last `rolling_window_days` ending at as_of.
    let rolling_start = snapshot
        .as_of
        .checked_sub_days(Days::new(config.rolling_window_days))
        .unwrap_or(snapshot.as_of);
    let rolling: Vec<DailyMetric> = snapshot
        .history
        .iter()
        .filter(|m| m.date > rolling_start && m.date <= snapshot.as_of)
        .cloned()
        .collect();
    let rolling_totals = WindowTotals::from_metrics(&rolling);
    let loss_budget = evaluate_loss_budget(
        rolling_totals.revenue,
        rolling_totals.ad_spend,
        snapshot.stage,
        snapshot.margin_potential,
        estimate.ratio,
        &config.budget,
    )?;

    // Launch-period window and investment, when a launch date exists.
    let (launch_inv, launch_period_ratio) = match snapshot.launch_date {
        Some(launch_date) => {
            let launch_end = launch_date
                .checked_add_days(Days::new(config.launch_window_days))
                .unwrap_or(snapshot.as_of)
                .min(snapshot.as_of);
            let window: Vec<DailyMetric> = snapshot
                .history
                .iter()
                .filter(|m| m.date >= launch_date && m.date <= launch_end)
                .cloned()
                .collect();
            let inv = launch_investment(&window, estimate.ratio, snapshot.margin_potential);
            let window_totals = WindowTotals::from_metrics(&window);
            let period = evaluate_loss_budget(
                window_totals.revenue,
                window_totals.ad_spend,
                snapshot.stage,
                snapshot.margin_potential,
                estimate.ratio,
                &config.budget,
            )?;
            (Some(inv), period.ratio)
        }
        None => (None, 0.0),
    };

    // Launch-investment consumption against its granted budget. No
    // granted budget means nothing is being consumed against one.
    let launch_investment_ratio = match (&launch_inv, snapshot.launch_budget) {
        (Some(inv), Some(budget)) if budget > 0.0 => inv.investment / budget,
        _ => 0.0,
    };

    let rollup = rollup_budget_state(
        loss_budget.ratio,
        launch_period_ratio,
        launch_investment_ratio,
        &config.rollup,
    )?;

    let constraints = resolve_action_constraints(snapshot.stage, loss_budget.state);

    // The authoritative target for the actual phase, plus a baseline
    // integration with the phase forced to Normal so the guard's uplift
    // cap anchors to the real non-promotional ceiling.
    let target_ratio = integrate_target_ratio(
        &targets,
        snapshot.phase,
        snapshot.total_sales_30d,
        snapshot.ad_sales_30d,
        snapshot.value_ceiling,
        snapshot.value_ceiling_cap,
        snapshot.seo_factor,
        &config.integrator,
    )?;
    let baseline = if snapshot.phase.is_main_sale() {
        integrate_target_ratio(
            &targets,
            PromoPhase::Normal,
            snapshot.total_sales_30d,
            snapshot.ad_sales_30d,
            snapshot.value_ceiling,
            snapshot.value_ceiling_cap,
            snapshot.seo_factor,
            &config.integrator,
        )?
    } else {
        target_ratio.clone()
    };

    let promo_variant = if snapshot.phase.is_main_sale() {
        Some(PromoVariant {
            ratio_target: target_ratio.final_target,
            expected_cvr: snapshot.promo_cvr.unwrap_or(snapshot.expected_cvr),
        })
    } else {
        None
    };
    let max_bid = max_bid_ceiling(
        snapshot.price,
        baseline.final_target,
        snapshot.expected_cvr,
        snapshot.phase,
        promo_variant,
        &config.guard,
    )?;

    log::debug!(
        "evaluated {}: target {:.4}, ceiling {:.4}, state {}",
        snapshot.product_id,
        target_ratio.final_target,
        max_bid.ceiling,
        loss_budget.state
    );

    Ok(BidTargetEvaluation {
        product_id: snapshot.product_id.clone(),
        keyword_id: snapshot.keyword_id.clone(),
        as_of: snapshot.as_of,
        stage: snapshot.stage,
        phase: snapshot.phase,
        estimate,
        targets,
        launch_investment: launch_inv,
        loss_budget,
        rollup,
        constraints,
        target_ratio,
        max_bid,
    })
}

/// Evaluate many products in parallel. Result order matches input order;
/// each product fails or succeeds independently.
pub fn evaluate_batch(
    snapshots: &[ProductSnapshot],
    config: &EvaluationConfig,
) -> Vec<Result<BidTargetEvaluation, EvalError>> {
    snapshots
        .par_iter()
        .map(|snapshot| evaluate_product(snapshot, config))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
