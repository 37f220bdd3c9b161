//! Permitted bid actions per (lifecycle stage, investment state).
//!
//! A pure two-key lookup: every cell is a hand-authored policy record,
//! no class hierarchy and no mutable state. The escalation ladder is the
//! same in every stage — `Safe` permits everything, `Watch` forbids
//! strong increases, `Limit` forbids any increase, `Breach` unlocks
//! deeper cuts — with one stage override: launch-stage products are
//! never stopped or negated outright, only throttled.

use serde::Serialize;

use crate::investment::InvestmentState;
use crate::lifecycle::LifecycleStage;

// Escalation-ladder magnitudes. These numbers ARE the policy; changing
// one changes how hard the bidder may push in that cell.
const MAX_INCREASE_SAFE: f64 = 1.30;
const MAX_INCREASE_WATCH: f64 = 1.15;
const MAX_INCREASE_HELD: f64 = 1.0;
const MAX_DECREASE_NORMAL: f64 = 0.70;
const MAX_DECREASE_BREACH: f64 = 0.50;
const MAX_DECREASE_BREACH_LAUNCH: f64 = 0.60;
const STRONG_UP_THRESHOLD: f64 = 1.50;

const STAGE_FACTOR_LAUNCH_HARD: f64 = 1.2;
const STAGE_FACTOR_LAUNCH_SOFT: f64 = 1.1;
const STAGE_FACTOR_GROW: f64 = 1.0;
const STAGE_FACTOR_HARVEST: f64 = 0.9;

/// What the bidder may currently do to this product's bids, and how far.
///
/// `max_increase_multiplier` bounds upward moves (new bid ≤ old ×
/// multiplier); `max_decrease_multiplier` bounds downward moves (new bid
/// ≥ old × multiplier). Increases above `strong_up_threshold_multiplier`
/// count as "strong up" moves.
#[derive(Clone, Debug, Serialize)]
pub struct ActionConstraints {
    pub allow_strong_up: bool,
    pub allow_up: bool,
    pub allow_down: bool,
    pub allow_strong_down: bool,
    pub allow_stop: bool,
    pub allow_neg: bool,
    pub max_increase_multiplier: f64,
    pub max_decrease_multiplier: f64,
    pub strong_up_threshold_multiplier: f64,
    pub stage_adjustment_factor: f64,
    /// Why this cell applies, for operators and audit logs.
    pub reason: String,
}

/// Resolve the permitted bid actions for a (stage, state) pair.
///
/// Pure lookup; called once per evaluation.
pub fn resolve_action_constraints(
    stage: LifecycleStage,
    state: InvestmentState,
) -> ActionConstraints {
    let mut constraints = ladder_cell(stage, state);

    if stage.is_launch() {
        // New products are never killed outright, only throttled.
        constraints.allow_stop = false;
        constraints.allow_neg = false;
    }

    constraints.stage_adjustment_factor = match stage {
        LifecycleStage::LaunchHard => STAGE_FACTOR_LAUNCH_HARD,
        LifecycleStage::LaunchSoft => STAGE_FACTOR_LAUNCH_SOFT,
        LifecycleStage::Grow => STAGE_FACTOR_GROW,
        LifecycleStage::Harvest => STAGE_FACTOR_HARVEST,
    };

    constraints
}

/// The state escalation ladder shared by every stage.
fn ladder_cell(stage: LifecycleStage, state: InvestmentState) -> ActionConstraints {
    match state {
        InvestmentState::Safe => ActionConstraints {
            allow_strong_up: true,
            allow_up: true,
            allow_down: true,
            allow_strong_down: true,
            allow_stop: true,
            allow_neg: true,
            max_increase_multiplier: MAX_INCREASE_SAFE,
            max_decrease_multiplier: MAX_DECREASE_NORMAL,
            strong_up_threshold_multiplier: STRONG_UP_THRESHOLD,
            stage_adjustment_factor: 1.0,
            reason: format!("{}/{}: budget healthy, all actions open", stage, state),
        },
        InvestmentState::Watch => ActionConstraints {
            allow_strong_up: false,
            allow_up: true,
            allow_down: true,
            allow_strong_down: true,
            allow_stop: true,
            allow_neg: true,
            max_increase_multiplier: MAX_INCREASE_WATCH,
            max_decrease_multiplier: MAX_DECREASE_NORMAL,
            strong_up_threshold_multiplier: STRONG_UP_THRESHOLD,
            stage_adjustment_factor: 1.0,
            reason: format!(
                "{}/{}: budget under pressure, strong increases disabled",
                stage, state
            ),
        },
        InvestmentState::Limit => ActionConstraints {
            allow_strong_up: false,
            allow_up: false,
            allow_down: true,
            allow_strong_down: true,
            allow_stop: true,
            allow_neg: true,
            max_increase_multiplier: MAX_INCREASE_HELD,
            max_decrease_multiplier: MAX_DECREASE_NORMAL,
            strong_up_threshold_multiplier: STRONG_UP_THRESHOLD,
            stage_adjustment_factor: 1.0,
            reason: format!(
                "{}/{}: budget nearly consumed, increases disabled",
                stage, state
            ),
        },
        InvestmentState::Breach => ActionConstraints {
            allow_strong_up: false,
            allow_up: false,
            allow_down: true,
            allow_strong_down: true,
            allow_stop: true,
            allow_neg: true,
            max_increase_multiplier: MAX_INCREASE_HELD,
            max_decrease_multiplier: if stage.is_launch() {
                MAX_DECREASE_BREACH_LAUNCH
            } else {
                MAX_DECREASE_BREACH
            },
            strong_up_threshold_multiplier: STRONG_UP_THRESHOLD,
            stage_adjustment_factor: 1.0,
            reason: format!(
                "{}/{}: budget breached, only reductions permitted",
                stage, state
            ),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
