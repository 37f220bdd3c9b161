//! Bounded bid target engine.
//!
//! Decides, for one advertised product, how aggressively it may be bid
//! right now and why: a permitted advertising-cost ceiling, a hard
//! cost-per-click ceiling, and the set of currently permitted bid
//! actions, derived from recent profitability, lifecycle stage and
//! promotional context.
//!
//! Six pure components in fixed dependency order:
//!
//! 1. [`estimator`] — profit-maximizing ratio from daily history
//! 2. [`lifecycle`] — per-stage targets and launch investment
//! 3. [`investment`] — loss-budget consumption and health states
//! 4. [`constraints`] — permitted actions per (stage, state)
//! 5. [`integrator`] — ratio/value model blend into the final target
//! 6. [`guard`] — price-derived hard ceiling on the bid itself
//!
//! Everything is a pure function of explicit inputs and fully-defaulted
//! configuration records: no I/O, no globals, no clocks. Identical
//! inputs produce bit-identical outputs.

pub mod constraints;
pub mod error;
pub mod estimator;
pub mod guard;
pub mod integrator;
pub mod investment;
pub mod lifecycle;
pub mod metrics;
pub mod thresholds;

pub use constraints::{resolve_action_constraints, ActionConstraints};
pub use error::{ConfigError, CoreResult};
pub use estimator::{estimate_optimal_ratio, Confidence, EstimatorConfig, OptimalRatioEstimate};
pub use guard::{
    apply_bid_ceiling, max_bid_ceiling, BidClip, GuardConfig, MaxBidResult, PromoVariant,
};
pub use integrator::{
    integrate_target_ratio, IntegratorConfig, PromoPhase, TargetRatioResult,
};
pub use investment::{
    evaluate_loss_budget, rollup_budget_state, BudgetAlertLevel, BudgetConfig, BudgetRollup,
    BudgetWindow, InvestmentState, LossBudgetMetrics, RollupConfig,
};
pub use lifecycle::{
    launch_investment, resolve_lifecycle_targets, LaunchInvestment, LifecycleConfig,
    LifecycleStage, LifecycleTargets,
};
pub use metrics::{DailyMetric, WindowTotals};
