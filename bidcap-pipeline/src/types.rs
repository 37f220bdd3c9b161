//! Evaluation input and output records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bidcap_core::{
    ActionConstraints, BudgetRollup, DailyMetric, LaunchInvestment, LifecycleStage,
    LifecycleTargets, LossBudgetMetrics, MaxBidResult, OptimalRatioEstimate, PromoPhase,
    TargetRatioResult,
};

/// Everything needed to evaluate one product's bid target.
///
/// Assembled by the orchestrating caller from warehouse history, the
/// LTV model's ceiling, and the product's lifecycle/promotional state.
/// The core never fetches any of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: String,
    /// The keyword this evaluation indirectly prices, when known.
    pub keyword_id: Option<String>,
    /// Gross margin fraction before ad cost.
    pub margin_potential: f64,
    pub stage: LifecycleStage,
    pub phase: PromoPhase,
    /// Evaluation date; windows are sliced relative to it.
    pub as_of: NaiveDate,
    pub history: Vec<DailyMetric>,
    /// Unit price, in the account currency.
    pub price: f64,
    /// Expected conversion rate per click, in (0, 1].
    pub expected_cvr: f64,
    /// Conversion-rate expectation during a main sale, if known.
    pub promo_cvr: Option<f64>,
    /// The LTV model's independently computed ACOS ceiling.
    pub value_ceiling: f64,
    /// Optional hard cap on the (stage-scaled) value ceiling.
    pub value_ceiling_cap: Option<f64>,
    /// Trailing 30-day totals from the warehouse.
    pub total_sales_30d: f64,
    pub ad_sales_30d: f64,
    /// Optional multiplicative adjustment from the SEO bridge.
    pub seo_factor: Option<f64>,
    /// First day of the launch period, when the product has one.
    pub launch_date: Option<NaiveDate>,
    /// Total loss budget granted for the launch, in currency units.
    pub launch_budget: Option<f64>,
}

/// The complete bounded bid target for one product: the soft ceiling,
/// the hard ceiling, and the permitted actions, with every component's
/// intermediates retained.
#[derive(Clone, Debug, Serialize)]
pub struct BidTargetEvaluation {
    pub product_id: String,
    pub keyword_id: Option<String>,
    pub as_of: NaiveDate,
    pub stage: LifecycleStage,
    pub phase: PromoPhase,
    pub estimate: OptimalRatioEstimate,
    pub targets: LifecycleTargets,
    /// Present when the snapshot carried a launch date.
    pub launch_investment: Option<LaunchInvestment>,
    /// Loss budget over the rolling window ending at `as_of`.
    pub loss_budget: LossBudgetMetrics,
    pub rollup: BudgetRollup,
    pub constraints: ActionConstraints,
    /// The authoritative advertising-cost ceiling.
    pub target_ratio: TargetRatioResult,
    pub max_bid: MaxBidResult,
}
