//! Centralized default thresholds for bid target evaluation.
//!
//! These values are calibrated for mid-priced marketplace products with a
//! gross margin around 50-60% before ad cost. Every one of them is also a
//! field on an explicit configuration record, so callers can override any
//! threshold per experiment; the constants here are only the defaults.
//! Changing a value here affects BOTH the component defaults (in each
//! module's `Default` impl) and the pipeline defaults (in
//! `bidcap-pipeline`'s `EvaluationConfig`).

/// Width of one ratio bin in the optimal-ratio search grid.
pub const DEFAULT_BIN_WIDTH: f64 = 0.03;

/// Lower bound of the spend/revenue ratios considered plausible.
pub const DEFAULT_MIN_RATIO: f64 = 0.0;

/// Upper bound of the spend/revenue ratios considered plausible.
/// Days above this ratio are treated as data noise (e.g. revenue lag).
pub const DEFAULT_MAX_RATIO: f64 = 0.60;

/// Minimum valid days a bin needs before it can win the profit search.
pub const DEFAULT_MIN_DAYS_PER_BIN: usize = 3;

/// Ratio returned when history is too thin to estimate from.
pub const DEFAULT_FALLBACK_RATIO: f64 = 0.15;

/// Valid-day count required for a HIGH confidence estimate.
pub const HIGH_CONFIDENCE_MIN_DAYS: usize = 90;
/// Search-grid resolution required for a HIGH confidence estimate.
pub const HIGH_CONFIDENCE_MIN_BINS: usize = 5;
/// Valid-day count required for a MEDIUM confidence estimate.
pub const MEDIUM_CONFIDENCE_MIN_DAYS: usize = 30;
/// Search-grid resolution required for a MEDIUM confidence estimate.
pub const MEDIUM_CONFIDENCE_MIN_BINS: usize = 3;

/// Launch-stage offset above the steady-state ratio (+30%).
pub const DEFAULT_ALPHA_LAUNCH: f64 = 0.30;

/// Harvest-stage offset below the steady-state ratio (-25%).
pub const DEFAULT_ALPHA_HARVEST: f64 = 0.25;

/// Scale applied to the launch offset for soft launches.
pub const DEFAULT_SOFT_FACTOR: f64 = 0.5;

/// Loss-budget multiple for hard-launch products.
pub const BUDGET_MULTIPLE_LAUNCH_HARD: f64 = 2.5;
/// Loss-budget multiple for soft-launch products.
pub const BUDGET_MULTIPLE_LAUNCH_SOFT: f64 = 2.0;
/// Loss-budget multiple for growth-stage products.
pub const BUDGET_MULTIPLE_GROW: f64 = 1.5;
/// Loss-budget multiple for harvest-stage products.
pub const BUDGET_MULTIPLE_HARVEST: f64 = 0.8;

/// Budget consumption below this fraction is SAFE.
pub const DEFAULT_SAFE_BELOW: f64 = 0.5;
/// Budget consumption below this fraction (and at or above
/// [`DEFAULT_SAFE_BELOW`]) is WATCH; up to 1.0 is LIMIT, beyond is BREACH.
pub const DEFAULT_WATCH_BELOW: f64 = 0.8;

/// Loss budgets are floored at this fraction of window revenue so the
/// consumption ratio stays finite on near-breakeven targets.
pub const BUDGET_REVENUE_FLOOR: f64 = 0.01;
/// Absolute floor on the loss budget, in currency units.
pub const BUDGET_ABSOLUTE_FLOOR: f64 = 1.0;

/// Rollup consumption at or above this level is CRITICAL.
pub const ROLLUP_CRITICAL_AT: f64 = 0.9;
/// Rollup consumption at or above this level is WARNING.
pub const ROLLUP_WARNING_AT: f64 = 0.5;

/// Stage-target multiplier applied during a main sale event.
pub const DEFAULT_SALE_MULTIPLIER: f64 = 1.3;

/// Ad-sales share assumed when trailing sales are below the floor.
pub const DEFAULT_AD_SHARE: f64 = 0.35;
/// Lower bound on the measured ad-sales share.
pub const DEFAULT_AD_SHARE_MIN: f64 = 0.10;
/// Trailing 30-day sales below this use the default ad share instead of
/// the measured one.
pub const DEFAULT_SALES_FLOOR: f64 = 1000.0;

/// Value-model ceiling scale for launch-stage products.
pub const VALUE_FACTOR_LAUNCH: f64 = 1.1;
/// Value-model ceiling scale for growth-stage products.
pub const VALUE_FACTOR_GROW: f64 = 1.0;
/// Value-model ceiling scale for harvest-stage products.
pub const VALUE_FACTOR_HARVEST: f64 = 0.9;

/// Global lower clip on the integrated advertising-cost target.
pub const DEFAULT_GLOBAL_MIN: f64 = 0.05;
/// Global upper clip on the integrated advertising-cost target.
pub const DEFAULT_GLOBAL_MAX: f64 = 0.60;

/// Safety margin multiplied into the hard per-click ceiling.
pub const DEFAULT_SAFETY_FACTOR: f64 = 1.15;

/// Cap on the promotional ceiling relative to the non-promotional one.
pub const DEFAULT_UPLIFT_CAP: f64 = 1.5;

/// Smallest currency unit used when rounding clipped bids.
pub const DEFAULT_SMALLEST_UNIT: f64 = 0.01;
