//! Hard per-click bid ceiling.
//!
//! The last line of defence: whatever the soft targets say, a single
//! click may never cost more than the revenue it is expected to earn
//! under the ratio target. `ceiling = price × ratio_target ×
//! expected_cvr × safety_factor`. During a main sale the promotional
//! ceiling is computed the same way from the promotional ratio and CVR,
//! then capped relative to the non-promotional ceiling so a sale can
//! never run bids away.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreResult};
use crate::integrator::PromoPhase;
use crate::thresholds::{DEFAULT_SAFETY_FACTOR, DEFAULT_SMALLEST_UNIT, DEFAULT_UPLIFT_CAP};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Safety margin multiplied into the hard ceiling.
    pub safety_factor: f64,
    /// Cap on the promotional ceiling as a multiple of the
    /// non-promotional one.
    pub uplift_cap: f64,
    /// Smallest currency unit for rounding clipped bids.
    pub smallest_unit: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            uplift_cap: DEFAULT_UPLIFT_CAP,
            smallest_unit: DEFAULT_SMALLEST_UNIT,
        }
    }
}

impl GuardConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.safety_factor <= 0.0 {
            return Err(ConfigError::NonPositiveParameter {
                name: "safety_factor",
                value: self.safety_factor,
            });
        }
        if self.uplift_cap < 1.0 {
            return Err(ConfigError::InvalidUpliftCap(self.uplift_cap));
        }
        if self.smallest_unit <= 0.0 {
            return Err(ConfigError::NonPositiveParameter {
                name: "smallest_unit",
                value: self.smallest_unit,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Promotional ratio target and conversion-rate expectation, supplied
/// only around sale events.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PromoVariant {
    pub ratio_target: f64,
    pub expected_cvr: f64,
}

/// The intermediates behind a ceiling, for audit.
#[derive(Clone, Debug, Serialize)]
pub struct MaxBidBreakdown {
    pub price: f64,
    pub ratio_target: f64,
    pub expected_cvr: f64,
    /// `price × ratio_target × expected_cvr`, before safety.
    pub hard_ceiling: f64,
    pub safety_factor: f64,
    /// Promotional intermediates, present only when a promo variant was
    /// consulted.
    pub promo: Option<PromoBreakdown>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PromoBreakdown {
    pub ratio_target: f64,
    pub expected_cvr: f64,
    pub hard_ceiling: f64,
    pub ceiling_with_safety: f64,
    /// `normal_ceiling × uplift_cap`, the most the sale may lift bids.
    pub uplift_limit: f64,
}

/// The per-click ceiling consumed by the bid applier.
#[derive(Clone, Debug, Serialize)]
pub struct MaxBidResult {
    /// The ceiling in force for this evaluation.
    pub ceiling: f64,
    /// The non-promotional ceiling the uplift cap anchors to.
    pub normal_ceiling: f64,
    /// True when the uplift cap bound the promotional ceiling.
    pub was_uplift_capped: bool,
    pub breakdown: MaxBidBreakdown,
}

// ---------------------------------------------------------------------------
// Ceiling
// ---------------------------------------------------------------------------

/// Derive the hard per-click bid ceiling.
///
/// Outside `MainSale` (or when no promo variant is supplied) the result
/// is simply the non-promotional ceiling.
pub fn max_bid_ceiling(
    price: f64,
    ratio_target: f64,
    expected_cvr: f64,
    phase: PromoPhase,
    promo: Option<PromoVariant>,
    config: &GuardConfig,
) -> CoreResult<MaxBidResult> {
    config.validate()?;

    let hard_ceiling = price * ratio_target * expected_cvr;
    let normal_ceiling = hard_ceiling * config.safety_factor;

    let (ceiling, was_uplift_capped, promo_breakdown) = match promo {
        Some(variant) if phase.is_main_sale() => {
            let promo_hard = price * variant.ratio_target * variant.expected_cvr;
            let promo_with_safety = promo_hard * config.safety_factor;
            let uplift_limit = normal_ceiling * config.uplift_cap;
            let capped = promo_with_safety > uplift_limit;
            (
                promo_with_safety.min(uplift_limit),
                capped,
                Some(PromoBreakdown {
                    ratio_target: variant.ratio_target,
                    expected_cvr: variant.expected_cvr,
                    hard_ceiling: promo_hard,
                    ceiling_with_safety: promo_with_safety,
                    uplift_limit,
                }),
            )
        }
        _ => (normal_ceiling, false, None),
    };

    Ok(MaxBidResult {
        ceiling,
        normal_ceiling,
        was_uplift_capped,
        breakdown: MaxBidBreakdown {
            price,
            ratio_target,
            expected_cvr,
            hard_ceiling,
            safety_factor: config.safety_factor,
            promo: promo_breakdown,
        },
    })
}

// ---------------------------------------------------------------------------
// Clip helper
// ---------------------------------------------------------------------------

/// Outcome of clipping a proposed bid against the ceiling.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BidClip {
    pub bid: f64,
    pub was_clipped: bool,
    /// How much was shaved off the proposal (0 when unclipped).
    pub reduction: f64,
}

/// Clip a proposed bid to the ceiling.
///
/// An in-range proposal is returned bit-identically. An over-ceiling
/// proposal is replaced by the ceiling rounded down to the smallest
/// currency unit, so the clipped bid can never exceed the ceiling.
pub fn apply_bid_ceiling(
    proposed_bid: f64,
    ceiling: f64,
    config: &GuardConfig,
) -> CoreResult<BidClip> {
    config.validate()?;

    if proposed_bid <= ceiling {
        return Ok(BidClip {
            bid: proposed_bid,
            was_clipped: false,
            reduction: 0.0,
        });
    }

    let unit = config.smallest_unit;
    let bid = (ceiling / unit).floor() * unit;
    Ok(BidClip {
        bid,
        was_clipped: true,
        reduction: proposed_bid - bid,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
