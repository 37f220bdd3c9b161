//! Target-ratio integration.
//!
//! Converts the stage's advertising-cost ratio target (spend over total
//! sales) into an advertising-cost-to-ad-revenue target, blends it with
//! the lifetime-value model's independently supplied ceiling, and clips
//! the result to global bounds. The stricter (lower) of the two models
//! always wins.
//!
//! # Steps
//!
//! 1. Take the stage target; during a main sale multiply it by
//!    `sale_multiplier`, then apply the optional SEO adjustment.
//! 2. Measure the ad-sales share of trailing sales, substituting
//!    `ad_share_default` under the sales floor and flooring the measured
//!    share at `ad_share_min` so the conversion stays finite.
//! 3. `from_ratio_model = adjusted_target / ad_share`.
//! 4. Scale the value ceiling by its per-stage factor and clip it to the
//!    optional hard cap.
//! 5. `final = min(from_ratio_model, from_value_model)`, clipped to
//!    `[global_min, global_max]`.
//!
//! Every intermediate value is retained in the breakdown record.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreResult};
use crate::lifecycle::{LifecycleStage, LifecycleTargets};
use crate::thresholds::{
    DEFAULT_AD_SHARE, DEFAULT_AD_SHARE_MIN, DEFAULT_GLOBAL_MAX, DEFAULT_GLOBAL_MIN,
    DEFAULT_SALES_FLOOR, DEFAULT_SALE_MULTIPLIER, VALUE_FACTOR_GROW, VALUE_FACTOR_HARVEST,
    VALUE_FACTOR_LAUNCH,
};

// ---------------------------------------------------------------------------
// Promotional phase
// ---------------------------------------------------------------------------

/// Where the evaluation falls relative to a scheduled sale event.
///
/// Only `MainSale` changes the arithmetic here; `PreSale` and `CoolDown`
/// matter to callers supplying conversion-rate expectations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromoPhase {
    Normal,
    PreSale,
    MainSale,
    CoolDown,
}

impl PromoPhase {
    pub const ALL: [PromoPhase; 4] = [
        PromoPhase::Normal,
        PromoPhase::PreSale,
        PromoPhase::MainSale,
        PromoPhase::CoolDown,
    ];

    pub fn is_main_sale(&self) -> bool {
        matches!(self, PromoPhase::MainSale)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PromoPhase::Normal => "normal",
            PromoPhase::PreSale => "pre-sale",
            PromoPhase::MainSale => "main-sale",
            PromoPhase::CoolDown => "cool-down",
        }
    }
}

impl std::fmt::Display for PromoPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Stage-target multiplier during a main sale.
    pub sale_multiplier: f64,
    /// Ad-sales share assumed when trailing sales are below `sales_floor`.
    pub ad_share_default: f64,
    /// Lower bound on the measured ad-sales share.
    pub ad_share_min: f64,
    /// Trailing-sales level below which the measured share is ignored.
    pub sales_floor: f64,
    /// Per-stage scale on the value-model ceiling.
    pub value_factor_launch: f64,
    pub value_factor_grow: f64,
    pub value_factor_harvest: f64,
    /// Global clip bounds on the final target.
    pub global_min: f64,
    pub global_max: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            sale_multiplier: DEFAULT_SALE_MULTIPLIER,
            ad_share_default: DEFAULT_AD_SHARE,
            ad_share_min: DEFAULT_AD_SHARE_MIN,
            sales_floor: DEFAULT_SALES_FLOOR,
            value_factor_launch: VALUE_FACTOR_LAUNCH,
            value_factor_grow: VALUE_FACTOR_GROW,
            value_factor_harvest: VALUE_FACTOR_HARVEST,
            global_min: DEFAULT_GLOBAL_MIN,
            global_max: DEFAULT_GLOBAL_MAX,
        }
    }
}

impl IntegratorConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.sale_multiplier < 1.0 {
            return Err(ConfigError::InvalidSaleMultiplier(self.sale_multiplier));
        }
        if !(self.ad_share_min > 0.0
            && self.ad_share_min <= self.ad_share_default
            && self.ad_share_default <= 1.0)
        {
            return Err(ConfigError::InvalidAdShareBounds {
                min: self.ad_share_min,
                default: self.ad_share_default,
            });
        }
        if self.sales_floor < 0.0 {
            return Err(ConfigError::NegativeParameter {
                name: "sales_floor",
                value: self.sales_floor,
            });
        }
        for (name, value) in [
            ("value_factor_launch", self.value_factor_launch),
            ("value_factor_grow", self.value_factor_grow),
            ("value_factor_harvest", self.value_factor_harvest),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositiveParameter { name, value });
            }
        }
        if !(self.global_min >= 0.0 && self.global_min < self.global_max) {
            return Err(ConfigError::InvalidGlobalBounds {
                min: self.global_min,
                max: self.global_max,
            });
        }
        Ok(())
    }

    fn value_stage_factor(&self, stage: LifecycleStage) -> f64 {
        match stage {
            LifecycleStage::LaunchHard | LifecycleStage::LaunchSoft => self.value_factor_launch,
            LifecycleStage::Grow => self.value_factor_grow,
            LifecycleStage::Harvest => self.value_factor_harvest,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Every intermediate of the integration, for audit.
#[derive(Clone, Debug, Serialize)]
pub struct TargetRatioBreakdown {
    pub stage_target: f64,
    pub promo_multiplier_applied: bool,
    pub seo_factor: Option<f64>,
    /// Stage target after promo multiplier and SEO adjustment.
    pub adjusted_target: f64,
    pub total_sales: f64,
    pub ad_sales: f64,
    pub ad_share: f64,
    /// True when `total_sales` was under the floor and the default share
    /// was substituted.
    pub ad_share_defaulted: bool,
    /// True when the measured share was raised to `ad_share_min`.
    pub ad_share_floored: bool,
    pub value_ceiling_raw: f64,
    pub value_stage_factor: f64,
    pub value_ceiling_cap: Option<f64>,
    /// True when the hard cap bound the scaled value ceiling.
    pub value_cap_bound: bool,
}

/// The authoritative advertising-cost ceiling for the bidding caller.
#[derive(Clone, Debug, Serialize)]
pub struct TargetRatioResult {
    /// `min(from_ratio_model, from_value_model)` clipped to the global
    /// bounds.
    pub final_target: f64,
    pub from_ratio_model: f64,
    pub from_value_model: f64,
    /// True when the ratio model was the binding side of the min.
    pub ratio_model_selected: bool,
    pub was_clipped: bool,
    pub breakdown: TargetRatioBreakdown,
}

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// Blend the stage target with the value-model ceiling into the final
/// advertising-cost target.
#[allow(clippy::too_many_arguments)]
pub fn integrate_target_ratio(
    targets: &LifecycleTargets,
    phase: PromoPhase,
    total_sales_30d: f64,
    ad_sales_30d: f64,
    value_ceiling: f64,
    value_ceiling_cap: Option<f64>,
    seo_factor: Option<f64>,
    config: &IntegratorConfig,
) -> CoreResult<TargetRatioResult> {
    config.validate()?;

    // (a) Stage target, promo-adjusted, SEO-adjusted.
    let stage_target = targets.current_target;
    let promo_multiplier_applied = phase.is_main_sale();
    let mut adjusted_target = if promo_multiplier_applied {
        stage_target * config.sale_multiplier
    } else {
        stage_target
    };
    if let Some(factor) = seo_factor {
        adjusted_target *= factor;
    }

    // (b) Ad-sales share, defended against thin sales and near-zero
    // attribution.
    let (ad_share, ad_share_defaulted, ad_share_floored) = if total_sales_30d < config.sales_floor {
        (config.ad_share_default, true, false)
    } else {
        let measured = ad_sales_30d / total_sales_30d;
        if measured < config.ad_share_min {
            (config.ad_share_min, false, true)
        } else {
            (measured, false, false)
        }
    };

    // (c) Ratio-model conversion to an ad-revenue-denominated target.
    let from_ratio_model = adjusted_target / ad_share;

    // (d) Value-model ceiling, stage-scaled and hard-capped.
    let value_stage_factor = config.value_stage_factor(targets.current_stage);
    let scaled = value_ceiling * value_stage_factor;
    let (from_value_model, value_cap_bound) = match value_ceiling_cap {
        Some(cap) if scaled > cap => (cap, true),
        _ => (scaled, false),
    };

    // (e) The stricter model wins.
    let ratio_model_selected = from_ratio_model <= from_value_model;
    let blended = from_ratio_model.min(from_value_model);

    // (f) Global clip.
    let final_target = blended.clamp(config.global_min, config.global_max);
    let was_clipped = final_target != blended;

    Ok(TargetRatioResult {
        final_target,
        from_ratio_model,
        from_value_model,
        ratio_model_selected,
        was_clipped,
        breakdown: TargetRatioBreakdown {
            stage_target,
            promo_multiplier_applied,
            seo_factor,
            adjusted_target,
            total_sales: total_sales_30d,
            ad_sales: ad_sales_30d,
            ad_share,
            ad_share_defaulted,
            ad_share_floored,
            value_ceiling_raw: value_ceiling,
            value_stage_factor,
            value_ceiling_cap,
            value_cap_bound,
        },
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
