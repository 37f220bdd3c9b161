//! End-to-end evaluation tests over realistic product fixtures.

use chrono::{Days, NaiveDate};

use bidcap_core::{
    BudgetAlertLevel, Confidence, DailyMetric, InvestmentState, LifecycleStage, PromoPhase,
};
use bidcap_pipeline::{
    evaluate_batch, evaluate_product, group_by_product, load_history, EvaluationConfig,
    EvaluationRegistry, ProductSnapshot,
};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

/// Steady history: `days` days at a constant spend/revenue ratio.
fn steady_history(days: u64, revenue: f64, ratio: f64) -> Vec<DailyMetric> {
    (0..days)
        .map(|i| DailyMetric::new(start_date() + Days::new(i), revenue, revenue * ratio))
        .collect()
}

/// A mature product with plenty of history, spending on target.
fn mature_grow_product() -> ProductSnapshot {
    ProductSnapshot {
        product_id: "SKU-GROW-01".into(),
        keyword_id: Some("kw-espresso-grinder".into()),
        margin_potential: 0.55,
        stage: LifecycleStage::Grow,
        phase: PromoPhase::Normal,
        as_of: start_date() + Days::new(119),
        history: steady_history(120, 15_000.0, 0.12),
        price: 4_500.0,
        expected_cvr: 0.025,
        promo_cvr: None,
        value_ceiling: 0.42,
        value_ceiling_cap: None,
        total_sales_30d: 450_000.0,
        ad_sales_30d: 135_000.0,
        seo_factor: None,
        launch_date: None,
        launch_budget: None,
    }
}

/// A freshly launched product burning well past its steady-state ratio.
fn overspending_launch_product() -> ProductSnapshot {
    ProductSnapshot {
        product_id: "SKU-LAUNCH-07".into(),
        keyword_id: Some("kw-travel-kettle".into()),
        margin_potential: 0.50,
        stage: LifecycleStage::LaunchHard,
        phase: PromoPhase::Normal,
        as_of: start_date() + Days::new(20),
        history: steady_history(21, 3_000.0, 0.45),
        price: 2_200.0,
        expected_cvr: 0.018,
        promo_cvr: None,
        value_ceiling: 0.38,
        value_ceiling_cap: Some(0.40),
        total_sales_30d: 60_000.0,
        ad_sales_30d: 40_000.0,
        seo_factor: None,
        launch_date: Some(start_date()),
        launch_budget: Some(4_000.0),
    }
}

/// A harvest product during a main sale event.
fn harvest_sale_product() -> ProductSnapshot {
    ProductSnapshot {
        product_id: "SKU-HARVEST-12".into(),
        keyword_id: None,
        margin_potential: 0.60,
        stage: LifecycleStage::Harvest,
        phase: PromoPhase::MainSale,
        as_of: start_date() + Days::new(99),
        history: steady_history(100, 8_000.0, 0.08),
        price: 1_800.0,
        expected_cvr: 0.03,
        promo_cvr: Some(0.045),
        value_ceiling: 0.30,
        value_ceiling_cap: None,
        total_sales_30d: 240_000.0,
        ad_sales_30d: 48_000.0,
        seo_factor: Some(1.05),
        launch_date: None,
        launch_budget: None,
    }
}

// ---------------------------------------------------------------------------
// Single-product evaluations
// ---------------------------------------------------------------------------

#[test]
fn mature_product_evaluates_healthy() {
    let eval = evaluate_product(&mature_grow_product(), &EvaluationConfig::default()).unwrap();

    assert_eq!(eval.estimate.confidence, Confidence::High);
    assert!(!eval.estimate.used_fallback);
    assert!((eval.estimate.ratio - 0.12).abs() < 1e-9);

    // On-target spend: budget untouched, everything permitted.
    assert_eq!(eval.loss_budget.state, InvestmentState::Safe);
    assert_eq!(eval.rollup.level, BudgetAlertLevel::Safe);
    assert!(eval.constraints.allow_strong_up);
    assert!(eval.constraints.allow_stop);

    // Share 135k/450k = 0.30: ratio model 0.12 / 0.30 = 0.40 vs value
    // 0.42 — ratio model is the stricter side.
    assert!(eval.target_ratio.ratio_model_selected);
    assert!((eval.target_ratio.final_target - 0.40).abs() < 1e-9);

    // Ceiling: 4,500 × 0.40 × 0.025 × 1.15 = 51.75.
    assert!((eval.max_bid.ceiling - 51.75).abs() < 1e-9);
}

#[test]
fn overspending_launch_is_throttled_but_never_stopped() {
    let eval =
        evaluate_product(&overspending_launch_product(), &EvaluationConfig::default()).unwrap();

    // 21 days all in one ratio bin: enough days for an estimate.
    assert!(!eval.estimate.used_fallback);
    assert!((eval.estimate.ratio - 0.45).abs() < 1e-9);

    // Spending at the estimated ratio keeps the rolling budget intact,
    // but the launch investment has no granted-budget consumption since
    // spend equals the estimate. The product is throttle-eligible only
    // through its state, which here is Safe.
    assert_eq!(eval.loss_budget.state, InvestmentState::Safe);
    assert!(!eval.constraints.allow_stop);
    assert!(!eval.constraints.allow_neg);

    // Value model: 0.38 × 1.1 = 0.418, capped at 0.40. Ratio model:
    // share 40k/60k = 0.6667, launch target min(0.50, 0.45 × 1.3) =
    // 0.50, 0.50 / 0.6667 = 0.75. Value model wins.
    assert!(eval.target_ratio.breakdown.value_cap_bound);
    assert!(!eval.target_ratio.ratio_model_selected);
    assert!((eval.target_ratio.final_target - 0.40).abs() < 1e-9);
}

#[test]
fn launch_burn_above_estimate_trips_the_rollup() {
    let mut snapshot = overspending_launch_product();
    // Every day burns 1.2× revenue on ads — outside the plausible ratio
    // range, so the estimator falls back to 0.15.
    snapshot.history = steady_history(5, 3_000.0, 1.2);
    snapshot.as_of = start_date() + Days::new(4);
    let eval = evaluate_product(&snapshot, &EvaluationConfig::default()).unwrap();

    assert!(eval.estimate.used_fallback);
    assert_eq!(eval.estimate.valid_days_used, 0);
    // 15,000 revenue × (1.2 − 0.15) = 15,750 invested against a 4,000
    // launch budget: the investment window drives a critical alert.
    let inv = eval.launch_investment.as_ref().unwrap();
    assert!((inv.investment - 15_750.0).abs() < 1e-6);
    assert!(eval.rollup.launch_investment_ratio > 1.0);
    assert_eq!(eval.rollup.level, BudgetAlertLevel::Critical);
    // The rolling budget is breached too, which forbids increases.
    assert_eq!(eval.loss_budget.state, InvestmentState::Breach);
    assert!(!eval.constraints.allow_up);
}

#[test]
fn main_sale_harvest_gets_a_capped_promotional_ceiling() {
    let eval = evaluate_product(&harvest_sale_product(), &EvaluationConfig::default()).unwrap();

    assert!(eval.target_ratio.breakdown.promo_multiplier_applied);
    assert_eq!(eval.target_ratio.breakdown.seo_factor, Some(1.05));

    // The guard anchors to the Normal-phase ceiling and caps the uplift.
    let promo = eval.max_bid.breakdown.promo.as_ref().unwrap();
    assert!(promo.uplift_limit >= eval.max_bid.normal_ceiling);
    assert!(eval.max_bid.ceiling <= promo.uplift_limit + 1e-9);
    assert!(eval.max_bid.ceiling >= eval.max_bid.normal_ceiling);
}

// ---------------------------------------------------------------------------
// Batch + registry
// ---------------------------------------------------------------------------

#[test]
fn batch_evaluation_feeds_the_registry() {
    let snapshots = vec![
        mature_grow_product(),
        overspending_launch_product(),
        harvest_sale_product(),
    ];
    let results = evaluate_batch(&snapshots, &EvaluationConfig::default());
    assert_eq!(results.len(), 3);

    let mut registry = EvaluationRegistry::new();
    for result in results {
        registry.record(result.unwrap());
    }
    assert_eq!(registry.len(), 3);

    let summary = registry.summary();
    assert_eq!(summary.products, 3);
    assert_eq!(summary.safe + summary.watch + summary.limit + summary.breach, 3);

    let grow = registry.latest("SKU-GROW-01").unwrap();
    assert_eq!(grow.stage, LifecycleStage::Grow);
}

#[test]
fn evaluation_record_serializes_with_full_breakdown() {
    let eval = evaluate_product(&mature_grow_product(), &EvaluationConfig::default()).unwrap();
    let json = serde_json::to_string_pretty(&eval).unwrap();
    assert!(json.contains("SKU-GROW-01"));
    assert!(json.contains("final_target"));
    assert!(json.contains("ad_share"));
    assert!(json.contains("normal_ceiling"));
    assert!(json.contains("reason"));
}

// ---------------------------------------------------------------------------
// CSV round trip into evaluation
// ---------------------------------------------------------------------------

#[test]
fn csv_history_drives_an_evaluation() {
    let mut csv_data = String::from("product_id,date,revenue,ad_spend\n");
    for i in 0..60u64 {
        let date = start_date() + Days::new(i);
        csv_data.push_str(&format!("SKU-CSV-01,{},10000,1200\n", date));
    }
    let records = load_history(csv_data.as_bytes()).unwrap();
    let groups = group_by_product(&records);
    assert_eq!(groups.len(), 1);
    let (product_id, history) = groups.into_iter().next().unwrap();

    let snapshot = ProductSnapshot {
        product_id,
        keyword_id: None,
        margin_potential: 0.55,
        stage: LifecycleStage::Grow,
        phase: PromoPhase::Normal,
        as_of: start_date() + Days::new(59),
        history,
        price: 3_000.0,
        expected_cvr: 0.02,
        promo_cvr: None,
        value_ceiling: 0.50,
        value_ceiling_cap: None,
        total_sales_30d: 300_000.0,
        ad_sales_30d: 90_000.0,
        seo_factor: None,
        launch_date: None,
        launch_budget: None,
    };
    let eval = evaluate_product(&snapshot, &EvaluationConfig::default()).unwrap();
    assert!((eval.estimate.ratio - 0.12).abs() < 1e-9);
    assert_eq!(eval.estimate.valid_days_used, 60);
}
