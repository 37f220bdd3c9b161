//! Caller-owned evaluation registry.
//!
//! The orchestrating caller constructs one of these, records each
//! product's latest evaluation into it, and passes it wherever the
//! results are consumed. There is deliberately no process-wide singleton
//! behind it — the registry is plain owned state.

use std::collections::HashMap;

use serde::Serialize;

use bidcap_core::{BudgetAlertLevel, InvestmentState};

use crate::types::BidTargetEvaluation;

/// A map from product id to its latest evaluation.
#[derive(Debug, Default)]
pub struct EvaluationRegistry {
    evaluations: HashMap<String, BidTargetEvaluation>,
}

impl EvaluationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an evaluation, returning the one it replaced, if any.
    pub fn record(&mut self, evaluation: BidTargetEvaluation) -> Option<BidTargetEvaluation> {
        self.evaluations
            .insert(evaluation.product_id.clone(), evaluation)
    }

    /// The latest evaluation for a product.
    pub fn latest(&self, product_id: &str) -> Option<&BidTargetEvaluation> {
        self.evaluations.get(product_id)
    }

    pub fn remove(&mut self, product_id: &str) -> Option<BidTargetEvaluation> {
        self.evaluations.remove(product_id)
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BidTargetEvaluation)> {
        self.evaluations.iter()
    }

    /// Aggregate view over every recorded product.
    pub fn summary(&self) -> RegistrySummary {
        let mut summary = RegistrySummary::default();
        summary.products = self.evaluations.len();
        for evaluation in self.evaluations.values() {
            match evaluation.loss_budget.state {
                InvestmentState::Safe => summary.safe += 1,
                InvestmentState::Watch => summary.watch += 1,
                InvestmentState::Limit => summary.limit += 1,
                InvestmentState::Breach => summary.breach += 1,
            }
            if evaluation.rollup.level == BudgetAlertLevel::Critical {
                summary.critical_products.push(evaluation.product_id.clone());
            }
        }
        summary.critical_products.sort();
        summary
    }
}

/// Counts per investment state plus the products at critical alert.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RegistrySummary {
    pub products: usize,
    pub safe: usize,
    pub watch: usize,
    pub limit: usize,
    pub breach: usize,
    pub critical_products: Vec<String>,
}
