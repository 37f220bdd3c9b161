//! Per-product bid target evaluation over `bidcap-core`.
//!
//! Assembles one product's complete input snapshot, runs the six core
//! components in their fixed dependency order, and produces a single
//! auditable [`BidTargetEvaluation`]. Batches fan out across products
//! with rayon; a caller-owned [`EvaluationRegistry`] holds the latest
//! evaluation per product.

pub mod evaluator;
pub mod history_loader;
pub mod registry;
pub mod types;

pub use evaluator::{evaluate_batch, evaluate_product, EvalError, EvaluationConfig};
pub use history_loader::{group_by_product, load_history, load_history_file, HistoryRecord};
pub use registry::{EvaluationRegistry, RegistrySummary};
pub use types::{BidTargetEvaluation, ProductSnapshot};
