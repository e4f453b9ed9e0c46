//! Model training module
//!
//! Provides the price model and its selection procedure:
//! - CART regression trees
//! - Stochastic gradient boosting over those trees
//! - Hold-out split and k-fold cross-validation
//! - Exhaustive grid search scored by R²

mod config;
mod engine;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod grid_search;
pub mod metrics;

pub use config::TrainingConfig;
pub use cross_validation::{train_test_split, CVResults, CVSplit, CrossValidator};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{FeatureImportance, FittedModel, ModelTrainer, ALGORITHM};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use grid_search::{GridSearchCV, HyperParameters, ParamGrid, SearchResult};
pub use metrics::{r2_score, RegressionMetrics, TrainingMetrics};
