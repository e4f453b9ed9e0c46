//! Car price predictor CLI module
//!
//! Command-line interface for training the model, pricing a vehicle and
//! inspecting the live model.

mod estimate;

pub use estimate::{
    confidence_message, depreciation_factor, MileageCategory, PriceEstimate, ANNUAL_DEPRECIATION,
};

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::predictor::{PredictorConfig, PricePredictor};
use crate::preprocessing::VehicleRecord;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<20} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "car-price")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Used car resale price predictor")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding the model artifacts (overrides MODELS_DIR)
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the model on a labeled CSV file
    Train {
        /// Training data (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Date used to compute vehicle ages (YYYY-MM-DD, default today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Estimate the resale price of one vehicle
    Predict {
        #[arg(long)]
        year: i32,

        /// Current ex-showroom price
        #[arg(long)]
        present_price: f64,

        #[arg(long)]
        kms_driven: i64,

        /// Petrol, Diesel or CNG
        #[arg(long)]
        fuel_type: String,

        /// Dealer or Individual
        #[arg(long)]
        seller_type: String,

        /// Manual or Automatic
        #[arg(long)]
        transmission: String,

        /// Number of previous owners (0-3)
        #[arg(long, default_value = "0")]
        owner: i64,

        /// Date used to compute the vehicle age (YYYY-MM-DD, default today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the trained model's metrics and feature importances
    Info,

    /// Report whether a trained model is available
    Status,
}

/// Resolve the predictor configuration from flags, file and environment
pub fn build_config(cli: &Cli) -> anyhow::Result<PredictorConfig> {
    let mut config = match &cli.config {
        Some(path) => PredictorConfig::from_file(path)?,
        None => PredictorConfig::default(),
    };
    if let Some(dir) = &cli.model_dir {
        config = config.with_models_dir(dir);
    }
    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(predictor: &PricePredictor, data: &Path, as_of: Option<NaiveDate>) -> anyhow::Result<()> {
    section("Train");

    step_run(&format!("Training on {}", data.display()));
    let start = Instant::now();
    let reference_date = as_of.unwrap_or_else(|| Local::now().date_naive());
    let outcome = predictor.train_at(data, reference_date)?;
    step_done(&format!("{:.1?}", start.elapsed()));

    let m = &outcome.metrics;
    println!();
    kv("R²", &format!("{:.4}", m.r2_score));
    kv("MAE", &format!("{:.4}", m.mae));
    kv("RMSE", &format!("{:.4}", m.rmse));
    kv("MSE", &format!("{:.4}", m.mse));
    kv("CV R² (best)", &format!("{:.4}", m.cv_best_score));
    kv("Train / test rows", &format!("{} / {}", m.n_train, m.n_test));
    kv("Best params", &m.best_params.to_string());

    if let Some(warning) = &outcome.persistence_warning {
        println!();
        println!("  {} {}", "!".yellow().bold(), warning.yellow());
    }
    println!();
    Ok(())
}

pub fn cmd_predict(
    predictor: &PricePredictor,
    record: VehicleRecord,
    as_of: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let reference_date = as_of.unwrap_or_else(|| Local::now().date_naive());
    record.validate(reference_date)?;

    let price = predictor.predict_at(&record, reference_date)?;
    let estimate = PriceEstimate::from_prediction(price, predictor.confidence());
    let age = reference_date.year() - record.year;
    let mileage = MileageCategory::from_kms(record.kms_driven);

    if json {
        let body = serde_json::json!({
            "estimate": estimate,
            "details": {
                "vehicle_age": age,
                "depreciation_factor": depreciation_factor(age),
                "mileage_category": mileage.describe(),
            }
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    section("Estimate");
    kv("Estimated price", &format!("{:.2}", estimate.estimated_price).bold().to_string());
    kv("Range", &format!("{:.2} - {:.2}", estimate.min_price, estimate.max_price));
    kv("Confidence", &format!("{:.2}%", estimate.confidence_pct));
    println!("  {}", dim(&estimate.message));
    println!();
    kv("Vehicle age", &format!("{} years", age));
    kv("Depreciation factor", &format!("{:.2}", depreciation_factor(age)));
    kv("Mileage", mileage.describe());
    println!();
    Ok(())
}

pub fn cmd_info(predictor: &PricePredictor) -> anyhow::Result<()> {
    section("Model");
    let Some(info) = predictor.model_info() else {
        println!("  {}", "The model has not been trained yet".yellow());
        println!();
        return Ok(());
    };

    kv("Algorithm", &info.algorithm);
    kv("Features", &info.n_features.to_string());
    kv("R²", &format!("{:.4}", info.metrics.r2_score));
    kv("RMSE", &format!("{:.4}", info.metrics.rmse));
    kv("Best params", &info.metrics.best_params.to_string());

    if let Some(importances) = predictor.feature_importance() {
        section("Feature importance");
        for item in importances {
            let bar = "█".repeat((item.importance * 40.0).round() as usize);
            println!("  {:<24} {:>6.3} {}", muted(&item.feature), item.importance, accent(&bar));
        }
    }
    println!();
    Ok(())
}

pub fn cmd_status(predictor: &PricePredictor) -> anyhow::Result<()> {
    let status = predictor.status();
    if status.trained {
        println!("  {} model trained", ok("✓"));
    } else {
        println!("  {} model not trained", "✗".yellow());
    }
    Ok(())
}
