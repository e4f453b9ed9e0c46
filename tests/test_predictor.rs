//! Integration test: predictor service train / predict / persist cycle

use car_price_predictor::predictor::{PredictorConfig, PricePredictor};
use car_price_predictor::preprocessing::VehicleRecord;
use car_price_predictor::training::{ParamGrid, TrainingConfig};
use car_price_predictor::PredictorError;
use chrono::NaiveDate;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str =
    "Car_Name,Year,Selling_Price,Present_Price,Kms_Driven,Fuel_Type,Seller_Type,Transmission,Owner";

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// 300 rows where the price is roughly half the list price minus a little per year of age
fn write_synthetic_csv(dir: &Path, seed: u64) -> (PathBuf, f64, f64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let fuels = ["Petrol", "Diesel", "CNG"];
    let sellers = ["Dealer", "Individual"];
    let transmissions = ["Manual", "Automatic"];

    let mut lines = vec![HEADER.to_string()];
    let mut min_price = f64::MAX;
    let mut max_price = f64::MIN;
    for i in 0..300 {
        let year: i32 = rng.gen_range(2005..=2023);
        let present_price: f64 = (rng.gen_range(3.0..20.0_f64) * 100.0).round() / 100.0;
        let kms: i64 = rng.gen_range(5_000..200_000);
        let age = (2024 - year) as f64;
        let noise: f64 = rng.gen_range(-0.1..0.1);
        let selling_price = ((0.5 * present_price - 0.05 * age + noise) * 100.0).round() / 100.0;
        min_price = min_price.min(selling_price);
        max_price = max_price.max(selling_price);
        lines.push(format!(
            "car{},{},{},{},{},{},{},{},{}",
            i,
            year,
            selling_price,
            present_price,
            kms,
            fuels.choose(&mut rng).unwrap(),
            sellers.choose(&mut rng).unwrap(),
            transmissions.choose(&mut rng).unwrap(),
            rng.gen_range(0..=2),
        ));
    }

    let path = dir.join(format!("cars_{}.csv", seed));
    std::fs::write(&path, lines.join("\n")).unwrap();
    (path, min_price, max_price)
}

fn quick_training() -> TrainingConfig {
    TrainingConfig::new().with_param_grid(ParamGrid {
        n_estimators: vec![100],
        max_depth: vec![3],
        learning_rate: vec![0.1],
        min_samples_split: vec![2],
        subsample: vec![1.0],
    })
}

fn predictor_in(dir: &Path) -> PricePredictor {
    let config = PredictorConfig::new()
        .with_models_dir(dir.join("models"))
        .with_training(quick_training());
    PricePredictor::new(config)
}

fn reference_record() -> VehicleRecord {
    VehicleRecord {
        year: 2020,
        present_price: 10.0,
        kms_driven: 20_000,
        fuel_type: "Petrol".to_string(),
        seller_type: "Dealer".to_string(),
        transmission: "Manual".to_string(),
        owner: 0,
    }
}

#[test]
fn test_untrained_guard() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_in(dir.path());

    assert!(!predictor.status().trained);
    assert_eq!(predictor.confidence(), 0.0);
    assert!(predictor.model_info().is_none());
    assert!(predictor.feature_importance().is_none());

    let result = predictor.predict_at(&reference_record(), reference_date());
    assert!(matches!(result, Err(PredictorError::ModelNotFitted)));
}

#[test]
fn test_end_to_end_training_and_prediction() {
    let dir = TempDir::new().unwrap();
    let (csv, min_price, max_price) = write_synthetic_csv(dir.path(), 7);
    let predictor = predictor_in(dir.path());

    let outcome = predictor.train_at(&csv, reference_date()).unwrap();
    assert!(outcome.persistence_warning.is_none());
    assert!(outcome.metrics.r2_score > 0.8, "r2 = {}", outcome.metrics.r2_score);
    assert!(outcome.metrics.rmse >= 0.0);
    assert_eq!(outcome.metrics.best_params.n_estimators, 100);

    assert!(predictor.status().trained);
    assert_eq!(predictor.confidence(), outcome.metrics.r2_score);

    let price = predictor.predict_at(&reference_record(), reference_date()).unwrap();
    assert!(price >= min_price && price <= max_price, "price {} outside [{}, {}]", price, min_price, max_price);

    let info = predictor.model_info().unwrap();
    assert_eq!(info.algorithm, "Gradient Boosting Regressor");
    assert_eq!(info.n_features, 10);
    assert_eq!(info.feature_names.len(), info.n_features);
    assert!(info.trained);

    let importance = predictor.feature_importance().unwrap();
    assert_eq!(importance.len(), 10);
    assert_eq!(importance[0].feature, "Present_Price");
    assert!(importance.windows(2).all(|w| w[0].importance >= w[1].importance));
}

#[test]
fn test_prediction_is_deterministic_and_survives_reload() {
    let dir = TempDir::new().unwrap();
    let (csv, _, _) = write_synthetic_csv(dir.path(), 11);
    let predictor = predictor_in(dir.path());
    predictor.train_at(&csv, reference_date()).unwrap();

    let record = reference_record();
    let first = predictor.predict_at(&record, reference_date()).unwrap();
    let second = predictor.predict_at(&record, reference_date()).unwrap();
    assert_eq!(first, second);

    let reloaded = predictor_in(dir.path());
    assert!(reloaded.status().trained);
    let restored = reloaded.predict_at(&record, reference_date()).unwrap();
    assert!((restored - first).abs() < 1e-9);
    assert!((reloaded.confidence() - predictor.confidence()).abs() < 1e-12);
}

#[test]
fn test_unknown_category_scores_as_reference() {
    let dir = TempDir::new().unwrap();
    let (csv, _, _) = write_synthetic_csv(dir.path(), 3);
    let predictor = predictor_in(dir.path());
    predictor.train_at(&csv, reference_date()).unwrap();

    let electric = VehicleRecord {
        fuel_type: "Electric".to_string(),
        ..reference_record()
    };
    let cng = VehicleRecord {
        fuel_type: "CNG".to_string(),
        ..reference_record()
    };

    let electric_price = predictor.predict_at(&electric, reference_date()).unwrap();
    let cng_price = predictor.predict_at(&cng, reference_date()).unwrap();
    assert_eq!(electric_price, cng_price);
}

#[test]
fn test_failed_retrain_keeps_previous_model() {
    let dir = TempDir::new().unwrap();
    let (csv, _, _) = write_synthetic_csv(dir.path(), 5);
    let predictor = predictor_in(dir.path());
    predictor.train_at(&csv, reference_date()).unwrap();
    let before = predictor.predict_at(&reference_record(), reference_date()).unwrap();

    let bad_csv = dir.path().join("bad.csv");
    std::fs::write(&bad_csv, "Year,Present_Price\n2015,5.0\n").unwrap();
    let err = predictor.train_at(&bad_csv, reference_date()).unwrap_err();
    assert!(err.is_data_validation());

    let empty_csv = dir.path().join("empty.csv");
    std::fs::write(&empty_csv, format!("{}\n", HEADER)).unwrap();
    assert!(predictor.train_at(&empty_csv, reference_date()).is_err());

    assert!(predictor.status().trained);
    let after = predictor.predict_at(&reference_record(), reference_date()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_save_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let (csv, _, _) = write_synthetic_csv(dir.path(), 13);
    let predictor = predictor_in(dir.path());
    predictor.train_at(&csv, reference_date()).unwrap();

    let models_dir = dir.path().join("models");
    let mut names: Vec<String> = std::fs::read_dir(&models_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["car_price_model.json", "scaler.json"]);
}

#[test]
fn test_mismatched_artifacts_load_as_untrained() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let (csv_a, _, _) = write_synthetic_csv(dir_a.path(), 17);
    let (csv_b, _, _) = write_synthetic_csv(dir_b.path(), 19);

    predictor_in(dir_a.path()).train_at(&csv_a, reference_date()).unwrap();
    predictor_in(dir_b.path()).train_at(&csv_b, reference_date()).unwrap();

    std::fs::copy(
        dir_b.path().join("models").join("scaler.json"),
        dir_a.path().join("models").join("scaler.json"),
    )
    .unwrap();

    let reloaded = predictor_in(dir_a.path());
    assert!(!reloaded.status().trained);
}

#[test]
fn test_save_failure_keeps_new_model() {
    let dir = TempDir::new().unwrap();
    let (csv, _, _) = write_synthetic_csv(dir.path(), 23);

    // a regular file where the models directory should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let config = PredictorConfig::new()
        .with_models_dir(blocker.join("models"))
        .with_training(quick_training());
    let predictor = PricePredictor::new(config);

    let outcome = predictor.train_at(&csv, reference_date()).unwrap();
    assert!(outcome.persistence_warning.is_some());
    assert!(predictor.status().trained);
    assert!(predictor.predict_at(&reference_record(), reference_date()).is_ok());
}

#[test]
fn test_future_year_row_does_not_poison_artifacts() {
    let dir = TempDir::new().unwrap();
    let (csv, _, _) = write_synthetic_csv(dir.path(), 29);
    let mut contents = std::fs::read_to_string(&csv).unwrap();
    contents.push_str("\ncar_future,2025,5.0,10.0,15000,Petrol,Dealer,Manual,0");
    std::fs::write(&csv, contents).unwrap();

    let predictor = predictor_in(dir.path());
    predictor.train_at(&csv, reference_date()).unwrap();
    let price = predictor.predict_at(&reference_record(), reference_date()).unwrap();
    assert!(price.is_finite());

    let reloaded = predictor_in(dir.path());
    assert!(reloaded.status().trained);
    let restored = reloaded.predict_at(&reference_record(), reference_date()).unwrap();
    assert!((restored - price).abs() < 1e-9);
}
