//! Derived vehicle features
//!
//! Age-based features depend on the reference date passed in by the caller.
//! Scoring the same record on two different days can give different values:
//! the vehicle gets one year older when the calendar year changes.

use super::record::VehicleRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const VEHICLE_AGE: &str = "Vehicle_Age";
pub const KMS_PER_YEAR: &str = "Kms_Per_Year";
pub const AGE_SQUARED: &str = "Age_Squared";

/// Features computed from a raw record and a reference date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub vehicle_age: f64,
    pub kms_per_year: f64,
    pub age_squared: f64,
}

impl DerivedFeatures {
    pub fn compute(record: &VehicleRecord, reference_date: NaiveDate) -> Self {
        let vehicle_age = f64::from(reference_date.year() - record.year);
        Self {
            vehicle_age,
            kms_per_year: record.kms_driven as f64 / (vehicle_age + 1.0),
            age_squared: vehicle_age * vehicle_age,
        }
    }
}
