//! Raw vehicle records and their column vocabulary

use crate::error::{PredictorError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const YEAR: &str = "Year";
pub const PRESENT_PRICE: &str = "Present_Price";
pub const KMS_DRIVEN: &str = "Kms_Driven";
pub const FUEL_TYPE: &str = "Fuel_Type";
pub const SELLER_TYPE: &str = "Seller_Type";
pub const TRANSMISSION: &str = "Transmission";
pub const OWNER: &str = "Owner";
pub const SELLING_PRICE: &str = "Selling_Price";
pub const CAR_NAME: &str = "Car_Name";

/// Columns a training CSV must provide
pub const REQUIRED_COLUMNS: [&str; 8] = [
    YEAR,
    PRESENT_PRICE,
    KMS_DRIVEN,
    FUEL_TYPE,
    SELLER_TYPE,
    TRANSMISSION,
    OWNER,
    SELLING_PRICE,
];

pub const FUEL_TYPES: [&str; 3] = ["Petrol", "Diesel", "CNG"];
pub const SELLER_TYPES: [&str; 2] = ["Dealer", "Individual"];
pub const TRANSMISSIONS: [&str; 2] = ["Manual", "Automatic"];

/// Oldest model year accepted by [`VehicleRecord::validate`]
pub const MIN_MODEL_YEAR: i32 = 1990;
/// Highest accepted number of previous owners
pub const MAX_OWNERS: i64 = 3;

/// A single vehicle as submitted for scoring.
///
/// Categorical attributes stay as strings: a value never seen during training
/// must reach the encoder instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Present_Price")]
    pub present_price: f64,
    #[serde(rename = "Kms_Driven")]
    pub kms_driven: i64,
    #[serde(rename = "Fuel_Type")]
    pub fuel_type: String,
    #[serde(rename = "Seller_Type")]
    pub seller_type: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Owner")]
    pub owner: i64,
}

impl VehicleRecord {
    /// Value of one of the categorical columns by name
    pub fn category(&self, column: &str) -> Option<&str> {
        match column {
            FUEL_TYPE => Some(&self.fuel_type),
            SELLER_TYPE => Some(&self.seller_type),
            TRANSMISSION => Some(&self.transmission),
            _ => None,
        }
    }

    /// Check the record against the accepted input domain.
    ///
    /// Scoring does not call this; unknown categories are tolerated there and
    /// fall back to the reference category.
    pub fn validate(&self, reference_date: NaiveDate) -> Result<()> {
        let current_year = reference_date.year();
        if self.year < MIN_MODEL_YEAR || self.year > current_year {
            return Err(PredictorError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                YEAR, MIN_MODEL_YEAR, current_year, self.year
            )));
        }
        if !(self.present_price > 0.0) {
            return Err(PredictorError::ValidationError(format!(
                "{} must be greater than 0",
                PRESENT_PRICE
            )));
        }
        if self.kms_driven < 0 {
            return Err(PredictorError::ValidationError(format!(
                "{} cannot be negative",
                KMS_DRIVEN
            )));
        }
        if !(0..=MAX_OWNERS).contains(&self.owner) {
            return Err(PredictorError::ValidationError(format!(
                "{} must be between 0 and {}, got {}",
                OWNER, MAX_OWNERS, self.owner
            )));
        }
        check_category(FUEL_TYPE, &self.fuel_type, &FUEL_TYPES)?;
        check_category(SELLER_TYPE, &self.seller_type, &SELLER_TYPES)?;
        check_category(TRANSMISSION, &self.transmission, &TRANSMISSIONS)?;
        Ok(())
    }
}

fn check_category(column: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(PredictorError::ValidationError(format!(
            "invalid {} '{}', expected one of {:?}",
            column, value, allowed
        )))
    }
}

/// A labeled row from a training CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    #[serde(rename = "Selling_Price")]
    pub selling_price: f64,
    #[serde(rename = "Car_Name", default, skip_serializing_if = "Option::is_none")]
    pub car_name: Option<String>,
}

impl TrainingRecord {
    /// Key identifying exact duplicates across every raw column
    pub(crate) fn duplicate_key(&self) -> (i32, u64, i64, &str, &str, &str, i64, u64, Option<&str>) {
        let v = &self.vehicle;
        (
            v.year,
            v.present_price.to_bits(),
            v.kms_driven,
            v.fuel_type.as_str(),
            v.seller_type.as_str(),
            v.transmission.as_str(),
            v.owner,
            self.selling_price.to_bits(),
            self.car_name.as_deref(),
        )
    }

    /// Whether the row yields finite derived features at `reference_date`.
    ///
    /// Categories are not checked here; unseen values still encode.
    pub fn is_trainable(&self, reference_date: NaiveDate) -> bool {
        let v = &self.vehicle;
        (MIN_MODEL_YEAR..=reference_date.year()).contains(&v.year)
            && v.present_price.is_finite()
            && v.present_price > 0.0
            && v.kms_driven >= 0
            && self.selling_price.is_finite()
    }
}
