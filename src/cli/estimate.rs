//! Presentation of a raw prediction: price band, confidence wording and
//! vehicle condition hints

use serde::{Deserialize, Serialize};

/// Confidence at or above which the narrow band is used
pub const HIGH_CONFIDENCE: f64 = 0.8;
pub const NARROW_MARGIN: f64 = 0.10;
pub const WIDE_MARGIN: f64 = 0.15;

/// Assumed yearly loss of value
pub const ANNUAL_DEPRECIATION: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MileageCategory {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl MileageCategory {
    pub fn from_kms(kms_driven: i64) -> Self {
        match kms_driven {
            k if k < 30_000 => MileageCategory::Low,
            k if k < 80_000 => MileageCategory::Medium,
            k if k < 150_000 => MileageCategory::High,
            _ => MileageCategory::VeryHigh,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            MileageCategory::Low => "Low - excellent condition",
            MileageCategory::Medium => "Medium - good condition",
            MileageCategory::High => "High - acceptable condition",
            MileageCategory::VeryHigh => "Very high - heavier wear",
        }
    }
}

/// Rough value retained after `age` years, between 20% and 100%
pub fn depreciation_factor(age: i32) -> f64 {
    (1.0 - ANNUAL_DEPRECIATION * age as f64).clamp(0.2, 1.0)
}

pub fn confidence_message(confidence: f64) -> &'static str {
    if confidence >= 0.9 {
        "Very reliable estimate based on similar vehicles"
    } else if confidence >= 0.8 {
        "Reliable estimate with good precision"
    } else if confidence >= 0.7 {
        "Moderately reliable estimate"
    } else {
        "Approximate estimate, market prices may vary"
    }
}

/// A predicted price with the band shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub estimated_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Held-out R² as a percentage
    pub confidence_pct: f64,
    pub message: String,
}

impl PriceEstimate {
    pub fn from_prediction(price: f64, confidence: f64) -> Self {
        let margin = if confidence >= HIGH_CONFIDENCE {
            NARROW_MARGIN
        } else {
            WIDE_MARGIN
        };
        Self {
            estimated_price: round2(price),
            min_price: round2(price * (1.0 - margin)),
            max_price: round2(price * (1.0 + margin)),
            confidence_pct: round2(confidence * 100.0),
            message: confidence_message(confidence).to_string(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
