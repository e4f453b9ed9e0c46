//! Data loading utilities

use crate::error::{PredictorError, Result};
use crate::preprocessing::record::{
    TrainingRecord, VehicleRecord, CAR_NAME, FUEL_TYPE, KMS_DRIVEN, OWNER, PRESENT_PRICE,
    REQUIRED_COLUMNS, SELLER_TYPE, SELLING_PRICE, TRANSMISSION, YEAR,
};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Reads labeled vehicle data from CSV
pub struct DataLoader {
    /// Rows used to infer column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 100,
        }
    }

    /// Set the number of rows scanned for type inference
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows.max(1);
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PredictorError::DataError(format!("{}: {}", path.display(), e)))?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| PredictorError::DataError(e.to_string()))
    }

    /// Load a CSV file and convert it to typed training rows
    pub fn load_training_records(&self, path: impl AsRef<Path>) -> Result<Vec<TrainingRecord>> {
        let start = Instant::now();
        let df = self.load_csv(path.as_ref())?;
        let records = records_from_frame(&df)?;
        info!(
            path = %path.as_ref().display(),
            rows = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded training data"
        );
        Ok(records)
    }
}

/// Convert a frame with the training header into typed rows.
///
/// Every required column must be present; `Car_Name` is optional and any
/// other column is ignored.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<TrainingRecord>> {
    let present: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !present.iter().any(|p| p == col))
        .collect();
    if !missing.is_empty() {
        return Err(PredictorError::FeatureNotFound(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let ignored = present
        .iter()
        .filter(|p| p.as_str() != CAR_NAME && !REQUIRED_COLUMNS.contains(&p.as_str()))
        .count();
    if ignored > 0 {
        debug!(ignored, "Ignoring extra CSV columns");
    }

    let years = int_column(df, YEAR)?;
    let present_prices = float_column(df, PRESENT_PRICE)?;
    let kms = int_column(df, KMS_DRIVEN)?;
    let fuel = string_column(df, FUEL_TYPE)?;
    let seller = string_column(df, SELLER_TYPE)?;
    let transmission = string_column(df, TRANSMISSION)?;
    let owners = int_column(df, OWNER)?;
    let targets = float_column(df, SELLING_PRICE)?;
    let names = if present.iter().any(|p| p == CAR_NAME) {
        Some(optional_string_column(df, CAR_NAME)?)
    } else {
        None
    };

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let year = i32::try_from(years[i]).map_err(|_| {
            PredictorError::DataError(format!("{} out of range at row {}: {}", YEAR, i, years[i]))
        })?;
        records.push(TrainingRecord {
            vehicle: VehicleRecord {
                year,
                present_price: present_prices[i],
                kms_driven: kms[i],
                fuel_type: fuel[i].clone(),
                seller_type: seller[i].clone(),
                transmission: transmission[i].clone(),
                owner: owners[i],
            },
            selling_price: targets[i],
            car_name: names.as_ref().and_then(|n| n[i].clone()),
        });
    }
    Ok(records)
}

fn missing_value(column: &str, row: usize) -> PredictorError {
    PredictorError::DataError(format!("missing or unparseable {} at row {}", column, row))
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.filter(|x| x.is_finite()).ok_or_else(|| missing_value(name, row)))
        .collect()
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| missing_value(name, row)))
        .collect()
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    optional_string_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| missing_value(name, row)))
        .collect()
}

fn optional_string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_training_records() {
        let file = write_csv(
            "Car_Name,Year,Selling_Price,Present_Price,Kms_Driven,Fuel_Type,Seller_Type,Transmission,Owner\n\
             ritz,2014,3.35,5.59,27000,Petrol,Dealer,Manual,0\n\
             sx4,2013,4.75,9.54,43000,Diesel,Dealer,Manual,0\n",
        );

        let records = DataLoader::new().load_training_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vehicle.year, 2014);
        assert_eq!(records[0].vehicle.kms_driven, 27000);
        assert_eq!(records[1].vehicle.fuel_type, "Diesel");
        assert_eq!(records[1].selling_price, 4.75);
        assert_eq!(records[0].car_name.as_deref(), Some("ritz"));
    }

    #[test]
    fn test_car_name_optional_and_extra_columns_ignored() {
        let file = write_csv(
            "Year,Present_Price,Kms_Driven,Fuel_Type,Seller_Type,Transmission,Owner,Selling_Price,Color\n\
             2015,6,15000,CNG,Individual,Automatic,1,4,red\n",
        );

        let records = DataLoader::new().load_training_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].car_name.is_none());
        assert_eq!(records[0].vehicle.present_price, 6.0);
        assert_eq!(records[0].vehicle.owner, 1);
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("Year,Present_Price,Selling_Price\n2014,5.0,3.0\n");

        let err = DataLoader::new().load_training_records(file.path()).unwrap_err();
        assert!(matches!(err, PredictorError::FeatureNotFound(_)));
        assert!(err.to_string().contains(KMS_DRIVEN));
        assert!(err.is_data_validation());
    }

    #[test]
    fn test_unparseable_value() {
        let file = write_csv(
            "Year,Present_Price,Kms_Driven,Fuel_Type,Seller_Type,Transmission,Owner,Selling_Price\n\
             2014,5.0,27000,Petrol,Dealer,Manual,0,3.0\n\
             2014,abc,27000,Petrol,Dealer,Manual,0,3.0\n",
        );

        let err = DataLoader::new().load_training_records(file.path()).unwrap_err();
        assert!(err.is_data_validation());
    }

    #[test]
    fn test_missing_file() {
        let result = DataLoader::new().load_csv("/nonexistent/cars.csv");
        assert!(matches!(result, Err(PredictorError::DataError(_))));
    }
}
