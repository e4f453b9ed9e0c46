//! Car price predictor - Main Entry Point

use car_price_predictor::cli::{build_config, cmd_info, cmd_predict, cmd_status, cmd_train, Cli, Commands};
use car_price_predictor::predictor::PricePredictor;
use car_price_predictor::preprocessing::VehicleRecord;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_price_predictor=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let predictor = PricePredictor::new(build_config(&cli)?);

    match cli.command {
        Commands::Train { data, as_of } => cmd_train(&predictor, &data, as_of)?,
        Commands::Predict {
            year,
            present_price,
            kms_driven,
            fuel_type,
            seller_type,
            transmission,
            owner,
            as_of,
            json,
        } => {
            let record = VehicleRecord {
                year,
                present_price,
                kms_driven,
                fuel_type,
                seller_type,
                transmission,
                owner,
            };
            cmd_predict(&predictor, record, as_of, json)?;
        }
        Commands::Info => cmd_info(&predictor)?,
        Commands::Status => cmd_status(&predictor)?,
    }

    Ok(())
}
