//! # EventHive Bootstrap Entry Point
//!
//! Provisions and seeds the EventHive store, then exits. A non-zero exit
//! status means the bootstrap failed; re-running is always safe.

use eventhive::{Bootstrapper, config::ConfigLoader, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;

    if let Err(err) = telemetry::init_tracing(&config) {
        eprintln!("Warning: telemetry disabled: {}", err);
    }

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(configuration = %redacted_json, "Effective configuration");
    }

    let mut bootstrapper = Bootstrapper::new(config);
    match bootstrapper.run().await {
        Ok(report) => {
            tracing::info!(
                order = %report.order.join(" -> "),
                tables_created = report.schema.created.len(),
                rows_inserted = report.seed.inserted(),
                rows_already_seeded = report.seed.already_seeded(),
                warnings = report.verification.warnings.len(),
                "EventHive store bootstrapped"
            );
            for probe in &report.verification.entities {
                println!("{}: {} rows", probe.entity, probe.row_count);
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(phase = err.phase(), error = %err, "Bootstrap failed");
            Err(err.into())
        }
    }
}
