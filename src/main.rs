use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::time::{sleep, Duration};

use atc_mithermometer::bluetooth::reconcile;
use atc_mithermometer::bluetooth::scanner::scan_for_discoveries;
use atc_mithermometer::config::MonitorConfig;
use atc_mithermometer::registry::{LiveRegistry, UpdateOutcome};
use atc_mithermometer::sensor::to_metric_entries;
use atc_mithermometer::utils::{duration_to_seconds, format_datetime};

async fn main_loop(config: MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting ATC thermometer monitor");

    let mut registry = LiveRegistry::new(config.stale_after_secs);

    loop {
        let cycle_start = OffsetDateTime::now_utc();

        let discoveries = match scan_for_discoveries(&config).await {
            Ok(discoveries) => discoveries,
            Err(e) => {
                error!("Scan failed: {}", e);
                sleep(Duration::from_secs(config.poll_interval_secs)).await;
                continue;
            }
        };

        let mut fresh = 0;
        for discovery in &discoveries {
            let Some(update) = reconcile(discovery) else {
                continue;
            };
            fresh += 1;

            let label = config
                .sensor_name(&update.address)
                .unwrap_or(&update.name)
                .to_string();
            for entry in to_metric_entries(Some(&update)) {
                info!(
                    "{} ({}): {} = {} {}",
                    label, entry.key.device_id, entry.key.metric, entry.value, entry.description.unit
                );
            }

            let address = update.address.clone();
            match registry.apply(update, OffsetDateTime::now_utc()) {
                UpdateOutcome::NewDevice => info!("New sensor {} ({})", label, address),
                UpdateOutcome::Recovered => info!("Sensor {} ({}) is available again", label, address),
                UpdateOutcome::Refreshed => {}
            }
        }

        let now = OffsetDateTime::now_utc();
        for address in registry.mark_stale(now) {
            let last_seen = registry
                .last_seen(&address)
                .map(|t| format_datetime(&t))
                .unwrap_or_else(|| "never".to_string());
            warn!("Sensor {} unavailable, last seen {}", address, last_seen);
        }

        if registry.is_empty() {
            warn!("No ATC sensors seen yet");
        } else {
            info!(
                "Scan at {} complete: {} fresh readings, {} sensors tracked",
                format_datetime(&now),
                fresh,
                registry.len()
            );
        }

        // Wait out the rest of the poll interval
        let elapsed = duration_to_seconds(OffsetDateTime::now_utc() - cycle_start);
        let wait_time = config.poll_interval_secs.saturating_sub(elapsed);
        if wait_time > 0 {
            sleep(Duration::from_secs(wait_time)).await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let config = match MonitorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if config.sensors.is_empty() {
        info!("No ATC_SENSORS configured, reporting every ATC sensor in range");
    } else {
        for (mac, name) in &config.sensors {
            info!("Monitoring {} -> {}", mac, name);
        }
    }

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        let _ = tx.send(());
    });

    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
