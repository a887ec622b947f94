/// Bluetooth Low Energy scanning for ATC advertisements
use bluer::{AdapterEvent, DeviceEvent, DeviceProperty};
use futures_util::{Stream, StreamExt};
use log::{debug, error, warn};
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};

use crate::bluetooth::activity::{ScanWindow, WindowEvent};
use crate::bluetooth::ENVIRONMENTAL_SENSING_UUID;
use crate::config::MonitorConfig;
use crate::models::Discovery;

/// Log a BlueZ failure before it is propagated
fn log_failure<E: Display>(context: &'static str) -> impl FnOnce(E) -> E {
    move |e| {
        error!("{}: {}", context, e);
        e
    }
}

/// Build a discovery record from what BlueZ knows about a device
async fn discovery_for(device: &bluer::Device) -> bluer::Result<Discovery> {
    let address = device.address().to_string().to_lowercase();

    let mut discovery = Discovery::new(address);
    discovery.name = device.name().await?;
    discovery.rssi = device.rssi().await?;
    if let Some(service_data) = device.service_data().await? {
        discovery.service_data = service_data;
    }

    Ok(discovery)
}

/// Forward adapter and per-device advertisement activity until aborted
///
/// Per-device watchers live in a `JoinSet`, so aborting this task stops them too.
async fn watch_advertisements<S>(
    adapter: bluer::Adapter,
    events: S,
    tx: mpsc::UnboundedSender<WindowEvent>,
) where
    S: Stream<Item = AdapterEvent> + Send + 'static,
{
    let mut events = Box::pin(events);
    let mut watchers = JoinSet::new();

    while let Some(event) = events.next().await {
        debug!("Discovery event: {:?}", event);
        let AdapterEvent::DeviceAdded(addr) = event else {
            continue;
        };

        let address = addr.to_string();
        if tx.send(WindowEvent::Added(address.clone())).is_err() {
            break;
        }

        let Ok(device) = adapter.device(addr) else {
            continue;
        };
        let device_events = match device.events().await {
            Ok(device_events) => device_events,
            Err(e) => {
                debug!("Cannot watch {}: {}", address, e);
                continue;
            }
        };

        let tx = tx.clone();
        watchers.spawn(async move {
            let mut device_events = Box::pin(device_events);
            while let Some(DeviceEvent::PropertyChanged(property)) = device_events.next().await {
                if !matches!(
                    property,
                    DeviceProperty::Rssi(_) | DeviceProperty::ServiceData(_)
                ) {
                    continue;
                }
                if tx
                    .send(WindowEvent::AdvertisementChanged(address.clone()))
                    .is_err()
                {
                    break;
                }
            }
        });
    }
}

/// Scan for nearby devices advertising Environmental Sensing service data
///
/// Runs one discovery window of `config.scan_duration_secs` and returns a
/// discovery record for every device that advertised during the window,
/// carries service data for UUID 0x181A and passes the configured
/// allow-list. Devices only present in BlueZ's cache are skipped. Decoding
/// is left to the caller.
///
/// # Returns
/// Discovery records, or an error if the Bluetooth adapter cannot be used
pub async fn scan_for_discoveries(
    config: &MonitorConfig,
) -> Result<Vec<Discovery>, Box<dyn std::error::Error>> {
    let session = bluer::Session::new()
        .await
        .map_err(log_failure("Failed to create Bluetooth session"))?;
    let adapter = session
        .default_adapter()
        .await
        .map_err(log_failure("Failed to get default Bluetooth adapter"))?;
    adapter
        .set_powered(true)
        .await
        .map_err(log_failure("Failed to power on adapter"))?;

    // ATC sensors advertise every few seconds; keep duplicates so service data stays fresh
    let filter = bluer::DiscoveryFilter {
        transport: bluer::DiscoveryTransport::Le,
        duplicate_data: true,
        ..Default::default()
    };
    if let Err(e) = adapter.set_discovery_filter(filter).await {
        warn!("Failed to set discovery filter: {}", e);
    }

    let cached = adapter
        .device_addresses()
        .await
        .map_err(log_failure("Failed to get device addresses"))?;
    let mut window = ScanWindow::new(cached.iter().map(ToString::to_string));

    let events = adapter
        .discover_devices()
        .await
        .map_err(log_failure("Failed to start device discovery"))?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = tokio::spawn(watch_advertisements(adapter.clone(), events, tx));

    sleep(Duration::from_secs(config.scan_duration_secs)).await;
    watcher.abort();

    while let Ok(event) = rx.try_recv() {
        window.record(event);
    }
    debug!("{} devices advertised during the scan window", window.fresh_count());

    let addresses = adapter
        .device_addresses()
        .await
        .map_err(log_failure("Failed to get device addresses"))?;

    let mut discoveries = Vec::new();
    for addr in addresses {
        let Ok(device) = adapter.device(addr) else {
            continue;
        };

        let addr_str = device.address().to_string().to_lowercase();
        if !config.is_wanted(&addr_str) {
            continue;
        }
        if !window.is_fresh(&addr_str) {
            debug!("No advertisement from {} during this scan, skipping cached data", addr_str);
            continue;
        }

        match discovery_for(&device).await {
            Ok(discovery) if discovery.service_data.contains_key(&ENVIRONMENTAL_SENSING_UUID) => {
                discoveries.push(discovery);
            }
            Ok(_) => {
                debug!("No Environmental Sensing service data for {}", addr_str);
            }
            Err(e) => {
                debug!("Failed to read advertisement data for {}: {}", addr_str, e);
            }
        }
    }

    Ok(discoveries)
}
