/// In-memory live data for monitored sensors
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};

use crate::models::DeviceUpdate;

#[derive(Debug, Clone)]
struct TrackedDevice {
    update: DeviceUpdate,
    last_seen: OffsetDateTime,
    available: bool,
}

/// Latest update per device address, with availability tracking
///
/// Each update replaces the previous one for its address. A device becomes
/// unavailable once no update has arrived within the stale period.
#[derive(Debug, Clone)]
pub struct LiveRegistry {
    devices: HashMap<String, TrackedDevice>,
    stale_after: Duration,
}

/// Result of recording an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    NewDevice,
    Recovered,
    Refreshed,
}

impl LiveRegistry {
    pub fn new(stale_after_secs: u64) -> Self {
        LiveRegistry {
            devices: HashMap::new(),
            stale_after: Duration::seconds(i64::try_from(stale_after_secs).unwrap_or(i64::MAX)),
        }
    }

    pub fn apply(&mut self, update: DeviceUpdate, now: OffsetDateTime) -> UpdateOutcome {
        let address = update.address.clone();
        let tracked = TrackedDevice {
            update,
            last_seen: now,
            available: true,
        };

        match self.devices.insert(address, tracked) {
            None => UpdateOutcome::NewDevice,
            Some(previous) if !previous.available => UpdateOutcome::Recovered,
            Some(_) => UpdateOutcome::Refreshed,
        }
    }

    pub fn latest(&self, address: &str) -> Option<&DeviceUpdate> {
        self.devices.get(address).map(|d| &d.update)
    }

    pub fn last_seen(&self, address: &str) -> Option<OffsetDateTime> {
        self.devices.get(address).map(|d| d.last_seen)
    }

    pub fn is_available(&self, address: &str) -> bool {
        self.devices.get(address).is_some_and(|d| d.available)
    }

    /// Flag quiet devices as unavailable and return the newly flagged addresses
    pub fn mark_stale(&mut self, now: OffsetDateTime) -> Vec<String> {
        let stale_after = self.stale_after;
        let mut stale: Vec<String> = self
            .devices
            .iter_mut()
            .filter(|(_, d)| d.available && now - d.last_seen > stale_after)
            .map(|(address, d)| {
                d.available = false;
                address.clone()
            })
            .collect();
        stale.sort();
        stale
    }

    pub fn updates(&self) -> impl Iterator<Item = &DeviceUpdate> {
        self.devices.values().map(|d| &d.update)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
