/// Which devices actually advertised during one discovery window
use std::collections::HashSet;

/// Something BlueZ reported while a discovery window was open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// Device object announced by the adapter
    Added(String),
    /// Advertisement data (RSSI or service data) changed on a device
    AdvertisementChanged(String),
}

/// Activity seen in one discovery window
///
/// BlueZ keeps device objects, and their last service data, around after a
/// sensor goes quiet. A device only counts as fresh if it was unknown before
/// the window opened, or its advertisement data changed while it was open.
#[derive(Debug, Clone, Default)]
pub struct ScanWindow {
    known_before: HashSet<String>,
    fresh: HashSet<String>,
}

impl ScanWindow {
    /// Start a window given the device addresses BlueZ already had cached
    pub fn new<I, A>(known_before: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        ScanWindow {
            known_before: known_before
                .into_iter()
                .map(|a| a.as_ref().to_lowercase())
                .collect(),
            fresh: HashSet::new(),
        }
    }

    pub fn record(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Added(address) => {
                let address = address.to_lowercase();
                if !self.known_before.contains(&address) {
                    self.fresh.insert(address);
                }
            }
            WindowEvent::AdvertisementChanged(address) => {
                self.fresh.insert(address.to_lowercase());
            }
        }
    }

    pub fn is_fresh(&self, address: &str) -> bool {
        self.fresh.contains(&address.to_lowercase())
    }

    pub fn fresh_count(&self) -> usize {
        self.fresh.len()
    }
}
