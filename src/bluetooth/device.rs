/// Support detection and update reconciliation for discovered ATC sensors
use log::debug;
use std::collections::{BTreeMap, HashSet};

use crate::bluetooth::decoder::decode;
use crate::bluetooth::{DEFAULT_NAME, ENVIRONMENTAL_SENSING_UUID};
use crate::models::{DeviceUpdate, ServiceInfo};

/// Environmental Sensing service data of a discovery, if present and non-empty
fn atc_payload<S: ServiceInfo + ?Sized>(info: &S) -> Option<&[u8]> {
    info.service_data(&ENVIRONMENTAL_SENSING_UUID)
        .filter(|payload| !payload.is_empty())
}

/// Whether a discovery carries decodable ATC service data
///
/// Agrees with [`reconcile`]: true exactly when `reconcile` returns an update.
pub fn is_supported<S: ServiceInfo + ?Sized>(info: &S) -> bool {
    atc_payload(info).is_some_and(|payload| decode(payload).is_ok())
}

/// Display title: the advertised name, or the default name if missing or empty
pub fn title_for<S: ServiceInfo + ?Sized>(info: &S) -> String {
    match info.name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_NAME.to_string(),
    }
}

/// Turn a discovery into a device update
///
/// Missing service data and undecodable payloads both yield `None`; neither
/// is an error for the caller.
pub fn reconcile<S: ServiceInfo + ?Sized>(info: &S) -> Option<DeviceUpdate> {
    let Some(payload) = atc_payload(info) else {
        debug!("No ATC service data from {}", info.address());
        return None;
    };

    let reading = match decode(payload) {
        Ok(reading) => reading,
        Err(e) => {
            debug!("Skipping advertisement from {}: {}", info.address(), e);
            return None;
        }
    };

    Some(DeviceUpdate {
        address: info.address().to_string(),
        name: title_for(info),
        reading,
        rssi: info.rssi(),
        payload: payload.to_vec(),
    })
}

/// Supported devices that are not configured yet, as address -> title
///
/// The first discovery seen for an address wins.
pub fn supported_devices<'a, S, I>(
    discoveries: I,
    configured: &HashSet<String>,
) -> BTreeMap<String, String>
where
    S: ServiceInfo + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut devices = BTreeMap::new();

    for info in discoveries {
        let address = info.address();
        if configured.contains(address) || devices.contains_key(address) {
            continue;
        }
        if !is_supported(info) {
            continue;
        }
        devices.insert(address.to_string(), title_for(info));
    }

    devices
}
