/// Mapping of device updates into per-device, per-metric entries
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::bluetooth::{DEFAULT_NAME, DOMAIN, MANUFACTURER, MODEL};
use crate::models::{DeviceUpdate, MetricKind, MetricValue, Reading};

/// Static presentation metadata of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescription {
    pub kind: MetricKind,
    pub unit: &'static str,
    pub device_class: &'static str,
    pub state_class: &'static str,
}

const MEASUREMENT: &str = "measurement";

static TEMPERATURE: MetricDescription = MetricDescription {
    kind: MetricKind::Temperature,
    unit: "°C",
    device_class: "temperature",
    state_class: MEASUREMENT,
};

static HUMIDITY: MetricDescription = MetricDescription {
    kind: MetricKind::Humidity,
    unit: "%",
    device_class: "humidity",
    state_class: MEASUREMENT,
};

static BATTERY: MetricDescription = MetricDescription {
    kind: MetricKind::Battery,
    unit: "%",
    device_class: "battery",
    state_class: MEASUREMENT,
};

static VOLTAGE: MetricDescription = MetricDescription {
    kind: MetricKind::Voltage,
    unit: "V",
    device_class: "voltage",
    state_class: MEASUREMENT,
};

/// One description per metric, in `MetricKind::ALL` order
pub static METRIC_DESCRIPTIONS: [&MetricDescription; 4] =
    [&TEMPERATURE, &HUMIDITY, &BATTERY, &VOLTAGE];

pub fn description(kind: MetricKind) -> &'static MetricDescription {
    match kind {
        MetricKind::Temperature => &TEMPERATURE,
        MetricKind::Humidity => &HUMIDITY,
        MetricKind::Battery => &BATTERY,
        MetricKind::Voltage => &VOLTAGE,
    }
}

/// Identity of a metric stream: (metric, device address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    pub metric: MetricKind,
    pub device_id: String,
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.device_id, self.metric)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub key: MetricKey,
    pub value: MetricValue,
    pub description: &'static MetricDescription,
}

fn metric_value(reading: &Reading, kind: MetricKind) -> MetricValue {
    match kind {
        MetricKind::Temperature => MetricValue::Decimal(reading.temperature),
        MetricKind::Humidity => MetricValue::Integer(reading.humidity),
        MetricKind::Battery => MetricValue::Integer(reading.battery),
        MetricKind::Voltage => MetricValue::Decimal(reading.voltage),
    }
}

/// Expand an update into one entry per metric
///
/// An absent update yields no entries.
pub fn to_metric_entries(update: Option<&DeviceUpdate>) -> Vec<MetricEntry> {
    let Some(update) = update else {
        return Vec::new();
    };

    MetricKind::ALL
        .iter()
        .map(|&kind| MetricEntry {
            key: MetricKey {
                metric: kind,
                device_id: update.address.clone(),
            },
            value: metric_value(&update.reading, kind),
            description: description(kind),
        })
        .collect()
}

/// Registry description of the physical sensor behind an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub connections: BTreeSet<(String, String)>,
    pub identifiers: BTreeSet<(String, String)>,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub name: String,
}

pub fn device_info(update: &DeviceUpdate) -> DeviceInfo {
    let name = if update.name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        update.name.clone()
    };

    DeviceInfo {
        connections: BTreeSet::from([("bluetooth".to_string(), update.address.clone())]),
        identifiers: BTreeSet::from([(DOMAIN.to_string(), update.address.clone())]),
        manufacturer: MANUFACTURER,
        model: MODEL,
        name,
    }
}

/// Everything a host registry needs from one update
#[derive(Debug, Clone, PartialEq)]
pub struct SensorUpdate {
    pub devices: HashMap<String, DeviceInfo>,
    pub entries: Vec<MetricEntry>,
}

pub fn to_sensor_update(update: Option<&DeviceUpdate>) -> Option<SensorUpdate> {
    let device = update?;
    let devices = HashMap::from([(device.address.clone(), device_info(device))]);

    Some(SensorUpdate {
        devices,
        entries: to_metric_entries(Some(device)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn update_for(address: &str, temperature: f64) -> DeviceUpdate {
        DeviceUpdate {
            address: address.to_string(),
            name: "Bathroom".to_string(),
            reading: Reading {
                temperature,
                humidity: 56,
                battery: 90,
                voltage: 3.12,
            },
            rssi: Some(-80),
            payload: vec![0; 12],
        }
    }

    #[test]
    fn test_entries_cover_all_metrics_for_one_device() {
        let update = update_for("a4:c1:38:8f:9a:2f", 21.0);
        let entries = to_metric_entries(Some(&update));

        assert_eq!(entries.len(), 4);
        let kinds: BTreeSet<MetricKind> = entries.iter().map(|e| e.key.metric).collect();
        assert_eq!(kinds, BTreeSet::from(MetricKind::ALL));
        assert!(entries
            .iter()
            .all(|e| e.key.device_id == "a4:c1:38:8f:9a:2f"));
    }

    #[test]
    fn test_entry_values_and_metadata() {
        let update = update_for("a4:c1:38:8f:9a:2f", 21.0);
        let entries = to_metric_entries(Some(&update));
        let by_kind: HashMap<MetricKind, &MetricEntry> =
            entries.iter().map(|e| (e.key.metric, e)).collect();

        let temperature = by_kind[&MetricKind::Temperature];
        assert_eq!(temperature.value, MetricValue::Decimal(21.0));
        assert_eq!(temperature.description.unit, "°C");
        assert_eq!(temperature.description.device_class, "temperature");

        let humidity = by_kind[&MetricKind::Humidity];
        assert_eq!(humidity.value, MetricValue::Integer(56));
        assert_eq!(humidity.description.unit, "%");

        let battery = by_kind[&MetricKind::Battery];
        assert_eq!(battery.value, MetricValue::Integer(90));
        assert_eq!(battery.description.device_class, "battery");

        let voltage = by_kind[&MetricKind::Voltage];
        assert_eq!(voltage.value, MetricValue::Decimal(3.12));
        assert_eq!(voltage.description.unit, "V");
        assert_eq!(voltage.description.state_class, "measurement");
    }

    #[test]
    fn test_absent_update_yields_nothing() {
        assert!(to_metric_entries(None).is_empty());
        assert!(to_sensor_update(None).is_none());
    }

    #[test]
    fn test_keys_stable_across_updates() {
        let first = to_metric_entries(Some(&update_for("a4:c1:38:8f:9a:2f", 21.0)));
        let second = to_metric_entries(Some(&update_for("a4:c1:38:8f:9a:2f", 22.5)));

        let first_keys: Vec<&MetricKey> = first.iter().map(|e| &e.key).collect();
        let second_keys: Vec<&MetricKey> = second.iter().map(|e| &e.key).collect();
        assert_eq!(first_keys, second_keys);
        assert_ne!(first[0].value, second[0].value);
    }

    #[test]
    fn test_keys_distinct_across_devices() {
        let mut keys = HashSet::new();
        for address in ["a4:c1:38:00:00:01", "a4:c1:38:00:00:02"] {
            for entry in to_metric_entries(Some(&update_for(address, 20.0))) {
                assert!(keys.insert(entry.key));
            }
        }
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_description_table_lookup() {
        for kind in MetricKind::ALL {
            assert_eq!(description(kind).kind, kind);
            assert_eq!(description(kind).device_class, kind.as_str());
        }
    }

    #[test]
    fn test_description_units_follow_kind() {
        let units: Vec<(MetricKind, &str)> = METRIC_DESCRIPTIONS
            .iter()
            .map(|d| (d.kind, description(d.kind).unit))
            .collect();
        assert_eq!(
            units,
            vec![
                (MetricKind::Temperature, "°C"),
                (MetricKind::Humidity, "%"),
                (MetricKind::Battery, "%"),
                (MetricKind::Voltage, "V"),
            ]
        );
        for (table_entry, kind) in METRIC_DESCRIPTIONS.iter().zip(MetricKind::ALL) {
            assert!(std::ptr::eq(*table_entry, description(kind)));
        }
    }

    #[test]
    fn test_metric_key_display() {
        let key = MetricKey {
            metric: MetricKind::Humidity,
            device_id: "a4:c1:38:00:00:01".to_string(),
        };
        assert_eq!(key.to_string(), "a4:c1:38:00:00:01_humidity");
    }

    #[test]
    fn test_sensor_update_includes_device_info() {
        let update = update_for("a4:c1:38:8f:9a:2f", 21.0);
        let sensor_update = to_sensor_update(Some(&update)).unwrap();

        assert_eq!(sensor_update.entries.len(), 4);
        let info = &sensor_update.devices["a4:c1:38:8f:9a:2f"];
        assert_eq!(info.name, "Bathroom");
        assert_eq!(info.manufacturer, MANUFACTURER);
        assert_eq!(info.model, MODEL);
        assert!(info
            .identifiers
            .contains(&(DOMAIN.to_string(), "a4:c1:38:8f:9a:2f".to_string())));
        assert!(info
            .connections
            .contains(&("bluetooth".to_string(), "a4:c1:38:8f:9a:2f".to_string())));
    }

    #[test]
    fn test_device_info_default_name() {
        let mut update = update_for("a4:c1:38:8f:9a:2f", 21.0);
        update.name.clear();
        assert_eq!(device_info(&update).name, DEFAULT_NAME);
    }
}
