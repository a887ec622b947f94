use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// A single decoded ATC advertisement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Degrees Celsius, one decimal.
    pub temperature: f64,
    /// Relative humidity in percent, as sent by the sensor.
    pub humidity: u8,
    /// Battery level in percent, as sent by the sensor.
    pub battery: u8,
    /// Battery voltage in volts, three decimals.
    pub voltage: f64,
}

/// Reconciled result of one discovery event for a supported sensor.
///
/// A new update replaces the previous one for the same address; updates are
/// never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceUpdate {
    pub address: String,
    pub name: String,
    pub reading: Reading,
    pub rssi: Option<i16>,
    /// Raw service data the reading was decoded from, kept for diagnostics.
    pub payload: Vec<u8>,
}

/// What the core needs to know about an observed advertisement.
///
/// Implemented by [`Discovery`] and by anything else a host discovery layer
/// hands over.
pub trait ServiceInfo {
    fn address(&self) -> &str;
    fn name(&self) -> Option<&str>;
    fn rssi(&self) -> Option<i16>;
    fn service_data(&self, uuid: &Uuid) -> Option<&[u8]>;
}

/// Owned discovery record, as built by the scanner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub address: String,
    pub name: Option<String>,
    pub rssi: Option<i16>,
    pub service_data: HashMap<Uuid, Vec<u8>>,
}

impl Discovery {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn with_service_data(mut self, uuid: Uuid, data: impl Into<Vec<u8>>) -> Self {
        self.service_data.insert(uuid, data.into());
        self
    }
}

impl ServiceInfo for Discovery {
    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rssi(&self) -> Option<i16> {
        self.rssi
    }

    fn service_data(&self, uuid: &Uuid) -> Option<&[u8]> {
        self.service_data.get(uuid).map(Vec::as_slice)
    }
}

/// The four quantities carried by every reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Temperature,
    Humidity,
    Battery,
    Voltage,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Temperature,
        MetricKind::Humidity,
        MetricKind::Battery,
        MetricKind::Voltage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Temperature => "temperature",
            MetricKind::Humidity => "humidity",
            MetricKind::Battery => "battery",
            MetricKind::Voltage => "voltage",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar value of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Decimal(f64),
    Integer(u8),
}

impl MetricValue {
    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Decimal(v) => v,
            MetricValue::Integer(v) => f64::from(v),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Decimal(v) => write!(f, "{}", v),
            MetricValue::Integer(v) => write!(f, "{}", v),
        }
    }
}
