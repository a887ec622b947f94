//! Decoding of ATC custom firmware thermometer advertisements.
//!
//! Sensors running the ATC firmware (e.g. Xiaomi LYWSD03MMC) broadcast their
//! readings unencrypted as Environmental Sensing (0x181A) service data. This
//! crate decodes that payload, turns a discovery record into a
//! [`DeviceUpdate`], and expands an update into four independently keyed
//! metric entries (temperature, humidity, battery, voltage).
//!
//! ```
//! use atc_mithermometer::bluetooth::{reconcile, ENVIRONMENTAL_SENSING_UUID};
//! use atc_mithermometer::models::Discovery;
//! use atc_mithermometer::sensor::to_metric_entries;
//!
//! let payload: [u8; 12] = [0xA4, 0xC1, 0x38, 0x8F, 0x9A, 0x2F, 0x00, 0xD2, 0x38, 0x5A, 0x0C, 0x30];
//! let discovery = Discovery::new("a4:c1:38:8f:9a:2f")
//!     .with_service_data(ENVIRONMENTAL_SENSING_UUID, payload);
//!
//! let update = reconcile(&discovery);
//! assert_eq!(update.as_ref().map(|u| u.reading.temperature), Some(21.0));
//! assert_eq!(to_metric_entries(update.as_ref()).len(), 4);
//! ```
//!
//! The BlueZ scanner in `bluetooth::scanner` is only built with the
//! `bluetooth` feature.

pub mod bluetooth;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod sensor;
pub mod utils;

pub use error::{ConfigError, DecodeError};
pub use models::{DeviceUpdate, Discovery, MetricKind, MetricValue, Reading, ServiceInfo};
