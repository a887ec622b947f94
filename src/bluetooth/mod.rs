pub mod activity;
pub mod decoder;
pub mod device;
#[cfg(feature = "bluetooth")]
pub mod scanner;

use uuid::Uuid;

// ATC firmware protocol constants
pub const ENVIRONMENTAL_SENSING_UUID: Uuid =
    Uuid::from_u128(0x0000181a_0000_1000_8000_00805f9b34fb); // Service data UUID 0x181A
pub const DOMAIN: &str = "atc_mithermometer";
pub const DEFAULT_NAME: &str = "ATC MiThermometer";
pub const MANUFACTURER: &str = "Xiaomi";
pub const MODEL: &str = "LYWSD03MMC (ATC firmware)";

pub use decoder::{decode, decode_values, EXPECTED_PAYLOAD_LENGTH};
pub use device::{is_supported, reconcile, supported_devices, title_for};
