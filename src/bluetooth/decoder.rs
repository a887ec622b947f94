/// ATC firmware service data decoding
use crate::error::DecodeError;
use crate::models::Reading;
use crate::utils::round_to;

/// Bytes of the ATC frame that carry data; anything after them is ignored
pub const EXPECTED_PAYLOAD_LENGTH: usize = 12;

/// Element of an integer payload sequence that can be narrowed to a byte
///
/// Only the low 8 bits of each element are kept.
pub trait PayloadByte: Copy {
    fn low_byte(self) -> u8;
}

macro_rules! impl_payload_byte {
    ($($ty:ty),*) => {
        $(
            impl PayloadByte for $ty {
                #[inline]
                fn low_byte(self) -> u8 {
                    self as u8
                }
            }
        )*
    };
}

impl_payload_byte!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Normalize an integer sequence into raw payload bytes
pub fn payload_bytes<I>(values: I) -> Vec<u8>
where
    I: IntoIterator,
    I::Item: PayloadByte,
{
    values.into_iter().map(PayloadByte::low_byte).collect()
}

/// Decode ATC custom firmware service data (UUID 0x181A)
///
/// The first 12 bytes are big-endian:
/// - Bytes 0-5: Device MAC, reversed (ignored here, we get it from BLE)
/// - Bytes 6-7: Temperature (signed 16-bit, 0.1°C resolution)
/// - Byte 8: Humidity (unsigned 8-bit, percent)
/// - Byte 9: Battery level (unsigned 8-bit, percent)
/// - Bytes 10-11: Battery voltage (unsigned 16-bit, millivolts)
///
/// Field values are not range checked. Temperature is rounded to one decimal
/// and voltage to three, halves away from zero.
///
/// # Returns
/// The reading, or `DecodeError::PayloadTooShort` for fewer than 12 bytes
pub fn decode(payload: &[u8]) -> Result<Reading, DecodeError> {
    let Some(frame) = payload.get(..EXPECTED_PAYLOAD_LENGTH) else {
        return Err(DecodeError::PayloadTooShort {
            expected: EXPECTED_PAYLOAD_LENGTH,
            actual: payload.len(),
        });
    };

    let temperature_raw = i16::from_be_bytes([frame[6], frame[7]]);
    let humidity = frame[8];
    let battery = frame[9];
    let voltage_raw = u16::from_be_bytes([frame[10], frame[11]]);

    Ok(Reading {
        temperature: round_to(f64::from(temperature_raw) / 10.0, 1),
        humidity,
        battery,
        voltage: round_to(f64::from(voltage_raw) / 1000.0, 3),
    })
}

/// Decode a payload given as any integer sequence
///
/// Each element is reduced to its low 8 bits first, so the result equals
/// `decode` over the resulting bytes.
pub fn decode_values<I>(values: I) -> Result<Reading, DecodeError>
where
    I: IntoIterator,
    I::Item: PayloadByte,
{
    decode(&payload_bytes(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_1: [u8; 12] = [
        0xA4, 0xC1, 0x38, 0x8F, 0x9A, 0x2F, 0x00, 0xD2, 0x38, 0x5A, 0x0C, 0x30,
    ];

    fn payload_with(temperature: i16, voltage: u16) -> [u8; 12] {
        let mut payload = VECTOR_1;
        payload[6..8].copy_from_slice(&temperature.to_be_bytes());
        payload[10..12].copy_from_slice(&voltage.to_be_bytes());
        payload
    }

    #[test]
    fn test_decode_reference_payload() {
        let reading = decode(&VECTOR_1).unwrap();
        assert_eq!(reading.temperature, 21.0);
        assert_eq!(reading.humidity, 56);
        assert_eq!(reading.battery, 90);
        assert_eq!(reading.voltage, 3.12);
    }

    #[test]
    fn test_decode_negative_temperature() {
        let mut payload = VECTOR_1;
        payload[6] = 0xFF;
        payload[7] = 0x6A;
        assert_eq!(decode(&payload).unwrap().temperature, -15.0);
    }

    #[test]
    fn test_decode_short_payloads_fail() {
        for len in 0..EXPECTED_PAYLOAD_LENGTH {
            assert_eq!(
                decode(&VECTOR_1[..len]),
                Err(DecodeError::PayloadTooShort {
                    expected: EXPECTED_PAYLOAD_LENGTH,
                    actual: len,
                })
            );
        }
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let expected = decode(&VECTOR_1).unwrap();
        let extras: [&[u8]; 3] = [&[0x00], &[0xFF, 0x17], &[0x12; 20]];
        for extra in extras {
            let mut payload = VECTOR_1.to_vec();
            payload.extend_from_slice(extra);
            assert_eq!(decode(&payload).unwrap(), expected);
        }
    }

    #[test]
    fn test_decode_is_repeatable() {
        let first = decode(&VECTOR_1).unwrap();
        let second = decode(&VECTOR_1).unwrap();
        assert_eq!(first.temperature.to_bits(), second.temperature.to_bits());
        assert_eq!(first.voltage.to_bits(), second.voltage.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_scaling_matches_rounded_division() {
        let temperatures = [i16::MIN, -401, -150, -1, 0, 1, 5, 210, 999, i16::MAX];
        let voltages = [0u16, 1, 999, 2_950, 3_120, 3_333, u16::MAX];
        for &t in &temperatures {
            for &v in &voltages {
                let reading = decode(&payload_with(t, v)).unwrap();
                assert_eq!(reading.temperature, round_to(f64::from(t) / 10.0, 1));
                assert_eq!(reading.voltage, round_to(f64::from(v) / 1000.0, 3));
            }
        }
        let reading = decode(&payload_with(-401, 2_950)).unwrap();
        assert_eq!(reading.temperature, -40.1);
        assert_eq!(reading.voltage, 2.95);
    }

    #[test]
    fn test_decode_does_not_clamp_fields() {
        let mut payload = VECTOR_1;
        payload[8] = 0xFF;
        payload[9] = 0xC8;
        let reading = decode(&payload).unwrap();
        assert_eq!(reading.humidity, 255);
        assert_eq!(reading.battery, 200);
    }

    #[test]
    fn test_decode_values_masks_to_low_byte() {
        let wide: Vec<i32> = VECTOR_1
            .iter()
            .enumerate()
            .map(|(i, &b)| i32::from(b) + if i % 2 == 0 { 0x100 } else { -0x200 })
            .collect();
        assert_eq!(decode_values(wide).unwrap(), decode(&VECTOR_1).unwrap());

        let plain: Vec<u16> = VECTOR_1.iter().map(|&b| u16::from(b)).collect();
        assert_eq!(decode_values(plain).unwrap(), decode(&VECTOR_1).unwrap());
    }

    #[test]
    fn test_decode_values_short_sequence_fails() {
        let err = decode_values([1i64; 11]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::PayloadTooShort {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_payload_bytes_negative_values() {
        assert_eq!(payload_bytes([-1i8, -150i16 as i8]), vec![0xFF, 0x6A]);
        assert_eq!(payload_bytes([-1i32, 256, 511]), vec![0xFF, 0x00, 0xFF]);
    }
}
