// Packed hex payload decoder
//
// A payload is a run of 4-hex-digit fields, each a big-endian u16, in the
// order given by the device type's layout. Each raw value is divided by the
// field's divisor. Characters past the last field are ignored.
use std::collections::BTreeMap;
use thiserror::Error;

use super::device::{DeviceCode, DeviceType, HEX_DIGITS_PER_FIELD};
use super::reading::DecodedSample;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("unknown device code: {0:?}")]
    UnknownDeviceCode(String),

    #[error("payload too short: expected at least {expected} hex digits, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("invalid hex in field at offset {offset}")]
    InvalidHex { offset: usize },
}

/// Decodes `hex` using the layout selected by `device_code`'s prefix.
///
/// Returns `None` for an unknown prefix or a malformed payload.
pub fn decode(hex: &str, device_code: &str) -> Option<DecodedSample> {
    match DeviceCode::parse(device_code) {
        Ok(code) => decode_as(hex, code.device_type),
        Err(e) => {
            tracing::warn!("Cannot decode payload for {}: {}", device_code, e);
            None
        }
    }
}

/// Decodes `hex` with an already resolved device type.
pub fn decode_as(hex: &str, device_type: DeviceType) -> Option<DecodedSample> {
    match try_decode_as(hex, device_type) {
        Ok(sample) => {
            tracing::debug!("Decoded {} payload {}: {:?}", device_type, hex, sample);
            Some(sample)
        }
        Err(e) => {
            tracing::warn!("Malformed {} payload {:?}: {}", device_type, hex, e);
            None
        }
    }
}

pub fn try_decode_as(hex: &str, device_type: DeviceType) -> Result<DecodedSample, DecodeError> {
    if hex.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = hex.as_bytes();
    let expected = device_type.payload_len();
    if bytes.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }

    let mut values = BTreeMap::new();
    for (index, spec) in device_type.layout().iter().enumerate() {
        let offset = index * HEX_DIGITS_PER_FIELD;
        let raw = read_u16_be(&bytes[offset..offset + HEX_DIGITS_PER_FIELD])
            .ok_or(DecodeError::InvalidHex { offset })?;
        values.insert(spec.metric, f64::from(raw) / spec.divisor);
    }

    Ok(DecodedSample::new(device_type, values))
}

fn read_u16_be(field: &[u8]) -> Option<u16> {
    let mut buf = [0u8; 2];
    hex::decode_to_slice(field, &mut buf).ok()?;
    Some(u16::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::Metric;
    use proptest::prelude::*;

    #[test]
    fn test_decode_chili_payload() {
        let sample = decode("0290029400C800FA", "CZ1").unwrap();
        assert_eq!(sample.len(), 4);
        assert_eq!(sample.get(Metric::Ph), Some(6.56));
        assert_eq!(sample.get(Metric::Moisture), Some(66.0));
        assert_eq!(sample.get(Metric::Ec), Some(2.0));
        assert_eq!(sample.get(Metric::Temperature), Some(25.0));
    }

    #[test]
    fn test_decode_nutrient_payload() {
        for code in ["MZ2", "SZ1"] {
            let sample = decode("028A00E600FF", code).unwrap();
            let metrics: Vec<Metric> = sample.metrics().collect();
            assert_eq!(metrics, vec![Metric::Ph, Metric::Ec, Metric::Temperature]);
            assert_eq!(sample.get(Metric::Ph), Some(6.5));
            assert_eq!(sample.get(Metric::Ec), Some(2.3));
            assert_eq!(sample.get(Metric::Temperature), Some(25.5));
        }
    }

    #[test]
    fn test_decode_climate_payload() {
        let sample = decode("00C801B8ffff", "GZ1").unwrap();
        assert_eq!(sample.get(Metric::Temperature), Some(20.0));
        assert_eq!(sample.get(Metric::Humidity), Some(44.0));
        assert_eq!(sample.get(Metric::Light), Some(65535.0));
        assert_eq!(sample.get(Metric::Ph), None);
    }

    #[test]
    fn test_trailing_characters_ignored() {
        let sample = decode("0290029400C800FAzz", "CZ1").unwrap();
        assert_eq!(sample.get(Metric::Temperature), Some(25.0));
    }

    #[test]
    fn test_rejects_short_payload() {
        assert_eq!(decode("005A", "CZ1"), None);
        assert_eq!(
            try_decode_as("005A", DeviceType::Cz),
            Err(DecodeError::TooShort {
                expected: 16,
                actual: 4
            })
        );
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        assert_eq!(try_decode_as("", DeviceType::Gz), Err(DecodeError::Empty));
        assert_eq!(
            try_decode_as("00C8+1B80001", DeviceType::Gz),
            Err(DecodeError::InvalidHex { offset: 4 })
        );
        assert_eq!(decode("00C8 1B80001", "GZ1"), None);
        // Non-ASCII must not panic on slicing
        assert_eq!(decode("00C8é1B80001", "GZ1"), None);
        assert_eq!(decode("0290029400C800FA", "XZ1"), None);
    }

    fn hex_payload(min_len: usize) -> impl Strategy<Value = String> {
        proptest::string::string_regex(&format!("[0-9a-fA-F]{{{},24}}", min_len)).unwrap()
    }

    proptest! {
        #[test]
        fn prop_chili_decodes_every_field(hex in hex_payload(16)) {
            let sample = decode(&hex, "CZ7").unwrap();
            prop_assert_eq!(sample.len(), 4);

            let field = |i: usize| f64::from(u16::from_str_radix(&hex[i * 4..i * 4 + 4], 16).unwrap());
            prop_assert_eq!(sample.get(Metric::Ph), Some(field(0) / 100.0));
            prop_assert_eq!(sample.get(Metric::Moisture), Some(field(1) / 10.0));
            prop_assert_eq!(sample.get(Metric::Ec), Some(field(2) / 100.0));
            prop_assert_eq!(sample.get(Metric::Temperature), Some(field(3) / 10.0));
        }

        #[test]
        fn prop_three_field_devices(hex in hex_payload(12)) {
            for code in ["MZ1", "SZ1"] {
                let sample = decode(&hex, code).unwrap();
                let metrics: Vec<Metric> = sample.metrics().collect();
                prop_assert_eq!(metrics, vec![Metric::Ph, Metric::Ec, Metric::Temperature]);
            }
            let sample = decode(&hex, "GZ1").unwrap();
            let metrics: Vec<Metric> = sample.metrics().collect();
            prop_assert_eq!(metrics, vec![Metric::Temperature, Metric::Humidity, Metric::Light]);
        }

        #[test]
        fn prop_unknown_prefix_never_decodes(hex in "[0-9a-fA-F]{0,24}", prefix in "[A-Z]{2}") {
            prop_assume!(DeviceType::from_prefix(&prefix).is_none());
            prop_assert_eq!(decode(&hex, &format!("{}1", prefix)), None);
        }

        #[test]
        fn prop_non_hex_field_never_decodes(hex in hex_payload(16), pos in 0usize..16, bad in "[g-zG-Z+ ]") {
            let mut corrupted = hex.clone();
            corrupted.replace_range(pos..pos + 1, &bad);
            prop_assert_eq!(decode(&corrupted, "CZ1"), None);
        }

        #[test]
        fn prop_decode_is_deterministic(hex in hex_payload(0), code in "(CZ|MZ|SZ|GZ)[0-9]") {
            prop_assert_eq!(decode(&hex, &code), decode(&hex, &code));
        }
    }
}
