// Shapes raw readings into zone snapshots and chart series
use super::decoder::decode_as;
use super::device::DeviceCode;
use super::range_policy::RangePolicy;
use super::reading::RawReading;
use super::telemetry::{ChartSeries, SeriesMap, TimeSeriesPoint};
use super::zone::ZoneSnapshot;

/// Decodes one reading into a snapshot using the default range policy.
pub fn build_snapshot(reading: &RawReading) -> ZoneSnapshot {
    build_snapshot_with(reading, &RangePolicy::default())
}

/// A reading that fails to decode yields an offline snapshot with zeroed
/// metrics. Out-of-range values are clamped and the zone stays online.
pub fn build_snapshot_with(reading: &RawReading, policy: &RangePolicy) -> ZoneSnapshot {
    let code = match DeviceCode::parse(&reading.device_code) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!("Reading with unusable device code: {}", e);
            return ZoneSnapshot::offline(&reading.device_code);
        }
    };

    match decode_as(&reading.encoded_data, code.device_type) {
        Some(sample) => {
            let metrics = policy.clamp(&sample);
            ZoneSnapshot::online(&code, metrics, reading.timestamp.clone())
        }
        None => ZoneSnapshot::offline(&reading.device_code),
    }
}

/// Builds one chart series per metric, in input order.
///
/// Readings that fail to decode are skipped. Values are not clamped.
pub fn build_series<'a, I>(readings: I) -> SeriesMap
where
    I: IntoIterator<Item = &'a RawReading>,
{
    let mut series = SeriesMap::new();
    let mut skipped = 0usize;

    for reading in readings {
        let sample = DeviceCode::parse(&reading.device_code)
            .ok()
            .and_then(|code| decode_as(&reading.encoded_data, code.device_type));

        let Some(sample) = sample else {
            skipped += 1;
            continue;
        };

        let time_ms = reading.time_ms();
        for (metric, value) in sample.iter() {
            series
                .entry(metric)
                .or_insert_with(|| ChartSeries::new(metric))
                .push(TimeSeriesPoint::new(
                    reading.timestamp.clone(),
                    time_ms,
                    Some(value),
                ));
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} undecodable readings while building series", skipped);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::{DeviceType, Metric};
    use crate::domain::plant::PlantType;
    use crate::domain::range_policy::ValidRange;
    use crate::domain::zone::ZoneStatus;
    use proptest::prelude::*;

    fn reading(hex: &str, timestamp: &str, code: &str) -> RawReading {
        RawReading::new(hex, timestamp, code)
    }

    #[test]
    fn test_snapshot_online() {
        let snapshot = build_snapshot(&reading("0290029400C800FA", "2025-03-01T10:00:00Z", "CZ1"));
        assert_eq!(snapshot.status, ZoneStatus::Online);
        assert_eq!(snapshot.zone_id, "1");
        assert_eq!(snapshot.plant_type, Some(PlantType::Cabai));
        assert_eq!(snapshot.last_updated.as_deref(), Some("2025-03-01T10:00:00Z"));

        let metrics = snapshot.metrics.unwrap();
        assert_eq!(metrics.get(Metric::Ph), Some(6.56));
        assert_eq!(metrics.get(Metric::Moisture), Some(66.0));
    }

    #[test]
    fn test_snapshot_clamps_but_stays_online() {
        // pH 20.00
        let snapshot = build_snapshot(&reading("07D000E600FF", "2025-03-01T10:00:00Z", "MZ3"));
        assert_eq!(snapshot.status, ZoneStatus::Online);
        let metrics = snapshot.metrics.unwrap();
        assert_eq!(metrics.get(Metric::Ph), Some(0.0));
        assert_eq!(metrics.get(Metric::Ec), Some(2.3));
    }

    #[test]
    fn test_snapshot_with_custom_policy() {
        let policy = RangePolicy {
            temperature: Some(ValidRange::new(0.0, 20.0)),
            ..RangePolicy::default()
        };
        let snapshot = build_snapshot_with(&reading("00FA01B80100", "t", "GZ1"), &policy);
        let metrics = snapshot.metrics.unwrap();
        assert_eq!(metrics.get(Metric::Temperature), Some(0.0));
        assert_eq!(metrics.get(Metric::Light), Some(256.0));
    }

    #[test]
    fn test_snapshot_offline_on_decode_failure() {
        let snapshot = build_snapshot(&reading("005A", "2025-03-01T10:00:00Z", "CZ2"));
        assert_eq!(snapshot.status, ZoneStatus::Offline);
        assert_eq!(snapshot.last_updated, None);
        let metrics = snapshot.metrics.unwrap();
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics.get(Metric::Ph), Some(0.0));

        let snapshot = build_snapshot(&reading("0290029400C800FA", "t", "QZ1"));
        assert_eq!(snapshot.status, ZoneStatus::Offline);
        assert_eq!(snapshot.plant_type, None);
        assert!(snapshot.metrics.is_none());
    }

    #[test]
    fn test_series_in_input_order() {
        let readings = vec![
            reading("028A00E600FA", "2025-03-01T10:00:00Z", "SZ1"),
            reading("028000DC0104", "2025-03-01T09:00:00Z", "SZ1"),
            reading("029400F000F0", "2025-03-01T11:00:00Z", "SZ1"),
        ];
        let series = build_series(&readings);

        assert_eq!(series.len(), 3);
        let temps: Vec<Option<f64>> = series[&Metric::Temperature].points.iter().map(|p| p.value).collect();
        assert_eq!(temps, vec![Some(25.0), Some(26.0), Some(24.0)]);

        let ph = &series[&Metric::Ph];
        assert_eq!(ph.points[1].timestamp, "2025-03-01T09:00:00Z");
        assert_eq!(ph.points[0].time_ms, Some(1_740_823_200_000));
    }

    #[test]
    fn test_series_skips_undecodable_readings() {
        let readings = vec![
            reading("0290029400C800FA", "2025-03-01T10:00:00Z", "CZ1"),
            reading("zzzz029400C800FA", "2025-03-01T10:05:00Z", "CZ1"),
            reading("005A", "2025-03-01T10:10:00Z", "CZ1"),
            reading("0290029400C800FA", "not a time", "CZ1"),
        ];
        let series = build_series(&readings);

        assert_eq!(series.len(), 4);
        for chart in series.values() {
            assert_eq!(chart.len(), 2);
        }
        assert_eq!(series[&Metric::Moisture].points[1].time_ms, None);
    }

    #[test]
    fn test_series_skips_null_payload_mid_batch() {
        let readings: Vec<RawReading> = serde_json::from_value(serde_json::json!([
            { "encoded_data": "0290029400C800FA", "timestamp": "2025-03-01T10:00:00Z", "zone_code": "CZ1" },
            { "encoded_data": null, "timestamp": "2025-03-01T10:05:00Z", "zone_code": "CZ1" },
            { "encoded_data": 42, "zone_code": "CZ1" },
            { "encoded_data": "0290029400C800FA", "timestamp": "2025-03-01T10:10:00Z", "zone_code": "CZ1" },
        ]))
        .unwrap();

        let series = build_series(&readings);
        assert_eq!(series[&Metric::Ph].len(), 2);
        assert_eq!(series[&Metric::Ph].points[1].timestamp, "2025-03-01T10:10:00Z");

        let snapshot = build_snapshot(&readings[1]);
        assert_eq!(snapshot.status, ZoneStatus::Offline);
    }

    #[test]
    fn test_series_values_are_not_clamped() {
        let series = build_series(&[reading("07D000E600FF", "t", "MZ1")]);
        assert_eq!(series[&Metric::Ph].points[0].value, Some(20.0));
    }

    #[test]
    fn test_empty_series() {
        assert!(build_series(&Vec::<RawReading>::new()).is_empty());
    }

    fn field_hex(value: u16) -> String {
        format!("{:04X}", value)
    }

    fn mixed_payload() -> impl Strategy<Value = (String, bool)> {
        prop_oneof![
            proptest::collection::vec(any::<u16>(), 4)
                .prop_map(|fields| (fields.into_iter().map(field_hex).collect(), true)),
            "[0-9A-F]{0,15}".prop_map(|hex| (hex, false)),
            "[G-Zg-z]{16}".prop_map(|hex| (hex, false)),
        ]
    }

    proptest! {
        #[test]
        fn prop_snapshot_ph_clamped_to_range(ph in any::<u16>(), rest in proptest::collection::vec(any::<u16>(), 3)) {
            let hex: String = std::iter::once(ph).chain(rest).map(field_hex).collect();
            let snapshot = build_snapshot(&reading(&hex, "t", "CZ1"));
            prop_assert_eq!(snapshot.status, ZoneStatus::Online);

            let value = f64::from(ph) / 100.0;
            let expected = if (0.0..=14.0).contains(&value) { value } else { 0.0 };
            prop_assert_eq!(snapshot.metrics.unwrap().get(Metric::Ph), Some(expected));
        }

        #[test]
        fn prop_series_length_counts_decodable(batch in proptest::collection::vec(mixed_payload(), 0..20)) {
            let readings: Vec<RawReading> = batch.iter().map(|(hex, _)| reading(hex, "t", "CZ1")).collect();
            let decodable = batch.iter().filter(|(_, ok)| *ok).count();

            let series = build_series(&readings);
            for metric in DeviceType::Cz.metrics() {
                prop_assert_eq!(series.get(&metric).map_or(0, ChartSeries::len), decodable);
            }
        }
    }
}
