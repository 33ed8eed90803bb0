//! Greenhouse sensor telemetry.
//!
//! Decodes the packed hex payloads of the greenhouse field devices and
//! shapes them into zone snapshots and chart series. The core entry points
//! are [`domain::decoder::decode`], [`domain::aggregator::build_snapshot`]
//! and [`domain::aggregator::build_series`].
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
