// Domain layer - Device payloads, decoding and aggregation
pub mod aggregator;
pub mod dashboard;
pub mod decoder;
pub mod device;
pub mod plant;
pub mod range_policy;
pub mod reading;
pub mod telemetry;
pub mod zone;
