// Application layer - Use cases over the reading repository
pub mod dashboard_service;
pub mod reading_repository;
pub mod streaming_service;
pub mod zone_monitor;
pub mod zone_service;
