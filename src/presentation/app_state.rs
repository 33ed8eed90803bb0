// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::streaming_service::StreamingZoneService;
use crate::application::zone_service::ZoneService;

#[derive(Clone)]
pub struct AppState {
    pub zone_service: ZoneService,
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingZoneService,
    pub default_hours: u32,
}
