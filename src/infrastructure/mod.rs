// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod greenhouse_api;
pub mod http_response;
