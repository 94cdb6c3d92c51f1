pub mod api_config;
pub mod endpoint;
