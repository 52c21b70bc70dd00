mod db;
mod http;
mod monitoring;

pub use monitoring::MonitoringConfig;

pub use db::DatabaseConfig;
pub use http::server::HttpServerConfig;

pub mod meter {
    pub use super::monitoring::meter::increment;
}
