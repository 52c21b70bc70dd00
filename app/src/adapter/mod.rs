pub mod chart;
pub mod db;
pub mod http;
