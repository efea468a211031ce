pub mod actuator;
pub mod assessment;
pub mod autocontrol;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod report;
pub mod room;
pub mod sensor;
pub mod store;
pub mod thresholds;
