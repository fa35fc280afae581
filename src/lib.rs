pub mod config;
pub mod error;
pub mod function;
pub mod logging;
pub mod readiness;
pub mod resource;
pub mod telemetry;
