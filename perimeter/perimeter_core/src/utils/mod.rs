//! Utility modules.
//!
//! - **config**: Perimeter configuration with defaults and TOML loading
//! - **logging**: Log levels and tracing filter helpers

pub mod config;
pub mod logging;

pub use config::PerimeterConfig;
pub use logging::LogLevel;
