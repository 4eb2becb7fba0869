//! # chatroom-common
//!
//! Shared infrastructure: configuration loading, tracing setup, build
//! information and the application-level error type.

pub mod build_info;
pub mod config;
pub mod error;
pub mod telemetry;

pub use build_info::BuildInfo;
pub use config::{AppConfig, ConfigError, LogConfig, LogFormat, LogLevel, RoomConfig, ServerConfig};
pub use error::{AppError, AppResult};
pub use telemetry::{init_tracing, try_init_tracing, TracingError};
