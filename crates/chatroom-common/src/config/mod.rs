//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ConfigError, LogConfig, LogFormat, LogLevel, RoomConfig, ServerConfig,
};
