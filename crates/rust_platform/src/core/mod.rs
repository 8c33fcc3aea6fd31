//! # Core Module
//!
//! Toolkit-wide configuration shared by the registry and the backends.

pub mod config;

pub use config::{
    BackendPreference, Config, ConfigError, HeadlessOptions, ToolkitOptions,
    VirtualDisplayConfig, VirtualJoystickConfig,
};
