//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the platform layer:
//! - Capability-tagged handles and their storage
//! - Math types for sizes, positions and rectangles
//! - Native string marshaling
//! - Logging utilities

pub mod handle;
pub mod logging;
pub mod marshal;
pub mod math;
