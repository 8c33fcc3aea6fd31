//! Platform error taxonomy
//!
//! Every capability operation reports failure synchronously through
//! [`PalError`]. The variants map onto the five failure classes of the
//! platform layer: absent capability, invalid handle, precondition
//! violation, native failure and lifecycle misuse.

use ash::vk;
use thiserror::Error;

use crate::components::PalComponents;
use crate::config::ConfigError;
use crate::foundation::handle::{Handle, HandleKind};

/// Result alias used across the crate
pub type PalResult<T> = Result<T, PalError>;

/// Platform layer errors
#[derive(Error, Debug)]
pub enum PalError {
    /// No backend offers this capability on the running platform/build
    #[error("{0} is not supported on this platform")]
    Unsupported(PalComponents),

    /// A capability accessor was used before the toolkit reached `Ready`
    #[error("the toolkit has not been initialized; call Toolkit::init first")]
    NotInitialized,

    /// `Toolkit::init` was called on an initialized toolkit
    #[error("the toolkit is already initialized")]
    AlreadyInitialized,

    /// The handle was never issued by this component or was destroyed
    #[error("invalid {kind}: {handle} was destroyed or never issued by this component")]
    InvalidHandle {
        /// Handle type name
        kind: &'static str,
        /// Debug rendering of the offending handle
        handle: String,
    },

    /// The caller broke an operation's documented precondition
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A native OS or library call failed
    #[error("{backend} backend failure{}: {message}", fmt_code(.code))]
    Native {
        /// Backend that made the call
        backend: &'static str,
        /// Native error/result code, when the native API provides one
        code: Option<i64>,
        /// Description of the failure
        message: String,
    },

    /// A Vulkan call returned a failure result
    #[error("Vulkan call failed: {0:?}")]
    Vulkan(vk::Result),

    /// Configuration loading failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image decoding failed (icons, cursors)
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

fn fmt_code(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}

impl PalError {
    /// Invalid-handle error for `handle`
    pub fn invalid_handle<K: HandleKind>(handle: Handle<K>) -> Self {
        Self::InvalidHandle {
            kind: K::NAME,
            handle: format!("{handle:?}"),
        }
    }

    /// Native failure without a result code
    pub fn native(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Native {
            backend,
            code: None,
            message: message.into(),
        }
    }

    /// True for the non-fatal "capability not offered" class
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// True for lifecycle misuse (programming errors)
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::AlreadyInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let unsupported = PalError::Unsupported(PalComponents::DIALOG);
        assert_eq!(unsupported.to_string(), "DIALOG is not supported on this platform");
        assert!(unsupported.is_unsupported());

        let native = PalError::Native {
            backend: "glfw",
            code: Some(65544),
            message: "no monitor".into(),
        };
        assert_eq!(native.to_string(), "glfw backend failure (code 65544): no monitor");
        assert_eq!(
            PalError::native("headless", "boom").to_string(),
            "headless backend failure: boom"
        );
        assert!(PalError::NotInitialized.is_lifecycle());
        assert!(!PalError::Vulkan(vk::Result::ERROR_INITIALIZATION_FAILED).is_lifecycle());
    }
}
