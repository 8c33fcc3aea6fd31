//! # Rust Platform
//!
//! A platform abstraction layer: windows, displays, input devices, cursors,
//! icons, clipboard, dialogs, shell services and OpenGL/Vulkan surface
//! creation behind one small set of capability traits.
//!
//! ## Features
//!
//! - **Explicit registry**: a [`Toolkit`] object resolves every capability
//!   once and reports absent ones as `Unsupported`
//! - **Typed handles**: window, display, context and device handles are
//!   distinct types backed by generational keys
//! - **Snapshot event dispatch**: native messages are pumped only inside
//!   `process_events` and broadcast in FIFO order
//! - **Backends**: an in-memory headless backend, and GLFW behind the
//!   `glfw` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_platform::prelude::*;
//!
//! fn main() -> Result<(), PalError> {
//!     let options = ToolkitOptions::new("viewer");
//!     let mut toolkit = Toolkit::new();
//!     toolkit.init(&options)?;
//!
//!     let windows = toolkit.window()?;
//!     let window = windows.create(GraphicsApiHints::default())?;
//!     windows.set_mode(window, WindowMode::Normal)?;
//!
//!     let events = toolkit.events();
//!     let closer = windows.clone();
//!     events.subscribe_to(&[PlatformEventType::Close], move |event| {
//!         if let PlatformEvent::Close { window } = event {
//!             let _ = closer.destroy(*window);
//!         }
//!     });
//!
//!     while !windows.is_window_destroyed(window) {
//!         windows.process_events(true)?;
//!     }
//!     toolkit.shutdown();
//!     Ok(())
//! }
//! ```

pub mod components;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod foundation;
pub mod input;
pub mod platform;
pub mod toolkit;

pub use error::{PalError, PalResult};
pub use toolkit::{ComponentStatus, Toolkit, ToolkitState};

/// Common imports for toolkit users
pub mod prelude {
    pub use crate::{
        components::{
            ClipboardComponent, CursorComponent, DialogComponent, DisplayComponent,
            GraphicsApiHints, IconComponent, JoystickComponent, KeyboardComponent, MouseComponent,
            OpenGLComponent, OpenGLGraphicsApiHints, PalComponent, PalComponents, ShellComponent,
            SurfaceComponent, VulkanComponent, VulkanGraphicsApiHints, WindowBorderStyle,
            WindowComponent, WindowMode,
        },
        config::Config,
        core::{BackendPreference, HeadlessOptions, ToolkitOptions},
        events::{EventQueue, PlatformEvent, PlatformEventType, SubscriptionId},
        foundation::{
            handle::{
                CursorHandle, DisplayHandle, IconHandle, JoystickHandle, OpenGLContextHandle,
                PalHandle, SurfaceHandle, WindowHandle,
            },
            math::{Box2i, Vec2, Vector2i},
        },
        input::{Key, KeyModifiers, MouseButton, Scancode},
        ComponentStatus, PalError, PalResult, Toolkit,
    };
}
