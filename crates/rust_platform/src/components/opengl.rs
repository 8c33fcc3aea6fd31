//! OpenGL capability
//!
//! Context currency is per thread: a context made current on one thread
//! must only be used for drawing from that thread until it is rebound. This
//! is documented, not enforced.

use std::ffi::c_void;
use std::rc::Rc;

use super::PalComponent;
use crate::error::PalResult;
use crate::foundation::handle::{OpenGLContextHandle, WindowHandle};

/// Function-pointer resolver handed to an external OpenGL loader
pub trait BindingsContext {
    /// Address of the named GL function, null when unavailable
    fn get_proc_address(&self, name: &str) -> *const c_void;
}

/// OpenGL context creation and currency
pub trait OpenGLComponent: PalComponent {
    /// Create a context for a window created with OpenGL hints. A window
    /// holds at most one context.
    fn create_from_window(&self, window: WindowHandle) -> PalResult<OpenGLContextHandle>;

    /// Destroy a context, detaching it first if it is current. Destroying
    /// a destroyed context is a no-op.
    fn destroy_context(&self, handle: OpenGLContextHandle) -> PalResult<()>;

    /// Make `handle` current on the calling thread, or detach the current
    /// context with `None`
    fn set_current_context(&self, handle: Option<OpenGLContextHandle>) -> PalResult<()>;

    /// The context current on the calling thread
    fn get_current_context(&self) -> Option<OpenGLContextHandle>;

    /// Resolver for loading GL entry points of `handle`
    fn get_bindings_context(&self, handle: OpenGLContextHandle) -> PalResult<Rc<dyn BindingsContext>>;

    /// Address of a GL function for `handle`
    fn get_proc_address(&self, handle: OpenGLContextHandle, name: &str) -> PalResult<*const c_void> {
        Ok(self.get_bindings_context(handle)?.get_proc_address(name))
    }

    /// Set the swap interval of the current context (0 disables vsync).
    /// Requires a current context.
    fn set_swap_interval(&self, interval: i32) -> PalResult<()>;

    /// Swap interval of the current context
    fn get_swap_interval(&self) -> PalResult<i32>;

    /// The window `handle` was created for
    fn get_context_window(&self, handle: OpenGLContextHandle) -> PalResult<WindowHandle>;
}
