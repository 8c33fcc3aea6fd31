use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::Rc;

use glfw::Context;

use super::window::GlfwWindowComponent;
use super::GlfwShared;
use crate::components::{
    BindingsContext, InitContext, OpenGLComponent, PalComponents, WindowComponent,
};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::{HandleMap, OpenGLContextHandle, OpenGLContextKind, WindowHandle};
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// Resolves GL entry points of whichever context is current
pub struct GlfwBindings {
    shared: Rc<GlfwShared>,
}

impl BindingsContext for GlfwBindings {
    fn get_proc_address(&self, name: &str) -> *const c_void {
        self.shared.glfw().get_proc_address_raw(name) as *const c_void
    }
}

struct ContextRecord {
    window: WindowHandle,
    swap_interval: i32,
}

/// The OpenGL context GLFW creates with every OpenGL window
pub struct GlfwOpenGLComponent {
    core: ComponentCore,
    shared: Rc<GlfwShared>,
    windows: Rc<GlfwWindowComponent>,
    contexts: RefCell<HandleMap<OpenGLContextKind, ContextRecord>>,
    current: Cell<Option<OpenGLContextHandle>>,
}

impl GlfwOpenGLComponent {
    pub(crate) fn new(shared: Rc<GlfwShared>, windows: Rc<GlfwWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("GlfwOpenGLComponent", PalComponents::OPENGL, "pal::opengl"),
            shared,
            windows,
            contexts: RefCell::new(HandleMap::new()),
            current: Cell::new(None),
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        Ok(())
    }

    fn release_all(&self) {
        if self.current.take().is_some() {
            glfw::make_context_current(None);
        }
        self.contexts.borrow_mut().drain();
    }

    fn require_current(&self) -> PalResult<OpenGLContextHandle> {
        self.get_current_context()
            .ok_or_else(|| PalError::Precondition("no OpenGL context is current".to_string()))
    }
}

delegate_component!(GlfwOpenGLComponent);

impl OpenGLComponent for GlfwOpenGLComponent {
    fn create_from_window(&self, window: WindowHandle) -> PalResult<OpenGLContextHandle> {
        if self.windows.hints(window)?.as_opengl().is_none() {
            return Err(PalError::Precondition(format!(
                "{window:?} was not created with OpenGL hints"
            )));
        }
        let mut contexts = self.contexts.borrow_mut();
        let stale: Vec<OpenGLContextHandle> = contexts
            .iter()
            .filter(|(_, record)| self.windows.is_window_destroyed(record.window))
            .map(|(handle, _)| handle)
            .collect();
        for handle in stale {
            contexts.remove(handle);
        }
        if contexts.iter().any(|(_, record)| record.window == window) {
            return Err(PalError::Precondition(format!(
                "{window:?} already has an OpenGL context"
            )));
        }
        let handle = contexts.insert(ContextRecord {
            window,
            swap_interval: 0,
        });
        pal_log!(self.core.logger(), Debug, "created {handle:?} for {window:?}");
        Ok(handle)
    }

    fn destroy_context(&self, handle: OpenGLContextHandle) -> PalResult<()> {
        if self.contexts.borrow_mut().remove(handle).is_none() {
            return Ok(());
        }
        if self.current.get() == Some(handle) {
            self.current.set(None);
            glfw::make_context_current(None);
        }
        Ok(())
    }

    fn set_current_context(&self, handle: Option<OpenGLContextHandle>) -> PalResult<()> {
        let Some(handle) = handle else {
            self.current.set(None);
            glfw::make_context_current(None);
            return Ok(());
        };
        let window = self.contexts.borrow().lookup(handle)?.window;
        if self.windows.is_window_destroyed(window) {
            return Err(PalError::Precondition(format!(
                "the window of {handle:?} was destroyed"
            )));
        }
        self.windows.with_native(window, |native| native.make_current())?;
        self.current.set(Some(handle));
        Ok(())
    }

    fn get_current_context(&self) -> Option<OpenGLContextHandle> {
        let handle = self.current.get()?;
        let window = self.contexts.borrow().get(handle)?.window;
        // Destroying the window takes its context with it
        let live = self
            .windows
            .with_native(window, |native| native.is_current())
            .unwrap_or(false);
        live.then_some(handle)
    }

    fn get_bindings_context(&self, handle: OpenGLContextHandle) -> PalResult<Rc<dyn BindingsContext>> {
        self.contexts.borrow().lookup(handle)?;
        Ok(Rc::new(GlfwBindings {
            shared: Rc::clone(&self.shared),
        }))
    }

    fn set_swap_interval(&self, interval: i32) -> PalResult<()> {
        let current = self.require_current()?;
        let native = match interval {
            0 => glfw::SwapInterval::None,
            i if i < 0 => glfw::SwapInterval::Adaptive,
            i => glfw::SwapInterval::Sync(i.unsigned_abs()),
        };
        self.shared.glfw().set_swap_interval(native);
        self.contexts.borrow_mut().lookup_mut(current)?.swap_interval = interval;
        Ok(())
    }

    fn get_swap_interval(&self) -> PalResult<i32> {
        let current = self.require_current()?;
        Ok(self.contexts.borrow().lookup(current)?.swap_interval)
    }

    fn get_context_window(&self, handle: OpenGLContextHandle) -> PalResult<WindowHandle> {
        Ok(self.contexts.borrow().lookup(handle)?.window)
    }
}
