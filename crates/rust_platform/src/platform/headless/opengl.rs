use std::cell::RefCell;
use std::ffi::c_void;
use std::rc::Rc;

use super::host::{HeadlessHost, NativeId, NativeKind};
use super::simulated_failure;
use super::window::HeadlessWindowComponent;
use crate::components::{
    BindingsContext, InitContext, OpenGLComponent, PalComponents, WindowComponent,
};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::{HandleMap, OpenGLContextHandle, OpenGLContextKind, WindowHandle};
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// Resolver of a headless context. There is no GL driver, so every lookup
/// yields null.
#[derive(Debug, Default)]
pub struct HeadlessBindings;

impl BindingsContext for HeadlessBindings {
    fn get_proc_address(&self, _name: &str) -> *const c_void {
        std::ptr::null()
    }
}

struct ContextRecord {
    native: NativeId,
    window: WindowHandle,
    window_native: NativeId,
    swap_interval: i32,
}

/// OpenGL contexts without a driver
pub struct HeadlessOpenGLComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    windows: Rc<HeadlessWindowComponent>,
    contexts: RefCell<HandleMap<OpenGLContextKind, ContextRecord>>,
    bindings: Rc<HeadlessBindings>,
}

impl HeadlessOpenGLComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>, windows: Rc<HeadlessWindowComponent>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessOpenGLComponent", PalComponents::OPENGL, "pal::opengl"),
            host,
            windows,
            contexts: RefCell::new(HandleMap::new()),
            bindings: Rc::new(HeadlessBindings),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for (_, record) in self.contexts.borrow_mut().drain() {
            self.host.forget_gl(record.native);
            self.host.ledger().release_logged(record.native, &logger);
        }
    }

    fn current(&self) -> Option<OpenGLContextHandle> {
        let (native, _) = self.host.current_gl()?;
        self.contexts
            .borrow()
            .iter()
            .find(|(_, record)| record.native == native)
            .map(|(handle, _)| handle)
    }

    fn require_current(&self) -> PalResult<OpenGLContextHandle> {
        self.current()
            .ok_or_else(|| PalError::Precondition("no OpenGL context is current".to_string()))
    }
}

delegate_component!(HeadlessOpenGLComponent);

impl OpenGLComponent for HeadlessOpenGLComponent {
    fn create_from_window(&self, window: WindowHandle) -> PalResult<OpenGLContextHandle> {
        let (window_native, hints) = self.windows.native_window(window)?;
        if hints.as_opengl().is_none() {
            return Err(PalError::Precondition(format!(
                "{window:?} was not created with OpenGL hints"
            )));
        }
        if self.contexts.borrow().iter().any(|(_, c)| c.window == window) {
            return Err(PalError::Precondition(format!(
                "{window:?} already has an OpenGL context"
            )));
        }
        let native = self.host.ledger().allocate(NativeKind::GlContext);
        let handle = self.contexts.borrow_mut().insert(ContextRecord {
            native,
            window,
            window_native,
            swap_interval: 0,
        });
        pal_log!(self.core.logger(), Debug, "created {handle:?} for {window:?}");
        Ok(handle)
    }

    fn destroy_context(&self, handle: OpenGLContextHandle) -> PalResult<()> {
        let Some(record) = self.contexts.borrow_mut().remove(handle) else {
            return Ok(());
        };
        self.host.forget_gl(record.native);
        self.host.ledger().release(record.native)
    }

    fn set_current_context(&self, handle: Option<OpenGLContextHandle>) -> PalResult<()> {
        let Some(handle) = handle else {
            self.host.set_current_gl(None);
            return Ok(());
        };
        let (native, window, window_native) = {
            let contexts = self.contexts.borrow();
            let record = contexts.lookup(handle)?;
            (record.native, record.window, record.window_native)
        };
        if self.windows.is_window_destroyed(window) {
            return Err(PalError::Precondition(format!(
                "the window of {handle:?} was destroyed"
            )));
        }
        self.host.set_current_gl(Some((native, window_native)));
        Ok(())
    }

    fn get_current_context(&self) -> Option<OpenGLContextHandle> {
        self.current()
    }

    fn get_bindings_context(&self, handle: OpenGLContextHandle) -> PalResult<Rc<dyn BindingsContext>> {
        self.contexts.borrow().lookup(handle)?;
        Ok(self.bindings.clone())
    }

    fn set_swap_interval(&self, interval: i32) -> PalResult<()> {
        let current = self.require_current()?;
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
