use std::cell::RefCell;
use std::rc::Rc;

use glfw::Context;

use super::cursor::GlfwCursorComponent;
use super::display::GlfwDisplayComponent;
use super::icon::GlfwIconComponent;
use super::joystick::GlfwJoystickComponent;
use super::keys::{from_glfw_button, from_glfw_key, from_glfw_modifiers};
use super::{GlfwShared, BACKEND};
use crate::components::window::{check_size_limits, clamp_client_size};
use crate::components::{
    GraphicsApiHints, InitContext, PalComponents, WindowBorderStyle, WindowComponent, WindowMode,
};
use crate::error::{PalError, PalResult};
use crate::events::{EventQueue, PlatformEvent};
use crate::foundation::handle::{CursorHandle, HandleMap, IconHandle, WindowHandle, WindowKind};
use crate::foundation::logging::pal_log;
use crate::foundation::math::{Box2i, Vec2, Vector2i};
use crate::platform::{delegate_component, ComponentCore};

type SizeLimit = (Option<i32>, Option<i32>);

const DEFAULT_CLIENT_SIZE: (u32, u32) = (800, 600);

struct GlfwWindowRecord {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    hints: GraphicsApiHints,
    title: String,
    min_size: SizeLimit,
    max_size: SizeLimit,
    border: WindowBorderStyle,
    mode: WindowMode,
    /// Windowed rect to return to when leaving fullscreen
    restore: Option<Box2i>,
}

impl GlfwWindowRecord {
    fn rect(&self) -> Box2i {
        let (x, y) = self.window.get_pos();
        let (w, h) = self.window.get_size();
        Box2i::from_position_size(Vector2i::new(x, y), Vector2i::new(w, h))
    }

    fn apply_border(&mut self) {
        let (decorated, resizable) = match self.border {
            WindowBorderStyle::Borderless => (false, false),
            WindowBorderStyle::FixedBorder | WindowBorderStyle::ToolBox => (true, false),
            WindowBorderStyle::ResizableBorder => (true, true),
        };
        self.window.set_decorated(decorated);
        self.window.set_resizable(resizable);
    }

    fn apply_size_limits(&mut self) {
        let limit = |value: Option<i32>| value.and_then(|v| u32::try_from(v).ok());
        self.window.set_size_limits(
            limit(self.min_size.0),
            limit(self.min_size.1),
            limit(self.max_size.0),
            limit(self.max_size.1),
        );
    }

    /// Return to a decorated window at the saved rect
    fn leave_fullscreen(&mut self) {
        let Some(rect) = self.restore.take() else {
            return;
        };
        let size = rect.size();
        if self.mode == WindowMode::ExclusiveFullscreen {
            self.window.set_monitor(
                glfw::WindowMode::Windowed,
                rect.min.x,
                rect.min.y,
                u32::try_from(size.x).unwrap_or(1),
                u32::try_from(size.y).unwrap_or(1),
                None,
            );
        } else {
            self.apply_border();
            self.window.set_pos(rect.min.x, rect.min.y);
            self.window.set_size(size.x, size.y);
        }
    }
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Native GLFW windows; also the event pump of the backend
pub struct GlfwWindowComponent {
    core: ComponentCore,
    shared: Rc<GlfwShared>,
    displays: Rc<GlfwDisplayComponent>,
    icons: Rc<GlfwIconComponent>,
    cursors: Rc<GlfwCursorComponent>,
    joysticks: Rc<GlfwJoystickComponent>,
    windows: RefCell<HandleMap<WindowKind, GlfwWindowRecord>>,
    application_name: RefCell<String>,
}

impl GlfwWindowComponent {
    pub(crate) fn new(
        shared: Rc<GlfwShared>,
        displays: Rc<GlfwDisplayComponent>,
        icons: Rc<GlfwIconComponent>,
        cursors: Rc<GlfwCursorComponent>,
        joysticks: Rc<GlfwJoystickComponent>,
    ) -> Self {
        Self {
            core: ComponentCore::new("GlfwWindowComponent", PalComponents::WINDOW, "pal::window"),
            shared,
            displays,
            icons,
            cursors,
            joysticks,
            windows: RefCell::new(HandleMap::new()),
            application_name: RefCell::new(String::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        *self.application_name.borrow_mut() = context.options.application_name.clone();
        Ok(())
    }

    fn release_all(&self) {
        let remaining = self.windows.borrow_mut().drain();
        if !remaining.is_empty() {
            pal_log!(
                self.core.logger(),
                Warn,
                "destroying {} window(s) still open at shutdown",
                remaining.len()
            );
        }
    }

    /// Run `f` on a live native window
    pub(crate) fn with_native<R>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&mut glfw::PWindow) -> R,
    ) -> PalResult<R> {
        let mut windows = self.windows.borrow_mut();
        Ok(f(&mut windows.lookup_mut(handle)?.window))
    }

    /// Run `f` on the focused window, or any window when none has focus
    pub(crate) fn with_any_native<R>(&self, f: impl FnOnce(&mut glfw::PWindow) -> R) -> Option<R> {
        let mut windows = self.windows.borrow_mut();
        let focused = windows
            .iter()
            .find(|(_, record)| record.window.is_focused())
            .or_else(|| windows.iter().next())
            .map(|(handle, _)| handle)?;
        windows.get_mut(focused).map(|record| f(&mut record.window))
    }

    /// Creation hints of a live window
    pub(crate) fn hints(&self, handle: WindowHandle) -> PalResult<GraphicsApiHints> {
        self.with_window(handle, |record| record.hints.clone())
    }

    /// End a blocking `process_events` from the GLFW thread
    pub fn wake(&self) {
        self.shared.glfw().post_empty_event();
    }

    fn with_window<R>(&self, handle: WindowHandle, read: impl FnOnce(&GlfwWindowRecord) -> R) -> PalResult<R> {
        Ok(read(self.windows.borrow().lookup(handle)?))
    }

    fn with_window_mut<R>(
        &self,
        handle: WindowHandle,
        update: impl FnOnce(&mut GlfwWindowRecord) -> R,
    ) -> PalResult<R> {
        Ok(update(self.windows.borrow_mut().lookup_mut(handle)?))
    }

    fn apply_hints(glfw: &mut glfw::Glfw, hints: &GraphicsApiHints) {
        use glfw::WindowHint;

        glfw.default_window_hints();
        glfw.window_hint(WindowHint::Visible(false));
        match hints {
            GraphicsApiHints::OpenGL(gl) => {
                glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGl));
                glfw.window_hint(WindowHint::ContextVersion(
                    u32::from(gl.version.0),
                    u32::from(gl.version.1),
                ));
                if gl.core_profile {
                    glfw.window_hint(WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
                }
                glfw.window_hint(WindowHint::OpenGlForwardCompat(gl.forward_compatible));
                glfw.window_hint(WindowHint::OpenGlDebugContext(gl.debug));
                glfw.window_hint(WindowHint::RedBits(Some(u32::from(gl.color_bits.0))));
                glfw.window_hint(WindowHint::GreenBits(Some(u32::from(gl.color_bits.1))));
                glfw.window_hint(WindowHint::BlueBits(Some(u32::from(gl.color_bits.2))));
                glfw.window_hint(WindowHint::AlphaBits(Some(u32::from(gl.color_bits.3))));
                glfw.window_hint(WindowHint::DepthBits(Some(u32::from(gl.depth_bits))));
                glfw.window_hint(WindowHint::StencilBits(Some(u32::from(gl.stencil_bits))));
                glfw.window_hint(WindowHint::Samples(
                    (gl.samples > 0).then(|| u32::from(gl.samples)),
                ));
                glfw.window_hint(WindowHint::SRgbCapable(gl.srgb_framebuffer));
                glfw.window_hint(WindowHint::DoubleBuffer(gl.double_buffer));
            }
            GraphicsApiHints::Vulkan(_) => {
                glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
            }
        }
    }

    /// Record a mode the platform switched to on its own
    fn observe_mode(&self, handle: WindowHandle, mode: WindowMode, queue: &EventQueue) {
        let changed = self
            .with_window_mut(handle, |record| {
                let changed = record.mode != mode;
                record.mode = mode;
                changed
            })
            .unwrap_or(false);
        if changed {
            queue.push(PlatformEvent::WindowModeChange { window: handle, mode });
        }
    }

    fn translate(&self, window: WindowHandle, event: glfw::WindowEvent, queue: &EventQueue) {
        use glfw::{Action, WindowEvent};

        match event {
            WindowEvent::Close => queue.push(PlatformEvent::Close { window }),
            WindowEvent::Size(w, h) => queue.push(PlatformEvent::WindowResize {
                window,
                client_size: Vector2i::new(w, h),
            }),
            WindowEvent::FramebufferSize(w, h) => queue.push(PlatformEvent::WindowFramebufferResize {
                window,
                framebuffer_size: Vector2i::new(w, h),
            }),
            WindowEvent::Pos(x, y) => queue.push(PlatformEvent::WindowMove {
                window,
                position: Vector2i::new(x, y),
            }),
            WindowEvent::Focus(focused) => queue.push(PlatformEvent::WindowFocus { window, focused }),
            WindowEvent::Iconify(true) => self.observe_mode(window, WindowMode::Minimized, queue),
            WindowEvent::Maximize(true) => self.observe_mode(window, WindowMode::Maximized, queue),
            WindowEvent::Iconify(false) | WindowEvent::Maximize(false) => {
                let maximized = self
                    .with_window(window, |record| record.window.is_maximized())
                    .unwrap_or(false);
                let mode = if maximized { WindowMode::Maximized } else { WindowMode::Normal };
                self.observe_mode(window, mode, queue);
            }
            WindowEvent::ContentScale(x, y) => queue.push(PlatformEvent::WindowScaleChange {
                window,
                scale: Vec2::new(x, y),
            }),
            WindowEvent::Key(key, _, action, modifiers) => {
                let key = from_glfw_key(key);
                let scancode = key.us_scancode();
                let modifiers = from_glfw_modifiers(modifiers);
                queue.push(match action {
                    Action::Release => PlatformEvent::KeyUp {
                        window,
                        key,
                        scancode,
                        modifiers,
                    },
                    Action::Press | Action::Repeat => PlatformEvent::KeyDown {
                        window,
                        key,
                        scancode,
                        modifiers,
                        is_repeat: action == Action::Repeat,
                    },
                });
            }
            WindowEvent::Char(c) => queue.push(PlatformEvent::TextInput {
                window,
                text: c.to_string(),
            }),
            WindowEvent::CursorPos(x, y) => queue.push(PlatformEvent::MouseMove {
                window,
                position: Vec2::new(x as f32, y as f32),
            }),
            WindowEvent::MouseButton(button, action, modifiers) => {
                let Some(button) = from_glfw_button(button) else {
                    return;
                };
                let modifiers = from_glfw_modifiers(modifiers);
                queue.push(if action == Action::Release {
                    PlatformEvent::MouseUp {
                        window,
                        button,
                        modifiers,
                    }
                } else {
                    PlatformEvent::MouseDown {
                        window,
                        button,
                        modifiers,
                    }
                });
            }
            WindowEvent::Scroll(x, y) => queue.push(PlatformEvent::Scroll {
                window,
                delta: Vec2::new(x as f32, y as f32),
            }),
            WindowEvent::CursorEnter(entered) => queue.push(PlatformEvent::MouseEnter { window, entered }),
            WindowEvent::FileDrop(paths) => queue.push(PlatformEvent::FileDrop { window, paths }),
            _ => {}
        }
    }

    fn enter_exclusive_fullscreen(&self, handle: WindowHandle) -> PalResult<()> {
        let position = self.get_position(handle)?;
        let target = self
            .displays
            .monitor_at(position)
            .ok_or_else(|| PalError::native(BACKEND, "no monitor for exclusive fullscreen"))?;
        let mut windows = self.windows.borrow_mut();
        let record = windows.lookup_mut(handle)?;
        let switched = self.shared.glfw().with_connected_monitors(|_, monitors| {
            let Some(monitor) = monitors
                .iter()
                .find(|m| m.get_name().as_deref() == Some(target.name.as_str()))
            else {
                return false;
            };
            record.window.set_monitor(
                glfw::WindowMode::FullScreen(monitor),
                0,
                0,
                to_u32(target.video_mode.width),
                to_u32(target.video_mode.height),
                Some(target.video_mode.refresh_rate),
            );
            true
        });
        if switched {
            Ok(())
        } else {
            Err(PalError::native(
                BACKEND,
                format!("monitor {} disappeared", target.name),
            ))
        }
    }
}

delegate_component!(GlfwWindowComponent);

impl WindowComponent for GlfwWindowComponent {
    fn create(&self, hints: GraphicsApiHints) -> PalResult<WindowHandle> {
        let title = self.application_name.borrow().clone();
        let (mut window, events) = {
            let mut glfw = self.shared.glfw();
            Self::apply_hints(&mut glfw, &hints);
            glfw.create_window(
                DEFAULT_CLIENT_SIZE.0,
                DEFAULT_CLIENT_SIZE.1,
                &title,
                glfw::WindowMode::Windowed,
            )
            .ok_or_else(|| PalError::native(BACKEND, "glfwCreateWindow failed"))?
        };
        window.set_all_polling(true);

        let handle = self.windows.borrow_mut().insert(GlfwWindowRecord {
            window,
            events,
            hints,
            title,
            min_size: (None, None),
            max_size: (None, None),
            border: WindowBorderStyle::ResizableBorder,
            mode: WindowMode::Hidden,
            restore: None,
        });
        pal_log!(self.core.logger(), Debug, "created {handle:?}");
        Ok(handle)
    }

    fn destroy(&self, handle: WindowHandle) -> PalResult<()> {
        let removed = self.windows.borrow_mut().remove(handle);
        if removed.is_some() {
            pal_log!(self.core.logger(), Debug, "destroyed {handle:?}");
        }
        Ok(())
    }

    fn is_window_destroyed(&self, handle: WindowHandle) -> bool {
        !self.windows.borrow().contains(handle)
    }

    fn process_events(&self, blocking: bool) -> PalResult<()> {
        let queue = self.core.events()?;
        {
            let mut glfw = self.shared.glfw();
            if blocking {
                glfw.wait_events();
            } else {
                glfw.poll_events();
            }
        }

        // Each window has its own receiver; merge them back into native order
        let mut pending: Vec<(f64, WindowHandle, glfw::WindowEvent)> = {
            let windows = self.windows.borrow();
            windows
                .iter()
                .flat_map(|(handle, record)| {
                    glfw::flush_messages(&record.events).map(move |(time, event)| (time, handle, event))
                })
                .collect()
        };
        pending.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, window, event) in pending {
            self.translate(window, event, &queue);
        }
        self.displays.poll_connections(&queue);
        self.joysticks.poll_connections(&queue);

        queue.dispatch_pending();
        Ok(())
    }

    fn get_title(&self, handle: WindowHandle) -> PalResult<String> {
        self.with_window(handle, |record| record.title.clone())
    }

    fn set_title(&self, handle: WindowHandle, title: &str) -> PalResult<()> {
        self.with_window_mut(handle, |record| {
            record.window.set_title(title);
            record.title = title.to_string();
        })
    }

    fn get_client_size(&self, handle: WindowHandle) -> PalResult<Vector2i> {
        self.with_window(handle, |record| {
            let (w, h) = record.window.get_size();
            Vector2i::new(w, h)
        })
    }

    fn set_client_size(&self, handle: WindowHandle, size: Vector2i) -> PalResult<()> {
        if size.x < 0 || size.y < 0 {
            return Err(PalError::Precondition(format!(
                "client size ({}, {}) is negative",
                size.x, size.y
            )));
        }
        self.with_window_mut(handle, |record| {
            let size = clamp_client_size(size, record.min_size, record.max_size);
            record.window.set_size(size.x, size.y);
        })
    }

    fn get_min_client_size(&self, handle: WindowHandle) -> PalResult<SizeLimit> {
        self.with_window(handle, |record| record.min_size)
    }

    fn get_max_client_size(&self, handle: WindowHandle) -> PalResult<SizeLimit> {
        self.with_window(handle, |record| record.max_size)
    }

    fn set_min_client_size(
        &self,
        handle: WindowHandle,
        width: Option<i32>,
        height: Option<i32>,
    ) -> PalResult<()> {
        let max = self.with_window(handle, |record| record.max_size)?;
        check_size_limits((width, height), max)?;
        self.with_window_mut(handle, |record| {
            record.min_size = (width, height);
            record.apply_size_limits();
        })
    }

    fn set_max_client_size(
        &self,
        handle: WindowHandle,
        width: Option<i32>,
        height: Option<i32>,
    ) -> PalResult<()> {
        let min = self.with_window(handle, |record| record.min_size)?;
        check_size_limits(min, (width, height))?;
        self.with_window_mut(handle, |record| {
            record.max_size = (width, height);
            record.apply_size_limits();
        })
    }

    fn get_position(&self, handle: WindowHandle) -> PalResult<Vector2i> {
        self.with_window(handle, |record| {
            let (x, y) = record.window.get_pos();
            Vector2i::new(x, y)
        })
    }

    fn set_position(&self, handle: WindowHandle, position: Vector2i) -> PalResult<()> {
        self.with_window_mut(handle, |record| record.window.set_pos(position.x, position.y))
    }

    fn get_framebuffer_size(&self, handle: WindowHandle) -> PalResult<Vector2i> {
        self.with_window(handle, |record| {
            let (w, h) = record.window.get_framebuffer_size();
            Vector2i::new(w, h)
        })
    }

    fn get_border_style(&self, handle: WindowHandle) -> PalResult<WindowBorderStyle> {
        self.with_window(handle, |record| record.border)
    }

    fn set_border_style(&self, handle: WindowHandle, style: WindowBorderStyle) -> PalResult<()> {
        if style == WindowBorderStyle::ToolBox {
            pal_log!(self.core.logger(), Debug, "GLFW has no tool windows, using a fixed border");
        }
        self.with_window_mut(handle, |record| {
            record.border = style;
            if record.restore.is_none() {
                record.apply_border();
            }
        })
    }

    fn get_mode(&self, handle: WindowHandle) -> PalResult<WindowMode> {
        self.with_window(handle, |record| record.mode)
    }

    fn set_mode(&self, handle: WindowHandle, mode: WindowMode) -> PalResult<()> {
        let queue = self.core.events()?;
        let current = self.get_mode(handle)?;
        if current == mode {
            return Ok(());
        }

        let fullscreen = matches!(
            mode,
            WindowMode::WindowedFullscreen | WindowMode::ExclusiveFullscreen
        );
        let position = self.get_position(handle)?;
        let bounds = self.displays.monitor_at(position).map(|m| m.bounds());

        self.with_window_mut(handle, |record| {
            if fullscreen {
                if record.restore.is_none() {
                    record.restore = Some(record.rect());
                }
            } else {
                record.leave_fullscreen();
            }
            match mode {
                WindowMode::Hidden => record.window.hide(),
                WindowMode::Normal => {
                    record.window.restore();
                    record.window.show();
                }
                WindowMode::Minimized => record.window.iconify(),
                WindowMode::Maximized => {
                    record.window.show();
                    record.window.maximize();
                }
                WindowMode::WindowedFullscreen => {
                    if let Some(bounds) = bounds {
                        record.window.set_decorated(false);
                        record.window.set_pos(bounds.min.x, bounds.min.y);
                        record.window.set_size(bounds.width(), bounds.height());
                    }
                    record.window.show();
                }
                WindowMode::ExclusiveFullscreen => record.window.show(),
            }
            record.mode = mode;
        })?;
        if mode == WindowMode::ExclusiveFullscreen {
            self.enter_exclusive_fullscreen(handle)?;
        }

        queue.push(PlatformEvent::WindowModeChange { window: handle, mode });
        pal_log!(self.core.logger(), Debug, "{handle:?} mode {current:?} -> {mode:?}");
        Ok(())
    }

    fn set_icon(&self, handle: WindowHandle, icon: IconHandle) -> PalResult<()> {
        let image = self.icons.image(icon)?;
        self.with_window_mut(handle, |record| record.window.set_icon_from_pixels(vec![image]))
    }

    fn set_cursor(&self, handle: WindowHandle, cursor: Option<CursorHandle>) -> PalResult<()> {
        let native = cursor.map(|c| self.cursors.build(c)).transpose()?;
        self.with_window_mut(handle, |record| {
            record.window.set_cursor(native);
        })
    }

    fn focus_window(&self, handle: WindowHandle) -> PalResult<()> {
        self.with_window_mut(handle, |record| record.window.focus())
    }

    fn get_graphics_api_hints(&self, handle: WindowHandle) -> PalResult<GraphicsApiHints> {
        self.hints(handle)
    }

    fn swap_buffers(&self, handle: WindowHandle) -> PalResult<()> {
        self.with_window_mut(handle, |record| {
            if record.hints.as_opengl().is_none() {
                return Err(PalError::Precondition(format!(
                    "{handle:?} was not created with OpenGL hints"
                )));
            }
            if !record.window.is_current() {
                return Err(PalError::Precondition(format!(
                    "the OpenGL context of {handle:?} is not current"
                )));
            }
            record.window.swap_buffers();
            Ok(())
        })?
    }
}
