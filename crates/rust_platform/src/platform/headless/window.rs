use std::cell::RefCell;
use std::rc::Rc;

use super::cursor::HeadlessCursorComponent;
use super::display::HeadlessDisplayComponent;
use super::host::{HeadlessHost, HeadlessMessage, NativeId, NativeKind, BACKEND};
use super::icon::HeadlessIconComponent;
use super::joystick::HeadlessJoystickComponent;
use super::simulated_failure;
use crate::components::window::{check_size_limits, clamp_client_size};
use crate::components::{
    ClipboardFormat, GraphicsApiHints, InitContext, PalComponents, WindowBorderStyle,
    WindowComponent, WindowMode,
};
use crate::error::{PalError, PalResult};
use crate::events::{EventQueue, PlatformEvent};
use crate::foundation::handle::{CursorHandle, HandleMap, IconHandle, WindowHandle, WindowKind};
use crate::foundation::logging::pal_log;
use crate::foundation::math::{saturating_add, Box2i, Vec2, Vector2i};
use crate::platform::{delegate_component, ComponentCore};

type SizeLimit = (Option<i32>, Option<i32>);

const DEFAULT_CLIENT_SIZE: (i32, i32) = (800, 600);
const DEFAULT_POSITION: (i32, i32) = (100, 100);

struct WindowRecord {
    native: NativeId,
    hints: GraphicsApiHints,
    title: String,
    position: Vector2i,
    client_size: Vector2i,
    min_size: SizeLimit,
    max_size: SizeLimit,
    border: WindowBorderStyle,
    mode: WindowMode,
    /// Position and size to return to when leaving maximized or fullscreen
    restore: Option<Box2i>,
    scale: Vec2,
    focused: bool,
}

impl WindowRecord {
    fn framebuffer_size(&self) -> Vector2i {
        Vector2i::new(
            (self.client_size.x as f32 * self.scale.x).round() as i32,
            (self.client_size.y as f32 * self.scale.y).round() as i32,
        )
    }
}

/// Windows of the headless host; also the native message pump
pub struct HeadlessWindowComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    displays: Rc<HeadlessDisplayComponent>,
    icons: Rc<HeadlessIconComponent>,
    cursors: Rc<HeadlessCursorComponent>,
    joysticks: Rc<HeadlessJoystickComponent>,
    windows: RefCell<HandleMap<WindowKind, WindowRecord>>,
}

impl HeadlessWindowComponent {
    pub(crate) fn new(
        host: Rc<HeadlessHost>,
        displays: Rc<HeadlessDisplayComponent>,
        icons: Rc<HeadlessIconComponent>,
        cursors: Rc<HeadlessCursorComponent>,
        joysticks: Rc<HeadlessJoystickComponent>,
    ) -> Self {
        Self {
            core: ComponentCore::new("HeadlessWindowComponent", PalComponents::WINDOW, "pal::window"),
            host,
            displays,
            icons,
            cursors,
            joysticks,
            windows: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)?;
        pal_log!(
            self.core.logger(),
            Info,
            "headless windowing ready for {}",
            context.options.application_name
        );
        Ok(())
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        let remaining = self.windows.borrow_mut().drain();
        if !remaining.is_empty() {
            pal_log!(
                logger,
                Warn,
                "destroying {} window(s) still open at shutdown",
                remaining.len()
            );
        }
        for (_, record) in remaining {
            self.host.forget_gl(record.native);
            self.host.ledger().release_logged(record.native, &logger);
        }
    }

    /// Native id and creation hints of a live window
    pub(crate) fn native_window(&self, handle: WindowHandle) -> PalResult<(NativeId, GraphicsApiHints)> {
        let windows = self.windows.borrow();
        let record = windows.lookup(handle)?;
        Ok((record.native, record.hints.clone()))
    }

    fn with_window<R>(&self, handle: WindowHandle, read: impl FnOnce(&WindowRecord) -> R) -> PalResult<R> {
        Ok(read(self.windows.borrow().lookup(handle)?))
    }

    fn with_window_mut<R>(
        &self,
        handle: WindowHandle,
        update: impl FnOnce(&mut WindowRecord) -> R,
    ) -> PalResult<R> {
        Ok(update(self.windows.borrow_mut().lookup_mut(handle)?))
    }

    fn scale_at(&self, position: Vector2i) -> Vec2 {
        self.host
            .display_at(position)
            .map_or_else(|| Vec2::new(1.0, 1.0), |d| d.config.scale_vector())
    }

    /// Apply a new client size and queue the resize notifications
    fn apply_client_size(&self, handle: WindowHandle, requested: Vector2i) -> PalResult<()> {
        let changed = self.with_window_mut(handle, |record| {
            let size = clamp_client_size(requested, record.min_size, record.max_size);
            if size == record.client_size {
                return None;
            }
            record.client_size = size;
            Some((size, record.framebuffer_size()))
        })?;
        if let Some((client_size, framebuffer_size)) = changed {
            self.host.notify(PlatformEvent::WindowResize {
                window: handle,
                client_size,
            });
            self.host.notify(PlatformEvent::WindowFramebufferResize {
                window: handle,
                framebuffer_size,
            });
        }
        Ok(())
    }

    /// Apply a new position and queue move and scale notifications
    fn apply_position(&self, handle: WindowHandle, position: Vector2i) -> PalResult<()> {
        let scale = self.scale_at(position);
        let (moved, rescaled) = self.with_window_mut(handle, |record| {
            let moved = record.position != position;
            record.position = position;
            let rescaled = record.scale != scale;
            record.scale = scale;
            (moved, rescaled.then(|| record.framebuffer_size()))
        })?;
        if moved {
            self.host.notify(PlatformEvent::WindowMove {
                window: handle,
                position,
            });
        }
        if let Some(framebuffer_size) = rescaled {
            self.host.notify(PlatformEvent::WindowScaleChange { window: handle, scale });
            self.host.notify(PlatformEvent::WindowFramebufferResize {
                window: handle,
                framebuffer_size,
            });
        }
        Ok(())
    }

    fn apply_focus(&self, handle: WindowHandle, focused: bool) -> PalResult<()> {
        let mut changes = Vec::new();
        {
            let mut windows = self.windows.borrow_mut();
            windows.lookup(handle)?;
            for (other, record) in windows.iter_mut() {
                let wanted = if other == handle { focused } else { record.focused && !focused };
                if record.focused != wanted {
                    record.focused = wanted;
                    changes.push((other, wanted));
                }
            }
        }
        // Focus loss is reported before focus gain
        changes.sort_by_key(|(_, focused)| *focused);
        for (window, focused) in changes {
            self.host.notify(PlatformEvent::WindowFocus { window, focused });
        }
        Ok(())
    }

    /// Translate one native message into events on `queue`
    fn translate(&self, message: HeadlessMessage, queue: &EventQueue) {
        let logger = self.core.logger();
        let window = match &message {
            HeadlessMessage::Close(w)
            | HeadlessMessage::Resize(w, _)
            | HeadlessMessage::Move(w, _)
            | HeadlessMessage::Focus(w, _)
            | HeadlessMessage::Key { window: w, .. }
            | HeadlessMessage::Text(w, _)
            | HeadlessMessage::MouseMove(w, _)
            | HeadlessMessage::MouseButton { window: w, .. }
            | HeadlessMessage::Scroll(w, _)
            | HeadlessMessage::MouseEnter(w, _)
            | HeadlessMessage::FileDrop(w, _) => Some(*w),
            _ => None,
        };
        if let Some(w) = window {
            if !self.windows.borrow().contains(w) {
                pal_log!(logger, Debug, "dropping {message:?} for destroyed window");
                return;
            }
        }

        let report = |result: PalResult<()>| {
            if let Err(error) = result {
                pal_log!(logger, Warn, "native window update failed: {error}");
            }
        };
        match message {
            HeadlessMessage::Close(window) => queue.push(PlatformEvent::Close { window }),
            HeadlessMessage::Resize(window, size) => report(self.apply_client_size(window, size)),
            HeadlessMessage::Move(window, position) => report(self.apply_position(window, position)),
            HeadlessMessage::Focus(window, focused) => report(self.apply_focus(window, focused)),
            HeadlessMessage::Key {
                window,
                key,
                pressed,
                repeat,
            } => {
                let (scancode, modifiers) = {
                    let mut input = self.host.input.borrow_mut();
                    let scancode = input.key(key, pressed);
                    (scancode, input.modifiers)
                };
                queue.push(if pressed {
                    PlatformEvent::KeyDown {
                        window,
                        key,
                        scancode,
                        modifiers,
                        is_repeat: repeat,
                    }
                } else {
                    PlatformEvent::KeyUp {
                        window,
                        key,
                        scancode,
                        modifiers,
                    }
                });
            }
            HeadlessMessage::Text(window, text) => queue.push(PlatformEvent::TextInput { window, text }),
            HeadlessMessage::MouseMove(window, position) => {
                if let Ok(origin) = self.with_window(window, |record| record.position) {
                    self.host.input.borrow_mut().cursor = saturating_add(
                        origin,
                        Vector2i::new(position.x.round() as i32, position.y.round() as i32),
                    );
                }
                queue.push(PlatformEvent::MouseMove { window, position });
            }
            HeadlessMessage::MouseButton {
                window,
                button,
                pressed,
            } => {
                let modifiers = {
                    let mut input = self.host.input.borrow_mut();
                    input.buttons.set(button.flag(), pressed);
                    input.modifiers
                };
                queue.push(if pressed {
                    PlatformEvent::MouseDown {
                        window,
                        button,
                        modifiers,
                    }
                } else {
                    PlatformEvent::MouseUp {
                        window,
                        button,
                        modifiers,
                    }
                });
            }
            HeadlessMessage::Scroll(window, delta) => {
                self.host.input.borrow_mut().scroll += delta;
                queue.push(PlatformEvent::Scroll { window, delta });
            }
            HeadlessMessage::MouseEnter(window, entered) => {
                queue.push(PlatformEvent::MouseEnter { window, entered });
            }
            HeadlessMessage::FileDrop(window, paths) => queue.push(PlatformEvent::FileDrop { window, paths }),
            HeadlessMessage::DisplayConnected(config) => {
                if let Err(reason) = config.validate() {
                    pal_log!(logger, Warn, "ignoring display hot-plug: {reason}");
                    return;
                }
                let name = config.name.clone();
                self.host.connect_display(config);
                pal_log!(logger, Info, "display {name} connected");
                queue.push(PlatformEvent::DisplayConnection {
                    display: None,
                    name,
                    connected: true,
                });
            }
            HeadlessMessage::DisplayDisconnected(name) => match self.host.disconnect_display(&name) {
                Some(display) => {
                    pal_log!(logger, Info, "display {name} disconnected");
                    queue.push(PlatformEvent::DisplayConnection {
                        display: self.displays.handle_for(display.id),
                        name,
                        connected: false,
                    });
                }
                None => pal_log!(logger, Warn, "unknown display {name} disconnected"),
            },
            HeadlessMessage::JoystickConnected(slot, config) => {
                if self.host.plug_joystick(slot, config) {
                    queue.push(PlatformEvent::JoystickConnection {
                        index: slot,
                        joystick: self.joysticks.handle_for(slot),
                        connected: true,
                    });
                }
            }
            HeadlessMessage::JoystickDisconnected(slot) => {
                if self.host.unplug_joystick(slot) {
                    queue.push(PlatformEvent::JoystickConnection {
                        index: slot,
                        joystick: self.joysticks.handle_for(slot),
                        connected: false,
                    });
                }
            }
            HeadlessMessage::JoystickAxis { slot, axis, value } => {
                self.host.update_joystick(slot, |device| {
                    if let Some(v) = device.axes.get_mut(axis) {
                        *v = value.clamp(-1.0, 1.0);
                    }
                });
            }
            HeadlessMessage::JoystickButton {
                slot,
                button,
                pressed,
            } => {
                self.host.update_joystick(slot, |device| {
                    if let Some(b) = device.buttons.get_mut(button) {
                        *b = pressed;
                    }
                });
            }
            HeadlessMessage::ClipboardChanged(text) => {
                *self.host.clipboard.borrow_mut() = Some(text);
                queue.push(PlatformEvent::ClipboardUpdate {
                    format: ClipboardFormat::Text,
                });
            }
            HeadlessMessage::ThemeChanged(theme) => {
                *self.host.theme.borrow_mut() = theme.clone();
                queue.push(PlatformEvent::ThemeChange { theme });
            }
            HeadlessMessage::Wake => {}
        }
    }

    /// Move queued API notifications and then channel messages onto `queue`
    fn pump(&self, queue: &EventQueue) {
        while let Some(event) = self.host.take_notification() {
            queue.push(event);
        }
        while let Some(message) = self.host.try_message() {
            self.translate(message, queue);
            while let Some(event) = self.host.take_notification() {
                queue.push(event);
            }
        }
    }

    fn target_area(&self, handle: WindowHandle, mode: WindowMode) -> PalResult<Option<Box2i>> {
        let position = self.with_window(handle, |record| record.position)?;
        let Some(display) = self.host.display_at(position) else {
            return Ok(None);
        };
        Ok(match mode {
            WindowMode::Maximized => Some(display.work_area()),
            WindowMode::WindowedFullscreen | WindowMode::ExclusiveFullscreen => Some(display.bounds()),
            _ => None,
        })
    }
}

delegate_component!(HeadlessWindowComponent);

impl WindowComponent for HeadlessWindowComponent {
    fn create(&self, hints: GraphicsApiHints) -> PalResult<WindowHandle> {
        let position = Vector2i::new(DEFAULT_POSITION.0, DEFAULT_POSITION.1);
        let native = self.host.ledger().allocate(NativeKind::Window);
        let handle = self.windows.borrow_mut().insert(WindowRecord {
            native,
            hints,
            title: String::new(),
            position,
            client_size: Vector2i::new(DEFAULT_CLIENT_SIZE.0, DEFAULT_CLIENT_SIZE.1),
            min_size: (None, None),
            max_size: (None, None),
            border: WindowBorderStyle::ResizableBorder,
            mode: WindowMode::Hidden,
            restore: None,
            scale: self.scale_at(position),
            focused: false,
        });
        pal_log!(self.core.logger(), Debug, "created {handle:?}");
        Ok(handle)
    }

    fn destroy(&self, handle: WindowHandle) -> PalResult<()> {
        let Some(record) = self.windows.borrow_mut().remove(handle) else {
            return Ok(());
        };
        self.host.forget_gl(record.native);
        self.host.ledger().release(record.native)?;
        pal_log!(self.core.logger(), Debug, "destroyed {handle:?}");
        Ok(())
    }

    fn is_window_destroyed(&self, handle: WindowHandle) -> bool {
        !self.windows.borrow().contains(handle)
    }

    fn process_events(&self, blocking: bool) -> PalResult<()> {
        let queue = self.core.events()?;
        if blocking && !self.host.has_notifications() {
            let first = self.host.wait_message()?;
            self.translate(first, &queue);
        }
        self.pump(&queue);
        queue.dispatch_pending();
        Ok(())
    }

    fn get_title(&self, handle: WindowHandle) -> PalResult<String> {
        self.with_window(handle, |record| record.title.clone())
    }

    fn set_title(&self, handle: WindowHandle, title: &str) -> PalResult<()> {
        self.with_window_mut(handle, |record| record.title = title.to_string())
    }

    fn get_client_size(&self, handle: WindowHandle) -> PalResult<Vector2i> {
        self.with_window(handle, |record| record.client_size)
    }

    fn set_client_size(&self, handle: WindowHandle, size: Vector2i) -> PalResult<()> {
        if size.x < 0 || size.y < 0 {
            return Err(PalError::Precondition(format!(
                "client size ({}, {}) is negative",
                size.x, size.y
            )));
        }
        self.apply_client_size(handle, size)
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
        let (current, max) = self.with_window(handle, |record| (record.client_size, record.max_size))?;
        check_size_limits((width, height), max)?;
        self.with_window_mut(handle, |record| record.min_size = (width, height))?;
        self.apply_client_size(handle, current)
    }

    fn set_max_client_size(
        &self,
        handle: WindowHandle,
        width: Option<i32>,
        height: Option<i32>,
    ) -> PalResult<()> {
        let (current, min) = self.with_window(handle, |record| (record.client_size, record.min_size))?;
        check_size_limits(min, (width, height))?;
        self.with_window_mut(handle, |record| record.max_size = (width, height))?;
        self.apply_client_size(handle, current)
    }

    fn get_position(&self, handle: WindowHandle) -> PalResult<Vector2i> {
        self.with_window(handle, |record| record.position)
    }

    fn set_position(&self, handle: WindowHandle, position: Vector2i) -> PalResult<()> {
        self.apply_position(handle, position)
    }

    fn get_framebuffer_size(&self, handle: WindowHandle) -> PalResult<Vector2i> {
        self.with_window(handle, WindowRecord::framebuffer_size)
    }

    fn get_border_style(&self, handle: WindowHandle) -> PalResult<WindowBorderStyle> {
        self.with_window(handle, |record| record.border)
    }

    fn set_border_style(&self, handle: WindowHandle, style: WindowBorderStyle) -> PalResult<()> {
        self.with_window_mut(handle, |record| record.border = style)
    }

    fn get_mode(&self, handle: WindowHandle) -> PalResult<WindowMode> {
        self.with_window(handle, |record| record.mode)
    }

    fn set_mode(&self, handle: WindowHandle, mode: WindowMode) -> PalResult<()> {
        let (current, restore) = self.with_window(handle, |record| (record.mode, record.restore))?;
        if current == mode {
            return Ok(());
        }

        let target = match self.target_area(handle, mode)? {
            Some(area) => {
                if restore.is_none() {
                    self.with_window_mut(handle, |record| {
                        record.restore = Some(Box2i::from_position_size(record.position, record.client_size));
                    })?;
                }
                Some(area)
            }
            None if mode == WindowMode::Normal => {
                self.with_window_mut(handle, |record| record.restore.take())?
            }
            None => None,
        };

        self.with_window_mut(handle, |record| record.mode = mode)?;
        self.host.notify(PlatformEvent::WindowModeChange { window: handle, mode });
        if let Some(area) = target {
            self.apply_position(handle, area.min)?;
            self.apply_client_size(handle, area.size())?;
        }
        pal_log!(self.core.logger(), Debug, "{handle:?} mode {current:?} -> {mode:?}");
        Ok(())
    }

    fn set_icon(&self, handle: WindowHandle, icon: IconHandle) -> PalResult<()> {
        self.icons.validate(icon)?;
        self.with_window(handle, |_| ())
    }

    fn set_cursor(&self, handle: WindowHandle, cursor: Option<CursorHandle>) -> PalResult<()> {
        if let Some(cursor) = cursor {
            self.cursors.validate(cursor)?;
        }
        self.with_window(handle, |_| ())
    }

    fn focus_window(&self, handle: WindowHandle) -> PalResult<()> {
        self.apply_focus(handle, true)
    }

    fn get_graphics_api_hints(&self, handle: WindowHandle) -> PalResult<GraphicsApiHints> {
        self.with_window(handle, |record| record.hints.clone())
    }

    fn swap_buffers(&self, handle: WindowHandle) -> PalResult<()> {
        let (native, hints) = self.native_window(handle)?;
        if hints.as_opengl().is_none() {
            return Err(PalError::Precondition(format!(
                "{handle:?} was not created with OpenGL hints"
            )));
        }
        match self.host.current_gl() {
            Some((_, window)) if window == native => Ok(()),
            _ => Err(PalError::Precondition(format!(
                "no OpenGL context of {handle:?} is current; swap_buffers needs one ({BACKEND})"
            ))),
        }
    }
}
