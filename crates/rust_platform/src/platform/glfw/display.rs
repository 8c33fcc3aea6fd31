use std::cell::RefCell;
use std::rc::Rc;

use super::{GlfwShared, BACKEND};
use crate::components::{DisplayComponent, InitContext, PalComponents, VideoMode};
use crate::error::{PalError, PalResult};
use crate::events::{EventQueue, PlatformEvent};
use crate::foundation::handle::{DisplayHandle, DisplayKind, HandleMap};
use crate::foundation::logging::pal_log;
use crate::foundation::math::{Box2i, Vec2, Vector2i};
use crate::platform::{delegate_component, ComponentCore};

/// What one `glfw::Monitor` reported
#[derive(Debug, Clone)]
pub(crate) struct MonitorInfo {
    pub name: String,
    pub position: Vector2i,
    pub work_area: Box2i,
    pub video_mode: VideoMode,
    pub modes: Vec<VideoMode>,
    pub scale: Vec2,
}

impl MonitorInfo {
    fn read(index: usize, monitor: &glfw::Monitor) -> Self {
        let (x, y) = monitor.get_pos();
        let (wx, wy, ww, wh) = monitor.get_workarea();
        let modes: Vec<VideoMode> = monitor.get_video_modes().iter().map(convert_mode).collect();
        let video_mode = monitor
            .get_video_mode()
            .map(|mode| convert_mode(&mode))
            .or_else(|| modes.last().copied())
            .unwrap_or(VideoMode {
                width: 0,
                height: 0,
                refresh_rate: 0,
                bits_per_pixel: 0,
            });
        let (sx, sy) = monitor.get_content_scale();
        Self {
            name: monitor.get_name().unwrap_or_else(|| format!("Monitor {index}")),
            position: Vector2i::new(x, y),
            work_area: Box2i::from_position_size(Vector2i::new(wx, wy), Vector2i::new(ww, wh)),
            video_mode,
            modes,
            scale: Vec2::new(sx, sy),
        }
    }

    pub fn bounds(&self) -> Box2i {
        Box2i::from_position_size(self.position, self.video_mode.resolution())
    }
}

fn convert_mode(mode: &glfw::VidMode) -> VideoMode {
    VideoMode {
        width: i32::try_from(mode.width).unwrap_or(i32::MAX),
        height: i32::try_from(mode.height).unwrap_or(i32::MAX),
        refresh_rate: mode.refresh_rate,
        bits_per_pixel: mode.red_bits + mode.green_bits + mode.blue_bits,
    }
}

/// Monitors as GLFW reports them. GLFW lists the primary monitor first.
pub struct GlfwDisplayComponent {
    core: ComponentCore,
    shared: Rc<GlfwShared>,
    handles: RefCell<HandleMap<DisplayKind, String>>,
    connected: RefCell<Vec<String>>,
}

impl GlfwDisplayComponent {
    pub(crate) fn new(shared: Rc<GlfwShared>) -> Self {
        Self {
            core: ComponentCore::new("GlfwDisplayComponent", PalComponents::DISPLAY, "pal::display"),
            shared,
            handles: RefCell::new(HandleMap::new()),
            connected: RefCell::new(Vec::new()),
        }
    }

    fn prepare(&self, _context: &InitContext<'_>) -> PalResult<()> {
        let names: Vec<String> = self.monitors().into_iter().map(|m| m.name).collect();
        pal_log!(self.core.logger(), Info, "{} monitor(s) connected", names.len());
        *self.connected.borrow_mut() = names;
        Ok(())
    }

    fn release_all(&self) {
        self.handles.borrow_mut().drain();
    }

    pub(crate) fn monitors(&self) -> Vec<MonitorInfo> {
        self.shared.glfw().with_connected_monitors(|_, monitors| {
            monitors
                .iter()
                .enumerate()
                .map(|(index, monitor)| MonitorInfo::read(index, monitor))
                .collect()
        })
    }

    /// The monitor containing `point`, or the primary one
    pub(crate) fn monitor_at(&self, point: Vector2i) -> Option<MonitorInfo> {
        let monitors = self.monitors();
        monitors
            .iter()
            .find(|m| m.bounds().contains_box(&Box2i::new(point, point)))
            .or_else(|| monitors.first())
            .cloned()
    }

    fn resolve(&self, handle: DisplayHandle) -> PalResult<(MonitorInfo, bool)> {
        let name = self.handles.borrow().lookup(handle)?.clone();
        self.monitors()
            .into_iter()
            .enumerate()
            .find(|(_, monitor)| monitor.name == name)
            .map(|(index, monitor)| (monitor, index == 0))
            .ok_or_else(|| PalError::invalid_handle(handle))
    }

    fn handle_for(&self, name: &str) -> Option<DisplayHandle> {
        self.handles
            .borrow()
            .iter()
            .find(|(_, record)| record.as_str() == name)
            .map(|(handle, _)| handle)
    }

    /// Compare connected monitors with the last poll and queue connection events
    pub(crate) fn poll_connections(&self, queue: &EventQueue) {
        let now: Vec<String> = self.monitors().into_iter().map(|m| m.name).collect();
        let before = self.connected.replace(now.clone());
        for name in before.iter().filter(|name| !now.contains(name)) {
            pal_log!(self.core.logger(), Info, "monitor {name} disconnected");
            queue.push(PlatformEvent::DisplayConnection {
                display: self.handle_for(name),
                name: name.clone(),
                connected: false,
            });
        }
        for name in now.iter().filter(|name| !before.contains(name)) {
            pal_log!(self.core.logger(), Info, "monitor {name} connected");
            queue.push(PlatformEvent::DisplayConnection {
                display: None,
                name: name.clone(),
                connected: true,
            });
        }
    }
}

delegate_component!(GlfwDisplayComponent);

impl DisplayComponent for GlfwDisplayComponent {
    fn get_display_count(&self) -> PalResult<usize> {
        Ok(self.monitors().len())
    }

    fn create(&self, index: usize) -> PalResult<DisplayHandle> {
        let monitors = self.monitors();
        let monitor = monitors.get(index).ok_or_else(|| {
            PalError::Precondition(format!(
                "display index {index} is out of range, {} monitor(s) connected",
                monitors.len()
            ))
        })?;
        Ok(self.handles.borrow_mut().insert(monitor.name.clone()))
    }

    fn create_primary(&self) -> PalResult<DisplayHandle> {
        if self.monitors().is_empty() {
            return Err(PalError::native(BACKEND, "no monitor is connected"));
        }
        self.create(0)
    }

    fn destroy(&self, handle: DisplayHandle) -> PalResult<()> {
        self.handles.borrow_mut().remove(handle);
        Ok(())
    }

    fn get_name(&self, handle: DisplayHandle) -> PalResult<String> {
        Ok(self.resolve(handle)?.0.name)
    }

    fn is_primary(&self, handle: DisplayHandle) -> PalResult<bool> {
        Ok(self.resolve(handle)?.1)
    }

    fn get_video_mode(&self, handle: DisplayHandle) -> PalResult<VideoMode> {
        Ok(self.resolve(handle)?.0.video_mode)
    }

    fn get_supported_video_modes(&self, handle: DisplayHandle) -> PalResult<Vec<VideoMode>> {
        Ok(self.resolve(handle)?.0.modes)
    }

    fn get_virtual_position(&self, handle: DisplayHandle) -> PalResult<Vector2i> {
        Ok(self.resolve(handle)?.0.position)
    }

    fn get_work_area(&self, handle: DisplayHandle) -> PalResult<Box2i> {
        let monitor = self.resolve(handle)?.0;
        Ok(monitor.work_area.clamped_to(&monitor.bounds()))
    }

    fn get_display_scale(&self, handle: DisplayHandle) -> PalResult<Vec2> {
        Ok(self.resolve(handle)?.0.scale)
    }
}
