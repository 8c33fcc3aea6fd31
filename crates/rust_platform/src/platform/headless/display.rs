use std::cell::RefCell;
use std::rc::Rc;

use super::host::{HeadlessHost, NativeId, NativeKind, VirtualDisplay};
use super::simulated_failure;
use crate::components::{DisplayComponent, InitContext, PalComponents, VideoMode};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::{DisplayHandle, DisplayKind, HandleMap};
use crate::foundation::logging::pal_log;
use crate::foundation::math::{Box2i, Vec2, Vector2i};
use crate::platform::{delegate_component, ComponentCore};

const BITS_PER_PIXEL: u32 = 32;

struct DisplayRecord {
    display_id: u64,
    native: NativeId,
}

/// Virtual displays of the headless host
pub struct HeadlessDisplayComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    handles: RefCell<HandleMap<DisplayKind, DisplayRecord>>,
}

impl HeadlessDisplayComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessDisplayComponent", PalComponents::DISPLAY, "pal::display"),
            host,
            handles: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)?;
        pal_log!(
            self.core.logger(),
            Info,
            "{} virtual display(s) connected",
            self.host.display_count()
        );
        Ok(())
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for (_, record) in self.handles.borrow_mut().drain() {
            self.host.ledger().release_logged(record.native, &logger);
        }
    }

    fn open(&self, display: &VirtualDisplay) -> DisplayHandle {
        let native = self.host.ledger().allocate(NativeKind::DisplayRef);
        let handle = self.handles.borrow_mut().insert(DisplayRecord {
            display_id: display.id,
            native,
        });
        pal_log!(self.core.logger(), Debug, "opened {} as {:?}", display.config.name, handle);
        handle
    }

    /// The live display behind `handle`
    fn resolve(&self, handle: DisplayHandle) -> PalResult<VirtualDisplay> {
        let display_id = self.handles.borrow().lookup(handle)?.display_id;
        self.host
            .display_by_id(display_id)
            .ok_or_else(|| PalError::invalid_handle(handle))
    }

    /// An open handle for the host display `display_id`, if any
    pub(crate) fn handle_for(&self, display_id: u64) -> Option<DisplayHandle> {
        self.handles
            .borrow()
            .iter()
            .find(|(_, record)| record.display_id == display_id)
            .map(|(handle, _)| handle)
    }

    fn video_mode(display: &VirtualDisplay) -> VideoMode {
        VideoMode {
            width: display.config.width,
            height: display.config.height,
            refresh_rate: display.config.refresh_rate,
            bits_per_pixel: BITS_PER_PIXEL,
        }
    }
}

delegate_component!(HeadlessDisplayComponent);

impl DisplayComponent for HeadlessDisplayComponent {
    fn get_display_count(&self) -> PalResult<usize> {
        Ok(self.host.display_count())
    }

    fn create(&self, index: usize) -> PalResult<DisplayHandle> {
        let displays = self.host.displays();
        let display = displays.get(index).ok_or_else(|| {
            PalError::Precondition(format!(
                "display index {index} is out of range, {} display(s) connected",
                displays.len()
            ))
        })?;
        Ok(self.open(display))
    }

    fn create_primary(&self) -> PalResult<DisplayHandle> {
        let displays = self.host.displays();
        let primary = displays
            .iter()
            .find(|d| d.primary)
            .ok_or_else(|| PalError::Precondition("no display is connected".to_string()))?;
        Ok(self.open(primary))
    }

    fn destroy(&self, handle: DisplayHandle) -> PalResult<()> {
        if let Some(record) = self.handles.borrow_mut().remove(handle) {
            self.host.ledger().release(record.native)?;
        }
        Ok(())
    }

    fn get_name(&self, handle: DisplayHandle) -> PalResult<String> {
        Ok(self.resolve(handle)?.config.name)
    }

    fn is_primary(&self, handle: DisplayHandle) -> PalResult<bool> {
        Ok(self.resolve(handle)?.primary)
    }

    fn get_video_mode(&self, handle: DisplayHandle) -> PalResult<VideoMode> {
        Ok(Self::video_mode(&self.resolve(handle)?))
    }

    fn get_supported_video_modes(&self, handle: DisplayHandle) -> PalResult<Vec<VideoMode>> {
        let current = Self::video_mode(&self.resolve(handle)?);
        let mut modes: Vec<VideoMode> = [(640, 480), (800, 600), (1280, 720), (1920, 1080)]
            .into_iter()
            .filter(|&(w, h)| w <= current.width && h <= current.height)
            .map(|(width, height)| VideoMode {
                width,
                height,
                ..current
            })
            .collect();
        if !modes.contains(&current) {
            modes.push(current);
        }
        Ok(modes)
    }

    fn get_virtual_position(&self, handle: DisplayHandle) -> PalResult<Vector2i> {
        Ok(self.resolve(handle)?.position)
    }

    fn get_work_area(&self, handle: DisplayHandle) -> PalResult<Box2i> {
        Ok(self.resolve(handle)?.work_area())
    }

    fn get_display_scale(&self, handle: DisplayHandle) -> PalResult<Vec2> {
        Ok(self.resolve(handle)?.config.scale_vector())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PalComponent;
    use crate::core::config::{HeadlessOptions, ToolkitOptions, VirtualDisplayConfig};
    use crate::events::EventQueue;

    fn component(displays: Vec<VirtualDisplayConfig>) -> (Rc<HeadlessHost>, HeadlessDisplayComponent) {
        let host = HeadlessHost::new(HeadlessOptions::default().with_displays(displays)).unwrap();
        let component = HeadlessDisplayComponent::new(Rc::clone(&host));
        let options = ToolkitOptions::default();
        component
            .initialize(&InitContext {
                requested: PalComponents::DISPLAY,
                options: &options,
                events: Rc::new(EventQueue::new()),
            })
            .unwrap();
        (host, component)
    }

    #[test]
    fn test_every_index_opens_and_work_area_fits() {
        let (_host, displays) = component(vec![
            VirtualDisplayConfig::new("A", 1920, 1080),
            VirtualDisplayConfig::new("B", 2560, 1440).with_scale(1.25),
        ]);
        let count = displays.get_display_count().unwrap();
        assert_eq!(count, 2);
        for index in 0..count {
            let handle = displays.create(index).unwrap();
            let descriptor = displays.describe(handle).unwrap();
            assert!(descriptor.bounds().contains_box(&descriptor.work_area));
            assert!(descriptor.supported_modes.contains(&descriptor.video_mode));
        }
        assert!(matches!(displays.create(count), Err(PalError::Precondition(_))));
    }

    #[test]
    fn test_queries_are_live() {
        let (host, displays) = component(vec![
            VirtualDisplayConfig::new("A", 1920, 1080),
            VirtualDisplayConfig::new("B", 1920, 1080),
        ]);
        let second = displays.create(1).unwrap();
        assert_eq!(displays.get_name(second).unwrap(), "B");

        host.disconnect_display("B");
        assert!(matches!(
            displays.get_resolution(second),
            Err(PalError::InvalidHandle { .. })
        ));
        // Releasing a handle to an unplugged display still works
        displays.destroy(second).unwrap();
        displays.destroy(second).unwrap();
    }

    #[test]
    fn test_shutdown_releases_display_refs() {
        let (host, displays) = component(vec![VirtualDisplayConfig::new("A", 800, 600)]);
        displays.create_primary().unwrap();
        displays.create(0).unwrap();
        assert_eq!(host.ledger().live_of(NativeKind::DisplayRef), 2);

        displays.shutdown();
        assert_eq!(host.ledger().live_count(), 0);
    }
}
