use std::cell::RefCell;
use std::rc::Rc;

use super::display::HeadlessDisplayComponent;
use super::host::{HeadlessHost, NativeId, NativeKind};
use super::simulated_failure;
use crate::components::{DisplayComponent, InitContext, PalComponents, SurfaceComponent, SurfaceType};
use crate::error::PalResult;
use crate::foundation::handle::{DisplayHandle, HandleMap, SurfaceHandle, SurfaceKind};
use crate::foundation::math::Vector2i;
use crate::platform::{delegate_component, ComponentCore};

struct SurfaceRecord {
    native: NativeId,
    kind: SurfaceType,
    display: Option<DisplayHandle>,
}

/// Surfaces sized by the display they are shown on
pub struct HeadlessSurfaceComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    displays: Rc<HeadlessDisplayComponent>,
    surfaces: RefCell<HandleMap<SurfaceKind, SurfaceRecord>>,
}

impl HeadlessSurfaceComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>, displays: Rc<HeadlessDisplayComponent>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessSurfaceComponent", PalComponents::SURFACE, "pal::surface"),
            host,
            displays,
            surfaces: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for (_, record) in self.surfaces.borrow_mut().drain() {
            self.host.ledger().release_logged(record.native, &logger);
        }
    }
}

delegate_component!(HeadlessSurfaceComponent);

impl SurfaceComponent for HeadlessSurfaceComponent {
    fn create(&self, kind: SurfaceType) -> PalResult<SurfaceHandle> {
        let native = self.host.ledger().allocate(NativeKind::Surface);
        Ok(self.surfaces.borrow_mut().insert(SurfaceRecord {
            native,
            kind,
            display: None,
        }))
    }

    fn destroy(&self, handle: SurfaceHandle) -> PalResult<()> {
        if let Some(record) = self.surfaces.borrow_mut().remove(handle) {
            self.host.ledger().release(record.native)?;
        }
        Ok(())
    }

    fn get_kind(&self, handle: SurfaceHandle) -> PalResult<SurfaceType> {
        Ok(self.surfaces.borrow().lookup(handle)?.kind)
    }

    fn get_display(&self, handle: SurfaceHandle) -> PalResult<Option<DisplayHandle>> {
        Ok(self.surfaces.borrow().lookup(handle)?.display)
    }

    fn set_display(&self, handle: SurfaceHandle, display: DisplayHandle) -> PalResult<()> {
        self.displays.get_video_mode(display)?;
        self.surfaces.borrow_mut().lookup_mut(handle)?.display = Some(display);
        Ok(())
    }

    /// The resolution of the surface's display; zero while it has none
    fn get_client_size(&self, handle: SurfaceHandle) -> PalResult<Vector2i> {
        match self.get_display(handle)? {
            Some(display) => self.displays.get_resolution(display),
            None => Ok(Vector2i::zeros()),
        }
    }
}
