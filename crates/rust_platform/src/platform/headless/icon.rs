use std::cell::RefCell;
use std::rc::Rc;

use super::host::{HeadlessHost, NativeId, NativeKind};
use super::simulated_failure;
use crate::components::cursor::check_rgba;
use crate::components::{IconComponent, InitContext, PalComponents};
use crate::error::PalResult;
use crate::foundation::handle::{HandleMap, IconHandle, IconKind};
use crate::foundation::logging::pal_log;
use crate::foundation::math::Vector2i;
use crate::platform::{delegate_component, ComponentCore};

struct IconRecord {
    native: NativeId,
    size: Vector2i,
}

/// In-memory window icons
pub struct HeadlessIconComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    icons: RefCell<HandleMap<IconKind, IconRecord>>,
}

impl HeadlessIconComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessIconComponent", PalComponents::ICON, "pal::icon"),
            host,
            icons: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for (_, record) in self.icons.borrow_mut().drain() {
            self.host.ledger().release_logged(record.native, &logger);
        }
    }

    /// Fails unless `handle` is a live icon of this component
    pub(crate) fn validate(&self, handle: IconHandle) -> PalResult<()> {
        self.icons.borrow().lookup(handle).map(|_| ())
    }
}

delegate_component!(HeadlessIconComponent);

impl IconComponent for HeadlessIconComponent {
    fn create_from_pixels(&self, width: u32, height: u32, rgba: &[u8]) -> PalResult<IconHandle> {
        check_rgba(width, height, rgba)?;
        let size = Vector2i::new(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );
        let native = self.host.ledger().allocate(NativeKind::Icon);
        let handle = self.icons.borrow_mut().insert(IconRecord { native, size });
        pal_log!(self.core.logger(), Debug, "created {width}x{height} icon {handle:?}");
        Ok(handle)
    }

    fn destroy(&self, handle: IconHandle) -> PalResult<()> {
        if let Some(record) = self.icons.borrow_mut().remove(handle) {
            self.host.ledger().release(record.native)?;
        }
        Ok(())
    }

    fn get_size(&self, handle: IconHandle) -> PalResult<Vector2i> {
        Ok(self.icons.borrow().lookup(handle)?.size)
    }
}
