use std::cell::RefCell;
use std::rc::Rc;

use super::host::{HeadlessHost, NativeId, NativeKind};
use super::simulated_failure;
use crate::components::cursor::check_rgba;
use crate::components::{CursorComponent, InitContext, PalComponents, SystemCursorType};
use crate::error::{PalError, PalResult};
use crate::foundation::handle::{CursorHandle, CursorKind, HandleMap};
use crate::foundation::logging::pal_log;
use crate::foundation::math::Vector2i;
use crate::platform::{delegate_component, ComponentCore};

/// Nominal size reported for system cursors
const SYSTEM_CURSOR_SIZE: i32 = 32;

struct CursorRecord {
    native: NativeId,
    system: Option<SystemCursorType>,
    size: Vector2i,
    hotspot: Vector2i,
}

/// In-memory cursor images
pub struct HeadlessCursorComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
    cursors: RefCell<HandleMap<CursorKind, CursorRecord>>,
}

impl HeadlessCursorComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessCursorComponent", PalComponents::CURSOR, "pal::cursor"),
            host,
            cursors: RefCell::new(HandleMap::new()),
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        let logger = self.core.logger();
        for (_, record) in self.cursors.borrow_mut().drain() {
            self.host.ledger().release_logged(record.native, &logger);
        }
    }

    /// Fails unless `handle` is a live cursor of this component
    pub(crate) fn validate(&self, handle: CursorHandle) -> PalResult<()> {
        self.cursors.borrow().lookup(handle).map(|_| ())
    }

    /// Hotspot of a cursor
    pub fn get_hotspot(&self, handle: CursorHandle) -> PalResult<Vector2i> {
        Ok(self.cursors.borrow().lookup(handle)?.hotspot)
    }

    fn insert(&self, record: CursorRecord) -> CursorHandle {
        self.cursors.borrow_mut().insert(record)
    }
}

delegate_component!(HeadlessCursorComponent);

impl CursorComponent for HeadlessCursorComponent {
    fn create_standard(&self, kind: SystemCursorType) -> PalResult<CursorHandle> {
        let native = self.host.ledger().allocate(NativeKind::Cursor);
        let handle = self.insert(CursorRecord {
            native,
            system: Some(kind),
            size: Vector2i::new(SYSTEM_CURSOR_SIZE, SYSTEM_CURSOR_SIZE),
            hotspot: Vector2i::zeros(),
        });
        pal_log!(self.core.logger(), Debug, "created system cursor {kind:?} as {handle:?}");
        Ok(handle)
    }

    fn create_from_pixels(
        &self,
        width: u32,
        height: u32,
        rgba: &[u8],
        hotspot: Vector2i,
    ) -> PalResult<CursorHandle> {
        check_rgba(width, height, rgba)?;
        let size = Vector2i::new(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );
        if hotspot.x < 0 || hotspot.y < 0 || hotspot.x >= size.x || hotspot.y >= size.y {
            return Err(PalError::Precondition(format!(
                "hotspot ({}, {}) lies outside the {width}x{height} image",
                hotspot.x, hotspot.y
            )));
        }
        let native = self.host.ledger().allocate(NativeKind::Cursor);
        Ok(self.insert(CursorRecord {
            native,
            system: None,
            size,
            hotspot,
        }))
    }

    fn destroy(&self, handle: CursorHandle) -> PalResult<()> {
        if let Some(record) = self.cursors.borrow_mut().remove(handle) {
            self.host.ledger().release(record.native)?;
        }
        Ok(())
    }

    fn is_system_cursor(&self, handle: CursorHandle) -> PalResult<bool> {
        Ok(self.cursors.borrow().lookup(handle)?.system.is_some())
    }

    fn get_size(&self, handle: CursorHandle) -> PalResult<Vector2i> {
        Ok(self.cursors.borrow().lookup(handle)?.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::HeadlessOptions;

    #[test]
    fn test_cursor_lifecycle() {
        let host = HeadlessHost::new(HeadlessOptions::default()).unwrap();
        let cursors = HeadlessCursorComponent::new(Rc::clone(&host));

        let beam = cursors.create_standard(SystemCursorType::TextBeam).unwrap();
        let custom = cursors
            .create_from_pixels(2, 2, &[255; 16], Vector2i::new(1, 1))
            .unwrap();
        assert!(cursors.is_system_cursor(beam).unwrap());
        assert!(!cursors.is_system_cursor(custom).unwrap());
        assert_eq!(cursors.get_size(custom).unwrap(), Vector2i::new(2, 2));
        assert_eq!(cursors.get_hotspot(custom).unwrap(), Vector2i::new(1, 1));

        assert!(cursors
            .create_from_pixels(2, 2, &[255; 16], Vector2i::new(2, 0))
            .is_err());

        cursors.destroy(beam).unwrap();
        cursors.destroy(beam).unwrap();
        assert!(cursors.get_size(beam).is_err());
        assert_eq!(host.ledger().live_of(NativeKind::Cursor), 1);
    }
}
