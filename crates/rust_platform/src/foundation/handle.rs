//! Capability-tagged opaque handles
//!
//! Every native resource the platform layer hands out is referenced by a
//! [`Handle<K>`], where `K` names the capability that issued it. Two handle
//! kinds are never interchangeable, even though both wrap the same
//! generational slot-map key:
//!
//! ```compile_fail
//! use rust_platform::foundation::handle::{DisplayHandle, WindowHandle};
//!
//! fn query(_display: DisplayHandle) {}
//!
//! fn misuse(window: WindowHandle) {
//!     query(window);
//! }
//! ```
//!
//! Applications cannot mint handles either; only a capability's
//! [`HandleMap`] can:
//!
//! ```compile_fail
//! use rust_platform::foundation::handle::WindowHandle;
//!
//! let forged: WindowHandle = Default::default();
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use slotmap::{DefaultKey, Key, SlotMap};

use crate::components::PalComponents;
use crate::error::{PalError, PalResult};

/// Marker trait implemented by the zero-sized handle kind types
pub trait HandleKind: 'static {
    /// Human readable handle type name, used in diagnostics
    const NAME: &'static str;
    /// The capability that issues handles of this kind
    const COMPONENT: PalComponents;
}

/// Opaque identifier of a native resource owned by one capability
pub struct Handle<K: HandleKind> {
    key: DefaultKey,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind> Handle<K> {
    pub(crate) fn from_key(key: DefaultKey) -> Self {
        Self {
            key,
            _kind: PhantomData,
        }
    }

    pub(crate) fn key(self) -> DefaultKey {
        self.key
    }
}

impl<K: HandleKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: HandleKind> Copy for Handle<K> {}

impl<K: HandleKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: HandleKind> Eq for Handle<K> {}

impl<K: HandleKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::NAME, self.key.data())
    }
}

macro_rules! handle_kinds {
    ($($(#[$doc:meta])* $kind:ident => $alias:ident, $name:literal, $component:ident;)*) => {
        $(
            #[doc = concat!("Handle kind tag for [`", stringify!($alias), "`]")]
            #[derive(Debug)]
            pub enum $kind {}

            impl HandleKind for $kind {
                const NAME: &'static str = $name;
                const COMPONENT: PalComponents = PalComponents::$component;
            }

            $(#[$doc])*
            pub type $alias = Handle<$kind>;
        )*
    };
}

handle_kinds! {
    /// A window created by the window component
    WindowKind => WindowHandle, "WindowHandle", WINDOW;
    /// A display (monitor) opened by the display component
    DisplayKind => DisplayHandle, "DisplayHandle", DISPLAY;
    /// An OpenGL context bound to one window
    OpenGLContextKind => OpenGLContextHandle, "OpenGLContextHandle", OPENGL;
    /// A non-window drawing surface
    SurfaceKind => SurfaceHandle, "SurfaceHandle", SURFACE;
    /// A mouse cursor image
    CursorKind => CursorHandle, "CursorHandle", CURSOR;
    /// A window icon image
    IconKind => IconHandle, "IconHandle", ICON;
    /// An opened joystick or gamepad
    JoystickKind => JoystickHandle, "JoystickHandle", JOYSTICK;
}

/// Any handle, tagged with its kind. Used where the source of something can
/// be more than one capability, e.g. the source of a platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PalHandle {
    /// A window
    Window(WindowHandle),
    /// A display
    Display(DisplayHandle),
    /// An OpenGL context
    OpenGLContext(OpenGLContextHandle),
    /// A surface
    Surface(SurfaceHandle),
    /// A cursor
    Cursor(CursorHandle),
    /// An icon
    Icon(IconHandle),
    /// A joystick
    Joystick(JoystickHandle),
}

impl PalHandle {
    /// The capability that issued the wrapped handle
    pub fn component(&self) -> PalComponents {
        match self {
            Self::Window(_) => WindowKind::COMPONENT,
            Self::Display(_) => DisplayKind::COMPONENT,
            Self::OpenGLContext(_) => OpenGLContextKind::COMPONENT,
            Self::Surface(_) => SurfaceKind::COMPONENT,
            Self::Cursor(_) => CursorKind::COMPONENT,
            Self::Icon(_) => IconKind::COMPONENT,
            Self::Joystick(_) => JoystickKind::COMPONENT,
        }
    }

    /// The wrapped window handle, if this is one
    pub fn as_window(&self) -> Option<WindowHandle> {
        match self {
            Self::Window(handle) => Some(*handle),
            _ => None,
        }
    }
}

macro_rules! pal_handle_from {
    ($($variant:ident($alias:ident)),* $(,)?) => {
        $(
            impl From<$alias> for PalHandle {
                fn from(handle: $alias) -> Self {
                    Self::$variant(handle)
                }
            }
        )*
    };
}

pal_handle_from!(
    Window(WindowHandle),
    Display(DisplayHandle),
    OpenGLContext(OpenGLContextHandle),
    Surface(SurfaceHandle),
    Cursor(CursorHandle),
    Icon(IconHandle),
    Joystick(JoystickHandle),
);

/// Handle-keyed storage for the native records of one capability.
///
/// Keys are generational: once a record is removed, every copy of its
/// handle stays invalid even if the slot is reused.
pub(crate) struct HandleMap<K: HandleKind, T> {
    slots: SlotMap<DefaultKey, T>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind, T> HandleMap<K, T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::new(),
            _kind: PhantomData,
        }
    }

    /// Store a record and mint the handle that refers to it
    pub fn insert(&mut self, value: T) -> Handle<K> {
        Handle::from_key(self.slots.insert(value))
    }

    pub fn contains(&self, handle: Handle<K>) -> bool {
        self.slots.contains_key(handle.key())
    }

    pub fn get(&self, handle: Handle<K>) -> Option<&T> {
        self.slots.get(handle.key())
    }

    pub fn get_mut(&mut self, handle: Handle<K>) -> Option<&mut T> {
        self.slots.get_mut(handle.key())
    }

    /// Like `get`, but a missing record is an invalid-handle error
    pub fn lookup(&self, handle: Handle<K>) -> PalResult<&T> {
        self.get(handle).ok_or_else(|| PalError::invalid_handle(handle))
    }

    /// Like `get_mut`, but a missing record is an invalid-handle error
    pub fn lookup_mut(&mut self, handle: Handle<K>) -> PalResult<&mut T> {
        self.slots
            .get_mut(handle.key())
            .ok_or_else(|| PalError::invalid_handle(handle))
    }

    pub fn remove(&mut self, handle: Handle<K>) -> Option<T> {
        self.slots.remove(handle.key())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<K>, &T)> + '_ {
        self.slots.iter().map(|(key, value)| (Handle::from_key(key), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<K>, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .map(|(key, value)| (Handle::from_key(key), value))
    }

    /// Remove every record, returning them with their (now invalid) handles
    pub fn drain(&mut self) -> Vec<(Handle<K>, T)> {
        self.slots
            .drain()
            .map(|(key, value)| (Handle::from_key(key), value))
            .collect()
    }
}

impl<K: HandleKind, T> Default for HandleMap<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_handle_stays_invalid_after_slot_reuse() {
        let mut windows: HandleMap<WindowKind, &str> = HandleMap::new();
        let first = windows.insert("first");
        assert_eq!(windows.remove(first), Some("first"));

        // The slot is reused, but the generation differs
        let second = windows.insert("second");
        assert_ne!(first, second);
        assert!(!windows.contains(first));
        assert_eq!(windows.get(second), Some(&"second"));
    }

    #[test]
    fn test_lookup_reports_invalid_handle() {
        let mut icons: HandleMap<IconKind, u32> = HandleMap::new();
        let icon = icons.insert(7);
        icons.remove(icon);

        let err = icons.lookup(icon).unwrap_err();
        assert!(matches!(err, PalError::InvalidHandle { kind: "IconHandle", .. }));
    }

    #[test]
    fn test_pal_handle_reports_issuing_component() {
        let mut displays: HandleMap<DisplayKind, ()> = HandleMap::new();
        let display = displays.insert(());
        let tagged = PalHandle::from(display);

        assert_eq!(tagged.component(), PalComponents::DISPLAY);
        assert_eq!(tagged.as_window(), None);
        assert!(format!("{display:?}").starts_with("DisplayHandle("));
    }

    #[test]
    fn test_drain_empties_map() {
        let mut cursors: HandleMap<CursorKind, u8> = HandleMap::new();
        let a = cursors.insert(1);
        let b = cursors.insert(2);

        let drained = cursors.drain();
        assert_eq!(drained.len(), 2);
        assert!(cursors.is_empty());
        assert!(!cursors.contains(a) && !cursors.contains(b));
    }
}
