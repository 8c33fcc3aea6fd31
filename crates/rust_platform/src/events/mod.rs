//! Platform event stream
//!
//! Backends translate native notifications into [`PlatformEvent`]s and push
//! them onto the toolkit's [`EventQueue`] while inside
//! `WindowComponent::process_events`. Delivery is a synchronous broadcast to
//! every subscriber, in FIFO order.
//!
//! Subscriber changes are allowed at any time, including from inside a
//! handler. Each dispatch batch works on a snapshot of the subscriber list:
//! a handler added during a batch first sees events of the next batch, and a
//! handler removed during a batch is not invoked again.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use crate::components::{ClipboardFormat, ThemeInfo, WindowMode};
use crate::foundation::handle::{DisplayHandle, JoystickHandle, PalHandle, WindowHandle};
use crate::foundation::logging::{pal_log, Logger};
use crate::foundation::math::{Vec2, Vector2i};
use crate::input::{Key, KeyModifiers, MouseButton, Scancode};

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformEventType {
    /// The user asked to close a window
    Close,
    /// Client area size changed
    WindowResize,
    /// Framebuffer size changed
    WindowFramebufferResize,
    /// Window moved
    WindowMove,
    /// Window gained or lost focus
    WindowFocus,
    /// Window mode changed (minimized, maximized, ...)
    WindowModeChange,
    /// Window content scale changed
    WindowScaleChange,
    /// Key pressed
    KeyDown,
    /// Key released
    KeyUp,
    /// Text typed
    TextInput,
    /// Mouse cursor moved
    MouseMove,
    /// Mouse button pressed
    MouseDown,
    /// Mouse button released
    MouseUp,
    /// Mouse wheel or trackpad scroll
    Scroll,
    /// Cursor entered or left a window
    MouseEnter,
    /// Files dropped on a window
    FileDrop,
    /// Display connected or disconnected
    DisplayConnection,
    /// Clipboard contents changed
    ClipboardUpdate,
    /// System theme changed
    ThemeChange,
    /// Joystick connected or disconnected
    JoystickConnection,
}

/// A translated native notification
///
/// Events are immutable once enqueued. A window-sourced event may outlive
/// its window: handlers must treat a handle destroyed earlier in the same
/// batch as inert.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The user asked to close `window`. The window stays alive until
    /// `WindowComponent::destroy` is called.
    Close {
        /// Source window
        window: WindowHandle,
    },
    /// Client area size changed
    WindowResize {
        /// Source window
        window: WindowHandle,
        /// New client size in screen coordinates
        client_size: Vector2i,
    },
    /// Framebuffer size changed
    WindowFramebufferResize {
        /// Source window
        window: WindowHandle,
        /// New framebuffer size in pixels
        framebuffer_size: Vector2i,
    },
    /// Window moved
    WindowMove {
        /// Source window
        window: WindowHandle,
        /// New position of the client area
        position: Vector2i,
    },
    /// Window focus changed
    WindowFocus {
        /// Source window
        window: WindowHandle,
        /// True when the window gained focus
        focused: bool,
    },
    /// Window mode changed
    WindowModeChange {
        /// Source window
        window: WindowHandle,
        /// The new mode
        mode: WindowMode,
    },
    /// Content scale changed, e.g. after moving to another display
    WindowScaleChange {
        /// Source window
        window: WindowHandle,
        /// New scale factors
        scale: Vec2,
    },
    /// Key pressed
    KeyDown {
        /// Source window
        window: WindowHandle,
        /// Virtual key
        key: Key,
        /// Physical key
        scancode: Scancode,
        /// Modifiers held
        modifiers: KeyModifiers,
        /// True for auto-repeat
        is_repeat: bool,
    },
    /// Key released
    KeyUp {
        /// Source window
        window: WindowHandle,
        /// Virtual key
        key: Key,
        /// Physical key
        scancode: Scancode,
        /// Modifiers held
        modifiers: KeyModifiers,
    },
    /// Text typed
    TextInput {
        /// Source window
        window: WindowHandle,
        /// The text
        text: String,
    },
    /// Mouse moved
    MouseMove {
        /// Source window
        window: WindowHandle,
        /// Client-relative cursor position
        position: Vec2,
    },
    /// Mouse button pressed
    MouseDown {
        /// Source window
        window: WindowHandle,
        /// The button
        button: MouseButton,
        /// Modifiers held
        modifiers: KeyModifiers,
    },
    /// Mouse button released
    MouseUp {
        /// Source window
        window: WindowHandle,
        /// The button
        button: MouseButton,
        /// Modifiers held
        modifiers: KeyModifiers,
    },
    /// Scroll input
    Scroll {
        /// Source window
        window: WindowHandle,
        /// Scroll delta in wheel steps
        delta: Vec2,
    },
    /// Cursor entered or left the window
    MouseEnter {
        /// Source window
        window: WindowHandle,
        /// True on enter
        entered: bool,
    },
    /// Files dropped on the window
    FileDrop {
        /// Source window
        window: WindowHandle,
        /// Dropped paths
        paths: Vec<PathBuf>,
    },
    /// A display was connected or disconnected
    DisplayConnection {
        /// Handle of the display when one is open for it
        display: Option<DisplayHandle>,
        /// Native name of the display
        name: String,
        /// True when connected
        connected: bool,
    },
    /// The clipboard changed
    ClipboardUpdate {
        /// Format of the new contents
        format: ClipboardFormat,
    },
    /// The preferred system theme changed
    ThemeChange {
        /// The new theme
        theme: ThemeInfo,
    },
    /// A joystick was connected or disconnected
    JoystickConnection {
        /// Joystick slot index
        index: usize,
        /// Handle of the joystick when one is open for the slot
        joystick: Option<JoystickHandle>,
        /// True when connected
        connected: bool,
    },
}

impl PlatformEvent {
    /// The type tag of this event
    pub fn kind(&self) -> PlatformEventType {
        match self {
            Self::Close { .. } => PlatformEventType::Close,
            Self::WindowResize { .. } => PlatformEventType::WindowResize,
            Self::WindowFramebufferResize { .. } => PlatformEventType::WindowFramebufferResize,
            Self::WindowMove { .. } => PlatformEventType::WindowMove,
            Self::WindowFocus { .. } => PlatformEventType::WindowFocus,
            Self::WindowModeChange { .. } => PlatformEventType::WindowModeChange,
            Self::WindowScaleChange { .. } => PlatformEventType::WindowScaleChange,
            Self::KeyDown { .. } => PlatformEventType::KeyDown,
            Self::KeyUp { .. } => PlatformEventType::KeyUp,
            Self::TextInput { .. } => PlatformEventType::TextInput,
            Self::MouseMove { .. } => PlatformEventType::MouseMove,
            Self::MouseDown { .. } => PlatformEventType::MouseDown,
            Self::MouseUp { .. } => PlatformEventType::MouseUp,
            Self::Scroll { .. } => PlatformEventType::Scroll,
            Self::MouseEnter { .. } => PlatformEventType::MouseEnter,
            Self::FileDrop { .. } => PlatformEventType::FileDrop,
            Self::DisplayConnection { .. } => PlatformEventType::DisplayConnection,
            Self::ClipboardUpdate { .. } => PlatformEventType::ClipboardUpdate,
            Self::ThemeChange { .. } => PlatformEventType::ThemeChange,
            Self::JoystickConnection { .. } => PlatformEventType::JoystickConnection,
        }
    }

    /// The window this event came from, if any
    pub fn window(&self) -> Option<WindowHandle> {
        match self {
            Self::Close { window }
            | Self::WindowResize { window, .. }
            | Self::WindowFramebufferResize { window, .. }
            | Self::WindowMove { window, .. }
            | Self::WindowFocus { window, .. }
            | Self::WindowModeChange { window, .. }
            | Self::WindowScaleChange { window, .. }
            | Self::KeyDown { window, .. }
            | Self::KeyUp { window, .. }
            | Self::TextInput { window, .. }
            | Self::MouseMove { window, .. }
            | Self::MouseDown { window, .. }
            | Self::MouseUp { window, .. }
            | Self::Scroll { window, .. }
            | Self::MouseEnter { window, .. }
            | Self::FileDrop { window, .. } => Some(*window),
            _ => None,
        }
    }

    /// The handle this event is about. Global events (clipboard, theme)
    /// have none.
    pub fn source(&self) -> Option<PalHandle> {
        match self {
            Self::DisplayConnection { display, .. } => display.map(PalHandle::from),
            Self::JoystickConnection { joystick, .. } => joystick.map(PalHandle::from),
            _ => self.window().map(PalHandle::from),
        }
    }
}

/// Identifies a subscription for [`EventQueue::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&PlatformEvent)>;

struct Subscriber {
    id: SubscriptionId,
    kinds: Option<Vec<PlatformEventType>>,
    handler: Handler,
}

impl Subscriber {
    fn wants(&self, kind: PlatformEventType) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }
}

/// Ordered, single-threaded platform event queue
pub struct EventQueue {
    pending: RefCell<VecDeque<PlatformEvent>>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
    undelivered: Cell<u64>,
    logger: RefCell<Logger>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: RefCell::new(VecDeque::new()),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            dispatching: Cell::new(false),
            undelivered: Cell::new(0),
            logger: RefCell::new(Logger::global().with_category("pal::events")),
        }
    }

    /// Replace the diagnostic sink
    pub fn set_logger(&self, logger: &Logger) {
        *self.logger.borrow_mut() = logger.with_category("pal::events");
    }

    /// Subscribe to every event
    pub fn subscribe(&self, handler: impl Fn(&PlatformEvent) + 'static) -> SubscriptionId {
        self.add_subscriber(None, Rc::new(handler))
    }

    /// Subscribe to events of the given kinds only
    pub fn subscribe_to(
        &self,
        kinds: &[PlatformEventType],
        handler: impl Fn(&PlatformEvent) + 'static,
    ) -> SubscriptionId {
        self.add_subscriber(Some(kinds.to_vec()), Rc::new(handler))
    }

    fn add_subscriber(&self, kinds: Option<Vec<PlatformEventType>>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push(Subscriber { id, kinds, handler });
        id
    }

    /// Remove a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        subscribers.len() != before
    }

    /// Remove every subscription
    pub fn clear_subscribers(&self) {
        self.subscribers.borrow_mut().clear();
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Append an event. Delivered by the next `dispatch_pending`.
    pub fn push(&self, event: PlatformEvent) {
        self.pending.borrow_mut().push_back(event);
    }

    /// Number of events waiting for delivery
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Events that were dispatched while nobody listened for their kind
    pub fn undelivered_count(&self) -> u64 {
        self.undelivered.get()
    }

    /// True while a dispatch batch is running
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    /// Deliver pending events in FIFO order. Returns the number of events
    /// taken off the queue.
    ///
    /// Called from inside a handler this does nothing: the running batch
    /// keeps delivering, including events pushed meanwhile. A panicking
    /// handler propagates out of this call; events after the one being
    /// delivered stay pending.
    pub fn dispatch_pending(&self) -> usize {
        if self.dispatching.get() {
            return 0;
        }
        let _guard = DispatchGuard::enter(&self.dispatching);

        let snapshot: Vec<(SubscriptionId, Option<Vec<PlatformEventType>>, Handler)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|s| (s.id, s.kinds.clone(), Rc::clone(&s.handler)))
            .collect();

        let mut delivered = 0;
        loop {
            let Some(event) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            delivered += 1;

            let kind = event.kind();
            let mut listeners = 0;
            for (id, kinds, handler) in &snapshot {
                if kinds.as_ref().is_some_and(|kinds| !kinds.contains(&kind)) {
                    continue;
                }
                if !self.is_subscribed(*id) {
                    continue;
                }
                listeners += 1;
                handler(&event);
            }

            if listeners == 0 {
                self.undelivered.set(self.undelivered.get() + 1);
                let logger = self.logger.borrow().clone();
                pal_log!(logger, Debug, "no subscriber for {:?} event", kind);
            }
        }
        delivered
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow().iter().any(|s| s.id == id)
    }

    /// Kinds with at least one interested subscriber
    pub fn is_observed(&self, kind: PlatformEventType) -> bool {
        self.subscribers.borrow().iter().any(|s| s.wants(kind))
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending_count())
            .field("subscribers", &self.subscriber_count())
            .field("dispatching", &self.dispatching.get())
            .finish()
    }
}

struct DispatchGuard<'a>(&'a Cell<bool>);

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::handle::{HandleMap, WindowKind};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn window() -> WindowHandle {
        let mut windows: HandleMap<WindowKind, ()> = HandleMap::new();
        windows.insert(())
    }

    fn recorder() -> (Rc<RefCell<Vec<PlatformEventType>>>, impl Fn(&PlatformEvent)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |event: &PlatformEvent| sink.borrow_mut().push(event.kind()))
    }

    #[test]
    fn test_fifo_broadcast() {
        let queue = EventQueue::new();
        let (first, first_handler) = recorder();
        let (second, second_handler) = recorder();
        queue.subscribe(first_handler);
        queue.subscribe(second_handler);

        let w = window();
        queue.push(PlatformEvent::WindowFocus { window: w, focused: true });
        queue.push(PlatformEvent::Close { window: w });

        assert_eq!(queue.dispatch_pending(), 2);
        let expected = vec![PlatformEventType::WindowFocus, PlatformEventType::Close];
        assert_eq!(*first.borrow(), expected);
        assert_eq!(*second.borrow(), expected);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_filtered_subscription() {
        let queue = EventQueue::new();
        let (seen, handler) = recorder();
        queue.subscribe_to(&[PlatformEventType::Close], handler);

        let w = window();
        queue.push(PlatformEvent::MouseEnter { window: w, entered: true });
        queue.push(PlatformEvent::Close { window: w });
        queue.dispatch_pending();

        assert_eq!(*seen.borrow(), vec![PlatformEventType::Close]);
        assert_eq!(queue.undelivered_count(), 1);
        assert!(queue.is_observed(PlatformEventType::Close));
        assert!(!queue.is_observed(PlatformEventType::KeyDown));
    }

    #[test]
    fn test_handler_added_during_batch_sees_next_batch() {
        let queue = Rc::new(EventQueue::new());
        let late = Rc::new(RefCell::new(0));

        let q = Rc::clone(&queue);
        let counter = Rc::clone(&late);
        let added = Rc::new(Cell::new(false));
        queue.subscribe(move |_| {
            if !added.replace(true) {
                let counter = Rc::clone(&counter);
                q.subscribe(move |_| *counter.borrow_mut() += 1);
            }
        });

        let w = window();
        queue.push(PlatformEvent::Close { window: w });
        queue.push(PlatformEvent::Close { window: w });
        queue.dispatch_pending();
        assert_eq!(*late.borrow(), 0);

        queue.push(PlatformEvent::Close { window: w });
        queue.dispatch_pending();
        assert_eq!(*late.borrow(), 1);
    }

    #[test]
    fn test_handler_removed_during_batch_is_not_invoked_again() {
        let queue = Rc::new(EventQueue::new());
        let (seen, handler) = recorder();
        let victim = Rc::new(Cell::new(None));

        let q = Rc::clone(&queue);
        let target = Rc::clone(&victim);
        queue.subscribe(move |_| {
            if let Some(id) = target.take() {
                assert!(q.unsubscribe(id));
            }
        });
        victim.set(Some(queue.subscribe(handler)));

        let w = window();
        queue.push(PlatformEvent::Close { window: w });
        queue.push(PlatformEvent::Close { window: w });
        queue.dispatch_pending();

        assert!(seen.borrow().is_empty());
        assert_eq!(queue.subscriber_count(), 1);
    }

    #[test]
    fn test_nested_dispatch_delivers_nothing_and_order_is_kept() {
        let queue = Rc::new(EventQueue::new());
        let order = Rc::new(RefCell::new(Vec::new()));
        let w = window();

        let q = Rc::clone(&queue);
        let log = Rc::clone(&order);
        queue.subscribe(move |event| {
            log.borrow_mut().push(event.kind());
            if event.kind() == PlatformEventType::Close {
                q.push(PlatformEvent::WindowFocus { window: w, focused: false });
                assert_eq!(q.dispatch_pending(), 0);
            }
        });

        queue.push(PlatformEvent::Close { window: w });
        queue.push(PlatformEvent::MouseEnter { window: w, entered: false });
        assert_eq!(queue.dispatch_pending(), 3);
        assert_eq!(
            *order.borrow(),
            vec![
                PlatformEventType::Close,
                PlatformEventType::MouseEnter,
                PlatformEventType::WindowFocus
            ]
        );
    }

    #[test]
    fn test_panicking_handler_leaves_rest_pending() {
        let queue = EventQueue::new();
        queue.subscribe(|event| {
            if event.kind() == PlatformEventType::Close {
                panic!("handler failure");
            }
        });

        let w = window();
        queue.push(PlatformEvent::Close { window: w });
        queue.push(PlatformEvent::TextInput { window: w, text: "a".into() });

        let result = catch_unwind(AssertUnwindSafe(|| queue.dispatch_pending()));
        assert!(result.is_err());
        assert!(!queue.is_dispatching());
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.dispatch_pending(), 1);
    }

    #[test]
    fn test_event_sources() {
        let w = window();
        let close = PlatformEvent::Close { window: w };
        assert_eq!(close.source(), Some(PalHandle::Window(w)));

        let clipboard = PlatformEvent::ClipboardUpdate {
            format: ClipboardFormat::Text,
        };
        assert_eq!(clipboard.source(), None);
        assert_eq!(clipboard.window(), None);

        let unplugged = PlatformEvent::DisplayConnection {
            display: None,
            name: "HDMI-1".into(),
            connected: false,
        };
        assert_eq!(unplugged.source(), None);
    }
}
