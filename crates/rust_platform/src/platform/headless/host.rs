//! Simulated native platform behind the headless components
//!
//! The host plays the role of the operating system: it owns the virtual
//! displays, input devices, clipboard and theme, hands out native resource
//! ids through the [`NativeLedger`], and receives native messages over a
//! channel that any thread may post to.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;

use crate::components::{MessageBoxButton, ThemeInfo};
use crate::core::config::{HeadlessOptions, VirtualDisplayConfig, VirtualJoystickConfig};
use crate::error::{PalError, PalResult};
use crate::events::PlatformEvent;
use crate::foundation::handle::WindowHandle;
use crate::foundation::logging::{pal_log, Logger};
use crate::foundation::math::{Box2i, Vec2, Vector2i};
use crate::input::{Key, KeyModifiers, MouseButton, MouseButtonFlags, Scancode};

pub(crate) const BACKEND: &str = "headless";

/// A message as the simulated OS would deliver it to the application
#[derive(Debug, Clone)]
pub enum HeadlessMessage {
    /// The user clicked the close button
    Close(WindowHandle),
    /// The user resized the window
    Resize(WindowHandle, Vector2i),
    /// The user moved the window
    Move(WindowHandle, Vector2i),
    /// The window gained or lost focus
    Focus(WindowHandle, bool),
    /// A key changed state
    Key {
        /// Focused window
        window: WindowHandle,
        /// The key
        key: Key,
        /// True on press
        pressed: bool,
        /// True for auto-repeat
        repeat: bool,
    },
    /// Text was typed
    Text(WindowHandle, String),
    /// The cursor moved to a client-relative position
    MouseMove(WindowHandle, Vec2),
    /// A mouse button changed state
    MouseButton {
        /// Window under the cursor
        window: WindowHandle,
        /// The button
        button: MouseButton,
        /// True on press
        pressed: bool,
    },
    /// Scroll wheel moved
    Scroll(WindowHandle, Vec2),
    /// The cursor entered or left the window
    MouseEnter(WindowHandle, bool),
    /// Files were dropped on the window
    FileDrop(WindowHandle, Vec<PathBuf>),
    /// A display was plugged in
    DisplayConnected(VirtualDisplayConfig),
    /// The display with this name was unplugged
    DisplayDisconnected(String),
    /// A joystick was plugged into a slot
    JoystickConnected(usize, VirtualJoystickConfig),
    /// The joystick in a slot was unplugged
    JoystickDisconnected(usize),
    /// A joystick axis moved
    JoystickAxis {
        /// Slot index
        slot: usize,
        /// Axis index
        axis: usize,
        /// New value
        value: f32,
    },
    /// A joystick button changed state
    JoystickButton {
        /// Slot index
        slot: usize,
        /// Button index
        button: usize,
        /// True while held
        pressed: bool,
    },
    /// Another application put text on the clipboard
    ClipboardChanged(String),
    /// The system theme changed
    ThemeChanged(ThemeInfo),
    /// Ends a blocking wait without producing an event
    Wake,
}

/// Posts native messages to a [`HeadlessHost`] from any thread
#[derive(Debug, Clone)]
pub struct HeadlessSender(mpsc::Sender<HeadlessMessage>);

impl HeadlessSender {
    /// Post a message. Fails once the host is gone.
    pub fn send(&self, message: HeadlessMessage) -> PalResult<()> {
        self.0
            .send(message)
            .map_err(|_| PalError::native(BACKEND, "the headless host has been dropped"))
    }

    /// End a blocking `process_events` without producing an event
    pub fn wake(&self) -> PalResult<()> {
        self.send(HeadlessMessage::Wake)
    }
}

/// Kind of a simulated native resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeKind {
    /// A top-level window
    Window,
    /// An OpenGL context
    GlContext,
    /// A Vulkan surface
    VulkanSurface,
    /// A non-window surface
    Surface,
    /// A reference to a display
    DisplayRef,
    /// A cursor image
    Cursor,
    /// An icon image
    Icon,
    /// An opened joystick
    Joystick,
}

/// Id of a simulated native resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u64);

/// Books every native resource the headless backend allocates
#[derive(Default)]
pub struct NativeLedger {
    next: Cell<u64>,
    live: RefCell<BTreeMap<NativeId, NativeKind>>,
    allocated: Cell<u64>,
}

impl NativeLedger {
    pub(crate) fn allocate(&self, kind: NativeKind) -> NativeId {
        let id = NativeId(self.next.get() + 1);
        self.next.set(id.0);
        self.allocated.set(self.allocated.get() + 1);
        self.live.borrow_mut().insert(id, kind);
        id
    }

    pub(crate) fn release(&self, id: NativeId) -> PalResult<()> {
        match self.live.borrow_mut().remove(&id) {
            Some(_) => Ok(()),
            None => Err(PalError::Native {
                backend: BACKEND,
                code: i64::try_from(id.0).ok(),
                message: "native resource released twice".to_string(),
            }),
        }
    }

    /// Release `id` during teardown, where a failure can only be reported
    pub(crate) fn release_logged(&self, id: NativeId, logger: &Logger) {
        if let Err(error) = self.release(id) {
            pal_log!(logger, Warn, "teardown: {error}");
        }
    }

    /// Resources allocated and not yet released
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    /// Live resources of one kind
    pub fn live_of(&self, kind: NativeKind) -> usize {
        self.live.borrow().values().filter(|k| **k == kind).count()
    }

    /// Resources allocated since startup
    pub fn total_allocated(&self) -> u64 {
        self.allocated.get()
    }

    /// True if `id` is allocated
    pub fn is_live(&self, id: NativeId) -> bool {
        self.live.borrow().contains_key(&id)
    }
}

impl fmt::Debug for NativeLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLedger")
            .field("live", &*self.live.borrow())
            .field("allocated", &self.allocated.get())
            .finish()
    }
}

/// A connected virtual display
#[derive(Debug, Clone)]
pub(crate) struct VirtualDisplay {
    pub id: u64,
    pub config: VirtualDisplayConfig,
    pub position: Vector2i,
    pub primary: bool,
}

impl VirtualDisplay {
    pub fn bounds(&self) -> Box2i {
        self.config.bounds_at(self.position)
    }

    pub fn work_area(&self) -> Box2i {
        self.config.work_area_at(self.position)
    }
}

/// A device plugged into a joystick slot
#[derive(Debug, Clone)]
pub(crate) struct JoystickDevice {
    pub config: VirtualJoystickConfig,
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

impl JoystickDevice {
    fn new(config: VirtualJoystickConfig) -> Self {
        Self {
            axes: vec![0.0; config.axes],
            buttons: vec![false; config.buttons],
            config,
        }
    }
}

/// Simulated keyboard and mouse state
#[derive(Debug)]
pub(crate) struct InputState {
    pub pressed: BTreeSet<Scancode>,
    pub modifiers: KeyModifiers,
    pub cursor: Vector2i,
    pub buttons: MouseButtonFlags,
    pub scroll: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pressed: BTreeSet::new(),
            modifiers: KeyModifiers::empty(),
            cursor: Vector2i::zeros(),
            buttons: MouseButtonFlags::empty(),
            scroll: Vec2::zeros(),
        }
    }
}

impl InputState {
    pub fn key(&mut self, key: Key, pressed: bool) -> Scancode {
        let scancode = key.us_scancode();
        if pressed {
            self.pressed.insert(scancode);
        } else {
            self.pressed.remove(&scancode);
        }
        let modifier = key.modifier();
        if !modifier.is_empty() {
            let held = self
                .pressed
                .iter()
                .any(|code| Key::from_us_scancode(*code).modifier() == modifier);
            self.modifiers.set(modifier, held);
        }
        scancode
    }
}

/// Answer the headless dialog component gives to the next dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAnswer {
    /// Message box answer
    Button(MessageBoxButton),
    /// File dialog answer, `None` for cancel
    Paths(Option<Vec<PathBuf>>),
}

/// Joystick slots polled by the headless backend
pub const JOYSTICK_SLOTS: usize = 16;

/// The simulated platform
pub struct HeadlessHost {
    options: HeadlessOptions,
    ledger: NativeLedger,
    sender: mpsc::Sender<HeadlessMessage>,
    receiver: mpsc::Receiver<HeadlessMessage>,
    notifications: RefCell<VecDeque<PlatformEvent>>,
    displays: RefCell<Vec<VirtualDisplay>>,
    next_display_id: Cell<u64>,
    pub(crate) input: RefCell<InputState>,
    pub(crate) clipboard: RefCell<Option<String>>,
    pub(crate) theme: RefCell<ThemeInfo>,
    pub(crate) screensaver_allowed: Cell<bool>,
    joysticks: RefCell<Vec<Option<JoystickDevice>>>,
    current_gl: Cell<Option<(NativeId, NativeId)>>,
    dialog_answers: RefCell<VecDeque<DialogAnswer>>,
}

impl HeadlessHost {
    /// Build the simulated platform described by `options`
    pub fn new(options: HeadlessOptions) -> PalResult<Rc<Self>> {
        options
            .validate()
            .map_err(crate::config::ConfigError::Invalid)?;
        let (sender, receiver) = mpsc::channel();

        let mut joysticks: Vec<Option<JoystickDevice>> = options
            .joysticks
            .iter()
            .take(JOYSTICK_SLOTS)
            .map(|slot| slot.clone().map(JoystickDevice::new))
            .collect();
        joysticks.resize(JOYSTICK_SLOTS, None);

        let host = Self {
            theme: RefCell::new(options.theme.clone()),
            ledger: NativeLedger::default(),
            sender,
            receiver,
            notifications: RefCell::new(VecDeque::new()),
            displays: RefCell::new(Vec::new()),
            next_display_id: Cell::new(0),
            input: RefCell::new(InputState::default()),
            clipboard: RefCell::new(None),
            screensaver_allowed: Cell::new(true),
            joysticks: RefCell::new(joysticks),
            current_gl: Cell::new(None),
            dialog_answers: RefCell::new(VecDeque::new()),
            options,
        };
        let primary = host.options.displays.iter().position(|d| d.primary).unwrap_or(0);
        for (index, config) in host.options.displays.clone().into_iter().enumerate() {
            host.attach_display(config, index == primary);
        }
        Ok(Rc::new(host))
    }

    /// The options the host was built from
    pub fn options(&self) -> &HeadlessOptions {
        &self.options
    }

    /// A sender other threads can post native messages with
    pub fn sender(&self) -> HeadlessSender {
        HeadlessSender(self.sender.clone())
    }

    /// Native resource accounting
    pub fn ledger(&self) -> &NativeLedger {
        &self.ledger
    }

    /// Script the answer of the next dialog
    pub fn push_dialog_answer(&self, answer: DialogAnswer) {
        self.dialog_answers.borrow_mut().push_back(answer);
    }

    pub(crate) fn next_dialog_answer(&self) -> Option<DialogAnswer> {
        self.dialog_answers.borrow_mut().pop_front()
    }

    /// Queue a notification produced by an API call; delivered by the next
    /// `process_events`
    pub(crate) fn notify(&self, event: PlatformEvent) {
        self.notifications.borrow_mut().push_back(event);
    }

    pub(crate) fn take_notification(&self) -> Option<PlatformEvent> {
        self.notifications.borrow_mut().pop_front()
    }

    pub(crate) fn try_message(&self) -> Option<HeadlessMessage> {
        self.receiver.try_recv().ok()
    }

    /// Block until a message arrives
    pub(crate) fn wait_message(&self) -> PalResult<HeadlessMessage> {
        self.receiver
            .recv()
            .map_err(|_| PalError::native(BACKEND, "native message channel closed"))
    }

    pub(crate) fn has_notifications(&self) -> bool {
        !self.notifications.borrow().is_empty()
    }

    // Displays

    pub(crate) fn displays(&self) -> Vec<VirtualDisplay> {
        self.displays.borrow().clone()
    }

    pub(crate) fn display_count(&self) -> usize {
        self.displays.borrow().len()
    }

    pub(crate) fn display_by_id(&self, id: u64) -> Option<VirtualDisplay> {
        self.displays.borrow().iter().find(|d| d.id == id).cloned()
    }

    /// The display containing `point`, or the primary display
    pub(crate) fn display_at(&self, point: Vector2i) -> Option<VirtualDisplay> {
        let displays = self.displays.borrow();
        let probe = Box2i::from_position_size(point, Vector2i::new(1, 1));
        displays
            .iter()
            .find(|d| d.bounds().contains_box(&probe))
            .or_else(|| displays.iter().find(|d| d.primary))
            .cloned()
    }

    /// Plug in a display. It becomes primary only if no display is.
    pub(crate) fn connect_display(&self, config: VirtualDisplayConfig) -> u64 {
        let primary = !self.displays.borrow().iter().any(|d| d.primary);
        self.attach_display(config, primary)
    }

    fn attach_display(&self, config: VirtualDisplayConfig, primary: bool) -> u64 {
        let mut displays = self.displays.borrow_mut();
        let position = match config.position {
            Some((x, y)) => Vector2i::new(x, y),
            None => {
                let right = displays.iter().map(|d| d.bounds().max.x).max().unwrap_or(0);
                Vector2i::new(right, 0)
            }
        };
        let id = self.next_display_id.get();
        self.next_display_id.set(id + 1);
        displays.push(VirtualDisplay {
            id,
            config,
            position,
            primary,
        });
        id
    }

    pub(crate) fn disconnect_display(&self, name: &str) -> Option<VirtualDisplay> {
        let mut displays = self.displays.borrow_mut();
        let index = displays.iter().position(|d| d.config.name == name)?;
        let removed = displays.remove(index);
        if removed.primary {
            if let Some(first) = displays.first_mut() {
                first.primary = true;
            }
        }
        Some(removed)
    }

    // Joysticks

    pub(crate) fn joystick(&self, slot: usize) -> Option<JoystickDevice> {
        self.joysticks.borrow().get(slot).cloned().flatten()
    }

    pub(crate) fn plug_joystick(&self, slot: usize, config: VirtualJoystickConfig) -> bool {
        match self.joysticks.borrow_mut().get_mut(slot) {
            Some(entry) => {
                *entry = Some(JoystickDevice::new(config));
                true
            }
            None => false,
        }
    }

    pub(crate) fn unplug_joystick(&self, slot: usize) -> bool {
        self.joysticks
            .borrow_mut()
            .get_mut(slot)
            .and_then(Option::take)
            .is_some()
    }

    pub(crate) fn update_joystick(&self, slot: usize, apply: impl FnOnce(&mut JoystickDevice)) {
        if let Some(Some(device)) = self.joysticks.borrow_mut().get_mut(slot) {
            apply(device);
        }
    }

    // OpenGL currency: (context, window)

    pub(crate) fn current_gl(&self) -> Option<(NativeId, NativeId)> {
        self.current_gl.get()
    }

    pub(crate) fn set_current_gl(&self, current: Option<(NativeId, NativeId)>) {
        self.current_gl.set(current);
    }

    /// Drop currency if it involves `native` (a context or its window)
    pub(crate) fn forget_gl(&self, native: NativeId) {
        if let Some((context, window)) = self.current_gl.get() {
            if context == native || window == native {
                self.current_gl.set(None);
            }
        }
    }
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("displays", &self.display_count())
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_counts_and_rejects_double_release() {
        let ledger = NativeLedger::default();
        let window = ledger.allocate(NativeKind::Window);
        let icon = ledger.allocate(NativeKind::Icon);
        assert_eq!(ledger.live_count(), 2);
        assert_eq!(ledger.live_of(NativeKind::Icon), 1);

        ledger.release(window).unwrap();
        assert!(ledger.release(window).is_err());
        assert!(ledger.is_live(icon));
        assert_eq!(ledger.total_allocated(), 2);
    }

    #[test]
    fn test_failed_teardown_release_is_logged() {
        let sink = std::sync::Arc::new(crate::foundation::logging::RecordingLogger::default());
        let logger = Logger::new(sink.clone()).with_category("pal::window");
        let ledger = NativeLedger::default();
        let window = ledger.allocate(NativeKind::Window);

        ledger.release_logged(window, &logger);
        assert!(sink.records().is_empty());

        ledger.release_logged(window, &logger);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, log::Level::Warn);
        assert!(records[0].2.starts_with("teardown:"));
    }

    #[test]
    fn test_displays_are_laid_out_left_to_right() {
        let options = HeadlessOptions::default().with_displays(vec![
            VirtualDisplayConfig::new("A", 1920, 1080),
            VirtualDisplayConfig::new("B", 1280, 1024),
        ]);
        let host = HeadlessHost::new(options).unwrap();
        let displays = host.displays();

        assert!(displays[0].primary && !displays[1].primary);
        assert_eq!(displays[1].position, Vector2i::new(1920, 0));
        assert!(!displays[0].bounds().intersects(&displays[1].bounds()));
    }

    #[test]
    fn test_primary_moves_when_primary_is_unplugged() {
        let options = HeadlessOptions::default().with_displays(vec![
            VirtualDisplayConfig::new("A", 800, 600),
            VirtualDisplayConfig::new("B", 800, 600).as_primary(),
        ]);
        let host = HeadlessHost::new(options).unwrap();
        assert!(host.displays()[1].primary);

        host.disconnect_display("B").unwrap();
        assert!(host.displays()[0].primary);
        assert!(host.disconnect_display("B").is_none());
    }

    #[test]
    fn test_modifier_state_follows_both_keys() {
        let mut input = InputState::default();
        input.key(Key::LeftShift, true);
        input.key(Key::RightShift, true);
        input.key(Key::LeftShift, false);
        assert!(input.modifiers.contains(KeyModifiers::SHIFT));
        input.key(Key::RightShift, false);
        assert!(input.modifiers.is_empty());
    }

    #[test]
    fn test_sender_wakes_from_another_thread() {
        let host = HeadlessHost::new(HeadlessOptions::default()).unwrap();
        let sender = host.sender();
        std::thread::spawn(move || sender.wake().unwrap()).join().unwrap();
        assert!(matches!(host.wait_message().unwrap(), HeadlessMessage::Wake));
    }
}
