//! # Toolkit
//!
//! The registry of capability components. A [`Toolkit`] is created by the
//! application's entry point, initialized once, and passed to the code that
//! needs windows, displays or input.
//!
//! ```text
//! Uninitialized --init--> Initializing --ok--> Ready --shutdown--> (consumed)
//!                              |
//!                              +--error--> Uninitialized (rolled back)
//! ```
//!
//! Initialization asks the backend factory for every capability. A
//! capability the backend does not offer is recorded as absent; any other
//! failure shuts down what was already built and is returned.

use std::fmt;
use std::rc::Rc;

use crate::components::{
    ClipboardComponent, CursorComponent, DialogComponent, DisplayComponent, IconComponent,
    InitContext, JoystickComponent, KeyboardComponent, MouseComponent, OpenGLComponent,
    PalComponents, ShellComponent, SurfaceComponent, VulkanComponent, WindowComponent,
};
use crate::core::config::ToolkitOptions;
use crate::error::{PalError, PalResult};
use crate::events::EventQueue;
use crate::foundation::logging::{pal_log, Logger};
use crate::platform::{default_factory, PlatformFactory};

/// Lifecycle state of a [`Toolkit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolkitState {
    /// `init` has not been called, or failed and was rolled back
    Uninitialized,
    /// `init` is running
    Initializing,
    /// Every capability was resolved
    Ready,
}

/// What the toolkit knows about one capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentStatus {
    /// The toolkit is not ready yet
    NotInitialized,
    /// The backend offers no implementation
    Unsupported,
    /// Initialized and usable
    Available {
        /// Backend component name
        name: String,
    },
}

impl ComponentStatus {
    /// True for [`ComponentStatus::Available`]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

macro_rules! capabilities {
    ($($(#[$doc:meta])* $field:ident: $component:ident => $flag:ident, $create:ident;)*) => {
        /// One optional slot per capability
        #[derive(Default)]
        struct Registry {
            $($field: Option<Rc<dyn $component>>,)*
        }

        impl Registry {
            /// Capabilities in construction order
            const ORDER: &'static [PalComponents] = &[$(PalComponents::$flag),*];

            /// Ask the factory for `flag`. `Ok(false)` when unsupported.
            fn construct(&mut self, factory: &dyn PlatformFactory, flag: PalComponents) -> PalResult<bool> {
                $(
                    if flag == PalComponents::$flag {
                        return match factory.$create() {
                            Ok(component) => {
                                self.$field = Some(component);
                                Ok(true)
                            }
                            Err(PalError::Unsupported(_)) => Ok(false),
                            Err(error) => Err(error),
                        };
                    }
                )*
                Ok(false)
            }

            fn name(&self, flag: PalComponents) -> Option<String> {
                $(
                    if flag == PalComponents::$flag {
                        return self.$field.as_ref().map(|c| c.name().to_string());
                    }
                )*
                None
            }

            fn set_logger(&self, flag: PalComponents, logger: &Logger) {
                $(
                    if flag == PalComponents::$flag {
                        if let Some(component) = &self.$field {
                            component.set_logger(logger.clone());
                        }
                        return;
                    }
                )*
            }

            fn initialize(&self, flag: PalComponents, context: &InitContext<'_>) -> PalResult<()> {
                $(
                    if flag == PalComponents::$flag {
                        return match &self.$field {
                            Some(component) => component.initialize(context),
                            None => Ok(()),
                        };
                    }
                )*
                Ok(())
            }

            fn shutdown(&self, flag: PalComponents) {
                $(
                    if flag == PalComponents::$flag {
                        if let Some(component) = &self.$field {
                            component.shutdown();
                        }
                        return;
                    }
                )*
            }

            fn remove(&mut self, flag: PalComponents) {
                $(
                    if flag == PalComponents::$flag {
                        self.$field = None;
                        return;
                    }
                )*
            }
        }

        impl Toolkit {
            $(
                $(#[$doc])*
                pub fn $field(&self) -> PalResult<Rc<dyn $component>> {
                    self.ensure_ready()?;
                    self.registry
                        .$field
                        .clone()
                        .ok_or(PalError::Unsupported(PalComponents::$flag))
                }
            )*
        }
    };
}

capabilities! {
    /// The window component
    window: WindowComponent => WINDOW, create_window;
    /// The display component
    display: DisplayComponent => DISPLAY, create_display;
    /// The surface component
    surface: SurfaceComponent => SURFACE, create_surface;
    /// The OpenGL component
    opengl: OpenGLComponent => OPENGL, create_opengl;
    /// The Vulkan component
    vulkan: VulkanComponent => VULKAN, create_vulkan;
    /// The mouse component
    mouse: MouseComponent => MOUSE, create_mouse;
    /// The keyboard component
    keyboard: KeyboardComponent => KEYBOARD, create_keyboard;
    /// The cursor component
    cursor: CursorComponent => CURSOR, create_cursor;
    /// The icon component
    icon: IconComponent => ICON, create_icon;
    /// The clipboard component
    clipboard: ClipboardComponent => CLIPBOARD, create_clipboard;
    /// The joystick component
    joystick: JoystickComponent => JOYSTICK, create_joystick;
    /// The dialog component
    dialog: DialogComponent => DIALOG, create_dialog;
    /// The shell component
    shell: ShellComponent => SHELL, create_shell;
}

/// The capability registry and owner of the shared event queue
pub struct Toolkit {
    state: ToolkitState,
    registry: Registry,
    /// Present capabilities in initialization order
    initialized: Vec<PalComponents>,
    events: Rc<EventQueue>,
    logger: Logger,
    backend: &'static str,
}

impl Toolkit {
    /// An uninitialized toolkit
    pub fn new() -> Self {
        Self {
            state: ToolkitState::Uninitialized,
            registry: Registry::default(),
            initialized: Vec::new(),
            events: Rc::new(EventQueue::new()),
            logger: Logger::global().with_category("pal::toolkit"),
            backend: "none",
        }
    }

    /// Initialize with the backend `options` select
    pub fn init(&mut self, options: &ToolkitOptions) -> PalResult<()> {
        if self.state != ToolkitState::Uninitialized {
            return Err(PalError::AlreadyInitialized);
        }
        options.validate()?;
        let factory = default_factory(options)?;
        self.init_with_factory(options, factory.as_ref())
    }

    /// Initialize with components built by `factory`
    pub fn init_with_factory(&mut self, options: &ToolkitOptions, factory: &dyn PlatformFactory) -> PalResult<()> {
        if self.state != ToolkitState::Uninitialized {
            return Err(PalError::AlreadyInitialized);
        }
        self.state = ToolkitState::Initializing;
        self.logger = options.logger().with_category("pal::toolkit");
        self.backend = factory.backend_name();
        self.events.set_logger(&options.logger().with_category("pal::events"));

        match self.resolve(options, factory) {
            Ok(()) => {
                self.state = ToolkitState::Ready;
                pal_log!(
                    self.logger,
                    Info,
                    "toolkit ready on {} backend: {}",
                    self.backend,
                    self.available()
                );
                Ok(())
            }
            Err(error) => {
                pal_log!(self.logger, Error, "initialization failed, rolling back: {error}");
                self.roll_back();
                Err(error)
            }
        }
    }

    fn resolve(&mut self, options: &ToolkitOptions, factory: &dyn PlatformFactory) -> PalResult<()> {
        for &flag in Registry::ORDER {
            if !self.registry.construct(factory, flag)? {
                pal_log!(self.logger, Debug, "{flag} is not offered by {}", self.backend);
            }
        }

        let logger = options.logger();
        for &flag in Registry::ORDER {
            if self.registry.name(flag).is_none() {
                continue;
            }
            self.registry.set_logger(flag, &logger);
            let context = InitContext {
                requested: flag,
                options,
                events: Rc::clone(&self.events),
            };
            match self.registry.initialize(flag, &context) {
                Ok(()) => self.initialized.push(flag),
                Err(PalError::Unsupported(_)) => {
                    pal_log!(self.logger, Warn, "{flag} declined to initialize; treating as absent");
                    self.registry.remove(flag);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }

    fn roll_back(&mut self) {
        self.shutdown_components();
        self.registry = Registry::default();
        self.state = ToolkitState::Uninitialized;
        self.backend = "none";
    }

    fn shutdown_components(&mut self) {
        while let Some(flag) = self.initialized.pop() {
            self.registry.shutdown(flag);
        }
    }

    fn ensure_ready(&self) -> PalResult<()> {
        match self.state {
            ToolkitState::Ready => Ok(()),
            _ => Err(PalError::NotInitialized),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ToolkitState {
        self.state
    }

    /// Name of the backend the components came from
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    /// Status of a single capability flag
    pub fn status(&self, flag: PalComponents) -> ComponentStatus {
        if self.state != ToolkitState::Ready {
            return ComponentStatus::NotInitialized;
        }
        match self.registry.name(flag) {
            Some(name) => ComponentStatus::Available { name },
            None => ComponentStatus::Unsupported,
        }
    }

    /// Every capability that is available
    pub fn available(&self) -> PalComponents {
        if self.state != ToolkitState::Ready {
            return PalComponents::empty();
        }
        self.initialized
            .iter()
            .fold(PalComponents::empty(), |all, &flag| all | flag)
    }

    /// The shared event queue. Subscribing is allowed in any state.
    pub fn events(&self) -> Rc<EventQueue> {
        Rc::clone(&self.events)
    }

    /// Shut every component down in reverse construction order
    pub fn shutdown(mut self) {
        pal_log!(self.logger, Info, "shutting down {} component(s)", self.initialized.len());
        self.shutdown_components();
        self.events.clear_subscribers();
        self.registry = Registry::default();
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit")
            .field("state", &self.state)
            .field("backend", &self.backend)
            .field("available", &self.available())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    use ash::vk::{self, Handle};

    use super::*;
    use crate::components::{
        ClipboardFormat, FileFilter, GraphicsApiHints, MessageBoxButton, MessageBoxType,
        OpenGLGraphicsApiHints, SurfaceType, SystemCursorType, VulkanGraphicsApiHints, WindowMode,
    };
    use crate::core::config::{BackendPreference, HeadlessOptions, VirtualDisplayConfig, VirtualJoystickConfig};
    use crate::events::{PlatformEvent, PlatformEventType};
    use crate::foundation::logging::RecordingLogger;
    use crate::foundation::math::{Box2i, Vec2, Vector2i};
    use crate::input::{Key, KeyModifiers};
    use crate::platform::headless::{DialogAnswer, HeadlessFactory, HeadlessHost, HeadlessMessage, NativeKind};

    fn options(headless: HeadlessOptions) -> ToolkitOptions {
        ToolkitOptions::new("toolkit tests")
            .with_backend(BackendPreference::Headless)
            .with_headless(headless)
    }

    fn ready(headless: HeadlessOptions) -> (Toolkit, Rc<HeadlessHost>) {
        let options = options(headless);
        let factory = HeadlessFactory::new(options.headless.clone()).unwrap();
        let host = factory.host();
        let mut toolkit = Toolkit::new();
        toolkit.init_with_factory(&options, &factory).unwrap();
        (toolkit, host)
    }

    fn opengl_hints() -> GraphicsApiHints {
        GraphicsApiHints::OpenGL(OpenGLGraphicsApiHints::default())
    }

    fn vulkan_hints() -> GraphicsApiHints {
        GraphicsApiHints::Vulkan(VulkanGraphicsApiHints::default())
    }

    #[test]
    fn test_accessors_before_init_report_not_initialized() {
        let toolkit = Toolkit::new();
        assert_eq!(toolkit.state(), ToolkitState::Uninitialized);
        assert!(matches!(toolkit.window(), Err(PalError::NotInitialized)));
        assert!(matches!(toolkit.vulkan(), Err(PalError::NotInitialized)));
        assert_eq!(toolkit.status(PalComponents::WINDOW), ComponentStatus::NotInitialized);
        assert!(toolkit.available().is_empty());
    }

    #[test]
    fn test_registry_order_covers_every_capability_once() {
        let union = Registry::ORDER
            .iter()
            .fold(PalComponents::empty(), |set, &flag| set | flag);
        assert_eq!(union, PalComponents::all());
        assert_eq!(Registry::ORDER.len(), PalComponents::each().count());
        assert_eq!(&Registry::ORDER[..2], &[PalComponents::WINDOW, PalComponents::DISPLAY]);
    }

    #[test]
    fn test_init_twice_is_already_initialized() {
        let (mut toolkit, _host) = ready(HeadlessOptions::default());
        let again = toolkit.init(&options(HeadlessOptions::default()));
        assert!(matches!(again, Err(PalError::AlreadyInitialized)));
        assert_eq!(toolkit.state(), ToolkitState::Ready);
    }

    #[test]
    fn test_init_selects_headless_backend() {
        let mut toolkit = Toolkit::new();
        toolkit.init(&options(HeadlessOptions::default())).unwrap();
        assert_eq!(toolkit.backend_name(), "headless");
        assert_eq!(toolkit.available(), PalComponents::all());
        toolkit.shutdown();
    }

    #[test]
    fn test_invalid_options_leave_toolkit_uninitialized() {
        let mut toolkit = Toolkit::new();
        let result = toolkit.init(&ToolkitOptions::new(""));
        assert!(matches!(result, Err(PalError::Config(_))));
        assert_eq!(toolkit.state(), ToolkitState::Uninitialized);
    }

    #[test]
    fn test_unsupported_capabilities_are_reported_not_raised() {
        let absent = PalComponents::DIALOG | PalComponents::SHELL;
        let (toolkit, _host) = ready(HeadlessOptions::default().with_unsupported(absent));

        assert_eq!(toolkit.status(PalComponents::DIALOG), ComponentStatus::Unsupported);
        assert_eq!(toolkit.status(PalComponents::SHELL), ComponentStatus::Unsupported);
        match toolkit.dialog() {
            Err(PalError::Unsupported(flag)) => assert_eq!(flag, PalComponents::DIALOG),
            other => panic!("expected Unsupported, got {:?}", other.map(|_| ())),
        }
        assert_eq!(
            toolkit.status(PalComponents::WINDOW),
            ComponentStatus::Available {
                name: "HeadlessWindowComponent".to_string()
            }
        );
        assert_eq!(toolkit.available(), PalComponents::all() - absent);
    }

    #[test]
    fn test_failing_component_rolls_back_everything() {
        let headless = HeadlessOptions::default().with_failing(PalComponents::VULKAN);
        let options = options(headless);
        let factory = HeadlessFactory::new(options.headless.clone()).unwrap();
        let host = factory.host();
        let mut toolkit = Toolkit::new();

        let result = toolkit.init_with_factory(&options, &factory);
        assert!(matches!(result, Err(PalError::Native { backend: "headless", .. })));
        assert_eq!(toolkit.state(), ToolkitState::Uninitialized);
        assert!(matches!(toolkit.window(), Err(PalError::NotInitialized)));
        assert_eq!(host.ledger().live_count(), 0);
    }

    #[test]
    fn test_destroying_a_window_twice_succeeds() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        assert_eq!(host.ledger().live_of(NativeKind::Window), 1);

        windows.destroy(window).unwrap();
        windows.destroy(window).unwrap();
        assert!(windows.is_window_destroyed(window));
        assert_eq!(host.ledger().live_of(NativeKind::Window), 0);
        assert!(matches!(
            windows.get_title(window),
            Err(PalError::InvalidHandle { kind: "WindowHandle", .. })
        ));
    }

    #[test]
    fn test_display_work_areas_lie_within_bounds() {
        let (toolkit, _host) = ready(HeadlessOptions::default().with_displays(vec![
            VirtualDisplayConfig::new("Left", 1920, 1080).as_primary(),
            VirtualDisplayConfig::new("Right", 2560, 1440).with_scale(1.5),
            VirtualDisplayConfig::new("Tiny", 640, 20),
        ]));
        let displays = toolkit.display().unwrap();
        let count = displays.get_display_count().unwrap();
        assert_eq!(count, 3);

        for index in 0..count {
            let display = displays.create(index).unwrap();
            let bounds = Box2i::from_position_size(
                displays.get_virtual_position(display).unwrap(),
                displays.get_resolution(display).unwrap(),
            );
            let work_area = displays.get_work_area(display).unwrap();
            assert!(bounds.contains_box(&work_area), "display {index}: {work_area:?} outside {bounds:?}");
        }
        assert!(matches!(displays.create(count), Err(PalError::Precondition(_))));
    }

    #[test]
    fn test_two_display_layout() {
        let (toolkit, _host) = ready(HeadlessOptions::default().with_displays(vec![
            VirtualDisplayConfig::new("Main", 1920, 1080),
            VirtualDisplayConfig::new("Side", 1280, 1024),
        ]));
        let displays = toolkit.display().unwrap();
        assert_eq!(displays.get_display_count().unwrap(), 2);

        let first = displays.create(0).unwrap();
        let second = displays.create(1).unwrap();
        assert!(displays.is_primary(first).unwrap());
        assert!(!displays.is_primary(second).unwrap());
        assert_eq!(displays.get_virtual_position(first).unwrap(), Vector2i::new(0, 0));

        let first_bounds = displays.describe(first).unwrap().bounds();
        let second_bounds = displays.describe(second).unwrap().bounds();
        assert!(!first_bounds.intersects(&second_bounds));
        assert_eq!(displays.get_virtual_position(second).unwrap(), Vector2i::new(1920, 0));
        assert_eq!(second_bounds.size(), Vector2i::new(1280, 1024));
    }

    #[test]
    fn test_opengl_context_needs_opengl_hints() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let opengl = toolkit.opengl().unwrap();
        let window = windows.create(vulkan_hints()).unwrap();

        assert!(matches!(opengl.create_from_window(window), Err(PalError::Precondition(_))));
        assert_eq!(host.ledger().live_of(NativeKind::GlContext), 0);
        assert_eq!(opengl.get_current_context(), None);
    }

    #[test]
    fn test_client_size_is_clamped_to_limits() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        windows.set_min_client_size(window, Some(100), Some(100)).unwrap();
        windows.set_max_client_size(window, Some(1000), Some(1000)).unwrap();

        windows.set_client_size(window, Vector2i::new(50, 50)).unwrap();
        assert_eq!(windows.get_client_size(window).unwrap(), Vector2i::new(100, 100));

        windows.set_client_size(window, Vector2i::new(2000, 2000)).unwrap();
        assert_eq!(windows.get_client_size(window).unwrap(), Vector2i::new(1000, 1000));
    }

    #[test]
    fn test_close_handler_destroys_window() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        let closed = Rc::new(RefCell::new(Vec::new()));

        let handler_windows = Rc::clone(&windows);
        let handler_closed = Rc::clone(&closed);
        toolkit.events().subscribe_to(&[PlatformEventType::Close], move |event| {
            if let PlatformEvent::Close { window } = event {
                handler_closed.borrow_mut().push(*window);
                handler_windows.destroy(*window).unwrap();
            }
        });

        let sender = host.sender();
        sender.send(HeadlessMessage::Close(window)).unwrap();
        sender.send(HeadlessMessage::Text(window, "late".to_string())).unwrap();
        windows.process_events(false).unwrap();

        assert_eq!(*closed.borrow(), vec![window]);
        assert!(windows.is_window_destroyed(window));
        windows.destroy(window).unwrap();
        assert_eq!(host.ledger().live_of(NativeKind::Window), 0);
        toolkit.shutdown();
    }

    #[test]
    fn test_api_changes_are_delivered_on_process_events() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        toolkit.events().subscribe(move |event| sink.borrow_mut().push(event.kind()));

        windows.set_client_size(window, Vector2i::new(640, 480)).unwrap();
        windows.set_mode(window, WindowMode::Normal).unwrap();
        assert!(seen.borrow().is_empty());

        windows.process_events(false).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                PlatformEventType::WindowResize,
                PlatformEventType::WindowFramebufferResize,
                PlatformEventType::WindowModeChange,
            ]
        );
        toolkit.shutdown();
    }

    #[test]
    fn test_maximize_fills_work_area_and_normal_restores() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        windows.set_mode(window, WindowMode::Normal).unwrap();
        let before = (windows.get_position(window).unwrap(), windows.get_client_size(window).unwrap());

        windows.set_mode(window, WindowMode::Maximized).unwrap();
        assert_eq!(windows.get_client_size(window).unwrap(), Vector2i::new(1920, 1040));
        assert_eq!(windows.get_position(window).unwrap(), Vector2i::new(0, 0));

        windows.set_mode(window, WindowMode::Normal).unwrap();
        assert_eq!(
            (windows.get_position(window).unwrap(), windows.get_client_size(window).unwrap()),
            before
        );
    }

    #[test]
    fn test_set_mode_is_idempotent() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        windows.set_mode(window, WindowMode::Maximized).unwrap();
        windows.process_events(false).unwrap();

        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        toolkit.events().subscribe(move |_| *sink.borrow_mut() += 1);

        windows.set_mode(window, WindowMode::Maximized).unwrap();
        windows.process_events(false).unwrap();
        assert_eq!(*seen.borrow(), 0);
        assert_eq!(windows.get_mode(window).unwrap(), WindowMode::Maximized);
    }

    #[test]
    fn test_crossed_limits_keep_previous_limits() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        windows.set_min_client_size(window, Some(100), Some(100)).unwrap();
        windows.set_max_client_size(window, Some(1000), Some(1000)).unwrap();

        let crossed_min = windows.set_min_client_size(window, Some(2000), Some(50));
        assert!(matches!(crossed_min, Err(PalError::Precondition(_))));
        let crossed_max = windows.set_max_client_size(window, Some(50), None);
        assert!(matches!(crossed_max, Err(PalError::Precondition(_))));

        assert_eq!(windows.get_min_client_size(window).unwrap(), (Some(100), Some(100)));
        assert_eq!(windows.get_max_client_size(window).unwrap(), (Some(1000), Some(1000)));
    }

    #[test]
    fn test_positions_at_the_desktop_edge_do_not_overflow() {
        let (toolkit, _host) = ready(HeadlessOptions::default().with_displays(vec![
            VirtualDisplayConfig::new("Main", 1920, 1080),
            VirtualDisplayConfig::new("Edge", 1920, 1080).with_position(i32::MAX - 1920, 0),
        ]));
        let displays = toolkit.display().unwrap();
        let edge = displays.create(1).unwrap();
        let work = displays.get_work_area(edge).unwrap();
        assert_eq!(work.max.x, i32::MAX);
        assert_eq!(work.size(), Vector2i::new(1920, 1040));

        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        windows.set_position(window, Vector2i::new(i32::MAX, 0)).unwrap();
        windows.process_events(false).unwrap();
        assert_eq!(windows.get_position(window).unwrap(), Vector2i::new(i32::MAX, 0));
    }

    #[test]
    fn test_displays_past_the_desktop_edge_are_rejected() {
        let far = VirtualDisplayConfig::new("far", 1920, 1080).with_position(i32::MAX - 10, 0);
        let mut toolkit = Toolkit::new();
        let result = toolkit.init(&options(HeadlessOptions::default().with_displays(vec![far])));
        assert!(matches!(result, Err(PalError::Config(_))));
        assert_eq!(toolkit.state(), ToolkitState::Uninitialized);
    }

    #[test]
    fn test_invalid_hot_plugged_display_is_ignored() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let displays = toolkit.display().unwrap();
        let connections = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&connections);
        toolkit.events().subscribe_to(&[PlatformEventType::DisplayConnection], move |event| {
            if let PlatformEvent::DisplayConnection { name, .. } = event {
                sink.borrow_mut().push(name.clone());
            }
        });

        let sender = host.sender();
        sender
            .send(HeadlessMessage::DisplayConnected(VirtualDisplayConfig::new("bad", -100, 50)))
            .unwrap();
        sender
            .send(HeadlessMessage::DisplayConnected(VirtualDisplayConfig::new("good", 1280, 720)))
            .unwrap();
        windows.process_events(false).unwrap();

        assert_eq!(*connections.borrow(), vec!["good".to_string()]);
        assert_eq!(displays.get_display_count().unwrap(), 2);
        let added = displays.create(1).unwrap();
        assert_eq!(displays.get_name(added).unwrap(), "good");
        let work = displays.get_work_area(added).unwrap();
        assert!(displays.describe(added).unwrap().bounds().contains_box(&work));
    }

    #[test]
    fn test_input_messages_update_state() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let keyboard = toolkit.keyboard().unwrap();
        let mouse = toolkit.mouse().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        let keys = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&keys);
        toolkit.events().subscribe_to(&[PlatformEventType::KeyDown], move |event| {
            if let PlatformEvent::KeyDown { key, modifiers, .. } = event {
                sink.borrow_mut().push((*key, *modifiers));
            }
        });

        let sender = host.sender();
        for key in [Key::LeftShift, Key::A] {
            sender
                .send(HeadlessMessage::Key { window, key, pressed: true, repeat: false })
                .unwrap();
        }
        sender.send(HeadlessMessage::MouseMove(window, Vec2::new(10.0, 20.0))).unwrap();
        windows.process_events(false).unwrap();

        assert_eq!(keys.borrow()[1], (Key::A, KeyModifiers::SHIFT));
        assert_eq!(keyboard.get_key_modifiers().unwrap(), KeyModifiers::SHIFT);
        let pressed = keyboard.get_keyboard_state().unwrap();
        assert!(pressed.contains(&keyboard.get_scancode_from_key(Key::A).unwrap()));
        assert_eq!(mouse.get_position().unwrap(), Vector2i::new(110, 120));
    }

    #[test]
    fn test_blocking_process_events_is_woken_from_another_thread() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        let closes = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&closes);
        toolkit
            .events()
            .subscribe_to(&[PlatformEventType::Close], move |_| *sink.borrow_mut() += 1);

        let sender = host.sender();
        let worker = thread::spawn(move || {
            sender.wake().unwrap();
            sender.send(HeadlessMessage::Close(window)).unwrap();
        });
        worker.join().unwrap();

        windows.process_events(true).unwrap();
        assert_eq!(*closes.borrow(), 1);
        toolkit.shutdown();
    }

    #[test]
    fn test_swap_buffers_needs_a_current_context() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let opengl = toolkit.opengl().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        assert!(matches!(windows.swap_buffers(window), Err(PalError::Precondition(_))));

        let context = opengl.create_from_window(window).unwrap();
        opengl.set_current_context(Some(context)).unwrap();
        assert_eq!(opengl.get_current_context(), Some(context));
        assert_eq!(opengl.get_context_window(context).unwrap(), window);
        windows.swap_buffers(window).unwrap();

        opengl.set_current_context(None).unwrap();
        assert!(matches!(windows.swap_buffers(window), Err(PalError::Precondition(_))));
        assert!(opengl.get_proc_address(context, "glClear").unwrap().is_null());
    }

    #[test]
    fn test_destroying_window_detaches_its_context() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let opengl = toolkit.opengl().unwrap();
        let window = windows.create(opengl_hints()).unwrap();
        let context = opengl.create_from_window(window).unwrap();
        opengl.set_current_context(Some(context)).unwrap();

        windows.destroy(window).unwrap();
        assert_eq!(opengl.get_current_context(), None);
    }

    #[test]
    fn test_vulkan_surface_needs_vulkan_window_and_instance() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let windows = toolkit.window().unwrap();
        let vulkan = toolkit.vulkan().unwrap();
        let instance = vk::Instance::from_raw(0x1000);
        let gl_window = windows.create(opengl_hints()).unwrap();
        let vk_window = windows.create(vulkan_hints()).unwrap();

        assert!(vulkan
            .get_required_instance_extensions()
            .unwrap()
            .contains(&"VK_KHR_surface".to_string()));
        assert!(matches!(
            vulkan.create_window_surface(vk::Instance::null(), vk_window, None),
            Err(PalError::Precondition(_))
        ));
        assert!(matches!(
            vulkan.create_window_surface(instance, gl_window, None),
            Err(PalError::Precondition(_))
        ));
        let surface = vulkan.create_window_surface(instance, vk_window, None).unwrap();
        assert_ne!(surface, vk::SurfaceKHR::null());
        assert_eq!(host.ledger().live_of(NativeKind::VulkanSurface), 1);
        assert!(vulkan
            .get_physical_device_presentation_support(instance, vk::PhysicalDevice::from_raw(0x2000), 0)
            .unwrap());
    }

    #[test]
    fn test_surface_takes_size_of_its_display() {
        let (toolkit, _host) = ready(HeadlessOptions::default());
        let surfaces = toolkit.surface().unwrap();
        let displays = toolkit.display().unwrap();
        let surface = surfaces.create(SurfaceType::Overlay).unwrap();
        assert_eq!(surfaces.get_client_size(surface).unwrap(), Vector2i::zeros());

        let display = displays.create_primary().unwrap();
        surfaces.set_display(surface, display).unwrap();
        assert_eq!(surfaces.get_display(surface).unwrap(), Some(display));
        assert_eq!(surfaces.get_client_size(surface).unwrap(), Vector2i::new(1920, 1080));
        assert_eq!(surfaces.get_kind(surface).unwrap(), SurfaceType::Overlay);
    }

    #[test]
    fn test_clipboard_and_dialog_scripts() {
        let (toolkit, host) = ready(HeadlessOptions::default());
        let clipboard = toolkit.clipboard().unwrap();
        let dialogs = toolkit.dialog().unwrap();
        let windows = toolkit.window().unwrap();
        let updates = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&updates);
        toolkit
            .events()
            .subscribe_to(&[PlatformEventType::ClipboardUpdate], move |_| *sink.borrow_mut() += 1);

        assert_eq!(clipboard.get_clipboard_format().unwrap(), ClipboardFormat::None);
        clipboard.set_clipboard_text("copied").unwrap();
        assert_eq!(clipboard.get_clipboard_text().unwrap().as_deref(), Some("copied"));
        windows.process_events(false).unwrap();
        assert_eq!(*updates.borrow(), 1);

        assert_eq!(
            dialogs
                .show_message_box(None, "Quit?", "Unsaved changes", MessageBoxType::Question)
                .unwrap(),
            MessageBoxButton::None
        );
        host.push_dialog_answer(DialogAnswer::Paths(Some(vec![
            PathBuf::from("notes.txt"),
            PathBuf::from("photo.PNG"),
            PathBuf::from("scan.png"),
        ])));
        let filters = [FileFilter::new("Images", &["png"])];
        let picked = dialogs
            .show_open_dialog(None, "Open", None, &filters, false)
            .unwrap();
        assert_eq!(picked, Some(vec![PathBuf::from("photo.PNG")]));
    }

    #[test]
    fn test_shutdown_releases_every_native_resource() {
        let headless = HeadlessOptions::default().with_joystick(VirtualJoystickConfig::default());
        let (toolkit, host) = ready(headless);
        let windows = toolkit.window().unwrap();
        let gl_window = windows.create(opengl_hints()).unwrap();
        let vk_window = windows.create(vulkan_hints()).unwrap();
        let context = toolkit.opengl().unwrap().create_from_window(gl_window).unwrap();
        toolkit.opengl().unwrap().set_current_context(Some(context)).unwrap();
        toolkit
            .vulkan()
            .unwrap()
            .create_window_surface(vk::Instance::from_raw(1), vk_window, None)
            .unwrap();
        toolkit.display().unwrap().create_primary().unwrap();
        toolkit.surface().unwrap().create(SurfaceType::Control).unwrap();
        let cursor = toolkit.cursor().unwrap().create_standard(SystemCursorType::Hand).unwrap();
        windows.set_cursor(gl_window, Some(cursor)).unwrap();
        let icon = toolkit.icon().unwrap().create_from_pixels(2, 2, &[255; 16]).unwrap();
        windows.set_icon(gl_window, icon).unwrap();
        toolkit.joystick().unwrap().open(0).unwrap();

        assert!(host.ledger().live_count() >= 9);
        drop(windows);
        toolkit.shutdown();
        assert_eq!(host.ledger().live_count(), 0);
    }

    #[test]
    fn test_components_log_under_their_category() {
        let sink = Arc::new(RecordingLogger::default());
        let options = options(HeadlessOptions::default()).with_logger(sink.clone());
        let factory = HeadlessFactory::new(options.headless.clone()).unwrap();
        let mut toolkit = Toolkit::new();
        toolkit.init_with_factory(&options, &factory).unwrap();

        toolkit.window().unwrap().create(opengl_hints()).unwrap();
        assert!(sink.saw_category("pal::window"));
        assert!(sink.saw_category("pal::toolkit"));
    }
}
