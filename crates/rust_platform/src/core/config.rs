//! # Toolkit Configuration
//!
//! Options accepted by `Toolkit::init`: application identity, the
//! diagnostic sink, backend selection and the settings of the headless
//! backend. Everything except the logger can be loaded from TOML or RON
//! through the [`Config`] trait.
//!
//! ```toml
//! application_name = "viewer"
//! backend = "Headless"
//!
//! [headless]
//! keyboard_layout = "us"
//!
//! [[headless.displays]]
//! name = "Virtual-0"
//! width = 1920
//! height = 1080
//! refresh_rate = 60
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::components::{BatteryStatus, PalComponents, ThemeInfo};
use crate::foundation::logging::Logger;
use crate::foundation::math::{Box2i, Vec2, Vector2i};

/// Which backend family the toolkit asks for capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendPreference {
    /// The platform's preferred backend: GLFW when built with the `glfw`
    /// feature, headless otherwise
    #[default]
    Auto,
    /// The GLFW backend. Fails when built without the `glfw` feature.
    Glfw,
    /// The in-memory headless backend
    Headless,
}

/// # Virtual Display
///
/// One display of the headless backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualDisplayConfig {
    /// Display name
    pub name: String,
    /// Horizontal resolution
    pub width: i32,
    /// Vertical resolution
    pub height: i32,
    /// Refresh rate in Hz
    pub refresh_rate: u32,
    /// Position on the virtual desktop. `None` places the display to the
    /// right of the previous one.
    pub position: Option<(i32, i32)>,
    /// Height reserved for a task bar at the bottom of the display
    pub taskbar_height: i32,
    /// Content scale
    pub scale: f32,
    /// Marks the primary display. The first display is primary when none
    /// or several are marked.
    pub primary: bool,
}

impl VirtualDisplayConfig {
    /// A display of the given resolution
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Place the display at a fixed virtual desktop position
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }

    /// Set the refresh rate
    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = hz;
        self
    }

    /// Set the content scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Mark as primary
    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Check resolution, scale and placement
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0 || self.height <= 0 {
            return Err(format!(
                "Display {} has an empty resolution {}x{}",
                self.name, self.width, self.height
            ));
        }
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(format!("Display {} has a non-positive scale", self.name));
        }
        if let Some((x, y)) = self.position {
            if x.checked_add(self.width).is_none() || y.checked_add(self.height).is_none() {
                return Err(format!(
                    "Display {} at ({x}, {y}) extends past the virtual desktop",
                    self.name
                ));
            }
        }
        Ok(())
    }

    /// Virtual desktop bounds when placed at `position`
    pub(crate) fn bounds_at(&self, position: Vector2i) -> Box2i {
        Box2i::from_position_size(position, Vector2i::new(self.width, self.height))
    }

    /// Work area when placed at `position`, clamped to the bounds
    pub(crate) fn work_area_at(&self, position: Vector2i) -> Box2i {
        let bounds = self.bounds_at(position);
        let bottom = bounds.max.y.saturating_sub(self.taskbar_height);
        Box2i::new(bounds.min, Vector2i::new(bounds.max.x, bottom)).clamped_to(&bounds)
    }

    pub(crate) fn scale_vector(&self) -> Vec2 {
        Vec2::new(self.scale, self.scale)
    }
}

impl Default for VirtualDisplayConfig {
    fn default() -> Self {
        Self {
            name: "Virtual-0".to_string(),
            width: 1920,
            height: 1080,
            refresh_rate: 60,
            position: None,
            taskbar_height: 40,
            scale: 1.0,
            primary: false,
        }
    }
}

/// # Virtual Joystick
///
/// A device plugged into one slot of the headless backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualJoystickConfig {
    /// Device name
    pub name: String,
    /// Number of axes
    pub axes: usize,
    /// Number of buttons
    pub buttons: usize,
}

impl Default for VirtualJoystickConfig {
    fn default() -> Self {
        Self {
            name: "Virtual Gamepad".to_string(),
            axes: 6,
            buttons: 15,
        }
    }
}

/// # Headless Backend Options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessOptions {
    /// Connected displays, in enumeration order
    pub displays: Vec<VirtualDisplayConfig>,
    /// Capabilities the backend pretends not to have
    pub unsupported: PalComponents,
    /// Capabilities whose initialization fails with a native error
    pub failing: PalComponents,
    /// Name of the active keyboard layout
    pub keyboard_layout: String,
    /// Devices in the joystick slots
    pub joysticks: Vec<Option<VirtualJoystickConfig>>,
    /// Battery state reported by the shell
    pub battery: BatteryStatus,
    /// Theme reported by the shell
    pub theme: ThemeInfo,
}

impl HeadlessOptions {
    /// Replace the displays
    pub fn with_displays(mut self, displays: Vec<VirtualDisplayConfig>) -> Self {
        self.displays = displays;
        self
    }

    /// Pretend `components` are not available
    pub fn with_unsupported(mut self, components: PalComponents) -> Self {
        self.unsupported |= components;
        self
    }

    /// Make initialization of `components` fail
    pub fn with_failing(mut self, components: PalComponents) -> Self {
        self.failing |= components;
        self
    }

    /// Plug a joystick into the next slot
    pub fn with_joystick(mut self, joystick: VirtualJoystickConfig) -> Self {
        self.joysticks.push(Some(joystick));
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        self.displays.iter().try_for_each(VirtualDisplayConfig::validate)
    }
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            displays: vec![VirtualDisplayConfig::default().as_primary()],
            unsupported: PalComponents::empty(),
            failing: PalComponents::empty(),
            keyboard_layout: "us".to_string(),
            joysticks: Vec::new(),
            battery: BatteryStatus::NoSystemBattery,
            theme: ThemeInfo::default(),
        }
    }
}

/// # Toolkit Options
///
/// Top-level options passed to `Toolkit::init`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitOptions {
    /// Application name, used for window class names and diagnostics
    pub application_name: String,
    /// Diagnostic sink. Not serialized; `None` uses the global `log` facade.
    #[serde(skip)]
    pub logger: Option<Logger>,
    /// Backend selection
    pub backend: BackendPreference,
    /// Headless backend settings
    pub headless: HeadlessOptions,
}

impl ToolkitOptions {
    /// Options with the given application name
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            ..Self::default()
        }
    }

    /// Use `sink` for diagnostics
    pub fn with_logger(mut self, sink: Arc<dyn log::Log>) -> Self {
        self.logger = Some(Logger::new(sink));
        self
    }

    /// Select the backend
    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the headless backend settings
    pub fn with_headless(mut self, headless: HeadlessOptions) -> Self {
        self.headless = headless;
        self
    }

    /// The logger components receive
    pub fn logger(&self) -> Logger {
        self.logger.clone().unwrap_or_default()
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid("Application name cannot be empty".to_string()));
        }
        self.headless.validate().map_err(ConfigError::Invalid)
    }
}

impl Default for ToolkitOptions {
    fn default() -> Self {
        Self {
            application_name: "rust_platform application".to_string(),
            logger: None,
            backend: BackendPreference::Auto,
            headless: HeadlessOptions::default(),
        }
    }
}

impl Config for ToolkitOptions {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_parse_toml_options() {
        let text = r#"
            application_name = "viewer"
            backend = "Headless"

            [headless]
            unsupported = "DIALOG | SHELL"

            [[headless.displays]]
            name = "Left"
            width = 1280
            height = 1024

            [[headless.displays]]
            name = "Right"
            width = 1920
            height = 1080
            primary = true
        "#;
        let options = ToolkitOptions::parse_str(text, ConfigFormat::Toml).unwrap();

        assert_eq!(options.application_name, "viewer");
        assert_eq!(options.backend, BackendPreference::Headless);
        assert_eq!(options.headless.displays.len(), 2);
        assert_eq!(options.headless.displays[0].refresh_rate, 60);
        assert!(options.headless.displays[1].primary);
        assert_eq!(
            options.headless.unsupported,
            PalComponents::DIALOG | PalComponents::SHELL
        );
        assert!(options.logger.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_ron_roundtrip_keeps_backend() {
        let options = ToolkitOptions::new("ron app").with_backend(BackendPreference::Headless);
        let text = options.to_string_in(ConfigFormat::Ron).unwrap();
        let back = ToolkitOptions::parse_str(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(back.application_name, "ron app");
        assert_eq!(back.backend, BackendPreference::Headless);
        assert_eq!(back.headless, options.headless);
    }

    #[test]
    fn test_validation() {
        assert!(ToolkitOptions::new("").validate().is_err());
        let bad = HeadlessOptions::default().with_displays(vec![VirtualDisplayConfig::new("x", 0, 10)]);
        assert!(ToolkitOptions::new("a").with_headless(bad).validate().is_err());
    }

    #[test]
    fn test_work_area_excludes_taskbar() {
        let display = VirtualDisplayConfig::new("d", 800, 600);
        let origin = Vector2i::new(0, 0);
        let work = display.work_area_at(origin);
        assert_eq!(work.size(), Vector2i::new(800, 560));
        assert!(display.bounds_at(origin).contains_box(&work));
    }

    #[test]
    fn test_display_positions_must_fit_the_desktop() {
        let far = VirtualDisplayConfig::new("far", 1920, 1080).with_position(i32::MAX - 10, 0);
        assert!(far.validate().is_err());
        let options = HeadlessOptions::default().with_displays(vec![far]);
        assert!(options.validate().is_err());

        let edge = VirtualDisplayConfig::new("edge", 1920, 1080).with_position(i32::MAX - 1920, -1080);
        assert!(edge.validate().is_ok());
        assert!(VirtualDisplayConfig::new("flat", 1920, 1080).with_scale(0.0).validate().is_err());
    }
}
