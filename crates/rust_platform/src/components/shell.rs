//! Shell capability: desktop integration that is not tied to a window

use serde::{Deserialize, Serialize};

use super::PalComponent;
use crate::error::PalResult;

/// Power source state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BatteryStatus {
    /// The system has no battery
    NoSystemBattery,
    /// State could not be read
    Unknown,
    /// Running on or charging a battery
    Battery {
        /// Charge in percent
        percent: f32,
        /// True while charging
        charging: bool,
        /// True when on external power
        on_ac: bool,
    },
}

/// Preferred system theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    /// Name of the theme
    pub theme: String,
    /// Dark theme preferred
    pub dark: bool,
    /// High contrast requested
    pub high_contrast: bool,
}

impl Default for ThemeInfo {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            dark: false,
            high_contrast: false,
        }
    }
}

/// Screensaver, power and theme queries
pub trait ShellComponent: PalComponent {
    /// Allow or inhibit the screensaver
    fn allow_screensaver(&self, allow: bool) -> PalResult<()>;

    /// Whether the screensaver is currently allowed
    fn is_screensaver_allowed(&self) -> PalResult<bool>;

    /// Battery state
    fn get_battery_info(&self) -> PalResult<BatteryStatus>;

    /// Preferred theme
    fn get_preferred_theme(&self) -> PalResult<ThemeInfo>;
}
