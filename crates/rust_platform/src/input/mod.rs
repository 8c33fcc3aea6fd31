//! Input vocabulary shared by the keyboard, mouse and window capabilities

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Layout-independent physical key position
///
/// Values are USB HID keyboard usage IDs (page 0x07). Backends whose native
/// scancodes differ translate at their boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scancode(pub u32);

impl Scancode {
    /// No physical key
    pub const UNKNOWN: Self = Self(0);
}

macro_rules! keys {
    ($($(#[$doc:meta])* $key:ident = $usage:literal,)*) => {
        /// Layout-dependent virtual key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Key {
            /// Key without a mapping
            Unknown,
            $($(#[$doc])* $key,)*
        }

        impl Key {
            /// Every mapped key
            pub const ALL: &'static [Key] = &[$(Key::$key,)*];

            /// The key at `scancode` on a US QWERTY layout
            pub fn from_us_scancode(scancode: Scancode) -> Self {
                match scancode.0 {
                    $($usage => Key::$key,)*
                    _ => Key::Unknown,
                }
            }

            /// Where this key sits on a US QWERTY layout
            pub fn us_scancode(self) -> Scancode {
                match self {
                    $(Key::$key => Scancode($usage),)*
                    Key::Unknown => Scancode::UNKNOWN,
                }
            }
        }
    };
}

keys! {
    /// A
    A = 0x04, B = 0x05, C = 0x06, D = 0x07, E = 0x08, F = 0x09, G = 0x0A,
    H = 0x0B, I = 0x0C, J = 0x0D, K = 0x0E, L = 0x0F, M = 0x10, N = 0x11,
    O = 0x12, P = 0x13, Q = 0x14, R = 0x15, S = 0x16, T = 0x17, U = 0x18,
    V = 0x19, W = 0x1A, X = 0x1B, Y = 0x1C, Z = 0x1D,
    /// 1 on the main row
    D1 = 0x1E, D2 = 0x1F, D3 = 0x20, D4 = 0x21, D5 = 0x22,
    D6 = 0x23, D7 = 0x24, D8 = 0x25, D9 = 0x26, D0 = 0x27,
    /// Return
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equals = 0x2E,
    LeftBracket = 0x2F,
    RightBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Apostrophe = 0x34,
    /// Backtick / tilde
    Grave = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,
    F1 = 0x3A, F2 = 0x3B, F3 = 0x3C, F4 = 0x3D, F5 = 0x3E, F6 = 0x3F,
    F7 = 0x40, F8 = 0x41, F9 = 0x42, F10 = 0x43, F11 = 0x44, F12 = 0x45,
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,
    NumLock = 0x53,
    LeftControl = 0xE0,
    LeftShift = 0xE1,
    LeftAlt = 0xE2,
    /// Windows / Command / Super
    LeftSuper = 0xE3,
    RightControl = 0xE4,
    RightShift = 0xE5,
    RightAlt = 0xE6,
    RightSuper = 0xE7,
}

impl Key {
    /// The modifier this key toggles, if it is a modifier key
    pub fn modifier(self) -> KeyModifiers {
        match self {
            Key::LeftShift | Key::RightShift => KeyModifiers::SHIFT,
            Key::LeftControl | Key::RightControl => KeyModifiers::CONTROL,
            Key::LeftAlt | Key::RightAlt => KeyModifiers::ALT,
            Key::LeftSuper | Key::RightSuper => KeyModifiers::SUPER,
            _ => KeyModifiers::empty(),
        }
    }
}

bitflags! {
    /// Modifier keys held during an input event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct KeyModifiers: u8 {
        /// Either shift key
        const SHIFT = 1 << 0;
        /// Either control key
        const CONTROL = 1 << 1;
        /// Either alt key
        const ALT = 1 << 2;
        /// Either super key
        const SUPER = 1 << 3;
        /// Caps lock is on
        const CAPS_LOCK = 1 << 4;
        /// Num lock is on
        const NUM_LOCK = 1 << 5;
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// First side button
    Button4,
    /// Second side button
    Button5,
}

impl MouseButton {
    /// The flag for this button in [`MouseButtonFlags`]
    pub fn flag(self) -> MouseButtonFlags {
        match self {
            MouseButton::Left => MouseButtonFlags::LEFT,
            MouseButton::Right => MouseButtonFlags::RIGHT,
            MouseButton::Middle => MouseButtonFlags::MIDDLE,
            MouseButton::Button4 => MouseButtonFlags::BUTTON4,
            MouseButton::Button5 => MouseButtonFlags::BUTTON5,
        }
    }
}

bitflags! {
    /// Set of pressed mouse buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MouseButtonFlags: u8 {
        /// Left mouse button
        const LEFT = 1 << 0;
        /// Right mouse button
        const RIGHT = 1 << 1;
        /// Middle mouse button
        const MIDDLE = 1 << 2;
        /// First side button
        const BUTTON4 = 1 << 3;
        /// Second side button
        const BUTTON5 = 1 << 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_layout_is_a_bijection() {
        for &key in Key::ALL {
            assert_eq!(Key::from_us_scancode(key.us_scancode()), key);
        }
        assert_eq!(Key::from_us_scancode(Scancode(0x32)), Key::Unknown);
        assert_eq!(Key::Unknown.us_scancode(), Scancode::UNKNOWN);
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(Key::RightShift.modifier(), KeyModifiers::SHIFT);
        assert_eq!(Key::LeftSuper.modifier(), KeyModifiers::SUPER);
        assert!(Key::Q.modifier().is_empty());
    }

    #[test]
    fn test_mouse_button_flags() {
        let pressed = MouseButton::Left.flag() | MouseButton::Button5.flag();
        assert!(pressed.contains(MouseButtonFlags::BUTTON5));
        assert!(!pressed.contains(MouseButton::Middle.flag()));
    }
}
