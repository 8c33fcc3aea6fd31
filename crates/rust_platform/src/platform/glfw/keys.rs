//! Translation between GLFW input codes and the toolkit's input vocabulary

use crate::input::{Key, KeyModifiers, MouseButton};

macro_rules! key_table {
    ($($glfw:ident => $key:ident,)*) => {
        /// The toolkit key for a GLFW key
        pub(crate) fn from_glfw_key(key: glfw::Key) -> Key {
            match key {
                $(glfw::Key::$glfw => Key::$key,)*
                _ => Key::Unknown,
            }
        }

        /// The GLFW key for a toolkit key
        pub(crate) fn to_glfw_key(key: Key) -> Option<glfw::Key> {
            match key {
                $(Key::$key => Some(glfw::Key::$glfw),)*
                Key::Unknown => None,
            }
        }
    };
}

key_table! {
    A => A, B => B, C => C, D => D, E => E, F => F, G => G, H => H, I => I,
    J => J, K => K, L => L, M => M, N => N, O => O, P => P, Q => Q, R => R,
    S => S, T => T, U => U, V => V, W => W, X => X, Y => Y, Z => Z,
    Num0 => D0, Num1 => D1, Num2 => D2, Num3 => D3, Num4 => D4,
    Num5 => D5, Num6 => D6, Num7 => D7, Num8 => D8, Num9 => D9,
    Enter => Enter,
    Escape => Escape,
    Backspace => Backspace,
    Tab => Tab,
    Space => Space,
    Minus => Minus,
    Equal => Equals,
    LeftBracket => LeftBracket,
    RightBracket => RightBracket,
    Backslash => Backslash,
    Semicolon => Semicolon,
    Apostrophe => Apostrophe,
    GraveAccent => Grave,
    Comma => Comma,
    Period => Period,
    Slash => Slash,
    CapsLock => CapsLock,
    F1 => F1, F2 => F2, F3 => F3, F4 => F4, F5 => F5, F6 => F6,
    F7 => F7, F8 => F8, F9 => F9, F10 => F10, F11 => F11, F12 => F12,
    PrintScreen => PrintScreen,
    ScrollLock => ScrollLock,
    Pause => Pause,
    Insert => Insert,
    Home => Home,
    PageUp => PageUp,
    Delete => Delete,
    End => End,
    PageDown => PageDown,
    Right => Right,
    Left => Left,
    Down => Down,
    Up => Up,
    NumLock => NumLock,
    LeftControl => LeftControl,
    LeftShift => LeftShift,
    LeftAlt => LeftAlt,
    LeftSuper => LeftSuper,
    RightControl => RightControl,
    RightShift => RightShift,
    RightAlt => RightAlt,
    RightSuper => RightSuper,
}

pub(crate) fn from_glfw_modifiers(modifiers: glfw::Modifiers) -> KeyModifiers {
    let mut result = KeyModifiers::empty();
    result.set(KeyModifiers::SHIFT, modifiers.contains(glfw::Modifiers::Shift));
    result.set(KeyModifiers::CONTROL, modifiers.contains(glfw::Modifiers::Control));
    result.set(KeyModifiers::ALT, modifiers.contains(glfw::Modifiers::Alt));
    result.set(KeyModifiers::SUPER, modifiers.contains(glfw::Modifiers::Super));
    result.set(KeyModifiers::CAPS_LOCK, modifiers.contains(glfw::Modifiers::CapsLock));
    result.set(KeyModifiers::NUM_LOCK, modifiers.contains(glfw::Modifiers::NumLock));
    result
}

pub(crate) fn from_glfw_button(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        glfw::MouseButton::Button4 => Some(MouseButton::Button4),
        glfw::MouseButton::Button5 => Some(MouseButton::Button5),
        _ => None,
    }
}

pub(crate) fn to_glfw_button(button: MouseButton) -> glfw::MouseButton {
    match button {
        MouseButton::Left => glfw::MouseButton::Button1,
        MouseButton::Right => glfw::MouseButton::Button2,
        MouseButton::Middle => glfw::MouseButton::Button3,
        MouseButton::Button4 => glfw::MouseButton::Button4,
        MouseButton::Button5 => glfw::MouseButton::Button5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_maps_both_ways() {
        for &key in Key::ALL {
            let native = to_glfw_key(key).unwrap();
            assert_eq!(from_glfw_key(native), key);
        }
        assert_eq!(to_glfw_key(Key::Unknown), None);
    }

    #[test]
    fn test_modifier_translation() {
        let mods = from_glfw_modifiers(glfw::Modifiers::Shift | glfw::Modifiers::Control);
        assert_eq!(mods, KeyModifiers::SHIFT | KeyModifiers::CONTROL);
    }
}
