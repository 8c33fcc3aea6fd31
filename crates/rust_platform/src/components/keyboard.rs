//! Keyboard capability

use super::PalComponent;
use crate::error::PalResult;
use crate::input::{Key, KeyModifiers, Scancode};

/// Keyboard layouts and key state
pub trait KeyboardComponent: PalComponent {
    /// True if the backend can report the active layout
    fn supports_layouts(&self) -> bool;

    /// Name of the active layout
    fn get_active_keyboard_layout(&self) -> PalResult<String>;

    /// Where `key` sits under the active layout
    fn get_scancode_from_key(&self, key: Key) -> PalResult<Scancode>;

    /// Which key sits at `scancode` under the active layout
    fn get_key_from_scancode(&self, scancode: Scancode) -> PalResult<Key>;

    /// Currently pressed physical keys, sorted
    fn get_keyboard_state(&self) -> PalResult<Vec<Scancode>>;

    /// Currently held modifiers
    fn get_key_modifiers(&self) -> PalResult<KeyModifiers>;
}
