//! Marshaling of strings that cross the native boundary
//!
//! Native graphics APIs take arrays of NUL-terminated strings (extension and
//! layer names). [`AnsiStringArray`] owns both the string buffers and the
//! pointer array, so the native view is released with it on every exit
//! path, including early returns through `?`.

use std::ffi::{c_char, CStr, CString};

use crate::error::{PalError, PalResult};

/// Owned array of NUL-terminated strings plus the pointer table a native
/// API expects (`const char* const*`).
pub struct AnsiStringArray {
    strings: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl AnsiStringArray {
    /// Marshal `items`. Fails if any item contains an interior NUL.
    pub fn new<S: AsRef<str>>(items: &[S]) -> PalResult<Self> {
        Self::from_unique(items.iter().map(AsRef::as_ref))
    }

    /// Marshal the items of `iter`, dropping duplicates but keeping the
    /// order of first appearance.
    pub fn from_unique<'a, I>(iter: I) -> PalResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut strings: Vec<CString> = Vec::new();
        for item in iter {
            let owned = CString::new(item).map_err(|_| {
                PalError::Precondition(format!("string {item:?} contains an interior NUL byte"))
            })?;
            if !strings.contains(&owned) {
                strings.push(owned);
            }
        }
        let pointers = strings.iter().map(|s| s.as_ptr()).collect();
        Ok(Self { strings, pointers })
    }

    /// Pointer to the first element of the pointer table. Valid while
    /// `self` is alive and unmodified.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }

    /// Number of strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True if no strings were marshaled
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Number of strings as the `u32` count native APIs expect
    pub fn count(&self) -> PalResult<u32> {
        u32::try_from(self.strings.len())
            .map_err(|_| PalError::Precondition("too many strings for a native array".to_string()))
    }

    /// Iterate over the marshaled strings
    pub fn iter(&self) -> impl Iterator<Item = &CStr> + '_ {
        self.strings.iter().map(CString::as_c_str)
    }

    /// Convert back to owned Rust strings
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|s| s.to_string_lossy().into_owned()).collect()
    }
}

impl std::fmt::Debug for AnsiStringArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.strings.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshals_in_order_without_duplicates() {
        let required = ["VK_KHR_surface", "VK_KHR_xcb_surface"];
        let extra = ["VK_EXT_debug_utils", "VK_KHR_surface"];
        let names =
            AnsiStringArray::from_unique(required.iter().chain(extra.iter()).copied()).unwrap();

        assert_eq!(names.len(), 3);
        assert_eq!(names.count().unwrap(), 3);
        assert_eq!(
            names.to_strings(),
            vec!["VK_KHR_surface", "VK_KHR_xcb_surface", "VK_EXT_debug_utils"]
        );
        assert!(!names.as_ptr().is_null());
    }

    #[test]
    fn test_interior_nul_is_a_precondition_error() {
        let err = AnsiStringArray::new(&["ok", "bad\0name"]).unwrap_err();
        assert!(matches!(err, PalError::Precondition(_)));
    }

    #[test]
    fn test_empty_array() {
        let names = AnsiStringArray::new::<&str>(&[]).unwrap();
        assert!(names.is_empty());
        assert_eq!(names.count().unwrap(), 0);
    }
}
