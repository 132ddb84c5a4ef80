//! Path utilities for writing delivered files

use std::path::Path;

/// Fallback when a suggested filename has nothing usable left
const FALLBACK_NAME: &str = "output";

/// Path utilities for delivered files
pub struct PathUtils;

impl PathUtils {
    /// Reduce a caller-suggested filename to a single safe path component.
    ///
    /// Directory parts are dropped, and characters that are invalid on common
    /// filesystems become `_`. Never returns an empty name or `.`/`..`.
    pub fn sanitize_filename(suggested: &str) -> String {
        let base = suggested
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or_default();

        let cleaned: String = base
            .chars()
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let cleaned = cleaned.trim();

        if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
            FALLBACK_NAME.to_string()
        } else {
            cleaned.to_string()
        }
    }

    /// Lower-cased extension of `path` without the dot
    pub fn get_extension(path: &str) -> Option<String> {
        Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}
