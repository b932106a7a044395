use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// True if `text` contains a Hangul syllable (U+AC00..=U+D7A3).
///
/// Jamo and other non-Latin scripts are not considered.
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| matches!(c, '\u{AC00}'..='\u{D7A3}'))
}

/// Transliterate a file name to ASCII and replace spaces with underscores.
pub fn ascii_file_name(name: &str) -> String {
    deunicode::deunicode(name).replace(' ', "_")
}

/// NFC-compose a path so visually identical names compare equal.
///
/// Paths that are not valid UTF-8 are returned unchanged.
pub fn normalize_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(s.nfc().collect::<String>()),
        None => path.to_path_buf(),
    }
}
