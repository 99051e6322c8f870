//! Local filename for a downloaded installer.
//!
//! Takes the last URL path segment and makes it safe to create on NTFS.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_windows;

/// Default filename when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe filename for saving a download.
///
/// - `derive_filename("https://example.com/dl/Setup.exe")` → `"Setup.exe"`
/// - `derive_filename("https://example.com/")` → `"download.bin"`
pub fn derive_filename(url: &str) -> String {
    filename_from_url_path(url)
        .map(|raw| sanitize_filename_for_windows(&raw))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_from_path() {
        assert_eq!(
            derive_filename("https://download.example.com/win/SteamSetup.exe"),
            "SteamSetup.exe"
        );
        assert_eq!(
            derive_filename("https://example.com/v1.2/python-3.12.0-amd64.exe?x=1"),
            "python-3.12.0-amd64.exe"
        );
    }

    #[test]
    fn percent_encoded_segment_is_decoded_and_sanitized() {
        assert_eq!(
            derive_filename("https://example.com/My%20Tool%3A%20Setup.msi"),
            "My Tool_ Setup.msi"
        );
    }

    #[test]
    fn fallback_name() {
        assert_eq!(derive_filename("https://example.com/"), DEFAULT_FILENAME);
        assert_eq!(derive_filename("not a url"), DEFAULT_FILENAME);
        assert_eq!(derive_filename("https://example.com/..."), DEFAULT_FILENAME);
    }
}
