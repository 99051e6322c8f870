//! Windows-safe filename sanitization.

/// Device names Windows refuses as a file stem, whatever the extension.
const RESERVED_STEMS: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Maximum filename length in UTF-16 units on NTFS.
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename for safe use on Windows.
///
/// - Replaces `<>:"/\|?*` and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading spaces and trailing spaces/dots
/// - Prefixes reserved device names (`CON`, `NUL.txt`, `com1.exe`, ...) with `_`
/// - Limits length to 255 UTF-16 units
pub fn sanitize_filename_for_windows(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if c.is_control() || "<>:\"/\\|?*".contains(c) {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out
        .trim_start_matches(' ')
        .trim_end_matches(|c: char| c == ' ' || c == '.');

    let mut name = if is_reserved(trimmed) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };

    if name.encode_utf16().count() > NAME_MAX {
        let mut units = 0;
        let cut = name
            .char_indices()
            .find(|(_, c)| {
                units += c.len_utf16();
                units > NAME_MAX
            })
            .map(|(i, _)| i)
            .unwrap_or(name.len());
        name.truncate(cut);
        let kept = name.trim_end_matches(|c: char| c == ' ' || c == '.').len();
        name.truncate(kept);
    }
    name
}

fn is_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).trim_end();
    RESERVED_STEMS
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
}
