//! Header line parsing for HEAD responses.

use super::HeadResult;

/// Parse collected header lines into a [`HeadResult`]. Unknown headers and
/// malformed values are ignored.
pub fn parse_headers(lines: &[String]) -> HeadResult {
    let mut result = HeadResult::default();

    for line in lines {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            result.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
            result.content_type = Some(value.to_string());
        }
    }

    result
}
