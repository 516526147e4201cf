//! `server-timing` header parsing

/// Response header carrying the server's processing time
pub const SERVER_TIMING_HEADER: &str = "server-timing";

/// Characters preceding the duration value, i.e. `cfRequestDuration;dur=`
const DURATION_OFFSET: usize = 22;

/// Extract the server-reported processing time in milliseconds
///
/// The duration starts at a fixed character offset and is read as the
/// longest leading decimal number. Missing, short or malformed values
/// yield 0.
pub fn parse_server_timing(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let Some((start, _)) = value.char_indices().nth(DURATION_OFFSET) else {
        return 0.0;
    };

    leading_number(value[start..].trim_start())
        .filter(|millis| millis.is_finite())
        .unwrap_or(0.0)
}

fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let integer_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - integer_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        digits += fraction_end - fraction_start;
        if fraction_end > fraction_start || digits > 0 {
            end = fraction_end;
        }
    }

    if digits == 0 {
        return None;
    }
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloudflare_header() {
        assert_eq!(parse_server_timing(Some("cfRequestDuration;dur=12.345")), 12.345);
        assert_eq!(parse_server_timing(Some("cfRequestDuration;dur=7")), 7.0);
    }

    #[test]
    fn test_trailing_content_ignored() {
        assert_eq!(parse_server_timing(Some("cfRequestDuration;dur=3.5, cfL4;desc=\"x\"")), 3.5);
        assert_eq!(parse_server_timing(Some("cfRequestDuration;dur=42ms")), 42.0);
    }

    #[test]
    fn test_missing_or_malformed() {
        assert_eq!(parse_server_timing(None), 0.0);
        assert_eq!(parse_server_timing(Some("")), 0.0);
        assert_eq!(parse_server_timing(Some("cfRequestDuration;dur=")), 0.0);
        assert_eq!(parse_server_timing(Some("cfRequestDuration;dur=abc")), 0.0);
        assert_eq!(parse_server_timing(Some("short")), 0.0);
    }

    #[test]
    fn test_offset_is_fixed() {
        // another metric name of the same length still parses from offset 22
        assert_eq!(parse_server_timing(Some("abcdefghijklmnop;dur=x9.5")), 9.5);
        assert_eq!(parse_server_timing(Some("app;dur=100")), 0.0);
    }

    #[test]
    fn test_leading_number_forms() {
        assert_eq!(leading_number("0.5"), Some(0.5));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("5."), Some(5.0));
        assert_eq!(leading_number("-1.25rest"), Some(-1.25));
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number("-"), None);
    }
}
