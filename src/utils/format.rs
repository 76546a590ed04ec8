use askama::{Html, MarkupDisplay};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::fmt::{Display, Write};

pub const MISSING: &str = "-";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Escapes text so it can be embedded in markup as inert content.
pub fn escape_text(text: Option<&str>) -> String {
    text.map(|text| MarkupDisplay::new_unsafe(text, Html).to_string())
        .unwrap_or_default()
}

/// Renders a backend timestamp with `pattern`.
///
/// Offsets are converted to local time; naive timestamps are already local
/// wall-clock time. Anything unparseable comes back unchanged.
pub fn format_date(value: Option<&str>, pattern: &str) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return MISSING.to_string();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return render(parsed.with_timezone(&Local).format(pattern), raw);
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return render(parsed.format(pattern), raw);
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return render(midnight.format(pattern), raw);
    }

    raw.to_string()
}

// A bad pattern makes chrono's Display fail; fall back to the input.
fn render(formatted: impl Display, raw: &str) -> String {
    let mut out = String::new();
    match write!(out, "{formatted}") {
        Ok(()) => out,
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = "%Y/%-m/%-d %H:%M:%S";

    #[test]
    fn escapes_markup_significant_characters() {
        assert_eq!(
            escape_text(Some("<script>alert('x') & \"y\"</script>")),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn missing_text_escapes_to_empty() {
        assert_eq!(escape_text(None), "");
        assert_eq!(escape_text(Some("plain")), "plain");
        assert_eq!(escape_text(Some("http://db:5432/app")), "http://db:5432/app");
    }

    #[test]
    fn missing_date_renders_placeholder() {
        assert_eq!(format_date(None, PATTERN), "-");
        assert_eq!(format_date(Some(""), PATTERN), "-");
    }

    #[test]
    fn naive_timestamps_keep_wall_clock_time() {
        assert_eq!(
            format_date(Some("2024-01-05T14:03:09.123456"), PATTERN),
            "2024/1/5 14:03:09"
        );
        assert_eq!(format_date(Some("2024-11-25 08:00:00"), PATTERN), "2024/11/25 08:00:00");
        assert_eq!(format_date(Some("2024-02-29"), PATTERN), "2024/2/29 00:00:00");
    }

    #[test]
    fn offset_timestamps_are_converted_to_local_time() {
        let raw = "2024-01-05T14:03:09+00:00";
        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .format(PATTERN)
            .to_string();
        assert_eq!(format_date(Some(raw), PATTERN), expected);
    }

    #[test]
    fn unparseable_input_is_returned_verbatim() {
        assert_eq!(format_date(Some("yesterday"), PATTERN), "yesterday");
    }

    #[test]
    fn broken_pattern_falls_back_to_input() {
        assert_eq!(
            format_date(Some("2024-01-05T14:03:09"), "%Q"),
            "2024-01-05T14:03:09"
        );
    }
}
