// Display formatting for repository cards.
// Escaping, count abbreviation, language colours, dates and freshness labels.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Badge colour for languages missing from [`LANGUAGE_COLORS`].
pub const DEFAULT_LANGUAGE_COLOR: &str = "#6c7a89";

/// Fixed language to colour table.
const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("JavaScript", "#f1e05a"),
    ("Python", "#3572A5"),
    ("Java", "#b07219"),
    ("TypeScript", "#2b7489"),
    ("Rust", "#dea584"),
    ("Go", "#00ADD8"),
    ("C", "#555555"),
    ("C++", "#f34b7d"),
    ("C#", "#178600"),
    ("HTML", "#e34c26"),
    ("CSS", "#563d7c"),
    ("Shell", "#89e051"),
    ("Kotlin", "#A97BFF"),
    ("Swift", "#F05138"),
    ("Ruby", "#701516"),
    ("Jupyter Notebook", "#DA5B0B"),
];

/// Escape text for insertion into HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Star/fork count, abbreviated from 1000 up (`1500` -> `1.5k`).
pub fn format_count(count: u64) -> String {
    if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

/// Hex colour for a language badge.
pub fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_LANGUAGE_COLOR)
}

/// Short human date, e.g. `Jan 1, 2024`.
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

/// Freshness badge text.
///
/// Cached data reports its age in whole hours; fresh data never says "cached".
pub fn freshness_label(captured_at: Option<&DateTime<Utc>>, now: &DateTime<Utc>) -> String {
    let Some(captured_at) = captured_at else {
        return "updated: just now".to_string();
    };

    let hours = now.signed_duration_since(*captured_at).num_hours().max(0);
    if hours == 0 {
        "cached: just now".to_string()
    } else {
        format!("cached: {}h ago", hours)
    }
}

/// Only http(s) links are emitted; anything else becomes `#`.
pub fn safe_link(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        trimmed.to_string()
    } else {
        "#".to_string()
    }
}

/// Bytes left alone in a URI component: alphanumerics plus `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a URI component.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Encode a relative file path for use as a link, keeping the separators.
pub fn encode_uri_path(path: &str) -> String {
    path.split(['/', '\\'])
        .map(encode_uri_component)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.0k");
        assert_eq!(format_count(1500), "1.5k");
        assert_eq!(format_count(15000), "15.0k");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_language_color() {
        assert_eq!(language_color("Python"), "#3572A5");
        assert_eq!(language_color("JavaScript"), "#f1e05a");
        assert_eq!(language_color("Brainfuck"), DEFAULT_LANGUAGE_COLOR);
        assert_eq!(language_color(""), DEFAULT_LANGUAGE_COLOR);
    }

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_date(&dt), "Jan 1, 2024");
    }

    #[test]
    fn test_freshness_label() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(freshness_label(None, &now), "updated: just now");

        let recent = now - chrono::Duration::minutes(59);
        assert_eq!(freshness_label(Some(&recent), &now), "cached: just now");

        let old = now - chrono::Duration::minutes(6 * 60 + 30);
        assert_eq!(freshness_label(Some(&old), &now), "cached: 6h ago");

        let future = now + chrono::Duration::hours(2);
        assert_eq!(freshness_label(Some(&future), &now), "cached: just now");
    }

    #[test]
    fn test_safe_link() {
        assert_eq!(safe_link("https://github.com/u/a"), "https://github.com/u/a");
        assert_eq!(safe_link("javascript:alert(1)"), "#");
        assert_eq!(safe_link(""), "#");
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a b&c/d"), "a%20b%26c%2Fd");
        assert_eq!(encode_uri_component("it's (ok)"), "it's%20(ok)");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_encode_uri_path() {
        assert_eq!(encode_uri_path("downloads/resume.pdf"), "downloads/resume.pdf");
        assert_eq!(encode_uri_path("my files\\cv 2024.pdf"), "my%20files/cv%202024.pdf");
    }
}
