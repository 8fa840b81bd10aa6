use std::sync::OnceLock;

use regex::Regex;

fn reserved_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["?/:\\*<>|]"#).expect("valid reserved-char pattern"))
}

fn line_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n\t]+").expect("valid line-break pattern"))
}

/// Makes a display title usable as a single path segment.
///
/// Reserved characters become `_`, runs of line breaks and tabs become one
/// space, and trailing dots and surrounding whitespace are removed. Applying
/// it twice gives the same result as applying it once.
pub fn sanitise_title(title: &str) -> String {
    let title = reserved_chars().replace_all(title, "_");
    let title = line_breaks().replace_all(&title, " ");
    title
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_start()
        .to_string()
}
