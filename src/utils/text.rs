//! Description normalization.

/// Line-break markup used in upstream descriptions.
pub const LINE_BREAK_MARKER: &str = "<br/>";

/// Replace every line-break marker with a newline.
///
/// Whitespace, casing and encoding are otherwise left alone. A missing
/// description normalizes to an empty string.
pub fn normalize_description(raw: Option<&str>) -> String {
    raw.map(|s| s.replace(LINE_BREAK_MARKER, "\n"))
        .unwrap_or_default()
}
