//! Label/value normalization for single `key: value` lines.

use super::{ParseError, SourceLine};

/// Normalizes a field label: trimmed, lowercased, whitespace runs joined
/// with a single underscore.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::normalize_label;
///
/// assert_eq!(normalize_label("  Geom   name "), "geom_name");
/// assert_eq!(normalize_label("Mediasize"), "mediasize");
/// ```
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Splits a line at its first colon into a normalized label and trimmed value.
///
/// Later colons stay in the value. A line with no colon, or with nothing
/// before it, is [`ParseError::MalformedLine`].
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::{SourceLine, split_key_value};
///
/// let line = SourceLine::new(3, "   efimedia: HD(1,GPT,86e1,0x28,0x400)");
/// let (key, value) = split_key_value(&line).unwrap();
/// assert_eq!(key, "efimedia");
/// assert_eq!(value, "HD(1,GPT,86e1,0x28,0x400)");
/// ```
pub fn split_key_value(line: &SourceLine<'_>) -> Result<(String, String), ParseError> {
    let malformed = || ParseError::MalformedLine {
        line: line.number,
        text: line.text.to_string(),
    };

    let (label, value) = line.text.split_once(':').ok_or_else(malformed)?;
    let key = normalize_label(label);
    if key.is_empty() {
        return Err(malformed());
    }
    Ok((key, value.trim().to_string()))
}
