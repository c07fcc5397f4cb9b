use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of attribute and virtual channel identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 32;

const DISALLOWED_PATTERN: &str = r"[^a-zA-Z0-9_]";

static DISALLOWED_CHARS: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Convert anything printable into a valid identifier.
///
/// Removes every character outside `[A-Za-z0-9_]` and crops the result to
/// [`MAX_IDENTIFIER_LENGTH`] characters.
pub fn to_identifier(identifier: impl std::fmt::Display) -> String {
    let raw = identifier.to_string();

    let stripped = match DISALLOWED_CHARS.get_or_init(|| Regex::new(DISALLOWED_PATTERN)) {
        Ok(regex) => regex.replace_all(&raw, "").into_owned(),
        // Fallback: plain character filter with the same semantics
        Err(_) => raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect(),
    };

    stripped.chars().take(MAX_IDENTIFIER_LENGTH).collect()
}
