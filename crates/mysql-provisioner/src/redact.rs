//! Secret scrubbing for diagnostics

use crate::sql::escape_string_literal;

pub(crate) const REDACTED: &str = "***";

/// Remove every occurrence of each secret from `text`.
///
/// Both the raw value and its SQL-escaped form are removed, since server
/// errors quote statement text back verbatim. Longer needles go first so a
/// secret contained in another one cannot split the longer match.
pub(crate) fn scrub(text: &str, secrets: &[&str]) -> String {
    let mut needles: Vec<String> = secrets
        .iter()
        .filter(|s| !s.is_empty())
        .flat_map(|s| [s.to_string(), escape_string_literal(s)])
        .collect();
    needles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    needles.dedup();

    needles
        .iter()
        .fold(text.to_string(), |out, needle| out.replace(needle.as_str(), REDACTED))
}
