//! Canonical operating-system and architecture tags.
//!
//! Scripts declare raw upper-cased tokens (`WINDOWS`, `AMD64`, ...). The
//! registry expects display tokens, listed here in the order they are
//! emitted.

/// Raw OS token to display token, in output order.
pub const OS_TAGS: &[(&str, &str)] = &[("WINDOWS", "Windows"), ("MAC", "Mac"), ("LINUX", "Linux")];

/// Raw architecture token to display token, in output order.
pub const ARCH_TAGS: &[(&str, &str)] = &[("X86", "32"), ("AMD64", "64")];

/// Normalize raw OS tokens into canonical display tokens.
pub fn normalize_operating_systems(raw: &[String]) -> Vec<String> {
    normalize(raw, OS_TAGS, "operating system")
}

/// Normalize raw architecture tokens into canonical display tokens.
pub fn normalize_architecture(raw: &[String]) -> Vec<String> {
    normalize(raw, ARCH_TAGS, "architecture")
}

/// Bring tags reported by the registry into canonical form.
///
/// Raw keys and display tokens both match, ignoring case. Tokens the table
/// does not know are kept verbatim after the known ones.
pub fn canonical_operating_systems(reported: &[String]) -> Vec<String> {
    canonicalize(reported, OS_TAGS)
}

/// Architecture counterpart of [`canonical_operating_systems`].
pub fn canonical_architecture(reported: &[String]) -> Vec<String> {
    canonicalize(reported, ARCH_TAGS)
}

fn matches_entry(token: &str, (key, display): &(&str, &str)) -> bool {
    key.eq_ignore_ascii_case(token) || display.eq_ignore_ascii_case(token)
}

fn canonicalize(reported: &[String], table: &[(&str, &str)]) -> Vec<String> {
    let mut out: Vec<String> = table
        .iter()
        .filter(|entry| reported.iter().any(|token| matches_entry(token, entry)))
        .map(|(_, display)| (*display).to_string())
        .collect();

    for token in reported {
        if !table.iter().any(|entry| matches_entry(token, entry)) && !out.contains(token) {
            out.push(token.clone());
        }
    }
    out
}

/// Output order follows `table`, not `raw`. Tokens missing from the table
/// are dropped with a warning.
fn normalize(raw: &[String], table: &[(&str, &str)], kind: &'static str) -> Vec<String> {
    for token in raw {
        if !table.iter().any(|(key, _)| key.eq_ignore_ascii_case(token)) {
            tracing::warn!(kind, token = %token, "Dropping unrecognized tag");
        }
    }

    table
        .iter()
        .filter(|(key, _)| raw.iter().any(|token| key.eq_ignore_ascii_case(token)))
        .map(|(_, display)| (*display).to_string())
        .collect()
}
