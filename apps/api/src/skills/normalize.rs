//! Skill Normalizer: the canonical string form every other layer compares on.

/// Trims, lowercases (Unicode-aware), and collapses internal whitespace runs to
/// a single space. Empty input yields the empty string, which callers discard.
pub fn normalize(skill: &str) -> String {
    skill
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a list of raw skills into an ordered, de-duplicated set.
/// First occurrence wins the position; empty tokens are dropped.
pub fn normalize_set<S: AsRef<str>>(skills: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(skills.len());

    for skill in skills {
        let token = normalize(skill.as_ref());
        if token.is_empty() {
            continue;
        }
        if seen.insert(token.clone()) {
            out.push(token);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_lowercases_and_collapses() {
        assert_eq!(normalize("  Machine \t  Learning\n"), "machine learning");
    }

    #[test]
    fn test_multibyte_lowercase() {
        assert_eq!(normalize("ÜBERSETZUNG"), "übersetzung");
        assert_eq!(normalize("Σ Analysis"), "σ analysis");
    }

    #[test]
    fn test_empty_and_blank_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = ["  React  Native ", "C++", "Node.JS", "  ", "Ünïcode   Ünïcode", "a\u{00a0}b"];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_set_dedupes_preserving_first_position() {
        let set = normalize_set(&["PHP", "laravel", " php ", "", "Laravel", "MySQL"]);
        assert_eq!(set, vec!["php", "laravel", "mysql"]);
    }
}
