//! Minimal glob pattern matching for `psubscribe`.
//!
//! Supports a single wildcard character `*` (matches any run of
//! characters, including none), mirroring the subset of Redis's
//! `PSUBSCRIBE` glob syntax this workspace actually needs — channel
//! names are always `prefix:id` shaped, so nothing fancier is required.

pub fn matches(pattern: &str, channel: &str) -> bool {
    matches_rec(pattern.as_bytes(), channel.as_bytes())
}

fn matches_rec(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some(b'*') => {
            matches_rec(&pattern[1..], text)
                || (!text.is_empty() && matches_rec(pattern, &text[1..]))
        }
        Some(&c) => text.first() == Some(&c) && matches_rec(&pattern[1..], &text[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(matches("codegen:jobs:abc", "codegen:jobs:abc"));
        assert!(!matches("codegen:jobs:abc", "codegen:jobs:xyz"));
    }

    #[test]
    fn trailing_wildcard() {
        assert!(matches("codegen:jobs:*", "codegen:jobs:abc"));
        assert!(matches("codegen:jobs:*", "codegen:jobs:"));
        assert!(!matches("codegen:jobs:*", "codegen:results:abc"));
    }

    #[test]
    fn leading_and_middle_wildcard() {
        assert!(matches("*:abc", "codegen:abc"));
        assert!(matches("codegen:*:abc", "codegen:jobs:abc"));
    }

    #[test]
    fn bare_wildcard_matches_everything() {
        assert!(matches("*", "anything"));
        assert!(matches("*", ""));
    }
}
