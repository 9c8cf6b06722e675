//! Mention candidate extraction.
//!
//! # Responsibility
//! - Find `@login` tokens in comment bodies.
//!
//! # Invariants
//! - Token characters follow the login syntax: ASCII letters, ASCII digits
//!   and `_ ^ - . # * + & ' "`. Any other character ends the token.
//! - Matching is greedy and never fails; unresolved logins are filtered by
//!   the caller against the identity directory.

use once_cell::sync::Lazy;
use regex::Regex;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@([A-Za-z0-9_\^\-\.#\*\+&'"]+)"#).expect("valid mention regex"));

/// Returns mention candidates in order of appearance, without the `@`.
///
/// Duplicates are kept. A bare `@` yields nothing.
pub fn scan(text: &str) -> Vec<String> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::scan;

    #[test]
    fn scan_returns_tokens_in_order_with_duplicates() {
        // `,` ends a token; `.` is a login character.
        assert_eq!(
            scan("@carol see @bob, and again @carol."),
            vec!["carol", "bob", "carol."]
        );
    }

    #[test]
    fn scan_is_greedy_over_login_characters() {
        assert_eq!(scan("ping @foo.bar-baz_1 now"), vec!["foo.bar-baz_1"]);
        assert_eq!(scan("@a^b#c*d+e&f'g\"h!"), vec!["a^b#c*d+e&f'g\"h"]);
    }

    #[test]
    fn scan_stops_at_whitespace_and_punctuation_outside_set() {
        assert_eq!(scan("@alice: hi @bob/@carol"), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn scan_ignores_bare_at_sign_and_empty_text() {
        assert!(scan("").is_empty());
        assert!(scan("email me @ home").is_empty());
        assert!(scan("@").is_empty());
    }

    #[test]
    fn scan_stops_at_non_ascii_letters() {
        assert_eq!(scan("thanks @jürgen!"), vec!["j"]);
        assert!(scan("@ürsula").is_empty());
        assert_eq!(scan("@josé and @zoë2"), vec!["jos", "zo"]);
    }
}
