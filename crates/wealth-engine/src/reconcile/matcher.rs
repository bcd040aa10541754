//! Name Matching
//!
//! Asset names are matched to price-source keys through a single
//! normalization and a single collision policy:
//!
//! 1. `normalize_key` lower-cases, trims and joins words with hyphens
//!    ("Bitcoin (BTC)" → "bitcoin-(btc)").
//! 2. An exact key match wins.
//! 3. Otherwise a key matches when it is a substring of the normalized name
//!    or contains it. The contained side must be at least
//!    [`MIN_FRAGMENT_LEN`] characters, so "sol" never resolves to "solana".
//!    Keys are scanned in sorted order and the first match wins; further
//!    candidates are logged as ambiguous.

use tracing::warn;

/// Shortest fragment allowed to satisfy a substring match
pub const MIN_FRAGMENT_LEN: usize = 4;

/// Canonical lookup key for an asset name
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Identifiers worth requesting for a normalized key.
///
/// Besides the key itself, the part before a parenthesized ticker is a
/// likely market identifier ("bitcoin-(btc)" → "bitcoin").
pub fn candidate_ids(key: &str) -> Vec<String> {
    let mut ids = vec![key.to_string()];
    if let Some(idx) = key.find("-(") {
        let base = key[..idx].trim_end_matches('-');
        if !base.is_empty() && base != key {
            ids.push(base.to_string());
        }
    }
    ids
}

fn fragment_of(part: &str, whole: &str) -> bool {
    part.chars().count() >= MIN_FRAGMENT_LEN && whole.contains(part)
}

/// Resolves normalized names against a fixed key set
#[derive(Clone, Debug, Default)]
pub struct KeyMatcher {
    keys: Vec<String>,
}

impl KeyMatcher {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = keys.into_iter().map(Into::into).filter(|k| !k.is_empty()).collect();
        keys.sort();
        keys.dedup();
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Find the key for a normalized name
    pub fn find(&self, normalized: &str) -> Option<&str> {
        if normalized.is_empty() {
            return None;
        }

        if let Ok(idx) = self.keys.binary_search_by(|k| k.as_str().cmp(normalized)) {
            return Some(self.keys[idx].as_str());
        }

        let mut candidates = self
            .keys
            .iter()
            .filter(|k| fragment_of(k, normalized) || fragment_of(normalized, k));

        let first = candidates.next()?;
        let others: Vec<&str> = candidates.map(String::as_str).collect();
        if !others.is_empty() {
            warn!(
                name = normalized,
                chosen = first.as_str(),
                ignored = ?others,
                "Ambiguous price key match"
            );
        }
        Some(first.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Bitcoin (BTC)"), "bitcoin-(btc)");
        assert_eq!(normalize_key("  Shiba   Inu "), "shiba-inu");
        assert_eq!(normalize_key("ethereum"), "ethereum");
    }

    #[test]
    fn test_candidate_ids() {
        assert_eq!(candidate_ids("bitcoin-(btc)"), vec!["bitcoin-(btc)", "bitcoin"]);
        assert_eq!(candidate_ids("solana"), vec!["solana"]);
    }

    #[test]
    fn test_exact_match_wins() {
        let matcher = KeyMatcher::new(["bitcoin", "bitcoin-cash"]);
        assert_eq!(matcher.find("bitcoin-cash"), Some("bitcoin-cash"));
    }

    #[test]
    fn test_substring_match() {
        let matcher = KeyMatcher::new(["ethereum", "solana"]);
        assert_eq!(matcher.find("ethereum-(eth)"), Some("ethereum"));
        assert_eq!(matcher.find("cardano"), None);
    }

    #[test]
    fn test_first_sorted_candidate_wins() {
        // Both keys are substrings of the name; sorted order decides.
        let matcher = KeyMatcher::new(["bitcoin-cash", "bitcoin"]);
        assert_eq!(matcher.find("bitcoin-cash-(bch)"), Some("bitcoin"));
    }

    #[test]
    fn test_empty_name_never_matches() {
        let matcher = KeyMatcher::new(["bitcoin"]);
        assert_eq!(matcher.find(""), None);
    }

    #[test]
    fn test_short_fragments_do_not_match() {
        let matcher = KeyMatcher::new(["solana", "eth"]);
        assert_eq!(matcher.find("sol"), None);
        assert_eq!(matcher.find("tether"), None);
        assert_eq!(matcher.find("sola"), Some("solana"));
    }
}
