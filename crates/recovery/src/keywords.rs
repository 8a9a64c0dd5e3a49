use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Articles, conjunctions, and common auxiliaries that carry no topical
/// signal. Tokens of length <= 2 are dropped before this set is consulted.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "but", "for", "nor", "yet", "are", "was", "were", "been", "being", "has",
        "had", "have", "does", "did", "will", "would", "shall", "should", "may", "might", "must",
        "can", "could", "this", "that", "these", "those", "with", "from", "into", "onto", "about",
        "your", "you", "our", "their", "they", "them", "his", "her", "its", "than", "then", "there",
        "here", "when", "what", "which", "who", "how", "not", "all", "any", "each", "per", "please",
    ]
    .into_iter()
    .collect()
});

/// Reduce free text to a bounded, stop-word-filtered token list.
///
/// Tokens keep their order of first appearance; truncation to `limit` keeps
/// the earliest survivors (position bias rather than frequency). Empty
/// input yields an empty list.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|raw| {
            let token: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase();
            if token.len() <= 2 || STOP_WORDS.contains(token.as_str()) {
                None
            } else {
                Some(token)
            }
        })
        .take(limit)
        .collect()
}
