use std::collections::HashSet;

/// Jaccard similarity over two token lists, treated as sets.
///
/// `|A ∩ B| / |A ∪ B|`, defined as 0.0 when either set is empty. Symmetric,
/// bounded in [0, 1], and 1.0 exactly when both lists contain the same
/// token content (order and duplicates ignored).
pub fn jaccard(a: &[String], b: &[String]) -> f32 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn self_similarity_is_one() {
        let a = tokens(&["toner", "order", "urgent"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        let a = tokens(&["toner", "order"]);
        let b = tokens(&["invoice", "payment"]);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn either_side_empty_scores_zero() {
        let a = tokens(&["toner"]);
        assert_eq!(jaccard(&a, &[]), 0.0);
        assert_eq!(jaccard(&[], &a), 0.0);
        assert_eq!(jaccard(&[], &[]), 0.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = tokens(&["toner", "order", "urgent"]);
        let b = tokens(&["order", "invoice"]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn duplicates_and_order_are_ignored() {
        let a = tokens(&["toner", "toner", "order"]);
        let b = tokens(&["order", "toner"]);
        assert_eq!(jaccard(&a, &b), 1.0);
    }

    #[test]
    fn partial_overlap_is_fractional() {
        let a = tokens(&["toner", "order"]);
        let b = tokens(&["order", "invoice"]);
        // intersection {order}, union {toner, order, invoice}
        let score = jaccard(&a, &b);
        assert!((score - 1.0 / 3.0).abs() < f32::EPSILON);
    }
}
