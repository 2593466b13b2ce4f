//! Token-order-insensitive string similarity on a 0–100 scale.

use rapidfuzz::fuzz;

/// Lowercases, splits on whitespace, sorts the tokens and rejoins them.
pub fn token_sort(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Indel similarity `1 - indel / (len_a + len_b)` of the token-sorted inputs,
/// scaled to 0–100 and left unrounded.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (token_sort(a), token_sort(b));
    (fuzz::ratio(a.chars(), b.chars()) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_order_is_ignored() {
        assert_eq!(token_sort_ratio("machine learning", "Learning  Machine"), 100.0);
    }

    #[test]
    fn test_indel_ratio_values() {
        assert_eq!(token_sort_ratio("sql", "mysql"), 75.0);
        assert!((token_sort_ratio("nodejs", "node") - 80.0).abs() < 1e-9);
        assert!(token_sort_ratio("postgresql", "postgres sql") > 90.0);
        assert!(token_sort_ratio("javascript", "java script") > 95.0);
        assert!(token_sort_ratio("unknownskill", "django") < 75.0);
    }

    #[test]
    fn test_disjoint_inputs_score_zero() {
        assert_eq!(token_sort_ratio("rust", ""), 0.0);
        assert_eq!(token_sort_ratio("abc", "xyz"), 0.0);
    }
}
