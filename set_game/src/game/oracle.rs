//! Set legality checks.

use super::entities::Card;

/// Decides which card combinations form a legal set.
pub trait SetOracle: Send + Sync {
    /// Whether `cards` form a legal set.
    fn is_set(&self, cards: &[Card]) -> bool;

    /// Enumerates legal sets among `cards`, stopping after `limit`.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>>;

    /// Decoded feature values for a card, for diagnostics.
    fn features(&self, card: Card) -> Vec<usize>;
}

/// The classic rules: a card id is read as `feature_count` digits in
/// base `feature_size`, and a set is legal when every feature is either
/// the same on all cards or different on all cards.
#[derive(Debug, Clone, Copy)]
pub struct StandardOracle {
    feature_size: usize,
    feature_count: usize,
}

impl StandardOracle {
    pub fn new(feature_size: usize, feature_count: usize) -> Self {
        Self {
            feature_size,
            feature_count,
        }
    }
}

impl Default for StandardOracle {
    fn default() -> Self {
        Self::new(3, 4)
    }
}

impl SetOracle for StandardOracle {
    fn is_set(&self, cards: &[Card]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }

        let decoded: Vec<Vec<usize>> = cards.iter().map(|&c| self.features(c)).collect();
        (0..self.feature_count).all(|feature| {
            let mut values: Vec<usize> = decoded.iter().map(|f| f[feature]).collect();
            values.sort_unstable();
            values.dedup();
            values.len() == 1 || values.len() == cards.len()
        })
    }

    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        combinations(cards, self.feature_size, limit, |combo| self.is_set(combo))
    }

    fn features(&self, card: Card) -> Vec<usize> {
        let mut rest = card;
        (0..self.feature_count)
            .map(|_| {
                let digit = rest % self.feature_size;
                rest /= self.feature_size;
                digit
            })
            .collect()
    }
}

/// Collects up to `limit` combinations of `k` cards accepted by `keep`.
pub fn combinations<F>(cards: &[Card], k: usize, limit: usize, keep: F) -> Vec<Vec<Card>>
where
    F: Fn(&[Card]) -> bool,
{
    fn walk<F>(
        cards: &[Card],
        k: usize,
        start: usize,
        combo: &mut Vec<Card>,
        found: &mut Vec<Vec<Card>>,
        limit: usize,
        keep: &F,
    ) where
        F: Fn(&[Card]) -> bool,
    {
        if found.len() >= limit {
            return;
        }
        if combo.len() == k {
            if keep(combo) {
                found.push(combo.clone());
            }
            return;
        }
        let needed = k - combo.len();
        for i in start..=cards.len().saturating_sub(needed) {
            if i >= cards.len() {
                break;
            }
            combo.push(cards[i]);
            walk(cards, k, i + 1, combo, found, limit, keep);
            combo.pop();
            if found.len() >= limit {
                return;
            }
        }
    }

    let mut found = Vec::new();
    if k == 0 || k > cards.len() || limit == 0 {
        return found;
    }
    walk(cards, k, 0, &mut Vec::with_capacity(k), &mut found, limit, &keep);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_are_base_three_digits() {
        let oracle = StandardOracle::default();
        assert_eq!(oracle.features(0), vec![0, 0, 0, 0]);
        assert_eq!(oracle.features(1), vec![1, 0, 0, 0]);
        assert_eq!(oracle.features(5), vec![2, 1, 0, 0]);
        assert_eq!(oracle.features(80), vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_all_distinct_first_feature_is_a_set() {
        let oracle = StandardOracle::default();
        // Differ only in the first feature
        assert!(oracle.is_set(&[0, 1, 2]));
        // Every feature distinct
        assert!(oracle.is_set(&[0, 40, 80]));
    }

    #[test]
    fn test_two_equal_one_different_is_not_a_set() {
        let oracle = StandardOracle::default();
        // First feature values 0, 0, 1
        assert!(!oracle.is_set(&[0, 3, 1]));
    }

    #[test]
    fn test_wrong_size_is_not_a_set() {
        let oracle = StandardOracle::default();
        assert!(!oracle.is_set(&[0, 1]));
        assert!(!oracle.is_set(&[0, 1, 2, 3]));
    }

    #[test]
    fn test_find_sets_respects_limit() {
        let oracle = StandardOracle::default();
        let deck: Vec<Card> = (0..81).collect();
        assert_eq!(oracle.find_sets(&deck, 1).len(), 1);
        assert_eq!(oracle.find_sets(&deck, 5).len(), 5);
    }

    #[test]
    fn test_full_deck_has_1080_sets() {
        let oracle = StandardOracle::default();
        let deck: Vec<Card> = (0..81).collect();
        assert_eq!(oracle.find_sets(&deck, usize::MAX).len(), 1080);
    }

    #[test]
    fn test_find_sets_on_small_collections() {
        let oracle = StandardOracle::default();
        assert!(oracle.find_sets(&[0, 1], usize::MAX).is_empty());
        assert_eq!(oracle.find_sets(&[0, 1, 2], usize::MAX), vec![vec![0, 1, 2]]);
        assert!(oracle.find_sets(&[0, 1, 3], usize::MAX).is_empty());
    }

    #[test]
    fn test_combinations_counts() {
        let cards: Vec<Card> = (0..6).collect();
        assert_eq!(combinations(&cards, 3, usize::MAX, |_| true).len(), 20);
        assert_eq!(combinations(&cards, 2, usize::MAX, |_| true).len(), 15);
        assert!(combinations(&cards, 7, usize::MAX, |_| true).is_empty());
    }
}
