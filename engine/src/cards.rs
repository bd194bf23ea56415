//! Hand classification and comparison for 5-card draw hands.
//!
//! The HT decision engine consumes the classification and the two partial
//! draw predicates; the showdown consumes the total order.

use std::cmp::Ordering;

use drawhouse_types::HandRank;

/// Card rank (1-13, ace = 1).
pub fn card_rank(card: u8) -> u8 {
    (card % 13) + 1
}

/// Card suit (0-3).
pub fn card_suit(card: u8) -> u8 {
    card / 13
}

/// Comparison value of a card, ace high.
fn card_value(card: u8) -> u8 {
    let rank = card_rank(card);
    if rank == 1 {
        14
    } else {
        rank
    }
}

/// A classified hand: its rank category plus the tie-break key used to
/// order two hands of the same category.
///
/// The derived `Ord` is the showdown comparator: category first, then the
/// grouped card values (count-major, value-minor, descending).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandClass {
    pub rank: HandRank,
    tiebreak: [u8; 5],
}

/// Total order over two classified hands.
pub fn compare_hands(a: &HandClass, b: &HandClass) -> Ordering {
    a.cmp(b)
}

/// Evaluate a 5-card hand.
/// Fixed arrays throughout; no heap allocation.
pub fn classify(cards: &[u8; 5]) -> HandClass {
    let mut ranks = [0u8; 5];
    let mut suits = [0u8; 5];
    for i in 0..5 {
        ranks[i] = card_rank(cards[i]);
        suits[i] = card_suit(cards[i]);
    }
    ranks.sort_unstable();

    let is_flush = suits[0] == suits[1]
        && suits[1] == suits[2]
        && suits[2] == suits[3]
        && suits[3] == suits[4];

    let has_duplicates = ranks[0] == ranks[1]
        || ranks[1] == ranks[2]
        || ranks[2] == ranks[3]
        || ranks[3] == ranks[4];

    // A-10-J-Q-K and A-2-3-4-5 are the two ace straights.
    let is_royal_shape = ranks == [1, 10, 11, 12, 13];
    let is_wheel = ranks == [1, 2, 3, 4, 5];
    let is_straight = if has_duplicates {
        false
    } else {
        is_royal_shape || is_wheel || ranks[4] - ranks[0] == 4
    };

    let mut counts = [0u8; 15];
    for &card in cards {
        counts[card_value(card) as usize] += 1;
    }

    let mut pairs = 0u8;
    let mut three_kind = false;
    let mut four_kind = false;
    for &count in counts.iter() {
        match count {
            2 => pairs += 1,
            3 => three_kind = true,
            4 => four_kind = true,
            _ => {}
        }
    }

    let rank = if is_royal_shape && is_flush {
        HandRank::RoyalFlush
    } else if is_straight && is_flush {
        HandRank::StraightFlush
    } else if four_kind {
        HandRank::FourOfAKind
    } else if three_kind && pairs == 1 {
        HandRank::FullHouse
    } else if is_flush {
        HandRank::Flush
    } else if is_straight {
        HandRank::Straight
    } else if three_kind {
        HandRank::ThreeOfAKind
    } else if pairs == 2 {
        HandRank::TwoPair
    } else if pairs == 1 {
        HandRank::Pair
    } else {
        HandRank::HighCard
    };

    HandClass {
        rank,
        tiebreak: tiebreak_key(&counts, is_wheel),
    }
}

/// Expand value counts into the 5-element tie-break key: values ordered by
/// occurrence count, then by value, both descending. The wheel ranks as a
/// 5-high straight, so its ace sorts low.
fn tiebreak_key(counts: &[u8; 15], is_wheel: bool) -> [u8; 5] {
    if is_wheel {
        return [5, 4, 3, 2, 1];
    }
    let mut groups: Vec<(u8, u8)> = (2u8..=14)
        .filter(|&v| counts[v as usize] > 0)
        .map(|v| (counts[v as usize], v))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let mut key = [0u8; 5];
    let mut i = 0;
    for (count, value) in groups {
        for _ in 0..count {
            key[i] = value;
            i += 1;
        }
    }
    key
}

/// Four cards of one suit: the flush-draw predicate.
/// Returns the positions to hold, or `None` when no suit has exactly four.
pub fn four_to_flush(cards: &[u8; 5]) -> Option<Vec<usize>> {
    let mut suit_counts = [0u8; 4];
    for &card in cards {
        suit_counts[card_suit(card) as usize] += 1;
    }
    let suit = suit_counts.iter().position(|&c| c == 4)? as u8;
    Some(
        (0..5)
            .filter(|&i| card_suit(cards[i]) == suit)
            .collect(),
    )
}

/// Four distinct values inside a five-value window: the straight-draw
/// predicate (open-ended and gutshot alike). Returns the positions to hold.
pub fn four_to_straight(cards: &[u8; 5]) -> Option<Vec<usize>> {
    for skip in 0..5 {
        let kept: Vec<usize> = (0..5).filter(|&i| i != skip).collect();
        // Try the ace both low and high.
        for ace_high in [false, true] {
            let mut values: Vec<u8> = kept
                .iter()
                .map(|&i| {
                    let rank = card_rank(cards[i]);
                    if rank == 1 && ace_high {
                        14
                    } else {
                        rank
                    }
                })
                .collect();
            values.sort_unstable();
            values.dedup();
            if values.len() == 4 && values[3] - values[0] <= 4 {
                return Some(kept);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_royal_flush() {
        let cards = [9, 10, 11, 12, 0]; // 10-J-Q-K-A of spades
        assert_eq!(classify(&cards).rank, HandRank::RoyalFlush);
    }

    #[test]
    fn test_classify_straight_flush() {
        let cards = [4, 5, 6, 7, 8]; // 5-6-7-8-9 of spades
        assert_eq!(classify(&cards).rank, HandRank::StraightFlush);
    }

    #[test]
    fn test_classify_wheel_is_straight_flush_when_suited() {
        let cards = [0, 1, 2, 3, 4]; // A-2-3-4-5 of spades
        assert_eq!(classify(&cards).rank, HandRank::StraightFlush);
    }

    #[test]
    fn test_classify_four_of_a_kind() {
        let cards = [0, 13, 26, 39, 1]; // A-A-A-A-2
        assert_eq!(classify(&cards).rank, HandRank::FourOfAKind);
    }

    #[test]
    fn test_classify_full_house() {
        let cards = [12, 25, 38, 11, 24]; // K-K-K-Q-Q
        assert_eq!(classify(&cards).rank, HandRank::FullHouse);
    }

    #[test]
    fn test_classify_flush() {
        let cards = [0, 2, 4, 6, 8]; // A-3-5-7-9 of spades
        assert_eq!(classify(&cards).rank, HandRank::Flush);
    }

    #[test]
    fn test_classify_straight_mixed_suits() {
        let cards = [4, 18, 32, 7, 21]; // 5-6-7-8-9 mixed
        assert_eq!(classify(&cards).rank, HandRank::Straight);
    }

    #[test]
    fn test_classify_three_of_a_kind() {
        let cards = [0, 13, 26, 1, 2]; // A-A-A-2-3
        assert_eq!(classify(&cards).rank, HandRank::ThreeOfAKind);
    }

    #[test]
    fn test_classify_two_pair() {
        let cards = [0, 13, 1, 14, 2]; // A-A-2-2-3
        assert_eq!(classify(&cards).rank, HandRank::TwoPair);
    }

    #[test]
    fn test_classify_low_pair_is_still_pair() {
        let cards = [1, 14, 3, 4, 5]; // 2-2-4-5-6
        assert_eq!(classify(&cards).rank, HandRank::Pair);
    }

    #[test]
    fn test_classify_high_card() {
        let cards = [0, 15, 4, 19, 8]; // A-3-5-7-9 mixed suits
        assert_eq!(classify(&cards).rank, HandRank::HighCard);
    }

    #[test]
    fn test_compare_pair_of_aces_beats_pair_of_kings() {
        let aces = classify(&[0, 13, 1, 2, 3]); // A-A-2-3-4
        let kings = classify(&[12, 25, 1, 2, 3]); // K-K-2-3-4
        assert_eq!(compare_hands(&aces, &kings), Ordering::Greater);
    }

    #[test]
    fn test_compare_kicker_decides() {
        let king_kicker = classify(&[1, 14, 12, 2, 3]); // 2-2-K-3-4
        let queen_kicker = classify(&[1, 14, 11, 2, 3]); // 2-2-Q-3-4
        assert_eq!(compare_hands(&king_kicker, &queen_kicker), Ordering::Greater);
    }

    #[test]
    fn test_compare_wheel_loses_to_six_high_straight() {
        let wheel = classify(&[0, 1, 15, 3, 17]); // A-2-3-4-5 mixed
        let six_high = classify(&[1, 15, 3, 17, 5]); // 2-3-4-5-6 mixed
        assert_eq!(wheel.rank, HandRank::Straight);
        assert_eq!(six_high.rank, HandRank::Straight);
        assert_eq!(compare_hands(&wheel, &six_high), Ordering::Less);
    }

    #[test]
    fn test_compare_equal_hands_tie() {
        let a = classify(&[1, 15, 3, 17, 5]);
        let b = classify(&[14, 2, 16, 4, 18]); // same values, other suits
        assert_eq!(compare_hands(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_four_to_flush_positions() {
        let cards = [0, 2, 4, 6, 21]; // four spades + one heart
        let holds = four_to_flush(&cards).expect("flush draw");
        assert_eq!(holds, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_four_to_flush_rejects_made_flush() {
        let cards = [0, 2, 4, 6, 8];
        assert_eq!(four_to_flush(&cards), None);
    }

    #[test]
    fn test_four_to_straight_open_ended() {
        let cards = [4, 18, 32, 7, 25]; // 5-6-7-8 + K
        let holds = four_to_straight(&cards).expect("straight draw");
        assert_eq!(holds, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_four_to_straight_gutshot() {
        let cards = [4, 18, 33, 8, 25]; // 5-6-8-9 + K, gutshot needing a 7
        let holds = four_to_straight(&cards).expect("gutshot draw");
        assert_eq!(holds, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_four_to_straight_ace_high() {
        let cards = [0, 23, 24, 25, 3]; // A-J-Q-K + 4
        let holds = four_to_straight(&cards).expect("broadway draw");
        assert_eq!(holds, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_four_to_straight_none() {
        let cards = [0, 18, 9, 24, 3]; // A-6-10-Q-4
        assert_eq!(four_to_straight(&cards), None);
    }
}
