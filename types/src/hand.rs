use serde::{Deserialize, Serialize};

/// Poker hand rankings for a 5-card draw hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandRank {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

/// The five shared reward pools, each bound to one qualifying hand rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TubeType {
    Straight = 0,
    Flush = 1,
    FullHouse = 2,
    StraightFlush = 3,
    RoyalFlush = 4,
}

impl TubeType {
    pub const ALL: [TubeType; 5] = [
        TubeType::Straight,
        TubeType::Flush,
        TubeType::FullHouse,
        TubeType::StraightFlush,
        TubeType::RoyalFlush,
    ];

    /// Short display code used in reports and events.
    pub fn code(&self) -> &'static str {
        match self {
            TubeType::Straight => "ST",
            TubeType::Flush => "FL",
            TubeType::FullHouse => "FH",
            TubeType::StraightFlush => "SF",
            TubeType::RoyalFlush => "RF",
        }
    }

    /// The hand rank that drains this tube.
    pub fn hand_rank(&self) -> HandRank {
        match self {
            TubeType::Straight => HandRank::Straight,
            TubeType::Flush => HandRank::Flush,
            TubeType::FullHouse => HandRank::FullHouse,
            TubeType::StraightFlush => HandRank::StraightFlush,
            TubeType::RoyalFlush => HandRank::RoyalFlush,
        }
    }

    /// Tube funded by a winning hand of `rank`, if any.
    ///
    /// Four of a kind qualifies for no tube: it pays from the house like any
    /// other non-tube win.
    pub fn from_hand_rank(rank: HandRank) -> Option<TubeType> {
        match rank {
            HandRank::Straight => Some(TubeType::Straight),
            HandRank::Flush => Some(TubeType::Flush),
            HandRank::FullHouse => Some(TubeType::FullHouse),
            HandRank::StraightFlush => Some(TubeType::StraightFlush),
            HandRank::RoyalFlush => Some(TubeType::RoyalFlush),
            _ => None,
        }
    }
}
