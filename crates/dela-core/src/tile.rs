//! Tiles and the deck.
//!
//! This module contains:
//! - Tile colors and faces (numbered or joker)
//! - The canonical 106-tile deck
//! - Shuffling and the rack sort order

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Highest rank printed on a tile
pub const MAX_RANK: u8 = 13;

/// Copies of each (rank, color) pair in a deck
pub const COPIES_PER_TILE: usize = 2;

/// Jokers in a deck
pub const JOKER_COUNT: usize = 2;

/// Total tiles in a canonical deck
pub const DECK_SIZE: usize = COPIES_PER_TILE * TileColor::ALL.len() * MAX_RANK as usize + JOKER_COUNT;

/// Tile color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    Red,
    Blue,
    Yellow,
    Black,
}

impl TileColor {
    /// All colors, in rack sort order
    pub const ALL: [TileColor; 4] = [
        TileColor::Red,
        TileColor::Blue,
        TileColor::Yellow,
        TileColor::Black,
    ];

    /// Lowercase name used in labels
    pub fn name(&self) -> &'static str {
        match self {
            TileColor::Red => "red",
            TileColor::Blue => "blue",
            TileColor::Yellow => "yellow",
            TileColor::Black => "black",
        }
    }

    /// Position in the rack sort order
    pub fn sort_index(&self) -> u8 {
        match self {
            TileColor::Red => 0,
            TileColor::Blue => 1,
            TileColor::Yellow => 2,
            TileColor::Black => 3,
        }
    }
}

/// Unique tile identifier, assigned when the deck is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// What is printed on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TileFace {
    /// A numbered tile (rank 1-13)
    Number { rank: u8, color: TileColor },
    /// Wildcard
    Joker,
}

/// A single game piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub face: TileFace,
}

impl Tile {
    /// Create a numbered tile
    pub fn number(id: u32, rank: u8, color: TileColor) -> Self {
        Self {
            id: TileId(id),
            face: TileFace::Number { rank, color },
        }
    }

    /// Create a joker
    pub fn joker(id: u32) -> Self {
        Self {
            id: TileId(id),
            face: TileFace::Joker,
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self.face, TileFace::Joker)
    }

    /// Rank of a numbered tile, `None` for jokers
    pub fn rank(&self) -> Option<u8> {
        match self.face {
            TileFace::Number { rank, .. } => Some(rank),
            TileFace::Joker => None,
        }
    }

    /// Color of a numbered tile, `None` for jokers
    pub fn color(&self) -> Option<TileColor> {
        match self.face {
            TileFace::Number { color, .. } => Some(color),
            TileFace::Joker => None,
        }
    }

    /// Points this tile contributes toward the opening (jokers count 0)
    pub fn value(&self) -> u32 {
        self.rank().map(u32::from).unwrap_or(0)
    }

    /// Short face label: the rank, or "J"
    pub fn label(&self) -> String {
        match self.face {
            TileFace::Number { rank, .. } => rank.to_string(),
            TileFace::Joker => "J".to_string(),
        }
    }

    /// Secondary label: the color name, or "joker"
    pub fn sub_label(&self) -> &'static str {
        match self.face {
            TileFace::Number { color, .. } => color.name(),
            TileFace::Joker => "joker",
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sub_label(), self.label())
    }
}

/// Build the canonical deck: two copies of every (rank, color) plus two jokers.
///
/// Ids are assigned from a counter in construction order, so composition and
/// ids are identical for every call; only `shuffle` introduces randomness.
pub fn make_deck() -> Vec<Tile> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 0u32;

    for _ in 0..COPIES_PER_TILE {
        for color in TileColor::ALL {
            for rank in 1..=MAX_RANK {
                deck.push(Tile::number(next_id, rank, color));
                next_id += 1;
            }
        }
    }

    for _ in 0..JOKER_COUNT {
        deck.push(Tile::joker(next_id));
        next_id += 1;
    }

    deck
}

/// Shuffle tiles in place (Fisher-Yates)
pub fn shuffle<R: Rng + ?Sized>(tiles: &mut [Tile], rng: &mut R) {
    tiles.shuffle(rng);
}

/// Ordering used to present a rack: jokers, then color, then rank.
///
/// Presentation only; it says nothing about which tiles can form a meld.
pub fn rack_order(a: &Tile, b: &Tile) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(tile: &Tile) -> (u8, u8, u8) {
    match tile.face {
        TileFace::Joker => (0, 0, 0),
        TileFace::Number { rank, color } => (1, color.sort_index(), rank),
    }
}

/// Sort a rack for display
pub fn sort_rack(rack: &mut [Tile]) {
    rack.sort_by(rack_order);
}
