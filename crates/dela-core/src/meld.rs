//! Melds on the table and the rules that decide whether they are legal.
//!
//! Validation is a pure function of a meld's tiles and the [`RuleSet`] in
//! force; it never looks at turn state.

use crate::tile::{Tile, TileColor, TileId, MAX_RANK};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Minimum tiles in a legal meld
pub const MIN_MELD_SIZE: usize = 3;

/// Maximum tiles in a group (one per color)
pub const MAX_GROUP_SIZE: usize = 4;

/// Unique meld identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeldId(pub String);

impl MeldId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        MeldId(format!("m{}", Uuid::new_v4().simple()))
    }
}

impl fmt::Display for MeldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MeldId {
    fn from(s: &str) -> Self {
        MeldId(s.to_string())
    }
}

/// What happens when a tile is placed into a meld id that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Reject the placement with `GameError::MeldNotFound`
    #[default]
    Strict,
    /// Materialize a meld with the requested id and place into it
    CreateMissing,
}

/// Tunable rule flags.
///
/// The default is the permissive ruleset the game has always played with;
/// [`RuleSet::strict`] tightens the joker quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// A meld made only of jokers is legal
    pub all_joker_melds: bool,
    /// Jokers beyond those filling gaps may extend a run past rank 13
    pub unbounded_joker_runs: bool,
    /// Placement into a missing meld id
    pub placement: PlacementMode,
    /// Points required for a player's opening
    pub opening_threshold: u32,
}

impl RuleSet {
    /// Stricter variant: all-joker melds are illegal and runs must fit 1..=13
    pub fn strict() -> Self {
        Self {
            all_joker_melds: false,
            unbounded_joker_runs: false,
            placement: PlacementMode::Strict,
            opening_threshold: 30,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            all_joker_melds: true,
            unbounded_joker_runs: true,
            placement: PlacementMode::Strict,
            opening_threshold: 30,
        }
    }
}

/// A grouping of tiles on the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub id: MeldId,
    /// Tiles in insertion order
    pub tiles: Vec<Tile>,
}

impl Meld {
    /// Create an empty meld with a fresh id
    pub fn new() -> Self {
        Self::with_id(MeldId::generate())
    }

    /// Create an empty meld with a given id
    pub fn with_id(id: MeldId) -> Self {
        Self {
            id,
            tiles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.iter().any(|t| t.id == tile)
    }

    /// Remove a tile by id, returning it if present
    pub fn take(&mut self, tile: TileId) -> Option<Tile> {
        let pos = self.tiles.iter().position(|t| t.id == tile)?;
        Some(self.tiles.remove(pos))
    }

    /// Sum of the ranks of non-joker tiles
    pub fn value(&self) -> u32 {
        meld_value(&self.tiles)
    }

    /// Whether this meld is legal under `rules`
    pub fn is_valid(&self, rules: &RuleSet) -> bool {
        is_valid_meld(&self.tiles, rules)
    }
}

impl Default for Meld {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of non-joker ranks (jokers contribute 0)
pub fn meld_value(tiles: &[Tile]) -> u32 {
    tiles.iter().map(Tile::value).sum()
}

/// Decide whether a set of tiles forms a legal group or run.
pub fn is_valid_meld(tiles: &[Tile], rules: &RuleSet) -> bool {
    if tiles.len() < MIN_MELD_SIZE {
        return false;
    }

    let numbered: Vec<(u8, TileColor)> = tiles
        .iter()
        .filter_map(|t| Some((t.rank()?, t.color()?)))
        .collect();
    let jokers = tiles.len() - numbered.len();

    let Some(&(first_rank, first_color)) = numbered.first() else {
        return rules.all_joker_melds;
    };

    if numbered.iter().all(|&(rank, _)| rank == first_rank) {
        return is_valid_group(&numbered, tiles.len());
    }

    if numbered.iter().all(|&(_, color)| color == first_color) {
        let ranks: Vec<u8> = numbered.iter().map(|&(rank, _)| rank).collect();
        return is_valid_run(ranks, jokers, rules);
    }

    false
}

/// Same rank, distinct colors, at most one tile per color
fn is_valid_group(numbered: &[(u8, TileColor)], total: usize) -> bool {
    let colors: HashSet<_> = numbered.iter().map(|&(_, color)| color).collect();
    colors.len() == numbered.len() && total <= MAX_GROUP_SIZE
}

/// Same color, distinct ranks, with jokers covering every gap
fn is_valid_run(mut ranks: Vec<u8>, jokers: usize, rules: &RuleSet) -> bool {
    ranks.sort_unstable();

    if ranks.windows(2).any(|w| w[0] == w[1]) {
        return false;
    }

    let gaps: usize = ranks
        .windows(2)
        .map(|w| usize::from(w[1] - w[0] - 1))
        .sum();

    if gaps > jokers {
        return false;
    }

    rules.unbounded_joker_runs || ranks.len() + jokers <= usize::from(MAX_RANK)
}

/// Whether every meld on a table is legal (an empty table is)
pub fn table_is_valid(table: &[Meld], rules: &RuleSet) -> bool {
    table.iter().all(|m| m.is_valid(rules))
}

/// Sum of the values of every meld on a table
pub fn table_value(table: &[Meld]) -> u32 {
    table.iter().map(Meld::value).sum()
}
