//! Player seats and their racks.

use crate::tile::{sort_rack, Tile, TileId};
use serde::{Deserialize, Serialize};

/// Player index (0-3)
pub type PlayerId = usize;

/// Minimum players at the table
pub const MIN_PLAYERS: usize = 2;

/// Maximum players at the table
pub const MAX_PLAYERS: usize = 4;

/// Longest name kept for a player
pub const MAX_NAME_LEN: usize = 20;

/// Tiles dealt to each player at the start
pub const STARTING_RACK_SIZE: usize = 14;

/// Default seat name ("Player 1", "Player 2", ...)
pub fn default_name(seat: PlayerId) -> String {
    format!("Player {}", seat + 1)
}

/// Trim a requested name and cap its length, falling back to the seat default when blank
pub fn normalize_name(seat: PlayerId, raw: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        default_name(seat)
    } else {
        trimmed.to_string()
    }
}

/// A single seat: a name and a private rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Tiles held, kept in display order
    pub rack: Vec<Tile>,
}

impl Player {
    /// Create a player with an empty rack
    pub fn new(name: String) -> Self {
        Self {
            name,
            rack: Vec::new(),
        }
    }

    pub fn has_tile(&self, tile: TileId) -> bool {
        self.rack.iter().any(|t| t.id == tile)
    }

    /// Remove a tile from the rack by id
    pub fn take(&mut self, tile: TileId) -> Option<Tile> {
        let pos = self.rack.iter().position(|t| t.id == tile)?;
        Some(self.rack.remove(pos))
    }

    /// Add a tile and restore display order
    pub fn receive(&mut self, tile: Tile) {
        self.rack.push(tile);
        self.sort_rack();
    }

    pub fn sort_rack(&mut self) {
        sort_rack(&mut self.rack);
    }
}
