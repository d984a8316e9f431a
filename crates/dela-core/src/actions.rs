//! Game actions that players can take.
//!
//! This module defines every gesture the front-end can forward to the engine
//! and the events the engine reports back after applying one.

use crate::meld::MeldId;
use crate::player::PlayerId;
use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};

/// A reference to the one tile a player is holding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "area", rename_all = "lowercase")]
pub enum Selection {
    /// A tile on the current player's rack
    Rack { tile: TileId },
    /// A tile inside a meld on the table
    Meld { meld: MeldId, tile: TileId },
}

impl Selection {
    pub fn rack(tile: TileId) -> Self {
        Selection::Rack { tile }
    }

    pub fn meld(meld: MeldId, tile: TileId) -> Self {
        Selection::Meld { meld, tile }
    }

    /// The selected tile's id
    pub fn tile(&self) -> TileId {
        match self {
            Selection::Rack { tile } | Selection::Meld { tile, .. } => *tile,
        }
    }

    pub fn is_rack(&self) -> bool {
        matches!(self, Selection::Rack { .. })
    }
}

/// Where a tile sits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Rack(PlayerId),
    Meld(MeldId),
    Pile,
}

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Selection ====================
    /// Pick up a tile (or put it down if already held)
    Select(Selection),
    /// Drop whatever is held
    ClearSelection,

    // ==================== Table ====================
    /// Start a new, empty meld and make it active
    CreateMeld,
    /// Point the active-meld marker at a meld
    SetActiveMeld(MeldId),
    /// Move the held tile into a meld
    MoveSelectedToMeld(MeldId),
    /// Move the held rack tile into the active meld
    MoveSelectedToActiveMeld,
    /// Take the held tile back to the current rack
    MoveSelectedToRack,

    // ==================== Rack ====================
    /// Re-sort the current rack
    SortRack,
    /// Draw one tile from the pile
    DrawTile,

    // ==================== Turn Management ====================
    /// Hide the pass overlay once the next player holds the device
    RevealRack,
    /// End your turn
    EndTurn,

    // ==================== Presentation ====================
    /// Switch the color theme
    SetTheme(String),
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A tile is now held
    TileSelected(Selection),

    /// The held tile was put down
    SelectionCleared,

    /// An empty meld was added to the table
    MeldCreated { meld: MeldId },

    /// The active meld pointer moved
    ActiveMeldChanged { meld: Option<MeldId> },

    /// A tile changed container
    TileMoved {
        tile: TileId,
        from: Location,
        to: Location,
    },

    /// An empty meld was swept off the table
    MeldRemoved { meld: MeldId },

    /// A rack was re-sorted
    RackSorted { player: PlayerId },

    /// A tile came off the pile
    TileDrawn {
        player: PlayerId,
        tile: Tile,
        pile_remaining: usize,
    },

    /// A player met the opening requirement
    PlayerOpened { player: PlayerId, table_value: u32 },

    /// The turn passed to the next seat
    TurnEnded { player: PlayerId, next: PlayerId },

    /// The pass overlay was shown or hidden
    PassOverlayChanged { visible: bool },

    /// A player emptied their rack
    GameWon { player: PlayerId },

    /// The theme changed
    ThemeChanged { theme: String },
}
