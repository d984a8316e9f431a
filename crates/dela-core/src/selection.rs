//! Holding tiles and moving them between the rack and the table.
//!
//! At most one tile is held at a time. Every move takes the tile out of its
//! container and appends it to the destination inside the same call, then
//! runs [`GameState::reconcile`].

use crate::actions::{GameEvent, Location, Selection};
use crate::game::{GameError, GameState};
use crate::meld::{Meld, MeldId, PlacementMode};
use crate::tile::Tile;
use tracing::warn;

impl GameState {
    /// Whether the referenced tile is currently in the named container
    pub(crate) fn selection_exists(&self, selection: &Selection) -> bool {
        match selection {
            Selection::Rack { tile } => self.current_player().has_tile(*tile),
            Selection::Meld { meld, tile } => {
                self.find_meld(meld).is_some_and(|m| m.contains(*tile))
            }
        }
    }

    /// Pick up a tile.
    ///
    /// Selecting the tile already held puts it down; selecting another tile
    /// replaces the held one. A reference to a missing tile is ignored.
    pub fn select(&mut self, selection: Selection) -> Vec<GameEvent> {
        if !self.selection_exists(&selection) {
            return Vec::new();
        }

        if self.selection.as_ref() == Some(&selection) {
            self.selection = None;
            return vec![GameEvent::SelectionCleared];
        }

        self.selection = Some(selection.clone());
        vec![GameEvent::TileSelected(selection)]
    }

    pub fn clear_selection(&mut self) -> Vec<GameEvent> {
        match self.selection.take() {
            Some(_) => vec![GameEvent::SelectionCleared],
            None => Vec::new(),
        }
    }

    /// Remove the held tile from wherever it is
    fn take_selected(&mut self) -> Option<(Tile, Location)> {
        match self.selection.clone()? {
            Selection::Rack { tile } => {
                let current = self.current;
                let taken = self.players[current].take(tile)?;
                Some((taken, Location::Rack(current)))
            }
            Selection::Meld { meld, tile } => {
                let taken = self.find_meld_mut(&meld)?.take(tile)?;
                Some((taken, Location::Meld(meld)))
            }
        }
    }

    /// Move the held tile to the end of a meld
    pub fn move_selected_to_meld(&mut self, target: MeldId) -> Result<Vec<GameEvent>, GameError> {
        if self.selection.is_none() {
            return Err(GameError::NoSelection);
        }

        let target_exists = self.find_meld(&target).is_some();
        if !target_exists && self.rules.placement == PlacementMode::Strict {
            return Err(GameError::MeldNotFound(target));
        }

        let Some((tile, from)) = self.take_selected() else {
            return Ok(self.reconcile());
        };

        let mut events = Vec::new();
        if !target_exists {
            warn!(meld = %target, "placing into a missing meld, creating it");
            self.table.push(Meld::with_id(target.clone()));
            events.push(GameEvent::MeldCreated {
                meld: target.clone(),
            });
        }

        if let Some(meld) = self.find_meld_mut(&target) {
            meld.tiles.push(tile);
        }

        events.push(GameEvent::TileMoved {
            tile: tile.id,
            from,
            to: Location::Meld(target),
        });
        events.extend(self.clear_selection());
        events.extend(self.reconcile());
        Ok(events)
    }

    /// Move the held rack tile into the active meld
    pub fn move_selected_to_active_meld(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let target = self
            .active_meld()
            .map(|m| m.id.clone())
            .ok_or(GameError::NoActiveMeld)?;

        if !self.selection.as_ref().is_some_and(Selection::is_rack) {
            return Err(GameError::RackTileRequired);
        }

        self.move_selected_to_meld(target)
    }

    /// Take the held tile back to the current player's rack
    pub fn move_selected_to_rack(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.selection.is_none() {
            return Err(GameError::NoSelection);
        }

        let Some((tile, from)) = self.take_selected() else {
            return Ok(self.reconcile());
        };

        let current = self.current;
        self.players[current].receive(tile);

        let mut events = vec![GameEvent::TileMoved {
            tile: tile.id,
            from,
            to: Location::Rack(current),
        }];
        events.extend(self.clear_selection());
        events.extend(self.reconcile());
        Ok(events)
    }

    /// Add an empty meld to the table and make it active.
    ///
    /// The meld is expected to be filled straight away; the next reconcile
    /// removes it otherwise.
    pub fn create_meld(&mut self) -> Vec<GameEvent> {
        let meld = Meld::new();
        let id = meld.id.clone();
        self.table.push(meld);
        self.active_meld = Some(id.clone());

        vec![
            GameEvent::MeldCreated { meld: id.clone() },
            GameEvent::ActiveMeldChanged { meld: Some(id) },
        ]
    }

    /// Point the active-meld marker at an existing meld
    pub fn set_active_meld(&mut self, meld: MeldId) -> Result<Vec<GameEvent>, GameError> {
        if self.find_meld(&meld).is_none() {
            return Err(GameError::MeldNotFound(meld));
        }

        self.active_meld = Some(meld.clone());
        Ok(vec![GameEvent::ActiveMeldChanged { meld: Some(meld) }])
    }
}
