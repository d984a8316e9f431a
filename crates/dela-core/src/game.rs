//! Core game state machine.
//!
//! This module contains the `GameState` store, turn progression, the opening
//! requirement, and the `reconcile` step that keeps the table's pointers
//! consistent after every structural change.

use crate::actions::{GameAction, GameEvent, Location, Selection};
use crate::meld::{table_is_valid, table_value, Meld, MeldId, RuleSet};
use crate::player::{normalize_name, Player, PlayerId, MAX_PLAYERS, MIN_PLAYERS, STARTING_RACK_SIZE};
use crate::theme::{default_theme_id, Theme};
use crate::tile::{make_deck, shuffle, Tile, TileId, DECK_SIZE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Snapshot schema version; snapshots with any other tag are discarded on load
pub const SCHEMA_VERSION: &str = "0.2";

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// The current player may act
    #[default]
    AwaitingAction,

    /// A player emptied their rack; no further turns
    Won { winner: PlayerId },
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("A game needs 2-4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("No tile selected.")]
    NoSelection,

    #[error("Select a rack tile first.")]
    RackTileRequired,

    #[error("No active meld. Tap New Meld first.")]
    NoActiveMeld,

    #[error("Meld {0} not found")]
    MeldNotFound(MeldId),

    #[error("No tiles left in the pile.")]
    PileEmpty,

    #[error("Fix invalid melds before ending turn.")]
    InvalidTable,

    #[error("You must open with melds totaling {threshold}.")]
    OpeningRequired { threshold: u32 },

    #[error("Opening meld must total {threshold} points.")]
    OpeningTooLow { threshold: u32, table_value: u32 },

    #[error("Game is over")]
    GameOver,
}

/// Ways a loaded or imported state can break the ownership invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("player count {0} outside 2-4")]
    PlayerCount(usize),

    #[error("current player {current} out of range for {players} players")]
    CurrentOutOfRange { current: usize, players: usize },

    #[error("{flags} opened flags for {players} players")]
    OpenedFlags { flags: usize, players: usize },

    #[error("winner {0} is not a player")]
    UnknownWinner(PlayerId),

    #[error("expected {expected} tiles, found {found}")]
    TileCount { expected: usize, found: usize },

    #[error("tile {0} appears more than once")]
    DuplicateTile(TileId),

    #[error("tile {0} does not match the deck")]
    ForeignTile(TileId),

    #[error("meld id {0} is used twice")]
    DuplicateMeld(MeldId),
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Schema version tag
    #[serde(rename = "v")]
    pub version: String,
    /// Selected theme
    #[serde(default = "default_theme_id")]
    pub theme_id: String,
    /// All players, in seat order
    pub players: Vec<Player>,
    /// Current player index
    pub current: PlayerId,
    /// Draw pile; the end of the vector is the top
    pub pile: Vec<Tile>,
    /// Melds on the table, in creation order
    pub table: Vec<Meld>,
    /// Whether each player has met the opening requirement
    pub has_opened: Vec<bool>,
    /// Meld that "send to active meld" targets
    #[serde(rename = "activeMeldId")]
    pub active_meld: Option<MeldId>,
    /// The one held tile, if any
    #[serde(rename = "selected")]
    pub selection: Option<Selection>,
    /// Whether the rack is hidden until the next player takes the device
    pub pass_overlay: bool,
    #[serde(default)]
    pub phase: GamePhase,
    #[serde(default)]
    pub rules: RuleSet,
}

impl GameState {
    /// Create a new game for the given player names (2-4)
    pub fn new(player_names: Vec<String>) -> Result<Self, GameError> {
        Self::with_rules(player_names, RuleSet::default())
    }

    /// Create a new game playing under a specific ruleset
    pub fn with_rules(player_names: Vec<String>, rules: RuleSet) -> Result<Self, GameError> {
        Self::with_rng(player_names, rules, &mut rand::thread_rng())
    }

    /// Create a new game drawing randomness from `rng`
    pub fn with_rng<R: Rng + ?Sized>(
        player_names: Vec<String>,
        rules: RuleSet,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let count = player_names.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::InvalidPlayerCount(count));
        }

        Ok(Self::deal(player_names, rules, rng))
    }

    /// Shuffle and deal for seat names already clamped to 2-4
    pub(crate) fn deal<R: Rng + ?Sized>(
        player_names: Vec<String>,
        rules: RuleSet,
        rng: &mut R,
    ) -> Self {
        let count = player_names.len();
        let mut pile = make_deck();
        shuffle(&mut pile, rng);

        let mut players: Vec<Player> = player_names
            .iter()
            .enumerate()
            .map(|(seat, name)| Player::new(normalize_name(seat, name)))
            .collect();

        // Round-robin deal, one tile at a time off the top
        for _ in 0..STARTING_RACK_SIZE {
            for player in players.iter_mut() {
                if let Some(tile) = pile.pop() {
                    player.rack.push(tile);
                }
            }
        }

        for player in players.iter_mut() {
            player.sort_rack();
        }

        info!(players = count, pile = pile.len(), "new game dealt");

        Self {
            version: SCHEMA_VERSION.to_string(),
            theme_id: default_theme_id(),
            players,
            current: 0,
            pile,
            table: Vec::new(),
            has_opened: vec![false; count],
            active_meld: None,
            selection: None,
            pass_overlay: true,
            phase: GamePhase::AwaitingAction,
            rules,
        }
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by index
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current]
    }

    /// Whether a player has met the opening requirement
    pub fn has_opened(&self, player: PlayerId) -> bool {
        self.has_opened.get(player).copied().unwrap_or(false)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Won { .. })
    }

    /// Get the winner if the game is finished
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::Won { winner } => Some(winner),
            GamePhase::AwaitingAction => None,
        }
    }

    pub fn find_meld(&self, id: &MeldId) -> Option<&Meld> {
        self.table.iter().find(|m| &m.id == id)
    }

    pub(crate) fn find_meld_mut(&mut self, id: &MeldId) -> Option<&mut Meld> {
        self.table.iter_mut().find(|m| &m.id == id)
    }

    /// The meld the active pointer resolves to
    pub fn active_meld(&self) -> Option<&Meld> {
        self.active_meld.as_ref().and_then(|id| self.find_meld(id))
    }

    /// The theme currently selected
    pub fn theme(&self) -> &'static Theme {
        Theme::resolve(&self.theme_id)
    }

    /// Whether every meld on the table is legal
    pub fn table_is_valid(&self) -> bool {
        table_is_valid(&self.table, &self.rules)
    }

    /// Sum of the values of every meld on the table
    pub fn table_value(&self) -> u32 {
        table_value(&self.table)
    }

    /// Every tile in play: racks, then the pile, then the table
    pub fn all_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.players
            .iter()
            .flat_map(|p| p.rack.iter())
            .chain(self.pile.iter())
            .chain(self.table.iter().flat_map(|m| m.tiles.iter()))
    }

    /// Apply an action for the current player.
    ///
    /// Rule violations leave the state unchanged and come back as `Err`;
    /// gestures that reference tiles or melds that no longer exist are
    /// silently ignored.
    pub fn apply_action(&mut self, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        // Theme is presentation only and stays switchable after a win
        if self.is_finished() && !matches!(action, GameAction::SetTheme(_)) {
            return Err(GameError::GameOver);
        }

        debug!(player = self.current, ?action, "applying action");

        match action {
            GameAction::Select(selection) => Ok(self.select(selection)),
            GameAction::ClearSelection => Ok(self.clear_selection()),
            GameAction::CreateMeld => Ok(self.create_meld()),
            GameAction::SetActiveMeld(meld) => self.set_active_meld(meld),
            GameAction::MoveSelectedToMeld(meld) => self.move_selected_to_meld(meld),
            GameAction::MoveSelectedToActiveMeld => self.move_selected_to_active_meld(),
            GameAction::MoveSelectedToRack => self.move_selected_to_rack(),
            GameAction::SortRack => {
                self.current_player_mut().sort_rack();
                Ok(vec![GameEvent::RackSorted {
                    player: self.current,
                }])
            }
            GameAction::DrawTile => self.draw_tile(),
            GameAction::RevealRack => Ok(self.set_pass_overlay(false)),
            GameAction::EndTurn => self.end_turn(),
            GameAction::SetTheme(id) => {
                let theme = Theme::resolve(&id);
                self.theme_id = theme.id.to_string();
                Ok(vec![GameEvent::ThemeChanged {
                    theme: self.theme_id.clone(),
                }])
            }
        }
    }

    /// Draw one tile from the pile onto the current rack
    pub fn draw_tile(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let tile = self.pile.pop().ok_or(GameError::PileEmpty)?;
        let player = self.current;
        self.current_player_mut().receive(tile);

        Ok(vec![
            GameEvent::TileMoved {
                tile: tile.id,
                from: Location::Pile,
                to: Location::Rack(player),
            },
            GameEvent::TileDrawn {
                player,
                tile,
                pile_remaining: self.pile.len(),
            },
        ])
    }

    /// Finish the current turn.
    ///
    /// Empty melds are swept first whatever the outcome. The table must be
    /// legal, and a player who has not opened must leave at least the opening
    /// threshold on the table (summed over the whole table). A player with an
    /// empty rack wins instead of passing the turn.
    pub fn end_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut events = self.reconcile();

        if !self.table_is_valid() {
            return Err(GameError::InvalidTable);
        }

        let player = self.current;
        let threshold = self.rules.opening_threshold;

        if !self.has_opened(player) {
            if self.table.is_empty() {
                return Err(GameError::OpeningRequired { threshold });
            }
            let value = self.table_value();
            if value < threshold {
                return Err(GameError::OpeningTooLow {
                    threshold,
                    table_value: value,
                });
            }
            self.has_opened[player] = true;
            info!(player, table_value = value, "player opened");
            events.push(GameEvent::PlayerOpened {
                player,
                table_value: value,
            });
        }

        if self.current_player().rack.is_empty() {
            self.phase = GamePhase::Won { winner: player };
            info!(player, name = %self.current_player().name, "game won");
            events.push(GameEvent::GameWon { player });
            return Ok(events);
        }

        let next = (player + 1) % self.player_count();
        self.current = next;

        if self.selection.take().is_some() {
            events.push(GameEvent::SelectionCleared);
        }

        if self.active_meld.is_none() {
            if let Some(first) = self.table.first() {
                self.active_meld = Some(first.id.clone());
                events.push(GameEvent::ActiveMeldChanged {
                    meld: self.active_meld.clone(),
                });
            }
        }

        info!(player, next, "turn ended");
        events.push(GameEvent::TurnEnded { player, next });
        events.extend(self.set_pass_overlay(true));

        Ok(events)
    }

    fn set_pass_overlay(&mut self, visible: bool) -> Vec<GameEvent> {
        self.pass_overlay = visible;
        vec![GameEvent::PassOverlayChanged { visible }]
    }

    /// Restore the table invariants after a structural change.
    ///
    /// Sweeps empty melds, re-points the active meld at the first remaining
    /// meld when its target is gone, and drops a selection whose tile is no
    /// longer where it claims to be.
    pub fn reconcile(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let (kept, removed): (Vec<Meld>, Vec<Meld>) =
            std::mem::take(&mut self.table).into_iter().partition(|m| !m.is_empty());
        self.table = kept;
        events.extend(
            removed
                .into_iter()
                .map(|m| GameEvent::MeldRemoved { meld: m.id }),
        );

        if self.active_meld.is_some() && self.active_meld().is_none() {
            self.active_meld = self.table.first().map(|m| m.id.clone());
            events.push(GameEvent::ActiveMeldChanged {
                meld: self.active_meld.clone(),
            });
        }

        if let Some(selection) = &self.selection {
            if !self.selection_exists(selection) {
                self.selection = None;
                events.push(GameEvent::SelectionCleared);
            }
        }

        events
    }

    /// Check the ownership invariants: every deck tile present exactly once,
    /// pointers in range.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let players = self.player_count();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
            return Err(IntegrityError::PlayerCount(players));
        }
        if self.current >= players {
            return Err(IntegrityError::CurrentOutOfRange {
                current: self.current,
                players,
            });
        }
        if self.has_opened.len() != players {
            return Err(IntegrityError::OpenedFlags {
                flags: self.has_opened.len(),
                players,
            });
        }
        if let Some(winner) = self.winner() {
            if winner >= players {
                return Err(IntegrityError::UnknownWinner(winner));
            }
        }

        let deck = make_deck();
        let found = self.all_tiles().count();
        if found != DECK_SIZE {
            return Err(IntegrityError::TileCount {
                expected: DECK_SIZE,
                found,
            });
        }

        let mut seen = HashSet::with_capacity(DECK_SIZE);
        for tile in self.all_tiles() {
            if deck.get(tile.id.0 as usize) != Some(tile) {
                return Err(IntegrityError::ForeignTile(tile.id));
            }
            if !seen.insert(tile.id) {
                return Err(IntegrityError::DuplicateTile(tile.id));
            }
        }

        let mut meld_ids = HashSet::new();
        for meld in &self.table {
            if !meld_ids.insert(&meld.id) {
                return Err(IntegrityError::DuplicateMeld(meld.id.clone()));
            }
        }

        Ok(())
    }
}
