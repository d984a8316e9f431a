//! A running game bound to its snapshot store.
//!
//! `Session` owns the `GameState` and writes a snapshot after every action,
//! so the stored copy is never more than one action behind. Storage failures
//! are logged and otherwise ignored; the in-memory game stays authoritative.

use crate::actions::{GameAction, GameEvent};
use crate::game::{GameError, GameState, IntegrityError, SCHEMA_VERSION};
use crate::meld::RuleSet;
use crate::player::{default_name, MAX_PLAYERS, MIN_PLAYERS};
use crate::store::SnapshotStore;
use crate::theme::Theme;
use thiserror::Error;
use tracing::{info, warn};

/// Why a snapshot could not be turned back into a game
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a JSON object")]
    NotAnObject,

    #[error("version {found:?} is not the current schema")]
    Version { found: Option<String> },

    #[error("inconsistent game: {0}")]
    Integrity(#[from] IntegrityError),
}

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Import failed: invalid file ({0})")]
    InvalidFile(#[from] SnapshotError),

    #[error("could not encode game: {0}")]
    Encode(serde_json::Error),
}

/// A request to start a game: seat count plus names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameRequest {
    pub player_count: usize,
    pub names: Vec<String>,
}

impl NewGameRequest {
    pub fn new(player_count: usize, names: Vec<String>) -> Self {
        Self {
            player_count,
            names,
        }
    }

    /// One name per seat: count clamped to 2-4, missing seats filled with defaults
    pub fn seat_names(&self) -> Vec<String> {
        let count = self.player_count.clamp(MIN_PLAYERS, MAX_PLAYERS);
        (0..count)
            .map(|seat| {
                self.names
                    .get(seat)
                    .cloned()
                    .unwrap_or_else(|| default_name(seat))
            })
            .collect()
    }
}

impl Default for NewGameRequest {
    fn default() -> Self {
        Self::new(MIN_PLAYERS, Vec::new())
    }
}

/// Decode a snapshot.
///
/// With `require_version` the snapshot's `v` tag must equal
/// [`SCHEMA_VERSION`]; without it a missing or different tag is restamped.
pub fn decode_snapshot(contents: &str, require_version: bool) -> Result<GameState, SnapshotError> {
    let mut value: serde_json::Value = serde_json::from_str(contents)?;
    let object = value.as_object_mut().ok_or(SnapshotError::NotAnObject)?;

    let found = object.get("v").and_then(|v| v.as_str()).map(str::to_string);
    if found.as_deref() != Some(SCHEMA_VERSION) {
        if require_version {
            return Err(SnapshotError::Version { found });
        }
        object.insert("v".to_string(), SCHEMA_VERSION.into());
    }

    let mut state: GameState = serde_json::from_value(value)?;
    state.theme_id = Theme::resolve(&state.theme_id).id.to_string();
    // Integrity first: reconcile indexes players by `current`
    state.check_integrity()?;
    state.reconcile();
    Ok(state)
}

/// Encode a snapshot; `pretty` is used for exported files
pub fn encode_snapshot(state: &GameState, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(state)
    } else {
        serde_json::to_string(state)
    }
}

/// A game plus the store it is saved to
pub struct Session<S: SnapshotStore> {
    state: GameState,
    store: S,
    rules: RuleSet,
}

impl<S: SnapshotStore> Session<S> {
    /// Resume the stored game, or deal a fresh one when there is nothing
    /// usable in the store.
    pub fn open(store: S, rules: RuleSet) -> Self {
        let restored = match store.load() {
            Ok(Some(contents)) => match decode_snapshot(&contents, true) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!(error = %e, "discarding stored snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read stored snapshot");
                None
            }
        };

        match restored {
            Some(mut state) => {
                info!(players = state.player_count(), "resumed saved game");
                state.pass_overlay = true;
                let mut session = Self {
                    state,
                    store,
                    rules,
                };
                session.persist();
                session
            }
            None => Self::fresh(store, rules, NewGameRequest::default()),
        }
    }

    /// Start a fresh game regardless of what is stored
    pub fn fresh(store: S, rules: RuleSet, request: NewGameRequest) -> Self {
        let state = Self::deal(&request, rules);
        let mut session = Self {
            state,
            store,
            rules,
        };
        session.persist();
        session
    }

    fn deal(request: &NewGameRequest, rules: RuleSet) -> GameState {
        GameState::deal(request.seat_names(), rules, &mut rand::thread_rng())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ruleset new games are dealt with
    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Apply an action and save.
    ///
    /// The snapshot is written whatever the outcome, since a rejected
    /// `EndTurn` still sweeps empty melds.
    pub fn apply(&mut self, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        let result = self.state.apply_action(action);
        self.persist();
        result
    }

    /// Replace the game with a freshly dealt one, keeping the theme
    pub fn new_game(&mut self, request: NewGameRequest) {
        let mut state = Self::deal(&request, self.rules);
        state.theme_id = self.state.theme_id.clone();
        self.state = state;
        self.persist();
    }

    /// Replace the game with an imported snapshot.
    ///
    /// On failure the current game is left untouched.
    pub fn import(&mut self, contents: &str) -> Result<(), SessionError> {
        let mut state = decode_snapshot(contents, false)?;
        state.pass_overlay = true;
        info!(players = state.player_count(), "imported game");
        self.state = state;
        self.persist();
        Ok(())
    }

    /// The game as an exportable JSON document
    pub fn export(&self) -> Result<String, SessionError> {
        encode_snapshot(&self.state, true).map_err(SessionError::Encode)
    }

    /// Write the snapshot; failures are logged, never raised
    fn persist(&mut self) {
        let snapshot = match encode_snapshot(&self.state, false) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "could not encode snapshot");
                return;
            }
        };

        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "could not save snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn session() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), RuleSet::default())
    }

    #[test]
    fn test_open_empty_store_deals_default_game() {
        let session = session();
        let names: Vec<&str> = session.state().players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Player 1", "Player 2"]);
        assert_eq!(session.store().saves(), 1);
    }

    #[test]
    fn test_open_resumes_saved_game() {
        let mut first = session();
        first.apply(GameAction::DrawTile).unwrap();
        let snapshot = first.store().snapshot().unwrap().to_string();

        let resumed = Session::open(MemoryStore::with_snapshot(snapshot), RuleSet::default());
        assert_eq!(resumed.state().players[0].rack.len(), 15);
        assert_eq!(resumed.state().players, first.state().players);
    }

    #[test]
    fn test_open_discards_wrong_version() {
        let mut value = serde_json::to_value(session().state()).unwrap();
        value["v"] = "0.1".into();
        value["players"][0]["name"] = "Old".into();

        let session = Session::open(
            MemoryStore::with_snapshot(value.to_string()),
            RuleSet::default(),
        );
        assert_eq!(session.state().players[0].name, "Player 1");
    }

    #[test]
    fn test_open_discards_corrupt_snapshot() {
        let session = Session::open(MemoryStore::with_snapshot("{not json"), RuleSet::default());
        assert_eq!(session.state().player_count(), 2);
        assert!(session.state().check_integrity().is_ok());
    }

    #[test]
    fn test_every_action_is_saved() {
        let mut session = session();
        let before = session.store().saves();

        session.apply(GameAction::DrawTile).unwrap();
        let _ = session.apply(GameAction::EndTurn);

        assert_eq!(session.store().saves(), before + 2);
        let stored = decode_snapshot(session.store().snapshot().unwrap(), true).unwrap();
        assert_eq!(stored.players, session.state().players);
    }

    #[test]
    fn test_failed_save_keeps_playing() {
        let mut session = Session::open(MemoryStore::failing(), RuleSet::default());
        session.apply(GameAction::DrawTile).unwrap();
        assert_eq!(session.state().players[0].rack.len(), 15);
    }

    #[test]
    fn test_import_invalid_json_keeps_game() {
        let mut session = session();
        let before = session.state().clone();

        let err = session.import("this is not json").unwrap_err();
        assert!(matches!(err, SessionError::InvalidFile(SnapshotError::Json(_))));
        assert!(err.to_string().starts_with("Import failed"));
        assert_eq!(session.state(), &before);

        assert!(matches!(
            session.import("[1, 2, 3]"),
            Err(SessionError::InvalidFile(SnapshotError::NotAnObject))
        ));
    }

    #[test]
    fn test_import_inconsistent_game_rejected() {
        let mut session = session();
        let mut value = serde_json::to_value(session.state()).unwrap();
        value["pile"] = serde_json::json!([]);

        assert!(matches!(
            session.import(&value.to_string()),
            Err(SessionError::InvalidFile(SnapshotError::Integrity(_)))
        ));
    }

    /// A snapshot whose `current` points past the players while a rack tile is held
    fn snapshot_with_current_out_of_range(session: &Session<MemoryStore>) -> String {
        let mut value = serde_json::to_value(session.state()).unwrap();
        value["current"] = 7.into();
        value["selected"] = serde_json::json!({ "area": "rack", "tile": 0 });
        value.to_string()
    }

    #[test]
    fn test_import_current_out_of_range_rejected() {
        let mut session = session();
        let before = session.state().clone();
        let snapshot = snapshot_with_current_out_of_range(&session);

        let err = session.import(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidFile(SnapshotError::Integrity(
                IntegrityError::CurrentOutOfRange {
                    current: 7,
                    players: 2
                }
            ))
        ));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_open_current_out_of_range_deals_fresh_game() {
        let snapshot = snapshot_with_current_out_of_range(&session());

        let session = Session::open(MemoryStore::with_snapshot(snapshot), RuleSet::default());
        assert_eq!(session.state().current, 0);
        assert_eq!(session.state().selection, None);
        assert!(session.state().check_integrity().is_ok());
    }

    #[test]
    fn test_import_without_players_rejected() {
        let mut session = session();
        let mut value = serde_json::to_value(session.state()).unwrap();
        value["players"] = serde_json::json!([]);
        value["selected"] = serde_json::json!({ "area": "rack", "tile": 0 });

        assert!(matches!(
            session.import(&value.to_string()),
            Err(SessionError::InvalidFile(SnapshotError::Integrity(
                IntegrityError::PlayerCount(0)
            )))
        ));
        assert_eq!(session.state().player_count(), 2);
    }

    #[test]
    fn test_fresh_clamps_seat_count() {
        let session = Session::fresh(
            MemoryStore::new(),
            RuleSet::default(),
            NewGameRequest::new(0, vec![]),
        );
        assert_eq!(session.state().player_count(), 2);

        let session = Session::fresh(
            MemoryStore::new(),
            RuleSet::default(),
            NewGameRequest::new(12, vec![]),
        );
        assert_eq!(session.state().player_count(), 4);
        assert!(session.state().check_integrity().is_ok());
    }

    #[test]
    fn test_import_replaces_game() {
        let mut source = session();
        source.apply(GameAction::RevealRack).unwrap();
        source.apply(GameAction::DrawTile).unwrap();
        let mut value = serde_json::to_value(source.state()).unwrap();
        value["themeId"] = "unknown-theme".into();
        value.as_object_mut().unwrap().remove("v");

        let mut target = session();
        target.import(&value.to_string()).unwrap();

        assert_eq!(target.state().players, source.state().players);
        assert_eq!(target.state().theme_id, "de-la");
        assert_eq!(target.state().version, SCHEMA_VERSION);
        assert!(target.state().pass_overlay);
    }

    #[test]
    fn test_export_roundtrip() {
        let session = session();
        let exported = session.export().unwrap();
        let decoded = decode_snapshot(&exported, true).unwrap();
        assert_eq!(&decoded, session.state());
    }

    #[test]
    fn test_new_game_request_clamps() {
        assert_eq!(NewGameRequest::new(1, vec![]).seat_names().len(), 2);
        assert_eq!(
            NewGameRequest::new(9, vec!["Ann".into()]).seat_names(),
            vec!["Ann", "Player 2", "Player 3", "Player 4"]
        );
    }

    #[test]
    fn test_new_game_keeps_theme() {
        let mut session = session();
        session.apply(GameAction::SetTheme("chalk".into())).unwrap();
        session.new_game(NewGameRequest::new(3, vec!["  Ann  ".into()]));

        assert_eq!(session.state().player_count(), 3);
        assert_eq!(session.state().players[0].name, "Ann");
        assert_eq!(session.state().theme_id, "chalk");
    }
}
