//! Turns prompt commands into engine calls.

use crate::commands::{Command, HELP};
use crate::render::render_themes;
use anyhow::{Context, Result};
use dela_core::{
    GameAction, GameError, GameEvent, GameState, MeldId, NewGameRequest, Selection, Session,
    SnapshotStore,
};
use std::fs;
use std::path::PathBuf;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::info;

/// File name for an export taken at `at`, e.g. `dela_2024-05-01-18-30-00.json`
pub fn export_file_name(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]-[hour]-[minute]-[second]");
    let stamp = at
        .format(&format)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("dela_{}.json", stamp)
}

/// What the prompt loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Redraw, optionally with a one-line hint underneath
    Redraw(Option<String>),
    /// Print text without redrawing
    Print(String),
    Quit,
}

pub struct App<S: SnapshotStore> {
    session: Session<S>,
}

impl<S: SnapshotStore> App<S> {
    pub fn new(session: Session<S>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    fn meld_at(&self, position: usize) -> Option<MeldId> {
        self.state()
            .table
            .get(position.checked_sub(1)?)
            .map(|m| m.id.clone())
    }

    /// Apply a game action, turning rule violations into hints
    fn play(&mut self, action: GameAction) -> Reply {
        match self.session.apply(action) {
            Ok(events) => Reply::Redraw(hint_for(&events, self.state())),
            Err(e) => Reply::Redraw(Some(advice(&e))),
        }
    }

    /// Run one command.
    ///
    /// Rule violations come back as hints; only file I/O fails with `Err`.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let no_meld = |n: usize| Reply::Redraw(Some(format!("There is no meld {}.", n)));

        let reply = match command {
            Command::Help => Reply::Print(HELP.to_string()),
            Command::Show => Reply::Redraw(None),
            Command::Quit => Reply::Quit,
            Command::Ready => self.play(GameAction::RevealRack),
            Command::PickRack(tile) => self.play(GameAction::Select(Selection::rack(tile))),
            Command::PickMeld { meld, tile } => match self.meld_at(meld) {
                Some(id) => self.play(GameAction::Select(Selection::meld(id, tile))),
                None => no_meld(meld),
            },
            Command::Drop => self.play(GameAction::ClearSelection),
            Command::NewMeld => self.play(GameAction::CreateMeld),
            Command::Active(meld) => match self.meld_at(meld) {
                Some(id) => self.play(GameAction::SetActiveMeld(id)),
                None => no_meld(meld),
            },
            Command::Put(None) => self.play(GameAction::MoveSelectedToActiveMeld),
            Command::Put(Some(meld)) => match self.meld_at(meld) {
                Some(id) => self.play(GameAction::MoveSelectedToMeld(id)),
                None => no_meld(meld),
            },
            Command::Back => self.play(GameAction::MoveSelectedToRack),
            Command::Sort => self.play(GameAction::SortRack),
            Command::Draw => self.play(GameAction::DrawTile),
            Command::End => self.play(GameAction::EndTurn),
            Command::Theme(None) => Reply::Print(render_themes(&self.state().theme_id)),
            Command::Theme(Some(id)) => self.play(GameAction::SetTheme(id)),
            Command::Export(path) => {
                let path =
                    path.unwrap_or_else(|| PathBuf::from(export_file_name(OffsetDateTime::now_utc())));
                let contents = self.session.export()?;
                fs::write(&path, contents)
                    .with_context(|| format!("could not write {}", path.display()))?;
                info!(path = %path.display(), "exported game");
                Reply::Print(format!("Saved game to {}", path.display()))
            }
            Command::Import(path) => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                match self.session.import(&contents) {
                    Ok(()) => Reply::Redraw(Some(format!("Loaded {}", path.display()))),
                    Err(e) => Reply::Redraw(Some(e.to_string())),
                }
            }
            Command::NewGame { count, names } => {
                self.session.new_game(NewGameRequest::new(count, names));
                Reply::Redraw(Some("New game dealt.".to_string()))
            }
        };

        Ok(reply)
    }
}

/// The advisory line shown for a rejected action
fn advice(error: &GameError) -> String {
    match error {
        GameError::NoSelection => "Pick a tile first.".to_string(),
        GameError::MeldNotFound(_) => "That meld is gone. Type `meld` to start one.".to_string(),
        other => other.to_string(),
    }
}

/// A short note for events worth calling out
fn hint_for(events: &[GameEvent], state: &GameState) -> Option<String> {
    events.iter().rev().find_map(|event| match event {
        GameEvent::GameWon { player } => state
            .get_player(*player)
            .map(|p| format!("{} wins!", p.name)),
        GameEvent::PlayerOpened { table_value, .. } => {
            Some(format!("Opened with {} points.", table_value))
        }
        GameEvent::MeldCreated { .. } => Some("New meld created. Add tiles to it.".to_string()),
        GameEvent::TileDrawn { tile, .. } => Some(format!("Drew {} {}.", tile.id, tile)),
        _ => None,
    })
}
