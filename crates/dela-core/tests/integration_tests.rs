//! Integration tests for the DeLa game engine.
//!
//! These tests drive complete turns through the public action API, from the
//! deal through the opening requirement to a win.

use dela_core::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deal a deterministic two-player game and reveal the first rack
fn two_player_game(seed: u64) -> GameState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game =
        GameState::with_rng(vec!["Alice".into(), "Bob".into()], RuleSet::default(), &mut rng)
            .unwrap();
    game.apply_action(GameAction::RevealRack).unwrap();
    game
}

/// Take a tile matching `face` from wherever it is and put it on `player`'s rack.
///
/// Only racks and the pile are searched, so table state is never disturbed.
fn give(game: &mut GameState, player: PlayerId, face: TileFace) -> TileId {
    if let Some(pos) = game.pile.iter().position(|t| t.face == face) {
        let tile = game.pile.remove(pos);
        game.players[player].rack.push(tile);
        return tile.id;
    }

    for other in 0..game.player_count() {
        if other == player {
            continue;
        }
        if let Some(pos) = game.players[other].rack.iter().position(|t| t.face == face) {
            let tile = game.players[other].rack.remove(pos);
            game.players[player].rack.push(tile);
            return tile.id;
        }
    }

    game.players[player]
        .rack
        .iter()
        .find(|t| t.face == face)
        .map(|t| t.id)
        .expect("tile not found anywhere")
}

fn num(rank: u8, color: TileColor) -> TileFace {
    TileFace::Number { rank, color }
}

/// Put a set of rack tiles into a brand-new meld, returning its id
fn lay_meld(game: &mut GameState, tiles: &[TileId]) -> MeldId {
    game.apply_action(GameAction::CreateMeld).unwrap();
    let meld = game.active_meld.clone().unwrap();
    for tile in tiles {
        game.apply_action(GameAction::Select(Selection::rack(*tile)))
            .unwrap();
        game.apply_action(GameAction::MoveSelectedToActiveMeld)
            .unwrap();
    }
    meld
}

/// Empty a player's rack into the pile
fn clear_rack(game: &mut GameState, player: PlayerId) {
    let rack: Vec<Tile> = game.players[player].rack.drain(..).collect();
    game.pile.extend(rack);
}

#[test]
fn test_opening_gate_at_thirty() {
    let mut game = two_player_game(11);

    let r9 = give(&mut game, 0, num(9, TileColor::Red));
    let r10 = give(&mut game, 0, num(10, TileColor::Red));
    let joker = give(&mut game, 0, TileFace::Joker);
    let blues: Vec<TileId> = (1..=4)
        .map(|rank| give(&mut game, 0, num(rank, TileColor::Blue)))
        .collect();

    let run = lay_meld(&mut game, &[r9, r10, joker]);
    lay_meld(&mut game, &blues);
    assert!(game.table_is_valid());
    assert_eq!(game.table_value(), 29);

    assert_eq!(
        game.apply_action(GameAction::EndTurn),
        Err(GameError::OpeningTooLow {
            threshold: 30,
            table_value: 29
        })
    );
    assert_eq!(game.current, 0);
    assert!(!game.has_opened(0));

    let r11 = give(&mut game, 0, num(11, TileColor::Red));
    game.apply_action(GameAction::Select(Selection::rack(r11)))
        .unwrap();
    game.apply_action(GameAction::MoveSelectedToMeld(run.clone()))
        .unwrap();
    assert_eq!(game.table_value(), 30);

    let events = game.apply_action(GameAction::EndTurn).unwrap();
    assert!(events.contains(&GameEvent::PlayerOpened {
        player: 0,
        table_value: 30
    }));
    assert!(events.contains(&GameEvent::TurnEnded { player: 0, next: 1 }));
    assert!(game.has_opened(0));
    assert_eq!(game.current, 1);
    assert!(game.pass_overlay);

    // Bob opens on the strength of the whole table
    game.apply_action(GameAction::EndTurn).unwrap();
    assert!(game.has_opened(1));
    assert_eq!(game.current, 0);

    // Alice takes the 11 back; the table drops below 30 but her opening stands
    game.apply_action(GameAction::Select(Selection::meld(run.clone(), r11)))
        .unwrap();
    game.apply_action(GameAction::MoveSelectedToRack).unwrap();
    assert_eq!(game.table_value(), 29);

    game.apply_action(GameAction::EndTurn).unwrap();
    assert!(game.has_opened(0));
    assert_eq!(game.current, 1);
    assert!(game.check_integrity().is_ok());
}

#[test]
fn test_invalid_table_blocks_end_turn() {
    let mut game = two_player_game(12);
    let a = give(&mut game, 0, num(5, TileColor::Red));
    let b = give(&mut game, 0, num(6, TileColor::Red));
    let c = give(&mut game, 0, num(7, TileColor::Blue));
    lay_meld(&mut game, &[a, b, c]);

    assert_eq!(
        game.apply_action(GameAction::EndTurn),
        Err(GameError::InvalidTable)
    );
    assert_eq!(game.current, 0);
    assert_eq!(game.table.len(), 1);
}

#[test]
fn test_win_by_emptying_rack() {
    let mut game = two_player_game(13);
    clear_rack(&mut game, 0);
    let tiles: Vec<TileId> = (11..=13)
        .map(|rank| give(&mut game, 0, num(rank, TileColor::Black)))
        .collect();

    lay_meld(&mut game, &tiles);
    assert!(game.current_player().rack.is_empty());

    let events = game.apply_action(GameAction::EndTurn).unwrap();
    assert!(events.contains(&GameEvent::GameWon { player: 0 }));
    assert_eq!(game.phase, GamePhase::Won { winner: 0 });
    assert_eq!(game.current, 0);
    assert!(game.has_opened(0));

    assert_eq!(
        game.apply_action(GameAction::DrawTile),
        Err(GameError::GameOver)
    );
    assert!(game.check_integrity().is_ok());
}

#[test]
fn test_draw_then_pass_turn_keeps_active_meld() {
    let mut game = two_player_game(14);
    let tiles: Vec<TileId> = (1..=3)
        .map(|rank| give(&mut game, 0, num(rank, TileColor::Yellow)))
        .collect();
    let group: Vec<TileId> = [TileColor::Red, TileColor::Blue, TileColor::Black]
        .into_iter()
        .map(|color| give(&mut game, 0, num(13, color)))
        .collect();

    let first = lay_meld(&mut game, &tiles);
    let second = lay_meld(&mut game, &group);
    game.apply_action(GameAction::SetActiveMeld(first.clone()))
        .unwrap();

    game.apply_action(GameAction::EndTurn).unwrap();
    assert_eq!(game.active_meld, Some(first));
    assert!(game.find_meld(&second).is_some());

    let before = game.current_player().rack.len();
    game.apply_action(GameAction::DrawTile).unwrap();
    game.apply_action(GameAction::DrawTile).unwrap();
    assert_eq!(game.current_player().rack.len(), before + 2);
}

#[test]
fn test_session_persists_full_turn() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::in_dir(dir.path());

    let mut session = Session::fresh(
        store.clone(),
        RuleSet::default(),
        NewGameRequest::new(3, vec!["Ann".into(), "Ben".into(), "Cat".into()]),
    );
    session.apply(GameAction::RevealRack).unwrap();
    session.apply(GameAction::DrawTile).unwrap();

    let resumed = Session::open(store, RuleSet::default());
    assert_eq!(resumed.state().player_count(), 3);
    assert_eq!(resumed.state().players, session.state().players);
    assert_eq!(resumed.state().pile.len(), session.state().pile.len());
    assert!(resumed.state().pass_overlay);
}

#[test]
fn test_export_import_between_sessions() {
    let mut source = Session::open(MemoryStore::new(), RuleSet::default());
    source.apply(GameAction::DrawTile).unwrap();
    source.apply(GameAction::CreateMeld).unwrap();
    let exported = source.export().unwrap();

    let mut target = Session::open(MemoryStore::new(), RuleSet::default());
    target.import(&exported).unwrap();

    // The empty meld is swept on import
    assert!(target.state().table.is_empty());
    assert_eq!(target.state().players, source.state().players);
    assert!(target.store().snapshot().is_some());
}

/// Turn a pair of random numbers into a plausible gesture for the current state
fn gesture(game: &GameState, kind: u8, pick: usize) -> GameAction {
    let rack = &game.current_player().rack;
    match kind {
        0 | 1 if !rack.is_empty() => {
            GameAction::Select(Selection::rack(rack[pick % rack.len()].id))
        }
        2 if !game.table.is_empty() => {
            let meld = &game.table[pick % game.table.len()];
            match meld.tiles.get(pick % meld.tiles.len().max(1)) {
                Some(tile) => GameAction::Select(Selection::meld(meld.id.clone(), tile.id)),
                None => GameAction::ClearSelection,
            }
        }
        3 => GameAction::CreateMeld,
        4 if !game.table.is_empty() => {
            GameAction::MoveSelectedToMeld(game.table[pick % game.table.len()].id.clone())
        }
        5 => GameAction::MoveSelectedToActiveMeld,
        6 => GameAction::MoveSelectedToRack,
        7 => GameAction::DrawTile,
        8 => GameAction::EndTurn,
        _ => GameAction::ClearSelection,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tiles_are_conserved(
        seed in any::<u64>(),
        players in 2usize..=4,
        steps in prop::collection::vec((0u8..10, any::<usize>()), 1..300),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let names = (0..players).map(|i| format!("P{}", i)).collect();
        let mut game = GameState::with_rng(names, RuleSet::default(), &mut rng).unwrap();

        for (kind, pick) in steps {
            let action = gesture(&game, kind, pick);
            let _ = game.apply_action(action);

            prop_assert!(game.check_integrity().is_ok());
            prop_assert!(game.current < game.player_count());
            if let Some(active) = &game.active_meld {
                prop_assert!(game.find_meld(active).is_some());
            }
            match &game.selection {
                Some(Selection::Rack { tile }) => {
                    prop_assert!(game.current_player().has_tile(*tile));
                }
                Some(Selection::Meld { meld, tile }) => {
                    prop_assert!(game.find_meld(meld).is_some_and(|m| m.contains(*tile)));
                }
                None => {}
            }
        }
    }
}
