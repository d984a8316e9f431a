//! Plain-text projection of the game for the terminal.

use dela_core::{GameState, Selection, Tile, THEMES};
use std::fmt::Write;

fn tile_text(tile: &Tile, held: bool) -> String {
    if held {
        format!("[{} {}]", tile.id, tile)
    } else {
        format!("{} {}", tile.id, tile)
    }
}

/// Everything the current player may see
pub fn render(state: &GameState) -> String {
    let mut out = String::new();
    let player = state.current_player();

    if let Some(winner) = state.winner() {
        let name = state
            .get_player(winner)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        let _ = writeln!(out, "*** {} wins! ***", name);
        let _ = writeln!(out, "Start another with `new`.");
        return out;
    }

    if state.pass_overlay {
        let _ = writeln!(out, "Pass the device to {}.", player.name);
        let _ = writeln!(out, "Type `ready` when {} is holding it.", player.name);
        return out;
    }

    let opened = if state.has_opened(state.current) {
        "done".to_string()
    } else {
        format!("needs {}", state.rules.opening_threshold)
    };
    let _ = writeln!(
        out,
        "Turn: {}   Pile: {}   Table: {}   Opening: {}   Theme: {}",
        player.name,
        state.pile.len(),
        if state.table_is_valid() { "valid" } else { "invalid" },
        opened,
        state.theme().name,
    );

    let _ = writeln!(out);
    if state.table.is_empty() {
        let _ = writeln!(out, "No melds yet. Type `meld`, then `put` tiles into it.");
    } else {
        for (index, meld) in state.table.iter().enumerate() {
            let active = if state.active_meld.as_ref() == Some(&meld.id) {
                "*"
            } else {
                " "
            };
            let status = if meld.is_valid(&state.rules) { "ok" } else { "INVALID" };
            let tiles: Vec<String> = meld
                .tiles
                .iter()
                .map(|t| {
                    let held = matches!(
                        &state.selection,
                        Some(Selection::Meld { meld: m, tile }) if *m == meld.id && *tile == t.id
                    );
                    tile_text(t, held)
                })
                .collect();
            let _ = writeln!(
                out,
                "{}{:>2}. ({}) {}  {}",
                active,
                index + 1,
                meld.len(),
                status,
                tiles.join(" | ")
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}'s rack ({}):", player.name, player.rack.len());
    let rack: Vec<String> = player
        .rack
        .iter()
        .map(|t| {
            let held = state.selection == Some(Selection::rack(t.id));
            tile_text(t, held)
        })
        .collect();
    for line in rack.chunks(7) {
        let _ = writeln!(out, "  {}", line.join(" | "));
    }

    out
}

/// The theme list for `theme` with no argument
pub fn render_themes(current: &str) -> String {
    let mut out = String::new();
    for theme in THEMES.iter() {
        let marker = if theme.id == current { "*" } else { " " };
        let _ = writeln!(out, "{} {:<8} {}", marker, theme.id, theme.name);
    }
    out
}
