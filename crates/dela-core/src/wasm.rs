//! WebAssembly bindings for the DeLa game engine.
//!
//! This module exposes the engine to a browser host through wasm-bindgen.
//! The host renders from `getState` and keeps `getSnapshot` in its own
//! storage (e.g. `localStorage`) after every call.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::actions::GameAction;
#[cfg(feature = "wasm")]
use crate::meld::RuleSet;
#[cfg(feature = "wasm")]
use crate::session::{NewGameRequest, Session};
#[cfg(feature = "wasm")]
use crate::store::MemoryStore;
#[cfg(feature = "wasm")]
use crate::theme::Theme;

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmGame {
    session: Session<MemoryStore>,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmGame {
    /// Start a new game; `player_names_json` is a JSON array of names
    #[wasm_bindgen(constructor)]
    pub fn new(player_count: usize, player_names_json: &str) -> Result<WasmGame, JsValue> {
        let names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;

        Ok(WasmGame {
            session: Session::fresh(
                MemoryStore::new(),
                RuleSet::default(),
                NewGameRequest::new(player_count, names),
            ),
        })
    }

    /// Resume from a stored snapshot, dealing a fresh game if it is unusable
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(snapshot: &str) -> WasmGame {
        WasmGame {
            session: Session::open(MemoryStore::with_snapshot(snapshot), RuleSet::default()),
        }
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(self.session.state()).unwrap_or_else(|_| "{}".to_string())
    }

    /// The latest saved snapshot, for the host to persist
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Option<String> {
        self.session.store().snapshot().map(str::to_string)
    }

    /// Apply an action from JSON, returns events JSON or the advisory message
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match self.session.apply(action) {
            Ok(events) => {
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }

    /// Start over with new players
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self, player_count: usize, player_names_json: &str) -> Result<(), JsValue> {
        let names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;
        self.session.new_game(NewGameRequest::new(player_count, names));
        Ok(())
    }

    /// Replace the game with an imported file's contents
    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&mut self, contents: &str) -> Result<(), JsValue> {
        self.session
            .import(contents)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Pretty JSON for an export download
    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> Result<String, JsValue> {
        self.session
            .export()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Whether every meld on the table is legal
    #[wasm_bindgen(js_name = tableIsValid)]
    pub fn table_is_valid(&self) -> bool {
        self.session.state().table_is_valid()
    }

    /// Validity of each meld, in table order, as a JSON array of booleans
    #[wasm_bindgen(js_name = getMeldValidity)]
    pub fn get_meld_validity(&self) -> String {
        let state = self.session.state();
        let validity: Vec<bool> = state.table.iter().map(|m| m.is_valid(&state.rules)).collect();
        serde_json::to_string(&validity).unwrap_or_else(|_| "[]".to_string())
    }

    /// Whether the current player has opened
    #[wasm_bindgen(js_name = currentHasOpened)]
    pub fn current_has_opened(&self) -> bool {
        let state = self.session.state();
        state.has_opened(state.current)
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.session.state().is_finished()
    }

    /// Get the winner (if game is finished)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<usize> {
        self.session.state().winner()
    }

    /// Style variables of the selected theme as a JSON object
    #[wasm_bindgen(js_name = getThemeVars)]
    pub fn get_theme_vars(&self) -> String {
        let theme = self.session.state().theme();
        let vars: serde_json::Map<String, serde_json::Value> = theme
            .vars
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::Value::Object(vars).to_string()
    }

    /// All themes as JSON, for a theme picker
    #[wasm_bindgen(js_name = getThemes)]
    pub fn get_themes() -> String {
        serde_json::to_string(&crate::theme::THEMES).unwrap_or_else(|_| "[]".to_string())
    }

    /// Resolve a theme id, falling back to the default
    #[wasm_bindgen(js_name = resolveTheme)]
    pub fn resolve_theme(id: &str) -> String {
        Theme::resolve(id).id.to_string()
    }
}
