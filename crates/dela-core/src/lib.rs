//! DeLa - a pass-and-play tile rummy game engine
//!
//! This crate provides the game-state engine for DeLa, including:
//! - The 106-tile deck and rack ordering
//! - Meld validation (groups and runs, with jokers)
//! - Holding and moving tiles between racks and the table
//! - Turn progression with the opening requirement and win detection
//! - Snapshot persistence, import and export
//!
//! # Architecture
//!
//! The engine is synchronous and single-actor: one gesture becomes one
//! [`GameAction`], applied to the [`GameState`] by a [`Session`] which saves a
//! snapshot afterwards. It can be compiled to:
//! - Native Rust for the terminal front-end
//! - WebAssembly for a browser host
//!
//! # Modules
//!
//! - [`tile`]: Tiles, the deck, shuffling and rack order
//! - [`meld`]: Melds, the validator and the ruleset
//! - [`player`]: Seats and racks
//! - [`game`]: Game state machine
//! - [`selection`]: Holding and moving tiles
//! - [`session`]: A game bound to its snapshot store
//! - [`store`]: Snapshot storage backends
//! - [`theme`]: Color themes

pub mod actions;
pub mod game;
pub mod meld;
pub mod player;
pub mod selection;
pub mod session;
pub mod store;
pub mod theme;
pub mod tile;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, Location, Selection};
pub use game::{GameError, GamePhase, GameState, IntegrityError, SCHEMA_VERSION};
pub use meld::{is_valid_meld, meld_value, Meld, MeldId, PlacementMode, RuleSet};
pub use player::{Player, PlayerId};
pub use session::{decode_snapshot, NewGameRequest, Session, SessionError, SnapshotError};
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError, STORAGE_KEY};
pub use theme::{Theme, THEMES};
pub use tile::{make_deck, shuffle, Tile, TileColor, TileFace, TileId};
