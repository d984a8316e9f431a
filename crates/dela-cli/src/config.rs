//! Command-line and environment configuration.

use anyhow::{anyhow, Result};
use clap::Parser;
use dela_core::{PlacementMode, RuleSet};
use directories::ProjectDirs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dela")]
#[command(about = "Pass-and-play tile rummy in the terminal")]
pub struct Args {
    /// Directory the game snapshot is saved in (defaults to the OS data directory)
    #[arg(long, env = "DELA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Ignore any saved game and deal a new one
    #[arg(long)]
    pub new_game: bool,

    /// Number of players for a new game (clamped to 2-4)
    #[arg(short, long, default_value = "2")]
    pub players: usize,

    /// Player name for a new game; repeat once per seat
    #[arg(short, long = "name")]
    pub names: Vec<String>,

    /// Stricter joker rules: no all-joker melds, runs must fit 1-13
    #[arg(long)]
    pub strict_rules: bool,

    /// Placing a tile into an unknown meld creates that meld
    #[arg(long)]
    pub create_missing_melds: bool,
}

impl Args {
    /// Ruleset for games dealt in this run
    pub fn rules(&self) -> RuleSet {
        let mut rules = if self.strict_rules {
            RuleSet::strict()
        } else {
            RuleSet::default()
        };
        if self.create_missing_melds {
            rules.placement = PlacementMode::CreateMissing;
        }
        rules
    }

    /// Where snapshots live
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("", "", "dela")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))
    }
}
