//! Text commands typed at the prompt.

use dela_core::TileId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Type a command, or `help`.")]
    Empty,

    #[error("Unknown command `{0}`. Type `help`.")]
    Unknown(String),

    #[error("`{command}` needs {what}.")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("`{0}` is not a tile (use the id shown, e.g. t12).")]
    BadTile(String),

    #[error("`{0}` is not a meld number.")]
    BadMeld(String),

    #[error("`{0}` is not a player count.")]
    BadCount(String),
}

/// A parsed prompt command.
///
/// Melds are addressed by their 1-based position on the table as drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    Ready,
    PickRack(TileId),
    PickMeld { meld: usize, tile: TileId },
    Drop,
    NewMeld,
    Active(usize),
    Put(Option<usize>),
    Back,
    Sort,
    Draw,
    End,
    Theme(Option<String>),
    Export(Option<PathBuf>),
    Import(PathBuf),
    NewGame { count: usize, names: Vec<String> },
    Quit,
}

pub const HELP: &str = "\
Commands:
  ready                 show your rack after the device is handed over
  pick <tile>           hold a rack tile (again to put it down)
  pick <meld> <tile>    hold a tile from a meld on the table
  drop                  put the held tile down
  meld                  start a new meld and make it active
  active <meld>         make a meld the active one
  put [meld]            move the held tile into a meld (default: active meld)
  back                  take the held tile back to your rack
  sort                  sort your rack
  draw                  draw a tile from the pile
  end                   end your turn
  theme [id]            list themes, or switch theme
  export [file]         save the game to a JSON file
  import <file>         load a game from a JSON file
  new <n> [names...]    start a new game with n players
  show                  redraw
  quit                  leave (the game is saved)";

fn parse_tile(raw: &str) -> Result<TileId, ParseError> {
    let digits = raw
        .strip_prefix('t')
        .or_else(|| raw.strip_prefix('T'))
        .unwrap_or(raw);
    digits
        .parse::<u32>()
        .map(TileId)
        .map_err(|_| ParseError::BadTile(raw.to_string()))
}

fn parse_meld(raw: &str) -> Result<usize, ParseError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ParseError::BadMeld(raw.to_string())),
    }
}

/// Parse one line of input
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ParseError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "help" | "h" | "?" => Command::Help,
        "show" | "ls" => Command::Show,
        "ready" | "reveal" => Command::Ready,
        "pick" | "p" => match args.as_slice() {
            [tile] => Command::PickRack(parse_tile(tile)?),
            [meld, tile, ..] => Command::PickMeld {
                meld: parse_meld(meld)?,
                tile: parse_tile(tile)?,
            },
            [] => {
                return Err(ParseError::MissingArgument {
                    command: "pick",
                    what: "a tile",
                })
            }
        },
        "drop" | "clear" => Command::Drop,
        "meld" | "new-meld" => Command::NewMeld,
        "active" | "a" => match args.first() {
            Some(meld) => Command::Active(parse_meld(meld)?),
            None => {
                return Err(ParseError::MissingArgument {
                    command: "active",
                    what: "a meld number",
                })
            }
        },
        "put" => Command::Put(args.first().map(|m| parse_meld(m)).transpose()?),
        "back" | "take" => Command::Back,
        "sort" => Command::Sort,
        "draw" | "d" => Command::Draw,
        "end" | "e" => Command::End,
        "theme" => Command::Theme(args.first().map(|s| s.to_string())),
        "export" => Command::Export(args.first().map(PathBuf::from)),
        "import" => match args.first() {
            Some(path) => Command::Import(PathBuf::from(path)),
            None => {
                return Err(ParseError::MissingArgument {
                    command: "import",
                    what: "a file",
                })
            }
        },
        "new" => {
            let count = match args.first() {
                Some(raw) => raw
                    .parse::<usize>()
                    .map_err(|_| ParseError::BadCount(raw.to_string()))?,
                None => 2,
            };
            let names = args.iter().skip(1).map(|s| s.to_string()).collect();
            Command::NewGame { count, names }
        }
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(command)
}
