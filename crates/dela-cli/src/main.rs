//! DeLa pass-and-play terminal front-end.

use clap::Parser;
use dela_core::{FileStore, NewGameRequest, Session};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod config;
mod render;

use app::{App, Reply};
use config::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the board
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let data_dir = args.data_dir()?;
    let store = FileStore::in_dir(&data_dir);
    info!(path = %store.path().display(), "using snapshot file");

    let session = if args.new_game {
        Session::fresh(
            store,
            args.rules(),
            NewGameRequest::new(args.players, args.names.clone()),
        )
    } else {
        Session::open(store, args.rules())
    };
    let mut app = App::new(session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("{}", render::render(app.state()));

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match app.execute(command) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Print(text)) => println!("{}", text),
            Ok(Reply::Redraw(hint)) => {
                println!();
                print!("{}", render::render(app.state()));
                if let Some(hint) = hint {
                    println!("{}", hint);
                }
            }
            Err(e) => println!("Error: {:#}", e),
        }
    }

    Ok(())
}
