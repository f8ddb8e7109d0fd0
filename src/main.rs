mod analyzer;
mod cleaner;
mod config;
mod constants;
mod error;
mod logging;
mod model;
mod progress;
mod report;
mod scanner;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use config::{Cli, Command};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use logging::LogTarget;
use ratatui::prelude::*;
use std::io;
use ui::app::App;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = config::resolve_home(cli.home)?;

    match cli.command {
        Some(Command::Report { categories }) => {
            let _guard = logging::init(cli.verbose, &LogTarget::Stderr);
            report::run_report(&home, &categories)
        }
        Some(Command::Clean {
            category,
            items,
            permanent,
            yes,
        }) => {
            let _guard = logging::init(cli.verbose, &LogTarget::Stderr);
            report::run_clean(&home, category, &items, permanent, yes)
        }
        None => {
            let _guard = logging::init(cli.verbose, &LogTarget::File);
            run_tui(home)
        }
    }
}

fn run_tui(home: std::path::PathBuf) -> Result<()> {
    tracing::info!(home = %home.display(), "starting");

    enable_raw_mode()?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new_scanning(home);
    app.start_scan();

    let res = ui::run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
