//! Theme command: shows or toggles the persisted light/dark preference.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Switch between light and dark.
    #[arg(long)]
    pub toggle: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ThemeArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let mut state = db.load_state()?;
    if args.toggle {
        state.toggle_theme();
        db.save_state(&state)?;
    }

    let theme = if state.dark_mode { "dark" } else { "light" };
    writeln!(writer, "Theme: {theme}")?;
    Ok(())
}
