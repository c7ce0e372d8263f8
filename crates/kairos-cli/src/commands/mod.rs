//! CLI subcommand implementations.

pub mod add;
pub mod calendar;
pub mod categories;
pub mod delete;
pub mod done;
pub mod edit;
pub mod history;
pub mod list;
pub mod theme;
pub mod time;
pub mod util;
