//! Categories command: lists and edits category labels and colors.

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use kairos_core::{AppState, CategoryPreference, PALETTE};

use crate::Config;
use crate::commands::util::open_database;

#[derive(Debug, Subcommand)]
pub enum CategoriesAction {
    /// List categories with their colors and task counts.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a custom category.
    Add {
        name: String,
        /// Color as #RRGGBB. Defaults to the first unused palette color.
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a category. Built-in categories can only be recolored.
    Update {
        /// Category ID or name.
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a custom category. Tasks keep their category label.
    Delete {
        /// Category ID or name.
        key: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryEntry<'a> {
    #[serde(flatten)]
    category: &'a CategoryPreference,
    task_count: usize,
}

pub fn run<W: Write>(writer: &mut W, action: &CategoriesAction, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let mut state = db.load_state()?;

    match action {
        CategoriesAction::List { json } => {
            let usage = state.category_usage();
            if *json {
                let entries: Vec<CategoryEntry<'_>> = usage
                    .into_iter()
                    .map(|(category, task_count)| CategoryEntry {
                        category,
                        task_count,
                    })
                    .collect();
                writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
            } else {
                for (category, count) in usage {
                    let marker = if category.is_default { " (default)" } else { "" };
                    writeln!(
                        writer,
                        "{:<12}  {}  {count} tasks{marker}",
                        category.name, category.color
                    )?;
                }
            }
            return Ok(());
        }
        CategoriesAction::Add { name, color } => {
            let color = color.clone().unwrap_or_else(|| next_color(&state).to_string());
            state.add_category(name, &color)?;
            writeln!(writer, "Added category {} ({color})", name.trim())?;
        }
        CategoriesAction::Update { key, name, color } => {
            state.update_category(key, name.as_deref(), color.as_deref())?;
            let category = state.find_category(name.as_deref().unwrap_or(key))?;
            writeln!(
                writer,
                "Updated category {} ({})",
                category.name, category.color
            )?;
        }
        CategoriesAction::Delete { key } => {
            let removed = state.delete_category(key)?;
            writeln!(writer, "Deleted category {}", removed.name)?;
        }
    }

    db.save_state(&state)?;
    Ok(())
}

/// First palette color no category uses yet.
fn next_color(state: &AppState) -> &'static str {
    PALETTE
        .iter()
        .copied()
        .find(|color| {
            !state
                .categories
                .iter()
                .any(|category| category.color.eq_ignore_ascii_case(color))
        })
        .unwrap_or(PALETTE[0])
}
