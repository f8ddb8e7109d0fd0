use crate::error::{CleanError, Result};
use crate::model::CategoryType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Home directory whose caches are scanned
    #[arg(long, env = "XCSWEEP_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Log more (repeat for debug output)
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scan and print sizes without touching anything
    Report {
        /// Only scan this category (repeatable)
        #[arg(short, long = "category", value_parser = parse_category)]
        categories: Vec<CategoryType>,
    },
    /// Reclaim a category, or named items within it
    Clean {
        #[arg(value_parser = parse_category)]
        category: CategoryType,

        /// Item name as shown by `report`, or its directory name (repeatable);
        /// all items if omitted
        #[arg(long = "item")]
        items: Vec<String>,

        /// Delete permanently instead of moving to the trash
        #[arg(long)]
        permanent: bool,

        /// Actually remove; without it only a preview is printed
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_category(s: &str) -> std::result::Result<CategoryType, String> {
    s.parse::<CategoryType>().map_err(|e| {
        let known: Vec<&str> = CategoryType::ALL.iter().map(|c| c.id()).collect();
        format!("{e} (expected one of: {})", known.join(", "))
    })
}

/// Picks the home directory: explicit override, then the invoking user
/// under sudo, then the platform default.
pub fn resolve_home(home_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = home_override {
        return Ok(home);
    }
    if let Ok(sudo_user) = std::env::var("SUDO_USER") {
        return Ok(PathBuf::from("/Users").join(sudo_user));
    }
    dirs::home_dir().ok_or(CleanError::HomeNotFound)
}
