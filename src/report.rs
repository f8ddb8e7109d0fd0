//! Non-interactive front end: `report` prints a scan, `clean` reclaims one
//! category from the command line.

use crate::analyzer::DiskAnalyzer;
use crate::cleaner::{Cleaner, ReclaimReport};
use crate::model::{CategoryType, ScanResult, ScannedItem};
use crate::progress::{BarProgress, ProgressSink};
use crate::scanner;
use crate::scanner::utils::display_name;
use crate::storage::{StorageInfo, format_bytes};
use anyhow::{Result, bail};
use indicatif::ProgressBar;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

const TOP_ITEMS: usize = 5;

pub fn run_report(home: &Path, categories: &[CategoryType]) -> Result<()> {
    let categories = if categories.is_empty() {
        CategoryType::ALL.to_vec()
    } else {
        categories.to_vec()
    };

    let analyzer = DiskAnalyzer::new(home);
    let mut handle = analyzer.rescan(&categories);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Scanning...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = loop {
        if let Some(outcome) = handle.try_wait() {
            break outcome;
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    spinner.finish_and_clear();

    print!(
        "{}",
        format_report(&analyzer.results(), analyzer.trash_size(), &analyzer.storage())
    );

    for failure in &outcome.failures {
        eprintln!("warning: {failure}");
    }
    Ok(())
}

pub fn format_report(results: &[ScanResult], trash_size: u64, storage: &StorageInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Disk: {} / {} used ({:.1}%)",
        format_bytes(storage.used),
        format_bytes(storage.total),
        storage.usage_ratio() * 100.0
    );
    let _ = writeln!(out);

    for result in results {
        let _ = writeln!(
            out,
            "{:<20} {:>12}  {:>4} item(s)  [{}]",
            result.category.name(),
            format_bytes(result.total_size),
            result.items.len(),
            result.category.id()
        );
        for item in result.items.iter().take(TOP_ITEMS) {
            let _ = writeln!(out, "    {:<40} {:>12}", item.name, format_bytes(item.size));
        }
        if result.items.len() > TOP_ITEMS {
            let _ = writeln!(out, "    ... {} more", result.items.len() - TOP_ITEMS);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:<20} {:>12}", "Trash", format_bytes(trash_size));
    out
}

pub fn run_clean(
    home: &Path,
    category: CategoryType,
    names: &[String],
    permanent: bool,
    yes: bool,
) -> Result<()> {
    let scanned = scanner::scan_category(category, home)?;
    let selected = select_items(&scanned, names)?;

    if !yes {
        let targets: &[ScannedItem] = if names.is_empty() {
            &scanned.items
        } else {
            &selected
        };
        let total: u64 = targets.iter().map(|i| i.size).sum();
        println!(
            "Would {} {} item(s) from {} ({}):",
            if permanent { "delete" } else { "trash" },
            targets.len(),
            category.name(),
            format_bytes(total)
        );
        for item in targets {
            println!("    {:<40} {:>12}", item.name, format_bytes(item.size));
        }
        println!("Re-run with --yes to proceed.");
        return Ok(());
    }

    let cleaner = Cleaner::new(home);
    let bar = BarProgress::new();
    let progress: Option<&dyn ProgressSink> = Some(&bar);

    let report = match (names.is_empty(), permanent) {
        (true, false) => cleaner.remove_all_in_category(category, progress)?,
        (true, true) => cleaner.delete_category(category, progress)?,
        (false, false) => cleaner.remove_selected(&selected, Some(category), progress),
        (false, true) => cleaner.delete_items(&selected, Some(category), progress),
    };

    print_reclaim(&report);
    Ok(())
}

/// A name matches an item's directory name or its display name. Display
/// names can repeat (two simulators of the same model and runtime), so every
/// item carrying the name is selected.
fn select_items(scanned: &ScanResult, names: &[String]) -> Result<Vec<ScannedItem>> {
    let mut selected: Vec<ScannedItem> = Vec::with_capacity(names.len());
    for name in names {
        let matches: Vec<&ScannedItem> = scanned
            .items
            .iter()
            .filter(|i| &i.name == name || display_name(&i.path) == *name)
            .collect();
        if matches.is_empty() {
            bail!("no item named '{name}' in {}", scanned.category.name());
        }
        for item in matches {
            if !selected.iter().any(|s| s.path == item.path) {
                selected.push(item.clone());
            }
        }
    }
    Ok(selected)
}

fn print_reclaim(report: &ReclaimReport) {
    println!("{}", report.summary());
    for failure in &report.failures {
        eprintln!("  {}: {}", failure.path.display(), failure.reason);
    }
}
