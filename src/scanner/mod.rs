pub mod simulator;
pub mod utils;

use crate::constants::TRASH_DIR;
use crate::error::{CleanError, Result};
use crate::model::{CategoryType, ScanResult};
use crate::scanner::utils::{directory_size, scan_path};
use std::path::{Path, PathBuf};

pub trait Scanner: Send + Sync {
    fn category(&self) -> CategoryType;
    fn scan(&self) -> Result<ScanResult>;
}

/// Lists a category's base directory and sizes each child.
pub struct PathScanner {
    pub category: CategoryType,
    pub path: PathBuf,
}

impl Scanner for PathScanner {
    fn category(&self) -> CategoryType {
        self.category
    }

    fn scan(&self) -> Result<ScanResult> {
        let (total_size, items) = scan_path(&self.path).map_err(|source| CleanError::Listing {
            category: self.category,
            path: self.path.clone(),
            source,
        })?;

        Ok(ScanResult {
            category: self.category,
            total_size,
            items,
            root_path: self.path.clone(),
        })
    }
}

/// One item per simulator device, sized by its app containers only.
pub struct SimulatorAppDataScanner {
    pub devices_dir: PathBuf,
}

impl Scanner for SimulatorAppDataScanner {
    fn category(&self) -> CategoryType {
        CategoryType::SimulatorAppData
    }

    fn scan(&self) -> Result<ScanResult> {
        let (total_size, items) =
            simulator::scan_app_data(&self.devices_dir).map_err(|source| CleanError::Listing {
                category: self.category(),
                path: self.devices_dir.clone(),
                source,
            })?;

        Ok(ScanResult {
            category: self.category(),
            total_size,
            items,
            root_path: self.devices_dir.clone(),
        })
    }
}

pub fn scanner_for(category: CategoryType, home: &Path) -> Box<dyn Scanner> {
    let path = category.base_path(home);
    match category {
        CategoryType::SimulatorAppData => Box::new(SimulatorAppDataScanner { devices_dir: path }),
        _ => Box::new(PathScanner { category, path }),
    }
}

pub fn scan_category(category: CategoryType, home: &Path) -> Result<ScanResult> {
    tracing::debug!(category = category.id(), "scanning category");
    let result = scanner_for(category, home).scan()?;
    tracing::debug!(
        category = category.id(),
        items = result.items.len(),
        bytes = result.total_size,
        "scanned category"
    );
    Ok(result)
}

/// Bytes currently sitting in the user's trash.
pub fn trash_size(home: &Path) -> u64 {
    directory_size(&home.join(TRASH_DIR))
}
