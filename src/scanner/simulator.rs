//! Simulator app data lives inside each CoreSimulator device rather than
//! directly under the category's base directory, so it gets its own scanner.

use crate::constants::{DEVICE_DESCRIPTOR, SIM_RUNTIME_PREFIX, SIMULATOR_SAFE_SUBDIRS};
use crate::model::ScannedItem;
use crate::scanner::utils::{directory_size, display_name, list_children, sort_by_size};
use rayon::prelude::*;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct DeviceDescriptor {
    name: String,
    runtime: Option<String>,
}

/// A directory is a simulator device when it carries a `device.plist`.
pub fn is_simulator_device(path: &Path) -> bool {
    path.join(DEVICE_DESCRIPTOR).is_file()
}

pub fn safe_subpaths(device: &Path) -> Vec<PathBuf> {
    SIMULATOR_SAFE_SUBDIRS
        .iter()
        .map(|sub| device.join(sub))
        .collect()
}

/// Human name from the device descriptor, e.g. `iPhone 15 (iOS 17 0)`.
///
/// Missing or malformed descriptors yield `None`.
pub fn device_display_name(device: &Path) -> Option<String> {
    let descriptor: DeviceDescriptor = plist::from_file(device.join(DEVICE_DESCRIPTOR)).ok()?;

    let runtime = descriptor
        .runtime
        .as_deref()
        .map(runtime_label)
        .unwrap_or_default();

    if runtime.is_empty() {
        Some(descriptor.name)
    } else {
        Some(format!("{} ({runtime})", descriptor.name))
    }
}

fn runtime_label(runtime: &str) -> String {
    runtime
        .strip_prefix(SIM_RUNTIME_PREFIX)
        .unwrap_or(runtime)
        .replace('-', " ")
}

/// Bytes held by a device's safe sub-paths only, never its full footprint.
pub fn app_data_size(device: &Path) -> u64 {
    safe_subpaths(device).iter().map(|p| directory_size(p)).sum()
}

/// One item per device with reclaimable app data. The item's path is the
/// device directory so that removal can derive the same safe sub-paths.
pub fn scan_app_data(devices_dir: &Path) -> io::Result<(u64, Vec<ScannedItem>)> {
    let devices = list_children(devices_dir)?;

    let mut items: Vec<ScannedItem> = devices
        .par_iter()
        .filter(|device| device.is_dir())
        .filter_map(|device| {
            let size = app_data_size(device);
            if size == 0 {
                return None;
            }
            let name = device_display_name(device).unwrap_or_else(|| display_name(device));
            Some(ScannedItem::new(name, device.clone(), size))
        })
        .collect();

    let total_size = items.iter().map(|i| i.size).sum();
    sort_by_size(&mut items);
    Ok((total_size, items))
}
