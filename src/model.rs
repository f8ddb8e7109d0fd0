use crate::constants::{
    COCOAPODS_CACHE, SIMULATOR_DEVICES, SWIFTPM_CACHE, XCODE_ARCHIVES, XCODE_DERIVED_DATA,
    XCODE_DEVICE_SUPPORT, XCODE_LOGS,
};
use crate::error::CleanError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryType {
    DerivedData,
    Archives,
    DeviceSupport,
    SimulatorDevices,
    SimulatorAppData,
    PackageCache,
    DependencyCache,
    Logs,
}

impl CategoryType {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::DerivedData,
        Self::Archives,
        Self::DeviceSupport,
        Self::SimulatorDevices,
        Self::SimulatorAppData,
        Self::PackageCache,
        Self::DependencyCache,
        Self::Logs,
    ];

    /// Stable identifier, also accepted on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::DerivedData => "derived-data",
            Self::Archives => "archives",
            Self::DeviceSupport => "device-support",
            Self::SimulatorDevices => "simulator-devices",
            Self::SimulatorAppData => "simulator-app-data",
            Self::PackageCache => "package-cache",
            Self::DependencyCache => "dependency-cache",
            Self::Logs => "logs",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DerivedData => "Derived Data",
            Self::Archives => "Archives",
            Self::DeviceSupport => "Device Support",
            Self::SimulatorDevices => "Simulators",
            Self::SimulatorAppData => "Simulator App Data",
            Self::PackageCache => "SPM Cache",
            Self::DependencyCache => "CocoaPods Cache",
            Self::Logs => "Xcode Logs",
        }
    }

    /// Directory holding this category's entries. Both simulator categories
    /// share the CoreSimulator devices directory.
    pub fn base_path(self, home: &Path) -> PathBuf {
        let relative = match self {
            Self::DerivedData => XCODE_DERIVED_DATA,
            Self::Archives => XCODE_ARCHIVES,
            Self::DeviceSupport => XCODE_DEVICE_SUPPORT,
            Self::SimulatorDevices | Self::SimulatorAppData => SIMULATOR_DEVICES,
            Self::PackageCache => SWIFTPM_CACHE,
            Self::DependencyCache => COCOAPODS_CACHE,
            Self::Logs => XCODE_LOGS,
        };
        home.join(relative)
    }

    pub fn info_text(self) -> Option<&'static str> {
        match self {
            Self::DeviceSupport => Some(
                "Debug symbol files for physical devices. Xcode downloads these when you \
                 connect a device and re-downloads them when needed.",
            ),
            Self::SimulatorDevices => Some(
                "Full simulator devices. Deleting removes the simulator entirely \
                 (simctl delete). Xcode recreates default devices on next launch.",
            ),
            Self::SimulatorAppData => Some(
                "Installed apps and their sandboxes inside each simulator. \
                 The simulator devices themselves are kept.",
            ),
            _ => None,
        }
    }

    /// Presentation hint only.
    pub fn icon(self) -> &'static str {
        match self {
            Self::DerivedData => "🔨",
            Self::Archives => "📦",
            Self::DeviceSupport => "📱",
            Self::SimulatorDevices => "🖥",
            Self::SimulatorAppData => "🧩",
            Self::PackageCache => "🚚",
            Self::DependencyCache => "🧱",
            Self::Logs => "📄",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CategoryType {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CleanError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ScannedItem {
    #[allow(dead_code)]
    pub id: Uuid,
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_selected: bool,
}

impl ScannedItem {
    pub fn new(name: impl Into<String>, path: PathBuf, size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            path,
            size,
            is_selected: false,
        }
    }
}

/// Sized, sorted inventory of one category as of its last scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub category: CategoryType,
    pub total_size: u64,
    pub items: Vec<ScannedItem>,
    pub root_path: PathBuf,
}

impl ScanResult {
    pub fn selected_items(&self) -> Vec<ScannedItem> {
        self.items.iter().filter(|i| i.is_selected).cloned().collect()
    }
}
