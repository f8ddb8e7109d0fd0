pub const TRASH_DIR: &str = ".Trash";

pub const XCODE_DERIVED_DATA: &str = "Library/Developer/Xcode/DerivedData";
pub const XCODE_ARCHIVES: &str = "Library/Developer/Xcode/Archives";
pub const XCODE_DEVICE_SUPPORT: &str = "Library/Developer/Xcode/iOS DeviceSupport";
pub const XCODE_LOGS: &str = "Library/Developer/Xcode/UserData/Logs";
pub const SIMULATOR_DEVICES: &str = "Library/Developer/CoreSimulator/Devices";

pub const SWIFTPM_CACHE: &str = "Library/Caches/org.swift.swiftpm";
pub const COCOAPODS_CACHE: &str = "Library/Caches/CocoaPods";

/// Descriptor written by CoreSimulator into every device directory.
pub const DEVICE_DESCRIPTOR: &str = "device.plist";
pub const SIM_RUNTIME_PREFIX: &str = "com.apple.CoreSimulator.SimRuntime.";

/// Regenerable parts of a simulator device's data store: installed app
/// sandboxes and app bundles.
pub const SIMULATOR_SAFE_SUBDIRS: [&str; 2] = [
    "data/Containers/Data/Application",
    "data/Containers/Bundle/Application",
];

pub const XCRUN: &str = "/usr/bin/xcrun";

/// Batches whose declared size exceeds this report per-item progress.
pub const LARGE_OPERATION_THRESHOLD: u64 = 1_000_000_000;
