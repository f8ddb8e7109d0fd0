pub mod policy;

use crate::constants::{LARGE_OPERATION_THRESHOLD, XCRUN};
use crate::error::{CleanError, Result};
use crate::model::{CategoryType, ScannedItem};
use crate::progress::ProgressSink;
use crate::scanner::simulator::{app_data_size, is_simulator_device, safe_subpaths};
use crate::scanner::utils::{directory_size, display_name, list_children};
use crate::storage::format_bytes;
use policy::RemovalPolicy;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The two side effects the cleaner cannot perform with plain filesystem
/// calls.
pub trait Remover: Send + Sync {
    fn trash(&self, path: &Path) -> Result<()>;
    /// Returns whether the device-management tool exited successfully.
    fn delete_device(&self, udid: &str) -> Result<bool>;
}

/// Finder trash and `xcrun simctl`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRemover;

impl Remover for SystemRemover {
    fn trash(&self, path: &Path) -> Result<()> {
        trash::delete(path).map_err(|source| CleanError::Trash {
            path: path.to_path_buf(),
            source,
        })
    }

    fn delete_device(&self, udid: &str) -> Result<bool> {
        let output = Command::new(XCRUN)
            .args(["simctl", "delete", udid])
            .output()
            .map_err(|source| CleanError::Command {
                program: format!("{XCRUN} simctl delete"),
                source,
            })?;

        if !output.status.success() {
            tracing::warn!(
                udid,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "simctl delete failed"
            );
        }
        Ok(output.status.success())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposal {
    Trash,
    Permanent,
}

#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// What a reclaim batch achieved. `freed` only counts removals that
/// succeeded, so it undercounts rather than overcounts on failure.
#[derive(Debug, Clone, Default)]
pub struct ReclaimReport {
    pub freed: u64,
    pub removed: usize,
    pub failures: Vec<ItemFailure>,
}

impl ReclaimReport {
    fn record_failure(&mut self, path: &Path, error: &CleanError) {
        tracing::warn!(path = %path.display(), error = %error, "failed to reclaim");
        self.failures.push(ItemFailure {
            path: path.to_path_buf(),
            reason: error.to_string(),
        });
    }

    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!(
                "Successfully cleaned {} from {} item(s)!",
                format_bytes(self.freed),
                self.removed
            )
        } else {
            format!(
                "Cleaned {} ({} item(s) could not be removed).",
                format_bytes(self.freed),
                self.failures.len()
            )
        }
    }
}

struct Target {
    path: PathBuf,
    size: u64,
}

pub struct Cleaner<R = SystemRemover> {
    home: PathBuf,
    remover: R,
}

impl Cleaner<SystemRemover> {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self::with_remover(home, SystemRemover)
    }
}

impl<R: Remover> Cleaner<R> {
    pub fn with_remover(home: impl Into<PathBuf>, remover: R) -> Self {
        Self {
            home: home.into(),
            remover,
        }
    }

    /// Reclaims the given items, crediting each item's declared size.
    pub fn remove_selected(
        &self,
        items: &[ScannedItem],
        category: Option<CategoryType>,
        progress: Option<&dyn ProgressSink>,
    ) -> ReclaimReport {
        let targets: Vec<Target> = items
            .iter()
            .map(|i| Target {
                path: i.path.clone(),
                size: i.size,
            })
            .collect();
        self.reclaim(&targets, category, progress, Disposal::Trash)
    }

    /// Reclaims everything currently under the category's base directory,
    /// independent of any earlier scan.
    pub fn remove_all_in_category(
        &self,
        category: CategoryType,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ReclaimReport> {
        let targets = self.list_category(category)?;
        Ok(self.reclaim(&targets, Some(category), progress, Disposal::Trash))
    }

    /// Permanent variant of [`Self::remove_selected`]. Sizes are measured
    /// before removal since they cannot be known afterwards.
    pub fn delete_items(
        &self,
        items: &[ScannedItem],
        category: Option<CategoryType>,
        progress: Option<&dyn ProgressSink>,
    ) -> ReclaimReport {
        let targets: Vec<Target> = items
            .par_iter()
            .map(|i| Target {
                path: i.path.clone(),
                size: directory_size(&i.path),
            })
            .collect();
        self.reclaim(&targets, category, progress, Disposal::Permanent)
    }

    /// Permanent variant of [`Self::remove_all_in_category`].
    pub fn delete_category(
        &self,
        category: CategoryType,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ReclaimReport> {
        let targets = self.list_category(category)?;
        Ok(self.reclaim(&targets, Some(category), progress, Disposal::Permanent))
    }

    fn list_category(&self, category: CategoryType) -> Result<Vec<Target>> {
        let base = category.base_path(&self.home);
        let entries = list_children(&base).map_err(|source| CleanError::Listing {
            category,
            path: base.clone(),
            source,
        })?;

        // App data covers the same device directories the scan sizes; loose
        // files such as `device_set.plist` belong to CoreSimulator.
        let app_data = category == CategoryType::SimulatorAppData;
        Ok(entries
            .into_par_iter()
            .filter(|path| !app_data || path.is_dir())
            .map(|path| {
                let size = if app_data {
                    app_data_size(&path)
                } else {
                    directory_size(&path)
                };
                Target { path, size }
            })
            .collect())
    }

    fn reclaim(
        &self,
        targets: &[Target],
        category: Option<CategoryType>,
        progress: Option<&dyn ProgressSink>,
        disposal: Disposal,
    ) -> ReclaimReport {
        let total: u64 = targets.iter().map(|t| t.size).sum();
        let sink = progress.filter(|_| total > LARGE_OPERATION_THRESHOLD);

        if let Some(sink) = sink {
            sink.start();
        }

        let mut report = ReclaimReport::default();
        for (index, target) in targets.iter().enumerate() {
            self.reclaim_one(target, category, disposal, &mut report);

            if let Some(sink) = sink {
                #[allow(clippy::cast_precision_loss)]
                let fraction = (index + 1) as f64 / targets.len() as f64;
                let status = format!("{} / {}", format_bytes(report.freed), format_bytes(total));
                sink.update(fraction, &status);
            }
        }

        if let Some(sink) = sink {
            sink.finish();
        }

        tracing::info!(
            category = category.map(CategoryType::id),
            items = targets.len(),
            freed = report.freed,
            failures = report.failures.len(),
            permanent = disposal == Disposal::Permanent,
            "reclaim finished"
        );
        report
    }

    fn reclaim_one(
        &self,
        target: &Target,
        category: Option<CategoryType>,
        disposal: Disposal,
        report: &mut ReclaimReport,
    ) {
        let path = &target.path;
        if fs::symlink_metadata(path).is_err() {
            tracing::debug!(path = %path.display(), "already gone");
            return;
        }

        let policy = RemovalPolicy::select(category, is_simulator_device(path));
        let result = match policy {
            RemovalPolicy::TrashWholePath => self.dispose(path, disposal).map(|()| target.size),
            RemovalPolicy::DeleteDevice => self.delete_device(path).map(|()| target.size),
            RemovalPolicy::ClearAppData => {
                let freed = self.clear_app_data(path, disposal, report);
                report.freed += freed;
                return;
            }
        };

        match result {
            Ok(freed) => {
                report.freed += freed;
                report.removed += 1;
            }
            Err(e) => report.record_failure(path, &e),
        }
    }

    fn delete_device(&self, device: &Path) -> Result<()> {
        let udid = display_name(device);
        if self.remover.delete_device(&udid)? {
            Ok(())
        } else {
            Err(CleanError::DeviceNotDeleted { udid })
        }
    }

    /// Removes the contents of the device's safe sub-paths entry by entry.
    /// The device directory and the sub-path directories stay in place.
    fn clear_app_data(
        &self,
        device: &Path,
        disposal: Disposal,
        report: &mut ReclaimReport,
    ) -> u64 {
        let mut freed = 0;
        let mut removed_any = false;

        for subdir in safe_subpaths(device) {
            let entries = match fs::read_dir(&subdir) {
                Ok(read_dir) => read_dir,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    report.record_failure(&subdir, &CleanError::io(&subdir, e));
                    continue;
                }
            };

            for entry in entries.filter_map(std::result::Result::ok) {
                let path = entry.path();
                let size = directory_size(&path);
                match self.dispose(&path, disposal) {
                    Ok(()) => {
                        freed += size;
                        removed_any = true;
                    }
                    Err(e) => report.record_failure(&path, &e),
                }
            }
        }

        if removed_any {
            report.removed += 1;
        }
        freed
    }

    fn dispose(&self, path: &Path, disposal: Disposal) -> Result<()> {
        match disposal {
            Disposal::Trash => self.remover.trash(path),
            Disposal::Permanent => remove_path(path),
        }
    }
}

fn remove_path(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| CleanError::io(path, e))?;
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| CleanError::io(path, e))
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeRemover;
    use super::*;
    use crate::progress::test_support::{Event, RecordingSink};
    use crate::scanner::simulator::test_support::write_descriptor;
    use crate::scanner::utils::test_support::write_file;
    use anyhow::Result;
    use tempfile::tempdir;

    fn item(path: PathBuf, size: u64) -> ScannedItem {
        ScannedItem::new(display_name(&path), path, size)
    }

    #[test]
    fn remove_all_in_derived_data() -> Result<()> {
        let home = tempdir()?;
        let base = CategoryType::DerivedData.base_path(home.path());
        write_file(&base.join("App-abc123/Build/big.o"), 10_000_000)?;
        write_file(&base.join("App2-def456/Build/small.o"), 5_000_000)?;
        write_file(&base.join(".hidden-marker"), 1)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_all_in_category(CategoryType::DerivedData, None)?;

        assert_eq!(report.freed, 15_000_000);
        assert_eq!(report.removed, 2);
        assert!(report.failures.is_empty());
        assert!(!base.join("App-abc123").exists());
        assert!(!base.join("App2-def456").exists());
        assert!(base.join(".hidden-marker").exists());
        Ok(())
    }

    #[test]
    fn remove_all_in_missing_category_is_empty() -> Result<()> {
        let home = tempdir()?;
        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        for category in CategoryType::ALL {
            let report = cleaner.remove_all_in_category(category, None)?;
            assert_eq!(report.freed, 0);
            assert_eq!(report.removed, 0);
        }
        Ok(())
    }

    #[test]
    fn remove_selected_credits_declared_sizes() -> Result<()> {
        let home = tempdir()?;
        let a = home.path().join("a");
        let b = home.path().join("b.log");
        write_file(&a.join("f"), 10)?;
        write_file(&b, 10)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_selected(&[item(a, 300), item(b, 200)], None, None);

        assert_eq!(report.freed, 500);
        assert_eq!(report.removed, 2);
        Ok(())
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() -> Result<()> {
        let home = tempdir()?;
        let paths: Vec<PathBuf> = (0..3).map(|i| home.path().join(format!("p{i}"))).collect();
        for p in &paths {
            write_file(&p.join("f"), 1)?;
        }
        let items: Vec<ScannedItem> = paths.iter().map(|p| item(p.clone(), 100)).collect();

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::failing_on(&paths[1]));
        let report = cleaner.remove_selected(&items, Some(CategoryType::Archives), None);

        assert_eq!(report.freed, 200);
        assert_eq!(report.removed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, paths[1]);
        assert!(!paths[0].exists());
        assert!(paths[1].exists());
        assert!(!paths[2].exists());
        Ok(())
    }

    #[test]
    fn removing_twice_frees_nothing_the_second_time() -> Result<()> {
        let home = tempdir()?;
        let path = home.path().join("Archive.xcarchive");
        write_file(&path.join("Info.plist"), 42)?;
        let items = vec![item(path, 42)];

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        assert_eq!(cleaner.remove_selected(&items, None, None).freed, 42);

        let second = cleaner.remove_selected(&items, None, None);
        assert_eq!(second.freed, 0);
        assert!(second.failures.is_empty());
        Ok(())
    }

    #[test]
    fn large_batches_report_monotonic_progress() -> Result<()> {
        let home = tempdir()?;
        let items: Vec<ScannedItem> = (0..4)
            .map(|i| {
                let path = home.path().join(format!("cache{i}"));
                write_file(&path.join("f"), 1).map(|()| item(path, 400_000_000))
            })
            .collect::<Result<_>>()?;

        let sink = RecordingSink::default();
        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_selected(&items, None, Some(&sink));
        assert_eq!(report.freed, 1_600_000_000);

        let events = sink.events();
        assert_eq!(events.first(), Some(&Event::Start));
        assert_eq!(events.last(), Some(&Event::Finish));

        let fractions: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                Event::Update(f, _) => Some(*f),
                _ => None,
            })
            .collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);

        let Some(Event::Update(_, last_status)) = events.get(events.len() - 2) else {
            panic!("expected an update before finish");
        };
        let total = format_bytes(1_600_000_000);
        assert_eq!(last_status, &format!("{total} / {total}"));
        Ok(())
    }

    #[test]
    fn small_batches_do_not_touch_progress() -> Result<()> {
        let home = tempdir()?;
        let path = home.path().join("small");
        write_file(&path, 10)?;

        let sink = RecordingSink::default();
        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        cleaner.remove_selected(&[item(path, 10)], None, Some(&sink));

        assert!(sink.events().is_empty());
        Ok(())
    }

    #[test]
    fn app_data_removal_keeps_the_device() -> Result<()> {
        let home = tempdir()?;
        let device = CategoryType::SimulatorAppData
            .base_path(home.path())
            .join("DEVICE-1");
        write_descriptor(&device, "iPhone 15", "com.apple.CoreSimulator.SimRuntime.iOS-17-0")?;
        write_file(&device.join("data/Containers/Data/Application/A/db"), 2_000)?;
        write_file(&device.join("data/Containers/Data/Application/B/db"), 1_000)?;
        write_file(&device.join("data/Containers/Bundle/Application/A/My.app"), 500)?;
        write_file(&device.join("data/Library/Preferences/prefs.plist"), 64)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_selected(
            &[item(device.clone(), 3_500)],
            Some(CategoryType::SimulatorAppData),
            None,
        );

        assert_eq!(report.freed, 3_500);
        assert_eq!(report.removed, 1);
        assert!(device.join("device.plist").exists());
        assert!(device.join("data/Library/Preferences/prefs.plist").exists());
        assert!(device.join("data/Containers/Data/Application").exists());
        assert_eq!(fs::read_dir(device.join("data/Containers/Data/Application"))?.count(), 0);
        assert_eq!(fs::read_dir(device.join("data/Containers/Bundle/Application"))?.count(), 0);
        Ok(())
    }

    #[test]
    fn clearing_all_app_data_matches_the_scan() -> Result<()> {
        let home = tempdir()?;
        let base = CategoryType::SimulatorAppData.base_path(home.path());
        let device = base.join("DEV-1");
        write_descriptor(&device, "iPhone 15", "com.apple.CoreSimulator.SimRuntime.iOS-17-0")?;
        write_file(&device.join("data/Containers/Data/Application/A/db"), 1_000)?;
        let bare = base.join("DEV-2");
        write_file(&bare.join("data/Containers/Bundle/Application/B/My.app"), 400)?;
        write_file(&bare.join("data/Library/keep"), 16)?;
        write_file(&base.join("device_set.plist"), 128)?;

        let scanned = crate::scanner::scan_category(CategoryType::SimulatorAppData, home.path())?;
        assert_eq!(scanned.total_size, 1_400);

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_all_in_category(CategoryType::SimulatorAppData, None)?;

        assert_eq!(report.freed, scanned.total_size);
        assert_eq!(report.removed, 2);
        assert!(base.join("device_set.plist").exists());
        assert!(device.join("device.plist").exists());
        assert!(bare.join("data/Library/keep").exists());
        assert!(
            cleaner
                .remover
                .trashed()
                .iter()
                .all(|p| p.starts_with(device.join("data/Containers"))
                    || p.starts_with(bare.join("data/Containers")))
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_category_fails_the_whole_batch() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let home = tempdir()?;
        let base = CategoryType::Archives.base_path(home.path());
        let archive = base.join("App.xcarchive");
        write_file(&archive.join("Info.plist"), 10)?;
        fs::set_permissions(&base, fs::Permissions::from_mode(0o000))?;

        // Root can still list the directory.
        if fs::read_dir(&base).is_ok() {
            fs::set_permissions(&base, fs::Permissions::from_mode(0o755))?;
            return Ok(());
        }

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let trashed = cleaner.remove_all_in_category(CategoryType::Archives, None);
        let deleted = cleaner.delete_category(CategoryType::Archives, None);
        fs::set_permissions(&base, fs::Permissions::from_mode(0o755))?;

        for result in [trashed, deleted] {
            assert!(matches!(
                result,
                Err(CleanError::Listing {
                    category: CategoryType::Archives,
                    ..
                })
            ));
        }
        assert!(archive.join("Info.plist").exists());
        assert!(cleaner.remover.trashed().is_empty());
        Ok(())
    }

    #[test]
    fn app_data_removal_credits_only_removed_entries() -> Result<()> {
        let home = tempdir()?;
        let device = home.path().join("DEVICE-2");
        write_descriptor(&device, "iPad", "com.apple.CoreSimulator.SimRuntime.iOS-18-0")?;
        let stuck = device.join("data/Containers/Data/Application/STUCK");
        write_file(&stuck.join("db"), 700)?;
        write_file(&device.join("data/Containers/Data/Application/OK/db"), 300)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::failing_on(&stuck));
        let report = cleaner.remove_selected(
            &[item(device, 1_000)],
            Some(CategoryType::SimulatorAppData),
            None,
        );

        assert_eq!(report.freed, 300);
        assert_eq!(report.failures.len(), 1);
        assert!(stuck.exists());
        Ok(())
    }

    #[test]
    fn simulator_device_deletion_follows_exit_status() -> Result<()> {
        let home = tempdir()?;
        let device = CategoryType::SimulatorDevices
            .base_path(home.path())
            .join("UDID-1234");
        write_descriptor(&device, "iPhone 15", "com.apple.CoreSimulator.SimRuntime.iOS-17-0")?;
        let items = vec![item(device.clone(), 9_000)];

        let failing = FakeRemover {
            simctl_succeeds: false,
            ..FakeRemover::default()
        };
        let cleaner = Cleaner::with_remover(home.path(), failing);
        let report = cleaner.remove_selected(&items, Some(CategoryType::SimulatorDevices), None);
        assert_eq!(report.freed, 0);
        assert_eq!(report.failures.len(), 1);

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_selected(&items, Some(CategoryType::SimulatorDevices), None);
        assert_eq!(report.freed, 9_000);
        assert_eq!(cleaner.remover.deleted_devices(), vec!["UDID-1234".to_string()]);
        assert!(cleaner.remover.trashed().is_empty());
        Ok(())
    }

    #[test]
    fn non_device_in_simulator_category_is_trashed() -> Result<()> {
        let home = tempdir()?;
        let base = CategoryType::SimulatorDevices.base_path(home.path());
        write_file(&base.join("device_set.plist"), 128)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.remove_all_in_category(CategoryType::SimulatorDevices, None)?;

        assert_eq!(report.freed, 128);
        assert!(cleaner.remover.deleted_devices().is_empty());
        Ok(())
    }

    #[test]
    fn delete_category_is_permanent_and_measures_first() -> Result<()> {
        let home = tempdir()?;
        let base = CategoryType::Logs.base_path(home.path());
        write_file(&base.join("Build/a.xcactivitylog"), 1_234)?;
        write_file(&base.join("Test/b.xcresult/data"), 4_321)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.delete_category(CategoryType::Logs, None)?;

        assert_eq!(report.freed, 5_555);
        assert!(cleaner.remover.trashed().is_empty());
        assert_eq!(fs::read_dir(&base)?.count(), 0);
        Ok(())
    }

    #[test]
    fn delete_items_ignores_declared_size() -> Result<()> {
        let home = tempdir()?;
        let path = home.path().join("stale.log");
        write_file(&path, 50)?;

        let cleaner = Cleaner::with_remover(home.path(), FakeRemover::new());
        let report = cleaner.delete_items(&[item(path.clone(), 999_999)], None, None);

        assert_eq!(report.freed, 50);
        assert!(!path.exists());
        Ok(())
    }
}
