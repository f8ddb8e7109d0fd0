use humansize::{DECIMAL, format_size};
use std::path::Path;
use sysinfo::Disks;

/// Capacity of the root volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl StorageInfo {
    /// Reads the root volume's capacity. Zeros if `/` is not among the
    /// mounted disks.
    pub fn current() -> Self {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .map_or_else(Self::default, |disk| {
                Self::from_capacity(disk.total_space(), disk.available_space())
            })
    }

    pub fn from_capacity(total: u64, available: u64) -> Self {
        Self {
            total,
            used: total.saturating_sub(available),
            free: available,
        }
    }

    pub fn usage_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.used as f64 / self.total as f64
        }
    }
}

/// Human readable byte count, decimal units like Finder shows them.
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_ratio_handles_empty_volume() {
        assert!(StorageInfo::default().usage_ratio().abs() < f64::EPSILON);

        let info = StorageInfo::from_capacity(1000, 250);
        assert_eq!(info.used, 750);
        assert_eq!(info.free, 250);
        assert!((info.usage_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn available_larger_than_total_saturates() {
        let info = StorageInfo::from_capacity(100, 200);
        assert_eq!(info.used, 0);
    }

    #[test]
    fn format_bytes_uses_decimal_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert!(format_bytes(1_500_000_000).starts_with("1.5"));
        assert!(format_bytes(1_500_000_000).ends_with("GB"));
    }
}
