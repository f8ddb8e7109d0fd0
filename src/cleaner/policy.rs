use crate::model::CategoryType;

/// How one path is reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Move the whole path to the trash and credit its declared size.
    TrashWholePath,
    /// Trash the children of a simulator device's safe sub-paths one by one,
    /// keeping the device itself.
    ClearAppData,
    /// Hand the device to `simctl delete`. Bypasses the trash.
    DeleteDevice,
}

impl RemovalPolicy {
    /// `is_device` is whether the path carries a simulator device descriptor.
    /// App data is always cleared through the safe sub-paths, descriptor or
    /// not, so that category never trashes a whole path.
    pub fn select(category: Option<CategoryType>, is_device: bool) -> Self {
        match (category, is_device) {
            (Some(CategoryType::SimulatorAppData), _) => Self::ClearAppData,
            (Some(CategoryType::SimulatorDevices), true) => Self::DeleteDevice,
            _ => Self::TrashWholePath,
        }
    }
}
