//! Error types for the scan and reclaim engine.
//!
//! A missing path is never an error here: scanning or removing something that
//! does not exist yields an empty result. Errors are reserved for failures
//! that the caller has to hear about, such as a category directory that
//! exists but cannot be listed.

use crate::model::CategoryType;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = CleanError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum CleanError {
    /// Neither an override nor the platform could name a home directory.
    #[error("home directory not found")]
    HomeNotFound,

    /// The top-level listing of a category's base directory failed. Fatal
    /// for that category's batch only.
    #[error("failed to list {category} at '{path}'")]
    Listing {
        category: CategoryType,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error accessing '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move '{path}' to the trash")]
    Trash {
        path: PathBuf,
        #[source]
        source: trash::Error,
    },

    #[error("failed to run '{program}'")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `simctl delete` ran but reported failure.
    #[error("simctl could not delete device {udid}")]
    DeviceNotDeleted { udid: String },

    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

impl CleanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
