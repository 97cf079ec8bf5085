//! Error types for the `gearsort` crate

use crate::persist::TableHandle;
use std::sync::Arc;

/// Errors that abort a sort session
///
/// None of these are transient. A sort is a fixed-size, synchronous,
/// single-writer operation, so every error is reported once and the
/// whole call is abandoned.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A [`crate::SortSession`] was built without one of its host bindings.
    ///
    /// The payload names the missing binding.
    #[error("sort session is missing its {0} binding")]
    Uninitialized(&'static str),

    /// A slot index outside `[0, count)` reached the gearset table.
    ///
    /// This always indicates a logic defect in the caller, never a
    /// runtime condition worth recovering from.
    #[error("gearset slot {slot} is outside the table of {count} slots")]
    InvalidSlot {
        /// The offending index
        slot: usize,
        /// Capacity reported by the host
        count: usize,
    },

    /// A class/job value is missing from the configured priority order
    /// while strict class/job resolution is enabled.
    #[error("class/job {0:#04x} is not listed in the class/job sort order")]
    UnresolvedClassJob(u8),

    /// A host slot carries an identity that differs from its position.
    #[error("gearset slot {slot} carries identity {found}, expected its own position")]
    IdentityMismatch {
        /// Position of the slot
        slot: usize,
        /// Identity value found at that position
        found: u8,
    },

    /// A raw host buffer can't be viewed as gearset records.
    #[error("host buffer does not hold whole gearset records: {0}")]
    HostLayout(bytemuck::PodCastError),

    /// The sort configuration failed validation.
    #[error("invalid sort configuration: {0}")]
    InvalidConfig(String),

    /// Reading or writing the configuration file failed, with a [`std::io::Error`].
    #[error("failed to access the sort configuration file: {0}")]
    ConfigIo(#[source] Arc<std::io::Error>),

    /// The configuration file isn't valid JSON for [`crate::SortConfig`].
    #[error("failed to parse the sort configuration: {0}")]
    ConfigFormat(#[source] Arc<serde_json::Error>),

    /// The persistence gateway refused to write a table.
    #[error("failed to flush the {table} table: {reason}")]
    Flush {
        /// Which table was being flushed
        table: TableHandle,
        /// Description reported by the gateway
        reason: String,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::ConfigIo(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigFormat(Arc::new(err))
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
