//! Boundary to the host's persistence mechanism
//!
//! The host normally writes its tables to disk on its own schedule, guided
//! by dirty flags that a sort never sets. After sorting we ask it to write
//! the affected tables straight away through a [`Persistence`] gateway.

use crate::Result;
use strum::Display;

/// A host table that can be flushed to durable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum TableHandle {
    /// The gearset records
    Gearsets,
    /// The saved per class/job hotbars
    Hotbars,
}

/// Gateway that makes the host write one of its tables to disk
pub trait Persistence {
    /// Write `table` back to durable storage.
    ///
    /// With `force` set the host must write even if its own dirty tracking
    /// says nothing changed.
    fn flush(&mut self, table: TableHandle, force: bool) -> Result<()>;
}

impl<F> Persistence for F
where
    F: FnMut(TableHandle, bool) -> Result<()>,
{
    fn flush(&mut self, table: TableHandle, force: bool) -> Result<()> {
        self(table, force)
    }
}
