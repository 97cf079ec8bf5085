//! Per-invocation context binding the host's tables
//!
//! A [`SortSession`] holds mutable borrows of everything one sort touches:
//! the gearset records, the active gearset cell, both hotbar tables and the
//! persistence gateway. It's built fresh for each sort and dropped when the
//! sort returns, so there's no process-wide state to set up or tear down.

use crate::hotbar::{HotbarTable, LiveHotbarMemory, SavedHotbarMemory};
use crate::persist::Persistence;
use crate::sync::ReferenceSync;
use crate::{Error, GearsetTable, Result};

/// Host bindings for a single sort
pub struct SortSession<'a> {
    /// The gearset records
    pub(crate) gearsets: GearsetTable<'a>,
    /// Active gearset cell and hotbar tables
    pub(crate) sync: ReferenceSync<'a>,
    /// Persistence gateway
    pub(crate) gateway: &'a mut dyn Persistence,
}

impl<'a> SortSession<'a> {
    /// Start collecting host bindings.
    pub fn builder() -> SortSessionBuilder<'a> {
        SortSessionBuilder::default()
    }

    /// The bound gearset records.
    pub fn gearsets(&self) -> &GearsetTable<'a> {
        &self.gearsets
    }

    /// The bound references.
    pub fn references(&self) -> &ReferenceSync<'a> {
        &self.sync
    }
}

impl std::fmt::Debug for SortSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortSession")
            .field("gearsets", &self.gearsets)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SortSession`]
///
/// Every binding is required unless stated otherwise; [`Self::build`]
/// fails with [`Error::Uninitialized`] naming the first one missing.
#[derive(Default)]
pub struct SortSessionBuilder<'a> {
    /// Gearset records
    gearsets: Option<GearsetTable<'a>>,
    /// Active gearset cell
    current: Option<&'a mut u8>,
    /// Saved hotbars
    saved: Option<HotbarTable<'a>>,
    /// Live hotbars
    live: Option<HotbarTable<'a>>,
    /// Allow building without hotbar tables
    without_hotbars: bool,
    /// Persistence gateway
    gateway: Option<&'a mut dyn Persistence>,
}

impl<'a> SortSessionBuilder<'a> {
    /// Bind the gearset records.
    pub fn gearsets(mut self, gearsets: GearsetTable<'a>) -> Self {
        self.gearsets = Some(gearsets);
        self
    }

    /// Bind the active gearset cell.
    pub fn current_gearset(mut self, current: &'a mut u8) -> Self {
        self.current = Some(current);
        self
    }

    /// Bind the saved per class/job hotbars.
    pub fn saved_hotbars(mut self, mem: &'a mut SavedHotbarMemory) -> Self {
        self.saved = Some(HotbarTable::saved(mem));
        self
    }

    /// Bind the live hotbars.
    pub fn live_hotbars(mut self, mem: &'a mut LiveHotbarMemory) -> Self {
        self.live = Some(HotbarTable::live(mem));
        self
    }

    /// Allow the session to run with neither hotbar table bound.
    ///
    /// Hotbar slots that equip a moved gearset will be left stale.
    pub fn without_hotbars(mut self) -> Self {
        self.without_hotbars = true;
        self
    }

    /// Bind the persistence gateway.
    pub fn gateway(mut self, gateway: &'a mut dyn Persistence) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Check the bindings and build the session.
    ///
    /// Also verifies that every gearset slot exposes its own position as
    /// identity, so a corrupt host table is rejected before anything moves.
    pub fn build(self) -> Result<SortSession<'a>> {
        let gearsets = self.gearsets.ok_or(Error::Uninitialized("gearset table"))?;
        let current = self
            .current
            .ok_or(Error::Uninitialized("active gearset cell"))?;
        if !self.without_hotbars {
            if self.saved.is_none() {
                return Err(Error::Uninitialized("saved hotbars"));
            }
            if self.live.is_none() {
                return Err(Error::Uninitialized("live hotbars"));
            }
        }
        let gateway = self
            .gateway
            .ok_or(Error::Uninitialized("persistence gateway"))?;

        gearsets.check_identities()?;

        Ok(SortSession {
            gearsets,
            sync: ReferenceSync::from_parts(current, self.saved, self.live),
            gateway,
        })
    }
}
