#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::mod_module_files)]
#![allow(clippy::uninlined_format_args)]

mod class_job;
mod compare;
mod config;
mod err;
mod gearset;
mod hotbar;
mod persist;
mod session;
mod sort;
mod sync;

use std::collections::BTreeSet;

pub use class_job::ClassJob;
pub use compare::{ClassJobPriority, Comparator, KeyOrder, SortKey, SortOrder};
pub use config::{Direction, SortConfig, CONFIG_VERSION};
pub use err::{Error, Result};
pub use gearset::{
    Gearset, GearsetEntry, GearsetFlags, GearsetId, GearsetTable, GEARSET_CAPACITY,
    GEARSET_NAME_SIZE,
};
pub use hotbar::{
    HotbarBar, HotbarCommandKind, HotbarSlot, HotbarTable, HotbarTableKind, LiveHotbarMemory,
    SavedHotbarMemory, HOTBAR_BARS, HOTBAR_SLOTS, SAVED_HOTBAR_CLASS_JOBS,
};
pub use persist::{Persistence, TableHandle};
pub use session::{SortSession, SortSessionBuilder};
pub use sort::SortReport;
pub use sync::{ReferenceSync, Retargeted};

use sort::Partitioner;

/// Sorts gearsets according to one validated [`SortConfig`]
///
/// The class/job priority table is computed once here and reused by every
/// sort this instance runs.
#[derive(Debug, Clone)]
pub struct GearsetSorter {
    /// Validated settings
    config: SortConfig,
    /// Rank table built from the class/job order
    priority: ClassJobPriority,
}

impl GearsetSorter {
    /// Validate `config` and prepare a sorter for it.
    pub fn new(config: SortConfig) -> Result<Self> {
        config.validate()?;
        let priority = ClassJobPriority::new(&config.class_job_sort_order);
        Ok(Self { config, priority })
    }

    /// The settings this sorter was built with.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Comparator honoring the configured class/job resolution.
    fn comparator(&self) -> Comparator<'_> {
        if self.config.strict_class_jobs {
            Comparator::strict(&self.priority)
        } else {
            Comparator::new(&self.priority)
        }
    }

    /// Sort every slot of the session's gearset table with the configured
    /// keys, then force the host to persist the gearsets and saved hotbars.
    ///
    /// On error the sort stops where it is. Every swap done until then is
    /// complete, with references already retargeted, so the host tables stay
    /// consistent but only partially ordered. Nothing is flushed.
    pub fn sort(&self, session: &mut SortSession<'_>) -> Result<SortReport> {
        let count = session.gearsets.count();
        let order = self.config.sort_order();
        tracing::info!(
            slots = count,
            existing = session.gearsets.existing_count(),
            primary = %order.primary.key,
            secondary = %order.secondary.key,
            "sorting gearsets"
        );

        let report = match count.checked_sub(1) {
            Some(hi) => self.sort_range(session, 0, hi, &order)?,
            None => SortReport::default(),
        };

        session.gateway.flush(TableHandle::Gearsets, true)?;
        if session.sync.has_saved_hotbars() {
            session.gateway.flush(TableHandle::Hotbars, true)?;
        }

        tracing::info!(
            swaps = report.swaps,
            current = report.retargeted.current,
            saved = report.retargeted.saved,
            live = report.retargeted.live,
            "sorted gearsets"
        );
        Ok(report)
    }

    /// Sort the inclusive slot range `[lo, hi]` with explicit keys.
    ///
    /// Nothing is flushed. Fails with [`Error::InvalidSlot`] before moving
    /// anything if `hi` lies outside the table.
    pub fn sort_range(
        &self,
        session: &mut SortSession<'_>,
        lo: usize,
        hi: usize,
        order: &SortOrder,
    ) -> Result<SortReport> {
        let count = session.gearsets.count();
        if hi >= count {
            return Err(Error::InvalidSlot { slot: hi, count });
        }
        if lo > hi {
            return Ok(SortReport::default());
        }
        self.warn_unlisted(&session.gearsets, lo, hi);

        let mut partitioner = Partitioner::new(
            &mut session.gearsets,
            &mut session.sync,
            self.comparator(),
            *order,
        );
        partitioner.sort(lo, hi)?;
        let report = partitioner.report();
        tracing::debug!(
            lo,
            hi,
            swaps = report.swaps,
            hotbar_slots = report.retargeted.hotbar_slots(),
            "sorted gearset range"
        );
        Ok(report)
    }

    /// Log each live class/job in range that the priority order doesn't list.
    fn warn_unlisted(&self, gearsets: &GearsetTable<'_>, lo: usize, hi: usize) {
        let unlisted: BTreeSet<u8> = gearsets
            .iter()
            .skip(lo)
            .take(hi - lo + 1)
            .filter(|gearset| gearset.exists())
            .map(|gearset| gearset.class_job())
            .filter(|&class_job| self.priority.rank(class_job).is_none())
            .collect();
        for class_job in unlisted {
            if self.config.strict_class_jobs {
                tracing::warn!(class_job, "class/job missing from the sort order");
            } else {
                tracing::warn!(
                    class_job,
                    "class/job missing from the sort order, sorting it last"
                );
            }
        }
    }
}

/// Sort every slot of `session` with `config`, then flush the host tables.
///
/// Builds a one-off [`GearsetSorter`]. Callers sorting repeatedly with the
/// same settings should keep a sorter around instead.
pub fn sort(config: &SortConfig, session: &mut SortSession<'_>) -> Result<SortReport> {
    GearsetSorter::new(config.clone())?.sort(session)
}
