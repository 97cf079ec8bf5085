//! In-place partition sort over a gearset table
//!
//! This is a recursive quicksort with a Lomuto partition: the last slot of
//! each range is the pivot, and a single forward scan promotes every slot
//! that belongs before it. Every exchange goes through
//! [`GearsetTable::swap`], so host references follow the content as it
//! moves.
//!
//! Deleted slots need to end up behind every live gearset. The scan never
//! promotes a deleted slot, and a deleted pivot promotes every live slot in
//! its range, so deleted slots drift to the tail as the recursion proceeds
//! without needing a separate compaction pass.
//!
//! The sort is not stable, and it degrades to quadratic time on reversed
//! input. Tables hold at most a hundred slots and a sort runs once per user
//! command, so neither matters here.

use crate::compare::{Comparator, SortOrder};
use crate::gearset::{Gearset, GearsetTable};
use crate::sync::{ReferenceSync, Retargeted};
use crate::Result;

/// Summary of one sort invocation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct SortReport {
    /// Number of slot exchanges performed
    pub swaps: usize,
    /// Number of references rewritten along the way
    pub retargeted: Retargeted,
}

/// Borrowed state for one recursive sort
pub(crate) struct Partitioner<'s, 'a> {
    /// Gearset records being sorted
    table: &'s mut GearsetTable<'a>,
    /// References that follow each exchange
    sync: &'s mut ReferenceSync<'a>,
    /// Ordering decisions
    comparator: Comparator<'s>,
    /// Keys and directions
    order: SortOrder,
    /// Running totals
    report: SortReport,
}

impl<'s, 'a> Partitioner<'s, 'a> {
    /// Prepare a sort over `table` that keeps `sync` up to date.
    pub(crate) fn new(
        table: &'s mut GearsetTable<'a>,
        sync: &'s mut ReferenceSync<'a>,
        comparator: Comparator<'s>,
        order: SortOrder,
    ) -> Self {
        Self {
            table,
            sync,
            comparator,
            order,
            report: SortReport::default(),
        }
    }

    /// Totals accumulated so far.
    pub(crate) fn report(&self) -> SortReport {
        self.report
    }

    /// Sort the inclusive slot range `[lo, hi]`.
    pub(crate) fn sort(&mut self, lo: usize, hi: usize) -> Result<()> {
        if lo >= hi {
            return Ok(());
        }
        let pivot = self.partition(lo, hi)?;
        if pivot > lo {
            self.sort(lo, pivot - 1)?;
        }
        self.sort(pivot + 1, hi)
    }

    /// Partition `[lo, hi]` around the gearset in slot `hi`.
    ///
    /// Returns the partition point. Every live slot before it orders before
    /// the slot at the partition point, and nothing after it does.
    fn partition(&mut self, lo: usize, hi: usize) -> Result<usize> {
        let pivot = self.table.read(hi)?;

        // Next slot to receive a promoted gearset
        let mut next = lo;
        for j in lo..hi {
            let current = self.table.read(j)?;
            if !current.exists() {
                continue;
            }
            if !pivot.exists() || self.comparator.orders_before(&current, &pivot, &self.order)? {
                if next != j {
                    self.swap(next, j)?;
                }
                next += 1;
            }
        }

        if next != hi && !self.settled(&pivot, next)? {
            self.swap(next, hi)?;
        }
        Ok(next)
    }

    /// Whether the gearset at the partition boundary can stand in for the
    /// pivot, so the closing exchange would only reorder ties.
    ///
    /// A deleted pivot promotes every live slot, which leaves a deleted slot
    /// at the boundary. A live boundary slot was not promoted, so it ties
    /// the pivot unless the pivot orders strictly before it.
    fn settled(&self, pivot: &Gearset, boundary: usize) -> Result<bool> {
        if !pivot.exists() {
            return Ok(true);
        }
        let boundary = self.table.read(boundary)?;
        if !boundary.exists() {
            return Ok(false);
        }
        Ok(!self.comparator.orders_before(pivot, &boundary, &self.order)?)
    }

    /// Exchange two slots and account for it.
    fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        tracing::trace!(a, b, "swapping gearset slots");
        self.report.retargeted += self.table.swap(a, b, self.sync)?;
        self.report.swaps += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::compare::{ClassJobPriority, SortKey};
    use crate::gearset::GearsetEntry;

    fn sort_names(names: &[Option<&str>]) -> (Vec<Option<String>>, SortReport) {
        let mut entries: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(slot, name)| match name {
                Some(name) => GearsetEntry::new(slot as u8, name, 0, 0),
                None => GearsetEntry::empty(slot as u8),
            })
            .collect();
        let mut current = 0xFF;
        let mut table = GearsetTable::new(&mut entries);
        let mut sync = ReferenceSync::without_hotbars(&mut current);
        let priority = ClassJobPriority::default();
        let order = SortOrder::new(SortKey::Name, false, SortKey::ItemLevel, false);
        let mut partitioner =
            Partitioner::new(&mut table, &mut sync, Comparator::new(&priority), order);
        partitioner.sort(0, names.len() - 1).unwrap();
        let report = partitioner.report();
        let sorted = table
            .iter()
            .map(|gearset| gearset.exists().then(|| gearset.display_name().into_owned()))
            .collect();
        (sorted, report)
    }

    #[test]
    fn deleted_slots_move_to_the_tail() {
        let (sorted, _) = sort_names(&[None, Some("b"), None, Some("a"), None, Some("c")]);
        assert_eq!(
            sorted,
            vec![
                Some("a".to_owned()),
                Some("b".to_owned()),
                Some("c".to_owned()),
                None,
                None,
                None
            ]
        );
    }

    #[test]
    fn sorted_input_needs_no_swaps() {
        let (_, report) = sort_names(&[Some("a"), Some("b"), Some("c"), None, None]);
        assert_eq!(report.swaps, 0);
    }

    #[test]
    fn single_slot_is_a_no_op() {
        let (sorted, report) = sort_names(&[Some("only")]);
        assert_eq!(sorted, vec![Some("only".to_owned())]);
        assert_eq!(report, SortReport::default());
    }
}
