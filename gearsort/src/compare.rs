//! Ordering decisions between two gearsets
//!
//! Three keys are supported. [`SortKey::Name`] compares the raw name
//! buffers byte by byte, which for UTF-8 is code point order and not
//! locale aware. [`SortKey::ItemLevel`] is a plain signed comparison.
//! [`SortKey::ClassJob`] compares each gearset's position within a user
//! configured priority list, held in a [`ClassJobPriority`].
//!
//! A sort always uses two keys: ties on the primary key are broken by the
//! secondary key, and each key can be reversed independently. Records that
//! tie on both are left in whatever order the partitioning produces.

use crate::{ClassJob, Error, Gearset, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, EnumString};

/// A property gearsets can be sorted by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[non_exhaustive]
pub enum SortKey {
    /// Alphabetical, by raw name bytes
    #[strum(serialize = "Name")]
    Name,
    /// By position in the class/job priority order
    #[strum(to_string = "Class/Job", serialize = "ClassJob", serialize = "job")]
    ClassJob,
    /// By average item level
    #[strum(to_string = "Item Level", serialize = "ItemLevel", serialize = "ilvl")]
    ItemLevel,
}

impl SortKey {
    /// The key used as secondary when this one becomes primary and the
    /// two would otherwise collide.
    pub fn fallback(self) -> SortKey {
        match self {
            SortKey::Name => SortKey::ClassJob,
            SortKey::ClassJob => SortKey::ItemLevel,
            SortKey::ItemLevel => SortKey::Name,
        }
    }
}

/// One sort key along with its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyOrder {
    /// Property to compare
    pub key: SortKey,
    /// Sort greatest first instead of least first
    pub reversed: bool,
}

impl KeyOrder {
    /// Ascending order on `key`.
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            reversed: false,
        }
    }

    /// Descending order on `key`.
    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            reversed: true,
        }
    }
}

/// Primary key plus the tie-break key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOrder {
    /// Decides the order unless two gearsets compare equal
    pub primary: KeyOrder,
    /// Breaks ties on the primary key
    pub secondary: KeyOrder,
}

impl SortOrder {
    /// Combine a primary and secondary key with their directions.
    pub fn new(
        primary: SortKey,
        primary_reversed: bool,
        secondary: SortKey,
        secondary_reversed: bool,
    ) -> Self {
        Self {
            primary: KeyOrder {
                key: primary,
                reversed: primary_reversed,
            },
            secondary: KeyOrder {
                key: secondary,
                reversed: secondary_reversed,
            },
        }
    }
}

/// Rank of every class/job byte within a configured priority order
///
/// Built once per session so each comparison is a table lookup.
#[derive(Debug, Clone)]
pub struct ClassJobPriority {
    /// Rank indexed by class/job byte, `None` when not listed
    ranks: [Option<u8>; 256],
    /// Number of listed class/jobs
    listed: usize,
}

impl ClassJobPriority {
    /// Build the rank table from a priority list.
    ///
    /// If a class/job appears more than once, its first position wins.
    pub fn new(order: &[ClassJob]) -> Self {
        let mut ranks = [None; 256];
        let mut listed = 0;
        for &class_job in order {
            let slot = &mut ranks[usize::from(class_job.value())];
            if slot.is_none() {
                // Fewer than 256 distinct values exist, so this can't wrap.
                *slot = Some(listed as u8);
                listed += 1;
            }
        }
        Self { ranks, listed }
    }

    /// Position of a class/job byte in the priority list.
    pub fn rank(&self, class_job: u8) -> Option<usize> {
        self.ranks[usize::from(class_job)].map(usize::from)
    }

    /// Number of distinct class/jobs listed.
    pub fn len(&self) -> usize {
        self.listed
    }

    /// Whether nothing is listed at all.
    pub fn is_empty(&self) -> bool {
        self.listed == 0
    }
}

impl Default for ClassJobPriority {
    fn default() -> Self {
        Self::new(&ClassJob::DEFAULT_ORDER)
    }
}

/// Compares gearset snapshots according to one [`ClassJobPriority`]
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'p> {
    /// Class/job ranks
    priority: &'p ClassJobPriority,
    /// Fail on unlisted class/jobs instead of sorting them last
    strict: bool,
}

impl<'p> Comparator<'p> {
    /// A comparator that sorts unlisted class/jobs after every listed one.
    pub fn new(priority: &'p ClassJobPriority) -> Self {
        Self {
            priority,
            strict: false,
        }
    }

    /// A comparator that fails with [`Error::UnresolvedClassJob`] on
    /// unlisted class/jobs.
    pub fn strict(priority: &'p ClassJobPriority) -> Self {
        Self {
            priority,
            strict: true,
        }
    }

    /// Sort position of a class/job byte.
    ///
    /// Unlisted values rank after every listed one and among themselves by
    /// raw value, unless strict resolution is on.
    fn class_job_rank(&self, class_job: u8) -> Result<(usize, u8)> {
        match self.priority.rank(class_job) {
            Some(rank) => Ok((rank, class_job)),
            None if self.strict => Err(Error::UnresolvedClassJob(class_job)),
            None => Ok((self.priority.len(), class_job)),
        }
    }

    /// Compare two gearsets on a single key, ascending.
    pub fn compare(&self, a: &Gearset, b: &Gearset, key: SortKey) -> Result<Ordering> {
        Ok(match key {
            SortKey::Name => a.name().cmp(b.name()),
            SortKey::ClassJob => {
                let rank_a = self.class_job_rank(a.class_job())?;
                let rank_b = self.class_job_rank(b.class_job())?;
                rank_a.cmp(&rank_b)
            }
            SortKey::ItemLevel => a.item_level().cmp(&b.item_level()),
        })
    }

    /// Whether `a` belongs strictly before `b` on a single key.
    ///
    /// Equal gearsets never order before each other, whichever direction
    /// is requested.
    pub fn should_order_before(
        &self,
        a: &Gearset,
        b: &Gearset,
        key: SortKey,
        reversed: bool,
    ) -> Result<bool> {
        Ok(match self.compare(a, b, key)? {
            Ordering::Less => !reversed,
            Ordering::Greater => reversed,
            Ordering::Equal => false,
        })
    }

    /// Whether `a` belongs strictly before `b`, breaking primary key ties
    /// with the secondary key.
    pub fn orders_before(&self, a: &Gearset, b: &Gearset, order: &SortOrder) -> Result<bool> {
        let primary = order.primary;
        if self.compare(a, b, primary.key)? != Ordering::Equal {
            return self.should_order_before(a, b, primary.key, primary.reversed);
        }
        let secondary = order.secondary;
        self.should_order_before(a, b, secondary.key, secondary.reversed)
    }
}
