//! Typed view over the host's gearset records
//!
//! The host owns a fixed array of [`GearsetEntry`] records. We never
//! allocate or free that memory; a [`GearsetTable`] only borrows it
//! mutably for the length of one sort session, which gives us exclusive
//! access enforced at compile time.
//!
//! Every record carries an identity byte that the rest of the host uses to
//! refer to it. That identity is anchored to the slot: slot `i` always
//! exposes identity `i`. Swapping two slots moves the record *content*
//! (name, class/job, item level, flags) and leaves each identity where it
//! was, so anything that referred to the moved content has to be retargeted
//! through [`ReferenceSync`] before the content moves.

use crate::sync::{ReferenceSync, Retargeted};
use crate::{Error, Result};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use std::fmt;

/// Number of gearset slots the host reserves
pub const GEARSET_CAPACITY: usize = 100;

/// Size of the fixed name buffer in each gearset record
pub const GEARSET_NAME_SIZE: usize = 0x2F;

/// Identity value the host uses to refer to one gearset slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GearsetId(pub u8);

impl GearsetId {
    /// Marker stored in the active gearset cell when nothing is equipped.
    pub const NONE: GearsetId = GearsetId(0xFF);

    /// The identity anchored to a slot index, if the index can carry one.
    pub fn from_slot(slot: usize) -> Option<Self> {
        match u8::try_from(slot) {
            Ok(value) if value != Self::NONE.0 => Some(Self(value)),
            _ => None,
        }
    }

    /// Raw identity byte.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Slot index this identity is anchored to.
    pub fn slot(self) -> usize {
        self.0.into()
    }
}

impl fmt::Display for GearsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            f.write_str("none")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

bitflags! {
    /// Flag bits stored alongside each gearset record
    ///
    /// Only [`GearsetFlags::EXISTS`] matters to sorting. Any other bits the
    /// host sets are retained and travel with the record content.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GearsetFlags: u8 {
        /// The slot holds a live, user-created gearset.
        const EXISTS = 1 << 0;
    }
}

/// One gearset record, laid out the way the host stores it
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct GearsetEntry {
    /// Slot identity, always equal to the slot index
    pub id: u8,
    /// UTF-8 display name, NUL padded but not necessarily NUL terminated
    pub name: [u8; GEARSET_NAME_SIZE],
    /// Class/job byte, see [`crate::ClassJob`]
    pub class_job: u8,
    /// Raw [`GearsetFlags`] bits
    pub flags: u8,
    /// Average item level of the gearset
    pub item_level: i16,
}

impl GearsetEntry {
    /// Build a live gearset record for a slot.
    ///
    /// Names longer than the host buffer are cut at the last character
    /// boundary that fits.
    pub fn new(slot: u8, name: &str, class_job: u8, item_level: i16) -> Self {
        let mut entry = Self::empty(slot);
        let mut end = name.len().min(GEARSET_NAME_SIZE);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        entry.name[..end].copy_from_slice(&name.as_bytes()[..end]);
        entry.class_job = class_job;
        entry.flags = GearsetFlags::EXISTS.bits();
        entry.item_level = item_level;
        entry
    }

    /// A never-used slot: zeroed content with only the identity set.
    pub fn empty(slot: u8) -> Self {
        Self {
            id: slot,
            ..Self::zeroed()
        }
    }

    /// Decoded flag bits, keeping bits we don't know about.
    pub fn flags(&self) -> GearsetFlags {
        GearsetFlags::from_bits_retain(self.flags)
    }

    /// Whether this slot holds a live gearset.
    pub fn exists(&self) -> bool {
        self.flags().contains(GearsetFlags::EXISTS)
    }

    /// Mark the slot deleted without wiping its content, as the host does.
    pub fn delete(&mut self) {
        self.flags = (self.flags() - GearsetFlags::EXISTS).bits();
    }
}

/// Read-only snapshot of one slot, as seen by the comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gearset {
    /// Identity of the slot the snapshot was taken from
    id: GearsetId,
    /// Raw name buffer
    name: [u8; GEARSET_NAME_SIZE],
    /// Raw class/job byte
    class_job: u8,
    /// Item level
    item_level: i16,
    /// Whether the slot is live
    exists: bool,
}

impl Gearset {
    /// Identity of the slot this snapshot came from.
    pub fn id(&self) -> GearsetId {
        self.id
    }

    /// The full fixed-size name buffer, including any NUL padding.
    pub fn name(&self) -> &[u8; GEARSET_NAME_SIZE] {
        &self.name
    }

    /// The name up to its first NUL, decoded lossily for display.
    pub fn display_name(&self) -> Cow<'_, str> {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(GEARSET_NAME_SIZE);
        String::from_utf8_lossy(&self.name[..end])
    }

    /// Raw class/job byte.
    pub fn class_job(&self) -> u8 {
        self.class_job
    }

    /// Item level.
    pub fn item_level(&self) -> i16 {
        self.item_level
    }

    /// Whether the slot is live.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Content equality, ignoring which slot the snapshot came from.
    pub fn same_content(&self, other: &Gearset) -> bool {
        self.name == other.name
            && self.class_job == other.class_job
            && self.item_level == other.item_level
            && self.exists == other.exists
    }
}

impl From<&GearsetEntry> for Gearset {
    fn from(entry: &GearsetEntry) -> Self {
        Self {
            id: GearsetId(entry.id),
            name: entry.name,
            class_job: entry.class_job,
            item_level: entry.item_level,
            exists: entry.exists(),
        }
    }
}

/// Mutable view over the host's array of gearset records
#[derive(Debug)]
pub struct GearsetTable<'a> {
    /// Host-owned records, borrowed for the session
    entries: &'a mut [GearsetEntry],
}

impl<'a> GearsetTable<'a> {
    /// Wrap a host-owned slice of records.
    pub fn new(entries: &'a mut [GearsetEntry]) -> Self {
        Self { entries }
    }

    /// Wrap a raw host buffer.
    ///
    /// Fails with [`Error::HostLayout`] if the buffer is misaligned or
    /// doesn't hold a whole number of records.
    pub fn from_bytes(bytes: &'a mut [u8]) -> Result<Self> {
        bytemuck::try_cast_slice_mut(bytes)
            .map(Self::new)
            .map_err(Error::HostLayout)
    }

    /// Number of slots the host reserves.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check a slot index against the table size.
    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot < self.count() {
            Ok(())
        } else {
            Err(Error::InvalidSlot {
                slot,
                count: self.count(),
            })
        }
    }

    /// Identity exposed by a slot.
    pub fn identity(&self, slot: usize) -> Result<GearsetId> {
        self.check_slot(slot)?;
        Ok(GearsetId(self.entries[slot].id))
    }

    /// Take a snapshot of one slot.
    pub fn read(&self, slot: usize) -> Result<Gearset> {
        self.check_slot(slot)?;
        Ok(Gearset::from(&self.entries[slot]))
    }

    /// Snapshots of every slot, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Gearset> + '_ {
        self.entries.iter().map(Gearset::from)
    }

    /// Number of live gearsets.
    pub fn existing_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.exists()).count()
    }

    /// Verify that every slot exposes its own position as identity.
    pub fn check_identities(&self) -> Result<()> {
        for (slot, entry) in self.entries.iter().enumerate() {
            if GearsetId::from_slot(slot) != Some(GearsetId(entry.id)) {
                return Err(Error::IdentityMismatch {
                    slot,
                    found: entry.id,
                });
            }
        }
        Ok(())
    }

    /// Exchange the content of two slots.
    ///
    /// References to either identity are retargeted through `sync` before
    /// any record bytes move. Both indices are checked first, so an invalid
    /// slot leaves the table and every reference untouched.
    pub fn swap(&mut self, a: usize, b: usize, sync: &mut ReferenceSync<'_>) -> Result<Retargeted> {
        let id_a = self.identity(a)?;
        let id_b = self.identity(b)?;
        if a == b {
            return Ok(Retargeted::default());
        }

        let retargeted = sync.retarget(id_a, id_b);

        self.entries.swap(a, b);
        self.entries[a].id = id_a.value();
        self.entries[b].id = id_b.value();
        Ok(retargeted)
    }
}
