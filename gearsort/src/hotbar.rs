//! Hotbar tables that refer to gearsets by identity
//!
//! The host keeps two copies of every hotbar. The saved copy holds one set of
//! bars per class/job and is what gets written to disk. The live copy is the
//! set of bars the player is currently using, rebuilt from the saved copy on
//! job change and never persisted itself. Any slot in either copy may hold a
//! "switch to gearset N" command, which names the gearset by its identity.
//!
//! Both copies are plain nested arrays of [`HotbarSlot`], so a
//! [`HotbarTable`] flattens them into one slice and treats them the same way.

use crate::GearsetId;
use bytemuck::{Pod, Zeroable};
use strum::Display;

/// Number of class/job hotbar sets in the saved table
pub const SAVED_HOTBAR_CLASS_JOBS: usize = 60;

/// Number of bars per set: 10 hotbars and 8 cross hotbars
pub const HOTBAR_BARS: usize = 18;

/// Number of slots per bar; plain hotbars only use the first 12
pub const HOTBAR_SLOTS: usize = 16;

/// Command type byte stored in a hotbar slot
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct HotbarCommandKind(pub u8);

impl HotbarCommandKind {
    /// Unused slot.
    pub const EMPTY: HotbarCommandKind = HotbarCommandKind(0x00);
    /// Combat or crafting action.
    pub const ACTION: HotbarCommandKind = HotbarCommandKind(0x01);
    /// Inventory item.
    pub const ITEM: HotbarCommandKind = HotbarCommandKind(0x02);
    /// User macro.
    pub const MACRO: HotbarCommandKind = HotbarCommandKind(0x07);
    /// Equip a gearset; the command id is the gearset identity.
    pub const GEARSET: HotbarCommandKind = HotbarCommandKind(0x0F);
}

/// One hotbar slot
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct HotbarSlot {
    /// Command parameter; a gearset identity for [`HotbarCommandKind::GEARSET`]
    pub command_id: u32,
    /// What kind of command this slot runs
    pub command_type: HotbarCommandKind,
    /// Host bytes we carry along untouched
    pub reserved: [u8; 3],
}

impl HotbarSlot {
    /// A slot that equips the given gearset.
    pub fn gearset(id: GearsetId) -> Self {
        Self::new(HotbarCommandKind::GEARSET, id.value().into())
    }

    /// A slot running any other command.
    pub fn new(command_type: HotbarCommandKind, command_id: u32) -> Self {
        Self {
            command_id,
            command_type,
            reserved: [0; 3],
        }
    }

    /// The gearset this slot equips, if it's a gearset slot.
    pub fn gearset_id(&self) -> Option<GearsetId> {
        if self.command_type != HotbarCommandKind::GEARSET {
            return None;
        }
        u8::try_from(self.command_id).ok().map(GearsetId)
    }
}

/// Slots of a single bar
pub type HotbarBar = [HotbarSlot; HOTBAR_SLOTS];

/// Backing memory for the live hotbars
pub type LiveHotbarMemory = [HotbarBar; HOTBAR_BARS];

/// Backing memory for the saved hotbars, one [`LiveHotbarMemory`]-shaped
/// set per class/job
pub type SavedHotbarMemory = [LiveHotbarMemory; SAVED_HOTBAR_CLASS_JOBS];

/// Which of the host's hotbar copies a [`HotbarTable`] views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum HotbarTableKind {
    /// Per class/job bars written to disk
    Saved,
    /// Currently loaded bars
    Live,
}

/// Flattened mutable view over one of the host's hotbar copies
#[derive(Debug)]
pub struct HotbarTable<'a> {
    /// Which copy this is
    kind: HotbarTableKind,
    /// Every slot of every bar, in host order
    slots: &'a mut [HotbarSlot],
}

impl<'a> HotbarTable<'a> {
    /// View the saved per class/job hotbars.
    pub fn saved(mem: &'a mut SavedHotbarMemory) -> Self {
        Self {
            kind: HotbarTableKind::Saved,
            slots: mem.as_flattened_mut().as_flattened_mut(),
        }
    }

    /// View the live hotbars.
    pub fn live(mem: &'a mut LiveHotbarMemory) -> Self {
        Self {
            kind: HotbarTableKind::Live,
            slots: mem.as_flattened_mut(),
        }
    }

    /// Which copy this table views.
    pub fn kind(&self) -> HotbarTableKind {
        self.kind
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot positions and gearset identities of every gearset slot.
    pub fn gearset_refs(&self) -> impl Iterator<Item = (usize, GearsetId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.gearset_id().map(|id| (index, id)))
    }

    /// Exchange identities `a` and `b` in every gearset slot.
    ///
    /// Slots naming `a` are rewritten to `b` and slots naming `b` to `a`.
    /// Other command kinds are left alone. Returns how many slots changed.
    pub fn retarget(&mut self, a: GearsetId, b: GearsetId) -> usize {
        let mut rewritten = 0;
        for slot in self.slots.iter_mut() {
            let target = match slot.gearset_id() {
                Some(id) if id == a => b,
                Some(id) if id == b => a,
                _ => continue,
            };
            slot.command_id = target.value().into();
            rewritten += 1;
        }
        rewritten
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn retarget_swaps_both_directions() {
        let mut mem: Box<LiveHotbarMemory> = bytemuck::zeroed_box();
        mem[0][0] = HotbarSlot::gearset(GearsetId(5));
        mem[3][7] = HotbarSlot::gearset(GearsetId(12));
        mem[17][15] = HotbarSlot::gearset(GearsetId(9));

        let mut table = HotbarTable::live(&mut mem);
        assert_eq!(table.retarget(GearsetId(5), GearsetId(12)), 2);
        drop(table);

        assert_eq!(mem[0][0].gearset_id(), Some(GearsetId(12)));
        assert_eq!(mem[3][7].gearset_id(), Some(GearsetId(5)));
        assert_eq!(mem[17][15].gearset_id(), Some(GearsetId(9)));
    }

    #[test]
    fn other_command_kinds_are_untouched() {
        let mut mem: Box<LiveHotbarMemory> = bytemuck::zeroed_box();
        mem[1][1] = HotbarSlot::new(HotbarCommandKind::MACRO, 5);
        mem[1][2] = HotbarSlot::new(HotbarCommandKind::ACTION, 12);

        let mut table = HotbarTable::live(&mut mem);
        assert_eq!(table.retarget(GearsetId(5), GearsetId(12)), 0);
        assert_eq!(table.gearset_refs().count(), 0);
        drop(table);

        assert_eq!(mem[1][1].command_id, 5);
        assert_eq!(mem[1][2].command_id, 12);
    }

    #[test]
    fn saved_table_covers_every_class_job() {
        let mut mem: Box<SavedHotbarMemory> = bytemuck::zeroed_box();
        mem[59][17][15] = HotbarSlot::gearset(GearsetId(3));
        let table = HotbarTable::saved(&mut mem);
        assert_eq!(
            table.len(),
            SAVED_HOTBAR_CLASS_JOBS * HOTBAR_BARS * HOTBAR_SLOTS
        );
        assert_eq!(
            table.gearset_refs().collect::<Vec<_>>(),
            vec![(table.len() - 1, GearsetId(3))]
        );
    }
}
