//! Invariants that must hold for any table contents and sort settings

use gearsort::{
    ClassJob, ClassJobPriority, Comparator, Error, Gearset, GearsetEntry, GearsetSorter,
    GearsetTable, HotbarCommandKind, HotbarSlot, LiveHotbarMemory, SavedHotbarMemory, SortConfig,
    SortKey, SortReport, SortSession, TableHandle, HOTBAR_BARS, HOTBAR_SLOTS,
    SAVED_HOTBAR_CLASS_JOBS,
};
use proptest::prelude::*;

/// One generated slot: `None` for a never-used slot, otherwise name,
/// class/job, item level and whether it was deleted.
type SlotSpec = Option<(String, u8, i16, bool)>;

/// A gearset reference placed in a hotbar: saved or live, flat slot index,
/// referenced slot.
type RefSpec = (bool, usize, usize);

struct Host {
    gearsets: Vec<GearsetEntry>,
    current: u8,
    saved: Box<SavedHotbarMemory>,
    live: Box<LiveHotbarMemory>,
}

impl Host {
    fn build(slots: &[SlotSpec], refs: &[RefSpec], current: usize) -> Self {
        let gearsets = slots
            .iter()
            .enumerate()
            .map(|(slot, spec)| match spec {
                Some((name, class_job, item_level, deleted)) => {
                    let mut entry = GearsetEntry::new(slot as u8, name, *class_job, *item_level);
                    if *deleted {
                        entry.delete();
                    }
                    entry
                }
                None => GearsetEntry::empty(slot as u8),
            })
            .collect();
        let mut host = Self {
            gearsets,
            current: (current % slots.len()) as u8,
            saved: bytemuck::zeroed_box(),
            live: bytemuck::zeroed_box(),
        };
        for &(saved, index, target) in refs {
            let slot = HotbarSlot::gearset(gearsort::GearsetId((target % slots.len()) as u8));
            if saved {
                host.saved.as_flattened_mut().as_flattened_mut()[index] = slot;
            } else {
                host.live.as_flattened_mut()[index % (HOTBAR_BARS * HOTBAR_SLOTS)] = slot;
            }
        }
        // A macro slot whose parameter happens to look like a gearset id.
        host.live[HOTBAR_BARS - 1][HOTBAR_SLOTS - 1] = HotbarSlot::new(HotbarCommandKind::MACRO, 0);
        host
    }

    fn sort(&mut self, config: &SortConfig) -> Result<SortReport, Error> {
        let sorter = GearsetSorter::new(config.clone())?;
        let mut gateway = |_: TableHandle, _: bool| -> Result<(), Error> { Ok(()) };
        let mut session = SortSession::builder()
            .gearsets(GearsetTable::new(&mut self.gearsets))
            .current_gearset(&mut self.current)
            .saved_hotbars(&mut self.saved)
            .live_hotbars(&mut self.live)
            .gateway(&mut gateway)
            .build()?;
        sorter.sort(&mut session)
    }

    fn snapshot(&self, slot: usize) -> Gearset {
        Gearset::from(&self.gearsets[slot])
    }

    /// Content named by every gearset reference, in a fixed order.
    fn referenced_content(&self) -> Vec<Gearset> {
        let saved = self.saved.as_flattened().as_flattened();
        let live = self.live.as_flattened();
        std::iter::once(usize::from(self.current))
            .chain(saved.iter().chain(live).filter_map(|slot| slot.gearset_id()).map(|id| id.slot()))
            .map(|slot| self.snapshot(slot))
            .collect()
    }

    /// Sorted content of every slot, ignoring position.
    fn content_multiset(&self) -> Vec<(Vec<u8>, u8, i16, u8)> {
        let mut content: Vec<_> = self
            .gearsets
            .iter()
            .map(|entry| (entry.name.to_vec(), entry.class_job, entry.item_level, entry.flags))
            .collect();
        content.sort();
        content
    }
}

fn slot_spec() -> impl Strategy<Value = SlotSpec> {
    let class_job = prop_oneof![
        Just(ClassJob::WHM.value()),
        Just(ClassJob::SCH.value()),
        Just(ClassJob::PLD.value()),
        Just(ClassJob::FSH.value()),
        Just(0xEE),
    ];
    proptest::option::weighted(
        0.7,
        ("[ABab]{0,3}", class_job, -3i16..3, proptest::bool::weighted(0.2)),
    )
}

fn ref_spec() -> impl Strategy<Value = RefSpec> {
    (
        any::<bool>(),
        0..SAVED_HOTBAR_CLASS_JOBS * HOTBAR_BARS * HOTBAR_SLOTS,
        0..100usize,
    )
}

fn sort_config() -> impl Strategy<Value = SortConfig> {
    let key = prop_oneof![
        Just(SortKey::Name),
        Just(SortKey::ClassJob),
        Just(SortKey::ItemLevel)
    ];
    (key, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(primary, secondary_name, sort_name_reverse, sort_item_level_reverse)| {
            let mut config = SortConfig {
                sort_name_reverse,
                sort_item_level_reverse,
                ..SortConfig::default()
            };
            config.set_primary(primary);
            if secondary_name && primary != SortKey::Name {
                config.secondary = SortKey::Name;
            }
            config
        },
    )
}

proptest! {
    #[test]
    fn sort_keeps_every_invariant(
        slots in proptest::collection::vec(slot_spec(), 1..=100),
        refs in proptest::collection::vec(ref_spec(), 0..24),
        current in 0..100usize,
        config in sort_config(),
    ) {
        let mut host = Host::build(&slots, &refs, current);
        let content_before = host.content_multiset();
        let referenced_before = host.referenced_content();

        host.sort(&config).unwrap();

        // Identity stays anchored to position.
        for (slot, entry) in host.gearsets.iter().enumerate() {
            prop_assert_eq!(usize::from(entry.id), slot);
        }

        // Live gearsets form a prefix.
        let live = host.gearsets.iter().take_while(|entry| entry.exists()).count();
        prop_assert!(host.gearsets[live..].iter().all(|entry| !entry.exists()));

        // Only positions changed.
        prop_assert_eq!(host.content_multiset(), content_before);

        // Every reference still names the same content.
        let referenced_after = host.referenced_content();
        prop_assert_eq!(referenced_after.len(), referenced_before.len());
        for (after, before) in referenced_after.iter().zip(&referenced_before) {
            prop_assert!(after.same_content(before));
        }
        let untouched = host.live[HOTBAR_BARS - 1][HOTBAR_SLOTS - 1];
        prop_assert_eq!(untouched.command_type, HotbarCommandKind::MACRO);
        prop_assert_eq!(untouched.command_id, 0);

        // No live gearset orders strictly before the one in front of it.
        let priority = ClassJobPriority::new(&config.class_job_sort_order);
        let comparator = Comparator::new(&priority);
        let order = config.sort_order();
        for slot in 1..live {
            let (a, b) = (host.snapshot(slot - 1), host.snapshot(slot));
            prop_assert!(!comparator.orders_before(&b, &a, &order).unwrap());
        }

        // A second sort finds nothing to do.
        let settled = host.gearsets.clone();
        let report = host.sort(&config).unwrap();
        prop_assert_eq!(report.swaps, 0);
        prop_assert_eq!(&host.gearsets, &settled);
    }

    #[test]
    fn primary_key_order_is_respected(
        slots in proptest::collection::vec(slot_spec(), 2..=40),
        config in sort_config(),
    ) {
        let mut host = Host::build(&slots, &[], 0);
        host.sort(&config).unwrap();

        let priority = ClassJobPriority::new(&config.class_job_sort_order);
        let comparator = Comparator::new(&priority);
        let order = config.sort_order();
        let live = host.gearsets.iter().take_while(|entry| entry.exists()).count();
        for slot in 1..live {
            let (a, b) = (host.snapshot(slot - 1), host.snapshot(slot));
            let before = comparator
                .should_order_before(&a, &b, order.primary.key, order.primary.reversed)
                .unwrap();
            let tied = comparator.compare(&a, &b, order.primary.key).unwrap()
                == std::cmp::Ordering::Equal;
            let secondary_inverted = comparator
                .should_order_before(&b, &a, order.secondary.key, order.secondary.reversed)
                .unwrap();
            prop_assert!(before || (tied && !secondary_inverted));
        }
    }
}
