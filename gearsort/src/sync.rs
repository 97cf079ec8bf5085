//! Keeping host references pointed at the right gearset content
//!
//! Sorting moves gearset content between slots while each slot keeps its
//! identity. Everything outside the gearset table that names a gearset by
//! identity therefore has to follow the content: when the content of slots
//! `a` and `b` is exchanged, every reference to `a` becomes a reference to
//! `b` and the other way around.
//!
//! [`ReferenceSync`] owns the borrows of every such reference for one
//! session. [`crate::GearsetTable::swap`] calls [`ReferenceSync::retarget`]
//! before it moves any record bytes, with nothing else running in between.

use crate::hotbar::HotbarTable;
use crate::GearsetId;
use std::ops::AddAssign;

/// Count of references rewritten by one or more retargets
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Retargeted {
    /// Number of times the active gearset cell was rewritten
    pub current: usize,
    /// Number of saved hotbar slots rewritten
    pub saved: usize,
    /// Number of live hotbar slots rewritten
    pub live: usize,
}

impl Retargeted {
    /// Total number of rewritten hotbar slots.
    pub fn hotbar_slots(&self) -> usize {
        self.saved + self.live
    }
}

impl AddAssign for Retargeted {
    fn add_assign(&mut self, rhs: Self) {
        self.current += rhs.current;
        self.saved += rhs.saved;
        self.live += rhs.live;
    }
}

/// Every host reference to a gearset identity, borrowed for one session
#[derive(Debug)]
pub struct ReferenceSync<'a> {
    /// The host's active gearset cell
    current: &'a mut u8,
    /// Saved per class/job hotbars, if bound
    saved: Option<HotbarTable<'a>>,
    /// Live hotbars, if bound
    live: Option<HotbarTable<'a>>,
}

impl<'a> ReferenceSync<'a> {
    /// Bind the active gearset cell and both hotbar tables.
    pub fn new(current: &'a mut u8, saved: HotbarTable<'a>, live: HotbarTable<'a>) -> Self {
        Self {
            current,
            saved: Some(saved),
            live: Some(live),
        }
    }

    /// Bind only the active gearset cell.
    ///
    /// Used when the host hasn't loaded its hotbars; hotbar slots referring
    /// to moved gearsets will then be stale.
    pub fn without_hotbars(current: &'a mut u8) -> Self {
        Self {
            current,
            saved: None,
            live: None,
        }
    }

    /// Build from optional parts, as collected by the session builder.
    pub(crate) fn from_parts(
        current: &'a mut u8,
        saved: Option<HotbarTable<'a>>,
        live: Option<HotbarTable<'a>>,
    ) -> Self {
        Self {
            current,
            saved,
            live,
        }
    }

    /// Identity currently held by the active gearset cell.
    pub fn current(&self) -> GearsetId {
        GearsetId(*self.current)
    }

    /// Whether the saved hotbars are bound and need persisting after a sort.
    pub fn has_saved_hotbars(&self) -> bool {
        self.saved.is_some()
    }

    /// Saved hotbar view, if bound.
    pub fn saved(&self) -> Option<&HotbarTable<'a>> {
        self.saved.as_ref()
    }

    /// Live hotbar view, if bound.
    pub fn live(&self) -> Option<&HotbarTable<'a>> {
        self.live.as_ref()
    }

    /// Exchange identities `a` and `b` in every bound reference.
    ///
    /// The active cell is handled first, then the saved hotbars, then the
    /// live hotbars. A reference naming neither identity is left alone.
    pub fn retarget(&mut self, a: GearsetId, b: GearsetId) -> Retargeted {
        let mut retargeted = Retargeted::default();

        let current = GearsetId(*self.current);
        if current == a {
            *self.current = b.value();
            retargeted.current = 1;
        } else if current == b {
            *self.current = a.value();
            retargeted.current = 1;
        }

        if let Some(saved) = self.saved.as_mut() {
            retargeted.saved = saved.retarget(a, b);
        }
        if let Some(live) = self.live.as_mut() {
            retargeted.live = live.retarget(a, b);
        }

        if retargeted != Retargeted::default() {
            tracing::trace!(
                %a,
                %b,
                current = retargeted.current,
                saved = retargeted.saved,
                live = retargeted.live,
                "retargeted gearset references"
            );
        }
        retargeted
    }
}
