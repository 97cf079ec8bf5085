//! Raw image of the host tables a sort touches

use anyhow::{bail, Context};
use bytemuck::{Pod, Zeroable};
use gearsort::{
    GearsetEntry, GearsetId, GearsetTable, LiveHotbarMemory, Persistence, SavedHotbarMemory,
    SortSession, TableHandle, GEARSET_CAPACITY,
};
use std::fs;
use std::path::Path;

/// Host memory as stored on disk, in host layout
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct HostImage {
    /// Gearset records
    pub gearsets: [GearsetEntry; GEARSET_CAPACITY],
    /// Identity of the equipped gearset
    pub current: u8,
    /// Keeps the hotbar tables 4-byte aligned
    pub _pad: [u8; 3],
    /// Saved per class/job hotbars
    pub saved: SavedHotbarMemory,
    /// Currently loaded hotbars
    pub live: LiveHotbarMemory,
}

impl HostImage {
    /// An image with every slot unused and nothing equipped.
    pub fn empty() -> Box<Self> {
        let mut image: Box<Self> = bytemuck::zeroed_box();
        for (slot, entry) in image.gearsets.iter_mut().enumerate() {
            *entry = GearsetEntry::empty(slot as u8);
        }
        image.current = GearsetId::NONE.value();
        image
    }

    /// Read an image written by [`Self::save`].
    pub fn load(path: &Path) -> anyhow::Result<Box<Self>> {
        let bytes =
            fs::read(path).with_context(|| format!("reading host image {}", path.display()))?;
        let expected = std::mem::size_of::<Self>();
        if bytes.len() != expected {
            bail!(
                "{} is {} bytes, a host image is {} bytes",
                path.display(),
                bytes.len(),
                expected
            );
        }
        let mut image: Box<Self> = bytemuck::zeroed_box();
        bytemuck::bytes_of_mut(&mut *image).copy_from_slice(&bytes);
        Ok(image)
    }

    /// Write the image back to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        fs::write(path, bytemuck::bytes_of(self))
            .with_context(|| format!("writing host image {}", path.display()))
    }

    /// Bind every table in the image to a sort session.
    pub fn session<'a>(
        &'a mut self,
        gateway: &'a mut dyn Persistence,
    ) -> gearsort::Result<SortSession<'a>> {
        SortSession::builder()
            .gearsets(GearsetTable::new(&mut self.gearsets))
            .current_gearset(&mut self.current)
            .saved_hotbars(&mut self.saved)
            .live_hotbars(&mut self.live)
            .gateway(gateway)
            .build()
    }

    /// First slot that has never held a gearset or was deleted.
    pub fn free_slot(&self) -> Option<usize> {
        self.gearsets.iter().position(|entry| !entry.exists())
    }
}

/// Gateway that remembers which tables the library asked to flush
///
/// The image is borrowed by the session while the sort runs, so the write
/// happens once the session is dropped.
#[derive(Debug, Default)]
pub struct FlushRecorder {
    /// Gearset table flush requested
    pub gearsets: bool,
    /// Saved hotbar flush requested
    pub hotbars: bool,
}

impl FlushRecorder {
    /// Whether anything needs writing.
    pub fn any(&self) -> bool {
        self.gearsets || self.hotbars
    }
}

impl Persistence for FlushRecorder {
    fn flush(&mut self, table: TableHandle, force: bool) -> gearsort::Result<()> {
        tracing::debug!(%table, force, "flush requested");
        match table {
            TableHandle::Gearsets => self.gearsets = true,
            TableHandle::Hotbars => self.hotbars = true,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gearsort::{ClassJob, GearsetSorter, HotbarSlot, SortConfig};

    #[test]
    fn image_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.bin");
        let mut image = HostImage::empty();
        image.gearsets[3] = GearsetEntry::new(3, "Tank", ClassJob::PLD.value(), 610);
        image.saved[2][0][4] = HotbarSlot::gearset(GearsetId(3));
        image.save(&path).unwrap();

        let loaded = HostImage::load(&path).unwrap();
        assert_eq!(loaded.gearsets, image.gearsets);
        assert_eq!(loaded.current, GearsetId::NONE.value());
        assert_eq!(loaded.saved[2][0][4].gearset_id(), Some(GearsetId(3)));
        assert_eq!(loaded.free_slot(), Some(0));
    }

    #[test]
    fn truncated_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.bin");
        fs::write(&path, [0u8; 16]).unwrap();
        assert!(HostImage::load(&path).is_err());
    }

    #[test]
    fn sorting_an_image_requests_both_flushes() {
        let mut image = HostImage::empty();
        image.gearsets[0] = GearsetEntry::new(0, "b", ClassJob::WHM.value(), 0);
        image.gearsets[1] = GearsetEntry::new(1, "a", ClassJob::WHM.value(), 0);
        image.live[0][0] = HotbarSlot::gearset(GearsetId(1));
        image.current = 1;

        let mut flushes = FlushRecorder::default();
        let sorter = GearsetSorter::new(SortConfig::default()).unwrap();
        let report = {
            let mut session = image.session(&mut flushes).unwrap();
            sorter.sort(&mut session).unwrap()
        };
        assert_eq!(report.swaps, 1);
        assert!(flushes.gearsets && flushes.hotbars);
        assert_eq!(image.current, 0);
        assert_eq!(image.live[0][0].gearset_id(), Some(GearsetId(0)));
    }
}
