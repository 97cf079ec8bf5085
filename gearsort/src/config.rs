//! User sort settings
//!
//! Stored as JSON with the same PascalCase field names the settings window
//! has always written, so existing configuration files keep loading.

use crate::compare::{KeyOrder, SortKey, SortOrder};
use crate::{ClassJob, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Current configuration format version
pub const CONFIG_VERSION: u32 = 1;

/// Direction to move a class/job within the priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the front, higher priority
    Up,
    /// Towards the back, lower priority
    Down,
}

/// Sort keys, directions and the class/job priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SortConfig {
    /// Format version
    pub version: u32,
    /// Key compared first
    #[serde(rename = "PrimarySort")]
    pub primary: SortKey,
    /// Key compared when the primary key ties
    #[serde(rename = "SecondarySort")]
    pub secondary: SortKey,
    /// Sort names from Z to A
    pub sort_name_reverse: bool,
    /// Sort item levels from greatest to least
    pub sort_item_level_reverse: bool,
    /// Class/job priority, highest first
    pub class_job_sort_order: Vec<ClassJob>,
    /// Fail instead of sorting unlisted class/jobs last
    pub strict_class_jobs: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            primary: SortKey::Name,
            secondary: SortKey::ClassJob,
            sort_name_reverse: false,
            sort_item_level_reverse: false,
            class_job_sort_order: ClassJob::DEFAULT_ORDER.to_vec(),
            strict_class_jobs: false,
        }
    }
}

impl SortConfig {
    /// Load a configuration file, falling back to defaults if it doesn't
    /// exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no sort configuration, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Reject configurations the sort can't use.
    pub fn validate(&self) -> Result<()> {
        if self.primary == self.secondary {
            return Err(Error::InvalidConfig(format!(
                "primary and secondary sort are both {}",
                self.primary
            )));
        }
        let mut seen = HashSet::new();
        for class_job in &self.class_job_sort_order {
            if !seen.insert(class_job) {
                return Err(Error::InvalidConfig(format!(
                    "{class_job} is listed more than once in the class/job sort order"
                )));
            }
        }
        Ok(())
    }

    /// Change the primary key.
    ///
    /// If the secondary key was the same, it moves on to the next key so
    /// the two never collide.
    pub fn set_primary(&mut self, key: SortKey) {
        self.primary = key;
        if self.secondary == key {
            self.secondary = key.fallback();
        }
    }

    /// Change the secondary key; it can't equal the primary key.
    pub fn set_secondary(&mut self, key: SortKey) -> Result<()> {
        if key == self.primary {
            return Err(Error::InvalidConfig(format!(
                "{key} is already the primary sort"
            )));
        }
        self.secondary = key;
        Ok(())
    }

    /// Whether `key` should be sorted greatest first.
    pub fn is_reversed(&self, key: SortKey) -> bool {
        match key {
            SortKey::Name => self.sort_name_reverse,
            SortKey::ItemLevel => self.sort_item_level_reverse,
            SortKey::ClassJob => false,
        }
    }

    /// Swap the class/job at `index` with its neighbour.
    ///
    /// Returns `false` and changes nothing if there is no neighbour in that
    /// direction.
    pub fn move_class_job(&mut self, index: usize, direction: Direction) -> bool {
        let next = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        let len = self.class_job_sort_order.len();
        match next {
            Some(next) if index < len && next < len => {
                self.class_job_sort_order.swap(index, next);
                true
            }
            _ => false,
        }
    }

    /// `key` with its configured direction.
    fn key_order(&self, key: SortKey) -> KeyOrder {
        if self.is_reversed(key) {
            KeyOrder::descending(key)
        } else {
            KeyOrder::ascending(key)
        }
    }

    /// Keys and directions for a sort.
    pub fn sort_order(&self) -> SortOrder {
        SortOrder {
            primary: self.key_order(self.primary),
            secondary: self.key_order(self.secondary),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_the_settings_window() {
        let config = SortConfig::default();
        assert_eq!(config.primary, SortKey::Name);
        assert_eq!(config.secondary, SortKey::ClassJob);
        assert_eq!(config.class_job_sort_order.first(), Some(&ClassJob::PLD));
        assert_eq!(config.class_job_sort_order.last(), Some(&ClassJob::FSH));
        config.validate().unwrap();
    }

    #[test]
    fn primary_bumps_colliding_secondary() {
        let mut config = SortConfig::default();
        config.set_primary(SortKey::ClassJob);
        assert_eq!(config.secondary, SortKey::ItemLevel);
        config.set_primary(SortKey::ItemLevel);
        assert_eq!(config.secondary, SortKey::Name);
        config.set_primary(SortKey::Name);
        assert_eq!(config.secondary, SortKey::ClassJob);
        assert!(config.set_secondary(SortKey::Name).is_err());
        config.set_secondary(SortKey::ItemLevel).unwrap();
        assert_eq!(config.secondary, SortKey::ItemLevel);
    }

    #[test]
    fn move_class_job_stays_in_bounds() {
        let mut config = SortConfig::default();
        assert!(!config.move_class_job(0, Direction::Up));
        let last = config.class_job_sort_order.len() - 1;
        assert!(!config.move_class_job(last, Direction::Down));
        assert!(config.move_class_job(0, Direction::Down));
        assert_eq!(&config.class_job_sort_order[..2], &[ClassJob::WAR, ClassJob::PLD]);
    }

    #[test]
    fn class_job_is_never_reversed() {
        let config = SortConfig {
            primary: SortKey::ItemLevel,
            secondary: SortKey::ClassJob,
            sort_item_level_reverse: true,
            sort_name_reverse: true,
            ..SortConfig::default()
        };
        let order = config.sort_order();
        assert_eq!(order.primary, KeyOrder::descending(SortKey::ItemLevel));
        assert_eq!(order.secondary, KeyOrder::ascending(SortKey::ClassJob));
    }

    #[test]
    fn reads_plugin_style_json() {
        let config: SortConfig = serde_json::from_str(
            r#"{
                "Version": 1,
                "PrimarySort": "ItemLevel",
                "SecondarySort": "Name",
                "SortItemLevelReverse": true,
                "ClassJobSortOrder": [24, 28]
            }"#,
        )
        .unwrap();
        assert_eq!(config.primary, SortKey::ItemLevel);
        assert!(config.sort_item_level_reverse);
        assert!(!config.sort_name_reverse);
        assert_eq!(config.class_job_sort_order, vec![ClassJob::WHM, ClassJob::SCH]);
    }

    #[test]
    fn duplicate_class_jobs_are_rejected() {
        let config = SortConfig {
            class_job_sort_order: vec![ClassJob::WHM, ClassJob::WHM],
            ..SortConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_missing_file_gives_defaults_and_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gearsort.json");
        assert_eq!(SortConfig::load(&path).unwrap(), SortConfig::default());

        let mut config = SortConfig::default();
        config.set_primary(SortKey::ItemLevel);
        config.sort_item_level_reverse = true;
        config.save(&path).unwrap();
        assert_eq!(SortConfig::load(&path).unwrap(), config);
    }
}
