//! Class/job values as stored in a gearset record
//!
//! The host stores each gearset's class/job as a single byte. Known values
//! are listed in [`ClassJob`]; the sort still has to cope with any other
//! byte showing up, which is why [`crate::GearsetEntry::class_job`] stays a
//! raw `u8` and only the configuration speaks in terms of [`ClassJob`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, FromRepr};

/// One class or job, with the byte value the host uses for it
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    FromRepr,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum ClassJob {
    GLD = 0x01,
    PUG = 0x02,
    MRD = 0x03,
    LNC = 0x04,
    ARC = 0x05,
    CNJ = 0x06,
    THM = 0x07,
    CRP = 0x08,
    BSM = 0x09,
    ARM = 0x0A,
    GSM = 0x0B,
    LTW = 0x0C,
    WVR = 0x0D,
    ALC = 0x0E,
    CUL = 0x0F,
    MIN = 0x10,
    BTN = 0x11,
    FSH = 0x12,
    PLD = 0x13,
    MNK = 0x14,
    WAR = 0x15,
    DRG = 0x16,
    BRD = 0x17,
    WHM = 0x18,
    BLM = 0x19,
    ACN = 0x1A,
    SMN = 0x1B,
    SCH = 0x1C,
    ROG = 0x1D,
    NIN = 0x1E,
    MCH = 0x1F,
    DRK = 0x20,
    AST = 0x21,
    SAM = 0x22,
    RDM = 0x23,
    BLU = 0x24,
    GNB = 0x25,
    DNC = 0x26,
    RPR = 0x27,
    SGE = 0x28,
}

impl ClassJob {
    /// Default priority order: tanks, healers, melee, ranged, casters,
    /// then base classes, crafters and gatherers.
    pub const DEFAULT_ORDER: [ClassJob; ClassJob::COUNT] = {
        use ClassJob::*;
        [
            PLD, WAR, DRK, GNB, //
            WHM, SCH, AST, SGE, //
            MNK, DRG, NIN, SAM, RPR, //
            BRD, MCH, DNC, //
            BLM, SMN, RDM, BLU, //
            GLD, MRD, CNJ, PUG, LNC, ROG, ARC, THM, ACN, //
            CRP, BSM, ARM, GSM, LTW, WVR, ALC, CUL, //
            MIN, BTN, FSH,
        ]
    };

    /// The byte value stored in gearset records.
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl From<ClassJob> for u8 {
    fn from(class_job: ClassJob) -> u8 {
        class_job.value()
    }
}

impl TryFrom<u8> for ClassJob {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ClassJob::from_repr(value).ok_or(crate::Error::UnresolvedClassJob(value))
    }
}
