//! Operation Outcomes
//!
//! Result types returned by the tiered cache instead of a "last error" field.

use serde::Serialize;

use crate::error::CacheError;

// == Write Outcome ==
/// How far a mutating operation got across the two tiers.
///
/// Total failures (bad input, memory tier unreachable) are an `Err` on the
/// surrounding `Result`; this type only distinguishes full success from a
/// disk-side failure after the memory tier was already updated.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Both tiers applied the change
    Complete,
    /// The memory tier applied the change, the disk tier failed
    Partial(CacheError),
}

impl WriteOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, WriteOutcome::Complete)
    }

    /// The disk-side error of a partial outcome.
    pub fn disk_error(&self) -> Option<&CacheError> {
        match self {
            WriteOutcome::Complete => None,
            WriteOutcome::Partial(err) => Some(err),
        }
    }
}

// == Tier ==
/// Which tier served a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Memory,
    Disk,
}

// == Lookup ==
/// A read result tagged with the tier that answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Found in the memory tier
    Memory(Vec<u8>),
    /// Found in the disk tier and promoted into memory
    Disk(Vec<u8>),
    /// Neither tier holds the key
    Miss,
}

impl Lookup {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Lookup::Memory(_) => Some(Tier::Memory),
            Lookup::Disk(_) => Some(Tier::Disk),
            Lookup::Miss => None,
        }
    }

    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Lookup::Memory(value) | Lookup::Disk(value) => Some(value),
            Lookup::Miss => None,
        }
    }
}
