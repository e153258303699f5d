//! The shared NewGRF lookup table used to deduplicate NewGRF identity across
//! many coordinator server listings.

use std::collections::BTreeMap;

/// One entry in the lookup table: a NewGRF's identity, keyed by an opaque
/// index the coordinator assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrfEntry {
    /// The NewGRF's 32-bit identifier.
    pub grfid: u32,
    /// MD5 checksum of the NewGRF's content.
    pub md5sum: [u8; 16],
    /// Human-readable name, when known.
    pub name: Option<String>,
}

/// Shared mapping `index -> NewGRF identity`.
///
/// Mutation lives with the external server registry; this crate only reads
/// it, to resolve `newgrfs_indexed` references when encoding `GC_LISTING`
/// for clients that predate lookup-table support, and to serve
/// `GC_NEWGRF_LOOKUP` batches.
pub type NewGrfLookupTable = BTreeMap<u32, NewGrfEntry>;
