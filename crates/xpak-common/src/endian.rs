//! Target byte order selection.

/// Byte order for on-disk integer fields.
///
/// Pak archives are little-endian on PC; console targets byte-swap every
/// record field at serialization time, so readers and writers carry the
/// order with them instead of baking it into the record structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Little-endian (the ZIP default).
    #[default]
    Little,
    /// Big-endian (byte-swapped console output).
    Big,
}
