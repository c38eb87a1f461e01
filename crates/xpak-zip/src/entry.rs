//! Entry metadata and the ordered entry table.

use std::cmp::Ordering;

use crate::zip::CompressionMethod;

/// Where an entry's (possibly compressed) payload currently lives.
///
/// Exactly one variant is populated per entry at any time; there is no
/// in-band sentinel. `OnDiskCache` is only valid while building, before
/// the final save; `OnDiskSource` only when the container was mounted
/// from an existing archive file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes resident in memory.
    InMemory(Vec<u8>),
    /// Spilled to the container's disk write cache.
    OnDiskCache { offset: u64 },
    /// Still inside the mounted source archive, behind its local header.
    OnDiskSource { local_header_offset: u64 },
}

/// One stored item.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    /// Lower-cased entry name; the table key.
    pub name: String,
    /// Payload size as stored in the archive.
    pub compressed_size: u32,
    /// Payload size after decompression.
    pub uncompressed_size: u32,
    /// Compression method.
    pub compression: CompressionMethod,
    /// CRC-32 of the uncompressed payload.
    pub crc32: u32,
    /// Current payload location.
    pub payload: Payload,
    /// Local-header offset assigned by the last save pass.
    ///
    /// Meaningless until a save (or mount) has run.
    pub zip_offset: u64,
}

/// Name comparison rule for the entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCase {
    /// Byte-exact ordering.
    #[default]
    Sensitive,
    /// ASCII-case-insensitive ordering.
    Insensitive,
}

/// Ordered table mapping normalized entry name to entry metadata.
///
/// Entries are kept sorted by the comparator selected at construction;
/// iteration order is the order the central directory is written in, so
/// callers see deterministic filename enumeration.
#[derive(Debug)]
pub struct EntryTable {
    entries: Vec<ZipEntry>,
    case: NameCase,
}

impl EntryTable {
    /// Create an empty table with the given comparison rule.
    pub fn new(case: NameCase) -> Self {
        Self {
            entries: Vec::new(),
            case,
        }
    }

    /// Normalize a name to its table key form.
    pub fn normalize(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self.case {
            NameCase::Sensitive => a.as_bytes().cmp(b.as_bytes()),
            NameCase::Insensitive => {
                let la = a.bytes().map(|b| b.to_ascii_lowercase());
                let lb = b.bytes().map(|b| b.to_ascii_lowercase());
                la.cmp(lb)
            }
        }
    }

    fn search(&self, normalized: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|e| self.compare(&e.name, normalized))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Look up an entry by (unnormalized) name.
    pub fn find(&self, name: &str) -> Option<&ZipEntry> {
        let normalized = Self::normalize(name);
        self.search(&normalized).ok().map(|i| &self.entries[i])
    }

    /// Insert an entry, replacing any existing entry with the same
    /// normalized name in place.
    pub fn insert(&mut self, mut entry: ZipEntry) {
        entry.name = Self::normalize(&entry.name);
        match self.search(&entry.name) {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    /// Remove an entry by name; returns whether one was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let normalized = Self::normalize(name);
        match self.search(&normalized) {
            Ok(i) => {
                self.entries.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Entry at a sorted position.
    pub fn get(&self, index: usize) -> Option<&ZipEntry> {
        self.entries.get(index)
    }

    /// Mutable entry at a sorted position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ZipEntry> {
        self.entries.get_mut(index)
    }

    /// Iterate entries in comparator order.
    pub fn iter(&self) -> impl Iterator<Item = &ZipEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ZipEntry {
        ZipEntry {
            name: name.to_string(),
            compressed_size: 1,
            uncompressed_size: 1,
            compression: CompressionMethod::Store,
            crc32: 0,
            payload: Payload::InMemory(vec![0]),
            zip_offset: 0,
        }
    }

    #[test]
    fn test_sorted_iteration() {
        let mut table = EntryTable::new(NameCase::Sensitive);
        table.insert(entry("zeta.txt"));
        table.insert(entry("alpha.txt"));
        table.insert(entry("mid.txt"));

        let names: Vec<_> = table.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.txt", "mid.txt", "zeta.txt"]);
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut table = EntryTable::new(NameCase::Sensitive);
        table.insert(entry("Foo.TXT"));
        assert_eq!(table.len(), 1);

        let mut replacement = entry("foo.txt");
        replacement.uncompressed_size = 99;
        table.insert(replacement);

        assert_eq!(table.len(), 1);
        assert_eq!(table.find("FOO.txt").unwrap().uncompressed_size, 99);
    }

    #[test]
    fn test_lookup_normalizes_case() {
        let mut table = EntryTable::new(NameCase::Insensitive);
        table.insert(entry("Materials/Wall.VMT"));

        assert!(table.find("materials/wall.vmt").is_some());
        assert!(table.find("MATERIALS/WALL.VMT").is_some());
        assert!(table.find("materials/floor.vmt").is_none());
    }

    #[test]
    fn test_remove() {
        let mut table = EntryTable::new(NameCase::Sensitive);
        table.insert(entry("a.txt"));

        assert!(table.remove("A.TXT"));
        assert!(!table.remove("a.txt"));
        assert!(table.is_empty());
    }
}
