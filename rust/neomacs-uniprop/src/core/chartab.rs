//! Immutable char-table: a tiered, space-efficient map from codepoints
//! to raw property slots.
//!
//! The table is the read-only counterpart of the Emacs char-table used by
//! the generated `uni-*.el` property files.  It covers the whole legacy
//! Emacs character space (`0..=0x3FFFFF`, 22 bits) with a fixed 3-level
//! tree whose bit widths come from a [`Layout`]:
//!
//! | Level | Bits | Entries | Chars per entry |
//! |-------|------|---------|-----------------|
//! |   0   |  6   |    64   |     65 536      |
//! |   1   |  9   |   512   |        128      |
//! |   2   |  7   |   128   |          1      |
//!
//! Root and mid entries either hold a uniform [`Slot`] for their whole
//! span (the descent stops there) or the index of a child block.  All
//! blocks live in two arenas owned by the table, so several parents can
//! point at one block without aliasing any memory.  Blocks are shared by
//! [`TableBuilder`](super::builder::TableBuilder) at construction time;
//! a built table is never mutated.

use std::fmt;
use std::mem;
use std::ops::RangeInclusive;

use super::builder::{BuildConfig, TableBuilder};
use super::error::{Result, UnipropError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of bits in a codepoint of the legacy Emacs character space.
pub const CODEPOINT_BITS: u32 = 22;

/// Largest codepoint accepted by a table (inclusive).
pub const MAX_CODEPOINT: u32 = (1 << CODEPOINT_BITS) - 1;

/// Widest leaf block a layout may ask for.
const MAX_LEAF_BITS: u32 = 16;

/// One explicit assignment: every codepoint in the range gets the raw value.
pub type RangeEntry = (RangeInclusive<u32>, u32);

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Bit widths of the three tree levels, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    bits: [u32; 3],
    /// Bit-shift extracting each level's index: `[b1 + b2, b2, 0]`.
    shifts: [u32; 3],
}

impl Layout {
    /// 64 planes of 512 blocks of 128 characters.
    pub const LEGACY: Layout = Layout {
        bits: [6, 9, 7],
        shifts: [16, 7, 0],
    };

    /// Create a layout, checking that the widths cover exactly
    /// [`CODEPOINT_BITS`].
    pub fn new(bits: [u32; 3]) -> Result<Self> {
        if bits.iter().any(|&b| b == 0) {
            return Err(UnipropError::MalformedTable(format!(
                "layout {:?} has an empty level",
                bits
            )));
        }
        if let Some(&wide) = bits.iter().find(|&&b| b > CODEPOINT_BITS) {
            return Err(UnipropError::MalformedTable(format!(
                "layout {:?} has a {}-bit level, wider than {} bits",
                bits, wide, CODEPOINT_BITS
            )));
        }
        // Each width is at most CODEPOINT_BITS, so the sum cannot overflow.
        let total: u32 = bits.iter().sum();
        if total != CODEPOINT_BITS {
            return Err(UnipropError::MalformedTable(format!(
                "layout {:?} covers {} bits, expected {}",
                bits, total, CODEPOINT_BITS
            )));
        }
        if bits[2] > MAX_LEAF_BITS {
            return Err(UnipropError::MalformedTable(format!(
                "leaf width {} exceeds {} bits",
                bits[2], MAX_LEAF_BITS
            )));
        }
        Ok(Self {
            bits,
            shifts: [bits[1] + bits[2], bits[2], 0],
        })
    }

    /// The bit widths, root first.
    pub fn bits(&self) -> [u32; 3] {
        self.bits
    }

    /// Number of entries in a block at `level`.
    #[inline]
    pub fn size(&self, level: usize) -> usize {
        1 << self.bits[level]
    }

    /// Bit-shift that extracts the index at `level`.
    #[inline]
    pub fn shift(&self, level: usize) -> u32 {
        self.shifts[level]
    }

    /// Number of codepoints covered by one entry at `level`.
    #[inline]
    pub fn chars_per_entry(&self, level: usize) -> u32 {
        1 << self.shifts[level]
    }

    /// Index into a block at `level` for codepoint `c`.
    #[inline]
    pub fn index(&self, c: u32, level: usize) -> usize {
        ((c >> self.shifts[level]) as usize) & (self.size(level) - 1)
    }

    /// Last codepoint of the span that `c` falls in at `level`.
    #[inline]
    fn span_end(&self, c: u32, level: usize) -> u32 {
        c | (self.chars_per_entry(level) - 1)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::LEGACY
    }
}

// ---------------------------------------------------------------------------
// Slots and entries
// ---------------------------------------------------------------------------

/// The raw content stored for a codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    /// No explicit value; the property's default applies.
    #[default]
    Default,
    /// An explicit raw value.
    Value(u32),
}

impl Slot {
    /// Returns true for [`Slot::Default`].
    pub fn is_default(&self) -> bool {
        matches!(self, Slot::Default)
    }

    /// The explicit raw value, if any.
    pub fn value(&self) -> Option<u32> {
        match self {
            Slot::Default => None,
            Slot::Value(v) => Some(*v),
        }
    }
}

/// Element of a root or mid block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Entry {
    /// Every codepoint under this entry holds the same slot.
    Uniform(Slot),
    /// Index of a block in the next level's arena.
    Block(u32),
}

// ---------------------------------------------------------------------------
// CharPropertyTable
// ---------------------------------------------------------------------------

/// A frozen 3-level char-table mapping codepoints to [`Slot`]s.
///
/// Lookups never allocate and take at most three array indexations.
#[derive(Clone)]
pub struct CharPropertyTable {
    layout: Layout,
    root: Box<[Entry]>,
    mids: Vec<Box<[Entry]>>,
    leaves: Vec<Box<[Slot]>>,
}

impl fmt::Debug for CharPropertyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharPropertyTable")
            .field("layout", &self.layout.bits)
            .field("mid_blocks", &self.mids.len())
            .field("leaf_blocks", &self.leaves.len())
            .finish()
    }
}

impl CharPropertyTable {
    // -- Construction -------------------------------------------------------

    /// Build a table from ascending, non-overlapping entries using the
    /// default layout and full block sharing.
    pub fn from_entries(entries: &[RangeEntry]) -> Result<Self> {
        TableBuilder::new(BuildConfig::default()).build(entries)
    }

    /// Assemble a table from arenas produced by the builder.
    pub(crate) fn from_parts(
        layout: Layout,
        root: Box<[Entry]>,
        mids: Vec<Box<[Entry]>>,
        leaves: Vec<Box<[Slot]>>,
    ) -> Self {
        debug_assert_eq!(root.len(), layout.size(0));
        Self {
            layout,
            root,
            mids,
            leaves,
        }
    }

    /// The level layout this table was built with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Largest codepoint accepted by [`lookup`](Self::lookup).
    pub fn max_codepoint(&self) -> u32 {
        MAX_CODEPOINT
    }

    // -- Lookup -------------------------------------------------------------

    /// Look up the raw slot for codepoint `c`.
    ///
    /// Codepoints that were never assigned resolve to [`Slot::Default`].
    pub fn lookup(&self, c: u32) -> Result<Slot> {
        if c > MAX_CODEPOINT {
            return Err(UnipropError::OutOfRange {
                codepoint: c,
                max: MAX_CODEPOINT,
            });
        }
        Ok(self.get(c))
    }

    /// Look up the raw slot for a `char`.  Every `char` is in range.
    pub fn lookup_char(&self, ch: char) -> Slot {
        self.get(ch as u32)
    }

    /// Walk the tree.  `c` must not exceed `MAX_CODEPOINT`.
    #[inline]
    pub(crate) fn get(&self, c: u32) -> Slot {
        let mid = match self.root[self.layout.index(c, 0)] {
            Entry::Uniform(slot) => return slot,
            Entry::Block(id) => &self.mids[id as usize],
        };
        let leaf = match mid[self.layout.index(c, 1)] {
            Entry::Uniform(slot) => return slot,
            Entry::Block(id) => &self.leaves[id as usize],
        };
        leaf[self.layout.index(c, 2)]
    }

    /// The slot at `c` together with the last codepoint of the deepest
    /// span that holds it.
    fn span_at(&self, c: u32) -> (Slot, u32) {
        match self.root[self.layout.index(c, 0)] {
            Entry::Uniform(slot) => (slot, self.layout.span_end(c, 0)),
            Entry::Block(mid) => match self.mids[mid as usize][self.layout.index(c, 1)] {
                Entry::Uniform(slot) => (slot, self.layout.span_end(c, 1)),
                Entry::Block(leaf) => (self.leaves[leaf as usize][self.layout.index(c, 2)], c),
            },
        }
    }

    // -- Iteration ----------------------------------------------------------

    /// Iterate over maximal runs of equal slots covering `0..=MAX_CODEPOINT`
    /// in ascending order.  Uniform spans are skipped in one step.
    pub fn runs(&self) -> Runs<'_> {
        Runs {
            table: self,
            next_codepoint: Some(0),
        }
    }

    /// The explicit assignments of this table as coalesced range entries.
    ///
    /// Building a table from the result yields an equivalent table.
    pub fn entries(&self) -> Vec<RangeEntry> {
        self.runs()
            .filter_map(|(range, slot)| slot.value().map(|v| (range, v)))
            .collect()
    }

    // -- Statistics ---------------------------------------------------------

    /// Storage statistics, mostly useful to observe block sharing.
    pub fn stats(&self) -> TableStats {
        let mut mid_refs = 0;
        let mut leaf_refs = 0;
        for entry in self.root.iter() {
            if let Entry::Block(mid) = entry {
                mid_refs += 1;
                leaf_refs += self.mids[*mid as usize]
                    .iter()
                    .filter(|e| matches!(e, Entry::Block(_)))
                    .count();
            }
        }

        let entry_size = mem::size_of::<Entry>();
        let slot_size = mem::size_of::<Slot>();
        let heap_bytes = self.root.len() * entry_size
            + self.mids.iter().map(|m| m.len() * entry_size).sum::<usize>()
            + self.leaves.iter().map(|l| l.len() * slot_size).sum::<usize>();

        TableStats {
            root_entries: self.root.len(),
            mid_blocks: self.mids.len(),
            leaf_blocks: self.leaves.len(),
            mid_refs,
            leaf_refs,
            heap_bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Runs iterator
// ---------------------------------------------------------------------------

/// Iterator over the maximal `(range, slot)` runs of a [`CharPropertyTable`].
#[derive(Clone)]
pub struct Runs<'a> {
    table: &'a CharPropertyTable,
    next_codepoint: Option<u32>,
}

impl<'a> Iterator for Runs<'a> {
    type Item = (RangeInclusive<u32>, Slot);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_codepoint?;
        let (slot, mut end) = self.table.span_at(start);
        while end < MAX_CODEPOINT {
            let (next_slot, next_end) = self.table.span_at(end + 1);
            if next_slot != slot {
                break;
            }
            end = next_end;
        }
        self.next_codepoint = if end < MAX_CODEPOINT {
            Some(end + 1)
        } else {
            None
        };
        Some((start..=end, slot))
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Storage figures for a built table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Entries in the root block.
    pub root_entries: usize,
    /// Distinct mid blocks stored.
    pub mid_blocks: usize,
    /// Distinct leaf blocks stored.
    pub leaf_blocks: usize,
    /// Root entries that point at a mid block.
    pub mid_refs: usize,
    /// Mid entries (reached from the root) that point at a leaf block.
    pub leaf_refs: usize,
    /// Approximate bytes held by all blocks.
    pub heap_bytes: usize,
}

impl TableStats {
    /// References served by an already stored block instead of a fresh one.
    pub fn shared_refs(&self) -> usize {
        (self.mid_refs - self.mid_blocks) + (self.leaf_refs - self.leaf_blocks)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::Sharing;

    // Helpers ---------------------------------------------------------------

    fn make_table(entries: &[RangeEntry]) -> CharPropertyTable {
        CharPropertyTable::from_entries(entries).unwrap()
    }

    fn digits_table() -> CharPropertyTable {
        let entries: Vec<RangeEntry> = (0..10u32)
            .map(|d| (0x30 + d..=0x30 + d, d + 1))
            .collect();
        make_table(&entries)
    }

    // 1. Layout arithmetic --------------------------------------------------

    #[test]
    fn test_legacy_layout() {
        let l = Layout::LEGACY;
        assert_eq!(l.size(0), 64);
        assert_eq!(l.size(1), 512);
        assert_eq!(l.size(2), 128);
        assert_eq!(l.chars_per_entry(0), 65536);
        assert_eq!(l.chars_per_entry(1), 128);
        assert_eq!(l.chars_per_entry(2), 1);
        assert_eq!(l.index(0xFF19, 0), 0);
        assert_eq!(l.index(0xFF19, 1), 0xFF19 >> 7);
        assert_eq!(l.index(0xFF19, 2), 0x19);
    }

    #[test]
    fn test_layout_rejects_wrong_width() {
        assert!(matches!(
            Layout::new([6, 8, 7]),
            Err(UnipropError::MalformedTable(_))
        ));
        assert!(matches!(
            Layout::new([0, 15, 7]),
            Err(UnipropError::MalformedTable(_))
        ));
        assert!(matches!(
            Layout::new([1, 2, 19]),
            Err(UnipropError::MalformedTable(_))
        ));
        assert!(Layout::new([8, 8, 6]).is_ok());
    }

    #[test]
    fn test_layout_rejects_oversized_width() {
        // Widths whose sum wraps around u32 to exactly 22.
        assert!(matches!(
            Layout::new([u32::MAX, 22, 1]),
            Err(UnipropError::MalformedTable(_))
        ));
        assert!(matches!(
            Layout::new([23, 1, 1]),
            Err(UnipropError::MalformedTable(_))
        ));
        assert!(matches!(
            Layout::new([1, 1, u32::MAX]),
            Err(UnipropError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_layout_shifts_match_legacy() {
        let l = Layout::new([6, 9, 7]).unwrap();
        assert_eq!(l, Layout::LEGACY);
        assert_eq!([l.shift(0), l.shift(1), l.shift(2)], [16, 7, 0]);
        let l = Layout::new([8, 8, 6]).unwrap();
        assert_eq!([l.shift(0), l.shift(1), l.shift(2)], [14, 6, 0]);
    }

    // 2. Empty table --------------------------------------------------------

    #[test]
    fn test_empty_table_is_default() {
        let t = make_table(&[]);
        assert_eq!(t.lookup(0).unwrap(), Slot::Default);
        assert_eq!(t.lookup(0x4e00).unwrap(), Slot::Default);
        assert_eq!(t.lookup(MAX_CODEPOINT).unwrap(), Slot::Default);
        let stats = t.stats();
        assert_eq!(stats.mid_blocks, 0);
        assert_eq!(stats.leaf_blocks, 0);
    }

    // 3. Single values ------------------------------------------------------

    #[test]
    fn test_lookup_ascii_digits() {
        let t = digits_table();
        assert_eq!(t.lookup(0x30).unwrap(), Slot::Value(1));
        assert_eq!(t.lookup(0x39).unwrap(), Slot::Value(10));
        assert_eq!(t.lookup(0x2F).unwrap(), Slot::Default);
        assert_eq!(t.lookup(0x41).unwrap(), Slot::Default);
        assert_eq!(t.lookup_char('5'), Slot::Value(6));
    }

    #[test]
    fn test_value_zero_is_not_default() {
        let t = make_table(&[(0x100..=0x100, 0)]);
        assert_eq!(t.lookup(0x100).unwrap(), Slot::Value(0));
        assert_eq!(t.lookup(0x101).unwrap(), Slot::Default);
        assert!(!Slot::Value(0).is_default());
        assert_eq!(Slot::Value(0).value(), Some(0));
        assert_eq!(Slot::Default.value(), None);
    }

    // 4. Boundaries ---------------------------------------------------------

    #[test]
    fn test_lookup_max_codepoint() {
        let t = make_table(&[(MAX_CODEPOINT..=MAX_CODEPOINT, 7)]);
        assert_eq!(t.lookup(MAX_CODEPOINT).unwrap(), Slot::Value(7));
        assert_eq!(
            t.lookup(MAX_CODEPOINT + 1),
            Err(UnipropError::OutOfRange {
                codepoint: MAX_CODEPOINT + 1,
                max: MAX_CODEPOINT,
            })
        );
        assert!(t.lookup(u32::MAX).is_err());
    }

    #[test]
    fn test_lookup_char_max_unicode() {
        let t = make_table(&[(0x10FFFF..=0x10FFFF, 3)]);
        assert_eq!(t.lookup_char('\u{10FFFF}'), Slot::Value(3));
        assert_eq!(t.lookup_char('\u{10FFFE}'), Slot::Default);
    }

    // 5. Uniform spans ------------------------------------------------------

    #[test]
    fn test_full_plane_collapses_to_root() {
        let t = make_table(&[(0x10000..=0x1FFFF, 5)]);
        assert_eq!(t.lookup(0x10000).unwrap(), Slot::Value(5));
        assert_eq!(t.lookup(0x1ABCD).unwrap(), Slot::Value(5));
        assert_eq!(t.lookup(0x1FFFF).unwrap(), Slot::Value(5));
        assert_eq!(t.lookup(0xFFFF).unwrap(), Slot::Default);
        assert_eq!(t.lookup(0x20000).unwrap(), Slot::Default);
        let stats = t.stats();
        assert_eq!(stats.mid_blocks, 0);
        assert_eq!(stats.leaf_blocks, 0);
    }

    #[test]
    fn test_full_leaf_span_collapses_to_mid() {
        // 0x4E00..=0x4E7F is exactly one 128-codepoint block.
        let t = make_table(&[(0x4E00..=0x4E7F, 9)]);
        assert_eq!(t.lookup(0x4E00).unwrap(), Slot::Value(9));
        assert_eq!(t.lookup(0x4E7F).unwrap(), Slot::Value(9));
        assert_eq!(t.lookup(0x4E80).unwrap(), Slot::Default);
        let stats = t.stats();
        assert_eq!(stats.mid_blocks, 1);
        assert_eq!(stats.leaf_blocks, 0);
    }

    #[test]
    fn test_range_across_planes() {
        let t = make_table(&[(0xFF00..=0x10100, 8)]);
        assert_eq!(t.lookup(0xFEFF).unwrap(), Slot::Default);
        assert_eq!(t.lookup(0xFF00).unwrap(), Slot::Value(8));
        assert_eq!(t.lookup(0xFFFF).unwrap(), Slot::Value(8));
        assert_eq!(t.lookup(0x10000).unwrap(), Slot::Value(8));
        assert_eq!(t.lookup(0x10100).unwrap(), Slot::Value(8));
        assert_eq!(t.lookup(0x10101).unwrap(), Slot::Default);
    }

    // 6. Runs and entries ---------------------------------------------------

    #[test]
    fn test_runs_cover_whole_space() {
        let t = make_table(&[(0x41..=0x5A, 1), (0x10000..=0x1FFFF, 2)]);
        let runs: Vec<_> = t.runs().collect();
        assert_eq!(
            runs,
            vec![
                (0..=0x40, Slot::Default),
                (0x41..=0x5A, Slot::Value(1)),
                (0x5B..=0xFFFF, Slot::Default),
                (0x10000..=0x1FFFF, Slot::Value(2)),
                (0x20000..=MAX_CODEPOINT, Slot::Default),
            ]
        );
    }

    #[test]
    fn test_entries_round_trip() {
        let input: Vec<RangeEntry> = vec![
            (0x30..=0x30, 1),
            (0x31..=0x31, 2),
            (0x660..=0x669, 4),
            (0xFF10..=0xFF10, 1),
            (0x10000..=0x2FFFF, 3),
            (MAX_CODEPOINT..=MAX_CODEPOINT, 6),
        ];
        let t = make_table(&input);
        assert_eq!(t.entries(), input);
        let rebuilt = make_table(&t.entries());
        assert_eq!(rebuilt.entries(), input);
    }

    #[test]
    fn test_runs_restartable() {
        let t = digits_table();
        let runs = t.runs();
        let first: Vec<_> = runs.clone().collect();
        let second: Vec<_> = runs.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
    }

    // 7. Statistics ---------------------------------------------------------

    #[test]
    fn test_stats_sharing_counts() {
        // The same pattern in three consecutive 128-codepoint blocks.
        let entries: Vec<RangeEntry> = (0..3u32)
            .map(|k| (k * 128 + 5..=k * 128 + 5, 1))
            .collect();
        let shared = TableBuilder::new(BuildConfig {
            sharing: Sharing::Full,
            ..BuildConfig::default()
        })
        .build(&entries)
        .unwrap();
        let stats = shared.stats();
        assert_eq!(stats.leaf_blocks, 1);
        assert_eq!(stats.leaf_refs, 3);
        assert_eq!(stats.shared_refs(), 2);
        assert!(stats.heap_bytes > 0);
    }

    #[test]
    fn test_debug_output() {
        let t = digits_table();
        let dbg = format!("{:?}", t);
        assert!(dbg.contains("CharPropertyTable"));
        assert!(dbg.contains("leaf_blocks: 1"));
    }

    // 8. Concurrent readers -------------------------------------------------

    #[test]
    fn test_shared_across_threads() {
        let t = std::sync::Arc::new(digits_table());
        let handles: Vec<_> = (0..4u32)
            .map(|d| {
                let t = t.clone();
                std::thread::spawn(move || t.lookup(0x30 + d).unwrap())
            })
            .collect();
        for (d, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), Slot::Value(d as u32 + 1));
        }
    }
}
