//! Construction of [`CharPropertyTable`]s from ordered range entries.
//!
//! The builder is the only place where table storage is mutable.  It walks
//! the codepoint space level by level, collapses spans that hold a single
//! slot into uniform entries, and interns every block it has to
//! materialise so that identical blocks are stored once.

use std::collections::HashMap;
use std::hash::Hash;

use super::chartab::{CharPropertyTable, Entry, Layout, RangeEntry, Slot, MAX_CODEPOINT};
use super::error::{Result, UnipropError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How aggressively identical blocks are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sharing {
    /// Every materialised block gets its own storage.
    None,
    /// A block equal to the one built for the preceding slot of the same
    /// level reuses it.  A uniform slot in between ends the run.
    Adjacent,
    /// Any previously built equal block is reused.
    #[default]
    Full,
}

/// Table construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildConfig {
    pub layout: Layout,
    pub sharing: Sharing,
}

// ---------------------------------------------------------------------------
// Block interning
// ---------------------------------------------------------------------------

/// Arena for one tree level plus the lookup state its sharing policy needs.
struct Interner<B> {
    sharing: Sharing,
    blocks: Vec<B>,
    index: HashMap<B, u32>,
    last: Option<u32>,
}

impl<B: Clone + Eq + Hash> Interner<B> {
    fn new(sharing: Sharing) -> Self {
        Self {
            sharing,
            blocks: Vec::new(),
            index: HashMap::new(),
            last: None,
        }
    }

    /// Store `block` (or find an equal one) and return its index.
    fn intern(&mut self, block: B) -> u32 {
        match self.sharing {
            Sharing::None => self.push(block),
            Sharing::Adjacent => {
                if let Some(id) = self.last {
                    if self.blocks[id as usize] == block {
                        return id;
                    }
                }
                let id = self.push(block);
                self.last = Some(id);
                id
            }
            Sharing::Full => {
                if let Some(&id) = self.index.get(&block) {
                    return id;
                }
                let id = self.push(block.clone());
                self.index.insert(block, id);
                id
            }
        }
    }

    /// A uniform entry was emitted at this level.
    fn break_run(&mut self) {
        self.last = None;
    }

    fn push(&mut self, block: B) -> u32 {
        let id = self.blocks.len() as u32;
        self.blocks.push(block);
        id
    }
}

// ---------------------------------------------------------------------------
// Input normalisation
// ---------------------------------------------------------------------------

/// A validated assignment `lo..=hi -> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    lo: u32,
    hi: u32,
    value: u32,
}

/// Check ordering and bounds, and merge touching entries that carry the
/// same value.
fn normalize(entries: &[RangeEntry]) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = Vec::with_capacity(entries.len());
    for (range, value) in entries {
        let (lo, hi) = (*range.start(), *range.end());
        if lo > hi {
            return Err(UnipropError::MalformedTable(format!(
                "reversed range {:#X}..{:#X}",
                lo, hi
            )));
        }
        if hi > MAX_CODEPOINT {
            return Err(UnipropError::MalformedTable(format!(
                "range {:#X}..{:#X} exceeds {:#X}",
                lo, hi, MAX_CODEPOINT
            )));
        }
        if let Some(last) = spans.last_mut() {
            if lo <= last.hi {
                return Err(UnipropError::MalformedTable(format!(
                    "range {:#X}..{:#X} is unsorted or overlaps {:#X}..{:#X}",
                    lo, hi, last.lo, last.hi
                )));
            }
            if lo == last.hi + 1 && *value == last.value {
                last.hi = hi;
                continue;
            }
        }
        spans.push(Span {
            lo,
            hi,
            value: *value,
        });
    }
    Ok(spans)
}

/// Decide whether `lo..=hi` holds a single slot.
///
/// Advances `cursor` past spans that end before `lo`; callers visit
/// ranges in ascending order so the cursor only moves forward.
fn uniform_slot(spans: &[Span], cursor: &mut usize, lo: u32, hi: u32) -> Option<Slot> {
    while *cursor < spans.len() && spans[*cursor].hi < lo {
        *cursor += 1;
    }
    match spans.get(*cursor) {
        None => Some(Slot::Default),
        Some(span) if span.lo > hi => Some(Slot::Default),
        Some(span) if span.lo <= lo && span.hi >= hi => Some(Slot::Value(span.value)),
        Some(_) => None,
    }
}

// ---------------------------------------------------------------------------
// TableBuilder
// ---------------------------------------------------------------------------

/// Builds frozen [`CharPropertyTable`]s.
pub struct TableBuilder {
    config: BuildConfig,
    mids: Interner<Box<[Entry]>>,
    leaves: Interner<Box<[Slot]>>,
}

impl TableBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            mids: Interner::new(config.sharing),
            leaves: Interner::new(config.sharing),
        }
    }

    /// Build a table from ascending, non-overlapping entries.
    ///
    /// Codepoints not covered by any entry hold [`Slot::Default`].  A
    /// reversed, unsorted, overlapping or out-of-range entry aborts the
    /// build with [`UnipropError::MalformedTable`].
    pub fn build(mut self, entries: &[RangeEntry]) -> Result<CharPropertyTable> {
        let layout = self.config.layout;
        let spans = normalize(entries)?;

        let per0 = layout.chars_per_entry(0);
        let mut cursor = 0;
        let root: Box<[Entry]> = (0..layout.size(0) as u32)
            .map(|i0| {
                let lo = i0 * per0;
                self.build_mid(&layout, &spans, &mut cursor, lo, lo + (per0 - 1))
            })
            .collect();

        log::debug!(
            "char table built: {} spans, {} mid blocks, {} leaf blocks ({:?} sharing)",
            spans.len(),
            self.mids.blocks.len(),
            self.leaves.blocks.len(),
            self.config.sharing
        );

        Ok(CharPropertyTable::from_parts(
            layout,
            root,
            self.mids.blocks,
            self.leaves.blocks,
        ))
    }

    /// Root entry for `lo..=hi`.
    fn build_mid(
        &mut self,
        layout: &Layout,
        spans: &[Span],
        cursor: &mut usize,
        lo: u32,
        hi: u32,
    ) -> Entry {
        if let Some(slot) = uniform_slot(spans, cursor, lo, hi) {
            // Nothing is built below a uniform root entry either.
            self.mids.break_run();
            self.leaves.break_run();
            return Entry::Uniform(slot);
        }

        let per1 = layout.chars_per_entry(1);
        let block: Box<[Entry]> = (0..layout.size(1) as u32)
            .map(|i1| {
                let start = lo + i1 * per1;
                self.build_leaf(layout, spans, cursor, start, start + (per1 - 1))
            })
            .collect();
        Entry::Block(self.mids.intern(block))
    }

    /// Mid entry for `lo..=hi`.
    fn build_leaf(
        &mut self,
        layout: &Layout,
        spans: &[Span],
        cursor: &mut usize,
        lo: u32,
        hi: u32,
    ) -> Entry {
        if let Some(slot) = uniform_slot(spans, cursor, lo, hi) {
            self.leaves.break_run();
            return Entry::Uniform(slot);
        }

        let mut block = vec![Slot::Default; layout.size(2)].into_boxed_slice();
        for span in spans[*cursor..].iter().take_while(|s| s.lo <= hi) {
            for c in span.lo.max(lo)..=span.hi.min(hi) {
                block[(c - lo) as usize] = Slot::Value(span.value);
            }
        }
        Entry::Block(self.leaves.intern(block))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
