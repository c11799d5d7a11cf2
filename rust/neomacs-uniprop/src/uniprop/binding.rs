//! Named character properties backed by a [`CharPropertyTable`].
//!
//! A binding pairs a frozen table with the metadata Emacs keeps for each
//! `char-code-property`: a default slot for codepoints the table leaves
//! unassigned, a decoder that turns raw slots into property values, an
//! optional value describer, and a documentation string.

use std::fmt;

use crate::core::chartab::{CharPropertyTable, Slot, MAX_CODEPOINT};
use crate::core::error::{Result, UnipropError};

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------

/// The decoded value of a property for one codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyValue {
    /// A numeric value (e.g. the digit 0..9).
    Integer(i64),
    /// The property has no value for this codepoint.  Distinct from
    /// `Integer(0)`.
    NoValue,
}

impl PropertyValue {
    /// The numeric value, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            PropertyValue::NoValue => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(n) => write!(f, "{}", n),
            PropertyValue::NoValue => f.write_str("nil"),
        }
    }
}

/// Maps a raw slot to the property's value.
pub type Decoder = fn(Slot) -> PropertyValue;

/// Produces a human-readable description of a decoded value.
pub type Describer = fn(&PropertyValue) -> Option<String>;

// ---------------------------------------------------------------------------
// PropertyBinding
// ---------------------------------------------------------------------------

/// A named, immutable character property.
#[derive(Clone)]
pub struct PropertyBinding {
    name: String,
    table: CharPropertyTable,
    default_value: Slot,
    decode: Decoder,
    describer: Option<Describer>,
    doc: String,
}

impl fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .field("table", &self.table)
            .finish()
    }
}

impl PropertyBinding {
    /// Create a binding.  `default_value` replaces [`Slot::Default`]
    /// before decoding.
    pub fn new(
        name: impl Into<String>,
        table: CharPropertyTable,
        default_value: Slot,
        decode: Decoder,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table,
            default_value,
            decode,
            describer: None,
            doc: doc.into(),
        }
    }

    /// Attach a value describer.
    pub fn with_describer(mut self, describer: Describer) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn default_value(&self) -> Slot {
        self.default_value
    }

    pub fn table(&self) -> &CharPropertyTable {
        &self.table
    }

    // -- Queries ------------------------------------------------------------

    /// Value of the property for codepoint `c`.
    pub fn value_of(&self, c: u32) -> Result<PropertyValue> {
        let slot = self.table.lookup(c)?;
        Ok(self.decode_slot(slot))
    }

    /// Value of the property for a `char`.
    pub fn value_of_char(&self, ch: char) -> PropertyValue {
        self.decode_slot(self.table.lookup_char(ch))
    }

    /// Lazily yield `(codepoint, value)` for every codepoint in
    /// `low..=high`.  An empty range (`low > high`) yields nothing.
    pub fn values_in_range(&self, low: u32, high: u32) -> Result<RangeValues<'_>> {
        for c in [low, high] {
            if c > MAX_CODEPOINT {
                return Err(UnipropError::OutOfRange {
                    codepoint: c,
                    max: MAX_CODEPOINT,
                });
            }
        }
        Ok(RangeValues {
            binding: self,
            next_codepoint: (low <= high).then_some(low),
            high,
        })
    }

    /// Describe a decoded value, if the property knows how.
    pub fn describe(&self, value: &PropertyValue) -> Option<String> {
        self.describer.and_then(|describe| describe(value))
    }

    fn decode_slot(&self, slot: Slot) -> PropertyValue {
        let slot = if slot.is_default() {
            self.default_value
        } else {
            slot
        };
        (self.decode)(slot)
    }
}

// ---------------------------------------------------------------------------
// Range iterator
// ---------------------------------------------------------------------------

/// Iterator returned by [`PropertyBinding::values_in_range`].
///
/// Clone it before consuming to scan the same range again.
#[derive(Clone)]
pub struct RangeValues<'a> {
    binding: &'a PropertyBinding,
    next_codepoint: Option<u32>,
    high: u32,
}

impl<'a> Iterator for RangeValues<'a> {
    type Item = (u32, PropertyValue);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.next_codepoint?;
        self.next_codepoint = if c < self.high { Some(c + 1) } else { None };
        Some((c, self.binding.decode_slot(self.binding.table.get(c))))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self
            .next_codepoint
            .map_or(0, |c| (self.high - c) as usize + 1);
        (n, Some(n))
    }
}

impl ExactSizeIterator for RangeValues<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
