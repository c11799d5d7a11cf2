//! The `digit-value` and `decimal-digit-value` character properties.
//!
//! Raw slots use the Emacs uniprop encoding: the digit `d` is stored as
//! `d + 1` so that an unassigned slot can never be confused with the
//! digit zero.

use crate::core::chartab::{CharPropertyTable, RangeEntry, Slot};
use crate::core::error::Result;

use super::binding::{PropertyBinding, PropertyValue};

pub const DIGIT_VALUE: &str = "digit-value";
pub const DECIMAL_DIGIT_VALUE: &str = "decimal-digit-value";

const DIGIT_VALUE_DOC: &str = "Unicode numeric value (digit).
Property value is an integer 0..9, or nil.
The value nil stands for NaN \"Numeric_Value\".";

const DECIMAL_DIGIT_VALUE_DOC: &str = "Unicode numeric value (decimal digit).
Property value is an integer 0..9, or nil.
The value nil stands for NaN \"Numeric_Value\".";

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// `(first codepoint, digit of first codepoint, count)`.
type DigitRun = (u32, u8, u8);

/// Decimal digits (general category Nd); every run counts 0..9.
const DECIMAL_RUNS: &[DigitRun] = &[
    (0x0030, 0, 10),  // ASCII
    (0x0660, 0, 10),  // Arabic-Indic
    (0x06F0, 0, 10),  // Extended Arabic-Indic
    (0x07C0, 0, 10),  // NKo
    (0x0966, 0, 10),  // Devanagari
    (0x09E6, 0, 10),  // Bengali
    (0x0A66, 0, 10),  // Gurmukhi
    (0x0AE6, 0, 10),  // Gujarati
    (0x0B66, 0, 10),  // Oriya
    (0x0BE6, 0, 10),  // Tamil
    (0x0C66, 0, 10),  // Telugu
    (0x0CE6, 0, 10),  // Kannada
    (0x0D66, 0, 10),  // Malayalam
    (0x0DE6, 0, 10),  // Sinhala Lith
    (0x0E50, 0, 10),  // Thai
    (0x0ED0, 0, 10),  // Lao
    (0x0F20, 0, 10),  // Tibetan
    (0x1040, 0, 10),  // Myanmar
    (0x1090, 0, 10),  // Myanmar Shan
    (0x17E0, 0, 10),  // Khmer
    (0x1810, 0, 10),  // Mongolian
    (0x1946, 0, 10),  // Limbu
    (0x19D0, 0, 10),  // New Tai Lue
    (0x1A80, 0, 10),  // Tai Tham Hora
    (0x1A90, 0, 10),  // Tai Tham Tham
    (0x1B50, 0, 10),  // Balinese
    (0x1BB0, 0, 10),  // Sundanese
    (0x1C40, 0, 10),  // Lepcha
    (0x1C50, 0, 10),  // Ol Chiki
    (0xA620, 0, 10),  // Vai
    (0xA8D0, 0, 10),  // Saurashtra
    (0xA900, 0, 10),  // Kayah Li
    (0xA9D0, 0, 10),  // Javanese
    (0xA9F0, 0, 10),  // Myanmar Tai Laing
    (0xAA50, 0, 10),  // Cham
    (0xABF0, 0, 10),  // Meetei Mayek
    (0xFF10, 0, 10),  // Fullwidth
    (0x104A0, 0, 10), // Osmanya
    (0x10D30, 0, 10), // Hanifi Rohingya
    (0x11066, 0, 10), // Brahmi
    (0x110F0, 0, 10), // Sora Sompeng
    (0x11136, 0, 10), // Chakma
    (0x111D0, 0, 10), // Sharada
    (0x112F0, 0, 10), // Khudawadi
    (0x11450, 0, 10), // Newa
    (0x114D0, 0, 10), // Tirhuta
    (0x11650, 0, 10), // Modi
    (0x116C0, 0, 10), // Takri
    (0x11730, 0, 10), // Ahom
    (0x118E0, 0, 10), // Warang Citi
    (0x11950, 0, 10), // Dives Akuru
    (0x11C50, 0, 10), // Bhaiksuki
    (0x11D50, 0, 10), // Masaram Gondi
    (0x11DA0, 0, 10), // Gunjala Gondi
    (0x11F50, 0, 10), // Kawi
    (0x16A60, 0, 10), // Mro
    (0x16AC0, 0, 10), // Tangsa
    (0x16B50, 0, 10), // Pahawh Hmong
    (0x1D7CE, 0, 10), // Mathematical bold
    (0x1D7D8, 0, 10), // Mathematical double-struck
    (0x1D7E2, 0, 10), // Mathematical sans-serif
    (0x1D7EC, 0, 10), // Mathematical sans-serif bold
    (0x1D7F6, 0, 10), // Mathematical monospace
    (0x1E140, 0, 10), // Nyiakeng Puachue Hmong
    (0x1E2F0, 0, 10), // Wancho
    (0x1E4F0, 0, 10), // Nag Mundari
    (0x1E950, 0, 10), // Adlam
    (0x1FBF0, 0, 10), // Segmented
];

/// Characters that carry a digit value without being decimal digits.
const EXTRA_DIGIT_RUNS: &[DigitRun] = &[
    (0x00B2, 2, 2),  // superscript two, three
    (0x00B9, 1, 1),  // superscript one
    (0x1369, 1, 9),  // Ethiopic
    (0x19DA, 1, 1),  // New Tai Lue tham one
    (0x2070, 0, 1),  // superscript zero
    (0x2074, 4, 6),  // superscript four..nine
    (0x2080, 0, 10), // subscripts
    (0x2460, 1, 9),  // circled
    (0x2474, 1, 9),  // parenthesized
    (0x2488, 1, 9),  // with full stop
    (0x24EA, 0, 1),  // circled zero
    (0x24F5, 1, 9),  // double circled
    (0x24FF, 0, 1),  // negative circled zero
    (0x2776, 1, 9),  // dingbat negative circled
    (0x2780, 1, 9),  // dingbat circled sans-serif
    (0x278A, 1, 9),  // dingbat negative circled sans-serif
    (0x10A40, 1, 4), // Kharoshthi
    (0x10E60, 1, 9), // Rumi
    (0x11052, 1, 9), // Brahmi numbers
    (0x1F100, 0, 1), // digit zero full stop
    (0x1F101, 0, 10), // digit comma
];

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Raw slot value for digit `d`.
pub fn encode_digit(d: u8) -> u32 {
    d as u32 + 1
}

/// Decode a digit slot: raw `1..=10` is the digit `0..=9`, anything else
/// (including the default slot and raw 0) has no value.
pub fn decode_digit(slot: Slot) -> PropertyValue {
    match slot {
        Slot::Value(raw @ 1..=10) => PropertyValue::Integer(raw as i64 - 1),
        _ => PropertyValue::NoValue,
    }
}

/// `"digit N"` for digit values.
pub fn describe_digit(value: &PropertyValue) -> Option<String> {
    match value {
        PropertyValue::Integer(n @ 0..=9) => Some(format!("digit {}", n)),
        _ => None,
    }
}

/// Expand digit runs into ascending single-codepoint entries.
fn digit_entries<'a>(runs: impl IntoIterator<Item = &'a DigitRun>) -> Vec<RangeEntry> {
    let mut entries: Vec<RangeEntry> = runs
        .into_iter()
        .flat_map(|&(start, first, count)| {
            (0..count).map(move |i| {
                let c = start + i as u32;
                (c..=c, encode_digit(first + i))
            })
        })
        .collect();
    entries.sort_by_key(|(range, _)| *range.start());
    entries
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

fn digit_binding(name: &str, doc: &str, entries: &[RangeEntry]) -> Result<PropertyBinding> {
    let table = CharPropertyTable::from_entries(entries)?;
    Ok(
        PropertyBinding::new(name, table, Slot::Default, decode_digit, doc)
            .with_describer(describe_digit),
    )
}

/// The `digit-value` property: decimal digits plus other digit forms.
pub fn digit_value_binding() -> Result<PropertyBinding> {
    let entries = digit_entries(DECIMAL_RUNS.iter().chain(EXTRA_DIGIT_RUNS));
    digit_binding(DIGIT_VALUE, DIGIT_VALUE_DOC, &entries)
}

/// The `decimal-digit-value` property: decimal digits only.
pub fn decimal_digit_value_binding() -> Result<PropertyBinding> {
    let entries = digit_entries(DECIMAL_RUNS);
    digit_binding(DECIMAL_DIGIT_VALUE, DECIMAL_DIGIT_VALUE_DOC, &entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
