//! Textual range listings for property tables.
//!
//! The format follows the Unicode Character Database data files:
//!
//! ```text
//! # comment
//! 0030..0039 ; 1
//! 00B2       ; 3
//! ```
//!
//! Codepoints are hexadecimal, the optional `..` gives an inclusive upper
//! bound and the field after `;` is the raw slot value in decimal.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::chartab::{CharPropertyTable, RangeEntry, Slot};
use crate::core::error::{Result, UnipropError};

use super::binding::{Decoder, PropertyBinding};

fn line_regex() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"^([0-9A-Fa-f]{1,8})(?:\.\.([0-9A-Fa-f]{1,8}))?\s*;\s*([0-9]+)$")
            .expect("valid range line regex")
    })
}

fn parse_error(line: usize, message: impl Into<String>) -> UnipropError {
    UnipropError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_hex(line: usize, digits: &str) -> Result<u32> {
    u32::from_str_radix(digits, 16)
        .map_err(|e| parse_error(line, format!("bad codepoint {:?}: {}", digits, e)))
}

/// Parse a range listing.  Line numbers in errors are 1-based.
///
/// Ordering is not checked here; building a table from the result rejects
/// unsorted or overlapping entries.
pub fn parse_ranges(text: &str) -> Result<Vec<RangeEntry>> {
    let re = line_regex();
    let mut entries = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let caps = re.captures(line).ok_or_else(|| {
            parse_error(
                line_no,
                format!("expected `XXXX[..YYYY] ; N`, got {:?}", line),
            )
        })?;
        let lo = parse_hex(line_no, &caps[1])?;
        let hi = match caps.get(2) {
            Some(m) => parse_hex(line_no, m.as_str())?,
            None => lo,
        };
        if lo > hi {
            return Err(parse_error(
                line_no,
                format!("reversed range {:04X}..{:04X}", lo, hi),
            ));
        }
        let value: u32 = caps[3]
            .parse()
            .map_err(|e| parse_error(line_no, format!("bad value {:?}: {}", &caps[3], e)))?;
        entries.push((lo..=hi, value));
    }
    log::debug!("parsed {} range entries", entries.len());
    Ok(entries)
}

/// Write entries in the format read by [`parse_ranges`].
pub fn write_ranges(entries: &[RangeEntry]) -> String {
    let mut out = String::new();
    for (range, value) in entries {
        let (lo, hi) = (*range.start(), *range.end());
        if lo == hi {
            out.push_str(&format!("{:04X} ; {}\n", lo, value));
        } else {
            out.push_str(&format!("{:04X}..{:04X} ; {}\n", lo, hi, value));
        }
    }
    out
}

/// Build a binding from a range listing.
pub fn load_binding(
    name: &str,
    doc: &str,
    default_value: Slot,
    decode: Decoder,
    text: &str,
) -> Result<PropertyBinding> {
    let entries = parse_ranges(text)?;
    let table = CharPropertyTable::from_entries(&entries)?;
    Ok(PropertyBinding::new(name, table, default_value, decode, doc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
