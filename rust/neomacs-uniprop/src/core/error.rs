//! Error type shared by the table and property layers.

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that may occur while building or querying property tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnipropError {
    /// A codepoint argument was above the table's maximum codepoint.
    OutOfRange { codepoint: u32, max: u32 },
    /// No property with this name was registered.
    UnknownProperty(String),
    /// The table could not be built from its layout or entry stream.
    MalformedTable(String),
    /// A property name was registered twice.
    DuplicateProperty(String),
    /// A range listing could not be parsed.
    Parse { line: usize, message: String },
}

impl std::fmt::Display for UnipropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnipropError::OutOfRange { codepoint, max } => {
                write!(f, "Codepoint {:#X} out of range (max {:#X})", codepoint, max)
            }
            UnipropError::UnknownProperty(name) => write!(f, "Unknown property: {}", name),
            UnipropError::MalformedTable(msg) => write!(f, "Malformed table: {}", msg),
            UnipropError::DuplicateProperty(name) => {
                write!(f, "Property already registered: {}", name)
            }
            UnipropError::Parse { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for UnipropError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, UnipropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_out_of_range() {
        let err = UnipropError::OutOfRange {
            codepoint: 0x400000,
            max: 0x3FFFFF,
        };
        assert_eq!(
            err.to_string(),
            "Codepoint 0x400000 out of range (max 0x3FFFFF)"
        );
    }

    #[test]
    fn test_display_parse() {
        let err = UnipropError::Parse {
            line: 3,
            message: "missing ';'".into(),
        };
        assert_eq!(err.to_string(), "Parse error on line 3: missing ';'");
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(UnipropError::UnknownProperty("digit".into()));
        assert_eq!(err.to_string(), "Unknown property: digit");
    }
}
