//! Codec error type.

use core::fmt;

/// Structural failures when reading SysEx data.
///
/// Content problems inside a well-formed frame (an odd bank byte, an
/// out-of-range value) are not errors: codecs log them and substitute a
/// default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer bytes than the format requires.
    Truncated {
        /// Bytes required.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// The fixed header bytes do not match the device.
    BadHeader,
    /// A frame starts with `0xF0` but never reaches `0xF7`.
    Unterminated,
    /// A bank record index past the end of the bank.
    PatchIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Records in the bank.
        count: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { expected, actual } => {
                write!(f, "truncated data: expected {expected} bytes, got {actual}")
            }
            Self::BadHeader => write!(f, "header does not match device"),
            Self::Unterminated => write!(f, "sysex frame has no 0xF7 terminator"),
            Self::PatchIndexOutOfRange { index, count } => {
                write!(f, "patch index {index} out of range (bank holds {count})")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = CodecError::Truncated {
            expected: 101,
            actual: 40,
        };
        assert_eq!(
            e.to_string(),
            "truncated data: expected 101 bytes, got 40"
        );
        let e = CodecError::PatchIndexOutOfRange {
            index: 40,
            count: 32,
        };
        assert!(e.to_string().contains("40"));
    }
}
