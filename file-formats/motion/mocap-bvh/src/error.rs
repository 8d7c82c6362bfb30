//! Error handling for BVH parsing and playback

use std::fmt;
use std::io;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fatal problems in the BVH text itself
///
/// Any of these aborts a load; no partially built skeleton or clip is ever
/// handed out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// A required section marker was not found
    #[error("Missing section: '{section}' not found")]
    MissingSection {
        /// The marker that was searched for
        section: &'static str,
    },

    /// The hierarchy section has no ROOT joint
    #[error("Hierarchy section does not declare a ROOT joint")]
    MissingRoot,

    /// The token stream ended inside a construct
    #[error("Unexpected end of hierarchy while reading {context}")]
    UnexpectedEof {
        /// What the parser was reading
        context: &'static str,
    },

    /// A token appeared where the grammar does not allow it
    #[error("Unexpected token: expected {expected}, found '{found}'")]
    UnexpectedToken {
        /// Description of what was expected
        expected: &'static str,
        /// The token that was found
        found: String,
    },

    /// A numeric token failed to parse
    #[error("Invalid number '{token}' in {context}")]
    InvalidNumber {
        /// The offending token
        token: String,
        /// Where the token appeared
        context: String,
    },

    /// A CHANNELS entry with an unknown axis or kind character
    #[error("Unknown channel token '{token}' on joint '{joint}'")]
    UnknownChannelToken {
        /// The offending token
        token: String,
        /// The joint declaring the channel
        joint: String,
    },

    /// Joints nested deeper than the parser accepts
    #[error("Joint hierarchy nests deeper than {limit} levels")]
    HierarchyTooDeep {
        /// Deepest accepted nesting below the root
        limit: usize,
    },

    /// A motion row whose width differs from the skeleton's channel count
    #[error("Channel count mismatch on line {line}: expected {expected} values, found {found}")]
    ChannelCountMismatch {
        /// 1-based line number in the source text
        line: usize,
        /// Total channel count of the skeleton
        expected: usize,
        /// Number of values on the line
        found: usize,
    },

    /// `Frames:` or `Frame Time:` is missing or out of order
    #[error("Missing motion header '{header}'")]
    MissingMotionHeader {
        /// The header that was expected next
        header: &'static str,
    },

    /// Frame time is zero, negative or not finite
    #[error("Invalid frame time: {0}")]
    InvalidFrameTime(f32),

    /// The motion section contains no frame rows
    #[error("Motion section contains no frames")]
    EmptyMotion,

    /// Declared and parsed frame counts differ (strict parsing only)
    #[error("Frame count mismatch: header declares {declared}, found {parsed} rows")]
    FrameCountMismatch {
        /// Value of the `Frames:` header
        declared: usize,
        /// Number of rows parsed
        parsed: usize,
    },
}

/// Errors that can occur when working with BVH data
#[derive(Debug, Error)]
pub enum BvhError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source text is not valid BVH
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Joint index outside the skeleton
    #[error("Joint index {index} out of range (skeleton has {len} joints)")]
    JointIndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of joints available
        len: usize,
    },

    /// No joint with the requested name
    #[error("Joint not found: '{0}'")]
    JointNotFound(String),

    /// A frame evaluated against a skeleton of a different width
    #[error("Frame has {found} values but the skeleton expects {expected}")]
    FrameSizeMismatch {
        /// Total channel count of the skeleton
        expected: usize,
        /// Length of the frame
        found: usize,
    },
}

/// Type alias for Results from BVH operations
pub type Result<T> = std::result::Result<T, BvhError>;

/// Non-fatal inconsistencies found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Warning {
    /// `Frames:` disagrees with the number of rows; the rows win
    FrameCountMismatch {
        /// Value of the `Frames:` header
        declared: usize,
        /// Number of rows parsed
        parsed: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameCountMismatch { declared, parsed } => write!(
                f,
                "frame count mismatch: header declares {declared}, found {parsed} rows"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = FormatError::MissingSection { section: "MOTION" };
        assert_eq!(format!("{}", error), "Missing section: 'MOTION' not found");

        let error = BvhError::from(FormatError::ChannelCountMismatch {
            line: 12,
            expected: 9,
            found: 8,
        });
        assert_eq!(
            format!("{}", error),
            "Format error: Channel count mismatch on line 12: expected 9 values, found 8"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::FrameCountMismatch {
            declared: 3,
            parsed: 2,
        };
        assert_eq!(
            warning.to_string(),
            "frame count mismatch: header declares 3, found 2 rows"
        );
    }
}
