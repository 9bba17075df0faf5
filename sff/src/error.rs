//! Errors that occur while converting a font

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationReport;

/// An error that aborts a conversion.
///
/// Every failure is terminal: no partial container is ever produced.
#[derive(Debug, Error)]
pub enum Error {
    /// A path contained a character that is neither a command nor a number.
    #[error("Could not parse path at byte {position}: '{fragment}'")]
    MalformedPath { position: usize, fragment: String },

    /// A coordinate was too long to be read back as a single operand.
    #[error("Coordinate {0} is too long to encode")]
    OperandTooLong(String),

    #[error("Precision {precision} is out of range (at most {max} decimal places)")]
    InvalidPrecision { precision: u32, max: u32 },

    /// None of the requested code points exist in the font.
    #[error("Font did not have any of the selected characters: {}", path.display())]
    EmptySubset { path: PathBuf },

    /// A value did not fit the wire format of the field it is packed into.
    #[error("Packing failed: {0}")]
    Packing(ValidationReport),

    /// The font file could not be opened or parsed.
    #[error("Unable to read font file {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// A glyph outline could not be extracted from the font.
    #[error("Unable to draw outline for U+{code_point:04X}: {reason}")]
    Outline { code_point: u32, reason: String },

    #[error("Charset not defined: {0}")]
    UnknownCharset(String),

    #[error("Invalid code point {0}")]
    InvalidCodePoint(String),

    #[error("Invalid code point range {start:X}-{end:X}")]
    InvalidRange { start: u32, end: u32 },

    #[error("Unable to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ValidationReport> for Error {
    fn from(report: ValidationReport) -> Self {
        Error::Packing(report)
    }
}
