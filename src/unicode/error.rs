//! Error types for the mapping resource loader

use thiserror::Error;

/// Why a single line of a mapping resource file was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// The line does not match any entry form of the file format.
    #[error("malformed entry")]
    MalformedEntry,

    /// A code page token is not a decimal number between 1 and 65535.
    #[error("invalid code page number")]
    InvalidCodePageNumber,

    /// A `CODEPAGE` directive names a code page that was already defined,
    /// or already recorded as a duplicate.
    #[error("code page already defined")]
    CodePageAlreadyDefined,

    /// A mapping entry or `EXTENDS` directive appeared outside a
    /// `CODEPAGE` block.
    #[error("not currently defining a code page")]
    NoCurrentCodePage,

    /// A decomposition rule lists a mark outside the supported combining
    /// mark ranges. The payload is the 1-based token position.
    #[error("token #{0} is not a supported combining mark")]
    NotACombiningMark(usize),

    /// A mapping entry produced a grapheme that cannot be displayed as a
    /// single DOS character.
    #[error("invalid grapheme")]
    InvalidGrapheme,
}

/// Failure to load one mapping resource file.
///
/// Any error discards everything read from the file; the engine keeps
/// whatever value the affected table had before.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line failed to parse.
    #[error("line {line}: {kind}")]
    Syntax { line: usize, kind: SyntaxErrorKind },

    /// The file parsed but defined nothing.
    #[error("no entries")]
    Empty,
}

/// Convenience `Result` alias for the loader layer.
pub type Result<T> = std::result::Result<T, LoadError>;
