//! Shared table types and constants for the code page engine

use std::collections::BTreeMap;

use super::grapheme::Grapheme;

/// DOS character emitted when there is no sane way to handle a glyph, `?`.
pub const REPLACEMENT_CHARACTER: u8 = 0x3f;

/// Code page assumed when nothing better is available, United States.
pub const DEFAULT_CODE_PAGE: u16 = 437;

/// Unicode to DOS code page mapping.
pub type ForwardMapping = BTreeMap<Grapheme, u8>;

/// DOS code page to Unicode mapping.
pub type ReverseMapping = BTreeMap<u8, Grapheme>;

/// Unicode 'KD' style decomposition rules, applied transitively.
pub type DecompositionRules = BTreeMap<u16, Grapheme>;

/// Unicode to 7-bit ASCII mapping, used as a last resort.
pub type AsciiFallback = BTreeMap<u16, u8>;

/// How to construct the Unicode mapping for one code page, as declared by
/// the main configuration file.
#[derive(Debug, Default, Clone)]
pub struct CodePageConfig {
    /// Set once the code page was opened with a `CODEPAGE` directive.
    pub valid: bool,
    /// Mapping entries given inline; they take precedence over anything
    /// inherited.
    pub mapping: ReverseMapping,
    /// Code page whose prepared mapping fills the remaining characters.
    pub extends_code_page: Option<u16>,
    /// External mapping file filling the remaining characters, as a
    /// (resource subdirectory, file name) pair.
    pub extends_file: Option<(String, String)>,
}

/// Everything read from the main configuration file.
#[derive(Debug, Default)]
pub struct MainConfig {
    pub mappings: BTreeMap<u16, CodePageConfig>,
    /// Code pages that are bit-identical copies of another one, mapped to
    /// the canonical number that actually gets built.
    pub duplicates: BTreeMap<u16, u16>,
    /// Unicode to Unicode substitutions, tried before the 7-bit ASCII
    /// fallback. Order is preserved and bidirectional aliases appear as
    /// two entries.
    pub aliases: Vec<(u16, u16)>,
}

/// The five lookup tables of a prepared code page.
#[derive(Debug, Default)]
pub struct CodePageTables {
    /// Primary Unicode to DOS lookup.
    pub normalized: ForwardMapping,
    /// Secondary lookup keyed by decomposed graphemes.
    pub decomposed: ForwardMapping,
    /// Cross code point substitutions, normalized keys.
    pub aliases_normalized: ForwardMapping,
    /// Cross code point substitutions, decomposed keys.
    pub aliases_decomposed: ForwardMapping,
    /// DOS to Unicode lookup.
    pub reverse: ReverseMapping,
}
