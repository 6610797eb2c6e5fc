//! # UTF-8 to DOS code page text conversion
//!
//! DOS programs live in a single-byte world: one of the classic code pages
//! (437, 850, 852, ...) decides which glyph every byte above 0x7f shows.
//! The host side of an emulator speaks UTF-8. This crate converts text
//! across that boundary in both directions, driven by declarative mapping
//! resource files in the format popularized by the unicode.org code page
//! tables.
//!
//! * **UTF-8 to DOS** assembles combining sequences into graphemes and
//!   walks a fallback chain per grapheme: the code page mapping
//!   (normalized, then decomposed), configured look-alike aliases, a 7-bit
//!   ASCII substitution table, and mark stripping. Exactly one DOS
//!   character comes out per grapheme; whatever cannot be represented at
//!   all becomes `?`.
//! * **DOS to UTF-8** uses the reverse mapping and also renders the
//!   screen-code pictograms DOS shows for bytes 0x00 to 0x1f (the smiley,
//!   card suits, arrows and friends).
//!
//! Code pages are described in a main configuration file which can define
//! characters inline, inherit from another code page, pull in external
//! mapping files, and declare bit-identical duplicates; everything is
//! parsed and built lazily on first use.
//!
//! The embedding emulator supplies its side of the contract through the
//! [`EmulatorHost`] trait: where resource files live, which code page the
//! emulated DOS has loaded, and whether the emulated video adapter can
//! load character sets at all.
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use dos_unicode::{EmulatorHost, UnicodeConverter};
//!
//! struct Host;
//!
//! impl EmulatorHost for Host {
//!     fn resource_path(&self, subdir: &str) -> PathBuf {
//!         PathBuf::from("resources").join(subdir)
//!     }
//!     fn loaded_code_page(&self) -> u16 {
//!         437
//!     }
//!     fn can_reload_character_set(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let mut converter = UnicodeConverter::new(Host);
//! let (dos, ok) = converter.utf8_to_dos("Zażółć gęślą jaźń".as_bytes());
//! assert!(ok);
//! assert_eq!(dos.len(), "Zażółć gęślą jaźń".chars().count());
//! ```

pub mod unicode;

pub use unicode::{
    is_combining_mark, utf8_to_wide, wide_to_utf8, DecompositionRules, EmulatorHost, Grapheme,
    LoadError, SyntaxErrorKind, UnicodeConverter, DEFAULT_CODE_PAGE, REPLACEMENT_CHARACTER,
};
