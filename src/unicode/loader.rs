//! Importers for the mapping resource file formats
//!
//! All four formats share one line discipline (see [`super::tokens`]) and
//! one failure discipline: any error rejects the whole file, so the caller
//! never observes half-imported data.

use std::collections::btree_map::Entry;
use std::fs;
use std::path::Path;

use super::error::{LoadError, Result, SyntaxErrorKind};
use super::grapheme::{is_combining_mark, Grapheme};
use super::models::{AsciiFallback, DecompositionRules, MainConfig, ReverseMapping};
use super::tokens::{self, SourceLine};

/// Main configuration file within the mapping resource directory.
pub const FILE_NAME_MAIN: &str = "MAIN.TXT";
/// Unicode to 7-bit ASCII fallback table.
pub const FILE_NAME_ASCII: &str = "ASCII.TXT";
/// Decomposition rule table.
pub const FILE_NAME_DECOMPOSITION: &str = "DECOMPOSITION.TXT";
/// Resource subdirectory holding the three files above.
pub const DIR_NAME_MAPPING: &str = "mapping";

fn syntax(line: &SourceLine, kind: SyntaxErrorKind) -> LoadError {
    LoadError::Syntax {
        line: line.number,
        kind,
    }
}

/// Import the main configuration file, describing how to construct the
/// Unicode mapping for each supported code page.
///
/// The format is a stateful mini-language. `CODEPAGE <n>` opens a code
/// page and the byte entries that follow belong to it; `ALIAS`,
/// `CODEPAGE <n> DUPLICATES <m>` and `EXTENDS` directives close it again:
///
/// ```text
/// ALIAS 0x03b2 0x00df BIDIRECTIONAL
///
/// CODEPAGE 437
/// 0x80 0x00c7
/// 0xe1 0x00df
///
/// CODEPAGE 850
/// 0x9b 0x00f8
/// EXTENDS CODEPAGE 437
///
/// CODEPAGE 858 DUPLICATES 850
/// ```
pub fn load_main_config(path: &Path) -> Result<MainConfig> {
    let contents = fs::read(path)?;

    let mut config = MainConfig::default();
    let mut current_code_page: Option<u16> = None;
    let mut has_content = false;

    for line in tokens::tokenize(&contents) {
        let entry_tokens = &line.tokens;

        match entry_tokens[0].as_str() {
            "ALIAS" => {
                let bidirectional = entry_tokens.len() == 4 && entry_tokens[3] == "BIDIRECTIONAL";
                if entry_tokens.len() != 3 && !bidirectional {
                    return Err(syntax(&line, SyntaxErrorKind::MalformedEntry));
                }
                let pair = (
                    tokens::parse_hex_16(&entry_tokens[1]),
                    tokens::parse_hex_16(&entry_tokens[2]),
                );
                let (from, to) = match pair {
                    (Some(from), Some(to)) => (from, to),
                    _ => return Err(syntax(&line, SyntaxErrorKind::MalformedEntry)),
                };

                config.aliases.push((from, to));
                if bidirectional {
                    config.aliases.push((to, from));
                }
                current_code_page = None;
            }

            "CODEPAGE" => {
                if entry_tokens.len() == 4 && entry_tokens[2] == "DUPLICATES" {
                    let pair = (
                        tokens::parse_code_page(&entry_tokens[1]),
                        tokens::parse_code_page(&entry_tokens[3]),
                    );
                    let (duplicate, canonical) = match pair {
                        (Some(duplicate), Some(canonical)) => (duplicate, canonical),
                        _ => return Err(syntax(&line, SyntaxErrorKind::InvalidCodePageNumber)),
                    };
                    if is_defined(&config, duplicate) {
                        return Err(syntax(&line, SyntaxErrorKind::CodePageAlreadyDefined));
                    }

                    config.duplicates.insert(duplicate, canonical);
                    current_code_page = None;
                } else {
                    let code_page = match entry_tokens.len() {
                        2 => tokens::parse_code_page(&entry_tokens[1]),
                        _ => None,
                    };
                    let code_page = match code_page {
                        Some(code_page) => code_page,
                        None => return Err(syntax(&line, SyntaxErrorKind::InvalidCodePageNumber)),
                    };
                    if is_defined(&config, code_page) {
                        return Err(syntax(&line, SyntaxErrorKind::CodePageAlreadyDefined));
                    }

                    config.mappings.entry(code_page).or_default().valid = true;
                    current_code_page = Some(code_page);
                }
            }

            "EXTENDS" => {
                let code_page = match current_code_page {
                    Some(code_page) => code_page,
                    None => return Err(syntax(&line, SyntaxErrorKind::NoCurrentCodePage)),
                };
                let entry = config.mappings.entry(code_page).or_default();

                if entry_tokens.len() == 3 && entry_tokens[1] == "CODEPAGE" {
                    match tokens::parse_code_page(&entry_tokens[2]) {
                        Some(parent) => entry.extends_code_page = Some(parent),
                        None => {
                            return Err(syntax(&line, SyntaxErrorKind::InvalidCodePageNumber))
                        }
                    }
                } else if entry_tokens.len() == 4 && entry_tokens[1] == "FILE" {
                    entry.extends_file =
                        Some((entry_tokens[2].clone(), entry_tokens[3].clone()));
                    has_content = true;
                } else {
                    return Err(syntax(&line, SyntaxErrorKind::MalformedEntry));
                }
                current_code_page = None;
            }

            first => {
                let byte = match tokens::parse_hex_8(first) {
                    Some(byte) => byte,
                    None => return Err(syntax(&line, SyntaxErrorKind::MalformedEntry)),
                };
                let code_page = match current_code_page {
                    Some(code_page) => code_page,
                    None => return Err(syntax(&line, SyntaxErrorKind::NoCurrentCodePage)),
                };

                let mapping = &mut config.mappings.entry(code_page).or_default().mapping;
                if parse_mapping_entry(&line, byte, entry_tokens, mapping, false)? {
                    has_content = true;
                }
            }
        }
    }

    if !has_content {
        return Err(LoadError::Empty);
    }
    Ok(config)
}

fn is_defined(config: &MainConfig, code_page: u16) -> bool {
    config
        .mappings
        .get(&code_page)
        .map_or(false, |entry| entry.valid)
        || config.duplicates.contains_key(&code_page)
}

/// Import one external code page mapping file (DOS character to Unicode),
/// in the format used by the unicode.org code page tables.
pub fn load_code_page_file(path: &Path) -> Result<ReverseMapping> {
    let contents = fs::read(path)?;

    let mut mapping = ReverseMapping::new();
    for line in tokens::tokenize(&contents) {
        let byte = match tokens::parse_hex_8(&line.tokens[0]) {
            Some(byte) => byte,
            None => return Err(syntax(&line, SyntaxErrorKind::MalformedEntry)),
        };
        parse_mapping_entry(&line, byte, &line.tokens, &mut mapping, true)?;
    }

    if mapping.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(mapping)
}

/// Apply one byte entry, either `<hex8>` (explicitly undefined character)
/// or `<hex8> <hex16> [<hex16> [<hex16>]]` (mapped character), to a
/// reverse mapping. Entries for 7-bit ASCII characters are skipped, and an
/// earlier entry for the same character always wins.
///
/// Returns whether the entry contributed anything.
fn parse_mapping_entry(
    line: &SourceLine,
    byte: u8,
    entry_tokens: &[String],
    mapping: &mut ReverseMapping,
    tolerate_overridden_invalid: bool,
) -> Result<bool> {
    if entry_tokens.len() > 4 {
        return Err(syntax(line, SyntaxErrorKind::MalformedEntry));
    }
    if byte < 0x80 {
        // 7-bit ASCII characters keep their meaning in every code page
        return Ok(false);
    }

    if entry_tokens.len() == 1 {
        mapping.entry(byte).or_default();
        return Ok(true);
    }

    let grapheme = match tokens::parse_grapheme(entry_tokens) {
        Some(grapheme) => grapheme,
        None => return Err(syntax(line, SyntaxErrorKind::MalformedEntry)),
    };
    if !tolerate_overridden_invalid && !grapheme.is_valid() {
        return Err(syntax(line, SyntaxErrorKind::InvalidGrapheme));
    }

    let is_valid = grapheme.is_valid();
    let newly_added = match mapping.entry(byte) {
        Entry::Vacant(slot) => {
            slot.insert(grapheme);
            true
        }
        // An invalid grapheme that loses to an earlier entry is fine; at
        // least the CP 1258 table from unicode.org maps characters to bare
        // combining marks, which texts can tolerate but DOS emulation
        // cannot (the number of output characters has to match the number
        // of input characters). Such mappings get overridden in the main
        // configuration file instead.
        Entry::Occupied(_) => false,
    };
    if newly_added && !is_valid {
        return Err(syntax(line, SyntaxErrorKind::InvalidGrapheme));
    }
    Ok(true)
}

/// Import the Unicode to 7-bit ASCII fallback table, consulted when every
/// other lookup fails. Entries are `<hex16> <ascii>`.
pub fn load_ascii_fallback(path: &Path) -> Result<AsciiFallback> {
    let contents = fs::read(path)?;

    let mut mapping = AsciiFallback::new();
    for line in tokens::tokenize(&contents) {
        let entry = if line.tokens.len() == 2 {
            (
                tokens::parse_hex_16(&line.tokens[0]),
                tokens::parse_ascii(&line.tokens[1]),
            )
        } else {
            (None, None)
        };

        match entry {
            (Some(code_point), Some(character)) => {
                mapping.insert(code_point, character);
            }
            _ => return Err(syntax(&line, SyntaxErrorKind::MalformedEntry)),
        }
    }

    if mapping.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(mapping)
}

/// Import the decomposition rules used to match non-normalized input.
///
/// Entries are `<hex16 source> <hex16 base> <hex16 mark>...` with at least
/// one mark; every mark must be a recognized combining mark.
pub fn load_decomposition_rules(path: &Path) -> Result<DecompositionRules> {
    let contents = fs::read(path)?;

    let mut rules = DecompositionRules::new();
    for line in tokens::tokenize(&contents) {
        let entry_tokens = &line.tokens;
        let heads = if entry_tokens.len() >= 3 {
            (
                tokens::parse_hex_16(&entry_tokens[0]),
                tokens::parse_hex_16(&entry_tokens[1]),
            )
        } else {
            (None, None)
        };
        let (source, base) = match heads {
            (Some(source), Some(base)) => (source, base),
            _ => return Err(syntax(&line, SyntaxErrorKind::MalformedEntry)),
        };

        let mut rule = Grapheme::new(base);
        for (index, token) in entry_tokens.iter().enumerate().skip(2) {
            let mark = match tokens::parse_hex_16(token) {
                Some(mark) => mark,
                None => return Err(syntax(&line, SyntaxErrorKind::MalformedEntry)),
            };
            if !is_combining_mark(mark) {
                return Err(syntax(&line, SyntaxErrorKind::NotACombiningMark(index + 1)));
            }
            rule.add_mark(mark);
        }

        rules.insert(source, rule);
    }

    if rules.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(rules)
}
