//! Per code page construction of the lookup tables

use std::collections::{HashMap, HashSet};

use log::{error, warn};

use super::grapheme::Grapheme;
use super::loader;
use super::models::{CodePageTables, DecompositionRules, ForwardMapping, MainConfig};
use super::EmulatorHost;

/// Lazily built code page tables, plus a record of every construction
/// attempt. A failed attempt is never retried; the same record also breaks
/// circular `EXTENDS CODEPAGE` chains.
#[derive(Debug, Default)]
pub struct MappingCache {
    tables: HashMap<u16, CodePageTables>,
    attempted: HashSet<u16>,
}

impl MappingCache {
    pub fn get(&self, code_page: u16) -> Option<&CodePageTables> {
        self.tables.get(&code_page)
    }
}

/// Resolve a code page that is a bit-identical duplicate of another one to
/// the canonical number that actually gets built.
pub fn resolve_duplicate(config: &MainConfig, code_page: u16) -> u16 {
    config
        .duplicates
        .get(&code_page)
        .copied()
        .unwrap_or(code_page)
}

/// Make sure the tables for `code_page` exist, building them on first
/// request. Returns false for code pages the configuration does not know
/// and for code pages whose construction has ever failed.
pub fn prepare<H: EmulatorHost>(
    cache: &mut MappingCache,
    code_page: u16,
    config: &MainConfig,
    rules: &DecompositionRules,
    host: &H,
) -> bool {
    if cache.tables.contains_key(&code_page) {
        return true;
    }
    if !config.mappings.contains_key(&code_page) {
        return false;
    }
    if !cache.attempted.insert(code_page) {
        // Either a previous attempt failed, or we arrived back here
        // through a circular EXTENDS CODEPAGE chain
        return false;
    }

    let mut tables = match construct_tables(cache, code_page, config, rules, host) {
        Some(tables) => tables,
        None => return false,
    };
    construct_aliases(&mut tables, &config.aliases, rules);

    cache.tables.insert(code_page, tables);
    true
}

fn construct_tables<H: EmulatorHost>(
    cache: &mut MappingCache,
    code_page: u16,
    config: &MainConfig,
    rules: &DecompositionRules,
    host: &H,
) -> Option<CodePageTables> {
    let entry = config.mappings.get(&code_page)?;
    let mut tables = CodePageTables::default();

    // Entries from the main configuration file take precedence
    for (&byte, grapheme) in &entry.mapping {
        add_pair(&mut tables, code_page, byte, grapheme);
    }

    // A code page extending another one inherits every character it does
    // not redefine itself
    if let Some(parent) = entry.extends_code_page {
        let parent = resolve_duplicate(config, parent);
        if !prepare(cache, parent, config, rules, host) {
            error!("code page {code_page} mapping requires code page {parent} mapping");
            return None;
        }
        let parent_tables = cache.tables.get(&parent)?;
        for (grapheme, &byte) in &parent_tables.normalized {
            add_pair(&mut tables, code_page, byte, grapheme);
        }
    }

    // Remaining characters can come from an external mapping file
    if let Some((subdir, file_name)) = &entry.extends_file {
        let path = host.resource_path(subdir).join(file_name);
        match loader::load_code_page_file(&path) {
            Ok(imported) => {
                for (&byte, grapheme) in &imported {
                    add_pair(&mut tables, code_page, byte, grapheme);
                }
            }
            Err(err) => {
                error!("could not use mapping file {}: {}", path.display(), err);
                return None;
            }
        }
    }

    tables.decomposed = decomposed_from(&tables.normalized, rules);
    Some(tables)
}

/// Insert one (DOS character, grapheme) pair into both lookup directions;
/// the first writer wins. Characters below 0x80 always keep their ASCII
/// meaning and are skipped.
fn add_pair(tables: &mut CodePageTables, code_page: u16, byte: u8, grapheme: &Grapheme) {
    if byte < 0x80 {
        return;
    }
    if tables.reverse.contains_key(&byte) {
        return;
    }
    tables.reverse.insert(byte, grapheme.clone());

    if grapheme.is_empty() || !grapheme.is_valid() {
        return;
    }
    if tables.normalized.contains_key(grapheme) {
        warn!("mapping for code page {code_page} uses a code point twice; character 0x{byte:02x}");
        return;
    }
    tables.normalized.insert(grapheme.clone(), byte);
}

/// Derive a decomposed lookup table: only graphemes that decomposition
/// actually changes get an entry.
fn decomposed_from(normalized: &ForwardMapping, rules: &DecompositionRules) -> ForwardMapping {
    let mut decomposed = ForwardMapping::new();

    for (grapheme, &byte) in normalized {
        let mut candidate = grapheme.clone();
        candidate.decompose(rules);
        if candidate != *grapheme {
            decomposed.insert(candidate, byte);
        }
    }

    decomposed
}

/// Derive the alias tables: substitutions for code points the code page
/// itself cannot represent.
fn construct_aliases(tables: &mut CodePageTables, aliases: &[(u16, u16)], rules: &DecompositionRules) {
    for &(from, to) in aliases {
        let substitute = Grapheme::new(from);
        if tables.normalized.contains_key(&substitute) {
            continue;
        }
        let byte = match tables.normalized.get(&Grapheme::new(to)) {
            Some(&byte) => byte,
            None => continue,
        };
        tables.aliases_normalized.entry(substitute).or_insert(byte);
    }

    tables.aliases_decomposed = decomposed_from(&tables.aliases_normalized, rules);
}
