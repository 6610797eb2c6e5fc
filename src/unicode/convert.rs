//! Conversion engines: grapheme assembly, the fallback chain, and DOS
//! screen code handling

use std::collections::HashSet;

use log::warn;

use super::grapheme::{is_combining_mark, Grapheme};
use super::models::{
    AsciiFallback, CodePageTables, DecompositionRules, ForwardMapping, ReverseMapping,
    REPLACEMENT_CHARACTER,
};

/// Unicode code points for the DOS screen codes 0x00 to 0x1f. Byte 0x00
/// renders as a blank; the rest are the classic CP437 pictograms.
const SCREEN_CODES: [u16; 0x20] = [
    0x0020, 0x263a, 0x263b, 0x2665, // 00-03
    0x2666, 0x2663, 0x2660, 0x2022, // 04-07
    0x25d8, 0x25cb, 0x25d9, 0x2642, // 08-0b
    0x2640, 0x266a, 0x266b, 0x263c, // 0c-0f
    0x25ba, 0x25c4, 0x2195, 0x203c, // 10-13
    0x00b6, 0x00a7, 0x25ac, 0x21a8, // 14-17
    0x2191, 0x2193, 0x2192, 0x2190, // 18-1b
    0x221f, 0x2194, 0x25b2, 0x25bc, // 1c-1f
];

/// DOS renders byte 0x7f as the house symbol.
const CODE_POINT_7F: u16 = 0x2302;

/// Convert decoded code points to DOS characters using the given code page
/// tables, one output character per grapheme. Returns false if any
/// grapheme had to be replaced with `?`.
pub fn wide_to_dos(
    input: &[u16],
    tables: Option<&CodePageTables>,
    ascii: &AsciiFallback,
    rules: &DecompositionRules,
    warned_code_points: &mut HashSet<u16>,
) -> (Vec<u8>, bool) {
    let mut out = Vec::with_capacity(input.len());
    let mut ok = true;

    let mut pos = 0;
    while pos < input.len() {
        // Greedy grapheme assembly: a base plus every directly following
        // combining mark
        let mut grapheme = Grapheme::new(input[pos]);
        while pos + 1 < input.len() && is_combining_mark(input[pos + 1]) {
            pos += 1;
            grapheme.add_mark(input[pos]);
        }
        pos += 1;

        if push_normalized(&mut out, tables, ascii, &grapheme) {
            continue;
        }
        if push_decomposed(&mut out, tables, rules, &grapheme) {
            continue;
        }

        // Last, desperate attempt: decompose and strip the marks
        let original_code_point = grapheme.code_point();
        grapheme.decompose(rules);
        if grapheme.has_mark() {
            grapheme.strip_marks();
            if push_normalized(&mut out, tables, ascii, &grapheme) {
                continue;
            }
        }

        out.push(REPLACEMENT_CHARACTER);
        if warned_code_points.insert(original_code_point) {
            warn!("no fallback mapping for code point 0x{original_code_point:04x}");
        }
        ok = false;
    }

    (out, ok)
}

/// Pure 7-bit ASCII passes through untouched.
fn push_7bit(out: &mut Vec<u8>, grapheme: &Grapheme) -> bool {
    if grapheme.has_mark() || grapheme.code_point() >= 0x80 {
        return false;
    }
    out.push(grapheme.code_point() as u8);
    true
}

fn push_code_page(out: &mut Vec<u8>, mapping: Option<&ForwardMapping>, grapheme: &Grapheme) -> bool {
    let byte = match mapping.and_then(|mapping| mapping.get(grapheme)) {
        Some(&byte) => byte,
        None => return false,
    };
    out.push(byte);
    true
}

/// The last-resort Unicode to 7-bit ASCII substitution.
fn push_ascii_fallback(out: &mut Vec<u8>, ascii: &AsciiFallback, grapheme: &Grapheme) -> bool {
    if grapheme.has_mark() {
        return false;
    }
    let character = match ascii.get(&grapheme.code_point()) {
        Some(&character) => character,
        None => return false,
    };
    out.push(character);
    true
}

fn push_normalized(
    out: &mut Vec<u8>,
    tables: Option<&CodePageTables>,
    ascii: &AsciiFallback,
    grapheme: &Grapheme,
) -> bool {
    push_7bit(out, grapheme)
        || push_code_page(out, tables.map(|tables| &tables.normalized), grapheme)
        || push_code_page(out, tables.map(|tables| &tables.aliases_normalized), grapheme)
        || push_ascii_fallback(out, ascii, grapheme)
}

fn push_decomposed(
    out: &mut Vec<u8>,
    tables: Option<&CodePageTables>,
    rules: &DecompositionRules,
    grapheme: &Grapheme,
) -> bool {
    // Decompose a copy; the mark-stripping fallback after this still needs
    // the original marks
    let mut decomposed = grapheme.clone();
    decomposed.decompose(rules);

    push_code_page(out, tables.map(|tables| &tables.decomposed), &decomposed)
        || push_code_page(out, tables.map(|tables| &tables.aliases_decomposed), &decomposed)
}

/// Convert DOS characters to Unicode code points. Infallible; characters
/// the code page does not map come out as `?`.
pub fn dos_to_wide(input: &[u8], reverse: Option<&ReverseMapping>) -> Vec<u16> {
    let mut out = Vec::with_capacity(input.len());

    for &byte in input {
        if byte >= 0x80 {
            match reverse.and_then(|mapping| mapping.get(&byte)) {
                Some(grapheme) => grapheme.append_to(&mut out),
                None => out.push(u16::from(REPLACEMENT_CHARACTER)),
            }
        } else if byte == 0x7f {
            out.push(CODE_POINT_7F);
        } else if byte >= 0x20 {
            out.push(u16::from(byte));
        } else {
            out.push(SCREEN_CODES[usize::from(byte)]);
        }
    }

    out
}
