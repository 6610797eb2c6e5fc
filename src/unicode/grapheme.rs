//! Grapheme value type: a base code point plus its combining marks

use super::models::{DecompositionRules, REPLACEMENT_CHARACTER};

const COMBINING_MARK_RANGES: [(u16, u16); 6] = [
    (0x0300, 0x036f), // Combining Diacritical Marks
    (0x0653, 0x065f), // Arabic Combining Marks
    // Note: Arabic combining marks start from 0x064b, but some are present
    // as standalone characters in Arabic code pages. To allow this, we do
    // not recognize them as combining marks!
    (0x1ab0, 0x1aff), // Combining Diacritical Marks Extended
    (0x1dc0, 0x1dff), // Combining Diacritical Marks Supplement
    (0x20d0, 0x20ff), // Combining Diacritical Marks for Symbols
    (0xfe20, 0xfe2f), // Combining Half Marks
];

/// Whether the code point modifies the preceding base character instead of
/// standing on its own.
pub fn is_combining_mark(code_point: u16) -> bool {
    COMBINING_MARK_RANGES
        .iter()
        .any(|&(first, last)| (first..=last).contains(&code_point))
}

/// One visible character cluster: a base code point plus zero or more
/// combining marks.
///
/// Marks are remembered in insertion order, so text can be reproduced the
/// way its author wrote it, while comparison uses a sorted view of the
/// same marks. The same cluster written with its marks in a different
/// order therefore hits the same mapping table entry.
///
/// A default-constructed grapheme is the *empty* placeholder used for DOS
/// characters that a code page deliberately leaves undefined. A grapheme
/// that would make no sense on a DOS screen (a bare combining mark, or a
/// mark attached to nothing) is *invalid* and carries the replacement
/// character `?` instead.
#[derive(Debug, Clone)]
pub struct Grapheme {
    code_point: u16,
    marks: Vec<u16>,
    marks_sorted: Vec<u16>,
    is_empty: bool,
    is_valid: bool,
}

impl Default for Grapheme {
    fn default() -> Self {
        Grapheme {
            code_point: u16::from(b' '),
            marks: Vec::new(),
            marks_sorted: Vec::new(),
            is_empty: true,
            is_valid: true,
        }
    }
}

impl Grapheme {
    pub fn new(code_point: u16) -> Self {
        let mut grapheme = Grapheme {
            code_point,
            is_empty: false,
            ..Default::default()
        };

        // A combining mark cannot be the base of a grapheme
        if is_combining_mark(code_point) {
            grapheme.invalidate();
        }
        grapheme
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn has_mark(&self) -> bool {
        !self.marks.is_empty()
    }

    /// The base code point.
    pub fn code_point(&self) -> u16 {
        self.code_point
    }

    /// The combining marks, in insertion order.
    pub fn marks(&self) -> &[u16] {
        &self.marks
    }

    /// Append the cluster to a code point sequence, base first, marks in
    /// insertion order. Empty and invalid graphemes contribute nothing.
    pub fn append_to(&self, out: &mut Vec<u16>) {
        if self.is_empty || !self.is_valid {
            return;
        }
        out.push(self.code_point);
        out.extend_from_slice(&self.marks);
    }

    /// Turn the grapheme into the non-empty invalid state: the replacement
    /// character with no marks.
    pub fn invalidate(&mut self) {
        self.is_empty = false;
        self.is_valid = false;

        self.code_point = u16::from(REPLACEMENT_CHARACTER);
        self.marks.clear();
        self.marks_sorted.clear();
    }

    /// Attach a combining mark. Attaching anything to an invalid grapheme
    /// is ignored; attaching a non-mark, or a mark to the empty grapheme,
    /// invalidates it; a mark already present is dropped silently.
    pub fn add_mark(&mut self, code_point: u16) {
        if !self.is_valid {
            return;
        }
        if !is_combining_mark(code_point) || self.is_empty {
            self.invalidate();
            return;
        }
        if self.marks.contains(&code_point) {
            return;
        }

        self.marks.push(code_point);
        self.marks_sorted.push(code_point);
        self.marks_sorted.sort_unstable();
    }

    pub fn strip_marks(&mut self) {
        self.marks.clear();
        self.marks_sorted.clear();
    }

    /// Rewrite the base code point through the decomposition rules until no
    /// rule applies, collecting the marks the rules introduce.
    ///
    /// Termination relies on the rule table being acyclic, which the rule
    /// file format cannot express otherwise.
    pub fn decompose(&mut self, rules: &DecompositionRules) {
        if !self.is_valid || self.is_empty {
            return;
        }

        while let Some(rule) = rules.get(&self.code_point) {
            self.code_point = rule.code_point;
            for &mark in &rule.marks {
                self.add_mark(mark);
            }
        }
    }
}

impl PartialEq for Grapheme {
    fn eq(&self, other: &Self) -> bool {
        self.is_empty == other.is_empty
            && self.is_valid == other.is_valid
            && self.code_point == other.code_point
            && self.marks_sorted == other.marks_sorted
    }
}

impl Eq for Grapheme {}

impl Ord for Grapheme {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.code_point
            .cmp(&other.code_point)
            .then_with(|| self.marks_sorted.len().cmp(&other.marks_sorted.len()))
            .then_with(|| self.marks_sorted.cmp(&other.marks_sorted))
            .then_with(|| {
                // Graphemes agreeing on base and marks agree on the flags
                // everywhere a grapheme is used as a map key; comparing them
                // anyway keeps the total order consistent with equality
                debug_assert_eq!(self.is_empty, other.is_empty);
                debug_assert_eq!(self.is_valid, other.is_valid);
                (self.is_empty, self.is_valid).cmp(&(other.is_empty, other.is_valid))
            })
    }
}

impl PartialOrd for Grapheme {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
