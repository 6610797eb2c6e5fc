//! End to end conversion over the checked-in resource fixtures

use std::path::PathBuf;

use dos_unicode::{EmulatorHost, UnicodeConverter, DEFAULT_CODE_PAGE};

const REPLACEMENT: u8 = 0x3f;

struct FixtureHost {
    code_page: u16,
    ega: bool,
}

impl EmulatorHost for FixtureHost {
    fn resource_path(&self, subdir: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests");
        path.push("data");
        path.push(subdir);
        path
    }

    fn loaded_code_page(&self) -> u16 {
        self.code_page
    }

    fn can_reload_character_set(&self) -> bool {
        self.ega
    }
}

fn converter() -> UnicodeConverter<FixtureHost> {
    converter_for(DEFAULT_CODE_PAGE, true)
}

fn converter_for(code_page: u16, ega: bool) -> UnicodeConverter<FixtureHost> {
    UnicodeConverter::new(FixtureHost { code_page, ega })
}

/// A host whose resource directory does not exist at all.
struct MissingResourcesHost;

impl EmulatorHost for MissingResourcesHost {
    fn resource_path(&self, subdir: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests");
        path.push("data");
        path.push("absent");
        path.push(subdir);
        path
    }

    fn loaded_code_page(&self) -> u16 {
        DEFAULT_CODE_PAGE
    }

    fn can_reload_character_set(&self) -> bool {
        true
    }
}

#[test]
fn pure_ascii_is_transparent() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page(b"Hello", 437),
        (b"Hello".to_vec(), true)
    );

    // Every 7-bit character passes through untouched
    for byte in 0x00..0x80u8 {
        let (out, ok) = converter.utf8_to_dos_with_code_page(&[byte], 437);
        assert!(ok, "byte 0x{byte:02x}");
        assert_eq!(out, vec![byte], "byte 0x{byte:02x}");
    }
}

#[test]
fn screen_codes_render_as_pictograms() {
    let mut converter = converter();
    // Smiley, U+263A
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0x01], 437),
        vec![0xe2, 0x98, 0xba]
    );
    // Byte 0x00 renders as a blank
    assert_eq!(converter.dos_to_utf8_with_code_page(&[0x00], 437), b" ".to_vec());
    // Black down-pointing triangle, U+25BC
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0x1f], 437),
        vec![0xe2, 0x96, 0xbc]
    );
    // The house, U+2302
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0x7f], 437),
        vec![0xe2, 0x8c, 0x82]
    );
}

#[test]
fn precomposed_character_uses_the_normalized_mapping() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page("é".as_bytes(), 437),
        (vec![0x82], true)
    );
}

#[test]
fn combining_sequence_uses_the_decomposed_mapping() {
    let mut converter = converter();
    // 'e' followed by U+0301 combining acute
    assert_eq!(
        converter.utf8_to_dos_with_code_page(b"e\xcc\x81", 437),
        (vec![0x82], true)
    );
}

#[test]
fn euro_sign_falls_back_to_ascii() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page("€".as_bytes(), 437),
        (b"E".to_vec(), true)
    );
}

#[test]
fn emoji_becomes_a_single_replacement() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page(b"\xf0\x9f\x98\x80", 437),
        (vec![REPLACEMENT], false)
    );
}

#[test]
fn unmappable_character_becomes_a_replacement() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page("中".as_bytes(), 437),
        (vec![REPLACEMENT], false)
    );
}

#[test]
fn one_output_character_per_grapheme() {
    let mut converter = converter();
    // Three graphemes: e with two marks, plain A, and an emoji
    let input = "e\u{0301}\u{0308}A😀";
    let (out, ok) = converter.utf8_to_dos_with_code_page(input.as_bytes(), 437);
    assert!(!ok);
    assert_eq!(out, vec![b'e', b'A', REPLACEMENT]);
}

#[test]
fn every_mapped_dos_character_round_trips() {
    let mut converter = converter();
    for byte in 0x80..=0xffu8 {
        let unicode = converter.dos_to_utf8_with_code_page(&[byte], 437);
        let (back, ok) = converter.utf8_to_dos_with_code_page(&unicode, 437);
        assert!(ok, "byte 0x{byte:02x}");
        assert_eq!(back, vec![byte], "byte 0x{byte:02x}");
    }
}

#[test]
fn aliases_substitute_look_alike_code_points() {
    let mut converter = converter();
    // beta -> sharp s, mu -> micro sign
    assert_eq!(
        converter.utf8_to_dos_with_code_page("βμ".as_bytes(), 437),
        (vec![0xe1, 0xe6], true)
    );
    // Ohm sign -> capital omega
    assert_eq!(
        converter.utf8_to_dos_with_code_page("\u{2126}".as_bytes(), 437),
        (vec![0xea], true)
    );
    // Phi symbol -> small phi
    assert_eq!(
        converter.utf8_to_dos_with_code_page("\u{03d5}".as_bytes(), 437),
        (vec![0xed], true)
    );
}

#[test]
fn extending_code_page_inherits_unclaimed_characters() {
    let mut converter = converter();
    // Defined by 850 itself
    assert_eq!(
        converter.utf8_to_dos_with_code_page("ø".as_bytes(), 850),
        (vec![0x9b], true)
    );
    // Inherited from 437
    assert_eq!(
        converter.utf8_to_dos_with_code_page("é".as_bytes(), 850),
        (vec![0x82], true)
    );
    // The alias to o with stroke only works where the target exists
    assert_eq!(
        converter.utf8_to_dos_with_code_page("∅".as_bytes(), 850),
        (vec![0x9b], true)
    );
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0x9b], 850),
        "ø".as_bytes().to_vec()
    );
}

#[test]
fn overridden_characters_do_not_leak_back_in() {
    let mut converter = converter();
    // 850 redefines 0x9b, so the cent sign inherited from 437 has no
    // character left and drops to the ASCII fallback
    assert_eq!(
        converter.utf8_to_dos_with_code_page("¢".as_bytes(), 850),
        (b"c".to_vec(), true)
    );
}

#[test]
fn duplicate_code_pages_share_the_canonical_tables() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page("ø".as_bytes(), 858),
        (vec![0x9b], true)
    );

    let mut converter = converter_for(858, true);
    assert_eq!(converter.utf8_code_page(), 850);
}

#[test]
fn external_mapping_file_defines_a_code_page() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page("ã".as_bytes(), 860),
        (vec![0x84], true)
    );
    assert_eq!(
        converter.utf8_to_dos_with_code_page("Ó".as_bytes(), 860),
        (vec![0x9f], true)
    );
    // 860 has no e acute of its own; the ASCII fallback steps in
    assert_eq!(
        converter.utf8_to_dos_with_code_page("é".as_bytes(), 860),
        (b"e".to_vec(), true)
    );
}

#[test]
fn explicitly_undefined_characters_produce_no_output() {
    let mut converter = converter();
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0xe9], 860),
        Vec::<u8>::new()
    );
    // An entirely unmapped character still produces a replacement
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0xab], 860),
        vec![REPLACEMENT]
    );
}

#[test]
fn unknown_code_page_falls_back_to_the_default() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page("é".as_bytes(), 9999),
        (vec![0x82], true)
    );
}

#[test]
fn code_page_zero_uses_only_the_ascii_fallback() {
    let mut converter = converter();
    assert_eq!(
        converter.utf8_to_dos_with_code_page(b"A", 0),
        (b"A".to_vec(), true)
    );
    assert_eq!(
        converter.utf8_to_dos_with_code_page("é".as_bytes(), 0),
        (b"e".to_vec(), true)
    );
    assert_eq!(
        converter.utf8_to_dos_with_code_page("中".as_bytes(), 0),
        (vec![REPLACEMENT], false)
    );
    // Screen codes still render, the reverse mapping does not
    assert_eq!(
        converter.dos_to_utf8_with_code_page(&[0x01, 0x82], 0),
        vec![0xe2, 0x98, 0xba, REPLACEMENT]
    );
}

#[test]
fn active_code_page_reporting() {
    // The loaded code page wins where the hardware allows it
    assert_eq!(converter_for(860, true).utf8_code_page(), 860);
    // Below EGA the default rules
    assert_eq!(converter_for(860, false).utf8_code_page(), DEFAULT_CODE_PAGE);
    // An unloadable code page degrades to the default
    assert_eq!(converter_for(0, true).utf8_code_page(), DEFAULT_CODE_PAGE);
    assert_eq!(converter_for(9999, true).utf8_code_page(), DEFAULT_CODE_PAGE);
}

#[test]
fn missing_resources_degrade_to_ascii_operation() {
    let mut converter = UnicodeConverter::new(MissingResourcesHost);
    assert_eq!(converter.utf8_code_page(), 0);
    assert_eq!(converter.utf8_to_dos(b"plain"), (b"plain".to_vec(), true));
    assert_eq!(
        converter.utf8_to_dos("é".as_bytes()),
        (vec![REPLACEMENT], false)
    );
}

#[test]
fn no_break_space_prefers_the_code_page_character() {
    let mut converter = converter();
    // U+00A0 is both a 437 character (0xff) and an ASCII fallback entry;
    // the code page mapping must win
    assert_eq!(
        converter.utf8_to_dos_with_code_page("\u{00a0}".as_bytes(), 437),
        (vec![0xff], true)
    );
}

#[test]
fn preparation_is_idempotent() {
    let mut converter = converter();
    let first = converter.utf8_to_dos_with_code_page("é ø ã".as_bytes(), 850);
    let second = converter.utf8_to_dos_with_code_page("é ø ã".as_bytes(), 850);
    assert_eq!(first, second);
}

#[test]
fn mark_order_does_not_change_the_result() {
    let mut converter = converter();
    let forward = converter.utf8_to_dos_with_code_page("e\u{0301}\u{0302}".as_bytes(), 437);
    let reversed = converter.utf8_to_dos_with_code_page("e\u{0302}\u{0301}".as_bytes(), 437);
    assert_eq!(forward, reversed);
}
