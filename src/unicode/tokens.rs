//! Line and token scanning shared by all mapping resource formats

use super::grapheme::Grapheme;
use super::models::REPLACEMENT_CHARACTER;

/// Some files from unicode.org mark the end of definitions with a DOS
/// SUB character.
const END_OF_FILE_MARKING: u8 = 0x1a;

/// One token-bearing line of a resource file.
#[derive(Debug)]
pub struct SourceLine {
    /// 1-based line number, for error reporting.
    pub number: usize,
    pub tokens: Vec<String>,
}

/// Split file contents into token-bearing lines.
///
/// `#` starts a comment, tokens are separated by spaces, tabs and carriage
/// returns, and a line starting with the 0x1a end-of-file byte terminates
/// the whole file. Blank and comment-only lines are dropped.
pub fn tokenize(contents: &[u8]) -> Vec<SourceLine> {
    let mut lines = Vec::new();

    for (index, raw_line) in contents.split(|&byte| byte == b'\n').enumerate() {
        if raw_line.first() == Some(&END_OF_FILE_MARKING) {
            break;
        }
        let tokens = split_tokens(raw_line);
        if !tokens.is_empty() {
            lines.push(SourceLine {
                number: index + 1,
                tokens,
            });
        }
    }

    lines
}

fn split_tokens(line: &[u8]) -> Vec<String> {
    let uncommented = match line.iter().position(|&byte| byte == b'#') {
        Some(at) => &line[..at],
        None => line,
    };

    let text = String::from_utf8_lossy(uncommented);
    text.split(|character: char| character == ' ' || character == '\t' || character == '\r')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse an `0xNN` token.
pub fn parse_hex_8(token: &str) -> Option<u8> {
    let digits = token.strip_prefix("0x")?;
    if digits.len() != 2 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

/// Parse an `0xNNNN` token.
pub fn parse_hex_16(token: &str) -> Option<u16> {
    let digits = token.strip_prefix("0x")?;
    if digits.len() != 4 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// Parse a decimal code page number token, 1 to 65535.
pub fn parse_code_page(token: &str) -> Option<u16> {
    if token.is_empty() || token.len() > 5 || !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    match token.parse::<u32>().ok()? {
        value @ 1..=65535 => Some(value as u16),
        _ => None,
    }
}

/// Parse the target of an ASCII fallback entry: a single printable byte,
/// or one of the `SPC`, `HSH`, `NNN` escapes.
pub fn parse_ascii(token: &str) -> Option<u8> {
    match token.as_bytes() {
        [byte] => Some(*byte),
        b"SPC" => Some(b' '),
        b"HSH" => Some(b'#'),
        b"NNN" => Some(REPLACEMENT_CHARACTER),
        _ => None,
    }
}

/// Build a grapheme from the value tokens of a mapping entry: a base code
/// point plus up to two combining marks.
pub fn parse_grapheme(tokens: &[String]) -> Option<Grapheme> {
    if tokens.len() < 2 || tokens.len() > 4 {
        return None;
    }

    let mut grapheme = Grapheme::new(parse_hex_16(&tokens[1])?);
    for token in &tokens[2..] {
        grapheme.add_mark(parse_hex_16(token)?);
    }
    Some(grapheme)
}
