//! Stateless UTF-8 codec, limited to the Basic Multilingual Plane

use super::models::REPLACEMENT_CHARACTER;

// Lead byte thresholds
const NON_ASCII: u8 = 0b1000_0000;
const LEAD_2_BYTES: u8 = 0b1100_0000;
const LEAD_3_BYTES: u8 = 0b1110_0000;
const LEAD_4_BYTES: u8 = 0b1111_0000;
const LEAD_5_BYTES: u8 = 0b1111_1000;
const LEAD_6_BYTES: u8 = 0b1111_1100;

// Code point thresholds
const ENCODE_2_BYTES: u16 = 0x0080;
const ENCODE_3_BYTES: u16 = 0x0800;

fn is_continuation(byte: u8) -> bool {
    (NON_ASCII..LEAD_2_BYTES).contains(&byte)
}

/// Consume the byte at `pos` if it is a continuation byte, returning its
/// payload bits. The position only advances past validated bytes.
fn take_continuation(input: &[u8], pos: &mut usize) -> Option<u16> {
    let byte = *input.get(*pos)?;
    if !is_continuation(byte) {
        return None;
    }
    *pos += 1;
    Some(u16::from(byte - NON_ASCII))
}

/// Decode a UTF-8 byte string into a sequence of BMP code points.
///
/// The decoder is deliberately lenient: it never stops on malformed input.
/// 1 to 3 byte forms cover the whole BMP and decode normally. 4, 5 and 6
/// byte forms encode code points the engine cannot represent; their
/// continuation bytes are skipped and a single `?` is produced instead.
/// A stray continuation byte, or a lead byte followed by too few
/// continuation bytes, likewise produces a single `?`.
///
/// Returns the decoded sequence and whether every byte decoded cleanly.
pub fn utf8_to_wide(input: &[u8]) -> (Vec<u16>, bool) {
    let mut out = Vec::with_capacity(input.len());
    let mut ok = true;

    let mut pos = 0;
    while pos < input.len() {
        let lead = input[pos];
        pos += 1;

        if lead < NON_ASCII {
            // 1-byte code point, ASCII compatible
            out.push(u16::from(lead));
        } else if lead < LEAD_2_BYTES {
            // Continuation byte without a lead byte
            out.push(u16::from(REPLACEMENT_CHARACTER));
            ok = false;
        } else if lead < LEAD_3_BYTES {
            match take_continuation(input, &mut pos) {
                Some(low) => out.push(u16::from(lead - LEAD_2_BYTES) << 6 | low),
                None => {
                    out.push(u16::from(REPLACEMENT_CHARACTER));
                    ok = false;
                }
            }
        } else if lead < LEAD_4_BYTES {
            let mut code_point = u32::from(lead - LEAD_3_BYTES);
            let mut complete = true;
            for _ in 0..2 {
                code_point <<= 6;
                match take_continuation(input, &mut pos) {
                    Some(low) => code_point |= u32::from(low),
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                out.push(code_point as u16);
            } else {
                out.push(u16::from(REPLACEMENT_CHARACTER));
                ok = false;
            }
        } else {
            // 4, 5 and 6 byte forms lie beyond the BMP; they are needed
            // mainly for historic scripts and emoji. Skip the continuation
            // bytes and substitute.
            let continuations = if lead >= LEAD_6_BYTES {
                5
            } else if lead >= LEAD_5_BYTES {
                4
            } else {
                3
            };
            let mut taken = 0;
            while taken < continuations && take_continuation(input, &mut pos).is_some() {
                taken += 1;
            }
            out.push(u16::from(REPLACEMENT_CHARACTER));
            ok = false;
        }
    }

    (out, ok)
}

/// Encode a sequence of BMP code points as UTF-8. Infallible.
pub fn wide_to_utf8(input: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() * 2);

    for &code_point in input {
        if code_point < ENCODE_2_BYTES {
            out.push(code_point as u8);
        } else if code_point < ENCODE_3_BYTES {
            out.push(LEAD_2_BYTES | (code_point >> 6) as u8);
            out.push(NON_ASCII | (code_point & 0x3f) as u8);
        } else {
            out.push(LEAD_3_BYTES | (code_point >> 12) as u8);
            out.push(NON_ASCII | (code_point >> 6 & 0x3f) as u8);
            out.push(NON_ASCII | (code_point & 0x3f) as u8);
        }
    }

    out
}
