//! Component B — the string decoder (`spec.md` §4.B).
//!
//! Decodes the *interior* of a JSON string (the bytes between, but not
//! including, the opening and closing quotes) once the lexer has already
//! assembled them into one contiguous region, whether that assembly
//! happened in a single chunk or was resumed across several.

use alloc::string::String;

use crate::error::ErrorCode;

/// Decodes a JSON string's interior bytes into an owned, valid-UTF-8
/// `String`.
///
/// - Literal bytes pass through unchanged, subject to UTF-8 validation.
/// - The eight short escapes (`\" \\ \/ \b \f \n \r \t`) decode to their
///   obvious single byte.
/// - `\uXXXX` decodes to a Unicode code point; a high surrogate must be
///   immediately followed by a matching low surrogate escape, and the pair
///   is re-encoded as the single supplementary code point it represents. An
///   unpaired high or low surrogate is a decode error.
/// - Unescaped ASCII control characters (`U+0000..=U+001F`) are rejected
///   unless `allow_unescaped_controls` is set.
pub(crate) fn decode_string_interior(
    interior: &[u8],
    validate_utf8: bool,
    allow_unescaped_controls: bool,
) -> Result<String, ErrorCode> {
    let mut out = String::with_capacity(interior.len());
    let mut i = 0usize;
    let mut pending_high_surrogate: Option<u16> = None;

    while i < interior.len() {
        let b = interior[i];
        if b == b'\\' {
            if pending_high_surrogate.is_some() && interior.get(i + 1) != Some(&b'u') {
                return Err(ErrorCode::BadUnicode);
            }
            i += 1;
            let Some(&esc) = interior.get(i) else {
                return Err(ErrorCode::BadUnicode);
            };
            match esc {
                b'"' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('"');
                    i += 1;
                }
                b'\\' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('\\');
                    i += 1;
                }
                b'/' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('/');
                    i += 1;
                }
                b'b' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('\u{0008}');
                    i += 1;
                }
                b'f' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('\u{000C}');
                    i += 1;
                }
                b'n' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('\n');
                    i += 1;
                }
                b'r' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('\r');
                    i += 1;
                }
                b't' => {
                    check_no_pending_surrogate(&pending_high_surrogate)?;
                    out.push('\t');
                    i += 1;
                }
                b'u' => {
                    i += 1;
                    let unit = parse_four_hex_digits(interior, i)?;
                    i += 4;

                    if let Some(high) = pending_high_surrogate.take() {
                        if !(0xDC00..=0xDFFF).contains(&unit) {
                            return Err(ErrorCode::BadUnicode);
                        }
                        let code = 0x10000
                            + (u32::from(high) - 0xD800) * 0x400
                            + (u32::from(unit) - 0xDC00);
                        let ch = char::from_u32(code).ok_or(ErrorCode::BadUnicode)?;
                        out.push(ch);
                    } else if (0xD800..=0xDBFF).contains(&unit) {
                        pending_high_surrogate = Some(unit);
                    } else if (0xDC00..=0xDFFF).contains(&unit) {
                        // Unpaired low surrogate.
                        return Err(ErrorCode::BadUnicode);
                    } else {
                        let ch = char::from_u32(u32::from(unit)).ok_or(ErrorCode::BadUnicode)?;
                        out.push(ch);
                    }
                }
                _ => return Err(ErrorCode::BadUnicode),
            }
        } else {
            check_no_pending_surrogate(&pending_high_surrogate)?;

            let run_start = i;
            while i < interior.len() && interior[i] != b'\\' {
                i += 1;
            }
            let run = &interior[run_start..i];

            if !allow_unescaped_controls {
                if let Some(&ctrl) = run.iter().find(|&&c| c <= 0x1F) {
                    let _ = ctrl;
                    return Err(ErrorCode::BadToken);
                }
            }

            push_utf8_run(&mut out, run, validate_utf8)?;
        }
    }

    check_no_pending_surrogate(&pending_high_surrogate)?;
    Ok(out)
}

fn check_no_pending_surrogate(pending: &Option<u16>) -> Result<(), ErrorCode> {
    if pending.is_some() {
        Err(ErrorCode::BadUnicode)
    } else {
        Ok(())
    }
}

fn parse_four_hex_digits(bytes: &[u8], at: usize) -> Result<u16, ErrorCode> {
    let digits = bytes.get(at..at + 4).ok_or(ErrorCode::BadUnicode)?;
    let mut value: u16 = 0;
    for &d in digits {
        let nibble = match d {
            b'0'..=b'9' => d - b'0',
            b'a'..=b'f' => d - b'a' + 10,
            b'A'..=b'F' => d - b'A' + 10,
            _ => return Err(ErrorCode::BadUnicode),
        };
        value = value * 16 + u16::from(nibble);
    }
    Ok(value)
}

fn push_utf8_run(out: &mut String, run: &[u8], validate_utf8: bool) -> Result<(), ErrorCode> {
    if run.is_empty() {
        return Ok(());
    }
    match core::str::from_utf8(run) {
        Ok(s) => {
            out.push_str(s);
            Ok(())
        }
        Err(_) if validate_utf8 => Err(ErrorCode::BadUnicode),
        Err(_) => {
            out.push_str(&String::from_utf8_lossy(run));
            Ok(())
        }
    }
}
