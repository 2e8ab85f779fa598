//! Component C — the number parser (`spec.md` §4.C).
//!
//! Validates a candidate number lexeme against the RFC 8259 grammar (plus
//! the `NaN`/`Infinity`/`-Infinity` extension) and produces whichever of the
//! lexeme/`i64`/`u64`/`f64` representations the caller asked for.

use alloc::string::String;

use crate::error::ErrorCode;
use crate::event::NonFiniteKind;

/// The parsed representations of one number token, before being narrowed
/// down to an [`crate::event::NumberValue`] by the caller's option flags.
#[derive(Debug, Clone)]
pub(crate) struct ParsedNumber {
    pub lexeme: String,
    pub as_i64: Option<i64>,
    pub as_u64: Option<u64>,
    pub as_f64: Option<f64>,
    pub nonfinite: Option<NonFiniteKind>,
}

/// Validates `lexeme` against the RFC 8259 number grammar and computes every
/// representation the grammar supports. Does not itself consult option
/// flags; the caller decides which fields of the result to keep.
///
/// `lexeme` must already be known to consist only of ASCII bytes drawn from
/// `-+.0123456789eE`, as guaranteed by the lexer's character-class
/// admission before a byte is appended to the number's `TokenBuffer`.
pub(crate) fn parse_number(lexeme: &[u8]) -> Result<ParsedNumber, ErrorCode> {
    validate_grammar(lexeme)?;

    let text = core::str::from_utf8(lexeme).map_err(|_| ErrorCode::BadNumber)?;
    let is_pure_integer = !lexeme.contains(&b'.') && !lexeme.contains(&b'e') && !lexeme.contains(&b'E');

    let as_i64 = if is_pure_integer { parse_i64(lexeme) } else { None };
    let as_u64 = if is_pure_integer { parse_u64(lexeme) } else { None };
    let as_f64 = text.parse::<f64>().ok();

    Ok(ParsedNumber {
        lexeme: String::from(text),
        as_i64,
        as_u64,
        as_f64,
        nonfinite: None,
    })
}

/// Builds the [`ParsedNumber`] for one of the three nonfinite extension
/// lexemes. Called by the lexer once it has matched `NaN`, `Infinity`, or
/// `-Infinity` in full; never fails.
pub(crate) fn nonfinite_number(kind: NonFiniteKind) -> ParsedNumber {
    let (lexeme, value) = match kind {
        NonFiniteKind::NaN => ("NaN", f64::NAN),
        NonFiniteKind::Infinity => ("Infinity", f64::INFINITY),
        NonFiniteKind::NegInfinity => ("-Infinity", f64::NEG_INFINITY),
    };
    ParsedNumber {
        lexeme: String::from(lexeme),
        as_i64: None,
        as_u64: None,
        as_f64: Some(value),
        nonfinite: Some(kind),
    }
}

/// Validates the RFC 8259 grammar:
///
/// ```text
/// number  ::= '-'? int frac? exp?
/// int     ::= '0' | [1-9][0-9]*
/// frac    ::= '.' [0-9]+
/// exp     ::= ('e'|'E') ('+'|'-')? [0-9]+
/// ```
fn validate_grammar(lexeme: &[u8]) -> Result<(), ErrorCode> {
    let mut i = 0usize;
    let len = lexeme.len();

    if i < len && lexeme[i] == b'-' {
        i += 1;
    }

    let int_start = i;
    match lexeme.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            i += 1;
            while i < len && lexeme[i].is_ascii_digit() {
                i += 1;
            }
        }
        _ => return Err(ErrorCode::BadNumber),
    }
    if i == int_start {
        return Err(ErrorCode::BadNumber);
    }

    if i < len && lexeme[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < len && lexeme[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return Err(ErrorCode::BadNumber);
        }
    }

    if i < len && matches!(lexeme[i], b'e' | b'E') {
        i += 1;
        if i < len && matches!(lexeme[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < len && lexeme[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return Err(ErrorCode::BadNumber);
        }
    }

    if i != len {
        return Err(ErrorCode::BadNumber);
    }

    Ok(())
}

/// Manual, overflow-checked `i64` parse of a pure-integer lexeme (no `.`,
/// `e`, or `E`). `i64::MIN` is reachable only through its own literal
/// (`-9223372036854775808`), never by negating a positive overflowing
/// magnitude, per `spec.md` §4.C.
fn parse_i64(lexeme: &[u8]) -> Option<i64> {
    let (negative, digits) = match lexeme.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, lexeme),
    };

    if negative {
        let mut magnitude: u64 = 0;
        for &d in digits {
            magnitude = magnitude.checked_mul(10)?.checked_add(u64::from(d - b'0'))?;
        }
        if magnitude == i64::MIN.unsigned_abs() {
            return Some(i64::MIN);
        }
        i64::try_from(magnitude).ok().map(|v| -v)
    } else {
        let mut value: i64 = 0;
        for &d in digits {
            value = value.checked_mul(10)?.checked_add(i64::from(d - b'0'))?;
        }
        Some(value)
    }
}

/// Manual, overflow-checked `u64` parse of a non-negative pure-integer
/// lexeme.
fn parse_u64(lexeme: &[u8]) -> Option<u64> {
    if lexeme.first() == Some(&b'-') {
        return None;
    }
    let mut value: u64 = 0;
    for &d in lexeme {
        value = value.checked_mul(10)?.checked_add(u64::from(d - b'0'))?;
    }
    Some(value)
}
