//! Component E — the lexer (`spec.md` §4.E).
//!
//! Consumes bytes from a single compacted buffer slice and produces tokens.
//! In streaming mode it may hand back [`Lexed::Incomplete`] rather than a
//! token, either with state parked in the caller's [`TokenBuffer`] (a string
//! or number that ran off the end of the slice) or with the cursor left
//! untouched (a keyword whose prefix matched but whose remaining bytes
//! haven't arrived yet).
//!
//! A `Lexer` is cheap and short-lived: the driver constructs a fresh one for
//! every token-processing pass over the compacted input buffer (`spec.md`
//! §4.G step 3), so it does not itself persist across `feed` calls — only
//! the driver's [`crate::position::Position`] and [`TokenBuffer`] do.

use alloc::string::String;

use crate::error::ErrorCode;
use crate::event::NonFiniteKind;
use crate::number::{self, ParsedNumber};
use crate::options::ParserOptions;
use crate::position::Position;
use crate::string_decoder::decode_string_interior;
use crate::token_buffer::{NumberParseState, StringParseState, TokenBuffer, TokenBufferKind};

/// The nonfinite-extension literal matched by the number path when a
/// negative sign is immediately followed by `I`.
const NEG_INFINITY: &[u8] = b"-Infinity";

/// One token's payload, independent of position.
#[derive(Debug, Clone)]
pub(crate) enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    Str(String),
    Num(ParsedNumber),
}

impl TokenKind {
    /// Whether this token kind stands for a complete JSON value on its own
    /// (`spec.md` §4.F's "value-token").
    pub(crate) fn is_value(&self) -> bool {
        matches!(
            self,
            TokenKind::Null | TokenKind::True | TokenKind::False | TokenKind::Str(_) | TokenKind::Num(_)
        )
    }
}

/// A recognized token together with the position it was recognized at.
///
/// For a token lexed entirely within one pass, `position` is where it
/// began. For a token resumed from a parked [`TokenBuffer`], the exact
/// historical line/column of its true start is not reconstructable — only
/// `start_offset` survives a chunk boundary (`spec.md` §3) — so `position`
/// instead reflects where this pass picked the token back up. Callers that
/// need the true start offset of a string or number can still recover it
/// from the token buffer before it is cleared.
#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

/// The result of one call to [`Lexer::next`].
pub(crate) enum Lexed {
    /// A complete token.
    Token(Token),
    /// Input ran out mid-token (string/number parked in the `TokenBuffer`)
    /// or mid-keyword (cursor left untouched, prefix still in the driver's
    /// input buffer). Only possible in streaming mode.
    Incomplete,
    /// The input slice is exhausted and no token was in progress.
    Eof,
}

pub(crate) struct Lexer<'a> {
    input: &'a [u8],
    cursor: usize,
    position: Position,
    options: ParserOptions,
    streaming: bool,
    token_buffer: &'a mut TokenBuffer,
}

impl<'a> Lexer<'a> {
    /// Binds a fresh cursor to `input`, starting from `position` (the
    /// driver's running absolute position) and sharing the driver's single
    /// `token_buffer` for resumption.
    pub(crate) fn new(
        input: &'a [u8],
        position: Position,
        options: ParserOptions,
        streaming: bool,
        token_buffer: &'a mut TokenBuffer,
    ) -> Self {
        Self {
            input,
            cursor: 0,
            position,
            options,
            streaming,
            token_buffer,
        }
    }

    /// How many bytes of `input` this lexer has consumed. The driver uses
    /// this as the new `processed` count after a completed or
    /// keyword-parked `Incomplete` pass.
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// The lexer's running position, handed back to the driver to persist
    /// across passes.
    pub(crate) fn position(&self) -> Position {
        self.position
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    fn advance_byte(&mut self) -> u8 {
        let b = self.input[self.cursor];
        self.cursor += 1;
        self.position.advance_byte(b);
        b
    }

    /// Produces the next token, per the dispatch order in `spec.md` §4.E.
    pub(crate) fn next(&mut self) -> Result<Lexed, ErrorCode> {
        if !self.token_buffer.is_empty() {
            return self.resume();
        }

        self.skip_whitespace_and_comments()?;

        let Some(first) = self.peek_byte() else {
            return Ok(Lexed::Eof);
        };

        let start = self.position;
        match first {
            b'{' => {
                self.advance_byte();
                Ok(Lexed::Token(Token { kind: TokenKind::LBrace, position: start }))
            }
            b'}' => {
                self.advance_byte();
                Ok(Lexed::Token(Token { kind: TokenKind::RBrace, position: start }))
            }
            b'[' => {
                self.advance_byte();
                Ok(Lexed::Token(Token { kind: TokenKind::LBracket, position: start }))
            }
            b']' => {
                self.advance_byte();
                Ok(Lexed::Token(Token { kind: TokenKind::RBracket, position: start }))
            }
            b':' => {
                self.advance_byte();
                Ok(Lexed::Token(Token { kind: TokenKind::Colon, position: start }))
            }
            b',' => {
                self.advance_byte();
                Ok(Lexed::Token(Token { kind: TokenKind::Comma, position: start }))
            }
            b'"' => self.lex_string(b'"'),
            b'\'' if self.options.allow_single_quotes => self.lex_string(b'\''),
            b'-' => self.lex_number_or_neg_infinity(),
            b'0'..=b'9' => self.lex_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_keyword(),
            _ => Err(ErrorCode::BadToken),
        }
    }

    /// Dispatches into whichever resumption path the parked `TokenBuffer`
    /// indicates (`spec.md` §4.E step 1).
    fn resume(&mut self) -> Result<Lexed, ErrorCode> {
        match self.token_buffer.kind() {
            TokenBufferKind::PartialString(state) => self.continue_string(state),
            TokenBufferKind::PartialNumber(_) if is_neg_infinity_prefix(self.token_buffer.bytes()) => {
                self.continue_neg_infinity()
            }
            // A chunk boundary can fall immediately after the lone leading
            // `-`, before even seeing a second byte: the buffer holds just
            // `-` and the previous pass could not yet tell a negative
            // number from `-Infinity` apart. Re-run that same one-byte
            // lookahead now that a new chunk has arrived.
            TokenBufferKind::PartialNumber(_)
                if self.token_buffer.bytes() == b"-" && self.peek_byte() == Some(b'I') =>
            {
                self.continue_neg_infinity()
            }
            TokenBufferKind::PartialNumber(state) => self.continue_number(state),
            TokenBufferKind::None => Err(ErrorCode::Invalid),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ErrorCode> {
        loop {
            while matches!(self.peek_byte(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                self.advance_byte();
            }

            if !self.options.allow_comments {
                return Ok(());
            }

            if self.input[self.cursor..].starts_with(b"//") {
                self.advance_byte();
                self.advance_byte();
                while !matches!(self.peek_byte(), None | Some(b'\n')) {
                    self.advance_byte();
                }
                continue;
            }

            if self.input[self.cursor..].starts_with(b"/*") {
                self.advance_byte();
                self.advance_byte();
                loop {
                    if self.input[self.cursor..].starts_with(b"*/") {
                        self.advance_byte();
                        self.advance_byte();
                        break;
                    }
                    if self.peek_byte().is_none() {
                        return Err(ErrorCode::BadToken);
                    }
                    self.advance_byte();
                }
                continue;
            }

            return Ok(());
        }
    }

    // ---------------------------------------------------------------
    // Strings
    // ---------------------------------------------------------------

    fn lex_string(&mut self, opening: u8) -> Result<Lexed, ErrorCode> {
        let start_offset = self.position.offset;
        self.advance_byte();
        self.token_buffer.init_string(opening, start_offset);
        self.continue_string(StringParseState::default())
    }

    fn continue_string(&mut self, mut state: StringParseState) -> Result<Lexed, ErrorCode> {
        let start = self.position;
        let opening = self.token_buffer.bytes()[0];
        let max_string_bytes = self.options.max_string_bytes();

        loop {
            let Some(b) = self.peek_byte() else {
                if self.streaming {
                    self.token_buffer.set_string_state(state);
                    return Ok(Lexed::Incomplete);
                }
                return Err(ErrorCode::BadToken);
            };

            if state.unicode_hex_remaining > 0 {
                if !b.is_ascii_hexdigit() {
                    return Err(ErrorCode::BadUnicode);
                }
                state.unicode_hex_remaining -= 1;
                self.advance_byte();
                self.append_string_byte(b, max_string_bytes)?;
                continue;
            }

            if state.in_escape {
                if b == b'u' {
                    state.unicode_hex_remaining = 4;
                }
                state.in_escape = false;
                self.advance_byte();
                self.append_string_byte(b, max_string_bytes)?;
                continue;
            }

            if b == b'\\' {
                state.in_escape = true;
                self.advance_byte();
                self.append_string_byte(b, max_string_bytes)?;
                continue;
            }

            if b == opening {
                self.advance_byte();
                let interior = &self.token_buffer.bytes()[1..];
                let decoded = decode_string_interior(
                    interior,
                    self.options.validate_utf8,
                    self.options.allow_unescaped_controls,
                )?;
                self.token_buffer.clear();
                return Ok(Lexed::Token(Token {
                    kind: TokenKind::Str(decoded),
                    position: start,
                }));
            }

            self.advance_byte();
            self.append_string_byte(b, max_string_bytes)?;
        }
    }

    fn append_string_byte(&mut self, b: u8, max_string_bytes: usize) -> Result<(), ErrorCode> {
        if self.token_buffer.bytes().len() >= max_string_bytes {
            return Err(ErrorCode::Limit);
        }
        self.token_buffer.append_byte(b);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Numbers
    // ---------------------------------------------------------------

    fn lex_number_or_neg_infinity(&mut self) -> Result<Lexed, ErrorCode> {
        let start_offset = self.position.offset;
        self.advance_byte();
        self.token_buffer.init_number(b'-', start_offset);
        if self.peek_byte() == Some(b'I') {
            self.continue_neg_infinity()
        } else {
            self.continue_number(NumberParseState {
                starts_with_minus: true,
                ..NumberParseState::default()
            })
        }
    }

    fn lex_number(&mut self) -> Result<Lexed, ErrorCode> {
        let start_offset = self.position.offset;
        let first = self.advance_byte();
        self.token_buffer.init_number(first, start_offset);
        self.continue_number(NumberParseState::default())
    }

    fn continue_number(&mut self, mut state: NumberParseState) -> Result<Lexed, ErrorCode> {
        let start = self.position;
        let max_number_bytes = self.options.max_number_bytes();

        loop {
            let Some(b) = self.peek_byte() else {
                // Every byte a number token can contain (a digit, `.`,
                // `e`/`E`, or a sign) is one that a following chunk could
                // still extend, so a streaming EOF here is always
                // `Incomplete`; `finish()` is what forces completion.
                if self.streaming {
                    self.token_buffer.set_number_state(state);
                    return Ok(Lexed::Incomplete);
                }
                return self.finish_number(start);
            };

            let last = *self.token_buffer.bytes().last().expect("number buffer non-empty");
            let accept = match b {
                b'0'..=b'9' => true,
                b'.' if !state.has_dot && !state.has_exp => {
                    state.has_dot = true;
                    true
                }
                b'e' | b'E' if !state.has_exp => {
                    state.has_exp = true;
                    true
                }
                b'+' | b'-' if state.has_exp && !state.exp_sign_seen && matches!(last, b'e' | b'E') => {
                    state.exp_sign_seen = true;
                    true
                }
                _ => false,
            };

            if !accept {
                return self.finish_number(start);
            }

            if self.token_buffer.bytes().len() >= max_number_bytes {
                return Err(ErrorCode::Limit);
            }
            self.advance_byte();
            self.token_buffer.append_byte(b);
        }
    }

    fn finish_number(&mut self, start: Position) -> Result<Lexed, ErrorCode> {
        let lexeme = self.token_buffer.bytes();
        let parsed = number::parse_number(lexeme)?;
        self.token_buffer.clear();
        Ok(Lexed::Token(Token {
            kind: TokenKind::Num(parsed),
            position: start,
        }))
    }

    fn continue_neg_infinity(&mut self) -> Result<Lexed, ErrorCode> {
        let start = self.position;
        loop {
            let confirmed = self.token_buffer.bytes().len();
            if confirmed == NEG_INFINITY.len() {
                self.token_buffer.clear();
                if !self.options.allow_nonfinite_numbers {
                    return Err(ErrorCode::NonFinite);
                }
                return Ok(Lexed::Token(Token {
                    kind: TokenKind::Num(number::nonfinite_number(NonFiniteKind::NegInfinity)),
                    position: start,
                }));
            }

            match self.peek_byte() {
                None => {
                    if self.streaming {
                        return Ok(Lexed::Incomplete);
                    }
                    return Err(ErrorCode::BadNumber);
                }
                Some(b) if b == NEG_INFINITY[confirmed] => {
                    self.advance_byte();
                    self.token_buffer.append_byte(b);
                }
                Some(_) => return Err(ErrorCode::BadNumber),
            }
        }
    }

    // ---------------------------------------------------------------
    // Keywords (null/true/false and the NaN/Infinity extension)
    // ---------------------------------------------------------------

    fn lex_keyword(&mut self) -> Result<Lexed, ErrorCode> {
        let start = self.position;
        let remaining = &self.input[self.cursor..];
        let first = remaining[0];

        let (literal, kind): (&'static [u8], KeywordKind) = match first {
            b'n' => (b"null", KeywordKind::Null),
            b't' => (b"true", KeywordKind::True),
            b'f' => (b"false", KeywordKind::False),
            b'N' => (b"NaN", KeywordKind::NaN),
            b'I' => (b"Infinity", KeywordKind::Infinity),
            _ => return Err(ErrorCode::BadToken),
        };

        if remaining.len() < literal.len() {
            if literal.starts_with(remaining) {
                if self.streaming {
                    return Ok(Lexed::Incomplete);
                }
                return Err(ErrorCode::BadToken);
            }
            return Err(ErrorCode::BadToken);
        }

        if &remaining[..literal.len()] != literal {
            return Err(ErrorCode::BadToken);
        }

        for _ in 0..literal.len() {
            self.advance_byte();
        }

        let token_kind = match kind {
            KeywordKind::Null => TokenKind::Null,
            KeywordKind::True => TokenKind::True,
            KeywordKind::False => TokenKind::False,
            KeywordKind::NaN => {
                if !self.options.allow_nonfinite_numbers {
                    return Err(ErrorCode::NonFinite);
                }
                TokenKind::Num(number::nonfinite_number(NonFiniteKind::NaN))
            }
            KeywordKind::Infinity => {
                if !self.options.allow_nonfinite_numbers {
                    return Err(ErrorCode::NonFinite);
                }
                TokenKind::Num(number::nonfinite_number(NonFiniteKind::Infinity))
            }
        };

        Ok(Lexed::Token(Token { kind: token_kind, position: start }))
    }
}

enum KeywordKind {
    Null,
    True,
    False,
    NaN,
    Infinity,
}

fn is_neg_infinity_prefix(bytes: &[u8]) -> bool {
    bytes.first() == Some(&b'-') && bytes.get(1) == Some(&b'I')
}
