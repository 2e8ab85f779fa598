//! The error taxonomy (`spec.md` §7): structural, semantic-policy,
//! capacity, and flow-control failures, plus the `ErrorRecord` that
//! attaches position information to whichever one occurred.

use alloc::string::String;

use thiserror::Error;

use crate::position::Position;

/// One of the named failure modes from `spec.md` §4/§7.
///
/// `Incomplete` is deliberately *not* a variant here: per §7, it is a
/// first-class internal status used only in streaming mode and must never
/// escape `Driver::feed`/`Driver::finish` — the driver always converts it to
/// a successful, still-open state before returning to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// An unrecognized byte, unknown identifier, or unclosed block comment.
    #[error("malformed token")]
    BadToken,
    /// A number lexeme violates the RFC 8259 grammar.
    #[error("malformed number")]
    BadNumber,
    /// A bad `\u` escape, an unpaired surrogate, or invalid UTF-8 in a
    /// string's literal bytes.
    #[error("malformed unicode in string")]
    BadUnicode,
    /// Extra, non-whitespace bytes were found after a complete root value
    /// and `allow_multiple_json_values`/streaming reset is not in effect.
    #[error("trailing garbage after value")]
    TrailingGarbage,
    /// `finish()` was called while one or more containers were still open.
    /// Distinct from the internal, streaming-only `Incomplete` lexer
    /// status described in `spec.md` §7, which never escapes
    /// `feed`/`finish`; this is the externally visible "the document
    /// itself was incomplete" error from that same section's failure
    /// table.
    #[error("unexpected end of input: unterminated container")]
    Unterminated,
    /// `NaN`/`Infinity`/`-Infinity` was recognized but
    /// `allow_nonfinite_numbers` is not set.
    #[error("nonfinite number not allowed")]
    NonFinite,
    /// Nesting exceeded `max_depth`.
    #[error("maximum nesting depth exceeded")]
    Depth,
    /// A resource limit other than depth was exceeded (string length,
    /// number length, container element count, or total input bytes).
    #[error("resource limit exceeded")]
    Limit,
    /// An allocation failed (growable-buffer arithmetic overflowed before
    /// the allocation was attempted, or the allocator itself failed).
    #[error("out of memory")]
    Oom,
    /// `feed`/`finish` was called on a stream already in `Error` or `Done`,
    /// or `finish` was called while containers were still open.
    #[error("invalid operation for current stream state")]
    State,
    /// The event callback returned a non-OK status; the message carries
    /// whatever the callback chose to report, if anything.
    #[error("callback cancelled the stream: {0}")]
    Cancelled(String),
    /// A precondition internal to this crate was violated (for example, a
    /// `TokenBuffer` invariant). Unreachable through the safe public API;
    /// kept only so that debug assertions have a named code to report.
    #[error("internal invariant violated")]
    Invalid,
}

/// A decoded code point together with the raw span it came from, used for
/// the optional ~20-byte-before/after context snippet on an `ErrorRecord`.
const CONTEXT_RADIUS: usize = 20;

/// Everything the caller needs to present a diagnostic: the failure code,
/// a human-readable message, and the position at which it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    /// The failure mode.
    pub code: ErrorCode,
    /// A byte offset, line, and column, saturating on overflow.
    pub position: Position,
    /// A snippet of the input buffer surrounding `position`, along with the
    /// index within the snippet that corresponds to `position` (the caret).
    /// `None` when the failing offset has already scrolled out of the
    /// driver's compacted input buffer (streaming mode only).
    pub context: Option<ContextSnippet>,
}

/// A short window of the input surrounding an error, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnippet {
    /// Up to `CONTEXT_RADIUS` bytes before and after the error offset,
    /// clipped to the currently buffered input.
    pub bytes: alloc::vec::Vec<u8>,
    /// Index within `bytes` of the byte where the error was detected.
    pub caret: usize,
}

impl ErrorRecord {
    pub(crate) fn new(code: ErrorCode, position: Position) -> Self {
        Self {
            code,
            position,
            context: None,
        }
    }

    pub(crate) fn with_context(mut self, buf: &[u8], caret_in_buf: usize) -> Self {
        let start = caret_in_buf.saturating_sub(CONTEXT_RADIUS);
        let end = (caret_in_buf.saturating_add(CONTEXT_RADIUS)).min(buf.len());
        if start <= caret_in_buf && caret_in_buf <= end && end <= buf.len() {
            self.context = Some(ContextSnippet {
                bytes: buf[start..end].to_vec(),
                caret: caret_in_buf - start,
            });
        }
        self
    }
}

/// The error type returned by the public parsing API: an `ErrorRecord`
/// with a `Display` impl derived from its `ErrorCode`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "{} at line {}, column {} (offset {})",
    record.code, record.position.line, record.position.col, record.position.offset
)]
pub struct ParserError {
    /// The underlying error record.
    pub record: ErrorRecord,
}

impl ParserError {
    pub(crate) fn new(code: ErrorCode, position: Position) -> Self {
        Self {
            record: ErrorRecord::new(code, position),
        }
    }

    pub(crate) fn with_context(mut self, buf: &[u8], caret_in_buf: usize) -> Self {
        self.record = self.record.with_context(buf, caret_in_buf);
        self
    }

    /// The error code, for callers that want to match on it directly.
    #[must_use]
    pub fn code(&self) -> &ErrorCode {
        &self.record.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_snippet_clips_to_buffer_bounds() {
        let buf = b"0123456789";
        let err = ParserError::new(ErrorCode::BadToken, Position::start()).with_context(buf, 3);
        let ctx = err.record.context.expect("context computed");
        assert_eq!(ctx.bytes, buf[0..10]);
        assert_eq!(ctx.caret, 3);
    }

    #[test]
    fn display_includes_position() {
        let err = ParserError::new(
            ErrorCode::BadNumber,
            Position {
                offset: 4,
                line: 1,
                col: 5,
            },
        );
        let text = alloc::format!("{err}");
        assert!(text.contains("line 1"));
        assert!(text.contains("column 5"));
        assert!(text.contains("offset 4"));
    }
}
