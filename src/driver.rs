//! Component G — the stream driver (`spec.md` §4.G).
//!
//! Owns the input buffer, the single [`TokenBuffer`], and the grammar state
//! machine, and is the only public entry point to incremental parsing.
//! `free` from `spec.md`'s C-shaped contract needs no code of its own here:
//! it is simply this type's [`Drop`] glue, synthesized by the compiler for
//! its owned `Vec`s and `String`s.

use alloc::vec::Vec;

use crate::error::{ErrorCode, ParserError};
use crate::event::EventSink;
use crate::lexer::{Lexed, Lexer};
use crate::options::ParserOptions;
use crate::position::Position;
use crate::sat::{add_u64, add_usize, mul_usize};
use crate::stream_state::Grammar;
use crate::token_buffer::TokenBuffer;

const LEADING_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
/// Headroom added on top of doubled capacity when the input buffer grows,
/// per `spec.md` §5 "Input buffer: doubling with 1 KiB headroom".
const INPUT_GROWTH_HEADROOM: usize = 1024;

/// The compacted input buffer: `spec.md` §3's `{bytes, used, processed,
/// buffer_start_offset}`.
struct InputBuffer {
    bytes: Vec<u8>,
    used: usize,
    processed: usize,
    buffer_start_offset: u64,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            used: 0,
            processed: 0,
            buffer_start_offset: 0,
        }
    }

    fn append(&mut self, chunk: &[u8]) {
        let needed = add_usize(self.used, chunk.len());
        if self.bytes.len() < needed {
            self.reserve_for(needed);
            self.bytes.resize(needed, 0);
        }
        self.bytes[self.used..needed].copy_from_slice(chunk);
        self.used = needed;
    }

    fn reserve_for(&mut self, needed: usize) {
        if self.bytes.capacity() >= needed {
            return;
        }
        let doubled = mul_usize(self.bytes.capacity().max(1), 2);
        let grown = doubled.max(needed);
        let with_headroom = add_usize(grown, INPUT_GROWTH_HEADROOM);
        self.bytes.reserve(with_headroom.saturating_sub(self.bytes.len()));
    }

    /// Shifts unprocessed bytes down to offset 0 and advances
    /// `buffer_start_offset` by the discarded prefix (`spec.md` §4.G step 1).
    fn compact(&mut self) {
        if self.processed == 0 {
            return;
        }
        self.bytes.copy_within(self.processed..self.used, 0);
        self.used -= self.processed;
        self.bytes.truncate(self.used);
        self.buffer_start_offset = add_u64(self.buffer_start_offset, self.processed as u64);
        self.processed = 0;
    }

    fn unprocessed(&self) -> &[u8] {
        &self.bytes[self.processed..self.used]
    }
}

/// Whether the stream is still accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Done,
    Error,
}

/// Drives an incremental JSON parse, emitting structural events to an
/// [`EventSink`] as tokens complete.
///
/// # Examples
///
/// ```
/// use core::ops::ControlFlow;
/// use jflow::{Driver, Event, ParserOptions};
///
/// let mut seen = 0u32;
/// let mut driver = Driver::new(ParserOptions::default(), |_ev: Event<'_>| {
///     seen += 1;
///     ControlFlow::Continue(())
/// });
/// driver.feed(b"[1, 2, 3]").unwrap();
/// driver.finish().unwrap();
/// assert_eq!(seen, 5); // ArrayBegin, 1, 2, 3, ArrayEnd
/// ```
pub struct Driver<S: EventSink> {
    options: ParserOptions,
    sink: S,
    grammar: Grammar,
    input: InputBuffer,
    token_buffer: TokenBuffer,
    position: Position,
    total_bytes_consumed: u64,
    lifecycle: Lifecycle,
    bom_checked: bool,
}

impl<S: EventSink> Driver<S> {
    /// Builds a new driver around `sink`, which is required (`spec.md`
    /// §4.G's `new(options, callback, user_ptr)`; the opaque user pointer
    /// is simply whatever state the sink closure captures).
    #[must_use]
    pub fn new(options: ParserOptions, sink: S) -> Self {
        Self {
            options,
            sink,
            grammar: Grammar::new(),
            input: InputBuffer::new(),
            token_buffer: TokenBuffer::new(),
            position: Position::start(),
            total_bytes_consumed: 0,
            lifecycle: Lifecycle::Running,
            bom_checked: false,
        }
    }

    /// Appends `chunk` to the input buffer and runs a token-processing pass
    /// over everything unprocessed so far.
    ///
    /// # Errors
    ///
    /// Returns a [`ParserError`] and moves the stream permanently to its
    /// failed state if `chunk` would push total input past
    /// `max_total_bytes`, if the input is malformed, or if the event sink
    /// cancels the stream. Calling `feed` on a stream that has already
    /// reached `Done` or `Error` fails with [`ErrorCode::State`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        self.reject_if_finished()?;

        let max_total = self.options.max_total_bytes() as u64;
        if add_u64(self.total_bytes_consumed, chunk.len() as u64) > max_total {
            return Err(self.fail(ErrorCode::Limit));
        }

        self.input.append(chunk);
        self.total_bytes_consumed = add_u64(self.total_bytes_consumed, chunk.len() as u64);
        self.run_pass(true)
    }

    /// Forces completion of any parked token, drains remaining input, and
    /// verifies the document is well-formed: the nesting stack is empty,
    /// the grammar reached `Done`, and no non-whitespace bytes remain
    /// unconsumed.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::Unterminated`] if containers are still open;
    /// [`ErrorCode::TrailingGarbage`] if extra non-whitespace bytes follow
    /// a complete value; [`ErrorCode::State`] if the stream already
    /// finished or failed.
    pub fn finish(&mut self) -> Result<(), ParserError> {
        self.reject_if_finished()?;

        self.run_pass(false)?;

        if !self.grammar.is_done() {
            return Err(self.fail(ErrorCode::Unterminated));
        }

        if self.input.unprocessed().iter().any(|&b| !b.is_ascii_whitespace()) {
            return Err(self.fail(ErrorCode::TrailingGarbage));
        }

        self.lifecycle = Lifecycle::Done;
        Ok(())
    }

    fn reject_if_finished(&self) -> Result<(), ParserError> {
        match self.lifecycle {
            Lifecycle::Running => Ok(()),
            Lifecycle::Done | Lifecycle::Error => {
                Err(ParserError::new(ErrorCode::State, self.position))
            }
        }
    }

    /// `spec.md` §4.G's token-processing pass, run once per `feed`/`finish`
    /// call. `streaming` is `false` only from `finish`, which forces the
    /// lexer to treat end-of-input as final rather than parking state.
    fn run_pass(&mut self, streaming: bool) -> Result<(), ParserError> {
        self.input.compact();

        if !self.bom_checked {
            match self.consume_leading_bom() {
                BomOutcome::Resolved => self.bom_checked = true,
                BomOutcome::AwaitingMoreBytes => return Ok(()),
            }
            // `consume_leading_bom` advances `processed` directly rather
            // than through a token-processing pass, which would otherwise
            // violate every later `self.input.processed = lexer.cursor()`
            // assignment below: those are only correct when the lexer's
            // slice starts at absolute offset `processed` with `processed`
            // itself at 0. Re-compact so the BOM bytes are physically
            // dropped and that invariant holds again.
            self.input.compact();
        }

        // A number/string can park its bytes in `token_buffer` and still
        // leave `unprocessed()` empty (the whole chunk was consumed just
        // building up the parked lexeme). An empty input buffer alone is
        // not "nothing left to do": `finish()`'s non-streaming pass must
        // still re-enter the lexer to force that parked token to complete.
        if self.input.unprocessed().is_empty() && self.token_buffer.is_empty() {
            return Ok(());
        }

        // Once the grammar has reached `Done`, any further bytes are
        // `finish()`'s concern (trailing garbage vs. trailing whitespace),
        // not this pass's: feeding them to the lexer would re-validate a
        // token against a grammar that has nowhere left to put it, surfacing
        // a `State` error instead of the more specific diagnosis `finish()`
        // is equipped to make.
        if self.grammar.is_done() {
            return Ok(());
        }

        let was_parked = !self.token_buffer.is_empty();
        let mut lexer = Lexer::new(
            self.input.unprocessed(),
            self.position,
            self.options,
            streaming,
            &mut self.token_buffer,
        );

        if was_parked {
            self.grammar.reconcile_for_resumption();
        }

        loop {
            match lexer.next() {
                Ok(Lexed::Eof) => {
                    self.position = lexer.position();
                    self.input.processed = lexer.cursor();
                    return Ok(());
                }
                Ok(Lexed::Incomplete) => {
                    self.position = lexer.position();
                    // `cursor()` is cumulative over the whole pass, so this
                    // is a no-op (still 0) for a keyword prefix left
                    // untouched, and the true consumed count for a
                    // string/number parked mid-token.
                    self.input.processed = lexer.cursor();
                    return Ok(());
                }
                Ok(Lexed::Token(token)) => {
                    self.position = lexer.position();

                    let outcome = self.grammar.step(&token.kind, &self.options);
                    match outcome {
                        Ok(Some(event)) => match self.sink.on_event(event) {
                            core::ops::ControlFlow::Continue(()) => {}
                            core::ops::ControlFlow::Break(code) => {
                                self.input.processed = lexer.cursor();
                                return Err(self.fail(code));
                            }
                        },
                        Ok(None) => {}
                        Err(code) => {
                            // The grammar rejected this token itself, so the
                            // error belongs at the token's own start, not at
                            // `self.position` (already advanced past it).
                            self.input.processed = lexer.cursor();
                            return Err(self.fail_at(code, token.position));
                        }
                    }

                    if self.grammar.is_done() {
                        self.input.processed = lexer.cursor();
                        return Ok(());
                    }
                }
                Err(code) => {
                    self.position = lexer.position();
                    self.input.processed = lexer.cursor();
                    return Err(self.fail(code));
                }
            }
        }
    }

    /// Current nesting depth, exposed only so the fuzz target can assert
    /// that it never exceeds `max_depth` — not part of the public API.
    #[cfg(any(test, feature = "fuzzing"))]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.grammar.depth()
    }

    fn consume_leading_bom(&mut self) -> BomOutcome {
        if !self.options.allow_leading_bom {
            return BomOutcome::Resolved;
        }
        let buf = self.input.unprocessed();
        if buf.len() >= LEADING_BOM.len() {
            if &buf[..LEADING_BOM.len()] == &LEADING_BOM[..] {
                self.input.processed = add_usize(self.input.processed, LEADING_BOM.len());
            }
            return BomOutcome::Resolved;
        }
        if LEADING_BOM.starts_with(buf) {
            return BomOutcome::AwaitingMoreBytes;
        }
        BomOutcome::Resolved
    }

    fn fail(&mut self, code: ErrorCode) -> ParserError {
        self.fail_at(code, self.position)
    }

    /// Like [`Self::fail`], but reports the error at `position` instead of
    /// the driver's current running position — for failures detected only
    /// after a token was fully consumed, where the token's own start is the
    /// more useful diagnostic location.
    fn fail_at(&mut self, code: ErrorCode, position: Position) -> ParserError {
        self.lifecycle = Lifecycle::Error;
        let caret = self.input.processed;
        ParserError::new(code, position).with_context(&self.input.bytes, caret)
    }
}

enum BomOutcome {
    Resolved,
    AwaitingMoreBytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::ops::ControlFlow;

    fn trace(input: &[u8], chunk_size: usize, options: ParserOptions) -> Vec<String> {
        let events = alloc::rc::Rc::new(core::cell::RefCell::new(Vec::new()));
        let events_clone = events.clone();
        let mut driver = Driver::new(options, move |ev: crate::event::Event<'_>| {
            events_clone.borrow_mut().push(format!("{ev:?}"));
            ControlFlow::Continue(())
        });
        for chunk in input.chunks(chunk_size.max(1)) {
            driver.feed(chunk).unwrap();
        }
        driver.finish().unwrap();
        events.borrow().clone()
    }

    #[test]
    fn parses_whole_array_in_one_feed() {
        let events = trace(b"[1,2,3]", 1024, ParserOptions::default());
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn chunking_does_not_change_event_count() {
        let whole = trace(b"{\"a\": [1, true, null, \"s\"]}", 1024, ParserOptions::default());
        let chunked = trace(b"{\"a\": [1, true, null, \"s\"]}", 1, ParserOptions::default());
        assert_eq!(whole.len(), chunked.len());
        assert_eq!(whole, chunked);
    }

    #[test]
    fn minimum_inputs_produce_expected_event_counts() {
        assert_eq!(trace(b"0", 1024, ParserOptions::default()).len(), 1);
        assert_eq!(trace(b"null", 1024, ParserOptions::default()).len(), 1);
        assert_eq!(trace(b"true", 1024, ParserOptions::default()).len(), 1);
        assert_eq!(trace(b"false", 1024, ParserOptions::default()).len(), 1);
        assert_eq!(trace(b"{}", 1024, ParserOptions::default()).len(), 2);
        assert_eq!(trace(b"[]", 1024, ParserOptions::default()).len(), 2);
    }

    #[test]
    fn unterminated_container_fails_finish() {
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        driver.feed(b"[1, 2").unwrap();
        let err = driver.finish().unwrap_err();
        assert_eq!(*err.code(), ErrorCode::Unterminated);
    }

    #[test]
    fn trailing_garbage_after_root_value_fails_finish() {
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        driver.feed(b"null true").unwrap();
        let err = driver.finish().unwrap_err();
        assert_eq!(*err.code(), ErrorCode::TrailingGarbage);
    }

    #[test]
    fn whitespace_after_root_value_is_not_trailing_garbage() {
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        driver.feed(b"null   \n\t").unwrap();
        driver.finish().unwrap();
    }

    #[test]
    fn feed_after_done_is_rejected_with_state() {
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        driver.feed(b"null").unwrap();
        driver.finish().unwrap();
        let err = driver.feed(b"null").unwrap_err();
        assert_eq!(*err.code(), ErrorCode::State);
    }

    #[test]
    fn malformed_token_moves_stream_to_error_and_rejects_further_feeds() {
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        let err = driver.feed(b"nope").unwrap_err();
        assert_eq!(*err.code(), ErrorCode::BadToken);
        let err2 = driver.feed(b"null").unwrap_err();
        assert_eq!(*err2.code(), ErrorCode::State);
    }

    #[test]
    fn callback_cancellation_propagates() {
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| {
            ControlFlow::Break(ErrorCode::Cancelled(String::from("enough")))
        });
        let err = driver.feed(b"[1,2,3]").unwrap_err();
        assert!(matches!(err.code(), ErrorCode::Cancelled(_)));
    }

    #[test]
    fn depth_limit_is_enforced_across_feeds() {
        let opts = ParserOptions {
            max_depth: crate::options::Limit::At(core::num::NonZeroUsize::new(2).unwrap()),
            ..Default::default()
        };
        let mut driver = Driver::new(opts, |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        let err = driver.feed(b"[[[").unwrap_err();
        assert_eq!(*err.code(), ErrorCode::Depth);
    }

    #[test]
    fn leading_bom_is_skipped_when_enabled() {
        let opts = ParserOptions { allow_leading_bom: true, ..Default::default() };
        let mut input = LEADING_BOM.to_vec();
        input.extend_from_slice(b"null");
        let events = trace(&input, 1024, opts);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn leading_bom_rejected_when_disabled() {
        let mut input = LEADING_BOM.to_vec();
        input.extend_from_slice(b"null");
        let mut driver = Driver::new(ParserOptions::default(), |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        let err = driver.feed(&input).unwrap_err();
        assert_eq!(*err.code(), ErrorCode::BadToken);
    }

    #[test]
    fn leading_bom_skipped_before_a_multi_token_document() {
        // Regression test: a BOM ahead of anything bigger than a single
        // root scalar used to corrupt the input buffer's `processed`
        // accounting (the BOM's byte count was silently dropped the
        // moment the first token-processing pass completed), truncating
        // whatever followed the first token.
        let opts = ParserOptions { allow_leading_bom: true, ..Default::default() };
        let mut input = LEADING_BOM.to_vec();
        input.extend_from_slice(b"[1,2,3]");
        let events = trace(&input, 1024, opts);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn leading_bom_split_across_feeds_still_resolves() {
        let opts = ParserOptions { allow_leading_bom: true, ..Default::default() };
        let mut driver = Driver::new(opts, |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        driver.feed(&LEADING_BOM[..1]).unwrap();
        driver.feed(&LEADING_BOM[1..]).unwrap();
        driver.feed(b"null").unwrap();
        driver.finish().unwrap();
    }

    #[test]
    fn total_bytes_limit_is_enforced() {
        let opts = ParserOptions {
            max_total_bytes: crate::options::Limit::At(core::num::NonZeroUsize::new(3).unwrap()),
            ..Default::default()
        };
        let mut driver = Driver::new(opts, |_: crate::event::Event<'_>| ControlFlow::Continue(()));
        let err = driver.feed(b"null").unwrap_err();
        assert_eq!(*err.code(), ErrorCode::Limit);
    }
}
