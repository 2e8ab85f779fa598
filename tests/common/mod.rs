//! Shared test helpers for `jflow`'s integration test suite.
//!
//! Lives under `tests/common/mod.rs` rather than `tests/common.rs` so Cargo
//! does not treat it as its own integration-test binary.

#![allow(dead_code)]

use core::ops::ControlFlow;

use jflow::{Driver, ErrorCode, Event, ParserError, ParserOptions};

/// Renders one event as a compact, hand-authored (not `#[derive(Debug)]`)
/// string so that expected outputs in snapshot/assertion tests are easy to
/// compute by hand and don't shift whenever `Event`'s derived `Debug`
/// representation does.
pub fn describe(ev: &Event<'_>) -> String {
    match ev {
        Event::ObjectBegin => "ObjectBegin".to_string(),
        Event::ObjectEnd => "ObjectEnd".to_string(),
        Event::ArrayBegin => "ArrayBegin".to_string(),
        Event::ArrayEnd => "ArrayEnd".to_string(),
        Event::Key(s) => format!("Key({s:?})"),
        Event::String(s) => format!("String({s:?})"),
        Event::Bool(b) => format!("Bool({b})"),
        Event::Null => "Null".to_string(),
        Event::Number(n) => match n.lexeme {
            Some(lexeme) => format!("Number({lexeme})"),
            None => "Number(<no lexeme>)".to_string(),
        },
    }
}

/// Feeds `input` to a fresh [`Driver`] in chunks of `chunk_size` bytes (1
/// means byte-at-a-time), rendering each event via [`describe`] and joining
/// the trace with newlines. Always sets `preserve_number_lexeme` so number
/// events render deterministically regardless of what the caller passed.
///
/// # Panics
///
/// Panics if `feed`/`finish` fail; callers that want to assert on an error
/// should use [`trace_result`] instead.
pub fn trace(input: &[u8], chunk_size: usize, mut options: ParserOptions) -> String {
    options.preserve_number_lexeme = true;
    let mut lines: Vec<String> = Vec::new();
    {
        let mut driver = Driver::new(options, |ev: Event<'_>| {
            lines.push(describe(&ev));
            ControlFlow::Continue(())
        });
        for chunk in input.chunks(chunk_size.max(1)) {
            driver.feed(chunk).expect("feed should succeed in trace()");
        }
        driver.finish().expect("finish should succeed in trace()");
    }
    lines.join("\n")
}

/// Like [`trace`], but returns `Err` with the failing [`ErrorCode`] instead
/// of panicking, and the partial trace collected before the failure.
pub fn trace_result(
    input: &[u8],
    chunk_size: usize,
    mut options: ParserOptions,
) -> Result<Vec<String>, (Vec<String>, ErrorCode)> {
    options.preserve_number_lexeme = true;
    let mut lines: Vec<String> = Vec::new();
    let mut failure: Option<ParserError> = None;
    {
        let mut driver = Driver::new(options, |ev: Event<'_>| {
            lines.push(describe(&ev));
            ControlFlow::Continue(())
        });
        'feed: for chunk in input.chunks(chunk_size.max(1)) {
            if let Err(e) = driver.feed(chunk) {
                failure = Some(e);
                break 'feed;
            }
        }
        if failure.is_none() {
            if let Err(e) = driver.finish() {
                failure = Some(e);
            }
        }
    }
    match failure {
        Some(e) => Err((lines, e.code().clone())),
        None => Ok(lines),
    }
}
