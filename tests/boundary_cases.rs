//! Table-driven boundary-case tests: the minimum recognized inputs, and the
//! edges of `max_depth` and the leading-BOM option.

mod common;

use core::num::NonZeroUsize;
use core::ops::ControlFlow;

use jflow::{Driver, ErrorCode, Event, Limit, ParserOptions};
use rstest::rstest;

#[rstest]
#[case::zero(b"0", 1)]
#[case::null(b"null", 1)]
#[case::bool_true(b"true", 1)]
#[case::bool_false(b"false", 1)]
#[case::empty_object(b"{}", 2)]
#[case::empty_array(b"[]", 2)]
fn minimum_input_produces_expected_event_count(#[case] input: &[u8], #[case] expected_events: usize) {
    let trace = common::trace(input, 1024, ParserOptions::default());
    let actual = if trace.is_empty() { 0 } else { trace.lines().count() };
    assert_eq!(actual, expected_events, "input {input:?}");
}

#[test]
fn exactly_max_depth_nested_arrays_succeeds() {
    let depth = 4usize;
    let opts = ParserOptions { max_depth: Limit::At(NonZeroUsize::new(depth).unwrap()), ..Default::default() };
    let mut input = Vec::new();
    input.extend(core::iter::repeat_n(b'[', depth));
    input.extend(core::iter::repeat_n(b']', depth));
    let trace = common::trace_result(&input, 1024, opts).expect("exactly max_depth must be accepted");
    assert_eq!(trace.len(), depth * 2);
}

#[test]
fn one_more_than_max_depth_fails_with_depth_at_the_opening_bracket() {
    let depth = 4usize;
    let opts = ParserOptions { max_depth: Limit::At(NonZeroUsize::new(depth).unwrap()), ..Default::default() };
    let mut input = Vec::new();
    input.extend(core::iter::repeat_n(b'[', depth + 1));
    input.extend(core::iter::repeat_n(b']', depth + 1));
    let (_, code) = common::trace_result(&input, 1024, opts).unwrap_err();
    assert_eq!(code, ErrorCode::Depth);
}

#[test]
fn leading_bom_accepted_when_enabled() {
    const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
    let opts = ParserOptions { allow_leading_bom: true, ..Default::default() };
    let mut input = BOM.to_vec();
    input.extend_from_slice(b"null");
    let mut driver = Driver::new(opts, |_: Event<'_>| ControlFlow::Continue(()));
    driver.feed(&input).expect("BOM should be skipped silently");
    driver.finish().expect("document after BOM is well-formed");
}

#[test]
fn leading_bom_rejected_as_bad_token_when_disabled() {
    const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
    let mut input = BOM.to_vec();
    input.extend_from_slice(b"null");
    let (_, code) = common::trace_result(&input, 1024, ParserOptions::default()).unwrap_err();
    assert_eq!(code, ErrorCode::BadToken);
}
