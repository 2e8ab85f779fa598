//! Concrete input → event-trace scenarios, one per documented case in the
//! design document's "Testable Properties" section. Each is checked both
//! whole (single `feed`) and split byte-by-byte, since a scenario that only
//! passes whole isn't actually testing the streaming core.

mod common;

use core::ops::ControlFlow;

use jflow::{Driver, Event, ParserOptions};

fn assert_both_ways(input: &[u8], options: ParserOptions, expected: &str) {
    assert_eq!(common::trace(input, 1024, options), expected, "whole-feed trace for {input:?}");
    assert_eq!(common::trace(input, 1, options), expected, "byte-chunked trace for {input:?}");
}

#[test]
fn simple_array_of_numbers() {
    assert_both_ways(
        b"[1,2,3]",
        ParserOptions::default(),
        "ArrayBegin\nNumber(1)\nNumber(2)\nNumber(3)\nArrayEnd",
    );
}

#[test]
fn object_with_one_key() {
    assert_both_ways(
        br#"{"a":1}"#,
        ParserOptions::default(),
        "ObjectBegin\nKey(\"a\")\nNumber(1)\nObjectEnd",
    );
}

#[test]
fn nested_array_and_object() {
    assert_both_ways(
        br#"{"a":[1,{"b":2}]}"#,
        ParserOptions::default(),
        "ObjectBegin\nKey(\"a\")\nArrayBegin\nNumber(1)\nObjectBegin\nKey(\"b\")\nNumber(2)\nObjectEnd\nArrayEnd\nObjectEnd",
    );
}

#[test]
fn string_value_split_mid_escape() {
    // The `\n` escape sequence can land split across a chunk boundary
    // (backslash in one chunk, `n` in the next); the decoded value must be
    // unaffected by exactly where the split falls.
    let input = br#"["a\nb"]"#;
    assert_both_ways(input, ParserOptions::default(), "ArrayBegin\nString(\"a\\nb\")\nArrayEnd");
}

#[test]
fn number_split_across_every_byte_boundary() {
    assert_both_ways(b"-12.5e+10", ParserOptions::default(), "Number(-12.5e+10)");
}

#[test]
fn keyword_split_across_every_byte_boundary() {
    assert_both_ways(b"[true,false,null]", ParserOptions::default(), "ArrayBegin\nBool(true)\nBool(false)\nNull\nArrayEnd");
}

#[test]
fn whitespace_and_nesting_is_insignificant_between_tokens() {
    assert_both_ways(
        b"  [ 1 ,  2 ]  ",
        ParserOptions::default(),
        "ArrayBegin\nNumber(1)\nNumber(2)\nArrayEnd",
    );
}

#[test]
fn empty_object_and_array() {
    assert_both_ways(b"{}", ParserOptions::default(), "ObjectBegin\nObjectEnd");
    assert_both_ways(b"[]", ParserOptions::default(), "ArrayBegin\nArrayEnd");
}

#[test]
fn missing_array_element_between_commas_is_an_error_at_the_comma() {
    // `[1, , 2]`: after consuming `1` and the first comma, the grammar
    // expects a value and instead sees another comma.
    let (partial, code) =
        common::trace_result(b"[1, , 2]", 1024, ParserOptions::default()).unwrap_err();
    assert_eq!(partial, vec!["ArrayBegin".to_string(), "Number(1)".to_string()]);
    assert_eq!(code, jflow::ErrorCode::BadToken);
}

#[test]
fn missing_array_element_error_points_at_the_second_comma_itself() {
    // The error must land on the offending comma's own start, not on
    // whatever position the lexer had already advanced to by the time the
    // grammar rejected it: `[1, , 2]` has the second comma at byte offset
    // 4, line 1, column 5.
    let mut driver = Driver::new(ParserOptions::default(), |_: Event<'_>| ControlFlow::Continue(()));
    let err = driver.feed(b"[1, , 2]").unwrap_err();
    assert_eq!(err.record.position.offset, 4);
    assert_eq!(err.record.position.line, 1);
    assert_eq!(err.record.position.col, 5);
}
