#![no_main]

use core::num::NonZeroUsize;
use core::ops::ControlFlow;

use arbitrary::Arbitrary;
use jflow::{Driver, Event, Limit, ParserOptions};
use libfuzzer_sys::fuzz_target;

/// A structured fuzz case: an option bitmask, a seed for the chunk
/// splitter, a depth cap, and the raw document bytes. Trimmed relative to
/// the value-builder-targeting mutator the upstream crate uses for its own
/// (very different) DOM-construction surface: this crate has no DOM layer
/// to mutate toward, so `arbitrary`'s derive is enough to shrink and mutate
/// these fields directly.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    flags: u8,
    split_seed: u64,
    max_depth: u8,
    data: Vec<u8>,
}

fn options_from_flags(flags: u8, max_depth: usize) -> ParserOptions {
    ParserOptions {
        allow_comments: flags & 1 != 0,
        allow_trailing_commas: flags & 2 != 0,
        allow_nonfinite_numbers: flags & 4 != 0,
        allow_single_quotes: flags & 8 != 0,
        allow_unescaped_controls: flags & 16 != 0,
        allow_leading_bom: flags & 32 != 0,
        validate_utf8: flags & 64 != 0,
        max_depth: Limit::At(NonZeroUsize::new(max_depth).unwrap()),
        preserve_number_lexeme: true,
        parse_int64: true,
        parse_uint64: true,
        parse_double: true,
        ..Default::default()
    }
}

/// Splits `data` into a deterministic sequence of non-empty chunks driven by
/// `split_seed`, the same way the upstream crate's fuzz target does for its
/// own `&str` input — except this one works over raw bytes, since the
/// streaming core takes bytes rather than UTF-8-validated text.
fn split_into_chunks(data: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let len = data.len();
    while start < len {
        let remaining = len - start;
        let size = (split_seed as usize % remaining) + 1;
        chunks.push(&data[start..start + size]);
        start += size;
    }
    chunks
}

fuzz_target!(|input: FuzzInput| {
    if input.data.is_empty() {
        return;
    }
    let max_depth = usize::from(input.max_depth.max(1));
    let options = options_from_flags(input.flags, max_depth);
    let chunks = split_into_chunks(&input.data, input.split_seed);

    let mut driver = Driver::new(options, |_ev: Event<'_>| ControlFlow::Continue(()));

    for chunk in &chunks {
        if driver.feed(chunk).is_err() {
            return;
        }
        assert!(driver.depth() <= max_depth, "depth exceeded max_depth");
    }
    let _ = driver.finish();
});
