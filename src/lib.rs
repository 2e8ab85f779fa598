//! `jflow` — an incremental, event-emitting JSON lexer and streaming parser.
//!
//! This crate is the core described in the project's design document: a
//! [`Lexer`](crate::lexer) that can pause mid-token at a chunk boundary and
//! resume when more bytes arrive, a grammar [`StreamState`
//! machine](crate::stream_state) that validates token sequences against a
//! bounded nesting stack, and a [`Driver`] that ties the two together behind
//! a `feed`/`finish` API and emits a stream of structural [`Event`]s.
//!
//! ```
//! use core::ops::ControlFlow;
//! use jflow::{Driver, Event, ParserOptions};
//!
//! let mut depth = 0i32;
//! let mut driver = Driver::new(ParserOptions::default(), |ev: Event<'_>| {
//!     match ev {
//!         Event::ObjectBegin | Event::ArrayBegin => depth += 1,
//!         Event::ObjectEnd | Event::ArrayEnd => depth -= 1,
//!         _ => {}
//!     }
//!     ControlFlow::Continue(())
//! });
//! driver.feed(b"{\"a\":[1,2]}").unwrap();
//! driver.finish().unwrap();
//! assert_eq!(depth, 0);
//! ```
//!
//! Deliberately out of scope (see the project's design document): DOM value
//! construction, JSON Pointer/Patch/Merge-Patch, and any output-side
//! sink/writer/pretty-printing concerns. Those are collaborators built on
//! top of the [`Event`] stream this crate exposes.

#![no_std]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod driver;
mod error;
mod event;
mod lexer;
mod number;
mod options;
mod position;
mod sat;
mod stream_state;
mod string_decoder;
mod token_buffer;

pub use driver::Driver;
pub use error::{ContextSnippet, ErrorCode, ErrorRecord, ParserError};
pub use event::{Event, EventSink, NonFiniteKind, NumberValue};
pub use options::{DupKeys, Limit, ParserOptions};
pub use position::Position;

// `thiserror`'s derive already implements `core::error::Error` for
// `ParserError` regardless of this crate's own `std` feature (the trait has
// lived in `core` since Rust 1.81, and `std::error::Error` is just that same
// trait re-exported), so no separate `std`-gated shim is needed here; the
// `std` feature exists purely so host binaries can `extern crate std` and
// get `?`-ergonomic interop with `Box<dyn std::error::Error>` without this
// crate forcing an allocator-backed target to do the same.
#[cfg(test)]
mod std_error_tests {
    use alloc::string::ToString;
    use core::error::Error;

    use crate::error::{ErrorCode, ParserError};
    use crate::position::Position;

    #[test]
    fn parser_error_implements_core_error() {
        fn assert_error<E: Error>(_: &E) {}
        let err = ParserError::new(ErrorCode::BadToken, Position::start());
        assert_error(&err);
        let _ = err.to_string();
    }
}
