//! The structural events emitted by [`crate::driver::Driver`] (`spec.md`
//! §3, §6).
//!
//! Every event borrows from the driver's internal scratch buffers rather
//! than allocating: per `spec.md` §3 Ownership, "decoded string values... are
//! owned by the token briefly and passed by borrow into the event
//! callback; the callback must not retain the pointer past its return."
//! Callbacks that need a value past the callback's return must copy it.

use core::ops::ControlFlow;

use crate::error::ErrorCode;

/// Which of the three IEEE-754 extension values a non-finite number token
/// represents (`spec.md` GLOSSARY: "Nonfinite").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonFiniteKind {
    /// The bare lexeme `NaN`.
    NaN,
    /// The bare lexeme `Infinity`.
    Infinity,
    /// The bare lexeme `-Infinity`.
    NegInfinity,
}

/// The representations of a number token that parsed successfully,
/// controlled by [`crate::options::ParserOptions`]'s `preserve_number_lexeme`/
/// `parse_int64`/`parse_uint64`/`parse_double` flags (`spec.md` §4.C).
#[derive(Debug, Clone, Copy)]
pub struct NumberValue<'a> {
    /// The byte-exact source lexeme, present when `preserve_number_lexeme`
    /// is set.
    pub lexeme: Option<&'a str>,
    /// A signed 64-bit representation, present when the lexeme is a pure
    /// integer that fits in `i64` and `parse_int64` is set.
    pub as_i64: Option<i64>,
    /// An unsigned 64-bit representation, present when the lexeme is a
    /// non-negative pure integer that fits in `u64` and `parse_uint64` is
    /// set.
    pub as_u64: Option<u64>,
    /// A binary floating-point representation, present when `parse_double`
    /// is set.
    pub as_f64: Option<f64>,
    /// Set when this number is one of the `NaN`/`Infinity`/`-Infinity`
    /// extension lexemes rather than an RFC 8259 number.
    pub nonfinite: Option<NonFiniteKind>,
}

/// A single structural event in the `spec.md` §8 "event trace": the totally
/// ordered sequence of events emitted for a given input.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A `{` was consumed; a matching `ObjectEnd` will follow at the same
    /// nesting depth.
    ObjectBegin,
    /// The `}` matching the most recently opened, still-open object.
    ObjectEnd,
    /// A `[` was consumed; a matching `ArrayEnd` will follow at the same
    /// nesting depth.
    ArrayBegin,
    /// The `]` matching the most recently opened, still-open array.
    ArrayEnd,
    /// An object key string. Always immediately precedes the event for its
    /// value.
    Key(&'a str),
    /// A complete, decoded string value.
    String(&'a str),
    /// A complete number value in whichever representations were
    /// requested.
    Number(NumberValue<'a>),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
}

/// The event callback contract (`spec.md` §6): `fn(user, event, error_out)
/// -> Status`, translated into a Rust closure. Returning
/// [`ControlFlow::Continue`] lets parsing proceed; returning
/// [`ControlFlow::Break`] cancels the stream (`spec.md` §5 "Cancellation"),
/// moving it permanently to the `Error` state with the given code wrapped
/// as [`ErrorCode::Cancelled`].
pub trait EventSink {
    /// Receives one event. The opaque user pointer from `spec.md`'s C-style
    /// contract is simply whatever state this closure/type captures.
    fn on_event(&mut self, event: Event<'_>) -> ControlFlow<ErrorCode>;
}

impl<F> EventSink for F
where
    F: FnMut(Event<'_>) -> ControlFlow<ErrorCode>,
{
    fn on_event(&mut self, event: Event<'_>) -> ControlFlow<ErrorCode> {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn closures_implement_event_sink() {
        let mut seen: Vec<&'static str> = Vec::new();
        let mut sink = |ev: Event<'_>| -> ControlFlow<ErrorCode> {
            match ev {
                Event::Null => seen.push("null"),
                Event::Bool(true) => seen.push("true"),
                _ => seen.push("other"),
            }
            ControlFlow::Continue(())
        };
        assert_eq!(sink.on_event(Event::Null), ControlFlow::Continue(()));
        assert_eq!(sink.on_event(Event::Bool(true)), ControlFlow::Continue(()));
        assert_eq!(seen, alloc::vec!["null", "true"]);
    }
}
