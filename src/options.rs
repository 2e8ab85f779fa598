//! Parser configuration (`spec.md` §6).
//!
//! Resource limits are modeled as an explicit [`Limit`] enum rather than a
//! `0`-means-library-default `usize`, per the REDESIGN FLAG in `spec.md`
//! §9 ("Option structs with dozens of fields, many of which are `0` means
//! default... replace with an explicit enum `Limit::Default | Limit::At(n)`
//! where representation ambiguity would otherwise leak into overflow
//! logic").

#![allow(clippy::struct_excessive_bools)]

use core::num::NonZeroUsize;

/// A resource limit: either "use the library default" or an explicit cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Use this crate's built-in default for the limit in question.
    Default,
    /// Cap the resource at exactly this value.
    At(NonZeroUsize),
}

impl Limit {
    /// Resolves this limit against a library default, returning the
    /// effective cap as a `usize`.
    #[must_use]
    pub fn resolve(self, default: usize) -> usize {
        match self {
            Limit::Default => default,
            Limit::At(n) => n.get(),
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Default
    }
}

/// Built-in default for [`ParserOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;
/// Built-in default for [`ParserOptions::max_string_bytes`].
pub const DEFAULT_MAX_STRING_BYTES: usize = 16 * 1024 * 1024;
/// Built-in default for [`ParserOptions::max_number_bytes`]. Reuses the
/// string-bytes default, resolving the Open Question in `spec.md` §9 about
/// unbounded digit-run buffering (see `DESIGN.md`).
pub const DEFAULT_MAX_NUMBER_BYTES: usize = DEFAULT_MAX_STRING_BYTES;
/// Built-in default for [`ParserOptions::max_container_elems`].
pub const DEFAULT_MAX_CONTAINER_ELEMS: usize = 1_048_576;
/// Built-in default for [`ParserOptions::max_total_bytes`].
pub const DEFAULT_MAX_TOTAL_BYTES: usize = 64 * 1024 * 1024;

/// How the streaming core should treat duplicate object keys.
///
/// Duplicate-key detection is a DOM-builder policy (`spec.md` §4.F: "Duplicate
/// keys are not detected by the streaming core"); this enum exists only so
/// that a host DOM layer built on top of this crate has somewhere to store
/// its chosen policy alongside the rest of `ParserOptions`. The streaming
/// core never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DupKeys {
    /// Reject documents with a duplicate key (DOM-layer only).
    Error,
    /// Keep the first occurrence of a duplicate key (DOM-layer only).
    FirstWins,
    /// Keep the last occurrence of a duplicate key (DOM-layer only).
    #[default]
    LastWins,
    /// Collect every occurrence of a duplicate key (DOM-layer only).
    Collect,
}

/// Configuration for a [`crate::driver::Driver`] (and the [`crate::lexer::Lexer`]
/// it drives internally).
///
/// All boolean fields default to `false` (strict RFC 8259 JSON); all
/// [`Limit`] fields default to [`Limit::Default`], which resolves to this
/// crate's built-in defaults.
///
/// # Examples
///
/// ```
/// use jflow::ParserOptions;
///
/// let options = ParserOptions {
///     allow_comments: true,
///     allow_trailing_commas: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Permit `//` line and `/* */` block comments interleaved with
    /// whitespace.
    pub allow_comments: bool,
    /// Permit a trailing `,` before a closing `]` or `}`.
    pub allow_trailing_commas: bool,
    /// Permit the bare lexemes `NaN`, `Infinity`, and `-Infinity` as numbers.
    pub allow_nonfinite_numbers: bool,
    /// Permit `'…'` strings in addition to `"…"` strings.
    pub allow_single_quotes: bool,
    /// Permit literal `U+0000..=U+001F` control characters inside strings
    /// without requiring them to be escaped.
    pub allow_unescaped_controls: bool,
    /// Skip a leading UTF-8 byte-order mark (`EF BB BF`) before parsing.
    pub allow_leading_bom: bool,
    /// Reject invalid UTF-8 byte sequences in literal (non-escaped) string
    /// bytes. This is the only string-validation mode the streaming path
    /// implements; `spec.md` §9 notes that `Replace`/`Verbatim` modes are
    /// DOM-only and are not part of this surface.
    pub validate_utf8: bool,
    /// Maximum nesting depth across both objects and arrays.
    pub max_depth: Limit,
    /// Maximum decoded length, in bytes, of any single string value.
    pub max_string_bytes: Limit,
    /// Maximum length, in bytes, of any single number lexeme. Resolves the
    /// Open Question in `spec.md` §9 about unbounded digit-run buffering.
    pub max_number_bytes: Limit,
    /// Maximum element count per container (checked independently for each
    /// array/object as it is being built).
    pub max_container_elems: Limit,
    /// Maximum total bytes of input accepted across all `feed` calls.
    pub max_total_bytes: Limit,
    /// Retain the original number lexeme verbatim on `Event::Number`.
    pub preserve_number_lexeme: bool,
    /// Attempt to compute a signed 64-bit integer representation for
    /// integer-valued numbers.
    pub parse_int64: bool,
    /// Attempt to compute an unsigned 64-bit integer representation for
    /// non-negative integer-valued numbers.
    pub parse_uint64: bool,
    /// Attempt to compute a binary floating-point representation.
    pub parse_double: bool,
    /// DOM-layer duplicate-key policy; ignored by the streaming core.
    pub dupkeys: DupKeys,
}

impl ParserOptions {
    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth.resolve(DEFAULT_MAX_DEPTH)
    }

    pub(crate) fn max_string_bytes(&self) -> usize {
        self.max_string_bytes.resolve(DEFAULT_MAX_STRING_BYTES)
    }

    pub(crate) fn max_number_bytes(&self) -> usize {
        self.max_number_bytes.resolve(DEFAULT_MAX_NUMBER_BYTES)
    }

    pub(crate) fn max_container_elems(&self) -> usize {
        self.max_container_elems
            .resolve(DEFAULT_MAX_CONTAINER_ELEMS)
    }

    pub(crate) fn max_total_bytes(&self) -> usize {
        self.max_total_bytes.resolve(DEFAULT_MAX_TOTAL_BYTES)
    }
}
