//! Component F — the stream state machine (`spec.md` §4.F).
//!
//! Validates a token against the current grammar state, maintains the
//! nesting stack, and turns accepted tokens into at most one structural
//! [`Event`] each. Depth and per-container element limits (`spec.md` §4.G)
//! are enforced here, at the point where a container is pushed or grown,
//! since that is the only place the relevant counts are available.

use alloc::vec::Vec;

use crate::error::ErrorCode;
use crate::event::{Event, NumberValue};
use crate::lexer::TokenKind;
use crate::options::ParserOptions;

/// `spec.md` §3: `Init, Value, ExpectValue, ObjectKey, ObjectValue, Done, Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamState {
    Init,
    Value,
    ExpectValue,
    ObjectKey,
    ObjectValue,
    Done,
    Error,
}

/// One entry of the nesting stack. `entering_state` records which state was
/// active the moment this container was pushed; kept for parity with
/// `spec.md`'s data model even though the transition table never needs to
/// consult it (the post-pop state is always `Value`, regardless of how the
/// container was entered).
///
/// `elem_count` is a **(supplement)**: `spec.md` §3 only lists a single,
/// stream-wide `container_elem_count`, but `max_container_elems` must be
/// checked independently per container (§4.G), which is only possible if
/// each container remembers its own count across nested pushes and pops.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StackEntry {
    pub entering_state: StreamState,
    pub is_array: bool,
    pub has_elements: bool,
    pub elem_count: usize,
}

/// The grammar state machine plus its nesting stack.
pub(crate) struct Grammar {
    state: StreamState,
    stack: Vec<StackEntry>,
}

impl Grammar {
    pub(crate) fn new() -> Self {
        Self {
            state: StreamState::Init,
            stack: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> StreamState {
        self.state
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state == StreamState::Done
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `spec.md` §4.F "Resumption reconciliation". In the C-shaped original
    /// this guarded against a race where the grammar state was advanced
    /// optimistically before a token's bytes were confirmed complete. That
    /// race cannot happen in this port: `step` is only ever called with a
    /// fully-lexed [`Token`](crate::lexer::Token) — the driver's pass loop
    /// never calls it for `Lexed::Incomplete` — so a value token only ever
    /// starts parking from `Init`/`ExpectValue`/`ObjectKey`, never from
    /// `Value` itself.
    ///
    /// That means observing `state == Value` with a token still parked at
    /// the start of a pass can only mean one thing: a *prior* value already
    /// completed correctly, and the *newly* parked token is a second value
    /// attempting to follow it with no separator in between (the `[1 2` /
    /// `]` chunking case) — which must still be rejected as `BadToken`,
    /// exactly as the whole-fed `[1 2]` is. Rewinding the state here would
    /// silently forgive that missing separator, so reconciliation is
    /// deliberately a no-op. Kept as a named hook, rather than deleted,
    /// so the invariant above stays documented at its call site for anyone
    /// tempted to make `step` optimistic in the future.
    pub(crate) fn reconcile_for_resumption(&mut self) {}

    /// Feeds one token through the grammar, returning the (at most one)
    /// event it produces. Borrows from `token` to build the event without
    /// copying decoded string/number data.
    pub(crate) fn step<'a>(
        &mut self,
        token: &'a TokenKind,
        options: &ParserOptions,
    ) -> Result<Option<Event<'a>>, ErrorCode> {
        let event = match self.state {
            StreamState::Init => self.step_init(token, options)?,
            StreamState::ExpectValue => self.step_expect_value(token, options)?,
            StreamState::Value => self.step_value(token, options)?,
            StreamState::ObjectKey => self.step_object_key(token, options)?,
            StreamState::ObjectValue => self.step_object_value(token)?,
            StreamState::Done | StreamState::Error => return Err(ErrorCode::State),
        };
        Ok(event)
    }

    fn step_init<'a>(
        &mut self,
        token: &'a TokenKind,
        options: &ParserOptions,
    ) -> Result<Option<Event<'a>>, ErrorCode> {
        if token.is_value() {
            let event = value_event(token, options);
            self.state = if self.stack.is_empty() { StreamState::Done } else { StreamState::Value };
            return Ok(Some(event));
        }
        match token {
            TokenKind::LBracket => {
                self.push_container(false, options)?;
                self.state = StreamState::ExpectValue;
                Ok(Some(Event::ArrayBegin))
            }
            TokenKind::LBrace => {
                self.push_container(true, options)?;
                self.state = StreamState::ObjectKey;
                Ok(Some(Event::ObjectBegin))
            }
            _ => Err(ErrorCode::BadToken),
        }
    }

    fn step_expect_value<'a>(
        &mut self,
        token: &'a TokenKind,
        options: &ParserOptions,
    ) -> Result<Option<Event<'a>>, ErrorCode> {
        if token.is_value() {
            let event = value_event(token, options);
            self.mark_top_has_element(options)?;
            self.state = StreamState::Value;
            return Ok(Some(event));
        }
        match token {
            TokenKind::RBracket => {
                let top = self.current_top()?;
                if !top.is_array {
                    return Err(ErrorCode::BadToken);
                }
                // Reached only right after a comma, so `top.has_elements`
                // is true iff this would close on a trailing comma.
                if top.has_elements && !options.allow_trailing_commas {
                    return Err(ErrorCode::BadToken);
                }
                self.pop_container();
                Ok(Some(Event::ArrayEnd))
            }
            TokenKind::RBrace => {
                let top = self.current_top()?;
                if top.is_array || top.has_elements {
                    return Err(ErrorCode::BadToken);
                }
                self.pop_container();
                Ok(Some(Event::ObjectEnd))
            }
            TokenKind::LBracket => {
                self.push_container(false, options)?;
                self.state = StreamState::ExpectValue;
                Ok(Some(Event::ArrayBegin))
            }
            TokenKind::LBrace => {
                self.push_container(true, options)?;
                self.state = StreamState::ObjectKey;
                Ok(Some(Event::ObjectBegin))
            }
            _ => Err(ErrorCode::BadToken),
        }
    }

    fn step_value<'a>(
        &mut self,
        token: &'a TokenKind,
        _options: &ParserOptions,
    ) -> Result<Option<Event<'a>>, ErrorCode> {
        match token {
            TokenKind::Comma => {
                let top = self.current_top()?;
                self.state = if top.is_array { StreamState::ExpectValue } else { StreamState::ObjectKey };
                Ok(None)
            }
            TokenKind::RBracket => {
                let top = self.current_top()?;
                if !top.is_array {
                    return Err(ErrorCode::BadToken);
                }
                // Reached right after a value completed with no comma in
                // between, so closing here is never a trailing comma: it is
                // always the ordinary end of the last element.
                self.pop_container();
                Ok(Some(Event::ArrayEnd))
            }
            TokenKind::RBrace => {
                let top = self.current_top()?;
                if top.is_array {
                    return Err(ErrorCode::BadToken);
                }
                self.pop_container();
                Ok(Some(Event::ObjectEnd))
            }
            _ => Err(ErrorCode::BadToken),
        }
    }

    fn step_object_key<'a>(
        &mut self,
        token: &'a TokenKind,
        options: &ParserOptions,
    ) -> Result<Option<Event<'a>>, ErrorCode> {
        match token {
            TokenKind::Str(s) => {
                self.state = StreamState::ObjectValue;
                Ok(Some(Event::Key(s)))
            }
            TokenKind::RBrace => {
                let top = self.current_top()?;
                if top.has_elements && !options.allow_trailing_commas {
                    return Err(ErrorCode::BadToken);
                }
                self.pop_container();
                Ok(Some(Event::ObjectEnd))
            }
            _ => Err(ErrorCode::BadToken),
        }
    }

    fn step_object_value(&mut self, token: &TokenKind) -> Result<Option<Event<'static>>, ErrorCode> {
        match token {
            TokenKind::Colon => {
                self.state = StreamState::ExpectValue;
                Ok(None)
            }
            _ => Err(ErrorCode::BadToken),
        }
    }

    fn current_top(&self) -> Result<&StackEntry, ErrorCode> {
        self.stack.last().ok_or(ErrorCode::Invalid)
    }

    fn mark_top_has_element(&mut self, options: &ParserOptions) -> Result<(), ErrorCode> {
        let max_elems = options.max_container_elems();
        let top = self.stack.last_mut().ok_or(ErrorCode::Invalid)?;
        top.has_elements = true;
        top.elem_count += 1;
        if top.elem_count > max_elems {
            return Err(ErrorCode::Limit);
        }
        Ok(())
    }

    fn push_container(&mut self, is_array: bool, options: &ParserOptions) -> Result<(), ErrorCode> {
        if self.stack.len() >= options.max_depth() {
            return Err(ErrorCode::Depth);
        }
        // Pushing a container is itself an "element" of whatever container
        // it is nested in.
        if !self.stack.is_empty() {
            self.mark_top_has_element(options)?;
        }
        self.stack.push(StackEntry {
            entering_state: self.state,
            is_array,
            has_elements: false,
            elem_count: 0,
        });
        Ok(())
    }

    fn pop_container(&mut self) {
        self.stack.pop();
        self.state = if self.stack.is_empty() { StreamState::Done } else { StreamState::Value };
    }
}

fn value_event<'a>(token: &'a TokenKind, options: &ParserOptions) -> Event<'a> {
    match token {
        TokenKind::Null => Event::Null,
        TokenKind::True => Event::Bool(true),
        TokenKind::False => Event::Bool(false),
        TokenKind::Str(s) => Event::String(s),
        TokenKind::Num(n) => Event::Number(NumberValue {
            lexeme: options.preserve_number_lexeme.then_some(n.lexeme.as_str()),
            as_i64: options.parse_int64.then_some(n.as_i64).flatten(),
            as_u64: options.parse_uint64.then_some(n.as_u64).flatten(),
            as_f64: options.parse_double.then_some(n.as_f64).flatten(),
            nonfinite: n.nonfinite,
        }),
        TokenKind::LBrace | TokenKind::RBrace | TokenKind::LBracket | TokenKind::RBracket | TokenKind::Colon | TokenKind::Comma => {
            unreachable!("value_event called on a non-value token")
        }
    }
}
