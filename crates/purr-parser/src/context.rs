//! Per-parse state.
//!
//! Grammar nodes are immutable and shared between parses, so everything a
//! parse mutates lives in [`ParserContext`]: the cursor into the significant
//! token stream, the event log the tree is later built from, and the
//! furthest failure seen so far, which the driver turns into an error
//! message.
//!
//! Backtracking is a truncation. A [`Marker`] records the cursor and the
//! length of the event log; rolling back restores both.
//!
//! Nodes opened after the fact, around events already recorded, are kept
//! aside as wraps and spliced into the log when it is handed out. Opening
//! one is constant time however long the log has grown.

use purr_lexer::{LexerConfig, SourceToken, TokenKind};
use serde::{Deserialize, Serialize};

use crate::syntax::SyntaxKind;
use crate::token_set::TokenSet;

/// Options for one parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Try every alternative of a choice in order instead of consulting
    /// the dispatch tables. Slower; the result is the same.
    pub naive_choice: bool,
    /// Options for lexing, when the parse starts from text.
    pub lexer: LexerConfig,
}

/// What a parse did, in order. Replayed into a
/// [`TreeSink`](crate::tree::TreeSink) once parsing is over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Start a node.
    Open {
        /// Kind of the node.
        kind: SyntaxKind,
    },
    /// Finish the innermost open node.
    Close,
    /// Consume the next significant token.
    Token,
    /// An `Open` whose node failed to parse. Ignored on replay.
    Tombstone,
    /// A recovered error covering significant tokens `start..end`.
    Diagnostic {
        /// What went wrong.
        message: &'static str,
        /// First covered token.
        start: usize,
        /// One past the last covered token; equal to `start` for a point.
        end: usize,
    },
}

/// A save point. Markers must be rolled back or committed in reverse order
/// of creation.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pos: usize,
    events_len: usize,
    wraps_len: usize,
}

/// How far a parse got, and what it wanted there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Whether the grammar matched.
    pub success: bool,
    /// Index of the significant token reached. On failure, the furthest
    /// index at which any token was rejected.
    pub position: usize,
    /// Descriptions of the tokens that would have been accepted at
    /// `position`.
    pub expected: Vec<String>,
}

#[derive(Clone, Debug, Default)]
struct Failure {
    pos: usize,
    kinds: TokenSet,
    texts: Vec<&'static str>,
}

impl Failure {
    fn descriptions(&self) -> Vec<String> {
        self.kinds
            .iter()
            .map(|k| k.description().to_string())
            .chain(self.texts.iter().map(|t| format!("`{t}`")))
            .collect()
    }
}

/// Cursor, event log and failure bookkeeping for one parse.
pub struct ParserContext<'t> {
    src: &'t str,
    tokens: &'t [SourceToken],
    pos: usize,
    events: Vec<Event>,
    /// Nodes opened at a checkpoint: the event index they go in front of,
    /// in the order they were opened.
    wraps: Vec<(usize, SyntaxKind)>,
    failure: Failure,
    naive_choice: bool,
    bumps: usize,
}

impl<'t> ParserContext<'t> {
    /// A context at the first of `tokens`, which must not contain trivia.
    /// `src` is only used to compare token text.
    #[must_use]
    pub fn new(src: &'t str, tokens: &'t [SourceToken], options: &ParseOptions) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
            events: Vec::with_capacity(tokens.len() * 2),
            wraps: Vec::new(),
            failure: Failure::default(),
            naive_choice: options.naive_choice,
            bumps: 0,
        }
    }

    /// Index of the next token.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether every token has been consumed.
    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Kind of the next token.
    #[must_use]
    pub fn current(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    /// Whether the next token has kind `kind`.
    #[must_use]
    pub fn at(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    fn current_text(&self) -> &'t str {
        self.tokens.get(self.pos).map_or("", |t| t.text(self.src))
    }

    /// Consume the next token.
    pub fn bump(&mut self) {
        if !self.at_eof() {
            self.events.push(Event::Token);
            self.pos += 1;
            self.bumps += 1;
        }
    }

    /// Consume the next token if it has kind `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.expect(TokenSet::single(kind));
            false
        }
    }

    /// Consume the next token if it has kind `kind` and reads `text`.
    pub fn eat_text(&mut self, kind: TokenKind, text: &'static str) -> bool {
        if self.at(kind) && self.current_text() == text {
            self.bump();
            true
        } else {
            self.expect_text(text);
            false
        }
    }

    /// Record that one of `kinds` would have been accepted here.
    pub fn expect(&mut self, kinds: TokenSet) {
        if self.note_failure() {
            self.failure.kinds = self.failure.kinds.union(kinds);
        }
    }

    fn expect_text(&mut self, text: &'static str) {
        if self.note_failure() && !self.failure.texts.contains(&text) {
            self.failure.texts.push(text);
        }
    }

    /// Move the furthest failure up to the cursor. Returns `false` when the
    /// cursor is behind it and the failure should be ignored.
    fn note_failure(&mut self) -> bool {
        if self.pos > self.failure.pos {
            self.failure = Failure {
                pos: self.pos,
                ..Failure::default()
            };
        }
        self.pos == self.failure.pos
    }

    /// Furthest index at which a token was rejected.
    #[must_use]
    pub fn failure_pos(&self) -> usize {
        self.failure.pos
    }

    /// Save the current state.
    pub fn mark(&self) -> Marker {
        Marker {
            pos: self.pos,
            events_len: self.events.len(),
            wraps_len: self.wraps.len(),
        }
    }

    /// Restore the state saved in `marker`.
    pub fn rollback(&mut self, marker: Marker) {
        self.pos = marker.pos;
        self.events.truncate(marker.events_len);
        self.wraps.truncate(marker.wraps_len);
    }

    /// Keep everything done since `marker`.
    pub fn commit(&mut self, marker: Marker) {
        debug_assert!(marker.events_len <= self.events.len());
    }

    /// Run `f` and undo its effects, failure bookkeeping included.
    pub fn probe(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let marker = self.mark();
        let failure = self.failure.clone();
        let bumps = self.bumps;
        let ok = f(self);
        self.rollback(marker);
        self.failure = failure;
        self.bumps = bumps;
        ok
    }

    /// A point in the event log that a node can later be opened at.
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.events.len()
    }

    /// Open a node. Returns the index of its `Open` event.
    pub fn open(&mut self, kind: SyntaxKind) -> usize {
        self.events.push(Event::Open { kind });
        self.events.len() - 1
    }

    /// Open a node at `checkpoint`, so that it wraps everything recorded
    /// since.
    pub fn open_at(&mut self, checkpoint: usize, kind: SyntaxKind) {
        let at = checkpoint.min(self.events.len());
        self.wraps.push((at, kind));
    }

    /// Close the innermost open node.
    pub fn close(&mut self) {
        self.events.push(Event::Close);
    }

    /// Abandon the node opened at event `open`.
    pub fn tombstone(&mut self, open: usize) {
        if let Some(event) = self.events.get_mut(open) {
            if matches!(event, Event::Open { .. }) {
                *event = Event::Tombstone;
            }
        }
    }

    /// Record a recovered error over tokens `start..end`.
    pub fn diagnostic(&mut self, message: &'static str, start: usize, end: usize) {
        self.events.push(Event::Diagnostic {
            message,
            start,
            end,
        });
    }

    /// Whether choices should ignore their dispatch tables.
    #[must_use]
    pub fn naive_choice(&self) -> bool {
        self.naive_choice
    }

    /// Tokens consumed so far, counting those later rolled back.
    #[must_use]
    pub fn bumps(&self) -> usize {
        self.bumps
    }

    /// Events recorded so far, wraps included.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        splice(self.events.clone(), &self.wraps)
    }

    /// Summarise the parse.
    #[must_use]
    pub fn result(&self, success: bool) -> ParseResult {
        if success && self.failure.pos <= self.pos {
            return ParseResult {
                success,
                position: self.pos,
                expected: Vec::new(),
            };
        }
        let position = self.failure.pos.max(self.pos);
        let expected = if position == self.failure.pos {
            self.failure.descriptions()
        } else {
            Vec::new()
        };
        ParseResult {
            success,
            position,
            expected,
        }
    }

    /// Give up the event log.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        splice(self.events, &self.wraps)
    }
}

/// Put every wrap in front of the event it was opened at. Of two wraps at
/// the same event the later one is the outer node, so it comes first.
fn splice(events: Vec<Event>, wraps: &[(usize, SyntaxKind)]) -> Vec<Event> {
    if wraps.is_empty() {
        return events;
    }
    let mut pending: Vec<(usize, SyntaxKind)> = wraps.iter().rev().copied().collect();
    pending.sort_by_key(|&(at, _)| at);

    let mut out = Vec::with_capacity(events.len() + pending.len());
    let mut pending = pending.into_iter().peekable();
    for (i, event) in events.into_iter().enumerate() {
        while let Some((_, kind)) = pending.next_if(|&(at, _)| at == i) {
            out.push(Event::Open { kind });
        }
        out.push(event);
    }
    out.extend(pending.map(|(_, kind)| Event::Open { kind }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use purr_span::SourcePos;

    fn tokens(kinds: &[TokenKind]) -> Vec<SourceToken> {
        kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                let i = i as u32;
                SourceToken::new(k, SourcePos::new(0, i, i), SourcePos::new(0, i + 1, i + 1))
            })
            .collect()
    }

    #[test]
    fn test_rollback_restores_cursor_and_events() {
        let toks = tokens(&[TokenKind::LowerName, TokenKind::Eq]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let marker = cx.mark();
        cx.open(SyntaxKind::ValueDecl);
        cx.bump();
        cx.bump();
        assert!(cx.at_eof());
        cx.rollback(marker);
        assert_eq!(cx.pos(), 0);
        assert!(cx.events().is_empty());
        assert_eq!(cx.bumps(), 2);
    }

    #[test]
    fn test_furthest_failure_wins() {
        let toks = tokens(&[TokenKind::LowerName, TokenKind::Eq, TokenKind::Integer]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        assert!(!cx.eat(TokenKind::ProperName));
        cx.bump();
        assert!(!cx.eat(TokenKind::DoubleColon));
        assert!(!cx.eat(TokenKind::LParen));
        let marker = cx.mark();
        cx.rollback(marker);
        cx.pos = 0;
        assert!(!cx.eat(TokenKind::Module));

        let result = cx.result(false);
        assert_eq!(result.position, 1);
        assert_eq!(result.expected, vec!["`(`".to_string(), "`::`".to_string()]);
    }

    #[test]
    fn test_open_at_wraps_earlier_events() {
        let toks = tokens(&[TokenKind::LowerName, TokenKind::LowerName]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let checkpoint = cx.checkpoint();
        cx.bump();
        cx.bump();
        cx.open_at(checkpoint, SyntaxKind::ExprApp);
        cx.close();
        assert_eq!(
            cx.events(),
            vec![
                Event::Open {
                    kind: SyntaxKind::ExprApp
                },
                Event::Token,
                Event::Token,
                Event::Close,
            ]
        );
    }

    #[test]
    fn test_later_wrap_at_same_checkpoint_is_outer() {
        let toks = tokens(&[TokenKind::LowerName; 3]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let checkpoint = cx.checkpoint();
        cx.bump();
        cx.bump();
        cx.open_at(checkpoint, SyntaxKind::ExprApp);
        cx.close();
        cx.bump();
        cx.open_at(checkpoint, SyntaxKind::ExprInfix);
        cx.close();
        let open = |kind| Event::Open { kind };
        assert_eq!(
            cx.into_events(),
            vec![
                open(SyntaxKind::ExprInfix),
                open(SyntaxKind::ExprApp),
                Event::Token,
                Event::Token,
                Event::Close,
                Event::Token,
                Event::Close,
            ]
        );
    }

    #[test]
    fn test_rollback_drops_wraps() {
        let toks = tokens(&[TokenKind::LowerName; 2]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let checkpoint = cx.checkpoint();
        cx.bump();
        let marker = cx.mark();
        cx.bump();
        cx.open_at(checkpoint, SyntaxKind::ExprApp);
        cx.close();
        cx.rollback(marker);
        assert_eq!(cx.events(), vec![Event::Token]);
    }

    #[test]
    fn test_wrapping_a_long_log_is_linear() {
        let n = 200_000;
        let toks = tokens(&vec![TokenKind::LowerName; n]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let started = std::time::Instant::now();
        let checkpoint = cx.checkpoint();
        cx.bump();
        while !cx.at_eof() {
            cx.bump();
            cx.open_at(checkpoint, SyntaxKind::ExprApp);
            cx.close();
        }
        let events = cx.into_events();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(events.len(), n + 2 * (n - 1));
        assert_eq!(events[n - 2], Event::Open { kind: SyntaxKind::ExprApp });
        assert_eq!(events[n - 1], Event::Token);
    }

    #[test]
    fn test_probe_leaves_no_trace() {
        let toks = tokens(&[TokenKind::LowerName]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let ok = cx.probe(|cx| {
            cx.bump();
            cx.eat(TokenKind::Eq)
        });
        assert!(!ok);
        assert_eq!(cx.pos(), 0);
        assert_eq!(cx.failure_pos(), 0);
        assert!(cx.result(true).expected.is_empty());
    }

    #[test]
    fn test_tombstone_only_replaces_open() {
        let toks = tokens(&[TokenKind::LowerName]);
        let mut cx = ParserContext::new("", &toks, &ParseOptions::default());
        let open = cx.open(SyntaxKind::ExprVar);
        cx.bump();
        cx.tombstone(open);
        cx.tombstone(1);
        assert_eq!(cx.events(), vec![Event::Tombstone, Event::Token]);
    }
}
