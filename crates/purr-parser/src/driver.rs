//! Running a grammar over a token stream and building the result.
//!
//! The grammar only sees significant tokens. Once it is done, the driver
//! replays the recorded events into a [`TreeSink`], putting trivia back in
//! between: trivia in front of a node goes to the node's parent, and
//! anything after the last significant token goes to the root.
//!
//! Input the grammar could not account for is never dropped. The driver
//! wraps it in an [`SyntaxKind::Error`] node under the root and reports one
//! error at the furthest point the grammar reached.

use purr_lexer::SourceToken;
use purr_span::Span;
use tracing::{debug, instrument, trace};

use crate::context::{Event, ParseOptions, ParseResult, ParserContext};
use crate::dsl::CompiledGrammar;
use crate::syntax::SyntaxKind;
use crate::tree::TreeSink;
use crate::ParseError;

/// Runs a [`CompiledGrammar`].
#[derive(Clone, Copy)]
pub struct Driver<'g> {
    grammar: &'g CompiledGrammar,
    options: ParseOptions,
}

impl<'g> Driver<'g> {
    /// A driver with default options.
    #[must_use]
    pub fn new(grammar: &'g CompiledGrammar) -> Self {
        Self::with_options(grammar, ParseOptions::default())
    }

    /// A driver with custom options.
    #[must_use]
    pub fn with_options(grammar: &'g CompiledGrammar, options: ParseOptions) -> Self {
        Self { grammar, options }
    }

    /// Parse `tokens`, the full output of the lexer for `src`, into `sink`.
    #[instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
    pub fn run(&self, src: &str, tokens: &[SourceToken], sink: &mut impl TreeSink) -> ParseResult {
        let (significant, index): (Vec<SourceToken>, Vec<usize>) = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, t)| (*t, i))
            .unzip();

        let mut cx = ParserContext::new(src, &significant, &self.options);
        let root = cx.open(SyntaxKind::File);
        let matched = self.grammar.parse(&mut cx);
        let complete = matched && cx.at_eof();
        let result = cx.result(complete);

        let mut error = None;
        if !complete {
            let at = result.position.min(significant.len());
            error = Some(unexpected(src, &significant, at, &result.expected));
            while cx.pos() < at {
                cx.bump();
            }
            if !cx.at_eof() {
                cx.open(SyntaxKind::Error);
                while !cx.at_eof() {
                    cx.bump();
                }
                cx.close();
            }
        }
        cx.close();
        debug_assert_eq!(root, 0);

        debug!(
            success = complete,
            position = result.position,
            bumps = cx.bumps(),
            "parsed"
        );

        let events = cx.into_events();
        replay(&events, tokens, &significant, &index, sink);
        if let Some(error) = error {
            sink.error(error);
        }
        result
    }
}

fn unexpected(src: &str, significant: &[SourceToken], at: usize, expected: &[String]) -> ParseError {
    let expected = join_expected(expected);
    match significant.get(at) {
        Some(token) => {
            let found = if token.is_synthetic() {
                token.kind.description().to_string()
            } else {
                token.text(src).to_string()
            };
            ParseError::Unexpected {
                found,
                expected,
                span: token.span(),
            }
        }
        None => {
            let end = significant.last().map_or(src.len() as u32, |t| t.end.offset);
            ParseError::UnexpectedEof {
                expected,
                span: Span::from_raw(end, end),
            }
        }
    }
}

/// `a`, `a or b`, `a, b or c`.
fn join_expected(expected: &[String]) -> String {
    match expected {
        [] => "end of input".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

fn replay(
    events: &[Event],
    tokens: &[SourceToken],
    significant: &[SourceToken],
    index: &[usize],
    sink: &mut impl TreeSink,
) {
    // Next token of `tokens` to emit, and next significant token.
    let mut next = 0;
    let mut sig = 0;
    let mut depth = 0usize;

    for event in events {
        match event {
            Event::Open { kind } => {
                if depth > 0 {
                    let until = index.get(sig).copied().unwrap_or(tokens.len());
                    flush(tokens, &mut next, until, sink);
                }
                sink.start_node(*kind);
                depth += 1;
            }
            Event::Close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    flush(tokens, &mut next, tokens.len(), sink);
                }
                sink.finish_node();
            }
            Event::Token => {
                if let Some(&at) = index.get(sig) {
                    flush(tokens, &mut next, at + 1, sink);
                    sig += 1;
                }
            }
            Event::Tombstone => {}
            Event::Diagnostic {
                message,
                start,
                end,
            } => {
                let span = covered_span(significant, *start, *end);
                trace!(reason = *message, lo = span.lo, hi = span.hi, "recovered");
                sink.error(ParseError::Recovered {
                    message: (*message).to_string(),
                    span,
                });
            }
        }
    }
}

/// Emit `tokens[*next..until]`.
fn flush(tokens: &[SourceToken], next: &mut usize, until: usize, sink: &mut impl TreeSink) {
    while *next < until.min(tokens.len()) {
        sink.token(tokens[*next]);
        *next += 1;
    }
}

/// Bytes covered by significant tokens `start..end`. An empty range sits at
/// the start of token `start`, or after the last token.
fn covered_span(significant: &[SourceToken], start: usize, end: usize) -> Span {
    let lo = match significant.get(start) {
        Some(token) => token.start.offset,
        None => significant.last().map_or(0, |t| t.end.offset),
    };
    let hi = if end > start {
        significant.get(end - 1).map_or(lo, |t| t.end.offset)
    } else {
        lo
    };
    Span::from_raw(lo, hi.max(lo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_expected() {
        assert_eq!(join_expected(&[]), "end of input");
        assert_eq!(join_expected(&["`=`".into()]), "`=`");
        assert_eq!(
            join_expected(&["`=`".into(), "`::`".into(), "identifier".into()]),
            "`=`, `::` or identifier"
        );
    }
}
