//! Lexical analysis for purr.
//!
//! Source text goes through five stages before the parser sees it:
//!
//! 1. [`scan`] cuts the buffer into byte-offset [`RawToken`]s, trivia
//!    included.
//! 2. [`position::correct_positions`] assigns lines and columns.
//! 3. [`lexeme::to_lexemes`] hangs trivia off the preceding token.
//! 4. [`lexeme::to_super_tokens`] glues qualified names together.
//! 5. [`layout::apply`] inserts `LayoutStart`, `LayoutSep` and `LayoutEnd`
//!    according to the offside rule.
//!
//! The result is a flat list of [`SourceToken`]s. Every byte of the input is
//! covered by exactly one token that is not a layout token, so the source can
//! always be rebuilt from the token list.
//!
//! ```text
//! f x = case x of       -- LayoutStart inserted before `Just`
//!   Just y -> y
//!   Nothing -> 0        -- LayoutSep inserted before `Nothing`
//!                       -- LayoutEnd inserted at end of input
//! ```

#![warn(missing_docs)]

pub mod layout;
pub mod lexeme;
pub mod position;
mod scan;
mod token;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use layout::{LayoutConfig, LayoutDelimiter, LayoutStack};
pub use lexeme::{Lexeme, SuperToken};
pub use scan::scan;
pub use token::{RawToken, SourceToken, TokenKind};

/// Configuration for the lexer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexerConfig {
    /// Layout options.
    pub layout: LayoutConfig,
}

/// Lex source code with the default configuration.
#[must_use]
pub fn lex(src: &str) -> Vec<SourceToken> {
    lex_with_config(src, &LexerConfig::default())
}

/// Lex source code with custom configuration.
#[must_use]
pub fn lex_with_config(src: &str, config: &LexerConfig) -> Vec<SourceToken> {
    let raw = scan(src);
    lex_raw(src, &raw, config)
}

/// Run every stage after tokenization on tokens from an external tokenizer.
///
/// `raw` must tile `src`; see [`RawToken`].
#[must_use]
#[instrument(level = "debug", skip_all, fields(bytes = src.len(), raw = raw.len()))]
pub fn lex_raw(src: &str, raw: &[RawToken], config: &LexerConfig) -> Vec<SourceToken> {
    let tokens = position::correct_positions(src, raw);
    let leading = tokens.iter().take_while(|t| t.kind.is_trivia()).count();

    let supers = lexeme::to_super_tokens(lexeme::to_lexemes(&tokens));
    let laid_out = layout::apply(supers, config.layout);

    let mut out = Vec::with_capacity(tokens.len() + laid_out.len() / 2);
    out.extend_from_slice(&tokens[..leading]);
    out.extend(laid_out.iter().flat_map(SuperToken::tokens).copied());

    debug!(
        tokens = out.len(),
        synthesized = out.len() - tokens.len(),
        "lexed"
    );
    out
}

/// The tokens the parser consumes: everything but trivia.
#[must_use]
pub fn significant(tokens: &[SourceToken]) -> Vec<SourceToken> {
    tokens
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .copied()
        .collect()
}
