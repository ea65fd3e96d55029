//! Parsing for purr.
//!
//! Two layers:
//!
//! - a grammar engine: grammars are graphs of [`Dsl`] values combined
//!   with `+` (sequence) and `|` (ordered choice), with [`Rule`]s for
//!   recursion. [`CompiledGrammar`] precomputes which tokens every node can
//!   start with and uses that to skip alternatives that cannot match;
//! - the PureScript grammar built on it, reachable through
//!   [`parse_module`].
//!
//! Parsing never fails outright. Every input produces a [`Tree`] holding
//! every token, together with the [`ParseError`]s found on the way.
//!
//! # Example
//!
//! ```ignore
//! let parse = purr_parser::parse_module("module M where\nx = 1\n")?;
//! assert!(parse.is_ok());
//! println!("{}", parse.tree.debug_dump(src));
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod driver;
pub mod dsl;
pub mod grammar;
pub mod syntax;
pub mod token_set;
pub mod tree;

use purr_diagnostics::Diagnostic;
use purr_lexer::SourceToken;
use purr_span::{FileId, FullSpan, Span};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

pub use context::{Event, Marker, ParseOptions, ParseResult, ParserContext};
pub use driver::Driver;
pub use dsl::{
    ahead, choice, cont, empty, fold, seq, text, token, Choice, Combinator, CompiledGrammar, Dsl,
    GrammarError, GrammarStats, Rule,
};
pub use syntax::SyntaxKind;
pub use token_set::TokenSet;
pub use tree::{NodeData, NodeId, Tree, TreeBuilder, TreeSink};

/// A syntax error.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseError {
    /// Input the grammar could not account for.
    #[error("unexpected token `{found}`: expected {expected}")]
    Unexpected {
        /// The offending token's text, or a description of a layout token.
        found: String,
        /// What would have been accepted instead.
        expected: String,
        /// Where the token is.
        span: Span,
    },

    /// The input ended too early.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof {
        /// What would have been accepted instead.
        expected: String,
        /// The end of the input.
        span: Span,
    },

    /// A malformed or missing construct the parser skipped over.
    #[error("{message}")]
    Recovered {
        /// What went wrong.
        message: String,
        /// The skipped tokens; empty for a missing construct.
        span: Span,
    },
}

impl ParseError {
    /// Where the error is.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Unexpected { span, .. }
            | Self::UnexpectedEof { span, .. }
            | Self::Recovered { span, .. } => *span,
        }
    }

    /// Error code shown next to the message.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unexpected { .. } => "P0001",
            Self::UnexpectedEof { .. } => "P0002",
            Self::Recovered { .. } => "P0003",
        }
    }

    /// Convert into a diagnostic for `file`.
    #[must_use]
    pub fn to_diagnostic(&self, file: FileId) -> Diagnostic {
        let label = match self {
            Self::Unexpected { expected, .. } | Self::UnexpectedEof { expected, .. } => {
                format!("expected {expected}")
            }
            Self::Recovered { span, .. } if span.is_empty() => "missing here".to_string(),
            Self::Recovered { .. } => "skipped".to_string(),
        };
        let diagnostic = Diagnostic::error(self.to_string())
            .with_code(self.code())
            .with_label(FullSpan::new(file, self.span()), label);
        match self {
            Self::Unexpected { .. } => diagnostic.with_note("nothing after this point was parsed"),
            _ => diagnostic,
        }
    }
}

/// The result of parsing one file.
#[derive(Clone, Debug)]
pub struct Parse {
    /// The syntax tree, covering every token.
    pub tree: Tree,
    /// Errors, sorted by position.
    pub errors: Vec<ParseError>,
    /// How far the grammar got.
    pub result: ParseResult,
    /// The lexer's output, layout tokens included.
    pub tokens: Vec<SourceToken>,
}

impl Parse {
    /// Whether the input parsed without errors.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The errors as diagnostics for `file`. An unexpected token also
    /// points at the input left unparsed after it.
    #[must_use]
    pub fn diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        let unparsed = self
            .tree
            .child_nodes(NodeId::ROOT)
            .filter(|&id| self.tree.kind(id) == Some(SyntaxKind::Error))
            .last()
            .and_then(|id| self.tree.span(id));
        self.errors
            .iter()
            .map(|error| {
                let diagnostic = error.to_diagnostic(file);
                match (error, unparsed) {
                    (ParseError::Unexpected { .. }, Some(span)) => diagnostic
                        .with_secondary_label(FullSpan::new(file, span), "left unparsed"),
                    _ => diagnostic,
                }
            })
            .collect()
    }
}

/// Parse a PureScript module with default options.
///
/// # Errors
///
/// Only fails if the grammar itself is broken; syntax errors end up in
/// [`Parse::errors`].
pub fn parse_module(src: &str) -> Result<Parse, GrammarError> {
    parse_module_with(src, &ParseOptions::default())
}

/// Parse a PureScript module.
///
/// # Errors
///
/// Only fails if the grammar itself is broken; syntax errors end up in
/// [`Parse::errors`].
#[instrument(level = "debug", skip_all, fields(bytes = src.len()))]
pub fn parse_module_with(src: &str, options: &ParseOptions) -> Result<Parse, GrammarError> {
    let grammar = grammar::purescript()?;
    let tokens = purr_lexer::lex_with_config(src, &options.lexer);

    let mut builder = TreeBuilder::new();
    let result = Driver::with_options(grammar, *options).run(src, &tokens, &mut builder);
    let (tree, errors) = builder.finish();

    debug!(nodes = tree.len(), errors = errors.len(), "built tree");
    Ok(Parse {
        tree,
        errors,
        result,
        tokens,
    })
}
