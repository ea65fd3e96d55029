//! Trivia grouping and qualifier merging.
//!
//! The layout engine must never see trivia, and it must never split a
//! qualified name such as `Data.Map.lookup`. Both concerns are handled by
//! regrouping the token list before layout runs:
//!
//! 1. [`to_lexemes`] attaches every trivia token to the significant token
//!    before it.
//! 2. [`to_super_tokens`] folds `ProperName` `.` pairs written without any
//!    trivia into the token that follows them.

use purr_span::SourcePos;

use crate::token::{SourceToken, TokenKind};

/// A significant token with the trivia that follows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme {
    /// The significant token.
    pub token: SourceToken,
    /// Trivia tokens following `token`, in order.
    pub trailing: Vec<SourceToken>,
}

impl Lexeme {
    /// A lexeme with no trailing trivia.
    #[must_use]
    pub fn bare(token: SourceToken) -> Self {
        Self {
            token,
            trailing: Vec::new(),
        }
    }

    /// Kind of the significant token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }

    /// End of the lexeme, trailing trivia included.
    #[must_use]
    pub fn end(&self) -> SourcePos {
        self.trailing.last().map_or(self.token.end, |t| t.end)
    }

    /// The token followed by its trivia.
    pub fn tokens(&self) -> impl Iterator<Item = &SourceToken> {
        std::iter::once(&self.token).chain(&self.trailing)
    }
}

/// Group tokens into lexemes.
///
/// Trivia before the first significant token has nothing to attach to and is
/// dropped; [`crate::lex_raw`] keeps it aside itself.
#[must_use]
pub fn to_lexemes(tokens: &[SourceToken]) -> Vec<Lexeme> {
    let mut lexemes: Vec<Lexeme> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind.is_trivia() {
            if let Some(last) = lexemes.last_mut() {
                last.trailing.push(*token);
            }
        } else {
            lexemes.push(Lexeme::bare(*token));
        }
    }
    lexemes
}

/// A possibly qualified lexeme, the unit the layout engine works on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperToken {
    /// Alternating `ProperName` and `.` lexemes, none with trailing trivia.
    pub qualifier: Vec<Lexeme>,
    /// The qualified lexeme. `None` only for a dangling qualifier at the end
    /// of input.
    pub lexeme: Option<Lexeme>,
}

impl SuperToken {
    /// An unqualified super token.
    #[must_use]
    pub fn plain(lexeme: Lexeme) -> Self {
        Self {
            qualifier: Vec::new(),
            lexeme: Some(lexeme),
        }
    }

    /// A zero-width layout token at `pos`.
    #[must_use]
    pub fn synthetic(kind: TokenKind, pos: SourcePos) -> Self {
        Self::plain(Lexeme::bare(SourceToken::synthetic(kind, pos)))
    }

    /// Whether a qualifier is present.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        !self.qualifier.is_empty()
    }

    /// Kind of the qualified lexeme.
    #[must_use]
    pub fn core_kind(&self) -> Option<TokenKind> {
        self.lexeme.as_ref().map(Lexeme::kind)
    }

    /// Kind of the first token.
    #[must_use]
    pub fn first_kind(&self) -> Option<TokenKind> {
        self.qualifier
            .first()
            .or(self.lexeme.as_ref())
            .map(Lexeme::kind)
    }

    /// Where the first token starts.
    #[must_use]
    pub fn start(&self) -> SourcePos {
        self.qualifier
            .first()
            .or(self.lexeme.as_ref())
            .map_or(SourcePos::ZERO, |l| l.token.start)
    }

    /// Where the last trivia token ends, which is where the next token starts.
    #[must_use]
    pub fn end(&self) -> SourcePos {
        self.lexeme
            .as_ref()
            .or(self.qualifier.last())
            .map_or(SourcePos::ZERO, Lexeme::end)
    }

    /// All tokens, qualifier first, trivia included.
    pub fn tokens(&self) -> impl Iterator<Item = &SourceToken> {
        self.qualifier
            .iter()
            .chain(self.lexeme.as_ref())
            .flat_map(Lexeme::tokens)
    }

    /// Split back into lexemes.
    #[must_use]
    pub fn into_lexemes(self) -> Vec<Lexeme> {
        let mut lexemes = self.qualifier;
        lexemes.extend(self.lexeme);
        lexemes
    }
}

/// Merge qualified names into super tokens.
///
/// A `ProperName` joins the qualifier only when neither it nor the `.` after
/// it carries trivia, so `Foo.bar` merges while `Foo . bar` does not.
#[must_use]
pub fn to_super_tokens(lexemes: Vec<Lexeme>) -> Vec<SuperToken> {
    let mut supers = Vec::with_capacity(lexemes.len());
    let mut qualifier = Vec::new();
    let mut pending: Option<Lexeme> = None;

    for lexeme in lexemes {
        match pending.take() {
            None => pending = Some(lexeme),
            Some(name)
                if name.kind() == TokenKind::ProperName
                    && name.trailing.is_empty()
                    && lexeme.kind() == TokenKind::Dot
                    && lexeme.trailing.is_empty() =>
            {
                qualifier.push(name);
                qualifier.push(lexeme);
            }
            Some(core) => {
                supers.push(SuperToken {
                    qualifier: std::mem::take(&mut qualifier),
                    lexeme: Some(core),
                });
                pending = Some(lexeme);
            }
        }
    }

    if pending.is_some() || !qualifier.is_empty() {
        supers.push(SuperToken {
            qualifier,
            lexeme: pending,
        });
    }
    supers
}
