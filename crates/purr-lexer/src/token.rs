//! Token definitions for the purr lexer.

use std::fmt;

use purr_span::{SourcePos, SourceRange, Span};
use serde::{Deserialize, Serialize};

/// The kind of a token.
///
/// Kinds carry no payload; the text of a token is recovered from the source
/// buffer through its positions. The discriminants are dense and below 128,
/// which lets the parser keep sets of kinds in a single `u128`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenKind {
    // =========================================================================
    // Trivia
    // =========================================================================
    /// A run of whitespace, newlines included.
    Whitespace,
    /// `-- ...`
    LineComment,
    /// `-- | ...`
    DocComment,
    /// `{- ... -}`
    BlockComment,

    // =========================================================================
    // Layout (synthesized, zero width)
    // =========================================================================
    /// Opens an implicit block.
    LayoutStart,
    /// Separates items of an implicit block.
    LayoutSep,
    /// Closes an implicit block.
    LayoutEnd,

    // =========================================================================
    // Keywords
    // =========================================================================
    /// `module`
    Module,
    /// `where`
    Where,
    /// `import`
    Import,
    /// `as`
    As,
    /// `hiding`
    Hiding,
    /// `data`
    Data,
    /// `newtype`
    Newtype,
    /// `type`
    Type,
    /// `class`
    Class,
    /// `instance`
    Instance,
    /// `derive`
    Derive,
    /// `foreign`
    Foreign,
    /// `infixl`
    Infixl,
    /// `infixr`
    Infixr,
    /// `infix`
    Infix,
    /// `case`
    Case,
    /// `of`
    Of,
    /// `let`
    Let,
    /// `in`
    In,
    /// `do`
    Do,
    /// `ado`
    Ado,
    /// `if`
    If,
    /// `then`
    Then,
    /// `else`
    Else,
    /// `forall` / `∀`
    Forall,

    // =========================================================================
    // Names and literals
    // =========================================================================
    /// `foo`, `_bar`, `x'`
    LowerName,
    /// `Maybe`, `Just`
    ProperName,
    /// `<>`, `>>=`, `:`
    Operator,
    /// `42`, `0xFF`
    Integer,
    /// `3.14`, `1e10`
    Number,
    /// `"..."` and `"""..."""`
    String,
    /// `'a'`
    Char,
    /// `true` / `false`
    Boolean,

    // =========================================================================
    // Punctuation and reserved operators
    // =========================================================================
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `` ` ``
    Backtick,
    /// `_`
    Underscore,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `::` / `∷`
    DoubleColon,
    /// `=`
    Eq,
    /// `|`
    Pipe,
    /// `\`
    Backslash,
    /// `->` / `→`
    Arrow,
    /// `=>` / `⇒`
    FatArrow,
    /// `<-` / `←`
    LeftArrow,
    /// `@`
    At,

    /// A character the tokenizer could not make sense of.
    Error,
}

impl TokenKind {
    /// Every kind, in discriminant order.
    pub const ALL: [Self; 61] = [
        Self::Whitespace,
        Self::LineComment,
        Self::DocComment,
        Self::BlockComment,
        Self::LayoutStart,
        Self::LayoutSep,
        Self::LayoutEnd,
        Self::Module,
        Self::Where,
        Self::Import,
        Self::As,
        Self::Hiding,
        Self::Data,
        Self::Newtype,
        Self::Type,
        Self::Class,
        Self::Instance,
        Self::Derive,
        Self::Foreign,
        Self::Infixl,
        Self::Infixr,
        Self::Infix,
        Self::Case,
        Self::Of,
        Self::Let,
        Self::In,
        Self::Do,
        Self::Ado,
        Self::If,
        Self::Then,
        Self::Else,
        Self::Forall,
        Self::LowerName,
        Self::ProperName,
        Self::Operator,
        Self::Integer,
        Self::Number,
        Self::String,
        Self::Char,
        Self::Boolean,
        Self::LParen,
        Self::RParen,
        Self::LBrace,
        Self::RBrace,
        Self::LBracket,
        Self::RBracket,
        Self::Comma,
        Self::Semi,
        Self::Backtick,
        Self::Underscore,
        Self::Dot,
        Self::DotDot,
        Self::DoubleColon,
        Self::Eq,
        Self::Pipe,
        Self::Backslash,
        Self::Arrow,
        Self::FatArrow,
        Self::LeftArrow,
        Self::At,
        Self::Error,
    ];

    /// Number of distinct kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Whether the parser should skip this token.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::DocComment | Self::BlockComment
        )
    }

    /// Whether this token is synthesized by the layout engine.
    #[must_use]
    pub fn is_layout(self) -> bool {
        matches!(self, Self::LayoutStart | Self::LayoutSep | Self::LayoutEnd)
    }

    /// Whether this is a reserved word.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        (Self::Module as u8..=Self::Forall as u8).contains(&(self as u8))
    }

    /// Whether this kind is a literal.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Number | Self::String | Self::Char | Self::Boolean
        )
    }

    /// Human-readable description, used in "expected ..." messages.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LineComment => "comment",
            Self::DocComment => "doc comment",
            Self::BlockComment => "block comment",

            Self::LayoutStart => "start of block",
            Self::LayoutSep => "new line in block",
            Self::LayoutEnd => "end of block",

            Self::Module => "`module`",
            Self::Where => "`where`",
            Self::Import => "`import`",
            Self::As => "`as`",
            Self::Hiding => "`hiding`",
            Self::Data => "`data`",
            Self::Newtype => "`newtype`",
            Self::Type => "`type`",
            Self::Class => "`class`",
            Self::Instance => "`instance`",
            Self::Derive => "`derive`",
            Self::Foreign => "`foreign`",
            Self::Infixl => "`infixl`",
            Self::Infixr => "`infixr`",
            Self::Infix => "`infix`",
            Self::Case => "`case`",
            Self::Of => "`of`",
            Self::Let => "`let`",
            Self::In => "`in`",
            Self::Do => "`do`",
            Self::Ado => "`ado`",
            Self::If => "`if`",
            Self::Then => "`then`",
            Self::Else => "`else`",
            Self::Forall => "`forall`",

            Self::LowerName => "identifier",
            Self::ProperName => "proper name",
            Self::Operator => "operator",
            Self::Integer => "integer literal",
            Self::Number => "number literal",
            Self::String => "string literal",
            Self::Char => "character literal",
            Self::Boolean => "boolean literal",

            Self::LParen => "`(`",
            Self::RParen => "`)`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::Comma => "`,`",
            Self::Semi => "`;`",
            Self::Backtick => "`` ` ``",
            Self::Underscore => "`_`",
            Self::Dot => "`.`",
            Self::DotDot => "`..`",
            Self::DoubleColon => "`::`",
            Self::Eq => "`=`",
            Self::Pipe => "`|`",
            Self::Backslash => "`\\`",
            Self::Arrow => "`->`",
            Self::FatArrow => "`=>`",
            Self::LeftArrow => "`<-`",
            Self::At => "`@`",

            Self::Error => "invalid character",
        }
    }

    /// Look up a reserved word.
    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "module" => Self::Module,
            "where" => Self::Where,
            "import" => Self::Import,
            "as" => Self::As,
            "hiding" => Self::Hiding,
            "data" => Self::Data,
            "newtype" => Self::Newtype,
            "type" => Self::Type,
            "class" => Self::Class,
            "instance" => Self::Instance,
            "derive" => Self::Derive,
            "foreign" => Self::Foreign,
            "infixl" => Self::Infixl,
            "infixr" => Self::Infixr,
            "infix" => Self::Infix,
            "case" => Self::Case,
            "of" => Self::Of,
            "let" => Self::Let,
            "in" => Self::In,
            "do" => Self::Do,
            "ado" => Self::Ado,
            "if" => Self::If,
            "then" => Self::Then,
            "else" => Self::Else,
            "forall" => Self::Forall,
            "true" | "false" => Self::Boolean,
            "_" => Self::Underscore,
            _ => return None,
        })
    }

    /// Look up a reserved operator spelling.
    #[must_use]
    pub fn from_reserved_operator(s: &str) -> Option<Self> {
        Some(match s {
            "." => Self::Dot,
            ".." => Self::DotDot,
            "::" | "∷" => Self::DoubleColon,
            "=" => Self::Eq,
            "|" => Self::Pipe,
            "\\" => Self::Backslash,
            "->" | "→" => Self::Arrow,
            "=>" | "⇒" => Self::FatArrow,
            "<-" | "←" => Self::LeftArrow,
            "@" => Self::At,
            "∀" => Self::Forall,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A token as produced by a tokenizer: a kind and a byte range.
///
/// Raw tokens tile the buffer: each starts where the previous one ended,
/// trivia included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    /// The token kind.
    pub kind: TokenKind,
    /// Start byte offset.
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
}

impl RawToken {
    /// Create a new raw token.
    #[must_use]
    pub const fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self { kind, start, end }
    }
}

/// A token with line/column positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceToken {
    /// The token kind.
    pub kind: TokenKind,
    /// Where the token starts.
    pub start: SourcePos,
    /// Where the token ends (exclusive).
    pub end: SourcePos,
}

impl SourceToken {
    /// Create a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, start: SourcePos, end: SourcePos) -> Self {
        Self { kind, start, end }
    }

    /// A zero-width token at `pos`, used for layout tokens.
    #[must_use]
    pub const fn synthetic(kind: TokenKind, pos: SourcePos) -> Self {
        Self {
            kind,
            start: pos,
            end: pos,
        }
    }

    /// Whether this token was inserted by the layout engine.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.kind.is_layout()
    }

    /// The positions covered by the token.
    #[must_use]
    pub const fn range(&self) -> SourceRange {
        SourceRange::new(self.start, self.end)
    }

    /// The bytes covered by the token.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::from_raw(self.start.offset, self.end.offset)
    }

    /// The token's text in `src`.
    #[must_use]
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        src.get(self.span().as_range()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_discriminant_order() {
        for (i, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
        }
        assert_eq!(TokenKind::COUNT, TokenKind::Error as usize + 1);
        assert!(TokenKind::COUNT <= 128);
    }

    #[test]
    fn test_keyword_range() {
        assert!(TokenKind::Module.is_keyword());
        assert!(TokenKind::Forall.is_keyword());
        assert!(TokenKind::Ado.is_keyword());
        assert!(!TokenKind::LowerName.is_keyword());
        assert!(!TokenKind::LayoutEnd.is_keyword());
    }

    #[test]
    fn test_from_keyword() {
        assert_eq!(TokenKind::from_keyword("ado"), Some(TokenKind::Ado));
        assert_eq!(TokenKind::from_keyword("true"), Some(TokenKind::Boolean));
        assert_eq!(TokenKind::from_keyword("mdo"), None);
    }

    #[test]
    fn test_reserved_operators() {
        assert_eq!(TokenKind::from_reserved_operator("→"), Some(TokenKind::Arrow));
        assert_eq!(TokenKind::from_reserved_operator("::"), Some(TokenKind::DoubleColon));
        assert_eq!(TokenKind::from_reserved_operator("<>"), None);
    }

    #[test]
    fn test_token_text() {
        let src = "foo bar";
        let tok = SourceToken::new(
            TokenKind::LowerName,
            SourcePos::new(0, 4, 4),
            SourcePos::new(0, 7, 7),
        );
        assert_eq!(tok.text(src), "bar");
        let lyt = SourceToken::synthetic(TokenKind::LayoutSep, SourcePos::new(0, 4, 4));
        assert!(lyt.is_synthetic());
        assert_eq!(lyt.text(src), "");
    }
}
