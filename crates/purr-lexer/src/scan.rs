//! Reference tokenizer.
//!
//! [`scan`] cuts a buffer into [`RawToken`]s that tile it exactly, trivia
//! included. It never fails: characters it does not understand become
//! [`TokenKind::Error`] tokens and scanning continues after them.

use unicode_xid::UnicodeXID;

use crate::token::{RawToken, TokenKind};

/// Tokenize a whole buffer.
#[must_use]
pub fn scan(src: &str) -> Vec<RawToken> {
    let mut scanner = Scanner::new(src);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token() {
        tokens.push(token);
    }
    tokens
}

struct Scanner<'src> {
    src: &'src str,
    pos: usize,
    /// Kind and end offset of the last token, used to split qualifiers.
    prev: Option<(TokenKind, usize)>,
}

impl<'src> Scanner<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            prev: None,
        }
    }

    fn remaining(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.remaining().chars();
        chars.next();
        chars.next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        &self.src[start..self.pos]
    }

    fn next_token(&mut self) -> Option<RawToken> {
        let start = self.pos;
        let c = self.peek()?;

        let kind = match c {
            c if c.is_whitespace() => {
                self.advance_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            '-' if self.at_line_comment() => self.line_comment(),
            '{' if self.starts_with("{-") => self.block_comment(),

            c if is_ident_start(c) => self.ident(),
            c if c.is_ascii_digit() => self.number(),
            '"' => self.string(),
            '\'' => self.char_literal(),

            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semi),
            '`' => self.single(TokenKind::Backtick),

            // `Foo.+` qualifies the operator `+`; keep the dot on its own.
            '.' if self.prev == Some((TokenKind::ProperName, start)) => {
                self.single(TokenKind::Dot)
            }

            c if is_operator_char(c) => self.operator(),

            _ => self.single(TokenKind::Error),
        };

        self.prev = Some((kind, self.pos));
        Some(RawToken::new(kind, start as u32, self.pos as u32))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// `--` starts a comment unless it is part of a longer operator such as
    /// `-->`.
    fn at_line_comment(&self) -> bool {
        if !self.starts_with("--") {
            return false;
        }
        let dashes = self.remaining().trim_start_matches('-');
        !dashes.chars().next().is_some_and(is_operator_char)
    }

    fn line_comment(&mut self) -> TokenKind {
        let doc = self.starts_with("-- |");
        self.advance_while(|c| c != '\n' && c != '\r');
        if doc {
            TokenKind::DocComment
        } else {
            TokenKind::LineComment
        }
    }

    fn block_comment(&mut self) -> TokenKind {
        self.advance(); // {
        self.advance(); // -

        let mut depth = 1;
        while depth > 0 {
            match self.peek() {
                Some('{') if self.peek2() == Some('-') => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                Some('-') if self.peek2() == Some('}') => {
                    self.advance();
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {
                    self.advance();
                }
                None => break,
            }
        }
        TokenKind::BlockComment
    }

    fn ident(&mut self) -> TokenKind {
        let text = self.advance_while(is_ident_continue);
        if let Some(kw) = TokenKind::from_keyword(text) {
            kw
        } else if text.starts_with(char::is_uppercase) {
            TokenKind::ProperName
        } else {
            TokenKind::LowerName
        }
    }

    fn number(&mut self) -> TokenKind {
        if self.starts_with("0x") || self.starts_with("0X") {
            self.advance();
            self.advance();
            self.advance_while(|c| c.is_ascii_hexdigit());
            return TokenKind::Integer;
        }

        self.advance_while(|c| c.is_ascii_digit() || c == '_');
        let mut kind = TokenKind::Integer;

        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // .
            self.advance_while(|c| c.is_ascii_digit() || c == '_');
            kind = TokenKind::Number;
        }

        if let Some('e' | 'E') = self.peek() {
            let save = self.pos;
            self.advance();
            if let Some('+' | '-') = self.peek() {
                self.advance();
            }
            if self.advance_while(|c| c.is_ascii_digit()).is_empty() {
                // `1e` is an integer followed by a name.
                self.pos = save;
            } else {
                kind = TokenKind::Number;
            }
        }
        kind
    }

    fn string(&mut self) -> TokenKind {
        if self.starts_with("\"\"\"") {
            self.pos += 3;
            return match self.remaining().find("\"\"\"") {
                Some(end) => {
                    self.pos += end + 3;
                    // Raw strings may end in extra quotes: `""""a""""`.
                    self.advance_while(|c| c == '"');
                    TokenKind::String
                }
                None => {
                    self.pos = self.src.len();
                    TokenKind::Error
                }
            };
        }

        self.advance(); // "
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return TokenKind::String;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(char::is_whitespace) {
                        // String gap: `\   \`
                        self.advance_while(char::is_whitespace);
                        if self.peek() == Some('\\') {
                            self.advance();
                        }
                    } else {
                        self.advance();
                    }
                }
                Some('\n') | None => return TokenKind::Error,
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn char_literal(&mut self) -> TokenKind {
        self.advance(); // '
        match self.peek() {
            Some('\\') => {
                self.advance();
                match self.peek() {
                    Some('x') => {
                        self.advance();
                        self.advance_while(|c| c.is_ascii_hexdigit());
                    }
                    Some('\n') | None => return TokenKind::Error,
                    Some(_) => {
                        self.advance();
                    }
                }
            }
            Some('\'' | '\n') | None => return TokenKind::Error,
            Some(_) => {
                self.advance();
            }
        }
        if self.peek() == Some('\'') {
            self.advance();
            TokenKind::Char
        } else {
            TokenKind::Error
        }
    }

    fn operator(&mut self) -> TokenKind {
        let text = self.advance_while(is_operator_char);
        TokenKind::from_reserved_operator(text).unwrap_or(TokenKind::Operator)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_xid_start()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '\'' || c.is_xid_continue()
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        ':' | '!' | '#' | '$' | '%' | '&' | '*' | '+' | '.' | '/' | '<' | '=' | '>' | '?' | '@'
            | '\\' | '^' | '|' | '-' | '~'
    ) || is_unicode_symbol(c)
}

fn is_unicode_symbol(c: char) -> bool {
    matches!(
        c,
        '→' | '⇒' | '←' | '∷' | '∀' | '∘' | '∙' | '⊕' | '⊗' | '≡' | '≠' | '≤' | '≥' | '⋘' | '⋙'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        scan(src)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Whitespace)
            .collect()
    }

    #[test]
    fn test_tokens_tile_the_buffer() {
        let src = "module Main where\n\n-- | doc\nfoo = {- c -} 1\n";
        let tokens = scan(src);
        let mut at = 0;
        for t in &tokens {
            assert_eq!(t.start, at);
            at = t.end;
        }
        assert_eq!(at as usize, src.len());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("let in where if then else case of do ado"),
            vec![
                TokenKind::Let,
                TokenKind::In,
                TokenKind::Where,
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Else,
                TokenKind::Case,
                TokenKind::Of,
                TokenKind::Do,
                TokenKind::Ado,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("foo bar' _x _ Maybe true"),
            vec![
                TokenKind::LowerName,
                TokenKind::LowerName,
                TokenKind::LowerName,
                TokenKind::Underscore,
                TokenKind::ProperName,
                TokenKind::Boolean,
            ]
        );
    }

    #[test]
    fn test_qualified_names_are_split() {
        assert_eq!(
            kinds("Data.Maybe.fromMaybe"),
            vec![
                TokenKind::ProperName,
                TokenKind::Dot,
                TokenKind::ProperName,
                TokenKind::Dot,
                TokenKind::LowerName,
            ]
        );
        assert_eq!(
            kinds("Data.Map.<>"),
            vec![
                TokenKind::ProperName,
                TokenKind::Dot,
                TokenKind::ProperName,
                TokenKind::Dot,
                TokenKind::Operator,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 0xFF 3.14 1e10 1_000 2.5e-3"),
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Integer,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<> - -> <- => :: .. . = | \\ @ : → ∀"),
            vec![
                TokenKind::Operator,
                TokenKind::Operator,
                TokenKind::Arrow,
                TokenKind::LeftArrow,
                TokenKind::FatArrow,
                TokenKind::DoubleColon,
                TokenKind::DotDot,
                TokenKind::Dot,
                TokenKind::Eq,
                TokenKind::Pipe,
                TokenKind::Backslash,
                TokenKind::At,
                TokenKind::Operator,
                TokenKind::Arrow,
                TokenKind::Forall,
            ]
        );
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(
            kinds(r#""hi\n" """raw "q" """ 'a' '\n' '\x41'"#),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::Char,
                TokenKind::Char,
                TokenKind::Char,
            ]
        );
        assert_eq!(kinds("\"open\nx"), vec![TokenKind::Error, TokenKind::LowerName]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("x -- comment\n-- | doc\n{- a {- nested -} b -} y --> z"),
            vec![
                TokenKind::LowerName,
                TokenKind::LineComment,
                TokenKind::DocComment,
                TokenKind::BlockComment,
                TokenKind::LowerName,
                TokenKind::Operator,
                TokenKind::LowerName,
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(
            kinds("a § b"),
            vec![TokenKind::LowerName, TokenKind::Error, TokenKind::LowerName]
        );
    }
}
