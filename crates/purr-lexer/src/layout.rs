//! The offside rule.
//!
//! PureScript delimits blocks by indentation. This module turns the
//! [`SuperToken`] stream into one where blocks are explicit, by inserting
//! three zero-width tokens:
//!
//! - [`TokenKind::LayoutStart`] after `where`, `of`, `let`, `do` and `ado`,
//!   anchored at the column of the token that follows the keyword;
//! - [`TokenKind::LayoutSep`] before a token that starts a new line at the
//!   anchor column of the innermost block;
//! - [`TokenKind::LayoutEnd`] when a token is left of that column, and for
//!   every block still open at the end of input.
//!
//! ```text
//! f x = case x of       -- LayoutStart before `Just`
//!   Just y -> y
//!   Nothing -> 0        -- LayoutSep before `Nothing`
//! g = 1                 -- LayoutEnd before `g`
//! ```
//!
//! Besides the indentation-sensitive frames, the stack holds masking frames
//! for brackets, `case` heads, guards, lambdas, `if`/`then` and the like.
//! They decide which tokens may close or separate a block: a comma inside
//! `[ do a, b ]` closes the `do`, while a comma in `case a, b of` does not
//! open anything.

use purr_span::SourcePos;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::lexeme::SuperToken;
use crate::token::TokenKind;

/// Layout options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Let `{ a; b }` after a layout keyword stand in for an implicit block.
    /// Off by default: PureScript itself reads the brace as a record.
    pub explicit_blocks: bool,
}

/// One frame of the layout stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutDelimiter {
    /// Bottom of every stack.
    Root,
    /// A `data` declaration, masking its `|`.
    TopDecl,
    /// A `class` head, masking the commas of functional dependencies.
    TopDeclHead,
    /// A guard in a `let` or `where` binding.
    DeclGuard,
    /// A `case` head, up to `of`.
    Case,
    /// Binders of a case branch, up to `->`.
    CaseBinders,
    /// A guard in a case branch.
    CaseGuard,
    /// Binders of a lambda, up to `->`.
    LambdaBinders,
    /// `(`
    Paren,
    /// `{` of a record.
    Brace,
    /// `[`
    Square,
    /// `if`
    If,
    /// `then`
    Then,
    /// A record label or accessed property, where keywords are plain names.
    Property,
    /// `forall`, up to its `.`.
    Forall,
    /// An infix `` `f` ``.
    Tick,
    /// `let ... in`
    Let,
    /// `let` as a `do` or `ado` statement.
    LetStmt,
    /// `where`
    Where,
    /// `of`
    Of,
    /// `do`
    Do,
    /// `ado`
    Ado,
    /// An explicit `{ ... }` block after a layout keyword.
    Block,
}

impl LayoutDelimiter {
    /// Whether the frame is indentation-sensitive, and so owes a
    /// [`TokenKind::LayoutEnd`] when popped.
    #[must_use]
    pub fn is_indented(self) -> bool {
        matches!(
            self,
            Self::Let | Self::LetStmt | Self::Where | Self::Of | Self::Do | Self::Ado
        )
    }
}

/// A frame: the delimiter and the position it is anchored at.
pub type Frame = (SourcePos, LayoutDelimiter);

/// The layout state between two tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutStack {
    /// Bottom first; `frames[0]` is always the root.
    frames: Vec<Frame>,
    config: LayoutConfig,
    /// A layout keyword was followed by `{` and explicit blocks are enabled.
    pending_block: bool,
}

impl Default for LayoutStack {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutStack {
    /// A stack holding only the root frame at (0, 0).
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            frames: vec![(SourcePos::ZERO, LayoutDelimiter::Root)],
            config,
            pending_block: false,
        }
    }

    /// Frames from the bottom up.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of indentation-sensitive frames, i.e. block ends still owed.
    #[must_use]
    pub fn open_blocks(&self) -> usize {
        self.frames.iter().filter(|(_, d)| d.is_indented()).count()
    }

    /// Feed one token.
    ///
    /// `next_pos` is where the following token starts (for the last token,
    /// the end of input) and `next_kind` its first kind. Returns the updated
    /// stack and the tokens to emit in order: synthesized layout tokens and
    /// `token` itself.
    #[must_use]
    pub fn insert_layout(
        self,
        token: SuperToken,
        next_pos: SourcePos,
        next_kind: Option<TokenKind>,
    ) -> (Self, Vec<SuperToken>) {
        let mut ins = Insertion {
            tok_pos: token.start(),
            next_pos,
            next_kind,
            kind: token.core_kind(),
            qualified: token.is_qualified(),
            token: Some(token),
            stack: self,
            out: Vec::with_capacity(2),
        };
        ins.insert();
        (ins.stack, ins.out)
    }

    /// Close every block still open, at `end`.
    #[must_use]
    pub fn unwind(self, end: SourcePos) -> Vec<SuperToken> {
        self.frames
            .iter()
            .rev()
            .filter(|(_, d)| d.is_indented())
            .map(|_| SuperToken::synthetic(TokenKind::LayoutEnd, end))
            .collect()
    }

    fn top(&self) -> LayoutDelimiter {
        self.frames.last().map_or(LayoutDelimiter::Root, |f| f.1)
    }
}

/// Run the layout engine over a whole token stream.
#[must_use]
pub fn apply(tokens: Vec<SuperToken>, config: LayoutConfig) -> Vec<SuperToken> {
    let mut stack = LayoutStack::new(config);
    let mut out = Vec::with_capacity(tokens.len() + tokens.len() / 4);
    let mut end = SourcePos::ZERO;

    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        let next_pos = token.end();
        let next_kind = tokens.peek().and_then(SuperToken::first_kind);
        end = next_pos;
        let (next_stack, emitted) = stack.insert_layout(token, next_pos, next_kind);
        stack = next_stack;
        out.extend(emitted);
    }

    out.extend(stack.unwind(end));
    out
}

/// Which frames a token closes on its way to the stack top.
#[derive(Clone, Copy, Debug)]
enum Collapse {
    /// Indented frames strictly right of the token.
    Offside,
    /// Indented frames right of or at the token's column.
    OffsideEnd,
    /// Every indented frame.
    Indented,
    /// `where` closes `do` blocks regardless of column.
    Where,
    /// `in` closes indented frames up to its `let` or `ado`.
    In,
    /// `->` closes `do` blocks, but never the `of` it belongs to.
    Arrow,
    /// `=` closes the bindings a guard may belong to.
    Equals,
}

impl Collapse {
    fn closes(self, tok: SourcePos, (pos, lyt): Frame) -> bool {
        use LayoutDelimiter as L;
        let offside_end = lyt.is_indented() && tok.column <= pos.column;
        match self {
            Self::Offside => lyt.is_indented() && tok.column < pos.column,
            Self::OffsideEnd => offside_end,
            Self::Indented => lyt.is_indented(),
            Self::Where => lyt == L::Do || offside_end,
            Self::In => !matches!(lyt, L::Let | L::Ado) && lyt.is_indented(),
            Self::Arrow => lyt == L::Do || (lyt != L::Of && offside_end),
            Self::Equals => matches!(lyt, L::Where | L::Let | L::LetStmt),
        }
    }
}

/// Working state while one token is inserted.
struct Insertion {
    tok_pos: SourcePos,
    next_pos: SourcePos,
    next_kind: Option<TokenKind>,
    kind: Option<TokenKind>,
    qualified: bool,
    token: Option<SuperToken>,
    stack: LayoutStack,
    out: Vec<SuperToken>,
}

impl Insertion {
    fn insert(&mut self) {
        use LayoutDelimiter as L;
        use TokenKind as T;

        let Some(kind) = self.kind else {
            self.insert_default();
            return;
        };
        let unqualified = !self.qualified;

        match kind {
            T::Data | T::Class if unqualified => {
                self.insert_default();
                if self.is_top_decl() {
                    let lyt = if kind == T::Data { L::TopDecl } else { L::TopDeclHead };
                    self.push(self.tok_pos, lyt);
                } else {
                    self.pop_if(|d| d == L::Property);
                }
            }

            T::Where if unqualified => match self.stack.top() {
                L::TopDeclHead => {
                    self.pop();
                    self.insert_token();
                    self.insert_start(L::Where);
                }
                L::Property => {
                    self.pop();
                    self.insert_token();
                }
                _ => {
                    self.collapse(Collapse::Where);
                    self.insert_token();
                    self.insert_start(L::Where);
                }
            },

            T::In if unqualified => {
                let len = self.collapsed_len(Collapse::In);
                let top = self.stack.frames[len - 1].1;
                let below = len.checked_sub(2).map(|i| self.stack.frames[i].1);
                if top == L::LetStmt && below == Some(L::Ado) {
                    // `in` always ends an `ado`, together with its last `let`.
                    self.truncate(len - 2);
                    self.insert_token();
                } else if top.is_indented() {
                    self.truncate(len - 1);
                    self.insert_token();
                } else {
                    self.insert_default();
                    self.pop_if(|d| d == L::Property);
                }
            }

            T::Let if unqualified => {
                if self.insert_kw_property() {
                    let (pos, top) = self.top_frame();
                    let in_stmt = matches!(top, L::Do | L::Ado) && pos.column == self.tok_pos.column;
                    self.insert_start(if in_stmt { L::LetStmt } else { L::Let });
                }
            }

            T::Do => {
                if self.insert_kw_property() {
                    self.insert_start(L::Do);
                }
            }

            T::Ado => {
                if self.insert_kw_property() {
                    self.insert_start(L::Ado);
                }
            }

            T::Case if unqualified => {
                if self.insert_kw_property() {
                    self.push(self.tok_pos, L::Case);
                }
            }

            T::Of if unqualified => {
                let len = self.collapsed_len(Collapse::Offside);
                if self.stack.frames[len - 1].1 == L::Case {
                    self.truncate(len - 1);
                    self.insert_token();
                    self.insert_start(L::Of);
                    if !self.stack.pending_block {
                        self.push(self.next_pos, L::CaseBinders);
                    }
                } else {
                    self.truncate(len);
                    self.insert_default();
                    self.pop_if(|d| d == L::Property);
                }
            }

            T::If if unqualified => {
                if self.insert_kw_property() {
                    self.push(self.tok_pos, L::If);
                }
            }

            T::Then if unqualified => {
                let len = self.collapsed_len(Collapse::Indented);
                if self.stack.frames[len - 1].1 == L::If {
                    self.truncate(len - 1);
                    self.insert_token();
                    self.push(self.tok_pos, L::Then);
                } else {
                    self.insert_default();
                    self.pop_if(|d| d == L::Property);
                }
            }

            T::Else if unqualified => {
                let len = self.collapsed_len(Collapse::Indented);
                if self.stack.frames[len - 1].1 == L::Then {
                    self.truncate(len - 1);
                    self.insert_token();
                } else {
                    self.collapse(Collapse::Offside);
                    if self.is_top_decl() {
                        // `else instance` in an instance chain.
                        self.insert_token();
                    } else {
                        self.insert_sep();
                        self.insert_token();
                        self.pop_if(|d| d == L::Property);
                    }
                }
            }

            T::Forall => {
                if self.insert_kw_property() {
                    self.push(self.tok_pos, L::Forall);
                }
            }

            T::Backslash => {
                self.insert_default();
                self.push(self.tok_pos, L::LambdaBinders);
            }

            T::Arrow => {
                self.collapse(Collapse::Arrow);
                self.pop_if(|d| matches!(d, L::CaseBinders | L::CaseGuard | L::LambdaBinders));
                self.insert_token();
            }

            T::Eq => {
                let len = self.collapsed_len(Collapse::Equals);
                if self.stack.frames[len - 1].1 == L::DeclGuard {
                    self.truncate(len - 1);
                    self.insert_token();
                } else {
                    self.insert_default();
                }
            }

            T::Pipe => {
                let len = self.collapsed_len(Collapse::OffsideEnd);
                let guard = match self.stack.frames[len - 1].1 {
                    L::Of => Some(L::CaseGuard),
                    L::Let | L::LetStmt | L::Where => Some(L::DeclGuard),
                    _ => None,
                };
                match guard {
                    Some(lyt) => {
                        self.truncate(len);
                        self.push(self.tok_pos, lyt);
                        self.insert_token();
                    }
                    None => self.insert_default(),
                }
            }

            T::Backtick => {
                let len = self.collapsed_len(Collapse::Indented);
                if self.stack.frames[len - 1].1 == L::Tick {
                    self.truncate(len - 1);
                    self.insert_token();
                } else {
                    self.collapse(Collapse::OffsideEnd);
                    self.insert_sep();
                    self.insert_token();
                    self.push(self.tok_pos, L::Tick);
                }
            }

            T::Comma => {
                self.collapse(Collapse::Indented);
                self.insert_token();
                if self.stack.top() == L::Brace {
                    self.push(self.tok_pos, L::Property);
                }
            }

            T::Dot => {
                self.insert_default();
                if self.stack.top() == L::Forall {
                    self.pop();
                } else {
                    self.push(self.tok_pos, L::Property);
                }
            }

            T::LParen => {
                self.insert_default();
                self.push(self.tok_pos, L::Paren);
            }

            T::LBrace => {
                self.insert_default();
                if std::mem::take(&mut self.stack.pending_block) {
                    self.push(self.tok_pos, L::Block);
                } else {
                    self.push(self.tok_pos, L::Brace);
                    self.push(self.tok_pos, L::Property);
                }
            }

            T::LBracket => {
                self.insert_default();
                self.push(self.tok_pos, L::Square);
            }

            T::RParen => {
                self.collapse(Collapse::Indented);
                self.pop_if(|d| d == L::Paren);
                self.insert_token();
            }

            T::RBrace => {
                self.collapse(Collapse::Indented);
                if self.stack.top() == L::Block {
                    self.pop();
                } else {
                    self.pop_if(|d| d == L::Property);
                    self.pop_if(|d| d == L::Brace);
                }
                self.insert_token();
            }

            T::RBracket => {
                self.collapse(Collapse::Indented);
                self.pop_if(|d| d == L::Square);
                self.insert_token();
            }

            T::Semi if self.stack.config.explicit_blocks => {
                let len = self.collapsed_len(Collapse::Indented);
                if self.stack.frames[len - 1].1 == L::Block {
                    self.truncate(len);
                    self.insert_token();
                } else {
                    self.insert_default();
                }
            }

            T::String => {
                self.insert_default();
                self.pop_if(|d| d == L::Property);
            }

            // Names, and keywords that may appear as record labels.
            k if unqualified && (k == T::LowerName || k.is_keyword() || k == T::Boolean) => {
                self.insert_default();
                self.pop_if(|d| d == L::Property);
            }

            T::Operator => {
                self.collapse(Collapse::OffsideEnd);
                self.insert_sep();
                self.insert_token();
            }

            _ => self.insert_default(),
        }
    }

    fn insert_default(&mut self) {
        self.collapse(Collapse::Offside);
        self.insert_sep();
        self.insert_token();
    }

    /// Insert the token as a keyword. Returns `false` when it turned out to
    /// be a record label, in which case no block may follow.
    fn insert_kw_property(&mut self) -> bool {
        self.insert_default();
        if self.stack.top() == LayoutDelimiter::Property {
            self.pop();
            false
        } else {
            true
        }
    }

    /// Open an indented block at the next token, if that indents further
    /// than the enclosing block.
    fn insert_start(&mut self, lyt: LayoutDelimiter) {
        if self.stack.config.explicit_blocks && self.next_kind == Some(TokenKind::LBrace) {
            self.stack.pending_block = true;
            return;
        }
        let enclosing = self.stack.frames.iter().rev().find(|(_, d)| d.is_indented());
        if let Some((pos, _)) = enclosing {
            if self.next_pos.column <= pos.column {
                return;
            }
        }
        self.push(self.next_pos, lyt);
        self.emit(TokenKind::LayoutStart, self.next_pos);
    }

    fn insert_sep(&mut self) {
        use LayoutDelimiter as L;

        let (pos, lyt) = self.top_frame();
        let same_column_new_line =
            self.tok_pos.column == pos.column && self.tok_pos.line != pos.line;
        if !same_column_new_line {
            return;
        }
        match lyt {
            L::TopDecl | L::TopDeclHead => {
                self.pop();
                self.emit(TokenKind::LayoutSep, self.tok_pos);
            }
            L::Of => {
                self.emit(TokenKind::LayoutSep, self.tok_pos);
                self.push(self.tok_pos, L::CaseBinders);
            }
            lyt if lyt.is_indented() => self.emit(TokenKind::LayoutSep, self.tok_pos),
            _ => {}
        }
    }

    fn insert_token(&mut self) {
        if let Some(token) = self.token.take() {
            self.out.push(token);
        }
    }

    fn emit(&mut self, kind: TokenKind, pos: SourcePos) {
        self.out.push(SuperToken::synthetic(kind, pos));
    }

    /// Whether the token sits at the column of the module's top-level block.
    fn is_top_decl(&self) -> bool {
        match self.stack.frames.as_slice() {
            [(_, LayoutDelimiter::Root), (pos, LayoutDelimiter::Where)] => {
                pos.column == self.tok_pos.column
            }
            _ => false,
        }
    }

    fn top_frame(&self) -> Frame {
        self.stack
            .frames
            .last()
            .copied()
            .unwrap_or((SourcePos::ZERO, LayoutDelimiter::Root))
    }

    fn push(&mut self, pos: SourcePos, lyt: LayoutDelimiter) {
        trace!(delimiter = ?lyt, line = pos.line, column = pos.column, "push layout frame");
        self.stack.frames.push((pos, lyt));
    }

    fn pop(&mut self) {
        if self.stack.frames.len() > 1 {
            self.stack.frames.pop();
        }
    }

    fn pop_if(&mut self, p: impl Fn(LayoutDelimiter) -> bool) {
        if p(self.stack.top()) {
            self.pop();
        }
    }

    /// Stack length after popping every frame `c` closes. The root is never
    /// closed, so the result is at least 1.
    fn collapsed_len(&self, c: Collapse) -> usize {
        let frames = &self.stack.frames;
        let mut len = frames.len();
        while len > 1 && c.closes(self.tok_pos, frames[len - 1]) {
            len -= 1;
        }
        len
    }

    /// Pop down to `len` frames, closing indented ones at the token.
    fn truncate(&mut self, len: usize) {
        while self.stack.frames.len() > len.max(1) {
            let Some((_, lyt)) = self.stack.frames.pop() else {
                break;
            };
            trace!(delimiter = ?lyt, "close layout frame");
            if lyt.is_indented() {
                self.emit(TokenKind::LayoutEnd, self.tok_pos);
            }
        }
    }

    fn collapse(&mut self, c: Collapse) {
        let len = self.collapsed_len(c);
        self.truncate(len);
    }
}
