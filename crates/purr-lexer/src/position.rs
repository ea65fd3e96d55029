//! Line and column assignment.
//!
//! Tokenizers report byte offsets only. The layout engine needs columns, so
//! positions are recomputed here in one fold over the token list: every token
//! starts where its predecessor ended, and its end is found by scanning the
//! text between the two ends.

use purr_span::SourcePos;

use crate::token::{RawToken, SourceToken, TokenKind};

/// Assign line/column positions to raw byte-offset tokens.
///
/// Columns count chars, not bytes. Tokens whose offsets run backwards or
/// past the end of `src` are clamped rather than rejected.
#[must_use]
pub fn correct_positions(src: &str, raw: &[RawToken]) -> Vec<SourceToken> {
    let mut prev = SourceToken::synthetic(TokenKind::Whitespace, SourcePos::ZERO);
    raw.iter()
        .map(|token| {
            let start = prev.end;
            let end = advance(src, start, token.end);
            prev = SourceToken::new(token.kind, start, end);
            prev
        })
        .collect()
}

/// The position reached by moving from `from` to byte offset `to`.
fn advance(src: &str, from: SourcePos, to: u32) -> SourcePos {
    let to = to.clamp(from.offset, src.len() as u32);
    let text = src.get(from.offset as usize..to as usize).unwrap_or("");

    match text.rfind('\n') {
        None => SourcePos::new(
            from.line,
            from.column + text.chars().count() as u32,
            to,
        ),
        Some(last_newline) => SourcePos::new(
            from.line + text.matches('\n').count() as u32,
            text[last_newline + 1..].chars().count() as u32,
            to,
        ),
    }
}
