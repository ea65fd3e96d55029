//! Source location tracking for purr.
//!
//! Two complementary views of a location are provided:
//!
//! - [`SourcePos`] carries line, column and byte offset together. The lexer
//!   computes these incrementally while it walks the token stream, and the
//!   layout algorithm compares columns directly.
//! - [`Span`] is a plain half-open byte range, cheap to store in diagnostics.
//!   [`SourceFile`] turns spans back into line/column pairs for rendering.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// A point in the source: 0-indexed line, 0-indexed column (in chars) and
/// byte offset.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourcePos {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column, counted in chars.
    pub column: u32,
    /// Byte offset from the start of the buffer.
    pub offset: u32,
}

impl SourcePos {
    /// The start of every buffer.
    pub const ZERO: Self = Self {
        line: 0,
        column: 0,
        offset: 0,
    };

    /// Create a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// A zero-width range located at this position.
    #[must_use]
    pub const fn to_range(self) -> SourceRange {
        SourceRange {
            start: self,
            end: self,
        }
    }
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A range between two [`SourcePos`] values, end exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// Start of the range (inclusive).
    pub start: SourcePos,
    /// End of the range (exclusive).
    pub end: SourcePos,
}

impl SourceRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }

    /// Check whether the range covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.offset == self.end.offset
    }

    /// The range from the start of `self` to the end of `other`.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }

    /// The byte span covered by this range.
    #[must_use]
    pub const fn span(self) -> Span {
        Span::from_raw(self.start.offset, self.end.offset)
    }
}

/// A half-open byte range `[lo, hi)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive).
    pub lo: u32,
    /// End offset (exclusive).
    pub hi: u32,
}

impl Span {
    /// A span for synthesized items with no useful location.
    pub const DUMMY: Self = Self { lo: 0, hi: 0 };

    /// Create a span from raw byte offsets.
    #[must_use]
    pub const fn from_raw(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.hi - self.lo
    }

    /// Check if the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.lo == self.hi
    }

    /// The smallest span covering both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// Byte range usable for slicing the source.
    #[must_use]
    pub const fn as_range(self) -> std::ops::Range<usize> {
        self.lo as usize..self.hi as usize
    }
}

impl From<SourceRange> for Span {
    fn from(range: SourceRange) -> Self {
        range.span()
    }
}

/// A unique identifier for a source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A span tied to a particular file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullSpan {
    /// The file this span belongs to.
    pub file: FileId,
    /// The span within the file.
    pub span: Span,
}

impl FullSpan {
    /// Create a new full span.
    #[must_use]
    pub const fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }
}

/// 1-indexed line/column pair used for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column, counted in chars.
    pub col: u32,
}

impl LineCol {
    /// Create a new line/column pair.
    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A named source buffer with a line table.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// The file ID.
    pub id: FileId,
    /// The file name or path.
    pub name: String,
    /// The source text.
    pub src: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Create a new source file.
    #[must_use]
    pub fn new(id: FileId, name: String, src: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();
        Self {
            id,
            name,
            src,
            line_starts,
        }
    }

    /// Line and column (1-indexed, chars) of a byte offset.
    #[must_use]
    pub fn lookup_line_col(&self, offset: u32) -> LineCol {
        let line_idx = self.lookup_line(offset);
        let line_start = self.line_starts[line_idx] as usize;
        let end = (offset as usize).min(self.src.len());
        let col = self
            .src
            .get(line_start..end)
            .map_or(0, |s| s.chars().count());
        LineCol::new(line_idx as u32 + 1, col as u32 + 1)
    }

    /// 0-indexed line containing a byte offset.
    #[must_use]
    pub fn lookup_line(&self, offset: u32) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// The text under a span, or `""` when it falls outside the buffer.
    #[must_use]
    pub fn source_text(&self, span: Span) -> &str {
        self.src.get(span.as_range()).unwrap_or("")
    }

    /// Content of a 0-indexed line without its line terminator.
    #[must_use]
    pub fn line_content(&self, line_idx: usize) -> Option<&str> {
        let start = *self.line_starts.get(line_idx)? as usize;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map_or(self.src.len(), |&next| next as usize - 1);
        self.src
            .get(start..end)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_operations() {
        let a = Span::from_raw(10, 20);
        let b = Span::from_raw(15, 30);
        assert_eq!(a.len(), 10);
        assert_eq!(a.merge(b), Span::from_raw(10, 30));
        assert!(Span::from_raw(4, 4).is_empty());
    }

    #[test]
    fn test_range_to_span() {
        let range = SourceRange::new(SourcePos::new(0, 2, 2), SourcePos::new(1, 1, 7));
        assert_eq!(range.span(), Span::from_raw(2, 7));
        assert!(!range.is_empty());
        assert!(SourcePos::new(3, 0, 9).to_range().is_empty());
    }

    #[test]
    fn test_source_file_line_lookup() {
        let file = SourceFile::new(FileId::new(0), "Main.purs".into(), "ab\ncd\nef".into());
        assert_eq!(file.lookup_line_col(0), LineCol::new(1, 1));
        assert_eq!(file.lookup_line_col(3), LineCol::new(2, 1));
        assert_eq!(file.lookup_line_col(7), LineCol::new(3, 2));
    }

    #[test]
    fn test_columns_count_chars() {
        let file = SourceFile::new(FileId::new(0), "U.purs".into(), "αβ x".into());
        // 'x' sits at byte 5 but char column 4
        assert_eq!(file.lookup_line_col(5), LineCol::new(1, 4));
    }

    #[test]
    fn test_line_content() {
        let file = SourceFile::new(FileId::new(0), "L.purs".into(), "one\r\ntwo\nthree".into());
        assert_eq!(file.line_content(0), Some("one"));
        assert_eq!(file.line_content(1), Some("two"));
        assert_eq!(file.line_content(2), Some("three"));
        assert_eq!(file.line_content(3), None);
        assert_eq!(file.num_lines(), 3);
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(SourcePos::new(0, 0, 0).to_string(), "1:1");
        assert_eq!(SourcePos::new(4, 2, 30).to_string(), "5:3");
    }
}
