//! Sets of token kinds.

use std::fmt;

use purr_lexer::TokenKind;

/// A set of [`TokenKind`]s, stored as a bitset.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TokenSet(u128);

const _: () = assert!(TokenKind::COUNT <= 128);

impl TokenSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// A set holding one kind.
    #[must_use]
    pub const fn single(kind: TokenKind) -> Self {
        Self(1 << kind as u8)
    }

    /// A set holding `kinds`.
    #[must_use]
    pub const fn new(kinds: &[TokenKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << kinds[i] as u8;
            i += 1;
        }
        Self(bits)
    }

    /// Whether `kind` is in the set.
    #[must_use]
    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    /// Kinds in either set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// The kinds in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |&k| self.contains(k))
    }
}

impl FromIterator<TokenKind> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |set, kind| set.union(Self::single(kind)))
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
