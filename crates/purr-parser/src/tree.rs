//! The concrete syntax tree.
//!
//! Nodes live in one arena and refer to each other by [`NodeId`]. The arena
//! is filled in preorder, so iterating over ids in order walks the tree
//! depth first. Every token of the input is a leaf, trivia and layout
//! tokens included, and the tree's text is exactly the source text.

use std::fmt::{self, Write as _};

use purr_lexer::SourceToken;
use purr_span::{SourceRange, Span};
use serde::{Deserialize, Serialize};

use crate::syntax::SyntaxKind;
use crate::ParseError;

/// Index of a node in a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The root of every non-empty tree.
    pub const ROOT: Self = Self(0);

    /// Create a new node ID.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// An interior node.
    Node {
        /// Kind of the node.
        kind: SyntaxKind,
        /// Children in source order.
        children: Vec<NodeId>,
    },
    /// A leaf.
    Token(SourceToken),
}

#[derive(Clone, Debug)]
struct Entry {
    parent: Option<NodeId>,
    data: NodeData,
    /// From the first token below to the last; filled in by
    /// [`TreeBuilder::finish`].
    range: Option<SourceRange>,
}

/// Nesting beyond this is dumped at this indentation, prefixed with the
/// real depth.
const DUMP_INDENT_LIMIT: usize = 64;

/// A syntax tree.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    entries: Vec<Entry>,
}

impl Tree {
    /// The root node, unless the tree is empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        (!self.entries.is_empty()).then_some(NodeId::ROOT)
    }

    /// Number of nodes and tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// What `id` holds.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.entries.get(id.index()).map(|e| &e.data)
    }

    /// Kind of `id`, if it is an interior node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<SyntaxKind> {
        match self.get(id)? {
            NodeData::Node { kind, .. } => Some(*kind),
            NodeData::Token(_) => None,
        }
    }

    /// The token at `id`, if it is a leaf.
    #[must_use]
    pub fn token(&self, id: NodeId) -> Option<&SourceToken> {
        match self.get(id)? {
            NodeData::Token(token) => Some(token),
            NodeData::Node { .. } => None,
        }
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(id.index()).and_then(|e| e.parent)
    }

    /// Children of `id`; empty for leaves.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(NodeData::Node { children, .. }) => children,
            _ => &[],
        }
    }

    /// Interior children of `id`, skipping tokens.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.kind(c).is_some())
    }

    /// Every node and token, depth first.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> {
        (0..self.entries.len() as u32).map(NodeId)
    }


    /// Every interior node of kind `kind`, depth first.
    pub fn nodes_of_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder().filter(move |&id| self.kind(id) == Some(kind))
    }

    /// Source covered by `id`, or `None` for a node without tokens.
    #[must_use]
    pub fn range(&self, id: NodeId) -> Option<SourceRange> {
        self.entries.get(id.index())?.range
    }

    /// Bytes covered by `id`.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.range(id).map(SourceRange::span)
    }

    /// Text of `id` in `src`.
    #[must_use]
    pub fn text<'src>(&self, id: NodeId, src: &'src str) -> &'src str {
        self.span(id)
            .and_then(|span| src.get(span.as_range()))
            .unwrap_or("")
    }

    /// An indented outline, one node or token per line. Past 64 levels the
    /// indentation stays put and each line starts with its depth instead.
    ///
    /// ```text
    /// File@0..5
    ///   LowerName@0..1 "x"
    /// ```
    #[must_use]
    pub fn debug_dump(&self, src: &str) -> String {
        let mut out = String::new();
        let padding = "  ".repeat(DUMP_INDENT_LIMIT);
        let mut depths: Vec<usize> = Vec::with_capacity(self.len());
        for id in self.preorder() {
            let depth = self
                .parent(id)
                .and_then(|p| depths.get(p.index()))
                .map_or(0, |d| d + 1);
            depths.push(depth);
            let indent = &padding[..2 * depth.min(DUMP_INDENT_LIMIT)];
            if depth > DUMP_INDENT_LIMIT {
                let _ = write!(out, "{indent}{depth}> ");
            } else {
                out.push_str(indent);
            }
            match self.get(id) {
                Some(NodeData::Node { kind, .. }) => match self.span(id) {
                    Some(span) => {
                        let _ = writeln!(out, "{kind:?}@{}..{}", span.lo, span.hi);
                    }
                    None => {
                        let _ = writeln!(out, "{kind:?}");
                    }
                },
                Some(NodeData::Token(token)) => {
                    let span = token.span();
                    let _ = writeln!(
                        out,
                        "{:?}@{}..{} {:?}",
                        token.kind,
                        span.lo,
                        span.hi,
                        token.text(src)
                    );
                }
                None => {}
            }
        }
        out
    }
}

/// Receives a tree as a sequence of events.
pub trait TreeSink {
    /// Start a node as the last child of the current one.
    fn start_node(&mut self, kind: SyntaxKind);
    /// Add a token to the current node.
    fn token(&mut self, token: SourceToken);
    /// Finish the current node.
    fn finish_node(&mut self);
    /// Report an error.
    fn error(&mut self, error: ParseError);
}

/// Builds a [`Tree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    entries: Vec<Entry>,
    stack: Vec<NodeId>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let range = match &data {
            NodeData::Token(token) => Some(SourceRange::new(token.start, token.end)),
            NodeData::Node { .. } => None,
        };
        let id = NodeId(self.entries.len() as u32);
        let parent = self.stack.last().copied();
        if let Some(Entry {
            data: NodeData::Node { children, .. },
            ..
        }) = parent.and_then(|p| self.entries.get_mut(p.index()))
        {
            children.push(id);
        }
        self.entries.push(Entry {
            parent,
            data,
            range,
        });
        id
    }

    /// The tree, and the errors sorted by position. Nodes still open are
    /// closed.
    #[must_use]
    pub fn finish(mut self) -> (Tree, Vec<ParseError>) {
        self.errors.sort_by_key(|e| e.span().lo);
        // Children come after their parent in the arena.
        for i in (0..self.entries.len()).rev() {
            let NodeData::Node { children, .. } = &self.entries[i].data else {
                continue;
            };
            let first = children.iter().find_map(|c| self.entries[c.index()].range);
            let last = children.iter().rev().find_map(|c| self.entries[c.index()].range);
            self.entries[i].range =
                first.zip(last).map(|(first, last)| SourceRange::new(first.start, last.end));
        }
        (
            Tree {
                entries: self.entries,
            },
            self.errors,
        )
    }
}

impl TreeSink for TreeBuilder {
    fn start_node(&mut self, kind: SyntaxKind) {
        let id = self.push(NodeData::Node {
            kind,
            children: Vec::new(),
        });
        self.stack.push(id);
    }

    fn token(&mut self, token: SourceToken) {
        self.push(NodeData::Token(token));
    }

    fn finish_node(&mut self) {
        self.stack.pop();
    }

    fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }
}
