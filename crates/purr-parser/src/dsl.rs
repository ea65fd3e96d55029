//! Grammar nodes.
//!
//! A grammar is a graph of [`Dsl`] values built with the functions and
//! operators in this module:
//!
//! ```ignore
//! use purr_lexer::TokenKind as T;
//!
//! let expr = Rule::declare("expr");
//! let atom = token(T::LowerName) | (token(T::LParen) + &expr + T::RParen);
//! expr.define(fold(SyntaxKind::ExprApp, atom.clone(), atom))?;
//! ```
//!
//! Every node knows which tokens it can start with (its prediction). A node
//! that cannot possibly succeed on the next token is skipped without being
//! run, and every [`Choice`] lazily builds a table from token kind to the
//! alternatives worth trying. Alternatives next to each other in a bucket
//! that start with the same node are merged, so the shared prefix is only
//! parsed once.
//!
//! Recursion goes through [`Rule`]s, which are declared first and defined
//! once.

use std::fmt;
use std::ops::{Add, BitOr};
use std::sync::{Arc, OnceLock};

use purr_lexer::TokenKind;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::context::ParserContext;
use crate::syntax::SyntaxKind;
use crate::token_set::TokenSet;

/// A malformed grammar.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// [`Rule::define`] was called twice.
    #[error("rule `{0}` is defined twice")]
    AlreadyDefined(&'static str),

    /// A rule is referenced but was never defined.
    #[error("rule `{0}` is referenced but never defined")]
    Undefined(&'static str),
}

/// A grammar node. Cloning is cheap and shares the node.
#[derive(Clone)]
pub struct Dsl(Arc<DslNode>);

struct DslNode {
    combinator: Combinator,
    prediction: OnceLock<Option<TokenSet>>,
}

/// What a grammar node does.
#[derive(Debug)]
pub enum Combinator {
    /// One token of the given kind.
    Token(TokenKind),
    /// One token of the given kind and text.
    Text(TokenKind, &'static str),
    /// Nothing; always succeeds.
    Empty,
    /// Every child in order. Nothing is undone on failure.
    Seq(Vec<Dsl>),
    /// The first alternative that succeeds.
    Choice(Choice),
    /// The child at least once.
    OneOrMore(Dsl),
    /// The child, undone entirely if it fails.
    Heal(Dsl),
    /// The child, always undone. Succeeds if the child would.
    Ahead(Dsl),
    /// The child, wrapped in a node.
    Symbolic(SyntaxKind, Dsl),
    /// `start` followed by any number of `next`, each one wrapping
    /// everything before it in a new node.
    Fold(SyntaxKind, Dsl, Dsl),
    /// `init`, wrapped in a node together with `rest` if `rest` follows.
    Cont(SyntaxKind, Dsl, Dsl),
    /// A rule.
    Ref(Rule),
    /// The child, or an error and nothing.
    Relax(Dsl, &'static str),
    /// The child, or an error node over every token up to the point where
    /// the recovery node would match.
    RelaxTo(Dsl, Dsl, &'static str),
}

impl Combinator {
    fn children(&self) -> Vec<&Dsl> {
        match self {
            Self::Token(_) | Self::Text(..) | Self::Empty => Vec::new(),
            Self::Seq(items) => items.iter().collect(),
            Self::Choice(choice) => choice.alternatives.iter().collect(),
            Self::OneOrMore(child)
            | Self::Heal(child)
            | Self::Ahead(child)
            | Self::Symbolic(_, child)
            | Self::Relax(child, _) => vec![child],
            Self::Fold(_, a, b) | Self::Cont(_, a, b) | Self::RelaxTo(a, b, _) => vec![a, b],
            Self::Ref(rule) => rule.body().into_iter().collect(),
        }
    }
}

/// Ordered choice between alternatives.
pub struct Choice {
    alternatives: Vec<Dsl>,
    optional: bool,
    dispatch: OnceLock<Dispatch>,
}

/// Per-token candidate lists of a [`Choice`].
struct Dispatch {
    table: FxHashMap<TokenKind, Vec<Dsl>>,
    /// Alternatives with an unknown prediction, for tokens no alternative
    /// predicts and for the end of input.
    fallback: Vec<Dsl>,
    /// Union of the known predictions.
    first: TokenSet,
}

impl Choice {
    /// The alternatives, flattened, without the trailing empty one.
    #[must_use]
    pub fn alternatives(&self) -> &[Dsl] {
        &self.alternatives
    }

    /// Whether the choice succeeds when no alternative does.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The alternatives tried when the next token has kind `kind`, after
    /// factoring. `None` stands for the end of input.
    #[must_use]
    pub fn candidates(&self, kind: Option<TokenKind>) -> &[Dsl] {
        let dispatch = self.dispatch();
        kind.and_then(|k| dispatch.table.get(&k))
            .map_or(dispatch.fallback.as_slice(), Vec::as_slice)
    }

    fn dispatch(&self) -> &Dispatch {
        self.dispatch
            .get_or_init(|| Dispatch::build(&self.alternatives))
    }

    fn parse(&self, cx: &mut ParserContext<'_>) -> bool {
        let dispatch = self.dispatch();
        let candidates = if cx.naive_choice() {
            self.alternatives.as_slice()
        } else {
            cx.current()
                .and_then(|k| dispatch.table.get(&k))
                .map_or(dispatch.fallback.as_slice(), Vec::as_slice)
        };
        let matched = candidates.iter().any(|alt| alt.parse_healed(cx));
        // Includes alternatives rejected before looking at the token.
        if !matched && !dispatch.first.is_empty() {
            cx.expect(dispatch.first);
        }
        matched || self.optional
    }
}

impl fmt::Debug for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choice")
            .field("alternatives", &self.alternatives)
            .field("optional", &self.optional)
            .finish()
    }
}

impl Dispatch {
    fn build(alternatives: &[Dsl]) -> Self {
        let predictions: Vec<Option<TokenSet>> =
            alternatives.iter().map(Dsl::prediction).collect();
        let first = predictions
            .iter()
            .flatten()
            .fold(TokenSet::EMPTY, |acc, set| acc.union(*set));

        // Many tokens select the same alternatives; factor each selection once.
        let mut cache: FxHashMap<Vec<usize>, Vec<Dsl>> = FxHashMap::default();
        let mut bucket = |admit: &dyn Fn(Option<TokenSet>) -> bool| {
            let selected: Vec<usize> = predictions
                .iter()
                .enumerate()
                .filter(|(_, p)| admit(**p))
                .map(|(i, _)| i)
                .collect();
            cache
                .entry(selected)
                .or_insert_with_key(|selected| {
                    factor(selected.iter().map(|&i| &alternatives[i]))
                })
                .clone()
        };

        let fallback = bucket(&|p| p.is_none());
        let table: FxHashMap<TokenKind, Vec<Dsl>> = first
            .iter()
            .map(|kind| (kind, bucket(&|p| p.map_or(true, |set| set.contains(kind)))))
            .collect();

        trace!(
            alternatives = alternatives.len(),
            entries = table.len(),
            fallback = fallback.len(),
            "built dispatch table"
        );
        Self {
            table,
            fallback,
            first,
        }
    }
}

/// Merge runs of adjacent alternatives that start with the same node into
/// `head + choice(tails)`.
fn factor<'a>(alternatives: impl Iterator<Item = &'a Dsl>) -> Vec<Dsl> {
    let split: Vec<(&Dsl, (Dsl, Dsl))> = alternatives.map(|alt| (alt, alt.split_head())).collect();
    let mut out = Vec::with_capacity(split.len());
    let mut rest = split.as_slice();

    while let Some((alt, (head, _))) = rest.first() {
        let run = rest
            .iter()
            .take_while(|(_, (h, _))| h.same_node(head))
            .count();
        if run == 1 {
            out.push((*alt).clone());
        } else {
            let tails = rest[..run].iter().map(|(_, (_, tail))| tail.clone());
            out.push(seq([head.clone(), choice(tails)]));
        }
        rest = &rest[run..];
    }
    out
}

impl Dsl {
    fn new(combinator: Combinator) -> Self {
        Self(Arc::new(DslNode {
            combinator,
            prediction: OnceLock::new(),
        }))
    }

    /// What this node does.
    #[must_use]
    pub fn combinator(&self) -> &Combinator {
        &self.0.combinator
    }

    /// Whether both values are the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn key(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }

    /// Whether the nodes are interchangeable as the first step of an
    /// alternative.
    fn same_node(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.combinator(), other.combinator()) {
            (Combinator::Token(a), Combinator::Token(b)) => a == b,
            (Combinator::Text(a, s), Combinator::Text(b, t)) => a == b && s == t,
            (Combinator::Ref(a), Combinator::Ref(b)) => a == b,
            _ => false,
        }
    }

    /// The first step of the node and what follows it.
    fn split_head(&self) -> (Dsl, Dsl) {
        let inner = match self.combinator() {
            Combinator::Heal(inner) => inner,
            _ => self,
        };
        match inner.combinator() {
            Combinator::Seq(items) if !items.is_empty() => {
                (items[0].clone(), seq(items[1..].iter().cloned()))
            }
            _ => (inner.clone(), empty()),
        }
    }

    // Construction.

    /// Wrap the node's output in a node of kind `kind`.
    #[must_use]
    pub fn node(self, kind: SyntaxKind) -> Dsl {
        Dsl::new(Combinator::Symbolic(kind, self))
    }

    /// Undo everything the node did if it fails.
    #[must_use]
    pub fn heal(self) -> Dsl {
        let already = matches!(
            self.combinator(),
            Combinator::Token(_)
                | Combinator::Text(..)
                | Combinator::Empty
                | Combinator::Heal(_)
                | Combinator::Choice(_)
                | Combinator::Ahead(_)
                | Combinator::Relax(..)
                | Combinator::RelaxTo(..)
        );
        if already {
            self
        } else {
            Dsl::new(Combinator::Heal(self))
        }
    }

    /// The node or nothing.
    #[must_use]
    pub fn opt(self) -> Dsl {
        choice([self, empty()])
    }

    /// The node one or more times.
    #[must_use]
    pub fn many1(self) -> Dsl {
        Dsl::new(Combinator::OneOrMore(self))
    }

    /// The node zero or more times.
    #[must_use]
    pub fn many(self) -> Dsl {
        self.many1().opt()
    }

    /// One or more occurrences separated by `delimiter`.
    #[must_use]
    pub fn sep_by1(self, delimiter: impl Into<Dsl>) -> Dsl {
        self.clone() + (delimiter.into() + self).heal().many()
    }

    /// Zero or more occurrences separated by `delimiter`.
    #[must_use]
    pub fn sep_by(self, delimiter: impl Into<Dsl>) -> Dsl {
        self.sep_by1(delimiter).opt()
    }

    /// The node, or report `message` here and carry on.
    #[must_use]
    pub fn relax(self, message: &'static str) -> Dsl {
        Dsl::new(Combinator::Relax(self, message))
    }

    /// The node, or report `message` over the tokens skipped until
    /// `recovery` matches outside any layout block opened on the way, and
    /// carry on from there.
    #[must_use]
    pub fn relax_to(self, recovery: impl Into<Dsl>, message: &'static str) -> Dsl {
        Dsl::new(Combinator::RelaxTo(self, recovery.into(), message))
    }

    // Prediction.

    /// Token kinds the node can start with, or `None` when that is not
    /// known: the node may succeed without consuming anything, or
    /// computing the set ran into a cycle.
    #[must_use]
    pub fn prediction(&self) -> Option<TokenSet> {
        match self.0.prediction.get() {
            Some(p) => *p,
            None => self.compute_prediction(&mut FxHashSet::default()),
        }
    }

    fn compute_prediction(&self, visiting: &mut FxHashSet<*const ()>) -> Option<TokenSet> {
        if let Some(p) = self.0.prediction.get() {
            return *p;
        }
        let key = self.key();
        if !visiting.insert(key) {
            return None;
        }

        let prediction = match self.combinator() {
            Combinator::Token(kind) | Combinator::Text(kind, _) => Some(TokenSet::single(*kind)),
            Combinator::Empty | Combinator::Relax(..) | Combinator::RelaxTo(..) => None,
            Combinator::Seq(items) => items.first().and_then(|d| d.compute_prediction(visiting)),
            Combinator::Choice(choice) if choice.optional => None,
            Combinator::Choice(choice) => choice
                .alternatives
                .iter()
                .try_fold(TokenSet::EMPTY, |acc, alt| {
                    alt.compute_prediction(visiting).map(|set| acc.union(set))
                }),
            Combinator::OneOrMore(child)
            | Combinator::Heal(child)
            | Combinator::Ahead(child)
            | Combinator::Symbolic(_, child)
            | Combinator::Fold(_, child, _)
            | Combinator::Cont(_, child, _) => child.compute_prediction(visiting),
            Combinator::Ref(rule) => rule.body().and_then(|b| b.compute_prediction(visiting)),
        };

        visiting.remove(&key);
        *self.0.prediction.get_or_init(|| prediction)
    }

    /// Whether the next token is one the node can start with. Records the
    /// prediction as expected when it is not.
    fn admits(&self, cx: &mut ParserContext<'_>) -> bool {
        match self.prediction() {
            None => true,
            Some(set) => {
                let ok = cx.current().is_some_and(|k| set.contains(k));
                if !ok {
                    cx.expect(set);
                }
                ok
            }
        }
    }

    // Parsing.

    /// Run the node at the context's cursor.
    pub fn parse(&self, cx: &mut ParserContext<'_>) -> bool {
        match self.combinator() {
            Combinator::Token(kind) => cx.eat(*kind),
            Combinator::Text(kind, text) => cx.eat_text(*kind, *text),
            Combinator::Empty => true,
            Combinator::Seq(items) => items.iter().all(|item| item.parse(cx)),
            Combinator::Choice(choice) => choice.parse(cx),
            Combinator::OneOrMore(child) => parse_one_or_more(child, cx),
            Combinator::Heal(child) => child.parse_healed(cx),
            Combinator::Ahead(child) => {
                let marker = cx.mark();
                let ok = child.parse(cx);
                cx.rollback(marker);
                ok
            }
            Combinator::Symbolic(kind, child) => {
                if !self.admits(cx) {
                    return false;
                }
                let open = cx.open(*kind);
                if child.parse(cx) {
                    cx.close();
                    true
                } else {
                    cx.tombstone(open);
                    false
                }
            }
            Combinator::Fold(kind, start, next) => {
                if !start.admits(cx) {
                    return false;
                }
                let checkpoint = cx.checkpoint();
                if !start.parse(cx) {
                    return false;
                }
                loop {
                    let before = cx.pos();
                    if !next.parse_healed(cx) {
                        break;
                    }
                    cx.open_at(checkpoint, *kind);
                    cx.close();
                    if cx.pos() == before {
                        break;
                    }
                }
                true
            }
            Combinator::Cont(kind, init, rest) => {
                let checkpoint = cx.checkpoint();
                if !init.parse(cx) {
                    return false;
                }
                if rest.parse_healed(cx) {
                    cx.open_at(checkpoint, *kind);
                    cx.close();
                }
                true
            }
            Combinator::Ref(rule) => rule.body().is_some_and(|body| body.parse(cx)),
            Combinator::Relax(child, message) => {
                if !child.parse_healed(cx) {
                    let pos = cx.pos();
                    cx.diagnostic(*message, pos, pos);
                }
                true
            }
            Combinator::RelaxTo(child, recovery, message) => {
                if child.parse_healed(cx) {
                    return true;
                }
                let start = cx.pos();
                cx.open(SyntaxKind::Error);
                // Layout blocks opened inside the skipped region are skipped
                // whole, so recovery only matches at the starting depth.
                let mut depth = 0usize;
                while let Some(kind) = cx.current() {
                    if depth == 0 && cx.probe(|cx| recovery.parse(cx)) {
                        break;
                    }
                    match kind {
                        TokenKind::LayoutStart => depth += 1,
                        TokenKind::LayoutEnd => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    cx.bump();
                }
                cx.close();
                let end = cx.pos();
                cx.diagnostic(*message, start, end);
                true
            }
        }
    }

    fn parse_healed(&self, cx: &mut ParserContext<'_>) -> bool {
        if !self.admits(cx) {
            return false;
        }
        let marker = cx.mark();
        if self.parse(cx) {
            cx.commit(marker);
            true
        } else {
            cx.rollback(marker);
            false
        }
    }
}

fn parse_one_or_more(child: &Dsl, cx: &mut ParserContext<'_>) -> bool {
    if !child.parse(cx) {
        return false;
    }
    let prediction = child.prediction();
    loop {
        if let Some(set) = prediction {
            if !cx.current().is_some_and(|k| set.contains(k)) {
                cx.expect(set);
                break;
            }
        }
        let before = cx.pos();
        if !child.parse(cx) || cx.pos() == before {
            break;
        }
    }
    true
}

impl fmt::Debug for Dsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.combinator(), f)
    }
}

/// One token of kind `kind`.
#[must_use]
pub fn token(kind: TokenKind) -> Dsl {
    Dsl::new(Combinator::Token(kind))
}

/// One token of kind `kind` reading `text`.
#[must_use]
pub fn text(kind: TokenKind, text: &'static str) -> Dsl {
    Dsl::new(Combinator::Text(kind, text))
}

/// Matches nothing, always.
#[must_use]
pub fn empty() -> Dsl {
    Dsl::new(Combinator::Empty)
}

/// `items` in order. Nested sequences are spliced in.
#[must_use]
pub fn seq(items: impl IntoIterator<Item = Dsl>) -> Dsl {
    let mut flat = Vec::new();
    for item in items {
        match item.combinator() {
            Combinator::Seq(inner) => flat.extend(inner.iter().cloned()),
            Combinator::Empty => {}
            _ => flat.push(item),
        }
    }
    if flat.len() <= 1 {
        return flat.pop().unwrap_or_else(empty);
    }
    Dsl::new(Combinator::Seq(flat))
}

/// The first of `alternatives` that matches.
///
/// Nested choices are spliced in, and alternatives after one that matches
/// the empty input are dropped since they could never be reached.
#[must_use]
pub fn choice(alternatives: impl IntoIterator<Item = Dsl>) -> Dsl {
    let mut flat = Vec::new();
    let mut optional = false;
    for alt in alternatives {
        if optional {
            break;
        }
        let inner = match alt.combinator() {
            Combinator::Heal(inner) => inner,
            _ => &alt,
        };
        match inner.combinator() {
            Combinator::Choice(nested) => {
                flat.extend(nested.alternatives.iter().cloned());
                optional = nested.optional;
            }
            Combinator::Empty => optional = true,
            _ => flat.push(alt.clone()),
        }
    }

    if flat.is_empty() && optional {
        return empty();
    }
    if flat.len() == 1 && !optional {
        if let Some(only) = flat.pop() {
            return only.heal();
        }
    }
    Dsl::new(Combinator::Choice(Choice {
        alternatives: flat,
        optional,
        dispatch: OnceLock::new(),
    }))
}

/// Succeeds where `child` would, without consuming anything.
#[must_use]
pub fn ahead(child: impl Into<Dsl>) -> Dsl {
    Dsl::new(Combinator::Ahead(child.into()))
}

/// A left-leaning chain: `start`, then each `next` wraps everything so far
/// in a node of kind `kind`.
#[must_use]
pub fn fold(kind: SyntaxKind, start: impl Into<Dsl>, next: impl Into<Dsl>) -> Dsl {
    Dsl::new(Combinator::Fold(kind, start.into(), next.into()))
}

/// `init`, wrapped with `rest` in a node of kind `kind` when `rest`
/// follows.
#[must_use]
pub fn cont(kind: SyntaxKind, init: impl Into<Dsl>, rest: impl Into<Dsl>) -> Dsl {
    Dsl::new(Combinator::Cont(kind, init.into(), rest.into()))
}

impl From<TokenKind> for Dsl {
    fn from(kind: TokenKind) -> Self {
        token(kind)
    }
}

impl From<&Rule> for Dsl {
    fn from(rule: &Rule) -> Self {
        rule.dsl()
    }
}

impl<R: Into<Dsl>> Add<R> for Dsl {
    type Output = Dsl;

    fn add(self, rhs: R) -> Dsl {
        seq([self, rhs.into()])
    }
}

impl<R: Into<Dsl>> BitOr<R> for Dsl {
    type Output = Dsl;

    fn bitor(self, rhs: R) -> Dsl {
        choice([self, rhs.into()])
    }
}

/// A named, possibly recursive, grammar node.
///
/// Two rules are equal only if they are the same declaration.
#[derive(Clone)]
pub struct Rule(Arc<RuleCell>);

struct RuleCell {
    name: &'static str,
    body: OnceLock<Dsl>,
}

impl Rule {
    /// A rule without a body yet.
    #[must_use]
    pub fn declare(name: &'static str) -> Self {
        Self(Arc::new(RuleCell {
            name,
            body: OnceLock::new(),
        }))
    }

    /// Give the rule its body.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::AlreadyDefined`] if the rule has a body
    /// already.
    pub fn define(&self, body: impl Into<Dsl>) -> Result<(), GrammarError> {
        self.0
            .body
            .set(body.into())
            .map_err(|_| GrammarError::AlreadyDefined(self.0.name))
    }

    /// The rule's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// The rule's body, once defined.
    #[must_use]
    pub fn body(&self) -> Option<&Dsl> {
        self.0.body.get()
    }

    /// A node referring to the rule.
    #[must_use]
    pub fn dsl(&self) -> Dsl {
        Dsl::new(Combinator::Ref(self.clone()))
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Rule {}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({})", self.0.name)
    }
}

/// Size of a compiled grammar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrammarStats {
    /// Distinct nodes, including those created by factoring.
    pub nodes: usize,
    /// Distinct rules.
    pub rules: usize,
    /// Choice nodes.
    pub choices: usize,
    /// Dispatch table entries over all choices.
    pub dispatch_entries: usize,
}

/// A grammar whose predictions and dispatch tables are all computed.
pub struct CompiledGrammar {
    root: Dsl,
    stats: GrammarStats,
}

impl CompiledGrammar {
    /// Check `root` and everything reachable from it, and compute every
    /// prediction and dispatch table.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Undefined`] if a reachable rule has no body.
    #[instrument(level = "debug", skip_all)]
    pub fn new(root: Dsl) -> Result<Self, GrammarError> {
        let mut stats = GrammarStats::default();
        let mut seen = FxHashSet::default();
        let mut rules = FxHashSet::default();
        let mut stack = vec![root.clone()];

        while let Some(dsl) = stack.pop() {
            if !seen.insert(dsl.key()) {
                continue;
            }
            stats.nodes += 1;
            let _ = dsl.prediction();

            match dsl.combinator() {
                Combinator::Ref(rule) => {
                    let body = rule.body().ok_or(GrammarError::Undefined(rule.name()))?;
                    if rules.insert(Arc::as_ptr(&rule.0)) {
                        stats.rules += 1;
                    }
                    stack.push(body.clone());
                }
                Combinator::Choice(choice) => {
                    stats.choices += 1;
                    let dispatch = choice.dispatch();
                    stats.dispatch_entries += dispatch.table.len();
                    stack.extend(choice.alternatives.iter().cloned());
                    stack.extend(dispatch.table.values().flatten().cloned());
                    stack.extend(dispatch.fallback.iter().cloned());
                }
                other => stack.extend(other.children().into_iter().cloned()),
            }
        }

        debug!(
            nodes = stats.nodes,
            rules = stats.rules,
            choices = stats.choices,
            dispatch_entries = stats.dispatch_entries,
            "compiled grammar"
        );
        Ok(Self { root, stats })
    }

    /// The start node.
    #[must_use]
    pub fn root(&self) -> &Dsl {
        &self.root
    }

    /// Size of the grammar.
    #[must_use]
    pub fn stats(&self) -> GrammarStats {
        self.stats
    }

    /// Run the start node.
    pub fn parse(&self, cx: &mut ParserContext<'_>) -> bool {
        self.root.parse(cx)
    }
}
