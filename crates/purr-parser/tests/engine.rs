//! Behaviour of the grammar combinators on hand-built token streams.

use proptest::prelude::*;
use purr_lexer::{SourceToken, TokenKind};
use purr_parser::{
    ahead, choice, cont, fold, text, token, Dsl, Event, ParseOptions, ParserContext, SyntaxKind,
};
use purr_span::SourcePos;

use TokenKind::{Comma as C, Eq as E, LowerName as A, ProperName as B};

fn stream(kinds: &[TokenKind]) -> Vec<SourceToken> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            let i = i as u32;
            SourceToken::new(k, SourcePos::new(0, i, i), SourcePos::new(0, i + 1, i + 1))
        })
        .collect()
}

fn options(naive_choice: bool) -> ParseOptions {
    ParseOptions {
        naive_choice,
        ..ParseOptions::default()
    }
}

fn run(dsl: &Dsl, tokens: &[SourceToken], naive: bool) -> (bool, usize, Vec<Event>) {
    let options = options(naive);
    let mut cx = ParserContext::new("", tokens, &options);
    let ok = dsl.parse(&mut cx);
    (ok, cx.pos(), cx.into_events())
}

fn open(kind: SyntaxKind) -> Event {
    Event::Open { kind }
}

#[test]
fn test_shared_prefix_is_consumed_once() {
    let grammar = choice([token(A) + B, token(A) + C]);
    let tokens = stream(&[A, C]);

    for (naive, bumps) in [(false, 2), (true, 3)] {
        let options = options(naive);
        let mut cx = ParserContext::new("", &tokens, &options);
        assert!(grammar.parse(&mut cx));
        assert!(cx.at_eof());
        assert_eq!(cx.bumps(), bumps, "naive: {naive}");
        assert_eq!(cx.events(), vec![Event::Token, Event::Token]);
    }
}

#[test]
fn test_heal_restores_cursor() {
    let grammar = (token(A) + B + C).heal();
    let tokens = stream(&[A, B, E]);
    let (ok, pos, events) = run(&grammar, &tokens, false);
    assert!(!ok);
    assert_eq!(pos, 0);
    assert!(events.is_empty());
}

#[test]
fn test_sequence_keeps_partial_progress() {
    let grammar = token(A) + B + C;
    let tokens = stream(&[A, B, E]);
    let (ok, pos, _) = run(&grammar, &tokens, false);
    assert!(!ok);
    assert_eq!(pos, 2);
}

#[test]
fn test_failed_node_leaves_tombstone() {
    let grammar = (token(A) + B).node(SyntaxKind::ExprApp);
    let tokens = stream(&[A, C]);
    let (ok, pos, events) = run(&grammar, &tokens, false);
    assert!(!ok);
    assert_eq!(pos, 1);
    assert_eq!(events, vec![Event::Tombstone, Event::Token]);
}

#[test]
fn test_fold_nests_to_the_left() {
    let grammar = fold(SyntaxKind::ExprApp, A, A);
    let tokens = stream(&[A, A, A]);
    let (ok, _, events) = run(&grammar, &tokens, false);
    assert!(ok);
    assert_eq!(
        events,
        vec![
            open(SyntaxKind::ExprApp),
            open(SyntaxKind::ExprApp),
            Event::Token,
            Event::Token,
            Event::Close,
            Event::Token,
            Event::Close,
        ]
    );
}

#[test]
fn test_cont_wraps_only_when_continued() {
    let grammar = cont(SyntaxKind::ExprTyped, A, token(E) + B);

    let (ok, _, events) = run(&grammar, &stream(&[A, E, C]), false);
    assert!(ok);
    assert_eq!(events, vec![Event::Token]);

    let (ok, _, events) = run(&grammar, &stream(&[A, E, B]), false);
    assert!(ok);
    assert_eq!(
        events,
        vec![
            open(SyntaxKind::ExprTyped),
            Event::Token,
            Event::Token,
            Event::Token,
            Event::Close,
        ]
    );
}

#[test]
fn test_ahead_consumes_nothing() {
    let grammar = ahead(token(A) + B) + A + B;
    let (ok, pos, events) = run(&grammar, &stream(&[A, B]), false);
    assert!(ok);
    assert_eq!(pos, 2);
    assert_eq!(events.len(), 2);

    let (ok, pos, _) = run(&grammar, &stream(&[A, C]), false);
    assert!(!ok);
    assert_eq!(pos, 0);
}

#[test]
fn test_many_stops_without_progress() {
    let grammar = token(A).opt().many1() + B;
    let (ok, pos, _) = run(&grammar, &stream(&[A, A, B]), false);
    assert!(ok);
    assert_eq!(pos, 3);
}

#[test]
fn test_sep_by_leaves_trailing_separator() {
    let grammar = token(A).sep_by1(C);
    let (ok, pos, _) = run(&grammar, &stream(&[A, C, A, C, B]), false);
    assert!(ok);
    assert_eq!(pos, 3);
}

#[test]
fn test_relax_marks_missing_construct() {
    let grammar = token(A) + token(B).relax("expected a proper name") + C;
    let (ok, pos, events) = run(&grammar, &stream(&[A, C]), false);
    assert!(ok);
    assert_eq!(pos, 2);
    assert_eq!(
        events,
        vec![
            Event::Token,
            Event::Diagnostic {
                message: "expected a proper name",
                start: 1,
                end: 1,
            },
            Event::Token,
        ]
    );
}

#[test]
fn test_relax_to_skips_to_recovery() {
    let grammar = token(A).relax_to(C, "expected a name") + C + A;
    let (ok, pos, events) = run(&grammar, &stream(&[B, E, C, A]), false);
    assert!(ok);
    assert_eq!(pos, 4);
    assert_eq!(
        events,
        vec![
            open(SyntaxKind::Error),
            Event::Token,
            Event::Token,
            Event::Close,
            Event::Diagnostic {
                message: "expected a name",
                start: 0,
                end: 2,
            },
            Event::Token,
            Event::Token,
        ]
    );
}

#[test]
fn test_relax_to_skips_nested_blocks() {
    use TokenKind::{LayoutEnd as End, LayoutSep as Sep, LayoutStart as Start};

    let grammar = token(A).relax_to(Sep, "expected a name") + Sep + A;
    let tokens = stream(&[B, Start, B, Sep, B, End, Sep, A]);
    let (ok, pos, events) = run(&grammar, &tokens, false);
    assert!(ok);
    assert_eq!(pos, tokens.len());
    assert!(events.contains(&Event::Diagnostic {
        message: "expected a name",
        start: 0,
        end: 6,
    }));
}

#[test]
fn test_furthest_failure_is_reported() {
    let grammar = choice([token(A) + B + C, token(A) + E]);
    let options = options(false);
    let tokens = stream(&[A, B, A]);
    let mut cx = ParserContext::new("", &tokens, &options);
    assert!(!grammar.parse(&mut cx));
    let result = cx.result(false);
    assert_eq!(result.position, 2);
    assert_eq!(result.expected, vec!["`,`".to_string()]);
}

#[test]
fn test_choice_expects_its_prediction_in_both_modes() {
    let grammar = choice([text(TokenKind::Operator, "-"), token(B)]);
    let tokens = stream(&[C]);
    let expected: Vec<Vec<String>> = [false, true]
        .into_iter()
        .map(|naive| {
            let options = options(naive);
            let mut cx = ParserContext::new(",", &tokens, &options);
            assert!(!grammar.parse(&mut cx));
            cx.result(false).expected
        })
        .collect();
    let (dispatched, naive) = (&expected[0], &expected[1]);
    assert!(dispatched.contains(&"operator".to_string()), "{dispatched:?}");
    for description in dispatched {
        assert!(naive.contains(description), "{description} missing from {naive:?}");
    }
}

const ALPHABET: [TokenKind; 4] = [A, B, C, E];

#[derive(Clone, Debug)]
enum Shape {
    Tok(usize),
    Seq(Vec<Shape>),
    Choice(Vec<Shape>),
    Opt(Box<Shape>),
    Many1(Box<Shape>),
    Node(Box<Shape>),
    Heal(Box<Shape>),
    Fold(Box<Shape>, Box<Shape>),
    Cont(Box<Shape>, Box<Shape>),
    Ahead(Box<Shape>),
    Relax(Box<Shape>),
    /// Alternatives that all start with the same token node.
    Prefixed(usize, Vec<Shape>),
}

fn build(shape: &Shape) -> Dsl {
    match shape {
        Shape::Tok(i) => token(ALPHABET[*i]),
        Shape::Seq(items) => purr_parser::seq(items.iter().map(build)),
        Shape::Choice(alts) => choice(alts.iter().map(build)),
        Shape::Opt(s) => build(s).opt(),
        Shape::Many1(s) => build(s).many1(),
        Shape::Node(s) => build(s).node(SyntaxKind::ExprApp),
        Shape::Heal(s) => build(s).heal(),
        Shape::Fold(a, b) => fold(SyntaxKind::ExprInfix, build(a), build(b)),
        Shape::Cont(a, b) => cont(SyntaxKind::ExprTyped, build(a), build(b)),
        Shape::Ahead(s) => ahead(build(s)),
        Shape::Relax(s) => build(s).relax("missing"),
        Shape::Prefixed(k, alts) => {
            let head = token(ALPHABET[*k]);
            choice(alts.iter().map(|a| head.clone() + build(a)))
        }
    }
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = (0..ALPHABET.len()).prop_map(Shape::Tok);
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Shape::Seq),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Shape::Choice),
            inner.clone().prop_map(|s| Shape::Opt(Box::new(s))),
            inner.clone().prop_map(|s| Shape::Many1(Box::new(s))),
            inner.clone().prop_map(|s| Shape::Node(Box::new(s))),
            inner.clone().prop_map(|s| Shape::Heal(Box::new(s))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Fold(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Shape::Cont(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|s| Shape::Ahead(Box::new(s))),
            inner.clone().prop_map(|s| Shape::Relax(Box::new(s))),
            (0..ALPHABET.len(), prop::collection::vec(inner, 1..4))
                .prop_map(|(k, alts)| Shape::Prefixed(k, alts)),
        ]
    })
}

fn input() -> impl Strategy<Value = Vec<SourceToken>> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..10)
        .prop_map(|kinds| stream(&kinds))
}

proptest! {
    #[test]
    fn prop_dispatch_matches_naive_choice(shape in shape(), tokens in input()) {
        let grammar = build(&shape);
        let naive = run(&grammar, &tokens, true);
        let dispatched = run(&grammar, &tokens, false);
        prop_assert_eq!(naive, dispatched);
    }

    #[test]
    fn prop_heal_restores_cursor(shape in shape(), tokens in input()) {
        let grammar = build(&shape).heal();
        let (ok, pos, events) = run(&grammar, &tokens, false);
        if !ok {
            prop_assert_eq!(pos, 0);
            prop_assert!(events.is_empty());
        }
    }
}
