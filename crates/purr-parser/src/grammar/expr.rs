//! Expressions.
//!
//! From tightest to loosest: atoms, record access and update, application
//! (with `@Type` arguments), negation, infix operators, and finally a type
//! annotation. The block forms (`\`, `if`, `case`, `let`, `do`, `ado`)
//! extend as far right as possible, so they may appear as the last
//! argument of an application without parentheses.

use purr_lexer::TokenKind as T;

use super::{block, ident, label, literal, qualified, Rules};
use crate::dsl::{choice, cont, empty, fold, text, token, Dsl, GrammarError};
use crate::syntax::SyntaxKind as S;

/// `sep expr` or a list of `| guards sep expr`.
pub(super) fn guarded(rules: &Rules, sep: T) -> Dsl {
    let guard_item = (rules.binder.dsl() + T::LeftArrow + &rules.expr).heal() | &rules.expr;
    let guard = (token(T::Pipe) + guard_item.sep_by1(T::Comma)).node(S::Guard);
    let guarded = (guard + sep + &rules.expr).node(S::GuardedExpr).many1();
    (token(sep) + &rules.expr) | guarded
}

fn block_expr(rules: &Rules) -> Dsl {
    let lambda = (token(T::Backslash) + rules.binder_atom.dsl().many1() + T::Arrow + &rules.expr)
        .node(S::ExprLambda);
    let if_then_else = (token(T::If) + &rules.expr + T::Then + &rules.expr + T::Else + &rules.expr)
        .node(S::ExprIf);

    let branch =
        (rules.binder.dsl().sep_by1(T::Comma) + guarded(rules, T::Arrow)).node(S::CaseBranch);
    let case = (token(T::Case) + rules.expr.dsl().sep_by1(T::Comma) + T::Of + block(branch))
        .node(S::ExprCase);

    let let_in =
        (token(T::Let) + block(rules.let_binding.dsl()) + T::In + &rules.expr).node(S::ExprLet);

    let statement = choice([
        (token(T::Let) + block(rules.let_binding.dsl())).node(S::DoLet),
        (rules.binder.dsl() + T::LeftArrow + &rules.expr).node(S::DoBind),
        rules.expr.dsl().node(S::DoDiscard),
    ]);
    let do_block = (qualified(T::Do) + block(statement.clone())).node(S::ExprDo);
    let ado_block =
        (qualified(T::Ado) + block(statement) + T::In + &rules.expr).node(S::ExprAdo);

    choice([lambda, if_then_else, case, let_in, do_block, ado_block])
}

pub(super) fn define(rules: &Rules) -> Result<(), GrammarError> {
    let field = (label() + choice([text(T::Operator, ":") + &rules.expr, token(T::Eq) + &rules.expr, empty()]))
        .node(S::RecordField);

    let atom = choice([
        qualified(ident()).node(S::ExprVar),
        qualified(T::ProperName).node(S::ExprConstructor),
        literal().node(S::ExprLiteral),
        token(T::Underscore).node(S::ExprSection),
        (text(T::Operator, "?") + T::LowerName).node(S::ExprHole),
        (token(T::LParen) + qualified(T::Operator) + T::RParen).node(S::ExprOperator),
        (token(T::LParen) + &rules.expr + T::RParen).node(S::ExprParens),
        (token(T::LBracket) + rules.expr.dsl().sep_by(T::Comma) + T::RBracket)
            .node(S::ExprArray),
        (token(T::LBrace) + field.sep_by(T::Comma) + T::RBrace).node(S::ExprRecord),
    ]);

    let access = fold(S::ExprAccess, atom, token(T::Dot) + label());
    let update_field = (label() + T::Eq + &rules.expr).node(S::RecordField);
    let update = fold(
        S::ExprUpdate,
        access,
        token(T::LBrace) + update_field.sep_by1(T::Comma) + T::RBrace,
    );

    let block_expr = block_expr(rules);
    let type_argument = (token(T::At) + &rules.type_atom).node(S::TypeArgument);
    let app = fold(
        S::ExprApp,
        update.clone() | block_expr.clone(),
        update | block_expr | type_argument,
    );
    let prefix = (text(T::Operator, "-") + app.clone()).node(S::ExprNegate) | app;

    let operator = qualified(T::Operator)
        | (token(T::Backtick) + qualified(ident() | T::ProperName) + T::Backtick);
    let infix = fold(S::ExprInfix, prefix.clone(), operator + prefix);

    rules
        .expr
        .define(cont(S::ExprTyped, infix, token(T::DoubleColon) + &rules.ty))
}
