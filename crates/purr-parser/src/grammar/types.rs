//! Types and kinds.

use purr_lexer::TokenKind as T;

use super::{ident, label, qualified, Rules};
use crate::dsl::{choice, cont, fold, token, Dsl, GrammarError};
use crate::syntax::SyntaxKind as S;

/// `a` or `(a :: Kind)`
pub(super) fn type_var_binding(rules: &Rules) -> Dsl {
    (ident() | (token(T::LParen) + ident() + T::DoubleColon + &rules.ty + T::RParen))
        .node(S::TypeVarBinding)
}

/// `C a b`, a class applied to types.
pub(super) fn constraint(rules: &Rules) -> Dsl {
    qualified(T::ProperName) + rules.type_atom.dsl().many()
}

/// One constraint, or several in parentheses.
pub(super) fn constraints(rules: &Rules) -> Dsl {
    (token(T::LParen) + constraint(rules).sep_by1(T::Comma) + T::RParen) | constraint(rules)
}

pub(super) fn define(rules: &Rules) -> Result<(), GrammarError> {
    let row_field = (label() + T::DoubleColon + &rules.ty).node(S::RowField);
    let row = row_field.sep_by(T::Comma) + (token(T::Pipe) + &rules.ty).opt();

    rules.type_atom.define(choice([
        ident().node(S::TypeVar),
        qualified(T::ProperName).node(S::TypeConstructor),
        token(T::Underscore).node(S::TypeWildcard),
        (token(T::String) | T::Integer).node(S::TypeLiteral),
        (token(T::LBrace) + row.clone() + T::RBrace).node(S::TypeRecord),
        (token(T::LParen) + &rules.ty + T::RParen).node(S::TypeParens),
        (token(T::LParen) + row + T::RParen).node(S::TypeRow),
    ]))?;

    let app = fold(S::TypeApp, &rules.type_atom, &rules.type_atom);
    let operator = fold(S::TypeOperator, app.clone(), qualified(T::Operator) + app);
    let arrow = cont(S::TypeArrow, operator, token(T::Arrow) + &rules.ty);
    let constrained = cont(S::TypeConstrained, arrow, token(T::FatArrow) + &rules.ty);
    let forall = (token(T::Forall) + type_var_binding(rules).many1() + T::Dot + &rules.ty)
        .node(S::TypeForall);

    rules.ty.define(forall | constrained)
}
