//! Patterns.

use purr_lexer::TokenKind as T;

use super::{ident, label, literal, qualified, Rules};
use crate::dsl::{choice, cont, fold, text, token, GrammarError};
use crate::syntax::SyntaxKind as S;

pub(super) fn define(rules: &Rules) -> Result<(), GrammarError> {
    let number = token(T::Integer) | T::Number;
    let field = (label() + (text(T::Operator, ":") + &rules.binder).opt()).node(S::BinderField);

    rules.binder_atom.define(choice([
        token(T::Underscore).node(S::BinderWildcard),
        cont(
            S::BinderNamed,
            ident().node(S::BinderVar),
            token(T::At) + &rules.binder_atom,
        ),
        qualified(T::ProperName).node(S::BinderConstructor),
        (literal() | (text(T::Operator, "-") + number)).node(S::BinderLiteral),
        (token(T::LBracket) + rules.binder.dsl().sep_by(T::Comma) + T::RBracket)
            .node(S::BinderArray),
        (token(T::LBrace) + field.sep_by(T::Comma) + T::RBrace).node(S::BinderRecord),
        (token(T::LParen) + &rules.binder + T::RParen).node(S::BinderParens),
    ]))?;

    let app = (qualified(T::ProperName) + rules.binder_atom.dsl().many1())
        .node(S::BinderConstructor)
        | &rules.binder_atom;
    let operators = fold(S::BinderOperator, app.clone(), qualified(T::Operator) + app);

    rules
        .binder
        .define(cont(S::BinderTyped, operators, token(T::DoubleColon) + &rules.ty))
}
