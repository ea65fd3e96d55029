//! The PureScript grammar.
//!
//! Built once, on first use, and shared by every parse afterwards. The
//! pieces live in one submodule each; they refer to each other through the
//! rules in [`Rules`], which are declared up front and defined by the
//! submodule that owns them.

mod binder;
mod decl;
mod expr;
mod types;

use std::sync::LazyLock;

use purr_lexer::TokenKind as T;
use tracing::instrument;

use crate::dsl::{choice, token, CompiledGrammar, Dsl, GrammarError, Rule};
use crate::syntax::SyntaxKind;

/// The compiled PureScript grammar.
///
/// # Errors
///
/// Returns the [`GrammarError`] found while building it. Building is
/// deterministic, so this either always fails or never does.
pub fn purescript() -> Result<&'static CompiledGrammar, GrammarError> {
    static GRAMMAR: LazyLock<Result<CompiledGrammar, GrammarError>> = LazyLock::new(build);
    GRAMMAR.as_ref().map_err(Clone::clone)
}

/// Build the PureScript grammar from scratch.
///
/// # Errors
///
/// Returns an error if a rule is left undefined or defined twice.
#[instrument(level = "debug")]
pub fn build() -> Result<CompiledGrammar, GrammarError> {
    let rules = Rules::declare();
    types::define(&rules)?;
    binder::define(&rules)?;
    expr::define(&rules)?;
    decl::define(&rules)?;
    CompiledGrammar::new(rules.module.dsl())
}

/// Rules shared between the parts of the grammar.
pub(crate) struct Rules {
    pub ty: Rule,
    pub type_atom: Rule,
    pub binder: Rule,
    pub binder_atom: Rule,
    pub expr: Rule,
    pub let_binding: Rule,
    pub module: Rule,
}

impl Rules {
    fn declare() -> Self {
        Self {
            ty: Rule::declare("type"),
            type_atom: Rule::declare("type atom"),
            binder: Rule::declare("binder"),
            binder_atom: Rule::declare("binder atom"),
            expr: Rule::declare("expression"),
            let_binding: Rule::declare("binding"),
            module: Rule::declare("module"),
        }
    }
}

/// Items of a block: either laid out by indentation or written with braces
/// and semicolons.
pub(crate) fn block(item: Dsl) -> Dsl {
    (token(T::LayoutStart) + item.clone().sep_by(T::LayoutSep) + T::LayoutEnd)
        | (token(T::LBrace) + item.sep_by(T::Semi) + T::RBrace)
}

/// A lower-case name. `as` and `hiding` are only reserved inside imports.
pub(crate) fn ident() -> Dsl {
    token(T::LowerName) | T::As | T::Hiding
}

/// A record label: any name, keyword or string.
pub(crate) fn label() -> Dsl {
    choice(
        [T::LowerName, T::String, T::Boolean]
            .into_iter()
            .chain(T::ALL.into_iter().filter(|k| k.is_keyword()))
            .map(token),
    )
}

/// `core` behind an optional `A.B.` qualifier.
pub(crate) fn qualified(core: impl Into<Dsl>) -> Dsl {
    (token(T::ProperName) + T::Dot).heal().many() + core.into()
}

/// `Data.Map.Internal`
pub(crate) fn module_name() -> Dsl {
    token(T::ProperName).sep_by1(T::Dot).node(SyntaxKind::ModuleName)
}

/// A literal value.
pub(crate) fn literal() -> Dsl {
    token(T::Integer) | T::Number | T::String | T::Char | T::Boolean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_builds() {
        let grammar = purescript().unwrap();
        let stats = grammar.stats();
        assert_eq!(stats.rules, 7);
        assert!(stats.choices > 20);
        assert!(stats.dispatch_entries > stats.choices);
    }

    #[test]
    fn test_grammar_is_shared() {
        let a = purescript().unwrap();
        let b = purescript().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_label_accepts_keywords() {
        let prediction = label().prediction().unwrap();
        assert!(prediction.contains(T::Where));
        assert!(prediction.contains(T::Forall));
        assert!(prediction.contains(T::String));
        assert!(!prediction.contains(T::ProperName));
    }
}
