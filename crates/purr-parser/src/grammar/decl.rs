//! Modules, imports and declarations.

use purr_lexer::TokenKind as T;

use super::expr::guarded;
use super::types::{constraints, type_var_binding};
use super::{block, ident, module_name, qualified, Rules};
use crate::dsl::{ahead, choice, text, token, Dsl, GrammarError};
use crate::syntax::SyntaxKind as S;

/// `(..)` or `(A, B)` after a type name.
fn data_members() -> Dsl {
    (token(T::LParen) + (token(T::DotDot) | token(T::ProperName).sep_by(T::Comma)) + T::RParen)
        .node(S::DataMembers)
}

/// What imports and exports may name.
fn members() -> Vec<Dsl> {
    vec![
        ident(),
        token(T::LParen) + T::Operator + T::RParen,
        token(T::ProperName) + data_members().opt(),
        token(T::Class) + T::ProperName,
        token(T::Type) + T::LParen + T::Operator + T::RParen,
    ]
}

fn header() -> Dsl {
    let mut exports = members();
    exports.push(token(T::Module) + module_name());
    let export = choice(exports).node(S::Export);
    let export_list =
        (token(T::LParen) + export.sep_by(T::Comma) + T::RParen).node(S::ExportList);

    (token(T::Module) + module_name() + export_list.opt() + T::Where).node(S::ModuleHeader)
}

fn import() -> Dsl {
    let item = choice(members()).node(S::ImportItem);
    let list = (token(T::Hiding).opt() + T::LParen + item.sep_by(T::Comma) + T::RParen)
        .node(S::ImportList);
    (token(T::Import) + module_name() + list.opt() + (token(T::As) + module_name()).opt())
        .node(S::ImportDecl)
}

fn signature(rules: &Rules) -> Dsl {
    (ident() + T::DoubleColon + &rules.ty).node(S::TypeSignature)
}

fn value(rules: &Rules) -> Dsl {
    let where_clause = (token(T::Where) + block(rules.let_binding.dsl())).node(S::WhereClause);
    (ident() + rules.binder_atom.dsl().many() + guarded(rules, T::Eq) + where_clause.opt())
        .node(S::ValueDecl)
}

fn data(rules: &Rules) -> Dsl {
    let constructor = (token(T::ProperName) + rules.type_atom.dsl().many()).node(S::Constructor);
    let body = type_var_binding(rules).many()
        + (token(T::Eq) + constructor.sep_by1(T::Pipe)).opt();
    (token(T::Data) + T::ProperName + ((token(T::DoubleColon) + &rules.ty) | body))
        .node(S::DataDecl)
}

fn newtype(rules: &Rules) -> Dsl {
    let body = type_var_binding(rules).many() + T::Eq + T::ProperName + &rules.type_atom;
    (token(T::Newtype) + T::ProperName + ((token(T::DoubleColon) + &rules.ty) | body))
        .node(S::NewtypeDecl)
}

fn synonym(rules: &Rules) -> Dsl {
    let body = type_var_binding(rules).many() + T::Eq + &rules.ty;
    (token(T::Type) + T::ProperName + ((token(T::DoubleColon) + &rules.ty) | body))
        .node(S::TypeSynonymDecl)
}

fn role() -> Dsl {
    let role = choice(["nominal", "representational", "phantom"].map(|r| text(T::LowerName, r)));
    (token(T::Type) + text(T::LowerName, "role") + T::ProperName + role.many1()).node(S::RoleDecl)
}

fn class(rules: &Rules) -> Dsl {
    let superclasses = (constraints(rules) + text(T::Operator, "<=")).node(S::Constraints);
    let dependency = ident().many() + T::Arrow + ident().many();
    let dependencies =
        (token(T::Pipe) + dependency.sep_by1(T::Comma)).node(S::FunctionalDependencies);
    let members = token(T::Where) + block(signature(rules)).opt();

    let head = superclasses.heal().opt()
        + T::ProperName
        + type_var_binding(rules).many()
        + dependencies.opt()
        + members.opt();
    (token(T::Class) + ((token(T::ProperName) + T::DoubleColon + &rules.ty).heal() | head))
        .node(S::ClassDecl)
}

/// `instance name :: C a => D a` without the body.
fn instance_head(rules: &Rules) -> Dsl {
    let name = (ident() + T::DoubleColon).heal();
    let context = (constraints(rules) + T::FatArrow).node(S::Constraints).heal();
    token(T::Instance)
        + name.opt()
        + context.opt()
        + qualified(T::ProperName)
        + rules.type_atom.dsl().many()
}

fn instance(rules: &Rules) -> Dsl {
    let members = token(T::Where) + block(rules.let_binding.dsl()).opt();
    let one = instance_head(rules) + members.opt();
    one.sep_by1(T::Else).node(S::InstanceDecl)
}

fn derive(rules: &Rules) -> Dsl {
    (token(T::Derive) + token(T::Newtype).opt() + instance_head(rules)).node(S::DeriveDecl)
}

fn foreign(rules: &Rules) -> Dsl {
    let data = token(T::Data) + T::ProperName + T::DoubleColon + &rules.ty;
    let value = ident() + T::DoubleColon + &rules.ty;
    (token(T::Foreign) + T::Import + (data | value)).node(S::ForeignDecl)
}

fn fixity() -> Dsl {
    let name = qualified(ident() | T::ProperName);
    ((token(T::Infixl) | T::Infixr | T::Infix)
        + T::Integer
        + token(T::Type).opt()
        + name
        + T::As
        + T::Operator)
        .node(S::FixityDecl)
}

/// Top-level items separated by `sep`, up to `end`. A declaration that
/// fails to parse is skipped up to the next separator and reported.
fn items(rules: &Rules, sep: T, end: T) -> Dsl {
    let boundary = token(sep) | end;
    let declaration = choice([
        import(),
        data(rules),
        newtype(rules),
        role(),
        synonym(rules),
        class(rules),
        instance(rules),
        derive(rules),
        foreign(rules),
        fixity(),
        signature(rules),
        value(rules),
    ]);
    let item = declaration.relax_to(boundary.clone(), "expected a declaration")
        + ahead(boundary.clone()).relax_to(boundary, "unexpected tokens after declaration");

    token(end) | (item.sep_by1(sep) + token(end).relax("expected end of module"))
}

pub(super) fn define(rules: &Rules) -> Result<(), GrammarError> {
    let pattern = (rules.binder.dsl() + guarded(rules, T::Eq)).node(S::PatternBinding);
    rules
        .let_binding
        .define(choice([signature(rules), value(rules), pattern]))?;

    let body = (token(T::LayoutStart) + items(rules, T::LayoutSep, T::LayoutEnd))
        | (token(T::LBrace) + items(rules, T::Semi, T::RBrace));
    rules.module.define((header() + body).node(S::Module))
}
