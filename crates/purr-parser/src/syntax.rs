//! Node kinds of the syntax tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an interior node. Leaves are tokens and carry a
/// [`purr_lexer::TokenKind`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    /// The root of every tree.
    File,
    /// Tokens skipped during error recovery.
    Error,

    // Module structure
    /// `module M (..) where ...`
    Module,
    /// `module M (..) where`
    ModuleHeader,
    /// `Data.Map`
    ModuleName,
    /// `(a, B(..), module M)`
    ExportList,
    /// One entry of an export list.
    Export,
    /// `import M (..) as N`
    ImportDecl,
    /// The parenthesised part of an import.
    ImportList,
    /// One entry of an import list.
    ImportItem,
    /// `(..)` or `(A, B)` after a type in an import or export.
    DataMembers,
    /// A name with an optional module qualifier.
    QualifiedName,

    // Declarations
    /// `data T a = A a | B`
    DataDecl,
    /// `newtype N = N T`
    NewtypeDecl,
    /// `type T = ...`
    TypeSynonymDecl,
    /// `type role T nominal`
    RoleDecl,
    /// `name :: Type`
    TypeSignature,
    /// `class C a where ...`
    ClassDecl,
    /// `| a -> b` in a class head.
    FunctionalDependencies,
    /// `instance ...`, possibly a chain joined by `else`.
    InstanceDecl,
    /// `derive instance ...`
    DeriveDecl,
    /// `foreign import ...`
    ForeignDecl,
    /// `infixl 6 add as +`
    FixityDecl,
    /// `f x = ...`
    ValueDecl,
    /// `Pattern = expr` inside `let` or `where`.
    PatternBinding,
    /// One constructor of a `data` declaration.
    Constructor,
    /// `C a =>` ahead of a class or instance head.
    Constraints,
    /// `a` or `(a :: Type)` introduced by a declaration or `forall`.
    TypeVarBinding,
    /// `| cond = expr`
    GuardedExpr,
    /// The conditions of a guard.
    Guard,
    /// `where` followed by local bindings.
    WhereClause,

    // Types
    /// `forall a. t`
    TypeForall,
    /// `C a => t`
    TypeConstrained,
    /// `a -> b`
    TypeArrow,
    /// `a + b` with a type operator.
    TypeOperator,
    /// `f a`
    TypeApp,
    /// A type variable.
    TypeVar,
    /// A type constructor.
    TypeConstructor,
    /// `_`
    TypeWildcard,
    /// A string or integer literal at the type level.
    TypeLiteral,
    /// `{ a :: T }`
    TypeRecord,
    /// `( a :: T | r )`
    TypeRow,
    /// `label :: Type` inside a row.
    RowField,
    /// `(t)`
    TypeParens,

    // Binders
    /// `x`
    BinderVar,
    /// `x@p`
    BinderNamed,
    /// `Just x`
    BinderConstructor,
    /// A literal pattern.
    BinderLiteral,
    /// `_`
    BinderWildcard,
    /// `[a, b]`
    BinderArray,
    /// `{ a, b: p }`
    BinderRecord,
    /// One field of a record pattern.
    BinderField,
    /// `(p)`
    BinderParens,
    /// `x : xs`
    BinderOperator,
    /// `p :: T`
    BinderTyped,

    // Expressions
    /// `e :: T`
    ExprTyped,
    /// `a + b`, ``a `f` b``
    ExprInfix,
    /// `-e`
    ExprNegate,
    /// `f x`
    ExprApp,
    /// `@T` as an argument.
    TypeArgument,
    /// `r.field`
    ExprAccess,
    /// `r { field = e }`
    ExprUpdate,
    /// A variable.
    ExprVar,
    /// A data constructor.
    ExprConstructor,
    /// `(+)`
    ExprOperator,
    /// `_` standing for a section argument.
    ExprSection,
    /// `?name`, a typed hole.
    ExprHole,
    /// A literal value.
    ExprLiteral,
    /// `[a, b]`
    ExprArray,
    /// `{ a: 1 }`
    ExprRecord,
    /// One field of a record literal or update.
    RecordField,
    /// `(e)`
    ExprParens,
    /// `\x -> e`
    ExprLambda,
    /// `if c then a else b`
    ExprIf,
    /// `case e of ...`
    ExprCase,
    /// One branch of a `case`.
    CaseBranch,
    /// `let ... in e`
    ExprLet,
    /// `do ...`
    ExprDo,
    /// `ado ... in e`
    ExprAdo,
    /// `x <- e`
    DoBind,
    /// `let` inside `do` or `ado`.
    DoLet,
    /// A bare expression statement.
    DoDiscard,
}

impl SyntaxKind {
    /// Whether the node wraps recovered input.
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
