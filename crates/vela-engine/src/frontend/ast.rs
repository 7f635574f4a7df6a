//! Typed AST for the Vela language, as handed over by the front end.
//!
//! The lowering core only ever reads these nodes. Unlike a parser-stage
//! tree, every expression carries its resolved [`TypeId`] and identifiers
//! carry the [`BindingId`] assigned by the binder, so lowering decisions
//! (index adjustment, tuple arity, enum folding) never re-run inference.
//!
//! Node kinds form a closed sum type and are dispatched with exhaustive
//! `match`; an AST shape the lowering stage cannot handle is a front-end bug,
//! not a recoverable condition.

use crate::frontend::interner::Symbol;
use crate::frontend::oracle::{BindingId, TypeId};
use crate::frontend::span::Span;

pub mod expression;
pub mod statement;

pub use expression::*;
pub use statement::*;

/// Root node: one Vela source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Top-level statements (declarations and exports)
    pub statements: Vec<Statement>,
    /// Span covering the entire module
    pub span: Span,
}

impl Module {
    /// Create a new module
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }

    /// True if the module has no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A name reference or declaration site.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// Interned name text
    pub name: Symbol,
    /// Resolved binding, if the binder found one (globals and synthesized
    /// identifiers have none)
    pub binding: Option<BindingId>,
    /// Resolved static type of the reference
    pub ty: TypeId,
    pub span: Span,
}

impl Identifier {
    /// Create an identifier with no resolved binding
    pub fn new(name: Symbol, ty: TypeId, span: Span) -> Self {
        Self {
            name,
            binding: None,
            ty,
            span,
        }
    }

    /// Create an identifier with a resolved binding
    pub fn bound(name: Symbol, binding: BindingId, ty: TypeId, span: Span) -> Self {
        Self {
            name,
            binding: Some(binding),
            ty,
            span,
        }
    }
}

/// A declared parameter.
///
/// Invariants (enforced by the front end, assumed here): at most one rest
/// parameter and it is last; at most one receiver parameter and it is first.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name
    pub name: Identifier,
    /// Declared type
    pub ty: TypeId,
    /// Default-value initializer, lowered in the body's scope
    pub default: Option<Expression>,
    /// Rest parameter (`...xs`)
    pub is_rest: bool,
    /// Explicitly declared receiver parameter (`this: T`)
    pub is_receiver: bool,
    pub span: Span,
}

impl Parameter {
    /// A plain parameter with no default
    pub fn plain(name: Identifier, ty: TypeId, span: Span) -> Self {
        Self {
            name,
            ty,
            default: None,
            is_rest: false,
            is_receiver: false,
            span,
        }
    }
}
