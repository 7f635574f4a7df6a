//! Front-end interface boundary.
//!
//! The parser, binder, and type checker live outside this crate. What they
//! hand over is modeled here: the typed AST ([`ast`]), interned names
//! ([`interner`]), source locations ([`span`]), and the read-only symbol/type
//! query surface ([`oracle`]).

pub mod ast;
pub mod interner;
pub mod oracle;
pub mod span;

pub use interner::{Interner, Symbol};
pub use oracle::{
    BindingId, CapabilityMember, EnumValue, SimpleOracle, TupleArity, TypeId, TypeKind, TypeOracle,
};
pub use span::Span;
