//! Vela Language Engine
//!
//! This crate lowers type-checked Vela modules to Lua:
//! - **Frontend surface**: typed AST, interner, and the type/symbol oracle
//!   the lowering core queries (`frontend` module)
//! - **Lowering**: AST to Lua statement trees, with side-effect extraction,
//!   renaming, and the class/generator/async transforms (`lower` module)
//! - **Lua target**: statement/expression tree and the text writer
//!   (`lua` module)
//! - **Diagnostics**: terminal and JSON rendering of lowering errors
//!   (`diagnostic` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use vela_engine::{lower_module, SimpleOracle};
//!
//! let lowered = lower_module(&module, &oracle, &interner);
//! if lowered.diagnostics.is_empty() {
//!     println!("{}", lowered.render());
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod diagnostic;
pub mod frontend;
pub mod lower;
pub mod lua;

pub use frontend::{
    BindingId, CapabilityMember, EnumValue, Interner, SimpleOracle, Span, Symbol, TupleArity,
    TypeId, TypeKind, TypeOracle,
};
pub use lower::{lower_module, FunctionFacts, LowerError, LowerResult, LoweredModule};
