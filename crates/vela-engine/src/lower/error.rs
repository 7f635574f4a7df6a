//! Front-end-reported lowering errors.
//!
//! These are the recoverable class of failures: each one is fatal for the
//! top-level declaration it occurred in, contributes no emitted code for it,
//! and is collected so a whole compilation reports every diagnostic at once.
//! Internal invariant violations (lowering bugs) are panics, not variants
//! here.

use crate::frontend::Span;
use thiserror::Error;

/// Errors the lowering core reports back through the front end
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    /// A capability-macro member with no Lua translation was accessed
    #[error("Property '{name}' is a compiler intrinsic and cannot be accessed here")]
    InvalidMacroMember {
        /// Member name
        name: String,
        /// Location of the access
        span: Span,
    },

    /// Property or element access on a value of function type
    #[error("Cannot index a value of function type")]
    FunctionIndex {
        /// Location of the access
        span: Span,
    },

    /// Access to a class's prototype, which the Lua representation does not
    /// expose
    #[error("Class prototypes are not accessible from Vela code")]
    ClassPrototypeAccess {
        /// Location of the access
        span: Span,
    },

    /// A constructor tried to return a value
    #[error("Constructors cannot return a value")]
    ConstructorReturn {
        /// Location of the return statement
        span: Span,
    },

    /// A generator whose declared return type does not satisfy the iterator
    /// capability
    #[error("Generator '{name}' must be declared to return an iterator type")]
    InvalidGeneratorReturn {
        /// Function name
        name: String,
        /// Location of the declaration
        span: Span,
    },

    /// A declaration uses a name from the compiler's reserved namespace
    #[error("Identifier '{name}' uses a reserved compiler prefix")]
    ReservedName {
        /// Offending name
        name: String,
        /// Location of the declaration
        span: Span,
    },
}

impl LowerError {
    /// Location of the offending source node
    pub fn span(&self) -> Span {
        match self {
            LowerError::InvalidMacroMember { span, .. }
            | LowerError::FunctionIndex { span }
            | LowerError::ClassPrototypeAccess { span }
            | LowerError::ConstructorReturn { span }
            | LowerError::InvalidGeneratorReturn { span, .. }
            | LowerError::ReservedName { span, .. } => *span,
        }
    }

    /// Stable error-kind tag
    pub fn code(&self) -> &'static str {
        match self {
            LowerError::InvalidMacroMember { .. } => "V1001",
            LowerError::FunctionIndex { .. } => "V1002",
            LowerError::ClassPrototypeAccess { .. } => "V1003",
            LowerError::ConstructorReturn { .. } => "V1004",
            LowerError::InvalidGeneratorReturn { .. } => "V1005",
            LowerError::ReservedName { .. } => "V1006",
        }
    }
}

/// Result alias used throughout the lowering core
pub type LowerResult<T> = Result<T, LowerError>;
