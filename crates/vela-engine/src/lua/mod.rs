//! Lua target representation and emission.
//!
//! Lowering produces a [`ast::LuaBlock`] tree; [`writer::LuaWriter`] turns it
//! into text. Emission is indentation-scoped and every statement is
//! newline-terminated.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

pub mod ast;
pub mod writer;

/// Names of the runtime-library collaborators the emitted code calls into.
pub mod runtime {
    /// Async adapter: wraps a closure into a promise-like task function
    pub const ASYNC: &str = "__vela_async";
    /// Suspends the enclosing async task on a task value
    pub const AWAIT: &str = "__vela_await";
    /// Class constructor: `__vela_class(name, base?)`
    pub const CLASS: &str = "__vela_class";
    /// Instance construction: `__vela_new(C, ...)`
    pub const NEW: &str = "__vela_new";
    /// Super member lookup: prefers the superclass's registered getter,
    /// falls back to a direct field read on the receiver
    pub const SUPER_GET: &str = "__vela_super_get";
}

/// Name of the module export table
pub const EXPORTS: &str = "____exports";

/// Slot on a class prototype holding the constructor body
pub const CONSTRUCTOR_FIELD: &str = "____constructor";

/// Slot on a class table holding its getter functions
pub const GETTERS_FIELD: &str = "getters";

/// Slot on a class table holding its setter functions
pub const SETTERS_FIELD: &str = "setters";

/// Slot on a class table holding instance members
pub const PROTOTYPE_FIELD: &str = "prototype";

/// Prefix of all compiler-synthesized identifiers. The front end rejects
/// user declarations carrying it (reserved-name validation).
pub const SYNTHETIC_PREFIX: &str = "____";

/// The receiver name in emitted method bodies
pub const SELF: &str = "self";

static LUA_KEYWORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
        "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
    ]
    .into_iter()
    .collect()
});

/// True if `name` is a Lua keyword and cannot be used as an identifier
pub fn is_lua_keyword(name: &str) -> bool {
    LUA_KEYWORDS.contains(name)
}

/// True if `name` is directly usable as a Lua identifier
pub fn is_valid_identifier(name: &str) -> bool {
    if name.is_empty() || is_lua_keyword(name) {
        return false;
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True if `name` matches the synthetic-temporary naming pattern
pub fn is_synthetic_name(name: &str) -> bool {
    name.starts_with(SYNTHETIC_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_not_identifiers() {
        assert!(is_lua_keyword("end"));
        assert!(!is_valid_identifier("end"));
        assert!(is_valid_identifier("end_"));
    }

    #[test]
    fn test_identifier_shapes() {
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("x2"));
        assert!(!is_valid_identifier("2x"));
        assert!(!is_valid_identifier("with-dash"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_synthetic_prefix() {
        assert!(is_synthetic_name("____temp_0"));
        assert!(!is_synthetic_name("__double"));
    }
}
