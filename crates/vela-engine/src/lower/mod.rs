//! AST to Lua lowering.
//!
//! Converts the type-checked Vela AST into Lua statement trees. The entry
//! point is [`lower_module`]; the work happens in one recursive descent
//! driven by [`LuaLowerer`], which owns the per-compilation mutable state:
//!
//! - a *scope stack* for name renaming, collision avoidance, and fresh
//!   temporaries,
//! - a *hoist registry* for names that must be declared at the top of their
//!   block rather than at first use,
//! - a *preceding-statement stack*: side-effect buffers for the expression
//!   currently being lowered; statements pushed while a buffer is active are
//!   spliced in front of the expression that needed them.
//!
//! Mismatched buffer enter/exit is a lowering bug and panics; it is never
//! reported as a user diagnostic.

mod access;
mod class_methods;
mod error;
mod expr;
mod function;
mod params;
mod sequencer;
mod stmt;

pub use error::{LowerError, LowerResult};
pub use function::FunctionFacts;

use crate::frontend::ast::{Identifier, Module};
use crate::frontend::{BindingId, Interner, Symbol, TupleArity, TypeId, TypeOracle};
use crate::lua::ast::{LuaBlock, LuaExpression, LuaStatement};
use crate::lua::writer::LuaWriter;
use crate::lua::{is_lua_keyword, EXPORTS, SYNTHETIC_PREFIX};
use rustc_hash::{FxHashMap, FxHashSet};

/// Result of lowering one module.
pub struct LoweredModule {
    /// The complete Lua chunk
    pub chunk: LuaBlock,
    /// Front-end-reported diagnostics collected across all declarations
    pub diagnostics: Vec<LowerError>,
    /// Public names registered for export-table assembly
    pub exports: Vec<String>,
}

impl LoweredModule {
    /// Render the chunk to Lua text
    pub fn render(&self) -> String {
        LuaWriter::render(&self.chunk)
    }
}

/// Lower a module to a Lua chunk.
///
/// Each top-level declaration lowers independently: one that fails with a
/// diagnostic contributes no code, and its siblings still lower.
pub fn lower_module(
    module: &Module,
    oracle: &dyn TypeOracle,
    interner: &Interner,
) -> LoweredModule {
    let mut lowerer = LuaLowerer::new(oracle, interner);
    lowerer.push_scope();

    let mut chunk = LuaBlock::new();
    chunk.push(LuaStatement::Local {
        names: vec![EXPORTS.to_string()],
        values: vec![LuaExpression::Table(vec![])],
    });

    let mut body = Vec::new();
    for stmt in &module.statements {
        let depth = lowerer.preceding.len();
        let ctx = lowerer.enter_preceding();
        match lowerer.lower_statement(stmt) {
            Ok(stmts) => {
                body.extend(lowerer.exit_preceding(ctx));
                body.extend(stmts);
            }
            Err(error) => {
                // Drop whatever the failed declaration buffered
                lowerer.preceding.truncate(depth);
                lowerer.diagnostics.push(error);
            }
        }
    }

    // Hoisted top-level names are declared right after the export table
    if let Some(hoisted) = lowerer.hoisted_declaration() {
        chunk.push(hoisted);
    }
    chunk.0.extend(body);
    chunk.push(LuaStatement::Return(vec![LuaExpression::name(EXPORTS)]));
    lowerer.pop_scope();

    LoweredModule {
        chunk,
        diagnostics: lowerer.diagnostics,
        exports: lowerer.exports,
    }
}

/// One frame of the lexical scope stack
#[derive(Default)]
struct ScopeFrame {
    /// Source name -> emitted name for bindings declared in this frame
    renames: FxHashMap<Symbol, String>,
    /// Every emitted name taken in this frame (declared or synthesized)
    used: FxHashSet<String>,
    /// Monotonic counter for fresh temporaries
    temp_counter: u32,
    /// Names to declare at the top of this frame's block
    hoisted: Vec<String>,
}

/// Facts about the class whose members are currently being lowered
pub(crate) struct ClassContext {
    /// Emitted name of the class table
    pub(crate) name: String,
    /// Resolved instance type (matches declared receiver parameters)
    pub(crate) instance_ty: TypeId,
    /// Emitted name of the superclass table, if any
    pub(crate) superclass: Option<String>,
}

/// Facts about the function whose body is currently being lowered
pub(crate) struct FunctionContext {
    /// Declared tuple-return arity, if the return type is a tuple
    pub(crate) return_arity: Option<TupleArity>,
    pub(crate) is_constructor: bool,
}

/// Handle for an active preceding-statement buffer. Buffers are stack
/// disciplined: only the innermost one receives statements, and handles must
/// be exited in reverse entry order.
#[must_use]
pub(crate) struct PrecedingContext(usize);

/// The lowering pass.
pub struct LuaLowerer<'a> {
    oracle: &'a dyn TypeOracle,
    interner: &'a Interner,
    scopes: Vec<ScopeFrame>,
    preceding: Vec<Vec<LuaStatement>>,
    pub(crate) functions: Vec<FunctionContext>,
    pub(crate) classes: Vec<ClassContext>,
    diagnostics: Vec<LowerError>,
    exports: Vec<String>,
}

impl<'a> LuaLowerer<'a> {
    /// Create a lowerer over the front end's oracle and interner
    pub fn new(oracle: &'a dyn TypeOracle, interner: &'a Interner) -> Self {
        Self {
            oracle,
            interner,
            scopes: Vec::new(),
            preceding: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            diagnostics: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub(crate) fn oracle(&self) -> &'a dyn TypeOracle {
        self.oracle
    }

    pub(crate) fn interner(&self) -> &'a Interner {
        self.interner
    }

    // ── Scope stack ─────────────────────────────────────────────────────

    /// Open a fresh naming frame. Every identifier introduced inside is
    /// invisible after the matching [`pop_scope`](Self::pop_scope).
    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(ScopeFrame::default());
    }

    /// Close the innermost naming frame
    pub(crate) fn pop_scope(&mut self) {
        self.scopes
            .pop()
            .expect("scope stack underflow: pop without matching push");
    }

    /// Declare a source binding in the innermost frame and pick its emitted
    /// name, renaming away from Lua keywords and shadowed emitted names.
    pub(crate) fn declare(&mut self, ident: &Identifier) -> LowerResult<String> {
        let text = self.interner.resolve(ident.name);
        if self.oracle.is_reserved_name(text) {
            return Err(LowerError::ReservedName {
                name: text.to_string(),
                span: ident.span,
            });
        }
        let mut candidate = if is_lua_keyword(text) {
            format!("{}_", text)
        } else {
            text.to_string()
        };
        let mut suffix = 0u32;
        while self.name_in_use(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", text, suffix);
        }
        let frame = self
            .scopes
            .last_mut()
            .expect("declare outside of any scope");
        frame.renames.insert(ident.name, candidate.clone());
        frame.used.insert(candidate.clone());
        Ok(candidate)
    }

    /// Claim an emitted name in the innermost frame without a source binding
    /// (the implicit receiver slot). Later declarations rename around it.
    pub(crate) fn reserve_name(&mut self, name: &str) {
        self.scopes
            .last_mut()
            .expect("reserve_name outside of any scope")
            .used
            .insert(name.to_string());
    }

    fn name_in_use(&self, name: &str) -> bool {
        self.scopes.iter().any(|frame| frame.used.contains(name))
    }

    /// Emitted name for a reference: the innermost rename, or the raw text
    /// for unresolved (ambient) names
    pub(crate) fn resolve_name(&self, ident: &Identifier) -> String {
        for frame in self.scopes.iter().rev() {
            if let Some(name) = frame.renames.get(&ident.name) {
                return name.clone();
            }
        }
        self.interner.resolve(ident.name).to_string()
    }

    /// A target-safe identifier unique within the active scope chain.
    /// All synthesized names carry the `____` prefix, which reserved-name
    /// validation keeps out of user code.
    pub(crate) fn fresh_name(&mut self, hint: &str) -> String {
        loop {
            let frame = self
                .scopes
                .last_mut()
                .expect("fresh_name outside of any scope");
            let candidate = format!("{}{}_{}", SYNTHETIC_PREFIX, hint, frame.temp_counter);
            frame.temp_counter += 1;
            if !self.name_in_use(&candidate) {
                let frame = self.scopes.last_mut().unwrap();
                frame.used.insert(candidate.clone());
                return candidate;
            }
        }
    }

    // ── Hoist registry ──────────────────────────────────────────────────

    /// Mark a name for declaration at the top of the enclosing block
    pub(crate) fn register_hoist(&mut self, name: String) {
        self.scopes
            .last_mut()
            .expect("register_hoist outside of any scope")
            .hoisted
            .push(name);
    }

    /// The `local a, b` declaration for the innermost frame's hoisted names,
    /// if any were registered. Consulted when closing a block.
    pub(crate) fn hoisted_declaration(&mut self) -> Option<LuaStatement> {
        let frame = self.scopes.last_mut()?;
        if frame.hoisted.is_empty() {
            return None;
        }
        Some(LuaStatement::Local {
            names: std::mem::take(&mut frame.hoisted),
            values: vec![],
        })
    }

    // ── Preceding-statement buffers ─────────────────────────────────────

    /// Open a side-effect buffer for the expression about to be lowered
    pub(crate) fn enter_preceding(&mut self) -> PrecedingContext {
        self.preceding.push(Vec::new());
        PrecedingContext(self.preceding.len() - 1)
    }

    /// Close the buffer and hand its statements to the caller, which must
    /// splice them in front of the expression they belong to
    pub(crate) fn exit_preceding(&mut self, ctx: PrecedingContext) -> Vec<LuaStatement> {
        assert_eq!(
            ctx.0 + 1,
            self.preceding.len(),
            "preceding-statement context exited out of stack order"
        );
        self.preceding.pop().unwrap()
    }

    /// Append a statement to the innermost active buffer
    pub(crate) fn push_preceding(&mut self, stmt: LuaStatement) {
        self.preceding
            .last_mut()
            .expect("statement emitted with no active preceding context")
            .push(stmt);
    }

    /// Append many statements, preserving order
    pub(crate) fn push_preceding_all(&mut self, stmts: Vec<LuaStatement>) {
        for stmt in stmts {
            self.push_preceding(stmt);
        }
    }

    // ── Front-end fact helpers ──────────────────────────────────────────

    /// True if the identifier is bound to an exported mutable declaration
    pub(crate) fn is_exported_mutable(&self, ident: &Identifier) -> bool {
        ident
            .binding
            .map(|binding| self.oracle.is_exported_mutable(binding))
            .unwrap_or(false)
    }

    pub(crate) fn binding_of(&self, ident: &Identifier) -> Option<BindingId> {
        ident.binding
    }

    /// Record a top-level declaration's public name for export assembly
    pub(crate) fn register_export(&mut self, name: &str) {
        self.exports.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::Identifier;
    use crate::frontend::{SimpleOracle, Span, TypeId};

    #[test]
    fn test_fresh_names_are_unique_across_frames() {
        let oracle = SimpleOracle::new();
        let interner = Interner::new();
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let outer = lowerer.fresh_name("temp");
        lowerer.push_scope();
        let inner = lowerer.fresh_name("temp");
        assert_ne!(outer, inner);
        assert!(outer.starts_with("____temp_"));
        lowerer.pop_scope();
        lowerer.pop_scope();
    }

    #[test]
    fn test_declare_renames_keywords_and_collisions() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let kw = interner.intern("end");
        let plain = interner.intern("x");
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let renamed = lowerer
            .declare(&Identifier::new(kw, TypeId::UNKNOWN, Span::dummy()))
            .unwrap();
        assert_eq!(renamed, "end_");

        let first = lowerer
            .declare(&Identifier::new(plain, TypeId::UNKNOWN, Span::dummy()))
            .unwrap();
        assert_eq!(first, "x");
        lowerer.push_scope();
        let shadowed = lowerer
            .declare(&Identifier::new(plain, TypeId::UNKNOWN, Span::dummy()))
            .unwrap();
        assert_eq!(shadowed, "x_1");
        lowerer.pop_scope();
        lowerer.pop_scope();
    }

    #[test]
    fn test_declare_rejects_reserved_prefix() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let bad = interner.intern("____temp_0");
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let err = lowerer
            .declare(&Identifier::new(bad, TypeId::UNKNOWN, Span::dummy()))
            .unwrap_err();
        assert!(matches!(err, LowerError::ReservedName { .. }));
        lowerer.pop_scope();
    }

    #[test]
    #[should_panic(expected = "out of stack order")]
    fn test_preceding_contexts_are_stack_disciplined() {
        let oracle = SimpleOracle::new();
        let interner = Interner::new();
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        let outer = lowerer.enter_preceding();
        let _inner = lowerer.enter_preceding();
        // Exiting the outer context while the inner one is live is a bug
        let _ = lowerer.exit_preceding(outer);
    }
}
