//! Statement sequencer.
//!
//! Extracts side-effecting sub-expressions into statements placed
//! immediately before the expression that needs their result, preserving
//! left-to-right evaluation order and scope visibility. Extractions bind to
//! `____`-prefixed temporaries; encountering such a temporary again is an
//! idempotent re-entry and never re-extracts.

use super::{LowerResult, LuaLowerer};
use crate::frontend::ast::Expression;
use crate::lua::ast::{LuaExpression, LuaStatement};
use crate::lua::is_synthetic_name;

impl LuaLowerer<'_> {
    /// Lower `expr` inside a fresh preceding-statement buffer, returning the
    /// buffered statements alongside the final pure expression.
    pub(crate) fn lower_in_new_context(
        &mut self,
        expr: &Expression,
    ) -> LowerResult<(Vec<LuaStatement>, LuaExpression)> {
        let ctx = self.enter_preceding();
        let result = self.lower_expression(expr);
        let stmts = self.exit_preceding(ctx);
        Ok((stmts, result?))
    }

    /// Lower `expr` to a pure, inlineable fragment, extracting its evaluation
    /// into preceding statements when necessary.
    ///
    /// Identifiers skip extraction: a plain binding is already stable, a
    /// synthetic temporary is the sequencer's own prior output, and an
    /// exported mutable binding must be re-read through its qualified path at
    /// every use (caching it would hide later mutation).
    pub(crate) fn sequence_expression(&mut self, expr: &Expression) -> LowerResult<LuaExpression> {
        if let Expression::Identifier(ident) = expr {
            let text = self.interner().resolve(ident.name);
            if is_synthetic_name(text) {
                return Ok(LuaExpression::name(text));
            }
            return self.lower_expression(expr);
        }
        let (stmts, value) = self.lower_in_new_context(expr)?;
        self.push_preceding_all(stmts);
        Ok(self.stabilize(value))
    }

    /// Bind an already-lowered fragment to a fresh temporary unless it is
    /// trivially re-evaluable. Used when a value (or an access chain's base)
    /// is needed more than once, or must not move across later effects.
    pub(crate) fn stabilize(&mut self, value: LuaExpression) -> LuaExpression {
        if value.is_trivial() {
            return value;
        }
        let temp = self.fresh_name("temp");
        self.push_preceding(LuaStatement::Local {
            names: vec![temp.clone()],
            values: vec![value],
        });
        LuaExpression::Name(temp)
    }

    /// Lower an ordered expression list (call arguments, array elements,
    /// return values) preserving left-to-right effect order.
    ///
    /// Every element is lowered in its own buffer first. If a later element
    /// produced preceding statements, each earlier non-trivial result is
    /// cached into a temporary at its original position so its evaluation
    /// cannot be reordered past the later element's effects.
    pub(crate) fn lower_expression_list(
        &mut self,
        exprs: &[Expression],
    ) -> LowerResult<Vec<LuaExpression>> {
        let mut lowered = Vec::with_capacity(exprs.len());
        for expr in exprs {
            lowered.push(self.lower_in_new_context(expr)?);
        }
        Ok(self.splice_ordered(lowered))
    }

    /// Order-preserving splice over pre-lowered (statements, expression)
    /// pairs; shared by expression lists and call lowering (where the callee
    /// participates in the same ordering as its arguments).
    pub(crate) fn splice_ordered(
        &mut self,
        items: Vec<(Vec<LuaStatement>, LuaExpression)>,
    ) -> Vec<LuaExpression> {
        let last_effectful = items.iter().rposition(|(stmts, _)| !stmts.is_empty());
        let mut out = Vec::with_capacity(items.len());
        for (i, (stmts, value)) in items.into_iter().enumerate() {
            self.push_preceding_all(stmts);
            let must_cache = matches!(last_effectful, Some(n) if i < n);
            if must_cache {
                out.push(self.stabilize(value));
            } else {
                out.push(value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::Identifier;
    use crate::frontend::{Interner, SimpleOracle, Span, TypeId};

    #[test]
    fn test_synthetic_temporary_is_not_re_extracted() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let temp = interner.intern("____temp_0");
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let ctx = lowerer.enter_preceding();
        let expr = Expression::Identifier(Identifier::new(temp, TypeId::NUMBER, Span::dummy()));
        let value = lowerer.sequence_expression(&expr).unwrap();
        let stmts = lowerer.exit_preceding(ctx);
        assert_eq!(value, LuaExpression::name("____temp_0"));
        assert!(stmts.is_empty(), "idempotent re-entry must not extract");
        lowerer.pop_scope();
    }

    #[test]
    fn test_stabilize_leaves_trivial_fragments_alone() {
        let oracle = SimpleOracle::new();
        let interner = Interner::new();
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let ctx = lowerer.enter_preceding();
        let kept = lowerer.stabilize(LuaExpression::Int(7));
        assert_eq!(kept, LuaExpression::Int(7));

        let call = LuaExpression::call_named("f", vec![]);
        let cached = lowerer.stabilize(call);
        assert!(matches!(cached, LuaExpression::Name(_)));
        let stmts = lowerer.exit_preceding(ctx);
        assert_eq!(stmts.len(), 1);
        lowerer.pop_scope();
    }
}
