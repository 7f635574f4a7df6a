//! Parameter list lowering.
//!
//! Lua has no default or rest parameters, so both compile into a body
//! prologue: defaults become a nil-check guard (an omitted argument and an
//! explicit null are indistinguishable at the call site), and a rest
//! parameter turns the function variadic with the tail packed into a table.

use super::{LowerResult, LuaLowerer};
use crate::frontend::ast::Parameter;
use crate::lua::ast::{LuaBinaryOp, LuaExpression, LuaIf, LuaStatement, TableField};

/// Lowered form of a declared parameter list
pub(crate) struct LoweredParams {
    /// Named Lua parameters, in order
    pub(crate) names: Vec<String>,
    /// Whether the Lua function takes `...`
    pub(crate) is_vararg: bool,
    /// Statements to run before the body (default guards, rest packing)
    pub(crate) prologue: Vec<LuaStatement>,
}

impl LuaLowerer<'_> {
    /// Lower a parameter list inside the function's already-opened scope.
    ///
    /// Receiver parameters are declaration-only (`this: T` pins the receiver
    /// type, `this: void` bans one); the emitted receiver slot is decided by
    /// the caller, so they never produce a Lua parameter here.
    pub(crate) fn lower_parameters(&mut self, params: &[Parameter]) -> LowerResult<LoweredParams> {
        let mut lowered = LoweredParams {
            names: Vec::with_capacity(params.len()),
            is_vararg: false,
            prologue: Vec::new(),
        };

        for param in params {
            if param.is_receiver {
                continue;
            }
            let name = self.declare(&param.name)?;

            if param.is_rest {
                lowered.is_vararg = true;
                lowered.prologue.push(LuaStatement::Local {
                    names: vec![name],
                    values: vec![LuaExpression::Table(vec![TableField::Positional(
                        LuaExpression::Vararg,
                    )])],
                });
                continue;
            }

            lowered.names.push(name.clone());
            if let Some(default) = &param.default {
                let (stmts, value) = self.lower_in_new_context(default)?;
                let mut body = stmts;
                body.push(LuaStatement::Assign {
                    targets: vec![LuaExpression::name(&name)],
                    values: vec![value],
                });
                lowered.prologue.push(LuaStatement::If(LuaIf {
                    condition: LuaExpression::Binary {
                        op: LuaBinaryOp::Eq,
                        left: Box::new(LuaExpression::name(&name)),
                        right: Box::new(LuaExpression::Nil),
                    },
                    then_body: body.into(),
                    else_body: None,
                }));
            }
        }
        Ok(lowered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Expression, Identifier, IntLiteral};
    use crate::frontend::{Interner, SimpleOracle, Span, TypeId};

    #[test]
    fn test_default_becomes_nil_guard() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let name = Identifier::new(interner.intern("n"), TypeId::NUMBER, Span::dummy());
        let mut param = Parameter::plain(name, TypeId::NUMBER, Span::dummy());
        param.default = Some(Expression::IntLiteral(IntLiteral {
            value: 10,
            ty: TypeId::NUMBER,
            span: Span::dummy(),
        }));

        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let lowered = lowerer.lower_parameters(&[param]).unwrap();
        lowerer.pop_scope();

        assert_eq!(lowered.names, vec!["n".to_string()]);
        assert!(!lowered.is_vararg);
        assert_eq!(lowered.prologue.len(), 1);
        match &lowered.prologue[0] {
            LuaStatement::If(guard) => {
                assert_eq!(
                    guard.condition,
                    LuaExpression::Binary {
                        op: LuaBinaryOp::Eq,
                        left: Box::new(LuaExpression::name("n")),
                        right: Box::new(LuaExpression::Nil),
                    }
                );
                assert_eq!(guard.then_body.0.len(), 1);
            }
            other => panic!("expected nil guard, got {:?}", other),
        }
    }

    #[test]
    fn test_rest_parameter_packs_vararg() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let name = Identifier::new(interner.intern("rest"), TypeId::UNKNOWN, Span::dummy());
        let mut param = Parameter::plain(name, TypeId::UNKNOWN, Span::dummy());
        param.is_rest = true;

        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let lowered = lowerer.lower_parameters(&[param]).unwrap();
        lowerer.pop_scope();

        assert!(lowered.is_vararg);
        assert!(lowered.names.is_empty());
        assert_eq!(
            lowered.prologue,
            vec![LuaStatement::Local {
                names: vec!["rest".to_string()],
                values: vec![LuaExpression::Table(vec![TableField::Positional(
                    LuaExpression::Vararg
                )])],
            }]
        );
    }

    #[test]
    fn test_receiver_parameter_is_not_emitted() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let name = Identifier::new(interner.intern("this"), TypeId::VOID, Span::dummy());
        let mut param = Parameter::plain(name, TypeId::VOID, Span::dummy());
        param.is_receiver = true;

        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let lowered = lowerer.lower_parameters(&[param]).unwrap();
        lowerer.pop_scope();

        assert!(lowered.names.is_empty());
        assert!(lowered.prologue.is_empty());
    }
}
