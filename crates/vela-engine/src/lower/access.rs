//! Member and element access lowering.
//!
//! This is where the source language's 0-based, property-rich view of data
//! meets Lua's 1-based tables: virtual `length` becomes the `#` operator,
//! const-enum members fold to their literal values, numeric element access
//! gets the +1 adjustment, and positional access into a multi-value call
//! selects from the live return list instead of materializing a container.

use super::expr::CallUsage;
use super::{LowerError, LowerResult, LuaLowerer};
use crate::frontend::ast::{Expression, IndexExpression, MemberExpression};
use crate::frontend::{CapabilityMember, EnumValue, TypeKind};
use crate::lua::ast::{LuaBinaryOp, LuaExpression, LuaUnaryOp};
use crate::lua::{runtime, SELF};

/// Shift a 0-based key to Lua's 1-based indexing, folding literals
fn one_based(key: LuaExpression) -> LuaExpression {
    match key {
        LuaExpression::Int(n) => LuaExpression::Int(n + 1),
        other => LuaExpression::Binary {
            op: LuaBinaryOp::Add,
            left: Box::new(other),
            right: Box::new(LuaExpression::Int(1)),
        },
    }
}

impl LuaLowerer<'_> {
    pub(crate) fn lower_member(&mut self, member: &MemberExpression) -> LowerResult<LuaExpression> {
        let property = self.interner().resolve(member.property).to_string();

        // super.x reads through the superclass with the current receiver
        if matches!(&*member.object, Expression::Super(_)) {
            let base = self.superclass_name(member.span);
            return Ok(LuaExpression::call_named(
                runtime::SUPER_GET,
                vec![
                    LuaExpression::name(SELF),
                    LuaExpression::name(base),
                    LuaExpression::string(property),
                ],
            ));
        }

        if let Some(capability) = self
            .oracle()
            .capability_member(member.object.ty(), &property)
        {
            return match capability {
                CapabilityMember::Length => {
                    let object = self.lower_expression(&member.object)?;
                    Ok(LuaExpression::Unary {
                        op: LuaUnaryOp::Len,
                        operand: Box::new(object),
                    })
                }
                CapabilityMember::Unsupported => Err(LowerError::InvalidMacroMember {
                    name: property,
                    span: member.span,
                }),
            };
        }

        if let Expression::Identifier(ident) = &*member.object {
            if let Some(binding) = self.binding_of(ident) {
                if property == "prototype" && self.oracle().is_class_symbol(binding) {
                    return Err(LowerError::ClassPrototypeAccess { span: member.span });
                }
                if self.oracle().is_const_enum(binding) {
                    // The checker resolved this member, so the value exists
                    let value = self
                        .oracle()
                        .enum_member_value(binding, &property)
                        .unwrap_or_else(|| {
                            panic!(
                                "unresolved const-enum member '{}' at {}",
                                property, member.span
                            )
                        });
                    return Ok(match value {
                        EnumValue::Int(n) => LuaExpression::Int(n),
                        EnumValue::Str(s) => LuaExpression::Str(s),
                    });
                }
            }
        }

        let object = self.lower_expression(&member.object)?;
        Ok(LuaExpression::dot(object, property))
    }

    pub(crate) fn lower_index(&mut self, index: &IndexExpression) -> LowerResult<LuaExpression> {
        // Positional access into a multi-value call selects straight from the
        // return list, never through a materialized container. Position 0 is
        // the call's first value, which parenthesization already isolates;
        // any other position goes through `select`, with the shift folded for
        // literal keys
        if let Expression::Call(call) = &*index.object {
            if self.call_tuple_arity(call).is_some() {
                let lowered = self.lower_call(call, CallUsage::MultiValue)?;
                let key = self.lower_expression(&index.index)?;
                let selected = match one_based(key) {
                    LuaExpression::Int(1) => lowered,
                    position => LuaExpression::call_named("select", vec![position, lowered]),
                };
                return Ok(LuaExpression::Paren(Box::new(selected)));
            }
        }

        let (base, key) = self.lower_index_parts(index)?;
        Ok(LuaExpression::Index {
            base: Box::new(base),
            index: Box::new(key),
        })
    }

    /// Lower an element access to its base and (adjusted) key. Shared with
    /// assignment-target lowering, which needs the parts separately.
    pub(crate) fn lower_index_parts(
        &mut self,
        index: &IndexExpression,
    ) -> LowerResult<(LuaExpression, LuaExpression)> {
        if self.oracle().kind(index.object.ty()) == TypeKind::Function {
            return Err(LowerError::FunctionIndex { span: index.span });
        }

        let pairs = vec![
            self.lower_in_new_context(&index.object)?,
            self.lower_in_new_context(&index.index)?,
        ];
        let mut values = self.splice_ordered(pairs).into_iter();
        let base = values.next().unwrap();
        let key = values.next().unwrap();

        let adjust = matches!(
            self.oracle().kind(index.object.ty()),
            TypeKind::Array | TypeKind::Tuple
        ) && self.oracle().kind(index.index.ty()) == TypeKind::Number;
        let key = if adjust { one_based(key) } else { key };
        Ok((base, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Identifier, IntLiteral};
    use crate::frontend::{BindingId, Interner, SimpleOracle, Span, TypeId};

    fn ident(interner: &mut Interner, name: &str, ty: TypeId) -> Identifier {
        Identifier::new(interner.intern(name), ty, Span::dummy())
    }

    #[test]
    fn test_length_member_becomes_len_operator() {
        let oracle = SimpleOracle::new();
        let mut interner = Interner::new();
        let member = MemberExpression {
            object: Box::new(Expression::Identifier(ident(
                &mut interner,
                "s",
                TypeId::STRING,
            ))),
            property: interner.intern("length"),
            ty: TypeId::NUMBER,
            span: Span::dummy(),
        };
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let ctx = lowerer.enter_preceding();
        let lowered = lowerer.lower_member(&member).unwrap();
        assert!(lowerer.exit_preceding(ctx).is_empty());
        assert_eq!(
            lowered,
            LuaExpression::Unary {
                op: LuaUnaryOp::Len,
                operand: Box::new(LuaExpression::name("s")),
            }
        );
        lowerer.pop_scope();
    }

    #[test]
    fn test_const_enum_member_folds_to_literal() {
        let mut oracle = SimpleOracle::new();
        let binding = BindingId::new(1);
        oracle.register_const_enum(binding, [("Red", EnumValue::Int(0))]);
        let mut interner = Interner::new();
        let enum_ty = TypeId::new(TypeId::FIRST_USER);
        let base = Identifier::bound(interner.intern("Color"), binding, enum_ty, Span::dummy());
        let member = MemberExpression {
            object: Box::new(Expression::Identifier(base)),
            property: interner.intern("Red"),
            ty: enum_ty,
            span: Span::dummy(),
        };
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let ctx = lowerer.enter_preceding();
        let lowered = lowerer.lower_member(&member).unwrap();
        let _ = lowerer.exit_preceding(ctx);
        assert_eq!(lowered, LuaExpression::Int(0));
        lowerer.pop_scope();
    }

    #[test]
    fn test_numeric_array_index_shifts_by_one() {
        let mut oracle = SimpleOracle::new();
        let arr_ty = TypeId::new(TypeId::FIRST_USER);
        oracle.register_type(arr_ty, TypeKind::Array);
        let mut interner = Interner::new();
        let index = IndexExpression {
            object: Box::new(Expression::Identifier(ident(&mut interner, "xs", arr_ty))),
            index: Box::new(Expression::IntLiteral(IntLiteral {
                value: 2,
                ty: TypeId::NUMBER,
                span: Span::dummy(),
            })),
            ty: TypeId::NUMBER,
            span: Span::dummy(),
        };
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let ctx = lowerer.enter_preceding();
        let lowered = lowerer.lower_index(&index).unwrap();
        let _ = lowerer.exit_preceding(ctx);
        assert_eq!(
            lowered,
            LuaExpression::Index {
                base: Box::new(LuaExpression::name("xs")),
                index: Box::new(LuaExpression::Int(3)),
            }
        );
        lowerer.pop_scope();
    }

    #[test]
    fn test_indexing_a_function_value_is_rejected() {
        let mut oracle = SimpleOracle::new();
        let fn_ty = TypeId::new(TypeId::FIRST_USER);
        oracle.register_type(fn_ty, TypeKind::Function);
        let mut interner = Interner::new();
        let index = IndexExpression {
            object: Box::new(Expression::Identifier(ident(&mut interner, "f", fn_ty))),
            index: Box::new(Expression::IntLiteral(IntLiteral {
                value: 0,
                ty: TypeId::NUMBER,
                span: Span::dummy(),
            })),
            ty: TypeId::UNKNOWN,
            span: Span::dummy(),
        };
        let mut lowerer = LuaLowerer::new(&oracle, &interner);
        lowerer.push_scope();
        let ctx = lowerer.enter_preceding();
        let err = lowerer.lower_index(&index).unwrap_err();
        let _ = lowerer.exit_preceding(ctx);
        assert!(matches!(err, LowerError::FunctionIndex { .. }));
        lowerer.pop_scope();
    }
}
