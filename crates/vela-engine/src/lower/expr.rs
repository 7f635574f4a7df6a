//! Expression lowering.
//!
//! Dispatches over the closed expression kind set. Anything Lua cannot
//! express inline (assignments, short-circuits with effectful right-hand
//! sides, conditionals with effectful branches) goes through the sequencer
//! and comes back as a pure fragment plus preceding statements.

use super::{LowerResult, LuaLowerer};
use crate::frontend::ast::{
    AssignmentExpression, AssignmentOperator, BinaryExpression, BinaryOperator,
    ConditionalExpression, Expression, Identifier, LogicalExpression, LogicalOperator,
    NewExpression, ObjectExpression, UnaryOperator, YieldExpression,
};
use crate::frontend::{TupleArity, TypeKind};
use crate::lua::ast::{
    LuaBinaryOp, LuaElse, LuaExpression, LuaIf, LuaStatement, LuaUnaryOp, TableField,
};
use crate::lua::{
    is_valid_identifier, runtime, CONSTRUCTOR_FIELD, EXPORTS, PROTOTYPE_FIELD, SELF,
};

/// How a call's result is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallUsage {
    /// Exactly one value is needed; tuple-returning calls are wrapped into a
    /// sequential container
    Value,
    /// The consumer handles multiple return values itself (return
    /// forwarding, positional selection, statement position)
    MultiValue,
}

impl LuaLowerer<'_> {
    /// Lower an expression to a pure Lua fragment. Side effects the target
    /// cannot express inline are pushed onto the active preceding buffer.
    pub(crate) fn lower_expression(&mut self, expr: &Expression) -> LowerResult<LuaExpression> {
        match expr {
            Expression::IntLiteral(lit) => Ok(LuaExpression::Int(lit.value)),
            Expression::FloatLiteral(lit) => Ok(LuaExpression::Number(lit.value)),
            Expression::StringLiteral(lit) => Ok(LuaExpression::string(
                self.interner().resolve(lit.value).to_string(),
            )),
            Expression::BooleanLiteral(lit) => Ok(if lit.value {
                LuaExpression::True
            } else {
                LuaExpression::False
            }),
            Expression::NullLiteral(_) => Ok(LuaExpression::Nil),
            Expression::Identifier(ident) => Ok(self.lower_identifier(ident)),
            Expression::Array(array) => {
                let elements = self.lower_expression_list(&array.elements)?;
                Ok(LuaExpression::Table(
                    elements.into_iter().map(TableField::Positional).collect(),
                ))
            }
            Expression::Object(object) => self.lower_object(object),
            Expression::Unary(unary) => {
                let operand = self.lower_expression(&unary.operand)?;
                let op = match unary.op {
                    UnaryOperator::Neg => LuaUnaryOp::Neg,
                    UnaryOperator::Not => LuaUnaryOp::Not,
                };
                Ok(LuaExpression::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            Expression::Binary(binary) => self.lower_binary(binary),
            Expression::Logical(logical) => self.lower_logical(logical),
            Expression::Assignment(assign) => self.lower_assignment(assign),
            Expression::Conditional(cond) => self.lower_conditional(cond),
            Expression::Call(call) => self.lower_call(call, CallUsage::Value),
            Expression::New(new) => self.lower_new(new),
            Expression::Member(member) => self.lower_member(member),
            Expression::Index(index) => self.lower_index(index),
            Expression::Function(function) => self.lower_function_expression(function),
            Expression::Await(await_expr) => {
                let operand = self.lower_expression(&await_expr.operand)?;
                Ok(LuaExpression::call_named(runtime::AWAIT, vec![operand]))
            }
            Expression::Yield(yield_expr) => self.lower_yield(yield_expr),
            Expression::This(_) => Ok(LuaExpression::name(SELF)),
            Expression::Super(sup) => {
                panic!("`super` outside a member access at {}", sup.span)
            }
        }
    }

    /// Identifier reference. Exported mutable bindings are always re-read
    /// through the export table so later mutation stays observable.
    pub(crate) fn lower_identifier(&mut self, ident: &Identifier) -> LuaExpression {
        if self.is_exported_mutable(ident) {
            let text = self.interner().resolve(ident.name).to_string();
            return LuaExpression::dot(LuaExpression::name(EXPORTS), text);
        }
        LuaExpression::Name(self.resolve_name(ident))
    }

    fn lower_object(&mut self, object: &ObjectExpression) -> LowerResult<LuaExpression> {
        let mut pairs = Vec::with_capacity(object.properties.len());
        for property in &object.properties {
            pairs.push(self.lower_in_new_context(&property.value)?);
        }
        let values = self.splice_ordered(pairs);
        let fields = object
            .properties
            .iter()
            .zip(values)
            .map(|(property, value)| TableField::Named {
                name: self.interner().resolve(property.key).to_string(),
                value,
            })
            .collect();
        Ok(LuaExpression::Table(fields))
    }

    fn lower_binary(&mut self, binary: &BinaryExpression) -> LowerResult<LuaExpression> {
        let left = self.lower_in_new_context(&binary.left)?;
        let right = self.lower_in_new_context(&binary.right)?;
        let mut operands = self.splice_ordered(vec![left, right]).into_iter();
        let left = operands.next().unwrap();
        let right = operands.next().unwrap();

        let op = match binary.op {
            // `+` on strings is concatenation in the target
            BinaryOperator::Add if self.oracle().kind(binary.ty) == TypeKind::String => {
                LuaBinaryOp::Concat
            }
            BinaryOperator::Add => LuaBinaryOp::Add,
            BinaryOperator::Sub => LuaBinaryOp::Sub,
            BinaryOperator::Mul => LuaBinaryOp::Mul,
            BinaryOperator::Div => LuaBinaryOp::Div,
            BinaryOperator::Mod => LuaBinaryOp::Mod,
            BinaryOperator::Eq => LuaBinaryOp::Eq,
            BinaryOperator::NotEq => LuaBinaryOp::NotEq,
            BinaryOperator::Less => LuaBinaryOp::Less,
            BinaryOperator::LessEq => LuaBinaryOp::LessEq,
            BinaryOperator::Greater => LuaBinaryOp::Greater,
            BinaryOperator::GreaterEq => LuaBinaryOp::GreaterEq,
        };
        Ok(LuaExpression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn lower_logical(&mut self, logical: &LogicalExpression) -> LowerResult<LuaExpression> {
        let left = self.lower_expression(&logical.left)?;
        let (right_stmts, right_value) = self.lower_in_new_context(&logical.right)?;

        if right_stmts.is_empty() {
            let op = match logical.op {
                LogicalOperator::And => LuaBinaryOp::And,
                LogicalOperator::Or => LuaBinaryOp::Or,
            };
            return Ok(LuaExpression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right_value),
            });
        }

        // The right side carries effects: evaluate it under an explicit
        // short-circuit branch
        let temp = self.fresh_name("temp");
        self.push_preceding(LuaStatement::Local {
            names: vec![temp.clone()],
            values: vec![left],
        });
        let condition = match logical.op {
            LogicalOperator::And => LuaExpression::name(&temp),
            LogicalOperator::Or => LuaExpression::Unary {
                op: LuaUnaryOp::Not,
                operand: Box::new(LuaExpression::name(&temp)),
            },
        };
        let mut branch = right_stmts;
        branch.push(LuaStatement::Assign {
            targets: vec![LuaExpression::name(&temp)],
            values: vec![right_value],
        });
        self.push_preceding(LuaStatement::If(LuaIf {
            condition,
            then_body: branch.into(),
            else_body: None,
        }));
        Ok(LuaExpression::Name(temp))
    }

    fn lower_conditional(&mut self, cond: &ConditionalExpression) -> LowerResult<LuaExpression> {
        let condition = self.lower_expression(&cond.condition)?;
        let (then_stmts, then_value) = self.lower_in_new_context(&cond.consequent)?;
        let (else_stmts, else_value) = self.lower_in_new_context(&cond.alternate)?;

        // `c and a or b` is only sound when `a` cannot be nil/false
        if then_stmts.is_empty() && else_stmts.is_empty() && then_value.is_always_truthy() {
            let picked = LuaExpression::Binary {
                op: LuaBinaryOp::And,
                left: Box::new(condition),
                right: Box::new(then_value),
            };
            return Ok(LuaExpression::Binary {
                op: LuaBinaryOp::Or,
                left: Box::new(picked),
                right: Box::new(else_value),
            });
        }

        let temp = self.fresh_name("temp");
        self.push_preceding(LuaStatement::Local {
            names: vec![temp.clone()],
            values: vec![],
        });
        let mut then_body = then_stmts;
        then_body.push(LuaStatement::Assign {
            targets: vec![LuaExpression::name(&temp)],
            values: vec![then_value],
        });
        let mut else_body = else_stmts;
        else_body.push(LuaStatement::Assign {
            targets: vec![LuaExpression::name(&temp)],
            values: vec![else_value],
        });
        self.push_preceding(LuaStatement::If(LuaIf {
            condition,
            then_body: then_body.into(),
            else_body: Some(LuaElse::Block(else_body.into())),
        }));
        Ok(LuaExpression::Name(temp))
    }

    /// Assignment in either expression or statement position. The statement
    /// lands in the active preceding buffer; the returned fragment re-reads
    /// the target.
    pub(crate) fn lower_assignment(
        &mut self,
        assign: &AssignmentExpression,
    ) -> LowerResult<LuaExpression> {
        let target = self.lower_assignment_target(assign)?;
        let (value_stmts, value) = self.lower_in_new_context(&assign.value)?;

        // The target chain's base is already stabilized by
        // lower_assignment_target, so the target fragment itself is
        // re-usable. For a compound operator the *old value* must also be
        // read before the right-hand side's effects run.
        let stored = match assign.op {
            AssignmentOperator::Assign => {
                self.push_preceding_all(value_stmts);
                value
            }
            AssignmentOperator::Add | AssignmentOperator::Sub => {
                let old = if value_stmts.is_empty() {
                    target.clone()
                } else {
                    self.stabilize(target.clone())
                };
                self.push_preceding_all(value_stmts);
                let op = match assign.op {
                    AssignmentOperator::Add
                        if self.oracle().kind(assign.target.ty()) == TypeKind::String =>
                    {
                        LuaBinaryOp::Concat
                    }
                    AssignmentOperator::Add => LuaBinaryOp::Add,
                    _ => LuaBinaryOp::Sub,
                };
                LuaExpression::Binary {
                    op,
                    left: Box::new(old),
                    right: Box::new(value),
                }
            }
        };
        self.push_preceding(LuaStatement::Assign {
            targets: vec![target.clone()],
            values: vec![stored],
        });
        Ok(target)
    }

    /// Lower an assignment target to a stable lvalue fragment. Only the
    /// access chain's *base* is extracted, never the full chain.
    fn lower_assignment_target(
        &mut self,
        assign: &AssignmentExpression,
    ) -> LowerResult<LuaExpression> {
        match &*assign.target {
            Expression::Identifier(ident) => Ok(self.lower_identifier(ident)),
            Expression::Member(member) => {
                let base = self.lower_expression(&member.object)?;
                let base = self.stabilize(base);
                Ok(LuaExpression::dot(
                    base,
                    self.interner().resolve(member.property).to_string(),
                ))
            }
            Expression::Index(index) => {
                let (base, key) = self.lower_index_parts(index)?;
                let base = self.stabilize(base);
                let key = self.stabilize(key);
                Ok(LuaExpression::Index {
                    base: Box::new(base),
                    index: Box::new(key),
                })
            }
            other => panic!("invalid assignment target at {}", other.span()),
        }
    }

    fn lower_new(&mut self, new: &NewExpression) -> LowerResult<LuaExpression> {
        let class = self.lower_identifier(&new.callee);
        let mut args = vec![class];
        args.extend(self.lower_expression_list(&new.arguments)?);
        Ok(LuaExpression::call_named(runtime::NEW, args))
    }

    fn lower_yield(&mut self, yield_expr: &YieldExpression) -> LowerResult<LuaExpression> {
        let args = match &yield_expr.argument {
            Some(argument) => vec![self.lower_expression(argument)?],
            None => vec![],
        };
        Ok(LuaExpression::Call {
            callee: Box::new(LuaExpression::dot(
                LuaExpression::name("coroutine"),
                "yield",
            )),
            args,
        })
    }

    /// Lower a call expression.
    ///
    /// With [`CallUsage::Value`], a call whose declared return is a tuple is
    /// wrapped into a sequential container so exactly one value flows out;
    /// multi-value consumers pass [`CallUsage::MultiValue`] to suppress the
    /// wrapping.
    pub(crate) fn lower_call(
        &mut self,
        call: &crate::frontend::ast::CallExpression,
        usage: CallUsage,
    ) -> LowerResult<LuaExpression> {
        let lowered = self.lower_call_inner(call)?;
        if usage == CallUsage::Value && self.call_tuple_arity(call).is_some() {
            return Ok(LuaExpression::Table(vec![TableField::Positional(lowered)]));
        }
        Ok(lowered)
    }

    /// Declared tuple arity of a call's result, if any
    pub(crate) fn call_tuple_arity(
        &self,
        call: &crate::frontend::ast::CallExpression,
    ) -> Option<TupleArity> {
        self.oracle().tuple_arity(call.ty)
    }

    fn lower_call_inner(
        &mut self,
        call: &crate::frontend::ast::CallExpression,
    ) -> LowerResult<LuaExpression> {
        // super(...) runs the superclass constructor on the current receiver
        if let Expression::Super(sup) = &*call.callee {
            let base = self.superclass_name(sup.span);
            let mut args = vec![LuaExpression::name(SELF)];
            args.extend(self.lower_expression_list(&call.arguments)?);
            let callee = LuaExpression::dot(
                LuaExpression::dot(LuaExpression::name(base), PROTOTYPE_FIELD),
                CONSTRUCTOR_FIELD,
            );
            return Ok(LuaExpression::Call {
                callee: Box::new(callee),
                args,
            });
        }

        // super.m(...) dispatches through the superclass prototype with the
        // current receiver
        if let Expression::Member(member) = &*call.callee {
            if matches!(&*member.object, Expression::Super(_)) {
                let base = self.superclass_name(member.span);
                let method = self.interner().resolve(member.property).to_string();
                let mut args = vec![LuaExpression::name(SELF)];
                args.extend(self.lower_expression_list(&call.arguments)?);
                let callee = LuaExpression::dot(
                    LuaExpression::dot(LuaExpression::name(base), PROTOTYPE_FIELD),
                    method,
                );
                return Ok(LuaExpression::Call {
                    callee: Box::new(callee),
                    args,
                });
            }

            // Instance method call: receiver-passing `:` syntax
            if self.oracle().kind(member.object.ty()) == TypeKind::Class {
                let method = self.interner().resolve(member.property).to_string();
                let mut items = vec![self.lower_in_new_context(&member.object)?];
                for argument in &call.arguments {
                    items.push(self.lower_in_new_context(argument)?);
                }
                let mut values = self.splice_ordered(items).into_iter();
                let base = values.next().unwrap();
                let args: Vec<_> = values.collect();
                // A `this: void` method binds no receiver, so no `:` sugar
                if !self
                    .oracle()
                    .method_binds_receiver(member.object.ty(), &method)
                {
                    return Ok(LuaExpression::Call {
                        callee: Box::new(LuaExpression::dot(base, method)),
                        args,
                    });
                }
                if is_valid_identifier(&method) {
                    return Ok(LuaExpression::MethodCall {
                        base: Box::new(base),
                        name: method,
                        args,
                    });
                }
                // No `:` sugar for exotic names; pass the receiver explicitly
                let base = self.stabilize(base);
                let mut full_args = vec![base.clone()];
                full_args.extend(args);
                return Ok(LuaExpression::Call {
                    callee: Box::new(LuaExpression::Index {
                        base: Box::new(base),
                        index: Box::new(LuaExpression::string(method)),
                    }),
                    args: full_args,
                });
            }
        }

        let mut items = vec![self.lower_in_new_context(&call.callee)?];
        for argument in &call.arguments {
            items.push(self.lower_in_new_context(argument)?);
        }
        let mut values = self.splice_ordered(items).into_iter();
        let callee = values.next().unwrap();
        let args = values.collect();
        Ok(LuaExpression::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// Emitted name of the enclosing class's superclass.
    ///
    /// The front end only accepts `super` inside members of a derived class,
    /// so a miss here is a lowering-order bug.
    pub(crate) fn superclass_name(&self, span: crate::frontend::Span) -> String {
        self.classes
            .last()
            .and_then(|class| class.superclass.clone())
            .unwrap_or_else(|| panic!("`super` outside a derived class member at {}", span))
    }
}
