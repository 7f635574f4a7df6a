//! Function lowering.
//!
//! All function-like forms (declarations, expressions, arrows, methods,
//! constructors) funnel through one core that opens a scope, lowers the
//! parameter prologue, lowers the body under a fresh function context, and
//! then applies the shape transforms: generators are rebuilt around a
//! coroutine with an iterator facade, async functions are wrapped by the
//! runtime's task adapter.

use super::expr::CallUsage;
use super::{FunctionContext, LowerError, LowerResult, LuaLowerer};
use crate::frontend::ast::{
    Block, Expression, FunctionBody, FunctionDecl, FunctionExpression, MethodMember, Parameter,
    ReturnStatement,
};
use crate::frontend::{Span, TypeId};
use crate::lua::ast::{
    LuaBinaryOp, LuaExpression, LuaFunction, LuaIf, LuaStatement, LuaUnaryOp, TableField,
};
use crate::lua::{runtime, SELF};

/// Shape facts for one function-like form, collected before lowering
#[derive(Debug, Clone, Copy)]
pub struct FunctionFacts {
    /// Wrap the value with the runtime async adapter
    pub is_async: bool,
    /// Rebuild the body as a coroutine-backed iterator
    pub is_generator: bool,
    /// Declared return type (drives tuple-return lowering and generator
    /// legality)
    pub return_ty: TypeId,
    /// Constructor bodies may not return values
    pub is_constructor: bool,
    /// Emit an explicit `self` as the first Lua parameter
    pub takes_receiver: bool,
}

impl FunctionFacts {
    /// A plain function with the given declared return type
    pub fn plain(return_ty: TypeId) -> Self {
        Self {
            is_async: false,
            is_generator: false,
            return_ty,
            is_constructor: false,
            takes_receiver: false,
        }
    }

    /// Facts for a function or arrow expression
    pub fn of_expression(function: &FunctionExpression) -> Self {
        Self {
            is_async: function.is_async,
            is_generator: function.is_generator,
            return_ty: function.return_ty,
            is_constructor: false,
            takes_receiver: false,
        }
    }

    /// Facts for a named function declaration
    pub fn of_decl(decl: &FunctionDecl) -> Self {
        Self {
            is_async: decl.is_async,
            is_generator: decl.is_generator,
            return_ty: decl.return_ty,
            is_constructor: false,
            takes_receiver: false,
        }
    }

    /// Facts for a class method; instance methods take the receiver unless it
    /// is explicitly declared absent (`this: void`)
    pub fn of_method(method: &MethodMember) -> Self {
        let receiver_absent = method
            .params
            .first()
            .map(|param| param.is_receiver && param.ty == TypeId::VOID)
            .unwrap_or(false);
        Self {
            is_async: method.is_async,
            is_generator: method.is_generator,
            return_ty: method.return_ty,
            is_constructor: false,
            takes_receiver: !method.is_static && !receiver_absent,
        }
    }

    /// Facts for a class constructor
    pub fn constructor() -> Self {
        Self {
            is_async: false,
            is_generator: false,
            return_ty: TypeId::VOID,
            is_constructor: true,
            takes_receiver: true,
        }
    }
}

/// Body of a function-like form, by reference
pub(crate) enum BodySource<'a> {
    Block(&'a Block),
    /// Arrow shorthand: the expression is an implicit return
    Expression(&'a Expression),
}

impl<'a> From<&'a FunctionBody> for BodySource<'a> {
    fn from(body: &'a FunctionBody) -> Self {
        match body {
            FunctionBody::Block(block) => BodySource::Block(block),
            FunctionBody::Expression(expr) => BodySource::Expression(expr),
        }
    }
}

impl LuaLowerer<'_> {
    /// Lower any function-like form to the expression producing its value.
    pub(crate) fn lower_function_value(
        &mut self,
        display_name: &str,
        params: &[Parameter],
        body: BodySource<'_>,
        facts: FunctionFacts,
        span: Span,
    ) -> LowerResult<LuaExpression> {
        if facts.is_generator && !self.oracle().satisfies_iterator(facts.return_ty) {
            return Err(LowerError::InvalidGeneratorReturn {
                name: display_name.to_string(),
                span,
            });
        }

        self.push_scope();
        let result = self.function_in_scope(params, body, facts);
        self.pop_scope();
        let function = result?;

        if facts.is_async {
            return Ok(LuaExpression::call_named(
                runtime::ASYNC,
                vec![LuaExpression::Function(function)],
            ));
        }
        Ok(LuaExpression::Function(function))
    }

    /// Everything between the scope push and pop: parameters, context,
    /// body, hoists, and the generator rebuild (which needs the scope alive
    /// for its temporaries).
    fn function_in_scope(
        &mut self,
        params: &[Parameter],
        body: BodySource<'_>,
        facts: FunctionFacts,
    ) -> LowerResult<LuaFunction> {
        if facts.takes_receiver {
            self.reserve_name(SELF);
        }
        let lowered_params = self.lower_parameters(params)?;

        self.functions.push(FunctionContext {
            return_arity: self.oracle().tuple_arity(facts.return_ty),
            is_constructor: facts.is_constructor,
        });
        let body_result = match body {
            BodySource::Block(block) => self.lower_block_statements(&block.statements),
            BodySource::Expression(expr) => self.lower_implicit_return(expr),
        };
        self.functions.pop();
        let body_stmts = body_result?;

        let mut inner = Vec::new();
        if let Some(hoisted) = self.hoisted_declaration() {
            inner.push(hoisted);
        }
        inner.extend(body_stmts);

        let mut names = lowered_params.names;
        if facts.takes_receiver {
            names.insert(0, SELF.to_string());
        }

        if facts.is_generator {
            let mut outer = lowered_params.prologue;
            outer.extend(self.generator_body(inner));
            return Ok(LuaFunction {
                params: names,
                is_vararg: lowered_params.is_vararg,
                body: outer.into(),
            });
        }

        let mut full = lowered_params.prologue;
        full.extend(inner);
        Ok(LuaFunction {
            params: names,
            is_vararg: lowered_params.is_vararg,
            body: full.into(),
        })
    }

    fn lower_implicit_return(&mut self, expr: &Expression) -> LowerResult<Vec<LuaStatement>> {
        let ctx = self.enter_preceding();
        let result = self.lower_return_values(Some(expr), expr.span());
        let mut stmts = self.exit_preceding(ctx);
        stmts.push(LuaStatement::Return(result?));
        Ok(stmts)
    }

    /// Rebuild a generator body: the parameter prologue stays eager, the body
    /// moves into a coroutine, and the returned iterator's `next` drives it.
    /// A finished coroutine keeps answering `{done = true}`.
    fn generator_body(&mut self, body: Vec<LuaStatement>) -> Vec<LuaStatement> {
        let co = self.fresh_name("co");
        let ok = self.fresh_name("ok");
        let value = self.fresh_name("value");

        let status = |co: &str| {
            LuaExpression::Call {
                callee: Box::new(LuaExpression::dot(LuaExpression::name("coroutine"), "status")),
                args: vec![LuaExpression::name(co)],
            }
        };
        let is_dead = |co: &str| LuaExpression::Binary {
            op: LuaBinaryOp::Eq,
            left: Box::new(status(co)),
            right: Box::new(LuaExpression::string("dead")),
        };
        let done_table = |done: bool, value: Option<&str>| {
            let mut fields = vec![TableField::Named {
                name: "done".to_string(),
                value: if done {
                    LuaExpression::True
                } else {
                    LuaExpression::False
                },
            }];
            if let Some(value) = value {
                fields.push(TableField::Named {
                    name: "value".to_string(),
                    value: LuaExpression::name(value),
                });
            }
            LuaExpression::Table(fields)
        };

        let mut next_body = Vec::new();
        next_body.push(LuaStatement::If(LuaIf {
            condition: is_dead(&co),
            then_body: vec![LuaStatement::Return(vec![done_table(true, None)])].into(),
            else_body: None,
        }));
        next_body.push(LuaStatement::Local {
            names: vec![ok.clone(), value.clone()],
            values: vec![LuaExpression::Call {
                callee: Box::new(LuaExpression::dot(LuaExpression::name("coroutine"), "resume")),
                args: vec![LuaExpression::name(&co)],
            }],
        });
        next_body.push(LuaStatement::If(LuaIf {
            condition: LuaExpression::Unary {
                op: LuaUnaryOp::Not,
                operand: Box::new(LuaExpression::name(&ok)),
            },
            then_body: vec![LuaStatement::Call(LuaExpression::call_named(
                "error",
                vec![LuaExpression::name(&value)],
            ))]
            .into(),
            else_body: None,
        }));
        // A return value rides out on the final resume
        next_body.push(LuaStatement::If(LuaIf {
            condition: is_dead(&co),
            then_body: vec![LuaStatement::Return(vec![done_table(true, Some(&value))])].into(),
            else_body: None,
        }));
        next_body.push(LuaStatement::Return(vec![done_table(false, Some(&value))]));

        let iterator = LuaExpression::Table(vec![TableField::Named {
            name: "next".to_string(),
            value: LuaExpression::Function(LuaFunction {
                params: vec![],
                is_vararg: false,
                body: next_body.into(),
            }),
        }]);

        vec![
            LuaStatement::Local {
                names: vec![co.clone()],
                values: vec![LuaExpression::Call {
                    callee: Box::new(LuaExpression::dot(
                        LuaExpression::name("coroutine"),
                        "create",
                    )),
                    args: vec![LuaExpression::Function(LuaFunction {
                        params: vec![],
                        is_vararg: false,
                        body: body.into(),
                    })],
                }],
            },
            LuaStatement::Return(vec![iterator]),
        ]
    }

    /// Function or arrow expression in expression position.
    ///
    /// A named function expression that refers to itself needs a binding the
    /// closure can capture before the value exists, so it lowers as a
    /// declare-then-assign pair in the preceding buffer.
    pub(crate) fn lower_function_expression(
        &mut self,
        function: &FunctionExpression,
    ) -> LowerResult<LuaExpression> {
        let facts = FunctionFacts::of_expression(function);
        let display_name = match &function.name {
            Some(name) => self.interner().resolve(name.name).to_string(),
            None => "(anonymous)".to_string(),
        };

        let self_referencing = function
            .name
            .as_ref()
            .and_then(|name| name.binding)
            .map(|binding| self.oracle().self_reference_count(binding) > 0)
            .unwrap_or(false);

        if self_referencing {
            let name = self.declare(function.name.as_ref().unwrap())?;
            self.push_preceding(LuaStatement::Local {
                names: vec![name.clone()],
                values: vec![],
            });
            let value = self.lower_function_value(
                &display_name,
                &function.params,
                BodySource::from(&function.body),
                facts,
                function.span,
            )?;
            self.push_preceding(LuaStatement::Assign {
                targets: vec![LuaExpression::name(&name)],
                values: vec![value],
            });
            return Ok(LuaExpression::Name(name));
        }

        self.lower_function_value(
            &display_name,
            &function.params,
            BodySource::from(&function.body),
            facts,
            function.span,
        )
    }

    /// Named function declaration in statement position.
    pub(crate) fn lower_function_decl(
        &mut self,
        decl: &FunctionDecl,
    ) -> LowerResult<Vec<LuaStatement>> {
        let name = self.declare(&decl.name)?;
        let facts = FunctionFacts::of_decl(decl);

        let hoisted = decl
            .name
            .binding
            .map(|binding| self.oracle().referenced_before_declaration(binding))
            .unwrap_or(false);
        if hoisted {
            self.register_hoist(name.clone());
        }

        let display_name = self.interner().resolve(decl.name.name).to_string();
        let value = self.lower_function_value(
            &display_name,
            &decl.params,
            BodySource::Block(&decl.body),
            facts,
            decl.span,
        )?;

        if hoisted {
            return Ok(vec![LuaStatement::Assign {
                targets: vec![LuaExpression::name(&name)],
                values: vec![value],
            }]);
        }
        Ok(match value {
            // `local function` keeps the name visible to recursive calls
            LuaExpression::Function(function) => {
                vec![LuaStatement::LocalFunction { name, function }]
            }
            // Wrapped values (async) still need the binding live before the
            // closure body runs, so declare first and assign after
            other => vec![
                LuaStatement::Local {
                    names: vec![name.clone()],
                    values: vec![],
                },
                LuaStatement::Assign {
                    targets: vec![LuaExpression::name(&name)],
                    values: vec![other],
                },
            ],
        })
    }

    /// Lower a return statement under the enclosing function context.
    pub(crate) fn lower_return(&mut self, ret: &ReturnStatement) -> LowerResult<LuaStatement> {
        let values = self.lower_return_values(ret.value.as_ref(), ret.span)?;
        Ok(LuaStatement::Return(values))
    }

    /// The declared-return-shape rule:
    /// - constructors may not return a value at all;
    /// - for a tuple-typed function, a returned sequence literal spreads into
    ///   a true multi-value return, a same-shaped call forwards its values
    ///   live, and anything else unpacks a container value;
    /// - everything else returns one value.
    fn lower_return_values(
        &mut self,
        value: Option<&Expression>,
        span: Span,
    ) -> LowerResult<Vec<LuaExpression>> {
        let context = self.functions.last();
        let is_constructor = context.map(|c| c.is_constructor).unwrap_or(false);
        let return_arity = context.and_then(|c| c.return_arity);

        let Some(value) = value else {
            return Ok(vec![]);
        };
        if is_constructor {
            return Err(LowerError::ConstructorReturn { span });
        }

        if return_arity.is_some() {
            if let Expression::Array(array) = value {
                return self.lower_expression_list(&array.elements);
            }
            // Only a call of the same declared shape forwards live; any other
            // tuple value goes through the container spread below
            if let Expression::Call(call) = value {
                if self.call_tuple_arity(call) == return_arity {
                    return Ok(vec![self.lower_call(call, CallUsage::MultiValue)?]);
                }
            }
            let container = self.sequence_expression(value)?;
            return Ok(vec![LuaExpression::Call {
                callee: Box::new(LuaExpression::dot(LuaExpression::name("table"), "unpack")),
                args: vec![container],
            }]);
        }

        Ok(vec![self.lower_expression(value)?])
    }
}
