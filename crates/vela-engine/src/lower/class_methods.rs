//! Class declaration lowering.
//!
//! A class becomes a table built by the runtime's class constructor:
//! instance members live on `prototype`, accessors on the `getters` and
//! `setters` slots the runtime's metamethods consult, statics directly on the
//! class table. Instance field initializers run at the top of the
//! constructor; a class with initializers but no declared constructor gets a
//! synthesized one that forwards its arguments up the superclass chain.

use super::function::{BodySource, FunctionFacts};
use super::params::LoweredParams;
use super::{ClassContext, FunctionContext, LowerResult, LuaLowerer};
use crate::frontend::ast::{
    AccessorKind, ClassDecl, ClassMember, ConstructorMember, FieldMember,
};
use crate::frontend::TypeId;
use crate::lua::ast::{LuaExpression, LuaFunction, LuaStatement};
use crate::lua::{
    runtime, CONSTRUCTOR_FIELD, GETTERS_FIELD, PROTOTYPE_FIELD, SELF, SETTERS_FIELD,
};

impl LuaLowerer<'_> {
    pub(crate) fn lower_class_decl(&mut self, decl: &ClassDecl) -> LowerResult<Vec<LuaStatement>> {
        let name = self.declare(&decl.name)?;
        let hoisted = decl
            .name
            .binding
            .map(|binding| self.oracle().referenced_before_declaration(binding))
            .unwrap_or(false);
        if hoisted {
            self.register_hoist(name.clone());
        }

        let superclass = decl.superclass.as_ref().map(|s| self.resolve_name(s));
        let mut args = vec![LuaExpression::string(
            self.interner().resolve(decl.name.name).to_string(),
        )];
        if let Some(base) = &superclass {
            args.push(LuaExpression::name(base));
        }
        let create = LuaExpression::call_named(runtime::CLASS, args);

        let mut out = Vec::new();
        if hoisted {
            out.push(LuaStatement::Assign {
                targets: vec![LuaExpression::name(&name)],
                values: vec![create],
            });
        } else {
            out.push(LuaStatement::Local {
                names: vec![name.clone()],
                values: vec![create],
            });
        }

        self.classes.push(ClassContext {
            name: name.clone(),
            instance_ty: decl.instance_ty,
            superclass,
        });
        let members = self.lower_class_members(&name, decl);
        self.classes.pop();
        out.extend(members?);
        Ok(out)
    }

    fn lower_class_members(
        &mut self,
        class_name: &str,
        decl: &ClassDecl,
    ) -> LowerResult<Vec<LuaStatement>> {
        let mut out = Vec::new();
        let prototype =
            LuaExpression::dot(LuaExpression::name(class_name), PROTOTYPE_FIELD);
        let mut constructor: Option<&ConstructorMember> = None;

        for member in &decl.members {
            match member {
                ClassMember::Constructor(ctor) => constructor = Some(ctor),
                ClassMember::Method(method) => {
                    let method_name = self.interner().resolve(method.name).to_string();
                    let value = self.lower_function_value(
                        &method_name,
                        &method.params,
                        BodySource::Block(&method.body),
                        FunctionFacts::of_method(method),
                        method.span,
                    )?;
                    let target = if method.is_static {
                        LuaExpression::dot(LuaExpression::name(class_name), method_name)
                    } else {
                        LuaExpression::dot(prototype.clone(), method_name)
                    };
                    out.push(LuaStatement::Assign {
                        targets: vec![target],
                        values: vec![value],
                    });
                }
                ClassMember::Accessor(accessor) => {
                    let slot = match accessor.kind {
                        AccessorKind::Getter => GETTERS_FIELD,
                        AccessorKind::Setter => SETTERS_FIELD,
                    };
                    let accessor_name = self.interner().resolve(accessor.name).to_string();
                    let mut facts = FunctionFacts::plain(TypeId::UNKNOWN);
                    facts.takes_receiver = true;
                    let value = self.lower_function_value(
                        &accessor_name,
                        &accessor.params,
                        BodySource::Block(&accessor.body),
                        facts,
                        accessor.span,
                    )?;
                    out.push(LuaStatement::Assign {
                        targets: vec![LuaExpression::dot(
                            LuaExpression::dot(LuaExpression::name(class_name), slot),
                            accessor_name,
                        )],
                        values: vec![value],
                    });
                }
                ClassMember::Field(field) if field.is_static => {
                    if let Some(init) = &field.initializer {
                        let (stmts, value) = self.lower_in_new_context(init)?;
                        out.extend(stmts);
                        out.push(LuaStatement::Assign {
                            targets: vec![LuaExpression::dot(
                                LuaExpression::name(class_name),
                                self.interner().resolve(field.name).to_string(),
                            )],
                            values: vec![value],
                        });
                    }
                }
                ClassMember::Field(_) => {}
            }
        }

        let instance_inits: Vec<&FieldMember> = decl
            .members
            .iter()
            .filter_map(|member| match member {
                ClassMember::Field(field) if !field.is_static && field.initializer.is_some() => {
                    Some(field)
                }
                _ => None,
            })
            .collect();

        if constructor.is_some() || !instance_inits.is_empty() {
            let function = self.lower_constructor(constructor, &instance_inits)?;
            out.push(LuaStatement::Assign {
                targets: vec![LuaExpression::dot(prototype, CONSTRUCTOR_FIELD)],
                values: vec![LuaExpression::Function(function)],
            });
        }
        Ok(out)
    }

    fn lower_constructor(
        &mut self,
        ctor: Option<&ConstructorMember>,
        field_inits: &[&FieldMember],
    ) -> LowerResult<LuaFunction> {
        self.push_scope();
        let result = self.constructor_in_scope(ctor, field_inits);
        self.pop_scope();
        result
    }

    fn constructor_in_scope(
        &mut self,
        ctor: Option<&ConstructorMember>,
        field_inits: &[&FieldMember],
    ) -> LowerResult<LuaFunction> {
        self.reserve_name(SELF);
        let lowered = match ctor {
            Some(ctor) => self.lower_parameters(&ctor.params)?,
            None => LoweredParams {
                names: vec![],
                // The synthesized constructor forwards whatever it was called
                // with up the chain
                is_vararg: true,
                prologue: vec![],
            },
        };

        self.functions.push(FunctionContext {
            return_arity: None,
            is_constructor: true,
        });
        let body_result = (|| -> LowerResult<Vec<LuaStatement>> {
            let mut body = Vec::new();
            if ctor.is_none() {
                if let Some(base) = self.classes.last().and_then(|c| c.superclass.clone()) {
                    let callee = LuaExpression::dot(
                        LuaExpression::dot(LuaExpression::name(base), PROTOTYPE_FIELD),
                        CONSTRUCTOR_FIELD,
                    );
                    body.push(LuaStatement::Call(LuaExpression::Call {
                        callee: Box::new(callee),
                        args: vec![LuaExpression::name(SELF), LuaExpression::Vararg],
                    }));
                }
            }
            for field in field_inits {
                let init = field.initializer.as_ref().unwrap();
                let (stmts, value) = self.lower_in_new_context(init)?;
                body.extend(stmts);
                body.push(LuaStatement::Assign {
                    targets: vec![LuaExpression::dot(
                        LuaExpression::name(SELF),
                        self.interner().resolve(field.name).to_string(),
                    )],
                    values: vec![value],
                });
            }
            if let Some(ctor) = ctor {
                body.extend(self.lower_block_statements(&ctor.body.statements)?);
            }
            Ok(body)
        })();
        self.functions.pop();
        let body_stmts = body_result?;

        let mut full = lowered.prologue;
        if let Some(hoisted) = self.hoisted_declaration() {
            full.push(hoisted);
        }
        full.extend(body_stmts);

        let mut names = lowered.names;
        names.insert(0, SELF.to_string());
        Ok(LuaFunction {
            params: names,
            is_vararg: lowered.is_vararg,
            body: full.into(),
        })
    }
}
