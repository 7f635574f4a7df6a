//! Statement lowering.
//!
//! Statement position is where buffered side effects come to rest: every
//! statement lowers inside its own preceding buffer, and whatever the
//! expression lowerers extracted lands immediately before the statement's own
//! output. Loop conditions are the one place that needs care, since their
//! effects must re-run on every iteration.

use super::expr::CallUsage;
use super::{LowerResult, LuaLowerer};
use crate::frontend::ast::{
    Block, ElseClause, EnumDecl, ExportDecl, Expression, IfStatement, Statement, VariableDecl,
    WhileStatement,
};
use crate::frontend::ast::Identifier;
use crate::frontend::EnumValue;
use crate::lua::ast::{
    LuaElse, LuaExpression, LuaIf, LuaStatement, LuaUnaryOp, TableField,
};
use crate::lua::EXPORTS;

impl LuaLowerer<'_> {
    /// Lower a statement sequence within the current scope, splicing each
    /// statement's extracted effects in front of it.
    pub(crate) fn lower_block_statements(
        &mut self,
        stmts: &[Statement],
    ) -> LowerResult<Vec<LuaStatement>> {
        let mut out = Vec::new();
        for stmt in stmts {
            let ctx = self.enter_preceding();
            let result = self.lower_statement(stmt);
            out.extend(self.exit_preceding(ctx));
            out.extend(result?);
        }
        Ok(out)
    }

    /// Lower a block in its own scope, with hoisted declarations at the top
    pub(crate) fn lower_scoped_block(&mut self, block: &Block) -> LowerResult<Vec<LuaStatement>> {
        self.push_scope();
        let result = self.lower_block_statements(&block.statements);
        let hoisted = self.hoisted_declaration();
        self.pop_scope();
        let mut stmts = result?;
        if let Some(hoisted) = hoisted {
            stmts.insert(0, hoisted);
        }
        Ok(stmts)
    }

    pub(crate) fn lower_statement(&mut self, stmt: &Statement) -> LowerResult<Vec<LuaStatement>> {
        match stmt {
            Statement::VariableDecl(decl) => self.lower_variable_decl(decl),
            Statement::Expression(stmt) => {
                // A call in statement position needs no single-value wrapping
                if let Expression::Call(call) = &stmt.expression {
                    let value = self.lower_call(call, CallUsage::MultiValue)?;
                    return Ok(vec![LuaStatement::Call(value)]);
                }
                let value = self.lower_expression(&stmt.expression)?;
                Ok(match value {
                    LuaExpression::Call { .. } | LuaExpression::MethodCall { .. } => {
                        vec![LuaStatement::Call(value)]
                    }
                    // Pure leftovers (e.g. an assignment's re-read) are dropped
                    _ => vec![],
                })
            }
            Statement::Return(ret) => Ok(vec![self.lower_return(ret)?]),
            Statement::If(stmt) => Ok(vec![LuaStatement::If(self.lower_if(stmt)?)]),
            Statement::While(stmt) => self.lower_while(stmt),
            Statement::Block(block) => Ok(vec![LuaStatement::Do(
                self.lower_scoped_block(block)?.into(),
            )]),
            Statement::Break(_) => Ok(vec![LuaStatement::Break]),
            Statement::FunctionDecl(decl) => self.lower_function_decl(decl),
            Statement::ClassDecl(decl) => self.lower_class_decl(decl),
            Statement::EnumDecl(decl) => self.lower_enum_decl(decl),
            Statement::Export(export) => self.lower_export(export),
        }
    }

    /// `let` / `const`. The initializer lowers before the name is declared,
    /// so a shadowing declaration can still read the outer binding.
    fn lower_variable_decl(&mut self, decl: &VariableDecl) -> LowerResult<Vec<LuaStatement>> {
        let init = match &decl.init {
            Some(init) => Some(self.lower_expression(init)?),
            None => None,
        };
        let name = self.declare(&decl.name)?;

        let hoisted = decl
            .name
            .binding
            .map(|binding| self.oracle().referenced_before_declaration(binding))
            .unwrap_or(false);
        if hoisted {
            self.register_hoist(name.clone());
            return Ok(match init {
                Some(init) => vec![LuaStatement::Assign {
                    targets: vec![LuaExpression::name(&name)],
                    values: vec![init],
                }],
                None => vec![],
            });
        }
        Ok(vec![LuaStatement::Local {
            names: vec![name],
            values: init.into_iter().collect(),
        }])
    }

    fn lower_if(&mut self, stmt: &IfStatement) -> LowerResult<LuaIf> {
        let condition = self.lower_expression(&stmt.condition)?;
        let then_body = self.lower_scoped_block(&stmt.consequent)?;
        let else_body = match &stmt.alternate {
            None => None,
            Some(ElseClause::Block(block)) => {
                Some(LuaElse::Block(self.lower_scoped_block(block)?.into()))
            }
            Some(ElseClause::If(nested)) => {
                // The nested condition's effects belong inside the else
                // branch, which rules out the `elseif` form when present
                let ctx = self.enter_preceding();
                let result = self.lower_if(nested);
                let stmts = self.exit_preceding(ctx);
                let nested_if = result?;
                if stmts.is_empty() {
                    Some(LuaElse::If(Box::new(nested_if)))
                } else {
                    let mut block = stmts;
                    block.push(LuaStatement::If(nested_if));
                    Some(LuaElse::Block(block.into()))
                }
            }
        };
        Ok(LuaIf {
            condition,
            then_body: then_body.into(),
            else_body,
        })
    }

    /// A while condition with extracted effects re-runs them every iteration,
    /// so the loop rotates into `while true` with an explicit exit test.
    fn lower_while(&mut self, stmt: &WhileStatement) -> LowerResult<Vec<LuaStatement>> {
        let (condition_stmts, condition) = self.lower_in_new_context(&stmt.condition)?;
        let body = self.lower_scoped_block(&stmt.body)?;

        if condition_stmts.is_empty() {
            return Ok(vec![LuaStatement::While {
                condition,
                body: body.into(),
            }]);
        }

        let mut rotated = condition_stmts;
        rotated.push(LuaStatement::If(LuaIf {
            condition: LuaExpression::Unary {
                op: LuaUnaryOp::Not,
                operand: Box::new(condition),
            },
            then_body: vec![LuaStatement::Break].into(),
            else_body: None,
        }));
        rotated.extend(body);
        Ok(vec![LuaStatement::While {
            condition: LuaExpression::True,
            body: rotated.into(),
        }])
    }

    /// Plain enums materialize as a value table; const enums are fully erased
    /// (their members folded to literals at every use site).
    fn lower_enum_decl(&mut self, decl: &EnumDecl) -> LowerResult<Vec<LuaStatement>> {
        if decl.is_const {
            // Name validation still applies even though nothing is emitted
            self.declare(&decl.name)?;
            return Ok(vec![]);
        }
        let name = self.declare(&decl.name)?;
        let fields = decl
            .members
            .iter()
            .map(|member| TableField::Named {
                name: self.interner().resolve(member.name).to_string(),
                value: match &member.value {
                    EnumValue::Int(n) => LuaExpression::Int(*n),
                    EnumValue::Str(s) => LuaExpression::Str(s.clone()),
                },
            })
            .collect();
        Ok(vec![LuaStatement::Local {
            names: vec![name],
            values: vec![LuaExpression::Table(fields)],
        }])
    }

    fn lower_export(&mut self, export: &ExportDecl) -> LowerResult<Vec<LuaStatement>> {
        // An exported mutable binding has no local slot at all: every read
        // and write anywhere in the module goes through the export table
        if let Statement::VariableDecl(decl) = &*export.declaration {
            if decl.mutable && self.is_exported_mutable(&decl.name) {
                let value = match &decl.init {
                    Some(init) => self.lower_expression(init)?,
                    None => LuaExpression::Nil,
                };
                self.declare(&decl.name)?;
                let source = self.interner().resolve(decl.name.name).to_string();
                self.register_export(&source);
                return Ok(vec![LuaStatement::Assign {
                    targets: vec![LuaExpression::dot(LuaExpression::name(EXPORTS), source)],
                    values: vec![value],
                }]);
            }
        }

        let mut stmts = self.lower_statement(&export.declaration)?;
        if let Some(ident) = exported_name(&export.declaration) {
            let source = self.interner().resolve(ident.name).to_string();
            let emitted = self.resolve_name(ident);
            self.register_export(&source);
            let erased = matches!(&*export.declaration, Statement::EnumDecl(e) if e.is_const);
            if !erased {
                stmts.push(LuaStatement::Assign {
                    targets: vec![LuaExpression::dot(LuaExpression::name(EXPORTS), source)],
                    values: vec![LuaExpression::Name(emitted)],
                });
            }
        }
        Ok(stmts)
    }
}

/// The declared name an export statement publishes, if it has one
fn exported_name(stmt: &Statement) -> Option<&Identifier> {
    match stmt {
        Statement::VariableDecl(decl) => Some(&decl.name),
        Statement::FunctionDecl(decl) => Some(&decl.name),
        Statement::ClassDecl(decl) => Some(&decl.name),
        Statement::EnumDecl(decl) => Some(&decl.name),
        _ => None,
    }
}
