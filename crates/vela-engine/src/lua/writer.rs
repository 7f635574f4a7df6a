//! Lua text emission.
//!
//! Statement-per-line, indentation-scoped rendering of a [`LuaBlock`].
//! Expression rendering tracks operator precedence so parentheses only
//! appear where the Lua grammar needs them (plus the explicit `Paren` nodes
//! lowering inserts for value truncation).

use super::ast::{
    LuaBinaryOp, LuaBlock, LuaElse, LuaExpression, LuaFunction, LuaIf, LuaStatement, TableField,
    UNARY_PRECEDENCE,
};
use super::is_valid_identifier;
use std::fmt::Write;

const INDENT: &str = "    ";

/// Renders Lua syntax trees to text.
#[derive(Default)]
pub struct LuaWriter {
    out: String,
    indent: usize,
}

impl LuaWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a block to a string
    pub fn render(block: &LuaBlock) -> String {
        let mut writer = Self::new();
        writer.block(block);
        writer.out
    }

    fn block(&mut self, block: &LuaBlock) {
        for stmt in &block.0 {
            self.statement(stmt);
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn statement(&mut self, stmt: &LuaStatement) {
        self.pad();
        match stmt {
            LuaStatement::Local { names, values } => {
                self.out.push_str("local ");
                self.out.push_str(&names.join(", "));
                if !values.is_empty() {
                    self.out.push_str(" = ");
                    self.expr_list(values);
                }
            }
            LuaStatement::LocalFunction { name, function } => {
                let _ = write!(self.out, "local function {}", name);
                self.function_tail(function);
            }
            LuaStatement::Assign { targets, values } => {
                self.expr_list(targets);
                self.out.push_str(" = ");
                self.expr_list(values);
            }
            LuaStatement::Call(call) => {
                self.expr(call, 0);
            }
            LuaStatement::Do(body) => {
                self.out.push_str("do\n");
                self.indented(body);
                self.pad();
                self.out.push_str("end");
            }
            LuaStatement::If(if_stmt) => {
                self.if_chain(if_stmt);
                self.pad();
                self.out.push_str("end");
            }
            LuaStatement::While { condition, body } => {
                self.out.push_str("while ");
                self.expr(condition, 0);
                self.out.push_str(" do\n");
                self.indented(body);
                self.pad();
                self.out.push_str("end");
            }
            LuaStatement::Return(values) => {
                self.out.push_str("return");
                if !values.is_empty() {
                    self.out.push(' ');
                    self.expr_list(values);
                }
            }
            LuaStatement::Break => {
                self.out.push_str("break");
            }
        }
        self.out.push('\n');
    }

    fn indented(&mut self, body: &LuaBlock) {
        self.indent += 1;
        self.block(body);
        self.indent -= 1;
    }

    fn if_chain(&mut self, if_stmt: &LuaIf) {
        self.out.push_str("if ");
        self.expr(&if_stmt.condition, 0);
        self.out.push_str(" then\n");
        self.indented(&if_stmt.then_body);
        match &if_stmt.else_body {
            None => {}
            Some(LuaElse::Block(body)) => {
                self.pad();
                self.out.push_str("else\n");
                self.indented(body);
            }
            Some(LuaElse::If(chained)) => {
                self.pad();
                self.out.push_str("else");
                // "else" + "if ..." fuse into elseif
                self.if_chain(chained);
            }
        }
    }

    fn expr_list(&mut self, exprs: &[LuaExpression]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr, 0);
        }
    }

    fn function_tail(&mut self, function: &LuaFunction) {
        self.out.push('(');
        self.out.push_str(&function.params.join(", "));
        if function.is_vararg {
            if !function.params.is_empty() {
                self.out.push_str(", ");
            }
            self.out.push_str("...");
        }
        self.out.push_str(")\n");
        self.indented(&function.body);
        self.pad();
        self.out.push_str("end");
    }

    fn expr(&mut self, expr: &LuaExpression, min_prec: u8) {
        match expr {
            LuaExpression::Nil => self.out.push_str("nil"),
            LuaExpression::True => self.out.push_str("true"),
            LuaExpression::False => self.out.push_str("false"),
            LuaExpression::Int(value) => {
                let _ = write!(self.out, "{}", value);
            }
            LuaExpression::Number(value) => {
                if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
                    let _ = write!(self.out, "{:.1}", value);
                } else {
                    let _ = write!(self.out, "{}", value);
                }
            }
            LuaExpression::Str(value) => {
                self.out.push('"');
                self.out.push_str(&escape_string(value));
                self.out.push('"');
            }
            LuaExpression::Vararg => self.out.push_str("..."),
            LuaExpression::Name(name) => self.out.push_str(name),
            LuaExpression::Table(fields) => {
                self.out.push('{');
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    match field {
                        TableField::Positional(value) => self.expr(value, 0),
                        TableField::Named { name, value } => {
                            if is_valid_identifier(name) {
                                let _ = write!(self.out, "{} = ", name);
                            } else {
                                let _ = write!(self.out, "[\"{}\"] = ", escape_string(name));
                            }
                            self.expr(value, 0);
                        }
                    }
                }
                self.out.push('}');
            }
            LuaExpression::Function(function) => {
                self.out.push_str("function");
                self.function_tail(function);
            }
            LuaExpression::Binary { op, left, right } => {
                let prec = op.precedence();
                let needs_paren = prec < min_prec;
                if needs_paren {
                    self.out.push('(');
                }
                let (left_min, right_min) = if op.right_associative() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.expr(left, left_min);
                let _ = write!(self.out, " {} ", op.symbol());
                self.expr(right, right_min);
                if needs_paren {
                    self.out.push(')');
                }
            }
            LuaExpression::Unary { op, operand } => {
                let needs_paren = UNARY_PRECEDENCE < min_prec;
                if needs_paren {
                    self.out.push('(');
                }
                self.out.push_str(op.symbol());
                self.expr(operand, UNARY_PRECEDENCE);
                if needs_paren {
                    self.out.push(')');
                }
            }
            LuaExpression::Dot { base, name } => {
                self.prefix_expr(base);
                if is_valid_identifier(name) {
                    let _ = write!(self.out, ".{}", name);
                } else {
                    let _ = write!(self.out, "[\"{}\"]", escape_string(name));
                }
            }
            LuaExpression::Index { base, index } => {
                self.prefix_expr(base);
                self.out.push('[');
                self.expr(index, 0);
                self.out.push(']');
            }
            LuaExpression::Call { callee, args } => {
                self.prefix_expr(callee);
                self.out.push('(');
                self.expr_list(args);
                self.out.push(')');
            }
            LuaExpression::MethodCall { base, name, args } => {
                self.prefix_expr(base);
                let _ = write!(self.out, ":{}(", name);
                self.expr_list(args);
                self.out.push(')');
            }
            LuaExpression::Paren(inner) => {
                self.out.push('(');
                self.expr(inner, 0);
                self.out.push(')');
            }
        }
    }

    /// Base of a suffixed expression (call/index/dot). The Lua grammar only
    /// allows prefix expressions there, so anything else gets parenthesized.
    fn prefix_expr(&mut self, base: &LuaExpression) {
        let is_prefix = matches!(
            base,
            LuaExpression::Name(_)
                | LuaExpression::Dot { .. }
                | LuaExpression::Index { .. }
                | LuaExpression::Call { .. }
                | LuaExpression::MethodCall { .. }
                | LuaExpression::Paren(_)
        );
        if is_prefix {
            self.expr(base, 0);
        } else {
            self.out.push('(');
            self.expr(base, 0);
            self.out.push(')');
        }
    }
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\{}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lua::ast::LuaUnaryOp;

    fn binary(op: LuaBinaryOp, left: LuaExpression, right: LuaExpression) -> LuaExpression {
        LuaExpression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_statements_are_newline_terminated_and_indented() {
        let block = LuaBlock(vec![LuaStatement::While {
            condition: LuaExpression::True,
            body: LuaBlock(vec![LuaStatement::Break]),
        }]);
        assert_eq!(LuaWriter::render(&block), "while true do\n    break\nend\n");
    }

    #[test]
    fn test_local_with_and_without_values() {
        let block = LuaBlock(vec![
            LuaStatement::Local {
                names: vec!["a".into(), "b".into()],
                values: vec![],
            },
            LuaStatement::Local {
                names: vec!["x".into()],
                values: vec![LuaExpression::Int(3)],
            },
        ]);
        assert_eq!(LuaWriter::render(&block), "local a, b\nlocal x = 3\n");
    }

    #[test]
    fn test_precedence_minimal_parens() {
        // (a + b) * c needs parens; a + b * c does not
        let shaped = binary(
            LuaBinaryOp::Mul,
            binary(
                LuaBinaryOp::Add,
                LuaExpression::name("a"),
                LuaExpression::name("b"),
            ),
            LuaExpression::name("c"),
        );
        let block = LuaBlock(vec![LuaStatement::Return(vec![shaped])]);
        assert_eq!(LuaWriter::render(&block), "return (a + b) * c\n");

        let flat = binary(
            LuaBinaryOp::Add,
            LuaExpression::name("a"),
            binary(
                LuaBinaryOp::Mul,
                LuaExpression::name("b"),
                LuaExpression::name("c"),
            ),
        );
        let block = LuaBlock(vec![LuaStatement::Return(vec![flat])]);
        assert_eq!(LuaWriter::render(&block), "return a + b * c\n");
    }

    #[test]
    fn test_left_associative_right_child_parenthesized() {
        // a - (b - c)
        let expr = binary(
            LuaBinaryOp::Sub,
            LuaExpression::name("a"),
            binary(
                LuaBinaryOp::Sub,
                LuaExpression::name("b"),
                LuaExpression::name("c"),
            ),
        );
        let block = LuaBlock(vec![LuaStatement::Return(vec![expr])]);
        assert_eq!(LuaWriter::render(&block), "return a - (b - c)\n");
    }

    #[test]
    fn test_elseif_chain() {
        let inner = LuaIf {
            condition: LuaExpression::name("b"),
            then_body: LuaBlock(vec![LuaStatement::Break]),
            else_body: Some(LuaElse::Block(LuaBlock(vec![LuaStatement::Return(
                vec![],
            )]))),
        };
        let outer = LuaIf {
            condition: LuaExpression::name("a"),
            then_body: LuaBlock(vec![LuaStatement::Break]),
            else_body: Some(LuaElse::If(Box::new(inner))),
        };
        let block = LuaBlock(vec![LuaStatement::If(outer)]);
        assert_eq!(
            LuaWriter::render(&block),
            "if a then\n    break\nelseif b then\n    break\nelse\n    return\nend\n"
        );
    }

    #[test]
    fn test_keyword_member_uses_bracket_syntax() {
        let expr = LuaExpression::dot(LuaExpression::name("t"), "end");
        let block = LuaBlock(vec![LuaStatement::Return(vec![expr])]);
        assert_eq!(LuaWriter::render(&block), "return t[\"end\"]\n");
    }

    #[test]
    fn test_table_base_parenthesized() {
        let base = LuaExpression::Paren(Box::new(LuaExpression::Table(vec![
            TableField::Positional(LuaExpression::Int(1)),
        ])));
        let expr = LuaExpression::Index {
            base: Box::new(base),
            index: Box::new(LuaExpression::Int(1)),
        };
        let block = LuaBlock(vec![LuaStatement::Return(vec![expr])]);
        assert_eq!(LuaWriter::render(&block), "return ({1})[1]\n");
    }

    #[test]
    fn test_string_escaping() {
        let block = LuaBlock(vec![LuaStatement::Return(vec![LuaExpression::string(
            "a\"b\\c\nd",
        )])]);
        assert_eq!(LuaWriter::render(&block), "return \"a\\\"b\\\\c\\nd\"\n");
    }

    #[test]
    fn test_float_formatting_keeps_decimal_point() {
        let block = LuaBlock(vec![LuaStatement::Return(vec![
            LuaExpression::Number(2.0),
            LuaExpression::Number(2.5),
        ])]);
        assert_eq!(LuaWriter::render(&block), "return 2.0, 2.5\n");
    }

    #[test]
    fn test_unary_and_method_call() {
        let expr = LuaExpression::Unary {
            op: LuaUnaryOp::Len,
            operand: Box::new(LuaExpression::name("items")),
        };
        let call = LuaExpression::MethodCall {
            base: Box::new(LuaExpression::name("obj")),
            name: "greet".into(),
            args: vec![expr],
        };
        let block = LuaBlock(vec![LuaStatement::Call(call)]);
        assert_eq!(LuaWriter::render(&block), "obj:greet(#items)\n");
    }
}
