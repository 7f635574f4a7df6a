//! Lua statement and expression tree.
//!
//! This is the "target fragment" representation: a pure expression is safe to
//! inline anywhere; anything with observable effects is carried as statements
//! that the lowering context splices in ahead of the expression that needs
//! their result.

/// A sequence of Lua statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LuaBlock(pub Vec<LuaStatement>);

impl LuaBlock {
    /// An empty block
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement
    pub fn push(&mut self, stmt: LuaStatement) {
        self.0.push(stmt);
    }

    /// True if the block has no statements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<LuaStatement>> for LuaBlock {
    fn from(statements: Vec<LuaStatement>) -> Self {
        Self(statements)
    }
}

/// Lua statement
#[derive(Debug, Clone, PartialEq)]
pub enum LuaStatement {
    /// `local a, b = x, y` (or a bare `local a, b`)
    Local {
        names: Vec<String>,
        values: Vec<LuaExpression>,
    },

    /// `local function name(...) ... end`
    LocalFunction { name: String, function: LuaFunction },

    /// `a, b = x, y`
    Assign {
        targets: Vec<LuaExpression>,
        values: Vec<LuaExpression>,
    },

    /// A call evaluated for effect (the only expression statement Lua has)
    Call(LuaExpression),

    /// `do ... end`
    Do(LuaBlock),

    /// `if ... then ... [elseif ...] [else ...] end`
    If(LuaIf),

    /// `while cond do ... end`
    While {
        condition: LuaExpression,
        body: LuaBlock,
    },

    /// `return a, b` — multi-value returns are a comma-separated list
    Return(Vec<LuaExpression>),

    /// `break`
    Break,
}

/// An if statement; chained else-ifs render as `elseif`
#[derive(Debug, Clone, PartialEq)]
pub struct LuaIf {
    pub condition: LuaExpression,
    pub then_body: LuaBlock,
    pub else_body: Option<LuaElse>,
}

/// else branch of an if statement
#[derive(Debug, Clone, PartialEq)]
pub enum LuaElse {
    Block(LuaBlock),
    If(Box<LuaIf>),
}

/// A function literal
#[derive(Debug, Clone, PartialEq)]
pub struct LuaFunction {
    pub params: Vec<String>,
    /// Adds `...` after the named parameters
    pub is_vararg: bool,
    pub body: LuaBlock,
}

/// Lua binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaBinaryOp {
    Or,
    And,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    NotEq,
    Eq,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl LuaBinaryOp {
    /// Operator text
    pub fn symbol(self) -> &'static str {
        match self {
            LuaBinaryOp::Or => "or",
            LuaBinaryOp::And => "and",
            LuaBinaryOp::Less => "<",
            LuaBinaryOp::Greater => ">",
            LuaBinaryOp::LessEq => "<=",
            LuaBinaryOp::GreaterEq => ">=",
            LuaBinaryOp::NotEq => "~=",
            LuaBinaryOp::Eq => "==",
            LuaBinaryOp::Concat => "..",
            LuaBinaryOp::Add => "+",
            LuaBinaryOp::Sub => "-",
            LuaBinaryOp::Mul => "*",
            LuaBinaryOp::Div => "/",
            LuaBinaryOp::Mod => "%",
        }
    }

    /// Binding strength (higher binds tighter), per the Lua grammar
    pub fn precedence(self) -> u8 {
        match self {
            LuaBinaryOp::Or => 1,
            LuaBinaryOp::And => 2,
            LuaBinaryOp::Less
            | LuaBinaryOp::Greater
            | LuaBinaryOp::LessEq
            | LuaBinaryOp::GreaterEq
            | LuaBinaryOp::NotEq
            | LuaBinaryOp::Eq => 3,
            LuaBinaryOp::Concat => 4,
            LuaBinaryOp::Add | LuaBinaryOp::Sub => 5,
            LuaBinaryOp::Mul | LuaBinaryOp::Div | LuaBinaryOp::Mod => 6,
        }
    }

    /// Concatenation is the one right-associative operator we emit
    pub fn right_associative(self) -> bool {
        matches!(self, LuaBinaryOp::Concat)
    }
}

/// Lua unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaUnaryOp {
    /// `not`
    Not,
    /// `-`
    Neg,
    /// `#` (length)
    Len,
}

impl LuaUnaryOp {
    /// Operator text (`not` carries its own trailing space)
    pub fn symbol(self) -> &'static str {
        match self {
            LuaUnaryOp::Not => "not ",
            LuaUnaryOp::Neg => "-",
            LuaUnaryOp::Len => "#",
        }
    }
}

/// Unary operators bind tighter than any binary operator
pub const UNARY_PRECEDENCE: u8 = 7;

/// One field of a table constructor
#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    /// `value` (sequential slot)
    Positional(LuaExpression),
    /// `name = value`
    Named { name: String, value: LuaExpression },
}

/// Lua expression
#[derive(Debug, Clone, PartialEq)]
pub enum LuaExpression {
    Nil,
    True,
    False,
    Int(i64),
    Number(f64),
    Str(String),
    /// `...`
    Vararg,
    Name(String),
    Table(Vec<TableField>),
    Function(LuaFunction),
    Binary {
        op: LuaBinaryOp,
        left: Box<LuaExpression>,
        right: Box<LuaExpression>,
    },
    Unary {
        op: LuaUnaryOp,
        operand: Box<LuaExpression>,
    },
    /// `base.name` (falls back to `base["name"]` for non-identifier names)
    Dot {
        base: Box<LuaExpression>,
        name: String,
    },
    /// `base[index]`
    Index {
        base: Box<LuaExpression>,
        index: Box<LuaExpression>,
    },
    /// `callee(args)`
    Call {
        callee: Box<LuaExpression>,
        args: Vec<LuaExpression>,
    },
    /// `base:name(args)`
    MethodCall {
        base: Box<LuaExpression>,
        name: String,
        args: Vec<LuaExpression>,
    },
    /// Explicit parentheses. Required around call results to truncate them to
    /// one value, and around table constructors used as an access base.
    Paren(Box<LuaExpression>),
}

impl LuaExpression {
    /// Shorthand for a name reference
    pub fn name(s: impl Into<String>) -> Self {
        LuaExpression::Name(s.into())
    }

    /// Shorthand for a string literal
    pub fn string(s: impl Into<String>) -> Self {
        LuaExpression::Str(s.into())
    }

    /// Shorthand for `callee(args)` with a named callee
    pub fn call_named(callee: &str, args: Vec<LuaExpression>) -> Self {
        LuaExpression::Call {
            callee: Box::new(LuaExpression::name(callee)),
            args,
        }
    }

    /// Shorthand for `base.name`
    pub fn dot(base: LuaExpression, name: impl Into<String>) -> Self {
        LuaExpression::Dot {
            base: Box::new(base),
            name: name.into(),
        }
    }

    /// True for fragments with no evaluation effects that are safe to
    /// duplicate or reorder: names and scalar literals. Calls, accesses and
    /// constructors are not (accesses can hit metamethods, constructors
    /// allocate).
    pub fn is_trivial(&self) -> bool {
        match self {
            LuaExpression::Nil
            | LuaExpression::True
            | LuaExpression::False
            | LuaExpression::Int(_)
            | LuaExpression::Number(_)
            | LuaExpression::Str(_)
            | LuaExpression::Name(_) => true,
            LuaExpression::Paren(inner) => inner.is_trivial(),
            _ => false,
        }
    }

    /// True if the value is statically known to be neither `nil` nor `false`,
    /// which makes the `cond and a or b` idiom sound with this as `a`
    pub fn is_always_truthy(&self) -> bool {
        matches!(
            self,
            LuaExpression::True
                | LuaExpression::Int(_)
                | LuaExpression::Number(_)
                | LuaExpression::Str(_)
                | LuaExpression::Table(_)
                | LuaExpression::Function(_)
        )
    }
}
