//! Expression AST nodes.
//!
//! Every variant carries its resolved static type; `Expression::ty()` is the
//! uniform accessor the lowering core relies on.

use super::{Identifier, Parameter};
use crate::frontend::interner::Symbol;
use crate::frontend::oracle::TypeId;
use crate::frontend::span::Span;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Integer literal: 42
    IntLiteral(IntLiteral),

    /// Float literal: 3.14
    FloatLiteral(FloatLiteral),

    /// String literal: "hello"
    StringLiteral(StringLiteral),

    /// Boolean literal: true, false
    BooleanLiteral(BooleanLiteral),

    /// Null literal (lowers to nil)
    NullLiteral(NullLiteral),

    /// Identifier reference
    Identifier(Identifier),

    /// Array literal: [1, 2, 3]
    Array(ArrayExpression),

    /// Object literal: { x: 1 }
    Object(ObjectExpression),

    /// Unary expression: -x, !x
    Unary(UnaryExpression),

    /// Binary expression: a + b, a < b
    Binary(BinaryExpression),

    /// Short-circuit expression: a && b, a || b
    Logical(LogicalExpression),

    /// Assignment in expression position: x = v, x += v
    Assignment(AssignmentExpression),

    /// Ternary: c ? a : b
    Conditional(ConditionalExpression),

    /// Function call: f(a, b)
    Call(CallExpression),

    /// Construction: new C(a)
    New(NewExpression),

    /// Property access: obj.prop
    Member(MemberExpression),

    /// Element access: arr[i]
    Index(IndexExpression),

    /// Function or arrow expression
    Function(FunctionExpression),

    /// Await expression: await task
    Await(AwaitExpression),

    /// Yield expression inside a generator: yield v
    Yield(YieldExpression),

    /// The receiver: this
    This(ThisExpression),

    /// The superclass binding (only valid as a member-access base)
    Super(SuperExpression),
}

impl Expression {
    /// Resolved static type of this expression
    pub fn ty(&self) -> TypeId {
        match self {
            Expression::IntLiteral(e) => e.ty,
            Expression::FloatLiteral(e) => e.ty,
            Expression::StringLiteral(e) => e.ty,
            Expression::BooleanLiteral(e) => e.ty,
            Expression::NullLiteral(e) => e.ty,
            Expression::Identifier(e) => e.ty,
            Expression::Array(e) => e.ty,
            Expression::Object(e) => e.ty,
            Expression::Unary(e) => e.ty,
            Expression::Binary(e) => e.ty,
            Expression::Logical(e) => e.ty,
            Expression::Assignment(e) => e.ty,
            Expression::Conditional(e) => e.ty,
            Expression::Call(e) => e.ty,
            Expression::New(e) => e.ty,
            Expression::Member(e) => e.ty,
            Expression::Index(e) => e.ty,
            Expression::Function(e) => e.ty,
            Expression::Await(e) => e.ty,
            Expression::Yield(e) => e.ty,
            Expression::This(e) => e.ty,
            Expression::Super(e) => e.ty,
        }
    }

    /// Source location of this expression
    pub fn span(&self) -> Span {
        match self {
            Expression::IntLiteral(e) => e.span,
            Expression::FloatLiteral(e) => e.span,
            Expression::StringLiteral(e) => e.span,
            Expression::BooleanLiteral(e) => e.span,
            Expression::NullLiteral(e) => e.span,
            Expression::Identifier(e) => e.span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Logical(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::New(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Index(e) => e.span,
            Expression::Function(e) => e.span,
            Expression::Await(e) => e.span,
            Expression::Yield(e) => e.span,
            Expression::This(e) => e.span,
            Expression::Super(e) => e.span,
        }
    }

    /// True for literal-constructor expressions
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::IntLiteral(_)
                | Expression::FloatLiteral(_)
                | Expression::StringLiteral(_)
                | Expression::BooleanLiteral(_)
                | Expression::NullLiteral(_)
                | Expression::Array(_)
                | Expression::Object(_)
        )
    }
}

// ============================================================================
// Literals
// ============================================================================

/// Integer literal
#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i64,
    pub ty: TypeId,
    pub span: Span,
}

/// Float literal
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub ty: TypeId,
    pub span: Span,
}

/// String literal
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: Symbol,
    pub ty: TypeId,
    pub span: Span,
}

/// Boolean literal
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub ty: TypeId,
    pub span: Span,
}

/// Null literal
#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteral {
    pub ty: TypeId,
    pub span: Span,
}

// ============================================================================
// Constructors
// ============================================================================

/// Array literal
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Object literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectProperty>,
    pub ty: TypeId,
    pub span: Span,
}

/// One `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub key: Symbol,
    pub value: Expression,
    pub span: Span,
}

// ============================================================================
// Operators
// ============================================================================

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation
    Neg,
    /// Logical not
    Not,
}

/// Unary expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Binary operator (non-short-circuit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+` — numeric addition, or concatenation when the result type is string
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

/// Binary expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub op: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Short-circuit operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Short-circuit expression
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub op: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Assignment operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Sub,
}

/// Assignment usable in expression position.
///
/// The target is restricted to identifiers and member/index accesses;
/// destructuring targets never reach lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    pub op: AssignmentOperator,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Ternary conditional
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub condition: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

// ============================================================================
// Calls and access
// ============================================================================

/// Function or method call
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    /// Resolved result type; a tuple type here marks a multi-value call
    pub ty: TypeId,
    pub span: Span,
}

/// Class construction
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    pub callee: Identifier,
    pub arguments: Vec<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Property access `object.property`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Symbol,
    pub ty: TypeId,
    pub span: Span,
}

/// Element access `object[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

// ============================================================================
// Functions
// ============================================================================

/// Body of a function expression: block, or the arrow shorthand
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    /// `{ ... }`
    Block(super::Block),
    /// `=> expr` — lowered as an implicit return
    Expression(Box<Expression>),
}

/// Function or arrow expression
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
    /// Present for named function expressions
    pub name: Option<Identifier>,
    pub params: Vec<Parameter>,
    pub body: FunctionBody,
    pub is_async: bool,
    pub is_generator: bool,
    /// Declared return type
    pub return_ty: TypeId,
    pub ty: TypeId,
    pub span: Span,
}

/// Await expression
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpression {
    pub operand: Box<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Yield expression
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    pub argument: Option<Box<Expression>>,
    pub ty: TypeId,
    pub span: Span,
}

/// `this`
#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpression {
    pub ty: TypeId,
    pub span: Span,
}

/// `super`
#[derive(Debug, Clone, PartialEq)]
pub struct SuperExpression {
    pub ty: TypeId,
    pub span: Span,
}
