//! Statement AST nodes.

use super::{Expression, Identifier, Parameter};
use crate::frontend::interner::Symbol;
use crate::frontend::oracle::{EnumValue, TypeId};
use crate::frontend::span::Span;

/// Statement (no value)
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// let / const declaration
    VariableDecl(VariableDecl),

    /// Expression evaluated for effect
    Expression(ExpressionStatement),

    /// return, with optional value
    Return(ReturnStatement),

    /// if / else if / else
    If(IfStatement),

    /// while loop
    While(WhileStatement),

    /// Explicit block scope
    Block(Block),

    /// break out of the nearest loop
    Break(BreakStatement),

    /// Named function declaration
    FunctionDecl(FunctionDecl),

    /// Class declaration
    ClassDecl(ClassDecl),

    /// Enum declaration (const enums are erased at lowering)
    EnumDecl(EnumDecl),

    /// Exported declaration
    Export(ExportDecl),
}

impl Statement {
    /// Source location of this statement
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDecl(s) => s.span,
            Statement::Expression(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::If(s) => s.span,
            Statement::While(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::Break(s) => s.span,
            Statement::FunctionDecl(s) => s.span,
            Statement::ClassDecl(s) => s.span,
            Statement::EnumDecl(s) => s.span,
            Statement::Export(s) => s.span,
        }
    }
}

/// A sequence of statements in its own scope
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    /// Create a block
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }
}

/// let / const declaration of a single name
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: Identifier,
    /// true for `let`, false for `const`
    pub mutable: bool,
    pub init: Option<Expression>,
    pub span: Span,
}

/// Expression statement
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

/// return statement
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// if statement
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub consequent: Block,
    pub alternate: Option<ElseClause>,
    pub span: Span,
}

/// else branch: a block, or a chained else-if
#[derive(Debug, Clone, PartialEq)]
pub enum ElseClause {
    Block(Block),
    If(Box<IfStatement>),
}

/// while statement
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

/// break statement
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub span: Span,
}

/// Named function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub body: Block,
    pub is_async: bool,
    pub is_generator: bool,
    /// Declared return type
    pub return_ty: TypeId,
    pub span: Span,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Identifier,
    pub superclass: Option<Identifier>,
    /// Resolved instance type, used to recognize declared receiver parameters
    pub instance_ty: TypeId,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

/// One member of a class body
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Constructor(ConstructorMember),
    Method(MethodMember),
    Accessor(AccessorMember),
    Field(FieldMember),
}

/// Class constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorMember {
    pub params: Vec<Parameter>,
    pub body: Block,
    pub span: Span,
}

/// Instance or static method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMember {
    pub name: Symbol,
    pub params: Vec<Parameter>,
    pub body: Block,
    pub is_static: bool,
    pub is_async: bool,
    pub is_generator: bool,
    /// Declared return type
    pub return_ty: TypeId,
    pub span: Span,
}

/// Getter or setter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// Getter/setter accessor
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorMember {
    pub name: Symbol,
    pub kind: AccessorKind,
    /// Getter: at most a receiver; setter: receiver plus the value parameter
    pub params: Vec<Parameter>,
    pub body: Block,
    pub span: Span,
}

/// Instance or static field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMember {
    pub name: Symbol,
    pub is_static: bool,
    pub initializer: Option<Expression>,
    pub ty: TypeId,
    pub span: Span,
}

/// Enum declaration with resolved member values
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Identifier,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

/// One enum member with its constant value
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: Symbol,
    pub value: EnumValue,
    pub span: Span,
}

/// Exported declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDecl {
    pub declaration: Box<Statement>,
    pub span: Span,
}
