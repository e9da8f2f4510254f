//! SMD abstract syntax tree.
//!
//! Every node carries the [`Span`] of the token it originates from. The tree
//! serializes to JSON with a `type` tag on each statement and expression.

use dasm_ir::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    FunctionDeclaration(FunctionDeclaration),
    VariableDeclaration(VariableDeclaration),
    UniformDeclaration(UniformDeclaration),
    FormattingDirective(FormattingDirective),
    DrawCall(DrawCall),
    ReturnStatement(ReturnStatement),
    ExpressionStatement(ExpressionStatement),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::FunctionDeclaration(s) => s.span,
            Statement::VariableDeclaration(s) => s.span,
            Statement::UniformDeclaration(s) => s.span,
            Statement::FormattingDirective(s) => s.span,
            Statement::DrawCall(s) => s.span,
            Statement::ReturnStatement(s) => s.span,
            Statement::ExpressionStatement(s) => s.span,
        }
    }
}

/// Base of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Float,
    Int,
    Vec2,
    Vec3,
    /// Template specifier; only valid inside function templates.
    Any,
}

impl BaseType {
    pub fn parse(word: &str) -> Option<BaseType> {
        match word.to_ascii_lowercase().as_str() {
            "float" => Some(BaseType::Float),
            "int" => Some(BaseType::Int),
            "vec2" => Some(BaseType::Vec2),
            "vec3" => Some(BaseType::Vec3),
            "any" => Some(BaseType::Any),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Vec2 => "vec2",
            BaseType::Vec3 => "vec3",
            BaseType::Any => "any",
        }
    }

    pub fn is_template(self) -> bool {
        self == BaseType::Any
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeSpec {
    pub base: BaseType,
    pub is_list: bool,
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_list {
            write!(f, "{}[]", self.base.name())
        } else {
            f.write_str(self.base.name())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub ty: TypeSpec,
    pub name: String,
    pub span: Span,
}

/// `{ statement* }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub return_type: TypeSpec,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDeclaration {
    pub ty: TypeSpec,
    pub name: String,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformDeclaration {
    pub ty: TypeSpec,
    pub name: String,
    pub value: Option<Expr>,
    pub span: Span,
}

/// `$name: value;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattingDirective {
    pub name: String,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawCommand {
    Triangle,
    Polygon,
}

impl DrawCommand {
    pub fn parse(word: &str) -> Option<DrawCommand> {
        match word.to_ascii_lowercase().as_str() {
            "triangle" => Some(DrawCommand::Triangle),
            "polygon" => Some(DrawCommand::Polygon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCall {
    pub command: DrawCommand,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStatement {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStatement {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The name of a non-numeric identifier, if that is what this is.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier {
                name,
                is_number: false,
            } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    FunctionCall {
        name: String,
        arguments: Vec<Expr>,
    },
    /// Numbers are identifiers whose text starts with a digit.
    Identifier {
        name: String,
        is_number: bool,
    },
    MemberAccess {
        object: Box<Expr>,
        property: String,
    },
    IndexAccess {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    VectorLiteral {
        elements: Vec<Expr>,
    },
    ListLiteral {
        elements: Vec<Expr>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    /// List comprehension.
    For {
        iterators: Vec<ForIterator>,
        body: Block,
    },
    Piecewise {
        cases: Vec<PiecewiseCase>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForIterator {
    pub variable: String,
    pub range: Expr,
}

/// `test: consequent`, or the default case when `test` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiecewiseCase {
    pub test: Option<Expr>,
    pub consequent: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "|")]
    Or,
    #[serde(rename = "^")]
    Xor,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "!")]
    Ne,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Ne => "!",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "!")]
    Not,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
