// AST (Abstract Syntax Tree) definitions for the routine interpreter

use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Comparison
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    // Logical (short-circuit)
    And,
    Or,
    Nullish,
}

impl BinOp {
    /// The operator as written in source, used in error messages
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::In => "in",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Nullish => "??",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    TypeOf,  // typeof x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
}

/// Declaration keyword of a variable binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

/// Function parameter, optionally with a default value expression
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Box<AstNode>>,
}

/// A declared function. Shared via `Rc` so function values stay cheap to copy.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<AstNode>,
    pub location: SourceLocation,
}

/// One `name = init` entry of a `let`/`const`/`var` statement
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Box<AstNode>>,
}

/// AST nodes representing statements and expressions
#[derive(Debug, Clone)]
pub enum AstNode {
    // Declarations
    FunctionDecl(Rc<FunctionDef>),
    VarDecl {
        kind: DeclKind,
        declarations: Vec<Declarator>,
        location: SourceLocation,
    },

    // Statements
    Return {
        expr: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
        location: SourceLocation,
    },
    While {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    DoWhile {
        body: Vec<AstNode>,
        condition: Box<AstNode>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        increment: Option<Box<AstNode>>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    ForOf {
        kind: DeclKind,
        name: String,
        iterable: Box<AstNode>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Block {
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },

    // Expressions
    NumberLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    Null {
        location: SourceLocation,
    },
    Undefined {
        location: SourceLocation,
    },
    Variable(String, SourceLocation),
    ArrayLiteral {
        elements: Vec<AstNode>,
        location: SourceLocation,
    },
    ObjectLiteral {
        properties: Vec<(String, AstNode)>,
        location: SourceLocation,
    },
    Spread {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    Assignment {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    CompoundAssignment {
        lhs: Box<AstNode>,
        op: BinOp,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    TernaryOp {
        condition: Box<AstNode>,
        true_expr: Box<AstNode>,
        false_expr: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionCall {
        name: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    MethodCall {
        object: Box<AstNode>,
        method: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    New {
        constructor: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    MemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    IndexAccess {
        object: Box<AstNode>,
        index: Box<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::FunctionDecl(def) => def.location,
            AstNode::VarDecl { location, .. }
            | AstNode::Return { location, .. }
            | AstNode::If { location, .. }
            | AstNode::While { location, .. }
            | AstNode::DoWhile { location, .. }
            | AstNode::For { location, .. }
            | AstNode::ForOf { location, .. }
            | AstNode::Break { location }
            | AstNode::Continue { location }
            | AstNode::Block { location, .. }
            | AstNode::ExpressionStatement { location, .. }
            | AstNode::Null { location }
            | AstNode::Undefined { location }
            | AstNode::ArrayLiteral { location, .. }
            | AstNode::ObjectLiteral { location, .. }
            | AstNode::Spread { location, .. }
            | AstNode::Assignment { location, .. }
            | AstNode::CompoundAssignment { location, .. }
            | AstNode::BinaryOp { location, .. }
            | AstNode::UnaryOp { location, .. }
            | AstNode::TernaryOp { location, .. }
            | AstNode::FunctionCall { location, .. }
            | AstNode::MethodCall { location, .. }
            | AstNode::New { location, .. }
            | AstNode::MemberAccess { location, .. }
            | AstNode::IndexAccess { location, .. } => *location,
            AstNode::NumberLiteral(_, loc)
            | AstNode::StringLiteral(_, loc)
            | AstNode::BoolLiteral(_, loc)
            | AstNode::Variable(_, loc) => *loc,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub nodes: Vec<AstNode>, // Top-level statements in source order
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// Find a top-level function declaration by name
    pub fn function(&self, name: &str) -> Option<&Rc<FunctionDef>> {
        self.nodes.iter().find_map(|node| match node {
            AstNode::FunctionDecl(def) if def.name == name => Some(def),
            _ => None,
        })
    }
}
