//! Abstract Syntax Tree handed over by the parser
//!
//! This module defines the untyped program: toplevel items, statements and
//! expressions. Type annotations and source positions are in separate
//! submodules. Every node derives `Serialize`/`Deserialize` so a parser
//! living outside this crate can pass the tree as RON or JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

mod span;
mod types;

pub use span::{Location, Span};
pub use types::{TableTypeField, Type};

/// A whole compilation unit
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Toplevel>,
    /// Byte ranges of type annotations, for the annotation-erasing emitter
    #[serde(default)]
    pub type_regions: Vec<Span>,
    /// Byte ranges of comments, for the annotation-erasing emitter
    #[serde(default)]
    pub comment_regions: Vec<Span>,
}

/// A declared name with an optional type annotation (`x: integer`)
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Decl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<Type>,
    #[serde(default)]
    pub loc: Location,
}

/// Name of a toplevel function declaration
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum FuncName {
    /// `local function f`
    Local(String),
    /// `function m.f`
    Field { module: String, field: String },
}

impl fmt::Display for FuncName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuncName::Local(name) => write!(f, "{name}"),
            FuncName::Field { module, field } => write!(f, "{module}.{field}"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: FuncName,
    pub params: Vec<Decl>,
    #[serde(default)]
    pub returns: Vec<Type>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Location,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Toplevel {
    /// `local a: T, b = e1, e2`
    Var {
        decls: Vec<Decl>,
        #[serde(default)]
        values: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
    Func(FuncDecl),
    /// `m.f = e`
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
    /// `record Point x: float y: float end`
    Record {
        name: String,
        fields: Vec<Decl>,
        #[serde(default)]
        loc: Location,
    },
    /// `typealias Name = T`
    Typealias {
        name: String,
        #[serde(rename = "type")]
        ty: Type,
        #[serde(default)]
        loc: Location,
    },
    Return {
        values: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
}

impl Toplevel {
    pub fn loc(&self) -> Location {
        match self {
            Toplevel::Func(func) => func.loc,
            Toplevel::Var { loc, .. }
            | Toplevel::Assign { loc, .. }
            | Toplevel::Record { loc, .. }
            | Toplevel::Typealias { loc, .. }
            | Toplevel::Return { loc, .. } => *loc,
        }
    }

    pub fn loc_mut(&mut self) -> &mut Location {
        match self {
            Toplevel::Func(func) => &mut func.loc,
            Toplevel::Var { loc, .. }
            | Toplevel::Assign { loc, .. }
            | Toplevel::Record { loc, .. }
            | Toplevel::Typealias { loc, .. }
            | Toplevel::Return { loc, .. } => loc,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `local a: T, b = e1, e2`
    Local {
        decls: Vec<Decl>,
        #[serde(default)]
        values: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
    Assign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
    /// A call evaluated for its effects; all results are discarded
    Call {
        call: Expr,
        #[serde(default)]
        loc: Location,
    },
    /// `do ... end`
    Do {
        body: Vec<Stmt>,
        #[serde(default)]
        loc: Location,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        #[serde(default)]
        loc: Location,
    },
    /// `repeat ... until cond`
    Repeat {
        body: Vec<Stmt>,
        condition: Expr,
        #[serde(default)]
        loc: Location,
    },
    If {
        condition: Expr,
        then_block: Vec<Stmt>,
        #[serde(default)]
        elseif_blocks: Vec<(Expr, Vec<Stmt>)>,
        #[serde(default)]
        else_block: Option<Vec<Stmt>>,
        #[serde(default)]
        loc: Location,
    },
    /// `for i = start, limit, step do ... end`
    ForNum {
        decl: Decl,
        start: Expr,
        limit: Expr,
        #[serde(default)]
        step: Option<Expr>,
        body: Vec<Stmt>,
        #[serde(default)]
        loc: Location,
    },
    /// `for k, v in e1, e2, e3 do ... end`
    ForIn {
        decls: Vec<Decl>,
        values: Vec<Expr>,
        body: Vec<Stmt>,
        #[serde(default)]
        loc: Location,
    },
    Return {
        values: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
    Break {
        #[serde(default)]
        loc: Location,
    },
}

impl Stmt {
    pub fn loc(&self) -> Location {
        match self {
            Stmt::Local { loc, .. }
            | Stmt::Assign { loc, .. }
            | Stmt::Call { loc, .. }
            | Stmt::Do { loc, .. }
            | Stmt::While { loc, .. }
            | Stmt::Repeat { loc, .. }
            | Stmt::If { loc, .. }
            | Stmt::ForNum { loc, .. }
            | Stmt::ForIn { loc, .. }
            | Stmt::Return { loc, .. }
            | Stmt::Break { loc } => *loc,
        }
    }
}

/// Entry of a `{ ... }` constructor
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum InitField {
    Positional(Expr),
    Named {
        name: String,
        value: Expr,
        #[serde(default)]
        loc: Location,
    },
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Expr {
    Nil {
        #[serde(default)]
        loc: Location,
    },
    Boolean {
        value: bool,
        #[serde(default)]
        loc: Location,
    },
    Integer {
        value: i64,
        #[serde(default)]
        loc: Location,
    },
    Float {
        value: f64,
        #[serde(default)]
        loc: Location,
    },
    String {
        value: String,
        #[serde(default)]
        loc: Location,
    },
    /// `{ 1, 2 }` or `{ x = 1 }`; its type comes from the context
    InitList {
        fields: Vec<InitField>,
        #[serde(default)]
        loc: Location,
    },
    Name {
        name: String,
        #[serde(default)]
        loc: Location,
    },
    /// `a[i]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        #[serde(default)]
        loc: Location,
    },
    /// `a.f`
    Field {
        object: Box<Expr>,
        field: String,
        #[serde(default)]
        loc: Location,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        #[serde(default)]
        loc: Location,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        #[serde(default)]
        loc: Location,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        #[serde(default)]
        loc: Location,
    },
    /// `e as T`
    Cast {
        expr: Box<Expr>,
        target: Type,
        #[serde(default)]
        loc: Location,
    },
    /// `(e)`, which truncates a call to its first result
    Paren {
        expr: Box<Expr>,
        #[serde(default)]
        loc: Location,
    },
}

impl Expr {
    pub fn loc(&self) -> Location {
        match self {
            Expr::Nil { loc }
            | Expr::Boolean { loc, .. }
            | Expr::Integer { loc, .. }
            | Expr::Float { loc, .. }
            | Expr::String { loc, .. }
            | Expr::InitList { loc, .. }
            | Expr::Name { loc, .. }
            | Expr::Index { loc, .. }
            | Expr::Field { loc, .. }
            | Expr::Call { loc, .. }
            | Expr::Unary { loc, .. }
            | Expr::Binary { loc, .. }
            | Expr::Cast { loc, .. }
            | Expr::Paren { loc, .. } => *loc,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call { .. })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `~`
    BitNot,
    Not,
    /// `#`
    Len,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "not",
            UnaryOp::Len => "#",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Concat => "..",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "~=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "~",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}
