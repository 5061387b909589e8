//! Type-annotated program produced by a successful check.
//!
//! Names are resolved to what they refer to (local, toplevel, module field,
//! builtin), every expression carries its type, and the conversions the
//! checker decided on are explicit nodes: `ToFloat` for integer operands of
//! float arithmetic and implicit `Cast`s to and from `any`.

use serde::Serialize;

use crate::ast::{BinaryOp, Location, UnaryOp};
use crate::typecheck::TcType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedProgram {
    pub items: Vec<TypedToplevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedDecl {
    pub name: String,
    pub ty: TcType,
    pub loc: Location,
    /// The bound value is narrowed to or widened from `any` at runtime
    pub implicit_cast: bool,
}

impl TypedDecl {
    pub fn new(name: impl Into<String>, ty: TcType, loc: Location) -> Self {
        TypedDecl {
            name: name.into(),
            ty,
            loc,
            implicit_cast: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedFuncName {
    Local(String),
    ModuleField { module: String, field: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedFunction {
    pub name: TypedFuncName,
    pub params: Vec<TypedDecl>,
    /// Always a `TcType::Function`
    pub ty: TcType,
    pub body: Vec<TypedStmt>,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedToplevel {
    Var {
        decls: Vec<TypedDecl>,
        values: Vec<TypedExpr>,
        loc: Location,
    },
    Func(TypedFunction),
    Assign {
        targets: Vec<TypedLValue>,
        values: Vec<TypedExpr>,
        loc: Location,
    },
    Record {
        name: String,
        ty: TcType,
        loc: Location,
    },
    Return {
        value: TypedExpr,
        loc: Location,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedLValue {
    Local {
        name: String,
        ty: TcType,
    },
    Toplevel {
        name: String,
        ty: TcType,
    },
    ModuleField {
        module: String,
        field: String,
        ty: TcType,
    },
    Index {
        array: TypedExpr,
        index: TypedExpr,
        ty: TcType,
    },
    Field {
        object: TypedExpr,
        field: String,
        ty: TcType,
    },
}

impl TypedLValue {
    pub fn ty(&self) -> &TcType {
        match self {
            TypedLValue::Local { ty, .. }
            | TypedLValue::Toplevel { ty, .. }
            | TypedLValue::ModuleField { ty, .. }
            | TypedLValue::Index { ty, .. }
            | TypedLValue::Field { ty, .. } => ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedForIn {
    /// `for i, x in ipairs(arr)`
    Ipairs { array: TypedExpr },
    /// Iterator, state and control values after multi-value expansion
    Generic { values: Vec<TypedExpr> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedStmt {
    Local {
        decls: Vec<TypedDecl>,
        values: Vec<TypedExpr>,
        loc: Location,
    },
    Assign {
        targets: Vec<TypedLValue>,
        values: Vec<TypedExpr>,
        loc: Location,
    },
    Call {
        call: TypedExpr,
        loc: Location,
    },
    Do {
        body: Vec<TypedStmt>,
        loc: Location,
    },
    While {
        condition: TypedExpr,
        body: Vec<TypedStmt>,
        loc: Location,
    },
    Repeat {
        body: Vec<TypedStmt>,
        condition: TypedExpr,
        loc: Location,
    },
    /// `elseif` chains are nested in `else_block`
    If {
        condition: TypedExpr,
        then_block: Vec<TypedStmt>,
        else_block: Vec<TypedStmt>,
        loc: Location,
    },
    ForNum {
        decl: TypedDecl,
        start: TypedExpr,
        limit: TypedExpr,
        step: TypedExpr,
        body: Vec<TypedStmt>,
        loc: Location,
    },
    ForIn {
        decls: Vec<TypedDecl>,
        iterator: TypedForIn,
        body: Vec<TypedStmt>,
        loc: Location,
    },
    Return {
        values: Vec<TypedExpr>,
        loc: Location,
    },
    Break {
        loc: Location,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    /// Type of the (first) value
    pub ty: TcType,
    pub loc: Location,
}

impl TypedExpr {
    pub fn new(kind: TypedExprKind, ty: TcType, loc: Location) -> Self {
        TypedExpr { kind, ty, loc }
    }

    /// Types of all values the expression produces.
    ///
    /// Calls may produce any number of values; everything else produces
    /// exactly one.
    pub fn value_types(&self) -> Vec<TcType> {
        match &self.kind {
            TypedExprKind::Call { returns, .. } => returns.clone(),
            TypedExprKind::Expand { values, .. } => values.iter().map(|v| v.ty.clone()).collect(),
            _ => vec![self.ty.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedExprKind {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    ArrayInit(Vec<TypedExpr>),
    /// Table and record constructors, fields in source order
    TableInit(Vec<(String, TypedExpr)>),
    /// Initializer of the module variable
    ModuleInit,
    Local(String),
    Toplevel(String),
    ModuleField {
        module: String,
        field: String,
    },
    Builtin(String),
    LibraryField {
        library: String,
        field: String,
    },
    Index {
        array: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },
    Field {
        object: Box<TypedExpr>,
        field: String,
    },
    Call {
        callee: Box<TypedExpr>,
        args: Vec<TypedExpr>,
        returns: Vec<TcType>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    /// `implicit` casts were inserted by the checker at `any` boundaries
    Cast {
        expr: Box<TypedExpr>,
        implicit: bool,
    },
    ToFloat(Box<TypedExpr>),
    Paren(Box<TypedExpr>),
    /// A trailing call spread over several value positions. `values[j]` is
    /// the j-th result, possibly wrapped in an implicit `Cast`.
    Expand {
        call: Box<TypedExpr>,
        values: Vec<TypedExpr>,
    },
    /// The j-th result of the enclosing `Expand`'s call
    CallResult(usize),
}
