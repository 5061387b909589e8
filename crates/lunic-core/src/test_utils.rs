//! AST builders for tests and benchmarks.
//!
//! Locations default to the origin; [`program`] numbers toplevel items by
//! position so diagnostics that cite a line have something to cite.

use crate::ast::*;

pub fn program(items: Vec<Toplevel>) -> Program {
    let mut items = items;
    for (i, item) in items.iter_mut().enumerate() {
        let loc = item.loc_mut();
        if loc.line == 0 {
            *loc = Location::new(i + 1, 1);
        }
        let loc = *loc;
        let decls = match item {
            Toplevel::Var { decls, .. } | Toplevel::Record { fields: decls, .. } => decls,
            Toplevel::Func(func) => &mut func.params,
            _ => continue,
        };
        for decl in decls.iter_mut().filter(|decl| decl.loc.line == 0) {
            decl.loc = loc;
        }
    }
    Program {
        items,
        ..Default::default()
    }
}

pub fn at(line: usize, col: usize) -> Location {
    Location::new(line, col)
}

// Expressions

pub fn nil() -> Expr {
    Expr::Nil {
        loc: Location::default(),
    }
}

pub fn boolean(value: bool) -> Expr {
    Expr::Boolean {
        value,
        loc: Location::default(),
    }
}

pub fn int(value: i64) -> Expr {
    Expr::Integer {
        value,
        loc: Location::default(),
    }
}

pub fn float(value: f64) -> Expr {
    Expr::Float {
        value,
        loc: Location::default(),
    }
}

pub fn string(value: &str) -> Expr {
    Expr::String {
        value: value.to_string(),
        loc: Location::default(),
    }
}

pub fn name(name: &str) -> Expr {
    Expr::Name {
        name: name.to_string(),
        loc: Location::default(),
    }
}

pub fn index(object: Expr, index: Expr) -> Expr {
    Expr::Index {
        object: Box::new(object),
        index: Box::new(index),
        loc: Location::default(),
    }
}

pub fn field(object: Expr, field: &str) -> Expr {
    Expr::Field {
        object: Box::new(object),
        field: field.to_string(),
        loc: Location::default(),
    }
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args,
        loc: Location::default(),
    }
}

pub fn unop(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
        loc: Location::default(),
    }
}

pub fn binop(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
        loc: Location::default(),
    }
}

pub fn cast(expr: Expr, target: Type) -> Expr {
    Expr::Cast {
        expr: Box::new(expr),
        target,
        loc: Location::default(),
    }
}

pub fn paren(expr: Expr) -> Expr {
    Expr::Paren {
        expr: Box::new(expr),
        loc: Location::default(),
    }
}

/// `{ e1, e2, ... }`
pub fn array_init(items: Vec<Expr>) -> Expr {
    Expr::InitList {
        fields: items.into_iter().map(InitField::Positional).collect(),
        loc: Location::default(),
    }
}

/// `{ a = e1, b = e2 }`
pub fn table_init(fields: Vec<(&str, Expr)>) -> Expr {
    Expr::InitList {
        fields: fields
            .into_iter()
            .map(|(name, value)| named(name, value))
            .collect(),
        loc: Location::default(),
    }
}

pub fn init_list(fields: Vec<InitField>) -> Expr {
    Expr::InitList {
        fields,
        loc: Location::default(),
    }
}

pub fn named(name: &str, value: Expr) -> InitField {
    InitField::Named {
        name: name.to_string(),
        value,
        loc: Location::default(),
    }
}

// Types

pub fn array_of(elem: Type) -> Type {
    Type::Array {
        elem: Box::new(elem),
        loc: Location::default(),
    }
}

pub fn table_of(fields: Vec<(&str, Type)>) -> Type {
    Type::Table {
        fields: fields
            .into_iter()
            .map(|(name, ty)| TableTypeField {
                name: name.to_string(),
                ty,
                loc: Location::default(),
            })
            .collect(),
        loc: Location::default(),
    }
}

pub fn fn_type(params: Vec<Type>, returns: Vec<Type>) -> Type {
    Type::Function {
        params,
        returns,
        loc: Location::default(),
    }
}

pub fn named_type(name: &str) -> Type {
    Type::Name {
        name: name.to_string(),
        loc: Location::default(),
    }
}

// Declarations and statements

pub fn decl(name: &str, ty: Option<Type>) -> Decl {
    Decl {
        name: name.to_string(),
        ty,
        loc: Location::default(),
    }
}

pub fn param(name: &str, ty: Type) -> Decl {
    decl(name, Some(ty))
}

pub fn local(decls: Vec<Decl>, values: Vec<Expr>) -> Stmt {
    Stmt::Local {
        decls,
        values,
        loc: Location::default(),
    }
}

pub fn assign(targets: Vec<Expr>, values: Vec<Expr>) -> Stmt {
    Stmt::Assign {
        targets,
        values,
        loc: Location::default(),
    }
}

pub fn call_stmt(call: Expr) -> Stmt {
    Stmt::Call {
        call,
        loc: Location::default(),
    }
}

pub fn do_block(body: Vec<Stmt>) -> Stmt {
    Stmt::Do {
        body,
        loc: Location::default(),
    }
}

pub fn while_stmt(condition: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While {
        condition,
        body,
        loc: Location::default(),
    }
}

pub fn repeat_stmt(body: Vec<Stmt>, condition: Expr) -> Stmt {
    Stmt::Repeat {
        body,
        condition,
        loc: Location::default(),
    }
}

pub fn if_stmt(
    condition: Expr,
    then_block: Vec<Stmt>,
    elseif_blocks: Vec<(Expr, Vec<Stmt>)>,
    else_block: Option<Vec<Stmt>>,
) -> Stmt {
    Stmt::If {
        condition,
        then_block,
        elseif_blocks,
        else_block,
        loc: Location::default(),
    }
}

pub fn for_num(decl: Decl, start: Expr, limit: Expr, step: Option<Expr>, body: Vec<Stmt>) -> Stmt {
    Stmt::ForNum {
        decl,
        start,
        limit,
        step,
        body,
        loc: Location::default(),
    }
}

pub fn for_in(decls: Vec<Decl>, values: Vec<Expr>, body: Vec<Stmt>) -> Stmt {
    Stmt::ForIn {
        decls,
        values,
        body,
        loc: Location::default(),
    }
}

pub fn ret(values: Vec<Expr>) -> Stmt {
    Stmt::Return {
        values,
        loc: Location::default(),
    }
}

pub fn break_stmt() -> Stmt {
    Stmt::Break {
        loc: Location::default(),
    }
}

// Toplevel items

/// `local m: module = {}`
pub fn module_decl(name: &str) -> Toplevel {
    Toplevel::Var {
        decls: vec![decl(name, Some(Type::Module))],
        values: vec![array_init(vec![])],
        loc: Location::default(),
    }
}

/// `return m`
pub fn return_module(name: &str) -> Toplevel {
    Toplevel::Return {
        values: vec![self::name(name)],
        loc: Location::default(),
    }
}

pub fn local_var(decls: Vec<Decl>, values: Vec<Expr>) -> Toplevel {
    Toplevel::Var {
        decls,
        values,
        loc: Location::default(),
    }
}

/// `function m.f(...)`
pub fn module_func(
    module: &str,
    field: &str,
    params: Vec<Decl>,
    returns: Vec<Type>,
    body: Vec<Stmt>,
) -> Toplevel {
    Toplevel::Func(FuncDecl {
        name: FuncName::Field {
            module: module.to_string(),
            field: field.to_string(),
        },
        params,
        returns,
        body,
        loc: Location::default(),
    })
}

/// `local function f(...)`
pub fn local_func(name: &str, params: Vec<Decl>, returns: Vec<Type>, body: Vec<Stmt>) -> Toplevel {
    Toplevel::Func(FuncDecl {
        name: FuncName::Local(name.to_string()),
        params,
        returns,
        body,
        loc: Location::default(),
    })
}

pub fn toplevel_assign(targets: Vec<Expr>, values: Vec<Expr>) -> Toplevel {
    Toplevel::Assign {
        targets,
        values,
        loc: Location::default(),
    }
}

pub fn record(name: &str, fields: Vec<(&str, Type)>) -> Toplevel {
    Toplevel::Record {
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(field, ty)| decl(field, Some(ty)))
            .collect(),
        loc: Location::default(),
    }
}

pub fn typealias(name: &str, ty: Type) -> Toplevel {
    Toplevel::Typealias {
        name: name.to_string(),
        ty,
        loc: Location::default(),
    }
}

/// Module wrapper: `local m: module = {}`, the given items, `return m`.
pub fn in_module(items: Vec<Toplevel>) -> Program {
    let mut all = vec![module_decl("m")];
    all.extend(items);
    all.push(return_module("m"));
    program(all)
}
