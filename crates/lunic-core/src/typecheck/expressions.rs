//! Expression type checking.

use crate::ast::{Expr, InitField, Location, Type};
use crate::typed_ast::{TypedExpr, TypedExprKind};

use super::environment::{Resolved, TypeEnv};
use super::errors::{Site, TypeError};
use super::types::{TcType, VarKind};

/// Values produced by an expression list after multi-value expansion.
#[derive(Debug, Default)]
pub struct ValueList {
    pub values: Vec<TypedExpr>,
    /// One entry per produced value
    pub types: Vec<TcType>,
    /// Set when the value count is unreliable because an error was already
    /// reported for the expanded call.
    pub unknown_arity: bool,
}

impl ValueList {
    pub fn count(&self) -> usize {
        self.types.len()
    }

    /// Whether the value count should be compared against the expected one.
    pub fn arity_mismatch(&self, expected: usize) -> bool {
        !self.unknown_arity && self.types.len() != expected
    }
}

impl<'a> TypeEnv<'a> {
    /// Check an expression that must produce exactly one value.
    pub fn check_expr(&mut self, expr: &Expr) -> TypedExpr {
        let typed = self.check_multi_expr(expr);
        if let TypedExprKind::Call { returns, .. } = &typed.kind
            && returns.is_empty()
        {
            self.error(TypeError::VoidValue, typed.loc);
            return TypedExpr::new(typed.kind, TcType::Unknown, typed.loc);
        }
        typed
    }

    /// Check an expression, keeping every result of a call.
    pub fn check_multi_expr(&mut self, expr: &Expr) -> TypedExpr {
        match expr {
            Expr::Nil { loc } => TypedExpr::new(TypedExprKind::Nil, TcType::Nil, *loc),
            Expr::Boolean { value, loc } => {
                TypedExpr::new(TypedExprKind::Boolean(*value), TcType::Boolean, *loc)
            }
            Expr::Integer { value, loc } => {
                TypedExpr::new(TypedExprKind::Integer(*value), TcType::Integer, *loc)
            }
            Expr::Float { value, loc } => {
                TypedExpr::new(TypedExprKind::Float(*value), TcType::Float, *loc)
            }
            Expr::String { value, loc } => {
                TypedExpr::new(TypedExprKind::String(value.clone()), TcType::String, *loc)
            }
            Expr::InitList { fields, loc } => {
                self.error(TypeError::MissingTypeHint, *loc);
                // Still look inside for unrelated mistakes
                for field in fields {
                    let value = match field {
                        InitField::Positional(value) | InitField::Named { value, .. } => value,
                    };
                    if !matches!(value, Expr::InitList { .. }) {
                        self.check_expr(value);
                    }
                }
                TypedExpr::new(TypedExprKind::ArrayInit(Vec::new()), TcType::Unknown, *loc)
            }
            Expr::Name { name, loc } => self.check_name(name, *loc),
            Expr::Index { object, index, loc } => self.check_index(object, index, *loc),
            Expr::Field { object, field, loc } => self.check_field(object, field, *loc),
            Expr::Call { callee, args, loc } => self.check_call(callee, args, *loc),
            Expr::Unary { op, operand, loc } => self.check_unary(*op, operand, *loc),
            Expr::Binary {
                left,
                op,
                right,
                loc,
            } => self.check_binary(*op, left, right, *loc),
            Expr::Cast { expr, target, loc } => self.check_cast(expr, target, *loc),
            Expr::Paren { expr, loc } => {
                let inner = self.check_expr(expr);
                let ty = inner.ty.clone();
                TypedExpr::new(TypedExprKind::Paren(Box::new(inner)), ty, *loc)
            }
        }
    }

    /// Check `expr` against an expected type.
    ///
    /// Initializer lists take their type from `expected`; everything else is
    /// checked on its own and then coerced.
    pub fn expect_expr(&mut self, expr: &Expr, expected: &TcType, site: Site) -> TypedExpr {
        if let Expr::InitList { fields, loc } = expr {
            return self.check_initializer(fields, expected, *loc);
        }
        let typed = self.check_expr(expr);
        self.coerce(typed, expected, site)
    }

    /// Accept equal types, insert a runtime-checked cast at `any`
    /// boundaries, and report anything else.
    pub fn coerce(&mut self, expr: TypedExpr, expected: &TcType, site: Site) -> TypedExpr {
        if expr.ty.is_compatible(expected) {
            return expr;
        }
        if expr.ty == TcType::Any || *expected == TcType::Any {
            let loc = expr.loc;
            return TypedExpr::new(
                TypedExprKind::Cast {
                    expr: Box::new(expr),
                    implicit: true,
                },
                expected.clone(),
                loc,
            );
        }
        self.error(
            TypeError::TypeMismatch {
                expected: expected.clone(),
                found: expr.ty.clone(),
                site,
            },
            expr.loc,
        );
        expr
    }

    /// Check a list of expressions where the last one may be a call that
    /// expands to all of its results.
    ///
    /// `expected[i]`, when present, is the type the i-th produced value must
    /// have. Each result of an expanded call is coerced on its own.
    pub fn check_value_list(
        &mut self,
        exprs: &[Expr],
        expected: &[Option<TcType>],
        site: impl Fn(usize) -> Site,
    ) -> ValueList {
        let mut list = ValueList::default();
        for (i, expr) in exprs.iter().enumerate() {
            let last = i + 1 == exprs.len();
            let pos = list.types.len();
            let want = expected.get(pos).cloned().flatten();

            if !(last && expr.is_call()) {
                let typed = match &want {
                    Some(ty) => self.expect_expr(expr, ty, site(pos)),
                    None => self.check_expr(expr),
                };
                list.types.push(typed.ty.clone());
                list.values.push(typed);
                continue;
            }

            let call = self.check_multi_expr(expr);
            let returns = call.value_types();
            match returns.len() {
                0 => {
                    if exprs.len() == 1 && !expected.is_empty() {
                        self.error(TypeError::VoidValue, call.loc);
                        list.unknown_arity = true;
                    }
                    list.values.push(call);
                }
                1 => {
                    let typed = match &want {
                        Some(ty) => self.coerce(call, ty, site(pos)),
                        None => call,
                    };
                    list.unknown_arity |= typed.ty.is_unknown();
                    list.types.push(typed.ty.clone());
                    list.values.push(typed);
                }
                _ => {
                    list.unknown_arity |= returns.iter().any(TcType::is_unknown);
                    let expand = self.expand_call(call, |j| {
                        let want = expected.get(pos + j).cloned().flatten()?;
                        Some((want, site(pos + j)))
                    });
                    list.types.extend(expand.value_types());
                    list.values.push(expand);
                }
            }
        }
        list
    }

    /// Spread a call over consecutive value positions. `want(j)` gives the
    /// type and site the j-th result is coerced to, if any.
    pub(super) fn expand_call(
        &mut self,
        call: TypedExpr,
        want: impl Fn(usize) -> Option<(TcType, Site)>,
    ) -> TypedExpr {
        let loc = call.loc;
        let values: Vec<TypedExpr> = call
            .value_types()
            .into_iter()
            .enumerate()
            .map(|(j, ty)| {
                let result = TypedExpr::new(TypedExprKind::CallResult(j), ty, loc);
                match want(j) {
                    Some((expected, site)) => self.coerce(result, &expected, site),
                    None => result,
                }
            })
            .collect();
        let ty = values.first().map_or(TcType::Nil, |value| value.ty.clone());
        TypedExpr::new(
            TypedExprKind::Expand {
                call: Box::new(call),
                values,
            },
            ty,
            loc,
        )
    }

    fn check_name(&mut self, name: &str, loc: Location) -> TypedExpr {
        let (kind, ty) = match self.scopes.lookup(name) {
            Some(Resolved::Var(info)) => {
                let kind = match info.kind {
                    VarKind::Local => TypedExprKind::Local(name.to_string()),
                    VarKind::Toplevel | VarKind::Module => TypedExprKind::Toplevel(name.to_string()),
                };
                (kind, info.ty.clone())
            }
            Some(Resolved::Builtin(ty)) => (TypedExprKind::Builtin(name.to_string()), ty.clone()),
            Some(Resolved::Library(_)) => {
                self.error(
                    TypeError::BareLibrary {
                        name: name.to_string(),
                    },
                    loc,
                );
                (TypedExprKind::Builtin(name.to_string()), TcType::Unknown)
            }
            None => {
                self.error(
                    TypeError::UndeclaredName {
                        name: name.to_string(),
                    },
                    loc,
                );
                (TypedExprKind::Local(name.to_string()), TcType::Unknown)
            }
        };
        TypedExpr::new(kind, ty, loc)
    }

    /// `a[i]`
    pub(super) fn check_index(&mut self, object: &Expr, index: &Expr, loc: Location) -> TypedExpr {
        let array = self.check_expr(object);
        let elem = match &array.ty {
            TcType::Array(elem) => (**elem).clone(),
            TcType::Unknown => TcType::Unknown,
            other => {
                self.error(
                    TypeError::NotAnArray {
                        ty: other.clone(),
                        site: Site::ArrayIndexing,
                    },
                    loc,
                );
                TcType::Unknown
            }
        };
        let index = self.expect_expr(index, &TcType::Integer, Site::ArrayIndex);
        TypedExpr::new(
            TypedExprKind::Index {
                array: Box::new(array),
                index: Box::new(index),
            },
            elem,
            loc,
        )
    }

    /// `a.f`: library members, table and record fields, module fields.
    pub(super) fn check_field(&mut self, object: &Expr, field: &str, loc: Location) -> TypedExpr {
        if let Expr::Name { name: library, .. } = object
            && let Some(Resolved::Library(members)) = self.scopes.lookup(library)
        {
            let member = members.get(field).cloned();
            let ty = match member {
                Some(ty) => ty,
                None => {
                    self.error(
                        TypeError::UnknownLibraryMember {
                            library: library.clone(),
                            member: field.to_string(),
                        },
                        loc,
                    );
                    TcType::Unknown
                }
            };
            let kind = TypedExprKind::LibraryField {
                library: library.clone(),
                field: field.to_string(),
            };
            return TypedExpr::new(kind, ty, loc);
        }

        let object = self.check_expr(object);
        let ty = match &object.ty {
            TcType::Table(_) | TcType::Record { .. } => {
                match object.ty.fields().and_then(|fields| fields.get(field)) {
                    Some(ty) => ty.clone(),
                    None => {
                        self.error(
                            TypeError::UnknownField {
                                field: field.to_string(),
                                ty: object.ty.clone(),
                            },
                            loc,
                        );
                        TcType::Unknown
                    }
                }
            }
            TcType::Module(_) => {
                let module = self.module.name().unwrap_or_default().to_string();
                let ty = match self.module.fields.get(field) {
                    Some(info) => info.ty.clone(),
                    None => {
                        self.error(
                            TypeError::UnknownModuleField {
                                field: field.to_string(),
                            },
                            loc,
                        );
                        TcType::Unknown
                    }
                };
                let kind = TypedExprKind::ModuleField {
                    module,
                    field: field.to_string(),
                };
                return TypedExpr::new(kind, ty, loc);
            }
            TcType::Unknown => TcType::Unknown,
            other => {
                self.error(TypeError::NoMembers { ty: other.clone() }, loc);
                TcType::Unknown
            }
        };
        TypedExpr::new(
            TypedExprKind::Field {
                object: Box::new(object),
                field: field.to_string(),
            },
            ty,
            loc,
        )
    }

    /// Check a call, keeping all of its results.
    pub(super) fn check_call(&mut self, callee: &Expr, args: &[Expr], loc: Location) -> TypedExpr {
        let callee = self.check_expr(callee);
        let (args, returns) = match &callee.ty {
            TcType::Function { params, returns } => {
                let expected: Vec<Option<TcType>> = params.iter().cloned().map(Some).collect();
                let list = self.check_value_list(args, &expected, |i| Site::Argument(i + 1));
                if list.arity_mismatch(params.len()) {
                    self.error(
                        TypeError::CallArity {
                            expected: params.len(),
                            found: list.count(),
                        },
                        loc,
                    );
                }
                (list.values, returns.clone())
            }
            other => {
                if !other.is_unknown() {
                    self.error(TypeError::NotCallable { ty: other.clone() }, loc);
                }
                let list = self.check_value_list(args, &[], |i| Site::Argument(i + 1));
                (list.values, vec![TcType::Unknown])
            }
        };
        let ty = returns.first().cloned().unwrap_or(TcType::Nil);
        TypedExpr::new(
            TypedExprKind::Call {
                callee: Box::new(callee),
                args,
                returns,
            },
            ty,
            loc,
        )
    }

    /// `e as T`
    fn check_cast(&mut self, expr: &Expr, target: &Type, loc: Location) -> TypedExpr {
        let inner = self.check_expr(expr);
        let target = self.type_from_ast(target, loc);
        let allowed = inner.ty.is_compatible(&target)
            || inner.ty == TcType::Any
            || target == TcType::Any;
        if !allowed {
            self.error(
                TypeError::InvalidCast {
                    from: inner.ty.clone(),
                    to: target.clone(),
                },
                loc,
            );
        }
        TypedExpr::new(
            TypedExprKind::Cast {
                expr: Box::new(inner),
                implicit: false,
            },
            target,
            loc,
        )
    }
}
