//! Unary and binary operator typing.
//!
//! Operands are never coerced to or from `any`. The only implicit
//! conversion is integer to float inside mixed arithmetic and comparisons,
//! which is made explicit with a `ToFloat` node.

use crate::ast::{BinaryOp, Expr, Location, UnaryOp};
use crate::typed_ast::{TypedExpr, TypedExprKind};

use super::environment::TypeEnv;
use super::errors::{Side, TypeError};
use super::types::TcType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// `+ - * // %`
    Arithmetic,
    /// `/ ^`
    FloatArithmetic,
    Bitwise,
    Logical,
    Concat,
    Equality,
    Ordering,
}

fn family(op: BinaryOp) -> Family {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::IntDiv | BinaryOp::Mod => {
            Family::Arithmetic
        }
        BinaryOp::Div | BinaryOp::Pow => Family::FloatArithmetic,
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            Family::Bitwise
        }
        BinaryOp::And | BinaryOp::Or => Family::Logical,
        BinaryOp::Concat => Family::Concat,
        BinaryOp::Eq | BinaryOp::Ne => Family::Equality,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => Family::Ordering,
    }
}

/// Whether a single operand is acceptable for the operator family.
fn operand_ok(family: Family, ty: &TcType) -> bool {
    match family {
        Family::Arithmetic | Family::FloatArithmetic => ty.is_numeric(),
        Family::Bitwise => *ty == TcType::Integer,
        Family::Logical => *ty == TcType::Boolean,
        Family::Concat => matches!(ty, TcType::String | TcType::Integer | TcType::Float),
        Family::Equality | Family::Ordering => true,
    }
}

fn to_float(expr: TypedExpr) -> TypedExpr {
    if expr.ty != TcType::Integer {
        return expr;
    }
    let loc = expr.loc;
    TypedExpr::new(TypedExprKind::ToFloat(Box::new(expr)), TcType::Float, loc)
}

impl<'a> TypeEnv<'a> {
    pub(super) fn check_unary(&mut self, op: UnaryOp, operand: &Expr, loc: Location) -> TypedExpr {
        let operand = self.check_expr(operand);
        let ty = match (op, &operand.ty) {
            (_, TcType::Unknown) => TcType::Unknown,
            (UnaryOp::Neg, ty) if ty.is_numeric() => ty.clone(),
            (UnaryOp::BitNot, TcType::Integer) => TcType::Integer,
            (UnaryOp::Not, TcType::Boolean) => TcType::Boolean,
            (UnaryOp::Len, TcType::Array(_) | TcType::String) => TcType::Integer,
            (_, ty) => {
                self.error(
                    TypeError::UnaryOperand {
                        op: op.symbol(),
                        ty: ty.clone(),
                    },
                    loc,
                );
                TcType::Unknown
            }
        };
        TypedExpr::new(
            TypedExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
            loc,
        )
    }

    pub(super) fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        loc: Location,
    ) -> TypedExpr {
        let left = self.check_expr(left);
        let right = self.check_expr(right);
        let family = family(op);

        let mut valid = true;
        for (side, operand) in [(Side::Left, &left), (Side::Right, &right)] {
            if operand.ty.is_unknown() {
                valid = false;
            } else if !operand_ok(family, &operand.ty) {
                self.error(
                    TypeError::BinaryOperand {
                        side,
                        op: op.symbol(),
                        ty: operand.ty.clone(),
                    },
                    loc,
                );
                valid = false;
            }
        }

        let (left, right, ty) = match family {
            Family::Equality | Family::Ordering => self.comparison(op, family, left, right, loc),
            _ if !valid => (left, right, TcType::Unknown),
            Family::Arithmetic if left.ty == TcType::Integer && right.ty == TcType::Integer => {
                (left, right, TcType::Integer)
            }
            Family::Arithmetic | Family::FloatArithmetic => {
                (to_float(left), to_float(right), TcType::Float)
            }
            Family::Bitwise => (left, right, TcType::Integer),
            Family::Logical => (left, right, TcType::Boolean),
            Family::Concat => (left, right, TcType::String),
        };

        TypedExpr::new(
            TypedExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            loc,
        )
    }

    fn comparison(
        &mut self,
        op: BinaryOp,
        family: Family,
        left: TypedExpr,
        right: TypedExpr,
        loc: Location,
    ) -> (TypedExpr, TypedExpr, TcType) {
        let (l, r) = (&left.ty, &right.ty);
        let mixed = l.is_numeric() && r.is_numeric() && l != r;
        let ok = l.is_unknown()
            || r.is_unknown()
            || mixed
            || match family {
                Family::Equality => l == r,
                _ => (l.is_numeric() && r.is_numeric()) || (*l == TcType::String && *r == TcType::String),
            };
        if !ok {
            self.error(
                TypeError::Comparison {
                    op: op.symbol(),
                    left: l.clone(),
                    right: r.clone(),
                },
                loc,
            );
        }
        if mixed {
            return (to_float(left), to_float(right), TcType::Boolean);
        }
        (left, right, TcType::Boolean)
    }
}
