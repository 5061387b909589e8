//! Type representation for the type checker.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::Location;

/// Internal type representation for type checking.
///
/// Equality is structural: two types are the same type iff they compare
/// equal with `==`. Function types compare parameters and returns exactly,
/// with no variance in either direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TcType {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    /// Dynamic escape type; values are checked at runtime when narrowed.
    Any,
    Array(Box<TcType>),
    Table(IndexMap<String, TcType>),
    Record {
        name: String,
        fields: IndexMap<String, TcType>,
    },
    Function {
        params: Vec<TcType>,
        returns: Vec<TcType>,
    },
    Module(IndexMap<String, TcType>),
    /// Placeholder after a diagnostic has been recorded. Compatible with
    /// everything so that one error is reported once.
    Unknown,
}

impl TcType {
    pub fn function(params: Vec<TcType>, returns: Vec<TcType>) -> Self {
        TcType::Function { params, returns }
    }

    pub fn array(elem: TcType) -> Self {
        TcType::Array(Box::new(elem))
    }

    /// Whether values of this type live on the garbage-collected heap.
    pub fn is_gc(&self) -> bool {
        matches!(
            self,
            TcType::String
                | TcType::Array(_)
                | TcType::Table(_)
                | TcType::Record { .. }
                | TcType::Function { .. }
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TcType::Integer | TcType::Float)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TcType::Unknown)
    }

    /// Same type, where the error placeholder matches anything at any depth.
    pub fn is_compatible(&self, other: &TcType) -> bool {
        match (self, other) {
            (TcType::Unknown, _) | (_, TcType::Unknown) => true,
            (TcType::Array(a), TcType::Array(b)) => a.is_compatible(b),
            (TcType::Table(a), TcType::Table(b)) => fields_compatible(a, b),
            (
                TcType::Function { params, returns },
                TcType::Function {
                    params: other_params,
                    returns: other_returns,
                },
            ) => lists_compatible(params, other_params) && lists_compatible(returns, other_returns),
            _ => self == other,
        }
    }

    /// Named fields of a table or record type.
    pub fn fields(&self) -> Option<&IndexMap<String, TcType>> {
        match self {
            TcType::Table(fields) | TcType::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Whether a value of this type may be stored in a module field.
    pub fn is_module_field_type(&self, allow_scalars: bool) -> bool {
        match self {
            TcType::Function { .. } | TcType::Unknown => true,
            TcType::Boolean | TcType::Integer | TcType::Float | TcType::String => allow_scalars,
            _ => false,
        }
    }
}

fn lists_compatible(a: &[TcType], b: &[TcType]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.is_compatible(b))
}

fn fields_compatible(a: &IndexMap<String, TcType>, b: &IndexMap<String, TcType>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(name, ty)| b.get(name).is_some_and(|other| ty.is_compatible(other)))
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[TcType]) -> fmt::Result {
    write!(f, "(")?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{ty}")?;
    }
    write!(f, ")")
}

impl fmt::Display for TcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcType::Nil => write!(f, "nil"),
            TcType::Boolean => write!(f, "boolean"),
            TcType::Integer => write!(f, "integer"),
            TcType::Float => write!(f, "float"),
            TcType::String => write!(f, "string"),
            TcType::Any => write!(f, "any"),
            TcType::Array(elem) => write!(f, "{{ {elem} }}"),
            TcType::Table(fields) => {
                if fields.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, " }}")
            }
            TcType::Record { name, .. } => write!(f, "{name}"),
            TcType::Function { params, returns } => {
                write_list(f, params)?;
                write!(f, " -> ")?;
                write_list(f, returns)
            }
            TcType::Module(_) => write!(f, "module"),
            TcType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Information about a declared variable.
#[derive(Debug, Clone)]
pub struct VarInfo {
    pub ty: TcType,
    pub loc: Location,
    pub kind: VarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Declared inside a function body or loop header
    Local,
    /// Declared at the toplevel of the program
    Toplevel,
    /// The program's module variable
    Module,
}
