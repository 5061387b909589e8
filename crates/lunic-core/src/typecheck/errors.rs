//! Type checking error types and result types.

#![allow(unused_assignments)] // False positives from thiserror derive

use std::fmt;

use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticKind};

use super::types::TcType;

/// Result type for type checking operations.
pub type TypecheckResult<T> = Result<T, Vec<Diagnostic>>;

/// Where a value was expected to have a given type.
#[derive(Debug, Clone, PartialEq)]
pub enum Site {
    Declaration(String),
    Assignment,
    Argument(usize),
    ReturnValue(usize),
    ArrayIndex,
    ArrayIndexing,
    ArrayInitializer,
    InitializerField(String),
    Condition(&'static str),
    ForStart,
    ForLimit,
    ForStep,
    ForInState,
    ForInControl,
    LoopVariable(String),
    IpairsArgument,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Declaration(name) => write!(f, "declaration of '{name}'"),
            Site::Assignment => write!(f, "assignment"),
            Site::Argument(i) => write!(f, "argument {i}"),
            Site::ReturnValue(i) => write!(f, "return value {i}"),
            Site::ArrayIndex => write!(f, "array index"),
            Site::ArrayIndexing => write!(f, "array indexing"),
            Site::ArrayInitializer => write!(f, "array initializer"),
            Site::InitializerField(name) => write!(f, "field '{name}' of initializer"),
            Site::Condition(what) => write!(f, "{what} condition"),
            Site::ForStart => write!(f, "numeric for-loop initializer"),
            Site::ForLimit => write!(f, "numeric for-loop limit"),
            Site::ForStep => write!(f, "numeric for-loop step"),
            Site::ForInState => write!(f, "for-in loop state"),
            Site::ForInControl => write!(f, "for-in loop control"),
            Site::LoopVariable(name) => write!(f, "loop variable '{name}'"),
            Site::IpairsArgument => write!(f, "ipairs argument"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("variable '{name}' is not declared")]
    UndeclaredName { name: String },

    #[error("type '{name}' is not declared")]
    UndeclaredType { name: String },

    #[error("duplicate toplevel declaration for '{name}', previous one at line {line}")]
    DuplicateToplevel { name: String, line: usize },

    #[error("duplicate type name '{name}', previous one at line {line}")]
    DuplicateType { name: String, line: usize },

    #[error("duplicate field '{field}' in record '{record}'")]
    DuplicateRecordField { record: String, field: String },

    #[error("duplicate field '{field}' in table type")]
    DuplicateTableTypeField { field: String },

    #[error("duplicate module field '{field}', previous one at line {line}")]
    DuplicateModuleField { field: String, line: usize },

    #[error("missing type hint for array or table initializer")]
    MissingTypeHint,

    #[error("missing type annotation for variable '{name}'")]
    MissingVarAnnotation { name: String },

    #[error("missing type annotation for parameter '{name}'")]
    MissingParamAnnotation { name: String },

    #[error("named field '{name}' in array initializer")]
    NamedFieldInArray { name: String },

    #[error("positional field in initializer for {ty}")]
    PositionalFieldInTable { ty: TcType },

    #[error("duplicate field '{field}' in table initializer")]
    DuplicateInitField { field: String },

    #[error("invalid field '{field}' in initializer for {ty}")]
    UnknownInitField { field: String, ty: TcType },

    #[error("required field '{field}' is missing in initializer for {ty}")]
    MissingInitField { field: String, ty: TcType },

    #[error("type hint for initializer is not an array, table or record type: {ty}")]
    NotAnInitializerType { ty: TcType },

    #[error("the module variable must be initialized with an empty table")]
    NonEmptyModuleInit,

    #[error("expected {expected} but found {found} in {site}")]
    TypeMismatch {
        expected: TcType,
        found: TcType,
        site: Site,
    },

    #[error("function expects {expected} argument(s) but received {found}")]
    CallArity { expected: usize, found: usize },

    #[error("returning {found} value(s) but function expects {expected}")]
    ReturnArity { expected: usize, found: usize },

    #[error("left-hand side expects {expected} value(s) but right-hand side produces {found}")]
    AssignArity { expected: usize, found: usize },

    #[error("expected {expected} variable(s) in for loop but found {found}")]
    LoopVarCount { expected: usize, found: usize },

    #[error("void function call used where a value is expected")]
    VoidValue,

    #[error("attempting to call a {ty} value")]
    NotCallable { ty: TcType },

    #[error("expected array but found {ty} in {site}")]
    NotAnArray { ty: TcType, site: Site },

    #[error("trying to access a member of value of type '{ty}'")]
    NoMembers { ty: TcType },

    #[error("field '{field}' not found in type '{ty}'")]
    UnknownField { field: String, ty: TcType },

    #[error("module field '{field}' does not exist")]
    UnknownModuleField { field: String },

    #[error("operand of '{op}' operator has type {ty}")]
    UnaryOperand { op: &'static str, ty: TcType },

    #[error("{side} hand side of '{op}' operator has type {ty}")]
    BinaryOperand {
        side: Side,
        op: &'static str,
        ty: TcType,
    },

    #[error("cannot compare {left} and {right} using '{op}'")]
    Comparison {
        op: &'static str,
        left: TcType,
        right: TcType,
    },

    #[error("cannot cast '{from}' to '{to}'")]
    InvalidCast { from: TcType, to: TcType },

    #[error("expected integer or float but found {ty} in for-loop control variable '{name}'")]
    ControlVariableType { name: String, ty: TcType },

    #[error("expected an iterator function but found {ty} in for-in loop")]
    NotAnIterator { ty: TcType },

    #[error("the for-in iterator must take 2 arguments but takes {found}")]
    IteratorArity { found: usize },

    #[error("missing state value in for-in loop")]
    MissingLoopState,

    #[error("missing control value in for-in loop")]
    MissingLoopControl,

    #[error("too many values in for-in loop: expected 3 but found {found}")]
    TooManyLoopValues { found: usize },

    #[error("module field '{field}' cannot have type {ty}")]
    ModuleFieldType { field: String, ty: TcType },

    #[error("'{name}' is not the module variable")]
    NotModuleVariable { name: String },

    #[error("cannot assign to module variable '{name}'")]
    AssignToModule { name: String },

    #[error("module type is only allowed on a toplevel variable")]
    MisplacedModuleType,

    #[error("empty program: expected a module variable and a final return statement")]
    EmptyProgram,

    #[error("program has no module variable")]
    NoModuleVariable,

    #[error("there can only be one module variable per program, previous one at line {line}")]
    MultipleModuleVariables { line: usize },

    #[error("the program must end by returning the module variable")]
    MissingModuleReturn,

    #[error("the module return statement must return exactly one value, found {found}")]
    ModuleReturnArity { found: usize },

    #[error("the module return statement must return the module variable, found {ty}")]
    ModuleReturnType { ty: TcType },

    #[error("return statement must be the last statement of the program")]
    ReturnNotLast,

    #[error("cannot assign to builtin '{name}'")]
    AssignToBuiltin { name: String },

    #[error("cannot assign to builtin library field '{library}.{field}'")]
    AssignToLibraryField { library: String, field: String },

    #[error("library '{name}' can only be used through member access")]
    BareLibrary { name: String },

    #[error("'{member}' is not a member of library '{library}'")]
    UnknownLibraryMember { library: String, member: String },

    #[error("invalid assignment target")]
    InvalidAssignTarget,

    #[error("break statement outside of a loop")]
    BreakOutsideLoop,

    #[error("control reaches end of function with non-empty return type")]
    MissingReturn,
}

impl TypeError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            TypeError::UndeclaredName { .. } | TypeError::UnknownLibraryMember { .. } => {
                DiagnosticKind::UndeclaredName
            }
            TypeError::UndeclaredType { .. } => DiagnosticKind::UndeclaredType,
            TypeError::DuplicateToplevel { .. }
            | TypeError::DuplicateType { .. }
            | TypeError::DuplicateRecordField { .. }
            | TypeError::DuplicateTableTypeField { .. }
            | TypeError::DuplicateModuleField { .. } => DiagnosticKind::DuplicateDeclaration,
            TypeError::MissingVarAnnotation { .. } | TypeError::MissingParamAnnotation { .. } => {
                DiagnosticKind::MissingAnnotation
            }
            TypeError::MissingTypeHint
            | TypeError::NamedFieldInArray { .. }
            | TypeError::PositionalFieldInTable { .. }
            | TypeError::DuplicateInitField { .. }
            | TypeError::UnknownInitField { .. }
            | TypeError::MissingInitField { .. }
            | TypeError::NotAnInitializerType { .. }
            | TypeError::NonEmptyModuleInit => DiagnosticKind::InvalidInitializer,
            TypeError::UnaryOperand { .. }
            | TypeError::BinaryOperand { .. }
            | TypeError::Comparison { .. }
            | TypeError::NotAnArray { .. }
            | TypeError::NoMembers { .. }
            | TypeError::UnknownField { .. }
            | TypeError::InvalidAssignTarget => DiagnosticKind::InvalidOperand,
            TypeError::InvalidCast { .. } => DiagnosticKind::InvalidCast,
            TypeError::CallArity { .. }
            | TypeError::ReturnArity { .. }
            | TypeError::AssignArity { .. }
            | TypeError::LoopVarCount { .. }
            | TypeError::VoidValue
            | TypeError::IteratorArity { .. }
            | TypeError::MissingLoopState
            | TypeError::MissingLoopControl
            | TypeError::TooManyLoopValues { .. } => DiagnosticKind::ArityMismatch,
            TypeError::TypeMismatch { .. }
            | TypeError::ControlVariableType { .. }
            | TypeError::NotAnIterator { .. } => DiagnosticKind::TypeMismatch,
            TypeError::NotCallable { .. } => DiagnosticKind::NotCallable,
            TypeError::UnknownModuleField { .. }
            | TypeError::ModuleFieldType { .. }
            | TypeError::NotModuleVariable { .. }
            | TypeError::AssignToModule { .. }
            | TypeError::MisplacedModuleType
            | TypeError::EmptyProgram
            | TypeError::NoModuleVariable
            | TypeError::MultipleModuleVariables { .. }
            | TypeError::MissingModuleReturn
            | TypeError::ModuleReturnArity { .. }
            | TypeError::ModuleReturnType { .. }
            | TypeError::ReturnNotLast => DiagnosticKind::ModuleShape,
            TypeError::AssignToBuiltin { .. } | TypeError::AssignToLibraryField { .. } => {
                DiagnosticKind::BuiltinImmutable
            }
            TypeError::BareLibrary { .. } => DiagnosticKind::BareLibrary,
            TypeError::BreakOutsideLoop | TypeError::MissingReturn => DiagnosticKind::ControlFlow,
        }
    }
}
