use std::fmt;

use serde::Serialize;

use crate::ast::Location;

/// Diagnostic kind/category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    UndeclaredName,
    UndeclaredType,
    DuplicateDeclaration,
    MissingAnnotation,
    InvalidInitializer,
    InvalidOperand,
    InvalidCast,
    ArityMismatch,
    TypeMismatch,
    NotCallable,
    ModuleShape,
    BuiltinImmutable,
    BareLibrary,
    ControlFlow,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UndeclaredName => "undeclared-name",
            DiagnosticKind::UndeclaredType => "undeclared-type",
            DiagnosticKind::DuplicateDeclaration => "duplicate-declaration",
            DiagnosticKind::MissingAnnotation => "missing-annotation",
            DiagnosticKind::InvalidInitializer => "invalid-initializer",
            DiagnosticKind::InvalidOperand => "invalid-operand",
            DiagnosticKind::InvalidCast => "invalid-cast",
            DiagnosticKind::ArityMismatch => "arity-mismatch",
            DiagnosticKind::TypeMismatch => "type-mismatch",
            DiagnosticKind::NotCallable => "not-callable",
            DiagnosticKind::ModuleShape => "module-shape",
            DiagnosticKind::BuiltinImmutable => "builtin-immutable",
            DiagnosticKind::BareLibrary => "bare-library",
            DiagnosticKind::ControlFlow => "control-flow",
        }
    }

    /// Stable error code (e.g., "E0001")
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UndeclaredName => "E0001",
            DiagnosticKind::UndeclaredType => "E0002",
            DiagnosticKind::DuplicateDeclaration => "E0003",
            DiagnosticKind::MissingAnnotation => "E0004",
            DiagnosticKind::InvalidInitializer => "E0005",
            DiagnosticKind::InvalidOperand => "E0006",
            DiagnosticKind::InvalidCast => "E0007",
            DiagnosticKind::ArityMismatch => "E0008",
            DiagnosticKind::TypeMismatch => "E0009",
            DiagnosticKind::NotCallable => "E0010",
            DiagnosticKind::ModuleShape => "E0011",
            DiagnosticKind::BuiltinImmutable => "E0012",
            DiagnosticKind::BareLibrary => "E0013",
            DiagnosticKind::ControlFlow => "E0014",
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Location,
    pub filename: String,
    /// Earlier declaration this diagnostic refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Location>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: String, location: Location, filename: String) -> Self {
        Self {
            kind,
            message,
            location,
            filename,
            related: None,
        }
    }

    pub fn with_related(mut self, related: Location) -> Self {
        self.related = Some(related);
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Machine-readable form for editors and build tooling
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: error[{}]: {}",
            self.filename,
            self.location.line,
            self.location.col,
            self.code(),
            self.message
        )
    }
}
