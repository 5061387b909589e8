pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod typecheck;
pub mod typed_ast;

#[doc(hidden)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use ast::{Expr, Program, Stmt, Toplevel};
pub use config::{CheckOptions, ConfigError};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use typecheck::{
    Builtins, CheckedModule, TcType, TypecheckResult, typecheck_program, typecheck_program_with,
};
pub use typed_ast::TypedProgram;
