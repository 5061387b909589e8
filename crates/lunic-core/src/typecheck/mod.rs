//! Static type checker for Lunic.
//!
//! Checks a parsed [`Program`] and produces either a [`CheckedModule`] (the
//! exported fields plus a fully typed program) or every diagnostic found.
//!
//! ## Type System Features
//!
//! - **Structural types**: arrays, tables and function types compare by
//!   shape; records compare by name and fields
//! - **Dynamic escape**: `any` converts implicitly in both directions, with a
//!   runtime-checked cast inserted in the typed program
//! - **Strict operators**: no truthiness, no implicit casts on operands; the
//!   only numeric promotion is integer to float in mixed arithmetic
//! - **Multiple results**: a call in the last position of a list expands to
//!   all of its results
//!
//! ## Type Checking Process
//!
//! 1. **Walk**: toplevel items are checked in order, left to right; names
//!    become visible after the item that declares them
//! 2. **Module**: `local m: module = {}`, `function m.f` and `m.f = v` build
//!    the module's exported fields
//! 3. **Assembly**: the module variable and the final `return` are validated
//! 4. **Error collection**: every violation records one diagnostic and
//!    checking continues; `Unknown` stands in for the type of a broken
//!    expression so a single mistake is reported once

mod builtins;
mod environment;
mod errors;
mod expressions;
mod initializers;
mod module;
mod operators;
mod statements;
mod toplevel;
mod types;

use crate::ast::Program;
use crate::config::CheckOptions;

pub use builtins::{Builtin, Builtins, IPAIRS};
pub use environment::{Resolved, Scopes};
pub use errors::{Side, Site, TypeError, TypecheckResult};
pub use module::CheckedModule;
pub use types::{TcType, VarInfo, VarKind};

use environment::TypeEnv;

/// Type check a program against the standard builtins.
pub fn typecheck_program(program: &Program) -> TypecheckResult<CheckedModule> {
    typecheck_program_with(program, Builtins::standard(), &CheckOptions::default())
}

/// Type check a program with a custom builtin table and options.
#[tracing::instrument(skip_all, fields(items = program.items.len(), file = %options.filename))]
pub fn typecheck_program_with(
    program: &Program,
    builtins: &Builtins,
    options: &CheckOptions,
) -> TypecheckResult<CheckedModule> {
    let mut env = TypeEnv::new(builtins, options);
    let checked = env.check_program(program);

    match checked {
        Some(module) if env.errors.is_empty() => {
            tracing::debug!(
                module = %module.module_name,
                exports = module.exports.len(),
                "module assembled"
            );
            Ok(module)
        }
        _ => {
            tracing::debug!(errors = env.errors.len(), "type checking failed");
            Err(env.errors)
        }
    }
}
