//! Module assembly: the module variable, its exported fields and the final
//! `return`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{Expr, Location, Program, Toplevel};
use crate::typed_ast::{TypedExpr, TypedExprKind, TypedProgram};

use super::environment::TypeEnv;
use super::errors::TypeError;
use super::types::TcType;

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleField {
    pub ty: TcType,
    /// First declaration, cited by duplicate diagnostics
    pub loc: Location,
}

/// The module as it is being built during checking.
#[derive(Debug, Clone, Default)]
pub struct ModuleState {
    /// Name and declaration site of the module variable
    pub var: Option<(String, Location)>,
    pub fields: IndexMap<String, ModuleField>,
}

impl ModuleState {
    pub fn name(&self) -> Option<&str> {
        self.var.as_ref().map(|(name, _)| name.as_str())
    }

    /// Add a field; fails with the location of the existing one.
    pub fn declare_field(&mut self, field: &str, ty: TcType, loc: Location) -> Result<(), Location> {
        if let Some(existing) = self.fields.get(field) {
            return Err(existing.loc);
        }
        self.fields
            .insert(field.to_string(), ModuleField { ty, loc });
        Ok(())
    }

    pub fn exports(&self) -> IndexMap<String, TcType> {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.ty.clone()))
            .collect()
    }
}

/// A program that passed every check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedModule {
    pub module_name: String,
    /// Exported fields in declaration order
    pub exports: IndexMap<String, TcType>,
    /// Every toplevel value binding, the module variable included
    pub toplevel: IndexMap<String, TcType>,
    pub program: TypedProgram,
}

impl CheckedModule {
    pub fn module_type(&self) -> TcType {
        TcType::Module(self.exports.clone())
    }

    pub fn export(&self, field: &str) -> Option<&TcType> {
        self.exports.get(field)
    }
}

impl<'a> TypeEnv<'a> {
    /// Check every toplevel item and assemble the module.
    ///
    /// Returns `None` whenever a diagnostic was recorded.
    pub fn check_program(&mut self, program: &Program) -> Option<CheckedModule> {
        let Some(last) = program.items.last() else {
            self.error(TypeError::EmptyProgram, Location::new(1, 1));
            return None;
        };
        let last_index = program.items.len() - 1;

        let mut items = Vec::with_capacity(program.items.len());
        for (i, item) in program.items.iter().enumerate() {
            if matches!(item, Toplevel::Return { .. }) && i != last_index {
                self.error(TypeError::ReturnNotLast, item.loc());
            }
            items.extend(self.check_toplevel(item));
        }

        if self.module.var.is_none() {
            self.error(TypeError::NoModuleVariable, program.items[0].loc());
        }
        if !matches!(last, Toplevel::Return { .. }) {
            self.error(TypeError::MissingModuleReturn, last.loc());
        }

        if !self.errors.is_empty() {
            return None;
        }
        let module_name = self.module.name()?.to_string();
        let toplevel = self
            .scopes
            .toplevel()
            .iter()
            .map(|(name, info)| (name.clone(), info.ty.clone()))
            .collect();
        Some(CheckedModule {
            module_name,
            exports: self.module.exports(),
            toplevel,
            program: TypedProgram { items },
        })
    }

    /// `return m` at the end of the program, naming the module variable
    /// itself.
    pub(super) fn check_module_return(&mut self, values: &[Expr], loc: Location) -> Option<TypedExpr> {
        let mut typed: Vec<TypedExpr> = values.iter().map(|value| self.check_expr(value)).collect();
        if typed.len() != 1 {
            self.error(
                TypeError::ModuleReturnArity {
                    found: typed.len(),
                },
                loc,
            );
            return None;
        }
        let value = typed.pop()?;
        let returns_module_var = matches!(
            &value.kind,
            TypedExprKind::Toplevel(name) if Some(name.as_str()) == self.module.name()
        );
        if !returns_module_var && !value.ty.is_unknown() {
            self.error(
                TypeError::ModuleReturnType {
                    ty: value.ty.clone(),
                },
                value.loc,
            );
        }
        Some(value)
    }
}
