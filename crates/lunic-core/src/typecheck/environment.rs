//! Type environment for scope and variable management.

use indexmap::IndexMap;

use crate::ast::{Location, Type};
use crate::config::CheckOptions;
use crate::diagnostics::Diagnostic;

use super::builtins::{Builtin, Builtins};
use super::errors::TypeError;
use super::module::ModuleState;
use super::types::{TcType, VarInfo, VarKind};

/// What a name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Var(&'a VarInfo),
    Builtin(&'a TcType),
    Library(&'a IndexMap<String, TcType>),
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub ty: TcType,
    pub loc: Location,
}

/// Lexical scopes: a stack of ordered layers over the builtin table.
///
/// The bottom layer is the program toplevel and is never popped. Names in
/// the toplevel layer cannot be declared twice; nested layers shadow freely.
/// Type names live in their own toplevel-only namespace.
#[derive(Debug)]
pub struct Scopes<'a> {
    builtins: &'a Builtins,
    layers: Vec<IndexMap<String, VarInfo>>,
    types: IndexMap<String, TypeInfo>,
}

impl<'a> Scopes<'a> {
    pub fn new(builtins: &'a Builtins) -> Self {
        Scopes {
            builtins,
            layers: vec![IndexMap::new()],
            types: IndexMap::new(),
        }
    }

    pub fn enter_scope(&mut self) {
        self.layers.push(IndexMap::new());
    }

    pub fn exit_scope(&mut self) {
        if self.layers.len() > 1 {
            self.layers.pop();
        }
    }

    pub fn is_toplevel(&self) -> bool {
        self.layers.len() == 1
    }

    /// Declare a name in the innermost layer.
    ///
    /// At toplevel, fails with the earlier declaration if the name is taken.
    pub fn declare(&mut self, name: &str, info: VarInfo) -> Result<(), &VarInfo> {
        let toplevel = self.layers.len() == 1;
        let layer = self.layers.len() - 1;
        if toplevel && self.layers[layer].contains_key(name) {
            return Err(&self.layers[layer][name]);
        }
        self.layers[layer].insert(name.to_string(), info);
        Ok(())
    }

    /// Look up a name, searching from innermost to outermost scope and then
    /// the builtins.
    pub fn lookup(&self, name: &str) -> Option<Resolved<'_>> {
        for layer in self.layers.iter().rev() {
            if let Some(info) = layer.get(name) {
                return Some(Resolved::Var(info));
            }
        }
        match self.builtins.get(name)? {
            Builtin::Function(ty) => Some(Resolved::Builtin(ty)),
            Builtin::Library(members) => Some(Resolved::Library(members)),
        }
    }

    pub fn declare_type(&mut self, name: &str, ty: TcType, loc: Location) -> Result<(), Location> {
        if let Some(previous) = self.types.get(name) {
            return Err(previous.loc);
        }
        self.types.insert(name.to_string(), TypeInfo { ty, loc });
        Ok(())
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TcType> {
        self.types.get(name).map(|info| &info.ty)
    }

    pub fn toplevel(&self) -> &IndexMap<String, VarInfo> {
        &self.layers[0]
    }
}

/// Signature of the function whose body is being checked.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub returns: Vec<TcType>,
}

/// Checker state for one program: scopes, accumulated errors and the module
/// being assembled.
pub struct TypeEnv<'a> {
    pub scopes: Scopes<'a>,
    pub errors: Vec<Diagnostic>,
    pub options: &'a CheckOptions,
    pub module: ModuleState,
    pub function: Option<FunctionContext>,
    pub loop_depth: usize,
}

impl<'a> TypeEnv<'a> {
    pub fn new(builtins: &'a Builtins, options: &'a CheckOptions) -> Self {
        TypeEnv {
            scopes: Scopes::new(builtins),
            errors: Vec::new(),
            options,
            module: ModuleState::default(),
            function: None,
            loop_depth: 0,
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.enter_scope();
    }

    pub fn pop_scope(&mut self) {
        self.scopes.exit_scope();
    }

    /// Record a type error.
    pub fn error(&mut self, error: TypeError, loc: Location) {
        let diagnostic = Diagnostic::new(
            error.kind(),
            error.to_string(),
            loc,
            self.options.filename.clone(),
        );
        tracing::trace!(%diagnostic, "type error");
        self.errors.push(diagnostic);
    }

    /// Record a type error that points back at an earlier declaration.
    pub fn error_with_related(&mut self, error: TypeError, loc: Location, related: Location) {
        self.error(error, loc);
        if let Some(last) = self.errors.pop() {
            self.errors.push(last.with_related(related));
        }
    }

    /// Declare a variable in the current scope, reporting toplevel duplicates.
    pub fn declare(&mut self, name: &str, ty: TcType, kind: VarKind, loc: Location) {
        let info = VarInfo { ty, loc, kind };
        if let Err(previous) = self.scopes.declare(name, info) {
            let previous = previous.loc;
            self.error_with_related(
                TypeError::DuplicateToplevel {
                    name: name.to_string(),
                    line: previous.line,
                },
                loc,
                previous,
            );
        }
    }

    /// Declare a function-local variable.
    pub fn declare_local(&mut self, name: &str, ty: TcType, loc: Location) {
        let kind = if self.scopes.is_toplevel() {
            VarKind::Toplevel
        } else {
            VarKind::Local
        };
        self.declare(name, ty, kind, loc);
    }

    /// Convert a type annotation to a TcType.
    ///
    /// `module` is rejected here; the one place it is legal handles it
    /// before calling this.
    pub fn type_from_ast(&mut self, ty: &Type, loc: Location) -> TcType {
        match ty {
            Type::Nil => TcType::Nil,
            Type::Boolean => TcType::Boolean,
            Type::Integer => TcType::Integer,
            Type::Float => TcType::Float,
            Type::String => TcType::String,
            Type::Any => TcType::Any,
            Type::Module => {
                self.error(TypeError::MisplacedModuleType, loc);
                TcType::Unknown
            }
            Type::Name { name, loc } => match self.scopes.lookup_type(name) {
                Some(ty) => ty.clone(),
                None => {
                    self.error(TypeError::UndeclaredType { name: name.clone() }, *loc);
                    TcType::Unknown
                }
            },
            Type::Array { elem, loc } => TcType::array(self.type_from_ast(elem, *loc)),
            Type::Table { fields, .. } => {
                let mut resolved = IndexMap::new();
                for field in fields {
                    let field_ty = self.type_from_ast(&field.ty, field.loc);
                    if resolved.contains_key(&field.name) {
                        self.error(
                            TypeError::DuplicateTableTypeField {
                                field: field.name.clone(),
                            },
                            field.loc,
                        );
                    } else {
                        resolved.insert(field.name.clone(), field_ty);
                    }
                }
                TcType::Table(resolved)
            }
            Type::Function {
                params,
                returns,
                loc,
            } => {
                let params = params.iter().map(|p| self.type_from_ast(p, *loc)).collect();
                let returns = returns.iter().map(|r| self.type_from_ast(r, *loc)).collect();
                TcType::Function { params, returns }
            }
        }
    }
}
