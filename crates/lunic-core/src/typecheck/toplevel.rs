//! Toplevel items: variables, functions, module fields, records and type
//! aliases.

use indexmap::IndexMap;

use crate::ast::{Decl, Expr, FuncDecl, FuncName, Location, Toplevel, Type};
use crate::typed_ast::{
    TypedDecl, TypedExpr, TypedExprKind, TypedFuncName, TypedFunction, TypedLValue, TypedToplevel,
};

use super::environment::{FunctionContext, Resolved, TypeEnv};
use super::errors::{Site, TypeError};
use super::statements::block_returns;
use super::types::{TcType, VarKind};

/// Target of a toplevel assignment.
enum Target {
    Existing(Option<TypedLValue>),
    /// `m.f = v` for a field the module does not have yet
    NewField { module: String, field: String },
}

impl<'a> TypeEnv<'a> {
    /// Check one toplevel item other than `return`.
    ///
    /// Type aliases leave nothing behind in the typed program.
    pub fn check_toplevel(&mut self, item: &Toplevel) -> Option<TypedToplevel> {
        match item {
            Toplevel::Var { decls, values, loc } => {
                if let [decl] = decls.as_slice()
                    && matches!(decl.ty, Some(Type::Module))
                {
                    return Some(self.check_module_var(decl, values, *loc));
                }
                let (decls, values) = self.check_local_decl(decls, values, *loc);
                Some(TypedToplevel::Var {
                    decls,
                    values,
                    loc: *loc,
                })
            }
            Toplevel::Func(func) => Some(TypedToplevel::Func(self.check_function(func))),
            Toplevel::Assign {
                targets,
                values,
                loc,
            } => Some(self.check_toplevel_assign(targets, values, *loc)),
            Toplevel::Record { name, fields, loc } => {
                let ty = self.check_record(name, fields, *loc);
                Some(TypedToplevel::Record {
                    name: name.clone(),
                    ty,
                    loc: *loc,
                })
            }
            Toplevel::Typealias { name, ty, loc } => {
                let ty = self.type_from_ast(ty, *loc);
                self.declare_type_name(name, ty, *loc);
                None
            }
            Toplevel::Return { values, loc } => self
                .check_module_return(values, *loc)
                .map(|value| TypedToplevel::Return { value, loc: *loc }),
        }
    }

    /// `local m: module = {}`
    fn check_module_var(&mut self, decl: &Decl, values: &[Expr], loc: Location) -> TypedToplevel {
        let ty = TcType::Module(IndexMap::new());
        let init = match values {
            [Expr::InitList { fields, loc }] => self.check_initializer(fields, &ty, *loc),
            _ => {
                self.error(TypeError::NonEmptyModuleInit, loc);
                TypedExpr::new(TypedExprKind::ModuleInit, ty.clone(), loc)
            }
        };

        match self.module.var.clone() {
            Some((_, first)) => self.error_with_related(
                TypeError::MultipleModuleVariables { line: first.line },
                loc,
                first,
            ),
            None => {
                self.module.var = Some((decl.name.clone(), decl.loc));
                self.declare(&decl.name, ty.clone(), VarKind::Module, decl.loc);
            }
        }

        TypedToplevel::Var {
            decls: vec![TypedDecl::new(&decl.name, ty, decl.loc)],
            values: vec![init],
            loc,
        }
    }

    /// `local function f` and `function m.f`.
    ///
    /// The name is bound before the body is checked so the function can
    /// call itself.
    fn check_function(&mut self, func: &FuncDecl) -> TypedFunction {
        let params: Vec<TypedDecl> = func
            .params
            .iter()
            .map(|param| {
                let ty = match &param.ty {
                    Some(ty) => self.type_from_ast(ty, param.loc),
                    None => {
                        self.error(
                            TypeError::MissingParamAnnotation {
                                name: param.name.clone(),
                            },
                            param.loc,
                        );
                        TcType::Unknown
                    }
                };
                TypedDecl::new(&param.name, ty, param.loc)
            })
            .collect();
        let returns: Vec<TcType> = func
            .returns
            .iter()
            .map(|ty| self.type_from_ast(ty, func.loc))
            .collect();
        let ty = TcType::function(
            params.iter().map(|param| param.ty.clone()).collect(),
            returns.clone(),
        );

        let name = match &func.name {
            FuncName::Local(name) => {
                self.declare(name, ty.clone(), VarKind::Toplevel, func.loc);
                TypedFuncName::Local(name.clone())
            }
            FuncName::Field { module, field } => {
                if self.is_module_var(module, func.loc) {
                    self.declare_module_field(field, ty.clone(), func.loc);
                }
                TypedFuncName::ModuleField {
                    module: module.clone(),
                    field: field.clone(),
                }
            }
        };

        self.push_scope();
        for param in &params {
            self.declare(&param.name, param.ty.clone(), VarKind::Local, param.loc);
        }
        let outer = self.function.replace(FunctionContext {
            returns: returns.clone(),
        });
        let outer_loops = std::mem::take(&mut self.loop_depth);
        let body = self.check_stmts(&func.body);
        if !returns.is_empty() && !block_returns(&func.body) {
            self.error(TypeError::MissingReturn, func.loc);
        }
        self.loop_depth = outer_loops;
        self.function = outer;
        self.pop_scope();

        TypedFunction {
            name,
            params,
            ty,
            body,
            loc: func.loc,
        }
    }

    /// Whether `name` is the module variable, reporting why not.
    fn is_module_var(&mut self, name: &str, loc: Location) -> bool {
        let found = self.scopes.lookup(name).map(|resolved| {
            matches!(resolved, Resolved::Var(info) if info.kind == VarKind::Module)
        });
        match found {
            Some(true) => true,
            Some(false) => {
                self.error(
                    TypeError::NotModuleVariable {
                        name: name.to_string(),
                    },
                    loc,
                );
                false
            }
            None => {
                self.error(
                    TypeError::UndeclaredName {
                        name: name.to_string(),
                    },
                    loc,
                );
                false
            }
        }
    }

    /// Add a field to the module, rejecting duplicates and types that cannot
    /// be exported.
    fn declare_module_field(&mut self, field: &str, ty: TcType, loc: Location) {
        if !ty.is_module_field_type(self.options.allow_scalar_module_fields) {
            self.error(
                TypeError::ModuleFieldType {
                    field: field.to_string(),
                    ty: ty.clone(),
                },
                loc,
            );
        }
        if let Err(previous) = self.module.declare_field(field, ty, loc) {
            self.error_with_related(
                TypeError::DuplicateModuleField {
                    field: field.to_string(),
                    line: previous.line,
                },
                loc,
                previous,
            );
        }
    }

    /// Toplevel assignments. `m.f = v` declares the field `f`.
    fn check_toplevel_assign(
        &mut self,
        targets: &[Expr],
        values: &[Expr],
        loc: Location,
    ) -> TypedToplevel {
        let resolved: Vec<Target> = targets
            .iter()
            .map(|target| self.toplevel_target(target))
            .collect();
        let expected: Vec<Option<TcType>> = resolved
            .iter()
            .map(|target| match target {
                Target::Existing(lvalue) => Some(
                    lvalue
                        .as_ref()
                        .map_or(TcType::Unknown, |lv| lv.ty().clone()),
                ),
                Target::NewField { .. } => None,
            })
            .collect();

        let list = self.check_value_list(values, &expected, |_| Site::Assignment);
        if list.arity_mismatch(targets.len()) {
            self.error(
                TypeError::AssignArity {
                    expected: targets.len(),
                    found: list.count(),
                },
                loc,
            );
        }

        let mut lvalues = Vec::with_capacity(resolved.len());
        for (i, target) in resolved.into_iter().enumerate() {
            match target {
                Target::Existing(lvalue) => lvalues.extend(lvalue),
                Target::NewField { module, field } => {
                    let ty = list.types.get(i).cloned().unwrap_or(TcType::Unknown);
                    self.declare_module_field(&field, ty.clone(), loc);
                    lvalues.push(TypedLValue::ModuleField { module, field, ty });
                }
            }
        }

        TypedToplevel::Assign {
            targets: lvalues,
            values: list.values,
            loc,
        }
    }

    fn toplevel_target(&mut self, target: &Expr) -> Target {
        if let Expr::Field { object, field, .. } = target
            && let Expr::Name { name, .. } = &**object
            && let Some(Resolved::Var(info)) = self.scopes.lookup(name)
            && info.kind == VarKind::Module
        {
            if let Some(existing) = self.module.fields.get(field) {
                let previous = existing.loc;
                self.error_with_related(
                    TypeError::DuplicateModuleField {
                        field: field.clone(),
                        line: previous.line,
                    },
                    target.loc(),
                    previous,
                );
                return Target::Existing(None);
            }
            return Target::NewField {
                module: name.clone(),
                field: field.clone(),
            };
        }
        Target::Existing(self.check_lvalue(target))
    }

    /// `record Point x: float y: float end`
    fn check_record(&mut self, name: &str, fields: &[Decl], loc: Location) -> TcType {
        let mut resolved = IndexMap::new();
        for field in fields {
            let ty = match &field.ty {
                Some(ty) => self.type_from_ast(ty, field.loc),
                None => {
                    self.error(
                        TypeError::MissingVarAnnotation {
                            name: field.name.clone(),
                        },
                        field.loc,
                    );
                    TcType::Unknown
                }
            };
            if resolved.contains_key(&field.name) {
                self.error(
                    TypeError::DuplicateRecordField {
                        record: name.to_string(),
                        field: field.name.clone(),
                    },
                    field.loc,
                );
            } else {
                resolved.insert(field.name.clone(), ty);
            }
        }
        let ty = TcType::Record {
            name: name.to_string(),
            fields: resolved,
        };
        self.declare_type_name(name, ty.clone(), loc);
        ty
    }

    fn declare_type_name(&mut self, name: &str, ty: TcType, loc: Location) {
        if let Err(previous) = self.scopes.declare_type(name, ty, loc) {
            self.error_with_related(
                TypeError::DuplicateType {
                    name: name.to_string(),
                    line: previous.line,
                },
                loc,
                previous,
            );
        }
    }
}
