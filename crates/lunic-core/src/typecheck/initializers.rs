//! Table constructors (`{ ... }`), typed by the context they appear in.

use indexmap::{IndexMap, IndexSet};

use crate::ast::{InitField, Location};
use crate::typed_ast::{TypedExpr, TypedExprKind};

use super::environment::TypeEnv;
use super::errors::{Site, TypeError};
use super::types::TcType;

impl<'a> TypeEnv<'a> {
    /// Check an initializer list against its target type.
    pub fn check_initializer(
        &mut self,
        fields: &[InitField],
        target: &TcType,
        loc: Location,
    ) -> TypedExpr {
        match target {
            TcType::Array(elem) => self.check_array_init(fields, elem, target, loc),
            TcType::Table(expected) | TcType::Record { fields: expected, .. } => {
                self.check_table_init(fields, expected, target, loc)
            }
            TcType::Module(_) => {
                if !fields.is_empty() {
                    self.error(TypeError::NonEmptyModuleInit, loc);
                }
                TypedExpr::new(TypedExprKind::ModuleInit, target.clone(), loc)
            }
            TcType::Unknown => {
                TypedExpr::new(TypedExprKind::ArrayInit(Vec::new()), TcType::Unknown, loc)
            }
            other => {
                self.error(TypeError::NotAnInitializerType { ty: other.clone() }, loc);
                TypedExpr::new(TypedExprKind::ArrayInit(Vec::new()), TcType::Unknown, loc)
            }
        }
    }

    fn check_array_init(
        &mut self,
        fields: &[InitField],
        elem: &TcType,
        target: &TcType,
        loc: Location,
    ) -> TypedExpr {
        let mut items = Vec::with_capacity(fields.len());
        for field in fields {
            match field {
                InitField::Positional(value) => {
                    items.push(self.expect_expr(value, elem, Site::ArrayInitializer));
                }
                InitField::Named { name, loc, .. } => {
                    self.error(TypeError::NamedFieldInArray { name: name.clone() }, *loc);
                }
            }
        }
        TypedExpr::new(TypedExprKind::ArrayInit(items), target.clone(), loc)
    }

    fn check_table_init(
        &mut self,
        fields: &[InitField],
        expected: &IndexMap<String, TcType>,
        target: &TcType,
        loc: Location,
    ) -> TypedExpr {
        let mut seen = IndexSet::new();
        let mut items = Vec::with_capacity(fields.len());
        for field in fields {
            match field {
                InitField::Positional(value) => {
                    self.error(
                        TypeError::PositionalFieldInTable { ty: target.clone() },
                        value.loc(),
                    );
                }
                InitField::Named {
                    name,
                    value,
                    loc: field_loc,
                } => {
                    if !seen.insert(name.clone()) {
                        self.error(
                            TypeError::DuplicateInitField {
                                field: name.clone(),
                            },
                            *field_loc,
                        );
                        continue;
                    }
                    match expected.get(name) {
                        Some(field_ty) => {
                            let typed = self.expect_expr(
                                value,
                                field_ty,
                                Site::InitializerField(name.clone()),
                            );
                            items.push((name.clone(), typed));
                        }
                        None => self.error(
                            TypeError::UnknownInitField {
                                field: name.clone(),
                                ty: target.clone(),
                            },
                            *field_loc,
                        ),
                    }
                }
            }
        }
        for name in expected.keys() {
            if !seen.contains(name) {
                self.error(
                    TypeError::MissingInitField {
                        field: name.clone(),
                        ty: target.clone(),
                    },
                    loc,
                );
            }
        }
        TypedExpr::new(TypedExprKind::TableInit(items), target.clone(), loc)
    }
}
