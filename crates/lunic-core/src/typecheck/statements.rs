//! Statement type checking.

use crate::ast::{Decl, Expr, Location, Stmt};
use crate::typed_ast::{TypedDecl, TypedExpr, TypedExprKind, TypedForIn, TypedLValue, TypedStmt};

use super::builtins::IPAIRS;
use super::environment::{Resolved, TypeEnv};
use super::errors::{Site, TypeError};
use super::expressions::ValueList;
use super::types::{TcType, VarKind};

impl<'a> TypeEnv<'a> {
    /// Type check a block in its own scope.
    pub fn check_block(&mut self, stmts: &[Stmt]) -> Vec<TypedStmt> {
        self.push_scope();
        let block = self.check_stmts(stmts);
        self.pop_scope();
        block
    }

    /// Type check statements in the current scope.
    pub fn check_stmts(&mut self, stmts: &[Stmt]) -> Vec<TypedStmt> {
        stmts.iter().map(|stmt| self.check_stmt(stmt)).collect()
    }

    pub fn check_stmt(&mut self, stmt: &Stmt) -> TypedStmt {
        match stmt {
            Stmt::Local { decls, values, loc } => {
                let (decls, values) = self.check_local_decl(decls, values, *loc);
                TypedStmt::Local {
                    decls,
                    values,
                    loc: *loc,
                }
            }
            Stmt::Assign {
                targets,
                values,
                loc,
            } => {
                let (targets, values) = self.check_assignment(targets, values, *loc);
                TypedStmt::Assign {
                    targets,
                    values,
                    loc: *loc,
                }
            }
            Stmt::Call { call, loc } => {
                // Results are discarded, so a void call is fine here
                let call = match call {
                    Expr::Call { .. } => self.check_multi_expr(call),
                    other => self.check_expr(other),
                };
                TypedStmt::Call { call, loc: *loc }
            }
            Stmt::Do { body, loc } => TypedStmt::Do {
                body: self.check_block(body),
                loc: *loc,
            },
            Stmt::While {
                condition,
                body,
                loc,
            } => {
                let condition =
                    self.expect_expr(condition, &TcType::Boolean, Site::Condition("while"));
                self.push_scope();
                let body = self.check_loop_body(body);
                self.pop_scope();
                TypedStmt::While {
                    condition,
                    body,
                    loc: *loc,
                }
            }
            Stmt::Repeat {
                body,
                condition,
                loc,
            } => {
                // The condition can see the body's locals
                self.push_scope();
                let body = self.check_loop_body(body);
                let condition =
                    self.expect_expr(condition, &TcType::Boolean, Site::Condition("repeat"));
                self.pop_scope();
                TypedStmt::Repeat {
                    body,
                    condition,
                    loc: *loc,
                }
            }
            Stmt::If {
                condition,
                then_block,
                elseif_blocks,
                else_block,
                loc,
            } => self.check_if(condition, then_block, elseif_blocks, else_block.as_deref(), *loc),
            Stmt::ForNum {
                decl,
                start,
                limit,
                step,
                body,
                loc,
            } => self.check_for_num(decl, start, limit, step.as_ref(), body, *loc),
            Stmt::ForIn {
                decls,
                values,
                body,
                loc,
            } => self.check_for_in(decls, values, body, *loc),
            Stmt::Return { values, loc } => self.check_return(values, *loc),
            Stmt::Break { loc } => {
                if self.loop_depth == 0 {
                    self.error(TypeError::BreakOutsideLoop, *loc);
                }
                TypedStmt::Break { loc: *loc }
            }
        }
    }

    /// `local a: T, b = e1, e2`, at any level.
    ///
    /// Values are checked before any of the names is declared.
    pub(super) fn check_local_decl(
        &mut self,
        decls: &[Decl],
        values: &[Expr],
        loc: Location,
    ) -> (Vec<TypedDecl>, Vec<TypedExpr>) {
        let annotated: Vec<Option<TcType>> = decls
            .iter()
            .map(|decl| decl.ty.as_ref().map(|ty| self.type_from_ast(ty, decl.loc)))
            .collect();

        let (values, produced) = if values.is_empty() {
            for (decl, ty) in decls.iter().zip(&annotated) {
                if ty.is_none() {
                    self.error(
                        TypeError::MissingVarAnnotation {
                            name: decl.name.clone(),
                        },
                        decl.loc,
                    );
                }
            }
            (Vec::new(), Vec::new())
        } else {
            let list = self.check_value_list(values, &annotated, |i| {
                Site::Declaration(decls.get(i).map(|d| d.name.clone()).unwrap_or_default())
            });
            if list.arity_mismatch(decls.len()) {
                self.error(
                    TypeError::AssignArity {
                        expected: decls.len(),
                        found: list.count(),
                    },
                    loc,
                );
            }
            let ValueList { values, types, .. } = list;
            (values, types)
        };

        let typed: Vec<TypedDecl> = decls
            .iter()
            .zip(annotated)
            .enumerate()
            .map(|(i, (decl, annotation))| {
                let ty = match annotation {
                    Some(ty) => ty,
                    // Only the module variable may hold the module
                    None => match produced.get(i) {
                        Some(TcType::Module(_)) => {
                            self.error(TypeError::MisplacedModuleType, decl.loc);
                            TcType::Unknown
                        }
                        Some(ty) => ty.clone(),
                        None => TcType::Unknown,
                    },
                };
                TypedDecl::new(&decl.name, ty, decl.loc)
            })
            .collect();
        for decl in &typed {
            self.declare_local(&decl.name, decl.ty.clone(), decl.loc);
        }
        (typed, values)
    }

    /// `a, t.x, arr[i] = e1, e2, e3`
    pub(super) fn check_assignment(
        &mut self,
        targets: &[Expr],
        values: &[Expr],
        loc: Location,
    ) -> (Vec<TypedLValue>, Vec<TypedExpr>) {
        let lvalues: Vec<Option<TypedLValue>> =
            targets.iter().map(|target| self.check_lvalue(target)).collect();
        let expected: Vec<Option<TcType>> = lvalues
            .iter()
            .map(|lvalue| Some(lvalue.as_ref().map_or(TcType::Unknown, |lv| lv.ty().clone())))
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
        (lvalues.into_iter().flatten().collect(), list.values)
    }

    /// Resolve an assignment target. `None` means an error was reported.
    pub(super) fn check_lvalue(&mut self, target: &Expr) -> Option<TypedLValue> {
        match target {
            Expr::Name { name, loc } => match self.scopes.lookup(name) {
                Some(Resolved::Var(info)) => {
                    let (ty, kind) = (info.ty.clone(), info.kind);
                    match kind {
                        VarKind::Local => Some(TypedLValue::Local {
                            name: name.clone(),
                            ty,
                        }),
                        VarKind::Toplevel => Some(TypedLValue::Toplevel {
                            name: name.clone(),
                            ty,
                        }),
                        VarKind::Module => {
                            self.error(TypeError::AssignToModule { name: name.clone() }, *loc);
                            None
                        }
                    }
                }
                Some(Resolved::Builtin(_) | Resolved::Library(_)) => {
                    self.error(TypeError::AssignToBuiltin { name: name.clone() }, *loc);
                    None
                }
                None => {
                    self.error(TypeError::UndeclaredName { name: name.clone() }, *loc);
                    None
                }
            },
            Expr::Field { object, field, loc } => {
                if let Expr::Name { name, .. } = &**object
                    && matches!(self.scopes.lookup(name), Some(Resolved::Library(_)))
                {
                    self.error(
                        TypeError::AssignToLibraryField {
                            library: name.clone(),
                            field: field.clone(),
                        },
                        *loc,
                    );
                    return None;
                }
                let typed = self.check_field(object, field, *loc);
                match typed.kind {
                    TypedExprKind::ModuleField { module, field } => Some(TypedLValue::ModuleField {
                        module,
                        field,
                        ty: typed.ty,
                    }),
                    TypedExprKind::Field { object, field } => Some(TypedLValue::Field {
                        object: *object,
                        field,
                        ty: typed.ty,
                    }),
                    _ => None,
                }
            }
            Expr::Index { object, index, loc } => {
                let typed = self.check_index(object, index, *loc);
                match typed.kind {
                    TypedExprKind::Index { array, index } => Some(TypedLValue::Index {
                        array: *array,
                        index: *index,
                        ty: typed.ty,
                    }),
                    _ => None,
                }
            }
            other => {
                self.error(TypeError::InvalidAssignTarget, other.loc());
                None
            }
        }
    }

    fn check_loop_body(&mut self, body: &[Stmt]) -> Vec<TypedStmt> {
        self.loop_depth += 1;
        let body = self.check_stmts(body);
        self.loop_depth -= 1;
        body
    }

    fn check_if(
        &mut self,
        condition: &Expr,
        then_block: &[Stmt],
        elseif_blocks: &[(Expr, Vec<Stmt>)],
        else_block: Option<&[Stmt]>,
        loc: Location,
    ) -> TypedStmt {
        let condition = self.expect_expr(condition, &TcType::Boolean, Site::Condition("if"));
        let then_block = self.check_block(then_block);
        let mut arms = Vec::with_capacity(elseif_blocks.len());
        for (cond, block) in elseif_blocks {
            let cond = self.expect_expr(cond, &TcType::Boolean, Site::Condition("elseif"));
            arms.push((cond, self.check_block(block)));
        }
        let mut else_block = else_block
            .map(|block| self.check_block(block))
            .unwrap_or_default();

        for (cond, block) in arms.into_iter().rev() {
            let loc = cond.loc;
            else_block = vec![TypedStmt::If {
                condition: cond,
                then_block: block,
                else_block,
                loc,
            }];
        }
        TypedStmt::If {
            condition,
            then_block,
            else_block,
            loc,
        }
    }

    fn check_for_num(
        &mut self,
        decl: &Decl,
        start: &Expr,
        limit: &Expr,
        step: Option<&Expr>,
        body: &[Stmt],
        loc: Location,
    ) -> TypedStmt {
        let (start, mut ty) = match &decl.ty {
            Some(annotation) => {
                let ty = self.type_from_ast(annotation, decl.loc);
                (self.expect_expr(start, &ty, Site::ForStart), ty)
            }
            None => {
                let start = self.check_expr(start);
                let ty = start.ty.clone();
                (start, ty)
            }
        };
        if !ty.is_numeric() && !ty.is_unknown() {
            self.error(
                TypeError::ControlVariableType {
                    name: decl.name.clone(),
                    ty: ty.clone(),
                },
                decl.loc,
            );
            ty = TcType::Unknown;
        }

        let limit = self.expect_expr(limit, &ty, Site::ForLimit);
        let step = match step {
            Some(step) => self.expect_expr(step, &ty, Site::ForStep),
            None if ty == TcType::Float => TypedExpr::new(TypedExprKind::Float(1.0), ty.clone(), loc),
            None => TypedExpr::new(TypedExprKind::Integer(1), ty.clone(), loc),
        };

        self.push_scope();
        self.declare(&decl.name, ty.clone(), VarKind::Local, decl.loc);
        let body = self.check_loop_body(body);
        self.pop_scope();

        TypedStmt::ForNum {
            decl: TypedDecl::new(&decl.name, ty, decl.loc),
            start,
            limit,
            step,
            body,
            loc,
        }
    }

    fn check_for_in(
        &mut self,
        decls: &[Decl],
        values: &[Expr],
        body: &[Stmt],
        loc: Location,
    ) -> TypedStmt {
        let (iterator, produced) = match self.ipairs_call(values) {
            Some((args, call_loc)) => self.check_ipairs(args, call_loc),
            None => self.check_iterator(values, loc),
        };
        let decls = self.loop_variables(decls, produced, loc);

        self.push_scope();
        for decl in &decls {
            self.declare(&decl.name, decl.ty.clone(), VarKind::Local, decl.loc);
        }
        let body = self.check_loop_body(body);
        self.pop_scope();

        TypedStmt::ForIn {
            decls,
            iterator,
            body,
            loc,
        }
    }

    /// Arguments of `ipairs(...)` when it is the sole loop expression and
    /// still refers to the builtin.
    fn ipairs_call<'e>(&self, values: &'e [Expr]) -> Option<(&'e [Expr], Location)> {
        let [Expr::Call { callee, args, loc }] = values else {
            return None;
        };
        let Expr::Name { name, .. } = &**callee else {
            return None;
        };
        if name != IPAIRS || !matches!(self.scopes.lookup(name), Some(Resolved::Builtin(_))) {
            return None;
        }
        Some((args, *loc))
    }

    fn check_ipairs(
        &mut self,
        args: &[Expr],
        loc: Location,
    ) -> (TypedForIn, Option<Vec<TcType>>) {
        let mut typed: Vec<TypedExpr> = args.iter().map(|arg| self.check_expr(arg)).collect();
        if typed.len() != 1 {
            self.error(
                TypeError::CallArity {
                    expected: 1,
                    found: typed.len(),
                },
                loc,
            );
        }
        if typed.is_empty() {
            return (TypedForIn::Generic { values: typed }, None);
        }
        let array = typed.swap_remove(0);
        let elem = match &array.ty {
            TcType::Array(elem) => Some((**elem).clone()),
            TcType::Unknown => None,
            other => {
                self.error(
                    TypeError::NotAnArray {
                        ty: other.clone(),
                        site: Site::IpairsArgument,
                    },
                    array.loc,
                );
                None
            }
        };
        let produced = elem.map(|elem| vec![TcType::Integer, elem]);
        (TypedForIn::Ipairs { array }, produced)
    }

    /// The generic iteration protocol: an iterator function of two
    /// parameters, a state value and a control value.
    fn check_iterator(
        &mut self,
        values: &[Expr],
        loc: Location,
    ) -> (TypedForIn, Option<Vec<TcType>>) {
        let mut typed = Vec::with_capacity(values.len());
        // Produced types, with the index of the expression when it yields
        // exactly that one value
        let mut flat: Vec<(TcType, Option<usize>)> = Vec::new();
        // Index of a trailing call spread over several slots, and its first slot
        let mut expanded = None;
        let mut unknown_arity = false;
        for (i, expr) in values.iter().enumerate() {
            if i + 1 == values.len() && expr.is_call() {
                let call = self.check_multi_expr(expr);
                let returns = call.value_types();
                unknown_arity |= returns.iter().any(TcType::is_unknown);
                if returns.len() == 1 {
                    flat.push((returns[0].clone(), Some(typed.len())));
                } else {
                    if returns.len() > 1 {
                        expanded = Some((typed.len(), flat.len()));
                    }
                    flat.extend(returns.into_iter().map(|ty| (ty, None)));
                }
                typed.push(call);
            } else {
                let value = self.check_expr(expr);
                flat.push((value.ty.clone(), Some(typed.len())));
                typed.push(value);
            }
        }

        let iterator = flat.first().map_or(TcType::Nil, |(ty, _)| ty.clone());
        let (params, returns) = match iterator {
            TcType::Function { params, returns } => (params, returns),
            TcType::Unknown => return (TypedForIn::Generic { values: typed }, None),
            other => {
                self.error(TypeError::NotAnIterator { ty: other }, loc);
                return (TypedForIn::Generic { values: typed }, None);
            }
        };
        if params.len() != 2 {
            self.error(TypeError::IteratorArity { found: params.len() }, loc);
            return (TypedForIn::Generic { values: typed }, Some(returns));
        }

        if !unknown_arity {
            match flat.len() {
                0 | 1 => self.error(TypeError::MissingLoopState, loc),
                2 => self.error(TypeError::MissingLoopControl, loc),
                3 => {}
                found => self.error(TypeError::TooManyLoopValues { found }, loc),
            }
        }

        let slot_site = |slot: usize| match slot {
            1 => Some((params[0].clone(), Site::ForInState)),
            2 => Some((params[1].clone(), Site::ForInControl)),
            _ => None,
        };
        for slot in [1, 2] {
            let (Some((_, Some(index))), Some((param, site))) = (flat.get(slot), slot_site(slot))
            else {
                continue;
            };
            let placeholder = TypedExpr::new(TypedExprKind::Nil, TcType::Nil, loc);
            let value = std::mem::replace(&mut typed[*index], placeholder);
            typed[*index] = self.coerce(value, &param, site);
        }
        if let Some((index, first_slot)) = expanded {
            let placeholder = TypedExpr::new(TypedExprKind::Nil, TcType::Nil, loc);
            let call = std::mem::replace(&mut typed[index], placeholder);
            typed[index] = self.expand_call(call, |j| slot_site(first_slot + j));
        }

        (TypedForIn::Generic { values: typed }, Some(returns))
    }

    /// Types of the loop variables from what the iterator produces.
    ///
    /// Annotations follow the usual coercion rule: they must match the
    /// produced type unless one of the two is `any`.
    fn loop_variables(
        &mut self,
        decls: &[Decl],
        produced: Option<Vec<TcType>>,
        loc: Location,
    ) -> Vec<TypedDecl> {
        if let Some(produced) = &produced
            && produced.len() != decls.len()
        {
            self.error(
                TypeError::LoopVarCount {
                    expected: produced.len(),
                    found: decls.len(),
                },
                loc,
            );
        }
        let produced = produced.unwrap_or_default();

        decls
            .iter()
            .enumerate()
            .map(|(i, decl)| {
                let found = produced.get(i).cloned().unwrap_or(TcType::Unknown);
                let Some(annotation) = &decl.ty else {
                    return TypedDecl::new(&decl.name, found, decl.loc);
                };
                let annotated = self.type_from_ast(annotation, decl.loc);
                let mut typed = TypedDecl::new(&decl.name, annotated, decl.loc);
                if found.is_compatible(&typed.ty) {
                    return typed;
                }
                if found == TcType::Any || typed.ty == TcType::Any {
                    typed.implicit_cast = true;
                } else {
                    self.error(
                        TypeError::TypeMismatch {
                            expected: typed.ty.clone(),
                            found,
                            site: Site::LoopVariable(decl.name.clone()),
                        },
                        decl.loc,
                    );
                }
                typed
            })
            .collect()
    }

    fn check_return(&mut self, values: &[Expr], loc: Location) -> TypedStmt {
        let expected = self
            .function
            .as_ref()
            .map(|function| function.returns.clone())
            .unwrap_or_default();
        let want: Vec<Option<TcType>> = expected.iter().cloned().map(Some).collect();
        let list = self.check_value_list(values, &want, |i| Site::ReturnValue(i + 1));
        if list.arity_mismatch(expected.len()) {
            self.error(
                TypeError::ReturnArity {
                    expected: expected.len(),
                    found: list.count(),
                },
                loc,
            );
        }
        TypedStmt::Return {
            values: list.values,
            loc,
        }
    }
}

/// Whether every path through `stmts` ends in a `return`.
pub(super) fn block_returns(stmts: &[Stmt]) -> bool {
    match stmts.last() {
        Some(Stmt::Return { .. }) => true,
        Some(Stmt::Do { body, .. }) => block_returns(body),
        Some(Stmt::If {
            then_block,
            elseif_blocks,
            else_block,
            ..
        }) => {
            block_returns(then_block)
                && elseif_blocks.iter().all(|(_, block)| block_returns(block))
                && else_block.as_deref().is_some_and(block_returns)
        }
        _ => false,
    }
}
