//! Tests for the type checker.
//!
//! This module tests that the type checker:
//! 1. Accepts well-typed modules and assembles their exports
//! 2. Rejects each rule violation with its own diagnostic
//! 3. Keeps going after an error so independent mistakes are all reported

use lunic_core::ast::{BinaryOp, Decl, FuncDecl, FuncName, Location, Stmt, Toplevel, Type, UnaryOp};
use lunic_core::diagnostics::DiagnosticKind;
use lunic_core::test_utils::*;
use lunic_core::typed_ast::{TypedExprKind, TypedForIn, TypedFuncName, TypedStmt, TypedToplevel};
use lunic_core::{
    Builtins, CheckOptions, CheckedModule, Program, TcType, TypecheckResult, typecheck_program,
    typecheck_program_with,
};

/// Check `items` wrapped in `local m: module = {} ... return m`.
fn check(items: Vec<Toplevel>) -> TypecheckResult<CheckedModule> {
    typecheck_program(&in_module(items))
}

/// Check a body inside `function m.f()`.
fn check_body(params: Vec<Decl>, body: Vec<Stmt>) -> TypecheckResult<CheckedModule> {
    check(vec![module_func("m", "f", params, vec![], body)])
}

fn error_messages(result: TypecheckResult<CheckedModule>) -> Vec<String> {
    match result {
        Ok(_) => panic!("expected type errors, program was accepted"),
        Err(errors) => errors.into_iter().map(|d| d.message).collect(),
    }
}

fn assert_ok(result: TypecheckResult<CheckedModule>) -> CheckedModule {
    match result {
        Ok(module) => module,
        Err(errors) => panic!(
            "expected success, got:\n{}",
            errors
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

/// Exactly one diagnostic, containing `needle`.
fn assert_single_error(result: TypecheckResult<CheckedModule>, needle: &str) {
    let errors = error_messages(result);
    assert_eq!(errors.len(), 1, "expected one error, got {errors:?}");
    assert!(
        errors[0].contains(needle),
        "error should contain {needle:?}, got: {}",
        errors[0]
    );
}

fn assert_has_error(result: TypecheckResult<CheckedModule>, needle: &str) {
    let errors = error_messages(result);
    assert!(
        errors.iter().any(|e| e.contains(needle)),
        "expected an error containing {needle:?}, got {errors:?}"
    );
}

fn point() -> Toplevel {
    record("Point", vec![("x", Type::Float), ("y", Type::Float)])
}

// End-to-end programs

#[test]
fn test_duplicate_module_function_cites_first_line() {
    let prog = program(vec![
        module_decl("m"),
        module_func("m", "f", vec![], vec![], vec![]),
        module_func("m", "f", vec![], vec![], vec![]),
        return_module("m"),
    ]);
    let errors = typecheck_program(&prog).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "duplicate module field 'f', previous one at line 2");
    assert_eq!(errors[0].location.line, 3);
    assert_eq!(errors[0].related, Some(Location::new(2, 1)));
    assert_eq!(errors[0].kind, DiagnosticKind::DuplicateDeclaration);
}

#[test]
fn test_not_nil_is_rejected() {
    let result = check(vec![module_func(
        "m",
        "fn",
        vec![],
        vec![Type::Boolean],
        vec![ret(vec![unop(UnaryOp::Not, nil())])],
    )]);
    assert_single_error(result, "operand of 'not' operator has type nil");
}

#[test]
fn test_cast_between_concrete_types_is_rejected() {
    let result = check(vec![module_func(
        "m",
        "fn",
        vec![param("a", Type::Integer)],
        vec![],
        vec![ret(vec![cast(name("a"), Type::Float)])],
    )]);
    assert_has_error(result, "cannot cast 'integer' to 'float'");
}

#[test]
fn test_indexing_a_non_array_is_rejected() {
    let result = check_body(
        vec![param("t", Type::Integer)],
        vec![assign(vec![index(name("t"), int(1))], vec![int(2)])],
    );
    assert_single_error(result, "expected array but found integer in array indexing");
}

#[test]
fn test_module_of_functions_is_accepted() {
    let module = assert_ok(check(vec![
        module_func(
            "m",
            "add",
            vec![param("a", Type::Integer), param("b", Type::Integer)],
            vec![Type::Integer],
            vec![ret(vec![binop(name("a"), BinaryOp::Add, name("b"))])],
        ),
        module_func("m", "hello", vec![], vec![], vec![call_stmt(call(
            name("print"),
            vec![string("hello")],
        ))]),
    ]));
    assert_eq!(module.module_name, "m");
    assert_eq!(module.exports.keys().collect::<Vec<_>>(), vec!["add", "hello"]);
    assert_eq!(
        module.exports["add"].to_string(),
        "(integer, integer) -> (integer)"
    );
    assert_eq!(module.module_type().to_string(), "module");
}

// Casts

fn sample_types() -> Vec<Type> {
    vec![
        Type::Nil,
        Type::Boolean,
        Type::Integer,
        Type::Float,
        Type::String,
        array_of(Type::Integer),
        named_type("Point"),
    ]
}

#[test]
fn test_casts_between_distinct_types_are_rejected() {
    for (i, from) in sample_types().into_iter().enumerate() {
        for (j, to) in sample_types().into_iter().enumerate() {
            if i == j {
                continue;
            }
            let result = check(vec![
                point(),
                module_func(
                    "m",
                    "f",
                    vec![param("a", from.clone())],
                    vec![],
                    vec![local(vec![decl("b", Some(to.clone()))], vec![cast(name("a"), to)])],
                ),
            ]);
            assert_single_error(result, "cannot cast");
        }
    }
}

#[test]
fn test_casts_to_and_from_any_are_accepted() {
    for ty in sample_types() {
        assert_ok(check(vec![
            point(),
            module_func(
                "m",
                "to_any",
                vec![param("a", ty.clone())],
                vec![],
                vec![local(vec![decl("b", Some(Type::Any))], vec![cast(name("a"), Type::Any)])],
            ),
            module_func(
                "m",
                "from_any",
                vec![param("a", Type::Any)],
                vec![],
                vec![local(vec![decl("b", Some(ty.clone()))], vec![cast(name("a"), ty)])],
            ),
        ]));
    }
}

// Equality

fn compare(left: Type, right: Type, op: BinaryOp) -> TypecheckResult<CheckedModule> {
    check(vec![
        point(),
        module_func(
            "m",
            "f",
            vec![param("a", left), param("b", right)],
            vec![],
            vec![local(
                vec![decl("r", Some(Type::Boolean))],
                vec![binop(name("a"), op, name("b"))],
            )],
        ),
    ])
}

#[test]
fn test_equality_between_identical_types() {
    for ty in sample_types() {
        assert_ok(compare(ty.clone(), ty.clone(), BinaryOp::Eq));
        assert_ok(compare(ty.clone(), ty, BinaryOp::Ne));
    }
}

#[test]
fn test_equality_between_integer_and_float() {
    assert_ok(compare(Type::Integer, Type::Float, BinaryOp::Eq));
    assert_ok(compare(Type::Float, Type::Integer, BinaryOp::Ne));
}

#[test]
fn test_equality_between_other_types_is_rejected() {
    let types = sample_types();
    for (i, left) in types.iter().enumerate() {
        for (j, right) in types.iter().enumerate() {
            let numeric_mix = matches!(
                (left, right),
                (Type::Integer, Type::Float) | (Type::Float, Type::Integer)
            );
            if i == j || numeric_mix {
                continue;
            }
            assert_single_error(
                compare(left.clone(), right.clone(), BinaryOp::Eq),
                "cannot compare",
            );
        }
    }
    assert_single_error(
        compare(Type::String, Type::Boolean, BinaryOp::Ne),
        "cannot compare string and boolean using '~='",
    );
}

// Logical operators

#[test]
fn test_and_or_require_booleans_on_both_sides() {
    let comparison = || binop(name("x"), BinaryOp::Lt, int(2));
    let cases = [
        (
            binop(comparison(), BinaryOp::And, int(1)),
            "right hand side of 'and' operator has type integer",
        ),
        (
            binop(int(1), BinaryOp::Or, comparison()),
            "left hand side of 'or' operator has type integer",
        ),
        (
            binop(boolean(true), BinaryOp::And, nil()),
            "right hand side of 'and' operator has type nil",
        ),
        (
            binop(comparison(), BinaryOp::Or, binop(boolean(true), BinaryOp::And, string("s"))),
            "right hand side of 'and' operator has type string",
        ),
    ];
    for (expr, expected) in cases {
        let result = check_body(
            vec![param("x", Type::Integer)],
            vec![local(vec![decl("r", Some(Type::Boolean))], vec![expr])],
        );
        assert_single_error(result, expected);
    }
}

#[test]
fn test_and_or_on_booleans_are_accepted() {
    assert_ok(check_body(
        vec![param("a", Type::Boolean), param("b", Type::Boolean)],
        vec![local(
            vec![decl("r", Some(Type::Boolean))],
            vec![binop(
                binop(name("a"), BinaryOp::And, name("b")),
                BinaryOp::Or,
                unop(UnaryOp::Not, name("a")),
            )],
        )],
    ));
}

// Composite literals

#[test]
fn test_record_literal_requires_type_hint() {
    let result = check(vec![
        point(),
        local_var(
            vec![decl("p", None)],
            vec![table_init(vec![("x", float(1.0)), ("y", float(2.0))])],
        ),
    ]);
    assert_single_error(result, "missing type hint for array or table initializer");
}

#[test]
fn test_record_literal_with_type_hint() {
    assert_ok(check(vec![
        point(),
        local_var(
            vec![decl("p", Some(named_type("Point")))],
            vec![table_init(vec![("x", float(1.0)), ("y", float(2.0))])],
        ),
    ]));
}

#[test]
fn test_record_literal_field_errors() {
    let cases = vec![
        (
            table_init(vec![("x", float(1.0))]),
            "required field 'y' is missing in initializer for Point",
        ),
        (
            table_init(vec![("x", float(1.0)), ("x", float(2.0)), ("y", float(1.0))]),
            "duplicate field 'x' in table initializer",
        ),
        (
            table_init(vec![("x", float(1.0)), ("y", float(1.0)), ("z", float(1.0))]),
            "invalid field 'z' in initializer for Point",
        ),
        (
            table_init(vec![("x", int(1)), ("y", float(1.0))]),
            "expected float but found integer in field 'x' of initializer",
        ),
    ];
    for (literal, expected) in cases {
        let result = check(vec![
            point(),
            local_var(vec![decl("p", Some(named_type("Point")))], vec![literal]),
        ]);
        assert_single_error(result, expected);
    }
}

#[test]
fn test_positional_field_in_record_literal() {
    let literal = init_list(vec![
        lunic_core::ast::InitField::Positional(float(1.0)),
        named("x", float(1.0)),
        named("y", float(2.0)),
    ]);
    let result = check(vec![
        point(),
        local_var(vec![decl("p", Some(named_type("Point")))], vec![literal]),
    ]);
    assert_single_error(result, "positional field in initializer for Point");
}

#[test]
fn test_table_literal() {
    let ty = table_of(vec![("name", Type::String), ("age", Type::Integer)]);
    assert_ok(check(vec![local_var(
        vec![decl("t", Some(ty.clone()))],
        vec![table_init(vec![("age", int(3)), ("name", string("x"))])],
    )]));
    assert_single_error(
        check(vec![local_var(
            vec![decl("t", Some(ty))],
            vec![table_init(vec![("name", string("x"))])],
        )]),
        "required field 'age' is missing in initializer for { name: string, age: integer }",
    );
}

#[test]
fn test_array_literals() {
    assert_ok(check(vec![local_var(
        vec![decl("a", Some(array_of(array_of(Type::Integer))))],
        vec![array_init(vec![array_init(vec![int(1)]), array_init(vec![int(2), int(3)])])],
    )]));
    assert_single_error(
        check(vec![local_var(
            vec![decl("a", Some(array_of(Type::Integer)))],
            vec![array_init(vec![int(1), string("x")])],
        )]),
        "expected integer but found string in array initializer",
    );
    assert_single_error(
        check(vec![local_var(
            vec![decl("a", Some(array_of(Type::Integer)))],
            vec![table_init(vec![("x", int(1))])],
        )]),
        "named field 'x' in array initializer",
    );
    assert_single_error(
        check(vec![local_var(
            vec![decl("n", Some(Type::Integer))],
            vec![array_init(vec![])],
        )]),
        "type hint for initializer is not an array, table or record type: integer",
    );
}

#[test]
fn test_any_array_elements_are_cast() {
    let module = assert_ok(check(vec![local_var(
        vec![decl("a", Some(array_of(Type::Any)))],
        vec![array_init(vec![int(1), string("x")])],
    )]));
    let TypedToplevel::Var { values, .. } = &module.program.items[1] else {
        panic!("expected a variable declaration");
    };
    let TypedExprKind::ArrayInit(items) = &values[0].kind else {
        panic!("expected an array initializer");
    };
    for item in items {
        assert!(matches!(item.kind, TypedExprKind::Cast { implicit: true, .. }));
        assert_eq!(item.ty, TcType::Any);
    }
}

// Declarations and scopes

#[test]
fn test_missing_annotation_without_initializer() {
    assert_single_error(
        check(vec![local_var(vec![decl("x", None)], vec![])]),
        "missing type annotation for variable 'x'",
    );
    assert_ok(check(vec![local_var(vec![decl("x", Some(Type::Integer))], vec![])]));
}

#[test]
fn test_initializer_cannot_see_its_own_declaration() {
    assert_single_error(
        check(vec![local_var(vec![decl("x", Some(Type::Integer))], vec![name("x")])]),
        "variable 'x' is not declared",
    );
    assert_single_error(
        check(vec![local_var(
            vec![decl("a", None), decl("b", None)],
            vec![int(1), name("a")],
        )]),
        "variable 'a' is not declared",
    );
}

#[test]
fn test_toplevel_redeclaration_is_rejected() {
    let errors = check(vec![
        local_var(vec![decl("x", None)], vec![int(1)]),
        local_var(vec![decl("x", None)], vec![int(2)]),
    ])
    .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "duplicate toplevel declaration for 'x', previous one at line 2"
    );
}

#[test]
fn test_nested_shadowing_is_allowed() {
    assert_ok(check_body(
        vec![param("x", Type::Integer)],
        vec![
            local(vec![decl("x", None)], vec![string("shadow")]),
            local(vec![decl("y", None)], vec![int(1)]),
            local(vec![decl("y", None)], vec![float(2.0)]),
            do_block(vec![local(vec![decl("x", Some(Type::Boolean))], vec![boolean(true)])]),
            local(vec![decl("s", Some(Type::String))], vec![name("x")]),
        ],
    ));
}

#[test]
fn test_block_locals_are_not_visible_afterwards() {
    assert_single_error(
        check_body(
            vec![],
            vec![
                do_block(vec![local(vec![decl("z", None)], vec![int(1)])]),
                local(vec![decl("w", None)], vec![name("z")]),
            ],
        ),
        "variable 'z' is not declared",
    );
}

#[test]
fn test_toplevel_names_are_recorded() {
    let module = assert_ok(check(vec![
        local_var(vec![decl("x", None)], vec![int(1)]),
        local_func("helper", vec![], vec![], vec![]),
    ]));
    assert_eq!(module.toplevel.keys().collect::<Vec<_>>(), vec!["m", "x", "helper"]);
    assert_eq!(module.toplevel["x"], TcType::Integer);
}

#[test]
fn test_missing_parameter_annotation() {
    assert_single_error(
        check_body(vec![decl("p", None)], vec![]),
        "missing type annotation for parameter 'p'",
    );
}

// Builtins

#[test]
fn test_assigning_builtins_is_rejected() {
    assert_single_error(
        check(vec![toplevel_assign(vec![name("print")], vec![int(1)])]),
        "cannot assign to builtin 'print'",
    );
    assert_single_error(
        check_body(
            vec![],
            vec![assign(vec![field(name("math"), "pi")], vec![float(3.0)])],
        ),
        "cannot assign to builtin library field 'math.pi'",
    );
}

#[test]
fn test_library_access() {
    assert_ok(check_body(
        vec![],
        vec![
            local(
                vec![decl("r", Some(Type::Float))],
                vec![call(field(name("math"), "sqrt"), vec![float(2.0)])],
            ),
            local(vec![decl("n", Some(Type::Integer))], vec![field(name("math"), "maxinteger")]),
            call_stmt(call(field(name("io"), "write"), vec![string("x")])),
        ],
    ));
    assert_single_error(
        check(vec![local_var(vec![decl("x", None)], vec![name("math")])]),
        "library 'math' can only be used through member access",
    );
    assert_single_error(
        check_body(
            vec![],
            vec![call_stmt(call(field(name("math"), "floor"), vec![float(1.0)]))],
        ),
        "'floor' is not a member of library 'math'",
    );
}

#[test]
fn test_builtins_can_be_shadowed() {
    assert_ok(check(vec![
        local_var(vec![decl("print", Some(Type::Integer))], vec![int(1)]),
        module_func(
            "m",
            "f",
            vec![],
            vec![],
            vec![assign(vec![name("print")], vec![int(2)])],
        ),
    ]));
}

// Calls and returns

fn two() -> Toplevel {
    local_func(
        "two",
        vec![],
        vec![Type::Integer, Type::String],
        vec![ret(vec![int(1), string("a")])],
    )
}

fn void() -> Toplevel {
    local_func("void", vec![], vec![], vec![])
}

#[test]
fn test_call_arity_and_argument_types() {
    let takes_int = local_func("g", vec![param("x", Type::Integer)], vec![], vec![]);
    assert_single_error(
        check(vec![
            takes_int.clone(),
            module_func("m", "f", vec![], vec![], vec![call_stmt(call(
                name("g"),
                vec![int(1), int(2)],
            ))]),
        ]),
        "function expects 1 argument(s) but received 2",
    );
    assert_single_error(
        check(vec![
            takes_int,
            module_func("m", "f", vec![], vec![], vec![call_stmt(call(
                name("g"),
                vec![string("x")],
            ))]),
        ]),
        "expected integer but found string in argument 1",
    );
}

#[test]
fn test_calling_a_non_function() {
    assert_single_error(
        check(vec![
            local_var(vec![decl("x", None)], vec![int(1)]),
            module_func("m", "f", vec![], vec![], vec![call_stmt(call(name("x"), vec![]))]),
        ]),
        "attempting to call a integer value",
    );
}

#[test]
fn test_void_call_used_as_value() {
    assert_single_error(
        check(vec![
            void(),
            module_func("m", "f", vec![], vec![], vec![local(
                vec![decl("x", None)],
                vec![call(name("void"), vec![])],
            )]),
        ]),
        "void function call used where a value is expected",
    );
    assert_single_error(
        check(vec![
            void(),
            module_func("m", "f", vec![], vec![], vec![local(
                vec![decl("x", Some(Type::Integer))],
                vec![binop(int(1), BinaryOp::Add, call(name("void"), vec![]))],
            )]),
        ]),
        "void function call used where a value is expected",
    );
}

#[test]
fn test_multiple_results_expand_in_last_position() {
    let takes_two = local_func(
        "takes_two",
        vec![param("a", Type::Integer), param("b", Type::String)],
        vec![],
        vec![],
    );
    assert_ok(check(vec![
        two(),
        takes_two,
        module_func(
            "m",
            "f",
            vec![],
            vec![Type::Integer, Type::String],
            vec![
                call_stmt(call(name("takes_two"), vec![call(name("two"), vec![])])),
                local(vec![decl("a", None), decl("b", None)], vec![call(name("two"), vec![])]),
                local(vec![decl("s", Some(Type::String))], vec![name("b")]),
                ret(vec![call(name("two"), vec![])]),
            ],
        ),
    ]));
}

#[test]
fn test_expanded_results_are_checked_per_position() {
    assert_single_error(
        check(vec![
            two(),
            local_var(
                vec![decl("a", Some(Type::Integer)), decl("b", Some(Type::Integer))],
                vec![call(name("two"), vec![])],
            ),
        ]),
        "expected integer but found string in declaration of 'b'",
    );
    assert_single_error(
        check(vec![
            two(),
            local_var(
                vec![decl("a", None), decl("b", None), decl("c", None)],
                vec![call(name("two"), vec![])],
            ),
        ]),
        "left-hand side expects 3 value(s) but right-hand side produces 2",
    );
}

#[test]
fn test_expanded_results_are_cast_to_any() {
    let module = assert_ok(check(vec![
        two(),
        local_var(
            vec![decl("a", Some(Type::Any)), decl("b", Some(Type::Any))],
            vec![call(name("two"), vec![])],
        ),
    ]));
    let TypedToplevel::Var { values, .. } = &module.program.items[2] else {
        panic!("expected a variable group");
    };
    let TypedExprKind::Expand { call: expand_call, values: results } = &values[0].kind else {
        panic!("expected the call to be expanded, got {:?}", values[0].kind);
    };
    assert!(matches!(expand_call.kind, TypedExprKind::Call { .. }));
    assert_eq!(results.len(), 2);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.ty, TcType::Any);
        let TypedExprKind::Cast { expr, implicit: true } = &result.kind else {
            panic!("expected an implicit cast, got {:?}", result.kind);
        };
        assert!(matches!(expr.kind, TypedExprKind::CallResult(j) if j == i));
    }

    let takes_any = local_func(
        "takes_any",
        vec![param("a", Type::Any), param("b", Type::Any)],
        vec![],
        vec![],
    );
    assert_ok(check(vec![
        two(),
        takes_any,
        module_func(
            "m",
            "f",
            vec![],
            vec![Type::Any, Type::String],
            vec![
                call_stmt(call(name("takes_any"), vec![call(name("two"), vec![])])),
                ret(vec![call(name("two"), vec![])]),
            ],
        ),
    ]));
}

#[test]
fn test_calls_before_the_last_position_are_truncated() {
    let module = assert_ok(check(vec![
        two(),
        local_var(
            vec![decl("a", None), decl("b", None)],
            vec![call(name("two"), vec![]), int(1)],
        ),
    ]));
    assert_eq!(module.toplevel["a"], TcType::Integer);
    assert_eq!(module.toplevel["b"], TcType::Integer);

    let module = assert_ok(check(vec![
        two(),
        local_var(vec![decl("p", None)], vec![paren(call(name("two"), vec![]))]),
    ]));
    assert_eq!(module.toplevel["p"], TcType::Integer);
}

#[test]
fn test_return_arity_and_types() {
    assert_single_error(
        check(vec![module_func("m", "f", vec![], vec![Type::Integer], vec![ret(vec![])])]),
        "returning 0 value(s) but function expects 1",
    );
    assert_single_error(
        check(vec![module_func(
            "m",
            "f",
            vec![],
            vec![Type::Integer],
            vec![ret(vec![string("s")])],
        )]),
        "expected integer but found string in return value 1",
    );
}

#[test]
fn test_missing_return() {
    assert_single_error(
        check(vec![module_func("m", "f", vec![], vec![Type::Integer], vec![])]),
        "control reaches end of function with non-empty return type",
    );
    assert_ok(check(vec![module_func(
        "m",
        "sign",
        vec![param("x", Type::Integer)],
        vec![Type::Integer],
        vec![if_stmt(
            binop(name("x"), BinaryOp::Lt, int(0)),
            vec![ret(vec![int(-1)])],
            vec![(binop(name("x"), BinaryOp::Eq, int(0)), vec![ret(vec![int(0)])])],
            Some(vec![ret(vec![int(1)])]),
        )],
    )]));
}

#[test]
fn test_recursive_functions() {
    let n = || name("n");
    let fact = module_func(
        "m",
        "fact",
        vec![param("n", Type::Integer)],
        vec![Type::Integer],
        vec![if_stmt(
            binop(n(), BinaryOp::Le, int(1)),
            vec![ret(vec![int(1)])],
            vec![],
            Some(vec![ret(vec![binop(
                n(),
                BinaryOp::Mul,
                call(field(name("m"), "fact"), vec![binop(n(), BinaryOp::Sub, int(1))]),
            )])]),
        )],
    );
    let fib = local_func(
        "fib",
        vec![param("n", Type::Integer)],
        vec![Type::Integer],
        vec![ret(vec![call(name("fib"), vec![n()])])],
    );
    assert_ok(check(vec![fact, fib]));
}

#[test]
fn test_implicit_cast_to_any_in_arguments() {
    let module = assert_ok(check_body(
        vec![],
        vec![call_stmt(call(name("print"), vec![int(1)]))],
    ));
    let TypedToplevel::Func(func) = &module.program.items[1] else {
        panic!("expected a function");
    };
    let TypedStmt::Call { call, .. } = &func.body[0] else {
        panic!("expected a call statement");
    };
    let TypedExprKind::Call { args, .. } = &call.kind else {
        panic!("expected a call expression");
    };
    assert!(matches!(args[0].kind, TypedExprKind::Cast { implicit: true, .. }));
    assert_eq!(args[0].ty, TcType::Any);
}

// Operators

#[test]
fn test_arithmetic_result_types() {
    let module = assert_ok(check(vec![
        local_var(
            vec![decl("i", Some(Type::Integer))],
            vec![binop(int(7), BinaryOp::IntDiv, int(2))],
        ),
        local_var(
            vec![decl("f", Some(Type::Float))],
            vec![binop(int(1), BinaryOp::Add, float(2.0))],
        ),
        local_var(
            vec![decl("d", Some(Type::Float))],
            vec![binop(int(1), BinaryOp::Div, int(2))],
        ),
        local_var(vec![decl("p", None)], vec![binop(int(2), BinaryOp::Pow, int(3))]),
    ]));
    assert_eq!(module.toplevel["p"], TcType::Float);

    let TypedToplevel::Var { values, .. } = &module.program.items[2] else {
        panic!("expected a variable declaration");
    };
    let TypedExprKind::Binary { left, right, .. } = &values[0].kind else {
        panic!("expected a binary expression");
    };
    assert!(matches!(left.kind, TypedExprKind::ToFloat(_)));
    assert!(matches!(right.kind, TypedExprKind::Float(_)));

    assert_single_error(
        check(vec![local_var(
            vec![decl("x", Some(Type::Integer))],
            vec![binop(int(1), BinaryOp::Add, float(2.0))],
        )]),
        "expected integer but found float in declaration of 'x'",
    );
}

#[test]
fn test_operand_errors() {
    let cases = vec![
        (
            binop(string("a"), BinaryOp::Add, int(1)),
            "left hand side of '+' operator has type string",
        ),
        (
            binop(float(1.5), BinaryOp::BitOr, int(2)),
            "left hand side of '|' operator has type float",
        ),
        (
            binop(int(1), BinaryOp::Shl, boolean(true)),
            "right hand side of '<<' operator has type boolean",
        ),
        (
            binop(string("a"), BinaryOp::Concat, boolean(true)),
            "right hand side of '..' operator has type boolean",
        ),
        (
            binop(string("a"), BinaryOp::Lt, int(1)),
            "cannot compare string and integer using '<'",
        ),
        (
            unop(UnaryOp::Neg, string("a")),
            "operand of '-' operator has type string",
        ),
        (unop(UnaryOp::Len, int(5)), "operand of '#' operator has type integer"),
        (
            unop(UnaryOp::BitNot, float(1.0)),
            "operand of '~' operator has type float",
        ),
    ];
    for (expr, expected) in cases {
        assert_single_error(
            check(vec![local_var(vec![decl("x", None)], vec![expr])]),
            expected,
        );
    }
}

#[test]
fn test_valid_operators() {
    let module = assert_ok(check(vec![
        local_var(
            vec![decl("s", None)],
            vec![binop(string("n = "), BinaryOp::Concat, int(1))],
        ),
        local_var(vec![decl("n", None)], vec![unop(UnaryOp::Len, string("abc"))]),
        local_var(
            vec![decl("lt", None)],
            vec![binop(string("a"), BinaryOp::Lt, string("b"))],
        ),
        local_var(
            vec![decl("mixed", None)],
            vec![binop(int(1), BinaryOp::Ge, float(0.5))],
        ),
        local_var(
            vec![decl("bits", None)],
            vec![binop(int(6), BinaryOp::BitXor, unop(UnaryOp::BitNot, int(1)))],
        ),
    ]));
    assert_eq!(module.toplevel["s"], TcType::String);
    assert_eq!(module.toplevel["n"], TcType::Integer);
    assert_eq!(module.toplevel["lt"], TcType::Boolean);
    assert_eq!(module.toplevel["mixed"], TcType::Boolean);
    assert_eq!(module.toplevel["bits"], TcType::Integer);
}

#[test]
fn test_operators_do_not_coerce_any() {
    assert_single_error(
        check_body(
            vec![param("a", Type::Any)],
            vec![local(vec![decl("x", None)], vec![binop(name("a"), BinaryOp::Add, int(1))])],
        ),
        "left hand side of '+' operator has type any",
    );
}

// Member access

#[test]
fn test_member_access() {
    let ty = table_of(vec![("x", Type::Integer)]);
    let t = || local_var(vec![decl("t", Some(ty.clone()))], vec![table_init(vec![("x", int(1))])]);
    assert_ok(check(vec![
        t(),
        local_var(vec![decl("y", Some(Type::Integer))], vec![field(name("t"), "x")]),
    ]));
    assert_single_error(
        check(vec![t(), local_var(vec![decl("y", None)], vec![field(name("t"), "z")])]),
        "field 'z' not found in type '{ x: integer }'",
    );
    assert_single_error(
        check(vec![
            local_var(vec![decl("n", None)], vec![int(1)]),
            local_var(vec![decl("y", None)], vec![field(name("n"), "x")]),
        ]),
        "trying to access a member of value of type 'integer'",
    );
    assert_single_error(
        check(vec![
            local_var(
                vec![decl("arr", Some(array_of(Type::Integer)))],
                vec![array_init(vec![int(1)])],
            ),
            local_var(vec![decl("v", None)], vec![index(name("arr"), string("a"))]),
        ]),
        "expected integer but found string in array index",
    );
}

#[test]
fn test_record_field_assignment() {
    assert_ok(check(vec![
        point(),
        module_func(
            "m",
            "move",
            vec![param("p", named_type("Point")), param("dx", Type::Float)],
            vec![],
            vec![assign(
                vec![field(name("p"), "x")],
                vec![binop(field(name("p"), "x"), BinaryOp::Add, name("dx"))],
            )],
        ),
    ]));
}

// Control flow

#[test]
fn test_conditions_must_be_boolean() {
    assert_single_error(
        check_body(vec![], vec![if_stmt(int(1), vec![], vec![], None)]),
        "expected boolean but found integer in if condition",
    );
    assert_single_error(
        check_body(vec![], vec![while_stmt(string("x"), vec![])]),
        "expected boolean but found string in while condition",
    );
    assert_ok(check_body(
        vec![param("c", Type::Any)],
        vec![if_stmt(name("c"), vec![], vec![], None)],
    ));
}

#[test]
fn test_break_must_be_inside_a_loop() {
    assert_single_error(
        check_body(vec![], vec![break_stmt()]),
        "break statement outside of a loop",
    );
    assert_ok(check_body(vec![], vec![while_stmt(boolean(true), vec![break_stmt()])]));
}

#[test]
fn test_repeat_condition_sees_body_locals() {
    assert_ok(check_body(
        vec![],
        vec![repeat_stmt(
            vec![local(vec![decl("done", None)], vec![boolean(true)])],
            name("done"),
        )],
    ));
}

#[test]
fn test_elseif_chains_nest_in_typed_program() {
    let module = assert_ok(check_body(
        vec![param("x", Type::Integer)],
        vec![if_stmt(
            binop(name("x"), BinaryOp::Eq, int(1)),
            vec![],
            vec![
                (binop(name("x"), BinaryOp::Eq, int(2)), vec![]),
                (binop(name("x"), BinaryOp::Eq, int(3)), vec![]),
            ],
            Some(vec![]),
        )],
    ));
    let TypedToplevel::Func(func) = &module.program.items[1] else {
        panic!("expected a function");
    };
    let TypedStmt::If { else_block, .. } = &func.body[0] else {
        panic!("expected an if statement");
    };
    let [TypedStmt::If { else_block: inner, .. }] = else_block.as_slice() else {
        panic!("expected a nested if for the first elseif");
    };
    assert!(matches!(inner.as_slice(), [TypedStmt::If { .. }]));
}

// Numeric for

#[test]
fn test_numeric_for() {
    assert_ok(check_body(
        vec![],
        vec![for_num(decl("i", None), int(1), int(10), None, vec![local(
            vec![decl("j", Some(Type::Integer))],
            vec![name("i")],
        )])],
    ));
    assert_ok(check_body(
        vec![],
        vec![for_num(
            decl("x", Some(Type::Float)),
            float(0.0),
            float(1.0),
            Some(float(0.25)),
            vec![],
        )],
    ));
    assert_single_error(
        check_body(vec![], vec![for_num(decl("i", None), int(1), float(10.0), None, vec![])]),
        "expected integer but found float in numeric for-loop limit",
    );
    assert_single_error(
        check_body(
            vec![],
            vec![for_num(decl("i", None), int(1), int(10), Some(float(0.5)), vec![])],
        ),
        "expected integer but found float in numeric for-loop step",
    );
    assert_single_error(
        check_body(
            vec![],
            vec![for_num(decl("i", None), string("a"), string("z"), None, vec![])],
        ),
        "expected integer or float but found string in for-loop control variable 'i'",
    );
}

#[test]
fn test_numeric_for_default_step() {
    let module = assert_ok(check_body(
        vec![],
        vec![for_num(decl("x", None), float(0.0), float(1.0), None, vec![])],
    ));
    let TypedToplevel::Func(func) = &module.program.items[1] else {
        panic!("expected a function");
    };
    let TypedStmt::ForNum { step, decl, .. } = &func.body[0] else {
        panic!("expected a numeric for");
    };
    assert_eq!(decl.ty, TcType::Float);
    assert!(matches!(step.kind, TypedExprKind::Float(v) if v == 1.0));
}

// Generic for

fn iterator(params: usize) -> Toplevel {
    local_func(
        "iter",
        (0..params).map(|i| param(&format!("p{i}"), Type::Any)).collect(),
        vec![Type::Any, Type::Any],
        vec![ret(vec![nil(), nil()])],
    )
}

/// `mk()` returning the iterator and a state value, but no control value.
fn iterator_and_state() -> Toplevel {
    local_func(
        "mk",
        vec![],
        vec![fn_type(vec![Type::Any, Type::Any], vec![Type::Any, Type::Any]), Type::Any],
        vec![ret(vec![name("iter"), nil()])],
    )
}

fn for_in_body(values: Vec<lunic_core::Expr>) -> TypecheckResult<CheckedModule> {
    check(vec![
        iterator(2),
        iterator_and_state(),
        module_func("m", "f", vec![], vec![], vec![for_in(
            vec![decl("k", None), decl("v", None)],
            values,
            vec![],
        )]),
    ])
}

#[test]
fn test_for_in_with_ipairs() {
    assert_ok(check_body(
        vec![param("arr", array_of(Type::String))],
        vec![for_in(
            vec![decl("i", None), decl("s", Some(Type::String))],
            vec![call(name("ipairs"), vec![name("arr")])],
            vec![local(vec![decl("n", Some(Type::Integer))], vec![name("i")])],
        )],
    ));
    assert_single_error(
        check_body(
            vec![],
            vec![for_in(
                vec![decl("i", None), decl("x", None)],
                vec![call(name("ipairs"), vec![int(5)])],
                vec![],
            )],
        ),
        "expected array but found integer in ipairs argument",
    );
    assert_single_error(
        check_body(
            vec![param("arr", array_of(Type::Integer))],
            vec![for_in(
                vec![decl("i", None)],
                vec![call(name("ipairs"), vec![name("arr")])],
                vec![],
            )],
        ),
        "expected 2 variable(s) in for loop but found 1",
    );
    assert_single_error(
        check_body(
            vec![param("arr", array_of(Type::Integer))],
            vec![for_in(
                vec![decl("i", None), decl("x", Some(Type::String))],
                vec![call(name("ipairs"), vec![name("arr")])],
                vec![],
            )],
        ),
        "expected string but found integer in loop variable 'x'",
    );
}

#[test]
fn test_any_loop_variable_records_cast() {
    let module = assert_ok(check_body(
        vec![param("arr", array_of(Type::Integer))],
        vec![for_in(
            vec![decl("i", None), decl("x", Some(Type::Any))],
            vec![call(name("ipairs"), vec![name("arr")])],
            vec![],
        )],
    ));
    let TypedToplevel::Func(func) = &module.program.items[1] else {
        panic!("expected the module function");
    };
    let TypedStmt::ForIn { decls, .. } = &func.body[0] else {
        panic!("expected a for loop, got {:?}", func.body[0]);
    };
    assert!(!decls[0].implicit_cast);
    assert!(decls[1].implicit_cast);
    assert_eq!(decls[1].ty, TcType::Any);
}

#[test]
fn test_for_in_with_pairs() {
    assert_ok(check_body(
        vec![param("t", array_of(Type::Integer))],
        vec![for_in(
            vec![decl("k", Some(Type::Integer)), decl("v", None)],
            vec![call(name("pairs"), vec![name("t")])],
            vec![],
        )],
    ));
}

#[test]
fn test_for_in_protocol() {
    assert_ok(for_in_body(vec![name("iter"), nil(), nil()]));
    assert_single_error(
        for_in_body(vec![name("iter")]),
        "missing state value in for-in loop",
    );
    assert_single_error(
        for_in_body(vec![name("iter"), int(1)]),
        "missing control value in for-in loop",
    );
    assert_single_error(
        for_in_body(vec![name("iter"), int(1), int(2), int(3)]),
        "too many values in for-in loop: expected 3 but found 4",
    );
    assert_single_error(
        for_in_body(vec![int(1), int(2), int(3)]),
        "expected an iterator function but found integer in for-in loop",
    );
}

#[test]
fn test_for_in_values_from_a_trailing_call() {
    assert_single_error(
        for_in_body(vec![call(name("mk"), vec![])]),
        "missing control value in for-in loop",
    );

    let module = assert_ok(for_in_body(vec![name("iter"), call(name("mk"), vec![])]));
    let body = module
        .program
        .items
        .iter()
        .find_map(|item| match item {
            TypedToplevel::Func(func) if matches!(func.name, TypedFuncName::ModuleField { .. }) => {
                Some(&func.body)
            }
            _ => None,
        })
        .expect("module function");
    let TypedStmt::ForIn {
        iterator: TypedForIn::Generic { values },
        ..
    } = &body[0]
    else {
        panic!("expected a generic for loop, got {:?}", body[0]);
    };
    assert_eq!(values.len(), 2);
    let TypedExprKind::Expand { values: results, .. } = &values[1].kind else {
        panic!("expected the call to be expanded, got {:?}", values[1].kind);
    };
    // The iterator value becomes the state, passed as `any`
    assert!(matches!(results[0].kind, TypedExprKind::Cast { implicit: true, .. }));
    assert_eq!(results[1].ty, TcType::Any);
}

#[test]
fn test_for_in_iterator_shape() {
    let result = check(vec![
        iterator(1),
        module_func("m", "f", vec![], vec![], vec![for_in(
            vec![decl("k", None), decl("v", None)],
            vec![name("iter"), int(1), int(2)],
            vec![],
        )]),
    ]);
    assert_single_error(result, "the for-in iterator must take 2 arguments but takes 1");

    let result = check(vec![
        iterator(2),
        module_func("m", "f", vec![], vec![], vec![for_in(
            vec![decl("k", None)],
            vec![name("iter"), nil(), nil()],
            vec![],
        )]),
    ]);
    assert_single_error(result, "expected 2 variable(s) in for loop but found 1");
}

// Module fields

#[test]
fn test_scalar_module_fields() {
    let items = || {
        vec![
            module_decl("m"),
            toplevel_assign(vec![field(name("m"), "version")], vec![int(1)]),
            return_module("m"),
        ]
    };
    let module = assert_ok(typecheck_program(&program(items())));
    assert_eq!(module.exports["version"], TcType::Integer);

    let options = CheckOptions::default().with_scalar_module_fields(false);
    let result = typecheck_program_with(&program(items()), Builtins::standard(), &options);
    assert_single_error(result, "module field 'version' cannot have type integer");
}

#[test]
fn test_disallowed_module_field_types() {
    let cases = vec![
        (
            local_var(
                vec![decl("v", Some(array_of(Type::Integer)))],
                vec![array_init(vec![int(1)])],
            ),
            "module field 'v' cannot have type { integer }",
        ),
        (
            local_var(vec![decl("v", Some(Type::Any))], vec![int(1)]),
            "module field 'v' cannot have type any",
        ),
        (
            local_var(
                vec![decl("v", Some(table_of(vec![("a", Type::Integer)])))],
                vec![table_init(vec![("a", int(1))])],
            ),
            "module field 'v' cannot have type { a: integer }",
        ),
        (
            local_var(vec![decl("v", Some(Type::Nil))], vec![nil()]),
            "module field 'v' cannot have type nil",
        ),
    ];
    for (var, expected) in cases {
        let result = check(vec![
            var,
            toplevel_assign(vec![field(name("m"), "v")], vec![name("v")]),
        ]);
        assert_single_error(result, expected);
    }
}

#[test]
fn test_record_module_field_is_rejected() {
    let result = check(vec![
        point(),
        local_var(
            vec![decl("origin", Some(named_type("Point")))],
            vec![table_init(vec![("x", float(0.0)), ("y", float(0.0))])],
        ),
        toplevel_assign(vec![field(name("m"), "origin")], vec![name("origin")]),
    ]);
    assert_single_error(result, "module field 'origin' cannot have type Point");
}

#[test]
fn test_duplicate_module_field_through_assignment() {
    let prog = program(vec![
        module_decl("m"),
        toplevel_assign(vec![field(name("m"), "x")], vec![int(1)]),
        module_func("m", "x", vec![], vec![], vec![]),
        toplevel_assign(vec![field(name("m"), "x")], vec![int(2)]),
        return_module("m"),
    ]);
    let errors = typecheck_program(&prog).unwrap_err();
    assert_eq!(errors.len(), 2);
    for error in &errors {
        assert_eq!(error.message, "duplicate module field 'x', previous one at line 2");
    }
}

#[test]
fn test_module_fields_inside_functions() {
    assert_ok(check(vec![
        toplevel_assign(vec![field(name("m"), "count")], vec![int(0)]),
        module_func("m", "bump", vec![], vec![], vec![assign(
            vec![field(name("m"), "count")],
            vec![binop(field(name("m"), "count"), BinaryOp::Add, int(1))],
        )]),
        module_func("m", "twice", vec![], vec![], vec![
            call_stmt(call(field(name("m"), "bump"), vec![])),
            call_stmt(call(field(name("m"), "bump"), vec![])),
        ]),
    ]));
    assert_single_error(
        check_body(
            vec![],
            vec![assign(vec![field(name("m"), "missing")], vec![int(1)])],
        ),
        "module field 'missing' does not exist",
    );
}

#[test]
fn test_function_on_other_variable() {
    assert_single_error(
        check(vec![
            local_var(vec![decl("t", Some(Type::Integer))], vec![int(1)]),
            module_func("t", "f", vec![], vec![], vec![]),
        ]),
        "'t' is not the module variable",
    );
}

#[test]
fn test_reassigning_module_variable() {
    assert_single_error(
        check(vec![toplevel_assign(vec![name("m")], vec![nil()])]),
        "cannot assign to module variable 'm'",
    );
}

#[test]
fn test_module_type_only_on_toplevel_variable() {
    assert_single_error(
        check_body(
            vec![],
            vec![local(vec![decl("x", Some(Type::Module))], vec![array_init(vec![])])],
        ),
        "module type is only allowed on a toplevel variable",
    );
}

// Module shape

#[test]
fn test_empty_program() {
    let errors = typecheck_program(&Program::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "empty program: expected a module variable and a final return statement"
    );
    assert_eq!(errors[0].kind, DiagnosticKind::ModuleShape);
}

#[test]
fn test_program_without_module_variable() {
    let prog = program(vec![
        local_var(vec![decl("x", None)], vec![int(1)]),
        Toplevel::Return {
            values: vec![name("x")],
            loc: Location::default(),
        },
    ]);
    let errors = error_messages(typecheck_program(&prog));
    assert!(errors.contains(&"program has no module variable".to_string()));
    assert!(errors.contains(
        &"the module return statement must return the module variable, found integer".to_string()
    ));
}

#[test]
fn test_two_module_variables() {
    let prog = program(vec![module_decl("m"), module_decl("n"), return_module("m")]);
    let errors = typecheck_program(&prog).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "there can only be one module variable per program, previous one at line 1"
    );
    assert_eq!(errors[0].location.line, 2);
}

#[test]
fn test_module_return_shape() {
    let ret_values = |values| Toplevel::Return {
        values,
        loc: Location::default(),
    };
    assert_single_error(
        typecheck_program(&program(vec![module_decl("m"), ret_values(vec![int(1)])])),
        "the module return statement must return the module variable, found integer",
    );
    assert_single_error(
        typecheck_program(&program(vec![
            module_decl("m"),
            ret_values(vec![name("m"), name("m")]),
        ])),
        "the module return statement must return exactly one value, found 2",
    );
    assert_single_error(
        typecheck_program(&program(vec![module_decl("m")])),
        "the program must end by returning the module variable",
    );
}

#[test]
fn test_module_value_cannot_be_rebound() {
    let prog = program(vec![
        module_decl("m"),
        local_var(vec![decl("x", None)], vec![name("m")]),
        Toplevel::Return {
            values: vec![name("x")],
            loc: Location::default(),
        },
    ]);
    assert_single_error(
        typecheck_program(&prog),
        "module type is only allowed on a toplevel variable",
    );

    assert_single_error(
        check_body(vec![], vec![local(vec![decl("y", None)], vec![name("m")])]),
        "module type is only allowed on a toplevel variable",
    );

    let prog = program(vec![
        module_decl("m"),
        Toplevel::Return {
            values: vec![paren(name("m"))],
            loc: Location::default(),
        },
    ]);
    assert_single_error(
        typecheck_program(&prog),
        "the module return statement must return the module variable, found module",
    );
}

#[test]
fn test_return_must_be_last() {
    let errors = error_messages(typecheck_program(&program(vec![
        module_decl("m"),
        return_module("m"),
        local_var(vec![decl("x", None)], vec![int(1)]),
    ])));
    assert_eq!(
        errors,
        vec![
            "return statement must be the last statement of the program".to_string(),
            "the program must end by returning the module variable".to_string(),
        ]
    );
}

#[test]
fn test_non_empty_module_initializer() {
    let prog = program(vec![
        Toplevel::Var {
            decls: vec![decl("m", Some(Type::Module))],
            values: vec![array_init(vec![int(1)])],
            loc: Location::default(),
        },
        return_module("m"),
    ]);
    assert_single_error(
        typecheck_program(&prog),
        "the module variable must be initialized with an empty table",
    );
}

// Types

#[test]
fn test_type_aliases_and_records() {
    assert_ok(check(vec![
        typealias("Vec", array_of(Type::Float)),
        local_var(vec![decl("v", Some(named_type("Vec")))], vec![array_init(vec![float(1.0)])]),
        point(),
        typealias("Points", array_of(named_type("Point"))),
        local_var(vec![decl("ps", Some(named_type("Points")))], vec![array_init(vec![])]),
    ]));
}

#[test]
fn test_type_declaration_errors() {
    assert_single_error(
        check(vec![local_var(vec![decl("p", Some(named_type("Nope")))], vec![])]),
        "type 'Nope' is not declared",
    );
    assert_single_error(
        check(vec![typealias("T", array_of(named_type("T")))]),
        "type 'T' is not declared",
    );
    assert_single_error(
        check(vec![point(), point()]),
        "duplicate type name 'Point', previous one at line 2",
    );
    assert_single_error(
        check(vec![record("P", vec![("x", Type::Float), ("x", Type::Integer)])]),
        "duplicate field 'x' in record 'P'",
    );
}

#[test]
fn test_undeclared_nested_type_is_reported_once() {
    assert_single_error(
        check(vec![
            local_var(
                vec![decl("a", Some(array_of(named_type("Foo"))))],
                vec![array_init(vec![])],
            ),
            local_var(vec![decl("b", Some(array_of(Type::Integer)))], vec![name("a")]),
        ]),
        "type 'Foo' is not declared",
    );
    assert_single_error(
        check(vec![
            local_var(
                vec![decl("f", Some(fn_type(vec![named_type("Foo")], vec![])))],
                vec![],
            ),
            local_var(
                vec![decl("g", Some(fn_type(vec![Type::Integer], vec![])))],
                vec![name("f")],
            ),
        ]),
        "type 'Foo' is not declared",
    );
}

#[test]
fn test_function_typed_values() {
    let callback = fn_type(vec![Type::Integer], vec![Type::Integer]);
    assert_ok(check(vec![
        local_func(
            "inc",
            vec![param("x", Type::Integer)],
            vec![Type::Integer],
            vec![ret(vec![binop(name("x"), BinaryOp::Add, int(1))])],
        ),
        module_func(
            "m",
            "apply",
            vec![param("f", callback.clone()), param("x", Type::Integer)],
            vec![Type::Integer],
            vec![ret(vec![call(name("f"), vec![name("x")])])],
        ),
        local_var(vec![decl("g", Some(callback))], vec![name("inc")]),
        toplevel_assign(vec![field(name("m"), "inc")], vec![name("g")]),
    ]));
}

// Diagnostics

#[test]
fn test_diagnostic_kinds_and_codes() {
    let errors = check(vec![local_var(vec![decl("x", Some(Type::Integer))], vec![string("s")])])
        .unwrap_err();
    assert_eq!(errors[0].kind, DiagnosticKind::TypeMismatch);
    assert_eq!(errors[0].code(), "E0009");
    assert_eq!(errors[0].filename, "<input>");
    assert!(errors[0].to_string().contains("error[E0009]"));
}

#[test]
fn test_diagnostics_in_source_order() {
    let func = Toplevel::Func(FuncDecl {
        name: FuncName::Local("f".to_string()),
        params: vec![],
        returns: vec![],
        body: vec![call_stmt(call(name("nope"), vec![]))],
        loc: Location::new(3, 1),
    });
    let errors = check(vec![
        local_var(vec![decl("a", None)], vec![name("first")]),
        func,
        local_var(vec![decl("b", None)], vec![name("last")]),
    ])
    .unwrap_err();
    let names: Vec<_> = errors.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "variable 'first' is not declared",
            "variable 'nope' is not declared",
            "variable 'last' is not declared",
        ]
    );
}

// Concurrency

#[test]
fn test_independent_checks_on_separate_threads() {
    let good = in_module(vec![module_func("m", "f", vec![], vec![], vec![])]);
    let bad = in_module(vec![local_var(vec![decl("x", None)], vec![name("y")])]);
    let handles = [good, bad].map(|prog| std::thread::spawn(move || typecheck_program(&prog)));
    let [good, bad] = handles.map(|h| h.join().unwrap());
    assert!(good.is_ok());
    assert_eq!(bad.unwrap_err().len(), 1);
}
