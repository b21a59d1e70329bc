use std::{
    cell::Cell,
    fs::{self},
    rc::Rc,
};

use quanta::{
    CancellationToken, Context, Engine, EngineOptions, EvaluateError, TernaryMode, Value,
    error::{EvalError, ParseError, RuntimeError},
    get_result,
    interpreter::function::core::{Arity, FunctionDefinition},
};
use walkdir::WalkDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn script_fixtures_work() {
    init_logging();
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "calc"))
    {
        let path = entry.path();
        let script =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = get_result(&script) {
            panic!("Script {path:?} failed:\n{script}\nError: {e}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

fn engines() -> [Engine; 2] {
    [TernaryMode::Compiled, TernaryMode::Rewrite].map(|mode| {
                                                     Engine::new(EngineOptions { ternary_mode: mode,
                                                                                 ..EngineOptions::default() })
                                                 })
}

fn eval(engine: &Engine, source: &str) -> Result<Value, EvaluateError> {
    engine.evaluate(source, &mut Context::new(), &CancellationToken::new())
}

fn assert_value(source: &str, expected: f64) {
    for engine in engines() {
        match eval(&engine, source) {
            Ok(value) => assert_eq!(value, Value::from(expected), "'{source}' in {:?}", engine.options()),
            Err(e) => panic!("'{source}' failed in {:?}: {e}", engine.options()),
        }
    }
}

fn assert_cause(source: &str, check: impl Fn(&EvalError) -> bool) {
    for engine in engines() {
        let err = eval(&engine, source).expect_err(source);
        let cause = err.cause().unwrap_or_else(|| panic!("'{source}' was cancelled"));
        assert!(check(cause), "'{source}' failed with unexpected {cause:?}");
    }
}

#[test]
fn precedence_and_associativity() {
    assert_value("2 + 3 * 4", 14.0);
    assert_value("2 * 3 ^ 2", 18.0);
    assert_value("-2 ^ 2", 4.0);
    assert_value("2 ^ 3 ^ 2", 512.0);
    assert_value("10 - 4 - 3", 3.0);
    assert_value("1 + 2 < 4 && 3 > 2", 1.0);
    assert_value("1 << 4 | 1", 17.0);

    let mut context = Context::new();
    let engine = Engine::default();
    let cancel = CancellationToken::new();
    engine.evaluate("x = 2", &mut context, &cancel).unwrap();
    assert_eq!(engine.evaluate("-x ^ 2", &mut context, &cancel), Ok(Value::from(4.0)));
}

#[test]
fn conditionals_select_one_branch() {
    assert_value("1 > 0 ? 1 : 0", 1.0);
    assert_value("0 > 1 ? 1 : 0", 0.0);
    assert_value("(1>0?1:0) + (2>1?2:0) + (3>2?3:0)", 6.0);
    assert_value("abs(1 > 0 ? -5 : 5)", 5.0);
    assert_value("1 ? 10 : missing", 10.0);
    assert_value("0 ? 1 / 0 : 2", 2.0);
}

#[test]
fn the_selected_branch_runs_exactly_once() {
    let sources = [("0 ? tick() : tick() + tick()", Value::from(2.0), 2),
                   ("(tick() ? tick() : 0) + 1", Value::from(2.0), 2),
                   ("max(1, tick() ? 5 : tick())", Value::from(5.0), 1),
                   ("day((tick() ? date(2024, 1, 2) : date(2024, 1, 3)))", Value::from(2.0), 1)];

    for mut engine in engines() {
        for (source, expected, ticks) in &sources {
            let calls = Rc::new(Cell::new(0));
            let counter = Rc::clone(&calls);
            engine.registry_mut()
                  .register(FunctionDefinition::new("tick", Arity::Exact(0), move |_| {
                                counter.set(counter.get() + 1);
                                Ok(Value::from(1.0))
                            }));

            let mut context = Context::new();
            let value = engine.evaluate(source, &mut context, &CancellationToken::new());
            assert_eq!(value.as_ref(), Ok(expected), "'{source}' in {:?}", engine.options());
            assert_eq!(calls.get(), *ticks, "'{source}' in {:?}", engine.options());
        }
    }
}

#[test]
fn assignments_persist_in_the_context() {
    let engine = Engine::default();
    let mut context = Context::new();
    let cancel = CancellationToken::new();

    engine.evaluate("x = 10", &mut context, &cancel).unwrap();
    assert_eq!(engine.evaluate("x", &mut context, &cancel), Ok(Value::from(10.0)));
    engine.evaluate("x += 5", &mut context, &cancel).unwrap();
    assert_eq!(engine.evaluate("X", &mut context, &cancel), Ok(Value::from(15.0)));
    engine.evaluate("x--", &mut context, &cancel).unwrap();
    assert_eq!(context.get("x"), Some(&Value::from(14.0)));

    assert!(engine.evaluate("x = undefined + 1", &mut context, &cancel).is_err());
    assert_eq!(context.get("x"), Some(&Value::from(14.0)));
}

#[test]
fn arity_is_checked_before_the_call() {
    let calls = Rc::new(Cell::new(0));
    let mut engine = Engine::default();
    let counter = Rc::clone(&calls);
    engine.registry_mut()
          .register(FunctionDefinition::new("pair", Arity::Exact(2), move |args| {
                        counter.set(counter.get() + 1);
                        Ok(args[0].clone())
                    }));

    let err = eval(&engine, "pair(1)").unwrap_err();
    assert!(matches!(err.cause(),
                     Some(EvalError::Runtime(RuntimeError::ArgumentCountMismatch { expected: 2,
                                                                                   found: 1,
                                                                                   .. }))));
    assert_eq!(calls.get(), 0);
    assert_eq!(eval(&engine, "pair(7, 8)"), Ok(Value::from(7.0)));
    assert_eq!(calls.get(), 1);
}

#[test]
fn unsupported_operand_pairs() {
    assert_cause("\"text\" * 2", |e| {
        matches!(e, EvalError::Runtime(RuntimeError::UnsupportedOperation { .. }))
    });
    assert_cause("date(2024, 1, 1) * 2", |e| {
        matches!(e, EvalError::Runtime(RuntimeError::UnsupportedOperation { .. }))
    });
}

#[test]
fn brackets_and_vectors() {
    assert_cause("(1 + 2", |e| {
        matches!(e, EvalError::Parse(ParseError::UnmatchedBracket { .. }))
    });
    assert_cause("1 + 2)", |e| {
        matches!(e, EvalError::Parse(ParseError::UnmatchedBracket { .. }))
    });
    assert_cause("[1, 2", |e| {
        matches!(e, EvalError::Parse(ParseError::UnmatchedBracket { .. }))
    });

    let engine = Engine::default();
    assert_eq!(eval(&engine, "[1, 2, 3]"), Ok(Value::from(vec![1.0, 2.0, 3.0])));
    assert_eq!(eval(&engine, "[]"), Ok(Value::from(Vec::<f64>::new())));
    assert_eq!(eval(&engine, "[1, 2] * 2 + [1, 1]"), Ok(Value::from(vec![3.0, 5.0])));
    assert_value("len([1, 2, 3])", 3.0);
    assert_value("len([])", 0.0);
}

#[test]
fn preprocessing_leaves_plain_text_alone() {
    let engine = Engine::default();
    let context = Context::new();
    let cancel = CancellationToken::new();

    for text in ["1 + 2", "max(1, 2) * (3 - 4)", "\"a ? b : c\" + x", "f(a)"] {
        assert_eq!(engine.preprocess_groups(text, &context, &cancel).unwrap(), text);
        assert_eq!(engine.preprocess_function_args(text, &context, &cancel).unwrap(), text);
    }
}

#[test]
fn cancellation_leaves_the_context_untouched() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    for engine in engines() {
        let mut context = Context::new();
        assert_eq!(engine.evaluate("y = 1", &mut context, &cancel), Err(EvaluateError::Cancelled));
        assert!(!context.contains("y"));

        let err = engine.run_script("z = 1\nz = 2", &mut context, &cancel).unwrap_err();
        assert!(err.is_cancelled());
        assert!(!context.contains("z"));
    }
}

#[test]
fn nested_loops_accumulate() {
    init_logging();
    let mut context = Context::new();
    let script = "total = 0\nfor i = 1 to 3:\n for j = 1 to 2:\n  total = total + i*j\n";
    Engine::default().run_script(script, &mut context, &CancellationToken::new())
                     .unwrap();
    assert_eq!(context.get("total"), Some(&Value::from(18.0)));
}

#[test]
fn strings_and_dates() {
    let engine = Engine::default();
    assert_eq!(eval(&engine, "upper(\"ab\") + lower(\"CD\")"), Ok(Value::from("ABcd")));
    assert_value("strlen(concat(\"x\", 1, 2))", 3.0);
    assert_value("date(2024, 3, 1) - date(2024, 2, 1)", 29.0);
    assert_value("weekday(date(2024, 1, 1))", 1.0);
    assert_value("day(date(2024, 1, 31) + 1)", 1.0);
}

#[test]
fn constants_can_be_loaded() {
    let engine = Engine::default();
    let mut context = Context::new();
    assert_eq!(context.load_constants("g = 9.81\n\n# gravity\nm = 2"), Ok(2));
    assert_eq!(engine.evaluate("m * g", &mut context, &CancellationToken::new()),
               Ok(Value::from(19.62)));

    let err = context.load_constants("ok = 1\n2bad = 3").unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidConstant { line: 2, .. }));
}

#[test]
fn empty_input_is_a_no_op_for_scripts() {
    assert_eq!(get_result(""), Ok(None));
    assert_eq!(get_result("  \n\n"), Ok(None));

    let err = eval(&Engine::default(), "   ").unwrap_err();
    assert_eq!(err.cause(), Some(&EvalError::Parse(ParseError::EmptyExpression)));
}

#[test]
fn script_errors_report_the_line() {
    let err = get_result("a = 1\n\nb = a / 0\nc = 2").unwrap_err();
    assert_eq!(err.line, 3);
    assert!(matches!(err.error.cause(),
                     Some(EvalError::Runtime(RuntimeError::DivisionByZero))));

    let err = get_result("check(1 == 1)\ncheck(2 < 1)").unwrap_err();
    assert_eq!(err.line, 2);
}
