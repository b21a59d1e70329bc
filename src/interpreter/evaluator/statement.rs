use log::debug;

use crate::{
    error::{EvalResult, ParseError},
    interpreter::{
        context::{Context, is_identifier},
        evaluator::{cancel::CancellationToken, core::Engine, ternary::unquoted},
        value::core::Value,
    },
};

/// Characters that rule out an assignment when they appear left of `=`.
const NOT_A_TARGET: [char; 7] = ['(', ')', '[', ']', '<', '>', '!'];

/// Operators usable in compound assignments such as `x += 1`.
const COMPOUND_OPERATORS: [char; 6] = ['+', '-', '*', '/', '%', '^'];

/// Evaluates a statement and commits assignments to `context`.
pub(super) fn execute(engine: &Engine,
                      source: &str,
                      context: &mut Context,
                      cancel: &CancellationToken)
                      -> EvalResult<Value> {
    cancel.check()?;
    if source.is_empty() {
        return Err(ParseError::EmptyExpression.into());
    }

    let rewritten = rewrite_increment(source).or_else(|| rewrite_compound(source));
    let source = rewritten.as_deref().unwrap_or(source);

    let Some((target, expression)) = split_assignment(source) else {
        return engine.evaluate_expression(source, context, cancel, 0);
    };

    if !is_identifier(target) || engine.registry().contains(target) {
        return Err(ParseError::InvalidAssignmentTarget { name: target.to_string() }.into());
    }

    let value = engine.evaluate_expression(expression, context, cancel, 0)?;
    debug!("assigned {target} = {value}");
    context.set(target, value.clone());
    Ok(value)
}

/// `x++` and `++x` become `x = x + 1`; `x--` and `--x` become `x = x - 1`.
fn rewrite_increment(source: &str) -> Option<String> {
    for (operator, sign) in [("++", '+'), ("--", '-')] {
        let name = source.strip_suffix(operator)
                         .or_else(|| source.strip_prefix(operator))
                         .map(str::trim);
        if let Some(name) = name
           && is_identifier(name)
        {
            return Some(format!("{name} = {name} {sign} 1"));
        }
    }
    None
}

/// `x op= rhs` becomes `x = x op (rhs)`.
fn rewrite_compound(source: &str) -> Option<String> {
    let (offset, _) = unquoted(source).into_iter().find(|&(_, c)| c == '=')?;
    let (left, right) = (&source[..offset], &source[offset + 1..]);

    let operator = left.chars().next_back()?;
    if !COMPOUND_OPERATORS.contains(&operator) || right.trim_start().starts_with('=') {
        return None;
    }
    let name = left[..left.len() - operator.len_utf8()].trim();
    if !is_identifier(name) {
        return None;
    }

    Some(format!("{name} = {name} {operator} ({})", right.trim()))
}

/// Splits `target = expression` when the source holds exactly one
/// assignment `=` outside strings and the left side is free of brackets,
/// relational operators and `!`.
///
/// `=` characters belonging to `==`, `!=`, `<=` or `>=` do not count.
fn split_assignment(source: &str) -> Option<(&str, &str)> {
    let chars = unquoted(source);
    let mut assignment = None;

    for (index, &(offset, c)) in chars.iter().enumerate() {
        if c != '=' {
            continue;
        }
        let previous = index.checked_sub(1).map(|p| chars[p].1);
        let next = chars.get(index + 1).map(|&(_, c)| c);
        if matches!(previous, Some('=' | '!' | '<' | '>')) || next == Some('=') {
            continue;
        }
        if assignment.is_some() {
            return None;
        }
        assignment = Some(offset);
    }

    let offset = assignment?;
    let target = source[..offset].trim();
    if target.contains(NOT_A_TARGET) {
        return None;
    }
    Some((target, source[offset + 1..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EvalError, RuntimeError};

    fn run(source: &str, context: &mut Context) -> EvalResult<Value> {
        execute(&Engine::default(), source, context, &CancellationToken::new())
    }

    #[test]
    fn increments_and_compound_assignments_are_rewritten() {
        assert_eq!(rewrite_increment("x++").as_deref(), Some("x = x + 1"));
        assert_eq!(rewrite_increment("--count").as_deref(), Some("count = count - 1"));
        assert_eq!(rewrite_increment("x + +"), None);
        assert_eq!(rewrite_compound("x += 5").as_deref(), Some("x = x + (5)"));
        assert_eq!(rewrite_compound("y ^= 2 - 1").as_deref(), Some("y = y ^ (2 - 1)"));
        assert_eq!(rewrite_compound("a <= b"), None);
        assert_eq!(rewrite_compound("a += = b"), None);
    }

    #[test]
    fn assignment_is_detected_outside_strings_and_comparisons() {
        assert_eq!(split_assignment("x = 1"), Some(("x", "1")));
        assert_eq!(split_assignment("flag = a == b"), Some(("flag", "a == b")));
        assert_eq!(split_assignment("s = \"a=b\""), Some(("s", "\"a=b\"")));
        assert_eq!(split_assignment("a == b"), None);
        assert_eq!(split_assignment("a <= b"), None);
        assert_eq!(split_assignment("f(x) = 2"), None);
        assert_eq!(split_assignment("a = b = 1"), None);
    }

    #[test]
    fn assignment_commits_after_evaluation() {
        let mut context = Context::new();
        assert_eq!(run("x = 10", &mut context), Ok(Value::from(10.0)));
        assert_eq!(run("x += 5", &mut context), Ok(Value::from(15.0)));
        assert_eq!(run("x++", &mut context), Ok(Value::from(16.0)));
        assert_eq!(context.get("X"), Some(&Value::from(16.0)));

        let failed = run("x = 1 / 0", &mut context);
        assert_eq!(failed, Err(EvalError::Runtime(RuntimeError::DivisionByZero)));
        assert_eq!(context.get("x"), Some(&Value::from(16.0)));
    }

    #[test]
    fn invalid_targets_are_rejected() {
        let mut context = Context::new();
        for (source, name) in [("2x = 1", "2x"), ("sqrt = 4", "sqrt"), ("a b = 1", "a b")] {
            assert_eq!(run(source, &mut context),
                       Err(EvalError::Parse(ParseError::InvalidAssignmentTarget { name: name.to_string() })));
        }
    }

    #[test]
    fn empty_source_is_an_error() {
        assert_eq!(run("", &mut Context::new()), Err(EvalError::Parse(ParseError::EmptyExpression)));
    }
}
