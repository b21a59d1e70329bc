use log::debug;

use crate::{
    error::EvalResult,
    interpreter::{
        context::Context,
        evaluator::{cancel::CancellationToken, core::Engine},
        value::{complex::ComplexNumber, core::Value},
    },
};

/// The three parts of a top-level `condition ? then : otherwise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditional<'a> {
    /// Text before the `?`.
    pub condition: &'a str,
    /// Text between the `?` and its matching `:`.
    pub then:      &'a str,
    /// Text after the matching `:`.
    pub otherwise: &'a str,
}

/// Characters outside string literals, paired with their byte offsets.
pub(super) fn unquoted(text: &str) -> Vec<(usize, char)> {
    let mut in_string = false;
    text.char_indices()
        .filter(|&(_, c)| {
            if c == '"' {
                in_string = !in_string;
                false
            } else {
                !in_string
            }
        })
        .collect()
}

/// Splits `text` at its first `?` outside brackets and strings.
///
/// The matching `:` is found by pairing nested `?`/`:` at the same bracket
/// depth, so `a ? b ? c : d : e` splits into `a`, `b ? c : d` and `e`.
/// Returns `None` when there is no top-level `?` or its `:` is missing.
///
/// # Example
/// ```
/// use quanta::interpreter::evaluator::ternary::split_top_level;
///
/// let parts = split_top_level("x > 0 ? f(x ? 1 : 2) : -1").unwrap();
/// assert_eq!(parts.condition, "x > 0");
/// assert_eq!(parts.then, "f(x ? 1 : 2)");
/// assert_eq!(parts.otherwise, "-1");
///
/// assert!(split_top_level("(a ? b : c)").is_none());
/// ```
#[must_use]
pub fn split_top_level(text: &str) -> Option<Conditional<'_>> {
    let chars = unquoted(text);
    let mut depth = 0usize;
    let mut question = None;
    let mut nested = 0usize;

    for &(offset, c) in &chars {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '?' if depth == 0 => match question {
                None => question = Some(offset),
                Some(_) => nested += 1,
            },
            ':' if depth == 0 && question.is_some() => {
                if nested == 0 {
                    let q = question?;
                    return Some(Conditional { condition: text[..q].trim(),
                                              then:      text[q + 1..offset].trim(),
                                              otherwise: text[offset + 1..].trim(), });
                }
                nested -= 1;
            },
            _ => {},
        }
    }

    None
}

/// Index in `chars` of the `)` matching the `(` at `open`.
fn matching_paren(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, &(_, c)) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            },
            _ => {},
        }
    }
    None
}

fn has_top_level_question(chars: &[(usize, char)]) -> bool {
    let mut depth = 0usize;
    for &(_, c) in chars {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '?' if depth == 0 => return true,
            _ => {},
        }
    }
    false
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A `(` directly preceded, ignoring whitespace, by an identifier character
/// opens a call rather than a group.
fn is_call_paren(text: &str, open: usize) -> bool {
    text[..open].trim_end()
                .chars()
                .next_back()
                .is_some_and(is_word_char)
}

/// Byte offsets of the first group at or after `start` whose interior holds a
/// top-level `?`.
fn next_group(text: &str, start: usize) -> Option<(usize, usize)> {
    let chars = unquoted(text);
    for (index, &(offset, c)) in chars.iter().enumerate() {
        if c != '(' || offset < start || is_call_paren(text, offset) {
            continue;
        }
        let Some(close) = matching_paren(&chars, index) else {
            continue;
        };
        if has_top_level_question(&chars[index + 1..close]) {
            return Some((offset, chars[close].0));
        }
    }
    None
}

/// Splits an argument list on top-level commas.
fn split_arguments(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut begin = 0;
    for (offset, c) in unquoted(text) {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                arguments.push(&text[begin..offset]);
                begin = offset + 1;
            },
            _ => {},
        }
    }
    arguments.push(&text[begin..]);
    arguments
}

/// Renders a value as source text that evaluates back to it.
///
/// Non-negative reals are bare, negative reals are parenthesized, complex
/// numbers become `(re+im*i)`, strings are quoted and vectors are bracketed.
/// Dates, non-finite numbers and strings containing `"` have no literal form.
///
/// # Example
/// ```
/// use quanta::interpreter::{
///     evaluator::ternary::format_value,
///     value::{complex::ComplexNumber, core::Value},
/// };
///
/// assert_eq!(format_value(&Value::from(2.5)).as_deref(), Some("2.5"));
/// assert_eq!(format_value(&Value::from(-5.0)).as_deref(), Some("(-5)"));
/// assert_eq!(format_value(&Value::from(ComplexNumber::new(1.0, -2.0))).as_deref(),
///            Some("(1+-2*i)"));
/// assert_eq!(format_value(&Value::from(vec![1.0, -1.0])).as_deref(), Some("[1, (-1)]"));
/// assert_eq!(format_value(&Value::from(f64::NAN)), None);
/// ```
#[must_use]
pub fn format_value(value: &Value) -> Option<String> {
    match value {
        Value::Scalar(c) => format_number(*c),
        Value::RealVector(v) => format_list(v.iter().map(|x| format_number(ComplexNumber::from(*x)))),
        Value::ComplexVector(v) => format_list(v.iter().map(|c| format_number(*c))),
        Value::String(s) => (!s.contains('"')).then(|| format!("\"{s}\"")),
        Value::Date(_) => None,
    }
}

fn format_number(c: ComplexNumber) -> Option<String> {
    if !c.is_finite() {
        return None;
    }
    let real = c.real + 0.0;
    if !c.is_real() {
        return Some(format!("({real}+{}*i)", c.imaginary));
    }
    if real < 0.0 {
        Some(format!("({real})"))
    } else {
        Some(format!("{real}"))
    }
}

fn format_list<I>(items: I) -> Option<String>
    where I: Iterator<Item = Option<String>>
{
    let parts = items.collect::<Option<Vec<_>>>()?;
    Some(format!("[{}]", parts.join(", ")))
}

/// Prefix of the names that values without a literal form are bound to.
const SCRATCH_PREFIX: &str = "_rewritten_";

/// Returns `true` if the literal form of `value` refers to `i`.
fn uses_imaginary_unit(value: &Value) -> bool {
    match value {
        Value::Scalar(c) => !c.is_real(),
        Value::ComplexVector(v) => v.iter().any(|c| !c.is_real()),
        _ => false,
    }
}

/// Speculative text rewriting of conditionals nested in groups and calls.
///
/// A fragment is evaluated once. Its value replaces it as a literal when it
/// has one; otherwise the value is bound to a fresh scratch name in a copy
/// of the context, and the name replaces the fragment. The rewritten text
/// must then be evaluated against [`context`](Self::context).
pub(crate) struct Rewriter<'a> {
    engine:  &'a Engine,
    context: &'a Context,
    cancel:  &'a CancellationToken,
    depth:   usize,
    /// `context` plus the scratch bindings, created on the first binding.
    scratch: Option<Context>,
    /// Off for text-only rewrites, which keep fragments without a literal.
    bind:    bool,
}

impl<'a> Rewriter<'a> {
    pub(crate) const fn new(engine: &'a Engine,
                            context: &'a Context,
                            cancel: &'a CancellationToken,
                            depth: usize)
                            -> Self {
        Self { engine,
               context,
               cancel,
               depth,
               scratch: None,
               bind: true }
    }

    const fn text_only(engine: &'a Engine, context: &'a Context, cancel: &'a CancellationToken) -> Self {
        Self { engine,
               context,
               cancel,
               depth: 0,
               scratch: None,
               bind: false }
    }

    /// The context rewritten text resolves against.
    pub(crate) fn context(&self) -> &Context {
        self.scratch.as_ref().unwrap_or(self.context)
    }

    /// Evaluates a fragment and returns the text to put in its place.
    ///
    /// Ordinary failures leave the fragment as it was (`Ok(None)`);
    /// cancellation and the depth limit always propagate.
    fn substitute(&mut self, fragment: &str) -> EvalResult<Option<String>> {
        let value = match self.engine
                              .evaluate_expression(fragment, self.context(), self.cancel, self.depth + 1)
        {
            Ok(value) => value,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!("kept '{}': {e}", fragment.trim());
                return Ok(None);
            },
        };

        // A bound `i` would shadow the imaginary unit in the literal.
        let literal = format_value(&value).filter(|_| {
                                              !(uses_imaginary_unit(&value) && self.context().contains("i"))
                                          });
        if let Some(text) = literal {
            debug!("rewrote '{}' as '{text}'", fragment.trim());
            return Ok(Some(text));
        }
        if !self.bind {
            debug!("kept '{}': {value} has no literal form", fragment.trim());
            return Ok(None);
        }

        let name = self.bind_scratch(value);
        debug!("bound '{}' to {name}", fragment.trim());
        Ok(Some(name))
    }

    fn bind_scratch(&mut self, value: Value) -> String {
        let base = self.context;
        let scratch = self.scratch.get_or_insert_with(|| base.clone());

        let mut index = 0_usize;
        let name = loop {
            let name = format!("{SCRATCH_PREFIX}{index}");
            if !scratch.contains(&name) {
                break name;
            }
            index += 1;
        };
        scratch.set(&name, value);
        name
    }

    /// Replaces every parenthesized group whose interior holds a top-level
    /// `?` by the value of that interior. Call parentheses are left to
    /// [`preprocess_function_args`](Self::preprocess_function_args).
    pub fn preprocess_groups(&mut self, text: &str) -> EvalResult<String> {
        let mut text = text.to_string();
        let mut start = 0;

        while let Some((open, close)) = next_group(&text, start) {
            self.cancel.check()?;
            match self.substitute(&text[open + 1..close])? {
                Some(value) => {
                    text.replace_range(open..=close, &value);
                    start = open;
                },
                None => start = open + 1,
            }
        }

        Ok(text)
    }

    /// Replaces every argument of a registered function call that contains
    /// a `?` by its value.
    pub fn preprocess_function_args(&mut self, text: &str) -> EvalResult<String> {
        let mut text = text.to_string();
        let mut start = 0;

        while let Some(open) = self.next_call(&text, start) {
            self.cancel.check()?;
            let chars = unquoted(&text);
            let close = chars.iter()
                             .position(|&(offset, _)| offset == open)
                             .and_then(|index| matching_paren(&chars, index))
                             .map(|index| chars[index].0);
            let Some(close) = close else {
                start = open + 1;
                continue;
            };

            let arguments: Vec<String> = split_arguments(&text[open + 1..close]).into_iter()
                                                                                .map(str::to_string)
                                                                                .collect();
            let mut changed = false;
            let mut rebuilt = Vec::with_capacity(arguments.len());
            for argument in arguments {
                if unquoted(&argument).iter().any(|&(_, c)| c == '?')
                   && let Some(value) = self.substitute(&argument)?
                {
                    rebuilt.push(value);
                    changed = true;
                } else {
                    rebuilt.push(argument.trim().to_string());
                }
            }

            if changed {
                text.replace_range(open + 1..close, &rebuilt.join(", "));
            }
            start = open + 1;
        }

        Ok(text)
    }

    /// Byte offset of the `(` of the first registered call at or after
    /// `start`.
    fn next_call(&self, text: &str, start: usize) -> Option<usize> {
        let chars = unquoted(text);
        let mut index = 0;

        while index < chars.len() {
            let (begin, first) = chars[index];
            if !is_word_char(first) {
                index += 1;
                continue;
            }

            let mut end = index + 1;
            while end < chars.len()
                  && is_word_char(chars[end].1)
                  && chars[end].0 == chars[end - 1].0 + chars[end - 1].1.len_utf8()
            {
                end += 1;
            }
            let last = chars[end - 1];
            let name_end = last.0 + last.1.len_utf8();
            index = end;

            if first.is_numeric() {
                continue;
            }
            let rest = &text[name_end..];
            let trimmed = rest.trim_start();
            if !trimmed.starts_with('(') {
                continue;
            }
            let open = name_end + (rest.len() - trimmed.len());
            if open >= start && self.engine.registry().contains(&text[begin..name_end]) {
                return Some(open);
            }
        }

        None
    }
}

impl Engine {
    /// Runs the group rewrite on `text` without compiling it.
    ///
    /// Text without a qualifying group is returned unchanged.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::{
    ///     context::Context,
    ///     evaluator::{cancel::CancellationToken, core::Engine},
    /// };
    ///
    /// let engine = Engine::default();
    /// let context = Context::new();
    /// let cancel = CancellationToken::new();
    ///
    /// let text = engine.preprocess_groups("(1 > 0 ? -5 : 5) * 2", &context, &cancel).unwrap();
    /// assert_eq!(text, "(-5) * 2");
    /// assert_eq!(engine.preprocess_groups("abs(x) + (1)", &context, &cancel).unwrap(),
    ///            "abs(x) + (1)");
    /// ```
    pub fn preprocess_groups(&self,
                             text: &str,
                             context: &Context,
                             cancel: &CancellationToken)
                             -> EvalResult<String> {
        Rewriter::text_only(self, context, cancel).preprocess_groups(text)
    }

    /// Runs the call-argument rewrite on `text` without compiling it.
    pub fn preprocess_function_args(&self,
                                    text: &str,
                                    context: &Context,
                                    cancel: &CancellationToken)
                                    -> EvalResult<String> {
        Rewriter::text_only(self, context, cancel).preprocess_function_args(text)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{
        error::{EvalError, RuntimeError},
        interpreter::{
            evaluator::core::{EngineOptions, TernaryMode},
            function::core::{Arity, FunctionDefinition},
        },
    };

    fn rewriting_engine() -> Engine {
        Engine::new(EngineOptions { ternary_mode: TernaryMode::Rewrite,
                                    ..EngineOptions::default() })
    }

    fn rewrite_groups(text: &str) -> String {
        Engine::default().preprocess_groups(text, &Context::new(), &CancellationToken::new())
                         .unwrap()
    }

    fn rewrite_args(text: &str) -> String {
        Engine::default().preprocess_function_args(text, &Context::new(), &CancellationToken::new())
                         .unwrap()
    }

    #[test]
    fn split_pairs_nested_conditionals() {
        let parts = split_top_level("a ? b ? c : d : e").unwrap();
        assert_eq!((parts.condition, parts.then, parts.otherwise), ("a", "b ? c : d", "e"));

        let parts = split_top_level("\"?\" == s ? 1 : 2").unwrap();
        assert_eq!(parts.condition, "\"?\" == s");

        assert!(split_top_level("a ? b").is_none());
        assert!(split_top_level("f(a ? b : c)").is_none());
    }

    #[test]
    fn groups_are_replaced_by_their_value() {
        assert_eq!(rewrite_groups("(1>0?1:0) + (2>1?2:0)"), "1 + 2");
        assert_eq!(rewrite_groups("((0 ? 1 : 2) * 3)"), "(2 * 3)");
        assert_eq!(rewrite_groups("[(1 ? \"a\" : \"b\")]"), "[\"a\"]");
    }

    #[test]
    fn text_without_candidates_is_unchanged() {
        for text in ["1 + 2", "abs(1 ? 2 : 3)", "\"(a ? b : c)\"", "(1 + 2) * 3"] {
            assert_eq!(rewrite_groups(text), text);
        }
    }

    #[test]
    fn failing_groups_are_left_alone() {
        assert_eq!(rewrite_groups("(missing ? 1 : 2) + (1 ? 3 : 4)"), "(missing ? 1 : 2) + 3");
        assert_eq!(rewrite_groups("(1 ? 1/0 : 2)"), "(1 ? 1/0 : 2)");
    }

    #[test]
    fn values_without_a_literal_are_evaluated_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut engine = rewriting_engine();
        engine.registry_mut()
              .register(FunctionDefinition::new("tick", Arity::Exact(0), move |_| {
                            counter.set(counter.get() + 1);
                            Ok(Value::from(1.0))
                        }));

        let mut context = Context::new();
        let cancel = CancellationToken::new();
        let source = "day((tick() ? date(2024, 1, 2) : date(2024, 1, 3)))";
        assert_eq!(engine.evaluate(source, &mut context, &cancel), Ok(Value::from(2.0)));
        assert_eq!(calls.get(), 1);

        let source = "days(date(2024, 1, 1), tick() ? date(2024, 1, 5) : date(2024, 1, 9))";
        assert_eq!(engine.evaluate(source, &mut context, &cancel), Ok(Value::from(4.0)));
        assert_eq!(calls.get(), 2);

        assert!(context.variables().all(|(name, _)| !name.starts_with(SCRATCH_PREFIX)));
    }

    #[test]
    fn complex_values_survive_a_bound_i() {
        let engine = rewriting_engine();
        let mut context = Context::new();
        let cancel = CancellationToken::new();
        engine.evaluate("i = 2", &mut context, &cancel).unwrap();

        let value = engine.evaluate("(1 ? sqrt(-1) : 0) * 1", &mut context, &cancel);
        assert_eq!(value, Ok(Value::from(ComplexNumber::new(0.0, 1.0))));
        let value = engine.evaluate("abs(1 ? sqrt(-1) * 3 : 0)", &mut context, &cancel);
        assert_eq!(value, Ok(Value::from(3.0)));
    }

    #[test]
    fn text_only_rewrites_keep_values_without_a_literal() {
        assert_eq!(rewrite_groups("(1 ? date(2024, 1, 1) : 0) + 1"),
                   "(1 ? date(2024, 1, 1) : 0) + 1");

        let mut context = Context::new();
        context.set("i", Value::from(2.0));
        let text = Engine::default().preprocess_groups("(1 ? sqrt(-1) : 0)", &context, &CancellationToken::new());
        assert_eq!(text.as_deref(), Ok("(1 ? sqrt(-1) : 0)"));
    }

    #[test]
    fn call_arguments_are_rewritten() {
        assert_eq!(rewrite_args("abs(1 > 0 ? -5 : 5)"), "abs((-5))");
        assert_eq!(rewrite_args("max(1, 0 ? 2 : 3)"), "max(1, 3)");
        assert_eq!(rewrite_args("max(1,2)"), "max(1,2)");
        assert_eq!(rewrite_args("concat(\"?\", 1)"), "concat(\"?\", 1)");
    }

    #[test]
    fn cancellation_is_never_swallowed() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = Engine::default().preprocess_groups("(1 ? 2 : 3)", &Context::new(), &cancel);
        assert_eq!(result, Err(EvalError::Cancelled));
    }

    #[test]
    fn depth_limit_is_never_swallowed() {
        let engine = Engine::new(EngineOptions { ternary_mode: TernaryMode::Rewrite,
                                                 max_depth:    0, });
        let result =
            engine.preprocess_groups("(1 ? 2 : 3)", &Context::new(), &CancellationToken::new());
        assert_eq!(result,
                   Err(EvalError::Runtime(RuntimeError::RecursionLimit { depth: 0 })));
    }
}
