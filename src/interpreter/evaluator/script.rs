use log::debug;

use crate::{
    error::{EvalError, EvaluateError, ParseError, RuntimeError, ScriptError},
    interpreter::{
        context::{Context, is_identifier},
        evaluator::{cancel::CancellationToken, core::Engine},
        value::core::Value,
    },
};

/// Columns a tab advances the indentation by.
const TAB_WIDTH: usize = 4;

/// A line that carries code.
#[derive(Debug, Clone, Copy)]
struct ScriptLine<'a> {
    /// 1-based line number in the source.
    number: usize,
    indent: usize,
    text:   &'a str,
}

/// A block-opening line.
#[derive(Debug, Clone, Copy)]
enum Header<'a> {
    For {
        variable: &'a str,
        start:    &'a str,
        end:      &'a str,
        step:     Option<&'a str>,
    },
    While(&'a str),
    If(&'a str),
    Elif(&'a str),
    Else,
}

type ScriptResult<T> = Result<T, ScriptError>;

fn fail(line: &ScriptLine<'_>, error: impl Into<EvalError>) -> ScriptError {
    ScriptError { line:  line.number,
                  error: EvaluateError::new(line.text, error.into()), }
}

fn malformed(line: &ScriptLine<'_>, details: &str) -> ScriptError {
    fail(line, ParseError::MalformedBlock { details: details.to_string() })
}

/// Splits the source into code lines, dropping blanks and comments.
fn code_lines(source: &str) -> Vec<ScriptLine<'_>> {
    source.lines()
          .enumerate()
          .filter_map(|(index, raw)| {
              let text = raw.trim();
              if text.is_empty() || text.starts_with('#') || text.starts_with("//") {
                  return None;
              }
              let indent = raw.chars()
                              .take_while(|c| c.is_whitespace())
                              .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
                              .sum();
              Some(ScriptLine { number: index + 1,
                                indent,
                                text })
          })
          .collect()
}

/// Index just past the block opened by `lines[header]`.
fn block_end(lines: &[ScriptLine<'_>], header: usize) -> usize {
    let indent = lines[header].indent;
    let mut end = header + 1;
    while end < lines.len() && lines[end].indent > indent {
        end += 1;
    }
    end
}

impl<'a> Header<'a> {
    /// Recognizes `for`, `while`, `if`, `elif` and `else` lines ending in
    /// `:`. Anything else is a statement.
    fn parse(line: &ScriptLine<'a>) -> ScriptResult<Option<Self>> {
        let Some(body) = line.text.strip_suffix(':') else {
            return Ok(None);
        };
        let word_end = body.find(|c: char| !c.is_alphabetic()).unwrap_or(body.len());
        let (keyword, rest) = body.split_at(word_end);
        if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            return Ok(None);
        }
        let rest = rest.trim();

        let header = match keyword {
            "for" => Self::parse_for(line, rest)?,
            "while" => Self::While(rest),
            "if" => Self::If(rest),
            "elif" => Self::Elif(rest),
            "else" if rest.is_empty() => Self::Else,
            _ => return Ok(None),
        };

        match header {
            Self::While(c) | Self::If(c) | Self::Elif(c) if c.is_empty() => {
                Err(malformed(line, &format!("'{keyword}' needs a condition")))
            },
            _ => Ok(Some(header)),
        }
    }

    /// `NAME = START to END [step STEP]`
    fn parse_for(line: &ScriptLine<'a>, rest: &'a str) -> ScriptResult<Self> {
        let expected = "expected 'for NAME = START to END [step STEP]:'";
        let (variable, range) = rest.split_once('=').ok_or_else(|| malformed(line, expected))?;
        let (start, bounds) = range.split_once(" to ").ok_or_else(|| malformed(line, expected))?;
        let (end, step) = match bounds.split_once(" step ") {
            Some((end, step)) => (end, Some(step.trim())),
            None => (bounds, None),
        };

        let variable = variable.trim();
        if !is_identifier(variable) {
            return Err(fail(line, ParseError::InvalidAssignmentTarget { name: variable.to_string() }));
        }

        Ok(Self::For { variable,
                       start: start.trim(),
                       end: end.trim(),
                       step })
    }
}

/// Executes parsed lines against one context.
struct Runner<'a> {
    engine: &'a Engine,
    cancel: &'a CancellationToken,
}

impl Runner<'_> {
    fn check(&self, line: &ScriptLine<'_>) -> ScriptResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ScriptError { line:  line.number,
                                     error: EvaluateError::Cancelled, });
        }
        Ok(())
    }

    fn evaluate(&self,
                source: &str,
                line: &ScriptLine<'_>,
                context: &mut Context)
                -> ScriptResult<Value> {
        self.engine
            .evaluate(source, context, self.cancel)
            .map_err(|error| ScriptError { line: line.number,
                                           error })
    }

    fn number(&self, source: &str, line: &ScriptLine<'_>, context: &mut Context) -> ScriptResult<f64> {
        self.evaluate(source, line, context)?
            .as_real()
            .map_err(|e| fail(line, e))
    }

    fn condition(&self,
                 source: &str,
                 line: &ScriptLine<'_>,
                 context: &mut Context)
                 -> ScriptResult<bool> {
        self.evaluate(source, line, context)?
            .is_truthy()
            .map_err(|e| fail(line, e))
    }

    /// Runs a sequence of lines at one indentation level and returns the
    /// last value any statement produced.
    fn block(&self, lines: &[ScriptLine<'_>], context: &mut Context) -> ScriptResult<Option<Value>> {
        let mut last = None;
        let mut index = 0;

        while index < lines.len() {
            let line = &lines[index];
            self.check(line)?;
            let end = block_end(lines, index);

            let Some(header) = Header::parse(line)? else {
                if end > index + 1 {
                    return Err(malformed(&lines[index + 1], "unexpected indentation"));
                }
                last = Some(self.evaluate(line.text, line, context)?);
                index += 1;
                continue;
            };

            let body = &lines[index + 1..end];
            if body.is_empty() {
                return Err(malformed(line, "expected an indented block"));
            }

            let produced = match header {
                Header::For { variable,
                              start,
                              end: stop,
                              step, } => self.for_loop(line, variable, (start, stop, step), body, context)?,
                Header::While(condition) => self.while_loop(line, condition, body, context)?,
                Header::If(condition) => {
                    let (produced, next) = self.if_chain(lines, index, condition, context)?;
                    if produced.is_some() {
                        last = produced;
                    }
                    index = next;
                    continue;
                },
                Header::Elif(_) | Header::Else => {
                    return Err(malformed(line, "'elif' or 'else' without a matching 'if'"));
                },
            };

            if produced.is_some() {
                last = produced;
            }
            index = end;
        }

        Ok(last)
    }

    fn for_loop(&self,
                line: &ScriptLine<'_>,
                variable: &str,
                (start, stop, step): (&str, &str, Option<&str>),
                body: &[ScriptLine<'_>],
                context: &mut Context)
                -> ScriptResult<Option<Value>> {
        if self.engine.registry().contains(variable) {
            return Err(fail(line, ParseError::InvalidAssignmentTarget { name: variable.to_string() }));
        }

        let first = self.number(start, line, context)?;
        let last_value = self.number(stop, line, context)?;
        let step = match step {
            Some(source) => self.number(source, line, context)?,
            None => 1.0,
        };
        let invalid = |details: &str| {
            fail(line, RuntimeError::InvalidArgument { details: details.to_string() })
        };
        if !first.is_finite() || !last_value.is_finite() || !step.is_finite() {
            return Err(invalid("loop bounds and step must be finite"));
        }
        if step == 0.0 {
            return Err(invalid("loop step must not be zero"));
        }

        let mut last = None;
        let mut iteration = 0.0;
        loop {
            let value = step.mul_add(iteration, first);
            if (step > 0.0 && value > last_value) || (step < 0.0 && value < last_value) {
                break;
            }
            self.check(line)?;

            debug!("line {}: {variable} = {value}", line.number);
            context.set(variable, Value::from(value));
            if let Some(produced) = self.block(body, context)? {
                last = Some(produced);
            }
            iteration += 1.0;
        }

        Ok(last)
    }

    fn while_loop(&self,
                  line: &ScriptLine<'_>,
                  condition: &str,
                  body: &[ScriptLine<'_>],
                  context: &mut Context)
                  -> ScriptResult<Option<Value>> {
        let mut last = None;
        while self.condition(condition, line, context)? {
            self.check(line)?;
            debug!("line {}: '{condition}' holds", line.number);
            if let Some(produced) = self.block(body, context)? {
                last = Some(produced);
            }
        }
        Ok(last)
    }

    /// Runs the first clause of an `if`/`elif`/`else` chain whose condition
    /// holds. Returns the produced value and the index after the chain.
    fn if_chain<'s>(&self,
                    lines: &[ScriptLine<'s>],
                    header: usize,
                    condition: &'s str,
                context: &mut Context)
                -> ScriptResult<(Option<Value>, usize)> {
        let indent = lines[header].indent;
        let mut clauses = vec![(Some(condition), header)];
        let mut next = block_end(lines, header);

        while next < lines.len() && lines[next].indent == indent {
            match Header::parse(&lines[next])? {
                Some(Header::Elif(condition)) => clauses.push((Some(condition), next)),
                Some(Header::Else) => clauses.push((None, next)),
                _ => break,
            }
            let end = block_end(lines, next);
            if end == next + 1 {
                return Err(malformed(&lines[next], "expected an indented block"));
            }
            next = end;
            if clauses.last().is_some_and(|(condition, _)| condition.is_none()) {
                break;
            }
        }

        for (condition, position) in clauses {
            let line = &lines[position];
            let taken = match condition {
                Some(source) => self.condition(source, line, context)?,
                None => true,
            };
            if taken {
                let body = &lines[position + 1..block_end(lines, position)];
                return Ok((self.block(body, context)?, next));
            }
        }

        Ok((None, next))
    }
}

impl Engine {
    /// Runs a multi-line script against one context.
    ///
    /// Blank lines and lines starting with `#` or `//` are ignored. Blocks
    /// are opened by a header ending in `:` and consist of the following
    /// lines indented deeper than the header:
    ///
    /// - `for NAME = START to END [step STEP]:` binds NAME in the context to
    ///   START, START + STEP, … while it does not pass END;
    /// - `while CONDITION:`;
    /// - `if CONDITION:` followed by any number of `elif CONDITION:` and an
    ///   optional `else:` at the same indentation.
    ///
    /// Every other line is evaluated with [`Engine::evaluate`].
    ///
    /// # Errors
    /// The first failure, tagged with its 1-based line number.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::{
    ///     context::Context,
    ///     evaluator::{cancel::CancellationToken, core::Engine},
    ///     value::core::Value,
    /// };
    ///
    /// let script = "
    /// total = 0
    /// for i = 1 to 3:
    ///     for j = 1 to 2:
    ///         total = total + i * j
    /// ";
    ///
    /// let mut context = Context::new();
    /// Engine::default().run_script(script, &mut context, &CancellationToken::new()).unwrap();
    /// assert_eq!(context.get("total"), Some(&Value::from(18.0)));
    /// ```
    pub fn run_script(&self,
                      source: &str,
                      context: &mut Context,
                      cancel: &CancellationToken)
                      -> Result<Option<Value>, ScriptError> {
        let lines = code_lines(source);
        if let Some(first) = lines.first()
           && first.indent > 0
           && lines.iter().any(|line| line.indent < first.indent)
        {
            return Err(malformed(first, "unexpected indentation"));
        }

        Runner { engine: self, cancel }.block(&lines, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> (Result<Option<Value>, ScriptError>, Context) {
        let mut context = Context::new();
        let result = Engine::default().run_script(script, &mut context, &CancellationToken::new());
        (result, context)
    }

    #[test]
    fn nested_loops_accumulate() {
        let (result, context) = run("total = 0\nfor i = 1 to 3:\n for j = 1 to 2:\n  total = total + i*j\n");
        assert!(result.is_ok());
        assert_eq!(context.get("total"), Some(&Value::from(18.0)));
        assert_eq!(context.get("i"), Some(&Value::from(3.0)));
    }

    #[test]
    fn loops_support_steps() {
        let (_, context) = run("s = 0\nfor k = 10 to 1 step -3:\n    s = s + k\n");
        assert_eq!(context.get("s"), Some(&Value::from(22.0)));

        let (result, _) = run("for k = 1 to 2 step 0:\n    k\n");
        assert_eq!(result.unwrap_err().line, 1);
    }

    #[test]
    fn loops_reject_non_finite_ranges() {
        for header in ["for k = 1 to ln(0) - ln(0):",
                       "for k = 1 to -ln(0):",
                       "for k = 0 to 10 step -ln(0):",
                       "for k = ln(0) to 1:"]
        {
            let (result, context) = run(&format!("n = 0\n{header}\n    n++\n"));
            let err = result.unwrap_err();
            assert_eq!(err.line, 2, "{header}");
            assert!(matches!(err.error.cause(),
                             Some(EvalError::Runtime(RuntimeError::InvalidArgument { .. }))),
                    "{header}: {err}");
            assert_eq!(context.get("n"), Some(&Value::from(0.0)));
        }
    }

    #[test]
    fn loop_variable_cannot_shadow_a_function() {
        let (result, context) = run("for day = 1 to 2:\n    x = day\n");
        let err = result.unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.error.cause(),
                   Some(&EvalError::Parse(ParseError::InvalidAssignmentTarget { name: "day".to_string() })));
        assert!(!context.contains("x"));
    }

    #[test]
    fn while_and_if_chains() {
        let script = "
# collatz steps for 6
n = 6
steps = 0
while n != 1:
    if n % 2 == 0:
        n = n / 2
    else:
        n = 3 * n + 1
    steps++
steps
";
        let (result, _) = run(script);
        assert_eq!(result.unwrap(), Some(Value::from(8.0)));
    }

    #[test]
    fn elif_picks_the_first_true_clause() {
        let script = "x = 5\nif x < 0:\n  r = -1\nelif x < 10:\n  r = 1\nelif x < 100:\n  r = 2\nelse:\n  r = 3\n";
        let (_, context) = run(script);
        assert_eq!(context.get("r"), Some(&Value::from(1.0)));
    }

    #[test]
    fn empty_scripts_are_a_no_op() {
        for script in ["", "   ", "\n\t\n", "# only a comment\n// and another"] {
            let (result, context) = run(script);
            assert_eq!(result, Ok(None), "{script:?}");
            assert_eq!(context.variables().count(), Context::new().variables().count());
        }
        assert_eq!(run("x = 1\n\n   \n").0, Ok(Some(Value::from(1.0))));
    }

    #[test]
    fn errors_carry_the_line_number() {
        let (result, context) = run("a = 1\n\n// comment\nb = a +\nc = 3\n");
        let err = result.unwrap_err();
        assert_eq!(err.line, 4);
        assert!(!context.contains("c"));
    }

    #[test]
    fn malformed_blocks_are_rejected() {
        assert_eq!(run("for i = 1:\n i\n").0.unwrap_err().line, 1);
        assert_eq!(run("if 1:\nx = 1\n").0.unwrap_err().line, 1);
        assert_eq!(run("x = 1\n  y = 2\n").0.unwrap_err().line, 2);
        assert_eq!(run("else:\n  y = 2\n").0.unwrap_err().line, 1);
    }

    #[test]
    fn cancellation_stops_the_script() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut context = Context::new();
        let err = Engine::default().run_script("x = 1", &mut context, &cancel).unwrap_err();
        assert!(err.is_cancelled());
        assert!(!context.contains("x"));
    }
}
