use log::debug;

use crate::{
    error::{EvalResult, EvaluateError, ParseError, RuntimeError},
    interpreter::{
        compiler::{core::compile, program::Program},
        context::Context,
        dispatch::core::OperatorTable,
        evaluator::{
            cancel::CancellationToken,
            machine::Machine,
            statement,
            ternary::{Rewriter, split_top_level},
        },
        function::core::FunctionRegistry,
        lexer::tokenize,
        value::core::Value,
    },
};

/// Default bound on nested evaluations.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How conditional expressions are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TernaryMode {
    /// Conditionals compile to jumps inside the program.
    #[default]
    Compiled,
    /// Conditionals are resolved by evaluating and substituting text before
    /// compilation: a top-level `?` splits the source, and groups or call
    /// arguments holding a `?` are replaced by their values.
    ///
    /// Each replaced fragment is evaluated once. Values without a literal
    /// form, and complex values while a variable named `i` exists, are
    /// passed to the final evaluation through scratch variables named
    /// `_rewritten_N` that never reach the caller's context.
    Rewrite,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Conditional strategy.
    pub ternary_mode: TernaryMode,
    /// Maximum nesting of recursive evaluations before `RecursionLimit`.
    pub max_depth:    usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { ternary_mode: TernaryMode::default(),
               max_depth:    DEFAULT_MAX_DEPTH, }
    }
}

/// Evaluates expressions and statements against a [`Context`].
///
/// An engine owns the function registry and the operator table. It holds no
/// per-session state, so one engine can serve any number of contexts.
///
/// # Example
/// ```
/// use quanta::interpreter::{
///     context::Context,
///     evaluator::{cancel::CancellationToken, core::Engine},
///     value::core::Value,
/// };
///
/// let engine = Engine::default();
/// let mut context = Context::new();
/// let cancel = CancellationToken::new();
///
/// engine.evaluate("x = 10", &mut context, &cancel).unwrap();
/// engine.evaluate("x += 5", &mut context, &cancel).unwrap();
/// let value = engine.evaluate("x > 12 ? x * 2 : 0", &mut context, &cancel).unwrap();
/// assert_eq!(value, Value::from(30.0));
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    registry:  FunctionRegistry,
    operators: OperatorTable,
    options:   EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    /// Creates an engine with the standard functions and operators.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Self::with_parts(FunctionRegistry::standard(), OperatorTable::standard(), options)
    }

    /// Creates an engine from a custom registry and operator table.
    #[must_use]
    pub fn with_parts(registry: FunctionRegistry,
                      operators: OperatorTable,
                      options: EngineOptions)
                      -> Self {
        Self { registry,
               operators,
               options }
    }

    /// The active configuration.
    #[must_use]
    pub const fn options(&self) -> EngineOptions {
        self.options
    }

    /// The callable functions.
    #[must_use]
    pub const fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Mutable access for registering further functions.
    pub const fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// The binary operator handlers.
    #[must_use]
    pub const fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Mutable access for registering further operator handlers.
    pub const fn operators_mut(&mut self) -> &mut OperatorTable {
        &mut self.operators
    }

    /// Compiles an expression without evaluating it.
    ///
    /// Useful to inspect the postfix form. Assignments are not statements at
    /// this level, so `=` is rejected.
    ///
    /// # Errors
    /// Any tokenizer or compiler error.
    pub fn compile(&self, source: &str) -> Result<Program, ParseError> {
        let tokens = tokenize(source.trim())?;
        compile(&tokens, &self.registry)
    }

    /// Evaluates one statement: an assignment, a compound assignment, an
    /// increment or decrement, or a plain expression.
    ///
    /// The context is only written after the right-hand side has been fully
    /// evaluated, so a failed or cancelled evaluation leaves it unchanged.
    ///
    /// # Errors
    /// `EvaluateError::Cancelled` when the token is set, otherwise
    /// `EvaluateError::Failed` wrapping the innermost error.
    pub fn evaluate(&self,
                    source: &str,
                    context: &mut Context,
                    cancel: &CancellationToken)
                    -> Result<Value, EvaluateError> {
        let source = source.trim();
        statement::execute(self, source, context, cancel).map_err(|e| EvaluateError::new(source, e))
    }

    /// Evaluates an expression without any statement handling.
    ///
    /// Every recursive entry point funnels through here, so this is where
    /// the cancellation token and the depth limit are enforced.
    pub(crate) fn evaluate_expression(&self,
                                      source: &str,
                                      context: &Context,
                                      cancel: &CancellationToken,
                                      depth: usize)
                                      -> EvalResult<Value> {
        cancel.check()?;
        if depth > self.options.max_depth {
            return Err(RuntimeError::RecursionLimit { depth: self.options.max_depth }.into());
        }

        let source = source.trim();
        if source.is_empty() {
            return Err(ParseError::EmptyExpression.into());
        }

        match self.options.ternary_mode {
            TernaryMode::Compiled => self.run(source, context, cancel),
            TernaryMode::Rewrite => {
                if let Some(conditional) = split_top_level(source) {
                    let condition = self.evaluate_expression(conditional.condition,
                                                             context,
                                                             cancel,
                                                             depth + 1)?;
                    let branch = if condition.is_truthy()? {
                        conditional.then
                    } else {
                        conditional.otherwise
                    };
                    return self.evaluate_expression(branch, context, cancel, depth + 1);
                }

                let mut rewriter = Rewriter::new(self, context, cancel, depth);
                let grouped = rewriter.preprocess_groups(source)?;
                let rewritten = rewriter.preprocess_function_args(&grouped)?;
                self.run(&rewritten, rewriter.context(), cancel)
            },
        }
    }

    fn run(&self, source: &str, context: &Context, cancel: &CancellationToken) -> EvalResult<Value> {
        let program = self.compile(source)?;
        debug!("compiled '{source}' into '{program}'");

        let machine = Machine { context,
                                operators: &self.operators,
                                registry: &self.registry,
                                cancel };
        machine.execute(&program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;

    fn engine(mode: TernaryMode) -> Engine {
        Engine::new(EngineOptions { ternary_mode: mode,
                                    ..EngineOptions::default() })
    }

    fn eval(engine: &Engine, source: &str) -> Result<Value, EvaluateError> {
        engine.evaluate(source, &mut Context::new(), &CancellationToken::new())
    }

    fn real(engine: &Engine, source: &str) -> f64 {
        eval(engine, source).unwrap().as_real().unwrap()
    }

    #[test]
    fn arithmetic_follows_precedence() {
        for mode in [TernaryMode::Compiled, TernaryMode::Rewrite] {
            let engine = engine(mode);
            assert_eq!(real(&engine, "1 + 2 * 3"), 7.0);
            assert_eq!(real(&engine, "2 * 3 ^ 2"), 18.0);
            assert_eq!(real(&engine, "-2 ^ 2"), 4.0);
            assert_eq!(real(&engine, "2 ^ 3 ^ 2"), 512.0);
            assert_eq!(real(&engine, "(1 + 2) * 3"), 9.0);
        }
    }

    #[test]
    fn conditionals_agree_across_modes() {
        let sources = [("1 > 0 ? 1 : 0", 1.0),
                       ("0 > 1 ? 1 : 0", 0.0),
                       ("(1>0?1:0) + (2>1?2:0) + (3>2?3:0)", 6.0),
                       ("abs(1 > 0 ? -5 : 5)", 5.0),
                       ("max(0 ? 1 : 2, 1 ? 3 : 4)", 3.0),
                       ("1 ? 0 ? 5 : 6 : 7", 6.0),
                       ("0 ? 5 : 0 ? 6 : 7", 7.0)];
        for mode in [TernaryMode::Compiled, TernaryMode::Rewrite] {
            let engine = engine(mode);
            for (source, expected) in sources {
                assert_eq!(real(&engine, source), expected, "{source} in {mode:?}");
            }
        }
    }

    #[test]
    fn only_the_selected_branch_runs() {
        for mode in [TernaryMode::Compiled, TernaryMode::Rewrite] {
            let engine = engine(mode);
            assert_eq!(real(&engine, "1 ? 2 : undefined_name"), 2.0);
            assert_eq!(real(&engine, "0 ? 1 / 0 : 3"), 3.0);
        }
    }

    #[test]
    fn compile_renders_postfix() {
        let engine = Engine::default();
        assert_eq!(engine.compile("a + b * c").unwrap().to_string(), "a b c * +");
        assert_eq!(engine.compile("[1, 2, 3]").unwrap().to_string(), "1 2 3 vector_3");
        assert_eq!(engine.compile("[]").unwrap().to_string(), "vector_0");
    }

    #[test]
    fn unsupported_pairs_are_reported() {
        let err = eval(&Engine::default(), "\"a\" - 1").unwrap_err();
        assert!(matches!(err.cause(),
                         Some(EvalError::Runtime(RuntimeError::UnsupportedOperation { .. }))));
    }

    #[test]
    fn depth_limit_applies_to_nested_rewrites() {
        let engine = Engine::new(EngineOptions { ternary_mode: TernaryMode::Rewrite,
                                                 max_depth:    2, });
        let err = eval(&engine, "1 ? (1 ? (1 ? (1 ? 2 : 0) : 0) : 0) : 0").unwrap_err();
        assert!(matches!(err.cause(),
                         Some(EvalError::Runtime(RuntimeError::RecursionLimit { depth: 2 }))));
    }

    #[test]
    fn cancelled_evaluation_reports_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = Engine::default().evaluate("1 + 1", &mut Context::new(), &cancel);
        assert_eq!(result, Err(EvaluateError::Cancelled));
    }
}
