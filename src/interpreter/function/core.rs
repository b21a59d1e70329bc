use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::{
        function::{aggregate, builtin, date, text},
        value::core::Value,
    },
};

/// Callable backing a registered function.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> RuntimeResult<Value>>;

/// Signature of the functions in the built-in table.
type BuiltinFn = fn(&[Value]) -> RuntimeResult<Value>;

/// Specifies the allowed number of arguments for a function.
///
/// - `Exact(n)` means the function must receive exactly `n` arguments; the
///   count is checked before the callable runs.
/// - `Variadic` accepts any count and leaves validation to the callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// Any number of arguments.
    Variadic,
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => n == count,
            Self::Variadic => true,
        }
    }
}

/// A named function the compiler can call.
#[derive(Clone)]
pub struct FunctionDefinition {
    /// Name as registered; lookups ignore case.
    pub name:        String,
    /// Accepted argument counts.
    pub arity:       Arity,
    /// The implementation.
    pub call:        NativeFn,
    /// Optional one-line help text.
    pub description: Option<String>,
}

impl FunctionDefinition {
    /// Creates a definition without a description.
    pub fn new<F>(name: &str, arity: Arity, call: F) -> Self
        where F: Fn(&[Value]) -> RuntimeResult<Value> + 'static
    {
        Self { name: name.to_string(),
               arity,
               call: Rc::new(call),
               description: None }
    }

    /// Attaches help text.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Checks the argument count and runs the callable.
    ///
    /// # Errors
    /// `ArgumentCountMismatch` for a fixed arity that `args` does not meet, or
    /// whatever the callable reports.
    pub fn invoke(&self, args: &[Value]) -> RuntimeResult<Value> {
        if let Arity::Exact(expected) = self.arity
           && args.len() != expected
        {
            return Err(RuntimeError::ArgumentCountMismatch { name: self.name.clone(),
                                                             expected,
                                                             found: args.len() });
        }
        (self.call)(args)
    }
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
         .field("name", &self.name)
         .field("arity", &self.arity)
         .field("description", &self.description)
         .finish_non_exhaustive()
    }
}

/// Case-insensitive map from function name to definition.
///
/// # Example
/// ```
/// use quanta::interpreter::{
///     function::core::{Arity, FunctionDefinition, FunctionRegistry},
///     value::core::Value,
/// };
///
/// let mut registry = FunctionRegistry::standard();
/// registry.register(FunctionDefinition::new("twice", Arity::Exact(1), |args| {
///             Ok(Value::from(args[0].as_real()? * 2.0))
///         }));
///
/// assert!(registry.contains("TWICE"));
/// let twice = registry.get("twice").unwrap();
/// assert_eq!(twice.invoke(&[Value::from(4.0)]).unwrap(), Value::from(8.0));
/// assert!(twice.invoke(&[]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDefinition>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in library.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for def in BUILTIN_TABLE {
            registry.register(FunctionDefinition::new(def.name, def.arity, def.func)
                              .with_description(def.description));
        }
        registry
    }

    /// Adds a function, replacing any function of the same name.
    pub fn register(&mut self, definition: FunctionDefinition) {
        self.functions.insert(definition.name.to_lowercase(), definition);
    }

    /// Looks up a function, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(&name.to_lowercase())
    }

    /// Returns `true` if a function with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    /// Registered names in alphabetical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.values().map(|def| def.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Defines the built-in library as a static table.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a function pointer implementing the function,
/// - a one-line description.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr,
                doc: $doc:literal $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:        &'static str,
            arity:       Arity,
            func:        BuiltinFn,
            description: &'static str,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func, description: $doc },
            )*
        ];
    };
}

builtin_functions! {
    "abs"      => { arity: Arity::Exact(1), func: builtin::abs, doc: "Magnitude of a number" },
    "sqrt"     => { arity: Arity::Exact(1), func: builtin::sqrt, doc: "Principal square root" },
    "exp"      => { arity: Arity::Exact(1), func: builtin::exp, doc: "e raised to x" },
    "ln"       => { arity: Arity::Exact(1), func: builtin::ln, doc: "Natural logarithm" },
    "log"      => { arity: Arity::Exact(2), func: builtin::log, doc: "Logarithm of x to a base" },
    "sin"      => { arity: Arity::Exact(1), func: builtin::sin, doc: "Sine" },
    "cos"      => { arity: Arity::Exact(1), func: builtin::cos, doc: "Cosine" },
    "tan"      => { arity: Arity::Exact(1), func: builtin::tan, doc: "Tangent" },
    "sinh"     => { arity: Arity::Exact(1), func: builtin::sinh, doc: "Hyperbolic sine" },
    "cosh"     => { arity: Arity::Exact(1), func: builtin::cosh, doc: "Hyperbolic cosine" },
    "tanh"     => { arity: Arity::Exact(1), func: builtin::tanh, doc: "Hyperbolic tangent" },
    "floor"    => { arity: Arity::Exact(1), func: builtin::floor, doc: "Round down" },
    "ceil"     => { arity: Arity::Exact(1), func: builtin::ceil, doc: "Round up" },
    "round"    => { arity: Arity::Exact(1), func: builtin::round, doc: "Round half away from zero" },
    "sign"     => { arity: Arity::Exact(1), func: builtin::sign, doc: "Sign, or unit vector for complex" },
    "re"       => { arity: Arity::Exact(1), func: builtin::re, doc: "Real part" },
    "im"       => { arity: Arity::Exact(1), func: builtin::im, doc: "Imaginary part" },
    "conj"     => { arity: Arity::Exact(1), func: builtin::conj, doc: "Complex conjugate" },
    "arg"      => { arity: Arity::Exact(1), func: builtin::arg, doc: "Phase angle" },
    "check"    => { arity: Arity::Exact(1), func: builtin::check, doc: "Fails unless the condition holds" },
    "min"      => { arity: Arity::Variadic, func: aggregate::min, doc: "Smallest of the arguments" },
    "max"      => { arity: Arity::Variadic, func: aggregate::max, doc: "Largest of the arguments" },
    "sum"      => { arity: Arity::Variadic, func: aggregate::sum, doc: "Sum of the arguments" },
    "mean"     => { arity: Arity::Variadic, func: aggregate::mean, doc: "Arithmetic mean of the arguments" },
    "len"      => { arity: Arity::Exact(1), func: aggregate::len, doc: "Number of vector elements" },
    "dot"      => { arity: Arity::Exact(2), func: aggregate::dot, doc: "Dot product" },
    "norm"     => { arity: Arity::Exact(1), func: aggregate::norm, doc: "Euclidean norm" },
    "upper"    => { arity: Arity::Exact(1), func: text::upper, doc: "Uppercase string" },
    "lower"    => { arity: Arity::Exact(1), func: text::lower, doc: "Lowercase string" },
    "strlen"   => { arity: Arity::Exact(1), func: text::strlen, doc: "Number of characters" },
    "concat"   => { arity: Arity::Variadic, func: text::concat, doc: "Joins the arguments as text" },
    "date"     => { arity: Arity::Exact(3), func: date::date, doc: "Date from year, month, day" },
    "datetime" => { arity: Arity::Exact(6), func: date::datetime, doc: "Date and time of day" },
    "year"     => { arity: Arity::Exact(1), func: date::year, doc: "Calendar year" },
    "month"    => { arity: Arity::Exact(1), func: date::month, doc: "Month, 1 to 12" },
    "day"      => { arity: Arity::Exact(1), func: date::day, doc: "Day of the month" },
    "weekday"  => { arity: Arity::Exact(1), func: date::weekday, doc: "ISO weekday, Monday is 1" },
    "days"     => { arity: Arity::Exact(2), func: date::days, doc: "Days from the first date to the second" },
}
