use std::{collections::HashMap, rc::Rc};

use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::{
        dispatch::{date, scalar, text, vector},
        operator::BinaryOperator,
        value::core::{Tag, Value},
    },
};

/// Handler applying one operator to one pair of operand tags.
pub type BinaryFn = Rc<dyn Fn(&Value, &Value) -> RuntimeResult<Value>>;

/// The only route by which binary operators reach values.
///
/// Entries are keyed by `(left tag, right tag, operator)`. Operands are
/// normalized before lookup, so real vectors are served by the
/// complex-vector entries and registering a `RealVector` key has no effect.
///
/// # Example
/// ```
/// use quanta::interpreter::{
///     dispatch::core::OperatorTable,
///     operator::BinaryOperator,
///     value::core::{Tag, Value},
/// };
///
/// let mut table = OperatorTable::standard();
/// assert!(table.apply(BinaryOperator::Mul, Value::from("a"), Value::from(2.0)).is_err());
///
/// table.register(Tag::String, Tag::Scalar, BinaryOperator::Mul, |left, right| {
///          let count = right.as_real()? as usize;
///          Ok(Value::from(left.as_str()?.repeat(count)))
///      });
/// let repeated = table.apply(BinaryOperator::Mul, Value::from("ab"), Value::from(3.0));
/// assert_eq!(repeated.unwrap(), Value::from("ababab"));
/// ```
#[derive(Clone, Default)]
pub struct OperatorTable {
    entries: HashMap<(Tag, Tag, BinaryOperator), BinaryFn>,
}

impl OperatorTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding every built-in entry.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        scalar::register(&mut table);
        vector::register(&mut table);
        text::register(&mut table);
        date::register(&mut table);
        table
    }

    /// Adds or replaces the handler for an operator and a pair of tags.
    pub fn register<F>(&mut self, left: Tag, right: Tag, op: BinaryOperator, handler: F)
        where F: Fn(&Value, &Value) -> RuntimeResult<Value> + 'static
    {
        self.entries.insert((left, right, op), Rc::new(handler));
    }

    /// Returns the handler for the given key, if any.
    #[must_use]
    pub fn lookup(&self, left: Tag, right: Tag, op: BinaryOperator) -> Option<&BinaryFn> {
        self.entries.get(&(left, right, op))
    }

    /// Normalizes both operands and applies the matching handler.
    ///
    /// # Errors
    /// `UnsupportedOperation` when no entry exists for the operand tags, or
    /// whatever the handler reports.
    pub fn apply(&self, op: BinaryOperator, left: Value, right: Value) -> RuntimeResult<Value> {
        let (left_tag, right_tag) = (left.tag(), right.tag());
        let (left, right) = (left.normalized(), right.normalized());

        match self.lookup(left.tag(), right.tag(), op) {
            Some(handler) => handler(&left, &right),
            None => Err(RuntimeError::UnsupportedOperation { operator: op.symbol().to_string(),
                                                             left:     left_tag.name(),
                                                             right:    right_tag.name(), }),
        }
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for OperatorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorTable")
         .field("entries", &self.entries.len())
         .finish()
    }
}
