use std::collections::HashMap;

use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::value::core::Value,
};

/// The golden ratio, seeded as `phi`.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Per-session variable store.
///
/// Names are case-insensitive: every key is normalized to lowercase before it
/// touches the map, so `Total` and `total` are the same variable. The store is
/// seeded with `pi`, `e` and `phi`, is mutated only by assignments and never
/// shrinks.
///
/// A `Context` is owned by one thread; evaluate against separate contexts to
/// run sessions in parallel.
#[derive(Debug, Clone)]
pub struct Context {
    memory: HashMap<String, Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context seeded with the named constants.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::context::Context;
    ///
    /// let context = Context::new();
    /// assert!(context.get("PI").is_some());
    /// assert!(context.get("x").is_none());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let mut memory = HashMap::new();
        memory.insert("pi".to_string(), Value::from(std::f64::consts::PI));
        memory.insert("e".to_string(), Value::from(std::f64::consts::E));
        memory.insert("phi".to_string(), Value::from(PHI));
        Self { memory }
    }

    /// Looks up a variable by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.memory.get(&normalize(name))
    }

    /// Returns `true` if a variable with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.memory.contains_key(&normalize(name))
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: &str, value: Value) {
        self.memory.insert(normalize(name), value);
    }

    /// Iterates over all bindings in unspecified order. Names are reported in
    /// their normalized form.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.memory.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Loads a newline-separated block of `name=value` scalar constants.
    ///
    /// Blank lines and lines starting with `#` are skipped. Values are real
    /// numbers. The block is validated completely before anything is stored,
    /// so a bad line leaves the context untouched.
    ///
    /// # Errors
    /// Returns `InvalidConstant` with the 1-based line number of the first
    /// malformed line.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::{context::Context, value::core::Value};
    ///
    /// let mut context = Context::new();
    /// context.load_constants("g = 9.81\n# comment\nc=299792458").unwrap();
    /// assert_eq!(context.get("G"), Some(&Value::from(9.81)));
    /// assert!(context.load_constants("broken").is_err());
    /// ```
    pub fn load_constants(&mut self, block: &str) -> RuntimeResult<usize> {
        let mut parsed = Vec::new();

        for (index, raw) in block.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = |details: String| RuntimeError::InvalidConstant { line: index + 1,
                                                                            details };

            let (name, value) =
                line.split_once('=')
                    .ok_or_else(|| invalid(format!("expected name=value, found '{line}'")))?;
            let name = name.trim();
            if !is_identifier(name) {
                return Err(invalid(format!("'{name}' is not a valid name")));
            }
            let value = value.trim()
                             .parse::<f64>()
                             .map_err(|e| invalid(format!("'{}': {e}", value.trim())))?;
            parsed.push((name.to_string(), value));
        }

        let count = parsed.len();
        for (name, value) in parsed {
            self.set(&name, Value::from(value));
        }
        Ok(count)
    }
}

/// Normalizes a variable or function name for case-insensitive lookup.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// Returns `true` for `letter_` followed by any number of `alnum_`.
///
/// Letters and digits include non-Latin scripts.
///
/// # Example
/// ```
/// use quanta::interpreter::context::is_identifier;
///
/// assert!(is_identifier("x_1"));
/// assert!(is_identifier("größe"));
/// assert!(!is_identifier("1x"));
/// assert!(!is_identifier("a b"));
/// ```
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next()
         .is_some_and(|first| first.is_alphabetic() || first == '_')
    && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        let mut context = Context::new();
        context.set("Total", Value::from(3.0));
        assert_eq!(context.get("TOTAL"), Some(&Value::from(3.0)));
        context.set("total", Value::from(4.0));
        assert_eq!(context.variables().filter(|(k, _)| *k == "total").count(), 1);
        assert_eq!(context.get("Total"), Some(&Value::from(4.0)));
    }

    #[test]
    fn failed_constant_block_stores_nothing() {
        let mut context = Context::new();
        let err = context.load_constants("a = 1\nb = oops").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConstant { line: 2, .. }));
        assert!(!context.contains("a"));
    }
}
