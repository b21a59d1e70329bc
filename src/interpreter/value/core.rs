use std::rc::Rc;

use chrono::NaiveDateTime;

use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::value::complex::ComplexNumber,
};

/// Represents a runtime value in the interpreter.
///
/// Values are immutable once produced: every operation returns a new value.
/// There is no boolean variant; comparisons and logical operators produce the
/// scalars `1` and `0`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A complex scalar. Real numbers carry a zero imaginary part.
    Scalar(ComplexNumber),
    /// A vector of real numbers.
    RealVector(Rc<Vec<f64>>),
    /// A vector of complex numbers.
    ComplexVector(Rc<Vec<ComplexNumber>>),
    /// A string literal or string result.
    String(Rc<str>),
    /// A calendar date with time of day.
    Date(NaiveDateTime),
}

/// The discriminant of [`Value`], used as the key of the operator dispatch
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// [`Value::Scalar`].
    Scalar,
    /// [`Value::RealVector`].
    RealVector,
    /// [`Value::ComplexVector`].
    ComplexVector,
    /// [`Value::String`].
    String,
    /// [`Value::Date`].
    Date,
}

impl Tag {
    /// Returns the name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::RealVector => "real vector",
            Self::ComplexVector => "complex vector",
            Self::String => "string",
            Self::Date => "date",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ComplexNumber> for Value {
    fn from(c: ComplexNumber) -> Self {
        Self::Scalar(c)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(ComplexNumber::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::from(if v { 1.0 } else { 0.0 })
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(Rc::from(v))
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::RealVector(Rc::new(v))
    }
}

impl From<Vec<ComplexNumber>> for Value {
    /// Builds a vector value, narrowing to a real vector when every element
    /// has a zero imaginary part.
    fn from(v: Vec<ComplexNumber>) -> Self {
        if v.iter().all(ComplexNumber::is_real) {
            Self::RealVector(Rc::new(v.iter().map(|c| c.real).collect()))
        } else {
            Self::ComplexVector(Rc::new(v))
        }
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Date(v)
    }
}

impl Value {
    /// Returns the tag of this value.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        match self {
            Self::Scalar(_) => Tag::Scalar,
            Self::RealVector(_) => Tag::RealVector,
            Self::ComplexVector(_) => Tag::ComplexVector,
            Self::String(_) => Tag::String,
            Self::Date(_) => Tag::Date,
        }
    }

    /// Widens a real vector to a complex vector. Every other value is
    /// returned unchanged.
    ///
    /// The operator dispatch table only holds entries for the widened tag
    /// set, so binary operands pass through here before lookup.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::RealVector(v) => {
                Self::ComplexVector(Rc::new(v.iter().copied().map(ComplexNumber::from).collect()))
            },
            other => other,
        }
    }

    /// Converts the value to a complex scalar, or returns an error if it is
    /// not a scalar.
    pub fn as_complex(&self) -> RuntimeResult<ComplexNumber> {
        match self {
            Self::Scalar(c) => Ok(*c),
            other => Err(RuntimeError::TypeError { details: format!("expected a scalar, found {}",
                                                                    other.tag()) }),
        }
    }

    /// Converts the value to an `f64`, or returns an error if it is not a
    /// real scalar.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::{complex::ComplexNumber, core::Value};
    ///
    /// assert_eq!(Value::from(10.0).as_real().unwrap(), 10.0);
    /// assert!(Value::from(ComplexNumber::new(1.0, 1.0)).as_real().is_err());
    /// ```
    pub fn as_real(&self) -> RuntimeResult<f64> {
        let c = self.as_complex()?;
        if c.is_real() {
            Ok(c.real)
        } else {
            Err(RuntimeError::TypeError { details: format!("expected a real number, found {c}") })
        }
    }

    /// Returns the string contents, or an error if the value is not a string.
    pub fn as_str(&self) -> RuntimeResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(RuntimeError::TypeError { details: format!("expected a string, found {}",
                                                                    other.tag()) }),
        }
    }

    /// Returns the date, or an error if the value is not a date.
    pub fn as_date(&self) -> RuntimeResult<NaiveDateTime> {
        match self {
            Self::Date(d) => Ok(*d),
            other => Err(RuntimeError::TypeError { details: format!("expected a date, found {}",
                                                                    other.tag()) }),
        }
    }

    /// Returns the elements of a scalar or vector as complex numbers.
    ///
    /// A scalar yields a single element. Strings and dates are rejected.
    pub fn to_complex_elements(&self) -> RuntimeResult<Vec<ComplexNumber>> {
        match self {
            Self::Scalar(c) => Ok(vec![*c]),
            Self::RealVector(v) => Ok(v.iter().copied().map(ComplexNumber::from).collect()),
            Self::ComplexVector(v) => Ok(v.to_vec()),
            other => Err(RuntimeError::TypeError { details: format!("expected a number or vector, found {}",
                                                                    other.tag()) }),
        }
    }

    /// Interprets the value as a condition.
    ///
    /// Only scalars can be conditions; any non-zero scalar is true.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::core::Value;
    ///
    /// assert!(Value::from(2.0).is_truthy().unwrap());
    /// assert!(!Value::from(0.0).is_truthy().unwrap());
    /// assert!(Value::from("text").is_truthy().is_err());
    /// ```
    pub fn is_truthy(&self) -> RuntimeResult<bool> {
        match self {
            Self::Scalar(c) => Ok(!c.is_zero()),
            other => Err(RuntimeError::TypeError { details: format!("a {} cannot be used as a condition",
                                                                    other.tag()) }),
        }
    }

    /// Returns `true` if the value is a scalar with zero imaginary part.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        matches!(self, Self::Scalar(c) if c.is_real())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn write_list<T: std::fmt::Display>(f: &mut std::fmt::Formatter<'_>,
                                            items: &[T])
                                            -> std::fmt::Result {
            write!(f, "[")?;
            for (index, value) in items.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "]")
        }

        match self {
            Self::Scalar(c) => write!(f, "{c}"),
            Self::RealVector(v) => {
                let items: Vec<ComplexNumber> = v.iter().copied().map(ComplexNumber::from).collect();
                write_list(f, &items)
            },
            Self::ComplexVector(v) => write_list(f, v),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => {
                if d.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", d.date())
                } else {
                    write!(f, "{d}")
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn vectors_narrow_to_real_when_possible() {
        let narrowed = Value::from(vec![ComplexNumber::from(1.0), ComplexNumber::from(2.0)]);
        assert_eq!(narrowed, Value::from(vec![1.0, 2.0]));

        let complex = Value::from(vec![ComplexNumber::new(1.0, 1.0)]);
        assert_eq!(complex.tag(), Tag::ComplexVector);
    }

    #[test]
    fn normalization_widens_real_vectors_only() {
        assert_eq!(Value::from(vec![1.0]).normalized().tag(), Tag::ComplexVector);
        assert_eq!(Value::from(1.0).normalized().tag(), Tag::Scalar);
        assert_eq!(Value::from("a").normalized().tag(), Tag::String);
    }

    #[test]
    fn display_formats_each_tag() {
        assert_eq!(Value::from(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
        assert_eq!(Value::from("hi").to_string(), "hi");
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(day.map(|d| Value::from(d).to_string()).as_deref(), Some("2024-02-29"));
    }
}
