use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::value::{
        complex::{ComplexNumber, ZERO},
        core::Value,
    },
};

/// Applies `f` to a scalar, or to every element of a vector.
///
/// Vector results narrow back to real vectors when every imaginary part is
/// zero. Strings and dates are rejected.
pub(super) fn map_numeric<F>(name: &str, value: &Value, f: F) -> RuntimeResult<Value>
    where F: Fn(ComplexNumber) -> ComplexNumber
{
    match value {
        Value::Scalar(c) => Ok(Value::Scalar(f(*c))),
        Value::RealVector(_) | Value::ComplexVector(_) => {
            let elements = value.to_complex_elements()?;
            Ok(Value::from(elements.into_iter().map(f).collect::<Vec<_>>()))
        },
        other => Err(RuntimeError::TypeError { details: format!("{name} expects a number or vector, found {}",
                                                                other.tag()) }),
    }
}

/// Generates an exact-arity-one function mapping a `ComplexNumber` method
/// over scalars and vectors.
macro_rules! elementwise_builtin {
    ($fname:ident, $method:ident) => {
        pub fn $fname(args: &[Value]) -> RuntimeResult<Value> {
            map_numeric(stringify!($fname), &args[0], ComplexNumber::$method)
        }
    };
}

elementwise_builtin!(sqrt, sqrt);
elementwise_builtin!(exp, exp);
elementwise_builtin!(ln, ln);
elementwise_builtin!(sin, sin);
elementwise_builtin!(cos, cos);
elementwise_builtin!(tan, tan);
elementwise_builtin!(sinh, sinh);
elementwise_builtin!(cosh, cosh);
elementwise_builtin!(tanh, tanh);

pub fn abs(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("abs", &args[0], |c| ComplexNumber::from(c.abs()))
}

pub fn floor(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("floor", &args[0], |c| ComplexNumber::new(c.real.floor(), c.imaginary.floor()))
}

pub fn ceil(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("ceil", &args[0], |c| ComplexNumber::new(c.real.ceil(), c.imaginary.ceil()))
}

pub fn round(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("round", &args[0], |c| ComplexNumber::new(c.real.round(), c.imaginary.round()))
}

/// `-1`, `0` or `1` for reals; `z / |z|` for complex numbers.
pub fn sign(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("sign", &args[0], |c| {
        if c.is_zero() {
            ZERO
        } else if c.is_real() {
            ComplexNumber::from(c.real.signum())
        } else {
            let magnitude = c.abs();
            ComplexNumber::new(c.real / magnitude, c.imaginary / magnitude)
        }
    })
}

pub fn re(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("re", &args[0], |c| ComplexNumber::from(c.real))
}

pub fn im(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("im", &args[0], |c| ComplexNumber::from(c.imaginary))
}

pub fn conj(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("conj", &args[0], |c| c.conj())
}

pub fn arg(args: &[Value]) -> RuntimeResult<Value> {
    map_numeric("arg", &args[0], |c| ComplexNumber::from(c.arg()))
}

/// `log(x, base)`: the logarithm of `x` (scalar or vector) to a scalar base.
pub fn log(args: &[Value]) -> RuntimeResult<Value> {
    let base = args[1].as_complex()?.ln();
    if base.is_zero() {
        return Err(RuntimeError::InvalidArgument { details: "log base must not be 1".to_string() });
    }
    map_numeric("log", &args[0], |c| c.ln() / base)
}

/// Fails with `InvalidArgument` unless the argument is a non-zero scalar.
pub fn check(args: &[Value]) -> RuntimeResult<Value> {
    if args[0].is_truthy()? {
        Ok(Value::from(true))
    } else {
        Err(RuntimeError::InvalidArgument { details: "check failed".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_functions_map_over_vectors() {
        let v = Value::from(vec![-1.5, 2.0]);
        assert_eq!(abs(&[v.clone()]), Ok(Value::from(vec![1.5, 2.0])));
        assert_eq!(floor(&[v]), Ok(Value::from(vec![-2.0, 2.0])));
    }

    #[test]
    fn square_root_of_negative_is_imaginary() {
        let root = sqrt(&[Value::from(-9.0)]).unwrap().as_complex().unwrap();
        assert!(root.real.abs() < 1e-12);
        assert!((root.imaginary - 3.0).abs() < 1e-12);
    }

    #[test]
    fn logarithm_to_a_base() {
        let value = log(&[Value::from(8.0), Value::from(2.0)]).unwrap().as_real().unwrap();
        assert!((value - 3.0).abs() < 1e-12);
        assert!(log(&[Value::from(8.0), Value::from(1.0)]).is_err());
    }

    #[test]
    fn complex_parts() {
        let z = Value::from(ComplexNumber::new(3.0, -4.0));
        assert_eq!(re(&[z.clone()]), Ok(Value::from(3.0)));
        assert_eq!(im(&[z.clone()]), Ok(Value::from(-4.0)));
        assert_eq!(abs(&[z.clone()]), Ok(Value::from(5.0)));
        assert_eq!(conj(&[z]), Ok(Value::from(ComplexNumber::new(3.0, 4.0))));
        assert_eq!(sign(&[Value::from(-7.0)]), Ok(Value::from(-1.0)));
    }

    #[test]
    fn strings_are_not_numbers() {
        assert!(matches!(sin(&[Value::from("x")]), Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn check_rejects_zero() {
        assert!(check(&[Value::from(1.0)]).is_ok());
        assert!(check(&[Value::from(0.0)]).is_err());
    }
}
