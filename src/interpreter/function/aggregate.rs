use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::value::{
        complex::{ComplexNumber, ZERO},
        core::Value,
    },
    util::num::usize_to_f64_checked,
};

/// Collects every argument into one list; vectors contribute each element.
fn flatten(name: &str, args: &[Value]) -> RuntimeResult<Vec<ComplexNumber>> {
    let mut elements = Vec::new();
    for arg in args {
        elements.extend(arg.to_complex_elements()?);
    }
    if elements.is_empty() {
        return Err(RuntimeError::InvalidArgument { details: format!("{name} needs at least one value") });
    }
    Ok(elements)
}

fn flatten_real(name: &str, args: &[Value]) -> RuntimeResult<Vec<f64>> {
    flatten(name, args)?.into_iter()
                        .map(|c| {
                            if c.is_real() {
                                Ok(c.real)
                            } else {
                                Err(RuntimeError::TypeError { details: format!("{name} cannot order complex number {c}") })
                            }
                        })
                        .collect()
}

pub fn min(args: &[Value]) -> RuntimeResult<Value> {
    let values = flatten_real("min", args)?;
    Ok(Value::from(values.into_iter().fold(f64::INFINITY, f64::min)))
}

pub fn max(args: &[Value]) -> RuntimeResult<Value> {
    let values = flatten_real("max", args)?;
    Ok(Value::from(values.into_iter().fold(f64::NEG_INFINITY, f64::max)))
}

pub fn sum(args: &[Value]) -> RuntimeResult<Value> {
    let total = flatten("sum", args)?.into_iter().fold(ZERO, |acc, c| acc + c);
    Ok(Value::from(total))
}

pub fn mean(args: &[Value]) -> RuntimeResult<Value> {
    let elements = flatten("mean", args)?;
    let count = usize_to_f64_checked(elements.len())?;
    let total = elements.into_iter().fold(ZERO, |acc, c| acc + c);
    Ok(Value::from(total / ComplexNumber::from(count)))
}

/// Number of elements; a scalar counts as one.
pub fn len(args: &[Value]) -> RuntimeResult<Value> {
    let count = match &args[0] {
        Value::Scalar(_) => 1,
        Value::RealVector(v) => v.len(),
        Value::ComplexVector(v) => v.len(),
        other => {
            return Err(RuntimeError::TypeError { details: format!("len expects a vector, found {}",
                                                                  other.tag()) });
        },
    };
    Ok(Value::from(usize_to_f64_checked(count)?))
}

pub fn dot(args: &[Value]) -> RuntimeResult<Value> {
    let left = args[0].to_complex_elements()?;
    let right = args[1].to_complex_elements()?;
    if left.len() != right.len() {
        return Err(RuntimeError::InvalidArgument { details: format!("dot needs vectors of equal length, found {} and {}",
                                                                    left.len(),
                                                                    right.len()) });
    }

    let total = left.iter()
                    .zip(&right)
                    .fold(ZERO, |acc, (a, b)| acc + *a * *b);
    Ok(Value::from(total))
}

pub fn norm(args: &[Value]) -> RuntimeResult<Value> {
    let squares: f64 = args[0].to_complex_elements()?
                              .iter()
                              .map(|c| c.real.mul_add(c.real, c.imaginary * c.imaginary))
                              .sum();
    Ok(Value::from(squares.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variadic_functions_flatten_vectors() {
        let args = [Value::from(4.0), Value::from(vec![1.0, 9.0]), Value::from(-2.0)];
        assert_eq!(min(&args), Ok(Value::from(-2.0)));
        assert_eq!(max(&args), Ok(Value::from(9.0)));
        assert_eq!(sum(&args), Ok(Value::from(12.0)));
        assert_eq!(mean(&args), Ok(Value::from(3.0)));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(sum(&[]), Err(RuntimeError::InvalidArgument { .. })));
        assert!(matches!(max(&[Value::from(Vec::<f64>::new())]),
                         Err(RuntimeError::InvalidArgument { .. })));
    }

    #[test]
    fn complex_values_cannot_be_ordered() {
        let z = Value::from(ComplexNumber::new(1.0, 1.0));
        assert!(matches!(min(&[z]), Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn vector_reductions() {
        let a = Value::from(vec![1.0, 2.0, 3.0]);
        let b = Value::from(vec![4.0, 5.0, 6.0]);
        assert_eq!(len(&[a.clone()]), Ok(Value::from(3.0)));
        assert_eq!(dot(&[a, b]), Ok(Value::from(32.0)));
        assert_eq!(norm(&[Value::from(vec![3.0, 4.0])]), Ok(Value::from(5.0)));
    }
}
