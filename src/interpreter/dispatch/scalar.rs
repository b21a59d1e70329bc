use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::{
        dispatch::core::OperatorTable,
        operator::BinaryOperator,
        value::{
            complex::ComplexNumber,
            core::{Tag, Value},
        },
    },
    util::num::{f64_to_i64_checked, f64_to_u32_checked, i64_to_f64_checked},
};

/// Exponents up to this magnitude use exact repeated squaring.
const MAX_INTEGER_EXPONENT: f64 = 1024.0;

pub(super) fn register(table: &mut OperatorTable) {
    for op in BinaryOperator::ALL {
        table.register(Tag::Scalar, Tag::Scalar, op, move |left, right| {
                 evaluate(op, left.as_complex()?, right.as_complex()?)
             });
    }
}

/// Applies any binary operator to two complex scalars.
fn evaluate(op: BinaryOperator, a: ComplexNumber, b: ComplexNumber) -> RuntimeResult<Value> {
    use BinaryOperator::{
        Add, And, BitAnd, BitOr, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul,
        NotEqual, Or, Pow, ShiftLeft, ShiftRight, Sub,
    };

    match op {
        Add | Sub | Mul | Div | Mod | Pow => arithmetic(op, a, b).map(Value::from),
        Equal => Ok(Value::from(a == b)),
        NotEqual => Ok(Value::from(a != b)),
        Less => Ok(Value::from(a.real < b.real)),
        Greater => Ok(Value::from(a.real > b.real)),
        LessEqual => Ok(Value::from(a.real <= b.real)),
        GreaterEqual => Ok(Value::from(a.real >= b.real)),
        And => Ok(Value::from(!a.is_zero() && !b.is_zero())),
        Or => Ok(Value::from(!a.is_zero() || !b.is_zero())),
        BitAnd | BitOr | ShiftLeft | ShiftRight => bitwise(op, a, b),
    }
}

/// Applies an arithmetic operator (`+ - * / % ^`) to two complex scalars.
///
/// Shared with the elementwise vector entries.
///
/// # Errors
/// - `DivisionByZero` for `/` or `%` by zero, and for zero raised to a
///   negative power.
/// - `TypeError` for `%` on numbers with an imaginary part.
pub(crate) fn arithmetic(op: BinaryOperator,
                         a: ComplexNumber,
                         b: ComplexNumber)
                         -> RuntimeResult<ComplexNumber> {
    match op {
        BinaryOperator::Add => Ok(a + b),
        BinaryOperator::Sub => Ok(a - b),
        BinaryOperator::Mul => Ok(a * b),
        BinaryOperator::Div => {
            if b.is_zero() {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(a / b)
        },
        BinaryOperator::Mod => {
            if !a.is_real() || !b.is_real() {
                return Err(RuntimeError::TypeError { details: format!("'%' requires real operands, found {a} and {b}") });
            }
            if b.real == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(ComplexNumber::from(a.real % b.real))
        },
        BinaryOperator::Pow => {
            if a.is_zero() && b.real < 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(power(a, b))
        },
        other => Err(RuntimeError::TypeError { details: format!("'{other}' is not an arithmetic operator") }),
    }
}

/// Raises `a` to `b`, keeping integral powers and real results exact.
fn power(a: ComplexNumber, b: ComplexNumber) -> ComplexNumber {
    if b.is_real() && b.real.fract() == 0.0 && b.real.abs() <= MAX_INTEGER_EXPONENT
       && let Ok(exp) = f64_to_i64_checked(b.real)
    {
        return a.powi(exp);
    }
    if a.is_real() && b.is_real() && a.real >= 0.0 {
        return ComplexNumber::from(a.real.powf(b.real));
    }
    a.powc(b)
}

fn integer(c: ComplexNumber) -> RuntimeResult<i64> {
    if !c.is_real() {
        return Err(RuntimeError::TypeError { details: format!("bitwise operators require integers, found {c}") });
    }
    f64_to_i64_checked(c.real)
}

fn bitwise(op: BinaryOperator, a: ComplexNumber, b: ComplexNumber) -> RuntimeResult<Value> {
    let left = integer(a)?;

    let result = match op {
        BinaryOperator::BitAnd => left & integer(b)?,
        BinaryOperator::BitOr => left | integer(b)?,
        BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => {
            integer(b)?;
            let amount = f64_to_u32_checked(b.real)?;
            let shifted = if op == BinaryOperator::ShiftLeft {
                left.checked_shl(amount)
                    .filter(|v| *v >> amount == left)
            } else {
                left.checked_shr(amount)
            };
            shifted.ok_or(RuntimeError::ValueOutOfRange { value: b.real })?
        },
        other => {
            return Err(RuntimeError::TypeError { details: format!("'{other}' is not a bitwise operator") });
        },
    };

    Ok(Value::from(i64_to_f64_checked(result)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_powers_are_exact() {
        assert_eq!(power(ComplexNumber::from(-3.0), ComplexNumber::from(3.0)),
                   ComplexNumber::from(-27.0));
        assert_eq!(power(ComplexNumber::from(4.0), ComplexNumber::from(0.5)),
                   ComplexNumber::from(2.0));
    }

    #[test]
    fn fractional_power_of_negative_is_complex() {
        let root = power(ComplexNumber::from(-4.0), ComplexNumber::from(0.5));
        assert!(root.real.abs() < 1e-12);
        assert!((root.imaginary - 2.0).abs() < 1e-12);
    }

    #[test]
    fn logical_operators_treat_nonzero_as_true() {
        let two = ComplexNumber::from(2.0);
        let zero = ComplexNumber::from(0.0);
        assert_eq!(evaluate(BinaryOperator::And, two, zero), Ok(Value::from(false)));
        assert_eq!(evaluate(BinaryOperator::Or, two, zero), Ok(Value::from(true)));
    }

    #[test]
    fn zero_to_a_negative_power_is_division_by_zero() {
        let zero = ComplexNumber::from(0.0);
        assert_eq!(arithmetic(BinaryOperator::Pow, zero, ComplexNumber::from(-1.0)),
                   Err(RuntimeError::DivisionByZero));
        assert_eq!(arithmetic(BinaryOperator::Pow, zero, ComplexNumber::new(-0.5, 1.0)),
                   Err(RuntimeError::DivisionByZero));
        assert_eq!(arithmetic(BinaryOperator::Pow, zero, ComplexNumber::from(0.0)),
                   Ok(ComplexNumber::from(1.0)));
    }

    #[test]
    fn modulo_rejects_complex_and_zero() {
        let i = ComplexNumber::new(0.0, 1.0);
        assert!(matches!(arithmetic(BinaryOperator::Mod, i, ComplexNumber::from(2.0)),
                         Err(RuntimeError::TypeError { .. })));
        assert_eq!(arithmetic(BinaryOperator::Mod, ComplexNumber::from(1.0), ComplexNumber::from(0.0)),
                   Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn shifts_detect_overflow() {
        let one = ComplexNumber::from(1.0);
        assert_eq!(evaluate(BinaryOperator::ShiftRight, ComplexNumber::from(16.0), ComplexNumber::from(2.0)),
                   Ok(Value::from(4.0)));
        assert!(evaluate(BinaryOperator::ShiftLeft, one, ComplexNumber::from(70.0)).is_err());
        assert!(evaluate(BinaryOperator::ShiftLeft, one, ComplexNumber::from(-1.0)).is_err());
    }
}
