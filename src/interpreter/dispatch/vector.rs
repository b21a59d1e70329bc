use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::{
        dispatch::{core::OperatorTable, scalar::arithmetic},
        operator::BinaryOperator,
        value::{
            complex::ComplexNumber,
            core::{Tag, Value},
        },
    },
};

pub(super) fn register(table: &mut OperatorTable) {
    for op in BinaryOperator::ARITHMETIC {
        table.register(Tag::ComplexVector, Tag::Scalar, op, move |left, right| {
                 let scalar = right.as_complex()?;
                 map(&left.to_complex_elements()?, |element| arithmetic(op, element, scalar))
             });
        table.register(Tag::Scalar, Tag::ComplexVector, op, move |left, right| {
                 let scalar = left.as_complex()?;
                 map(&right.to_complex_elements()?, |element| arithmetic(op, scalar, element))
             });
        table.register(Tag::ComplexVector, Tag::ComplexVector, op, move |left, right| {
                 elementwise(op, &left.to_complex_elements()?, &right.to_complex_elements()?)
             });
    }

    table.register(Tag::ComplexVector,
                   Tag::ComplexVector,
                   BinaryOperator::Equal,
                   |left, right| Ok(Value::from(left == right)));
    table.register(Tag::ComplexVector,
                   Tag::ComplexVector,
                   BinaryOperator::NotEqual,
                   |left, right| Ok(Value::from(left != right)));
}

fn map<F>(elements: &[ComplexNumber], f: F) -> RuntimeResult<Value>
    where F: Fn(ComplexNumber) -> RuntimeResult<ComplexNumber>
{
    let result = elements.iter()
                         .map(|element| f(*element))
                         .collect::<RuntimeResult<Vec<_>>>()?;
    Ok(Value::from(result))
}

fn elementwise(op: BinaryOperator,
               left: &[ComplexNumber],
               right: &[ComplexNumber])
               -> RuntimeResult<Value> {
    if left.len() != right.len() {
        return Err(RuntimeError::InvalidArgument { details: format!("'{op}' needs vectors of equal length, found {} and {}",
                                                                    left.len(),
                                                                    right.len()) });
    }

    let result = left.iter()
                     .zip(right)
                     .map(|(a, b)| arithmetic(op, *a, *b))
                     .collect::<RuntimeResult<Vec<_>>>()?;
    Ok(Value::from(result))
}
