use chrono::{NaiveDateTime, TimeDelta};

use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::{
        dispatch::core::OperatorTable,
        operator::BinaryOperator,
        value::core::{Tag, Value},
    },
    util::num::{f64_to_i64_checked, i64_to_f64_checked},
};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub(super) fn register(table: &mut OperatorTable) {
    for op in BinaryOperator::COMPARISON {
        table.register(Tag::Date, Tag::Date, op, move |left, right| {
                 compare(op, left.as_date()?, right.as_date()?)
             });
    }

    table.register(Tag::Date, Tag::Date, BinaryOperator::Sub, |left, right| {
             difference_in_days(left.as_date()?, right.as_date()?).map(Value::from)
         });
    table.register(Tag::Date, Tag::Scalar, BinaryOperator::Add, |left, right| {
             shift(left.as_date()?, right.as_real()?).map(Value::from)
         });
    table.register(Tag::Date, Tag::Scalar, BinaryOperator::Sub, |left, right| {
             shift(left.as_date()?, -right.as_real()?).map(Value::from)
         });
    table.register(Tag::Scalar, Tag::Date, BinaryOperator::Add, |left, right| {
             shift(right.as_date()?, left.as_real()?).map(Value::from)
         });
}

fn compare(op: BinaryOperator, a: NaiveDateTime, b: NaiveDateTime) -> RuntimeResult<Value> {
    let result = match op {
        BinaryOperator::Equal => a == b,
        BinaryOperator::NotEqual => a != b,
        BinaryOperator::Less => a < b,
        BinaryOperator::Greater => a > b,
        BinaryOperator::LessEqual => a <= b,
        BinaryOperator::GreaterEqual => a >= b,
        other => {
            return Err(RuntimeError::TypeError { details: format!("'{other}' is not a comparison") });
        },
    };
    Ok(Value::from(result))
}

/// Signed number of days from `b` to `a`, fractional for partial days.
pub(crate) fn difference_in_days(a: NaiveDateTime, b: NaiveDateTime) -> RuntimeResult<f64> {
    let millis = i64_to_f64_checked((a - b).num_milliseconds())?;
    Ok(millis / MILLIS_PER_DAY)
}

/// Moves a date by a possibly fractional number of days.
fn shift(date: NaiveDateTime, days: f64) -> RuntimeResult<NaiveDateTime> {
    let millis = f64_to_i64_checked((days * MILLIS_PER_DAY).round())?;
    TimeDelta::try_milliseconds(millis).and_then(|delta| date.checked_add_signed(delta))
                                       .ok_or(RuntimeError::ValueOutOfRange { value: days })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Value {
        let day = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Value::from(day.and_hms_opt(0, 0, 0).unwrap())
    }

    fn apply(op: BinaryOperator, left: Value, right: Value) -> RuntimeResult<Value> {
        OperatorTable::standard().apply(op, left, right)
    }

    #[test]
    fn subtracting_dates_counts_days() {
        assert_eq!(apply(BinaryOperator::Sub, date(2024, 3, 1), date(2024, 2, 1)),
                   Ok(Value::from(29.0)));
    }

    #[test]
    fn adding_days_moves_the_date() {
        assert_eq!(apply(BinaryOperator::Add, date(2023, 12, 31), Value::from(1.0)),
                   Ok(date(2024, 1, 1)));
        assert_eq!(apply(BinaryOperator::Add, Value::from(2.0), date(2024, 2, 28)),
                   Ok(date(2024, 3, 1)));
        assert_eq!(apply(BinaryOperator::Sub, date(2024, 1, 1), Value::from(1.0)),
                   Ok(date(2023, 12, 31)));
    }

    #[test]
    fn dates_compare_chronologically() {
        assert_eq!(apply(BinaryOperator::Less, date(2020, 1, 1), date(2021, 1, 1)),
                   Ok(Value::from(true)));
        assert_eq!(apply(BinaryOperator::Equal, date(2020, 1, 1), date(2020, 1, 1)),
                   Ok(Value::from(true)));
    }

    #[test]
    fn huge_offsets_are_rejected() {
        assert!(apply(BinaryOperator::Add, date(2020, 1, 1), Value::from(1e12)).is_err());
    }
}
