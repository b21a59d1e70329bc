use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    error::{RuntimeError, RuntimeResult},
    interpreter::{dispatch::date::difference_in_days, value::core::Value},
    util::num::{f64_to_i32_checked, f64_to_u32_checked},
};

fn calendar_day(args: &[Value]) -> RuntimeResult<NaiveDate> {
    let year = f64_to_i32_checked(args[0].as_real()?)?;
    let month = f64_to_u32_checked(args[1].as_real()?)?;
    let day = f64_to_u32_checked(args[2].as_real()?)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        RuntimeError::InvalidArgument { details: format!("{year}-{month}-{day} is not a calendar date") }
    })
}

/// `date(y, m, d)` at midnight.
pub fn date(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(calendar_day(args)?.and_time(NaiveTime::MIN)))
}

/// `datetime(y, m, d, h, mi, s)`.
pub fn datetime(args: &[Value]) -> RuntimeResult<Value> {
    let day = calendar_day(args)?;
    let hour = f64_to_u32_checked(args[3].as_real()?)?;
    let minute = f64_to_u32_checked(args[4].as_real()?)?;
    let second = f64_to_u32_checked(args[5].as_real()?)?;

    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        RuntimeError::InvalidArgument { details: format!("{hour}:{minute}:{second} is not a time of day") }
    })?;
    Ok(Value::from(NaiveDateTime::new(day, time)))
}

pub fn year(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(f64::from(args[0].as_date()?.year())))
}

pub fn month(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(f64::from(args[0].as_date()?.month())))
}

pub fn day(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(f64::from(args[0].as_date()?.day())))
}

/// ISO weekday: Monday is 1, Sunday is 7.
pub fn weekday(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(f64::from(args[0].as_date()?.weekday().number_from_monday())))
}

/// Days from the first date to the second; negative when the second is
/// earlier.
pub fn days(args: &[Value]) -> RuntimeResult<Value> {
    let from = args[0].as_date()?;
    let to = args[1].as_date()?;
    Ok(Value::from(difference_in_days(to, from)?))
}
