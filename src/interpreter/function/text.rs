use crate::{
    error::RuntimeResult,
    interpreter::value::core::Value,
    util::num::usize_to_f64_checked,
};

pub fn upper(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(args[0].as_str()?.to_uppercase()))
}

pub fn lower(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(args[0].as_str()?.to_lowercase()))
}

/// Length in characters, not bytes.
pub fn strlen(args: &[Value]) -> RuntimeResult<Value> {
    let count = args[0].as_str()?.chars().count();
    Ok(Value::from(usize_to_f64_checked(count)?))
}

/// Joins the display form of every argument.
pub fn concat(args: &[Value]) -> RuntimeResult<Value> {
    Ok(Value::from(args.iter().map(ToString::to_string).collect::<String>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_conversion_handles_unicode() {
        assert_eq!(upper(&[Value::from("straße")]), Ok(Value::from("STRASSE")));
        assert_eq!(lower(&[Value::from("ÄB")]), Ok(Value::from("äb")));
    }

    #[test]
    fn strlen_counts_characters() {
        assert_eq!(strlen(&[Value::from("héllo")]), Ok(Value::from(5.0)));
        assert!(strlen(&[Value::from(1.0)]).is_err());
    }

    #[test]
    fn concat_formats_every_value() {
        let args = [Value::from("x = "), Value::from(2.5), Value::from(vec![1.0, 2.0])];
        assert_eq!(concat(&args), Ok(Value::from("x = 2.5[1, 2]")));
    }
}
