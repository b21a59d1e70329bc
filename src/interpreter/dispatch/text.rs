use crate::interpreter::{
    dispatch::core::OperatorTable,
    operator::BinaryOperator,
    value::core::{Tag, Value},
};

pub(super) fn register(table: &mut OperatorTable) {
    table.register(Tag::String, Tag::String, BinaryOperator::Equal, |left, right| {
             Ok(Value::from(left.as_str()? == right.as_str()?))
         });
    table.register(Tag::String, Tag::String, BinaryOperator::NotEqual, |left, right| {
             Ok(Value::from(left.as_str()? != right.as_str()?))
         });
    table.register(Tag::String, Tag::String, BinaryOperator::Add, |left, right| {
             Ok(Value::from(format!("{}{}", left.as_str()?, right.as_str()?)))
         });
}
