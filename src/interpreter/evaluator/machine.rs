use std::rc::Rc;

use log::trace;

use crate::{
    error::{EvalResult, RuntimeError, RuntimeResult},
    interpreter::{
        compiler::program::{Instruction, Program},
        context::Context,
        dispatch::core::OperatorTable,
        evaluator::cancel::CancellationToken,
        function::core::FunctionRegistry,
        operator::UnaryOperator,
        value::{
            complex::{ComplexNumber, I},
            core::Value,
        },
    },
};

/// Everything a program may read while it runs.
pub struct Machine<'a> {
    /// Variable bindings; never written by the machine.
    pub context:   &'a Context,
    /// Binary operator handlers.
    pub operators: &'a OperatorTable,
    /// Callable functions.
    pub registry:  &'a FunctionRegistry,
    /// Checked before every instruction.
    pub cancel:    &'a CancellationToken,
}

impl Machine<'_> {
    /// Runs a program to completion and returns the single value it leaves.
    ///
    /// # Errors
    /// - `Cancelled` as soon as the token is set.
    /// - `StackUnderflow` when an instruction lacks operands.
    /// - `MalformedProgram` when the final stack does not hold exactly one
    ///   value.
    /// - Any error raised by dispatch, a function or a variable lookup.
    pub fn execute(&self, program: &Program) -> EvalResult<Value> {
        let instructions = program.instructions();
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0;

        while let Some(instruction) = instructions.get(pc) {
            self.cancel.check()?;
            trace!("{pc:>4}: {instruction} (stack {})", stack.len());
            pc += 1;

            match instruction {
                Instruction::Number(n) => stack.push(Value::from(*n)),
                Instruction::Text(s) => stack.push(Value::String(Rc::clone(s))),
                Instruction::Load(name) => stack.push(self.load(name)?),
                Instruction::Unary(op) => {
                    let [operand] = pop_n::<1>(&mut stack, instruction)?;
                    stack.push(unary(*op, operand)?);
                },
                Instruction::Binary(op) => {
                    let [left, right] = pop_n::<2>(&mut stack, instruction)?;
                    stack.push(self.operators.apply(*op, left, right)?);
                },
                Instruction::Call { name, argc } => {
                    let args = split_top(&mut stack, *argc, instruction)?;
                    let function =
                        self.registry
                            .get(name)
                            .ok_or_else(|| RuntimeError::UnknownFunction { name: name.clone() })?;
                    stack.push(function.invoke(&args)?);
                },
                Instruction::Vector(count) => {
                    let parts = split_top(&mut stack, *count, instruction)?;
                    stack.push(build_vector(&parts)?);
                },
                Instruction::JumpIfFalse(target) => {
                    let [condition] = pop_n::<1>(&mut stack, instruction)?;
                    if !condition.is_truthy()? {
                        pc = *target;
                    }
                },
                Instruction::Jump(target) => pc = *target,
            }
        }

        if stack.len() != 1 {
            return Err(RuntimeError::MalformedProgram { remaining: stack.len() }.into());
        }
        stack.pop()
             .ok_or_else(|| RuntimeError::MalformedProgram { remaining: 0 }.into())
    }

    /// Reads a variable. An unbound `i` is the imaginary unit.
    fn load(&self, name: &str) -> RuntimeResult<Value> {
        match self.context.get(name) {
            Some(value) => Ok(value.clone()),
            None if name.eq_ignore_ascii_case("i") => Ok(Value::from(I)),
            None => Err(RuntimeError::UnknownVariable { name: name.to_string() }),
        }
    }
}

/// Removes the top `count` values, oldest first.
fn split_top(stack: &mut Vec<Value>,
             count: usize,
             instruction: &Instruction)
             -> RuntimeResult<Vec<Value>> {
    if stack.len() < count {
        return Err(RuntimeError::StackUnderflow { instruction: instruction.to_string() });
    }
    Ok(stack.split_off(stack.len() - count))
}

fn pop_n<const N: usize>(stack: &mut Vec<Value>,
                         instruction: &Instruction)
                         -> RuntimeResult<[Value; N]> {
    let values = split_top(stack, N, instruction)?;
    values.try_into()
          .map_err(|_| RuntimeError::StackUnderflow { instruction: instruction.to_string() })
}

fn unary(op: UnaryOperator, operand: Value) -> RuntimeResult<Value> {
    match op {
        UnaryOperator::Not => Ok(Value::from(!operand.is_truthy()?)),
        UnaryOperator::Negate => match operand {
            Value::Scalar(c) => Ok(Value::Scalar(-c)),
            Value::RealVector(v) => Ok(Value::from(v.iter().map(|x| -x).collect::<Vec<f64>>())),
            Value::ComplexVector(v) => {
                Ok(Value::from(v.iter().map(|c| -*c).collect::<Vec<ComplexNumber>>()))
            },
            other => Err(RuntimeError::TypeError { details: format!("cannot negate a {}",
                                                                    other.tag()) }),
        },
    }
}

/// Flattens scalars and vectors into one vector, real when possible.
fn build_vector(parts: &[Value]) -> RuntimeResult<Value> {
    let mut elements = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Value::Scalar(_) | Value::RealVector(_) | Value::ComplexVector(_) => {
                elements.extend(part.to_complex_elements()?);
            },
            other => {
                return Err(RuntimeError::TypeError { details: format!("a vector cannot contain a {}",
                                                                      other.tag()) });
            },
        }
    }
    Ok(Value::from(elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::EvalError,
        interpreter::operator::BinaryOperator,
    };

    fn run(instructions: Vec<Instruction>, context: &Context) -> EvalResult<Value> {
        let operators = OperatorTable::standard();
        let registry = FunctionRegistry::standard();
        let cancel = CancellationToken::new();
        let machine = Machine { context,
                                operators: &operators,
                                registry: &registry,
                                cancel: &cancel };
        machine.execute(&Program::new(instructions))
    }

    #[test]
    fn binary_pops_right_then_left() {
        let program = vec![Instruction::Number(10.0),
                           Instruction::Number(4.0),
                           Instruction::Binary(BinaryOperator::Sub)];
        assert_eq!(run(program, &Context::new()), Ok(Value::from(6.0)));
    }

    #[test]
    fn jumps_skip_the_untaken_branch() {
        // 0 ? unknown : 7
        let program = vec![Instruction::Number(0.0),
                           Instruction::JumpIfFalse(4),
                           Instruction::Load("unknown".into()),
                           Instruction::Jump(5),
                           Instruction::Number(7.0)];
        assert_eq!(run(program, &Context::new()), Ok(Value::from(7.0)));
    }

    #[test]
    fn stack_shape_is_checked() {
        let underflow = run(vec![Instruction::Binary(BinaryOperator::Add)], &Context::new());
        assert!(matches!(underflow,
                         Err(EvalError::Runtime(RuntimeError::StackUnderflow { .. }))));

        let leftover = run(vec![Instruction::Number(1.0), Instruction::Number(2.0)],
                           &Context::new());
        assert_eq!(leftover,
                   Err(EvalError::Runtime(RuntimeError::MalformedProgram { remaining: 2 })));

        let empty = run(Vec::new(), &Context::new());
        assert_eq!(empty,
                   Err(EvalError::Runtime(RuntimeError::MalformedProgram { remaining: 0 })));
    }

    #[test]
    fn i_prefers_a_bound_variable() {
        let mut context = Context::new();
        assert_eq!(run(vec![Instruction::Load("i".into())], &context), Ok(Value::from(I)));
        context.set("i", Value::from(3.0));
        assert_eq!(run(vec![Instruction::Load("I".into())], &context), Ok(Value::from(3.0)));
    }

    #[test]
    fn vectors_flatten_their_parts() {
        let program = vec![Instruction::Number(1.0),
                           Instruction::Number(2.0),
                           Instruction::Number(3.0),
                           Instruction::Vector(2),
                           Instruction::Vector(2)];
        assert_eq!(run(program, &Context::new()), Ok(Value::from(vec![1.0, 2.0, 3.0])));

        let with_text = vec![Instruction::Text("a".into()), Instruction::Vector(1)];
        assert!(matches!(run(with_text, &Context::new()),
                         Err(EvalError::Runtime(RuntimeError::TypeError { .. }))));
    }

    #[test]
    fn cancelled_token_stops_execution() {
        let operators = OperatorTable::standard();
        let registry = FunctionRegistry::standard();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let context = Context::new();
        let machine = Machine { context:   &context,
                                operators: &operators,
                                registry:  &registry,
                                cancel:    &cancel, };
        let program = Program::new(vec![Instruction::Number(1.0)]);
        assert_eq!(machine.execute(&program), Err(EvalError::Cancelled));
    }
}
