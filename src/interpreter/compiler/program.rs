use std::{fmt, rc::Rc};

use crate::interpreter::operator::{BinaryOperator, UnaryOperator};

/// A single step of a postfix program.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Pushes a real scalar.
    Number(f64),
    /// Pushes a string.
    Text(Rc<str>),
    /// Pushes the value of a variable. `i` falls back to the imaginary unit.
    Load(String),
    /// Pops one value and pushes the result of a prefix operator.
    Unary(UnaryOperator),
    /// Pops right then left and pushes the dispatched result.
    Binary(BinaryOperator),
    /// Pops `argc` arguments and pushes the result of the named function.
    Call {
        /// Function name as written in the source.
        name: String,
        /// Number of arguments the call site supplies.
        argc: usize,
    },
    /// Pops `n` parts and pushes the vector built from them.
    Vector(usize),
    /// Pops a condition and continues at the target when it is zero.
    JumpIfFalse(usize),
    /// Continues at the target unconditionally.
    Jump(usize),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::Load(name) => write!(f, "{name}"),
            Self::Unary(op) => write!(f, "{op}"),
            Self::Binary(op) => write!(f, "{op}"),
            Self::Call { name, argc } => write!(f, "{name}_{argc}"),
            Self::Vector(n) => write!(f, "vector_{n}"),
            Self::JumpIfFalse(target) => write!(f, "jz@{target}"),
            Self::Jump(target) => write!(f, "jmp@{target}"),
        }
    }
}

/// A compiled expression in postfix order.
///
/// Jump targets are instruction indices; a target equal to [`Program::len`]
/// ends execution.
///
/// # Example
/// ```
/// use quanta::interpreter::evaluator::core::Engine;
///
/// let engine = Engine::default();
/// assert_eq!(engine.compile("1 + 2 * 3").unwrap().to_string(), "1 2 3 * +");
/// assert_eq!(engine.compile("max(1, 2)").unwrap().to_string(), "1 2 max_2");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Wraps an instruction list.
    #[must_use]
    pub const fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// The instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the program has no instructions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_annotated_instructions() {
        let program = Program::new(vec![Instruction::Number(-1.5),
                                         Instruction::Text("hi".into()),
                                         Instruction::Load("x".into()),
                                         Instruction::Unary(UnaryOperator::Negate),
                                         Instruction::Call { name: "concat".into(),
                                                             argc: 3, },
                                         Instruction::Vector(0),
                                         Instruction::JumpIfFalse(8),
                                         Instruction::Jump(9),
                                         Instruction::Binary(BinaryOperator::ShiftLeft)]);
        assert_eq!(program.to_string(),
                   "-1.5 \"hi\" x neg concat_3 vector_0 jz@8 jmp@9 <<");
        assert_eq!(program.len(), 9);
    }
}
