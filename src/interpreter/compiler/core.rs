use std::rc::Rc;

use crate::{
    error::ParseError,
    interpreter::{
        compiler::program::{Instruction, Program},
        function::core::FunctionRegistry,
        lexer::Token,
        operator::{Associativity, BinaryOperator, UnaryOperator},
    },
};

/// Kind of an open bracket on the operator stack.
#[derive(Debug, Clone, PartialEq)]
enum Group {
    /// Plain `(` grouping.
    Paren,
    /// `name(` of a registered function.
    Call(String),
    /// `[` vector literal.
    Vector,
}

impl Group {
    const fn closer(&self) -> char {
        match self {
            Self::Paren | Self::Call(_) => ')',
            Self::Vector => ']',
        }
    }

    const fn opener(&self) -> char {
        match self {
            Self::Paren | Self::Call(_) => '(',
            Self::Vector => '[',
        }
    }
}

/// An entry waiting on the operator stack.
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Open(Group),
    /// `?` seen; holds the index of its `jz`.
    Condition(usize),
    /// `:` seen; holds the index of its `jmp`.
    Alternative(usize),
}

/// Argument bookkeeping for one open bracket.
#[derive(Debug, Default)]
struct Frame {
    commas:      usize,
    /// Whether the current argument has any tokens yet.
    has_content: bool,
}

/// State of one compilation.
struct Compiler<'a> {
    registry:       &'a FunctionRegistry,
    output:         Vec<Instruction>,
    operators:      Vec<Pending>,
    frames:         Vec<Frame>,
    expect_operand: bool,
}

/// Compiles a token sequence into a postfix program.
///
/// Identifiers directly followed by `(` must name a function of `registry`;
/// the argument count of every call and vector literal is resolved here and
/// stored in the emitted instruction.
///
/// # Errors
/// - `EmptyExpression` when there are no tokens.
/// - `UnmatchedBracket` for unbalanced or mismatched brackets.
/// - `StrayComma` for a comma outside an argument list or around an empty
///   argument.
/// - `NotAFunction` when a variable is called.
/// - `MalformedTernary` for a `?` without `:` or a `:` without `?`.
/// - `UnexpectedToken` / `UnexpectedEnd` when operands and operators are out
///   of order.
///
/// # Example
/// ```
/// use quanta::interpreter::{
///     compiler::core::compile, function::core::FunctionRegistry, lexer::tokenize,
/// };
///
/// let registry = FunctionRegistry::standard();
/// let tokens = tokenize("2 * (3 + 4)").unwrap();
/// assert_eq!(compile(&tokens, &registry).unwrap().to_string(), "2 3 4 + *");
/// ```
pub fn compile(tokens: &[Token], registry: &FunctionRegistry) -> Result<Program, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }

    let mut compiler = Compiler { registry,
                                  output: Vec::with_capacity(tokens.len()),
                                  operators: Vec::new(),
                                  frames: Vec::new(),
                                  expect_operand: true };

    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        match token {
            Token::Number(n) => compiler.operand(token, Instruction::Number(*n))?,
            Token::Str(s) => compiler.operand(token, Instruction::Text(Rc::from(s.as_str())))?,
            Token::Identifier(name) => {
                let called = iter.peek() == Some(&&Token::LParen);
                if compiler.registry.contains(name) {
                    if !called {
                        return Err(ParseError::UnexpectedToken { token: format!("function '{name}' without arguments") });
                    }
                    iter.next();
                    compiler.open(token, Group::Call(name.clone()))?;
                } else if called {
                    return Err(ParseError::NotAFunction { name: name.clone() });
                } else {
                    compiler.operand(token, Instruction::Load(name.clone()))?;
                }
            },
            Token::Negate => compiler.unary(token, UnaryOperator::Negate)?,
            Token::Bang => compiler.unary(token, UnaryOperator::Not)?,
            Token::Question => compiler.question(token)?,
            Token::Colon => compiler.colon(token)?,
            Token::Comma => compiler.comma()?,
            Token::LParen => compiler.open(token, Group::Paren)?,
            Token::LBracket => compiler.open(token, Group::Vector)?,
            Token::RParen => compiler.close(token, ')')?,
            Token::RBracket => compiler.close(token, ']')?,
            Token::Assign => return Err(unexpected(token)),
            other => match other.binary_operator() {
                Some(op) => compiler.binary(token, op)?,
                None => return Err(unexpected(token)),
            },
        }
    }

    compiler.finish()
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken { token: token.to_string() }
}

impl Compiler<'_> {
    fn mark_content(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.has_content = true;
        }
    }

    fn operand(&mut self, token: &Token, instruction: Instruction) -> Result<(), ParseError> {
        if !self.expect_operand {
            return Err(unexpected(token));
        }
        self.mark_content();
        self.output.push(instruction);
        self.expect_operand = false;
        Ok(())
    }

    fn unary(&mut self, token: &Token, op: UnaryOperator) -> Result<(), ParseError> {
        if !self.expect_operand {
            return Err(unexpected(token));
        }
        self.mark_content();
        self.operators.push(Pending::Unary(op));
        Ok(())
    }

    fn binary(&mut self, token: &Token, op: BinaryOperator) -> Result<(), ParseError> {
        if self.expect_operand {
            return Err(unexpected(token));
        }

        while let Some(top) = self.operators.last() {
            let yields = match top {
                Pending::Unary(_) => true,
                Pending::Binary(other) => {
                    other.precedence() > op.precedence()
                    || (other.precedence() == op.precedence()
                        && op.associativity() == Associativity::Left)
                },
                _ => false,
            };
            if !yields {
                break;
            }
            self.pop_operator();
        }

        self.operators.push(Pending::Binary(op));
        self.expect_operand = true;
        Ok(())
    }

    fn open(&mut self, token: &Token, group: Group) -> Result<(), ParseError> {
        if !self.expect_operand {
            return Err(unexpected(token));
        }
        self.mark_content();
        self.operators.push(Pending::Open(group));
        self.frames.push(Frame::default());
        Ok(())
    }

    /// Moves the top operator to the output. Alternatives patch their jump.
    fn pop_operator(&mut self) {
        match self.operators.pop() {
            Some(Pending::Binary(op)) => self.output.push(Instruction::Binary(op)),
            Some(Pending::Unary(op)) => self.output.push(Instruction::Unary(op)),
            Some(Pending::Alternative(jump)) => {
                self.output[jump] = Instruction::Jump(self.output.len());
            },
            _ => {},
        }
    }

    /// Pops operators until an open bracket, a pending `?` or the bottom.
    ///
    /// Completed conditionals are closed along the way when
    /// `close_alternatives` is set.
    fn drain(&mut self, close_alternatives: bool) {
        while let Some(top) = self.operators.last() {
            match top {
                Pending::Binary(_) | Pending::Unary(_) => self.pop_operator(),
                Pending::Alternative(_) if close_alternatives => self.pop_operator(),
                _ => break,
            }
        }
    }

    /// Drains the current group, rejecting a `?` that never got its `:`.
    fn drain_group(&mut self) -> Result<(), ParseError> {
        self.drain(true);
        if let Some(Pending::Condition(_)) = self.operators.last() {
            return Err(ParseError::MalformedTernary { details: "missing ':' after '?'".to_string() });
        }
        Ok(())
    }

    fn question(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.expect_operand {
            return Err(unexpected(token));
        }
        // Right-associative at the lowest level: earlier conditionals stay open.
        self.drain(false);
        self.operators.push(Pending::Condition(self.output.len()));
        self.output.push(Instruction::JumpIfFalse(0));
        self.expect_operand = true;
        Ok(())
    }

    fn colon(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.expect_operand {
            return Err(unexpected(token));
        }
        self.drain(true);
        let Some(Pending::Condition(condition)) = self.operators.pop() else {
            return Err(ParseError::MalformedTernary { details: "':' without a matching '?'".to_string() });
        };

        let jump = self.output.len();
        self.output.push(Instruction::Jump(0));
        self.output[condition] = Instruction::JumpIfFalse(jump + 1);
        self.operators.push(Pending::Alternative(jump));
        self.expect_operand = true;
        Ok(())
    }

    fn comma(&mut self) -> Result<(), ParseError> {
        if self.expect_operand {
            return match self.frames.last() {
                Some(frame) if frame.has_content => {
                    Err(ParseError::UnexpectedToken { token: "','".to_string() })
                },
                _ => Err(ParseError::StrayComma),
            };
        }

        self.drain_group()?;
        match self.operators.last() {
            Some(Pending::Open(Group::Call(_) | Group::Vector)) => {},
            _ => return Err(ParseError::StrayComma),
        }

        if let Some(frame) = self.frames.last_mut() {
            frame.commas += 1;
            frame.has_content = false;
        }
        self.expect_operand = true;
        Ok(())
    }

    fn close(&mut self, token: &Token, bracket: char) -> Result<(), ParseError> {
        let Some(frame) = self.frames.last() else {
            return Err(ParseError::UnmatchedBracket { bracket });
        };

        let empty_list = frame.commas == 0 && !frame.has_content;
        if self.expect_operand {
            if frame.commas > 0 && !frame.has_content {
                return Err(ParseError::StrayComma);
            }
            let list = matches!(self.operators.last(),
                                Some(Pending::Open(Group::Call(_) | Group::Vector)));
            if !(empty_list && list) {
                return Err(unexpected(token));
            }
        }
        let count = if empty_list { 0 } else { frame.commas + 1 };

        self.drain_group()?;
        let Some(Pending::Open(group)) = self.operators.pop() else {
            return Err(ParseError::UnmatchedBracket { bracket });
        };
        if group.closer() != bracket {
            return Err(ParseError::UnmatchedBracket { bracket });
        }
        self.frames.pop();

        match group {
            Group::Paren => {},
            Group::Call(name) => self.output.push(Instruction::Call { name, argc: count }),
            Group::Vector => self.output.push(Instruction::Vector(count)),
        }
        self.expect_operand = false;
        Ok(())
    }

    fn finish(mut self) -> Result<Program, ParseError> {
        if self.expect_operand {
            return Err(ParseError::UnexpectedEnd);
        }

        while let Some(top) = self.operators.last() {
            match top {
                Pending::Open(group) => {
                    return Err(ParseError::UnmatchedBracket { bracket: group.opener() });
                },
                Pending::Condition(_) => {
                    return Err(ParseError::MalformedTernary { details: "missing ':' after '?'".to_string() });
                },
                _ => self.pop_operator(),
            }
        }

        Ok(Program::new(self.output))
    }
}
