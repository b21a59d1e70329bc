/// Binary operators of the language, in the order of the precedence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `|`
    BitOr,
    /// `&`
    BitAnd,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
}

/// Prefix operators produced by the tokenizer's post-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Unary `-` that could not be fused into a numeric literal.
    Negate,
    /// Logical `!` / `not`.
    Not,
}

/// Direction in which operators of equal precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`.
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
}

/// Precedence of the conditional operator `? :`, below every binary operator.
pub const TERNARY_PRECEDENCE: u8 = 0;

impl BinaryOperator {
    /// Every binary operator, used to build exhaustive dispatch entries.
    pub const ALL: [Self; 18] = [Self::Or,
                                 Self::And,
                                 Self::BitOr,
                                 Self::BitAnd,
                                 Self::Equal,
                                 Self::NotEqual,
                                 Self::Less,
                                 Self::Greater,
                                 Self::LessEqual,
                                 Self::GreaterEqual,
                                 Self::ShiftLeft,
                                 Self::ShiftRight,
                                 Self::Add,
                                 Self::Sub,
                                 Self::Mul,
                                 Self::Div,
                                 Self::Mod,
                                 Self::Pow];

    /// Elementwise arithmetic operators supported between numbers and
    /// vectors.
    pub const ARITHMETIC: [Self; 6] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Mod, Self::Pow];

    /// Relational and equality operators.
    pub const COMPARISON: [Self; 6] = [Self::Equal,
                                       Self::NotEqual,
                                       Self::Less,
                                       Self::Greater,
                                       Self::LessEqual,
                                       Self::GreaterEqual];

    /// Source symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::BitOr => "|",
            Self::BitAnd => "&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::BitOr => 3,
            Self::BitAnd => 4,
            Self::Equal | Self::NotEqual => 5,
            Self::Less | Self::Greater | Self::LessEqual | Self::GreaterEqual => 6,
            Self::ShiftLeft | Self::ShiftRight => 7,
            Self::Add | Self::Sub => 8,
            Self::Mul | Self::Div | Self::Mod => 9,
            Self::Pow => 10,
        }
    }

    /// Grouping direction for chains of equal precedence.
    #[must_use]
    pub const fn associativity(self) -> Associativity {
        match self {
            Self::Pow => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

impl UnaryOperator {
    /// Prefix operators bind tighter than every binary operator, `^`
    /// included.
    pub const PRECEDENCE: u8 = 11;

    /// Symbol used when rendering programs.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "neg",
            Self::Not => "!",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert!(BinaryOperator::Mul.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Pow.precedence() > BinaryOperator::Mul.precedence());
        assert!(UnaryOperator::PRECEDENCE > BinaryOperator::Pow.precedence());
        assert!(BinaryOperator::Or.precedence() > TERNARY_PRECEDENCE);
    }

    #[test]
    fn only_power_is_right_associative() {
        for op in BinaryOperator::ALL {
            let expected = if op == BinaryOperator::Pow {
                Associativity::Right
            } else {
                Associativity::Left
            };
            assert_eq!(op.associativity(), expected, "{op}");
        }
    }
}
