use logos::Logos;

use crate::{error::ParseError, interpreter::operator::BinaryOperator};

/// Represents a lexical token of an expression.
///
/// The logos-generated lexer produces every variant except [`Token::Negate`],
/// which only the post-pass in [`tokenize`] creates. Tokens carry no position
/// information.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// Numeric literal tokens, such as `3.14`, `.5`, `2.` or `2.1e-10`.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),
    /// Double-quoted string literal, quotes stripped. No escapes.
    #[regex(r#""[^"]*""#, parse_string)]
    Str(String),
    /// Variable or function name. Letters may come from any script.
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `&&` or the keyword `and`
    #[token("&&")]
    #[token("and", ignore(case))]
    AndAnd,
    /// `||` or the keyword `or`
    #[token("||")]
    #[token("or", ignore(case))]
    OrOr,
    /// `!` or the keyword `not`
    #[token("!")]
    #[token("not", ignore(case))]
    Bang,
    /// `<<`
    #[token("<<")]
    ShiftLeft,
    /// `>>`
    #[token(">>")]
    ShiftRight,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    NotEqual,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `^`
    #[token("^")]
    Caret,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `|`
    #[token("|")]
    Pipe,
    /// `=`
    #[token("=")]
    Assign,
    /// `?`
    #[token("?")]
    Question,
    /// `:`
    #[token(":")]
    Colon,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// Unary minus that could not be fused into a numeric literal.
    Negate,
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Strips the surrounding quotes from a string literal.
fn parse_string(lex: &logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

impl Token {
    /// Returns the binary operator this token denotes, if any.
    ///
    /// `-` and `!` are reported here in their binary/prefix sense only after
    /// the post-pass has classified them.
    #[must_use]
    pub const fn binary_operator(&self) -> Option<BinaryOperator> {
        Some(match self {
                 Self::OrOr => BinaryOperator::Or,
                 Self::AndAnd => BinaryOperator::And,
                 Self::Pipe => BinaryOperator::BitOr,
                 Self::Ampersand => BinaryOperator::BitAnd,
                 Self::EqualEqual => BinaryOperator::Equal,
                 Self::NotEqual => BinaryOperator::NotEqual,
                 Self::Less => BinaryOperator::Less,
                 Self::Greater => BinaryOperator::Greater,
                 Self::LessEqual => BinaryOperator::LessEqual,
                 Self::GreaterEqual => BinaryOperator::GreaterEqual,
                 Self::ShiftLeft => BinaryOperator::ShiftLeft,
                 Self::ShiftRight => BinaryOperator::ShiftRight,
                 Self::Plus => BinaryOperator::Add,
                 Self::Minus => BinaryOperator::Sub,
                 Self::Star => BinaryOperator::Mul,
                 Self::Slash => BinaryOperator::Div,
                 Self::Percent => BinaryOperator::Mod,
                 Self::Caret => BinaryOperator::Pow,
                 _ => return None,
             })
    }

    /// Returns `true` if a `-` after this token must be a unary minus.
    const fn starts_operand_position(&self) -> bool {
        !matches!(self,
                  Self::Number(_)
                  | Self::Str(_)
                  | Self::Identifier(_)
                  | Self::RParen
                  | Self::RBracket)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(op) = self.binary_operator() {
            return write!(f, "'{op}'");
        }
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Identifier(name) => write!(f, "'{name}'"),
            Self::Bang => write!(f, "'!'"),
            Self::Assign => write!(f, "'='"),
            Self::Question => write!(f, "'?'"),
            Self::Colon => write!(f, "':'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::Comma => write!(f, "','"),
            Self::Negate => write!(f, "unary '-'"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// Converts an expression into its token sequence.
///
/// After lexing, a post-pass classifies every `-`: it is unary when it is the
/// first token or follows an operator, `(`, `[` or `,`. A unary minus in front
/// of a numeric literal is folded into the literal; otherwise it becomes
/// [`Token::Negate`]. A `!` directly followed by `=` is merged into `!=`.
///
/// Empty input yields an empty token list.
///
/// # Errors
/// Returns `UnrecognizedToken` for any character sequence the lexer does not
/// accept.
///
/// # Example
/// ```
/// use quanta::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize("-2 ^ x").unwrap();
/// assert_eq!(tokens,
///            vec![Token::Number(-2.0), Token::Caret, Token::Identifier("x".into())]);
///
/// assert!(tokenize("1 $ 2").is_err());
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut raw = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        match token {
            Ok(tok) => raw.push(tok),
            Err(()) => {
                return Err(ParseError::UnrecognizedToken { token: lexer.slice().to_string() });
            },
        }
    }

    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Minus if tokens.last().is_none_or(Token::starts_operand_position) => {
                if let Some(Token::Number(n)) = iter.peek() {
                    let folded = Token::Number(-*n);
                    iter.next();
                    tokens.push(folded);
                } else {
                    tokens.push(Token::Negate);
                }
            },
            Token::Bang if iter.peek() == Some(&Token::Assign) => {
                iter.next();
                tokens.push(Token::NotEqual);
            },
            other => tokens.push(other),
        }
    }

    Ok(tokens)
}
