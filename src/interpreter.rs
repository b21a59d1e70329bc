/// The compiler module turns tokens into a postfix program.
///
/// The compiler runs a shunting-yard pass over the token stream produced by
/// the lexer and emits a flat list of instructions in reverse Polish order.
/// Function calls and vector literals record their argument counts, and
/// conditional expressions compile to forward jumps.
///
/// # Responsibilities
/// - Orders operators by precedence and associativity.
/// - Validates bracket balance, argument lists and operand placement.
/// - Rejects calls to unknown functions and bare references to known ones.
pub mod compiler;
/// The variable store evaluations read from and assignments write to.
pub mod context;
/// Binary operator dispatch.
///
/// Every binary operator is looked up by the tags of its two operands, so
/// new value types or operator meanings can be added by registering handlers
/// rather than by editing the machine.
///
/// # Responsibilities
/// - Maps `(left tag, right tag, operator)` to a handler.
/// - Provides the standard handlers for scalars, vectors, strings and dates.
/// - Reports unsupported combinations with the operand type names.
pub mod dispatch;
/// The evaluator module executes compiled programs and statements.
///
/// The evaluator ties the compiler, the stack machine and the context
/// together. It handles assignments, compound assignments and increments,
/// the optional text-rewriting strategy for conditionals, multi-line scripts
/// and cooperative cancellation.
///
/// # Responsibilities
/// - Evaluates statements against a context and commits assignments only on
///   success.
/// - Enforces the recursion limit and polls the cancellation token.
/// - Reports failures wrapped with the expression that caused them.
pub mod evaluator;
/// The function library.
///
/// Declares the registry the compiler and the machine resolve calls against,
/// along with the built-in numeric, vector, string and calendar functions.
pub mod function;
/// The lexer module tokenizes source text for the compiler.
///
/// The lexer reads the raw source and produces tokens for numbers, strings,
/// identifiers, operators and brackets. It also separates unary minus from
/// subtraction, folding it into numeric literals where it directly precedes
/// one.
///
/// # Responsibilities
/// - Converts the input character stream into tokens.
/// - Recognizes word operators such as `and`, `or` and `not`.
/// - Reports unrecognized input.
pub mod lexer;
/// Operator kinds, precedence and associativity.
pub mod operator;
/// The value module defines the runtime data types for evaluation.
///
/// Values are complex scalars, vectors of complex numbers, strings and
/// calendar timestamps. Booleans are represented as the scalars `1` and `0`.
///
/// # Responsibilities
/// - Defines the `Value` enum and its type tags.
/// - Implements conversions and checked accessors for each variant.
/// - Widens real vectors to complex ones ahead of operator dispatch.
pub mod value;
