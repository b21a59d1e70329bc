/// The shunting-yard pass turning tokens into a postfix program.
///
/// Operands are emitted as they are read while operators wait on a stack
/// until an operator of lower binding strength, a closing bracket, a comma or
/// the end of input forces them out. Conditionals compile to forward jumps so
/// that only the selected branch executes.
pub mod core;
/// The postfix program produced by the compiler and consumed by the machine.
pub mod program;
