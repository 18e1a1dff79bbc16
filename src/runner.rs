use crate::error::BasilError;
use crate::interpreter::{Context, Interpreter, SymbolTable};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;

/// Runs one program: text → tokens → AST → value. The first error anywhere
/// aborts the remaining stages.
///
/// The root scope is owned by the caller; runs are independent unless the
/// caller hands them the same table. `Ok(None)` means the program produced
/// no printable result (a loop, or an `IF` where no branch ran).
pub fn run(
    source_name: &str,
    text: &str,
    globals: &mut SymbolTable,
) -> Result<Option<Value>, BasilError> {
    let mut lexer = Lexer::new(source_name, text);
    let tokens = lexer.scan_tokens()?;

    let mut parser = Parser::new(tokens);
    let ast = parser.parse()?;

    let context = Context::root("<program>");
    Interpreter::new().visit(&ast, &context, globals)
}
