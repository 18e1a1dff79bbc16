// Basil Language Interpreter Library
//
// Core library for the basil interpreter: a small expression language with
// BASIC-flavored keywords, evaluated by a lexer / recursive-descent parser /
// tree-walking evaluator pipeline with position-tracked diagnostics.

// Public modules
pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{BasilError, ErrorKind};
pub use interpreter::{Context, Interpreter, SymbolTable};
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::Parser;
pub use position::{Position, Span};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
