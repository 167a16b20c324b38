//! A tree-walking interpreter for the Monkey programming language:
//! lexer, Pratt parser, and an evaluator with first-class closures.

pub mod ast;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod token;
