//! Routine source parser
//!
//! This module transforms routine text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser state, helpers and entry points (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! The parser accepts a conventional JavaScript-style subset:
//! - Function declarations with default parameters, `let`/`const`/`var`
//! - Statements: blocks, `if`/`else`, `while`, `do-while`, `for`, `for-of`,
//!   `return`, `break`, `continue`
//! - Expressions: arithmetic, comparison, logical, ternary, calls, member
//!   access, indexing, array and object literals
//! - No arrow functions, classes, `switch`, exceptions or template interpolation
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser};
