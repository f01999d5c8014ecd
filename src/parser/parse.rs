//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry points.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: Parsing function and variable declarations
//! - `statements`: Parsing statements (if, while, for, etc.)
//! - `expressions`: Parsing expressions with one method per precedence level
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the routine language
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse the entire program (top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            program.nodes.push(self.parse_statement()?);
        }

        Ok(program)
    }

    /// Parse a comma-separated list of expressions spanning the whole input.
    ///
    /// Used for the top-level invocation arguments supplied alongside a routine.
    pub fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        while !self.is_at_end() {
            args.push(self.parse_argument()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        if !self.is_at_end() {
            return Err(ParseError {
                message: format!("Expected ',' between arguments, found {}", self.peek()),
                location: self.current_location(),
            });
        }

        Ok(args)
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    /// Consume a statement terminator.
    ///
    /// A missing `;` is accepted before `}`, at end of input, or when the next
    /// token starts on a new line.
    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(());
        }

        let on_new_line = self.current_location().line > self.previous_location().line;
        if self.is_at_end() || self.check(&Token::RBrace(self.current_location())) || on_new_line {
            return Ok(());
        }

        Err(self.error_here(format!("Expected ';' {}, found {}", ctx, self.peek())))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here(format!("Expected identifier, found {}", self.peek())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let source = "function fn(n) { return n; }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::FunctionDecl(def) => {
                assert_eq!(def.name, "fn");
                assert_eq!(def.params.len(), 1);
                assert_eq!(def.params[0].name, "n");
                assert_eq!(def.body.len(), 1);
            }
            _ => panic!("Expected function declaration"),
        }
    }

    #[test]
    fn test_parse_default_parameters() {
        let source = "function fn(n = 5, memo = {}) { return n; }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        let def = program.function("fn").unwrap();
        assert!(def.params.iter().all(|p| p.default.is_some()));
    }

    #[test]
    fn test_optional_semicolons() {
        let source = "let a = 1\nlet b = 2\nfunction fn() { return a + b }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.nodes.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        let source = "let a = 1 let b = 2;";
        let mut parser = Parser::new(source).unwrap();
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_parse_argument_list() {
        let mut parser = Parser::new("5, [1, 2, 3], { a: 1 }").unwrap();
        let args = parser.parse_argument_list().unwrap();

        assert_eq!(args.len(), 3);
        assert!(matches!(args[1], AstNode::ArrayLiteral { .. }));
        assert!(matches!(args[2], AstNode::ObjectLiteral { .. }));
    }

    #[test]
    fn test_parse_empty_argument_list() {
        let mut parser = Parser::new("   ").unwrap();
        assert!(parser.parse_argument_list().unwrap().is_empty());
    }
}
