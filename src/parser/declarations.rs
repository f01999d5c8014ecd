//! Declaration parsing implementation
//!
//! Handles the two declaration forms of the routine language:
//!
//! - Function declarations: `function name(a, b = 1) { ... }`
//! - Variable declarations: `let x = 1, y;`, `const memo = {};`, `var i;`
//!
//! Function declarations may appear at top level or nested inside a body.

use std::rc::Rc;

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse function declaration; the `function` keyword is already consumed
    pub(crate) fn parse_function_declaration(&mut self) -> Result<AstNode, ParseError> {
        let location = self.previous_location();
        let name = self.expect_identifier()?;

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        self.expect_lbrace("before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after function body")?;

        Ok(AstNode::FunctionDecl(Rc::new(FunctionDef {
            name,
            params,
            body,
            location,
        })))
    }

    /// Parse parameter list: (name, name = default, ...)
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            if self.check(&Token::Ellipsis(self.current_location())) {
                return Err(self.error_here("Rest parameters are not supported"));
            }

            let name = self.expect_identifier()?;
            let default = if self.match_token(&Token::Eq(self.current_location())) {
                Some(Box::new(self.parse_assignment()?))
            } else {
                None
            };
            params.push(Param { name, default });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse variable declaration; the `let`/`const`/`var` keyword is already consumed.
    ///
    /// Does not consume the terminating semicolon so that `for` headers can reuse it.
    pub(crate) fn parse_variable_declarators(
        &mut self,
        kind: DeclKind,
    ) -> Result<AstNode, ParseError> {
        let location = self.previous_location();
        let mut declarations = Vec::new();

        loop {
            let name = self.expect_identifier()?;
            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(Box::new(self.parse_assignment()?))
            } else {
                None
            };

            if kind == DeclKind::Const && init.is_none() {
                return Err(ParseError {
                    message: format!("Missing initializer in const declaration '{}'", name),
                    location,
                });
            }

            declarations.push(Declarator { name, init });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(AstNode::VarDecl {
            kind,
            declarations,
            location,
        })
    }

    /// Consume a `let`/`const`/`var` keyword if present
    pub(crate) fn match_decl_kind(&mut self) -> Option<DeclKind> {
        let kind = match self.peek() {
            Token::Let(_) => DeclKind::Let,
            Token::Const(_) => DeclKind::Const,
            Token::Var(_) => DeclKind::Var,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }
}
