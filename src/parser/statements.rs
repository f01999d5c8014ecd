//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Declarations: `function`, `let`, `const`, `var`
//! - Control flow: `if`, `while`, `do-while`, `for`, `for-of`
//! - Jump statements: `return`, `break`, `continue`
//! - Blocks: `{ ... }`
//! - Expression statements: calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= function_decl | var_decl | if_stmt | while_stmt | do_while_stmt
//!             | for_stmt | for_of_stmt | return_stmt | break_stmt
//!             | continue_stmt | block | ';' | expr_stmt
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Function(loc)) {
            return self.parse_function_declaration();
        }

        if let Some(kind) = self.match_decl_kind() {
            let decl = self.parse_variable_declarators(kind)?;
            self.expect_semicolon("after variable declaration")?;
            return Ok(decl);
        }

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Do(loc)) {
            return self.parse_do_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_semicolon("after 'break'")?;
            return Ok(AstNode::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_semicolon("after 'continue'")?;
            return Ok(AstNode::Continue { location: loc });
        }

        if self.match_token(&Token::LBrace(loc)) {
            let statements = self.parse_block_statements()?;
            self.expect_rbrace("after block")?;
            return Ok(AstNode::Block {
                statements,
                location: loc,
            });
        }

        // Empty statement
        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(AstNode::Block {
                statements: Vec::new(),
                location: loc,
            });
        }

        if let Token::Ident(name, _) = self.peek() {
            if matches!(name.as_str(), "switch" | "throw" | "try" | "class") {
                return Err(self.error_here(format!("'{}' statements are not supported", name)));
            }
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        // `return` followed by a line break returns undefined
        let ends_here = self.check(&Token::Semicolon(self.current_location()))
            || self.check(&Token::RBrace(self.current_location()))
            || self.is_at_end()
            || self.current_location().line > loc.line;

        let expr = if ends_here {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_semicolon("after return")?;

        Ok(AstNode::Return {
            expr,
            location: loc,
        })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let body = self.parse_statement_or_block()?;

        self.expect_token(
            &Token::While(self.current_location()),
            "Expected 'while' after do body",
        )?;
        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(AstNode::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse `for (init; cond; inc)` or `for (const x of xs)`
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        let is_for_of = matches!(self.peek(), Token::Let(_) | Token::Const(_) | Token::Var(_))
            && matches!(self.peek_ahead(1), Some(Token::Ident(_, _)))
            && matches!(self.peek_ahead(2), Some(Token::Of(_)));

        if is_for_of {
            let kind = self
                .match_decl_kind()
                .ok_or_else(|| self.error_here("Expected declaration in for-of"))?;
            let name = self.expect_identifier()?;
            self.expect_token(&Token::Of(self.current_location()), "Expected 'of'")?;
            let iterable = Box::new(self.parse_expression()?);
            self.expect_rparen("after for-of header")?;
            let body = self.parse_statement_or_block()?;

            return Ok(AstNode::ForOf {
                kind,
                name,
                iterable,
                body,
                location: loc,
            });
        }

        let init = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else if let Some(kind) = self.match_decl_kind() {
            Some(Box::new(self.parse_variable_declarators(kind)?))
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for initializer",
        )?;

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for condition",
        )?;

        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_rparen("after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    /// Parse a braced block or a single statement, returning its statement list
    pub(crate) fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&Token::LBrace(self.current_location())) {
            let statements = self.parse_block_statements()?;
            self.expect_rbrace("after block")?;
            Ok(statements)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_body(body: &str) -> Vec<AstNode> {
        let source = format!("function fn() {{ {} }}", body);
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();
        program.function("fn").unwrap().body.clone()
    }

    #[test]
    fn test_braceless_if_else() {
        let body = parse_body("if (n <= 1) return n; else return fn(n - 1);");
        match &body[0] {
            AstNode::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert!(else_branch.is_some());
            }
            _ => panic!("Expected if statement"),
        }
    }

    #[test]
    fn test_for_loop_with_declaration() {
        let body = parse_body("for (let i = 0; i < 3; i++) { total += i; }");
        assert!(matches!(body[0], AstNode::For { init: Some(_), .. }));
    }

    #[test]
    fn test_for_of_loop() {
        let body = parse_body("for (const x of xs) { total += x; }");
        match &body[0] {
            AstNode::ForOf { name, kind, .. } => {
                assert_eq!(name, "x");
                assert_eq!(*kind, DeclKind::Const);
            }
            _ => panic!("Expected for-of statement"),
        }
    }

    #[test]
    fn test_return_without_value() {
        let body = parse_body("return;");
        assert!(matches!(body[0], AstNode::Return { expr: None, .. }));
    }

    #[test]
    fn test_do_while() {
        let body = parse_body("do { n--; } while (n > 0);");
        assert!(matches!(body[0], AstNode::DoWhile { .. }));
    }

    #[test]
    fn test_switch_rejected() {
        let source = "function fn(n) { switch (n) { } }";
        let mut parser = Parser::new(source).unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(err.message.contains("switch"));
    }
}
