//! Expression parsing implementation
//!
//! This module handles parsing of routine expressions using one method per
//! precedence level, from assignment down to primary expressions.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, booleans, `null`, `undefined`
//! - Array and object literals, including spread elements and shorthand keys
//! - Binary operators: arithmetic, `**`, comparison, `in`, logical, `??`
//! - Unary operators: `-`, `+`, `!`, `typeof`, `++`, `--`
//! - Postfix: `[]`, `.`, `()`, `++`, `--`
//! - Ternary: `? :`
//! - Construction: `new Array(n)`, `new Object()`
//!
//! # Precedence (lowest to highest)
//!
//! ```text
//! assignment < ternary < || ?? < && < equality < relational < additive
//!            < multiplicative < ** < unary < postfix < primary
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment or ternary (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_ternary()?;

        let loc = self.current_location();
        if self.check(&Token::FatArrow(loc)) {
            return Err(self.error_here("Arrow functions are not supported"));
        }

        if self.match_token(&Token::Eq(loc)) {
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Assignment {
                lhs: Box::new(expr),
                rhs,
                location: loc,
            });
        }

        // Compound assignments
        let compound_op = if self.match_token(&Token::PlusEq(loc)) {
            Some(BinOp::Add)
        } else if self.match_token(&Token::MinusEq(loc)) {
            Some(BinOp::Sub)
        } else if self.match_token(&Token::StarEq(loc)) {
            Some(BinOp::Mul)
        } else if self.match_token(&Token::SlashEq(loc)) {
            Some(BinOp::Div)
        } else if self.match_token(&Token::PercentEq(loc)) {
            Some(BinOp::Mod)
        } else {
            None
        };

        if let Some(op) = compound_op {
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::CompoundAssignment {
                lhs: Box::new(expr),
                op,
                rhs,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse a call argument or array element, allowing a leading spread
    pub(crate) fn parse_argument(&mut self) -> Result<AstNode, ParseError> {
        if self.match_token(&Token::Ellipsis(self.current_location())) {
            let loc = self.previous_location();
            let expr = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Spread {
                expr,
                location: loc,
            });
        }
        self.parse_assignment()
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_ternary(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.match_token(&Token::Question(self.current_location())) {
            let loc = self.previous_location();
            let true_expr = Box::new(self.parse_assignment()?);
            self.expect_token(
                &Token::Colon(self.current_location()),
                "Expected ':' in ternary expression",
            )?;
            let false_expr = Box::new(self.parse_assignment()?);

            return Ok(AstNode::TernaryOp {
                condition: Box::new(expr),
                true_expr,
                false_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||) and nullish coalescing (??)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;

        loop {
            let op = if self.match_token(&Token::OrOr(self.current_location())) {
                BinOp::Or
            } else if self.match_token(&Token::QuestionQuestion(self.current_location())) {
                BinOp::Nullish
            } else {
                break;
            };

            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse equality (==, !=, ===, !==)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.peek() {
                Token::EqEq(_) => BinOp::Eq,
                Token::NotEq(_) => BinOp::Ne,
                Token::EqEqEq(_) => BinOp::StrictEq,
                Token::NotEqEq(_) => BinOp::StrictNe,
                _ => break,
            };
            self.advance();

            let loc = self.previous_location();
            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse relational (<, <=, >, >=, in)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek() {
                Token::Lt(_) => BinOp::Lt,
                Token::Le(_) => BinOp::Le,
                Token::Gt(_) => BinOp::Gt,
                Token::Ge(_) => BinOp::Ge,
                Token::In(_) => BinOp::In,
                _ => break,
            };
            self.advance();

            let loc = self.previous_location();
            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+, -)
    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek() {
                Token::Plus(_) => BinOp::Add,
                Token::Minus(_) => BinOp::Sub,
                _ => break,
            };
            self.advance();

            let loc = self.previous_location();
            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (*, /, %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.peek() {
                Token::Star(_) => BinOp::Mul,
                Token::Slash(_) => BinOp::Div,
                Token::Percent(_) => BinOp::Mod,
                _ => break,
            };
            self.advance();

            let loc = self.previous_location();
            let right = Box::new(self.parse_exponent()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse exponentiation (**), right-associative
    fn parse_exponent(&mut self) -> Result<AstNode, ParseError> {
        let base = self.parse_unary()?;

        if self.match_token(&Token::StarStar(self.current_location())) {
            let loc = self.previous_location();
            let exponent = Box::new(self.parse_exponent()?);
            return Ok(AstNode::BinaryOp {
                op: BinOp::Pow,
                left: Box::new(base),
                right: exponent,
                location: loc,
            });
        }

        Ok(base)
    }

    /// Parse unary operators
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = match self.peek() {
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Plus(_) => Some(UnOp::Plus),
            Token::Bang(_) => Some(UnOp::Not),
            Token::Typeof(_) => Some(UnOp::TypeOf),
            Token::PlusPlus(_) => Some(UnOp::PreInc),
            Token::MinusMinus(_) => Some(UnOp::PreDec),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = Box::new(self.parse_unary()?);
            return Ok(AstNode::UnaryOp {
                op,
                operand,
                location: loc,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix operators: member access, indexing, calls, ++ and --
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::Dot(loc)) {
                let member = self.expect_identifier()?;
                expr = AstNode::MemberAccess {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after index",
                )?;
                expr = AstNode::IndexAccess {
                    object: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                let args = self.parse_call_arguments()?;
                expr = match expr {
                    AstNode::Variable(name, location) => AstNode::FunctionCall {
                        name,
                        args,
                        location,
                    },
                    AstNode::MemberAccess {
                        object,
                        member,
                        location,
                    } => AstNode::MethodCall {
                        object,
                        method: member,
                        args,
                        location,
                    },
                    _ => {
                        return Err(ParseError {
                            message: "Only named functions and methods can be called".to_string(),
                            location: loc,
                        })
                    }
                };
            } else if self.check(&Token::PlusPlus(loc)) || self.check(&Token::MinusMinus(loc)) {
                // A line break before ++/-- starts a new statement
                if loc.line > self.previous_location().line {
                    break;
                }
                let op = if matches!(self.advance(), Token::PlusPlus(_)) {
                    UnOp::PostInc
                } else {
                    UnOp::PostDec
                };
                expr = AstNode::UnaryOp {
                    op,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse call arguments after the opening parenthesis, consuming the closing one
    fn parse_call_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            args.push(self.parse_argument()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    /// Parse primary expressions
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek().clone() {
            Token::Number(n, _) => {
                self.advance();
                Ok(AstNode::NumberLiteral(n, loc))
            }
            Token::Str(s, _) => {
                self.advance();
                Ok(AstNode::StringLiteral(s, loc))
            }
            Token::True(_) => {
                self.advance();
                Ok(AstNode::BoolLiteral(true, loc))
            }
            Token::False(_) => {
                self.advance();
                Ok(AstNode::BoolLiteral(false, loc))
            }
            Token::Null(_) => {
                self.advance();
                Ok(AstNode::Null { location: loc })
            }
            Token::Undefined(_) => {
                self.advance();
                Ok(AstNode::Undefined { location: loc })
            }
            Token::Ident(name, _) => {
                self.advance();
                Ok(AstNode::Variable(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                if self.check(&Token::RParen(self.current_location())) {
                    return Err(ParseError {
                        message: "Arrow functions are not supported".to_string(),
                        location: loc,
                    });
                }
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                if self.check(&Token::FatArrow(self.current_location())) {
                    return Err(self.error_here("Arrow functions are not supported"));
                }
                Ok(expr)
            }
            Token::LBracket(_) => {
                self.advance();
                self.parse_array_literal(loc)
            }
            Token::LBrace(_) => {
                self.advance();
                self.parse_object_literal(loc)
            }
            Token::New(_) => {
                self.advance();
                let constructor = self.expect_identifier()?;
                let args = if self.match_token(&Token::LParen(self.current_location())) {
                    self.parse_call_arguments()?
                } else {
                    Vec::new()
                };
                Ok(AstNode::New {
                    constructor,
                    args,
                    location: loc,
                })
            }
            Token::Function(_) => Err(self.error_here("Function expressions are not supported")),
            tok => Err(self.error_here(format!("Unexpected {} in expression", tok))),
        }
    }

    /// Parse array literal after the opening bracket
    fn parse_array_literal(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        let mut elements = Vec::new();

        while !self.check(&Token::RBracket(self.current_location())) {
            elements.push(self.parse_argument()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_token(
            &Token::RBracket(self.current_location()),
            "Expected ']' after array elements",
        )?;

        Ok(AstNode::ArrayLiteral { elements, location })
    }

    /// Parse object literal after the opening brace
    fn parse_object_literal(&mut self, location: SourceLocation) -> Result<AstNode, ParseError> {
        let mut properties = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) {
            let key_loc = self.current_location();
            let (key, shorthand_ok) = match self.peek().clone() {
                Token::Ident(name, _) => (name, true),
                Token::Str(s, _) => (s, false),
                Token::Number(n, _) => (crate::trace::node::format_number(n), false),
                tok => {
                    return Err(self.error_here(format!("Unexpected {} in object literal", tok)))
                }
            };
            self.advance();

            let value = if self.match_token(&Token::Colon(self.current_location())) {
                self.parse_assignment()?
            } else if shorthand_ok {
                AstNode::Variable(key.clone(), key_loc)
            } else {
                return Err(self.error_here(format!("Expected ':' after key '{}'", key)));
            };
            properties.push((key, value));

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rbrace("after object literal")?;

        Ok(AstNode::ObjectLiteral {
            properties,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_expr(source: &str) -> AstNode {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_expression().unwrap()
    }

    #[test]
    fn test_precedence() {
        match parse_expr("1 + 2 * 3") {
            AstNode::BinaryOp { op, right, .. } => {
                assert_eq!(op, BinOp::Add);
                assert!(matches!(*right, AstNode::BinaryOp { op: BinOp::Mul, .. }));
            }
            _ => panic!("Expected binary op"),
        }
    }

    #[test]
    fn test_exponent_right_associative() {
        match parse_expr("2 ** 3 ** 2") {
            AstNode::BinaryOp { op, right, .. } => {
                assert_eq!(op, BinOp::Pow);
                assert!(matches!(*right, AstNode::BinaryOp { op: BinOp::Pow, .. }));
            }
            _ => panic!("Expected binary op"),
        }
    }

    #[test]
    fn test_call_and_method_call() {
        assert!(matches!(
            parse_expr("fn(n - 1, memo)"),
            AstNode::FunctionCall { ref name, ref args, .. } if name == "fn" && args.len() == 2
        ));
        assert!(matches!(
            parse_expr("arr.slice(1)"),
            AstNode::MethodCall { ref method, .. } if method == "slice"
        ));
    }

    #[test]
    fn test_object_literal_shorthand() {
        match parse_expr("{ n, depth: 2, }") {
            AstNode::ObjectLiteral { properties, .. } => {
                assert_eq!(properties.len(), 2);
                assert_eq!(properties[0].0, "n");
                assert!(matches!(properties[0].1, AstNode::Variable(ref v, _) if v == "n"));
            }
            _ => panic!("Expected object literal"),
        }
    }

    #[test]
    fn test_spread_in_array() {
        match parse_expr("[...rest, 1]") {
            AstNode::ArrayLiteral { elements, .. } => {
                assert!(matches!(elements[0], AstNode::Spread { .. }));
            }
            _ => panic!("Expected array literal"),
        }
    }

    #[test]
    fn test_arrow_function_rejected() {
        let mut parser = Parser::new("(x) => x").unwrap();
        let err = parser.parse_expression().unwrap_err();
        assert!(err.message.contains("Arrow"));
    }

    #[test]
    fn test_compound_assignment() {
        assert!(matches!(
            parse_expr("total += 2"),
            AstNode::CompoundAssignment { op: BinOp::Add, .. }
        ));
    }
}
