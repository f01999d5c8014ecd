//! Lexer (tokenizer) for routine source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Comments are dropped here; template strings are accepted only when they carry
//! no `${...}` interpolation.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64, SourceLocation),
    Str(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Function(SourceLocation),
    Return(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    Do(SourceLocation),
    For(SourceLocation),
    Of(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Let(SourceLocation),
    Const(SourceLocation),
    Var(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Null(SourceLocation),
    Undefined(SourceLocation),
    Typeof(SourceLocation),
    New(SourceLocation),
    In(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    StarStar(SourceLocation), // **
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),     // ==
    EqEqEq(SourceLocation),   // ===
    NotEq(SourceLocation),    // !=
    NotEqEq(SourceLocation),  // !==
    Lt(SourceLocation),       // <
    Le(SourceLocation),       // <=
    Gt(SourceLocation),       // >
    Ge(SourceLocation),       // >=

    // Logical
    AndAnd(SourceLocation),           // &&
    OrOr(SourceLocation),             // ||
    QuestionQuestion(SourceLocation), // ??
    Bang(SourceLocation),             // !

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Member access and spread
    Dot(SourceLocation),      // .
    Ellipsis(SourceLocation), // ...

    // Ternary
    Question(SourceLocation), // ?
    Colon(SourceLocation),    // :

    // Arrow functions are lexed so the parser can reject them by name
    FatArrow(SourceLocation), // =>

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc) | Token::Str(_, loc) | Token::Ident(_, loc) => *loc,
            Token::Function(loc)
            | Token::Return(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::Do(loc)
            | Token::For(loc)
            | Token::Of(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Let(loc)
            | Token::Const(loc)
            | Token::Var(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Null(loc)
            | Token::Undefined(loc)
            | Token::Typeof(loc)
            | Token::New(loc)
            | Token::In(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::StarStar(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::EqEqEq(loc)
            | Token::NotEq(loc)
            | Token::NotEqEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::QuestionQuestion(loc)
            | Token::Bang(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Ellipsis(loc)
            | Token::Question(loc)
            | Token::Colon(loc)
            | Token::FatArrow(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::Str(s, _) => write!(f, "string \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Function(_) => write!(f, "'function'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::Do(_) => write!(f, "'do'"),
            Token::For(_) => write!(f, "'for'"),
            Token::Of(_) => write!(f, "'of'"),
            Token::Break(_) => write!(f, "'break'"),
            Token::Continue(_) => write!(f, "'continue'"),
            Token::Let(_) => write!(f, "'let'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::Var(_) => write!(f, "'var'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Null(_) => write!(f, "'null'"),
            Token::Undefined(_) => write!(f, "'undefined'"),
            Token::Typeof(_) => write!(f, "'typeof'"),
            Token::New(_) => write!(f, "'new'"),
            Token::In(_) => write!(f, "'in'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::StarStar(_) => write!(f, "'**'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::EqEqEq(_) => write!(f, "'==='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::NotEqEq(_) => write!(f, "'!=='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::QuestionQuestion(_) => write!(f, "'??'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::PercentEq(_) => write!(f, "'%='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Ellipsis(_) => write!(f, "'...'"),
            Token::Question(_) => write!(f, "'?'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::FatArrow(_) => write!(f, "'=>'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for routine source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' | '\'' => self.string_literal(ch, loc),
            '`' => self.template_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)
            }
            'a'..='z' | 'A'..='Z' | '_' | '$' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => {
                if self.match_char('+') {
                    Ok(Token::PlusPlus(loc))
                } else if self.match_char('=') {
                    Ok(Token::PlusEq(loc))
                } else {
                    Ok(Token::Plus(loc))
                }
            }
            '-' => {
                if self.match_char('-') {
                    Ok(Token::MinusMinus(loc))
                } else if self.match_char('=') {
                    Ok(Token::MinusEq(loc))
                } else {
                    Ok(Token::Minus(loc))
                }
            }
            '*' => {
                if self.match_char('*') {
                    Ok(Token::StarStar(loc))
                } else if self.match_char('=') {
                    Ok(Token::StarEq(loc))
                } else {
                    Ok(Token::Star(loc))
                }
            }
            '/' => {
                if self.match_char('=') {
                    Ok(Token::SlashEq(loc))
                } else {
                    Ok(Token::Slash(loc))
                }
            }
            '%' => {
                if self.match_char('=') {
                    Ok(Token::PercentEq(loc))
                } else {
                    Ok(Token::Percent(loc))
                }
            }
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Ok(Token::EqEqEq(loc))
                    } else {
                        Ok(Token::EqEq(loc))
                    }
                } else if self.match_char('>') {
                    Ok(Token::FatArrow(loc))
                } else {
                    Ok(Token::Eq(loc))
                }
            }
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Ok(Token::NotEqEq(loc))
                    } else {
                        Ok(Token::NotEq(loc))
                    }
                } else {
                    Ok(Token::Bang(loc))
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(Token::Le(loc))
                } else {
                    Ok(Token::Lt(loc))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(Token::Ge(loc))
                } else {
                    Ok(Token::Gt(loc))
                }
            }
            '&' => {
                if self.match_char('&') {
                    Ok(Token::AndAnd(loc))
                } else {
                    Err(self.unsupported("bitwise '&'", loc))
                }
            }
            '|' => {
                if self.match_char('|') {
                    Ok(Token::OrOr(loc))
                } else {
                    Err(self.unsupported("bitwise '|'", loc))
                }
            }
            '?' => {
                if self.match_char('?') {
                    Ok(Token::QuestionQuestion(loc))
                } else {
                    Ok(Token::Question(loc))
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    Ok(Token::Ellipsis(loc))
                } else {
                    Ok(Token::Dot(loc))
                }
            }
            ':' => Ok(Token::Colon(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    fn unsupported(&self, what: &str, location: SourceLocation) -> LexError {
        LexError {
            message: format!("Unsupported operator: {}", what),
            location,
        }
    }

    /// Parse a single- or double-quoted string literal
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance(); // consume closing quote
                return Ok(Token::Str(string, loc));
            }
            if ch == '\n' {
                break;
            }

            self.advance();
            if ch == '\\' {
                string.push(self.escape_sequence()?);
            } else {
                string.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse a backtick string without interpolation
    fn template_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            self.advance();
            match ch {
                '`' => return Ok(Token::Str(string, loc)),
                '\\' => string.push(self.escape_sequence()?),
                '$' if self.peek() == Some('{') => {
                    return Err(LexError {
                        message: "Template literal interpolation is not supported".to_string(),
                        location: loc,
                    });
                }
                _ => string.push(ch),
            }
        }

        Err(LexError {
            message: "Unterminated template literal".to_string(),
            location: loc,
        })
    }

    fn escape_sequence(&mut self) -> Result<char, LexError> {
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in string literal".to_string(),
            location: self.current_location(),
        })?;

        Ok(match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            // \\, \', \", \` and any other escaped character stand for themselves
            other => other,
        })
    }

    /// Parse numeric literal (decimal, with optional fraction and exponent)
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first);
        let mut seen_dot = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    num_str.push(ch);
                }
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                num_str.push(ch);
                self.advance();
            } else if ch == 'e' || ch == 'E' {
                num_str.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    num_str.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        let value = num_str.parse::<f64>().map_err(|_| LexError {
            message: format!("Invalid number literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::Number(value, loc))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "function" => Token::Function(loc),
            "return" => Token::Return(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "do" => Token::Do(loc),
            "for" => Token::For(loc),
            "of" => Token::Of(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "let" => Token::Let(loc),
            "const" => Token::Const(loc),
            "var" => Token::Var(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "null" => Token::Null(loc),
            "undefined" => Token::Undefined(loc),
            "typeof" => Token::Typeof(loc),
            "new" => Token::New(loc),
            "in" => Token::In(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("function fn(n) { return 0; }");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Function(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "fn"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::Ident(ref s, _) if s == "n"));
        assert!(matches!(tokens[4], Token::RParen(_)));
        assert!(matches!(tokens[5], Token::LBrace(_)));
        assert!(matches!(tokens[6], Token::Return(_)));
        assert!(matches!(tokens[7], Token::Number(n, _) if n == 0.0));
        assert!(matches!(tokens[8], Token::Semicolon(_)));
        assert!(matches!(tokens[9], Token::RBrace(_)));
        assert!(matches!(tokens[10], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("++ -- += === !== && || ?? ** ... =>");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::EqEqEq(_)));
        assert!(matches!(tokens[4], Token::NotEqEq(_)));
        assert!(matches!(tokens[5], Token::AndAnd(_)));
        assert!(matches!(tokens[6], Token::OrOr(_)));
        assert!(matches!(tokens[7], Token::QuestionQuestion(_)));
        assert!(matches!(tokens[8], Token::StarStar(_)));
        assert!(matches!(tokens[9], Token::Ellipsis(_)));
        assert!(matches!(tokens[10], Token::FatArrow(_)));
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("42 3.5 .25 1e3 1_000");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Number(n, _) if n == 42.0));
        assert!(matches!(tokens[1], Token::Number(n, _) if n == 3.5));
        assert!(matches!(tokens[2], Token::Number(n, _) if n == 0.25));
        assert!(matches!(tokens[3], Token::Number(n, _) if n == 1000.0));
        assert!(matches!(tokens[4], Token::Number(n, _) if n == 1000.0));
    }

    #[test]
    fn test_member_access_after_number() {
        let mut lexer = Lexer::new("arr.length");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "arr"));
        assert!(matches!(tokens[1], Token::Dot(_)));
        assert!(matches!(tokens[2], Token::Ident(ref s, _) if s == "length"));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("let x; // comment\nlet y; /* block\ncomment */ let z;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Let(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Let(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Let(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
        assert_eq!(tokens[6].location().line, 3);
    }

    #[test]
    fn test_string_literals() {
        let mut lexer = Lexer::new(r#""hello\nworld" 'it\'s' `plain`"#);
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Str(ref s, _) if s == "hello\nworld"));
        assert!(matches!(tokens[1], Token::Str(ref s, _) if s == "it's"));
        assert!(matches!(tokens[2], Token::Str(ref s, _) if s == "plain"));
    }

    #[test]
    fn test_template_interpolation_rejected() {
        let mut lexer = Lexer::new("`n = ${n}`");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.message.contains("interpolation"));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }
}
