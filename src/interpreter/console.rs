// Captured console output for console.log

use crate::parser::ast::SourceLocation;

/// Mock console collecting `console.log` output instead of writing to the terminal
#[derive(Debug, Clone, Default)]
pub struct Console {
    pub lines: Vec<ConsoleLine>,
}

/// A line of console output with the location of the call that printed it
#[derive(Debug, Clone)]
pub struct ConsoleLine {
    pub text: String,
    pub location: SourceLocation,
}

impl Console {
    pub fn new() -> Self {
        Console { lines: Vec::new() }
    }

    /// Record one `console.log` call; embedded newlines become separate lines
    pub fn log(&mut self, text: String, location: SourceLocation) {
        tracing::debug!(line = location.line, "console.log: {}", text);
        for part in text.split('\n') {
            self.lines.push(ConsoleLine {
                text: part.to_string(),
                location,
            });
        }
    }

    /// Get all lines as a vector of strings
    pub fn output(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
