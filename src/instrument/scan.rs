//! Lexical classification of routine text
//!
//! The instrumenter works on text, not on an AST, so every byte is first
//! classified as code or non-code (string literal or comment). Bracket
//! matching and pattern matches only ever consider code bytes.

/// Byte-level code/non-code mask of one source string
pub struct CodeMap<'a> {
    src: &'a [u8],
    code: Vec<bool>,
    comment: Vec<bool>,
}

enum ScanState {
    Code,
    Str(u8),
    LineComment,
    BlockComment,
}

impl<'a> CodeMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let src = source.as_bytes();
        let mut code = vec![true; src.len()];
        let mut comment = vec![false; src.len()];
        let mut state = ScanState::Code;
        let mut i = 0;

        while i < src.len() {
            let b = src[i];
            match state {
                ScanState::Code => match b {
                    b'"' | b'\'' | b'`' => {
                        state = ScanState::Str(b);
                        code[i] = false;
                    }
                    b'/' if src.get(i + 1) == Some(&b'/') => {
                        state = ScanState::LineComment;
                        code[i] = false;
                        comment[i] = true;
                    }
                    b'/' if src.get(i + 1) == Some(&b'*') => {
                        state = ScanState::BlockComment;
                        code[i] = false;
                        code[i + 1] = false;
                        comment[i] = true;
                        comment[i + 1] = true;
                        i += 1;
                    }
                    _ => {}
                },
                ScanState::Str(quote) => {
                    code[i] = false;
                    if b == b'\\' {
                        if let Some(next) = code.get_mut(i + 1) {
                            *next = false;
                        }
                        i += 1;
                    } else if b == quote {
                        state = ScanState::Code;
                    }
                }
                ScanState::LineComment => {
                    if b == b'\n' {
                        state = ScanState::Code;
                    } else {
                        code[i] = false;
                        comment[i] = true;
                    }
                }
                ScanState::BlockComment => {
                    code[i] = false;
                    comment[i] = true;
                    if b == b'*' && src.get(i + 1) == Some(&b'/') {
                        code[i + 1] = false;
                        comment[i + 1] = true;
                        i += 1;
                        state = ScanState::Code;
                    }
                }
            }
            i += 1;
        }

        CodeMap { src, code, comment }
    }

    /// Whether byte `i` is outside strings and comments
    #[inline]
    pub fn is_code(&self, i: usize) -> bool {
        self.code.get(i).copied().unwrap_or(false)
    }

    /// Net `{`/`}` nesting of code bytes before `pos`
    pub fn brace_depth_at(&self, pos: usize) -> i32 {
        let end = pos.min(self.src.len());
        (0..end)
            .filter(|&i| self.code[i])
            .map(|i| match self.src[i] {
                b'{' => 1,
                b'}' => -1,
                _ => 0,
            })
            .sum()
    }

    /// Index of the bracket closing the one at `open`.
    ///
    /// Only brackets of the same kind are counted, so `fn(a[0)` style
    /// mismatches inside the span are not detected here.
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let close = match self.src.get(open)? {
            b'(' => b')',
            b'{' => b'}',
            b'[' => b']',
            _ => return None,
        };
        let open_byte = self.src[open];
        if !self.code[open] {
            return None;
        }

        let mut depth = 0usize;
        for i in open..self.src.len() {
            if !self.code[i] {
                continue;
            }
            if self.src[i] == open_byte {
                depth += 1;
            } else if self.src[i] == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// First index at or after `from` that is not ASCII whitespace
    pub fn skip_whitespace(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.src.len() && self.src[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    }

    /// Last non-whitespace byte before `pos`, with its index
    pub fn previous_significant(&self, pos: usize) -> Option<(usize, u8)> {
        self.src[..pos.min(self.src.len())]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, b)| !b.is_ascii_whitespace())
            .map(|(i, b)| (i, *b))
    }

    /// Last byte before `pos` that belongs to a token, skipping whitespace
    /// and comments. String literal bytes count as token bytes.
    pub fn previous_token_byte(&self, pos: usize) -> Option<(usize, u8)> {
        (0..pos.min(self.src.len()))
            .rev()
            .find(|&i| !self.comment[i] && !self.src[i].is_ascii_whitespace())
            .map(|i| (i, self.src[i]))
    }

    /// First token byte at or after `from`
    pub fn next_token_byte(&self, from: usize) -> Option<(usize, u8)> {
        (from..self.src.len())
            .find(|&i| !self.comment[i] && !self.src[i].is_ascii_whitespace())
            .map(|i| (i, self.src[i]))
    }

    pub fn byte(&self, i: usize) -> Option<u8> {
        self.src.get(i).copied()
    }
}

/// Bytes that may appear in an identifier
#[inline]
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_and_comments_are_not_code() {
        let src = "a('x)') // fn(\n/* { */ b";
        let map = CodeMap::new(src);
        assert!(map.is_code(0));
        assert!(!map.is_code(3));
        assert!(!map.is_code(5));
        assert!(map.is_code(6));
        assert!(!map.is_code(src.find("fn").unwrap()));
        assert!(!map.is_code(src.find('{').unwrap()));
        assert!(map.is_code(src.len() - 1));
    }

    #[test]
    fn test_matching_close_skips_strings() {
        let src = "f(a, ')', (b))";
        let map = CodeMap::new(src);
        assert_eq!(map.matching_close(1), Some(src.len() - 1));
        assert_eq!(map.matching_close(0), None);
    }

    #[test]
    fn test_unbalanced() {
        let map = CodeMap::new("f(a, (b)");
        assert_eq!(map.matching_close(1), None);
    }

    #[test]
    fn test_token_bytes_skip_comments() {
        let src = "a + /* x */ // y\n  'b' c";
        let map = CodeMap::new(src);
        assert_eq!(map.next_token_byte(3), Some((src.find('\'').unwrap(), b'\'')));
        assert_eq!(map.previous_token_byte(src.find('\'').unwrap()), Some((2, b'+')));
        assert_eq!(map.previous_token_byte(src.len()), Some((src.len() - 1, b'c')));
        assert_eq!(map.next_token_byte(src.len()), None);
    }

    #[test]
    fn test_brace_depth() {
        let src = "{ a { b } c }";
        let map = CodeMap::new(src);
        assert_eq!(map.brace_depth_at(src.find('b').unwrap()), 2);
        assert_eq!(map.brace_depth_at(src.find('c').unwrap()), 1);
    }
}
