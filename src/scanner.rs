//! Character cursor shared by the Zinc reader, the filter parser and the JSON
//! decoder's temporal payloads.

use crate::Error;
use std::borrow::Cow;

/// A forward-only cursor over text with one character of lookahead and a
/// 1-based line counter.
pub(crate) struct Scanner<'a> {
    input: Cow<'a, str>,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new<S: Into<Cow<'a, str>>>(input: S) -> Self {
        Scanner {
            input: input.into(),
            pos: 0,
            line: 1,
        }
    }

    /// The current character, not yet consumed.
    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// The character after the current one.
    #[inline]
    pub(crate) fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    #[inline]
    pub(crate) fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Consumes and returns the current character.
    pub(crate) fn next_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// Consumes `ch` if it is the current character.
    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.next_char();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, ch: char) -> Result<(), Error> {
        match self.peek() {
            Some(c) if c == ch => {
                self.next_char();
                Ok(())
            }
            Some(c) => Err(self.err(format!("Expected '{}', not '{}'", ch, c))),
            None => Err(self.err(format!("Expected '{}', not end of input", ch))),
        }
    }

    /// Consumes characters while `pred` holds and returns them.
    pub(crate) fn take_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.next_char();
        }
        &self.input[start..self.pos]
    }

    /// Skips spaces and tabs, staying on the current line.
    pub(crate) fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.next_char();
        }
    }

    /// Skips all whitespace, newlines included.
    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.next_char();
        }
    }

    /// Returns `true` if the rest of the input starts with `word` followed by
    /// a character that cannot continue an identifier.
    pub(crate) fn at_keyword(&self, word: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(word)
            && !rest[word.len()..]
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// A parse error at the current line.
    pub(crate) fn err<M: std::fmt::Display>(&self, msg: M) -> Error {
        Error::parse(self.line, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_counting() {
        let mut sc = Scanner::new("a\nb\n");
        assert_eq!(sc.line(), 1);
        sc.next_char();
        assert_eq!(sc.peek(), Some('\n'));
        assert_eq!(sc.line(), 1);
        sc.next_char();
        assert_eq!(sc.line(), 2);
    }

    #[test]
    fn test_lookahead() {
        let sc = Scanner::new("->x");
        assert_eq!(sc.peek(), Some('-'));
        assert_eq!(sc.peek_next(), Some('>'));
        assert_eq!(Scanner::new("").peek_next(), None);
    }

    #[test]
    fn test_take_while_multibyte() {
        let mut sc = Scanner::new("°Fx,");
        assert_eq!(sc.take_while(|c| c != ','), "°Fx");
        assert!(sc.eat(','));
        assert!(sc.is_eof());
    }

    #[test]
    fn test_at_keyword() {
        let sc = Scanner::new("and x");
        assert!(sc.at_keyword("and"));
        assert!(!Scanner::new("andy").at_keyword("and"));
    }

    #[test]
    fn test_expect_reports_line() {
        let mut sc = Scanner::new("\n\nx");
        sc.skip_whitespace();
        let err = sc.expect(',').unwrap_err();
        assert_eq!(err.line(), Some(3));
    }
}
