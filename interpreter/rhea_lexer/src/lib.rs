//! Lexer for Rhea source text.
//!
//! A linear scanner keeping `(index, line, column)`, classifying each start
//! character and consuming the longest valid token. Operators are matched
//! greedy-longest against the fixed operator table; identifiers are runs of
//! anything that is not whitespace, not an operator character, and does not
//! start with a digit.

mod convert;
mod tables;

pub use convert::translate_digit;
pub use tables::{is_keyword, is_operator, OPERATORS};

use rhea_ir::{Token, TokenCategory};
use thiserror::Error;

/// Scanner failure; fatal for the file being lexed.
#[derive(Debug, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct LexicalError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl LexicalError {
    fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        LexicalError {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Returns `true` when `text` lexes to exactly one identifier token.
///
/// Exposed for reflective natives that synthesise bindings at runtime.
pub fn is_valid_identifier(text: &str) -> bool {
    let mut lexer = Lexer::new(text, "<identifier-check>");
    match lexer.scan() {
        Ok(tokens) => {
            tokens.len() == 1 && tokens[0].category() == TokenCategory::Identifier
        }
        Err(_) => false,
    }
}

/// Source-to-token scanner.
pub struct Lexer {
    source: Vec<char>,
    file: String,
    index: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str, file: impl Into<String>) -> Self {
        Lexer {
            source: source.chars().collect(),
            file: file.into(),
            index: 0,
            line: 1,
            column: 0,
            tokens: Vec::new(),
        }
    }

    /// Load a source file from disk.
    pub fn from_file(path: &std::path::Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Lexer::new(&source, path.to_string_lossy()))
    }

    /// Scan the whole input, consuming the lexer.
    pub fn scan(&mut self) -> Result<Vec<Token>, LexicalError> {
        while !self.is_at_end() {
            let current = self.advance();

            if is_whitespace(current) {
                if current == '\n' {
                    self.line += 1;
                    self.column = 0;
                }
            } else if current == '#' {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else if current == '"' {
                self.scan_delimited('"', TokenCategory::String, "string literal")?;
            } else if current == '`' {
                self.scan_delimited('`', TokenCategory::Regex, "regular expression literal")?;
            } else if is_operator_char(current) {
                self.scan_operator(current);
            } else if current.is_ascii_digit() {
                self.scan_number(current)?;
            } else {
                self.scan_word(current);
            }
        }

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_delimited(
        &mut self,
        terminator: char,
        category: TokenCategory,
        what: &str,
    ) -> Result<(), LexicalError> {
        let start_line = self.line;
        let start_column = self.column;
        let mut text = String::new();

        while !self.is_at_end() && self.peek() != terminator {
            let ch = self.advance();

            if ch == '\n' {
                return Err(LexicalError::new(
                    format!("Found new line inside {what}."),
                    self.line,
                    self.column,
                ));
            } else if ch == '\\' {
                if self.is_at_end() {
                    return Err(LexicalError::new(
                        "Expecting escape character, encountered end-of-file.",
                        self.line,
                        self.column,
                    ));
                }
                text.push(ch);
                text.push(self.advance());
            } else {
                text.push(ch);
            }
        }

        if self.is_at_end() {
            return Err(LexicalError::new(
                format!("Unterminated {what}."),
                start_line,
                start_column,
            ));
        }
        self.advance();

        self.tokens.push(Token::new(
            replace_escape_sequences(&text),
            self.file.clone(),
            start_line,
            start_column,
            category,
        ));
        Ok(())
    }

    fn scan_operator(&mut self, first: char) {
        let start_column = self.column;
        let mut op = String::from(first);

        // Greedy longest-match against the operator table. Operators are at
        // most three characters, so one candidate extension at a time is
        // enough as long as every accepted prefix stays checkable; `.<<` and
        // `.>>` require two-character lookahead because `.<` alone is not an
        // operator.
        loop {
            let mut extended = false;

            if self.index + 1 < self.source.len() {
                let two = format!("{op}{}{}", self.source[self.index], self.source[self.index + 1]);
                if is_operator(&two) {
                    op = two;
                    self.index += 2;
                    self.column += 2;
                    extended = true;
                }
            }
            if !extended && self.index < self.source.len() {
                let one = format!("{op}{}", self.source[self.index]);
                if is_operator(&one) {
                    op = one;
                    self.index += 1;
                    self.column += 1;
                    extended = true;
                }
            }
            if !extended {
                break;
            }
        }

        self.tokens.push(Token::new(
            op,
            self.file.clone(),
            self.line,
            start_column,
            TokenCategory::Operator,
        ));
    }

    fn scan_number(&mut self, first: char) -> Result<(), LexicalError> {
        let start_column = self.column;
        let mut digits = String::from(first);

        let base_marker = if first == '0' && !self.is_at_end() {
            match self.peek() {
                marker @ ('b' | 't' | 'c' | 'x') => Some(marker),
                _ => None,
            }
        } else {
            None
        };

        if let Some(marker) = base_marker {
            digits.push(self.advance());
            let valid: fn(char) -> bool = match marker {
                'b' => |ch| ch == '0' || ch == '1',
                't' => |ch| ('0'..='2').contains(&ch),
                'c' => |ch| ('0'..='7').contains(&ch),
                _ => |ch| ch.is_ascii_hexdigit(),
            };
            while !self.is_at_end() && valid(self.peek()) {
                digits.push(self.advance());
            }
        } else {
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                digits.push(self.advance());
            }

            if !self.is_at_end() && self.peek() == '.' {
                digits.push(self.advance());

                if self.is_at_end() || !self.peek().is_ascii_digit() {
                    return Err(LexicalError::new(
                        "Expecting decimal digits.",
                        self.line,
                        self.column,
                    ));
                }
                while !self.is_at_end() && self.peek().is_ascii_digit() {
                    digits.push(self.advance());
                }
            }

            if !self.is_at_end() && self.peek() == 'e' {
                digits.push(self.advance());

                if self.is_at_end() || (self.peek() != '+' && self.peek() != '-') {
                    return Err(LexicalError::new(
                        "Expecting 'e' followed by a signed exponent.",
                        self.line,
                        self.column,
                    ));
                }
                digits.push(self.advance());

                while !self.is_at_end() && self.peek().is_ascii_digit() {
                    digits.push(self.advance());
                }
            }
        }

        self.tokens.push(Token::new(
            digits,
            self.file.clone(),
            self.line,
            start_column,
            TokenCategory::Digit,
        ));
        Ok(())
    }

    fn scan_word(&mut self, first: char) {
        let start_column = self.column;
        let mut word = String::from(first);

        while !self.is_at_end() && is_word_char(self.peek()) {
            word.push(self.advance());
        }

        let category = if is_keyword(&word) {
            TokenCategory::Keyword
        } else {
            TokenCategory::Identifier
        };
        self.tokens.push(Token::new(
            word,
            self.file.clone(),
            self.line,
            start_column,
            category,
        ));
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    #[inline]
    fn peek(&self) -> char {
        self.source[self.index]
    }

    #[inline]
    fn advance(&mut self) -> char {
        let ch = self.source[self.index];
        self.index += 1;
        self.column += 1;
        ch
    }
}

#[inline]
fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\u{c}')
}

#[inline]
fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-'
            | '*'
            | '/'
            | '\\'
            | '!'
            | '&'
            | '|'
            | '^'
            | '%'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '@'
            | '='
            | ':'
            | ';'
            | '\''
            | '<'
            | '>'
            | ','
            | '.'
            | '?'
            | '~'
    )
}

#[inline]
fn is_word_char(ch: char) -> bool {
    !is_whitespace(ch) && !is_operator_char(ch) && ch != '#' && ch != '"' && ch != '`'
}

/// Process `\`-escapes in string and regex literal bodies.
///
/// Recognised escapes map to their C meanings; anything else keeps the
/// backslash so regex classes like `\d` survive intact.
fn replace_escape_sequences(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('a') => result.push('\u{7}'),
            Some('b') => result.push('\u{8}'),
            Some('v') => result.push('\u{b}'),
            Some('f') => result.push('\u{c}'),
            Some('e') => result.push('\u{1b}'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('`') => result.push('`'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests;
