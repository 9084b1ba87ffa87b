//! Token representation with full positional information.

use std::cmp::Ordering;
use std::fmt;

/// Classification assigned to a lexeme by the lexer.
///
/// The ordering of the variants matters: tokens are totally ordered by
/// `(category, image)` so they can key ordered maps in the AST.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenCategory {
    Digit,
    String,
    Regex,
    Keyword,
    Identifier,
    Operator,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenCategory::Digit => "digit",
            TokenCategory::String => "string",
            TokenCategory::Regex => "regex",
            TokenCategory::Keyword => "keyword",
            TokenCategory::Identifier => "identifier",
            TokenCategory::Operator => "operator",
        };
        f.write_str(name)
    }
}

/// A lexeme with its source location.
///
/// Never mutated after construction except through [`Token::append`] and
/// [`Token::modify`], which the lexer uses to grow multi-character tokens
/// in place and `enum`/`mod` lowering uses to build dotted member names.
#[derive(Clone, Debug, Eq)]
pub struct Token {
    image: String,
    file: String,
    line: u32,
    column: u32,
    category: TokenCategory,
}

impl Token {
    pub fn new(
        image: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        column: u32,
        category: TokenCategory,
    ) -> Self {
        Token {
            image: image.into(),
            file: file.into(),
            line,
            column,
            category,
        }
    }

    #[inline]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn category(&self) -> TokenCategory {
        self.category
    }

    /// Append text to the image, keeping position and category.
    pub fn append(&mut self, text: &str) {
        self.image.push_str(text);
    }

    /// Replace the image outright, keeping position and category.
    pub fn modify(&mut self, image: impl Into<String>) {
        self.image = image.into();
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.image == other.image
    }
}

// Hash agrees with equality: position is identity-free.
impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.category.hash(state);
        self.image.hash(state);
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.category, &self.image).cmp(&(other.category, &other.image))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\u{1b}[1;32m{}\u{1b}[0m [line {}, column {}] (\u{1b}[4;97m{}\u{1b}[0m)",
            self.image, self.line, self.column, self.file
        )
    }
}
