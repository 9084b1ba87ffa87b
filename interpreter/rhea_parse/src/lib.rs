//! Parser for Rhea token streams.
//!
//! Hand-written recursive descent with precedence climbing. Each binary
//! precedence level is one method, strongest-binding last; `primary`
//! dispatches on the current token to the expression forms, and statement
//! keywords in expression position become single-statement expressions.

mod error;
mod grammar;

pub use error::ParserError;

use std::sync::Arc;

use rhea_ir::{Stmt, Token, TokenCategory};

/// Token-stream parser producing the global statement list.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, index: 0 }
    }

    /// Parse every global statement in the stream.
    pub fn parse(&mut self) -> Result<Vec<Arc<Stmt>>, ParserError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    /// The token under the cursor, or an end-of-stream error.
    fn current(&self) -> Result<&Token, ParserError> {
        self.tokens
            .get(self.index)
            .ok_or_else(|| self.end_of_stream())
    }

    fn end_of_stream(&self) -> ParserError {
        ParserError::new(
            self.tokens.last().cloned(),
            "Unexpected end of token stream.",
        )
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    /// True when the current token is an operator with this image.
    fn is_next_operator(&self, image: &str) -> bool {
        self.tokens.get(self.index).is_some_and(|token| {
            token.category() == TokenCategory::Operator && token.image() == image
        })
    }

    /// True when the current token is a keyword with this image.
    fn is_next_keyword(&self, image: &str) -> bool {
        self.tokens.get(self.index).is_some_and(|token| {
            token.category() == TokenCategory::Keyword && token.image() == image
        })
    }

    /// True when the current token has this image, whatever its category.
    fn is_next_image(&self, image: &str) -> bool {
        self.tokens
            .get(self.index)
            .is_some_and(|token| token.image() == image)
    }

    /// True when the token after the current one is an identifier.
    fn is_identifier_after_next(&self) -> bool {
        self.tokens
            .get(self.index + 1)
            .is_some_and(|token| token.category() == TokenCategory::Identifier)
    }

    /// Consume a token by exact image, whatever its category.
    fn consume_image(&mut self, image: &str) -> Result<Token, ParserError> {
        let token = self.current()?.clone();
        if token.image() != image {
            return Err(ParserError::new(
                Some(token.clone()),
                format!("Expecting `{image}`, got `{}`.", token.image()),
            ));
        }
        self.advance();
        Ok(token)
    }

    /// Consume a token by category.
    fn consume_category(&mut self, category: TokenCategory) -> Result<Token, ParserError> {
        let token = self.current()?.clone();
        if token.category() != category {
            return Err(ParserError::new(
                Some(token.clone()),
                format!("Expecting {category}, got `{}`.", token.image()),
            ));
        }
        self.advance();
        Ok(token)
    }

    /// Consume an identifier, merging `ident (. ident)*` into one dotted name.
    fn consume_dotted_identifier(&mut self) -> Result<Token, ParserError> {
        let mut name = self.consume_category(TokenCategory::Identifier)?;
        while self.is_next_operator(".") && self.is_identifier_after_next() {
            self.advance();
            let member = self.consume_category(TokenCategory::Identifier)?;
            name.append(".");
            name.append(member.image());
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests;
