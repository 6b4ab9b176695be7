//! Lexical analysis of calculator input.
//!
//! Turns the raw input string into a sequence of [`SpannedToken`]s that
//! always ends with [`Token::End`].

use std::iter::{Enumerate, Peekable};
use std::str::Chars;

use thiserror::Error;

use super::token::{SpannedToken, Token};

/// Errors raised while splitting the input into tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),
    #[error("malformed number at position {0}")]
    MalformedNumber(usize),
}

/// Split `input` into tokens, appending a terminal [`Token::End`].
///
/// Numbers are one or more ASCII digits, optionally followed by `.` and one
/// or more digits. Whitespace between tokens is skipped.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    chars: Peekable<Enumerate<Chars<'a>>>,
    tokens: Vec<SpannedToken>,
    consumed: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().enumerate().peekable(),
            tokens: Vec::new(),
            consumed: 0,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if next.is_some() {
            self.consumed += 1;
        }
        next
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn run(mut self) -> Result<Vec<SpannedToken>, LexError> {
        while let Some((position, ch)) = self.bump() {
            let token = match ch {
                c if c.is_whitespace() => continue,
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '(' => Token::LParen,
                ')' => Token::RParen,
                '0'..='9' => self.number(position, ch)?,
                // A dot can only appear inside a number.
                '.' => return Err(LexError::MalformedNumber(position)),
                other => return Err(LexError::UnexpectedCharacter(other, position)),
            };
            self.tokens.push(SpannedToken::new(token, position));
        }

        self.tokens.push(SpannedToken::new(Token::End, self.consumed));
        Ok(self.tokens)
    }

    fn number(&mut self, start: usize, first: char) -> Result<Token, LexError> {
        let mut text = String::from(first);
        self.digits(&mut text);

        if self.peek_char() == Some('.') {
            self.bump();
            text.push('.');
            if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::MalformedNumber(start));
            }
            self.digits(&mut text);
        }

        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| LexError::MalformedNumber(start))
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();
            text.push(c);
        }
    }
}
