//! Lexer for single G-code lines.
//!
//! Splits one line into address words, a trailing `;` comment and any
//! leftover symbols. Words may be packed without spaces (`G1X10Y5`).

use super::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    col: usize,
    byte: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            col: 1,
            byte: 0,
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let token = match self.peek() {
                ';' => self.lex_comment(),
                ch if ch.is_ascii_alphabetic() => self.lex_word(),
                _ => self.lex_other(),
            };

            tokens.push(token);
        }

        tokens
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        self.col += 1;
        self.byte += ch.len_utf8();
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn lex_comment(&mut self) -> Token {
        let col = self.col;
        let start = self.byte;
        self.advance(); // consume ';'
        let mut text = String::new();
        while !self.is_at_end() {
            text.push(self.advance());
        }
        Token {
            kind: TokenKind::Comment(text),
            col,
            start,
            end: self.byte,
        }
    }

    fn lex_word(&mut self) -> Token {
        let col = self.col;
        let start = self.byte;
        let letter = self.advance();
        let mut numeral = String::new();
        while !self.is_at_end() && is_numeral_char(self.peek()) {
            numeral.push(self.advance());
        }
        Token {
            kind: TokenKind::Word { letter, numeral },
            col,
            start,
            end: self.byte,
        }
    }

    fn lex_other(&mut self) -> Token {
        let col = self.col;
        let start = self.byte;
        let mut text = String::new();
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_whitespace() || ch == ';' || ch.is_ascii_alphabetic() {
                break;
            }
            text.push(self.advance());
        }
        Token {
            kind: TokenKind::Other(text),
            col,
            start,
            end: self.byte,
        }
    }
}

fn is_numeral_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '+' | '-')
}

/// Parse a numeral the way G-code writes them: optional sign, digits with at
/// most one decimal point and at least one digit (`12`, `-.5`, `+3.`).
pub fn parse_numeral(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    let digits = unsigned.chars().filter(|c| c.is_ascii_digit()).count();
    let points = unsigned.chars().filter(|&c| c == '.').count();
    if digits == 0 || points > 1 || digits + points != unsigned.len() {
        return None;
    }
    text.parse().ok()
}
