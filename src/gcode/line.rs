//! Line classification and field extraction.

use super::error::FieldError;
use super::lexer::{parse_numeral, Lexer};
use super::token::{Token, TokenKind};

/// What a line asks the machine to do, as far as the rewriter cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `G0` / `G1` straight-line move.
    Linear,
    /// `G2` / `G3` arc move. Uses the modal feed rate but is never rescaled.
    Arc,
    /// `G90`
    Absolute,
    /// `G91`
    Relative,
    /// `G92` set position without moving.
    SetPosition,
    /// Any other command (`G28`, `M104`, `T0`, ...).
    Other,
}

impl Command {
    fn classify(token: &Token) -> Self {
        let TokenKind::Word { letter: 'G', numeral } = &token.kind else {
            return Command::Other;
        };
        match numeral.parse::<u32>() {
            Ok(0 | 1) => Command::Linear,
            Ok(2 | 3) => Command::Arc,
            Ok(90) => Command::Absolute,
            Ok(91) => Command::Relative,
            Ok(92) => Command::SetPosition,
            _ => Command::Other,
        }
    }
}

/// The line as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Command(Command),
}

/// The numeric fields the rewriter reads. Absent means "unchanged".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fields {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub f: Option<f64>,
}

impl Fields {
    pub const LETTERS: [char; 5] = ['X', 'Y', 'Z', 'E', 'F'];

    fn slot(&mut self, letter: char) -> Option<&mut Option<f64>> {
        match letter {
            'X' => Some(&mut self.x),
            'Y' => Some(&mut self.y),
            'Z' => Some(&mut self.z),
            'E' => Some(&mut self.e),
            'F' => Some(&mut self.f),
            _ => None,
        }
    }
}

/// One line, tokenized and classified.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    /// 1-based line number in the program.
    pub number: usize,
    pub kind: LineKind,
    pub tokens: Vec<Token>,
    pub fields: Fields,
    pub anomalies: Vec<FieldError>,
    /// Byte offset just past the last non-comment token.
    pub code_end: usize,
}

impl ParsedLine {
    /// The first word carrying `letter`, if any.
    pub fn word(&self, letter: char) -> Option<&Token> {
        self.tokens.iter().find(|t| t.letter() == Some(letter))
    }

    pub fn command(&self) -> Option<Command> {
        match self.kind {
            LineKind::Command(cmd) => Some(cmd),
            _ => None,
        }
    }
}

/// Tokenize and classify a single line (without its terminator).
///
/// For each of X, Y, Z, E and F only the first word with that letter counts.
/// If its numeral is malformed the field is left absent and a [`FieldError`]
/// is recorded; later words with the same letter are not consulted.
pub fn parse_line(text: &str, line_no: usize) -> ParsedLine {
    let tokens = Lexer::new(text).tokenize();

    let code_end = tokens
        .iter()
        .filter(|t| !t.is_comment())
        .map(|t| t.end)
        .last()
        .unwrap_or(0);

    let kind = match tokens.first() {
        None => LineKind::Blank,
        Some(t) if t.is_comment() => LineKind::Comment,
        Some(t) => LineKind::Command(Command::classify(t)),
    };

    let mut fields = Fields::default();
    let mut anomalies = Vec::new();
    let mut seen = [false; 5];

    if matches!(
        kind,
        LineKind::Command(Command::Linear | Command::Arc | Command::SetPosition)
    ) {
        for token in tokens.iter().skip(1) {
            let TokenKind::Word { letter, numeral } = &token.kind else {
                continue;
            };
            let Some(idx) = Fields::LETTERS.iter().position(|l| l == letter) else {
                continue;
            };
            if seen[idx] {
                continue;
            }
            seen[idx] = true;

            match parse_numeral(numeral) {
                Some(value) => {
                    if let Some(slot) = fields.slot(*letter) {
                        *slot = Some(value);
                    }
                }
                None if numeral.is_empty() => {
                    anomalies.push(FieldError::missing(*letter, line_no, token.col));
                }
                None => {
                    anomalies.push(FieldError::invalid(*letter, numeral, line_no, token.col));
                }
            }
        }
    }

    ParsedLine {
        number: line_no,
        kind,
        tokens,
        fields,
        anomalies,
        code_end,
    }
}
