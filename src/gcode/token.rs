//! Token types for the G-code line lexer.

/// A token produced by the lexer.
///
/// `start` and `end` are byte offsets into the source line so a rewriter can
/// splice replacement text without touching the rest of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub col: usize,
    pub start: usize,
    pub end: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An address letter and the raw numeral text that follows it, e.g. `X` `12.5`.
    /// The numeral may be empty or malformed; interpretation is left to the caller.
    Word { letter: char, numeral: String },
    /// A `;` comment running to the end of the line (text excludes the `;`).
    Comment(String),
    /// Anything that is neither a word nor a comment (checksums, stray symbols).
    Other(String),
}

impl Token {
    /// The address letter, if this token is a word.
    pub fn letter(&self) -> Option<char> {
        match &self.kind {
            TokenKind::Word { letter, .. } => Some(*letter),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }
}
