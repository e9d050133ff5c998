//! G-code line reading — source line → tokens → classified line with fields.

pub mod error;
pub mod lexer;
pub mod line;
pub mod token;

pub use error::{FieldError, FieldErrorKind};
pub use line::{parse_line, Command, Fields, LineKind, ParsedLine};
pub use token::{Token, TokenKind};
