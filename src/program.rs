//! Program buffer — load a whole G-code file, edit lines, write it back in one piece.

use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// How a line was terminated in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Last line of a file without a trailing newline.
    None,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::None => "",
        }
    }
}

/// One program line: its text without the terminator, plus the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub ending: LineEnding,
}

/// An ordered sequence of G-code lines held fully in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<Line>,
}

impl Program {
    /// Split source text into lines, remembering each line's terminator.
    pub fn parse(source: &str) -> Self {
        let mut lines = Vec::new();
        let mut rest = source;
        while !rest.is_empty() {
            match rest.find('\n') {
                Some(idx) => {
                    let raw = &rest[..idx];
                    let (text, ending) = match raw.strip_suffix('\r') {
                        Some(text) => (text, LineEnding::CrLf),
                        None => (raw, LineEnding::Lf),
                    };
                    lines.push(Line {
                        text: text.to_string(),
                        ending,
                    });
                    rest = &rest[idx + 1..];
                }
                None => {
                    lines.push(Line {
                        text: rest.to_string(),
                        ending: LineEnding::None,
                    });
                    rest = "";
                }
            }
        }
        Self { lines }
    }

    /// Read an entire file into a program.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::file_access(path, e))?;
        Ok(Self::parse(&source))
    }

    /// Replace `path` with this program's text.
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers never see a half-written file.
    /// An existing target keeps its permissions, and a symlink is followed so
    /// the file it points to is the one replaced.
    pub fn save(&self, path: &Path) -> Result<()> {
        let target = match std::fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == ErrorKind::NotFound => path.to_path_buf(),
            Err(e) => return Err(Error::file_access(path, e)),
        };
        let existing = match std::fs::metadata(&target) {
            Ok(meta) => Some(meta.permissions()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(Error::file_access(path, e)),
        };

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::file_access(path, e))?;
        tmp.write_all(self.to_string().as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| Error::file_access(path, e))?;
        if let Some(permissions) = existing {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| Error::file_access(path, e))?;
        }
        tmp.persist(&target)
            .map_err(|e| Error::file_access(path, e.error))?;
        Ok(())
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(&line.text)?;
            f.write_str(line.ending.as_str())?;
        }
        Ok(())
    }
}
