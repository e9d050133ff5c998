//! Line regeneration — splice new field values into a line, keep everything else.

use std::ops::Range;

use crate::gcode::ParsedLine;

/// Pending edits to one line. Text outside the edited words is preserved.
pub struct LineEdit<'a> {
    text: &'a str,
    line: &'a ParsedLine,
    replacements: Vec<(Range<usize>, String)>,
    appended: Vec<String>,
    annotation: Option<String>,
}

impl<'a> LineEdit<'a> {
    pub fn new(text: &'a str, line: &'a ParsedLine) -> Self {
        Self {
            text,
            line,
            replacements: Vec::new(),
            appended: Vec::new(),
            annotation: None,
        }
    }

    /// Replace the first `letter` word, or append one after the last code word.
    pub fn set_word(&mut self, letter: char, numeral: &str) -> &mut Self {
        let word = format!("{letter}{numeral}");
        match self.line.word(letter) {
            Some(token) => self.replacements.push((token.start..token.end, word)),
            None => self.appended.push(word),
        }
        self
    }

    /// Trailing `;` comment explaining the edit.
    pub fn annotate(&mut self, note: impl Into<String>) -> &mut Self {
        self.annotation = Some(note.into());
        self
    }

    pub fn finish(mut self) -> String {
        self.replacements.sort_by_key(|(range, _)| range.start);

        let code_end = self.line.code_end;
        let mut out = String::with_capacity(self.text.len() + 48);
        let mut cursor = 0;
        for (range, word) in &self.replacements {
            out.push_str(&self.text[cursor..range.start]);
            out.push_str(word);
            cursor = range.end;
        }
        out.push_str(&self.text[cursor..code_end]);
        for word in &self.appended {
            out.push(' ');
            out.push_str(word);
        }
        out.push_str(&self.text[code_end..]);

        if let Some(note) = &self.annotation {
            out.truncate(out.trim_end().len());
            out.push_str(" ; ");
            out.push_str(note);
        }
        out
    }
}
