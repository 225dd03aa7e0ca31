//! Text model primitives: sizes, ranges, and line/column conversions.

pub use text_size::{TextRange, TextSize};

/// A zero-based line and a zero-based byte column within that line.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Pre-computed line start offsets for a particular text snapshot.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line, matching what Java
/// compilers report as line separators.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(64);
        let mut line_ends = Vec::with_capacity(64);
        line_starts.push(TextSize::from(0));

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                b'\r' => {
                    line_ends.push(TextSize::from(i as u32));
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_starts.push(TextSize::from((i + 2) as u32));
                        i += 2;
                    } else {
                        line_starts.push(TextSize::from((i + 1) as u32));
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }

        line_ends.push(TextSize::from(text.len() as u32));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    #[inline]
    pub fn line_end(&self, line: u32) -> Option<TextSize> {
        self.line_ends.get(line as usize).copied()
    }

    fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.min(self.text_len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    /// Convert a byte offset to a zero-based line/column pair.
    ///
    /// Offsets past the end of the text are clamped to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        let line_start = self.line_starts[line];
        let line_end = self.line_ends[line];
        let col = offset.min(line_end) - line_start;
        LineCol {
            line: line as u32,
            col: u32::from(col),
        }
    }

    /// Convert a zero-based line/column pair back to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let start = self.line_start(line_col.line)?;
        let end = self.line_end(line_col.line)?;
        let offset = start + TextSize::from(line_col.col);
        if offset > end {
            return None;
        }
        Some(offset)
    }

    /// One-based line number of `offset`, or `None` when the offset lies
    /// outside the text.
    pub fn line_number(&self, offset: u32) -> Option<u32> {
        let offset = TextSize::from(offset);
        if offset > self.text_len {
            return None;
        }
        Some(self.line_col(offset).line + 1)
    }

    /// Zero-based byte column of `offset`, or `None` when the offset lies
    /// outside the text.
    pub fn column_number(&self, offset: u32) -> Option<u32> {
        let offset = TextSize::from(offset);
        if offset > self.text_len {
            return None;
        }
        Some(self.line_col(offset).col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_based_and_handle_crlf() {
        let text = "class A {\r\n  int x;\r}\n";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_number(0), Some(1));
        assert_eq!(index.line_number(11), Some(2));
        assert_eq!(index.column_number(13), Some(2));
        assert_eq!(index.line_number(19), Some(2));
        assert_eq!(index.line_number(20), Some(3));
        assert_eq!(index.line_number(text.len() as u32), Some(4));
        assert_eq!(index.line_number(text.len() as u32 + 1), None);
    }

    #[test]
    fn offsets_past_line_end_are_rejected() {
        let text = "ab\ncd";
        let index = LineIndex::new(text);
        assert_eq!(
            index.offset(LineCol { line: 1, col: 2 }),
            Some(TextSize::from(5))
        );
        assert_eq!(index.offset(LineCol { line: 0, col: 3 }), None);
        assert_eq!(index.offset(LineCol { line: 2, col: 0 }), None);
    }
}
