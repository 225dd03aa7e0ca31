//! Source positions for DOM nodes.
//!
//! Front-end spans are not trusted. A node's range is the first through the
//! last *token* inside its span, so surrounding whitespace and comments drop
//! out while comments between tokens stay. Spans that fall outside the buffer
//! or are inverted are clamped and reported so the node can be flagged.

use nova_core::{TextRange, TextSize};
use nova_syntax::{lex, Token, TokenKind};
use nova_types::Span;

pub(crate) fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

pub(crate) fn offset(range: TextRange) -> usize {
    u32::from(range.start()) as usize
}

pub(crate) fn end_offset(range: TextRange) -> usize {
    u32::from(range.end()) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracked {
    pub range: TextRange,
    /// The input span had to be clamped.
    pub clamped: bool,
}

#[derive(Debug)]
pub struct PositionTracker<'a> {
    source: &'a str,
    tokens: Vec<Token>,
}

impl<'a> PositionTracker<'a> {
    pub fn new(source: &'a str) -> Self {
        PositionTracker {
            source,
            tokens: lex(source),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn clamp_span(&self, span: Span) -> (usize, usize, bool) {
        let len = self.source.len();
        let mut clamped = false;
        let mut start = span.start;
        let mut end = span.end;
        if start > len {
            start = len;
            clamped = true;
        }
        if end > len {
            end = len;
            clamped = true;
        }
        if end < start {
            end = start;
            clamped = true;
        }
        (start, end, clamped)
    }

    /// Range of the node spelled by `span`, trimmed to its tokens.
    ///
    /// A span containing no token becomes an empty range at the next token
    /// (or at the end of the span when there is none).
    pub fn range(&self, span: Span) -> Tracked {
        let (start, end, clamped) = self.clamp_span(span);
        let tokens = self.tokens_in(start, end);
        let range = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => {
                text_range(first.start().max(start), last.end().min(end).max(first.start().max(start)))
            }
            _ => {
                let at = self
                    .tokens
                    .get(self.first_token_at_or_after(start))
                    .map_or(end, |tok| tok.start().min(end));
                text_range(at, at)
            }
        };
        Tracked { range, clamped }
    }

    /// Index of the first token ending after `offset`.
    fn first_token_at_or_after(&self, offset: usize) -> usize {
        self.tokens.partition_point(|tok| tok.end() <= offset)
    }

    /// Tokens overlapping `start..end`.
    pub fn tokens_in(&self, start: usize, end: usize) -> &[Token] {
        let lo = self.first_token_at_or_after(start);
        let hi = self.tokens.partition_point(|tok| tok.start() < end);
        if lo >= hi {
            &[]
        } else {
            &self.tokens[lo..hi]
        }
    }

    /// First token of `kind` starting at or after `from` and before `until`.
    pub fn find_token(&self, kind: TokenKind, from: usize, until: usize) -> Option<Token> {
        self.tokens_in(from, until)
            .iter()
            .find(|tok| tok.kind == kind && tok.start() >= from)
            .copied()
    }

    /// First token starting at or after `offset`.
    pub fn next_token(&self, offset: usize) -> Option<Token> {
        self.tokens
            .iter()
            .skip(self.first_token_at_or_after(offset))
            .find(|tok| tok.start() >= offset)
            .copied()
    }

    /// End of the last token that ends at or before `offset`.
    pub fn last_token_end_before(&self, offset: usize) -> Option<usize> {
        let idx = self.tokens.partition_point(|tok| tok.end() <= offset);
        idx.checked_sub(1).map(|idx| self.tokens[idx].end())
    }

    /// Offset just past the `>` closing a type argument list whose `<` is the
    /// first `<` at or after `from`.
    pub fn closing_angle(&self, from: usize, until: usize) -> Option<usize> {
        let mut depth = 0usize;
        for tok in self.tokens_in(from, until) {
            match tok.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Shl => depth += 2,
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(tok.end());
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Dimension brackets in `from..until`, outermost (leftmost) first,
    /// skipping `skip` ranges (annotations) and the contents of each pair.
    /// A trailing `...` is reported separately.
    pub fn dimensions(&self, from: usize, until: usize, skip: &[TextRange]) -> Dims {
        let mut dims = Dims::default();
        let mut depth = 0usize;
        let mut open: Option<usize> = None;
        for tok in self.tokens_in(from, until) {
            if tok.start() < from || skip.iter().any(|r| r.contains_range(tok.range)) {
                continue;
            }
            match tok.kind {
                TokenKind::LBracket => {
                    if depth == 0 {
                        open = Some(tok.start());
                    }
                    depth += 1;
                }
                TokenKind::RBracket if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(start) = open.take() {
                            dims.brackets.push(text_range(start, tok.end()));
                        }
                    }
                }
                TokenKind::Ellipsis if depth == 0 => dims.ellipsis = Some(tok.range),
                _ if depth == 0 && dims.brackets.is_empty() && dims.ellipsis.is_none() => {}
                _ if depth == 0 => break,
                _ => {}
            }
        }
        dims
    }

    /// Bracket pairs directly following `from` (extra dimensions after a
    /// declarator name), skipping `skip` ranges. Stops at the first other
    /// token.
    pub fn extra_dimensions(&self, from: usize, until: usize, skip: &[TextRange]) -> Vec<TextRange> {
        let mut out = Vec::new();
        let mut open: Option<usize> = None;
        for tok in self.tokens_in(from, until) {
            if tok.start() < from || skip.iter().any(|r| r.contains_range(tok.range)) {
                continue;
            }
            match (tok.kind, open) {
                (TokenKind::LBracket, None) => open = Some(tok.start()),
                (TokenKind::RBracket, Some(start)) => {
                    out.push(text_range(start, tok.end()));
                    open = None;
                }
                _ => break,
            }
        }
        out
    }

    /// Identifier tokens in `range` that are not inside `skip`, with
    /// `non-sealed` glued into one token.
    pub fn words(&self, range: TextRange, skip: &[TextRange]) -> Vec<(String, TextRange)> {
        let toks: Vec<Token> = self
            .tokens_in(offset(range), end_offset(range))
            .iter()
            .filter(|tok| !skip.iter().any(|r| r.contains_range(tok.range)))
            .copied()
            .collect();
        let mut out = Vec::new();
        let mut idx = 0;
        while idx < toks.len() {
            let tok = toks[idx];
            if tok.is_word(self.source, "non")
                && toks.get(idx + 1).is_some_and(|t| t.kind == TokenKind::Minus && t.start() == tok.end())
                && toks
                    .get(idx + 2)
                    .is_some_and(|t| t.is_word(self.source, "sealed") && t.start() == toks[idx + 1].end())
            {
                out.push(("non-sealed".to_string(), text_range(tok.start(), toks[idx + 2].end())));
                idx += 3;
                continue;
            }
            if tok.kind == TokenKind::Ident {
                out.push((tok.text(self.source).to_string(), tok.range));
            }
            idx += 1;
        }
        out
    }

    /// First token in `range` that is not inside `skip`.
    pub fn first_token_outside(&self, range: TextRange, skip: &[TextRange]) -> Option<Token> {
        self.tokens_in(offset(range), end_offset(range))
            .iter()
            .find(|tok| !skip.iter().any(|r| r.contains_range(tok.range)))
            .copied()
    }

    pub fn text(&self, range: TextRange) -> &'a str {
        &self.source[offset(range)..end_offset(range)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dims {
    pub brackets: Vec<TextRange>,
    pub ellipsis: Option<TextRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trivia_but_keeps_inner_comments() {
        let src = "  int /* c */ x  // trailing\n";
        let tracker = PositionTracker::new(src);
        let tracked = tracker.range(Span::new(0, src.len()));
        assert!(!tracked.clamped);
        assert_eq!(tracker.text(tracked.range), "int /* c */ x");
    }

    #[test]
    fn clamps_out_of_bounds_and_inverted_spans() {
        let src = "class A {}";
        let tracker = PositionTracker::new(src);

        let tracked = tracker.range(Span::new(6, 99));
        assert!(tracked.clamped);
        assert_eq!(tracker.text(tracked.range), "A {}");

        let tracked = tracker.range(Span::new(8, 3));
        assert!(tracked.clamped);
        assert!(tracked.range.is_empty());
        assert!(end_offset(tracked.range) <= src.len());
    }

    #[test]
    fn finds_dimensions_skipping_annotations_and_contents() {
        let src = "int @A [] [a[0]] ...";
        let tracker = PositionTracker::new(src);
        let skip = [text_range(4, 6)];
        let dims = tracker.dimensions(3, src.len(), &skip);
        assert_eq!(
            dims.brackets,
            vec![text_range(7, 9), text_range(10, 16)]
        );
        assert_eq!(dims.ellipsis, Some(text_range(17, 20)));
    }

    #[test]
    fn glues_non_sealed() {
        let src = "public non-sealed class";
        let tracker = PositionTracker::new(src);
        let words: Vec<String> = tracker
            .words(text_range(0, src.len()), &[])
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(words, ["public", "non-sealed", "class"]);
    }

    #[test]
    fn closing_angle_handles_nesting() {
        let src = "Map<K, List<V>> x";
        let tracker = PositionTracker::new(src);
        assert_eq!(tracker.closing_angle(0, src.len()), Some(15));
    }
}
