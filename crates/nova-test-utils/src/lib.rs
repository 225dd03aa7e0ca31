//! Utilities shared by Nova tests.
//!
//! - [`extract_range`]: fixtures with a `/*start*/ ... /*end*/` selection.
//! - [`normalize_whitespace`]: compare surface forms regardless of layout.
//! - [`init_tracing`]: route `tracing` output to the test harness.
//! - [`frontend`]: a small Java front-end, so DOM tests can be written as
//!   source text instead of hand-built HIR.

use std::sync::Once;

use nova_core::{TextRange, TextSize};

pub mod frontend;

pub use frontend::{compile, parse, ParseError};

/// Extracts a byte range selection from a fixture containing `/*start*/` and
/// `/*end*/` markers.
///
/// Returns the fixture with markers removed and the selection `TextRange`
/// pointing at the extracted region.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    let start_marker = "/*start*/";
    let end_marker = "/*end*/";

    let start = fixture
        .find(start_marker)
        .expect("fixture missing /*start*/ marker");
    let after_start = start + start_marker.len();
    let end = fixture
        .find(end_marker)
        .expect("fixture missing /*end*/ marker");
    assert!(end >= after_start, "/*end*/ must come after /*start*/");

    let mut text = String::with_capacity(fixture.len());
    text.push_str(&fixture[..start]);
    text.push_str(&fixture[after_start..end]);
    text.push_str(&fixture[end + end_marker.len()..]);

    // Range in the marker-stripped text: the start position stays the same;
    // the end shrinks by the length of the start marker.
    let range = TextRange::new(
        TextSize::from(start as u32),
        TextSize::from((end - start_marker.len()) as u32),
    );
    (text, range)
}

fn is_word_char(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

/// Canonical spacing for comparing surface forms: whitespace between two
/// word characters collapses to one space, any other whitespace is dropped.
///
/// `"Outer. Inner"` and `"Outer.Inner"` both normalize to `"Outer.Inner"`;
/// `"final  int"` becomes `"final int"`.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let joins_words = out.chars().last().is_some_and(is_word_char) && is_word_char(c);
            if joins_words {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Install a `tracing` subscriber writing to the test output, filtered by
/// `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extract_range_strips_markers() {
        let (text, range) = extract_range("class A { /*start*/int x;/*end*/ }");
        assert_eq!(text, "class A { int x; }");
        assert_eq!(&text[range], "int x;");
    }

    #[test]
    fn normalize_whitespace_keeps_word_boundaries() {
        assert_eq!(normalize_whitespace("Outer. Inner"), "Outer.Inner");
        assert_eq!(normalize_whitespace("java.util.List< String >"), "java.util.List<String>");
        assert_eq!(normalize_whitespace("@A  int @B []"), "@A int@B[]");
        assert_eq!(normalize_whitespace(" final\n\tint "), "final int");
    }
}
