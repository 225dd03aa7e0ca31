use nova_core::{LineIndex, TextSize};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 256;

fn arb_char() -> impl Strategy<Value = char> {
    prop_oneof![
        12 => prop::sample::select(vec![
            'a', 'b', 'c', 'x', '0', '1', ' ', '\t', '.', ';', '{', '}',
        ]),
        3 => Just('\n'),
        2 => Just('\r'),
        2 => Just('é'),
        1 => Just('😀'),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_char(), 0..=64).prop_map(|chars| chars.into_iter().collect())
}

fn arb_text_and_offset() -> impl Strategy<Value = (String, usize)> {
    arb_text().prop_flat_map(|text| {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        (Just(text), prop::sample::select(boundaries))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn line_col_roundtrips_for_offsets_not_inside_line_breaks((text, offset) in arb_text_and_offset()) {
        let index = LineIndex::new(&text);
        let line_col = index.line_col(TextSize::from(offset as u32));
        let back = index.offset(line_col).expect("line/col produced by the index must map back");

        // Offsets that point into the middle of a `\r\n` pair collapse onto the
        // line end; everything else is an exact roundtrip.
        let inside_crlf = offset > 0
            && text.as_bytes().get(offset) == Some(&b'\n')
            && text.as_bytes()[offset - 1] == b'\r';
        if !inside_crlf {
            prop_assert_eq!(u32::from(back) as usize, offset);
        }
    }

    #[test]
    fn line_number_matches_count_of_preceding_breaks((text, offset) in arb_text_and_offset()) {
        let index = LineIndex::new(&text);
        let prefix = &text[..offset];
        let crlf = prefix.matches("\r\n").count();
        let breaks = prefix.matches('\n').count() + prefix.matches('\r').count() - crlf;
        let expected = breaks as u32 + 1;
        let inside_crlf = offset > 0
            && text.as_bytes().get(offset) == Some(&b'\n')
            && text.as_bytes()[offset - 1] == b'\r';
        if !inside_crlf {
            prop_assert_eq!(index.line_number(offset as u32), Some(expected));
        }
    }
}
