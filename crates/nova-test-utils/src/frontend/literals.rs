//! Literal token text to constant values.
//!
//! Every function returns `None` for text it cannot interpret; the literal
//! node then simply carries no constant.

use nova_types::ConstValue;

fn digits(text: &str) -> String {
    text.chars().filter(|&c| c != '_').collect()
}

fn unsigned(text: &str) -> Option<u64> {
    let text = digits(text);
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// `int` literals keep their two's-complement meaning: `0xFFFF_FFFF` is -1
/// and `2147483648` is only accepted as the operand of unary minus, so it
/// is returned as is.
pub(crate) fn int(text: &str) -> Option<ConstValue> {
    let value = unsigned(text)?;
    let decimal = !text.starts_with('0') || text.len() == 1;
    let value = if decimal {
        if value > 1 << 31 {
            return None;
        }
        value as i64
    } else {
        i64::from(u32::try_from(value).ok()? as i32)
    };
    Some(ConstValue::Int(value))
}

pub(crate) fn long(text: &str) -> Option<ConstValue> {
    let body = text.strip_suffix(['l', 'L'])?;
    let value = unsigned(body)?;
    Some(ConstValue::Long(value as i64))
}

fn floating(text: &str) -> Option<f64> {
    let text = digits(text);
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return hex_floating(&lower[2..]);
    }
    lower.parse().ok()
}

/// `0x1.8p1` style: hex significand, binary exponent.
fn hex_floating(text: &str) -> Option<f64> {
    let (significand, exponent) = text.split_once('p')?;
    let exponent: i32 = exponent.parse().ok()?;
    let (whole, fraction) = significand.split_once('.').unwrap_or((significand, ""));
    let mut value = 0f64;
    for c in whole.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in fraction.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exponent))
}

pub(crate) fn float(text: &str) -> Option<ConstValue> {
    let body = text.strip_suffix(['f', 'F'])?;
    let value = floating(body)? as f32;
    Some(ConstValue::Float(f64::from(value).to_bits()))
}

pub(crate) fn double(text: &str) -> Option<ConstValue> {
    let body = text.strip_suffix(['d', 'D']).unwrap_or(text);
    Some(ConstValue::double(floating(body)?))
}

pub(crate) fn char(text: &str) -> Option<ConstValue> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let value = unescape(inner)?;
    let mut chars = value.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(ConstValue::Char(c))
}

pub(crate) fn string(text: &str) -> Option<ConstValue> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    Some(ConstValue::String(unescape(inner)?))
}

/// Strips incidental indentation (the smallest indentation of the
/// non-blank lines and the closing delimiter line) and trailing spaces,
/// then processes escapes.
pub(crate) fn text_block(text: &str) -> Option<ConstValue> {
    let inner = text.strip_prefix("\"\"\"")?.strip_suffix("\"\"\"")?;
    let (_, content) = inner.split_once('\n')?;
    let lines: Vec<&str> = content.split('\n').collect();
    let closing_on_own_line = lines.last().is_some_and(|line| line.trim().is_empty());
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| !line.trim().is_empty() || (*idx == lines.len() - 1))
        .map(|(_, line)| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        let is_last = idx == lines.len() - 1;
        if is_last && closing_on_own_line {
            break;
        }
        let stripped = line.get(indent..).unwrap_or("").trim_end_matches([' ', '\t', '\r']);
        out.push_str(stripped);
        if !is_last {
            out.push('\n');
        }
    }
    Some(ConstValue::String(unescape(&out)?))
}

fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'b' => out.push('\u{0008}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{000C}'),
            'r' => out.push('\r'),
            's' => out.push(' '),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            '\n' => {}
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            first @ '0'..='7' => {
                let max_len = if first <= '3' { 3 } else { 2 };
                let mut code = first.to_digit(8)?;
                for _ in 1..max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn integer_radixes() {
        assert_eq!(int("0x1F"), Some(ConstValue::Int(31)));
        assert_eq!(int("0b101"), Some(ConstValue::Int(5)));
        assert_eq!(int("017"), Some(ConstValue::Int(15)));
        assert_eq!(int("1_000"), Some(ConstValue::Int(1000)));
        assert_eq!(int("0xFFFFFFFF"), Some(ConstValue::Int(-1)));
        assert_eq!(int("0"), Some(ConstValue::Int(0)));
        assert_eq!(long("10L"), Some(ConstValue::Long(10)));
    }

    #[test]
    fn floating_literals() {
        assert_eq!(double("1.5"), Some(ConstValue::double(1.5)));
        assert_eq!(double("0x1.8p1"), Some(ConstValue::double(3.0)));
        assert_eq!(float("2f").and_then(|v| v.as_f64()), Some(2.0));
    }

    #[test]
    fn escapes() {
        assert_eq!(string(r#""a\tbA\101""#), Some(ConstValue::String("a\tbAA".into())));
        assert_eq!(char(r"'\n'"), Some(ConstValue::Char('\n')));
        assert_eq!(char("'ab'"), None);
    }

    #[test]
    fn text_block_strips_incidental_indentation() {
        let text = "\"\"\"\n    hello\n      world\n    \"\"\"";
        assert_eq!(
            text_block(text),
            Some(ConstValue::String("hello\n  world\n".into()))
        );
    }
}
