//! Trivia-aware Java tokenizer.
//!
//! Tokens only record their kind and byte range; callers slice the source for
//! the text. Whitespace and comments are skipped and never produce tokens.
//!
//! `>` is always lexed as a single character so that nested type argument
//! lists (`Map<K, List<V>>`) close one bracket at a time. Parsers that need
//! `>>`, `>=`, `>>>=` … combine adjacent `Gt` tokens themselves.

use nova_core::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    IntLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    TextBlock,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Ellipsis,
    At,
    ColonColon,
    Colon,
    Question,
    Arrow,

    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    Le,
    Shl,
    ShlEq,
    Gt,
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
    Tilde,

    /// An unterminated literal or a character that cannot start a token.
    Error,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::FloatLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::TextBlock
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

impl Token {
    #[inline]
    pub fn start(&self) -> usize {
        u32::from(self.range.start()) as usize
    }

    #[inline]
    pub fn end(&self) -> usize {
        u32::from(self.range.end()) as usize
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start()..self.end()]
    }

    /// `true` for an identifier token spelling `keyword`.
    pub fn is_word(&self, source: &str, keyword: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == keyword
    }
}

const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
    "true",
    "false",
    "null",
];

/// Reserved words (including the `true`/`false`/`null` literals). Contextual
/// keywords such as `var`, `record`, `module` or `sealed` are identifiers.
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

pub fn is_modifier_keyword(text: &str) -> bool {
    matches!(
        text,
        "public"
            | "protected"
            | "private"
            | "static"
            | "abstract"
            | "final"
            | "native"
            | "synchronized"
            | "transient"
            | "volatile"
            | "strictfp"
            | "default"
            | "sealed"
            | "non-sealed"
    )
}

pub fn is_primitive_keyword(text: &str) -> bool {
    matches!(
        text,
        "boolean" | "byte" | "short" | "int" | "long" | "char" | "float" | "double"
    )
}

fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

/// Tokenize the whole buffer.
pub fn lex(text: &str) -> Vec<Token> {
    Lexer::new(text).collect()
}

/// Offset of the first byte at or after `offset` that is neither whitespace
/// nor part of a comment.
///
/// `offset` must not point into the middle of a comment or literal.
pub fn skip_trivia(text: &str, offset: usize) -> usize {
    let mut lexer = Lexer::at(text, offset);
    lexer.skip_whitespace_and_comments();
    lexer.pos
}

pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::at(text, 0)
    }

    /// Start lexing at `offset`, which must be a char boundary outside of any
    /// comment or literal.
    pub fn at(text: &'a str, offset: usize) -> Self {
        let mut pos = offset.min(text.len());
        while !text.is_char_boundary(pos) {
            pos -= 1;
        }
        Lexer { text, pos }
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.bump_char();
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.bump_char();
            }

            let rem = self.remaining();
            if rem.starts_with("//") {
                while let Some(c) = self.peek_char() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    self.bump_char();
                }
                continue;
            }

            if rem.starts_with("/*") {
                self.pos += 2;
                match self.remaining().find("*/") {
                    Some(end) => self.pos += end + 2,
                    None => self.pos = self.text.len(),
                }
                continue;
            }

            break;
        }
    }

    fn lex_identifier(&mut self) {
        while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
            self.bump_char();
        }
    }

    fn lex_digits(&mut self, radix: u32) {
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_digit(radix) {
                self.bump_char();
            } else {
                break;
            }
        }
    }

    fn lex_exponent(&mut self) -> bool {
        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.bump_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump_char();
            }
            self.lex_digits(10);
            return true;
        }
        false
    }

    /// Called with the first character (a digit or `.`) already consumed.
    fn lex_number(&mut self, first: char) -> TokenKind {
        let mut floating = false;

        if first == '0' && matches!(self.peek_char(), Some('x' | 'X')) {
            self.bump_char();
            self.lex_digits(16);
            if self.peek_char() == Some('.') {
                self.bump_char();
                self.lex_digits(16);
                floating = true;
            }
            if matches!(self.peek_char(), Some('p' | 'P')) {
                self.bump_char();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.bump_char();
                }
                self.lex_digits(10);
                floating = true;
            }
        } else if first == '0' && matches!(self.peek_char(), Some('b' | 'B')) {
            self.bump_char();
            self.lex_digits(2);
        } else {
            if first != '.' {
                self.lex_digits(10);
                if self.peek_char() == Some('.')
                    && self.peek_char_n(1).map_or(true, |c| c != '.' && !is_ident_start(c))
                {
                    self.bump_char();
                    floating = true;
                }
            } else {
                floating = true;
            }
            if floating {
                self.lex_digits(10);
            }
            floating |= self.lex_exponent();
        }

        match self.peek_char() {
            Some('l' | 'L') if !floating => {
                self.bump_char();
                TokenKind::LongLiteral
            }
            Some('f' | 'F') => {
                self.bump_char();
                TokenKind::FloatLiteral
            }
            Some('d' | 'D') => {
                self.bump_char();
                TokenKind::DoubleLiteral
            }
            _ if floating => TokenKind::DoubleLiteral,
            _ => TokenKind::IntLiteral,
        }
    }

    fn lex_quoted(&mut self, quote: char, kind: TokenKind) -> TokenKind {
        while let Some(c) = self.peek_char() {
            match c {
                '\n' | '\r' => return TokenKind::Error,
                '\\' => {
                    self.bump_char();
                    self.bump_char();
                }
                c if c == quote => {
                    self.bump_char();
                    return kind;
                }
                _ => {
                    self.bump_char();
                }
            }
        }
        TokenKind::Error
    }

    fn lex_text_block(&mut self) -> TokenKind {
        // Opening `"""` already consumed.
        while !self.remaining().is_empty() {
            if self.remaining().starts_with("\"\"\"") {
                self.pos += 3;
                return TokenKind::TextBlock;
            }
            if self.bump_char() == Some('\\') {
                self.bump_char();
            }
        }
        TokenKind::Error
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let ch = self.bump_char()?;

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '@' => TokenKind::At,
            '?' => TokenKind::Question,
            '~' => TokenKind::Tilde,
            '>' => TokenKind::Gt,
            '.' => {
                if self.remaining().starts_with("..") {
                    self.pos += 2;
                    TokenKind::Ellipsis
                } else if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                    self.lex_number('.')
                } else {
                    TokenKind::Dot
                }
            }
            ':' => {
                if self.eat(':') {
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::BangEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Le
                } else if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::ShlEq
                    } else {
                        TokenKind::Shl
                    }
                } else {
                    TokenKind::Lt
                }
            }
            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '^' => {
                if self.eat('=') {
                    TokenKind::CaretEq
                } else {
                    TokenKind::Caret
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AmpAmp
                } else if self.eat('=') {
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::PipePipe
                } else if self.eat('=') {
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                }
            }
            '"' => {
                if self.remaining().starts_with("\"\"") {
                    self.pos += 2;
                    self.lex_text_block()
                } else {
                    self.lex_quoted('"', TokenKind::StringLiteral)
                }
            }
            '\'' => self.lex_quoted('\'', TokenKind::CharLiteral),
            c if c.is_ascii_digit() => self.lex_number(c),
            c if is_ident_start(c) => {
                self.lex_identifier();
                TokenKind::Ident
            }
            _ => TokenKind::Error,
        };

        let range = TextRange::new(
            TextSize::from(start as u32),
            TextSize::from(self.pos as u32),
        );
        Some(Token { kind, range })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn nested_type_arguments_close_one_bracket_at_a_time() {
        use TokenKind::*;
        assert_eq!(
            kinds("Map<K, List<V>> m;"),
            vec![Ident, Lt, Ident, Comma, Ident, Lt, Ident, Gt, Gt, Ident, Semi]
        );
    }

    #[test]
    fn comments_are_trivia() {
        let text = "int /* @A */ x // trailing\n= 1;";
        let tokens = lex(text);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text(text)).collect();
        assert_eq!(texts, vec!["int", "x", "=", "1", ";"]);
    }

    #[test]
    fn varargs_and_method_refs() {
        use TokenKind::*;
        assert_eq!(
            kinds("String @A ... args"),
            vec![Ident, At, Ident, Ellipsis, Ident]
        );
        assert_eq!(kinds("String::length"), vec![Ident, ColonColon, Ident]);
        assert_eq!(kinds("x -> x"), vec![Ident, Arrow, Ident]);
    }

    #[test]
    fn numeric_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("1 10L 0x1F 1.5 .5f 1e10 2d 0b1010 1_000"),
            vec![
                IntLiteral,
                LongLiteral,
                IntLiteral,
                DoubleLiteral,
                FloatLiteral,
                DoubleLiteral,
                DoubleLiteral,
                IntLiteral,
                IntLiteral
            ]
        );
    }

    #[test]
    fn string_char_and_text_block_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#""a\"b" 'c' '\'' """x"y""" "#),
            vec![StringLiteral, CharLiteral, CharLiteral, TextBlock]
        );
        assert_eq!(kinds("\"open"), vec![Error]);
    }

    #[test]
    fn skip_trivia_moves_past_comments() {
        let text = "  /* a */ // b\n  x";
        assert_eq!(skip_trivia(text, 0), text.len() - 1);
    }
}
