//! Tokenizer: wire text → lexical tokens with byte spans.
//!
//! Whitespace separates tokens and is never emitted; `;` starts a comment
//! that runs to the end of the line (the protocol's `;;` comments included).
//! Numbers are recognized here so that the reader only ever sees finished
//! [`Number`] values; integers go straight to arbitrary precision.

use num_bigint::BigInt;

use crate::error::LexError;
use crate::term::Number;

/// Byte-level source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// What a token is.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Open,
    Close,
    /// A standalone `.`.
    Dot,
    Quote,
    /// A string literal, escapes already resolved.
    Text(String),
    Number(Number),
    /// Any other bare word: symbols, keywords, variables, `#$` constants.
    Word(String),
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lazy token stream over a text buffer.
///
/// Yields `Err` at most once; iteration stops after an error.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset just past the last token produced.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if c == ';' {
                match self.input[self.pos..].find('\n') {
                    Some(nl) => self.pos += nl + 1,
                    None => self.pos = self.input.len(),
                }
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexError> {
        // Opening quote already consumed.
        let mut text = String::new();
        let mut chars = self.input[self.pos..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(Token {
                        kind: TokenKind::Text(text),
                        span: Span {
                            start,
                            end: self.pos,
                        },
                    });
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => text.push(escaped),
                    None => break,
                },
                other => text.push(other),
            }
        }
        Err(LexError::UnterminatedString {
            offset: start,
            span: (start, 1).into(),
            input: self.input.to_string(),
        })
    }

    fn lex_word(&mut self, start: usize) -> Result<Token, LexError> {
        let rest = &self.input[start..];
        let len = rest.find(is_delimiter).unwrap_or(rest.len());
        let word = &rest[..len];
        self.pos = start + len;
        let span = Span {
            start,
            end: self.pos,
        };

        if word == "." {
            return Ok(Token {
                kind: TokenKind::Dot,
                span,
            });
        }
        if word == "#$" {
            return Err(LexError::EmptyConstant {
                offset: start,
                span: span.into(),
                input: self.input.to_string(),
            });
        }
        let kind = match parse_number(word) {
            Some(number) => TokenKind::Number(number),
            None => TokenKind::Word(word.to_string()),
        };
        Ok(Token { kind, span })
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_trivia();
        let start = self.pos;
        let c = self.peek_char()?;
        let single = |kind| {
            Some(Ok(Token {
                kind,
                span: Span {
                    start,
                    end: start + 1,
                },
            }))
        };
        match c {
            '(' => {
                self.pos += 1;
                single(TokenKind::Open)
            }
            ')' => {
                self.pos += 1;
                single(TokenKind::Close)
            }
            '\'' => {
                self.pos += 1;
                single(TokenKind::Quote)
            }
            '"' => {
                self.pos += 1;
                let result = self.lex_string(start);
                self.failed = result.is_err();
                Some(result)
            }
            _ => {
                let result = self.lex_word(start);
                self.failed = result.is_err();
                Some(result)
            }
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | ';')
}

/// Parse `[+-]digits[.digits][(e|E)[+-]digits]`.
///
/// Anything else (`.5`, `1.`, `1e`, `-`) is not a number and stays a word.
pub fn parse_number(word: &str) -> Option<Number> {
    let bytes = word.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let from = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i > from
    };

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    if !digits(&mut i) {
        return None;
    }
    let mut is_float = false;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !digits(&mut i) {
            return None;
        }
        is_float = true;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !digits(&mut i) {
            return None;
        }
        is_float = true;
    }
    if i != bytes.len() {
        return None;
    }

    if is_float {
        word.parse::<f64>().ok().map(Number::Float)
    } else {
        word.strip_prefix('+')
            .unwrap_or(word)
            .parse::<BigInt>()
            .ok()
            .map(Number::Integer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn delimiters_and_words() {
        assert_eq!(
            kinds("(foo . bar)"),
            vec![
                TokenKind::Open,
                TokenKind::Word("foo".into()),
                TokenKind::Dot,
                TokenKind::Word("bar".into()),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn quote_is_its_own_token() {
        assert_eq!(
            kinds("'(a)"),
            vec![
                TokenKind::Quote,
                TokenKind::Open,
                TokenKind::Word("a".into()),
                TokenKind::Close
            ]
        );
    }

    #[test]
    fn strings_resolve_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\" \\ ok""#),
            vec![TokenKind::Text(r#"say "hi" \ ok"#.into())]
        );
    }

    #[test]
    fn unterminated_string_is_lex_error() {
        let mut tokens = Tokenizer::new(r#"(a "open"#);
        assert!(tokens.next().unwrap().is_ok());
        assert!(tokens.next().unwrap().is_ok());
        let err = tokens.next().unwrap().unwrap_err();
        assert_eq!(err.offset(), 3);
        assert!(tokens.next().is_none());
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            kinds(";; header\n  a ;; trailing\n\tb"),
            vec![TokenKind::Word("a".into()), TokenKind::Word("b".into())]
        );
    }

    #[test]
    fn numbers_follow_the_grammar() {
        assert_eq!(parse_number("42"), Some(Number::from(42i64)));
        assert_eq!(parse_number("-7"), Some(Number::from(-7i64)));
        assert_eq!(parse_number("+7"), Some(Number::from(7i64)));
        assert_eq!(parse_number("2.5"), Some(Number::Float(2.5)));
        assert_eq!(parse_number("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_number("-1.5E-2"), Some(Number::Float(-0.015)));
        assert_eq!(parse_number(".5"), None);
        assert_eq!(parse_number("1."), None);
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn huge_integers_do_not_overflow() {
        let text = "340282366920938463463374607431768211456999";
        match parse_number(text) {
            Some(Number::Integer(i)) => assert_eq!(i.to_string(), text),
            other => panic!("expected integer, got {other:?}"),
        }
    }

    #[test]
    fn spans_cover_tokens() {
        let tokens: Vec<Token> = Tokenizer::new("(ab \"c\")").map(|t| t.unwrap()).collect();
        assert_eq!(tokens[1].span, Span { start: 1, end: 3 });
        assert_eq!(tokens[2].span, Span { start: 4, end: 7 });
    }

    #[test]
    fn bare_constant_prefix_is_lex_error() {
        let mut tokens = Tokenizer::new("#$ foo");
        assert!(matches!(
            tokens.next().unwrap(),
            Err(LexError::EmptyConstant { offset: 0, .. })
        ));
    }
}
