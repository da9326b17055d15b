//! Writer: term → escaped wire text.
//!
//! The inverse of the [reader](super::reader). Sentences and NARTs are
//! written as ordinary lists, empty lists are always `()`, and strings that
//! are not 7-bit safe are sent through the `UnicodeStringFn` wrapper with
//! `&uXXXX;` escapes, because the transport is not guaranteed 8-bit clean.

use std::fmt::Write as _;

use crate::error::{WireResult, WriteError};
use crate::term::{Number, Term, TermList};

/// Head of the wrapper form used for strings with unsafe characters.
pub const UNICODE_STRING_FN: &str = "UnicodeStringFn";

/// Options controlling the written form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write constants as `#$Name` instead of the bare name.
    pub constant_prefix: bool,
}

/// Serializes terms to wire text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Writer {
    options: WriteOptions,
    lenient: bool,
}

impl Writer {
    pub fn new(options: WriteOptions) -> Self {
        Self {
            options,
            lenient: false,
        }
    }

    pub fn options(&self) -> WriteOptions {
        self.options
    }

    /// Serialize `term`.
    ///
    /// Fails only for floats the grammar cannot spell (NaN, infinities).
    pub fn write(&self, term: &Term) -> WireResult<String> {
        let mut out = String::new();
        self.emit(term, &mut out)?;
        Ok(out)
    }

    fn emit(&self, term: &Term, out: &mut String) -> WireResult<()> {
        match term {
            Term::Symbol(symbol) => {
                let _ = write!(out, "{symbol}");
            }
            Term::Keyword(keyword) => {
                let _ = write!(out, "{keyword}");
            }
            Term::Variable(variable) => {
                let _ = write!(out, "{variable}");
            }
            Term::Number(number) => self.emit_number(number, out)?,
            Term::Text(text) => emit_text(text, out),
            Term::Constant(constant) => {
                if self.options.constant_prefix {
                    out.push_str("#$");
                }
                out.push_str(constant.name());
            }
            Term::List(list) => self.emit_list(list, out)?,
            Term::Sentence(sentence) => self.emit_list(sentence.as_list(), out)?,
            Term::Nart(nart) => {
                out.push('(');
                self.emit(nart.functor(), out)?;
                for arg in nart.args() {
                    out.push(' ');
                    self.emit(arg, out)?;
                }
                out.push(')');
            }
            Term::Quoted(inner) => {
                out.push('\'');
                self.emit(inner, out)?;
            }
        }
        Ok(())
    }

    fn emit_list(&self, list: &TermList, out: &mut String) -> WireResult<()> {
        out.push('(');
        for (i, element) in list.elements().iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            self.emit(element, out)?;
        }
        if let Some(tail) = list.tail() {
            out.push_str(" . ");
            self.emit(tail, out)?;
        }
        out.push(')');
        Ok(())
    }

    fn emit_number(&self, number: &Number, out: &mut String) -> WireResult<()> {
        match number {
            Number::Integer(i) => {
                let _ = write!(out, "{i}");
            }
            Number::Float(f) if f.is_finite() => {
                // Debug gives the shortest text that parses back to the same
                // bits; it always carries a `.` or an exponent.
                let text = format!("{f:?}");
                out.push_str(&text);
                if !text.contains(['.', 'e', 'E']) {
                    out.push_str(".0");
                }
            }
            Number::Float(f) if self.lenient => {
                let _ = write!(out, "{f}");
            }
            Number::Float(f) => return Err(WriteError::NonFiniteFloat { value: *f }.into()),
        }
        Ok(())
    }
}

/// Serialize with default options.
pub fn write(term: &Term) -> WireResult<String> {
    Writer::default().write(term)
}

/// Human-readable form used by `Display`: same as the wire form, except that
/// non-finite floats are shown instead of rejected.
pub(crate) fn display(term: &Term) -> String {
    let writer = Writer {
        options: WriteOptions::default(),
        lenient: true,
    };
    let mut out = String::new();
    // Lenient emission has no failure path.
    let _ = writer.emit(term, &mut out);
    out
}

/// Whether `c` can be sent raw inside a string literal.
pub fn is_wire_safe(c: char) -> bool {
    matches!(c, ' '..='~' | '\t' | '\n' | '\r')
}

fn emit_text(text: &str, out: &mut String) {
    if text.chars().all(is_wire_safe) {
        push_quoted(text, out);
        return;
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c == '&' || !is_wire_safe(c) {
            let _ = write!(escaped, "&u{:X};", c as u32);
        } else {
            escaped.push(c);
        }
    }
    out.push('(');
    out.push_str(UNICODE_STRING_FN);
    out.push(' ');
    push_quoted(&escaped, out);
    out.push(')');
}

fn push_quoted(text: &str, out: &mut String) {
    out.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Decode the `&uXXXX;` escapes of a `UnicodeStringFn` payload.
///
/// Sequences that are not well-formed escapes are kept literally.
pub fn decode_unicode_escapes(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;
    while let Some(at) = rest.find("&u") {
        out.push_str(&rest[..at]);
        let after = &rest[at + 2..];
        let decoded = after.find(';').and_then(|end| {
            let hex = &after[..end];
            let valid =
                !hex.is_empty() && hex.len() <= 6 && hex.bytes().all(|b| b.is_ascii_hexdigit());
            valid
                .then(|| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
                .flatten()
                .map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("&u");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
