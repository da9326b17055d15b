//! Reader: wire text → terms.
//!
//! Recursive descent over the [tokenizer](super::token). Bare words are
//! classified here, symbols are resolved against the
//! [`ConstantRegistry`], and list forms are promoted to sentences or NARTs:
//!
//! 1. `(UnicodeStringFn "...")` decodes back into a text literal,
//! 2. a list headed by a connective or quantifier becomes a [`Sentence`],
//! 3. a list headed by a functor the [`ReifiabilityOracle`] accepts becomes a
//!    [`Nart`] (the registry's indexed form if it has one).

use crate::error::{ParseError, WireError, WireResult};
use crate::registry::ConstantRegistry;
use crate::term::{Keyword, LogicalOperator, Nart, Sentence, Symbol, Term, TermList, Variable};

use super::oracle::{NeverReifiable, ReifiabilityOracle};
use super::token::{Span, Token, TokenKind, Tokenizer};
use super::writer::{UNICODE_STRING_FN, decode_unicode_escapes};

static NEVER: NeverReifiable = NeverReifiable;

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options controlling how text is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Maximum list/quote nesting before the read fails.
    pub max_depth: usize,
    /// Read the bare word `NIL` as `()`, as the remote engine's printer uses it.
    pub nil_as_empty_list: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            nil_as_empty_list: false,
        }
    }
}

/// Parses wire text into [`Term`]s.
///
/// Cheap to construct; holds only references to its collaborators.
#[derive(Clone, Copy)]
pub struct Reader<'a> {
    registry: &'a ConstantRegistry,
    oracle: &'a dyn ReifiabilityOracle,
    options: ReaderOptions,
}

impl<'a> Reader<'a> {
    /// A reader resolving constants in `registry` that never builds NARTs.
    pub fn new(registry: &'a ConstantRegistry) -> Self {
        Self {
            registry,
            oracle: &NEVER,
            options: ReaderOptions::default(),
        }
    }

    pub fn with_oracle(mut self, oracle: &'a dyn ReifiabilityOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Read exactly one form. Anything but whitespace and comments after it
    /// is an error.
    pub fn read(&self, text: &str) -> WireResult<Term> {
        let mut parser = Parser::new(self, text);
        let term = parser.form()?.ok_or(ParseError::EmptyInput)?;
        if let Some(extra) = parser.next()? {
            let unbalanced = extra.kind == TokenKind::Close;
            return Err(parser.error_at(extra.span, |offset, span, input| {
                if unbalanced {
                    ParseError::UnexpectedClose {
                        offset,
                        span,
                        input,
                    }
                } else {
                    ParseError::TrailingInput {
                        offset,
                        span,
                        input,
                    }
                }
            }));
        }
        Ok(term)
    }

    /// Read the first form and return it with the unconsumed remainder.
    pub fn read_one<'t>(&self, text: &'t str) -> WireResult<(Term, &'t str)> {
        let mut parser = Parser::new(self, text);
        let term = parser.form()?.ok_or(ParseError::EmptyInput)?;
        Ok((term, &text[parser.consumed()..]))
    }

    /// Read every form in the buffer.
    pub fn read_all(&self, text: &str) -> WireResult<Vec<Term>> {
        let mut parser = Parser::new(self, text);
        let mut terms = Vec::new();
        while let Some(term) = parser.form()? {
            terms.push(term);
        }
        Ok(terms)
    }
}

impl std::fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("registry", self.registry)
            .field("options", &self.options)
            .finish()
    }
}

struct Parser<'r, 't> {
    reader: &'r Reader<'r>,
    tokens: Tokenizer<'t>,
    input: &'t str,
}

impl<'r, 't> Parser<'r, 't> {
    fn new(reader: &'r Reader<'r>, input: &'t str) -> Self {
        Self {
            reader,
            tokens: Tokenizer::new(input),
            input,
        }
    }

    fn next(&mut self) -> WireResult<Option<Token>> {
        Ok(self.tokens.next().transpose()?)
    }

    fn consumed(&self) -> usize {
        self.tokens.offset()
    }

    fn error_at(
        &self,
        span: Span,
        make: impl FnOnce(usize, miette::SourceSpan, String) -> ParseError,
    ) -> WireError {
        make(span.start, span.into(), self.input.to_string()).into()
    }

    /// Next complete form, or `None` at end of input.
    fn form(&mut self) -> WireResult<Option<Term>> {
        match self.next()? {
            Some(token) => self.parse_token(token, 0).map(Some),
            None => Ok(None),
        }
    }

    fn parse_token(&mut self, token: Token, depth: usize) -> WireResult<Term> {
        match token.kind {
            TokenKind::Open => self.parse_list(token.span, depth + 1),
            TokenKind::Close => Err(self.error_at(token.span, |offset, span, input| {
                ParseError::UnexpectedClose {
                    offset,
                    span,
                    input,
                }
            })),
            TokenKind::Dot => Err(self.misplaced_dot(token.span)),
            TokenKind::Quote => self.parse_quoted(token.span, depth + 1),
            TokenKind::Text(text) => Ok(Term::Text(text)),
            TokenKind::Number(number) => Ok(Term::Number(number)),
            TokenKind::Word(word) => Ok(self.classify_word(&word)),
        }
    }

    fn check_depth(&self, span: Span, depth: usize) -> WireResult<()> {
        let max_depth = self.reader.options.max_depth;
        if depth > max_depth {
            return Err(self.error_at(span, |offset, span, input| ParseError::DepthExceeded {
                max_depth,
                offset,
                span,
                input,
            }));
        }
        Ok(())
    }

    fn misplaced_dot(&self, span: Span) -> WireError {
        self.error_at(span, |offset, span, input| ParseError::MisplacedDot {
            offset,
            span,
            input,
        })
    }

    fn unterminated(&self, open: Span) -> WireError {
        self.error_at(open, |offset, span, input| ParseError::UnterminatedList {
            offset,
            span,
            input,
        })
    }

    fn parse_quoted(&mut self, quote: Span, depth: usize) -> WireResult<Term> {
        self.check_depth(quote, depth)?;
        match self.next()? {
            Some(Token {
                kind: TokenKind::Close,
                ..
            })
            | None => Err(self.error_at(quote, |offset, span, input| ParseError::DanglingQuote {
                offset,
                span,
                input,
            })),
            Some(token) => Ok(Term::Quoted(Box::new(self.parse_token(token, depth)?))),
        }
    }

    fn parse_list(&mut self, open: Span, depth: usize) -> WireResult<Term> {
        self.check_depth(open, depth)?;
        let mut elements = Vec::new();
        loop {
            let Some(token) = self.next()? else {
                return Err(self.unterminated(open));
            };
            match token.kind {
                TokenKind::Close => return self.promote(TermList::proper(elements)),
                TokenKind::Dot => {
                    if elements.is_empty() {
                        return Err(self.misplaced_dot(token.span));
                    }
                    let tail = match self.next()? {
                        None => return Err(self.unterminated(open)),
                        Some(Token {
                            kind: TokenKind::Close | TokenKind::Dot,
                            ..
                        }) => return Err(self.misplaced_dot(token.span)),
                        Some(tail) => self.parse_token(tail, depth)?,
                    };
                    return match self.next()? {
                        Some(Token {
                            kind: TokenKind::Close,
                            ..
                        }) => self.promote(TermList::dotted(elements, tail)),
                        Some(extra) => Err(self.error_at(extra.span, |offset, span, input| {
                            ParseError::ExpectedCloseAfterTail {
                                offset,
                                span,
                                input,
                            }
                        })),
                        None => Err(self.unterminated(open)),
                    };
                }
                _ => elements.push(self.parse_token(token, depth)?),
            }
        }
    }

    /// Turn a finished list into the most specific term it denotes.
    fn promote(&self, list: TermList) -> WireResult<Term> {
        if !list.is_proper() {
            return Ok(Term::List(list));
        }
        let Some(head) = list.head() else {
            return Ok(Term::List(list));
        };

        if head.operator_name() == Some(UNICODE_STRING_FN) {
            if let [Term::Text(escaped)] = list.rest() {
                return Ok(Term::Text(decode_unicode_escapes(escaped)));
            }
        }

        if LogicalOperator::from_term(head).is_some() {
            return Ok(Term::Sentence(Sentence::from_list(list)));
        }

        if head.operator_name().is_some() && !list.rest().is_empty() {
            let reifiable = self.reader.oracle.is_reifiable(head).inspect_err(|e| {
                tracing::warn!(error = %e, functor = %head, "reader: reifiability oracle failed");
            })?;
            if reifiable {
                let (mut elements, _) = list.into_parts();
                let args = elements.split_off(1);
                let functor = elements.remove(0);
                let nart = self
                    .reader
                    .registry
                    .find_nart(&functor, &args)
                    .unwrap_or_else(|| Nart::new(functor, args));
                return Ok(Term::Nart(nart));
            }
        }

        Ok(Term::List(list))
    }

    fn classify_word(&self, word: &str) -> Term {
        if let Some(name) = word.strip_prefix("#$") {
            return self.resolve(Symbol::new(name));
        }
        if let Some(name) = word.strip_prefix("??").filter(|n| !n.is_empty()) {
            return Term::Variable(Variable::dont_care(name));
        }
        if let Some(name) = word.strip_prefix('?').filter(|n| !n.is_empty()) {
            return Term::Variable(Variable::new(name));
        }
        if let Some(name) = word.strip_prefix(':') {
            if !name.is_empty() && !name.contains(':') {
                return Term::Keyword(Keyword::new(name));
            }
            return Term::Symbol(Symbol::new(word));
        }
        if self.reader.options.nil_as_empty_list && word.eq_ignore_ascii_case("nil") {
            return Term::nil();
        }
        match split_namespace(word) {
            Some((namespace, name)) => Term::Symbol(Symbol::qualified(namespace, name)),
            None => self.resolve(Symbol::new(word)),
        }
    }

    /// Registered constant with this name, else the symbol itself.
    fn resolve(&self, symbol: Symbol) -> Term {
        match self.reader.registry.lookup_name(&symbol.name) {
            Some(constant) => Term::Constant(constant),
            None => Term::Symbol(symbol),
        }
    }
}

/// Split `ns:name` or `ns::name`; both halves must be non-empty.
fn split_namespace(word: &str) -> Option<(&str, &str)> {
    let at = word.find(':')?;
    let namespace = &word[..at];
    let rest = &word[at + 1..];
    let name = rest.strip_prefix(':').unwrap_or(rest);
    (!namespace.is_empty() && !name.is_empty()).then_some((namespace, name))
}
