//! Wire codec: tokenizer, reader, writer and the collaborators they consume.
//!
//! - **Tokenizer** ([`token`]): text → tokens with byte spans
//! - **Reader** ([`reader`]): tokens → [`Term`]s, resolving constants and
//!   promoting sentences and NARTs
//! - **Writer** ([`writer`]): [`Term`]s → text, the reader's inverse
//! - **Oracle** ([`oracle`]): injected "is this functor reifiable?" capability
//!
//! The codec never opens a connection. A [`Transport`] supplied by the caller
//! moves text; [`Codec::call`] glues the three together for one round trip.

pub mod oracle;
pub mod reader;
pub mod token;
pub mod writer;

pub use oracle::{NamedFunctions, NeverReifiable, ReifiabilityOracle};
pub use reader::{DEFAULT_MAX_DEPTH, Reader, ReaderOptions};
pub use token::{Span, Token, TokenKind, Tokenizer};
pub use writer::{UNICODE_STRING_FN, WriteOptions, Writer, decode_unicode_escapes, is_wire_safe};

use crate::error::WireResult;
use crate::registry::ConstantRegistry;
use crate::term::Term;

/// Read one form, resolving constants against the global registry.
pub fn read(text: &str) -> WireResult<Term> {
    Reader::new(ConstantRegistry::global()).read(text)
}

/// Serialize a term with default options.
pub fn write(term: &Term) -> WireResult<String> {
    writer::write(term)
}

/// Moves request text to the remote engine and returns its reply.
///
/// Implementations own connection handling, timeouts and retries.
pub trait Transport {
    fn round_trip(&self, request: &str) -> WireResult<String>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> WireResult<String>,
{
    fn round_trip(&self, request: &str) -> WireResult<String> {
        self(request)
    }
}

/// A reader and writer pair sharing one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    reader: Reader<'a>,
    writer: Writer,
}

impl<'a> Codec<'a> {
    pub fn new(reader: Reader<'a>, writer: Writer) -> Self {
        Self { reader, writer }
    }

    pub fn reader(&self) -> &Reader<'a> {
        &self.reader
    }

    pub fn writer(&self) -> &Writer {
        &self.writer
    }

    pub fn read(&self, text: &str) -> WireResult<Term> {
        self.reader.read(text)
    }

    pub fn write(&self, term: &Term) -> WireResult<String> {
        self.writer.write(term)
    }

    /// Write `request`, send it through `transport` and read the reply.
    pub fn call(&self, transport: &dyn Transport, request: &Term) -> WireResult<Term> {
        let text = self.writer.write(request)?;
        tracing::debug!(request = %text, "sending form");
        let reply = transport.round_trip(&text)?;
        tracing::debug!(bytes = reply.len(), "received reply");
        self.reader.read(&reply)
    }
}
