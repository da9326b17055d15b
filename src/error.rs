//! Rich diagnostic error types for the kbwire codec.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source spans so callers can see exactly
//! which part of a wire response was malformed.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Top-level error type for the codec.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum WireError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Intern(#[from] InternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),
}

// ---------------------------------------------------------------------------
// Lexer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {offset}")]
    #[diagnostic(
        code(kbwire::lex::unterminated_string),
        help(
            "A double-quoted string was opened but never closed. \
             The response was probably truncated by the transport; \
             check that the full reply was received."
        )
    )]
    UnterminatedString {
        offset: usize,
        #[label("string starts here")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("empty constant reference at byte {offset}")]
    #[diagnostic(
        code(kbwire::lex::empty_constant),
        help("The `#$` prefix must be followed by a constant name, e.g. `#$Brazil`.")
    )]
    EmptyConstant {
        offset: usize,
        #[label("`#$` without a name")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },
}

impl LexError {
    /// Byte offset of the offending token in the input.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedString { offset, .. }
            | LexError::EmptyConstant { offset, .. } => *offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("empty input: expected a form")]
    #[diagnostic(
        code(kbwire::parse::empty_input),
        help("The input contained only whitespace or comments. At least one form is required.")
    )]
    EmptyInput,

    #[error("unexpected `)` at byte {offset}")]
    #[diagnostic(
        code(kbwire::parse::unexpected_close),
        help("There are more closing parentheses than opening ones.")
    )]
    UnexpectedClose {
        offset: usize,
        #[label("no list is open here")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("unterminated list opened at byte {offset}")]
    #[diagnostic(
        code(kbwire::parse::unterminated_list),
        help("A `(` was never closed. Check for a truncated response or a missing `)`.")
    )]
    UnterminatedList {
        offset: usize,
        #[label("list opened here")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("misplaced `.` at byte {offset}")]
    #[diagnostic(
        code(kbwire::parse::misplaced_dot),
        help(
            "A dot is only legal inside a list, after at least one element \
             and before exactly one tail form: `(a b . c)`."
        )
    )]
    MisplacedDot {
        offset: usize,
        #[label("dot not allowed here")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("expected `)` after dotted tail at byte {offset}")]
    #[diagnostic(
        code(kbwire::parse::expected_close),
        help("Only a single form may follow the dot of a dotted pair.")
    )]
    ExpectedCloseAfterTail {
        offset: usize,
        #[label("extra form after the tail")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("quote at byte {offset} is not followed by a form")]
    #[diagnostic(
        code(kbwire::parse::dangling_quote),
        help("A `'` must be followed by the form it quotes.")
    )]
    DanglingQuote {
        offset: usize,
        #[label("nothing to quote")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("trailing input after the form at byte {offset}")]
    #[diagnostic(
        code(kbwire::parse::trailing_input),
        help(
            "`read` expects exactly one form. Use `read_one` or `read_all` \
             when several forms are concatenated in one buffer."
        )
    )]
    TrailingInput {
        offset: usize,
        #[label("unexpected form")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },

    #[error("nesting depth exceeded maximum of {max_depth} at byte {offset}")]
    #[diagnostic(
        code(kbwire::parse::depth_exceeded),
        help("Increase `reader.max_depth` in the codec configuration if such deep terms are expected.")
    )]
    DepthExceeded {
        max_depth: usize,
        offset: usize,
        #[label("too deep")]
        span: SourceSpan,
        #[source_code]
        input: String,
    },
}

impl ParseError {
    /// Byte offset of the offending token, if the error is tied to one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::EmptyInput => None,
            ParseError::UnexpectedClose { offset, .. }
            | ParseError::UnterminatedList { offset, .. }
            | ParseError::MisplacedDot { offset, .. }
            | ParseError::ExpectedCloseAfterTail { offset, .. }
            | ParseError::DanglingQuote { offset, .. }
            | ParseError::TrailingInput { offset, .. }
            | ParseError::DepthExceeded { offset, .. } => Some(*offset),
        }
    }
}

// ---------------------------------------------------------------------------
// Write errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum WriteError {
    #[error("cannot encode non-finite float {value}")]
    #[diagnostic(
        code(kbwire::write::non_finite),
        help("The wire grammar has no spelling for NaN or infinity. Replace the value before sending.")
    )]
    NonFiniteFloat { value: f64 },
}

// ---------------------------------------------------------------------------
// Interning errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InternError {
    #[error("constant name \"{name}\" is held by {existing}, cannot register {requested}")]
    #[diagnostic(
        code(kbwire::intern::conflict),
        help(
            "Two different identifiers claim the same constant name. \
             If the constant was renamed on the server, call `ConstantRegistry::rename` \
             or `forget` the stale entry first; otherwise this is a programming error."
        )
    )]
    Conflict {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("constant \"{name}\" ({guid}) is not registered")]
    #[diagnostic(
        code(kbwire::intern::not_registered),
        help("Only interned constants can be renamed. Intern it first with `ConstantRegistry::intern`.")
    )]
    NotRegistered { name: String, guid: String },

    #[error("malformed GUID: \"{text}\"")]
    #[diagnostic(
        code(kbwire::intern::bad_guid),
        help("GUIDs are 32 hex digits in 8-4-4-4-12 groups, e.g. bd58a3a9-9c29-11b1-9dad-c379636f7270.")
    )]
    MalformedGuid { text: String },
}

// ---------------------------------------------------------------------------
// Path errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("path index {index} out of range at depth {depth} (size {size})")]
    #[diagnostic(
        code(kbwire::path::out_of_range),
        help("The path does not resolve within this term. Use `get_arg_positions_for_term` to find valid paths.")
    )]
    OutOfRange {
        index: usize,
        depth: usize,
        size: usize,
    },

    #[error("path continues into atomic term at depth {depth}")]
    #[diagnostic(
        code(kbwire::path::not_composite),
        help("Only lists, sentences, reified terms and quoted forms have addressable children.")
    )]
    NotComposite { depth: usize },
}

// ---------------------------------------------------------------------------
// Oracle errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OracleError {
    #[error("reifiability oracle unavailable: {message}")]
    #[diagnostic(
        code(kbwire::oracle::unavailable),
        help("The reader could not decide whether a form is a reified term. Retry once the knowledge base is reachable.")
    )]
    Unavailable { message: String },

    #[error("reifiability check failed for {functor}: {message}")]
    #[diagnostic(
        code(kbwire::oracle::failed),
        help("The oracle raised an error for this functor; the whole form was rejected rather than guessed.")
    )]
    Failed { functor: String, message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    #[diagnostic(
        code(kbwire::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}")]
    #[diagnostic(
        code(kbwire::config::write),
        help("Check that the directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    #[diagnostic(
        code(kbwire::config::parse),
        help("The file must be valid TOML with optional [reader], [writer] and [cache] tables.")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(kbwire::config::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    #[error("transport failed: {message}")]
    #[diagnostic(
        code(kbwire::transport::failed),
        help("The request never produced a response. Check the connection to the knowledge base.")
    )]
    Failed { message: String },
}

/// Convenience alias for functions returning codec results.
pub type WireResult<T> = std::result::Result<T, WireError>;
