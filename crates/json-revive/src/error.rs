//! Error types for decoding, function revival, and regexp compilation.

use thiserror::Error;

/// Errors surfaced by [`parse`](crate::parse) and
/// [`Decoder::decode`](crate::Decoder::decode).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input text is not well-formed JSON.
    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// A duplicate marker names a path that does not exist in the finished
    /// tree. This is a data-integrity defect in the payload, not a normal
    /// runtime condition.
    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),
    /// A `_date_` payload is not a parseable ISO-8601 instant.
    #[error("invalid date payload `{0}`")]
    InvalidDate(String),
    /// A two-part tag payload is missing its `|` separator.
    #[error("malformed `{kind}` payload `{payload}`")]
    MalformedTag {
        kind: &'static str,
        payload: String,
    },
}

/// Errors surfaced when invoking a revived function.
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    /// The function was decoded without an evaluator configured; it can be
    /// inspected but not called.
    #[error("no evaluator configured; cannot invoke revived function `{0}`")]
    NoEvaluator(String),
    /// The evaluator rejected the function source.
    #[error("failed to compile function `{name}`: {message}")]
    Compile { name: String, message: String },
}

/// Errors surfaced when a regexp value is first matched.
#[derive(Debug, Error, Clone)]
pub enum RegExpError {
    /// The flag string carries a flag with no translation.
    #[error("unsupported regexp flag `{0}`")]
    UnsupportedFlag(char),
    /// The pattern itself failed to compile.
    #[error("regexp compile error: {0}")]
    Compile(#[from] regex::Error),
}
