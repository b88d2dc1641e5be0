//! Extended JSON codec.
//!
//! Round-trips value graphs that plain JSON cannot represent (cyclic
//! object graphs, shared references, functions, symbols, dates, regular
//! expressions, `undefined`, and non-finite numbers) through ordinary
//! JSON text. Extended kinds travel as tagged strings (`_date_…`,
//! `_regexp_…`, see [`tags`]); shared and cyclic containers become
//! `_duplicate_<path>` markers that decoding resolves against the finished
//! tree in a deferred patch pass.
//!
//! ```
//! use json_revive::{parse, stringify, Value};
//!
//! let point = Value::object();
//! point.insert("x", Value::from(1.0));
//! point.insert("loop", point.clone());
//!
//! let text = stringify(&point);
//! assert_eq!(text, r#"{"x":1,"loop":"_duplicate_$"}"#);
//!
//! let back = parse(&text).unwrap();
//! assert!(back.get("loop").unwrap().same_identity(&back));
//! ```
//!
//! # Security
//!
//! Decoded functions carry arbitrary payload source text. The crate ships
//! no evaluator: revived functions refuse to run until an [`Evaluator`] is
//! supplied through [`ParseOptions`]. Supplying one executes
//! payload-controlled text: never do that for untrusted input, and keep
//! the evaluator free of ambient capabilities.

pub mod decode;
pub mod encode;
pub mod error;
pub mod func;
pub mod normalize;
pub mod path;
pub mod tags;
pub mod value;

pub use decode::Decoder;
pub use encode::{encode, Encoder, Replaced, DEFAULT_MAX_DEPTH};
pub use error::{DecodeError, EvalError, RegExpError};
pub use func::{Evaluator, FuncData, NativeFn};
pub use normalize::normalize_source;
pub use value::{deep_equal, ObjectData, RegExpData, SymbolData, Value};

use std::rc::Rc;

/// Options for [`stringify_with`].
#[derive(Clone, Debug)]
pub struct StringifyOptions {
    /// Container nesting bound before lossy truncation.
    pub max_depth: usize,
    /// Indent unit forwarded verbatim to the JSON printer; `None` prints
    /// compactly.
    pub space: Option<String>,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            space: None,
        }
    }
}

/// Options for [`parse_with`].
#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Evaluator handed to revived functions, which compile their source
    /// through it on first call. `None` (the default) decodes functions
    /// fine but refuses to run them. See the crate-level security note.
    pub evaluator: Option<Rc<dyn Evaluator>>,
}

/// Serialize a value graph with default options.
pub fn stringify(value: &Value) -> String {
    stringify_with(value, &StringifyOptions::default())
}

/// Serialize a value graph to extended JSON text.
pub fn stringify_with(value: &Value, options: &StringifyOptions) -> String {
    let tree = encode(value, options.max_depth);
    match &options.space {
        None => serde_json::to_string(&tree).unwrap_or_default(),
        Some(space) => {
            use serde::Serialize;
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(space.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            if tree.serialize(&mut serializer).is_err() {
                return String::new();
            }
            String::from_utf8(out).unwrap_or_default()
        }
    }
}

/// Parse extended JSON text with no evaluator configured.
pub fn parse(text: &str) -> Result<Value, DecodeError> {
    parse_with(text, ParseOptions::default())
}

/// Parse extended JSON text into a value graph.
///
/// Malformed JSON surfaces the underlying parser's error unchanged, as
/// [`DecodeError::Json`].
pub fn parse_with(text: &str, options: ParseOptions) -> Result<Value, DecodeError> {
    let tree: serde_json::Value = serde_json::from_str(text)?;
    let mut decoder = Decoder::new(options.evaluator);
    decoder.decode(&tree)
}

/// Quick shape check: does `text` plausibly hold a JSON document?
///
/// True iff the trimmed text starts with `[`, `{`, or `"` and ends with
/// `]`, `}`, or `"`. Not a validator; callers must still handle parse
/// failure.
pub fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with(['[', '{', '"']) && trimmed.ends_with([']', '}', '"'])
}
