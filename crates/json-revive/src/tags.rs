//! Tag-format constants for the extended JSON wire scheme.
//!
//! Every extended value travels inside an otherwise plain JSON string of the
//! form `_<kind>_<payload>`. These prefixes are the entire wire protocol:
//! there is no binary format, no version field, no magic header. Payloads
//! are opaque past the first `|` delimiter for the two-part kinds.

/// Regular expression: `_regexp_<flags>|<source>`.
pub const REGEXP: &str = "_regexp_";

/// Function: `_function_<name>|<normalized source>`.
pub const FUNCTION: &str = "_function_";

/// Symbol: `_symbol_<description>`.
pub const SYMBOL: &str = "_symbol_";

/// Date: `_date_<ISO-8601 instant with milliseconds>`.
pub const DATE: &str = "_date_";

/// Shared or cyclic reference: `_duplicate_<dotted path>`.
pub const DUPLICATE: &str = "_duplicate_";

/// The `undefined` sentinel. Matched as an exact literal.
pub const UNDEFINED: &str = "_undefined_";

/// Negative infinity sentinel. Matched as an exact literal.
pub const NEG_INFINITY: &str = "_-Infinity_";

/// Positive infinity sentinel. Matched as an exact literal.
pub const INFINITY: &str = "_Infinity_";

/// Not-a-number sentinel. Matched as an exact literal.
pub const NAN: &str = "_NaN_";

/// Sentinel key carrying an object's constructor name inside the encoded
/// tree. Written by the encoder for named objects and removed again by the
/// decoder.
pub const CONSTRUCTOR_KEY: &str = "_constructor_";
