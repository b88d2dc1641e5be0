//! The extended value universe the codec operates on.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::RegExpError;
use crate::func::{FuncData, NativeFn};

/// A JavaScript-style value.
///
/// Containers (`Array`, `Object`) have reference identity: [`Clone`] is
/// shallow and shares the backing store, so clones compare
/// [`same_identity`](Value::same_identity). That is what lets a single
/// graph hold cycles and shared references.
///
/// [`Debug`] and [`PartialEq`] recurse structurally and are not meant for
/// cyclic graphs; use [`same_identity`](Value::same_identity) to probe
/// those.
#[derive(Clone)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    /// All numbers are `f64`; non-finite values are representable in memory
    /// and tagged on the wire.
    Number(f64),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<ObjectData>>),
    Date(OffsetDateTime),
    RegExp(Rc<RegExpData>),
    Symbol(Rc<SymbolData>),
    Function(Rc<FuncData>),
}

/// Backing store of an object value: insertion-ordered entries plus the
/// nominal constructor name (`None` for plain objects).
#[derive(Debug, Default)]
pub struct ObjectData {
    pub entries: IndexMap<String, Value>,
    pub class_name: Option<String>,
}

/// A regular expression value: pattern source and flag string as written,
/// compiled lazily on first match.
#[derive(Debug)]
pub struct RegExpData {
    pub source: String,
    pub flags: String,
    compiled: OnceCell<Result<regex::Regex, RegExpError>>,
}

impl RegExpData {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
            compiled: OnceCell::new(),
        }
    }

    /// Whether `text` matches, compiling the pattern on first use.
    ///
    /// Flags `i`, `m`, `s` translate to inline groups; `g` and `u` are
    /// accepted no-ops (iteration state and Unicode mode have no
    /// equivalent here). Anything else is [`RegExpError::UnsupportedFlag`].
    pub fn is_match(&self, text: &str) -> Result<bool, RegExpError> {
        match self.compiled.get_or_init(|| self.compile()) {
            Ok(pattern) => Ok(pattern.is_match(text)),
            Err(err) => Err(err.clone()),
        }
    }

    fn compile(&self) -> Result<regex::Regex, RegExpError> {
        let mut inline = String::new();
        for flag in self.flags.chars() {
            match flag {
                'i' | 'm' | 's' => inline.push(flag),
                'g' | 'u' => {}
                other => return Err(RegExpError::UnsupportedFlag(other)),
            }
        }
        let pattern = if inline.is_empty() {
            self.source.clone()
        } else {
            format!("(?{inline}){}", self.source)
        };
        Ok(regex::Regex::new(&pattern)?)
    }
}

/// A symbol value. Identity is the allocation: two symbols with equal
/// descriptions are still distinct symbols.
#[derive(Debug)]
pub struct SymbolData {
    pub description: String,
}

impl Value {
    /// New empty array value.
    pub fn array() -> Value {
        Value::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// New empty plain object value.
    pub fn object() -> Value {
        Value::Object(Rc::new(RefCell::new(ObjectData::default())))
    }

    /// New empty object with a nominal constructor name.
    pub fn object_of_class(name: impl Into<String>) -> Value {
        Value::Object(Rc::new(RefCell::new(ObjectData {
            entries: IndexMap::new(),
            class_name: Some(name.into()),
        })))
    }

    /// New symbol with the given description.
    pub fn symbol(description: impl Into<String>) -> Value {
        Value::Symbol(Rc::new(SymbolData {
            description: description.into(),
        }))
    }

    /// New regexp from pattern source and flag string.
    pub fn regexp(source: impl Into<String>, flags: impl Into<String>) -> Value {
        Value::RegExp(Rc::new(RegExpData::new(source, flags)))
    }

    /// Function value backed by source text alone. It can be encoded and
    /// inspected; invoking it requires an evaluator.
    pub fn function(name: impl Into<String>, source: impl Into<String>) -> Value {
        Value::Function(Rc::new(FuncData::from_source(name, source)))
    }

    /// Natively backed function. Its reported source is the opaque
    /// `[native code]` stub, which the encoder replaces with a no-op body.
    pub fn native_function(name: impl Into<String>, body: NativeFn) -> Value {
        Value::Function(Rc::new(FuncData::native(name, body)))
    }

    /// Insert an entry. No-op unless `self` is an object.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        if let Value::Object(data) = self {
            data.borrow_mut().entries.insert(key.into(), value);
        }
    }

    /// Append an element. No-op unless `self` is an array.
    pub fn push(&self, value: Value) {
        if let Value::Array(items) = self {
            items.borrow_mut().push(value);
        }
    }

    /// Look up an object entry by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(data) => data.borrow().entries.get(key).cloned(),
            _ => None,
        }
    }

    /// Look up an array element by index.
    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            Value::Array(items) => items.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// The object's nominal constructor name, if any.
    pub fn class_name(&self) -> Option<String> {
        match self {
            Value::Object(data) => data.borrow().class_name.clone(),
            _ => None,
        }
    }

    /// Container identity (the backing allocation address), used by the
    /// encoder's visitation table. `None` for non-containers.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(Rc::as_ptr(items) as usize),
            Value::Object(data) => Some(Rc::as_ptr(data) as usize),
            _ => None,
        }
    }

    /// Whether `self` and `other` are the same allocation.
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<Rc<FuncData>> {
        match self {
            Value::Function(func) => Some(func.clone()),
            _ => None,
        }
    }
}

/// Structural equality.
///
/// Arrays and objects compare element-wise (identity short-circuits),
/// dates by instant, regexps by source and flags, functions by name and
/// source, symbols by identity. `NaN` is unequal to itself, as in IEEE
/// comparison. Diverges on cyclic graphs whose cycles are not
/// identity-equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(xa, ya)| deep_equal(xa, ya))
        }
        (Value::Object(x), Value::Object(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            x.class_name == y.class_name
                && x.entries.len() == y.entries.len()
                && x.entries
                    .iter()
                    .all(|(key, xv)| y.entries.get(key).is_some_and(|yv| deep_equal(xv, yv)))
        }
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::RegExp(x), Value::RegExp(y)) => x.source == y.source && x.flags == y.flags,
        (Value::Symbol(x), Value::Symbol(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => {
            Rc::ptr_eq(x, y) || (x.name() == y.name() && x.source() == y.source())
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        deep_equal(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Undefined => write!(f, "Undefined"),
            Value::Bool(flag) => write!(f, "Bool({flag})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Value::Object(data) => {
                let data = data.borrow();
                let mut map = f.debug_map();
                if let Some(name) = &data.class_name {
                    map.entry(&"(class)", name);
                }
                map.entries(data.entries.iter()).finish()
            }
            Value::Date(instant) => write!(f, "Date({})", format_iso(instant)),
            Value::RegExp(re) => write!(f, "RegExp(/{}/{})", re.source, re.flags),
            Value::Symbol(sym) => write!(f, "Symbol({})", sym.description),
            Value::Function(func) => write!(f, "Function({})", func.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Value {
        Value::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }
}

/// Format an instant the way the wire carries dates: UTC, millisecond
/// precision, trailing `Z`.
pub(crate) fn format_iso(instant: &OffsetDateTime) -> String {
    let description = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    instant
        .to_offset(UtcOffset::UTC)
        .format(&description)
        .unwrap_or_default()
}

/// Parse a wire date payload (RFC 3339 / ISO-8601 instant).
pub(crate) fn parse_iso(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339).ok()
}
