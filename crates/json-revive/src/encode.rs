//! Encoder: identity-tracking, depth-limiting preorder walk producing the
//! tagged JSON tree.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::normalize::normalize_source;
use crate::path;
use crate::tags;
use crate::value::{format_iso, Value};

/// Default container-nesting bound before lossy truncation.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Outcome of one encode step.
pub enum Replaced {
    /// Emit this node as-is.
    Node(serde_json::Value),
    /// Let the driver descend into the container's members.
    Recurse,
}

/// Per-call encoder state.
///
/// Tracks the visitation table (container identity → first-seen dotted
/// path), the ancestor stack, and the lockstep key list. All state lives in
/// the instance; concurrent encodes never share anything.
pub struct Encoder {
    max_depth: usize,
    seen: HashMap<usize, String>,
    ancestors: Vec<usize>,
    keys: Vec<String>,
}

impl Encoder {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            seen: HashMap::new(),
            ancestors: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// One encode step, pluggable into any preorder JSON tree-serializer.
    ///
    /// The driver calls this with `(key, value, holder)` for every pair it
    /// visits, parent before children, starting with a synthetic root call
    /// (key `""`, no holder) that resets all traversal state. On every
    /// other call the ancestor stack is popped until its top matches the
    /// holder, re-synchronizing after the driver backtracks out of a
    /// branch.
    ///
    /// Returns [`Replaced::Recurse`] for a first-seen container within the
    /// depth bound; the driver is expected to descend into its members and
    /// to append the [`tags::CONSTRUCTOR_KEY`] marker for named objects.
    /// Everything else comes back as a finished node.
    pub fn replace(&mut self, key: &str, value: &Value, holder: Option<&Value>) -> Replaced {
        match holder {
            None => {
                self.seen.clear();
                self.ancestors.clear();
                self.keys.clear();
            }
            Some(holder) => {
                if let Some(identity) = holder.identity() {
                    while self.ancestors.last().is_some_and(|top| *top != identity) {
                        self.ancestors.pop();
                        self.keys.pop();
                    }
                }
            }
        }
        match value {
            Value::RegExp(re) => Replaced::Node(tagged(
                tags::REGEXP,
                &format!("{}|{}", re.flags, re.source),
            )),
            Value::Function(func) => {
                let mut source = normalize_source(func.source());
                if opaque_source(&source) {
                    source = noop_source(func.name());
                }
                Replaced::Node(tagged(tags::FUNCTION, &format!("{}|{source}", func.name())))
            }
            Value::Symbol(sym) => Replaced::Node(tagged(tags::SYMBOL, &sym.description)),
            Value::Date(instant) => Replaced::Node(tagged(tags::DATE, &format_iso(instant))),
            Value::String(text) if date_shaped(text) => {
                // ISO-shaped strings re-tag as dates; a known false-positive
                // source, kept for wire compatibility.
                Replaced::Node(tagged(tags::DATE, text))
            }
            Value::Undefined => Replaced::Node(literal(tags::UNDEFINED)),
            Value::Number(n) if n.is_nan() => Replaced::Node(literal(tags::NAN)),
            Value::Number(n) if *n == f64::NEG_INFINITY => {
                Replaced::Node(literal(tags::NEG_INFINITY))
            }
            Value::Number(n) if *n == f64::INFINITY => Replaced::Node(literal(tags::INFINITY)),
            Value::Number(n) => Replaced::Node(number_node(*n)),
            Value::String(text) => Replaced::Node(serde_json::Value::String(text.clone())),
            Value::Bool(flag) => Replaced::Node(serde_json::Value::Bool(*flag)),
            Value::Null => Replaced::Node(serde_json::Value::Null),
            Value::Array(_) | Value::Object(_) => {
                self.replace_container(key, value, holder.is_none())
            }
        }
    }

    fn replace_container(&mut self, key: &str, value: &Value, is_root: bool) -> Replaced {
        if self.ancestors.len() >= self.max_depth {
            return Replaced::Node(serde_json::Value::String(summary(value)));
        }
        let identity = value.identity().unwrap_or_default();
        if let Some(first_path) = self.seen.get(&identity) {
            return Replaced::Node(tagged(tags::DUPLICATE, first_path));
        }
        self.keys.push(if is_root {
            path::ROOT.to_string()
        } else {
            key.to_string()
        });
        self.ancestors.push(identity);
        self.seen.insert(identity, path::format_path(&self.keys));
        Replaced::Recurse
    }
}

/// Encode a value graph into the tagged JSON tree.
pub fn encode(root: &Value, max_depth: usize) -> serde_json::Value {
    let mut encoder = Encoder::new(max_depth);
    walk("", root, None, &mut encoder)
}

fn walk(
    key: &str,
    value: &Value,
    holder: Option<&Value>,
    encoder: &mut Encoder,
) -> serde_json::Value {
    match encoder.replace(key, value, holder) {
        Replaced::Node(node) => node,
        Replaced::Recurse => match value {
            Value::Array(items) => {
                let items = items.borrow();
                serde_json::Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| {
                            walk(&index.to_string(), item, Some(value), encoder)
                        })
                        .collect(),
                )
            }
            Value::Object(data) => {
                let data = data.borrow();
                let mut out = serde_json::Map::new();
                for (entry_key, entry) in &data.entries {
                    out.insert(entry_key.clone(), walk(entry_key, entry, Some(value), encoder));
                }
                if let Some(name) = &data.class_name {
                    if name != "Object" {
                        out.insert(
                            tags::CONSTRUCTOR_KEY.to_string(),
                            serde_json::Value::String(name.clone()),
                        );
                    }
                }
                serde_json::Value::Object(out)
            }
            _ => serde_json::Value::Null,
        },
    }
}

fn tagged(tag: &str, payload: &str) -> serde_json::Value {
    serde_json::Value::String(format!("{tag}{payload}"))
}

fn literal(text: &str) -> serde_json::Value {
    serde_json::Value::String(text.to_string())
}

fn summary(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("[Array({})]", items.borrow().len()),
        _ => "[Object]".to_string(),
    }
}

fn number_node(n: f64) -> serde_json::Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Value::from(n)
    }
}

fn date_shaped(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").expect("valid pattern")
    })
    .is_match(text)
}

fn opaque_source(source: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\s*\[native code\]\s*\}|__webpack_require__").expect("valid pattern")
    })
    .is_match(source)
}

fn noop_source(name: &str) -> String {
    if name.is_empty() {
        "function () {}".to_string()
    } else {
        format!("function {name}() {{}}")
    }
}
