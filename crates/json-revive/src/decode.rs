//! Decoder: tag-dispatching bottom-up reconstruction with deferred
//! reference patching.

use std::rc::Rc;

use crate::error::DecodeError;
use crate::func::{Evaluator, FuncData};
use crate::path::{assign, resolve_path};
use crate::tags;
use crate::value::{parse_iso, Value};

/// A reference recorded when a duplicate marker is decoded, applied once
/// the full tree is materialized.
struct DeferredRef {
    container: Value,
    key: String,
    source_path: String,
}

/// Per-call decoder state: the evaluator handed to revived functions and
/// the deferred-reference list. All state lives in the instance;
/// concurrent decodes never share anything.
pub struct Decoder {
    evaluator: Option<Rc<dyn Evaluator>>,
    deferred: Vec<DeferredRef>,
}

impl Decoder {
    pub fn new(evaluator: Option<Rc<dyn Evaluator>>) -> Self {
        Self {
            evaluator,
            deferred: Vec::new(),
        }
    }

    /// Decode a tagged JSON tree into a value graph.
    ///
    /// Walks the tree bottom-up (children before parents, synthetic root
    /// call last), then applies deferred references in recorded order. An
    /// unresolvable reference path is a loud
    /// [`DecodeError::UnresolvedReference`], never a silent `null`.
    pub fn decode(&mut self, tree: &serde_json::Value) -> Result<Value, DecodeError> {
        self.deferred.clear();
        let built = self.build(tree)?;
        let root = self.revive("", built, None)?;
        self.patch(&root)?;
        Ok(root)
    }

    fn build(&mut self, node: &serde_json::Value) -> Result<Value, DecodeError> {
        match node {
            serde_json::Value::Array(items) => {
                let array = Value::array();
                for (index, item) in items.iter().enumerate() {
                    let child = self.build(item)?;
                    let child = self.revive(&index.to_string(), child, Some(&array))?;
                    array.push(child);
                }
                Ok(array)
            }
            serde_json::Value::Object(entries) => {
                let object = Value::object();
                for (key, item) in entries {
                    let child = self.build(item)?;
                    let child = self.revive(key, child, Some(&object))?;
                    object.insert(key.clone(), child);
                }
                Ok(object)
            }
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(flag) => Ok(Value::Bool(*flag)),
            serde_json::Value::Number(number) => {
                Ok(Value::Number(number.as_f64().unwrap_or(f64::NAN)))
            }
            serde_json::Value::String(text) => Ok(Value::String(text.clone())),
        }
    }

    /// One decode step, pluggable into any bottom-up JSON tree-parser.
    ///
    /// The driver calls this with `(key, value, holder)` for every parsed
    /// pair, children before parents, ending with a synthetic root call
    /// (key `""`, no holder). A duplicate marker is not resolved here: it
    /// records a deferred reference against `holder` and decodes to a
    /// `Null` placeholder until [`Decoder::decode`] patches it.
    pub fn revive(
        &mut self,
        key: &str,
        value: Value,
        holder: Option<&Value>,
    ) -> Result<Value, DecodeError> {
        if let Value::Object(data) = &value {
            let marker = data.borrow_mut().entries.shift_remove(tags::CONSTRUCTOR_KEY);
            if let Some(Value::String(name)) = marker {
                if name != "Object" {
                    data.borrow_mut().class_name = Some(name);
                }
            }
            return Ok(value);
        }
        let text = match value {
            Value::String(text) => text,
            other => return Ok(other),
        };
        if let Some(payload) = text.strip_prefix(tags::FUNCTION) {
            let (name, source) = split_payload(payload, "function")?;
            return Ok(Value::Function(Rc::new(FuncData::revived(
                name.to_string(),
                source.to_string(),
                self.evaluator.clone(),
            ))));
        }
        if let Some(payload) = text.strip_prefix(tags::REGEXP) {
            let (flags, source) = split_payload(payload, "regexp")?;
            return Ok(Value::regexp(source, flags));
        }
        if let Some(payload) = text.strip_prefix(tags::DATE) {
            let instant =
                parse_iso(payload).ok_or_else(|| DecodeError::InvalidDate(payload.to_string()))?;
            return Ok(Value::Date(instant));
        }
        if let Some(payload) = text.strip_prefix(tags::DUPLICATE) {
            if let Some(container) = holder {
                self.deferred.push(DeferredRef {
                    container: container.clone(),
                    key: key.to_string(),
                    source_path: payload.to_string(),
                });
            }
            return Ok(Value::Null);
        }
        if let Some(payload) = text.strip_prefix(tags::SYMBOL) {
            return Ok(Value::symbol(payload));
        }
        match text.as_str() {
            tags::UNDEFINED => Ok(Value::Undefined),
            tags::NAN => Ok(Value::Number(f64::NAN)),
            tags::NEG_INFINITY => Ok(Value::Number(f64::NEG_INFINITY)),
            tags::INFINITY => Ok(Value::Number(f64::INFINITY)),
            _ => Ok(Value::String(text)),
        }
    }

    fn patch(&mut self, root: &Value) -> Result<(), DecodeError> {
        for reference in self.deferred.drain(..) {
            let target = resolve_path(root, &reference.source_path)?;
            assign(
                &reference.container,
                &reference.key,
                target,
                &reference.source_path,
            )?;
        }
        Ok(())
    }
}

fn split_payload<'a>(
    payload: &'a str,
    kind: &'static str,
) -> Result<(&'a str, &'a str), DecodeError> {
    payload.split_once('|').ok_or_else(|| DecodeError::MalformedTag {
        kind,
        payload: payload.to_string(),
    })
}
