//! Function values and the revival evaluator seam.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::error::EvalError;
use crate::value::Value;

/// A compiled callable.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Value>;

/// Compiles revived function source into a callable.
///
/// # Security
///
/// An evaluator executes payload-controlled text. Decoding untrusted input
/// with a live evaluator is unsafe; keep implementations free of ambient
/// capabilities and opt in only for trusted payloads. The crate ships no
/// evaluator of its own.
pub trait Evaluator {
    fn compile(&self, name: &str, source: &str) -> Result<NativeFn, EvalError>;
}

/// A function value: display name, source text, and a way to call it.
///
/// Natively backed functions report the opaque `[native code]` stub as
/// their source. Revived functions carry the decoded source and compile it
/// through the evaluator on first invocation, never at decode time.
pub struct FuncData {
    name: String,
    source: String,
    native: Option<NativeFn>,
    evaluator: Option<Rc<dyn Evaluator>>,
    compiled: OnceCell<NativeFn>,
}

impl FuncData {
    /// Function backed by source text alone.
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            native: None,
            evaluator: None,
            compiled: OnceCell::new(),
        }
    }

    /// Natively backed function.
    pub fn native(name: impl Into<String>, body: NativeFn) -> Self {
        let name = name.into();
        let source = if name.is_empty() {
            "function () { [native code] }".to_string()
        } else {
            format!("function {name}() {{ [native code] }}")
        };
        Self {
            name,
            source,
            native: Some(body),
            evaluator: None,
            compiled: OnceCell::new(),
        }
    }

    /// Function decoded from the wire, carrying the decoder's evaluator.
    pub(crate) fn revived(
        name: String,
        source: String,
        evaluator: Option<Rc<dyn Evaluator>>,
    ) -> Self {
        Self {
            name,
            source,
            native: None,
            evaluator,
            compiled: OnceCell::new(),
        }
    }

    /// The function's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function's reported source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Invoke the function.
    ///
    /// Revived functions compile their source through the evaluator on the
    /// first call and cache the result; without an evaluator this is
    /// [`EvalError::NoEvaluator`].
    pub fn invoke(&self, args: &[Value]) -> Result<Value, EvalError> {
        if let Some(body) = &self.native {
            return Ok(body(args));
        }
        let body = match self.compiled.get() {
            Some(body) => body.clone(),
            None => {
                let evaluator = self
                    .evaluator
                    .as_ref()
                    .ok_or_else(|| EvalError::NoEvaluator(self.name.clone()))?;
                let body = evaluator.compile(&self.name, &self.source)?;
                self.compiled.get_or_init(|| body).clone()
            }
        };
        Ok(body(args))
    }
}

impl fmt::Debug for FuncData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncData")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}
