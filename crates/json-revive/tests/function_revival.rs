//! Revived-function behavior around the evaluator seam.

use std::cell::Cell;
use std::rc::Rc;

use json_revive::{
    normalize_source, parse, parse_with, stringify, EvalError, Evaluator, NativeFn, ParseOptions,
    Value,
};

/// Test evaluator that understands the fixtures used below and counts how
/// often it is asked to compile.
struct FixtureEvaluator {
    compiles: Cell<usize>,
}

impl FixtureEvaluator {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            compiles: Cell::new(0),
        })
    }
}

impl Evaluator for FixtureEvaluator {
    fn compile(&self, name: &str, source: &str) -> Result<NativeFn, EvalError> {
        self.compiles.set(self.compiles.get() + 1);
        if source.contains("a + b") {
            Ok(Rc::new(|args: &[Value]| {
                let sum = args
                    .iter()
                    .filter_map(Value::as_number)
                    .sum::<f64>();
                Value::from(sum)
            }))
        } else {
            Err(EvalError::Compile {
                name: name.to_string(),
                message: "unrecognized fixture".to_string(),
            })
        }
    }
}

const ADD_SOURCE: &str = "function add(a, b) {\n  // sum both inputs\n  return a + b;\n}";

fn add_function() -> Value {
    Value::function("add", ADD_SOURCE)
}

#[test]
fn function_encodes_with_normalized_source() {
    assert_eq!(
        stringify(&add_function()),
        "\"_function_add|function add(a, b) { return a + b; }\""
    );
}

#[test]
fn decoded_source_matches_normalized_original() {
    let back = parse(&stringify(&add_function())).unwrap();
    let func = back.as_function().expect("function");
    assert_eq!(func.name(), "add");
    assert_eq!(func.source(), normalize_source(ADD_SOURCE));
}

#[test]
fn revival_without_evaluator_decodes_but_refuses_calls() {
    let back = parse(&stringify(&add_function())).unwrap();
    let func = back.as_function().expect("function");
    assert!(matches!(
        func.invoke(&[Value::from(1.0), Value::from(2.0)]),
        Err(EvalError::NoEvaluator(name)) if name == "add"
    ));
}

#[test]
fn revival_compiles_lazily_and_once() {
    let evaluator = FixtureEvaluator::new();
    let back = parse_with(
        &stringify(&add_function()),
        ParseOptions {
            evaluator: Some(evaluator.clone()),
        },
    )
    .unwrap();
    let func = back.as_function().expect("function");

    // Decoding alone never touches the evaluator.
    assert_eq!(evaluator.compiles.get(), 0);

    let sum = func.invoke(&[Value::from(2.0), Value::from(3.0)]).unwrap();
    assert_eq!(sum, Value::from(5.0));
    assert_eq!(evaluator.compiles.get(), 1);

    let sum = func.invoke(&[Value::from(10.0), Value::from(-4.0)]).unwrap();
    assert_eq!(sum, Value::from(6.0));
    assert_eq!(evaluator.compiles.get(), 1);
}

#[test]
fn compile_failure_surfaces() {
    let evaluator = FixtureEvaluator::new();
    let back = parse_with(
        "\"_function_mystery|function mystery() { return 0; }\"",
        ParseOptions {
            evaluator: Some(evaluator.clone()),
        },
    )
    .unwrap();
    let func = back.as_function().expect("function");
    assert!(matches!(
        func.invoke(&[]),
        Err(EvalError::Compile { name, .. }) if name == "mystery"
    ));
}

#[test]
fn native_function_round_trips_as_noop_stub() {
    let func = Value::native_function(
        "mul",
        Rc::new(|args: &[Value]| {
            Value::from(
                args.iter()
                    .filter_map(Value::as_number)
                    .product::<f64>(),
            )
        }),
    );
    assert_eq!(stringify(&func), "\"_function_mul|function mul() {}\"");
    let back = parse(&stringify(&func)).unwrap();
    let revived = back.as_function().expect("function");
    assert_eq!(revived.name(), "mul");
    assert_eq!(revived.source(), "function mul() {}");
}

#[test]
fn functions_nested_in_graphs() {
    let root = Value::object();
    root.insert("op", add_function());
    root.insert("label", Value::from("adder"));
    let back = parse(&stringify(&root)).unwrap();
    assert_eq!(back.get("label"), Some(Value::from("adder")));
    let func = back.get("op").unwrap().as_function().expect("function");
    assert_eq!(func.name(), "add");
}

#[test]
fn anonymous_function_keeps_empty_name() {
    let func = Value::function("", "function (x) { return x; }");
    assert_eq!(
        stringify(&func),
        "\"_function_|function (x) { return x; }\""
    );
    let back = parse(&stringify(&func)).unwrap();
    assert_eq!(back.as_function().expect("function").name(), "");
}
