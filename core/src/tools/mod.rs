use serde_json::Value;

pub mod arithmetic;

pub use arithmetic::{Arithmetic, MISSING_ARGS_MESSAGE};

pub fn extract_number_arg(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64)
}
